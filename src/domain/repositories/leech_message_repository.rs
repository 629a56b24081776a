// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::leech_message::{LeechMessage, MessageStatus};
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 通知仓库特质
#[async_trait]
pub trait LeechMessageRepository: Send + Sync {
    /// 创建待投递通知
    async fn create(&self, message: &LeechMessage) -> Result<LeechMessage, RepositoryError>;

    /// 按创建时间顺序查找待投递通知
    async fn find_pending(&self, limit: u64) -> Result<Vec<LeechMessage>, RepositoryError>;

    /// 更新通知状态
    async fn update_status(&self, id: Uuid, status: MessageStatus) -> Result<(), RepositoryError>;
}
