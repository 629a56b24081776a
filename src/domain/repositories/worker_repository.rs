// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::worker::{RateLimit, Worker, WorkerStatus};
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;

/// 工作器仓库特质
///
/// hostname 为自然主键，所有写入均为覆盖式更新，
/// 不同 hostname 的并发写入互不影响。
#[async_trait]
pub trait WorkerRepository: Send + Sync {
    /// 按 hostname 覆盖写入工作器记录
    async fn upsert(&self, worker: &Worker) -> Result<(), RepositoryError>;

    /// 更新指定工作器的状态
    async fn update_status(
        &self,
        hostname: &str,
        status: WorkerStatus,
    ) -> Result<(), RepositoryError>;

    /// 更新指定工作器的速率限制
    async fn update_rate_limit(
        &self,
        hostname: &str,
        rate_limit: Option<RateLimit>,
    ) -> Result<(), RepositoryError>;

    /// 根据 hostname 查找工作器
    async fn find_by_hostname(&self, hostname: &str) -> Result<Option<Worker>, RepositoryError>;

    /// 查找处于指定状态的所有工作器
    async fn find_by_status(&self, status: WorkerStatus) -> Result<Vec<Worker>, RepositoryError>;
}
