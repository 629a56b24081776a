// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::leech_file::{LeechFile, LeechFileStatus};
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

/// 文件仓库特质
///
/// 定义文件记录的数据访问接口
#[async_trait]
pub trait LeechFileRepository: Send + Sync {
    /// 创建新文件记录
    async fn create(&self, file: &LeechFile) -> Result<LeechFile, RepositoryError>;

    /// 根据ID查找文件
    async fn find_by_id(&self, id: Uuid) -> Result<Option<LeechFile>, RepositoryError>;

    /// 更新文件记录
    async fn update(&self, file: &LeechFile) -> Result<LeechFile, RepositoryError>;

    /// 查找去重窗口内已完整走完两个阶段的同哈希记录
    ///
    /// 匹配条件：content_hash 相同、下载与上传均为成功终态、
    /// 创建时间不早于 `since`；按创建时间倒序取最近一条。
    async fn find_duplicate(
        &self,
        content_hash: &str,
        since: DateTime<FixedOffset>,
    ) -> Result<Option<LeechFile>, RepositoryError>;

    /// 查找保留窗口内处于指定下载终态的文件
    async fn find_by_status(
        &self,
        status: LeechFileStatus,
        since: DateTime<FixedOffset>,
    ) -> Result<Vec<LeechFile>, RepositoryError>;

    /// 查找保留窗口内处于指定上传终态的文件
    async fn find_by_upload_status(
        &self,
        status: LeechFileStatus,
        since: DateTime<FixedOffset>,
    ) -> Result<Vec<LeechFile>, RepositoryError>;

    /// 统计处于指定下载状态的文件数
    async fn count_by_status(&self, status: LeechFileStatus) -> Result<u64, RepositoryError>;

    /// 统计处于指定上传状态的文件数
    async fn count_by_upload_status(
        &self,
        status: LeechFileStatus,
    ) -> Result<u64, RepositoryError>;
}
