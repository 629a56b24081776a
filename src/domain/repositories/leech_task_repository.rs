// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::leech_task::{LeechTask, LeechTaskStatus, TaskPhase};
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 执行记录仓库特质
#[async_trait]
pub trait LeechTaskRepository: Send + Sync {
    /// 创建执行记录
    async fn create(&self, task: &LeechTask) -> Result<LeechTask, RepositoryError>;

    /// 将指定作业的执行记录标记为 Done
    async fn mark_done(&self, job_id: Uuid) -> Result<(), RepositoryError>;

    /// 按状态与阶段查找执行记录
    async fn find_by_status_and_phase(
        &self,
        status: LeechTaskStatus,
        phase: TaskPhase,
    ) -> Result<Vec<LeechTask>, RepositoryError>;

    /// 批量标记执行记录为 Terminated
    async fn mark_terminated(&self, ids: &[Uuid]) -> Result<u64, RepositoryError>;

    /// 统计处于指定状态与阶段的执行记录数
    async fn count_by_status_and_phase(
        &self,
        status: LeechTaskStatus,
        phase: TaskPhase,
    ) -> Result<u64, RepositoryError>;
}
