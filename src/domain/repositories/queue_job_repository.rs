// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::leech_task::TaskPhase;
use crate::domain::models::queue_job::QueueJob;
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 队列作业仓库特质
///
/// 作业认领必须满足至多一个认领者的约束：
/// 同一作业在租约有效期内不会被第二个工作器取到。
#[async_trait]
pub trait QueueJobRepository: Send + Sync {
    /// 创建新作业
    async fn create(&self, job: &QueueJob) -> Result<QueueJob, RepositoryError>;

    /// 认领下一个待处理作业
    ///
    /// 在给定队列集合内按创建时间取最早的 Queued 作业
    /// （或租约已过期的 Active 作业），加锁并返回。
    async fn claim_next(
        &self,
        queues: &[String],
        lock_token: &str,
    ) -> Result<Option<QueueJob>, RepositoryError>;

    /// 将作业标记为 Done
    async fn mark_done(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// 查找指定阶段仍在排队的作业
    async fn find_queued_by_phase(
        &self,
        phase: TaskPhase,
    ) -> Result<Vec<QueueJob>, RepositoryError>;

    /// 批量撤销排队中的作业
    async fn mark_revoked(&self, ids: &[Uuid]) -> Result<u64, RepositoryError>;

    /// 统计指定队列中排队的作业数
    async fn count_queued(&self, queue: &str) -> Result<u64, RepositoryError>;
}
