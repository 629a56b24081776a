// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::leech_task::TaskPhase;
use crate::domain::models::queue_job::{JobSignature, QueueJob};
use crate::domain::repositories::queue_job_repository::QueueJobRepository;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// 队列错误类型
#[derive(Error, Debug)]
pub enum QueueError {
    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] crate::domain::repositories::RepositoryError),

    /// 空链提交
    #[error("Empty chain")]
    EmptyChain,
}

/// 任务队列特质
///
/// 链式提交协议：一次提交包含若干有序签名，
/// 首个签名立即入队，其余保存在作业的链尾；
/// 作业处理函数返回后（无论文件层面成败）链尾头部继续入队。
/// 提交是即发即忘的，调用方不等待执行结果。
#[async_trait]
pub trait LeechQueue: Send + Sync {
    /// 提交一条任务链
    async fn submit_chain(&self, signatures: Vec<JobSignature>) -> Result<QueueJob, QueueError>;

    /// 从给定队列集合认领下一个作业
    async fn claim_next(
        &self,
        queues: &[String],
        lock_token: &str,
    ) -> Result<Option<QueueJob>, QueueError>;

    /// 完成作业并推进任务链
    async fn complete(&self, job: &QueueJob) -> Result<(), QueueError>;

    /// 撤销指定阶段所有排队中的作业，返回被撤销作业的ID
    async fn revoke_pending(&self, phase: TaskPhase) -> Result<Vec<Uuid>, QueueError>;

    /// 统计指定队列排队中的作业数
    async fn count_queued(&self, queue: &str) -> Result<u64, QueueError>;
}

/// 数据库任务队列实现
///
/// 把作业持久化为带锁租约的行，借助仓库的互斥认领
/// 获得至多一个消费者的保证。
pub struct DbLeechQueue {
    /// 作业仓库
    repository: Arc<dyn QueueJobRepository>,
}

impl DbLeechQueue {
    /// 创建新的数据库任务队列实例
    pub fn new(repository: Arc<dyn QueueJobRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl LeechQueue for DbLeechQueue {
    async fn submit_chain(&self, mut signatures: Vec<JobSignature>) -> Result<QueueJob, QueueError> {
        if signatures.is_empty() {
            return Err(QueueError::EmptyChain);
        }

        let head = signatures.remove(0);
        let job = QueueJob::from_signature(head, signatures);

        debug!("Submitting job {} to queue {}", job.id, job.queue);
        let created = self.repository.create(&job).await?;
        Ok(created)
    }

    async fn claim_next(
        &self,
        queues: &[String],
        lock_token: &str,
    ) -> Result<Option<QueueJob>, QueueError> {
        let job = self.repository.claim_next(queues, lock_token).await?;
        Ok(job)
    }

    async fn complete(&self, job: &QueueJob) -> Result<(), QueueError> {
        self.repository.mark_done(job.id).await?;

        // 链尾无条件推进，上传阶段是否做实际工作由其前置条件阶段决定
        if !job.chain.is_empty() {
            let mut rest = job.chain.clone();
            let next = rest.remove(0);
            let next_job = QueueJob::from_signature(next, rest);

            debug!(
                "Advancing chain for file {} to queue {}",
                next_job.file_id, next_job.queue
            );
            self.repository.create(&next_job).await?;
        }

        Ok(())
    }

    async fn revoke_pending(&self, phase: TaskPhase) -> Result<Vec<Uuid>, QueueError> {
        let queued = self.repository.find_queued_by_phase(phase).await?;
        let ids: Vec<Uuid> = queued.iter().map(|job| job.id).collect();

        if !ids.is_empty() {
            self.repository.mark_revoked(&ids).await?;
        }

        Ok(ids)
    }

    async fn count_queued(&self, queue: &str) -> Result<u64, QueueError> {
        let count = self.repository.count_queued(queue).await?;
        Ok(count)
    }
}

#[async_trait]
impl<T: LeechQueue + ?Sized> LeechQueue for Arc<T> {
    async fn submit_chain(&self, signatures: Vec<JobSignature>) -> Result<QueueJob, QueueError> {
        (**self).submit_chain(signatures).await
    }

    async fn claim_next(
        &self,
        queues: &[String],
        lock_token: &str,
    ) -> Result<Option<QueueJob>, QueueError> {
        (**self).claim_next(queues, lock_token).await
    }

    async fn complete(&self, job: &QueueJob) -> Result<(), QueueError> {
        (**self).complete(job).await
    }

    async fn revoke_pending(&self, phase: TaskPhase) -> Result<Vec<Uuid>, QueueError> {
        (**self).revoke_pending(phase).await
    }

    async fn count_queued(&self, queue: &str) -> Result<u64, QueueError> {
        (**self).count_queued(queue).await
    }
}
