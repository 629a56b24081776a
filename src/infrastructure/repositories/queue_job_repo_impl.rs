// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::leech_task::TaskPhase;
use crate::domain::models::queue_job::{QueueJob, QueueJobStatus};
use crate::domain::repositories::queue_job_repository::QueueJobRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::queue_job as job_entity;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use sea_orm::sea_query::{Expr, LockBehavior, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

/// 队列作业仓库实现
///
/// 认领通过行级锁加 SkipLocked 实现互斥：同一作业在租约内
/// 只会被一个工作器取到，租约过期的 Active 作业可被重新认领。
#[derive(Clone)]
pub struct QueueJobRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
    /// 认领租约时长（分钟）
    lock_timeout_minutes: i64,
}

impl QueueJobRepositoryImpl {
    /// 创建新的队列作业仓库实例
    pub fn new(db: Arc<DatabaseConnection>, lock_timeout_minutes: i64) -> Self {
        Self {
            db,
            lock_timeout_minutes,
        }
    }
}

impl From<job_entity::Model> for QueueJob {
    fn from(model: job_entity::Model) -> Self {
        Self {
            id: model.id,
            queue: model.queue,
            file_id: model.file_id,
            phase: model.phase.parse().unwrap_or_default(),
            chain: serde_json::from_value(model.chain).unwrap_or_default(),
            status: model.status.parse().unwrap_or_default(),
            lock_token: model.lock_token,
            lock_expires_at: model.lock_expires_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<QueueJob> for job_entity::ActiveModel {
    fn from(job: QueueJob) -> Self {
        Self {
            id: Set(job.id),
            queue: Set(job.queue),
            file_id: Set(job.file_id),
            phase: Set(job.phase.to_string()),
            chain: Set(serde_json::to_value(&job.chain).unwrap_or_default()),
            status: Set(job.status.to_string()),
            lock_token: Set(job.lock_token),
            lock_expires_at: Set(job.lock_expires_at),
            created_at: Set(job.created_at),
            updated_at: Set(job.updated_at),
        }
    }
}

#[async_trait]
impl QueueJobRepository for QueueJobRepositoryImpl {
    async fn create(&self, job: &QueueJob) -> Result<QueueJob, RepositoryError> {
        let model: job_entity::ActiveModel = job.clone().into();

        model.insert(self.db.as_ref()).await?;
        Ok(job.clone())
    }

    async fn claim_next(
        &self,
        queues: &[String],
        lock_token: &str,
    ) -> Result<Option<QueueJob>, RepositoryError> {
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let model = job_entity::Entity::find()
            .filter(job_entity::Column::Queue.is_in(queues.iter().cloned()))
            .filter(
                Condition::any()
                    .add(job_entity::Column::Status.eq(QueueJobStatus::Queued.to_string()))
                    .add(
                        Condition::all()
                            .add(
                                job_entity::Column::Status
                                    .eq(QueueJobStatus::Active.to_string()),
                            )
                            .add(job_entity::Column::LockExpiresAt.lte(now)),
                    ),
            )
            .order_by_asc(job_entity::Column::CreatedAt)
            .lock_with_behavior(LockType::Update, LockBehavior::SkipLocked)
            .one(&txn)
            .await?;

        let Some(model) = model else {
            txn.commit().await?;
            return Ok(None);
        };

        let mut active: job_entity::ActiveModel = model.into();
        active.status = Set(QueueJobStatus::Active.to_string());
        active.lock_token = Set(Some(lock_token.to_string()));
        active.lock_expires_at = Set(Some(
            (now + Duration::minutes(self.lock_timeout_minutes)).into(),
        ));
        active.updated_at = Set(Some(now.into()));

        let claimed = active.update(&txn).await?;
        txn.commit().await?;

        Ok(Some(claimed.into()))
    }

    async fn mark_done(&self, id: Uuid) -> Result<(), RepositoryError> {
        job_entity::Entity::update_many()
            .col_expr(
                job_entity::Column::Status,
                Expr::value(QueueJobStatus::Done.to_string()),
            )
            .col_expr(
                job_entity::Column::UpdatedAt,
                Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())),
            )
            .filter(job_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        Ok(())
    }

    async fn find_queued_by_phase(
        &self,
        phase: TaskPhase,
    ) -> Result<Vec<QueueJob>, RepositoryError> {
        let models = job_entity::Entity::find()
            .filter(job_entity::Column::Phase.eq(phase.to_string()))
            .filter(job_entity::Column::Status.eq(QueueJobStatus::Queued.to_string()))
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn mark_revoked(&self, ids: &[Uuid]) -> Result<u64, RepositoryError> {
        let result = job_entity::Entity::update_many()
            .col_expr(
                job_entity::Column::Status,
                Expr::value(QueueJobStatus::Revoked.to_string()),
            )
            .col_expr(
                job_entity::Column::UpdatedAt,
                Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())),
            )
            .filter(job_entity::Column::Id.is_in(ids.iter().copied()))
            .filter(job_entity::Column::Status.eq(QueueJobStatus::Queued.to_string()))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }

    async fn count_queued(&self, queue: &str) -> Result<u64, RepositoryError> {
        let count = job_entity::Entity::find()
            .filter(job_entity::Column::Queue.eq(queue))
            .filter(job_entity::Column::Status.eq(QueueJobStatus::Queued.to_string()))
            .count(self.db.as_ref())
            .await?;

        Ok(count)
    }
}
