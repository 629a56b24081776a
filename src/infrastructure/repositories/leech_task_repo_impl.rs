// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::leech_task::{LeechTask, LeechTaskStatus, TaskPhase};
use crate::domain::repositories::leech_task_repository::LeechTaskRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::leech_task as task_entity;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 执行记录仓库实现
#[derive(Clone)]
pub struct LeechTaskRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl LeechTaskRepositoryImpl {
    /// 创建新的执行记录仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<task_entity::Model> for LeechTask {
    fn from(model: task_entity::Model) -> Self {
        Self {
            id: model.id,
            job_id: model.job_id,
            file_id: model.file_id,
            phase: model.phase.parse().unwrap_or_default(),
            status: model.status.parse().unwrap_or_default(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<LeechTask> for task_entity::ActiveModel {
    fn from(task: LeechTask) -> Self {
        Self {
            id: Set(task.id),
            job_id: Set(task.job_id),
            file_id: Set(task.file_id),
            phase: Set(task.phase.to_string()),
            status: Set(task.status.to_string()),
            created_at: Set(task.created_at),
            updated_at: Set(task.updated_at),
        }
    }
}

#[async_trait]
impl LeechTaskRepository for LeechTaskRepositoryImpl {
    async fn create(&self, task: &LeechTask) -> Result<LeechTask, RepositoryError> {
        let model: task_entity::ActiveModel = task.clone().into();

        model.insert(self.db.as_ref()).await?;
        Ok(task.clone())
    }

    async fn mark_done(&self, job_id: Uuid) -> Result<(), RepositoryError> {
        task_entity::Entity::update_many()
            .col_expr(
                task_entity::Column::Status,
                Expr::value(LeechTaskStatus::Done.to_string()),
            )
            .col_expr(
                task_entity::Column::UpdatedAt,
                Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())),
            )
            .filter(task_entity::Column::JobId.eq(job_id))
            .exec(self.db.as_ref())
            .await?;

        Ok(())
    }

    async fn find_by_status_and_phase(
        &self,
        status: LeechTaskStatus,
        phase: TaskPhase,
    ) -> Result<Vec<LeechTask>, RepositoryError> {
        let models = task_entity::Entity::find()
            .filter(task_entity::Column::Status.eq(status.to_string()))
            .filter(task_entity::Column::Phase.eq(phase.to_string()))
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn mark_terminated(&self, ids: &[Uuid]) -> Result<u64, RepositoryError> {
        let result = task_entity::Entity::update_many()
            .col_expr(
                task_entity::Column::Status,
                Expr::value(LeechTaskStatus::Terminated.to_string()),
            )
            .col_expr(
                task_entity::Column::UpdatedAt,
                Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())),
            )
            .filter(task_entity::Column::Id.is_in(ids.iter().copied()))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }

    async fn count_by_status_and_phase(
        &self,
        status: LeechTaskStatus,
        phase: TaskPhase,
    ) -> Result<u64, RepositoryError> {
        let count = task_entity::Entity::find()
            .filter(task_entity::Column::Status.eq(status.to_string()))
            .filter(task_entity::Column::Phase.eq(phase.to_string()))
            .count(self.db.as_ref())
            .await?;

        Ok(count)
    }
}
