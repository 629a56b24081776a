// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::worker::{RateLimit, Worker, WorkerStatus};
use crate::domain::repositories::worker_repository::WorkerRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::worker as worker_entity;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::sync::Arc;

/// 工作器仓库实现
///
/// hostname 为主键，写入一律走 upsert，保证同名记录原地覆盖
#[derive(Clone)]
pub struct WorkerRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl WorkerRepositoryImpl {
    /// 创建新的工作器仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<worker_entity::Model> for Worker {
    fn from(model: worker_entity::Model) -> Self {
        Self {
            hostname: model.hostname,
            queue: model.queue,
            status: model.status.parse().unwrap_or_default(),
            concurrency: model.concurrency,
            rate_limit: model
                .rate_limit
                .and_then(|value| serde_json::from_value::<RateLimit>(value).ok()),
            updated_at: model.updated_at,
        }
    }
}

impl From<Worker> for worker_entity::ActiveModel {
    fn from(worker: Worker) -> Self {
        Self {
            hostname: Set(worker.hostname),
            queue: Set(worker.queue),
            status: Set(worker.status.to_string()),
            concurrency: Set(worker.concurrency),
            rate_limit: Set(worker
                .rate_limit
                .and_then(|limit| serde_json::to_value(limit).ok())),
            updated_at: Set(worker.updated_at),
        }
    }
}

#[async_trait]
impl WorkerRepository for WorkerRepositoryImpl {
    async fn upsert(&self, worker: &Worker) -> Result<(), RepositoryError> {
        let model: worker_entity::ActiveModel = worker.clone().into();

        worker_entity::Entity::insert(model)
            .on_conflict(
                OnConflict::column(worker_entity::Column::Hostname)
                    .update_columns([
                        worker_entity::Column::Queue,
                        worker_entity::Column::Status,
                        worker_entity::Column::Concurrency,
                        worker_entity::Column::RateLimit,
                        worker_entity::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(self.db.as_ref())
            .await?;

        Ok(())
    }

    async fn update_status(
        &self,
        hostname: &str,
        status: WorkerStatus,
    ) -> Result<(), RepositoryError> {
        worker_entity::Entity::update_many()
            .col_expr(
                worker_entity::Column::Status,
                Expr::value(status.to_string()),
            )
            .col_expr(
                worker_entity::Column::UpdatedAt,
                Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())),
            )
            .filter(worker_entity::Column::Hostname.eq(hostname))
            .exec(self.db.as_ref())
            .await?;

        Ok(())
    }

    async fn update_rate_limit(
        &self,
        hostname: &str,
        rate_limit: Option<RateLimit>,
    ) -> Result<(), RepositoryError> {
        let value = rate_limit.and_then(|limit| serde_json::to_value(limit).ok());

        worker_entity::Entity::update_many()
            .col_expr(worker_entity::Column::RateLimit, Expr::value(value))
            .col_expr(
                worker_entity::Column::UpdatedAt,
                Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())),
            )
            .filter(worker_entity::Column::Hostname.eq(hostname))
            .exec(self.db.as_ref())
            .await?;

        Ok(())
    }

    async fn find_by_hostname(&self, hostname: &str) -> Result<Option<Worker>, RepositoryError> {
        let model = worker_entity::Entity::find_by_id(hostname.to_string())
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn find_by_status(&self, status: WorkerStatus) -> Result<Vec<Worker>, RepositoryError> {
        let models = worker_entity::Entity::find()
            .filter(worker_entity::Column::Status.eq(status.to_string()))
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
