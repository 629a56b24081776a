// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::leech_message::{LeechMessage, MessageStatus};
use crate::domain::repositories::leech_message_repository::LeechMessageRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::leech_message as message_entity;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 通知仓库实现
#[derive(Clone)]
pub struct LeechMessageRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl LeechMessageRepositoryImpl {
    /// 创建新的通知仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<message_entity::Model> for LeechMessage {
    fn from(model: message_entity::Model) -> Self {
        Self {
            id: model.id,
            phase: model.phase.parse().unwrap_or_default(),
            file_id: model.file_id,
            content: model.content,
            status: model.status.parse().unwrap_or_default(),
            file_status: model.file_status.parse().unwrap_or_default(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<LeechMessage> for message_entity::ActiveModel {
    fn from(message: LeechMessage) -> Self {
        Self {
            id: Set(message.id),
            phase: Set(message.phase.to_string()),
            file_id: Set(message.file_id),
            content: Set(message.content),
            status: Set(message.status.to_string()),
            file_status: Set(message.file_status.to_string()),
            created_at: Set(message.created_at),
            updated_at: Set(message.updated_at),
        }
    }
}

#[async_trait]
impl LeechMessageRepository for LeechMessageRepositoryImpl {
    async fn create(&self, message: &LeechMessage) -> Result<LeechMessage, RepositoryError> {
        let model: message_entity::ActiveModel = message.clone().into();

        model.insert(self.db.as_ref()).await?;
        Ok(message.clone())
    }

    async fn find_pending(&self, limit: u64) -> Result<Vec<LeechMessage>, RepositoryError> {
        let models = message_entity::Entity::find()
            .filter(message_entity::Column::Status.eq(MessageStatus::Initial.to_string()))
            .order_by_asc(message_entity::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update_status(&self, id: Uuid, status: MessageStatus) -> Result<(), RepositoryError> {
        message_entity::Entity::update_many()
            .col_expr(
                message_entity::Column::Status,
                Expr::value(status.to_string()),
            )
            .col_expr(
                message_entity::Column::UpdatedAt,
                Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())),
            )
            .filter(message_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        Ok(())
    }
}
