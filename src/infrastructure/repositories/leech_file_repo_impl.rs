// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::leech_file::{LeechFile, LeechFileStatus};
use crate::domain::repositories::leech_file_repository::LeechFileRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::leech_file as file_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 文件仓库实现
///
/// 基于SeaORM实现的文件数据访问层
#[derive(Clone)]
pub struct LeechFileRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl LeechFileRepositoryImpl {
    /// 创建新的文件仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<file_entity::Model> for LeechFile {
    fn from(model: file_entity::Model) -> Self {
        Self {
            id: model.id,
            link: model.link,
            actual_link: model.actual_link,
            token: model.token,
            tool: model.tool.parse().unwrap_or_default(),
            status: model.status.parse().unwrap_or_default(),
            upload_status: model.upload_status.parse().unwrap_or_default(),
            sync_tool: model.sync_tool.and_then(|tool| tool.parse().ok()),
            sync_path: model.sync_path,
            name: model.name,
            reason: model.reason,
            upload_reason: model.upload_reason,
            remote_folder: model.remote_folder,
            location: model.location,
            size: model.size,
            content_hash: model.content_hash,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<LeechFile> for file_entity::ActiveModel {
    fn from(file: LeechFile) -> Self {
        Self {
            id: Set(file.id),
            link: Set(file.link),
            actual_link: Set(file.actual_link),
            token: Set(file.token),
            tool: Set(file.tool.to_string()),
            status: Set(file.status.to_string()),
            upload_status: Set(file.upload_status.to_string()),
            sync_tool: Set(file.sync_tool.map(|tool| tool.to_string())),
            sync_path: Set(file.sync_path),
            name: Set(file.name),
            reason: Set(file.reason),
            upload_reason: Set(file.upload_reason),
            remote_folder: Set(file.remote_folder),
            location: Set(file.location),
            size: Set(file.size),
            content_hash: Set(file.content_hash),
            created_at: Set(file.created_at),
            updated_at: Set(file.updated_at),
        }
    }
}

#[async_trait]
impl LeechFileRepository for LeechFileRepositoryImpl {
    async fn create(&self, file: &LeechFile) -> Result<LeechFile, RepositoryError> {
        let model: file_entity::ActiveModel = file.clone().into();

        model.insert(self.db.as_ref()).await?;
        Ok(file.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<LeechFile>, RepositoryError> {
        let model = file_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn update(&self, file: &LeechFile) -> Result<LeechFile, RepositoryError> {
        let model: file_entity::ActiveModel = file.clone().into();

        let updated = model.update(self.db.as_ref()).await?;
        Ok(updated.into())
    }

    async fn find_duplicate(
        &self,
        content_hash: &str,
        since: DateTime<FixedOffset>,
    ) -> Result<Option<LeechFile>, RepositoryError> {
        let model = file_entity::Entity::find()
            .filter(file_entity::Column::ContentHash.eq(content_hash))
            .filter(
                file_entity::Column::Status.eq(LeechFileStatus::DownloadSuccess.to_string()),
            )
            .filter(
                file_entity::Column::UploadStatus
                    .eq(LeechFileStatus::UploadSuccess.to_string()),
            )
            .filter(file_entity::Column::CreatedAt.gte(since))
            .order_by_desc(file_entity::Column::CreatedAt)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn find_by_status(
        &self,
        status: LeechFileStatus,
        since: DateTime<FixedOffset>,
    ) -> Result<Vec<LeechFile>, RepositoryError> {
        let models = file_entity::Entity::find()
            .filter(file_entity::Column::Status.eq(status.to_string()))
            .filter(file_entity::Column::CreatedAt.gte(since))
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_by_upload_status(
        &self,
        status: LeechFileStatus,
        since: DateTime<FixedOffset>,
    ) -> Result<Vec<LeechFile>, RepositoryError> {
        let models = file_entity::Entity::find()
            .filter(file_entity::Column::UploadStatus.eq(status.to_string()))
            .filter(file_entity::Column::CreatedAt.gte(since))
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count_by_status(&self, status: LeechFileStatus) -> Result<u64, RepositoryError> {
        let count = file_entity::Entity::find()
            .filter(file_entity::Column::Status.eq(status.to_string()))
            .count(self.db.as_ref())
            .await?;

        Ok(count)
    }

    async fn count_by_upload_status(
        &self,
        status: LeechFileStatus,
    ) -> Result<u64, RepositoryError> {
        let count = file_entity::Entity::find()
            .filter(file_entity::Column::UploadStatus.eq(status.to_string()))
            .count(self.db.as_ref())
            .await?;

        Ok(count)
    }
}
