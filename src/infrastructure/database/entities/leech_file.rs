// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "leech_file")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub link: String,
    pub actual_link: Option<String>,
    pub token: Option<String>,
    pub tool: String,
    pub status: String,
    pub upload_status: String,
    pub sync_tool: Option<String>,
    pub sync_path: Option<String>,
    pub name: Option<String>,
    pub reason: Option<String>,
    pub upload_reason: Option<String>,
    pub remote_folder: Option<String>,
    pub location: Option<String>,
    pub size: Option<i64>,
    pub content_hash: Option<String>,
    pub created_at: ChronoDateTimeWithTimeZone,
    pub updated_at: Option<ChronoDateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
