// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::DatabaseSettings;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;

/// 创建数据库连接池
///
/// 下载/上传作业在网络传输期间不持有连接，连接需求
/// 主要来自状态落库与作业认领，池子可以配置得很小。
///
/// # 参数
///
/// * `settings` - 数据库配置
///
/// # 返回值
///
/// * `Ok(DatabaseConnection)` - 数据库连接
/// * `Err(DbErr)` - 连接过程中出现的错误
pub async fn create_pool(settings: &DatabaseSettings) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(settings.url.to_owned());

    // sqlite 不支持多写连接，内存库还依赖单连接保住数据
    let is_sqlite = settings.url.starts_with("sqlite");

    if let Some(max) = settings.max_connections {
        opt.max_connections(if is_sqlite { 1 } else { max });
    }

    if let Some(min) = settings.min_connections {
        opt.min_connections(if is_sqlite { 1 } else { min });
    }

    if let Some(timeout) = settings.connect_timeout {
        opt.connect_timeout(Duration::from_secs(timeout));
        opt.acquire_timeout(Duration::from_secs(timeout));
    }

    if let Some(idle) = settings.idle_timeout {
        opt.idle_timeout(Duration::from_secs(idle));
    }

    opt.max_lifetime(Duration::from_secs(3600))
        .sqlx_logging(false);

    Database::connect(opt).await
}
