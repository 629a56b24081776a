// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含数据库、Redis、服务器、下载与工作器等所有配置项
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// Redis配置
    pub redis: RedisSettings,
    /// 服务器配置
    pub server: ServerSettings,
    /// 下载与去重配置
    pub leech: LeechSettings,
    /// 工作器配置
    pub worker: WorkerSettings,
    /// 上传目的地配置
    pub sync: SyncSettings,
}

/// 数据库配置设置
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// Redis配置设置
#[derive(Debug, Deserialize, Clone)]
pub struct RedisSettings {
    /// Redis连接URL
    pub url: String,
}

/// 服务器配置设置
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 下载与去重配置设置
#[derive(Debug, Deserialize, Clone)]
pub struct LeechSettings {
    /// 本地暂存根目录
    pub download_root: String,
    /// 去重窗口（天）：窗口内同哈希的完整成功记录使新提交短路
    pub skip_duplicate_within_days: i64,
    /// 失败任务保留窗口（天）：窗口外的失败任务不再可重试
    pub failed_task_expire_after_days: i64,
    /// 下载流式传输超时时间（秒）
    pub stream_timeout: u64,
    /// 操作者通知投递地址
    pub notify_url: Option<String>,
    /// 通知轮询间隔（秒）
    pub message_poll_interval: u64,
}

/// 工作器配置设置
#[derive(Debug, Deserialize, Clone)]
pub struct WorkerSettings {
    /// 下载工作器默认并发槽位数
    pub maximum_leech_worker: i32,
    /// 上传工作器默认并发槽位数
    pub maximum_sync_worker: i32,
    /// 等待工作器状态转换的超时时间（秒）
    pub shutdown_timeout: u64,
    /// 作业认领租约时长（分钟）
    pub lock_timeout_minutes: i64,
}

/// 上传目的地配置设置
#[derive(Debug, Deserialize, Clone)]
pub struct SyncSettings {
    /// Alist 服务地址
    pub alist_host: Option<String>,
    /// Alist 访问令牌
    pub alist_token: Option<String>,
    /// rclone 可执行文件路径
    pub rclone_binary: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Default DB pool settings
            .set_default("database.url", "sqlite::memory:")?
            .set_default("redis.url", "redis://127.0.0.1:6379")?
            .set_default("database.max_connections", 100)?
            .set_default("database.min_connections", 10)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default leech settings
            .set_default("leech.download_root", "./downloads")?
            .set_default("leech.skip_duplicate_within_days", 30)?
            .set_default("leech.failed_task_expire_after_days", 7)?
            .set_default("leech.stream_timeout", 600)?
            .set_default("leech.message_poll_interval", 5)?
            // Default worker settings
            .set_default("worker.maximum_leech_worker", 1)?
            .set_default("worker.maximum_sync_worker", 1)?
            .set_default("worker.shutdown_timeout", 60)?
            .set_default("worker.lock_timeout_minutes", 30)?
            // Default sync settings
            .set_default("sync.rclone_binary", "rclone")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("LEECHRS").separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::new().expect("defaults should satisfy every required field");

        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.leech.skip_duplicate_within_days, 30);
        assert_eq!(settings.worker.shutdown_timeout, 60);
        assert_eq!(settings.sync.rclone_binary, "rclone");
    }
}
