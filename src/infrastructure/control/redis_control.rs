// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::worker::RateLimit;
use crate::utils::errors::ControlError;
use futures::StreamExt;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// 控制命令
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlCommand {
    /// 命令唯一标识，应答通道以此派生
    pub id: Uuid,
    /// 命令内容
    pub action: ControlAction,
}

/// 控制命令内容
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ControlAction {
    /// 调整指定任务的速率限制，None 表示清除限制
    RateLimit {
        /// 目标任务名
        task_name: String,
        /// 新的速率限制
        rate: Option<RateLimit>,
    },
    /// 优雅停机：完成当前作业后退出
    Shutdown,
}

/// 控制命令应答
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlAck {
    /// 命令是否被接受并生效
    pub ok: bool,
}

/// Redis 控制通道
///
/// 控制端把命令发布到 `leech:control:{hostname}`，
/// 工作器在 `leech:control:reply:{command_id}` 上应答。
/// 发送方在限定时间内等待确认；没有订阅者或超时都视为失败，
/// 调用方据此决定是否持久化设置（不允许部分生效）。
#[derive(Clone)]
pub struct RedisControlBus {
    client: redis::Client,
}

impl RedisControlBus {
    /// 创建新的控制通道实例
    pub fn new(redis_url: &str) -> Result<Self, ControlError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    fn command_channel(hostname: &str) -> String {
        format!("leech:control:{}", hostname)
    }

    fn reply_channel(command_id: Uuid) -> String {
        format!("leech:control:reply:{}", command_id)
    }

    /// 发送控制命令并等待确认
    ///
    /// # 返回值
    ///
    /// * `Ok(true)` - 工作器确认命令已生效
    /// * `Ok(false)` - 没有工作器监听，或工作器拒绝了命令
    /// * `Err(ControlError)` - 通道故障或等待确认超时
    pub async fn send(
        &self,
        hostname: &str,
        action: ControlAction,
        timeout: Duration,
    ) -> Result<bool, ControlError> {
        let command = ControlCommand {
            id: Uuid::new_v4(),
            action,
        };

        // 先订阅应答通道，避免应答早于订阅到达而丢失
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(Self::reply_channel(command.id)).await?;

        let payload = serde_json::to_string(&command)?;
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let receivers: i64 = con
            .publish(Self::command_channel(hostname), payload)
            .await?;

        if receivers == 0 {
            return Ok(false);
        }

        let mut stream = pubsub.on_message();
        match tokio::time::timeout(timeout, stream.next()).await {
            Ok(Some(message)) => {
                let raw: String = message.get_payload()?;
                let ack: ControlAck = serde_json::from_str(&raw)?;
                Ok(ack.ok)
            }
            Ok(None) => Ok(false),
            Err(_) => Err(ControlError::AckTimeout),
        }
    }

    /// 应答一条控制命令
    pub async fn acknowledge(&self, command_id: Uuid, ok: bool) -> Result<(), ControlError> {
        let payload = serde_json::to_string(&ControlAck { ok })?;
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let _: i64 = con.publish(Self::reply_channel(command_id), payload).await?;
        Ok(())
    }

    /// 订阅指定工作器的命令通道
    pub async fn subscribe(&self, hostname: &str) -> Result<redis::aio::PubSub, ControlError> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(Self::command_channel(hostname)).await?;
        Ok(pubsub)
    }
}
