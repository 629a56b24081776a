// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 控制通道模块
///
/// 面向运行中工作器的实时控制命令（限速、停机）
pub mod redis_control;

use crate::utils::errors::ControlError;
use async_trait::async_trait;
use self::redis_control::{ControlAction, RedisControlBus};
use std::time::Duration;

/// 控制通道发送端特质
///
/// 管理器只依赖发送与确认语义，具体传输由实现决定
#[async_trait]
pub trait ControlChannel: Send + Sync {
    /// 发送控制命令并等待确认
    async fn send(
        &self,
        hostname: &str,
        action: ControlAction,
        timeout: Duration,
    ) -> Result<bool, ControlError>;
}

#[async_trait]
impl ControlChannel for RedisControlBus {
    async fn send(
        &self,
        hostname: &str,
        action: ControlAction,
        timeout: Duration,
    ) -> Result<bool, ControlError> {
        RedisControlBus::send(self, hostname, action, timeout).await
    }
}
