// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::leech_message::{LeechMessage, MessageStatus};
use crate::domain::repositories::leech_message_repository::LeechMessageRepository;
use async_trait::async_trait;
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

/// 通知投递器特质
///
/// 操作者通道是外部协作方，核心只依赖这个抽象
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 投递一条通知
    async fn deliver(&self, message: &LeechMessage) -> anyhow::Result<()>;
}

/// Webhook 通知投递器
///
/// 把通知以 JSON 形式 POST 到配置的操作者回调地址
pub struct WebhookNotifier {
    http: reqwest::Client,
    notify_url: String,
}

impl WebhookNotifier {
    pub fn new(http: reqwest::Client, notify_url: String) -> Self {
        Self { http, notify_url }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn deliver(&self, message: &LeechMessage) -> anyhow::Result<()> {
        let response = self
            .http
            .post(&self.notify_url)
            .json(&serde_json::json!({
                "file_id": message.file_id,
                "phase": message.phase,
                "file_status": message.file_status,
                "content": message.content,
                "retryable": message.is_retryable(),
            }))
            .timeout(Duration::from_secs(10))
            .send()
            .await?;

        response.error_for_status()?;
        Ok(())
    }
}

/// 通知工作器
///
/// 单线程尽力而为的轮询循环：每个周期取出待投递通知，
/// 需要提示操作者的投递后标记 AlreadySent，其余标记 Discard。
/// 投递失败只记录日志，通知保持 Initial 待下个周期重试。
pub struct MessageWorker {
    message_repo: Arc<dyn LeechMessageRepository>,
    notifier: Arc<dyn Notifier>,
    poll_interval: Duration,
}

impl MessageWorker {
    pub fn new(
        message_repo: Arc<dyn LeechMessageRepository>,
        notifier: Arc<dyn Notifier>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            message_repo,
            notifier,
            poll_interval,
        }
    }

    /// 运行通知轮询循环
    pub async fn run(&self) {
        info!("Message worker started");

        loop {
            if let Err(e) = self.process_pending_messages().await {
                error!("Error processing messages: {}", e);
            }

            sleep(self.poll_interval).await;
        }
    }

    /// 处理一批待投递通知
    pub async fn process_pending_messages(&self) -> anyhow::Result<()> {
        let pending = self.message_repo.find_pending(50).await?;

        for message in pending {
            if !message.should_deliver() {
                self.message_repo
                    .update_status(message.id, MessageStatus::Discard)
                    .await?;
                continue;
            }

            match self.notifier.deliver(&message).await {
                Ok(()) => {
                    self.message_repo
                        .update_status(message.id, MessageStatus::AlreadySent)
                        .await?;
                    counter!("leech_message_delivered_total").increment(1);
                }
                Err(e) => {
                    // 保持 Initial，下个轮询周期重试
                    error!("Failed to deliver message {}: {}", message.id, e);
                    counter!("leech_message_failed_total").increment(1);
                }
            }
        }

        Ok(())
    }
}
