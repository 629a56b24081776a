// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::leech_task::TaskPhase;
use crate::domain::models::queue_job::QueueJob;
use crate::domain::models::worker::{RateLimit, RatePeriod};
use crate::domain::repositories::leech_file_repository::LeechFileRepository;
use crate::infrastructure::control::redis_control::{ControlAction, RedisControlBus};
use crate::pipeline::download::DownloadPipeline;
use crate::pipeline::upload::UploadPipeline;
use crate::queue::task_queue::LeechQueue;
use crate::workers::lifecycle::WorkerLifecycle;
use futures::StreamExt;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// 拉取工作器
///
/// 一个工作进程对应一个实例：按 hostname 注册生命周期，
/// 运行 `concurrency` 个消费槽位，每个槽位同一时刻只执行一个作业。
/// 同时监听控制通道，响应限速与停机命令。
pub struct LeechWorker {
    hostname: String,
    queues: Vec<String>,
    concurrency: i32,
    queue: Arc<dyn LeechQueue>,
    file_repo: Arc<dyn LeechFileRepository>,
    lifecycle: Arc<dyn WorkerLifecycle>,
    download_pipeline: Arc<DownloadPipeline>,
    upload_pipeline: Arc<UploadPipeline>,
    control: RedisControlBus,
    limiter: parking_lot::RwLock<Option<Arc<DefaultDirectRateLimiter>>>,
    shutdown: AtomicBool,
}

impl LeechWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        hostname: String,
        queues: Vec<String>,
        concurrency: i32,
        queue: Arc<dyn LeechQueue>,
        file_repo: Arc<dyn LeechFileRepository>,
        lifecycle: Arc<dyn WorkerLifecycle>,
        download_pipeline: Arc<DownloadPipeline>,
        upload_pipeline: Arc<UploadPipeline>,
        control: RedisControlBus,
    ) -> Self {
        Self {
            hostname,
            queues,
            concurrency,
            queue,
            file_repo,
            lifecycle,
            download_pipeline,
            upload_pipeline,
            control,
            limiter: parking_lot::RwLock::new(None),
            shutdown: AtomicBool::new(false),
        }
    }

    /// 运行工作器直到收到停机命令
    pub async fn run(self: Arc<Self>) {
        self.lifecycle
            .on_setup(&self.hostname, &self.queues.join(","), self.concurrency)
            .await;

        let control_worker = self.clone();
        tokio::spawn(async move {
            if let Err(e) = control_worker.control_loop().await {
                error!("Control channel failed: {}", e);
            }
        });

        self.lifecycle.on_ready(&self.hostname).await;
        info!(
            "Worker {} ready, consuming queues [{}]",
            self.hostname,
            self.queues.join(",")
        );

        let mut slots = Vec::new();
        for slot in 0..self.concurrency.max(1) {
            let worker = self.clone();
            slots.push(tokio::spawn(async move {
                worker.slot_loop(slot).await;
            }));
        }

        for slot in slots {
            if let Err(e) = slot.await {
                error!("Worker slot terminated abnormally: {}", e);
            }
        }

        self.lifecycle.on_shutdown(&self.hostname).await;
        info!("Worker {} shut down", self.hostname);
    }

    /// 单个消费槽位的主循环
    async fn slot_loop(&self, slot: i32) {
        while !self.shutdown.load(Ordering::SeqCst) {
            let limiter = self.limiter.read().clone();
            if let Some(limiter) = limiter {
                limiter.until_ready().await;

                // 等待限速期间可能收到停机命令
                if self.shutdown.load(Ordering::SeqCst) {
                    break;
                }
            }

            match self.queue.claim_next(&self.queues, &self.hostname).await {
                Ok(Some(job)) => {
                    self.process_job(job).await;
                }
                Ok(None) => {
                    sleep(Duration::from_secs(1)).await;
                }
                Err(e) => {
                    error!("Slot {} failed to claim job: {}", slot, e);
                    sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    /// 执行单个作业
    ///
    /// 作业执行永远正常返回：文件层面的失败全部落在
    /// 文件记录的状态与原因里，队列不会因此触发自己的重试。
    async fn process_job(&self, job: QueueJob) {
        self.lifecycle.on_job_received(&job).await;

        let file = match self.file_repo.find_by_id(job.file_id).await {
            Ok(Some(file)) => file,
            Ok(None) => {
                warn!("File {} not found for job {}", job.file_id, job.id);
                self.advance_chain(&job).await;
                return;
            }
            Err(e) => {
                error!("Failed to load file {} for job {}: {}", job.file_id, job.id, e);
                self.advance_chain(&job).await;
                return;
            }
        };

        let mut file = file;
        self.lifecycle.on_job_prerun(&job, &mut file).await;

        let result = match job.phase {
            TaskPhase::Download => self.download_pipeline.execute(file).await,
            TaskPhase::Upload => self.upload_pipeline.execute(file).await,
        };

        self.lifecycle.on_job_success(&job, &result).await;
        self.advance_chain(&job).await;
    }

    async fn advance_chain(&self, job: &QueueJob) {
        if let Err(e) = self.queue.complete(job).await {
            error!("Failed to complete job {}: {}", job.id, e);
        }
    }

    /// 控制通道监听循环
    async fn control_loop(&self) -> anyhow::Result<()> {
        let mut pubsub = self.control.subscribe(&self.hostname).await?;
        let mut stream = pubsub.on_message();

        while let Some(message) = stream.next().await {
            let raw: String = match message.get_payload() {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("Discarding unreadable control message: {}", e);
                    continue;
                }
            };

            let command: crate::infrastructure::control::redis_control::ControlCommand =
                match serde_json::from_str(&raw) {
                    Ok(command) => command,
                    Err(e) => {
                        warn!("Discarding malformed control message: {}", e);
                        continue;
                    }
                };

            let ok = match command.action {
                ControlAction::RateLimit { task_name, rate } => {
                    info!(
                        "Applying rate limit {:?} for task {} on {}",
                        rate, task_name, self.hostname
                    );
                    self.apply_rate_limit(rate)
                }
                ControlAction::Shutdown => {
                    info!("Shutdown command received on {}", self.hostname);
                    self.shutdown.store(true, Ordering::SeqCst);
                    true
                }
            };

            if let Err(e) = self.control.acknowledge(command.id, ok).await {
                error!("Failed to acknowledge control command: {}", e);
            }
        }

        Ok(())
    }

    /// 替换当前限速器，None 表示解除限制
    fn apply_rate_limit(&self, rate: Option<RateLimit>) -> bool {
        let limiter = match rate {
            Some(rate) => match quota_for(rate) {
                Some(quota) => Some(Arc::new(RateLimiter::direct(quota))),
                None => return false,
            },
            None => None,
        };

        *self.limiter.write() = limiter;
        true
    }
}

/// 把速率限制换算为 governor 配额
fn quota_for(rate: RateLimit) -> Option<Quota> {
    let amount = NonZeroU32::new(rate.amount)?;

    Some(match rate.period {
        RatePeriod::Second => Quota::per_second(amount),
        RatePeriod::Minute => Quota::per_minute(amount),
        RatePeriod::Hour => Quota::per_hour(amount),
    })
}
