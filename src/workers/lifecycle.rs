// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::leech_file::{LeechFile, LeechFileStatus};
use crate::domain::models::leech_message::LeechMessage;
use crate::domain::models::leech_task::{LeechTask, TaskPhase};
use crate::domain::models::queue_job::QueueJob;
use crate::domain::models::worker::{Worker, WorkerStatus};
use crate::domain::repositories::leech_file_repository::LeechFileRepository;
use crate::domain::repositories::leech_message_repository::LeechMessageRepository;
use crate::domain::repositories::leech_task_repository::LeechTaskRepository;
use crate::domain::repositories::worker_repository::WorkerRepository;
use crate::utils::format::format_result_message;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::error;

/// 工作器生命周期接口
///
/// 队列运行时在固定时机调用这些方法，核心流水线逻辑
/// 不直接注册任何框架回调。所有方法吸收自身错误：
/// 生命周期记账失败不应中断作业执行。
#[async_trait]
pub trait WorkerLifecycle: Send + Sync {
    /// 工作进程启动，注册绑定队列与并发数
    async fn on_setup(&self, hostname: &str, queue: &str, concurrency: i32);

    /// 工作进程可以接收作业
    async fn on_ready(&self, hostname: &str);

    /// 工作进程终止
    async fn on_shutdown(&self, hostname: &str);

    /// 作业被工作器接收，登记执行记录
    async fn on_job_received(&self, job: &QueueJob);

    /// 作业即将执行，文件状态翻转为对应的进行中状态并持久化
    async fn on_job_prerun(&self, job: &QueueJob, file: &mut LeechFile);

    /// 作业处理函数已返回，持久化最终状态并产生通知
    async fn on_job_success(&self, job: &QueueJob, file: &LeechFile);
}

/// 生命周期跟踪器
///
/// 把生命周期信号落库：Worker 记录按 hostname 覆盖更新，
/// 作业接收时创建 LeechTask，执行结束时标记 Done 并生成 LeechMessage。
pub struct LifecycleTracker {
    worker_repo: Arc<dyn WorkerRepository>,
    task_repo: Arc<dyn LeechTaskRepository>,
    file_repo: Arc<dyn LeechFileRepository>,
    message_repo: Arc<dyn LeechMessageRepository>,
}

impl LifecycleTracker {
    pub fn new(
        worker_repo: Arc<dyn WorkerRepository>,
        task_repo: Arc<dyn LeechTaskRepository>,
        file_repo: Arc<dyn LeechFileRepository>,
        message_repo: Arc<dyn LeechMessageRepository>,
    ) -> Self {
        Self {
            worker_repo,
            task_repo,
            file_repo,
            message_repo,
        }
    }
}

#[async_trait]
impl WorkerLifecycle for LifecycleTracker {
    async fn on_setup(&self, hostname: &str, queue: &str, concurrency: i32) {
        let worker = Worker::setup(hostname.to_string(), queue.to_string(), concurrency);

        if let Err(e) = self.worker_repo.upsert(&worker).await {
            error!("Failed to record worker setup for {}: {}", hostname, e);
        }
    }

    async fn on_ready(&self, hostname: &str) {
        if let Err(e) = self
            .worker_repo
            .update_status(hostname, WorkerStatus::Ready)
            .await
        {
            error!("Failed to record worker ready for {}: {}", hostname, e);
        }
    }

    async fn on_shutdown(&self, hostname: &str) {
        if let Err(e) = self
            .worker_repo
            .update_status(hostname, WorkerStatus::Shutdown)
            .await
        {
            error!("Failed to record worker shutdown for {}: {}", hostname, e);
        }
    }

    async fn on_job_received(&self, job: &QueueJob) {
        let task = LeechTask::received(job.id, job.file_id, job.phase);

        if let Err(e) = self.task_repo.create(&task).await {
            error!("Failed to record task for job {}: {}", job.id, e);
        }
    }

    async fn on_job_prerun(&self, job: &QueueJob, file: &mut LeechFile) {
        match job.phase {
            TaskPhase::Download => file.status = LeechFileStatus::Downloading,
            TaskPhase::Upload => file.upload_status = LeechFileStatus::Uploading,
        }
        file.updated_at = Some(Utc::now().into());

        if let Err(e) = self.file_repo.update(file).await {
            error!("Failed to persist prerun status for file {}: {}", file.id, e);
        }
    }

    async fn on_job_success(&self, job: &QueueJob, file: &LeechFile) {
        if let Err(e) = self.file_repo.update(file).await {
            error!("Failed to persist final state for file {}: {}", file.id, e);
            return;
        }

        if let Err(e) = self.task_repo.mark_done(job.id).await {
            error!("Failed to mark task done for job {}: {}", job.id, e);
        }

        let (phase_status, reason, is_success) = match job.phase {
            TaskPhase::Download => (
                file.status,
                file.reason.as_deref(),
                file.status == LeechFileStatus::DownloadSuccess,
            ),
            TaskPhase::Upload => (
                file.upload_status,
                file.upload_reason.as_deref(),
                file.upload_status == LeechFileStatus::UploadSuccess,
            ),
        };

        let content = format_result_message(
            file.name.as_deref(),
            file.size,
            is_success,
            job.phase,
            phase_status,
            reason,
        );

        let message = LeechMessage::pending(job.phase, file.id, content, phase_status);

        if let Err(e) = self.message_repo.create(&message).await {
            error!("Failed to record message for file {}: {}", file.id, e);
        }
    }
}
