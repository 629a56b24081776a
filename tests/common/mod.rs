// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 测试共用的内存实现：仓库、队列作业存储与作业消费循环

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use leechrs::domain::models::leech_file::{LeechFile, LeechFileStatus};
use leechrs::domain::models::leech_message::{LeechMessage, MessageStatus};
use leechrs::domain::models::leech_task::{LeechTask, LeechTaskStatus, TaskPhase};
use leechrs::domain::models::queue_job::{QueueJob, QueueJobStatus};
use leechrs::domain::models::worker::{RateLimit, Worker, WorkerStatus};
use leechrs::domain::repositories::leech_file_repository::LeechFileRepository;
use leechrs::domain::repositories::leech_message_repository::LeechMessageRepository;
use leechrs::domain::repositories::leech_task_repository::LeechTaskRepository;
use leechrs::domain::repositories::queue_job_repository::QueueJobRepository;
use leechrs::domain::repositories::worker_repository::WorkerRepository;
use leechrs::domain::repositories::RepositoryError;
use leechrs::pipeline::download::DownloadPipeline;
use leechrs::pipeline::upload::UploadPipeline;
use leechrs::queue::task_queue::LeechQueue;
use leechrs::workers::lifecycle::WorkerLifecycle;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// 内存文件仓库
#[derive(Default)]
pub struct InMemoryFileRepo {
    pub files: Mutex<Vec<LeechFile>>,
}

impl InMemoryFileRepo {
    pub fn get(&self, id: Uuid) -> Option<LeechFile> {
        self.files.lock().unwrap().iter().find(|f| f.id == id).cloned()
    }
}

#[async_trait]
impl LeechFileRepository for InMemoryFileRepo {
    async fn create(&self, file: &LeechFile) -> Result<LeechFile, RepositoryError> {
        self.files.lock().unwrap().push(file.clone());
        Ok(file.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<LeechFile>, RepositoryError> {
        Ok(self.get(id))
    }

    async fn update(&self, file: &LeechFile) -> Result<LeechFile, RepositoryError> {
        let mut files = self.files.lock().unwrap();
        let slot = files
            .iter_mut()
            .find(|f| f.id == file.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = file.clone();
        Ok(file.clone())
    }

    async fn find_duplicate(
        &self,
        content_hash: &str,
        since: DateTime<FixedOffset>,
    ) -> Result<Option<LeechFile>, RepositoryError> {
        let files = self.files.lock().unwrap();
        let mut matches: Vec<&LeechFile> = files
            .iter()
            .filter(|f| {
                f.content_hash.as_deref() == Some(content_hash)
                    && f.status == LeechFileStatus::DownloadSuccess
                    && f.upload_status == LeechFileStatus::UploadSuccess
                    && f.created_at >= since
            })
            .collect();
        matches.sort_by_key(|f| std::cmp::Reverse(f.created_at));
        Ok(matches.first().map(|f| (*f).clone()))
    }

    async fn find_by_status(
        &self,
        status: LeechFileStatus,
        since: DateTime<FixedOffset>,
    ) -> Result<Vec<LeechFile>, RepositoryError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.status == status && f.created_at >= since)
            .cloned()
            .collect())
    }

    async fn find_by_upload_status(
        &self,
        status: LeechFileStatus,
        since: DateTime<FixedOffset>,
    ) -> Result<Vec<LeechFile>, RepositoryError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.upload_status == status && f.created_at >= since)
            .cloned()
            .collect())
    }

    async fn count_by_status(&self, status: LeechFileStatus) -> Result<u64, RepositoryError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.status == status)
            .count() as u64)
    }

    async fn count_by_upload_status(
        &self,
        status: LeechFileStatus,
    ) -> Result<u64, RepositoryError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.upload_status == status)
            .count() as u64)
    }
}

/// 内存执行记录仓库
#[derive(Default)]
pub struct InMemoryTaskRepo {
    pub tasks: Mutex<Vec<LeechTask>>,
}

#[async_trait]
impl LeechTaskRepository for InMemoryTaskRepo {
    async fn create(&self, task: &LeechTask) -> Result<LeechTask, RepositoryError> {
        self.tasks.lock().unwrap().push(task.clone());
        Ok(task.clone())
    }

    async fn mark_done(&self, job_id: Uuid) -> Result<(), RepositoryError> {
        let mut tasks = self.tasks.lock().unwrap();
        for task in tasks.iter_mut().filter(|t| t.job_id == job_id) {
            task.status = LeechTaskStatus::Done;
            task.updated_at = Some(Utc::now().into());
        }
        Ok(())
    }

    async fn find_by_status_and_phase(
        &self,
        status: LeechTaskStatus,
        phase: TaskPhase,
    ) -> Result<Vec<LeechTask>, RepositoryError> {
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.status == status && t.phase == phase)
            .cloned()
            .collect())
    }

    async fn mark_terminated(&self, ids: &[Uuid]) -> Result<u64, RepositoryError> {
        let mut tasks = self.tasks.lock().unwrap();
        let mut affected = 0;
        for task in tasks.iter_mut().filter(|t| ids.contains(&t.id)) {
            task.status = LeechTaskStatus::Terminated;
            affected += 1;
        }
        Ok(affected)
    }

    async fn count_by_status_and_phase(
        &self,
        status: LeechTaskStatus,
        phase: TaskPhase,
    ) -> Result<u64, RepositoryError> {
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.status == status && t.phase == phase)
            .count() as u64)
    }
}

/// 内存通知仓库
#[derive(Default)]
pub struct InMemoryMessageRepo {
    pub messages: Mutex<Vec<LeechMessage>>,
}

#[async_trait]
impl LeechMessageRepository for InMemoryMessageRepo {
    async fn create(&self, message: &LeechMessage) -> Result<LeechMessage, RepositoryError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(message.clone())
    }

    async fn find_pending(&self, limit: u64) -> Result<Vec<LeechMessage>, RepositoryError> {
        let mut pending: Vec<LeechMessage> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.status == MessageStatus::Initial)
            .cloned()
            .collect();
        pending.sort_by_key(|m| m.created_at);
        pending.truncate(limit as usize);
        Ok(pending)
    }

    async fn update_status(&self, id: Uuid, status: MessageStatus) -> Result<(), RepositoryError> {
        let mut messages = self.messages.lock().unwrap();
        let message = messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(RepositoryError::NotFound)?;
        message.status = status;
        Ok(())
    }
}

/// 内存工作器仓库
#[derive(Default)]
pub struct InMemoryWorkerRepo {
    pub workers: Mutex<HashMap<String, Worker>>,
}

#[async_trait]
impl WorkerRepository for InMemoryWorkerRepo {
    async fn upsert(&self, worker: &Worker) -> Result<(), RepositoryError> {
        self.workers
            .lock()
            .unwrap()
            .insert(worker.hostname.clone(), worker.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        hostname: &str,
        status: WorkerStatus,
    ) -> Result<(), RepositoryError> {
        if let Some(worker) = self.workers.lock().unwrap().get_mut(hostname) {
            worker.status = status;
            worker.updated_at = Some(Utc::now().into());
        }
        Ok(())
    }

    async fn update_rate_limit(
        &self,
        hostname: &str,
        rate_limit: Option<RateLimit>,
    ) -> Result<(), RepositoryError> {
        if let Some(worker) = self.workers.lock().unwrap().get_mut(hostname) {
            worker.rate_limit = rate_limit;
            worker.updated_at = Some(Utc::now().into());
        }
        Ok(())
    }

    async fn find_by_hostname(&self, hostname: &str) -> Result<Option<Worker>, RepositoryError> {
        Ok(self.workers.lock().unwrap().get(hostname).cloned())
    }

    async fn find_by_status(&self, status: WorkerStatus) -> Result<Vec<Worker>, RepositoryError> {
        Ok(self
            .workers
            .lock()
            .unwrap()
            .values()
            .filter(|w| w.status == status)
            .cloned()
            .collect())
    }
}

/// 内存队列作业仓库，保持插入顺序
#[derive(Default)]
pub struct InMemoryJobRepo {
    pub jobs: Mutex<Vec<QueueJob>>,
}

#[async_trait]
impl QueueJobRepository for InMemoryJobRepo {
    async fn create(&self, job: &QueueJob) -> Result<QueueJob, RepositoryError> {
        self.jobs.lock().unwrap().push(job.clone());
        Ok(job.clone())
    }

    async fn claim_next(
        &self,
        queues: &[String],
        lock_token: &str,
    ) -> Result<Option<QueueJob>, RepositoryError> {
        let mut jobs = self.jobs.lock().unwrap();
        let candidate = jobs.iter_mut().find(|job| {
            queues.contains(&job.queue) && job.status == QueueJobStatus::Queued
        });

        if let Some(job) = candidate {
            job.status = QueueJobStatus::Active;
            job.lock_token = Some(lock_token.to_string());
            job.updated_at = Some(Utc::now().into());
            return Ok(Some(job.clone()));
        }

        Ok(None)
    }

    async fn mark_done(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.iter_mut().find(|j| j.id == id) {
            job.status = QueueJobStatus::Done;
            job.updated_at = Some(Utc::now().into());
        }
        Ok(())
    }

    async fn find_queued_by_phase(
        &self,
        phase: TaskPhase,
    ) -> Result<Vec<QueueJob>, RepositoryError> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .filter(|j| j.phase == phase && j.status == QueueJobStatus::Queued)
            .cloned()
            .collect())
    }

    async fn mark_revoked(&self, ids: &[Uuid]) -> Result<u64, RepositoryError> {
        let mut jobs = self.jobs.lock().unwrap();
        let mut affected = 0;
        for job in jobs
            .iter_mut()
            .filter(|j| ids.contains(&j.id) && j.status == QueueJobStatus::Queued)
        {
            job.status = QueueJobStatus::Revoked;
            affected += 1;
        }
        Ok(affected)
    }

    async fn count_queued(&self, queue: &str) -> Result<u64, RepositoryError> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .filter(|j| j.queue == queue && j.status == QueueJobStatus::Queued)
            .count() as u64)
    }
}

/// 模拟工作器行为，把队列排空
///
/// 与真实工作槽位相同的处理顺序：接收登记 → 预运行状态翻转 →
/// 流水线执行 → 结果落库与通知 → 推进任务链。
pub async fn drain_queue(
    queue: &dyn LeechQueue,
    queues: &[String],
    lifecycle: &dyn WorkerLifecycle,
    file_repo: &InMemoryFileRepo,
    download_pipeline: &DownloadPipeline,
    upload_pipeline: &UploadPipeline,
) {
    while let Some(job) = queue.claim_next(queues, "test-worker").await.unwrap() {
        lifecycle.on_job_received(&job).await;

        let Some(mut file) = file_repo.get(job.file_id) else {
            queue.complete(&job).await.unwrap();
            continue;
        };

        lifecycle.on_job_prerun(&job, &mut file).await;

        let result = match job.phase {
            TaskPhase::Download => download_pipeline.execute(file).await,
            TaskPhase::Upload => upload_pipeline.execute(file).await,
        };

        lifecycle.on_job_success(&job, &result).await;
        queue.complete(&job).await.unwrap();
    }
}

/// 测试注册表使用的上传适配器：总是成功，不做实际传输
pub struct AcceptingUploader;

#[async_trait]
impl leechrs::adaptors::traits::Uploader for AcceptingUploader {
    fn name(&self) -> &'static str {
        "accepting"
    }

    fn matches(&self, _sync_tool: leechrs::domain::models::tool::SyncTool) -> bool {
        true
    }

    async fn transfer(&self, mut file: LeechFile) -> anyhow::Result<LeechFile> {
        file.upload_status = LeechFileStatus::UploadSuccess;
        Ok(file)
    }
}

/// 所有工具队列名，供测试消费循环绑定
pub fn all_queues() -> Vec<String> {
    use leechrs::domain::models::tool::{LeechTool, SyncTool};
    use leechrs::queue::{queue_name, FILE_DOWNLOAD_QUEUE, FILE_SYNC_QUEUE};

    LeechTool::all()
        .iter()
        .map(|tool| queue_name(FILE_DOWNLOAD_QUEUE, tool))
        .chain(
            SyncTool::all()
                .iter()
                .map(|tool| queue_name(FILE_SYNC_QUEUE, tool)),
        )
        .collect()
}
