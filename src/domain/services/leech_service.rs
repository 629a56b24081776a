// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::adaptors::AdaptorRegistry;
use crate::domain::models::leech_file::{LeechFile, LeechFileStatus};
use crate::domain::models::leech_task::{LeechTaskStatus, TaskPhase};
use crate::domain::models::queue_job::JobSignature;
use crate::domain::models::tool::{LeechTool, SyncTool};
use crate::domain::models::worker::WorkerStatus;
use crate::domain::repositories::leech_file_repository::LeechFileRepository;
use crate::domain::repositories::leech_task_repository::LeechTaskRepository;
use crate::domain::repositories::worker_repository::WorkerRepository;
use crate::queue::task_queue::LeechQueue;
use crate::queue::{queue_name, FILE_DOWNLOAD_QUEUE, FILE_SYNC_QUEUE};
use crate::utils::errors::WorkerError;
use chrono::{Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// 任务链编排服务
///
/// 链接提交的入口：解析产出文件记录，补全同步信息与去重键，
/// 持久化后提交下载→上传两步任务链。同时承载操作者控制操作：
/// 重试、撤销与聚合统计。链式提交即发即忘，不等待执行结果。
pub struct LeechService {
    file_repo: Arc<dyn LeechFileRepository>,
    task_repo: Arc<dyn LeechTaskRepository>,
    worker_repo: Arc<dyn WorkerRepository>,
    queue: Arc<dyn LeechQueue>,
    registry: Arc<AdaptorRegistry>,
    download_root: String,
    failed_task_expire_after_days: i64,
}

/// 撤销操作结果
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TerminateSummary {
    /// 被撤销的排队作业数
    pub revoked_jobs: u64,
    /// 被标记为 Terminated 的执行记录数
    pub terminated_tasks: u64,
}

/// 单个队列的聚合视图
#[derive(Debug, Clone, Serialize)]
pub struct QueueStats {
    /// 队列名
    pub queue: String,
    /// 排队中的作业数
    pub queued_jobs: u64,
    /// Ready 工作器在该队列上的并发总和
    pub ready_concurrency: i32,
}

/// 聚合统计
#[derive(Debug, Clone, Serialize)]
pub struct LeechStats {
    /// 各下载终态的文件数
    pub download_success: u64,
    pub download_fail: u64,
    pub skip_download: u64,
    /// 各上传终态的文件数
    pub upload_success: u64,
    pub upload_fail: u64,
    pub skip_upload: u64,
    /// 已接收未完成的执行记录数，按阶段
    pub pending_download_tasks: u64,
    pub pending_upload_tasks: u64,
    /// 每个队列的排队作业与就绪并发
    pub queues: Vec<QueueStats>,
}

impl LeechService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        file_repo: Arc<dyn LeechFileRepository>,
        task_repo: Arc<dyn LeechTaskRepository>,
        worker_repo: Arc<dyn WorkerRepository>,
        queue: Arc<dyn LeechQueue>,
        registry: Arc<AdaptorRegistry>,
        download_root: String,
        failed_task_expire_after_days: i64,
    ) -> Self {
        Self {
            file_repo,
            task_repo,
            worker_repo,
            queue,
            registry,
            download_root,
            failed_task_expire_after_days,
        }
    }

    /// 提交一批链接
    ///
    /// 每个链接经注册表解析为零个或多个文件；单个文件的
    /// 持久化或入队失败不影响同批其他文件。返回创建的文件数。
    pub async fn submit_links(
        &self,
        links: &[String],
        sync_tool: SyncTool,
        sync_path: &str,
    ) -> u64 {
        let mut created = 0;

        for link in links {
            let files = self.registry.execute_parse(link).await;

            for mut file in files {
                file.sync_tool = Some(sync_tool);
                file.sync_path = Some(sync_path.to_string());
                file.seal(&self.download_root);

                match self.file_repo.create(&file).await {
                    Ok(_) => {
                        if let Err(e) = self.create_pending_chain(&file).await {
                            error!("Failed to submit chain for file {}: {}", file.id, e);
                            continue;
                        }
                        created += 1;
                    }
                    Err(e) => {
                        error!("Failed to persist file from link {}: {}", link, e);
                    }
                }
            }
        }

        info!("{} leech tasks have been created", created);
        created
    }

    /// 提交一个文件的下载→上传任务链
    ///
    /// 上传步骤无条件跟随下载步骤，是否做实际工作
    /// 由上传流水线的前置条件阶段决定
    pub async fn create_pending_chain(&self, file: &LeechFile) -> Result<(), WorkerError> {
        let signatures = Self::chain_signatures(file);

        self.queue
            .submit_chain(signatures)
            .await
            .map_err(|e| WorkerError::QueueError(e.to_string()))?;

        Ok(())
    }

    /// 派生文件任务链的两步签名
    fn chain_signatures(file: &LeechFile) -> Vec<JobSignature> {
        let sync_tool = file
            .sync_tool
            .map(|tool| tool.to_string())
            .unwrap_or_else(|| "UNKNOWN".to_string());

        vec![
            JobSignature {
                phase: TaskPhase::Download,
                queue: queue_name(FILE_DOWNLOAD_QUEUE, file.tool),
                file_id: file.id,
            },
            JobSignature {
                phase: TaskPhase::Upload,
                queue: queue_name(FILE_SYNC_QUEUE, sync_tool),
                file_id: file.id,
            },
        ]
    }

    /// 重试保留窗口内处于指定失败终态的全部文件
    ///
    /// 两条状态机重置为 Initial 后重新提交完整任务链，
    /// 不保留任何部分进度。返回重试的文件数。
    pub async fn retry_failed(&self, status: LeechFileStatus) -> Result<u64, WorkerError> {
        let since = Utc::now() - Duration::days(self.failed_task_expire_after_days);

        let files = if status == LeechFileStatus::DownloadFail {
            self.file_repo.find_by_status(status, since.into()).await
        } else {
            self.file_repo
                .find_by_upload_status(status, since.into())
                .await
        }
        .map_err(|e| WorkerError::RepositoryError(e.to_string()))?;

        let mut retried = 0;
        for mut file in files {
            file.reset_for_retry();

            if let Err(e) = self.file_repo.update(&file).await {
                error!("Failed to reset file {}: {}", file.id, e);
                continue;
            }

            if let Err(e) = self.create_pending_chain(&file).await {
                error!("Failed to resubmit chain for file {}: {}", file.id, e);
                continue;
            }

            retried += 1;
        }

        Ok(retried)
    }

    /// 重试单个文件
    ///
    /// 文件不存在或已超出保留窗口时返回 false
    pub async fn retry_single(&self, id: Uuid) -> Result<bool, WorkerError> {
        let Some(mut file) = self
            .file_repo
            .find_by_id(id)
            .await
            .map_err(|e| WorkerError::RepositoryError(e.to_string()))?
        else {
            return Ok(false);
        };

        let cutoff = Utc::now() - Duration::days(self.failed_task_expire_after_days);
        if file.created_at < cutoff {
            return Ok(false);
        }

        file.reset_for_retry();
        self.file_repo
            .update(&file)
            .await
            .map_err(|e| WorkerError::RepositoryError(e.to_string()))?;

        self.create_pending_chain(&file).await?;
        Ok(true)
    }

    /// 撤销指定阶段所有待处理作业
    ///
    /// 排队中的作业被标记 Revoked，已接收未完成的执行记录
    /// 被标记 Terminated；已被工作器认领执行中的作业不会被打断。
    pub async fn terminate_pending(
        &self,
        phase: TaskPhase,
    ) -> Result<TerminateSummary, WorkerError> {
        let revoked = self
            .queue
            .revoke_pending(phase)
            .await
            .map_err(|e| WorkerError::QueueError(e.to_string()))?;

        let tasks = self
            .task_repo
            .find_by_status_and_phase(LeechTaskStatus::Initial, phase)
            .await
            .map_err(|e| WorkerError::RepositoryError(e.to_string()))?;

        let task_ids: Vec<Uuid> = tasks.iter().map(|task| task.id).collect();
        let terminated = if task_ids.is_empty() {
            0
        } else {
            self.task_repo
                .mark_terminated(&task_ids)
                .await
                .map_err(|e| WorkerError::RepositoryError(e.to_string()))?
        };

        Ok(TerminateSummary {
            revoked_jobs: revoked.len() as u64,
            terminated_tasks: terminated,
        })
    }

    /// 聚合统计：终态文件数、待处理执行记录数与每队列并发
    pub async fn stats(&self) -> Result<LeechStats, WorkerError> {
        let count_status = |status| self.file_repo.count_by_status(status);
        let count_upload = |status| self.file_repo.count_by_upload_status(status);

        let download_success = count_status(LeechFileStatus::DownloadSuccess)
            .await
            .map_err(|e| WorkerError::RepositoryError(e.to_string()))?;
        let download_fail = count_status(LeechFileStatus::DownloadFail)
            .await
            .map_err(|e| WorkerError::RepositoryError(e.to_string()))?;
        let skip_download = count_status(LeechFileStatus::SkipDownload)
            .await
            .map_err(|e| WorkerError::RepositoryError(e.to_string()))?;
        let upload_success = count_upload(LeechFileStatus::UploadSuccess)
            .await
            .map_err(|e| WorkerError::RepositoryError(e.to_string()))?;
        let upload_fail = count_upload(LeechFileStatus::UploadFail)
            .await
            .map_err(|e| WorkerError::RepositoryError(e.to_string()))?;
        let skip_upload = count_upload(LeechFileStatus::SkipUpload)
            .await
            .map_err(|e| WorkerError::RepositoryError(e.to_string()))?;

        let pending_download_tasks = self
            .task_repo
            .count_by_status_and_phase(LeechTaskStatus::Initial, TaskPhase::Download)
            .await
            .map_err(|e| WorkerError::RepositoryError(e.to_string()))?;
        let pending_upload_tasks = self
            .task_repo
            .count_by_status_and_phase(LeechTaskStatus::Initial, TaskPhase::Upload)
            .await
            .map_err(|e| WorkerError::RepositoryError(e.to_string()))?;

        let ready_workers = self
            .worker_repo
            .find_by_status(WorkerStatus::Ready)
            .await
            .map_err(|e| WorkerError::RepositoryError(e.to_string()))?;

        let mut queues = Vec::new();
        let download_queues = LeechTool::all()
            .iter()
            .map(|tool| queue_name(FILE_DOWNLOAD_QUEUE, tool));
        let upload_queues = SyncTool::all()
            .iter()
            .map(|tool| queue_name(FILE_SYNC_QUEUE, tool));

        for queue in download_queues.chain(upload_queues) {
            let queued_jobs = self
                .queue
                .count_queued(&queue)
                .await
                .map_err(|e| WorkerError::QueueError(e.to_string()))?;

            let ready_concurrency = ready_workers
                .iter()
                .filter(|worker| worker.queue.split(',').any(|bound| bound == queue))
                .map(|worker| worker.concurrency)
                .sum();

            queues.push(QueueStats {
                queue,
                queued_jobs,
                ready_concurrency,
            });
        }

        Ok(LeechStats {
            download_success,
            download_fail,
            skip_download,
            upload_success,
            upload_fail,
            skip_upload,
            pending_download_tasks,
            pending_upload_tasks,
            queues,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_signatures_order_download_then_upload() {
        let mut file = LeechFile::new("https://example.com/f/abc".into(), LeechTool::Pixeldrain);
        file.sync_tool = Some(SyncTool::Rclone);

        let signatures = LeechService::chain_signatures(&file);

        assert_eq!(signatures.len(), 2);
        assert_eq!(signatures[0].phase, TaskPhase::Download);
        assert_eq!(signatures[0].queue, "FILE_DOWNLOAD_QUEUE@PIXELDRAIN");
        assert_eq!(signatures[1].phase, TaskPhase::Upload);
        assert_eq!(signatures[1].queue, "FILE_SYNC_QUEUE@RCLONE");
        assert!(signatures.iter().all(|s| s.file_id == file.id));
    }
}
