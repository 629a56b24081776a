// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::leech_task::TaskPhase;
use crate::domain::models::worker::{RateLimit, WorkerStatus};
use crate::domain::repositories::worker_repository::WorkerRepository;
use crate::infrastructure::control::redis_control::ControlAction;
use crate::infrastructure::control::ControlChannel;
use crate::queue::{queue_name, FILE_DOWNLOAD_QUEUE, FILE_SYNC_QUEUE};
use crate::utils::errors::WorkerError;
use crate::workers::{FILE_LEECH_WORKER, FILE_SYNC_WORKER};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

/// 工作进程生成器特质
///
/// 外部进程生成调用的抽象，便于测试替换
pub trait WorkerSpawner: Send + Sync {
    /// 启动一个新的工作进程
    fn spawn(&self, hostname: &str, queues: &str, concurrency: i32) -> anyhow::Result<()>;
}

/// 以子进程方式启动工作器
///
/// 重新执行当前二进制的 worker 模式，
/// 工作器参数经 LEECHRS_WORKER_* 环境变量传入
pub struct ProcessSpawner;

impl WorkerSpawner for ProcessSpawner {
    fn spawn(&self, hostname: &str, queues: &str, concurrency: i32) -> anyhow::Result<()> {
        let exe = std::env::current_exe()?;

        std::process::Command::new(exe)
            .arg("worker")
            .env("LEECHRS_WORKER_HOSTNAME", hostname)
            .env("LEECHRS_WORKER_QUEUES", queues)
            .env("LEECHRS_WORKER_CONCURRENCY", concurrency.to_string())
            .spawn()?;

        Ok(())
    }
}

/// 工作器伸缩结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleOutcome {
    /// 新工作器已启动
    Started,
    /// 工作器已停机
    Stopped,
    /// 工作器已按新并发数重启
    Resized,
}

/// 工作管理器
///
/// 负责工作进程的启动、停机、并发调整与速率限制下发。
/// 并发调整建立在停机加重启之上：先发停机命令，
/// 在限定时间内等 Worker 记录进入 Shutdown，再按新并发数重新生成进程。
pub struct WorkerManager {
    worker_repo: Arc<dyn WorkerRepository>,
    control: Arc<dyn ControlChannel>,
    spawner: Arc<dyn WorkerSpawner>,
    status_timeout: Duration,
}

impl WorkerManager {
    pub fn new(
        worker_repo: Arc<dyn WorkerRepository>,
        control: Arc<dyn ControlChannel>,
        spawner: Arc<dyn WorkerSpawner>,
        status_timeout: Duration,
    ) -> Self {
        Self {
            worker_repo,
            control,
            spawner,
            status_timeout,
        }
    }

    /// 派生指定 (阶段, 工具) 工作器的主机名
    ///
    /// 形如 `{phase-host}@{queue-base}@{tool}`
    pub fn hostname_for(phase: TaskPhase, tool: &str) -> String {
        match phase {
            TaskPhase::Download => {
                format!("{}@{}@{}", FILE_LEECH_WORKER, FILE_DOWNLOAD_QUEUE, tool)
            }
            TaskPhase::Upload => format!("{}@{}@{}", FILE_SYNC_WORKER, FILE_SYNC_QUEUE, tool),
        }
    }

    fn queue_for(phase: TaskPhase, tool: &str) -> String {
        match phase {
            TaskPhase::Download => queue_name(FILE_DOWNLOAD_QUEUE, tool),
            TaskPhase::Upload => queue_name(FILE_SYNC_QUEUE, tool),
        }
    }

    /// 调整 (阶段, 工具) 工作器的并发数
    ///
    /// 并发数为 0 时仅停机。对尚未出现过的主机名直接生成新进程。
    pub async fn scale_worker(
        &self,
        phase: TaskPhase,
        tool: &str,
        concurrency: i32,
    ) -> Result<ScaleOutcome, WorkerError> {
        let hostname = Self::hostname_for(phase, tool);
        let queues = Self::queue_for(phase, tool);

        let existing = self
            .worker_repo
            .find_by_hostname(&hostname)
            .await
            .map_err(|e| WorkerError::RepositoryError(e.to_string()))?;

        let running = match existing {
            Some(worker) if worker.status != WorkerStatus::Shutdown => worker,
            _ => {
                if concurrency == 0 {
                    return Ok(ScaleOutcome::Stopped);
                }

                self.spawn_and_wait(&hostname, &queues, concurrency).await?;
                return Ok(ScaleOutcome::Started);
            }
        };

        if running.status != WorkerStatus::Ready {
            return Err(WorkerError::InternalError(format!(
                "Worker {} is not ready",
                hostname
            )));
        }

        match self
            .control
            .send(&hostname, ControlAction::Shutdown, self.status_timeout)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                return Err(WorkerError::ControlError(format!(
                    "Worker {} did not accept shutdown",
                    hostname
                )))
            }
            Err(e) => return Err(WorkerError::ControlError(e.to_string())),
        }

        if !self
            .wait_for_status(&hostname, WorkerStatus::Shutdown)
            .await
        {
            return Err(WorkerError::InternalError(format!(
                "Worker {} did not reach SHUTDOWN in time",
                hostname
            )));
        }

        if concurrency == 0 {
            info!("Worker {} stopped", hostname);
            return Ok(ScaleOutcome::Stopped);
        }

        self.spawn_and_wait(&hostname, &queues, concurrency).await?;
        info!("Worker {} resized to {}", hostname, concurrency);
        Ok(ScaleOutcome::Resized)
    }

    /// 启动进程级默认工作器
    ///
    /// 每个阶段一个进程，绑定该阶段全部工具队列
    pub fn start_boot_workers(
        &self,
        leech_concurrency: i32,
        sync_concurrency: i32,
    ) -> Result<(), WorkerError> {
        use crate::domain::models::tool::{LeechTool, SyncTool};
        use crate::queue::generate_queue_names;

        let download_hostname = format!("{}@{}", FILE_LEECH_WORKER, FILE_DOWNLOAD_QUEUE);
        let download_queues = generate_queue_names(FILE_DOWNLOAD_QUEUE, LeechTool::all());
        self.spawner
            .spawn(&download_hostname, &download_queues, leech_concurrency)
            .map_err(|e| WorkerError::InternalError(e.to_string()))?;

        let upload_hostname = format!("{}@{}", FILE_SYNC_WORKER, FILE_SYNC_QUEUE);
        let upload_queues = generate_queue_names(FILE_SYNC_QUEUE, SyncTool::all());
        self.spawner
            .spawn(&upload_hostname, &upload_queues, sync_concurrency)
            .map_err(|e| WorkerError::InternalError(e.to_string()))?;

        Ok(())
    }

    /// 设置或清除工作器速率限制
    ///
    /// 只有在工作器确认生效后才把新值写入 Worker 记录；
    /// 否则保持原值不变并向调用方报告失败（不允许部分生效）。
    pub async fn set_rate_limit(
        &self,
        hostname: &str,
        rate: Option<RateLimit>,
    ) -> Result<(), WorkerError> {
        let task_name = if hostname.starts_with(FILE_LEECH_WORKER) {
            "process_download"
        } else {
            "process_upload"
        };

        let accepted = self
            .control
            .send(
                hostname,
                ControlAction::RateLimit {
                    task_name: task_name.to_string(),
                    rate,
                },
                Duration::from_secs(5),
            )
            .await
            .map_err(|e| WorkerError::ControlError(e.to_string()))?;

        if !accepted {
            return Err(WorkerError::ControlError(format!(
                "Worker {} did not acknowledge rate limit change",
                hostname
            )));
        }

        self.worker_repo
            .update_rate_limit(hostname, rate)
            .await
            .map_err(|e| WorkerError::RepositoryError(e.to_string()))?;

        info!("Rate limit for {} set to {:?}", hostname, rate);
        Ok(())
    }

    async fn spawn_and_wait(
        &self,
        hostname: &str,
        queues: &str,
        concurrency: i32,
    ) -> Result<(), WorkerError> {
        self.spawner
            .spawn(hostname, queues, concurrency)
            .map_err(|e| WorkerError::InternalError(e.to_string()))?;

        if !self.wait_for_status(hostname, WorkerStatus::Ready).await {
            error!("Worker {} did not reach READY in time", hostname);
            return Err(WorkerError::InternalError(format!(
                "Worker {} failed to start",
                hostname
            )));
        }

        Ok(())
    }

    /// 轮询等待工作器进入指定状态，受 status_timeout 约束
    async fn wait_for_status(&self, hostname: &str, status: WorkerStatus) -> bool {
        let deadline = tokio::time::Instant::now() + self.status_timeout;

        while tokio::time::Instant::now() < deadline {
            match self.worker_repo.find_by_hostname(hostname).await {
                Ok(Some(worker)) if worker.status == status => return true,
                Ok(_) => {}
                Err(e) => error!("Failed to poll worker {}: {}", hostname, e),
            }

            sleep(Duration::from_secs(1)).await;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname_encodes_phase_queue_and_tool() {
        assert_eq!(
            WorkerManager::hostname_for(TaskPhase::Download, "PIXELDRAIN"),
            "FILE_LEECH_WORKER@FILE_DOWNLOAD_QUEUE@PIXELDRAIN"
        );
        assert_eq!(
            WorkerManager::hostname_for(TaskPhase::Upload, "RCLONE"),
            "FILE_SYNC_WORKER@FILE_SYNC_QUEUE@RCLONE"
        );
    }
}
