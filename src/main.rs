// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use leechrs::adaptors::AdaptorRegistry;
use leechrs::config::settings::Settings;
use leechrs::domain::repositories::leech_file_repository::LeechFileRepository;
use leechrs::domain::repositories::leech_message_repository::LeechMessageRepository;
use leechrs::domain::repositories::leech_task_repository::LeechTaskRepository;
use leechrs::domain::repositories::queue_job_repository::QueueJobRepository;
use leechrs::domain::repositories::worker_repository::WorkerRepository;
use leechrs::domain::services::leech_service::LeechService;
use leechrs::infrastructure::control::redis_control::RedisControlBus;
use leechrs::infrastructure::database::connection;
use leechrs::infrastructure::repositories::leech_file_repo_impl::LeechFileRepositoryImpl;
use leechrs::infrastructure::repositories::leech_message_repo_impl::LeechMessageRepositoryImpl;
use leechrs::infrastructure::repositories::leech_task_repo_impl::LeechTaskRepositoryImpl;
use leechrs::infrastructure::repositories::queue_job_repo_impl::QueueJobRepositoryImpl;
use leechrs::infrastructure::repositories::worker_repo_impl::WorkerRepositoryImpl;
use leechrs::pipeline::download::DownloadPipeline;
use leechrs::pipeline::upload::UploadPipeline;
use leechrs::presentation::routes;
use leechrs::queue::task_queue::{DbLeechQueue, LeechQueue};
use leechrs::utils::telemetry;
use leechrs::workers::leech_worker::LeechWorker;
use leechrs::workers::lifecycle::LifecycleTracker;
use leechrs::workers::manager::{ProcessSpawner, WorkerManager};
use leechrs::workers::message_worker::{MessageWorker, WebhookNotifier};
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// 主函数
///
/// 同一二进制承载两种模式：默认的服务模式负责操作者接口、
/// 任务链提交与通知投递；`leechrs worker` 模式作为被生成的
/// 工作进程消费队列，参数由 LEECHRS_WORKER_* 环境变量传入。
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_telemetry();

    match std::env::args().nth(1).as_deref() {
        Some("worker") => run_worker().await,
        _ => run_server().await,
    }
}

/// 共享依赖集合
struct Components {
    settings: Settings,
    control: RedisControlBus,
    registry: Arc<AdaptorRegistry>,
    queue: Arc<dyn LeechQueue>,
    file_repo: Arc<dyn LeechFileRepository>,
    task_repo: Arc<dyn LeechTaskRepository>,
    message_repo: Arc<dyn LeechMessageRepository>,
    worker_repo: Arc<dyn WorkerRepository>,
}

async fn build_components() -> anyhow::Result<Components> {
    let settings = Settings::new()?;

    let db = Arc::new(connection::create_pool(&settings.database).await?);
    info!("Database connection established");

    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    let control = RedisControlBus::new(&settings.redis.url)?;

    let file_repo: Arc<dyn LeechFileRepository> = Arc::new(LeechFileRepositoryImpl::new(db.clone()));
    let task_repo: Arc<dyn LeechTaskRepository> = Arc::new(LeechTaskRepositoryImpl::new(db.clone()));
    let message_repo: Arc<dyn LeechMessageRepository> =
        Arc::new(LeechMessageRepositoryImpl::new(db.clone()));
    let worker_repo: Arc<dyn WorkerRepository> = Arc::new(WorkerRepositoryImpl::new(db.clone()));
    let job_repo: Arc<dyn QueueJobRepository> = Arc::new(QueueJobRepositoryImpl::new(
        db.clone(),
        settings.worker.lock_timeout_minutes,
    ));

    let queue: Arc<dyn LeechQueue> = Arc::new(DbLeechQueue::new(job_repo));

    let http = reqwest::Client::new();
    let registry = Arc::new(AdaptorRegistry::builtin(http, &settings));

    Ok(Components {
        settings,
        control,
        registry,
        queue,
        file_repo,
        task_repo,
        message_repo,
        worker_repo,
    })
}

/// 服务模式入口
async fn run_server() -> anyhow::Result<()> {
    info!("Starting leechrs...");
    leechrs::infrastructure::metrics::init_metrics();

    let components = build_components().await?;
    let settings = components.settings.clone();

    let service = Arc::new(LeechService::new(
        components.file_repo.clone(),
        components.task_repo.clone(),
        components.worker_repo.clone(),
        components.queue.clone(),
        components.registry.clone(),
        settings.leech.download_root.clone(),
        settings.leech.failed_task_expire_after_days,
    ));

    let manager = Arc::new(WorkerManager::new(
        components.worker_repo.clone(),
        Arc::new(components.control.clone()),
        Arc::new(ProcessSpawner),
        Duration::from_secs(settings.worker.shutdown_timeout),
    ));

    manager.start_boot_workers(
        settings.worker.maximum_leech_worker,
        settings.worker.maximum_sync_worker,
    )?;
    info!("Boot workers spawned");

    match settings.leech.notify_url.clone() {
        Some(notify_url) => {
            let message_worker = MessageWorker::new(
                components.message_repo.clone(),
                Arc::new(WebhookNotifier::new(reqwest::Client::new(), notify_url)),
                Duration::from_secs(settings.leech.message_poll_interval),
            );
            tokio::spawn(async move {
                message_worker.run().await;
            });
        }
        None => warn!("leech.notify_url is not configured, notifications disabled"),
    }

    let app = routes::build_router(service, manager);
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// 工作进程模式入口
async fn run_worker() -> anyhow::Result<()> {
    let hostname = std::env::var("LEECHRS_WORKER_HOSTNAME")?;
    let queues: Vec<String> = std::env::var("LEECHRS_WORKER_QUEUES")?
        .split(',')
        .map(str::to_string)
        .collect();
    let concurrency: i32 = std::env::var("LEECHRS_WORKER_CONCURRENCY")
        .unwrap_or_else(|_| "1".to_string())
        .parse()?;

    info!("Starting leech worker {}", hostname);

    let components = build_components().await?;
    let settings = components.settings;

    let lifecycle = Arc::new(LifecycleTracker::new(
        components.worker_repo,
        components.task_repo,
        components.file_repo.clone(),
        components.message_repo,
    ));

    let download_pipeline = Arc::new(DownloadPipeline::new(
        components.file_repo.clone(),
        components.registry.clone(),
        settings.leech.skip_duplicate_within_days,
    ));
    let upload_pipeline = Arc::new(UploadPipeline::new(components.registry));

    let worker = Arc::new(LeechWorker::new(
        hostname,
        queues,
        concurrency,
        components.queue,
        components.file_repo,
        lifecycle,
        download_pipeline,
        upload_pipeline,
        components.control,
    ));

    worker.run().await;
    Ok(())
}
