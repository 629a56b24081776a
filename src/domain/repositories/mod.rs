// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 仓库接口定义了数据持久化的抽象契约，具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 文件仓库（leech_file_repository）：管理文件记录与去重查询
/// - 执行记录仓库（leech_task_repository）：管理作业执行记录
/// - 通知仓库（leech_message_repository）：管理待投递通知
/// - 队列作业仓库（queue_job_repository）：管理作业的认领与撤销
/// - 工作器仓库（worker_repository）：管理工作进程记录的覆盖更新
///
/// 这些接口确保了领域层不依赖于具体的数据存储技术，
/// 提高了系统的可测试性和可维护性.
pub mod leech_file_repository;
pub mod leech_message_repository;
pub mod leech_task_repository;
pub mod queue_job_repository;
pub mod worker_repository;

use sea_orm::DbErr;
use thiserror::Error;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
}
