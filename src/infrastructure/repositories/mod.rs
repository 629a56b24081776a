// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 基于SeaORM实现领域层定义的仓库接口
pub mod leech_file_repo_impl;
pub mod leech_message_repo_impl;
pub mod leech_task_repo_impl;
pub mod queue_job_repo_impl;
pub mod worker_repo_impl;
