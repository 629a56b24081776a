// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 实现任务链的提交、认领与撤销
pub mod task_queue;

/// 下载队列名前缀
pub const FILE_DOWNLOAD_QUEUE: &str = "FILE_DOWNLOAD_QUEUE";

/// 上传队列名前缀
pub const FILE_SYNC_QUEUE: &str = "FILE_SYNC_QUEUE";

/// 派生队列名
///
/// 纯函数：`queue_name(base, tool) == base + "@" + tool`
pub fn queue_name(base: &str, tool: impl std::fmt::Display) -> String {
    format!("{}@{}", base, tool)
}

/// 为一组工具派生全部队列名，逗号连接
pub fn generate_queue_names(base: &str, tools: &[impl std::fmt::Display]) -> String {
    tools
        .iter()
        .map(|tool| queue_name(base, tool))
        .collect::<Vec<_>>()
        .join(",")
}
