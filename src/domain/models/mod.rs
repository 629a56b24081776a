// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 文件（leech_file）：一个可被拉取的远端文件及其两条状态机
/// - 执行记录（leech_task）：一次队列作业执行与文件、阶段的关联
/// - 通知（leech_message)：阶段结束后产生的待投递消息
/// - 队列作业（queue_job）：任务链的持久化载体
/// - 工作器（worker）：运行中的工作进程记录
///
/// 这些模型构成了系统的数据基础，定义了业务概念的
/// 结构和行为，是领域驱动设计的核心组成部分。
pub mod leech_file;
pub mod leech_message;
pub mod leech_task;
pub mod queue_job;
pub mod tool;
pub mod worker;
