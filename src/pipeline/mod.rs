// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 流水线模块
///
/// 下载与上传各自拥有一条固定顺序的阶段链，
/// 站点专属的拉取/传输步骤作为其中一个阶段嵌入。
/// 阶段实现统一的 Stage 契约并自行守卫状态：
/// 一旦某个阶段决定了终结状态，后续阶段成为空操作。
/// 任何阶段抛出的错误都在流水线边界被吸收进文件状态，
/// 作业执行本身永远正常返回。
pub mod download;
pub mod upload;

use crate::domain::models::leech_file::LeechFile;
use async_trait::async_trait;

/// 下载阶段契约
#[async_trait]
pub trait DownloadStage: Send + Sync {
    /// 阶段名称，用于日志定位
    fn name(&self) -> &'static str;

    /// 执行阶段逻辑，原地修改文件记录
    async fn run(&self, file: &mut LeechFile) -> anyhow::Result<()>;
}

/// 上传阶段契约
#[async_trait]
pub trait UploadStage: Send + Sync {
    /// 阶段名称，用于日志定位
    fn name(&self) -> &'static str;

    /// 执行阶段逻辑，原地修改文件记录
    async fn run(&self, file: &mut LeechFile) -> anyhow::Result<()>;
}
