// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::leech_file::LeechFile;
use crate::domain::models::tool::SyncTool;
use async_trait::async_trait;

/// 解析适配器特质
///
/// 将一个链接解析为零个或多个文件记录。
/// 谓词按注册顺序匹配，首个命中的适配器负责解析。
#[async_trait]
pub trait Parser: Send + Sync {
    /// 适配器名称
    fn name(&self) -> &'static str;

    /// 判断该适配器是否负责此链接
    fn matches(&self, link: &str) -> bool;

    /// 解析链接，产出文件记录
    ///
    /// 产出的记录不包含同步信息与去重键，由调用方补全后提交
    async fn parse(&self, link: &str) -> anyhow::Result<Vec<LeechFile>>;
}

/// 下载适配器特质
///
/// 提供站点专属的拉取步骤，嵌入下载流水线的固定阶段链中。
/// 实现负责将远端资源流式写入 `file.temp_full_name()`，
/// 记录声明的大小，并在传输层失败时设置 DownloadFail 与原因。
#[async_trait]
pub trait Downloader: Send + Sync {
    /// 适配器名称
    fn name(&self) -> &'static str;

    /// 判断该适配器是否负责此文件
    fn matches(&self, file: &LeechFile) -> bool;

    /// 拉取远端资源到临时路径
    async fn fetch(&self, file: LeechFile) -> anyhow::Result<LeechFile>;
}

/// 上传适配器特质
///
/// 提供目的地专属的传输步骤，嵌入上传流水线的固定阶段链中。
/// 实现负责将本地暂存文件推送到目的地，并设置
/// UploadSuccess 或 UploadFail 与相应原因。
#[async_trait]
pub trait Uploader: Send + Sync {
    /// 适配器名称
    fn name(&self) -> &'static str;

    /// 判断该适配器是否负责此同步工具
    fn matches(&self, sync_tool: SyncTool) -> bool;

    /// 将本地暂存文件推送到目的地
    async fn transfer(&self, file: LeechFile) -> anyhow::Result<LeechFile>;
}
