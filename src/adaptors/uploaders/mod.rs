// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 上传适配器实现
pub mod alist;
pub mod rclone;

use crate::domain::models::leech_file::LeechFile;

/// 目的地上的完整文件路径
///
/// 形如 `{sync_path}/{remote_folder}/{name}`，各段去除多余斜杠
pub(crate) fn remote_file_path(file: &LeechFile) -> String {
    let base = file
        .sync_path
        .as_deref()
        .unwrap_or("")
        .trim_end_matches('/');
    let folder = file.remote_folder.as_deref().unwrap_or("");
    let name = file.name.as_deref().unwrap_or("unnamed");

    if folder.is_empty() {
        format!("{}/{}", base, name)
    } else {
        format!("{}/{}/{}", base, folder, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::tool::LeechTool;

    #[test]
    fn test_remote_file_path_joins_segments() {
        let mut file = LeechFile::new("https://example.com/f".into(), LeechTool::Direct);
        file.sync_path = Some("/media/archive/".into());
        file.remote_folder = Some("album".into());
        file.name = Some("one.jpg".into());

        assert_eq!(remote_file_path(&file), "/media/archive/album/one.jpg");
    }

    #[test]
    fn test_remote_file_path_without_folder() {
        let mut file = LeechFile::new("https://example.com/f".into(), LeechTool::Direct);
        file.sync_path = Some("remote:backup".into());
        file.name = Some("one.jpg".into());

        assert_eq!(remote_file_path(&file), "remote:backup/one.jpg");
    }
}
