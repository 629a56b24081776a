// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::leech_file::LeechFile;
use std::path::Path;
use tracing::warn;

/// 清理文件的本地暂存产物
///
/// 删除暂存文件本身；若暂存目录因此变空则一并删除。
/// 尽力而为：清理失败只记录日志，不向调用方传播。
pub fn clean_local_file(file: &LeechFile) {
    let full_name = file.full_name();
    let temp_full_name = file.temp_full_name();

    for path in [full_name.as_str(), temp_full_name.as_str()] {
        let p = Path::new(path);
        if p.is_file() || p.is_symlink() {
            if let Err(e) = std::fs::remove_file(p) {
                warn!("Failed to remove staged file {}: {}", path, e);
            }
        }
    }

    if let Some(location) = file.location.as_deref() {
        let dir = Path::new(location);
        let is_empty = std::fs::read_dir(dir)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);

        if is_empty {
            if let Err(e) = std::fs::remove_dir(dir) {
                warn!("Failed to remove staging directory {}: {}", location, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::tool::LeechTool;

    #[test]
    fn test_clean_local_file_removes_empty_directory() {
        let root = tempfile::tempdir().unwrap();
        let mut file = LeechFile::new("https://example.com/f/abc".into(), LeechTool::Direct);
        file.name = Some("video.mp4".into());
        file.seal(root.path().to_str().unwrap());

        let location = file.location.clone().unwrap();
        std::fs::create_dir_all(&location).unwrap();
        std::fs::write(file.full_name(), b"data").unwrap();

        clean_local_file(&file);

        assert!(!Path::new(&file.full_name()).exists());
        assert!(!Path::new(&location).exists());
    }

    #[test]
    fn test_clean_local_file_keeps_non_empty_directory() {
        let root = tempfile::tempdir().unwrap();
        let mut file = LeechFile::new("https://example.com/f/abc".into(), LeechTool::Direct);
        file.name = Some("video.mp4".into());
        file.seal(root.path().to_str().unwrap());

        let location = file.location.clone().unwrap();
        std::fs::create_dir_all(&location).unwrap();
        std::fs::write(file.full_name(), b"data").unwrap();
        std::fs::write(format!("{}/other", location), b"keep").unwrap();

        clean_local_file(&file);

        assert!(Path::new(&location).exists());
    }
}
