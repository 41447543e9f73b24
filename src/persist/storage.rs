//! 本地存储：把编码后的配装写到磁盘上的单个文件。

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::Context;

pub fn save(path: impl AsRef<Path>, text: &str) -> anyhow::Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("无法创建目录 {}", dir.display()))?;
    }
    fs::write(path, text).with_context(|| format!("无法写入 {}", path.display()))
}

/// 文件不存在时返回 `None`
pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Option<String>> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("无法读取 {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("loadout_planner_{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn missing_file_is_none() {
        assert!(load(scratch("absent/loadout.json")).unwrap().is_none());
    }

    #[test]
    fn save_creates_parent_dirs() {
        let path = scratch("nested/dir/loadout.json");
        save(&path, r#"{"title":"x"}"#).unwrap();
        assert_eq!(load(&path).unwrap().as_deref(), Some(r#"{"title":"x"}"#));
        let _ = fs::remove_file(&path);
    }
}
