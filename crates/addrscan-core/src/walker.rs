//! 目录遍历：剪枝忽略目录，按分类器筛选候选文件
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::classify::Classifier;
use crate::error::{Result, ScanError};

/// 根目录必须存在且是目录；这是唯一不可恢复的启动错误
pub fn ensure_root(root: &Path) -> Result<()> {
    match std::fs::metadata(root) {
        Ok(md) if md.is_dir() => Ok(()),
        Ok(_) => Err(ScanError::RootNotDirectory(root.to_path_buf())),
        Err(_) => Err(ScanError::RootMissing(root.to_path_buf())),
    }
}

/// 惰性遍历根目录，产出通过分类器的文件路径
/// - 忽略目录在进入之前即被剪枝（不会列出其内容）
/// - 同一目录内按文件名排序，保证顺序可复现
pub fn walk<'a>(root: &'a Path, classifier: &'a Classifier) -> impl Iterator<Item = PathBuf> + 'a {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| {
            e.depth() == 0 || !e.file_type().is_dir() || !classifier.is_ignored_dir_name(e.file_name())
        })
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                debug!(%err, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(move |p| classifier.accept(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::SniffPolicy;
    use crate::rules::{parse_ext_set, parse_name_set};
    use std::fs;

    #[test]
    fn test_ensure_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ensure_root(dir.path()).is_ok());
        let file = dir.path().join("f.txt");
        fs::write(&file, "x").unwrap();
        assert!(matches!(ensure_root(&file), Err(ScanError::RootNotDirectory(_))));
        assert!(matches!(ensure_root(&dir.path().join("nope")), Err(ScanError::RootMissing(_))));
    }

    #[test]
    fn test_walk_prunes_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("siteA/.git/objects")).unwrap();
        fs::create_dir_all(root.join("siteB/sub")).unwrap();
        fs::write(root.join("siteA/.git/objects/keep.txt"), "x").unwrap();
        fs::write(root.join("siteA/a.txt"), "x").unwrap();
        fs::write(root.join("siteA/b.EXE"), "x").unwrap();
        fs::write(root.join("siteA/c.bin@2"), "x").unwrap();
        fs::write(root.join("siteB/sub/d.txt"), "x").unwrap();
        fs::write(root.join("loose.txt"), "x").unwrap();

        let classifier = Classifier::new(
            root,
            parse_name_set(".git"),
            parse_ext_set("txt"),
            parse_ext_set("exe\nbin"),
            Default::default(),
            SniffPolicy::Fixed(false),
        );
        let found: Vec<PathBuf> = walk(root, &classifier)
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            found,
            vec![
                PathBuf::from("loose.txt"),
                PathBuf::from("siteA/a.txt"),
                PathBuf::from("siteB/sub/d.txt"),
            ]
        );
    }
}
