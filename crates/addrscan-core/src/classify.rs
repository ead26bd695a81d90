//! 文件分类：决定一个文件是否值得提取
//!
//! 判定顺序（廉价检查优先，绝大多数文件不需要读内容）：
//! 1. 路径位于忽略目录之下 → 拒绝；
//! 2. 扩展名在接受集合 → 接受；
//! 3. 扩展名在拒绝集合 → 拒绝；
//! 4. 否则按内容嗅探（经 MIME 缓存），或在关闭嗅探时使用配置的默认结论。

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::mime_cache::MimeCache;
use crate::normalize::normalize_extension;
use crate::sniff::sniff_mime;

/// 内容嗅探策略
pub enum SniffPolicy {
    /// 嗅探，并按 (目录, 扩展名) 缓存结论
    Sniff(MimeCache),
    /// 不嗅探，直接给出结论
    Fixed(bool),
}

pub struct Classifier {
    root: PathBuf,
    ignored_dirs: HashSet<String>,
    accepted_exts: HashSet<String>,
    refused_exts: HashSet<String>,
    extra_mimes: HashSet<String>,
    policy: SniffPolicy,
}

impl Classifier {
    /// 集合中的名称应已小写（见 `rules::parse_name_set` / `rules::parse_ext_set`）
    pub fn new(
        root: &Path,
        ignored_dirs: HashSet<String>,
        accepted_exts: HashSet<String>,
        refused_exts: HashSet<String>,
        extra_mimes: HashSet<String>,
        policy: SniffPolicy,
    ) -> Self {
        Self { root: root.to_path_buf(), ignored_dirs, accepted_exts, refused_exts, extra_mimes, policy }
    }

    pub fn is_ignored_dir_name(&self, name: &OsStr) -> bool {
        !self.ignored_dirs.is_empty() && self.ignored_dirs.contains(&name.to_string_lossy().to_lowercase())
    }

    pub fn accept(&self, path: &Path) -> bool {
        if self.under_ignored_dir(path) {
            return false;
        }
        let file_name = match path.file_name() {
            Some(n) => n.to_string_lossy(),
            None => return false,
        };
        let ext = normalize_extension(&file_name);
        if self.accepted_exts.contains(&ext) {
            return true;
        }
        if self.refused_exts.contains(&ext) {
            return false;
        }

        match &self.policy {
            SniffPolicy::Fixed(verdict) => *verdict,
            SniffPolicy::Sniff(cache) => {
                let dir = path.parent().unwrap_or_else(|| Path::new(""));
                cache.classify(dir, &ext, || self.sniff_is_text(path))
            }
        }
    }

    /// 只检查根目录以下的目录部分，根目录本身的名字不参与
    fn under_ignored_dir(&self, path: &Path) -> bool {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        let parent = match rel.parent() {
            Some(p) => p,
            None => return false,
        };
        parent.components().any(|c| match c {
            Component::Normal(name) => self.is_ignored_dir_name(name),
            _ => false,
        })
    }

    fn sniff_is_text(&self, path: &Path) -> Option<bool> {
        match sniff_mime(path) {
            Ok(mime) => Some(mime.starts_with("text/") || self.extra_mimes.contains(mime)),
            Err(err) => {
                debug!(path = %path.display(), %err, "content sniffing failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{parse_ext_set, parse_name_set};

    fn classifier(root: &Path, policy: SniffPolicy) -> Classifier {
        Classifier::new(
            root,
            parse_name_set(".git\nnode_modules"),
            parse_ext_set("txt\nhtml"),
            parse_ext_set("exe\nbin"),
            parse_name_set("application/json"),
            policy,
        )
    }

    #[test]
    fn test_extension_rules_without_sniffing() {
        let c = classifier(Path::new("/data"), SniffPolicy::Fixed(false));
        assert!(c.accept(Path::new("/data/site/a.txt")));
        assert!(!c.accept(Path::new("/data/site/b.EXE")));
        assert!(!c.accept(Path::new("/data/site/c.bin@2")));
        assert!(!c.accept(Path::new("/data/site/unknown.xyz")));
    }

    #[test]
    fn test_fixed_policy_is_deterministic() {
        let c = classifier(Path::new("/data"), SniffPolicy::Fixed(true));
        for _ in 0..3 {
            assert!(c.accept(Path::new("/data/site/unknown.xyz")));
            assert!(!c.accept(Path::new("/data/site/x.bin")));
        }
    }

    #[test]
    fn test_ignored_directory_case_insensitive() {
        let c = classifier(Path::new("/data"), SniffPolicy::Fixed(true));
        assert!(!c.accept(Path::new("/data/site/.GIT/config.txt")));
        assert!(!c.accept(Path::new("/data/site/Node_Modules/pkg/readme.txt")));
        assert!(c.accept(Path::new("/data/site/gitlog.txt")));
    }

    #[test]
    fn test_dot_dir_pruned_but_plain_name_kept() {
        let c = classifier(Path::new("/data"), SniffPolicy::Fixed(true));
        assert!(c.is_ignored_dir_name(OsStr::new(".git")));
        assert!(!c.is_ignored_dir_name(OsStr::new("git")));
        assert!(!c.accept(Path::new("/data/site/.git/HEAD.txt")));
        assert!(c.accept(Path::new("/data/site/git/notes.txt")));
    }

    #[test]
    fn test_root_name_not_checked() {
        let c = classifier(Path::new("/srv/node_modules"), SniffPolicy::Fixed(false));
        assert!(c.accept(Path::new("/srv/node_modules/site/a.txt")));
    }

    #[test]
    fn test_content_sniffing_with_extra_mimes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("notes"), "just text").unwrap();
        std::fs::write(root.join("data.cfg"), "{\"k\": 1}").unwrap();
        std::fs::write(root.join("blob.dat"), [0u8, 1, 2, 3]).unwrap();

        let c = classifier(root, SniffPolicy::Sniff(MimeCache::new(2)));
        assert!(c.accept(&root.join("notes")));
        assert!(c.accept(&root.join("data.cfg")));
        assert!(!c.accept(&root.join("blob.dat")));
        assert!(!c.accept(&root.join("vanished.dat2")));
    }
}
