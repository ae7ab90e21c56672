//! Abstract repository reader (spec.md §6 "Repository interface").

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

pub trait RepositoryReader: Send + Sync {
    fn exists(&self, path: &str) -> bool;
    fn read(&self, path: &str) -> std::io::Result<Vec<u8>>;
    fn list(&self, path: &str, pattern: &str) -> std::io::Result<Vec<String>>;
    fn snapshot_digest(&self) -> Vec<u8>;
    /// `from_ref`/`to_ref` are opaque; the filesystem implementation treats
    /// them as "unused" and always reports the full file list as changed,
    /// since it has no VCS history to diff. Git-aware implementations are
    /// external collaborators (spec.md §6).
    fn changed_files(&self, from_ref: &str, to_ref: &str) -> std::io::Result<Vec<String>>;
}

/// Filesystem-backed repository reader.
pub struct FsRepository {
    root: PathBuf,
}

impl FsRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    fn walk(&self, dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
        if !dir.is_dir() {
            return Ok(());
        }
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                self.walk(&path, out)?;
            } else {
                out.push(path);
            }
        }
        Ok(())
    }
}

impl RepositoryReader for FsRepository {
    fn exists(&self, path: &str) -> bool {
        self.full_path(path).exists()
    }

    fn read(&self, path: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.full_path(path))
    }

    fn list(&self, path: &str, pattern: &str) -> std::io::Result<Vec<String>> {
        let base = self.full_path(path);
        let mut files = Vec::new();
        self.walk(&base, &mut files)?;
        let glob = globset::Glob::new(pattern)
            .map(|g| g.compile_matcher())
            .ok();
        Ok(files
            .into_iter()
            .filter_map(|p| p.strip_prefix(&self.root).ok().map(|p| p.to_path_buf()))
            .filter(|rel| {
                glob.as_ref()
                    .map(|m| m.is_match(rel))
                    .unwrap_or(true)
            })
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect())
    }

    fn snapshot_digest(&self) -> Vec<u8> {
        let mut files = Vec::new();
        if self.walk(&self.root, &mut files).is_err() {
            return Vec::new();
        }
        files.sort();
        let mut hasher = Sha256::new();
        for file in files {
            if let Ok(bytes) = std::fs::read(&file) {
                if let Ok(rel) = file.strip_prefix(&self.root) {
                    hasher.update(rel.to_string_lossy().as_bytes());
                }
                hasher.update(&bytes);
            }
        }
        hasher.finalize().to_vec()
    }

    fn changed_files(&self, _from_ref: &str, _to_ref: &str) -> std::io::Result<Vec<String>> {
        let mut files = Vec::new();
        self.walk(&self.root, &mut files)?;
        Ok(files
            .into_iter()
            .filter_map(|p| p.strip_prefix(&self.root).ok().map(|p| p.to_path_buf()))
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_digest_stable_for_unchanged_tree() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        let repo = FsRepository::new(dir.path());
        let d1 = repo.snapshot_digest();
        let d2 = repo.snapshot_digest();
        assert_eq!(d1, d2);
    }

    #[test]
    fn snapshot_digest_changes_with_content() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        let repo = FsRepository::new(dir.path());
        let d1 = repo.snapshot_digest();
        std::fs::write(dir.path().join("a.txt"), b"world").unwrap();
        let d2 = repo.snapshot_digest();
        assert_ne!(d1, d2);
    }

    #[test]
    fn list_filters_by_glob() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("chart.yaml"), b"x").unwrap();
        std::fs::write(dir.path().join("sub/README.md"), b"x").unwrap();
        let repo = FsRepository::new(dir.path());
        let matches = repo.list(".", "**/*.yaml").unwrap();
        assert_eq!(matches, vec!["chart.yaml".to_string()]);
    }
}
