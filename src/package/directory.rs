//! Storage abstraction for export targets.
//!
//! The exporters only need to read, write and list files below a root, so
//! they work against [`Directory`] rather than the file system. Paths are
//! relative and always use `/` as separator.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{ExportError, Result};

/// A rooted tree of files.
pub trait Directory {
    /// Whether the root itself still exists.
    fn root_exists(&self) -> bool;

    /// Human-readable location of the root, for messages.
    fn location(&self) -> String;

    /// Read a file, or `None` when it does not exist.
    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>>;

    /// Create or replace a file, creating parent directories as needed.
    fn write_file(&mut self, path: &str, bytes: &[u8]) -> Result<()>;

    /// Every file below `dir` (recursively), as root-relative paths in
    /// sorted order. A missing `dir` yields an empty list.
    fn list_files(&self, dir: &str) -> Result<Vec<String>>;

    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.read_file(path)?.is_some())
    }

    fn read_to_string(&self, path: &str) -> Result<Option<String>> {
        match self.read_file(path)? {
            Some(bytes) => String::from_utf8(bytes).map(Some).map_err(|e| ExportError::Io {
                path: PathBuf::from(path),
                message: format!("File is not UTF-8: {}", e),
            }),
            None => Ok(None),
        }
    }
}

/// Join path segments with `/`, skipping empty ones and stray separators.
pub fn join(parts: &[&str]) -> String {
    parts
        .iter()
        .flat_map(|p| p.split('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// A directory on disk.
#[derive(Debug, Clone)]
pub struct FsDirectory {
    root: PathBuf,
}

impl FsDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let mut full = self.root.clone();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            full.push(segment);
        }
        full
    }
}

impl Directory for FsDirectory {
    fn root_exists(&self) -> bool {
        self.root.is_dir()
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let full = self.resolve(path);
        if !full.is_file() {
            return Ok(None);
        }
        fs::read(&full).map(Some).map_err(|e| ExportError::Io {
            path: full,
            message: format!("Failed to read: {}", e),
        })
    }

    fn write_file(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| ExportError::Io {
                path: parent.to_path_buf(),
                message: format!("Failed to create directory: {}", e),
            })?;
        }
        fs::write(&full, bytes).map_err(|e| ExportError::Io {
            path: full,
            message: format!("Failed to write: {}", e),
        })
    }

    fn list_files(&self, dir: &str) -> Result<Vec<String>> {
        let base = self.resolve(dir);
        if !base.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&base).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(dir = %base.display(), "skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let parts: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            files.push(parts.join("/"));
        }
        files.sort();
        Ok(files)
    }
}

/// An in-memory directory. Counts writes so tests can assert on I/O.
#[derive(Debug, Clone)]
pub struct MemoryDirectory {
    files: BTreeMap<String, Vec<u8>>,
    writes: Vec<String>,
    present: bool,
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self {
            files: BTreeMap::new(),
            writes: Vec::new(),
            present: true,
        }
    }
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths written since creation or the last [`MemoryDirectory::reset_writes`].
    pub fn writes(&self) -> &[String] {
        &self.writes
    }

    pub fn reset_writes(&mut self) {
        self.writes.clear();
    }

    /// Simulate the root being deleted from under the exporter.
    pub fn remove_root(&mut self) {
        self.present = false;
    }

    pub fn file(&self, path: &str) -> Option<&[u8]> {
        self.files.get(&join(&[path])).map(Vec::as_slice)
    }

    pub fn text(&self, path: &str) -> Option<&str> {
        self.file(path).and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

impl Directory for MemoryDirectory {
    fn root_exists(&self) -> bool {
        self.present
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }

    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.files.get(&join(&[path])).cloned())
    }

    fn write_file(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        let key = join(&[path]);
        self.writes.push(key.clone());
        self.files.insert(key, bytes.to_vec());
        Ok(())
    }

    fn list_files(&self, dir: &str) -> Result<Vec<String>> {
        let prefix = join(&[dir]);
        Ok(self
            .files
            .keys()
            .filter(|k| prefix.is_empty() || k.starts_with(&format!("{}/", prefix)))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_join() {
        assert_eq!(join(&["UI", "/Assets/", "a.png"]), "UI/Assets/a.png");
        assert_eq!(join(&["", "a", ""]), "a");
    }

    #[test]
    fn test_memory_directory() {
        let mut dir = MemoryDirectory::new();
        dir.write_file("pkg/Assets/a.png", b"a").unwrap();
        dir.write_file("pkg/package.xml", b"<x/>").unwrap();
        dir.write_file("other/b.png", b"b").unwrap();

        assert_eq!(dir.read_file("pkg/Assets/a.png").unwrap(), Some(b"a".to_vec()));
        assert_eq!(dir.read_file("missing").unwrap(), None);
        assert_eq!(
            dir.list_files("pkg").unwrap(),
            vec!["pkg/Assets/a.png", "pkg/package.xml"]
        );
        assert_eq!(dir.writes().len(), 3);
    }

    #[test]
    fn test_fs_directory_round_trip() {
        let tmp = tempdir().unwrap();
        let mut dir = FsDirectory::new(tmp.path());

        dir.write_file("pkg/Assets/a.png", b"abc").unwrap();
        dir.write_file("pkg/package.xml", b"<x/>").unwrap();

        assert!(dir.root_exists());
        assert_eq!(dir.read_file("pkg/Assets/a.png").unwrap(), Some(b"abc".to_vec()));
        assert_eq!(
            dir.read_to_string("pkg/package.xml").unwrap().as_deref(),
            Some("<x/>")
        );
        assert_eq!(
            dir.list_files("pkg").unwrap(),
            vec!["pkg/Assets/a.png", "pkg/package.xml"]
        );
        assert!(dir.list_files("nope").unwrap().is_empty());
    }

    #[test]
    fn test_fs_directory_missing_root() {
        let tmp = tempdir().unwrap();
        let dir = FsDirectory::new(tmp.path().join("gone"));
        assert!(!dir.root_exists());
        assert_eq!(dir.read_file("a").unwrap(), None);
    }
}
