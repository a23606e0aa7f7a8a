//! Raw file access for the content database.
//!
//! A single [`FilesystemBridge`] serves both execution modes. The mode is fixed
//! at construction: [`WriteMode::Apply`] writes through to disk, while
//! [`WriteMode::Record`] reads from disk but keeps every write in memory.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use walkdir::WalkDir;

use crate::error::{Result, TinaError};

/// What a bridge does with writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Writes reach the filesystem.
    Apply,
    /// Writes are captured and never touch disk.
    Record,
}

impl WriteMode {
    #[must_use]
    pub const fn for_clean(clean: bool) -> Self {
        if clean { Self::Apply } else { Self::Record }
    }

    #[must_use]
    pub const fn is_mutating(self) -> bool {
        matches!(self, Self::Apply)
    }
}

/// Raw file operations, with paths relative to the bridge root.
pub trait Bridge {
    fn root(&self) -> &Path;

    fn mode(&self) -> WriteMode;

    /// True if `dir` exists under the root and is a directory.
    fn dir_exists(&self, dir: &Path) -> bool;

    /// Every file below `dir`, relative to the root, in sorted order.
    ///
    /// # Errors
    /// Returns an error if the directory walk fails.
    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Read a file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    fn get(&self, path: &Path) -> Result<String>;

    /// Write a file (or record the write, depending on the mode).
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    fn put(&self, path: &Path, content: &str) -> Result<()>;

    /// Paths written so far, in write order.
    fn written(&self) -> Vec<PathBuf>;
}

#[derive(Debug)]
pub struct FilesystemBridge {
    root: PathBuf,
    mode: WriteMode,
    writes: RefCell<IndexMap<PathBuf, String>>,
}

impl FilesystemBridge {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, mode: WriteMode) -> Self {
        Self {
            root: root.into(),
            mode,
            writes: RefCell::new(IndexMap::new()),
        }
    }

    /// Content captured for `path` by a recording bridge.
    #[must_use]
    pub fn recorded(&self, path: &Path) -> Option<String> {
        if self.mode.is_mutating() {
            return None;
        }
        self.writes.borrow().get(path).cloned()
    }
}

impl Bridge for FilesystemBridge {
    fn root(&self) -> &Path {
        &self.root
    }

    fn mode(&self) -> WriteMode {
        self.mode
    }

    fn dir_exists(&self, dir: &Path) -> bool {
        self.root.join(dir).is_dir()
    }

    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let base = self.root.join(dir);
        if !base.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&base).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&base).to_path_buf();
                TinaError::FileRead {
                    path,
                    source: e.into(),
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or_else(|_| entry.path());
            files.push(relative.to_path_buf());
        }
        files.sort();
        Ok(files)
    }

    fn get(&self, path: &Path) -> Result<String> {
        let full = self.root.join(path);
        fs::read_to_string(&full).map_err(|source| TinaError::FileRead { path: full, source })
    }

    fn put(&self, path: &Path, content: &str) -> Result<()> {
        if self.mode.is_mutating() {
            let full = self.root.join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).map_err(|source| TinaError::FileWrite {
                    path: full.clone(),
                    source,
                })?;
            }
            fs::write(&full, content).map_err(|source| TinaError::FileWrite { path: full, source })?;
        }
        self.writes
            .borrow_mut()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn written(&self) -> Vec<PathBuf> {
        self.writes.borrow().keys().cloned().collect()
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
