// SPDX-FileCopyrightText: 2026 Kiosk Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Content store backing the served document root
//!
//! The store is the single writer of the content root. Writes are
//! atomic (temp file + rename) so the local server never observes a
//! half-written file. Relative paths originate from remote-controlled
//! manifests and are sanitized before touching the filesystem; anything
//! that would escape the root is rejected.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Local store for update files.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    ///
    /// Pre-existing files are treated as already-applied baseline state.
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// The content root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a whole file under the root, atomically.
    ///
    /// Parent directories are created as needed.
    pub fn write(&self, relative_path: &str, content: &[u8]) -> Result<(), StoreError> {
        let path = self.resolve(relative_path)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        atomic_write(&path, content)
    }

    /// Read a whole file from under the root.
    pub fn read(&self, relative_path: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.resolve(relative_path)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(relative_path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a manifest-supplied relative path strictly under the root.
    pub fn resolve(&self, relative_path: &str) -> Result<PathBuf, StoreError> {
        let clean = sanitize_relative_path(relative_path)?;
        Ok(self.root.join(clean))
    }
}

/// Reject any relative path that could resolve outside a content root.
///
/// Absolute paths, `..` segments, drive prefixes, and empty paths are
/// all [`StoreError::InvalidPath`]. `.` segments are dropped.
pub fn sanitize_relative_path(raw: &str) -> Result<PathBuf, StoreError> {
    if raw.is_empty() {
        return Err(StoreError::InvalidPath(raw.to_string()));
    }

    let mut clean = PathBuf::new();
    for component in Path::new(raw).components() {
        match component {
            Component::Normal(segment) => clean.push(segment),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(StoreError::InvalidPath(raw.to_string()));
            }
        }
    }

    if clean.as_os_str().is_empty() {
        return Err(StoreError::InvalidPath(raw.to_string()));
    }
    Ok(clean)
}

/// Atomic file write (write to temp, then rename)
///
/// Either the old content remains or the new content is fully written;
/// a concurrent reader never sees a partial file.
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let temp_path = match path.file_name() {
        Some(name) => {
            let mut temp = name.to_os_string();
            temp.push(".tmp");
            path.with_file_name(temp)
        }
        None => return Err(StoreError::InvalidPath(path.display().to_string())),
    };

    fs::write(&temp_path, data)?;
    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Errors that can occur in the content store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// File does not exist under the root.
    #[error("file not found: {0}")]
    NotFound(String),

    /// Path would escape the content root or is otherwise unusable.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}
