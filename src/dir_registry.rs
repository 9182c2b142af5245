//! Filesystem-backed registry.
//!
//! Every directory below the root that holds a [`MARKER_FILE`] is an item. Its full name
//! is the directory path relative to the root, joined with `/`, so folders nest:
//! `team/nightly` lives in `<root>/team/nightly/`.

use crate::registry::{Item, ItemRegistry, RegistryError};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::debug;
use walkdir::WalkDir;

/// File that marks a directory as an item.
pub const MARKER_FILE: &str = "job.toml";

#[derive(Debug, Clone)]
pub struct DirRegistry {
    root: PathBuf,
}

impl DirRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the item `full_name` (and any parent folders) with an empty marker file.
    pub fn create(&self, full_name: &str) -> io::Result<PathBuf> {
        let dir = full_name
            .split('/')
            .fold(self.root.clone(), |path, segment| path.join(segment));
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(MARKER_FILE), "")?;
        Ok(dir)
    }
}

impl ItemRegistry for DirRegistry {
    /// Lists items depth-first, siblings sorted by name, a folder before its children.
    fn list_all(&self) -> Result<Vec<Box<dyn Item>>, RegistryError> {
        let mut items: Vec<Box<dyn Item>> = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|source| RegistryError::Scan {
                root: self.root.clone(),
                source,
            })?;
            if !entry.file_type().is_dir() || !entry.path().join(MARKER_FILE).is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let full_name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            items.push(Box::new(DirItem {
                full_name,
                path: entry.into_path(),
            }));
        }
        debug!(root = %self.root.display(), count = items.len(), "scanned registry");
        Ok(items)
    }
}

/// One item directory inside a [`DirRegistry`].
#[derive(Debug)]
pub struct DirItem {
    full_name: String,
    path: PathBuf,
}

impl Item for DirItem {
    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn delete(&self) -> Result<(), RegistryError> {
        fs::remove_dir_all(&self.path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => RegistryError::Gone {
                name: self.full_name.clone(),
            },
            io::ErrorKind::PermissionDenied => RegistryError::Denied {
                name: self.full_name.clone(),
            },
            _ => RegistryError::Io {
                name: self.full_name.clone(),
                source,
            },
        })
    }
}
