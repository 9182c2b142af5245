//! Item registry abstraction.
//!
//! The registry is owned by the host: the pruner only lists items and asks them to
//! delete themselves. [`MemoryRegistry`] is a self-contained implementation used by
//! tests and embedders; [`crate::dir_registry::DirRegistry`] backs the binary.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::PathBuf;
use std::rc::Rc;
use thiserror::Error;

/// Errors reported by a registry or by one of its items.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The item was removed before this delete reached it.
    #[error("item '{name}' no longer exists")]
    Gone { name: String },

    /// The registry refused to delete the item.
    #[error("not allowed to delete '{name}'")]
    Denied { name: String },

    /// Deleting the item failed at the storage level.
    #[error("failed to delete '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Listing the registry failed.
    #[error("failed to scan registry at {}: {source}", root.display())]
    Scan {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// A uniquely named entity in the registry.
pub trait Item {
    /// Hierarchical full name, e.g. `team/nightly`. Unique within a registry.
    fn full_name(&self) -> &str;

    /// Remove the item from its registry. Irreversible.
    fn delete(&self) -> Result<(), RegistryError>;
}

impl<T: Item + ?Sized> Item for Box<T> {
    fn full_name(&self) -> &str {
        (**self).full_name()
    }

    fn delete(&self) -> Result<(), RegistryError> {
        (**self).delete()
    }
}

/// Source of every item the host knows about.
pub trait ItemRegistry {
    /// All items, in the registry's own order.
    fn list_all(&self) -> Result<Vec<Box<dyn Item>>, RegistryError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    names: Vec<String>,
    protected: HashSet<String>,
}

/// Ordered in-memory registry.
///
/// Clones share the same underlying state, so a caller can keep a handle and
/// inspect what survived after items were deleted through it.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding `names` in the given order. Duplicates are dropped.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let registry = Self::new();
        for name in names {
            registry.create(name);
        }
        registry
    }

    /// Append an item. Returns `false` if the name is already taken.
    pub fn create(&self, name: impl Into<String>) -> bool {
        let name = name.into();
        let mut state = self.state.borrow_mut();
        if state.names.contains(&name) {
            return false;
        }
        state.names.push(name);
        true
    }

    /// Make every later delete of `name` fail with [`RegistryError::Denied`].
    pub fn protect(&self, name: impl Into<String>) {
        self.state.borrow_mut().protected.insert(name.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.state.borrow().names.iter().any(|n| n == name)
    }

    /// Snapshot of the current names, in registry order.
    pub fn names(&self) -> Vec<String> {
        self.state.borrow().names.clone()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ItemRegistry for MemoryRegistry {
    fn list_all(&self) -> Result<Vec<Box<dyn Item>>, RegistryError> {
        Ok(self
            .state
            .borrow()
            .names
            .iter()
            .map(|name| {
                Box::new(MemoryItem {
                    name: name.clone(),
                    state: Rc::clone(&self.state),
                }) as Box<dyn Item>
            })
            .collect())
    }
}

/// Handle to one entry of a [`MemoryRegistry`].
pub struct MemoryItem {
    name: String,
    state: Rc<RefCell<MemoryState>>,
}

impl Item for MemoryItem {
    fn full_name(&self) -> &str {
        &self.name
    }

    fn delete(&self) -> Result<(), RegistryError> {
        let mut state = self.state.borrow_mut();
        if state.protected.contains(&self.name) {
            return Err(RegistryError::Denied {
                name: self.name.clone(),
            });
        }
        match state.names.iter().position(|n| *n == self.name) {
            Some(index) => {
                state.names.remove(index);
                Ok(())
            }
            None => Err(RegistryError::Gone {
                name: self.name.clone(),
            }),
        }
    }
}
