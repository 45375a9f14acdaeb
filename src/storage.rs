//! Durable key-value storage behind save/load.
//!
//! The browser build persists to `localStorage`; everything else (tests,
//! headless drivers) can use [`MemoryStore`]. Both are synchronous and
//! bounded, so a save never stalls the tick loop.

use std::collections::HashMap;

use crate::error::StorageError;

/// A string-keyed, string-valued durable store.
pub trait SaveStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-process store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SaveStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

impl<S: SaveStore + ?Sized> SaveStore for &mut S {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// `window.localStorage`. Only available in the browser build.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StorageError::Unavailable)
    }

    fn backend_error(op: &str, key: &str, detail: String) -> StorageError {
        let msg = format!("localStorage {op} failed for {key}: {detail}");
        web_sys::console::warn_1(&msg.clone().into());
        StorageError::Backend(msg)
    }
}

#[cfg(target_arch = "wasm32")]
impl SaveStore for LocalStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| Self::backend_error("read", key, format!("{e:?}")))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| Self::backend_error("write", key, format!("{e:?}")))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| Self::backend_error("remove", key, format!("{e:?}")))
    }
}
