//! Token storage slots.
//!
//! A store holds exactly one value: the persisted token slot. The session
//! manager owns what goes into it.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::StorageError;

/// Name of the storage slot (and of the token file).
pub const TOKEN_KEY: &str = "jwt";

/// A single durable key/value slot.
///
/// Calls are synchronous: every `is_logged_in` check reads the slot, and
/// views must be able to ask without awaiting anything.
pub trait TokenStore: Send + Sync {
    /// Read the slot.
    fn get(&self) -> Result<Option<String>, StorageError>;

    /// Replace the slot contents. Either fully succeeds or leaves the
    /// previous contents in place.
    fn set(&self, value: &str) -> Result<(), StorageError>;

    /// Clear the slot. Clearing an empty slot succeeds.
    fn remove(&self) -> Result<(), StorageError>;
}

// ============================================================================
// FileTokenStore
// ============================================================================

/// File-backed slot, one file inside a data directory.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store the token as `<data_dir>/jwt`.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(TOKEN_KEY),
        }
    }

    /// Use an explicit file path.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_err(e)),
        }
    }

    fn set(&self, value: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }

        // Write-then-rename so a failed write never clobbers the old slot.
        let tmp = self.path.with_extension("tmp");
        write_private(&tmp, value).map_err(|e| self.io_err(e))?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(self.io_err(e));
        }

        tracing::debug!(path = %self.path.display(), "Token slot written");
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }
}

/// Write `value` to a fresh file readable only by its owner.
fn write_private(path: &Path, value: &str) -> std::io::Result<()> {
    use std::io::Write;

    // A leftover file would keep its old mode.
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e),
        _ => {}
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(value.as_bytes())?;
    file.sync_all()
}

// ============================================================================
// MemoryTokenStore
// ============================================================================

/// In-memory slot for tests and ephemeral clients.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the slot already filled.
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(value.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<String>, StorageError> {
        Ok(self.slot.lock().clone())
    }

    fn set(&self, value: &str) -> Result<(), StorageError> {
        *self.slot.lock() = Some(value.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        *self.slot.lock() = None;
        Ok(())
    }
}

impl<T: TokenStore + ?Sized> TokenStore for std::sync::Arc<T> {
    fn get(&self) -> Result<Option<String>, StorageError> {
        (**self).get()
    }

    fn set(&self, value: &str) -> Result<(), StorageError> {
        (**self).set(value)
    }

    fn remove(&self) -> Result<(), StorageError> {
        (**self).remove()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_empty() {
        let temp = tempdir().unwrap();
        let store = FileTokenStore::new(temp.path());
        assert_eq!(store.get().unwrap(), None);
        assert!(store.path().ends_with(TOKEN_KEY));
    }

    #[test]
    fn test_file_store_set_get_remove() {
        let temp = tempdir().unwrap();
        let store = FileTokenStore::new(&temp.path().join("nested"));

        store.set("\"a.b.c\"").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("\"a.b.c\""));
        assert!(!store.path().with_extension("tmp").exists());

        store.remove().unwrap();
        assert_eq!(store.get().unwrap(), None);
        store.remove().unwrap();
    }

    #[test]
    fn test_file_store_overwrite() {
        let temp = tempdir().unwrap();
        let store = FileTokenStore::new(temp.path());
        store.set("first").unwrap();
        store.set("second").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("second"));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        let store = FileTokenStore::new(temp.path());

        // A stale temp file from an interrupted write must not leak its mode.
        let stale = store.path().with_extension("tmp");
        std::fs::write(&stale, "old").unwrap();
        std::fs::set_permissions(&stale, std::fs::Permissions::from_mode(0o644)).unwrap();

        store.set("\"a.b.c\"").unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.get().unwrap().as_deref(), Some("\"a.b.c\""));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get().unwrap(), None);
        store.set("x").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("x"));
        store.remove().unwrap();
        store.remove().unwrap();
        assert_eq!(store.get().unwrap(), None);

        let seeded = MemoryTokenStore::with_value("y");
        assert_eq!(seeded.get().unwrap().as_deref(), Some("y"));
    }
}
