//! Durable mirrors of session content.
//!
//! Every session's text is mirrored into a private cache namespace, one
//! plain UTF-8 file per session, named after the session id. The mirror is
//! the baseline the unsaved-change check compares against.
//!
//! ## Learning: Async Traits
//!
//! Trait methods returning futures need boxing to be object safe. The
//! `async_trait` macro rewrites
//!
//! ```rust,ignore
//! async fn read(&self, id: &SessionId) -> Result<Vec<u8>, StoreError>;
//! ```
//!
//! into a method returning `Pin<Box<dyn Future + Send + '_>>`, which lets the
//! manager hold an `Arc<dyn MirrorStore>` and move it into spawned tasks.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::session::SessionId;

/// Errors from mirror storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No mirror for session {0}")]
    Missing(SessionId),

    #[error("Mirror store unavailable: {0}")]
    Unavailable(String),
}

/// Storage for session mirrors.
///
/// Implementations are shared with background tasks, hence `Send + Sync`.
#[async_trait]
pub trait MirrorStore: Send + Sync {
    /// Returns true if the private namespace already exists.
    async fn namespace_exists(&self) -> bool;

    /// Creates the private namespace (first run).
    async fn create_namespace(&self) -> Result<(), StoreError>;

    /// Reads a session's mirror.
    async fn read(&self, id: &SessionId) -> Result<Vec<u8>, StoreError>;

    /// Writes a session's mirror, replacing any previous content.
    async fn write(&self, id: &SessionId, text: &str) -> Result<(), StoreError>;

    /// Deletes a session's mirror.
    async fn remove(&self, id: &SessionId) -> Result<(), StoreError>;
}

/// Mirror store backed by a cache directory.
#[derive(Debug, Clone)]
pub struct FsMirrorStore {
    root: PathBuf,
}

impl FsMirrorStore {
    /// Creates a store rooted at `root`. Nothing is touched on disk yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the namespace directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the mirror file path for a session.
    pub fn mirror_path(&self, id: &SessionId) -> PathBuf {
        self.root.join(file_key(id))
    }
}

#[async_trait]
impl MirrorStore for FsMirrorStore {
    async fn namespace_exists(&self) -> bool {
        tokio::fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    async fn create_namespace(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    async fn read(&self, id: &SessionId) -> Result<Vec<u8>, StoreError> {
        Ok(tokio::fs::read(self.mirror_path(id)).await?)
    }

    async fn write(&self, id: &SessionId, text: &str) -> Result<(), StoreError> {
        tokio::fs::write(self.mirror_path(id), text.as_bytes()).await?;
        Ok(())
    }

    async fn remove(&self, id: &SessionId) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.mirror_path(id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Escapes an id into a single safe file name component.
///
/// Distinct ids always map to distinct names.
fn file_key(id: &SessionId) -> String {
    let mut key = String::with_capacity(id.as_str().len());
    for byte in id.as_str().bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' => key.push(byte as char),
            _ => key.push_str(&format!("%{:02X}", byte)),
        }
    }
    key
}

/// In-memory mirror store.
///
/// Clones share the same contents, so a caller can keep a handle to inspect
/// what the manager wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryMirrorStore {
    inner: Arc<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    files: Mutex<HashMap<SessionId, String>>,
    namespace: AtomicBool,
    failing: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryMirrorStore {
    /// Creates an empty store whose namespace does not exist yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store whose namespace already exists.
    pub fn ready() -> Self {
        let store = Self::default();
        store.inner.namespace.store(true, Ordering::SeqCst);
        store
    }

    /// Makes every subsequent I/O call fail.
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns a session's mirrored text.
    pub fn get(&self, id: &SessionId) -> Option<String> {
        self.files().get(id).cloned()
    }

    /// Overwrites a mirror directly.
    pub fn put(&self, id: &SessionId, text: &str) {
        self.files().insert(id.clone(), text.to_string());
    }

    /// Number of `read` calls so far.
    pub fn reads(&self) -> usize {
        self.inner.reads.load(Ordering::SeqCst)
    }

    /// Number of `write` calls so far.
    pub fn writes(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    fn files(&self) -> std::sync::MutexGuard<'_, HashMap<SessionId, String>> {
        // A poisoned map still holds usable strings
        self.inner
            .files
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.inner.failing.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory store set to fail".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MirrorStore for MemoryMirrorStore {
    async fn namespace_exists(&self) -> bool {
        self.inner.namespace.load(Ordering::SeqCst)
    }

    async fn create_namespace(&self) -> Result<(), StoreError> {
        self.check()?;
        self.inner.namespace.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn read(&self, id: &SessionId) -> Result<Vec<u8>, StoreError> {
        self.inner.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.get(id)
            .map(String::into_bytes)
            .ok_or_else(|| StoreError::Missing(id.clone()))
    }

    async fn write(&self, id: &SessionId, text: &str) -> Result<(), StoreError> {
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.put(id, text);
        Ok(())
    }

    async fn remove(&self, id: &SessionId) -> Result<(), StoreError> {
        self.check()?;
        self.files().remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_fs_store_first_run() {
        let dir = tempdir().unwrap();
        let store = FsMirrorStore::new(dir.path().join("session"));

        assert!(!store.namespace_exists().await);
        store.create_namespace().await.unwrap();
        assert!(store.namespace_exists().await);
    }

    #[tokio::test]
    async fn test_fs_store_roundtrip_keyed_by_id() {
        let dir = tempdir().unwrap();
        let store = FsMirrorStore::new(dir.path());
        let id = SessionId::from("a/b c");

        store.write(&id, "héllo").await.unwrap();
        assert_eq!(store.read(&id).await.unwrap(), "héllo".as_bytes());
        assert_eq!(store.mirror_path(&id), dir.path().join("a%2Fb%20c"));

        store.remove(&id).await.unwrap();
        assert!(store.read(&id).await.is_err());
        // Removing twice is fine
        store.remove(&id).await.unwrap();
    }

    #[test]
    fn test_file_key_is_injective_for_escapes() {
        assert_ne!(file_key(&"a/b".into()), file_key(&"a_b".into()));
        assert_ne!(file_key(&"a%2Fb".into()), file_key(&"a/b".into()));
    }

    #[tokio::test]
    async fn test_memory_store_failures() {
        let store = MemoryMirrorStore::ready();
        let id = SessionId::from("x");
        store.write(&id, "one").await.unwrap();

        store.set_failing(true);
        assert!(store.write(&id, "two").await.is_err());
        assert!(store.read(&id).await.is_err());
        assert_eq!(store.get(&id).as_deref(), Some("one"));
        assert_eq!(store.writes(), 2);
        assert_eq!(store.reads(), 1);
    }
}
