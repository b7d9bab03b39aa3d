//! # Pocketcode Core
//!
//! Open-file bookkeeping for the editor shell.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     SessionManager                        │
//! │  ┌──────────┐ ┌──────────┐ ┌──────────┐                   │
//! │  │ Session  │ │ Session  │ │ Session  │ ... one per file  │
//! │  └────┬─────┘ └────┬─────┘ └────┬─────┘                   │
//! │       │ debounce   │            │                         │
//! │  ┌────┴────────────┴────────────┴──────┐   ┌────────────┐ │
//! │  │      MirrorStore (private cache)    │   │  EventBus  │ │
//! │  └─────────────────────────────────────┘   └────────────┘ │
//! └──────────────────────────────────────────────────────────┘
//!      │ EditorView   │ TileList   │ Dialogs   │ RemoteRecords
//! ```
//!
//! The manager is owned by a single task. Background work (mirror writes,
//! debounce timers, store setup) runs on spawned tokio tasks that report
//! back as [`ManagerMessage`]s; the owner feeds them to
//! [`SessionManager::handle`].

pub mod config;
pub mod debounce;
pub mod event;
pub mod manager;
pub mod services;
pub mod session;
pub mod store;
pub mod tiles;

pub use config::{Config, FileListPosition, OverlayConfig, SessionConfig};
pub use event::{EventBus, EventHandler, SessionEvent};
pub use manager::{CloseOutcome, ManagerMessage, OpenOptions, OpenOutcome, SessionManager};
pub use services::{Dialogs, EditorView, OfflineRemotes, RemoteError, RemoteRecords, Services};
pub use session::{Lookup, Origin, RemoteKind, RemoteRecord, Session, SessionId, SessionSummary};
pub use store::{FsMirrorStore, MemoryMirrorStore, MirrorStore, StoreError};
pub use tiles::{TileList, TileState, TileStrip};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Remote rename failed: {0}")]
    Remote(#[from] RemoteError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let missing = CoreError::SessionNotFound(SessionId::from("a"));
        assert_eq!(missing.to_string(), "Session not found: a");

        let remote: CoreError = RemoteError("offline".to_string()).into();
        assert_eq!(remote.to_string(), "Remote rename failed: offline");
    }
}
