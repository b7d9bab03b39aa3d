//! External collaborators of the session manager.
//!
//! The manager never touches a widget toolkit directly. It talks to the
//! editor view, dialogs and remote backends through these traits, so tests
//! and the terminal shell can plug in their own.
//!
//! ## Learning: `?Send` Futures
//!
//! UI collaborators live on one thread and often hold `Rc`s. Marking their
//! traits `#[async_trait(?Send)]` drops the `Send` bound from the returned
//! futures, so a dialog can await user input without being thread safe.

use async_trait::async_trait;
use pocketcode_buffer::{EditSession, Position};

use crate::session::{RemoteRecord, SessionId};

/// The shared editor view that displays one session at a time.
pub trait EditorView {
    /// Displays a session's buffer.
    fn show(&mut self, id: &SessionId, buffer: &EditSession);

    /// Gives the view keyboard focus.
    fn focus(&mut self);

    /// Scrolls so that a position is visible.
    fn reveal(&mut self, position: Position);

    /// Sets the header title.
    fn set_title(&mut self, title: &str);

    /// Sets the header subtitle.
    fn set_subtitle(&mut self, subtitle: &str);
}

/// Modal dialogs.
#[async_trait(?Send)]
pub trait Dialogs {
    /// Asks a yes/no question. Resolves to true on yes.
    async fn confirm(&self, title: &str, message: &str) -> bool;

    /// Shows a message the user has to acknowledge.
    async fn alert(&self, title: &str, message: &str);
}

/// Failure reported by a remote backend.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct RemoteError(pub String);

/// Backends holding remote records (version-control blobs, gists).
#[async_trait(?Send)]
pub trait RemoteRecords {
    /// Renames a record on its backend.
    async fn set_name(
        &self,
        record: &RemoteRecord,
        old_name: &str,
        new_name: &str,
    ) -> Result<(), RemoteError>;

    /// Forgets a record once its session is closed.
    fn remove(&self, record: &RemoteRecord);
}

/// Remote backend for shells that have none configured.
///
/// Renames always fail; removals do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineRemotes;

#[async_trait(?Send)]
impl RemoteRecords for OfflineRemotes {
    async fn set_name(
        &self,
        record: &RemoteRecord,
        _old_name: &str,
        _new_name: &str,
    ) -> Result<(), RemoteError> {
        Err(RemoteError(format!("no backend for record {}", record.id)))
    }

    fn remove(&self, _record: &RemoteRecord) {}
}

/// The UI-side collaborators a manager is built with.
pub struct Services {
    pub view: Box<dyn EditorView>,
    pub dialogs: Box<dyn Dialogs>,
    pub tiles: Box<dyn crate::tiles::TileList>,
    pub remotes: Box<dyn RemoteRecords>,
}
