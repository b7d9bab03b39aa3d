//! The session manager.
//!
//! Owns the list of open sessions and the active-session pointer, keeps the
//! editor view, the tile list and the mirror store in step with them, and
//! runs the debounced unsaved-change check.
//!
//! ## Message loop
//!
//! Work that must not block the owner (first-run store setup, initial mirror
//! writes, debounce timers) runs on spawned tasks. Those tasks report back
//! with a [`ManagerMessage`]; the owner drives them:
//!
//! ```ignore
//! while let Some(msg) = manager.next_message().await {
//!     manager.handle(msg).await;
//! }
//! ```

use pocketcode_buffer::{EditSession, Position};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::config::{FileListPosition, SessionConfig};
use crate::event::{EventBus, SessionEvent};
use crate::services::{Dialogs, EditorView, RemoteRecords, Services};
use crate::session::{
    extension, icon_for_name, mode_for_name, Lookup, Origin, Session, SessionId, SessionSummary,
};
use crate::store::MirrorStore;
use crate::tiles::TileList;
use crate::{CoreError, CoreResult};

const UNSAVED_TITLE: &str = "WARNING";
const UNSAVED_MESSAGE: &str = "This file has unsaved changes. Close it anyway?";
const ERROR_TITLE: &str = "Error";

/// Options for [`SessionManager::open`].
#[derive(Debug, Clone)]
pub struct OpenOptions {
    /// Reuse this id instead of generating one
    pub id: Option<SessionId>,
    /// Initial content
    pub text: Option<String>,
    /// Start out flagged as unsaved
    pub is_unsaved: bool,
    /// Make the session active right away
    pub render: bool,
    /// Where to put the cursor after rendering
    pub cursor: Option<Position>,
    /// Open without a writable location
    pub read_only: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            id: None,
            text: None,
            is_unsaved: true,
            render: true,
            cursor: None,
            read_only: false,
        }
    }
}

impl OpenOptions {
    pub fn with_id(mut self, id: impl Into<SessionId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Starts the session as saved.
    pub fn saved(mut self) -> Self {
        self.is_unsaved = false;
        self
    }

    /// Opens without switching to the session.
    pub fn background(mut self) -> Self {
        self.render = false;
        self
    }

    pub fn with_cursor(mut self, cursor: Position) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// What [`SessionManager::open`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// A new session was created
    Opened(SessionId),
    /// A session with the same id or origin was already open
    Switched(SessionId),
    /// The mirror store is not ready; the request replays once it is
    Queued,
}

/// What [`SessionManager::close`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    /// The user kept the unsaved session open
    Declined,
    /// Unknown id, or the fallback session is the only one left
    Ignored,
}

/// Results of background work, fed back through [`SessionManager::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerMessage {
    /// The mirror namespace exists
    StoreReady,
    /// A session's initial mirror write finished
    MirrorWritten { id: SessionId, serial: u64 },
    /// A session's debounce delay elapsed
    CheckDue { id: SessionId, serial: u64 },
}

/// An open request received before the store was ready.
struct PendingOpen {
    name: String,
    origin: Origin,
    options: OpenOptions,
}

/// Manages the open sessions.
pub struct SessionManager {
    config: SessionConfig,

    /// Open sessions, in opening order
    sessions: Vec<Session>,

    /// Always names an element of `sessions` when set
    active: Option<SessionId>,

    /// Set once by `StoreReady`
    ready: bool,
    queue: VecDeque<PendingOpen>,
    next_serial: u64,

    /// Whether the editor view had focus
    focused: bool,

    store: Arc<dyn MirrorStore>,
    view: Box<dyn EditorView>,
    dialogs: Box<dyn Dialogs>,
    tiles: Box<dyn TileList>,
    remotes: Box<dyn RemoteRecords>,

    events: EventBus,
    tx: mpsc::UnboundedSender<ManagerMessage>,
    rx: mpsc::UnboundedReceiver<ManagerMessage>,
}

impl SessionManager {
    /// Creates a manager and starts preparing the mirror store.
    ///
    /// Must be called from within a tokio runtime. Open requests are queued
    /// until the `StoreReady` message has been handled.
    pub fn new(config: SessionConfig, store: Arc<dyn MirrorStore>, services: Services) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let Services {
            view,
            dialogs,
            mut tiles,
            remotes,
        } = services;
        tiles.set_position(config.file_list_position);

        let init_store = Arc::clone(&store);
        let init_tx = tx.clone();
        tokio::spawn(async move {
            if !init_store.namespace_exists().await {
                info!("Mirror namespace missing, creating it");
                if let Err(err) = init_store.create_namespace().await {
                    warn!("Could not create mirror namespace: {}", err);
                }
            }
            let _ = init_tx.send(ManagerMessage::StoreReady);
        });

        Self {
            config,
            sessions: Vec::new(),
            active: None,
            ready: false,
            queue: VecDeque::new(),
            next_serial: 0,
            focused: false,
            store,
            view,
            dialogs,
            tiles,
            remotes,
            events: EventBus::new(),
            tx,
            rx,
        }
    }

    // ==================== Message Loop ====================

    /// Waits for the next background result.
    pub async fn next_message(&mut self) -> Option<ManagerMessage> {
        self.rx.recv().await
    }

    /// Handles every background result already delivered, without waiting.
    pub async fn process_pending(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            self.handle(msg).await;
        }
    }

    /// Applies one background result.
    pub async fn handle(&mut self, msg: ManagerMessage) {
        match msg {
            ManagerMessage::StoreReady => self.store_ready(),
            ManagerMessage::MirrorWritten { id, serial } => self.mirror_written(&id, serial).await,
            ManagerMessage::CheckDue { id, serial } => self.check_changes(&id, serial).await,
        }
    }

    async fn mirror_written(&mut self, id: &SessionId, serial: u64) {
        if self.index_of(id).is_none() {
            // Closed before its first write landed
            if !id.is_default() {
                self.remove_mirror(id).await;
            }
            return;
        }
        let Some(session) = self.session_mut(id, serial) else {
            return;
        };
        session.mirror_ready = true;
        debug!("Mirror ready for {}", id);

        if let Some(text) = session.deferred_mirror.take() {
            if let Err(err) = self.store.write(id, &text).await {
                warn!("Deferred mirror write failed for {}: {}", id, err);
            }
        }
    }

    async fn remove_mirror(&self, id: &SessionId) {
        match self.store.remove(id).await {
            Ok(()) => debug!("Removed mirror of {}", id),
            Err(err) => warn!("Could not remove mirror of {}: {}", id, err),
        }
    }

    fn store_ready(&mut self) {
        if self.ready {
            return;
        }
        self.ready = true;
        info!("Mirror store ready, replaying {} queued opens", self.queue.len());
        self.events.emit(SessionEvent::StoreReady);

        while let Some(pending) = self.queue.pop_front() {
            self.open_now(pending.name, pending.origin, pending.options);
        }
        if self.sessions.is_empty() {
            self.open_default();
        }
    }

    // ==================== Open / Switch ====================

    /// Opens a session, or switches to the one already open for the same id
    /// or origin.
    pub fn open(&mut self, name: impl Into<String>, origin: Origin, options: OpenOptions) -> OpenOutcome {
        let name = name.into();
        if !self.ready {
            debug!("Store not ready, queueing open of {}", name);
            self.queue.push_back(PendingOpen {
                name,
                origin,
                options,
            });
            return OpenOutcome::Queued;
        }
        self.open_now(name, origin, options)
    }

    fn open_now(&mut self, name: String, origin: Origin, options: OpenOptions) -> OpenOutcome {
        let existing = options
            .id
            .as_ref()
            .and_then(|id| self.index_of(id))
            .or_else(|| self.sessions.iter().position(|s| s.origin().same_source(&origin)));

        if let Some(idx) = existing {
            let id = self.sessions[idx].id().clone();
            if self.active.as_ref() != Some(&id) {
                self.switch_active(&id);
            }
            return OpenOutcome::Switched(id);
        }

        let id = options.id.unwrap_or_else(SessionId::generate);
        let serial = self.next_serial;
        self.next_serial += 1;
        let text = options.text.unwrap_or_default();
        let session = Session::new(
            id.clone(),
            serial,
            name,
            origin,
            &text,
            options.is_unsaved,
            options.read_only,
        );
        info!("Opened session {} ({})", session.name(), id);

        self.spawn_initial_mirror(&id, serial, text);

        self.tiles.add(&id, session.name(), session.icon());
        if options.is_unsaved && !options.read_only {
            self.tiles.set_notice(&id, true);
        }
        self.sessions.push(session);
        self.events.emit(SessionEvent::Opened(id.clone()));

        if options.render {
            self.switch_active(&id);
            if let Some(cursor) = options.cursor {
                if let Some(session) = self.sessions.iter_mut().find(|s| s.id() == &id) {
                    session.buffer.move_cursor_to(cursor);
                    self.view.reveal(session.buffer.cursor());
                }
            }
            if !id.is_default() {
                self.drop_empty_default();
            }
        } else {
            self.events.emit(SessionEvent::Updated);
        }

        OpenOutcome::Opened(id)
    }

    fn spawn_initial_mirror(&self, id: &SessionId, serial: u64, text: String) {
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        let id = id.clone();
        tokio::spawn(async move {
            match store.write(&id, &text).await {
                Ok(()) => {
                    let _ = tx.send(ManagerMessage::MirrorWritten { id, serial });
                }
                Err(err) => warn!("Initial mirror write failed for {}: {}", id, err),
            }
        });
    }

    fn open_default(&mut self) {
        let name = self.config.default_file_name.clone();
        let options = OpenOptions::default()
            .with_id(SessionId::default_session())
            .saved();
        self.open_now(name, Origin::Untitled, options);
    }

    /// Closes the fallback session once a real file is shown, unless the
    /// user typed into it.
    fn drop_empty_default(&mut self) {
        let default = SessionId::default_session();
        let disposable = self
            .get(&default)
            .is_some_and(|s| s.buffer().is_empty() && !s.is_unsaved());
        if disposable {
            self.close_now(&default);
        }
    }

    /// Makes a session the active one.
    ///
    /// Unknown ids only produce an `Updated` notification. Returns true if
    /// the switch happened.
    pub fn switch_active(&mut self, id: &SessionId) -> bool {
        let Some(idx) = self.index_of(id) else {
            debug!("Switch to unknown session {}", id);
            self.events.emit(SessionEvent::Updated);
            return false;
        };

        if let Some(previous) = self.active.take() {
            self.tiles.set_active(&previous, false);
        }

        let session = &self.sessions[idx];
        self.view.show(session.id(), &session.buffer);
        if self.focused {
            self.view.focus();
        }
        self.view.set_title(session.name());
        self.view
            .set_subtitle(&session.subtitle(self.config.subtitle_max_len));
        self.tiles.set_active(id, true);
        self.tiles.scroll_into_view(id);
        self.active = Some(id.clone());

        debug!("Switched to {}", id);
        self.events.emit(SessionEvent::Switched(id.clone()));
        self.events.emit(SessionEvent::Updated);
        true
    }

    // ==================== Close ====================

    /// Closes a session.
    ///
    /// Unsaved sessions need the user's confirmation unless `force` is set.
    /// The fallback session cannot be closed while it is the only one.
    pub async fn close(&mut self, id: &SessionId, force: bool) -> CloseOutcome {
        let Some(idx) = self.index_of(id) else {
            self.events.emit(SessionEvent::Updated);
            return CloseOutcome::Ignored;
        };
        if self.sessions.len() == 1 && id.is_default() {
            return CloseOutcome::Ignored;
        }

        if self.sessions[idx].is_unsaved() && !force {
            let confirmed = self.dialogs.confirm(UNSAVED_TITLE, UNSAVED_MESSAGE).await;
            if !confirmed {
                debug!("Close of {} declined", id);
                return CloseOutcome::Declined;
            }
        }

        self.close_now(id);
        // The fallback id is reused, so its mirror stays
        if !id.is_default() {
            self.remove_mirror(id).await;
        }
        CloseOutcome::Closed
    }

    fn close_now(&mut self, id: &SessionId) {
        let Some(idx) = self.index_of(id) else {
            return;
        };
        let was_active = self.active.as_ref() == Some(id);
        let mut session = self.sessions.remove(idx);
        session.check.cancel();
        if was_active {
            self.active = None;
        }

        self.tiles.remove(id);
        if let Origin::Remote { record } = session.origin() {
            self.remotes.remove(record);
        }
        info!("Closed session {} ({})", session.name(), id);
        drop(session);

        if self.sessions.is_empty() {
            if !id.is_default() {
                self.open_default();
            }
        } else if was_active {
            if let Some(latest) = self.sessions.last().map(|s| s.id().clone()) {
                self.switch_active(&latest);
            }
        }

        self.events.emit(SessionEvent::Closed(id.clone()));
        self.events.emit(SessionEvent::Updated);
    }

    // ==================== Rename / Relocate ====================

    /// Renames a session.
    ///
    /// Remote records are renamed on their backend first; if that fails the
    /// user is alerted and the session keeps its name. Empty names are
    /// ignored.
    pub async fn rename(&mut self, id: &SessionId, new_name: &str) -> CoreResult<()> {
        if new_name.is_empty() {
            return Ok(());
        }
        let session = self
            .get(id)
            .ok_or_else(|| CoreError::SessionNotFound(id.clone()))?;
        let old_name = session.name().to_string();
        let origin = session.origin().clone();

        let origin = match origin {
            Origin::Remote { record } => {
                if let Err(err) = self.remotes.set_name(&record, &old_name, new_name).await {
                    warn!("Remote rename of {} failed: {}", id, err);
                    self.dialogs.alert(ERROR_TITLE, &err.to_string()).await;
                    return Err(err.into());
                }
                Origin::Remote { record }
            }
            Origin::Path { path } => Origin::Path {
                path: path.with_file_name(new_name),
            },
            other => other,
        };

        let extension_changed = extension(&old_name) != extension(new_name);
        let idx = self
            .index_of(id)
            .ok_or_else(|| CoreError::SessionNotFound(id.clone()))?;
        let session = &mut self.sessions[idx];
        session.set_name(new_name.to_string());
        session.set_origin(origin);
        if extension_changed {
            session.buffer.set_mode(mode_for_name(new_name));
        }

        self.tiles.relabel(id, new_name, icon_for_name(new_name));
        if self.active.as_ref() == Some(id) {
            self.view.set_title(new_name);
            self.view
                .set_subtitle(&session.subtitle(self.config.subtitle_max_len));
        }

        info!("Renamed {} to {}", old_name, new_name);
        self.events.emit(SessionEvent::Renamed(id.clone()));
        self.events.emit(SessionEvent::Updated);
        Ok(())
    }

    /// Points a session at a file named after it inside `directory`.
    ///
    /// The session loses any read-only or content-provider state.
    pub fn relocate(&mut self, id: &SessionId, directory: &Path) -> CoreResult<()> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| CoreError::SessionNotFound(id.clone()))?;
        let session = &mut self.sessions[idx];
        let path = directory.join(session.name());
        session.set_origin(Origin::Path { path });
        session.read_only = false;

        if self.active.as_ref() == Some(id) {
            self.view
                .set_subtitle(&session.subtitle(self.config.subtitle_max_len));
        }

        self.events.emit(SessionEvent::Renamed(id.clone()));
        self.events.emit(SessionEvent::Updated);
        Ok(())
    }

    // ==================== Unsaved Changes ====================

    /// Returns the number of sessions flagged as unsaved.
    pub fn count_unsaved(&self) -> usize {
        self.sessions.iter().filter(|s| s.is_unsaved()).count()
    }

    /// Runs `f` on the active buffer and schedules the unsaved-change check
    /// if the content changed.
    pub fn edit_active<R>(&mut self, f: impl FnOnce(&mut EditSession) -> R) -> Option<R> {
        let id = self.active.clone()?;
        self.edit(&id, f)
    }

    /// Runs `f` on a session's buffer and schedules the unsaved-change check
    /// if the content changed.
    pub fn edit<R>(&mut self, id: &SessionId, f: impl FnOnce(&mut EditSession) -> R) -> Option<R> {
        let idx = self.index_of(id)?;
        let buffer = &mut self.sessions[idx].buffer;
        let before = buffer.revision();
        let result = f(buffer);
        if buffer.revision() != before {
            self.buffer_changed(id);
        }
        Some(result)
    }

    /// Restarts a session's debounce timer. Call after every content change.
    pub fn buffer_changed(&mut self, id: &SessionId) {
        let delay = self.config.debounce();
        let tx = self.tx.clone();
        if let Some(session) = self.sessions.iter_mut().find(|s| s.id() == id) {
            let msg = ManagerMessage::CheckDue {
                id: id.clone(),
                serial: session.serial,
            };
            session.check.schedule(delay, tx, msg);
        }
    }

    /// Compares a session's text with its mirror and flags it unsaved on
    /// mismatch. The mirror is then rewritten with the current text either
    /// way, so it always holds the last observed content.
    async fn check_changes(&mut self, id: &SessionId, serial: u64) {
        let Some(session) = self.session_mut(id, serial) else {
            return;
        };
        if !session.mirror_ready {
            debug!("Skipping check for {}: mirror not written yet", id);
            return;
        }
        let text = session.buffer.text().into_owned();
        let already_dirty = session.dirty;

        if !already_dirty {
            match self.store.read(id).await {
                Ok(bytes) => {
                    if String::from_utf8_lossy(&bytes) != text {
                        self.set_dirty(id, true);
                    }
                }
                Err(err) => warn!("Mirror read failed for {}: {}", id, err),
            }
        }

        if let Err(err) = self.store.write(id, &text).await {
            warn!("Mirror rewrite failed for {}: {}", id, err);
        }
    }

    /// Clears a session's unsaved flag after it was saved elsewhere, and
    /// resets its mirror to the current text.
    ///
    /// If the initial mirror write is still in flight, the reset is held
    /// back until it lands so the older text cannot overwrite it.
    pub async fn mark_saved(&mut self, id: &SessionId) -> CoreResult<()> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.id() == id)
            .ok_or_else(|| CoreError::SessionNotFound(id.clone()))?;
        let text = session.buffer.text().into_owned();

        if session.mirror_ready {
            if let Err(err) = self.store.write(id, &text).await {
                warn!("Mirror rewrite failed for {}: {}", id, err);
            }
        } else {
            debug!("Holding mirror reset for {} until its first write lands", id);
            session.deferred_mirror = Some(text);
        }
        self.set_dirty(id, false);
        Ok(())
    }

    fn set_dirty(&mut self, id: &SessionId, dirty: bool) {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id() == id) else {
            return;
        };
        if session.dirty == dirty {
            return;
        }
        session.dirty = dirty;
        self.tiles.set_notice(id, dirty && !session.read_only);
        self.events.emit(SessionEvent::DirtyChanged(id.clone(), dirty));
        self.events.emit(SessionEvent::Updated);
    }

    // ==================== View State ====================

    /// Records whether the editor view has focus; switching restores it.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Moves the open-file list.
    pub fn move_file_list(&mut self, position: FileListPosition) {
        self.config.file_list_position = position;
        self.tiles.set_position(position);
        self.events.emit(SessionEvent::Updated);
    }

    // ==================== Queries ====================

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns true once queued opens have been replayed.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Number of opens waiting for the store.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Returns the open sessions in opening order.
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter()
    }

    pub fn get(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id() == id)
    }

    /// Returns the first session matching a lookup.
    pub fn find(&self, lookup: &Lookup<'_>) -> Option<&Session> {
        self.sessions.iter().find(|s| s.matches(lookup))
    }

    pub fn active_id(&self) -> Option<&SessionId> {
        self.active.as_ref()
    }

    pub fn active(&self) -> Option<&Session> {
        self.active.as_ref().and_then(|id| self.get(id))
    }

    /// Mutable access to the active buffer for selection and cursor moves.
    /// Content edits belong in [`SessionManager::edit_active`].
    pub fn active_buffer_mut(&mut self) -> Option<&mut EditSession> {
        let id = self.active.as_ref()?;
        self.sessions
            .iter_mut()
            .find(|s| s.id() == id)
            .map(|s| &mut s.buffer)
    }

    /// Returns snapshots of all sessions in opening order.
    pub fn summaries(&self) -> Vec<SessionSummary> {
        self.sessions
            .iter()
            .map(|s| {
                let active = self.active.as_ref() == Some(s.id());
                s.summary(active, self.config.subtitle_max_len)
            })
            .collect()
    }

    /// Subscribes to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn index_of(&self, id: &SessionId) -> Option<usize> {
        self.sessions.iter().position(|s| s.id() == id)
    }

    /// Finds a session only if it is the same one a message was sent for.
    fn session_mut(&mut self, id: &SessionId, serial: u64) -> Option<&mut Session> {
        self.sessions
            .iter_mut()
            .find(|s| s.id() == id && s.serial == serial)
    }
}
