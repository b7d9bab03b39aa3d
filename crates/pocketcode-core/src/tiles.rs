//! The open-file list.
//!
//! One tile per session, keyed by session id. The manager only holds the id
//! relation; removing a session removes its tile no matter what the UI does
//! with it afterwards.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::FileListPosition;
use crate::session::SessionId;

/// The widget listing open sessions.
pub trait TileList {
    /// Appends a tile.
    fn add(&mut self, id: &SessionId, label: &str, icon: &str);

    /// Removes a tile.
    fn remove(&mut self, id: &SessionId);

    /// Updates a tile's label and icon.
    fn relabel(&mut self, id: &SessionId, label: &str, icon: &str);

    /// Highlights or un-highlights the active tile.
    fn set_active(&mut self, id: &SessionId, active: bool);

    /// Marks a tile as having unsaved changes.
    fn set_notice(&mut self, id: &SessionId, notice: bool);

    /// Scrolls the list so the tile is visible.
    fn scroll_into_view(&mut self, id: &SessionId);

    /// Moves the whole list, keeping tile order.
    fn set_position(&mut self, position: FileListPosition);
}

/// What one tile shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileState {
    pub id: SessionId,
    pub label: String,
    pub icon: String,
    pub active: bool,
    pub notice: bool,
}

/// A tile list kept in memory, for headless shells and tests.
///
/// Clones share state: hand one clone to the manager and read the other.
#[derive(Debug, Clone, Default)]
pub struct TileStrip {
    inner: Rc<RefCell<StripState>>,
}

#[derive(Debug, Default)]
struct StripState {
    tiles: Vec<TileState>,
    position: FileListPosition,
    scrolled_to: Option<SessionId>,
}

impl TileStrip {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the tiles in display order.
    pub fn tiles(&self) -> Vec<TileState> {
        self.inner.borrow().tiles.clone()
    }

    /// Returns one tile.
    pub fn tile(&self, id: &SessionId) -> Option<TileState> {
        self.inner.borrow().tiles.iter().find(|t| &t.id == id).cloned()
    }

    /// Returns where the list currently lives.
    pub fn position(&self) -> FileListPosition {
        self.inner.borrow().position
    }

    /// Returns the tile last scrolled into view.
    pub fn scrolled_to(&self) -> Option<SessionId> {
        self.inner.borrow().scrolled_to.clone()
    }

    fn with_tile(&self, id: &SessionId, f: impl FnOnce(&mut TileState)) {
        if let Some(tile) = self.inner.borrow_mut().tiles.iter_mut().find(|t| &t.id == id) {
            f(tile);
        }
    }
}

impl TileList for TileStrip {
    fn add(&mut self, id: &SessionId, label: &str, icon: &str) {
        self.inner.borrow_mut().tiles.push(TileState {
            id: id.clone(),
            label: label.to_string(),
            icon: icon.to_string(),
            active: false,
            notice: false,
        });
    }

    fn remove(&mut self, id: &SessionId) {
        let mut state = self.inner.borrow_mut();
        state.tiles.retain(|t| &t.id != id);
        if state.scrolled_to.as_ref() == Some(id) {
            state.scrolled_to = None;
        }
    }

    fn relabel(&mut self, id: &SessionId, label: &str, icon: &str) {
        self.with_tile(id, |tile| {
            tile.label = label.to_string();
            tile.icon = icon.to_string();
        });
    }

    fn set_active(&mut self, id: &SessionId, active: bool) {
        self.with_tile(id, |tile| tile.active = active);
    }

    fn set_notice(&mut self, id: &SessionId, notice: bool) {
        self.with_tile(id, |tile| tile.notice = notice);
    }

    fn scroll_into_view(&mut self, id: &SessionId) {
        self.inner.borrow_mut().scrolled_to = Some(id.clone());
    }

    fn set_position(&mut self, position: FileListPosition) {
        self.inner.borrow_mut().position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let strip = TileStrip::new();
        let mut handle = strip.clone();
        let id = SessionId::from("a");

        handle.add(&id, "a.txt", "file");
        handle.set_notice(&id, true);
        handle.set_position(FileListPosition::Header);

        let tile = strip.tile(&id).unwrap();
        assert!(tile.notice);
        assert_eq!(strip.position(), FileListPosition::Header);

        handle.remove(&id);
        assert!(strip.tiles().is_empty());
    }
}
