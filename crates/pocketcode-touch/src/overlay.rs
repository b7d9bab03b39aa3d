//! Selection handle overlay.
//!
//! Started by "select word": the cursor is widened to the word under it,
//! two drag handles are drawn at the selection edges, and a context menu
//! floats above the end handle. The overlay listens for content clicks,
//! scrolling, selection changes and handle touches until a click outside or
//! an empty selection tears it down.
//!
//! ## Geometry
//!
//! Handle positions are read from the marker layer on a full recompute and
//! then only translated while the view scrolls, relative to the scroll
//! offset seen at that recompute. Selection changes are recomputed one tick
//! later, after the renderer has repainted its markers; the owner delivers
//! that tick as [`OverlayEvent::Tick`].

use pocketcode_buffer::{BufferResult, EditSession, Position};
use pocketcode_core::OverlayConfig;
use tracing::debug;

use crate::geometry::{Point, Rect, ScrollOffset};
use crate::menu::{place_menu, Clipboard, MenuAction};
use crate::surface::{Handle, HandleTransform, MarkerLayer, OverlaySurface};

/// Something the overlay can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    ContentClick,
    Scroll,
    SelectionChange,
    HandleTouch(Handle),
    /// Installed only while a handle is dragged
    TouchMove,
    /// Installed only while a handle is dragged
    TouchEnd,
}

/// Input delivered to [`HandleOverlay::handle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayEvent {
    /// A click on the content area
    ContentClick,
    /// The editor scrolled
    ScrollChanged,
    /// The selection or cursor moved
    SelectionChanged,
    TouchStart(Handle),
    TouchMove(Point),
    TouchEnd,
    /// The next scheduler tick; runs a deferred recompute
    Tick,
}

impl OverlayEvent {
    fn listener(self) -> Option<Listener> {
        match self {
            OverlayEvent::ContentClick => Some(Listener::ContentClick),
            OverlayEvent::ScrollChanged => Some(Listener::Scroll),
            OverlayEvent::SelectionChanged => Some(Listener::SelectionChange),
            OverlayEvent::TouchStart(handle) => Some(Listener::HandleTouch(handle)),
            OverlayEvent::TouchMove(_) => Some(Listener::TouchMove),
            OverlayEvent::TouchEnd => Some(Listener::TouchEnd),
            OverlayEvent::Tick => None,
        }
    }
}

/// Which handle a recompute reads fresh from the marker layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recompute {
    Both,
    Only(Handle),
}

/// State of a running overlay.
///
/// ## Learning: Option as a State Machine
///
/// The overlay holds `Option<Active>`. Teardown is `take()`, so handle
/// positions, listeners and pending work all vanish together and no field
/// can be read while inactive.
#[derive(Debug)]
struct Active {
    start: Point,
    end: Point,
    /// Scroll offset at the last full recompute
    snapshot: ScrollOffset,
    last_cursor: Option<Rect>,
    listeners: Vec<Listener>,
    dragging: Option<Handle>,
    pending: Option<Recompute>,
    read_only: bool,
}

pub struct HandleOverlay {
    config: OverlayConfig,
    surface: Box<dyn OverlaySurface>,
    active: Option<Active>,
}

impl HandleOverlay {
    pub fn new(config: OverlayConfig, surface: Box<dyn OverlaySurface>) -> Self {
        Self {
            config,
            surface,
            active: None,
        }
    }

    // ==================== Lifecycle ====================

    /// Selects the word at the cursor and shows the handles and menu.
    ///
    /// A running overlay is torn down first. Returns false if there was no
    /// word to select, in which case nothing stays on screen.
    pub fn start(&mut self, buffer: &mut EditSession, layer: &dyn MarkerLayer, read_only: bool) -> bool {
        if self.active.is_some() {
            self.teardown();
        }

        buffer.select_word();
        self.active = Some(Active {
            start: Point::default(),
            end: Point::default(),
            snapshot: layer.scroll(),
            last_cursor: None,
            listeners: vec![
                Listener::ContentClick,
                Listener::Scroll,
                Listener::SelectionChange,
                Listener::HandleTouch(Handle::Start),
                Listener::HandleTouch(Handle::End),
            ],
            dragging: None,
            pending: None,
            read_only,
        });
        self.surface.set_menu_items(MenuAction::items(read_only));
        self.surface.mount();
        debug!("Selection overlay started");

        self.recompute(Recompute::Both, buffer, layer);
        self.is_active()
    }

    /// Removes the handles and menu and detaches every listener.
    pub fn teardown(&mut self) {
        if self.active.take().is_some() {
            self.surface.unmount();
            debug!("Selection overlay torn down");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_listening(&self, listener: Listener) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| a.listeners.contains(&listener))
    }

    /// Returns true while a deferred recompute waits for its tick.
    pub fn has_pending(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.pending.is_some())
    }

    /// Raw start and end handle anchors, before nudges and scroll deltas.
    pub fn handle_positions(&self) -> Option<(Point, Point)> {
        self.active.as_ref().map(|a| (a.start, a.end))
    }

    pub fn dragging(&self) -> Option<Handle> {
        self.active.as_ref().and_then(|a| a.dragging)
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    // ==================== Events ====================

    /// Delivers an event. Returns false if no installed listener took it.
    pub fn handle(
        &mut self,
        event: OverlayEvent,
        buffer: &mut EditSession,
        layer: &mut dyn MarkerLayer,
    ) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if let Some(listener) = event.listener() {
            if !active.listeners.contains(&listener) {
                return false;
            }
        }

        match event {
            OverlayEvent::ContentClick => self.teardown(),
            OverlayEvent::ScrollChanged => self.follow_scroll(&*layer),
            OverlayEvent::SelectionChanged => {
                // Treated as an end-handle update
                active.pending = Some(Recompute::Only(Handle::End));
            }
            OverlayEvent::TouchStart(handle) => {
                active.dragging = Some(handle);
                active.listeners.push(Listener::TouchMove);
                active.listeners.push(Listener::TouchEnd);
            }
            OverlayEvent::TouchMove(point) => self.drag(point, buffer, layer),
            OverlayEvent::TouchEnd => {
                active.dragging = None;
                active
                    .listeners
                    .retain(|l| !matches!(l, Listener::TouchMove | Listener::TouchEnd));
            }
            OverlayEvent::Tick => match active.pending.take() {
                Some(mode) => self.recompute(mode, buffer, &*layer),
                None => return false,
            },
        }
        true
    }

    /// Runs a context menu action. Editing actions are refused on a
    /// read-only buffer. Every action but select-all closes the overlay.
    ///
    /// Returns false if the action was refused or no overlay is running.
    pub fn run_action(
        &mut self,
        action: MenuAction,
        buffer: &mut EditSession,
        clipboard: &mut dyn Clipboard,
    ) -> BufferResult<bool> {
        let Some(active) = self.active.as_mut() else {
            return Ok(false);
        };
        if active.read_only && action.edits() {
            return Ok(false);
        }

        action.apply(buffer, clipboard)?;
        match action {
            MenuAction::SelectAll => active.pending = Some(Recompute::Both),
            _ => self.teardown(),
        }
        Ok(true)
    }

    fn drag(&mut self, point: Point, buffer: &mut EditSession, layer: &mut dyn MarkerLayer) {
        let Some(handle) = self.dragging() else {
            return;
        };

        // Aim above the finger so the insertion point stays visible
        let point = point.translate(0.0, -self.config.finger_offset);
        let target = layer.screen_to_position(buffer, point);
        let range = buffer.selection().range();

        match handle {
            Handle::Start => {
                let pos = if target >= range.end {
                    step_back(buffer, range.end).unwrap_or(range.start)
                } else {
                    target
                };
                buffer.set_selection_anchor(pos);
                layer.scroll_into_view(buffer, pos);
                self.recompute(Recompute::Only(Handle::Start), buffer, &*layer);
            }
            Handle::End => {
                let pos = if target <= range.start {
                    step_forward(buffer, range.start).unwrap_or(range.end)
                } else {
                    target
                };
                buffer.select_to(pos);
                layer.scroll_into_view(buffer, pos);
                // Picked up when the selection change lands
                if let Some(active) = self.active.as_mut() {
                    active.pending = Some(Recompute::Only(Handle::End));
                }
            }
        }
    }

    // ==================== Geometry ====================

    fn follow_scroll(&mut self, layer: &dyn MarkerLayer) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        let (dx, dy) = layer.scroll().since(active.snapshot);
        self.place(-dx, -dy, layer);
    }

    fn recompute(&mut self, mode: Recompute, buffer: &EditSession, layer: &dyn MarkerLayer) {
        if buffer.selected_text().is_none() {
            self.teardown();
            return;
        }
        let Some(active) = self.active.as_mut() else {
            return;
        };

        let rects = layer.selection_rects(buffer);
        let cursor = layer.cursor_rect(buffer).or(active.last_cursor);
        let scroll = layer.scroll();
        let (dx, dy) = scroll.since(active.snapshot);

        let edges = match rects.as_slice() {
            [] => None,
            [only] => Some((only.bottom_left(), only.bottom_right())),
            [first, .., last] => Some((first.bottom_left(), last.bottom_right())),
        };

        match (edges, mode) {
            (Some((start, _)), Recompute::Only(Handle::Start)) => {
                active.start = start;
                active.end = active.end.translate(-dx, -dy);
            }
            (Some((_, end)), Recompute::Only(Handle::End)) => {
                active.start = active.start.translate(-dx, -dy);
                active.end = end;
            }
            (Some((start, end)), Recompute::Both) => {
                active.start = start;
                active.end = end;
            }
            (None, _) => {
                if let Some(cursor) = cursor {
                    active.start = cursor.bottom_left();
                    active.end = cursor.bottom_right();
                }
            }
        }

        active.last_cursor = cursor;
        active.snapshot = scroll;
        let swatch = if active.read_only {
            None
        } else {
            buffer.selected_text()
        };
        self.surface.set_swatch(swatch.as_deref());
        self.place(0.0, 0.0, layer);
    }

    /// Draws the handles and menu, shifted by `(dx, dy)`.
    fn place(&mut self, dx: f32, dy: f32, layer: &dyn MarkerLayer) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        let offset = layer.horizontal_offset();

        self.surface.place_handle(
            Handle::Start,
            HandleTransform {
                x: active.start.x + self.config.start_nudge + dx - offset,
                y: active.start.y + dy,
                rotation: Handle::Start.rotation(),
            },
        );
        self.surface.place_handle(
            Handle::End,
            HandleTransform {
                x: active.end.x + self.config.end_nudge + dx - offset,
                y: active.end.y + dy,
                rotation: Handle::End.rotation(),
            },
        );

        let left = active.end.x + dx - offset;
        let top = active.end.y - (self.config.menu_gap + layer.line_height()) + dy;
        let available = layer.viewport_width() - self.config.viewport_margin;
        let placement = place_menu(
            left,
            top,
            self.surface.menu_size(),
            available,
            self.config.menu_min_top,
        );
        self.surface.place_menu(placement);
    }
}

/// The position one character before `pos`, crossing line breaks.
fn step_back(buffer: &EditSession, pos: Position) -> Option<Position> {
    let idx = buffer.position_to_char_idx(pos).ok()?;
    buffer.char_idx_to_position(idx.checked_sub(1)?).ok()
}

/// The position one character after `pos`, crossing line breaks.
fn step_forward(buffer: &EditSession, pos: Position) -> Option<Position> {
    let idx = buffer.position_to_char_idx(pos).ok()? + 1;
    if idx > buffer.len_chars() {
        return None;
    }
    buffer.char_idx_to_position(idx).ok()
}
