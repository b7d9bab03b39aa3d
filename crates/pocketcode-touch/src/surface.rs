//! The two seams the overlay works through: the renderer it reads layout
//! from, and the surface it draws handles and the menu onto.
//!
//! ## Learning: Trait Objects at the Boundary
//!
//! `Box<dyn OverlaySurface>` and `&dyn MarkerLayer` keep the overlay free of
//! generic parameters, so the shell can swap renderers at runtime.

use pocketcode_buffer::{EditSession, Position};
use std::cell::RefCell;
use std::rc::Rc;

use crate::geometry::{Point, Rect, ScrollOffset, Size};
use crate::menu::MenuAction;

/// Layout of the rendered editor content.
pub trait MarkerLayer {
    /// Screen rectangles of the painted selection highlight, one per visual
    /// line, top to bottom. Empty when nothing is painted.
    fn selection_rects(&self, buffer: &EditSession) -> Vec<Rect>;

    /// Screen rectangle of the text cursor, if painted.
    fn cursor_rect(&self, buffer: &EditSession) -> Option<Rect>;

    fn scroll(&self) -> ScrollOffset;

    fn line_height(&self) -> f32;

    /// Maps a screen point to the nearest document position.
    fn screen_to_position(&self, buffer: &EditSession, point: Point) -> Position;

    /// Scrolls so that `position` is visible.
    fn scroll_into_view(&mut self, buffer: &EditSession, position: Position);

    fn viewport_width(&self) -> f32;

    /// Left margin of the editor root, e.g. while a sidebar pushes it aside.
    fn horizontal_offset(&self) -> f32;
}

/// One of the two drag handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    Start,
    End,
}

impl Handle {
    /// Tilt of the teardrop, in degrees.
    pub fn rotation(self) -> f32 {
        match self {
            Handle::Start => -45.0,
            Handle::End => 45.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HandleTransform {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuPlacement {
    pub left: f32,
    pub top: f32,
    pub scale: f32,
}

/// Where the overlay's elements live.
pub trait OverlaySurface {
    /// Inserts both handles and the menu.
    fn mount(&mut self);

    /// Removes both handles and the menu.
    fn unmount(&mut self);

    fn place_handle(&mut self, handle: Handle, transform: HandleTransform);

    /// Unscaled size of the menu.
    fn menu_size(&self) -> Size;

    fn place_menu(&mut self, placement: MenuPlacement);

    fn set_menu_items(&mut self, items: &[MenuAction]);

    /// Tints the menu's colour swatch with the selected text, so a selected
    /// colour literal previews itself. `None` hides the swatch.
    fn set_swatch(&mut self, color: Option<&str>);
}

/// What a [`HeadlessSurface`] currently shows.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceState {
    pub mounted: bool,
    pub start: Option<HandleTransform>,
    pub end: Option<HandleTransform>,
    pub menu: Option<MenuPlacement>,
    pub items: Vec<MenuAction>,
    pub swatch: Option<String>,
    pub menu_size: Size,
}

/// A surface that only records what it was told.
///
/// Clones share state, so one copy can go to the overlay while another is
/// inspected or printed.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    state: Rc<RefCell<SurfaceState>>,
}

impl HeadlessSurface {
    pub fn new(menu_size: Size) -> Self {
        Self {
            state: Rc::new(RefCell::new(SurfaceState {
                mounted: false,
                start: None,
                end: None,
                menu: None,
                items: Vec::new(),
                swatch: None,
                menu_size,
            })),
        }
    }

    pub fn state(&self) -> SurfaceState {
        self.state.borrow().clone()
    }

    pub fn set_menu_size(&self, size: Size) {
        self.state.borrow_mut().menu_size = size;
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(Size::new(240.0, 48.0))
    }
}

impl OverlaySurface for HeadlessSurface {
    fn mount(&mut self) {
        self.state.borrow_mut().mounted = true;
    }

    fn unmount(&mut self) {
        let mut state = self.state.borrow_mut();
        state.mounted = false;
        state.start = None;
        state.end = None;
        state.menu = None;
        state.swatch = None;
    }

    fn place_handle(&mut self, handle: Handle, transform: HandleTransform) {
        let mut state = self.state.borrow_mut();
        match handle {
            Handle::Start => state.start = Some(transform),
            Handle::End => state.end = Some(transform),
        }
    }

    fn menu_size(&self) -> Size {
        self.state.borrow().menu_size
    }

    fn place_menu(&mut self, placement: MenuPlacement) {
        self.state.borrow_mut().menu = Some(placement);
    }

    fn set_menu_items(&mut self, items: &[MenuAction]) {
        self.state.borrow_mut().items = items.to_vec();
    }

    fn set_swatch(&mut self, color: Option<&str>) {
        self.state.borrow_mut().swatch = color.map(str::to_string);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_unmount_clears_elements() {
        let surface = HeadlessSurface::default();
        let mut handle = surface.clone();
        handle.mount();
        handle.place_handle(Handle::End, HandleTransform::default());
        handle.place_menu(MenuPlacement {
            left: 0.0,
            top: 0.0,
            scale: 1.0,
        });
        handle.set_swatch(Some("#ff0000"));
        assert!(surface.state().end.is_some());
        assert_eq!(surface.state().swatch.as_deref(), Some("#ff0000"));

        handle.unmount();
        let state = surface.state();
        assert!(!state.mounted);
        assert!(state.end.is_none());
        assert!(state.menu.is_none());
        assert!(state.swatch.is_none());
    }
}
