//! # Pocketcode Touch
//!
//! Touch text selection on top of the active buffer.
//!
//! [`HandleOverlay`] is a one-shot state machine: `start` selects the word at
//! the cursor and shows two drag handles plus a context menu; events from
//! the editor move them around; a click outside removes everything again.
//!
//! The overlay never touches a renderer directly. It reads layout through a
//! [`MarkerLayer`] and draws through an [`OverlaySurface`], so it runs the
//! same against [`MonospaceLayout`] in the terminal shell and against test
//! doubles.

pub mod geometry;
pub mod layout;
pub mod menu;
pub mod overlay;
pub mod surface;

pub use geometry::{Point, Rect, ScrollOffset, Size};
pub use layout::MonospaceLayout;
pub use menu::{Clipboard, MemoryClipboard, MenuAction, SystemClipboard, UnknownAction};
pub use overlay::{HandleOverlay, Listener, OverlayEvent};
pub use surface::{
    Handle, HandleTransform, HeadlessSurface, MarkerLayer, MenuPlacement, OverlaySurface,
    SurfaceState,
};
