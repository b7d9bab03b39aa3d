//! The floating context menu: its actions, where it goes, and the clipboard
//! they work against.

use pocketcode_buffer::{BufferResult, EditSession};
use std::fmt;
use std::str::FromStr;

use crate::geometry::Size;
use crate::surface::MenuPlacement;

/// Menu entries shown for a writable buffer.
const FULL_MENU: &[MenuAction] = &[
    MenuAction::Copy,
    MenuAction::Cut,
    MenuAction::Paste,
    MenuAction::SelectAll,
];

/// Menu entries shown for a read-only buffer.
const READ_ONLY_MENU: &[MenuAction] = &[MenuAction::Copy, MenuAction::SelectAll];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    Copy,
    Cut,
    Paste,
    SelectAll,
}

impl MenuAction {
    /// Returns the entries to offer.
    pub fn items(read_only: bool) -> &'static [MenuAction] {
        if read_only { READ_ONLY_MENU } else { FULL_MENU }
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuAction::Copy => "copy",
            MenuAction::Cut => "cut",
            MenuAction::Paste => "paste",
            MenuAction::SelectAll => "select all",
        }
    }

    /// Returns true if the action can change the buffer content.
    pub fn edits(self) -> bool {
        matches!(self, MenuAction::Cut | MenuAction::Paste)
    }

    /// Runs the action against a buffer.
    pub fn apply(self, buffer: &mut EditSession, clipboard: &mut dyn Clipboard) -> BufferResult<()> {
        match self {
            MenuAction::Copy => {
                if let Some(text) = buffer.selected_text() {
                    clipboard.write(text);
                }
            }
            MenuAction::Cut => {
                if let Some(text) = buffer.selected_text() {
                    clipboard.write(text);
                    buffer.replace_selection("")?;
                }
            }
            MenuAction::Paste => {
                if let Some(text) = clipboard.read() {
                    buffer.replace_selection(&text)?;
                }
            }
            MenuAction::SelectAll => buffer.select_all(),
        }
        Ok(())
    }
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown menu action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for MenuAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "copy" => Ok(MenuAction::Copy),
            "cut" => Ok(MenuAction::Cut),
            "paste" => Ok(MenuAction::Paste),
            "select-all" | "selectall" | "select_all" | "all" => Ok(MenuAction::SelectAll),
            _ => Err(UnknownAction(s.to_string())),
        }
    }
}

/// Positions the menu from its desired top-left corner.
///
/// A menu wider than `available` is scaled down to fit. One that overflows
/// the right edge is centered, one left of the screen is pinned to 0, and one
/// above the screen is pulled down to `min_top`.
pub fn place_menu(left: f32, top: f32, size: Size, available: f32, min_top: f32) -> MenuPlacement {
    let mut scale = 1.0;
    if size.width > available && size.width > 0.0 {
        scale = available / size.width;
    }

    let mut x = left;
    if left < 0.0 {
        x = 0.0;
    }
    if left + size.width > available {
        x = (available - size.width * scale) / 2.0;
    }

    let y = if top < 0.0 { min_top } else { top };

    MenuPlacement {
        left: x,
        top: y,
        scale,
    }
}

// ==================== Clipboard ====================

/// Text clipboard used by copy, cut and paste.
pub trait Clipboard {
    fn read(&self) -> Option<String>;
    fn write(&mut self, text: String);
}

/// Clipboard kept in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    text: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for MemoryClipboard {
    fn read(&self) -> Option<String> {
        self.text.clone()
    }

    fn write(&mut self, text: String) {
        self.text = Some(text);
    }
}

/// The desktop clipboard. Failures to reach it are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    /// Returns true if a system clipboard can be opened here.
    pub fn available() -> bool {
        arboard::Clipboard::new().is_ok()
    }
}

impl Clipboard for SystemClipboard {
    fn read(&self) -> Option<String> {
        let mut clipboard = arboard::Clipboard::new().ok()?;
        clipboard.get_text().ok()
    }

    fn write(&mut self, text: String) {
        if let Ok(mut clipboard) = arboard::Clipboard::new() {
            let _ = clipboard.set_text(text);
        }
    }
}
