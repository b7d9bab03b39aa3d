//! A fixed-pitch layout of the active buffer.
//!
//! Every character is `char_width` wide and every line `line_height` tall, so
//! screen geometry follows directly from `(row, column)` and the scroll
//! offset. This is what the terminal shell renders against.

use pocketcode_buffer::{EditSession, Position};

use crate::geometry::{Point, Rect, ScrollOffset, Size};
use crate::surface::MarkerLayer;

const CURSOR_WIDTH: f32 = 2.0;

#[derive(Debug, Clone)]
pub struct MonospaceLayout {
    char_width: f32,
    line_height: f32,
    /// Screen position of the text origin (row 0, column 0) before scrolling
    origin: Point,
    viewport: Size,
    scroll: ScrollOffset,
    margin_left: f32,
}

impl MonospaceLayout {
    pub fn new(char_width: f32, line_height: f32, viewport: Size) -> Self {
        Self {
            char_width,
            line_height,
            origin: Point::default(),
            viewport,
            scroll: ScrollOffset::default(),
            margin_left: 0.0,
        }
    }

    /// Moves the text origin, e.g. below a header.
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    pub fn set_scroll(&mut self, scroll: ScrollOffset) {
        self.scroll = ScrollOffset::new(scroll.top.max(0.0), scroll.left.max(0.0));
    }

    pub fn set_margin_left(&mut self, margin: f32) {
        self.margin_left = margin;
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Screen rectangle of the character cell at `position`.
    pub fn cell_rect(&self, position: Position) -> Rect {
        Rect::new(
            self.origin.x + position.column as f32 * self.char_width - self.scroll.left,
            self.origin.y + position.row as f32 * self.line_height - self.scroll.top,
            self.char_width,
            self.line_height,
        )
    }

    fn span_rect(&self, row: usize, from: usize, to: usize) -> Rect {
        let cell = self.cell_rect(Position::new(row, from));
        Rect::new(cell.left, cell.top, (to - from) as f32 * self.char_width, self.line_height)
    }
}

impl MarkerLayer for MonospaceLayout {
    fn selection_rects(&self, buffer: &EditSession) -> Vec<Rect> {
        let range = buffer.selection().range();
        if range.is_empty() {
            return Vec::new();
        }

        let mut rects = Vec::new();
        for row in range.start.row..=range.end.row {
            // A selection ending at column 0 paints nothing on its last row
            if row == range.end.row && range.end.column == 0 && row != range.start.row {
                break;
            }
            let from = if row == range.start.row {
                range.start.column
            } else {
                0
            };
            let to = if row == range.end.row {
                range.end.column
            } else {
                // Middle rows include the line break cell
                buffer.line_len(row).unwrap_or(0) + 1
            };
            rects.push(self.span_rect(row, from, to.max(from)));
        }
        rects
    }

    fn cursor_rect(&self, buffer: &EditSession) -> Option<Rect> {
        let cell = self.cell_rect(buffer.cursor());
        Some(Rect::new(cell.left, cell.top, CURSOR_WIDTH, self.line_height))
    }

    fn scroll(&self) -> ScrollOffset {
        self.scroll
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }

    fn screen_to_position(&self, buffer: &EditSession, point: Point) -> Position {
        let y = point.y - self.origin.y + self.scroll.top;
        let x = point.x - self.origin.x + self.scroll.left;
        let row = (y / self.line_height).floor().max(0.0) as usize;
        let column = (x / self.char_width).round().max(0.0) as usize;
        buffer.clamp(Position::new(row, column))
    }

    fn scroll_into_view(&mut self, _buffer: &EditSession, position: Position) {
        let top = position.row as f32 * self.line_height;
        let bottom = top + self.line_height;
        if top < self.scroll.top {
            self.scroll.top = top;
        } else if bottom > self.scroll.top + self.viewport.height {
            self.scroll.top = bottom - self.viewport.height;
        }

        let left = position.column as f32 * self.char_width;
        let right = left + self.char_width;
        if left < self.scroll.left {
            self.scroll.left = left;
        } else if right > self.scroll.left + self.viewport.width {
            self.scroll.left = right - self.viewport.width;
        }
    }

    fn viewport_width(&self) -> f32 {
        self.viewport.width
    }

    fn horizontal_offset(&self) -> f32 {
        self.margin_left
    }
}
