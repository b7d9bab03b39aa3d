//! Screen-space geometry. All values are in pixels, y grows downward.

/// A point on screen.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Moves the point by `(dx, dy)`.
    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Width and height of an element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle, stored by its edges like a DOM bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn bottom_left(&self) -> Point {
        Point::new(self.left, self.bottom)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.right, self.bottom)
    }
}

/// Scroll position of the editor content.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollOffset {
    pub top: f32,
    pub left: f32,
}

impl ScrollOffset {
    pub const fn new(top: f32, left: f32) -> Self {
        Self { top, left }
    }

    /// Returns `(dx, dy)` scrolled since `earlier`.
    pub fn since(self, earlier: ScrollOffset) -> (f32, f32) {
        (self.left - earlier.left, self.top - earlier.top)
    }
}
