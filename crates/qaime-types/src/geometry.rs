//! Screen geometry in logical pixels.
//!
//! All values are `f64` so tiling can divide the viewport evenly without
//! rounding gaps. Origins are top-left.

use serde::{Deserialize, Serialize};

/// A point on screen (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    pub fn delta_from(&self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Clamp each axis into `[min, max]`.
    ///
    /// The minimum wins when `max < min` (a viewport smaller than the minimum
    /// window still yields a minimum-sized window).
    pub fn clamp(&self, min: Size, max: Size) -> Size {
        Size::new(
            self.width.min(max.width).max(min.width),
            self.height.min(max.height).max(min.height),
        )
    }
}

/// A positioned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            position: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn from_parts(position: Point, size: Size) -> Self {
        Self { position, size }
    }

    pub fn right(&self) -> f64 {
        self.position.x + self.size.width
    }

    pub fn bottom(&self) -> f64 {
        self.position.y + self.size.height
    }

    pub fn area(&self) -> f64 {
        self.size.area()
    }

    /// True when the interiors overlap (shared edges do not count).
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.position.x < other.right()
            && other.position.x < self.right()
            && self.position.y < other.bottom()
            && other.position.y < self.bottom()
    }

    /// A rect of `size` centered in `bounds` (may be negative if it doesn't fit).
    pub fn centered(size: Size, bounds: Size) -> Rect {
        Rect::from_parts(
            Point::new(
                ((bounds.width - size.width) / 2.0).floor(),
                ((bounds.height - size.height) / 2.0).floor(),
            ),
            size,
        )
    }
}

/// The host screen as seen at interaction time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Height of the fixed top navigation bar, when one is mounted.
    #[serde(default)]
    pub top_chrome: Option<f64>,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            top_chrome: None,
        }
    }

    pub fn with_top_chrome(mut self, height: f64) -> Self {
        self.top_chrome = Some(height);
        self
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Largest position a window of `size` may take while staying on screen.
    pub fn max_position(&self, size: Size) -> Point {
        Point::new(
            (self.width - size.width).max(0.0),
            (self.height - size.height).max(0.0),
        )
    }

    /// Space remaining to the right of and below `position`.
    pub fn remaining_from(&self, position: Point) -> Size {
        Size::new(self.width - position.x, self.height - position.y)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1920.0, 1080.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_clamp_prefers_minimum() {
        let min = Size::new(500.0, 400.0);
        let max = Size::new(1200.0, 800.0);
        assert_eq!(Size::new(100.0, 100.0).clamp(min, max), min);
        assert_eq!(Size::new(2000.0, 2000.0).clamp(min, max), max);
        assert_eq!(
            Size::new(700.0, 450.0).clamp(min, Size::new(300.0, 300.0)),
            min
        );
    }

    #[test]
    fn rect_overlap_ignores_shared_edges() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(100.0, 0.0, 100.0, 100.0);
        let c = Rect::new(50.0, 50.0, 100.0, 100.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    #[test]
    fn centered_floors_to_whole_pixels() {
        let r = Rect::centered(Size::new(901.0, 600.0), Size::new(1920.0, 1080.0));
        assert_eq!(r.position, Point::new(509.0, 240.0));
    }

    #[test]
    fn viewport_bounds() {
        let vp = Viewport::new(1000.0, 800.0);
        assert_eq!(vp.max_position(Size::new(600.0, 500.0)), Point::new(400.0, 300.0));
        assert_eq!(vp.max_position(Size::new(1600.0, 900.0)), Point::ORIGIN);
        assert_eq!(vp.remaining_from(Point::new(100.0, 50.0)), Size::new(900.0, 750.0));
    }
}
