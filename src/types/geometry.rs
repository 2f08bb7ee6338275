//! Rectangles in document pixel space.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, edges in absolute document coordinates.
///
/// `right` and `bottom` are exclusive. A rectangle whose width or height is
/// not positive is *degenerate*; some fill-layer encodings produce these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// The zero-rectangle sentinel returned for empty unions.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle from origin and size.
    pub const fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Smallest rectangle containing both. Degenerate inputs are ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_degenerate() {
            return *other;
        }
        if other.is_degenerate() {
            return *self;
        }
        Rect::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.left + dx, self.top + dy, self.right + dx, self.bottom + dy)
    }

    /// Grow on every side by `amount`.
    pub fn inflate(&self, amount: i32) -> Rect {
        Rect::new(
            self.left - amount,
            self.top - amount,
            self.right + amount,
            self.bottom + amount,
        )
    }

    /// Express this rectangle relative to `origin`'s top-left corner.
    pub fn relative_to(&self, origin: &Rect) -> Rect {
        self.translate(-origin.left, -origin.top)
    }
}

/// Nine-slice insets in `top, right, bottom, left` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Border {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Border {
    pub const fn new(top: u32, right: u32, bottom: u32, left: u32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn horizontal(&self) -> u32 {
        self.left.saturating_add(self.right)
    }

    pub fn vertical(&self) -> u32 {
        self.top.saturating_add(self.bottom)
    }

    /// Whether the insets leave a stretchable centre inside `width x height`.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.horizontal() < width && self.vertical() < height
    }

    /// The stretchable centre as `(x, y, width, height)`.
    ///
    /// This is how the package manifest stores a nine-slice grid.
    pub fn grid_rect(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        (
            self.left,
            self.top,
            width.saturating_sub(self.horizontal()),
            height.saturating_sub(self.vertical()),
        )
    }

    /// Inverse of [`Border::grid_rect`].
    pub fn from_grid_rect(x: u32, y: u32, w: u32, h: u32, width: u32, height: u32) -> Self {
        Border::new(
            y,
            width.saturating_sub(x.saturating_add(w)),
            height.saturating_sub(y.saturating_add(h)),
            x,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 20, 20);
        assert_eq!(a.union(&b), Rect::new(0, 0, 20, 20));
    }

    #[test]
    fn test_union_ignores_degenerate() {
        let a = Rect::new(3, 3, 3, 9);
        let b = Rect::new(5, 5, 20, 20);
        assert_eq!(a.union(&b), b);
        assert_eq!(b.union(&a), b);
    }

    #[test]
    fn test_degenerate() {
        assert!(Rect::ZERO.is_degenerate());
        assert!(Rect::new(10, 0, 5, 10).is_degenerate());
        assert!(!Rect::new(0, 0, 1, 1).is_degenerate());
    }

    #[test]
    fn test_relative_to() {
        let r = Rect::new(15, 25, 30, 40);
        let origin = Rect::new(10, 20, 100, 100);
        assert_eq!(r.relative_to(&origin), Rect::new(5, 5, 20, 20));
    }

    #[test]
    fn test_grid_rect_round_trip() {
        let border = Border::new(4, 6, 8, 2);
        let (x, y, w, h) = border.grid_rect(40, 30);
        assert_eq!((x, y, w, h), (2, 4, 32, 18));
        assert_eq!(Border::from_grid_rect(x, y, w, h, 40, 30), border);
    }

    #[test]
    fn test_border_fits() {
        let border = Border::new(4, 4, 4, 4);
        assert!(border.fits(9, 9));
        assert!(!border.fits(8, 9));
    }

    #[test]
    fn test_huge_border_never_fits() {
        let border = Border::new(1, 1, 1, u32::MAX);
        assert_eq!(border.horizontal(), u32::MAX);
        assert!(!border.fits(u32::MAX, 10));
        assert!(Border::new(u32::MAX, 1, 1, 1).vertical() == u32::MAX);
    }
}
