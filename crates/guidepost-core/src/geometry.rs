#![forbid(unsafe_code)]

//! Geometric primitives in page pixel space.
//!
//! Coordinates are document-relative: the origin is the top-left corner of
//! the page, `y` grows downward, and the viewport is just another [`Bounds`]
//! whose `y` is the current scroll offset.

/// A point in page pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The page origin.
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line distance to `other`, floored to whole pixels.
    #[inline]
    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y).floor()
    }

    /// Linear interpolation toward `other`; `t` is clamped to [0, 1].
    #[inline]
    pub fn lerp(&self, other: Point, t: f64) -> Point {
        let t = t.clamp(0.0, 1.0);
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// An axis-aligned box in page pixels (an element's outer box).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Outer width.
    pub width: f64,
    /// Outer height.
    pub height: f64,
}

impl Bounds {
    /// Create a new box.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a box anchored at the page origin.
    #[inline]
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Top-left corner.
    #[inline]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether the box has no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Whether `p` lies inside the box.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// A point offset into the box by fractions of its size.
    ///
    /// `fx`/`fy` are fractions of width/height measured from the top-left.
    #[inline]
    pub fn point_at(&self, fx: f64, fy: f64) -> Point {
        Point::new(self.x + self.width * fx, self.y + self.height * fy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_floored() {
        let a = Point::new(0.0, 0.0);
        assert_eq!(a.distance_to(Point::new(3.0, 4.0)), 5.0);
        assert_eq!(a.distance_to(Point::new(1.0, 1.0)), 1.0);
    }

    #[test]
    fn lerp_clamps() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 20.0);
        assert_eq!(a.lerp(b, 0.5), Point::new(5.0, 10.0));
        assert_eq!(a.lerp(b, 2.0), b);
        assert_eq!(a.lerp(b, -1.0), a);
    }

    #[test]
    fn point_at_offsets_into_box() {
        let b = Bounds::new(100.0, 200.0, 50.0, 10.0);
        let p = b.point_at(0.3, 0.3);
        assert!((p.x - 115.0).abs() < 1e-9);
        assert!((p.y - 203.0).abs() < 1e-9);
        assert!(b.contains(p));
    }

    #[test]
    fn empty_box() {
        assert!(Bounds::from_size(0.0, 10.0).is_empty());
        assert!(!Bounds::from_size(1.0, 1.0).is_empty());
        assert_eq!(Bounds::new(1.0, 2.0, 3.0, 4.0).right(), 4.0);
        assert_eq!(Bounds::new(1.0, 2.0, 3.0, 4.0).bottom(), 6.0);
    }
}
