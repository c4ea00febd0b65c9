//! Axis-aligned hit boxes
//!
//! Width and height are extents, not a second corner.

use std::fmt;

use glam::{IVec2, Vec2, Vec4};

/// Immutable axis-aligned rectangle used for overlap tests
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HitBox {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

impl HitBox {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Returns true if `other` overlaps this box
    ///
    /// Boxes with a non-positive width or height never intersect anything,
    /// themselves included.
    pub fn intersects(&self, other: &HitBox) -> bool {
        self.overlaps(other.x, other.y, other.w, other.h)
    }

    /// Returns true if the unit cell at `(x, y)` overlaps this box
    pub fn intersects_point(&self, x: f32, y: f32) -> bool {
        self.overlaps(x, y, 1.0, 1.0)
    }

    /// Integer-coordinate form of [`HitBox::intersects_point`]
    pub fn intersects_ivec2(&self, point: IVec2) -> bool {
        self.intersects_point(point.x as f32, point.y as f32)
    }

    fn overlaps(&self, x: f32, y: f32, w: f32, h: f32) -> bool {
        if w <= 0.0 || h <= 0.0 || self.w <= 0.0 || self.h <= 0.0 {
            return false;
        }

        x + w > self.x && y + h > self.y && self.right() > x && self.bottom() > y
    }

    pub fn add_xy(&self, x: f32, y: f32) -> Self {
        Self::new(self.x + x, self.y + y, self.w, self.h)
    }

    pub fn add_x(&self, x: f32) -> Self {
        Self::new(self.x + x, self.y, self.w, self.h)
    }

    pub fn add_y(&self, y: f32) -> Self {
        Self::new(self.x, self.y + y, self.w, self.h)
    }

    pub fn add_wh(&self, w: f32, h: f32) -> Self {
        Self::new(self.x, self.y, self.w + w, self.h + h)
    }

    pub fn add_w(&self, w: f32) -> Self {
        Self::new(self.x, self.y, self.w + w, self.h)
    }

    pub fn add_h(&self, h: f32) -> Self {
        Self::new(self.x, self.y, self.w, self.h + h)
    }

    /// Moves the box by `delta`
    pub fn offset(&self, delta: Vec2) -> Self {
        self.add_xy(delta.x, delta.y)
    }

    /// Grows the box by `delta`
    pub fn grow(&self, delta: Vec2) -> Self {
        self.add_wh(delta.x, delta.y)
    }

    /// Returns an equal, independent box
    pub fn copy(&self) -> Self {
        *self
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn width(&self) -> f32 {
        self.w
    }

    pub fn height(&self) -> f32 {
        self.h
    }

    /// X coordinate of the far edge
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Y coordinate of the far edge
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }
}

impl From<Vec4> for HitBox {
    /// Reads `x, y` from the first two lanes and `w, h` from the last two
    fn from(v: Vec4) -> Self {
        Self::new(v.x, v.y, v.z, v.w)
    }
}

impl fmt::Display for HitBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.w, self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_boxes_intersect() {
        let a = HitBox::new(0.0, 0.0, 10.0, 10.0);
        let b = HitBox::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_disjoint_boxes_do_not_intersect() {
        let a = HitBox::new(0.0, 0.0, 10.0, 10.0);
        let b = HitBox::new(20.0, 20.0, 5.0, 5.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = HitBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&HitBox::new(10.0, 0.0, 5.0, 5.0)));
        assert!(!a.intersects(&HitBox::new(0.0, 10.0, 5.0, 5.0)));
    }

    #[test]
    fn test_contained_box_intersects() {
        let outer = HitBox::new(0.0, 0.0, 100.0, 100.0);
        let inner = HitBox::new(40.0, 40.0, 2.0, 2.0);
        assert!(outer.intersects(&inner));
        assert!(inner.intersects(&outer));
    }

    #[test]
    fn test_degenerate_boxes_never_intersect() {
        let unit = HitBox::new(0.0, 0.0, 10.0, 10.0);
        let degenerate = [
            HitBox::new(0.0, 0.0, 0.0, 10.0),
            HitBox::new(0.0, 0.0, 10.0, 0.0),
            HitBox::new(0.0, 0.0, -5.0, 10.0),
            HitBox::new(0.0, 0.0, 10.0, -5.0),
            HitBox::new(2.0, 2.0, 0.0, 0.0),
        ];

        for d in degenerate {
            assert!(!unit.intersects(&d), "{d} should not intersect");
            assert!(!d.intersects(&unit), "{d} should not intersect");
            assert!(!d.intersects(&d), "{d} should not intersect itself");
        }
    }

    #[test]
    fn test_point_intersection() {
        let b = HitBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(b.intersects_point(0.0, 0.0));
        assert!(b.intersects_point(9.0, 9.0));
        assert!(!b.intersects_point(10.0, 5.0));
        assert!(!b.intersects_point(-1.0, 5.0));
        assert!(b.intersects_ivec2(IVec2::new(3, 4)));
        assert!(!HitBox::new(0.0, 0.0, 0.0, 10.0).intersects_point(0.0, 0.0));
    }

    #[test]
    fn test_add_round_trip() {
        let b = HitBox::new(3.0, -7.0, 12.0, 4.0);
        assert_eq!(b.add_x(5.0).add_x(-5.0), b);
        assert_eq!(b.add_y(2.5).add_y(-2.5), b);
        assert_eq!(b.add_wh(1.0, 2.0).add_wh(-1.0, -2.0), b);
    }

    #[test]
    fn test_add_does_not_mutate() {
        let b = HitBox::new(1.0, 2.0, 3.0, 4.0);
        let moved = b.add_xy(10.0, 20.0);
        let grown = b.add_w(1.0).add_h(1.0);

        assert_eq!(b, HitBox::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(moved, HitBox::new(11.0, 22.0, 3.0, 4.0));
        assert_eq!(grown, HitBox::new(1.0, 2.0, 4.0, 5.0));
        assert_eq!(b.offset(Vec2::new(1.0, 1.0)), b.add_xy(1.0, 1.0));
        assert_eq!(b.grow(Vec2::new(1.0, 1.0)), b.add_wh(1.0, 1.0));
    }

    #[test]
    fn test_copy_and_conversions() {
        let b = HitBox::from(Vec4::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(b.copy(), b);
        assert_eq!(b.right(), 4.0);
        assert_eq!(b.bottom(), 6.0);
        assert_eq!(b.to_string(), "(1, 2, 3, 4)");
    }
}
