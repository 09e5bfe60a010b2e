//! Intersection predicates for hit testing
//!
//! Everything here is pure and allocation-free. No trig or randomness, so results
//! are bit-for-bit reproducible for identical inputs.
//!
//! Ellipse tests use an affine trick: dividing both axes by the ellipse radii maps
//! an axis-aligned ellipse onto the unit circle at the origin, after which the
//! circle predicates apply unchanged.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Square of side `size` centered on `center`
    pub fn centered(center: Vec2, size: f32) -> Self {
        Self {
            pos: center - Vec2::splat(size / 2.0),
            size: Vec2::splat(size),
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Map into the space where `center`/`radii` becomes the unit circle
    #[inline]
    fn normalized(&self, center: Vec2, radii: Vec2) -> Self {
        Self {
            pos: (self.pos - center) / radii,
            size: self.size / radii,
        }
    }
}

/// Rectangle vs circle. Tangent contact does not count as a hit.
#[inline]
pub fn rect_circle_intersect(rect: Rect, center: Vec2, radius: f32) -> bool {
    let closest = center.clamp(rect.pos, rect.pos + rect.size);
    center.distance_squared(closest) < radius * radius
}

/// Segment vs circle. Inclusive: touching counts, so swept tests never tunnel.
///
/// A zero-length segment degrades to a point-in-circle test.
#[inline]
pub fn segment_circle_intersect(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> bool {
    let ab = b - a;
    let len2 = ab.length_squared();

    if len2 == 0.0 {
        return center.distance_squared(a) <= radius * radius;
    }

    let t = ((center - a).dot(ab) / len2).clamp(0.0, 1.0);
    let closest = a + ab * t;
    center.distance_squared(closest) <= radius * radius
}

/// Rectangle vs axis-aligned ellipse with semi-axes `radii`
#[inline]
pub fn rect_ellipse_intersect(rect: Rect, center: Vec2, radii: Vec2) -> bool {
    rect_circle_intersect(rect.normalized(center, radii), Vec2::ZERO, 1.0)
}

/// Segment vs axis-aligned ellipse with semi-axes `radii`
#[inline]
pub fn segment_ellipse_intersect(a: Vec2, b: Vec2, center: Vec2, radii: Vec2) -> bool {
    segment_circle_intersect((a - center) / radii, (b - center) / radii, Vec2::ZERO, 1.0)
}

/// Rectangle overlap. Edge-touching rectangles do not overlap.
#[inline]
pub fn rect_intersect(a: Rect, b: Rect) -> bool {
    a.pos.x < b.pos.x + b.size.x
        && a.pos.x + a.size.x > b.pos.x
        && a.pos.y < b.pos.y + b.size.y
        && a.pos.y + a.size.y > b.pos.y
}

/// Hit shape of a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitShape {
    Circle { center: Vec2, radius: f32 },
    Ellipse { center: Vec2, radii: Vec2 },
}

impl HitShape {
    pub fn overlaps_rect(&self, rect: Rect) -> bool {
        match *self {
            HitShape::Circle { center, radius } => rect_circle_intersect(rect, center, radius),
            HitShape::Ellipse { center, radii } => rect_ellipse_intersect(rect, center, radii),
        }
    }

    pub fn touched_by_segment(&self, a: Vec2, b: Vec2) -> bool {
        match *self {
            HitShape::Circle { center, radius } => segment_circle_intersect(a, b, center, radius),
            HitShape::Ellipse { center, radii } => segment_ellipse_intersect(a, b, center, radii),
        }
    }

    /// Swept test for a rectangle moving from `prev` to `rect.pos`.
    ///
    /// Tests the paths of the four corners and the center, then falls back to the
    /// static overlap at the current position.
    pub fn hit_by_moving_rect(&self, prev: Option<Vec2>, rect: Rect) -> bool {
        if let Some(prev) = prev {
            let Vec2 { x: w, y: h } = rect.size;
            let offsets = [
                Vec2::ZERO,
                Vec2::new(w, 0.0),
                Vec2::new(0.0, h),
                Vec2::new(w, h),
                Vec2::new(w / 2.0, h / 2.0),
            ];
            if offsets
                .iter()
                .any(|&o| self.touched_by_segment(prev + o, rect.pos + o))
            {
                return true;
            }
        }
        self.overlaps_rect(rect)
    }
}
