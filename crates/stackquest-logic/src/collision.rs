//! Stateless collision predicates over level geometry.
//!
//! Every function here is pure and never panics. Degenerate shapes — a
//! rectangle with zero width or height, a circle with zero radius — are
//! defined to not collide with anything, rather than degrading to points.

use serde::{Deserialize, Serialize};

/// A 2D point. The coordinate system is screen-style: y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Circle described by its center and radius.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl Circle {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self { x, y, radius }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// True iff the two rectangles share positive overlapping area.
///
/// Rectangles that only touch along an edge do not overlap, and a rectangle
/// with zero width or height can never overlap anything.
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    if a.width <= 0.0 || a.height <= 0.0 || b.width <= 0.0 || b.height <= 0.0 {
        return false;
    }
    a.x < b.right() && b.x < a.right() && a.y < b.bottom() && b.y < a.bottom()
}

/// True iff the distance between centers is strictly less than the radius
/// sum. Touching circles do not collide.
pub fn circles_overlap(a: &Circle, b: &Circle) -> bool {
    if a.radius <= 0.0 || b.radius <= 0.0 {
        return false;
    }
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let radii = a.radius + b.radius;
    dx * dx + dy * dy < radii * radii
}

/// Half-open containment: inclusive on the min edges, exclusive on the max
/// edges, so adjacent rectangles never double-count a boundary point.
pub fn rect_contains_point(point: Vec2, rect: &Rect) -> bool {
    point.x >= rect.x && point.x < rect.right() && point.y >= rect.y && point.y < rect.bottom()
}

/// True iff the point lies strictly inside the circle.
pub fn circle_contains_point(point: Vec2, circle: &Circle) -> bool {
    let dx = point.x - circle.x;
    let dy = point.y - circle.y;
    dx * dx + dy * dy < circle.radius * circle.radius
}
