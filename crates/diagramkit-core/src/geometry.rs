//! Geometry primitives shared by the scene graph and the interactive tools.
//!
//! Document coordinates grow to the right (X) and downward (Y). Angles are
//! measured in degrees, counter-clockwise as seen on screen, with 0 pointing
//! East and 90 pointing North (up).

use serde::{Deserialize, Serialize};

/// Tolerance used when comparing coordinates and angles.
pub const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        self.distance_squared_to(other).sqrt()
    }

    /// Squared distance, used where only comparisons matter.
    pub fn distance_squared_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Moves this point `length` units in the direction `angle` (degrees).
    pub fn offset_toward(&self, angle: f64, length: f64) -> Point {
        let rad = angle.to_radians();
        Point::new(self.x + rad.cos() * length, self.y - rad.sin() * length)
    }

    /// Linear interpolation between `self` (t = 0) and `other` (t = 1).
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// A zero-size rectangle located at `p`.
    pub fn at_point(p: Point) -> Self {
        Self::new(p.x, p.y, 0.0, 0.0)
    }

    /// A square of side `2 * radius` centered on `p`.
    pub fn around(p: Point, radius: f64) -> Self {
        Self::new(p.x - radius, p.y - radius, radius * 2.0, radius * 2.0)
    }

    pub fn from_center(center: Point, size: Size) -> Self {
        Self::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }

    /// Inclusive overlap test; touching edges count as intersecting.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() <= other.right()
            && other.left() <= self.right()
            && self.top() <= other.bottom()
            && other.top() <= self.bottom()
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.left(), self.top())
    }

    pub fn top_right(&self) -> Point {
        Point::new(self.right(), self.top())
    }

    pub fn bottom_left(&self) -> Point {
        Point::new(self.left(), self.bottom())
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.right(), self.bottom())
    }

    /// The point on the rectangle's perimeter closest to `p`.
    ///
    /// For a point inside the rectangle this is the projection onto the
    /// nearest edge, not `p` itself.
    pub fn nearest_point_on_boundary(&self, p: Point) -> Point {
        let edges = [
            (self.top_left(), self.top_right()),
            (self.top_right(), self.bottom_right()),
            (self.bottom_right(), self.bottom_left()),
            (self.bottom_left(), self.top_left()),
        ];
        let mut best = self.top_left();
        let mut best_dist = f64::INFINITY;
        for (a, b) in edges {
            let candidate = nearest_point_on_segment(a, b, p);
            let dist = candidate.distance_squared_to(&p);
            if dist < best_dist {
                best_dist = dist;
                best = candidate;
            }
        }
        best
    }
}

/// Projects `p` onto the segment `a`-`b`, clamping to the endpoints.
pub fn nearest_point_on_segment(a: Point, b: Point, p: Point) -> Point {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= EPSILON {
        return a;
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    a.lerp(&b, t)
}

/// Folds any angle into `[0, 360)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % 360.0;
    if a < 0.0 {
        a += 360.0;
    }
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Angle in degrees from `from` to `to`, in `[0, 360)`.
///
/// Coincident points yield 0.
pub fn angle_between(from: Point, to: Point) -> f64 {
    let dx = to.x - from.x;
    let dy = from.y - to.y;
    if dx.abs() <= EPSILON && dy.abs() <= EPSILON {
        return 0.0;
    }
    normalize_angle(dy.atan2(dx).to_degrees())
}
