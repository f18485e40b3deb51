//! Port sides, side restriction sets and the side resolver.
//!
//! A box port decides which of its owner's four edges a link attaches to
//! from the angle between the box center and the link's far point. The
//! quadrant boundaries follow the box diagonal rather than fixed 45 degree
//! lines, so wide and tall boxes split the circle the way they look.

use diagramkit_core::geometry::{angle_between, normalize_angle, Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One edge of a rectangular port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    North,
    East,
    South,
    West,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];

    /// Outward normal of this side, in degrees.
    pub fn normal(self) -> f64 {
        match self {
            Side::East => 0.0,
            Side::North => 90.0,
            Side::West => 180.0,
            Side::South => 270.0,
        }
    }

    /// The side whose outward normal is `direction`, if it is cardinal.
    pub fn from_direction(direction: f64) -> Option<Side> {
        let d = normalize_angle(direction);
        Side::ALL
            .into_iter()
            .find(|side| (side.normal() - d).abs() < 1e-6)
    }

    /// True for the top and bottom edges.
    pub fn is_horizontal_edge(self) -> bool {
        matches!(self, Side::North | Side::South)
    }

    /// Corners of this side, ordered so that walking from the first to the
    /// second goes counter-clockwise around the box. Link points spread along
    /// a side in the same order as ascending link angles.
    pub fn corners(self, bounds: &Rect) -> (Point, Point) {
        match self {
            Side::East => (bounds.bottom_right(), bounds.top_right()),
            Side::North => (bounds.top_right(), bounds.top_left()),
            Side::West => (bounds.top_left(), bounds.bottom_left()),
            Side::South => (bounds.bottom_left(), bounds.bottom_right()),
        }
    }

    /// Midpoint of this side.
    pub fn midpoint(self, bounds: &Rect) -> Point {
        let (a, b) = self.corners(bounds);
        a.lerp(&b, 0.5)
    }

    const fn bit(self) -> u8 {
        match self {
            Side::North => 0b0001,
            Side::East => 0b0010,
            Side::South => 0b0100,
            Side::West => 0b1000,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Side::North => "north",
            Side::East => "east",
            Side::South => "south",
            Side::West => "west",
        };
        f.write_str(name)
    }
}

/// A set of sides. The empty set means "no restriction".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SideSet(u8);

impl SideSet {
    pub const EMPTY: SideSet = SideSet(0);
    pub const NORTH: SideSet = SideSet(Side::North.bit());
    pub const EAST: SideSet = SideSet(Side::East.bit());
    pub const SOUTH: SideSet = SideSet(Side::South.bit());
    pub const WEST: SideSet = SideSet(Side::West.bit());
    pub const ALL: SideSet = SideSet(0b1111);

    pub fn from_sides(sides: &[Side]) -> Self {
        sides.iter().fold(Self::EMPTY, |set, side| set.with(*side))
    }

    pub const fn with(self, side: Side) -> Self {
        SideSet(self.0 | side.bit())
    }

    pub const fn union(self, other: SideSet) -> Self {
        SideSet(self.0 | other.0)
    }

    pub fn contains(self, side: Side) -> bool {
        self.0 & side.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// The sides a link may actually use: an empty set allows all four.
    pub fn effective(self) -> Self {
        if self.is_empty() {
            Self::ALL
        } else {
            self
        }
    }

    /// The only member, when the set has exactly one.
    pub fn single(self) -> Option<Side> {
        let mut iter = self.iter();
        match (iter.next(), iter.next()) {
            (Some(side), None) => Some(side),
            _ => None,
        }
    }

    pub fn iter(self) -> impl Iterator<Item = Side> {
        Side::ALL.into_iter().filter(move |side| self.contains(*side))
    }
}

impl From<Side> for SideSet {
    fn from(side: Side) -> Self {
        SideSet::EMPTY.with(side)
    }
}

impl std::ops::BitOr for SideSet {
    type Output = SideSet;

    fn bitor(self, rhs: SideSet) -> SideSet {
        self.union(rhs)
    }
}

/// Where an arc of the circle starts: `base + diag_sign * diag` degrees.
#[derive(Debug, Clone, Copy)]
struct Threshold {
    base: f64,
    diag_sign: f64,
}

impl Threshold {
    const fn fixed(base: f64) -> Self {
        Self {
            base,
            diag_sign: 0.0,
        }
    }

    const fn diag(base: f64, diag_sign: f64) -> Self {
        Self { base, diag_sign }
    }

    // Not wrapped: a start of 360 is an empty arc, not one starting at 0.
    fn at(self, diag: f64) -> f64 {
        (self.base + self.diag_sign * diag).clamp(0.0, 360.0)
    }
}

/// How a restriction set maps angles to sides.
#[derive(Debug, Clone, Copy)]
enum SidePolicy {
    /// Exactly one side is allowed.
    Fixed(Side),
    /// Two opposite sides split by a straight line through the center.
    HalfPlane([(Threshold, Side); 2]),
    /// Arcs whose boundaries follow the box diagonal.
    Diagonal(&'static [(Threshold, Side)]),
}

const D: f64 = 1.0;

const FOUR_SIDES: &[(Threshold, Side)] = &[
    (Threshold::diag(0.0, D), Side::North),
    (Threshold::diag(180.0, -D), Side::West),
    (Threshold::diag(180.0, D), Side::South),
    (Threshold::diag(360.0, -D), Side::East),
];
const NORTH_EAST: &[(Threshold, Side)] = &[
    (Threshold::diag(0.0, D), Side::North),
    (Threshold::diag(180.0, D), Side::East),
];
const NORTH_WEST: &[(Threshold, Side)] = &[
    (Threshold::diag(180.0, -D), Side::West),
    (Threshold::diag(360.0, -D), Side::North),
];
const SOUTH_WEST: &[(Threshold, Side)] = &[
    (Threshold::diag(0.0, D), Side::West),
    (Threshold::diag(180.0, D), Side::South),
];
const SOUTH_EAST: &[(Threshold, Side)] = &[
    (Threshold::diag(180.0, -D), Side::South),
    (Threshold::diag(360.0, -D), Side::East),
];
const NOT_WEST: &[(Threshold, Side)] = &[
    (Threshold::diag(0.0, D), Side::North),
    (Threshold::fixed(180.0), Side::South),
    (Threshold::diag(360.0, -D), Side::East),
];
const NOT_EAST: &[(Threshold, Side)] = &[
    (Threshold::fixed(0.0), Side::North),
    (Threshold::diag(180.0, -D), Side::West),
    (Threshold::diag(180.0, D), Side::South),
];
const NOT_SOUTH: &[(Threshold, Side)] = &[
    (Threshold::diag(0.0, D), Side::North),
    (Threshold::diag(180.0, -D), Side::West),
    (Threshold::fixed(270.0), Side::East),
];
const NOT_NORTH: &[(Threshold, Side)] = &[
    (Threshold::fixed(90.0), Side::West),
    (Threshold::diag(180.0, D), Side::South),
    (Threshold::diag(360.0, -D), Side::East),
];

impl SidePolicy {
    fn for_sides(sides: SideSet) -> SidePolicy {
        let sides = sides.effective();
        if let Some(side) = sides.single() {
            return SidePolicy::Fixed(side);
        }

        const N: SideSet = SideSet::NORTH;
        const E: SideSet = SideSet::EAST;
        const S: SideSet = SideSet::SOUTH;
        const W: SideSet = SideSet::WEST;

        match sides {
            s if s == N.union(S) => SidePolicy::HalfPlane([
                (Threshold::fixed(0.0), Side::North),
                (Threshold::fixed(180.0), Side::South),
            ]),
            s if s == E.union(W) => SidePolicy::HalfPlane([
                (Threshold::fixed(90.0), Side::West),
                (Threshold::fixed(270.0), Side::East),
            ]),
            s if s == N.union(E) => SidePolicy::Diagonal(NORTH_EAST),
            s if s == N.union(W) => SidePolicy::Diagonal(NORTH_WEST),
            s if s == S.union(W) => SidePolicy::Diagonal(SOUTH_WEST),
            s if s == S.union(E) => SidePolicy::Diagonal(SOUTH_EAST),
            s if s == N.union(E).union(S) => SidePolicy::Diagonal(NOT_WEST),
            s if s == N.union(W).union(S) => SidePolicy::Diagonal(NOT_EAST),
            s if s == N.union(E).union(W) => SidePolicy::Diagonal(NOT_SOUTH),
            s if s == E.union(S).union(W) => SidePolicy::Diagonal(NOT_NORTH),
            _ => SidePolicy::Diagonal(FOUR_SIDES),
        }
    }

    fn classify(self, angle: f64, diag: f64) -> Side {
        match self {
            SidePolicy::Fixed(side) => side,
            SidePolicy::HalfPlane(arcs) => pick_arc(&arcs, angle, diag),
            SidePolicy::Diagonal(arcs) => pick_arc(arcs, angle, diag),
        }
    }

    fn accepts_bias(self) -> bool {
        matches!(self, SidePolicy::Diagonal(_))
    }
}

/// Picks the arc with the greatest start not above `angle`, wrapping to the
/// arc with the greatest start overall.
fn pick_arc(arcs: &[(Threshold, Side)], angle: f64, diag: f64) -> Side {
    let mut below: Option<(f64, Side)> = None;
    let mut last: Option<(f64, Side)> = None;
    for (threshold, side) in arcs {
        let start = threshold.at(diag);
        if start <= angle && below.is_none_or(|(best, _)| start >= best) {
            below = Some((start, *side));
        }
        if last.is_none_or(|(best, _)| start >= best) {
            last = Some((start, *side));
        }
    }
    below
        .or(last)
        .map(|(_, side)| side)
        .unwrap_or(Side::East)
}

/// Angle of the box diagonal in degrees, in `[0, 90]`.
///
/// Zero-width boxes give 90, zero-height boxes give 0 and a point-sized box
/// behaves like a square.
pub fn diagonal_angle(bounds: &Rect) -> f64 {
    let w = bounds.width.max(0.0);
    let h = bounds.height.max(0.0);
    match (w > 0.0, h > 0.0) {
        (false, false) => 45.0,
        (false, true) => 90.0,
        (true, false) => 0.0,
        (true, true) => h.atan2(w).to_degrees(),
    }
}

/// Pulls `angle` up to `bias` degrees toward the nearest horizontal axis,
/// never past it. Exactly vertical angles are left alone.
pub fn bias_toward_horizontal(angle: f64, bias: f64) -> f64 {
    let a = normalize_angle(angle);
    let biased = if a > 0.0 && a < 90.0 {
        (a - bias).max(0.0)
    } else if a > 90.0 && a < 180.0 {
        (a + bias).min(180.0)
    } else if a > 180.0 && a < 270.0 {
        (a - bias).max(180.0)
    } else if a > 270.0 {
        (a + bias).min(360.0)
    } else {
        a
    };
    normalize_angle(biased)
}

/// Classifies `angle` into one of `sides` for a box whose diagonal is `diag`.
///
/// `orthogonal_bias` is applied only where boundaries follow the diagonal;
/// a single side or an opposite pair ignores it.
pub fn side_for_angle(angle: f64, diag: f64, sides: SideSet, orthogonal_bias: Option<f64>) -> Side {
    let policy = SidePolicy::for_sides(sides);
    let mut angle = normalize_angle(angle);
    if let Some(bias) = orthogonal_bias {
        if policy.accepts_bias() {
            angle = bias_toward_horizontal(angle, bias);
        }
    }
    policy.classify(angle, diag)
}

/// Resolves the side a link attaches to and the outward direction there.
///
/// Returns the side and its perpendicular angle in degrees.
pub fn resolve_side(
    bounds: &Rect,
    far_point: Point,
    sides: SideSet,
    orthogonal_bias: Option<f64>,
) -> (Side, f64) {
    let angle = angle_between(bounds.center(), far_point);
    let side = side_for_angle(angle, diagonal_angle(bounds), sides, orthogonal_bias);
    (side, side.normal())
}
