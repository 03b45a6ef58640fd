//! Geometric primitives: positions and the triangle areas we rank them by.

use crate::num::CheapOrderedFloat;

/// A two-dimensional GeoJSON position.
///
/// Positions serialize as a bare `[x, y]` array. Two positions are equal only if
/// both ordinates are exactly equal; there is no epsilon anywhere in this crate.
///
/// Positions are sorted by `x` and then by `y`, which is the order the
/// coincidence grouping and the elimination tie-breaks rely on.
#[derive(Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Position {
    /// Horizontal component (longitude, for geographic data).
    pub x: f64,
    /// Vertical component (latitude, for geographic data).
    pub y: f64,
}

impl Position {
    /// Create a new position.
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    /// Converts this position to a `kurbo` point.
    pub fn to_kurbo(self) -> kurbo::Point {
        kurbo::Point::new(self.x, self.y)
    }

    pub(crate) fn sort_key(&self) -> (CheapOrderedFloat, CheapOrderedFloat) {
        (
            CheapOrderedFloat::from(self.x),
            CheapOrderedFloat::from(self.y),
        )
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Position {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for Position {}

impl std::fmt::Debug for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

impl From<[f64; 2]> for Position {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Position> for [f64; 2] {
    fn from(p: Position) -> Self {
        [p.x, p.y]
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Position> for kurbo::Point {
    fn from(p: Position) -> Self {
        p.to_kurbo()
    }
}

/// The effective area of `vertex`: the unsigned area of the triangle it forms
/// with its current neighbours.
///
/// The expression is evaluated in exactly this order, so results are
/// reproducible bit for bit.
pub fn effective_area(prev: Position, vertex: Position, next: Position) -> f64 {
    let (x1, y1) = (prev.x, prev.y);
    let (x2, y2) = (vertex.x, vertex.y);
    let (x3, y3) = (next.x, next.y);
    (x1 * (y2 - y3) + x2 * (y3 - y1) + x3 * (y1 - y2)).abs() / 2.0
}

/// Are there at least `n` different positions in `ps`?
pub(crate) fn has_distinct(ps: &[Position], n: usize) -> bool {
    let mut seen = Vec::with_capacity(n);
    for p in ps {
        if seen.len() >= n {
            break;
        }
        if !seen.contains(p) {
            seen.push(*p);
        }
    }
    seen.len() >= n
}
