//! Utilities for generating examples, benchmarks, and test cases.

use crate::{
    geojson::{GeoJson, Line, Ring},
    Position,
};

/// The mean radius of the earth, in metres.
const EARTH_RADIUS: f64 = 6_371_000.0;

/// Generate a circle of `n` positions around `center`, counter-clockwise
/// starting from due east, plus the closing position.
///
/// `center` is a longitude-latitude pair in degrees, and `radius` is in
/// metres. The circle is "round on the ground", so it gets wider in longitude
/// the further it is from the equator.
pub fn ring(center: Position, radius: f64, n: usize) -> Ring {
    let lat_scale = (180.0 / std::f64::consts::PI) / EARTH_RADIUS;
    let lng_scale = lat_scale / center.y.to_radians().cos();

    let mut ret: Ring = (0..n)
        .map(|i| {
            let angle = (i as f64 / n as f64) * 2.0 * std::f64::consts::PI;
            let dx = radius * angle.cos();
            let dy = radius * angle.sin();
            Position::new(center.x + dx * lng_scale, center.y + dy * lat_scale)
        })
        .collect();
    if let Some(&first) = ret.first() {
        ret.push(first);
    }
    ret
}

/// Generate concentric annuli sharing their boundaries.
///
/// `rings` lists `(radius, positions)` pairs from the outside in. Each one
/// becomes a feature whose polygon is bounded by that ring and has the next
/// ring (reversed) as its hole, so every inner ring appears twice in the
/// output with exactly coincident positions. The innermost ring is a plain
/// disk.
///
/// For example, `nested_rings(center, &[(50.0, 10), (40.0, 9), (30.0, 8)])`
/// gives three features: two annuli and a disk.
pub fn nested_rings(center: Position, rings: &[(f64, usize)]) -> GeoJson {
    let rings: Vec<Ring> = rings
        .iter()
        .map(|&(radius, n)| ring(center, radius, n))
        .collect();

    let features = rings
        .iter()
        .enumerate()
        .map(|(i, exterior)| {
            let mut coordinates = vec![exterior.clone()];
            if let Some(hole) = rings.get(i + 1) {
                coordinates.push(hole.iter().rev().copied().collect());
            }
            GeoJson::feature(GeoJson::Polygon { coordinates })
        })
        .collect();
    GeoJson::FeatureCollection { features }
}

/// Generate a line of `n` positions that wobbles around the x axis.
///
/// It's a slow sine wave with a fast, low-amplitude one on top, so a small
/// tolerance removes the fast wobbles and a large one flattens the line.
pub fn wobbly_line(n: usize) -> Line {
    (0..n)
        .map(|i| {
            let x = i as f64;
            Position::new(x, (x * 0.05).sin() * 10.0 + (x * 1.7).sin() * 0.1)
        })
        .collect()
}

/// Generate an `n` by `n` grid of unit squares.
///
/// Neighbouring squares touch along whole edges, so every interior grid
/// point is shared by four rings.
pub fn grid(n: usize) -> GeoJson {
    let mut coordinates = Vec::new();
    for i in 0..n {
        let x = i as f64;
        for j in 0..n {
            let y = j as f64;
            coordinates.push(vec![vec![
                Position::new(x, y),
                Position::new(x + 1.0, y),
                Position::new(x + 1.0, y + 1.0),
                Position::new(x, y + 1.0),
                Position::new(x, y),
            ]]);
        }
    }
    GeoJson::MultiPolygon { coordinates }
}
