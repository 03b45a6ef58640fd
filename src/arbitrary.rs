//! Utilities for fuzz and/or property testing using `arbitrary`.
//!
//! The generated trees live on a small grid, and new positions often reuse
//! earlier ones exactly, so that coincident positions (shared vertices,
//! touching rings, repeated positions within a ring) turn up all the time.

use arbitrary::Unstructured;

use crate::{
    geojson::{GeoJson, Line, Ring},
    Position,
};

/// Generate an arbitrary float in some range.
pub fn float_in_range(
    start: f64,
    end: f64,
    u: &mut Unstructured<'_>,
) -> Result<f64, arbitrary::Error> {
    let num: u32 = u.arbitrary()?;
    let t = num as f64 / u32::MAX as f64;
    Ok((1.0 - t) * start + t * end)
}

/// Generate a position with small integer coordinates.
pub fn grid_position(u: &mut Unstructured<'_>) -> Result<Position, arbitrary::Error> {
    let x: i32 = u.int_in_range(-8..=8)?;
    let y: i32 = u.int_in_range(-8..=8)?;
    Ok(Position::new(x as f64, y as f64))
}

/// Generate a position, with a good chance of reusing one from `seen`.
fn position(
    seen: &mut Vec<Position>,
    u: &mut Unstructured<'_>,
) -> Result<Position, arbitrary::Error> {
    if !seen.is_empty() && u.ratio(1u8, 3u8)? {
        return Ok(*u.choose(seen)?);
    }
    let p = if u.arbitrary()? {
        grid_position(u)?
    } else {
        Position::new(float_in_range(-8.0, 8.0, u)?, float_in_range(-8.0, 8.0, u)?)
    };
    seen.push(p);
    Ok(p)
}

/// Generate an open line with at least two positions.
pub fn line(
    seen: &mut Vec<Position>,
    u: &mut Unstructured<'_>,
) -> Result<Line, arbitrary::Error> {
    let len: usize = u.int_in_range(2..=10)?;
    (0..len).map(|_| position(seen, u)).collect()
}

/// Generate a closed ring with at least three vertices (four positions, counting the
/// closing one).
pub fn ring(
    seen: &mut Vec<Position>,
    u: &mut Unstructured<'_>,
) -> Result<Ring, arbitrary::Error> {
    let len: usize = u.int_in_range(3..=10)?;
    let mut ret = (0..len)
        .map(|_| position(seen, u))
        .collect::<Result<Ring, _>>()?;
    ret.push(ret[0]);
    Ok(ret)
}

fn polygon(
    seen: &mut Vec<Position>,
    u: &mut Unstructured<'_>,
) -> Result<Vec<Ring>, arbitrary::Error> {
    let len: usize = u.int_in_range(1..=3)?;
    (0..len).map(|_| ring(seen, u)).collect()
}

fn several<T>(
    max: usize,
    u: &mut Unstructured<'_>,
    mut f: impl FnMut(&mut Unstructured<'_>) -> Result<T, arbitrary::Error>,
) -> Result<Vec<T>, arbitrary::Error> {
    let len = u.int_in_range(0..=max)?;
    (0..len).map(|_| f(u)).collect()
}

/// Generate an arbitrary geometry (not a feature or feature collection).
///
/// `depth` bounds the nesting of geometry collections.
pub fn geometry(
    depth: u32,
    seen: &mut Vec<Position>,
    u: &mut Unstructured<'_>,
) -> Result<GeoJson, arbitrary::Error> {
    let max_choice: u8 = if depth == 0 { 5 } else { 6 };
    Ok(match u.int_in_range(0..=max_choice)? {
        0 => GeoJson::Point {
            coordinates: position(seen, u)?,
        },
        1 => GeoJson::MultiPoint {
            coordinates: several(4, u, |u| position(seen, u))?,
        },
        2 => GeoJson::LineString {
            coordinates: line(seen, u)?,
        },
        3 => GeoJson::MultiLineString {
            coordinates: several(3, u, |u| line(seen, u))?,
        },
        4 => GeoJson::Polygon {
            coordinates: polygon(seen, u)?,
        },
        5 => GeoJson::MultiPolygon {
            coordinates: several(3, u, |u| polygon(seen, u))?,
        },
        _ => GeoJson::GeometryCollection {
            geometries: several(3, u, |u| geometry(depth - 1, seen, u))?,
        },
    })
}

fn feature(
    seen: &mut Vec<Position>,
    u: &mut Unstructured<'_>,
) -> Result<GeoJson, arbitrary::Error> {
    let geometry = if u.ratio(1u8, 8u8)? {
        None
    } else {
        Some(Box::new(geometry(1, seen, u)?))
    };
    Ok(GeoJson::Feature {
        id: None,
        geometry,
        properties: None,
    })
}

/// Generate an arbitrary GeoJSON tree: a bare geometry, a feature, or a feature collection.
pub fn geojson(u: &mut Unstructured<'_>) -> Result<GeoJson, arbitrary::Error> {
    let mut seen = Vec::new();
    Ok(match u.int_in_range(0u8..=2)? {
        0 => geometry(1, &mut seen, u)?,
        1 => feature(&mut seen, u)?,
        _ => GeoJson::FeatureCollection {
            features: several(4, u, |u| feature(&mut seen, u))?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_trees_roundtrip_through_json() {
        arbtest::arbtest(|u| {
            let geojson = geojson(u)?;
            let reparsed = GeoJson::from_value(geojson.to_value()).unwrap();
            assert_eq!(reparsed, geojson);
            Ok(())
        });
    }

    #[test]
    fn rings_are_closed() {
        arbtest::arbtest(|u| {
            let ring = ring(&mut Vec::new(), u)?;
            assert!(ring.len() >= 4);
            assert_eq!(ring.first(), ring.last());
            Ok(())
        });
    }
}
