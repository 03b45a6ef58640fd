//! Property checks over arbitrary inputs.
//!
//! Each check draws its input from an [`Unstructured`], and panics if the
//! property fails. They run as `arbtest` unit tests here and as cargo-fuzz
//! targets in the `fuzz` crate.

use arbitrary::Unstructured;

use crate::{
    arbitrary::{float_in_range, geojson},
    eliminate::{Eliminator, MIN_RING_LEN},
    generators,
    geojson::{GeoJson, Line, Ring},
    geom::has_distinct,
    groups::Groups,
    options::Limits,
    positions::{PosVec, Positions, RingVec},
    simplify, Options, Position,
};

fn limits(u: &mut Unstructured<'_>) -> Result<Limits, arbitrary::Error> {
    Ok(Limits {
        tolerance: float_in_range(0.0, 20.0, u)?,
        quota: u.int_in_range(0..=6)?,
    })
}

fn eliminate(positions: &Positions, limits: Limits) -> PosVec<bool> {
    let groups = Groups::new(positions.coords());
    Eliminator::new(positions, &groups, limits).run()
}

/// Checks the deletion mask of a single run: coincident positions are deleted
/// all together or not at all, and line endpoints are never deleted. Every
/// ring keeps either nothing or at least three distinct vertices (or is left
/// untouched), and holes go whenever their exterior does.
pub fn deletions_are_consistent(u: &mut Unstructured<'_>) -> Result<(), arbitrary::Error> {
    let geojson = geojson(u)?;
    let positions = Positions::collect(&geojson);
    let groups = Groups::new(positions.coords());
    let deleted = Eliminator::new(&positions, &groups, limits(u)?).run();

    for idx in positions.coords().indices() {
        let group = groups.group(idx);
        for &other in groups.members(group) {
            assert_eq!(deleted[idx], deleted[other], "{idx:?} and {other:?} coincide");
        }
    }

    let (prev, next) = positions.links();
    for idx in positions.coords().indices() {
        if prev[idx].is_none() || next[idx].is_none() {
            assert!(!deleted[idx], "endpoint {idx:?} was deleted");
        }
    }

    let coords = positions.coords();
    let ring_lens = positions.ring_lens();
    let mut alive = RingVec::filled(Vec::new(), ring_lens.len());
    for idx in coords.indices() {
        if let (Some(ring), false) = (positions.ring(idx), deleted[idx]) {
            alive[ring].push(coords[idx]);
        }
    }
    for (ring, left) in alive.iter() {
        assert!(
            left.is_empty() || has_distinct(left, MIN_RING_LEN) || left.len() == ring_lens[ring],
            "{ring:?} was left as {left:?}"
        );
        if left.is_empty() && ring_lens[ring] > 0 {
            for hole in positions.holes(ring) {
                assert!(alive[hole].is_empty(), "{hole:?} outlived its exterior {ring:?}");
            }
        }
    }
    Ok(())
}

/// Checks that raising the tolerance only ever deletes more.
pub fn tolerance_is_monotonic(u: &mut Unstructured<'_>) -> Result<(), arbitrary::Error> {
    let geojson = geojson(u)?;
    let positions = Positions::collect(&geojson);
    let a = float_in_range(0.0, 20.0, u)?;
    let b = float_in_range(0.0, 20.0, u)?;
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

    let fewer = eliminate(&positions, Limits { tolerance: lo, quota: 0 });
    let more = eliminate(&positions, Limits { tolerance: hi, quota: 0 });
    for idx in positions.coords().indices() {
        assert!(!fewer[idx] || more[idx], "{idx:?} deleted at {lo} but not at {hi}");
    }
    Ok(())
}

/// Checks that a removal quota is met, unless there was nothing left to remove.
pub fn quota_is_met(u: &mut Unstructured<'_>) -> Result<(), arbitrary::Error> {
    let geojson = geojson(u)?;
    let positions = Positions::collect(&geojson);
    let quota = u.int_in_range(0..=positions.len())?;

    let exhaustive = eliminate(
        &positions,
        Limits {
            tolerance: f64::INFINITY,
            quota: 0,
        },
    );
    let deleted = eliminate(
        &positions,
        Limits {
            tolerance: 0.0,
            quota,
        },
    );
    let count = |mask: &PosVec<bool>| mask.iter().filter(|(_, d)| **d).count();

    for idx in positions.coords().indices() {
        assert!(!deleted[idx] || exhaustive[idx]);
    }
    assert!(count(&deleted) >= quota || deleted == exhaustive);
    Ok(())
}

fn is_subsequence(short: &[Position], long: &[Position]) -> bool {
    let mut long = long.iter();
    short.iter().all(|p| long.any(|q| q == p))
}

/// Is `output` what's left of `input` after deleting some positions and re-closing?
fn is_compacted_ring(output: &Ring, input: &Ring) -> bool {
    let Some((_, open)) = output.split_last() else {
        return false;
    };
    has_distinct(open, MIN_RING_LEN)
        && output.first() == output.last()
        && is_subsequence(open, &input[..input.len().saturating_sub(1)])
}

/// Checks that every element of `output` matches a distinct element of
/// `input`, in order.
fn check_compacted<T>(output: &[T], input: &[T], matches: impl Fn(&T, &T) -> bool) {
    let mut input = input.iter();
    for o in output {
        assert!(input.any(|i| matches(o, i)), "no match in the input");
    }
}

fn is_compacted_polygon(output: &[Ring], input: &[Ring]) -> bool {
    match (output.split_first(), input.split_first()) {
        (Some((out_ext, out_holes)), Some((in_ext, in_holes))) => {
            if !is_compacted_ring(out_ext, in_ext) {
                return false;
            }
            let mut in_holes = in_holes.iter();
            out_holes
                .iter()
                .all(|o| in_holes.any(|i| is_compacted_ring(o, i)))
        }
        (None, _) => true,
        (Some(_), None) => false,
    }
}

fn check_line(output: &Line, input: &Line) {
    assert!(output.len() >= 2);
    assert_eq!(output.first(), input.first());
    assert_eq!(output.last(), input.last());
    assert!(is_subsequence(output, input));
}

fn check_pair(output: &GeoJson, input: &GeoJson) {
    assert_eq!(output.kind(), input.kind());
    match (output, input) {
        (GeoJson::Point { .. } | GeoJson::MultiPoint { .. }, _) => assert_eq!(output, input),
        (GeoJson::LineString { coordinates: out }, GeoJson::LineString { coordinates: inp }) => {
            check_line(out, inp);
        }
        (
            GeoJson::MultiLineString { coordinates: out },
            GeoJson::MultiLineString { coordinates: inp },
        ) => {
            assert_eq!(out.len(), inp.len());
            for (o, i) in out.iter().zip(inp) {
                check_line(o, i);
            }
        }
        (GeoJson::Polygon { coordinates: out }, GeoJson::Polygon { coordinates: inp }) => {
            assert!(is_compacted_polygon(out, inp), "{out:?} doesn't come from {inp:?}");
        }
        (
            GeoJson::MultiPolygon { coordinates: out },
            GeoJson::MultiPolygon { coordinates: inp },
        ) => {
            check_compacted(out, inp, |o, i| !o.is_empty() && is_compacted_polygon(o, i));
        }
        (
            GeoJson::GeometryCollection { geometries: out },
            GeoJson::GeometryCollection { geometries: inp },
        )
        | (
            GeoJson::FeatureCollection { features: out },
            GeoJson::FeatureCollection { features: inp },
        ) => {
            assert_eq!(out.len(), inp.len());
            for (o, i) in out.iter().zip(inp) {
                check_pair(o, i);
            }
        }
        (
            GeoJson::Feature { geometry: out, .. },
            GeoJson::Feature { geometry: inp, .. },
        ) => match (out, inp) {
            (Some(o), Some(i)) => check_pair(o, i),
            (None, None) => {}
            _ => panic!("feature geometry appeared or disappeared"),
        },
        _ => unreachable!("kinds were checked above"),
    }
}

/// Checks the shape of the output of [`simplify`] on a copy: nothing changes
/// kind, lines keep their endpoints, rings stay closed and non-degenerate,
/// and the input is left alone.
pub fn output_is_well_formed(u: &mut Unstructured<'_>) -> Result<(), arbitrary::Error> {
    let mut input = geojson(u)?;
    let original = input.clone();
    let options = Options::default()
        .with_tolerance(float_in_range(1e-3, 20.0, u)?)
        .with_mutate(false);
    let options = if u.arbitrary()? {
        options.with_fraction(float_in_range(1e-3, 1.0, u)?)
    } else {
        options
    };

    let output = simplify(&mut input, &options)
        .expect("valid options and finite input")
        .into_owned();
    assert_eq!(input, original);
    check_pair(&output, &input);
    Ok(())
}

/// Checks that simplifying rings that share boundaries a second time, with
/// the same tolerance, changes nothing.
pub fn shared_rings_are_idempotent(u: &mut Unstructured<'_>) -> Result<(), arbitrary::Error> {
    let (geojson, tolerance) = if u.arbitrary()? {
        let center = Position::new(
            float_in_range(-180.0, 180.0, u)?,
            float_in_range(-60.0, 60.0, u)?,
        );
        let mut radius = float_in_range(10.0, 1000.0, u)?;
        let mut rings = Vec::new();
        let count: usize = u.int_in_range(1..=4)?;
        for _ in 0..count {
            rings.push((radius, u.int_in_range(3..=40)?));
            radius *= float_in_range(0.3, 0.9, u)?;
        }
        let tolerance = 10f64.powf(float_in_range(-11.0, -5.0, u)?);
        (generators::nested_rings(center, &rings), tolerance)
    } else {
        let tolerance = *u.choose(&[0.1, 0.49, 0.5, 0.51, 0.9, 1.0, 1.5, 2.0, 5.0])?;
        (generators::grid(u.int_in_range(1..=4)?), tolerance)
    };

    let options = Options::default()
        .with_tolerance(tolerance)
        .with_mutate(false);
    let mut input = geojson;
    let once = simplify(&mut input, &options)
        .expect("valid options and finite input")
        .into_owned();
    let mut again = once.clone();
    let twice = simplify(&mut again, &options)
        .expect("valid options and finite input")
        .into_owned();
    assert_eq!(once, twice, "not idempotent at tolerance {tolerance:e}");
    Ok(())
}
