#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

use std::borrow::Cow;

#[macro_use]
mod typed_vec;

#[cfg(any(test, feature = "arbitrary"))]
pub mod arbitrary;
#[cfg(any(test, feature = "arbitrary"))]
pub mod arbtests;
#[cfg(feature = "debug-svg")]
mod debug_svg;
mod eliminate;
mod error;
pub mod geojson;
mod geom;
mod groups;
pub mod kind;
mod num;
mod options;
mod positions;
mod queue;
mod rewrite;

#[cfg(any(test, feature = "generators"))]
pub mod generators;

pub use error::{Error, Result};
pub use geojson::GeoJson;
pub use geom::{effective_area, Position};
pub use kind::Kind;
pub use options::Options;

use eliminate::Eliminator;
use groups::Groups;
use positions::{PosVec, Positions};
use rewrite::Rewriter;

/// Simplifies every line and ring in a GeoJSON tree.
///
/// Vertices are removed in order of increasing effective area (the area of
/// the triangle a vertex forms with its two current neighbours) until the
/// next one would have an area of at least `options.tolerance` and at least
/// `options.fraction` of all positions have been removed. Line endpoints are
/// never removed; rings are either kept with at least three vertices or
/// removed entirely. Positions with exactly the same coordinates, wherever
/// they are in the tree, are always removed together.
///
/// If `options.mutate` is true, `geojson` is simplified in place and the
/// returned value borrows it. Otherwise `geojson` is left untouched and the
/// simplified copy is returned. If neither `tolerance` nor `fraction` is set
/// there is nothing to do, and the geometry comes back unchanged.
///
/// Options and coordinates are checked before anything is touched: on error,
/// `geojson` is exactly as it was.
///
/// ```
/// use vwsimplify::{simplify, GeoJson, Options};
///
/// let mut line: GeoJson = r#"{
///     "type": "LineString",
///     "coordinates": [[0, 0], [1, 0.01], [2, 0], [3, 5]]
/// }"#.parse()?;
/// let options = Options::default().with_tolerance(0.1).with_mutate(false);
/// let simplified = simplify(&mut line, &options)?;
/// assert_eq!(simplified.position_count(), 3);
/// assert_eq!(line.position_count(), 4);
/// # Ok::<(), vwsimplify::Error>(())
/// ```
pub fn simplify<'a>(geojson: &'a mut GeoJson, options: &Options) -> Result<Cow<'a, GeoJson>> {
    options.validate()?;
    geojson.check_finite()?;

    if options.mutate {
        simplify_in_place(geojson, options);
        Ok(Cow::Borrowed(geojson))
    } else {
        let mut copy = geojson.clone();
        simplify_in_place(&mut copy, options);
        Ok(Cow::Owned(copy))
    }
}

/// Runs the elimination over a tree's positions, returning the positions and
/// which of them were deleted.
fn run_elimination(geojson: &GeoJson, options: &Options) -> (Positions, PosVec<bool>) {
    let positions = Positions::collect(geojson);
    let groups = Groups::new(positions.coords());
    let _span = tracing::debug_span!(
        "simplify",
        positions = positions.len(),
        shared = groups.shared().count()
    )
    .entered();

    let limits = options.limits(positions.len());
    let deleted = Eliminator::new(&positions, &groups, limits).run();
    (positions, deleted)
}

fn simplify_in_place(geojson: &mut GeoJson, options: &Options) {
    if options.is_noop() {
        return;
    }
    let (_, deleted) = run_elimination(geojson, options);
    let removed_rings = Rewriter::new(&deleted).run(geojson);
    if removed_rings > 0 {
        tracing::debug!(removed_rings, "dropped degenerate rings");
    }
}

/// Draws what [`simplify`] would remove from `geojson`, without changing it.
///
/// Lines and rings are drawn as they are; surviving positions are marked in
/// black and removed positions in red.
#[cfg(feature = "debug-svg")]
pub fn dump_svg(geojson: &GeoJson, options: &Options) -> Result<svg::Document> {
    options.validate()?;
    geojson.check_finite()?;
    let (positions, deleted) = if options.is_noop() {
        let positions = Positions::collect(geojson);
        let deleted = PosVec::filled(false, positions.len());
        (positions, deleted)
    } else {
        run_elimination(geojson, options)
    };
    Ok(debug_svg::dump(&positions, &deleted))
}
