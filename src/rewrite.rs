//! Writing the elimination result back into the GeoJSON tree.

use crate::{
    eliminate::MIN_RING_LEN,
    geojson::{GeoJson, Line, Ring},
    geom::has_distinct,
    positions::{PosIdx, PosVec},
};

/// Walks a tree in the same order as [`Positions::collect`](crate::positions::Positions::collect),
/// dropping deleted positions as it goes.
///
/// Every line and ring consumes its flat indices from a shared cursor, even
/// the ones that end up being thrown away, so that the cursor always points
/// at the first position of whatever comes next.
pub struct Rewriter<'a> {
    deleted: &'a PosVec<bool>,
    cursor: usize,
    removed_rings: usize,
}

impl<'a> Rewriter<'a> {
    /// Creates a rewriter for a tree whose positions were collected into an
    /// arena, and then deleted according to `deleted`.
    pub fn new(deleted: &'a PosVec<bool>) -> Self {
        Rewriter {
            deleted,
            cursor: 0,
            removed_rings: 0,
        }
    }

    /// Rewrites the whole tree, returning the number of rings that were removed.
    pub fn run(mut self, geojson: &mut GeoJson) -> usize {
        self.rewrite(geojson);
        debug_assert_eq!(self.cursor, self.deleted.len());
        self.removed_rings
    }

    fn rewrite(&mut self, geojson: &mut GeoJson) {
        match geojson {
            GeoJson::Point { .. } | GeoJson::MultiPoint { .. } => {}
            GeoJson::LineString { coordinates } => self.line(coordinates),
            GeoJson::MultiLineString { coordinates } => {
                for line in coordinates {
                    self.line(line);
                }
            }
            GeoJson::Polygon { coordinates } => {
                // A removed polygon is left with no rings at all.
                self.polygon(coordinates);
            }
            GeoJson::MultiPolygon { coordinates } => {
                coordinates.retain_mut(|polygon| self.polygon(polygon));
            }
            GeoJson::GeometryCollection { geometries: children }
            | GeoJson::FeatureCollection { features: children } => {
                for child in children {
                    self.rewrite(child);
                }
            }
            GeoJson::Feature { geometry, .. } => {
                if let Some(geometry) = geometry {
                    self.rewrite(geometry);
                }
            }
        }
    }

    /// Is the position under the cursor still alive? Advances the cursor.
    fn keep_next(&mut self) -> bool {
        let idx = PosIdx(self.cursor);
        self.cursor += 1;
        !self.deleted[idx]
    }

    fn line(&mut self, line: &mut Line) {
        line.retain(|_| self.keep_next());
    }

    /// Compacts a ring and closes it again. Returns false (leaving the ring
    /// empty) if fewer than three distinct positions survived.
    fn ring(&mut self, ring: &mut Ring) -> bool {
        ring.pop();
        ring.retain(|_| self.keep_next());
        match ring.first() {
            Some(&first) if has_distinct(ring, MIN_RING_LEN) => {
                ring.push(first);
                true
            }
            _ => {
                ring.clear();
                self.removed_rings += 1;
                false
            }
        }
    }

    fn skip_ring(&mut self, ring: &Ring) {
        self.cursor += ring.len().saturating_sub(1);
    }

    /// Rewrites a polygon's rings. Returns false (leaving no rings) if the
    /// exterior ring was removed.
    fn polygon(&mut self, rings: &mut Vec<Ring>) -> bool {
        let Some((exterior, interiors)) = rings.split_first_mut() else {
            return true;
        };
        if !self.ring(exterior) {
            for ring in interiors.iter() {
                self.skip_ring(ring);
            }
            tracing::trace!(holes = interiors.len(), "removing a polygon");
            rings.clear();
            return false;
        }

        let mut is_exterior = true;
        rings.retain_mut(|ring| std::mem::take(&mut is_exterior) || self.ring(ring));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{geom::Position, positions::Positions};

    fn p(x: f64, y: f64) -> Position {
        Position::new(x, y)
    }

    fn ring(ps: &[(f64, f64)]) -> Ring {
        let mut ret: Ring = ps.iter().map(|&q| q.into()).collect();
        ret.push(ret[0]);
        ret
    }

    /// Deletes the listed flat indices from `geojson`, returning the removed ring count.
    fn rewrite(geojson: &mut GeoJson, deleted: &[usize]) -> usize {
        let n = Positions::collect(geojson).len();
        let mut mask = PosVec::filled(false, n);
        for &i in deleted {
            mask[PosIdx(i)] = true;
        }
        Rewriter::new(&mask).run(geojson)
    }

    #[test]
    fn line_keeps_survivors_in_order() {
        let mut geojson = GeoJson::LineString {
            coordinates: vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 1.0)],
        };
        rewrite(&mut geojson, &[1, 2]);
        let GeoJson::LineString { coordinates } = geojson else {
            panic!("kind changed");
        };
        insta::assert_debug_snapshot!(coordinates, @r"
        [
            (0.0, 0.0),
            (3.0, 1.0),
        ]
        ");
    }

    #[test]
    fn ring_is_reclosed_on_new_first_position() {
        let mut geojson = GeoJson::Polygon {
            coordinates: vec![ring(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)])],
        };
        assert_eq!(rewrite(&mut geojson, &[0]), 0);
        let GeoJson::Polygon { coordinates } = geojson else {
            panic!("kind changed");
        };
        insta::assert_debug_snapshot!(coordinates, @r"
        [
            [
                (2.0, 0.0),
                (2.0, 2.0),
                (0.0, 2.0),
                (2.0, 0.0),
            ],
        ]
        ");
    }

    #[test]
    fn removed_exterior_skips_holes() {
        let exterior = ring(&[(0.0, 0.0), (9.0, 0.0), (9.0, 9.0), (0.0, 9.0)]);
        let hole = ring(&[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0)]);
        let mut geojson = GeoJson::GeometryCollection {
            geometries: vec![
                GeoJson::Polygon {
                    coordinates: vec![exterior, hole],
                },
                GeoJson::LineString {
                    coordinates: vec![p(5.0, 5.0), p(6.0, 6.0), p(7.0, 5.0)],
                },
            ],
        };
        // The whole exterior goes, and the middle of the line after the polygon.
        assert_eq!(rewrite(&mut geojson, &[0, 1, 2, 3, 8]), 1);
        assert_eq!(
            geojson,
            GeoJson::GeometryCollection {
                geometries: vec![
                    GeoJson::Polygon {
                        coordinates: vec![]
                    },
                    GeoJson::LineString {
                        coordinates: vec![p(5.0, 5.0), p(7.0, 5.0)]
                    },
                ]
            }
        );
    }

    #[test]
    fn removed_holes_are_compacted_out() {
        let exterior = ring(&[(0.0, 0.0), (9.0, 0.0), (9.0, 9.0), (0.0, 9.0)]);
        let hole1 = ring(&[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0)]);
        let hole2 = ring(&[(5.0, 5.0), (6.0, 5.0), (6.0, 6.0)]);
        let mut geojson = GeoJson::Polygon {
            coordinates: vec![exterior.clone(), hole1, hole2.clone()],
        };
        assert_eq!(rewrite(&mut geojson, &[4, 5, 6]), 1);
        assert_eq!(
            geojson,
            GeoJson::Polygon {
                coordinates: vec![exterior, hole2]
            }
        );
    }

    #[test]
    fn multipolygon_drops_removed_polygons() {
        let a = ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        let b = ring(&[(5.0, 5.0), (6.0, 5.0), (6.0, 6.0)]);
        let c = ring(&[(8.0, 8.0), (9.0, 8.0), (9.0, 9.0)]);
        let mut geojson = GeoJson::MultiPolygon {
            coordinates: vec![vec![a.clone()], vec![b], vec![c.clone()]],
        };
        assert_eq!(rewrite(&mut geojson, &[3, 4, 5]), 1);
        assert_eq!(
            geojson,
            GeoJson::MultiPolygon {
                coordinates: vec![vec![a], vec![c]]
            }
        );
    }

    #[test]
    fn ring_with_too_few_survivors_is_removed() {
        // The engine never does this, but the rewriter doesn't rely on it.
        let mut geojson = GeoJson::Polygon {
            coordinates: vec![ring(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)])],
        };
        assert_eq!(rewrite(&mut geojson, &[1, 3]), 1);
        assert_eq!(geojson, GeoJson::Polygon { coordinates: vec![] });
    }

    #[test]
    fn ring_with_too_few_distinct_survivors_is_removed() {
        let a = (0.0, 0.0);
        let mut geojson = GeoJson::Polygon {
            coordinates: vec![ring(&[a, (1.0, 1.0), a, (5.0, 0.0), a])],
        };
        // Four vertices survive, but only two places.
        assert_eq!(rewrite(&mut geojson, &[1]), 1);
        assert_eq!(geojson, GeoJson::Polygon { coordinates: vec![] });
    }

    #[test]
    fn points_and_empty_features_pass_through() {
        let mut geojson = GeoJson::FeatureCollection {
            features: vec![
                GeoJson::Feature {
                    id: None,
                    geometry: None,
                    properties: None,
                },
                GeoJson::feature(GeoJson::MultiPoint {
                    coordinates: vec![p(1.0, 1.0), p(2.0, 2.0)],
                }),
                GeoJson::feature(GeoJson::LineString {
                    coordinates: vec![p(0.0, 0.0), p(1.0, 1.0), p(2.0, 0.0)],
                }),
            ],
        };
        let expected = geojson.clone();
        assert_eq!(rewrite(&mut geojson, &[]), 0);
        assert_eq!(geojson, expected);
    }
}
