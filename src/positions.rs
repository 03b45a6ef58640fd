//! The flat position arena.

use std::ops::Range;

use crate::{
    geojson::GeoJson,
    geom::{effective_area, Position},
};

typed_vec!(
    /// A vector indexed by flat position indices.
    PosVec,
    /// An index into the flat position arena.
    ///
    /// Every position of every line and ring in a GeoJSON tree gets one of these,
    /// in traversal order. Ring closing positions don't get one: they're
    /// reconstructed from the ring's first surviving position.
    PosIdx,
    "p"
);

typed_vec!(
    /// A vector indexed by ring indices.
    RingVec,
    /// An index into the rings of a [`Positions`] arena.
    RingIdx,
    "r"
);

/// The flattened positions of a GeoJSON tree, with line and ring adjacency.
///
/// This is the arena that every other stage indexes into. Each line becomes
/// an open chain (whose endpoints have no `prev` or no `next`) and each ring
/// becomes a cycle. The positions of a ring are contiguous, and so are the
/// rings of a polygon.
#[derive(Debug, Clone, Default)]
pub struct Positions {
    coords: PosVec<Position>,
    prev: PosVec<Option<PosIdx>>,
    next: PosVec<Option<PosIdx>>,
    ring: PosVec<Option<RingIdx>>,
    ring_start: RingVec<usize>,
    ring_len: RingVec<usize>,
    /// For an exterior ring, the rings of the polygon's holes. Empty for holes.
    holes: RingVec<Range<usize>>,
}

impl Positions {
    /// Flattens all lines and rings in `geojson`, in traversal order.
    ///
    /// Points contribute nothing.
    pub fn collect(geojson: &GeoJson) -> Self {
        let mut ret = Self::default();
        ret.add_geojson(geojson);
        ret
    }

    fn add_geojson(&mut self, geojson: &GeoJson) {
        match geojson {
            GeoJson::Point { .. } | GeoJson::MultiPoint { .. } => {}
            GeoJson::LineString { coordinates } => self.add_line(coordinates),
            GeoJson::MultiLineString { coordinates } => {
                for line in coordinates {
                    self.add_line(line);
                }
            }
            GeoJson::Polygon { coordinates } => self.add_polygon(coordinates),
            GeoJson::MultiPolygon { coordinates } => {
                for polygon in coordinates {
                    self.add_polygon(polygon);
                }
            }
            GeoJson::GeometryCollection { geometries: children }
            | GeoJson::FeatureCollection { features: children } => {
                for child in children {
                    self.add_geojson(child);
                }
            }
            GeoJson::Feature { geometry, .. } => {
                if let Some(geometry) = geometry {
                    self.add_geojson(geometry);
                }
            }
        }
    }

    /// Add a polygon: an exterior ring followed by its holes.
    pub fn add_polygon(&mut self, rings: &[Vec<Position>]) {
        let exterior = self.ring_len.next_idx();
        for ring in rings {
            self.add_ring(ring);
        }
        if !rings.is_empty() {
            self.holes[exterior] = exterior.0 + 1..self.ring_len.len();
        }
    }

    /// Add an open line to this arena.
    pub fn add_line(&mut self, ps: &[Position]) {
        let old_len = self.coords.len();
        for (i, p) in ps.iter().enumerate() {
            let idx = self.coords.push(*p);
            self.prev.push((i > 0).then(|| PosIdx(idx.0 - 1)));
            self.next.push((i + 1 < ps.len()).then(|| PosIdx(idx.0 + 1)));
            self.ring.push(None);
        }
        debug_assert_eq!(self.coords.len(), old_len + ps.len());
    }

    /// Add a closed ring to this arena.
    ///
    /// The last position of `ps` is assumed to repeat the first one, and is skipped.
    pub fn add_ring(&mut self, ps: &[Position]) {
        let ps = &ps[..ps.len().saturating_sub(1)];
        let old_len = self.coords.len();
        let ring = self.ring_len.push(ps.len());
        self.ring_start.push(old_len);
        self.holes.push(0..0);
        for p in ps {
            let idx = self.coords.push(*p);
            self.prev.push(Some(PosIdx(idx.0.saturating_sub(1))));
            self.next.push(Some(PosIdx(idx.0 + 1)));
            self.ring.push(Some(ring));
        }

        if let Some(first) = self.prev.as_mut_slice().get_mut(old_len) {
            *first = Some(PosIdx(self.coords.len() - 1));
        }
        if let Some(last) = self.next.as_mut_slice().last_mut() {
            if self.coords.len() > old_len {
                *last = Some(PosIdx(old_len));
            }
        }
    }

    /// The number of flat positions.
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Is the arena empty (e.g. because the tree only had points)?
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// All the coordinates, indexed by flat position.
    pub fn coords(&self) -> &PosVec<Position> {
        &self.coords
    }

    /// The ring containing `idx`, or `None` if it lies on an open line.
    pub fn ring(&self, idx: PosIdx) -> Option<RingIdx> {
        self.ring[idx]
    }

    /// The number of positions each ring started with.
    pub fn ring_lens(&self) -> &RingVec<usize> {
        &self.ring_len
    }

    /// All the positions of `ring`, deleted or not.
    pub fn ring_positions(&self, ring: RingIdx) -> impl Iterator<Item = PosIdx> {
        let start = self.ring_start[ring];
        (start..start + self.ring_len[ring]).map(PosIdx)
    }

    /// The holes of `ring`, if it's the exterior of a polygon.
    pub fn holes(&self, ring: RingIdx) -> impl Iterator<Item = RingIdx> {
        self.holes[ring].clone().map(RingIdx)
    }

    /// The initial adjacency, for the elimination engine to take over and edit.
    ///
    /// Ring positions always have both neighbours; line endpoints lack one.
    pub fn links(&self) -> (PosVec<Option<PosIdx>>, PosVec<Option<PosIdx>>) {
        (self.prev.clone(), self.next.clone())
    }

    /// The effective area of `idx` with respect to its original neighbours.
    ///
    /// Returns `None` for line endpoints, which are never removable.
    pub fn initial_area(&self, idx: PosIdx) -> Option<f64> {
        let prev = self.prev[idx]?;
        let next = self.next[idx]?;
        Some(effective_area(
            self.coords[prev],
            self.coords[idx],
            self.coords[next],
        ))
    }
}
