//! The vertex elimination loop.
//!
//! This is Visvalingam-Whyatt elimination with two twists. First, coincident
//! positions (see [`Groups`]) are only ever deleted together: popping one
//! copy just marks it as a candidate, and nothing happens until every copy has
//! been marked. Second, rings are never left with fewer than three distinct
//! vertices. A deletion that would do that takes the whole ring with it (and
//! the ring's holes, if it's the exterior of a polygon), and that in turn is
//! only allowed if every vertex of those rings may be deleted.

use arrayvec::ArrayVec;

use crate::{
    geom::effective_area,
    groups::{Group, Groups},
    options::Limits,
    positions::{PosIdx, PosVec, Positions, RingIdx, RingVec},
    queue::EliminationQueue,
};

/// The smallest number of distinct vertices a ring can have.
pub const MIN_RING_LEN: usize = 3;

/// The mutable state of one elimination run.
pub struct Eliminator<'a> {
    positions: &'a Positions,
    groups: &'a Groups,
    prev: PosVec<Option<PosIdx>>,
    next: PosVec<Option<PosIdx>>,
    /// How many live vertices each ring has left.
    ring_len: RingVec<usize>,
    /// Does the ring pass through some position more than once?
    repeats: RingVec<bool>,
    deleted: PosVec<bool>,
    candidate: PosVec<bool>,
    /// How many members of each group are candidates, indexed by `Group::from`.
    group_candidates: Vec<usize>,
    queue: EliminationQueue<'a>,
    /// Complete groups whose commit had to wait for some other group.
    deferred: Vec<Group>,
    limits: Limits,
    deletions: usize,
}

/// The deletions needed to commit a group, worked out before any of them happen.
#[derive(Default)]
struct Closure {
    groups: Vec<Group>,
    /// Rings that lose all their vertices.
    collapsing: Vec<RingIdx>,
    /// How many closure members each touched ring contains.
    tally: Vec<(RingIdx, usize)>,
}

impl Closure {
    fn add_group(&mut self, group: Group) {
        if !self.groups.contains(&group) {
            self.groups.push(group);
        }
    }

    fn is_collapsing(&self, ring: RingIdx) -> bool {
        self.collapsing.contains(&ring)
    }

    fn count(&mut self, ring: RingIdx) -> usize {
        if let Some((_, count)) = self.tally.iter_mut().find(|(r, _)| *r == ring) {
            *count += 1;
            *count
        } else {
            self.tally.push((ring, 1));
            1
        }
    }
}

impl<'a> Eliminator<'a> {
    /// Prepares a run, queueing every position that has two neighbours.
    pub fn new(positions: &'a Positions, groups: &'a Groups, limits: Limits) -> Self {
        let (prev, next) = positions.links();
        let n = positions.len();
        let mut queue = EliminationQueue::new(positions.coords());
        for idx in positions.coords().indices() {
            if let Some(area) = positions.initial_area(idx) {
                queue.insert(idx, area);
            }
        }

        let mut repeats = RingVec::filled(false, positions.ring_lens().len());
        for group in groups.shared() {
            let mut rings: Vec<RingIdx> = groups
                .members(group)
                .iter()
                .filter_map(|&idx| positions.ring(idx))
                .collect();
            rings.sort();
            for w in rings.windows(2) {
                if w[0] == w[1] {
                    repeats[w[0]] = true;
                }
            }
        }

        Eliminator {
            positions,
            groups,
            prev,
            next,
            ring_len: positions.ring_lens().clone(),
            repeats,
            deleted: PosVec::filled(false, n),
            candidate: PosVec::filled(false, n),
            group_candidates: vec![0; n],
            queue,
            deferred: Vec::new(),
            limits,
            deletions: 0,
        }
    }

    /// Runs the elimination to completion, returning which positions were deleted.
    pub fn run(mut self) -> PosVec<bool> {
        while let Some((idx, area)) = self.queue.pop() {
            if self.deleted[idx] {
                continue;
            }
            if area >= self.limits.tolerance && self.limits.quota == 0 {
                tracing::debug!(
                    deletions = self.deletions,
                    remaining = self.queue.len() + 1,
                    "stopping at area {area:e}"
                );
                return self.deleted;
            }

            self.mark_candidate(idx);
            let group = self.groups.group(idx);
            if self.is_complete(group) && self.commit(group) {
                self.retry_deferred();
            }
        }
        tracing::debug!(deletions = self.deletions, "ran out of candidates");
        self.deleted
    }

    fn mark_candidate(&mut self, idx: PosIdx) {
        if !self.candidate[idx] {
            self.candidate[idx] = true;
            self.group_candidates[self.groups.group(idx).from] += 1;
        }
    }

    fn is_complete(&self, group: Group) -> bool {
        self.group_candidates[group.from] == group.len()
    }

    /// The live vertices of `ring`.
    fn live_vertices(&self, ring: RingIdx) -> Vec<PosIdx> {
        self.positions
            .ring_positions(ring)
            .filter(|&idx| !self.deleted[idx])
            .collect()
    }

    /// Would `ring` be left with too few distinct vertices if `closure` went,
    /// counting `closure` members one at a time as they're visited?
    fn degenerates(&self, ring: RingIdx, closure: &mut Closure) -> bool {
        if self.repeats[ring] {
            let mut left: Vec<usize> = self
                .live_vertices(ring)
                .into_iter()
                .map(|idx| self.groups.group(idx))
                .filter(|g| !closure.groups.contains(g))
                .map(|g| g.from)
                .collect();
            left.sort_unstable();
            left.dedup();
            left.len() < MIN_RING_LEN
        } else {
            self.ring_len[ring] < MIN_RING_LEN + closure.count(ring)
        }
    }

    /// Adds `ring` and its holes to the closure.
    fn collapse(&mut self, ring: RingIdx, closure: &mut Closure) {
        let positions = self.positions;
        for r in std::iter::once(ring).chain(positions.holes(ring)) {
            if self.ring_len[r] == 0 || closure.is_collapsing(r) {
                continue;
            }
            tracing::trace!(ring = ?r, "ring would degenerate, collapsing it");
            closure.collapsing.push(r);
            for v in self.live_vertices(r) {
                self.mark_candidate(v);
                closure.add_group(self.groups.group(v));
            }
        }
    }

    /// Works out everything that has to go if `group` goes.
    fn closure(&mut self, group: Group) -> Closure {
        let groups = self.groups;
        let mut closure = Closure::default();
        closure.add_group(group);

        let mut i = 0;
        while let Some(&g) = closure.groups.get(i) {
            i += 1;
            for &idx in groups.members(g) {
                if self.deleted[idx] {
                    continue;
                }
                let Some(ring) = self.positions.ring(idx) else {
                    continue;
                };
                if !closure.is_collapsing(ring) && self.degenerates(ring, &mut closure) {
                    self.collapse(ring, &mut closure);
                }
            }
        }
        closure
    }

    /// Deletes `group` and everything that has to go with it, if all of it is
    /// allowed to go. Returns false if the commit has to wait.
    fn commit(&mut self, group: Group) -> bool {
        let closure = self.closure(group);
        if !closure.groups.iter().all(|&g| self.is_complete(g)) {
            tracing::trace!(?group, "deferring: some coincident positions aren't candidates yet");
            if !self.deferred.contains(&group) {
                self.deferred.push(group);
            }
            return false;
        }

        for &ring in &closure.collapsing {
            for v in self.live_vertices(ring) {
                self.delete(v);
            }
            self.ring_len[ring] = 0;
        }

        let groups = self.groups;
        let mut touched = Vec::new();
        for &g in &closure.groups {
            for &idx in groups.members(g) {
                if !self.deleted[idx] {
                    touched.extend(self.splice(idx));
                }
            }
        }

        for idx in touched {
            if !self.deleted[idx] {
                self.reprioritize(idx);
            }
        }
        true
    }

    /// Tries the deferred commits again, until none of them makes progress.
    ///
    /// A commit can shrink a ring that a deferred closure was waiting on, so
    /// that the closure now collapses it instead.
    fn retry_deferred(&mut self) {
        let mut progress = true;
        while progress && !self.deferred.is_empty() {
            progress = false;
            for group in std::mem::take(&mut self.deferred) {
                let gone = self
                    .groups
                    .members(group)
                    .first()
                    .map_or(true, |&idx| self.deleted[idx]);
                if !gone && self.commit(group) {
                    progress = true;
                }
            }
        }
    }

    fn delete(&mut self, idx: PosIdx) {
        debug_assert!(!self.deleted[idx]);
        self.deleted[idx] = true;
        self.deletions += 1;
        self.limits.quota = self.limits.quota.saturating_sub(1);
    }

    /// Deletes `idx` and links its neighbours to each other, returning the neighbours.
    fn splice(&mut self, idx: PosIdx) -> ArrayVec<PosIdx, 2> {
        let prev = self.prev[idx];
        let next = self.next[idx];
        debug_assert!(prev.is_some() && next.is_some(), "{idx:?} is an endpoint");

        if let Some(p) = prev {
            self.next[p] = next;
        }
        if let Some(n) = next {
            self.prev[n] = prev;
        }
        self.prev[idx] = None;
        self.next[idx] = None;
        if let Some(ring) = self.positions.ring(idx) {
            self.ring_len[ring] -= 1;
        }
        self.delete(idx);

        prev.into_iter().chain(next).collect()
    }

    fn reprioritize(&mut self, idx: PosIdx) {
        if let (Some(prev), Some(next)) = (self.prev[idx], self.next[idx]) {
            let coords = self.positions.coords();
            let area = effective_area(coords[prev], coords[idx], coords[next]);
            self.queue.upsert(idx, area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Position;

    fn p(x: f64, y: f64) -> Position {
        Position::new(x, y)
    }

    fn run(positions: &Positions, tolerance: f64, quota: usize) -> Vec<usize> {
        let groups = Groups::new(positions.coords());
        let deleted = Eliminator::new(positions, &groups, Limits { tolerance, quota }).run();
        deleted
            .iter()
            .filter(|(_, d)| **d)
            .map(|(idx, _)| idx.0)
            .collect()
    }

    #[test]
    fn removes_flattest_first() {
        let mut pos = Positions::default();
        // Initial areas: 1.0, 0.0, 1.5.
        pos.add_line(&[p(0.0, 0.0), p(1.0, 2.0), p(2.0, 2.0), p(3.0, 2.0), p(4.0, 5.0)]);
        assert_eq!(run(&pos, 0.5, 0), vec![2]);
        assert_eq!(run(&pos, 0.0, 1), vec![2]);
        assert_eq!(run(&pos, 1e9, 0), vec![1, 2, 3]);
    }

    #[test]
    fn endpoints_survive() {
        let mut pos = Positions::default();
        pos.add_line(&[p(0.0, 0.0), p(1.0, 0.0)]);
        assert_eq!(run(&pos, 1e9, 2), Vec::<usize>::new());
    }

    #[test]
    fn triangle_collapses_whole() {
        let mut pos = Positions::default();
        pos.add_ring(&[p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0), p(0.0, 0.0)]);
        assert_eq!(run(&pos, 1.0, 0), vec![0, 1, 2]);
        assert_eq!(run(&pos, 0.5, 0), Vec::<usize>::new());
    }

    #[test]
    fn square_loses_one_vertex_then_collapses() {
        let mut pos = Positions::default();
        pos.add_ring(&[p(0.0, 0.0), p(2.0, 0.0), p(2.0, 2.0), p(0.0, 2.0), p(0.0, 0.0)]);
        // Every vertex starts with area 2; (0, 0) goes first, leaving a triangle of area 2.
        assert_eq!(run(&pos, 0.0, 1), vec![0]);
        assert_eq!(run(&pos, 2.5, 0), vec![0, 1, 2, 3]);
    }

    #[test]
    fn shared_vertex_waits_for_all_copies() {
        let mut pos = Positions::default();
        // Two lines meeting at a shared interior vertex (1, 0).
        pos.add_line(&[p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)]);
        pos.add_line(&[p(1.0, -1.0), p(1.0, 0.0), p(1.0, 5.0)]);
        // Both copies are flat, so both go.
        assert_eq!(run(&pos, 0.5, 0), vec![1, 4]);

        let mut pos = Positions::default();
        pos.add_line(&[p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)]);
        pos.add_line(&[p(0.0, -1.0), p(1.0, 0.0), p(0.0, 1.0)]);
        // The second copy has area 1, so neither goes.
        assert_eq!(run(&pos, 0.5, 0), Vec::<usize>::new());
        assert_eq!(run(&pos, 1.5, 0), vec![1, 4]);
    }

    #[test]
    fn shared_with_endpoint_is_pinned() {
        let mut pos = Positions::default();
        pos.add_line(&[p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)]);
        pos.add_line(&[p(1.0, 0.0), p(1.0, 1.0)]);
        assert_eq!(run(&pos, 1e9, 0), Vec::<usize>::new());
    }

    #[test]
    fn triangle_sharing_a_vertex_collapses_only_with_its_partner() {
        let mut pos = Positions::default();
        // A small triangle touching a big square at (0, 0).
        pos.add_ring(&[p(0.0, 0.0), p(-1.0, 0.0), p(0.0, -1.0), p(0.0, 0.0)]);
        pos.add_ring(&[
            p(0.0, 0.0),
            p(10.0, 0.0),
            p(10.0, 10.0),
            p(0.0, 10.0),
            p(0.0, 0.0),
        ]);
        // The triangle's vertices have area 0.5 but its corner at (0, 0) is
        // pinned by the square, whose vertices have area 50.
        assert_eq!(run(&pos, 1.0, 0), Vec::<usize>::new());
        // Once the square's corner goes, the triangle goes with it.
        assert_eq!(run(&pos, 0.0, 1), vec![0, 1, 2, 3]);
        assert_eq!(run(&pos, 51.0, 0), (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn ring_with_repeated_position() {
        let mut pos = Positions::default();
        // A figure-eight: the ring passes through (0, 0) twice.
        pos.add_ring(&[
            p(0.0, 0.0),
            p(1.0, 1.0),
            p(2.0, 0.0),
            p(1.0, -1.0),
            p(0.0, 0.0),
            p(-1.0, 1.0),
            p(-2.0, 0.0),
            p(-1.0, -1.0),
            p(0.0, 0.0),
        ]);
        // Both copies of (0, 0) are deleted together, leaving a 6-vertex ring.
        assert_eq!(run(&pos, 0.0, 1), vec![0, 4]);
        // Everything can go, and the ring never drops to one or two vertices.
        assert_eq!(run(&pos, 1e9, 0), (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn ring_collapses_when_copies_leave_too_few() {
        let mut pos = Positions::default();
        // A ring visiting (0, 0) twice, non-adjacently. Once the spike at (4, 0)
        // is gone, removing both copies would leave two vertices.
        pos.add_ring(&[
            p(0.0, 0.0),
            p(4.0, 0.0),
            p(0.0, 0.0),
            p(0.0, 4.0),
            p(-4.0, -4.0),
            p(0.0, 0.0),
        ]);
        assert_eq!(run(&pos, 0.0, 1), vec![1]);
        assert_eq!(run(&pos, 0.0, 2), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn ring_keeps_three_distinct_positions() {
        let mut pos = Positions::default();
        // Three copies of (0, 0): deleting the spike at (1, 1) would leave
        // (0, 0), (0, 0), (5, 0), which has four vertices but only two places.
        let a = p(0.0, 0.0);
        pos.add_ring(&[a, p(1.0, 1.0), a, p(5.0, 0.0), a]);
        assert_eq!(run(&pos, 0.0, 1), vec![0, 1, 2, 3]);
    }

    #[test]
    fn deferred_collapse_is_retried() {
        let mut pos = Positions::default();
        // A triangle and a quadrilateral sharing (2, 4). The triangle is
        // ready to collapse before the quadrilateral's copy of (2, 4) is a
        // candidate; once the quadrilateral shrinks, the collapse takes it too.
        pos.add_ring(&[p(1.0, 1.0), p(1.0, 2.0), p(2.0, 4.0), p(1.0, 1.0)]);
        pos.add_ring(&[p(0.0, 3.0), p(4.0, 4.0), p(2.0, 4.0), p(3.0, 1.0), p(0.0, 3.0)]);
        assert_eq!(run(&pos, 3.0, 0), (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn holes_go_with_their_exterior() {
        let mut pos = Positions::default();
        let exterior = [p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0), p(0.0, 0.0)];
        let hole = [
            p(5.0, 5.0),
            p(105.0, 5.0),
            p(105.0, 105.0),
            p(5.0, 105.0),
            p(5.0, 5.0),
        ];
        pos.add_polygon(&[exterior.to_vec(), hole.to_vec()]);
        assert_eq!(run(&pos, 1.0, 0), (0..7).collect::<Vec<_>>());
        assert_eq!(run(&pos, 0.4, 0), Vec::<usize>::new());

        // A hole corner pinned by a line keeps the whole polygon.
        pos.add_line(&[p(300.0, 300.0), p(105.0, 105.0), p(300.0, 0.0)]);
        assert_eq!(run(&pos, 1.0, 0), Vec::<usize>::new());
    }
}
