//! Grouping of exactly-coincident positions.
//!
//! Positions with identical coordinates (a vertex shared by two touching
//! rings, say) must survive or disappear together, otherwise simplification
//! would pull apart geometries that touched in the input.

use crate::{
    geom::Position,
    positions::{PosIdx, PosVec},
};

/// A run of coincident positions: the ranks `from..=to` in coordinate order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Group {
    /// The first rank in the group.
    pub from: usize,
    /// The last rank in the group (inclusive).
    pub to: usize,
}

impl Group {
    /// The number of positions in this group.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(self) -> usize {
        self.to - self.from + 1
    }
}

/// Coincidence groups over a position arena.
///
/// Computed once, before any deletions; group membership never changes.
#[derive(Clone, Debug)]
pub struct Groups {
    /// All flat indices, sorted by coordinates. Ties are in index order.
    order: Vec<PosIdx>,
    group: PosVec<Group>,
}

impl Groups {
    /// Groups the positions in `coords` by exact coordinate equality.
    pub fn new(coords: &PosVec<Position>) -> Self {
        let mut order: Vec<PosIdx> = coords.indices().collect();
        // The sort is stable, so members of a group come out in index order.
        order.sort_by(|&i, &j| coords[i].cmp(&coords[j]));

        let n = order.len();
        let same = |r: usize, s: usize| coords[order[r]] == coords[order[s]];

        let mut from = vec![0; n];
        for r in 1..n {
            from[r] = if same(r - 1, r) { from[r - 1] } else { r };
        }
        let mut to = vec![n.saturating_sub(1); n];
        for r in (0..n.saturating_sub(1)).rev() {
            to[r] = if same(r, r + 1) { to[r + 1] } else { r };
        }

        let mut group = PosVec::filled(Group { from: 0, to: 0 }, n);
        for (r, &idx) in order.iter().enumerate() {
            group[idx] = Group {
                from: from[r],
                to: to[r],
            };
        }

        Groups { order, group }
    }

    /// The group containing `idx`.
    pub fn group(&self, idx: PosIdx) -> Group {
        self.group[idx]
    }

    /// All members of a group, in index order.
    pub fn members(&self, group: Group) -> &[PosIdx] {
        &self.order[group.from..=group.to]
    }

    /// Iterates over every group that has more than one member.
    pub fn shared(&self) -> impl Iterator<Item = Group> + '_ {
        let mut rank = 0;
        std::iter::from_fn(move || {
            while rank < self.order.len() {
                let g = self.group[self.order[rank]];
                rank = g.to + 1;
                if g.len() > 1 {
                    return Some(g);
                }
            }
            None
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn coords(ps: &[(f64, f64)]) -> PosVec<Position> {
        PosVec::from_vec(ps.iter().map(|&p| p.into()).collect())
    }

    #[test]
    fn basic() {
        let cs = coords(&[(1.0, 1.0), (0.0, 0.0), (1.0, 1.0), (0.0, 2.0), (1.0, 1.0)]);
        let groups = Groups::new(&cs);

        assert_eq!(groups.group(PosIdx(1)), Group { from: 0, to: 0 });
        assert_eq!(groups.group(PosIdx(3)), Group { from: 1, to: 1 });
        let g = groups.group(PosIdx(0));
        assert_eq!(g, Group { from: 2, to: 4 });
        assert_eq!(groups.group(PosIdx(2)), g);
        assert_eq!(groups.group(PosIdx(4)), g);
        assert_eq!(groups.members(g), &[PosIdx(0), PosIdx(2), PosIdx(4)]);
        assert_eq!(groups.shared().collect::<Vec<_>>(), vec![g]);
    }

    #[test]
    fn signed_zero_coincides() {
        let cs = coords(&[(0.0, 1.0), (-0.0, 1.0)]);
        let groups = Groups::new(&cs);
        assert_eq!(groups.group(PosIdx(0)), groups.group(PosIdx(1)));
    }

    #[test]
    fn empty() {
        let groups = Groups::new(&PosVec::default());
        assert_eq!(groups.shared().count(), 0);
    }

    proptest! {
        // Small integer coordinates, so that there are plenty of coincidences.
        #[test]
        fn same_group_iff_same_coords(ps in prop::collection::vec((0..4i32, 0..4i32), 0..40)) {
            let cs = PosVec::from_vec(
                ps.iter().map(|&(x, y)| Position::new(x as f64, y as f64)).collect::<Vec<_>>()
            );
            let groups = Groups::new(&cs);
            for i in cs.indices() {
                let g = groups.group(i);
                prop_assert!(groups.members(g).contains(&i));
                for j in cs.indices() {
                    prop_assert_eq!(groups.group(j) == g, cs[i] == cs[j]);
                }
            }
        }
    }
}
