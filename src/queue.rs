//! An indexed binary min-heap of removal candidates.

use crate::{
    geom::Position,
    num::CheapOrderedFloat,
    positions::{PosIdx, PosVec},
};

/// A binary min-heap of flat position indices, keyed by effective area.
///
/// Unlike `std::collections::BinaryHeap`, this one knows where each index is
/// stored, so that the priority of an index already in the heap can be
/// changed in `O(log n)` after its neighbours have been relinked.
///
/// Ties are broken by the coordinates (smaller `x`, then smaller `y`) and
/// then by the index itself, so the pop order never depends on insertion order.
#[derive(Clone, Debug)]
pub struct EliminationQueue<'a> {
    coords: &'a PosVec<Position>,
    heap: Vec<PosIdx>,
    /// Where each index lives in `heap`, if it's there at all.
    slot: PosVec<Option<usize>>,
    priority: PosVec<f64>,
}

type Key = (CheapOrderedFloat, CheapOrderedFloat, CheapOrderedFloat, PosIdx);

impl<'a> EliminationQueue<'a> {
    /// Creates an empty queue with room for every position in `coords`.
    pub fn new(coords: &'a PosVec<Position>) -> Self {
        EliminationQueue {
            coords,
            heap: Vec::with_capacity(coords.len()),
            slot: PosVec::filled(None, coords.len()),
            priority: PosVec::filled(f64::INFINITY, coords.len()),
        }
    }

    /// The number of indices in the queue.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Is `idx` currently in the queue?
    pub fn contains(&self, idx: PosIdx) -> bool {
        self.slot[idx].is_some()
    }

    /// Adds `idx`, which must not already be in the queue.
    pub fn insert(&mut self, idx: PosIdx, priority: f64) {
        debug_assert!(!self.contains(idx), "{idx:?} is already queued");
        self.priority[idx] = priority;
        let pos = self.heap.len();
        self.heap.push(idx);
        self.slot[idx] = Some(pos);
        self.sift_up(pos);
    }

    /// Removes and returns the index with the smallest priority.
    pub fn pop(&mut self) -> Option<(PosIdx, f64)> {
        let last = self.heap.len().checked_sub(1)?;
        self.swap(0, last);
        let idx = self.heap.pop()?;
        self.slot[idx] = None;
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some((idx, self.priority[idx]))
    }

    /// Changes the priority of `idx`, which must already be in the queue.
    pub fn update(&mut self, idx: PosIdx, priority: f64) {
        let Some(pos) = self.slot[idx] else {
            debug_assert!(false, "{idx:?} isn't queued");
            return;
        };
        self.priority[idx] = priority;
        let pos = self.sift_down(pos);
        self.sift_up(pos);
    }

    /// Changes the priority of `idx`, adding it if it isn't already queued.
    pub fn upsert(&mut self, idx: PosIdx, priority: f64) {
        if self.contains(idx) {
            self.update(idx, priority);
        } else {
            self.insert(idx, priority);
        }
    }

    fn key(&self, idx: PosIdx) -> Key {
        let p = self.coords[idx];
        (
            CheapOrderedFloat::from(self.priority[idx]),
            CheapOrderedFloat::from(p.x),
            CheapOrderedFloat::from(p.y),
            idx,
        )
    }

    fn less(&self, i: usize, j: usize) -> bool {
        self.key(self.heap[i]) < self.key(self.heap[j])
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.heap.swap(i, j);
        self.slot[self.heap[i]] = Some(i);
        self.slot[self.heap[j]] = Some(j);
    }

    /// Moves the entry at `pos` towards the root; returns where it ended up.
    fn sift_up(&mut self, mut pos: usize) -> usize {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !self.less(pos, parent) {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
        pos
    }

    /// Moves the entry at `pos` towards the leaves; returns where it ended up.
    fn sift_down(&mut self, mut pos: usize) -> usize {
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut smallest = pos;
            if left < self.heap.len() && self.less(left, smallest) {
                smallest = left;
            }
            if right < self.heap.len() && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == pos {
                return pos;
            }
            self.swap(pos, smallest);
            pos = smallest;
        }
    }

    #[cfg(test)]
    fn check_invariants(&self) {
        for pos in 1..self.heap.len() {
            assert!(!self.less(pos, (pos - 1) / 2));
        }
        for (pos, &idx) in self.heap.iter().enumerate() {
            assert_eq!(self.slot[idx], Some(pos));
        }
        let queued = self.slot.iter().filter(|(_, s)| s.is_some()).count();
        assert_eq!(queued, self.heap.len());
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn coords(n: usize) -> PosVec<Position> {
        PosVec::from_vec((0..n).map(|i| Position::new(i as f64, 0.0)).collect())
    }

    #[test]
    fn pops_in_priority_order() {
        let cs = coords(5);
        let mut q = EliminationQueue::new(&cs);
        for (i, area) in [3.0, 1.0, 4.0, 1.5, 9.0].into_iter().enumerate() {
            q.insert(PosIdx(i), area);
        }
        q.check_invariants();
        let order: Vec<_> = std::iter::from_fn(|| q.pop().map(|(idx, _)| idx.0)).collect();
        assert_eq!(order, vec![1, 3, 0, 2, 4]);
        assert_eq!(q.len(), 0);
    }

    #[test]
    fn update_moves_both_ways() {
        let cs = coords(4);
        let mut q = EliminationQueue::new(&cs);
        for i in 0..4 {
            q.insert(PosIdx(i), i as f64);
        }
        q.update(PosIdx(3), -1.0);
        q.check_invariants();
        q.update(PosIdx(0), 10.0);
        q.check_invariants();
        assert_eq!(q.pop(), Some((PosIdx(3), -1.0)));
        assert_eq!(q.pop(), Some((PosIdx(1), 1.0)));
        assert_eq!(q.pop(), Some((PosIdx(2), 2.0)));
        assert_eq!(q.pop(), Some((PosIdx(0), 10.0)));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn ties_prefer_smaller_coordinates() {
        let cs = PosVec::from_vec(vec![
            Position::new(2.0, 0.0),
            Position::new(1.0, 5.0),
            Position::new(1.0, 3.0),
            Position::new(1.0, 3.0),
        ]);
        let mut q = EliminationQueue::new(&cs);
        for i in [0, 3, 1, 2] {
            q.insert(PosIdx(i), 7.0);
        }
        let order: Vec<_> = std::iter::from_fn(|| q.pop().map(|(idx, _)| idx.0)).collect();
        assert_eq!(order, vec![2, 3, 1, 0]);
    }

    #[test]
    fn upsert_reinserts_popped() {
        let cs = coords(2);
        let mut q = EliminationQueue::new(&cs);
        q.insert(PosIdx(0), 1.0);
        q.insert(PosIdx(1), 2.0);
        assert_eq!(q.pop(), Some((PosIdx(0), 1.0)));
        assert!(!q.contains(PosIdx(0)));
        q.upsert(PosIdx(0), 5.0);
        q.upsert(PosIdx(1), 6.0);
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop(), Some((PosIdx(0), 5.0)));
        assert_eq!(q.pop(), Some((PosIdx(1), 6.0)));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(usize, u8),
        Update(usize, u8),
        Pop,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..16usize, any::<u8>()).prop_map(|(i, p)| Op::Insert(i, p)),
            (0..16usize, any::<u8>()).prop_map(|(i, p)| Op::Update(i, p)),
            Just(Op::Pop),
        ]
    }

    proptest! {
        #[test]
        fn matches_sorted_reference(ops in prop::collection::vec(op(), 0..100)) {
            let cs = coords(16);
            let mut q = EliminationQueue::new(&cs);
            // The reference is just a list of (priority, idx), searched linearly.
            let mut reference: Vec<(u8, usize)> = Vec::new();
            for op in ops {
                match op {
                    Op::Insert(i, p) | Op::Update(i, p) => {
                        q.upsert(PosIdx(i), p as f64);
                        reference.retain(|&(_, j)| j != i);
                        reference.push((p, i));
                    }
                    Op::Pop => {
                        // Coordinates increase with the index, so the tie-break is by index.
                        let expected = reference.iter().copied().min();
                        reference.retain(|&r| Some(r) != expected);
                        prop_assert_eq!(
                            q.pop(),
                            expected.map(|(p, i)| (PosIdx(i), p as f64))
                        );
                    }
                }
                q.check_invariants();
            }
        }
    }
}
