//! Min-priority frontier with lazy deletion.
//!
//! The binary heap cannot lower the key of an entry in place. Instead a
//! cheaper entry is pushed alongside the old one, and the old one is
//! recognised as stale when it is popped.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A frontier entry: `node` reached at cost `g`, ordered by `priority`.
#[derive(Debug, Clone)]
struct Entry<N> {
    priority: f64,
    g: f64,
    node: N,
}

// BinaryHeap is a max-heap, so both comparisons are flipped. Ties on
// priority fall back to the node key, smallest first.
impl<N: Ord> Ord for Entry<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl<N: Ord> PartialOrd for Entry<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N: Ord> PartialEq for Entry<N> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<N: Ord> Eq for Entry<N> {}

/// Priority queue of discovered nodes awaiting expansion.
#[derive(Debug)]
pub(crate) struct Frontier<N> {
    heap: BinaryHeap<Entry<N>>,
}

impl<N: Ord> Frontier<N> {
    pub(crate) fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    /// Queue `node`, reached at cost `g`, with the given priority.
    pub(crate) fn push(&mut self, node: N, g: f64, priority: f64) {
        self.heap.push(Entry { priority, g, node });
    }

    /// Pop the lowest-priority entry that `is_stale` does not reject.
    ///
    /// Returns the node and the cost it was queued with.
    pub(crate) fn pop_min<F>(&mut self, mut is_stale: F) -> Option<(N, f64)>
    where
        F: FnMut(&N, f64) -> bool,
    {
        while let Some(entry) = self.heap.pop() {
            if is_stale(&entry.node, entry.g) {
                continue;
            }
            return Some((entry.node, entry.g));
        }
        None
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn never_stale<N>(_: &N, _: f64) -> bool {
        false
    }

    #[test]
    fn pops_in_priority_order() {
        let mut frontier = Frontier::new();
        frontier.push("C", 0.0, 3.0);
        frontier.push("A", 0.0, 1.0);
        frontier.push("B", 0.0, 2.0);

        assert_eq!(frontier.len(), 3);
        assert_eq!(frontier.pop_min(never_stale), Some(("A", 0.0)));
        assert_eq!(frontier.pop_min(never_stale), Some(("B", 0.0)));
        assert_eq!(frontier.pop_min(never_stale), Some(("C", 0.0)));
        assert_eq!(frontier.pop_min(never_stale), None);
        assert_eq!(frontier.len(), 0);
    }

    #[test]
    fn ties_break_on_smallest_node() {
        let mut frontier = Frontier::new();
        frontier.push("Z", 0.0, 1.0);
        frontier.push("M", 0.0, 1.0);
        frontier.push("B", 0.0, 1.0);

        assert_eq!(frontier.pop_min(never_stale).map(|(n, _)| n), Some("B"));
        assert_eq!(frontier.pop_min(never_stale).map(|(n, _)| n), Some("M"));
        assert_eq!(frontier.pop_min(never_stale).map(|(n, _)| n), Some("Z"));
    }

    #[test]
    fn skips_stale_entries() {
        let mut frontier = Frontier::new();
        frontier.push("A", 5.0, 5.0);
        frontier.push("A", 2.0, 2.0);
        frontier.push("B", 3.0, 3.0);

        let best_a = 2.0;
        let mut skipped = 0;
        let mut is_stale = |node: &&str, g: f64| {
            let stale = *node == "A" && g > best_a;
            if stale {
                skipped += 1;
            }
            stale
        };

        assert_eq!(frontier.pop_min(&mut is_stale), Some(("A", 2.0)));
        assert_eq!(frontier.pop_min(&mut is_stale), Some(("B", 3.0)));
        assert_eq!(frontier.pop_min(&mut is_stale), None);
        assert_eq!(skipped, 1);
    }

    #[test]
    fn nan_priorities_sort_last() {
        let mut frontier = Frontier::new();
        frontier.push("nan", 0.0, f64::NAN);
        frontier.push("inf", 0.0, f64::INFINITY);
        frontier.push("one", 0.0, 1.0);

        assert_eq!(frontier.pop_min(never_stale).map(|(n, _)| n), Some("one"));
        assert_eq!(frontier.pop_min(never_stale).map(|(n, _)| n), Some("inf"));
        assert_eq!(frontier.pop_min(never_stale).map(|(n, _)| n), Some("nan"));
    }
}
