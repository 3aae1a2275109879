use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::config::TieBreak;
use crate::grid::Node;


/// Heap entry - a snapshot of a node at push time
/// Only the latest push for an id is live, older entries are stale
#[derive(Debug, Clone)]
struct OpenEntry {
    node: Node,
    f: f64,
    secondary: f64, // h under TieBreak::LowerH, zero otherwise
    seq: u64, // push counter, last resort for a total order
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: smaller keys must compare greater
        other.f.total_cmp(&self.f)
            .then_with(|| other.secondary.total_cmp(&self.secondary))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for OpenEntry {}


/// Cost and push number of the live entry for one id
#[derive(Debug, Clone, Copy)]
struct Slot {
    g: f64,
    seq: u64,
}

impl Slot {
    const EMPTY: Slot = Slot { g: f64::INFINITY, seq: u64::MAX };
}


/// Frontier of the search, ordered by ascending (f, h)
/// Decrease-key is a plain re-push; superseded entries are dropped when popped.
/// Per-cell state is a small slot, full nodes only live in the heap.
#[derive(Debug)]
pub struct OpenList {
    heap: BinaryHeap<OpenEntry>,
    slots: Vec<Slot>, // index = node id
    tie_break: TieBreak,
    pushes: u64,
    stale_discards: usize,
}

impl OpenList {

    /// Empty open list able to hold every id in `[0, capacity)`
    pub fn new(capacity: usize, tie_break: TieBreak) -> Self {
        Self {
            heap: BinaryHeap::new(),
            slots: vec![Slot::EMPTY; capacity],
            tie_break,
            pushes: 0,
            stale_discards: 0,
        }
    }

    /// Insert or update a node; the node's current g becomes the best known g for its id
    pub fn push(&mut self, node: Node) {
        debug_assert!(node.g.is_finite(), "pushed node {} without a cost", node.id);

        let secondary = match self.tie_break {
            TieBreak::LowerH => node.h,
            TieBreak::InsertionOrder => 0.0,
        };

        self.slots[node.id] = Slot { g: node.g, seq: self.pushes };
        self.heap.push(OpenEntry {
            f: node.f(),
            node,
            secondary,
            seq: self.pushes,
        });
        self.pushes += 1;
    }

    /// Remove and return the open node with the smallest (f, h)
    /// Stale entries met on the way are discarded. None once the frontier is empty.
    pub fn pop_min(&mut self) -> Option<Node> {
        while let Some(OpenEntry { node, seq, .. }) = self.heap.pop() {
            // an id already popped through a fresher entry reads empty here
            if self.slots[node.id].seq != seq {
                self.stale_discards += 1;
                continue;
            }

            self.slots[node.id] = Slot::EMPTY;
            return Some(node);
        }
        None
    }

    /// True if the id is waiting in the frontier
    pub fn contains(&self, id: usize) -> bool {
        self.slots[id].seq != Slot::EMPTY.seq
    }

    /// Best g recorded for an open id
    pub fn best_known(&self, id: usize) -> Option<f64> {
        self.contains(id).then_some(self.slots[id].g)
    }

    /// Number of entries dropped because a better cost superseded them
    pub fn stale_discards(&self) -> usize {
        self.stale_discards
    }
}
