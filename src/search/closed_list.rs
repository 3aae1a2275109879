use crate::grid::Node;


const UNSET: u32 = u32::MAX;


/// Finalized nodes in closing order, plus a per-cell slot into that order
/// Closing is permanent for the lifetime of the list
#[derive(Debug)]
pub struct ClosedList {
    nodes: Vec<Node>, // closing order
    slots: Vec<u32>, // index = node id, position in `nodes` or UNSET
}

impl ClosedList {

    /// Empty closed list able to hold every id in `[0, capacity)`
    /// `Grid` keeps its size below `u32::MAX`, so every position fits a slot
    pub fn new(capacity: usize) -> Self {
        Self {
            nodes: Vec::new(),
            slots: vec![UNSET; capacity],
        }
    }

    pub fn contains(&self, id: usize) -> bool {
        self.slots[id] != UNSET
    }

    /// Close a node; returns false if the id was already closed
    pub fn insert(&mut self, node: Node) -> bool {
        let id = node.id;
        if self.slots[id] != UNSET {
            return false;
        }
        let Ok(slot) = u32::try_from(self.nodes.len()) else {
            debug_assert!(false, "closed list outgrew its slot type");
            return false;
        };
        self.slots[id] = slot;
        self.nodes.push(node);
        true
    }

    /// Finalized state of a closed id
    pub fn get(&self, id: usize) -> Option<&Node> {
        match self.slots[id] {
            UNSET => None,
            slot => self.nodes.get(slot as usize),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Closed nodes in the order they were closed
    pub fn iter(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter()
    }

    /// Follow parent links from `id` back to the root
    /// Returns the ordered path from root to `id`, or None if a link leaves the closed set
    pub fn trace_path(&self, id: usize) -> Option<Vec<Node>> {
        let mut path = Vec::new();
        let mut current = self.get(id)?;

        loop {
            path.push(current.clone());
            if current.is_root() {
                break;
            }

            // every closed node appears at most once on a well formed chain
            if path.len() > self.len() {
                return None;
            }

            current = self.get(current.parent_id?)?;
        }

        // The path is in reverse order, so reverse it
        path.reverse();
        Some(path)
    }
}
