// Mutable placement state for one school run.

use std::collections::{HashMap, HashSet};

use crate::output::PositionedNode;

/// A node that could not be placed on its natural wave turn.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredEntry {
    pub node_id: String,
    /// Placed node the entry would ideally hang off.
    pub intended_parent: Option<String>,
    pub group: usize,
}

#[derive(Debug, Clone)]
pub struct PlacementState {
    /// Indexed by grid point.
    pub occupied: Vec<bool>,
    pub placed: HashSet<String>,
    /// Nodes holding a reserved slot that the wave has not reached yet.
    pub queued: HashSet<String>,
    pub positioned: Vec<PositionedNode>,
    pub deferred: Vec<DeferredEntry>,
    open_count: usize,
    /// Node id -> index into `positioned`.
    slot_of: HashMap<String, usize>,
}

impl PlacementState {
    pub fn new(point_count: usize) -> Self {
        Self {
            occupied: vec![false; point_count],
            placed: HashSet::new(),
            queued: HashSet::new(),
            positioned: Vec::new(),
            deferred: Vec::new(),
            open_count: point_count,
            slot_of: HashMap::new(),
        }
    }

    pub fn is_open(&self, idx: usize) -> bool {
        !self.occupied[idx]
    }

    pub fn open_count(&self) -> usize {
        self.open_count
    }

    /// Mark a grid point occupied. Returns false if it already was.
    pub fn reserve(&mut self, idx: usize) -> bool {
        if self.occupied[idx] {
            return false;
        }
        self.occupied[idx] = true;
        self.open_count -= 1;
        true
    }

    pub fn is_placed(&self, id: &str) -> bool {
        self.placed.contains(id)
    }

    /// Placed or holding a reserved slot.
    pub fn is_claimed(&self, id: &str) -> bool {
        self.placed.contains(id) || self.queued.contains(id)
    }

    /// Record a finished placement.
    pub fn record(&mut self, node: PositionedNode) {
        self.queued.remove(&node.node_id);
        self.placed.insert(node.node_id.clone());
        self.slot_of.insert(node.node_id.clone(), self.positioned.len());
        self.positioned.push(node);
    }

    pub fn position_of(&self, id: &str) -> Option<&PositionedNode> {
        self.slot_of.get(id).map(|&i| &self.positioned[i])
    }

    /// Claim `id` without ever placing it.
    pub fn exclude(&mut self, id: &str) {
        self.queued.insert(id.to_string());
    }

    pub fn defer(&mut self, entry: DeferredEntry) {
        if !self.deferred.iter().any(|d| d.node_id == entry.node_id) {
            self.deferred.push(entry);
        }
    }
}
