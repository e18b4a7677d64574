// Indexed view of one school's logical tree.
//
// The tree builder emits a flat node list; placement needs id lookups,
// resolved tiers and traversal orders. All traversals keep a visited set so a
// malformed (cyclic) tree cannot loop.

use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

use crate::input::{SchoolTree, SpellDataSource};

#[derive(Debug, Clone)]
struct IndexedNode {
    tier: String,
    children: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TreeIndex {
    pub root: String,
    nodes: HashMap<String, IndexedNode>,
    /// Node ids in their original list order.
    order: Vec<String>,
}

impl TreeIndex {
    /// Index a school tree, resolving empty tiers through `source`.
    pub fn build(tree: &SchoolTree, source: Option<&dyn SpellDataSource>) -> Self {
        let mut nodes: HashMap<String, IndexedNode> = HashMap::new();
        let mut order: Vec<String> = Vec::with_capacity(tree.nodes.len());

        for node in &tree.nodes {
            if nodes.contains_key(&node.id) {
                debug!(id = %node.id, "duplicate tree node ignored");
                continue;
            }
            let tier = if node.tier.is_empty() {
                source.and_then(|s| s.skill_level(&node.id)).unwrap_or_default()
            } else {
                node.tier.clone()
            };
            nodes.insert(node.id.clone(), IndexedNode { tier, children: node.child_ids.clone() });
            order.push(node.id.clone());
        }

        // Drop child references that point nowhere
        let known: HashSet<String> = order.iter().cloned().collect();
        for (id, node) in nodes.iter_mut() {
            let before = node.children.len();
            node.children.retain(|c| known.contains(c));
            if node.children.len() != before {
                debug!(%id, dropped = before - node.children.len(), "unknown child ids ignored");
            }
        }

        Self { root: tree.root.clone(), nodes, order }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn tier(&self, id: &str) -> &str {
        self.nodes.get(id).map(|n| n.tier.as_str()).unwrap_or("")
    }

    pub fn children(&self, id: &str) -> &[String] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Number of distinct nodes reachable from `id`, itself included.
    pub fn subtree_size(&self, id: &str) -> usize {
        if !self.contains(id) {
            return 0;
        }
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = vec![id];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            for child in self.children(current) {
                if !visited.contains(child.as_str()) {
                    stack.push(child);
                }
            }
        }
        visited.len()
    }

    /// Breadth-first order from the root, followed by unreachable nodes in list order.
    pub fn bfs_order(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.len());
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();

        if self.contains(&self.root) {
            visited.insert(&self.root);
            queue.push_back(&self.root);
        }
        while let Some(id) = queue.pop_front() {
            out.push(id.to_string());
            for child in self.children(id) {
                if visited.insert(child) {
                    queue.push_back(child);
                }
            }
        }
        for id in &self.order {
            if !visited.contains(id.as_str()) {
                out.push(id.clone());
            }
        }
        out
    }

    /// First parent of each node as met breadth-first from the root.
    /// Unreachable nodes fall back to any listed parent.
    pub fn parent_map(&self) -> HashMap<String, String> {
        let mut parents: HashMap<String, String> = HashMap::new();
        for id in self.bfs_order() {
            for child in self.children(&id) {
                if *child != self.root && !parents.contains_key(child) {
                    parents.insert(child.clone(), id.clone());
                }
            }
        }
        parents
    }
}
