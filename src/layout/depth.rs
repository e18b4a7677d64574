// Depth pre-pass.
//
// Measures how deep the trees branch so tier-zone percentages can be scaled
// to the growth a tree can actually reach. Never touches grid points.

use std::collections::{HashSet, VecDeque};

use super::tree::TreeIndex;

/// Maximum breadth-first depth below the root (root = 0).
pub fn tree_depth(index: &TreeIndex) -> usize {
    if !index.contains(&index.root) {
        return 0;
    }
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
    let mut max_depth = 0;

    visited.insert(index.root.as_str());
    queue.push_back((index.root.as_str(), 0));
    while let Some((id, depth)) = queue.pop_front() {
        max_depth = max_depth.max(depth);
        for child in index.children(id) {
            if visited.insert(child) {
                queue.push_back((child.as_str(), depth + 1));
            }
        }
    }
    max_depth
}

/// Deepest tree across all schools.
pub fn estimate_depth<'a>(indices: impl IntoIterator<Item = &'a TreeIndex>) -> usize {
    indices.into_iter().map(tree_depth).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tree::tests::school;

    #[test]
    fn test_chain_depth() {
        let tree = school("a", &[
            ("a", "", &["b"]),
            ("b", "", &["c"]),
            ("c", "", &["d"]),
            ("d", "", &[]),
        ]);
        assert_eq!(tree_depth(&TreeIndex::build(&tree, None)), 3);
    }

    #[test]
    fn test_cyclic_tree_terminates() {
        let tree = school("a", &[("a", "", &["b"]), ("b", "", &["c"]), ("c", "", &["a"])]);
        assert_eq!(tree_depth(&TreeIndex::build(&tree, None)), 2);
    }

    #[test]
    fn test_global_depth_takes_deepest_school() {
        let shallow = TreeIndex::build(&school("r", &[("r", "", &["x"]), ("x", "", &[])]), None);
        let flat = TreeIndex::build(&school("r", &[("r", "", &[])]), None);
        let missing_root = TreeIndex::build(&school("nope", &[("r", "", &[])]), None);

        assert_eq!(estimate_depth([&shallow, &flat, &missing_root]), 1);
        assert_eq!(estimate_depth(std::iter::empty()), 0);
    }
}
