// Anchor groups.
//
// A school with one anchor grows its whole tree from it. With several anchors
// the root becomes virtual and its first-level subtrees are shared out so
// every anchor grows a similar amount of tree.

use std::collections::HashSet;

use super::tree::TreeIndex;
use crate::input::PhysicalAnchor;

#[derive(Debug, Clone, PartialEq)]
pub struct Group<'a> {
    pub anchor: &'a PhysicalAnchor,
    /// The first seed is pinned to the anchor itself.
    pub seed_node_ids: Vec<String>,
    /// Total subtree size of all seeds.
    pub weight: usize,
}

/// Whether the root is left unplaced for this many anchors.
pub fn root_is_virtual(anchor_count: usize) -> bool {
    anchor_count > 1
}

/// Split the tree's first level across `anchors`.
///
/// Children go largest subtree first to whichever group has the smallest
/// running total (ties to the lower group index).
pub fn build_groups<'a>(index: &TreeIndex, anchors: &'a [PhysicalAnchor]) -> Vec<Group<'a>> {
    if anchors.is_empty() {
        return Vec::new();
    }
    if !root_is_virtual(anchors.len()) {
        return vec![Group {
            anchor: &anchors[0],
            seed_node_ids: vec![index.root.clone()],
            weight: index.subtree_size(&index.root),
        }];
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut weighted: Vec<(&str, usize)> = index
        .children(&index.root)
        .iter()
        .filter(|c| **c != index.root && seen.insert(c.as_str()))
        .map(|c| (c.as_str(), index.subtree_size(c)))
        .collect();
    // Stable: equal sizes keep child order
    weighted.sort_by(|a, b| b.1.cmp(&a.1));

    let mut groups: Vec<Group<'a>> = anchors
        .iter()
        .map(|anchor| Group { anchor, seed_node_ids: Vec::new(), weight: 0 })
        .collect();

    for (id, size) in weighted {
        let lightest = groups
            .iter()
            .enumerate()
            .min_by_key(|(i, g)| (g.weight, *i))
            .map(|(i, _)| i)
            .unwrap_or(0);
        groups[lightest].seed_node_ids.push(id.to_string());
        groups[lightest].weight += size;
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tree::tests::school;

    fn anchors(n: usize) -> Vec<PhysicalAnchor> {
        (0..n)
            .map(|i| PhysicalAnchor {
                x: 100.0 * i as f64,
                y: 0.0,
                category: "Restoration".to_string(),
                growth_direction_angle: 0.0,
            })
            .collect()
    }

    #[test]
    fn test_single_anchor_seeds_root() {
        let index = TreeIndex::build(&school("r", &[("r", "", &["a"]), ("a", "", &[])]), None);
        let anchors = anchors(1);
        let groups = build_groups(&index, &anchors);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].seed_node_ids, vec!["r"]);
        assert_eq!(groups[0].weight, 2);
    }

    #[test]
    fn test_equal_children_split_evenly() {
        let kids = ["c0", "c1", "c2", "c3", "c4", "c5", "c6", "c7", "c8"];
        let leaf: &[&str] = &[];
        let mut nodes: Vec<(&str, &str, &[&str])> = vec![("r", "", &kids[..])];
        for k in kids {
            nodes.push((k, "", leaf));
        }
        let index = TreeIndex::build(&school("r", &nodes), None);
        let anchors = anchors(3);
        let groups = build_groups(&index, &anchors);

        let sizes: Vec<usize> = groups.iter().map(|g| g.seed_node_ids.len()).collect();
        assert_eq!(sizes, vec![3, 3, 3]);
        // Round-robin when everything ties
        assert_eq!(groups[0].seed_node_ids, vec!["c0", "c3", "c6"]);
    }

    #[test]
    fn test_large_subtree_balanced_against_small_ones() {
        let index = TreeIndex::build(
            &school("r", &[
                ("r", "", &["small1", "big", "small2", "small3"]),
                ("big", "", &["b1", "b2"]),
                ("b1", "", &[]),
                ("b2", "", &[]),
                ("small1", "", &[]),
                ("small2", "", &[]),
                ("small3", "", &[]),
            ]),
            None,
        );
        let anchors = anchors(2);
        let groups = build_groups(&index, &anchors);

        assert_eq!(groups[0].seed_node_ids, vec!["big"]);
        assert_eq!(groups[1].seed_node_ids, vec!["small1", "small2", "small3"]);
        assert_eq!(groups[0].weight, 3);
        assert_eq!(groups[1].weight, 3);
    }

    #[test]
    fn test_more_anchors_than_children() {
        let index = TreeIndex::build(&school("r", &[("r", "", &["a"]), ("a", "", &[])]), None);
        let anchors = anchors(3);
        let groups = build_groups(&index, &anchors);
        assert_eq!(groups[0].seed_node_ids, vec!["a"]);
        assert!(groups[1].seed_node_ids.is_empty());
        assert!(groups[2].seed_node_ids.is_empty());
    }
}
