// Seeding and wave growth.
//
// Every group first pins its lead seed to the anchor and reserves slots for
// the remaining seeds. The tree then grows breadth-first in synchronized
// waves across all groups: each wave places every reserved frontier node and
// reserves slots for their children, which form the next wave. Wave order is
// shuffled with the school's seeded generator so no group always goes first.

use tracing::{debug, warn};

use super::groups::Group;
use super::rng::Lcg;
use super::slot_search::{SlotQuery, best_slot};
use super::state::{DeferredEntry, PlacementState};
use super::tree::TreeIndex;
use super::zones::{ZONE_SEED_TOLERANCE, ZONE_SLOT_TOLERANCE, compare_tiers, within};
use super::{LayoutContext, PointF, growth_direction};
use crate::output::{PlacementPhase, PositionedNode};

/// A node holding a reserved slot, waiting for its wave.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontierEntry {
    pub node_id: String,
    pub grid_index: usize,
    pub parent_id: Option<String>,
    pub group: usize,
    /// Output position; equals the grid point except for anchored seeds.
    pub position: PointF,
    pub crowding: usize,
}

/// Reserve seed slots for every group and return the first wave.
pub fn seed_groups(
    ctx: &LayoutContext<'_>,
    index: &TreeIndex,
    groups: &[Group<'_>],
    virtual_root: bool,
    state: &mut PlacementState,
) -> Vec<FrontierEntry> {
    let mut wave: Vec<FrontierEntry> = Vec::new();
    let parent = virtual_root.then(|| index.root.clone());

    // Pin every lead first so no seed slot can take a later anchor's point
    let mut anchor_slots: Vec<Option<usize>> = Vec::with_capacity(groups.len());
    for (g, group) in groups.iter().enumerate() {
        let Some(lead) = group.seed_node_ids.first() else {
            anchor_slots.push(None);
            continue;
        };
        let anchor_pos = PointF::new(group.anchor.x, group.anchor.y);

        let Some(anchor_idx) = ctx.graph.nearest(anchor_pos, |i| state.is_open(i)) else {
            warn!(group = g, "no open grid point left for anchor");
            for id in &group.seed_node_ids {
                state.defer(DeferredEntry { node_id: id.clone(), intended_parent: None, group: g });
            }
            anchor_slots.push(None);
            continue;
        };
        state.reserve(anchor_idx);
        state.queued.insert(lead.clone());
        wave.push(FrontierEntry {
            node_id: lead.clone(),
            grid_index: anchor_idx,
            parent_id: parent.clone(),
            group: g,
            position: anchor_pos,
            crowding: ctx.graph.occupied_neighbors(anchor_idx, &state.occupied),
        });
        anchor_slots.push(Some(anchor_idx));
    }

    for (g, (group, anchor_idx)) in groups.iter().zip(anchor_slots).enumerate() {
        let (Some(anchor_idx), Some((lead, rest))) = (anchor_idx, group.seed_node_ids.split_first()) else {
            continue;
        };
        let direction = growth_direction(group.anchor);
        let anchor_pct = ctx.frame.pct(PointF::new(group.anchor.x, group.anchor.y));
        for id in rest {
            if state.is_claimed(id) {
                continue;
            }
            let tier = index.tier(id);
            // Seeds sit next to the anchor, so the anchor's band stands in for theirs
            let fits = ctx
                .zone_for(tier)
                .is_none_or(|z| within(anchor_pct, z, ZONE_SEED_TOLERANCE));
            let slot = if fits {
                let query = SlotQuery {
                    start: anchor_idx,
                    count: 1,
                    direction,
                    tier: Some(tier),
                    zone_tolerance: None,
                };
                best_slot(ctx, &state.occupied, &query)
            } else {
                None
            };

            match slot {
                Some(slot) => {
                    state.reserve(slot.index);
                    state.queued.insert(id.clone());
                    wave.push(FrontierEntry {
                        node_id: id.clone(),
                        grid_index: slot.index,
                        parent_id: parent.clone(),
                        group: g,
                        position: ctx.graph.point(slot.index),
                        crowding: slot.crowding,
                    });
                }
                None => state.defer(DeferredEntry {
                    node_id: id.clone(),
                    intended_parent: Some(lead.clone()),
                    group: g,
                }),
            }
        }
    }

    debug!(seeds = wave.len(), deferred = state.deferred.len(), "seeded groups");
    wave
}

/// Grow waves until one produces no successors. Returns the number of waves.
pub fn run_waves(
    ctx: &LayoutContext<'_>,
    index: &TreeIndex,
    directions: &[PointF],
    state: &mut PlacementState,
    rng: &mut Lcg,
    initial: Vec<FrontierEntry>,
) -> usize {
    let mut wave = initial;
    let mut waves = 0;

    while !wave.is_empty() {
        waves += 1;
        rng.shuffle(&mut wave);
        let mut next: Vec<FrontierEntry> = Vec::new();

        for entry in wave {
            if state.is_placed(&entry.node_id) {
                continue;
            }
            state.record(PositionedNode {
                node_id: entry.node_id.clone(),
                x: entry.position.x,
                y: entry.position.y,
                parent_id: entry.parent_id.clone(),
                grid_index: entry.grid_index,
                tier: index.tier(&entry.node_id).to_string(),
                phase: PlacementPhase::Wave,
                crowding: entry.crowding,
            });

            let mut children: Vec<&String> = index.children(&entry.node_id).iter().collect();
            children.sort_by(|a, b| compare_tiers(index.tier(a), index.tier(b)));

            for child in children {
                if state.is_claimed(child) {
                    continue;
                }
                let query = SlotQuery {
                    start: entry.grid_index,
                    count: 1,
                    direction: directions.get(entry.group).copied().unwrap_or(PointF::new(1.0, 0.0)),
                    tier: Some(index.tier(child)),
                    zone_tolerance: Some(ZONE_SLOT_TOLERANCE),
                };
                match best_slot(ctx, &state.occupied, &query) {
                    Some(slot) => {
                        state.reserve(slot.index);
                        state.queued.insert(child.clone());
                        next.push(FrontierEntry {
                            node_id: child.clone(),
                            grid_index: slot.index,
                            parent_id: Some(entry.node_id.clone()),
                            group: entry.group,
                            position: ctx.graph.point(slot.index),
                            crowding: slot.crowding,
                        });
                    }
                    None => state.defer(DeferredEntry {
                        node_id: child.clone(),
                        intended_parent: Some(entry.node_id.clone()),
                        group: entry.group,
                    }),
                }
            }
        }

        debug!(wave = waves, placed = state.placed.len(), next = next.len(), "wave done");
        wave = next;
    }
    waves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PhysicalAnchor;
    use crate::layout::grid_graph::GridGraph;
    use crate::layout::groups::build_groups;
    use crate::layout::tree::tests::school;
    use crate::layout::zones::RadialFrame;
    use crate::settings::{LayoutSettings, TierZone};
    use std::collections::BTreeMap;

    fn anchor(x: f64, y: f64, angle: f64) -> PhysicalAnchor {
        PhysicalAnchor { x, y, category: "Conjuration".to_string(), growth_direction_angle: angle }
    }

    fn line_graph(count: usize) -> GridGraph {
        GridGraph::build(
            (0..count).map(|k| PointF::new(100.0 + 40.0 * k as f64, 0.0)).collect(),
            40.0,
        )
    }

    #[test]
    fn test_chain_grows_outward_one_step_per_wave() {
        let graph = line_graph(10);
        let settings = LayoutSettings::default();
        let ctx = LayoutContext::new(&graph, &settings, RadialFrame::new(100.0, 460.0, 3, 40.0), 0.0);
        let index = TreeIndex::build(
            &school("a", &[("a", "", &["b"]), ("b", "", &["c"]), ("c", "", &["d"]), ("d", "", &[])]),
            None,
        );
        let anchors = vec![anchor(100.0, 0.0, 0.0)];
        let groups = build_groups(&index, &anchors);
        let mut state = PlacementState::new(graph.len());
        let mut rng = Lcg::for_school("Conjuration");

        let first = seed_groups(&ctx, &index, &groups, false, &mut state);
        assert_eq!(first.len(), 1);
        let waves = run_waves(&ctx, &index, &[PointF::new(1.0, 0.0)], &mut state, &mut rng, first);

        assert_eq!(waves, 4);
        let indices: Vec<usize> = state.positioned.iter().map(|n| n.grid_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(state.positioned[2].parent_id.as_deref(), Some("b"));
        assert!(state.deferred.is_empty());
        assert!(state.queued.is_empty());
    }

    #[test]
    fn test_anchor_position_is_kept_exactly() {
        let graph = line_graph(5);
        let settings = LayoutSettings::default();
        let ctx = LayoutContext::new(&graph, &settings, RadialFrame::new(100.0, 260.0, 1, 40.0), 0.0);
        let index = TreeIndex::build(&school("a", &[("a", "", &[])]), None);
        // Anchor sits slightly off the nearest grid point
        let anchors = vec![anchor(103.0, 2.0, 0.0)];
        let groups = build_groups(&index, &anchors);
        let mut state = PlacementState::new(graph.len());

        let first = seed_groups(&ctx, &index, &groups, false, &mut state);
        assert_eq!(first[0].grid_index, 0);
        assert_eq!(first[0].position, PointF::new(103.0, 2.0));
    }

    #[test]
    fn test_zoned_child_lands_in_band() {
        let graph = line_graph(10);
        let mut zones = BTreeMap::new();
        zones.insert("Master".to_string(), TierZone::new(80.0, 100.0));
        let settings = LayoutSettings { tier_zones: Some(zones), ..LayoutSettings::default() };
        // Growth range 400: pct = (x - 100) / 4
        let ctx = LayoutContext::new(&graph, &settings, RadialFrame::new(100.0, 460.0, 0, 400.0), 0.0);
        let index = TreeIndex::build(&school("a", &[("a", "Novice", &["m"]), ("m", "Master", &[])]), None);
        let anchors = vec![anchor(100.0, 0.0, 0.0)];
        let groups = build_groups(&index, &anchors);
        let mut state = PlacementState::new(graph.len());
        let mut rng = Lcg::for_school("Conjuration");

        let first = seed_groups(&ctx, &index, &groups, false, &mut state);
        run_waves(&ctx, &index, &[PointF::new(-1.0, 0.0)], &mut state, &mut rng, first);

        // Master lands in band: pct >= 70 of a 400 range means x >= 380
        let master = state.position_of("m").unwrap();
        assert!(master.x >= 380.0);
    }

    #[test]
    fn test_unreachable_zone_defers() {
        let graph = line_graph(3);
        let mut zones = BTreeMap::new();
        zones.insert("Master".to_string(), TierZone::new(80.0, 100.0));
        let settings = LayoutSettings { tier_zones: Some(zones), ..LayoutSettings::default() };
        // Growth range 400 but the grid ends at pct 20
        let ctx = LayoutContext::new(&graph, &settings, RadialFrame::new(100.0, 500.0, 9, 40.0), 0.0);
        let index = TreeIndex::build(&school("a", &[("a", "Novice", &["m"]), ("m", "Master", &[])]), None);
        let anchors = vec![anchor(100.0, 0.0, 0.0)];
        let groups = build_groups(&index, &anchors);
        let mut state = PlacementState::new(graph.len());
        let mut rng = Lcg::for_school("Conjuration");

        let first = seed_groups(&ctx, &index, &groups, false, &mut state);
        run_waves(&ctx, &index, &[PointF::new(1.0, 0.0)], &mut state, &mut rng, first);

        assert!(!state.is_placed("m"));
        assert_eq!(
            state.deferred,
            vec![DeferredEntry { node_id: "m".into(), intended_parent: Some("a".into()), group: 0 }]
        );
    }

    #[test]
    fn test_multi_anchor_seeds_record_virtual_root() {
        let graph = line_graph(10);
        let settings = LayoutSettings::default();
        let ctx = LayoutContext::new(&graph, &settings, RadialFrame::new(100.0, 460.0, 2, 40.0), 0.0);
        let index = TreeIndex::build(
            &school("r", &[("r", "", &["x", "y", "z"]), ("x", "", &[]), ("y", "", &[]), ("z", "", &[])]),
            None,
        );
        let anchors = vec![anchor(100.0, 0.0, 0.0), anchor(340.0, 0.0, 0.0)];
        let groups = build_groups(&index, &anchors);
        let mut state = PlacementState::new(graph.len());

        let first = seed_groups(&ctx, &index, &groups, true, &mut state);
        let ids: Vec<&str> = first.iter().map(|e| e.node_id.as_str()).collect();
        // Both leads come before any extra seed
        assert_eq!(ids, vec!["x", "y", "z"]);
        assert_eq!(first[0].grid_index, 0);
        assert_eq!(first[1].grid_index, 6);
        assert!(first.iter().all(|e| e.parent_id.as_deref() == Some("r")));
        assert!(!state.is_claimed("r"));
    }

    #[test]
    fn test_extra_seeds_leave_later_anchors_free() {
        let graph = line_graph(10);
        let settings = LayoutSettings::default();
        let ctx = LayoutContext::new(&graph, &settings, RadialFrame::new(100.0, 460.0, 2, 40.0), 0.0);
        let index = TreeIndex::build(
            &school("r", &[
                ("r", "", &["a", "b", "c", "d", "e"]),
                ("a", "", &[]),
                ("b", "", &[]),
                ("c", "", &[]),
                ("d", "", &[]),
                ("e", "", &[]),
            ]),
            None,
        );
        // The second anchor is within reach of the first group's seeds
        let anchors = vec![anchor(100.0, 0.0, 0.0), anchor(180.0, 0.0, 0.0)];
        let groups = build_groups(&index, &anchors);
        let mut state = PlacementState::new(graph.len());

        let first = seed_groups(&ctx, &index, &groups, true, &mut state);
        assert_eq!(first[1].node_id, "b");
        assert_eq!(first[1].grid_index, 2);
        assert_eq!(first[1].position, PointF::new(180.0, 0.0));

        let mut slots = std::collections::HashSet::new();
        let mut spots = std::collections::HashSet::new();
        for e in &first {
            assert!(slots.insert(e.grid_index), "{} shares slot {}", e.node_id, e.grid_index);
            assert!(spots.insert((e.position.x.to_bits(), e.position.y.to_bits())), "{} shares a position", e.node_id);
        }
    }

    #[test]
    fn test_out_of_band_seed_defers_to_lead() {
        let graph = line_graph(10);
        let mut zones = BTreeMap::new();
        zones.insert("Master".to_string(), TierZone::new(80.0, 100.0));
        let settings = LayoutSettings { tier_zones: Some(zones), ..LayoutSettings::default() };
        // Growth range 120: both anchors sit below pct 35
        let ctx = LayoutContext::new(&graph, &settings, RadialFrame::new(100.0, 460.0, 2, 40.0), 0.0);
        let index = TreeIndex::build(
            &school("r", &[
                ("r", "", &["a", "b", "m"]),
                ("a", "Novice", &[]),
                ("b", "Novice", &[]),
                ("m", "Master", &[]),
            ]),
            None,
        );
        let anchors = vec![anchor(100.0, 0.0, 0.0), anchor(140.0, 0.0, 0.0)];
        let groups = build_groups(&index, &anchors);
        assert_eq!(groups[0].seed_node_ids, vec!["a", "m"]);
        let mut state = PlacementState::new(graph.len());

        let first = seed_groups(&ctx, &index, &groups, true, &mut state);
        let ids: Vec<&str> = first.iter().map(|e| e.node_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(!state.is_claimed("m"));
        assert_eq!(
            state.deferred,
            vec![DeferredEntry { node_id: "m".into(), intended_parent: Some("a".into()), group: 0 }]
        );
    }

    #[test]
    fn test_lower_tier_child_takes_the_only_slot() {
        let graph = line_graph(2);
        let settings = LayoutSettings::default();
        let ctx = LayoutContext::new(&graph, &settings, RadialFrame::new(100.0, 140.0, 1, 40.0), 0.0);
        // Master is listed first but Novice ranks lower
        let index = TreeIndex::build(
            &school("a", &[("a", "", &["m", "n"]), ("m", "Master", &[]), ("n", "Novice", &[])]),
            None,
        );
        let anchors = vec![anchor(100.0, 0.0, 0.0)];
        let groups = build_groups(&index, &anchors);
        let mut state = PlacementState::new(graph.len());
        let mut rng = Lcg::for_school("Conjuration");

        let first = seed_groups(&ctx, &index, &groups, false, &mut state);
        run_waves(&ctx, &index, &[PointF::new(1.0, 0.0)], &mut state, &mut rng, first);

        assert_eq!(state.position_of("n").unwrap().grid_index, 1);
        assert_eq!(
            state.deferred,
            vec![DeferredEntry { node_id: "m".into(), intended_parent: Some("a".into()), group: 0 }]
        );
    }
}
