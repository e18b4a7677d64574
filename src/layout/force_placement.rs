// Force placement.
//
// Last resort after reattachment: every node still unplaced goes onto the
// open point closest to the structure that already exists:
// - next to its logical parent, if that parent is placed
// - else next to any placed node, nearest the school's first anchor
// - else the open point nearest the first anchor
//
// Density and tier zones are ignored here. When the grid runs out the rest of
// the nodes are dropped and the count is logged.

use tracing::{debug, warn};

use super::state::PlacementState;
use super::tree::TreeIndex;
use super::{LayoutContext, PointF};
use crate::output::{PlacementPhase, PositionedNode};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ForceReport {
    pub forced: usize,
    pub dropped: usize,
}

/// Place every node of `expected` that is still unclaimed.
pub fn force_fill(
    ctx: &LayoutContext<'_>,
    index: &TreeIndex,
    state: &mut PlacementState,
    expected: &[String],
    reference: PointF,
) -> ForceReport {
    let parents = index.parent_map();
    let mut report = ForceReport::default();

    for (pos, id) in expected.iter().enumerate() {
        if state.is_claimed(id) {
            continue;
        }
        if state.open_count() == 0 {
            report.dropped = expected[pos..].iter().filter(|id| !state.is_claimed(id)).count();
            warn!(dropped = report.dropped, "grid exhausted, dropping unplaced nodes");
            break;
        }

        let parent = parents.get(id).filter(|p| state.is_placed(p));
        let anchor_idx = parent.and_then(|p| state.position_of(p)).map(|n| n.grid_index);
        let Some(idx) = pick_point(ctx, state, anchor_idx, reference) else {
            break;
        };

        state.reserve(idx);
        let p = ctx.graph.point(idx);
        state.record(PositionedNode {
            node_id: id.clone(),
            x: p.x,
            y: p.y,
            parent_id: parent.cloned(),
            grid_index: idx,
            tier: index.tier(id).to_string(),
            phase: PlacementPhase::Forced,
            crowding: ctx.graph.occupied_neighbors(idx, &state.occupied),
        });
        report.forced += 1;
    }

    if report.forced > 0 {
        debug!(forced = report.forced, "force placed remaining nodes");
    }
    report
}

fn pick_point(
    ctx: &LayoutContext<'_>,
    state: &PlacementState,
    parent_idx: Option<usize>,
    reference: PointF,
) -> Option<usize> {
    let graph = ctx.graph;

    // Neighbor lists are nearest first
    if let Some(pi) = parent_idx
        && let Some(&n) = graph.neighbors(pi).iter().find(|&&n| state.is_open(n))
    {
        return Some(n);
    }

    let mut best: Option<(f64, usize)> = None;
    for node in &state.positioned {
        for &n in graph.neighbors(node.grid_index) {
            if !state.is_open(n) {
                continue;
            }
            let d = graph.point(n).dist_sq(reference);
            if best.is_none_or(|(bd, bi)| d < bd || (d == bd && n < bi)) {
                best = Some((d, n));
            }
        }
    }
    if let Some((_, n)) = best {
        return Some(n);
    }

    graph.nearest(reference, |i| state.is_open(i))
}
