// Deferred reattachment.
//
// Nodes the waves could not place hang off whichever placed node scores best:
// the parent they were meant for earns a large bonus, and a slot near the
// node's tier band earns up to a smaller one. Attached nodes bring their own
// children into the same pass.

use std::collections::HashSet;

use tracing::debug;

use super::state::{DeferredEntry, PlacementState};
use super::tree::TreeIndex;
use super::zones::{compare_tiers, zone_proximity};
use super::{LayoutContext, PointF};
use crate::output::{PlacementPhase, PositionedNode};

pub const MAX_DEFERRED_PASSES: usize = 30;

const INTENDED_PARENT_BONUS: f64 = 200.0;
const ZONE_PROXIMITY_BONUS: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
struct Attachment {
    host: String,
    index: usize,
    crowding: usize,
    score: f64,
    /// Squared distance to the intended parent, zero when it is not placed.
    parent_dist: f64,
}

/// Best open neighbor of any placed node for a node of `tier`.
///
/// Equal scores go to the slot closest to the intended parent.
fn best_attachment(
    ctx: &LayoutContext<'_>,
    state: &PlacementState,
    tier: &str,
    intended_parent: Option<&str>,
) -> Option<Attachment> {
    let zone = ctx.zone_for(tier);
    let parent_pos = intended_parent
        .and_then(|p| state.position_of(p))
        .map(|n| PointF::new(n.x, n.y));
    let mut best: Option<Attachment> = None;

    for host in &state.positioned {
        let parent_bonus = if intended_parent == Some(host.node_id.as_str()) {
            INTENDED_PARENT_BONUS
        } else {
            0.0
        };
        for &n in ctx.graph.neighbors(host.grid_index) {
            let Some(crowding) = ctx.open_slot(n, &state.occupied) else {
                continue;
            };
            let mut score = parent_bonus;
            if let Some(z) = zone {
                score += ZONE_PROXIMITY_BONUS * zone_proximity(ctx.frame.pct(ctx.graph.point(n)), z);
            }
            let parent_dist = parent_pos.map_or(0.0, |pp| ctx.graph.point(n).dist_sq(pp));
            if best
                .as_ref()
                .is_none_or(|b| score > b.score || (score == b.score && parent_dist < b.parent_dist))
            {
                best = Some(Attachment { host: host.node_id.clone(), index: n, crowding, score, parent_dist });
            }
        }
    }
    best
}

/// Run reattachment passes until one attaches nothing. Returns the number attached.
pub fn reattach_deferred(ctx: &LayoutContext<'_>, index: &TreeIndex, state: &mut PlacementState) -> usize {
    let mut total = 0;

    for pass in 0..MAX_DEFERRED_PASSES {
        let mut pending: Vec<DeferredEntry> = std::mem::take(&mut state.deferred);
        pending.retain(|e| !state.is_claimed(&e.node_id));
        if pending.is_empty() {
            break;
        }
        pending.sort_by(|a, b| compare_tiers(index.tier(&a.node_id), index.tier(&b.node_id)));

        let mut pending_ids: HashSet<String> = pending.iter().map(|e| e.node_id.clone()).collect();
        let mut leftover: Vec<DeferredEntry> = Vec::new();
        let mut attached = 0;
        let mut i = 0;

        // `pending` grows while it is walked
        while i < pending.len() {
            let entry = pending[i].clone();
            i += 1;
            if state.is_claimed(&entry.node_id) {
                continue;
            }

            let tier = index.tier(&entry.node_id);
            let Some(att) = best_attachment(ctx, state, tier, entry.intended_parent.as_deref()) else {
                leftover.push(entry);
                continue;
            };

            state.reserve(att.index);
            let p = ctx.graph.point(att.index);
            state.record(PositionedNode {
                node_id: entry.node_id.clone(),
                x: p.x,
                y: p.y,
                parent_id: Some(att.host),
                grid_index: att.index,
                tier: tier.to_string(),
                phase: PlacementPhase::Deferred,
                crowding: att.crowding,
            });
            attached += 1;

            let mut children: Vec<&String> = index.children(&entry.node_id).iter().collect();
            children.sort_by(|a, b| compare_tiers(index.tier(a), index.tier(b)));
            for child in children {
                if !state.is_claimed(child) && pending_ids.insert(child.clone()) {
                    pending.push(DeferredEntry {
                        node_id: child.clone(),
                        intended_parent: Some(entry.node_id.clone()),
                        group: entry.group,
                    });
                }
            }
        }

        debug!(pass, attached, remaining = leftover.len(), "deferred pass");
        state.deferred = leftover;
        total += attached;
        if attached == 0 {
            break;
        }
    }
    total
}
