// Scored slot search.
//
// Breadth-first walk over the grid graph from a start point, scoring every
// reachable open point:
//
//   score = alignment + radial_bonus * sign(Δradius) - 0.3 * hops + zone_term
//
// Points under the radius floor, already occupied, or more crowded than the
// density cap are never offered but are still walked through, so a crowded
// ring does not cut off the open space behind it. The search has no side
// effects; callers reserve whatever they take.

use std::collections::VecDeque;

use super::zones::{within, zone_term};
use super::{LayoutContext, PointF};

/// Hop limit without tier zones.
pub const SEARCH_DEPTH: usize = 8;
/// Hop limit when tier zones are active.
pub const ZONED_SEARCH_DEPTH: usize = 12;

const HOP_PENALTY: f64 = 0.3;

#[derive(Debug, Clone)]
pub struct SlotQuery<'q> {
    pub start: usize,
    pub count: usize,
    /// Unit growth vector.
    pub direction: PointF,
    pub tier: Option<&'q str>,
    /// When set, zoned nodes only accept points within their band widened by this much.
    pub zone_tolerance: Option<f64>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Slot {
    pub index: usize,
    pub score: f64,
    pub hops: usize,
    /// Occupied neighbors at search time.
    pub crowding: usize,
}

/// Up to `query.count` best open points reachable from `query.start`, best first.
pub fn find_slots(ctx: &LayoutContext<'_>, occupied: &[bool], query: &SlotQuery<'_>) -> Vec<Slot> {
    let graph = ctx.graph;
    if query.count == 0 || query.start >= graph.len() {
        return Vec::new();
    }

    let origin = graph.point(query.start);
    let origin_radius = origin.len();
    let zone = query.tier.and_then(|t| ctx.zone_for(t));

    let mut visited = vec![false; graph.len()];
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
    let mut found: Vec<(Slot, f64)> = Vec::new();

    visited[query.start] = true;
    queue.push_back((query.start, 0));

    while let Some((idx, hops)) = queue.pop_front() {
        if hops > 0 {
            if let Some(crowding) = ctx.open_slot(idx, occupied) {
                let p = graph.point(idx);
                let pct = ctx.frame.pct(p);
                let zone_ok = match (zone, query.zone_tolerance) {
                    (Some(z), Some(tol)) => within(pct, z, tol),
                    _ => true,
                };
                if zone_ok {
                    let mut score = p
                        .sub(origin)
                        .normalized()
                        .map(|d| d.dot(query.direction))
                        .unwrap_or(0.0);
                    score += ctx.radial_bonus * sign(p.len() - origin_radius);
                    score -= HOP_PENALTY * hops as f64;
                    if let Some(z) = zone {
                        score += zone_term(pct, z);
                    }
                    found.push((Slot { index: idx, score, hops, crowding }, p.dist_sq(origin)));
                }
            }
        }

        if hops < ctx.search_depth {
            for &n in graph.neighbors(idx) {
                if !visited[n] {
                    visited[n] = true;
                    queue.push_back((n, hops + 1));
                }
            }
        }
    }

    found.sort_by(|(a, da), (b, db)| {
        b.score
            .total_cmp(&a.score)
            .then(da.total_cmp(db))
            .then(a.index.cmp(&b.index))
    });
    found.truncate(query.count);
    found.into_iter().map(|(slot, _)| slot).collect()
}

fn sign(v: f64) -> f64 {
    if v > f64::EPSILON {
        1.0
    } else if v < -f64::EPSILON {
        -1.0
    } else {
        0.0
    }
}

/// Best single slot, if any.
pub fn best_slot(ctx: &LayoutContext<'_>, occupied: &[bool], query: &SlotQuery<'_>) -> Option<Slot> {
    let mut q = query.clone();
    q.count = 1;
    find_slots(ctx, occupied, &q).into_iter().next()
}
