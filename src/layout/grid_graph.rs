// Adjacency over a school's grid points.
//
// Each point links to its closest (at most 8) neighbors within twice the
// spacing unit. The graph is built once per school per run and is read-only
// afterwards; slot search and every fallback phase walk it.

use super::PointF;
use super::spatial_grid::SpatialGrid;

/// Maximum neighbors kept per point.
pub const MAX_NEIGHBORS: usize = 8;

/// Neighbor threshold as a multiple of the spacing unit.
pub const NEIGHBOR_SPACING_FACTOR: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct GridGraph {
    pub points: Vec<PointF>,
    /// For each point, neighbor indices ordered nearest first.
    pub adjacency: Vec<Vec<usize>>,
}

impl GridGraph {
    /// Build the k-nearest-neighbor graph for `points`.
    pub fn build(points: Vec<PointF>, spacing: f64) -> Self {
        let threshold = NEIGHBOR_SPACING_FACTOR * spacing;
        let threshold_sq = threshold * threshold;
        let spatial = SpatialGrid::from_points(&points, threshold);

        let adjacency = points
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let mut near: Vec<(f64, usize)> = spatial
                    .query(p)
                    .into_iter()
                    .filter(|&j| j != i)
                    .map(|j| (p.dist_sq(points[j]), j))
                    .filter(|&(d, _)| d <= threshold_sq)
                    .collect();
                near.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                near.truncate(MAX_NEIGHBORS);
                near.into_iter().map(|(_, j)| j).collect()
            })
            .collect();

        Self { points, adjacency }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn neighbors(&self, idx: usize) -> &[usize] {
        self.adjacency.get(idx).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn point(&self, idx: usize) -> PointF {
        self.points[idx]
    }

    /// Number of occupied neighbors around `idx`.
    pub fn occupied_neighbors(&self, idx: usize, occupied: &[bool]) -> usize {
        self.neighbors(idx).iter().filter(|&&n| occupied[n]).count()
    }

    /// Nearest point to `target` accepted by `allow`, ties broken by index.
    pub fn nearest(&self, target: PointF, allow: impl Fn(usize) -> bool) -> Option<usize> {
        let mut best: Option<(f64, usize)> = None;
        for (idx, p) in self.points.iter().enumerate() {
            if !allow(idx) {
                continue;
            }
            let d = p.dist_sq(target);
            if best.is_none_or(|(bd, _)| d < bd) {
                best = Some((d, idx));
            }
        }
        best.map(|(_, idx)| idx)
    }

    /// Largest distance from the origin of any point.
    pub fn max_radius(&self) -> f64 {
        self.points.iter().map(|p| p.len()).fold(0.0, f64::max)
    }
}
