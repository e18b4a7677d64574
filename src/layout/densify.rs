// Grid densification.
//
// When a school has more tree nodes than grid points, synthesize extra
// candidates: first midpoints between nearby points (outer pairs first, where
// the pool is sparsest), then one-spacing radial extensions beyond the
// outermost points.

use std::collections::HashSet;
use tracing::debug;

use super::PointF;
use super::grid_graph::NEIGHBOR_SPACING_FACTOR;
use super::spatial_grid::SpatialGrid;

/// Upper bound on radial extension rounds.
const MAX_EXTENSION_ROUNDS: usize = 256;

/// Coordinates are deduplicated at 0.1 unit resolution.
fn point_key(p: PointF) -> (i64, i64) {
    ((p.x * 10.0).round() as i64, (p.y * 10.0).round() as i64)
}

/// Return `points` extended until it holds at least `required` entries.
///
/// Existing points keep their indices. Fewer than `required` points come back
/// only when no further distinct insertion point exists.
pub fn densify(points: &[PointF], required: usize, spacing: f64) -> Vec<PointF> {
    let mut pool: Vec<PointF> = points.to_vec();
    if pool.len() >= required || pool.is_empty() {
        return pool;
    }
    let mut keys: HashSet<(i64, i64)> = pool.iter().map(|&p| point_key(p)).collect();

    let inserted_mid = insert_midpoints(&mut pool, &mut keys, required, spacing);
    let inserted_ext = if pool.len() < required {
        extend_outward(&mut pool, &mut keys, required, spacing)
    } else {
        0
    };

    debug!(
        original = points.len(),
        required,
        midpoints = inserted_mid,
        extensions = inserted_ext,
        "densified grid"
    );
    pool
}

fn insert_midpoints(
    pool: &mut Vec<PointF>,
    keys: &mut HashSet<(i64, i64)>,
    required: usize,
    spacing: f64,
) -> usize {
    let threshold = NEIGHBOR_SPACING_FACTOR * spacing;
    let threshold_sq = threshold * threshold;
    let base: Vec<PointF> = pool.clone();
    let spatial = SpatialGrid::from_points(&base, threshold);

    // (average radius, i, j) for every close pair
    let mut pairs: Vec<(f64, usize, usize)> = Vec::new();
    for (i, &p) in base.iter().enumerate() {
        for j in spatial.query(p) {
            if j <= i || p.dist_sq(base[j]) > threshold_sq {
                continue;
            }
            pairs.push(((p.len() + base[j].len()) / 2.0, i, j));
        }
    }
    pairs.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    let mut inserted = 0;
    for (_, i, j) in pairs {
        if pool.len() >= required {
            break;
        }
        let mid = base[i].midpoint(base[j]);
        if keys.insert(point_key(mid)) {
            pool.push(mid);
            inserted += 1;
        }
    }
    inserted
}

fn extend_outward(
    pool: &mut Vec<PointF>,
    keys: &mut HashSet<(i64, i64)>,
    required: usize,
    spacing: f64,
) -> usize {
    let mut inserted = 0;
    for _round in 0..MAX_EXTENSION_ROUNDS {
        let mut order: Vec<usize> = (0..pool.len()).collect();
        order.sort_by(|&a, &b| pool[b].len().total_cmp(&pool[a].len()).then(a.cmp(&b)));

        let mut inserted_this_round = 0;
        for idx in order {
            if pool.len() >= required {
                return inserted;
            }
            let p = pool[idx];
            // The center has no outward direction
            let Some(dir) = p.normalized() else { continue };
            let q = p.add(dir.scale(spacing));
            if keys.insert(point_key(q)) {
                pool.push(q);
                inserted += 1;
                inserted_this_round += 1;
            }
        }
        if inserted_this_round == 0 {
            break;
        }
    }
    inserted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(count: usize, spacing: f64) -> Vec<PointF> {
        (0..count).map(|k| PointF::new(100.0 + spacing * k as f64, 0.0)).collect()
    }

    #[test]
    fn test_no_op_when_pool_is_large_enough() {
        let points = line(10, 40.0);
        assert_eq!(densify(&points, 10, 40.0), points);
    }

    #[test]
    fn test_midpoints_fill_outer_pairs_first() {
        let points = line(10, 40.0);
        let dense = densify(&points, 12, 40.0);

        assert_eq!(dense.len(), 12);
        assert_eq!(&dense[..10], points.as_slice());
        // Outermost pair (8, 9) averages the largest radius
        assert_eq!(dense[10], PointF::new(440.0, 0.0));
        // (7, 9) would land on point 8, so (7, 8) is next
        assert_eq!(dense[11], PointF::new(400.0, 0.0));
    }

    #[test]
    fn test_midpoints_skip_existing_points() {
        // Midpoint of (0, 2) is point 1 itself, so only the two gaps get filled
        let points = line(3, 40.0);
        let dense = densify(&points, 5, 40.0);
        assert_eq!(dense.len(), 5);
        let keys: HashSet<_> = dense.iter().map(|&p| point_key(p)).collect();
        assert_eq!(keys.len(), 5);
        assert!(dense.contains(&PointF::new(120.0, 0.0)));
        assert!(dense.contains(&PointF::new(160.0, 0.0)));
    }

    #[test]
    fn test_radial_extension_covers_large_deficit() {
        let points = vec![PointF::new(100.0, 0.0)];
        let dense = densify(&points, 4, 40.0);
        assert_eq!(
            dense,
            vec![
                PointF::new(100.0, 0.0),
                PointF::new(140.0, 0.0),
                PointF::new(180.0, 0.0),
                PointF::new(220.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_point_at_center_cannot_grow() {
        let points = vec![PointF::new(0.0, 0.0)];
        assert_eq!(densify(&points, 3, 40.0).len(), 1);
    }
}
