// Tier ordering and tier-zone math.
//
// A tier zone is a band of radial percentages. Percentages are measured
// against the growth a school can achieve: from its innermost anchor out to
// the smaller of its grid extent and what the deepest tree can reach.

use std::cmp::Ordering;

use super::PointF;
use crate::settings::TierZone;

/// A point within this many percentage points of its band is not penalized.
pub const ZONE_EDGE_TOLERANCE: f64 = 5.0;
/// Wave slots for zoned nodes must lie within the band widened by this much.
pub const ZONE_SLOT_TOLERANCE: f64 = 10.0;
/// Seeding tolerance; also the falloff width of reattachment proximity.
pub const ZONE_SEED_TOLERANCE: f64 = 15.0;

/// Slot-score bonus at the middle of the band.
const ZONE_INSIDE_BONUS: f64 = 1.0;
/// Slot-score penalty per percentage point outside the band.
const ZONE_OUTSIDE_PENALTY: f64 = 0.05;

const NAMED_TIERS: [&str; 5] = ["novice", "apprentice", "adept", "expert", "master"];

/// Rank of a tier label. Numeric labels are 1-based tiers.
pub fn tier_rank(label: &str) -> u32 {
    let trimmed = label.trim();
    if let Ok(n) = trimmed.parse::<u32>() {
        return n.saturating_sub(1);
    }
    NAMED_TIERS
        .iter()
        .position(|t| t.eq_ignore_ascii_case(trimmed))
        .map(|p| p as u32)
        .unwrap_or(u32::MAX)
}

/// Tier-ascending comparison: rank, then label.
pub fn compare_tiers(a: &str, b: &str) -> Ordering {
    tier_rank(a).cmp(&tier_rank(b)).then_with(|| a.cmp(b))
}

/// Radial reference for one school.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RadialFrame {
    pub inner_radius: f64,
    pub growth_range: f64,
}

impl RadialFrame {
    /// `depth` is the deepest tree level across all schools.
    pub fn new(inner_radius: f64, max_grid_radius: f64, depth: usize, spacing: f64) -> Self {
        let reachable = (depth + 1) as f64 * spacing;
        let growth_range = (max_grid_radius - inner_radius).min(reachable).max(spacing);
        Self { inner_radius, growth_range }
    }

    /// Radial percentage of `p`, clamped to [0, 100].
    pub fn pct(&self, p: PointF) -> f64 {
        ((p.len() - self.inner_radius) / self.growth_range * 100.0).clamp(0.0, 100.0)
    }
}

/// Whether `pct` lies within `zone` widened by `tolerance` on both sides.
pub fn within(pct: f64, zone: TierZone, tolerance: f64) -> bool {
    zone.distance_outside(pct) <= tolerance
}

/// Slot-score term: a bonus toward the band middle, a penalty outside it.
pub fn zone_term(pct: f64, zone: TierZone) -> f64 {
    let outside = zone.distance_outside(pct);
    if outside == 0.0 {
        let half = zone.half_width();
        if half <= 0.0 {
            return ZONE_INSIDE_BONUS;
        }
        ZONE_INSIDE_BONUS * (1.0 - (pct - zone.mid()).abs() / half)
    } else if outside <= ZONE_EDGE_TOLERANCE {
        0.0
    } else {
        -ZONE_OUTSIDE_PENALTY * outside
    }
}

/// Closeness to the band in [0, 1] used when reattaching deferred nodes.
pub fn zone_proximity(pct: f64, zone: TierZone) -> f64 {
    let outside = zone.distance_outside(pct);
    if outside == 0.0 {
        let half = zone.half_width();
        if half <= 0.0 {
            return 1.0;
        }
        1.0 - 0.5 * (pct - zone.mid()).abs() / half
    } else {
        (0.5 * (1.0 - outside / ZONE_SEED_TOLERANCE)).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Novice", 0)]
    #[case("apprentice", 1)]
    #[case("MASTER", 4)]
    #[case("1", 0)]
    #[case("5", 4)]
    #[case("", u32::MAX)]
    #[case("Legendary", u32::MAX)]
    fn test_tier_rank(#[case] label: &str, #[case] rank: u32) {
        assert_eq!(tier_rank(label), rank);
    }

    #[test]
    fn test_tier_sort_is_stable_and_ascending() {
        let mut tiers = vec!["Master", "", "Novice", "Adept", "Novice"];
        tiers.sort_by(|a, b| compare_tiers(a, b));
        assert_eq!(tiers, vec!["Novice", "Novice", "Adept", "Master", ""]);
    }

    #[test]
    fn test_frame_uses_reachable_depth() {
        // Grid reaches 1000 units out but the tree is only 4 levels deep
        let frame = RadialFrame::new(100.0, 1100.0, 4, 40.0);
        assert_eq!(frame.growth_range, 200.0);
        assert_eq!(frame.pct(PointF::new(100.0, 0.0)), 0.0);
        assert_eq!(frame.pct(PointF::new(260.0, 0.0)), 80.0);
        assert_eq!(frame.pct(PointF::new(900.0, 0.0)), 100.0);
        assert_eq!(frame.pct(PointF::new(10.0, 0.0)), 0.0);
    }

    #[test]
    fn test_frame_never_collapses() {
        let frame = RadialFrame::new(100.0, 100.0, 3, 40.0);
        assert_eq!(frame.growth_range, 40.0);
    }

    #[test]
    fn test_zone_term_shape() {
        let zone = TierZone::new(80.0, 100.0);
        assert_eq!(zone_term(90.0, zone), 1.0);
        assert_eq!(zone_term(80.0, zone), 0.0);
        assert_eq!(zone_term(77.0, zone), 0.0);
        assert!((zone_term(60.0, zone) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zone_proximity_falls_off() {
        let zone = TierZone::new(0.0, 20.0);
        assert_eq!(zone_proximity(10.0, zone), 1.0);
        assert_eq!(zone_proximity(20.0, zone), 0.5);
        assert!(zone_proximity(27.5, zone) > 0.0);
        assert_eq!(zone_proximity(50.0, zone), 0.0);
        assert!(within(28.0, zone, ZONE_SLOT_TOLERANCE));
        assert!(!within(31.0, zone, ZONE_SLOT_TOLERANCE));
    }
}
