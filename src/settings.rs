//! Layout settings supplied by the UI.

use std::collections::BTreeMap;
use serde::Deserialize;

/// Desired radial band for a tier, as percentages of the school's growth range.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
pub struct TierZone {
    pub min: f64,
    pub max: f64,
}

impl TierZone {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min: min.min(max), max: max.max(min) }
    }

    pub fn mid(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn half_width(&self) -> f64 {
        (self.max - self.min) / 2.0
    }

    /// Percentage points outside the band (0 when inside).
    pub fn distance_outside(&self, pct: f64) -> f64 {
        if pct < self.min {
            self.min - pct
        } else if pct > self.max {
            pct - self.max
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutSettings {
    /// 0-100. Higher values spread nodes apart by lowering the density cap.
    pub spread: f64,
    /// 0-100. Bonus for candidates that move away from the center.
    pub radial_bias: f64,
    pub tier_zones: Option<BTreeMap<String, TierZone>>,
    /// Minimum radius as a multiple of the ring radius.
    pub center_mask: Option<f64>,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            spread: 50.0,
            radial_bias: 50.0,
            tier_zones: None,
            center_mask: None,
        }
    }
}

impl LayoutSettings {
    pub fn spread(&self) -> f64 {
        self.spread.clamp(0.0, 100.0)
    }

    pub fn radial_bias(&self) -> f64 {
        self.radial_bias.clamp(0.0, 100.0)
    }

    /// Maximum number of occupied neighbors a candidate may have.
    pub fn density_cap(&self) -> usize {
        let cap = (8.0 - self.spread() * 0.07).round();
        (cap as usize).max(1)
    }

    /// Weight applied to `sign(Δradius)` during slot scoring.
    pub fn radial_bonus(&self) -> f64 {
        self.radial_bias() / 100.0
    }

    pub fn has_tier_zones(&self) -> bool {
        self.tier_zones.as_ref().is_some_and(|z| !z.is_empty())
    }

    /// Zone for a tier label, matched case-insensitively.
    pub fn zone_for(&self, tier: &str) -> Option<TierZone> {
        let zones = self.tier_zones.as_ref()?;
        if let Some(z) = zones.get(tier) {
            return Some(TierZone::new(z.min, z.max));
        }
        zones
            .iter()
            .find(|(label, _)| label.eq_ignore_ascii_case(tier))
            .map(|(_, z)| TierZone::new(z.min, z.max))
    }

    /// Radius below which slots are never offered.
    pub fn min_radius(&self, ring_radius: Option<f64>, spacing: f64) -> f64 {
        match self.center_mask {
            Some(mask) if mask > 0.0 => mask * ring_radius.unwrap_or(spacing),
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 8)]
    #[case(50.0, 5)]
    #[case(100.0, 1)]
    #[case(250.0, 1)]
    #[case(-10.0, 8)]
    fn test_density_cap(#[case] spread: f64, #[case] expected: usize) {
        let settings = LayoutSettings { spread, ..LayoutSettings::default() };
        assert_eq!(settings.density_cap(), expected);
    }

    #[test]
    fn test_settings_from_partial_json() {
        let settings: LayoutSettings = serde_json::from_str(
            r#"{"spread": 20, "tierZones": {"Novice": {"min": 0, "max": 20}}}"#,
        )
        .unwrap();
        assert_eq!(settings.spread, 20.0);
        assert_eq!(settings.radial_bias, 50.0);
        assert!(settings.has_tier_zones());
        assert_eq!(settings.zone_for("novice"), Some(TierZone::new(0.0, 20.0)));
        assert_eq!(settings.zone_for("Master"), None);
    }

    #[test]
    fn test_min_radius() {
        let mut settings = LayoutSettings::default();
        assert_eq!(settings.min_radius(Some(100.0), 40.0), 0.0);
        settings.center_mask = Some(1.5);
        assert_eq!(settings.min_radius(Some(100.0), 40.0), 150.0);
        assert_eq!(settings.min_radius(None, 40.0), 60.0);
    }

    #[test]
    fn test_zone_distance() {
        let zone = TierZone::new(80.0, 100.0);
        assert_eq!(zone.distance_outside(90.0), 0.0);
        assert_eq!(zone.distance_outside(70.0), 10.0);
        assert_eq!(zone.mid(), 90.0);
        assert_eq!(zone.half_width(), 10.0);
    }
}
