//! Threshold classification for the headline index and its themes.
//!
//! The headline value and each theme's z-score are compared, as absolute
//! values, against configurable cutoffs and mapped onto the same
//! `stable|watch|approaching|critical` scale the dashboard uses.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use wssi_types::{StressLevel, WssiIndex};

/// Subject id used for the headline index.
pub const WSSI_SUBJECT: &str = "wssi";

/// Cutoffs for breach classification.
///
/// Each set must be ordered `watch <= approaching <= critical`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub wssi_watch: f64,
    pub wssi_approaching: f64,
    pub wssi_critical: f64,
    pub theme_watch: f64,
    pub theme_approaching: f64,
    pub theme_critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            wssi_watch: 1.0,
            wssi_approaching: 1.5,
            wssi_critical: 2.0,
            theme_watch: 1.0,
            theme_approaching: 2.0,
            theme_critical: 3.0,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<()> {
        let sets = [
            ("wssi", self.wssi_watch, self.wssi_approaching, self.wssi_critical),
            ("theme", self.theme_watch, self.theme_approaching, self.theme_critical),
        ];
        for (name, watch, approaching, critical) in sets {
            if ![watch, approaching, critical].iter().all(|v| v.is_finite() && *v >= 0.0) {
                bail!("{} thresholds must be finite and non-negative", name);
            }
            if !(watch <= approaching && approaching <= critical) {
                bail!(
                    "{} thresholds must satisfy watch <= approaching <= critical (got {}, {}, {})",
                    name,
                    watch,
                    approaching,
                    critical
                );
            }
        }
        Ok(())
    }

    /// Level of the headline value.
    pub fn wssi_level(&self, value: f64) -> StressLevel {
        classify(value, self.wssi_watch, self.wssi_approaching, self.wssi_critical)
    }

    /// Level of a theme z-score.
    pub fn theme_level(&self, z: f64) -> StressLevel {
        classify(z, self.theme_watch, self.theme_approaching, self.theme_critical)
    }

    /// The cutoff that put a subject at `level`.
    pub fn cutoff(&self, subject: &str, level: StressLevel) -> Option<f64> {
        let (watch, approaching, critical) = if subject == WSSI_SUBJECT {
            (self.wssi_watch, self.wssi_approaching, self.wssi_critical)
        } else {
            (self.theme_watch, self.theme_approaching, self.theme_critical)
        };
        match level {
            StressLevel::Watch => Some(watch),
            StressLevel::Approaching => Some(approaching),
            StressLevel::Critical => Some(critical),
            StressLevel::Stable | StressLevel::Unknown => None,
        }
    }
}

fn classify(value: f64, watch: f64, approaching: f64, critical: f64) -> StressLevel {
    if !value.is_finite() {
        return StressLevel::Unknown;
    }
    let v = value.abs();
    if v >= critical {
        StressLevel::Critical
    } else if v >= approaching {
        StressLevel::Approaching
    } else if v >= watch {
        StressLevel::Watch
    } else {
        StressLevel::Stable
    }
}

/// One classified subject from an index snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    /// `wssi` for the headline, else the theme id.
    pub subject: String,
    pub label: String,
    pub value: f64,
    pub level: StressLevel,
}

impl Reading {
    pub fn is_breach(&self) -> bool {
        self.level.rank() >= StressLevel::Watch.rank()
    }
}

/// Classify the headline and every theme that carries a score.
///
/// Subjects without a numeric value are skipped rather than reported as
/// stable.
pub fn evaluate(index: &WssiIndex, thresholds: &Thresholds) -> Vec<Reading> {
    let mut readings = Vec::with_capacity(index.themes.len() + 1);

    if let Some(value) = index.wssi_value {
        readings.push(Reading {
            subject: WSSI_SUBJECT.to_string(),
            label: "WSSI".to_string(),
            value,
            level: thresholds.wssi_level(value),
        });
    }

    for theme in &index.themes {
        let Some(z) = theme.stress_score else {
            continue;
        };
        readings.push(Reading {
            subject: theme.theme_id.clone(),
            label: theme.theme_name.clone(),
            value: z,
            level: thresholds.theme_level(z),
        });
    }

    readings
}

/// Readings at watch or above, most severe first, then by label.
pub fn breaches(readings: &[Reading]) -> Vec<&Reading> {
    let mut result: Vec<&Reading> = readings.iter().filter(|r| r.is_breach()).collect();
    result.sort_by(|a, b| {
        b.level
            .rank()
            .cmp(&a.level.rank())
            .then_with(|| a.label.cmp(&b.label))
    });
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use wssi_types::ThemeSignal;

    fn theme(id: &str, name: &str, z: Option<f64>) -> ThemeSignal {
        ThemeSignal {
            theme_id: id.to_string(),
            theme_name: name.to_string(),
            stress_score: z,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_thresholds_validate() {
        assert!(Thresholds::default().validate().is_ok());
    }

    #[test]
    fn test_unordered_thresholds_rejected() {
        let t = Thresholds {
            wssi_watch: 2.5,
            ..Default::default()
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_wssi_levels_use_absolute_value() {
        let t = Thresholds::default();
        assert_eq!(t.wssi_level(0.4), StressLevel::Stable);
        assert_eq!(t.wssi_level(-1.2), StressLevel::Watch);
        assert_eq!(t.wssi_level(1.5), StressLevel::Approaching);
        assert_eq!(t.wssi_level(-2.0), StressLevel::Critical);
        assert_eq!(t.wssi_level(f64::NAN), StressLevel::Unknown);
    }

    #[test]
    fn test_evaluate_and_breaches() {
        let index = WssiIndex {
            wssi_value: Some(1.1),
            themes: vec![
                theme("food", "Food Security", Some(3.2)),
                theme("energy", "Energy Shock", Some(0.3)),
                theme("water", "Water Stress", None),
                theme("debt", "Sovereign Debt", Some(-2.1)),
            ],
            ..Default::default()
        };
        let readings = evaluate(&index, &Thresholds::default());
        assert_eq!(readings.len(), 4);

        let subjects: Vec<&str> = breaches(&readings).iter().map(|r| r.subject.as_str()).collect();
        assert_eq!(subjects, vec!["food", "debt", "wssi"]);
    }

    #[test]
    fn test_cutoff_lookup() {
        let t = Thresholds::default();
        assert_eq!(t.cutoff(WSSI_SUBJECT, StressLevel::Critical), Some(2.0));
        assert_eq!(t.cutoff("food", StressLevel::Approaching), Some(2.0));
        assert_eq!(t.cutoff("food", StressLevel::Stable), None);
    }
}
