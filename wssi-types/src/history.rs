//! Historical index series.

use chrono::{DateTime, Utc};

use crate::Usable;

/// Coarse band for a 0-100 index score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StressBand {
    #[default]
    Unknown,
    Stable,
    Elevated,
    High,
    Critical,
}

impl StressBand {
    /// Fixed cut-offs at 40, 60 and 75.
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            Some(s) if s.is_finite() => {
                if s < 40.0 {
                    StressBand::Stable
                } else if s < 60.0 {
                    StressBand::Elevated
                } else if s < 75.0 {
                    StressBand::High
                } else {
                    StressBand::Critical
                }
            }
            _ => StressBand::Unknown,
        }
    }
}

/// One day of the index series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub wssi_value: Option<f64>,
    pub wssi_score: Option<f64>,
    pub band: StressBand,
}

/// Points sorted ascending by timestamp.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct HistorySeries {
    pub points: Vec<HistoryPoint>,
    /// Window requested from the backend, in days.
    pub days: u32,
    /// Headline value reported alongside the series, if any.
    pub current: Option<f64>,
}

impl HistorySeries {
    pub fn latest(&self) -> Option<&HistoryPoint> {
        self.points.last()
    }

    /// Score change between the first and last point that both carry a score.
    pub fn score_change(&self) -> Option<f64> {
        let first = self.points.iter().find_map(|p| p.wssi_score)?;
        let last = self.points.iter().rev().find_map(|p| p.wssi_score)?;
        Some(last - first)
    }
}

impl Usable for HistorySeries {
    fn record_count(&self) -> usize {
        self.points.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_band_cutoffs() {
        assert_eq!(StressBand::from_score(Some(0.0)), StressBand::Stable);
        assert_eq!(StressBand::from_score(Some(39.99)), StressBand::Stable);
        assert_eq!(StressBand::from_score(Some(40.0)), StressBand::Elevated);
        assert_eq!(StressBand::from_score(Some(60.0)), StressBand::High);
        assert_eq!(StressBand::from_score(Some(74.9)), StressBand::High);
        assert_eq!(StressBand::from_score(Some(75.0)), StressBand::Critical);
        assert_eq!(StressBand::from_score(None), StressBand::Unknown);
    }

    #[test]
    fn test_score_change_skips_missing() {
        let point = |day: u32, score: Option<f64>| HistoryPoint {
            timestamp: Utc.with_ymd_and_hms(2026, 1, day, 0, 0, 0).unwrap(),
            wssi_value: None,
            wssi_score: score,
            band: StressBand::from_score(score),
        };
        let series = HistorySeries {
            points: vec![point(1, None), point(2, Some(50.0)), point(3, Some(62.5)), point(4, None)],
            days: 4,
            current: None,
        };
        assert_eq!(series.score_change(), Some(12.5));
        assert_eq!(series.latest().unwrap().wssi_score, None);
    }
}
