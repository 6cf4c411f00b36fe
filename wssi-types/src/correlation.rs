//! Pairwise theme correlations laid out as a square matrix.

use chrono::{DateTime, Utc};

use crate::Usable;

/// Threshold on `|r|` above which an off-diagonal pair counts as strong.
pub const DEFAULT_STRONG_THRESHOLD: f64 = 0.6;

/// Two-sided significance cut-off used when no explicit flag is supplied.
pub const SIGNIFICANCE_P_VALUE: f64 = 0.05;

/// One cell of the correlation matrix.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CorrelationCell {
    pub theme_a: String,
    pub theme_b: String,
    /// Pearson coefficient, `None` when no source had a value for the pair.
    pub pearson_r: Option<f64>,
    pub p_value: Option<f64>,
    pub sample_n: Option<u32>,
    pub is_self: bool,
    pub is_significant: bool,
    pub is_strong: bool,
    pub pattern_label: String,
}

impl CorrelationCell {
    /// Label shown on hover for a pair.
    pub fn label_for(pearson_r: Option<f64>, is_self: bool, is_strong: bool) -> &'static str {
        match (is_self, pearson_r) {
            (true, _) => "Self",
            (false, None) => "Insufficient Data",
            (false, Some(r)) if is_strong && r >= 0.0 => "Emerging Pattern",
            (false, Some(_)) if is_strong => "Inverse Pattern",
            (false, Some(_)) => "Weak Signal",
        }
    }
}

/// A theme on the matrix axes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MatrixTheme {
    pub theme_id: String,
    pub theme_name: String,
    pub category: String,
}

/// Complete square matrix over the theme universe, self-pairs included.
///
/// Cells are stored row-major: the cell for `(themes[i], themes[j])` lives at
/// `i * themes.len() + j`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CorrelationMatrix {
    /// Axis order, alphabetical by display name.
    pub themes: Vec<MatrixTheme>,
    pub cells: Vec<CorrelationCell>,
    pub strong_threshold: f64,
    pub generated_at: Option<DateTime<Utc>>,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.themes.len()
    }

    /// Cell at row `i`, column `j`.
    pub fn cell(&self, i: usize, j: usize) -> Option<&CorrelationCell> {
        let n = self.themes.len();
        if i >= n || j >= n {
            return None;
        }
        self.cells.get(i * n + j)
    }

    /// Cell for a pair of theme ids, in either order of lookup.
    pub fn pair(&self, a: &str, b: &str) -> Option<&CorrelationCell> {
        let i = self.themes.iter().position(|t| t.theme_id == a)?;
        let j = self.themes.iter().position(|t| t.theme_id == b)?;
        self.cell(i, j)
    }

    /// Off-diagonal strong pairs, each unordered pair counted once.
    pub fn strong_pairs(&self) -> Vec<&CorrelationCell> {
        let n = self.themes.len();
        let mut pairs = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                if let Some(cell) = self.cell(i, j) {
                    if cell.is_strong {
                        pairs.push(cell);
                    }
                }
            }
        }
        pairs
    }
}

impl Usable for CorrelationMatrix {
    fn record_count(&self) -> usize {
        self.themes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_labels() {
        assert_eq!(CorrelationCell::label_for(Some(1.0), true, false), "Self");
        assert_eq!(CorrelationCell::label_for(None, false, false), "Insufficient Data");
        assert_eq!(CorrelationCell::label_for(Some(0.7), false, true), "Emerging Pattern");
        assert_eq!(CorrelationCell::label_for(Some(-0.7), false, true), "Inverse Pattern");
        assert_eq!(CorrelationCell::label_for(Some(0.2), false, false), "Weak Signal");
    }

    #[test]
    fn test_cell_indexing() {
        let theme = |id: &str| MatrixTheme {
            theme_id: id.to_string(),
            theme_name: id.to_string(),
            category: String::new(),
        };
        let cell = |a: &str, b: &str, strong: bool| CorrelationCell {
            theme_a: a.to_string(),
            theme_b: b.to_string(),
            is_strong: strong,
            ..Default::default()
        };
        let matrix = CorrelationMatrix {
            themes: vec![theme("a"), theme("b")],
            cells: vec![
                cell("a", "a", false),
                cell("a", "b", true),
                cell("b", "a", true),
                cell("b", "b", false),
            ],
            strong_threshold: DEFAULT_STRONG_THRESHOLD,
            generated_at: None,
        };

        assert_eq!(matrix.pair("b", "a").unwrap().theme_a, "b");
        assert!(matrix.cell(2, 0).is_none());
        assert_eq!(matrix.strong_pairs().len(), 1);
    }
}
