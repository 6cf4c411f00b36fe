//! Theme/indicator network graph.

use chrono::{DateTime, Utc};

use crate::Usable;

/// Strength of the evidence behind an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EvidenceTier {
    #[default]
    Unknown,
    Weak,
    Moderate,
    Strong,
}

impl EvidenceTier {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "strong" => EvidenceTier::Strong,
            "moderate" => EvidenceTier::Moderate,
            "weak" => EvidenceTier::Weak,
            _ => EvidenceTier::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EdgeDirection {
    Directed,
    #[default]
    Undirected,
}

impl EdgeDirection {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "directed" | "forward" | "one-way" | "causal" => EdgeDirection::Directed,
            _ => EdgeDirection::Undirected,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct NetworkNode {
    pub id: String,
    pub label: String,
    pub category: String,
    pub theme_id: Option<String>,
    pub x: f64,
    pub y: f64,
    /// True when `x`/`y` were derived from the id hash rather than supplied.
    pub synthesized_position: bool,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct NetworkEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Clamped to `[0, 1]`.
    pub weight: f64,
    pub evidence_tier: EvidenceTier,
    pub direction: EdgeDirection,
    pub edge_type: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct NetworkGraph {
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
    pub generated_at: Option<DateTime<Utc>>,
}

impl NetworkGraph {
    pub fn node(&self, id: &str) -> Option<&NetworkNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Number of edges touching a node.
    pub fn degree(&self, id: &str) -> usize {
        self.edges
            .iter()
            .filter(|e| e.source == id || e.target == id)
            .count()
    }
}

impl Usable for NetworkGraph {
    fn record_count(&self) -> usize {
        self.nodes.len()
    }
}
