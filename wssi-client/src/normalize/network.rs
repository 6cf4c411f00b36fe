//! Network graph normalization and deterministic fallback layout.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use wssi_types::{
    EdgeDirection, EvidenceTier, NetworkEdge, NetworkGraph, NetworkNode, ThemeCatalog,
};

use super::fields::{pick, pick_array, pick_bool, pick_number, pick_string, unwrap_data};
use super::index::DEFAULT_CATEGORY;
use super::time::parse_timestamp;

/// Centre of the synthesized layout, in canvas units.
pub const LAYOUT_CENTER: (f64, f64) = (400.0, 300.0);
/// Innermost ring radius for synthesized positions.
pub const LAYOUT_BASE_RADIUS: f64 = 160.0;
/// Radius jitter range added on top of the base radius.
pub const LAYOUT_RADIUS_JITTER: u32 = 120;

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a over the UTF-8 bytes of `id`.
pub fn layout_hash(id: &str) -> u32 {
    id.bytes()
        .fold(FNV_OFFSET, |h, b| (h ^ u32::from(b)).wrapping_mul(FNV_PRIME))
}

/// Stable polar placement for a node without stored coordinates.
///
/// The angle is `hash % 360` degrees and the radius is the base radius plus
/// `(hash >> 16) % jitter`, so the same id always lands on the same spot.
pub fn layout_position(id: &str) -> (f64, f64) {
    let h = layout_hash(id);
    let angle = f64::from(h % 360).to_radians();
    let radius = LAYOUT_BASE_RADIUS + f64::from((h >> 16) % LAYOUT_RADIUS_JITTER);
    (
        LAYOUT_CENTER.0 + radius * angle.cos(),
        LAYOUT_CENTER.1 + radius * angle.sin(),
    )
}

/// Normalize a network payload.
///
/// Nodes need a non-empty id; edges need both endpoints to name a kept node.
pub fn normalize_network(raw: &Value, catalog: &ThemeCatalog) -> NetworkGraph {
    let scope = unwrap_data(raw, &["nodes", "edges"]);

    let mut seen = HashSet::new();
    let mut nodes: Vec<(NetworkNode, bool)> = Vec::new();
    for row in pick_array(scope, &["nodes"]).unwrap_or(&[]) {
        let Some(id) = pick_string(row, &["id", "node_id"]) else {
            continue;
        };
        if !seen.insert(id.clone()) {
            continue;
        }
        nodes.push(network_node(row, id, catalog));
    }

    let edges: Vec<NetworkEdge> = pick_array(scope, &["edges", "links"])
        .unwrap_or(&[])
        .iter()
        .filter_map(|row| network_edge(row, &seen))
        .collect();

    let mut degree: HashMap<&str, usize> = HashMap::new();
    for edge in &edges {
        *degree.entry(edge.source.as_str()).or_default() += 1;
        *degree.entry(edge.target.as_str()).or_default() += 1;
    }

    let nodes = nodes
        .into_iter()
        .map(|(mut node, has_size)| {
            if !has_size {
                node.size = 1.0 + degree.get(node.id.as_str()).copied().unwrap_or(0) as f64;
            }
            node
        })
        .collect();

    NetworkGraph {
        nodes,
        edges,
        generated_at: pick(raw, &["generated_at", "timestamp"]).and_then(parse_timestamp),
    }
}

fn network_node(row: &Value, id: String, catalog: &ThemeCatalog) -> (NetworkNode, bool) {
    let theme_id = pick_string(row, &["theme_id", "theme"]);
    let meta = theme_id.as_deref().and_then(|t| catalog.get(t));

    let (x, y, synthesized_position) =
        match (pick_number(row, &["x"]), pick_number(row, &["y"])) {
            (Some(x), Some(y)) => (x, y, false),
            _ => {
                let (x, y) = layout_position(&id);
                (x, y, true)
            }
        };

    let size = pick_number(row, &["size", "size_score", "score"]).filter(|s| *s >= 0.0);

    let node = NetworkNode {
        label: pick_string(row, &["label", "name", "title"])
            .or_else(|| meta.map(|m| m.name.clone()))
            .unwrap_or_else(|| id.clone()),
        category: pick_string(row, &["category", "group", "type"])
            .or_else(|| meta.map(|m| m.category.clone()))
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        theme_id,
        x,
        y,
        synthesized_position,
        size: size.unwrap_or(1.0),
        id,
    };
    (node, size.is_some())
}

fn network_edge(row: &Value, nodes: &HashSet<String>) -> Option<NetworkEdge> {
    let source = pick_string(row, &["source", "from", "source_id"])?;
    let target = pick_string(row, &["target", "to", "target_id"])?;
    if !nodes.contains(&source) || !nodes.contains(&target) {
        return None;
    }

    let direction = match pick_bool(row, &["directed"]) {
        Some(true) => EdgeDirection::Directed,
        Some(false) => EdgeDirection::Undirected,
        None => pick_string(row, &["direction"])
            .map(|d| EdgeDirection::from_label(&d))
            .unwrap_or_default(),
    };

    Some(NetworkEdge {
        id: pick_string(row, &["id", "edge_id"])
            .unwrap_or_else(|| format!("{}->{}", source, target)),
        weight: pick_number(row, &["weight", "strength", "value"])
            .unwrap_or(0.0)
            .clamp(0.0, 1.0),
        evidence_tier: pick_string(row, &["evidence_tier", "evidence", "confidence"])
            .map(|e| EvidenceTier::from_label(&e))
            .unwrap_or_default(),
        direction,
        edge_type: pick_string(row, &["type", "edge_type", "relationship"])
            .unwrap_or_else(|| "link".to_string()),
        source,
        target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wssi_types::ThemeMeta;

    #[test]
    fn test_fnv1a_reference_values() {
        assert_eq!(layout_hash(""), 0x811c_9dc5);
        assert_eq!(layout_hash("a"), 0xe40c_292c);
        assert_eq!(layout_hash("foobar"), 0xbf9c_f968);
    }

    #[test]
    fn test_synthesized_layout_is_deterministic() {
        let raw = json!({"nodes": [{"id": "food-system"}, {"id": "energy", "x": 10, "y": "20"}]});
        let first = normalize_network(&raw, &ThemeCatalog::default());
        let second = normalize_network(&raw, &ThemeCatalog::default());

        assert_eq!(first.nodes[0].x, second.nodes[0].x);
        assert_eq!(first.nodes[0].y, second.nodes[0].y);
        assert!(first.nodes[0].synthesized_position);
        assert_eq!((first.nodes[1].x, first.nodes[1].y), (10.0, 20.0));
        assert!(!first.nodes[1].synthesized_position);

        let (x, y) = (first.nodes[0].x, first.nodes[0].y);
        let distance = ((x - LAYOUT_CENTER.0).powi(2) + (y - LAYOUT_CENTER.1).powi(2)).sqrt();
        assert!(distance >= LAYOUT_BASE_RADIUS - 1e-9);
        assert!(distance < LAYOUT_BASE_RADIUS + f64::from(LAYOUT_RADIUS_JITTER));
    }

    #[test]
    fn test_invalid_nodes_and_edges_dropped() {
        let raw = json!({
            "nodes": [{"id": "a"}, {"id": ""}, {"label": "no id"}, {"id": "b"}, {"id": "a"}],
            "edges": [
                {"source": "a", "target": "b", "weight": 1.7, "evidence_tier": "strong", "directed": true},
                {"source": "a", "target": "ghost", "weight": 0.3},
                {"source": "", "target": "b"},
                {"target": "a"},
                {"from": "b", "to": "a", "weight": -0.4, "direction": "undirected"}
            ]
        });
        let graph = normalize_network(&raw, &ThemeCatalog::default());

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.edges[0].weight, 1.0);
        assert_eq!(graph.edges[0].evidence_tier, EvidenceTier::Strong);
        assert_eq!(graph.edges[0].direction, EdgeDirection::Directed);
        assert_eq!(graph.edges[0].id, "a->b");
        assert_eq!(graph.edges[1].weight, 0.0);
        assert_eq!(graph.edges[1].direction, EdgeDirection::Undirected);
        // Size defaults to one plus degree
        assert_eq!(graph.node("a").unwrap().size, 3.0);
    }

    #[test]
    fn test_catalog_labels_theme_nodes() {
        let mut catalog = ThemeCatalog::default();
        catalog.insert(
            "food".to_string(),
            ThemeMeta { name: "Food System".to_string(), category: "Food".to_string() },
        );
        let raw = json!({"nodes": [{"id": "n1", "theme_id": "food", "size": 4}]});
        let graph = normalize_network(&raw, &catalog);

        let node = &graph.nodes[0];
        assert_eq!(node.label, "Food System");
        assert_eq!(node.category, "Food");
        assert_eq!(node.size, 4.0);
    }
}
