//! Graph model: nodes, undirected weighted edges and the start/end pair.
//!
//! The graph is read-only during a search. Nodes live in an ordered map so
//! that every traversal over them is reproducible under a fixed RNG seed.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Node identity as it appears in graph files.
pub type NodeId = i64;

/// Categorical role of a node in the network.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    /// End-user machine. Preferred start node.
    Pc,
    Compute,
    /// Serving machine. Preferred end node.
    Server,
    Storage,
    Gateway,
    #[default]
    Unknown,
}

impl NodeKind {
    /// Parse a kind name, mapping anything unrecognised to `Unknown`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "PC" => Self::Pc,
            "COMPUTE" => Self::Compute,
            "SERVER" => Self::Server,
            "STORAGE" => Self::Storage,
            "GATEWAY" => Self::Gateway,
            _ => Self::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

/// A network node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Role of the node.
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    /// Performance/capacity scalar. Higher is better.
    #[serde(default)]
    pub performance: f64,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind, performance: f64) -> Self {
        Self {
            id,
            kind,
            performance,
        }
    }
}

fn default_edge_weight() -> f64 {
    1.0
}

/// Undirected weighted edge between `node_a` and `node_b`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    pub node_a: NodeId,
    pub node_b: NodeId,
    #[serde(default = "default_edge_weight")]
    pub latency: f64,
    #[serde(default = "default_edge_weight")]
    pub bandwidth: f64,
}

impl Edge {
    pub fn new(node_a: NodeId, node_b: NodeId, latency: f64, bandwidth: f64) -> Self {
        Self {
            node_a,
            node_b,
            latency,
            bandwidth,
        }
    }
}

/// Weighted undirected graph with a designated start and end node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    pub nodes: BTreeMap<NodeId, Node>,
    /// Parallel edges are allowed; the first one listed is the one scored.
    pub edges: Vec<Edge>,
    pub start_node: NodeId,
    pub end_node: NodeId,
}

impl Graph {
    /// Build a graph from node and edge lists. Later duplicates of a node id
    /// replace earlier ones.
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>, start_node: NodeId, end_node: NodeId) -> Self {
        Self {
            nodes: nodes.into_iter().map(|n| (n.id, n)).collect(),
            edges,
            start_node,
            end_node,
        }
    }

    /// Whether `id` is a key of the node map.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Parse the JSON graph format, resolving missing start/end nodes.
    pub fn from_json_str(json: &str) -> Result<Self, GraphError> {
        let file: GraphFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    /// Load a graph from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GraphError> {
        let json = fs::read_to_string(path)?;
        let graph = Self::from_json_str(&json)?;

        log::info!(
            "Loaded graph: nodes={} edges={} start={} end={}",
            graph.nodes.len(),
            graph.edges.len(),
            graph.start_node,
            graph.end_node
        );

        Ok(graph)
    }

    /// Serialize to the JSON graph format.
    pub fn to_json_string(&self) -> Result<String, GraphError> {
        let file = GraphFile {
            start_node: Some(self.start_node),
            end_node: Some(self.end_node),
            nodes: self.nodes.values().cloned().collect(),
            edges: self.edges.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Write the graph as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Check structural sanity of a loaded graph.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.nodes.is_empty() {
            return Err(GraphError::NoNodes);
        }
        if self.edges.is_empty() {
            return Err(GraphError::NoEdges);
        }
        for (index, edge) in self.edges.iter().enumerate() {
            if !edge.latency.is_finite() || !edge.bandwidth.is_finite() {
                return Err(GraphError::NonFiniteEdge { index });
            }
        }
        Ok(())
    }

    fn from_file(file: GraphFile) -> Result<Self, GraphError> {
        let mut nodes = BTreeMap::new();
        for node in file.nodes {
            let id = node.id;
            if nodes.insert(id, node).is_some() {
                return Err(GraphError::DuplicateNode(id));
            }
        }

        let mut graph = Self {
            nodes,
            edges: file.edges,
            start_node: 0,
            end_node: 0,
        };
        graph.validate()?;

        // Absent endpoints read as node 0.
        let start = file.start_node.unwrap_or_default();
        let end = file.end_node.unwrap_or_default();
        graph.start_node = if graph.contains(start) {
            start
        } else {
            graph.fallback_node(NodeKind::Pc, false)
        };
        graph.end_node = if graph.contains(end) {
            end
        } else {
            graph.fallback_node(NodeKind::Server, true)
        };

        Ok(graph)
    }

    /// First node of `kind`, else the smallest (or largest) id.
    fn fallback_node(&self, kind: NodeKind, largest: bool) -> NodeId {
        if let Some(node) = self.nodes.values().find(|n| n.kind == kind) {
            return node.id;
        }
        let ids = self.nodes.keys().copied();
        let id = if largest { ids.max() } else { ids.min() };
        id.unwrap_or_default()
    }
}

/// On-disk representation of a graph.
#[derive(Debug, Serialize, Deserialize)]
struct GraphFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_node: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_node: Option<NodeId>,
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<Edge>,
}

/// Graph loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Failed to read graph file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse graph JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Graph has no nodes")]
    NoNodes,
    #[error("Graph has no edges")]
    NoEdges,
    #[error("Node id {0} appears more than once")]
    DuplicateNode(NodeId),
    #[error("Edge {index} has a non-finite latency or bandwidth")]
    NonFiniteEdge { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
        "start_node": 0,
        "end_node": 2,
        "nodes": [
            { "id": 0, "type": "PC", "performance": 120 },
            { "id": 1, "type": "GATEWAY", "performance": 500 },
            { "id": 2, "type": "SERVER", "performance": 900 }
        ],
        "edges": [
            { "node_a": 0, "node_b": 1, "latency": 2.5, "bandwidth": 4.0 },
            { "node_a": 1, "node_b": 2, "latency": 1.0, "bandwidth": 8.0 }
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let graph = Graph::from_json_str(SAMPLE).unwrap();
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.start_node, 0);
        assert_eq!(graph.end_node, 2);
        assert_eq!(graph.nodes[&1].kind, NodeKind::Gateway);
        assert_eq!(graph.nodes[&2].performance, 900.0);
    }

    #[test]
    fn test_unknown_kind_and_defaults() {
        let json = r#"{
            "nodes": [{ "id": 3, "type": "MAINFRAME" }, { "id": 7 }],
            "edges": [{ "node_a": 3, "node_b": 7 }],
            "comment": "ignored"
        }"#;
        let graph = Graph::from_json_str(json).unwrap();
        assert_eq!(graph.nodes[&3].kind, NodeKind::Unknown);
        assert_eq!(graph.nodes[&7].performance, 0.0);
        assert_eq!(graph.edges[0].latency, 1.0);
        assert_eq!(graph.edges[0].bandwidth, 1.0);
    }

    #[test]
    fn test_missing_endpoints_fall_back_to_kinds() {
        let json = r#"{
            "nodes": [
                { "id": 1, "type": "COMPUTE" },
                { "id": 4, "type": "PC" },
                { "id": 6, "type": "SERVER" },
                { "id": 9, "type": "COMPUTE" }
            ],
            "edges": [{ "node_a": 4, "node_b": 6 }]
        }"#;
        let graph = Graph::from_json_str(json).unwrap();
        assert_eq!(graph.start_node, 4);
        assert_eq!(graph.end_node, 6);
    }

    #[test]
    fn test_unknown_endpoints_fall_back_to_extreme_ids() {
        let json = r#"{
            "start_node": 100,
            "end_node": -5,
            "nodes": [{ "id": 2 }, { "id": 5 }, { "id": 8 }],
            "edges": [{ "node_a": 2, "node_b": 8 }]
        }"#;
        let graph = Graph::from_json_str(json).unwrap();
        assert_eq!(graph.start_node, 2);
        assert_eq!(graph.end_node, 8);
    }

    #[test]
    fn test_rejects_empty_lists() {
        let no_nodes = r#"{ "nodes": [], "edges": [{ "node_a": 0, "node_b": 1 }] }"#;
        assert!(matches!(
            Graph::from_json_str(no_nodes),
            Err(GraphError::NoNodes)
        ));

        let no_edges = r#"{ "nodes": [{ "id": 0 }], "edges": [] }"#;
        assert!(matches!(
            Graph::from_json_str(no_edges),
            Err(GraphError::NoEdges)
        ));
    }

    #[test]
    fn test_rejects_duplicate_node() {
        let json = r#"{
            "nodes": [{ "id": 1 }, { "id": 1 }],
            "edges": [{ "node_a": 1, "node_b": 1 }]
        }"#;
        assert!(matches!(
            Graph::from_json_str(json),
            Err(GraphError::DuplicateNode(1))
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Graph::from_json_str("{ nodes: "),
            Err(GraphError::Json(_))
        ));
    }

    #[test]
    fn test_missing_endpoints_default_to_node_zero() {
        let json = r#"{
            "nodes": [
                { "id": 0, "type": "COMPUTE" },
                { "id": 3, "type": "PC" },
                { "id": 5, "type": "SERVER" }
            ],
            "edges": [{ "node_a": 0, "node_b": 3 }, { "node_a": 3, "node_b": 5 }]
        }"#;
        let graph = Graph::from_json_str(json).unwrap();
        assert_eq!(graph.start_node, 0);
        assert_eq!(graph.end_node, 0);

        let json = r#"{
            "end_node": 42,
            "nodes": [{ "id": 0 }, { "id": 3, "type": "PC" }, { "id": 5, "type": "SERVER" }],
            "edges": [{ "node_a": 0, "node_b": 5 }]
        }"#;
        let graph = Graph::from_json_str(json).unwrap();
        assert_eq!(graph.start_node, 0);
        assert_eq!(graph.end_node, 5);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.json");

        let graph = Graph::from_json_str(SAMPLE).unwrap();
        graph.save(&path).unwrap();

        let loaded = Graph::load(&path).unwrap();
        assert_eq!(loaded, graph);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = Graph::load(dir.path().join("absent.json"));
        assert!(matches!(result, Err(GraphError::Io(_))));
    }
}
