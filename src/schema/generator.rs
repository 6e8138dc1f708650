//! Layered random network generator.
//!
//! Produces test graphs shaped like a small service network: end-user `PC`
//! nodes in the first layer, `SERVER` nodes in the last, and a mix of
//! compute, storage and gateway nodes between them.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{ConfigError, Edge, Graph, Node, NodeId, NodeKind};

/// Parameters for [`generate_layered`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of nodes, ids `0..node_count`.
    #[serde(default = "default_node_count")]
    pub node_count: usize,
    /// Number of layers the ids are split into.
    #[serde(default = "default_layers")]
    pub layers: usize,
    /// Edge probability between two nodes of the same layer.
    #[serde(default = "default_intra_probability")]
    pub intra_probability: f64,
    /// Edge probability between nodes of adjacent layers.
    #[serde(default = "default_inter_probability")]
    pub inter_probability: f64,
    /// Node performance range (inclusive).
    #[serde(default = "default_performance_bounds")]
    pub performance_bounds: (f64, f64),
    /// Edge latency range.
    #[serde(default = "default_latency_bounds")]
    pub latency_bounds: (f64, f64),
    /// Edge bandwidth range.
    #[serde(default = "default_bandwidth_bounds")]
    pub bandwidth_bounds: (f64, f64),
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            node_count: default_node_count(),
            layers: default_layers(),
            intra_probability: default_intra_probability(),
            inter_probability: default_inter_probability(),
            performance_bounds: default_performance_bounds(),
            latency_bounds: default_latency_bounds(),
            bandwidth_bounds: default_bandwidth_bounds(),
        }
    }
}

fn default_node_count() -> usize {
    40
}
fn default_layers() -> usize {
    6
}
fn default_intra_probability() -> f64 {
    0.2
}
fn default_inter_probability() -> f64 {
    0.6
}
fn default_performance_bounds() -> (f64, f64) {
    (100.0, 1000.0)
}
fn default_latency_bounds() -> (f64, f64) {
    (1.0, 11.0)
}
fn default_bandwidth_bounds() -> (f64, f64) {
    (1.0, 10.0)
}

/// Latency and bandwidth of the guaranteed start-to-end chain.
const CHAIN_LATENCY: f64 = 1.0;
const CHAIN_BANDWIDTH: f64 = 10.0;

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_count == 0 || self.layers == 0 {
            return Err(ConfigError::EmptyGenerator);
        }
        for (name, value) in [
            ("intra_probability", self.intra_probability),
            ("inter_probability", self.inter_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability {
                    name: name.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }

    #[inline]
    fn layer_of(&self, index: usize) -> usize {
        index * self.layers / self.node_count
    }
}

/// Generate a layered network with a guaranteed start-to-end route.
///
/// `config` is expected to pass [`GeneratorConfig::validate`].
pub fn generate_layered<R: Rng>(config: &GeneratorConfig, rng: &mut R) -> Graph {
    let n = config.node_count;
    let mut nodes = Vec::with_capacity(n);

    for i in 0..n {
        let kind = pick_kind(config.layer_of(i), config.layers, rng);
        let performance = uniform(rng, config.performance_bounds).round();
        nodes.push(Node::new(i as NodeId, kind, performance));
    }

    let mut edges = Vec::new();
    for i in 0..n {
        let layer_i = config.layer_of(i);
        for j in (i + 1)..n {
            let layer_j = config.layer_of(j);

            let p = if layer_i == layer_j {
                config.intra_probability
            } else if layer_j == layer_i + 1 {
                config.inter_probability
            } else {
                0.0
            };

            if p > 0.0 && rng.gen_bool(p) {
                edges.push(Edge::new(
                    i as NodeId,
                    j as NodeId,
                    uniform(rng, config.latency_bounds),
                    uniform(rng, config.bandwidth_bounds),
                ));
            }
        }
    }

    let start = nodes
        .iter()
        .find(|node| node.kind == NodeKind::Pc)
        .map(|node| node.id)
        .unwrap_or(0);
    let end = nodes
        .iter()
        .rev()
        .find(|node| node.kind == NodeKind::Server)
        .map(|node| node.id)
        .unwrap_or(n as NodeId - 1);

    // Consecutive-id chain so the pair is always connected.
    let mut current = start;
    while current < end {
        edges.push(Edge::new(current, current + 1, CHAIN_LATENCY, CHAIN_BANDWIDTH));
        current += 1;
    }

    log::debug!(
        "Generated graph: nodes={} edges={} start={} end={}",
        nodes.len(),
        edges.len(),
        start,
        end
    );

    Graph::new(nodes, edges, start, end)
}

fn pick_kind<R: Rng>(layer: usize, layers: usize, rng: &mut R) -> NodeKind {
    if layer == 0 {
        return NodeKind::Pc;
    }
    if layer == layers - 1 {
        return NodeKind::Server;
    }

    let r: f64 = rng.r#gen();
    if r < 0.2 {
        NodeKind::Storage
    } else if r < 0.4 {
        NodeKind::Gateway
    } else {
        NodeKind::Compute
    }
}

/// Uniform sample in `[lo, hi)`, or `lo` when the range is empty.
fn uniform<R: Rng>(rng: &mut R, bounds: (f64, f64)) -> f64 {
    if bounds.1 > bounds.0 {
        rng.gen_range(bounds.0..bounds.1)
    } else {
        bounds.0
    }
}
