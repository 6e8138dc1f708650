//! Multi-factor path cost.
//!
//! A path is scored as a weighted sum of total latency, hop count, an
//! inverse-bandwidth congestion term and a loop penalty, minus a bounded
//! bonus for the average node performance along the path. Lower is better.

use std::collections::HashMap;

use crate::compute::Adjacency;
use crate::schema::{Edge, Fitness, FitnessWeights, Graph, NodeId};

/// Raw fitness terms of a valid path, before weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessBreakdown {
    /// Sum of clamped edge latencies.
    pub latency: f64,
    /// Edges traversed.
    pub hops: f64,
    /// Sum of `latency / bandwidth` over traversed edges.
    pub bandwidth_penalty: f64,
    /// Charge for repeated node visits.
    pub loop_penalty: f64,
    /// Scaled `ln(1 + average performance)`.
    pub performance_bonus: f64,
}

impl FitnessBreakdown {
    /// Combine the terms into a single cost.
    pub fn cost(&self, weights: &FitnessWeights) -> f64 {
        weights.latency * self.latency
            + weights.hops * self.hops
            + weights.bandwidth * self.bandwidth_penalty
            + weights.loops * self.loop_penalty
            - weights.performance * self.performance_bonus
    }
}

/// Scores candidate paths against one graph.
///
/// Builds the adjacency view and an edge lookup once so repeated evaluation
/// during a search stays cheap.
pub struct FitnessEvaluator<'g> {
    graph: &'g Graph,
    adjacency: Adjacency,
    /// First listed edge for each unordered node pair.
    edges: HashMap<(NodeId, NodeId), &'g Edge>,
    weights: FitnessWeights,
}

impl<'g> FitnessEvaluator<'g> {
    /// Create a new fitness evaluator.
    pub fn new(graph: &'g Graph, weights: FitnessWeights) -> Self {
        let mut edges = HashMap::with_capacity(graph.edges.len());
        for edge in &graph.edges {
            edges.entry(pair_key(edge.node_a, edge.node_b)).or_insert(edge);
        }

        Self {
            graph,
            adjacency: Adjacency::build(graph),
            edges,
            weights,
        }
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Adjacency view of the evaluated graph.
    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    pub fn weights(&self) -> &FitnessWeights {
        &self.weights
    }

    /// Score a path. Paths that are empty, do not run from the start node to
    /// the end node, or are not walks in the graph are `Invalid`.
    pub fn evaluate(&self, path: &[NodeId]) -> Fitness {
        match self.breakdown(path) {
            Some(terms) => Fitness::Score(terms.cost(&self.weights)),
            None => Fitness::Invalid,
        }
    }

    /// Unweighted fitness terms, or `None` for an invalid path.
    pub fn breakdown(&self, path: &[NodeId]) -> Option<FitnessBreakdown> {
        let (&first, &last) = (path.first()?, path.last()?);
        if first != self.graph.start_node || last != self.graph.end_node {
            return None;
        }
        if !self.adjacency.is_valid_path(path) {
            return None;
        }

        let floor = self.weights.floor;
        let mut latency = 0.0;
        let mut bandwidth_penalty = 0.0;
        for pair in path.windows(2) {
            let edge = self.edges.get(&pair_key(pair[0], pair[1]))?;
            let lat = edge.latency.max(floor);
            let bw = edge.bandwidth.max(floor);
            latency += lat;
            bandwidth_penalty += lat / bw;
        }

        let mut visits: HashMap<NodeId, usize> = HashMap::with_capacity(path.len());
        let mut performance_sum = 0.0;
        for id in path {
            *visits.entry(*id).or_default() += 1;
            if let Some(node) = self.graph.nodes.get(id) {
                performance_sum += node.performance;
            }
        }

        let repeats: usize = visits.values().map(|&count| count - 1).sum();
        let loop_penalty = repeats as f64 * self.weights.loop_penalty;

        let performance_avg = performance_sum / path.len() as f64;
        let performance_bonus = performance_avg.max(0.0).ln_1p() * self.weights.performance_scale;

        Some(FitnessBreakdown {
            latency,
            hops: (path.len() - 1) as f64,
            bandwidth_penalty,
            loop_penalty,
            performance_bonus,
        })
    }
}

#[inline]
fn pair_key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Score `path` on `graph` with the default weights.
pub fn evaluate(graph: &Graph, path: &[NodeId]) -> Fitness {
    FitnessEvaluator::new(graph, FitnessWeights::default()).evaluate(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{INVALID_COST, Node, NodeKind};

    const EPS: f64 = 1e-9;

    fn node(id: NodeId, performance: f64) -> Node {
        Node::new(id, NodeKind::Compute, performance)
    }

    fn line_graph() -> Graph {
        Graph::new(
            (0..4).map(|id| node(id, 0.0)).collect(),
            vec![
                Edge::new(0, 1, 1.0, 10.0),
                Edge::new(1, 2, 1.0, 10.0),
                Edge::new(2, 3, 1.0, 10.0),
            ],
            0,
            3,
        )
    }

    fn cost(fitness: Fitness) -> f64 {
        match fitness {
            Fitness::Score(cost) => cost,
            Fitness::Invalid => panic!("expected a score"),
        }
    }

    #[test]
    fn test_invalid_paths() {
        let graph = line_graph();
        assert_eq!(evaluate(&graph, &[]), Fitness::Invalid);
        assert_eq!(evaluate(&graph, &[1, 2, 3]), Fitness::Invalid);
        assert_eq!(evaluate(&graph, &[0, 1, 2]), Fitness::Invalid);
        assert_eq!(evaluate(&graph, &[0, 2, 3]), Fitness::Invalid);
        assert_eq!(evaluate(&graph, &[0, 1, 2]).cost(), INVALID_COST);
    }

    #[test]
    fn test_line_cost() {
        let graph = line_graph();
        // latency 3 + hops 3 * 2.5 + 25 * (3 * 1/10)
        let expected = 3.0 + 7.5 + 7.5;
        assert!((cost(evaluate(&graph, &[0, 1, 2, 3])) - expected).abs() < EPS);
    }

    #[test]
    fn test_extra_hop_costs_hop_weight() {
        let graph = Graph::new(
            (0..4).map(|id| node(id, 0.0)).collect(),
            vec![
                Edge::new(0, 1, 1.0, 10.0),
                Edge::new(1, 3, 2.0, 10.0),
                Edge::new(1, 2, 1.0, 10.0),
                Edge::new(2, 3, 1.0, 10.0),
            ],
            0,
            3,
        );
        let short = cost(evaluate(&graph, &[0, 1, 3]));
        let long = cost(evaluate(&graph, &[0, 1, 2, 3]));
        assert!(long > short);
        assert!((long - short - 2.5).abs() < EPS);
    }

    #[test]
    fn test_loop_penalty_per_revisit() {
        let graph = Graph::new(
            (0..4).map(|id| node(id, 0.0)).collect(),
            vec![
                Edge::new(0, 1, 1.0, 10.0),
                Edge::new(1, 2, 2.0, 4.0),
                Edge::new(1, 3, 3.0, 5.0),
            ],
            0,
            3,
        );
        let evaluator = FitnessEvaluator::new(&graph, FitnessWeights::default());
        let path = [0, 1, 2, 1, 3];
        let terms = evaluator.breakdown(&path).unwrap();

        assert_eq!(terms.loop_penalty, 50.0);
        let latency = 1.0 + 2.0 + 2.0 + 3.0;
        let bandwidth = 0.1 + 0.5 + 0.5 + 0.6;
        let expected = latency + 2.5 * 4.0 + 25.0 * bandwidth + 50.0;
        assert!((cost(evaluator.evaluate(&path)) - expected).abs() < EPS);
    }

    #[test]
    fn test_performance_bonus_lowers_cost() {
        let slow = line_graph();
        let mut fast = line_graph();
        for node in fast.nodes.values_mut() {
            node.performance = 100.0;
        }

        let path = [0, 1, 2, 3];
        let diff = cost(evaluate(&slow, &path)) - cost(evaluate(&fast, &path));
        assert!((diff - 101.0f64.ln() * 2.0).abs() < EPS);
    }

    #[test]
    fn test_negative_performance_is_ignored() {
        let mut graph = line_graph();
        for node in graph.nodes.values_mut() {
            node.performance = -50.0;
        }
        let terms = FitnessEvaluator::new(&graph, FitnessWeights::default())
            .breakdown(&[0, 1, 2, 3])
            .unwrap();
        assert_eq!(terms.performance_bonus, 0.0);
    }

    #[test]
    fn test_degenerate_edges_are_clamped() {
        let graph = Graph::new(
            vec![node(0, 0.0), node(1, 0.0)],
            vec![Edge::new(0, 1, 0.0, -3.0)],
            0,
            1,
        );
        let terms = FitnessEvaluator::new(&graph, FitnessWeights::default())
            .breakdown(&[0, 1])
            .unwrap();
        assert_eq!(terms.latency, 0.001);
        assert!((terms.bandwidth_penalty - 1.0).abs() < EPS);
    }

    #[test]
    fn test_first_parallel_edge_wins() {
        let graph = Graph::new(
            vec![node(0, 0.0), node(1, 0.0)],
            vec![Edge::new(1, 0, 4.0, 8.0), Edge::new(0, 1, 1.0, 1.0)],
            0,
            1,
        );
        let evaluator = FitnessEvaluator::new(&graph, FitnessWeights::default());
        let first = evaluator.breakdown(&[0, 1]).unwrap();
        assert_eq!(first.latency, 4.0);
        assert_eq!(first.bandwidth_penalty, 0.5);

        // Stable across repeated evaluation.
        assert_eq!(evaluator.evaluate(&[0, 1]), evaluator.evaluate(&[0, 1]));
    }

    #[test]
    fn test_single_node_path() {
        let graph = Graph::new(
            vec![node(5, 9.0), node(6, 0.0)],
            vec![Edge::new(5, 6, 1.0, 1.0)],
            5,
            5,
        );
        let terms = FitnessEvaluator::new(&graph, FitnessWeights::default())
            .breakdown(&[5])
            .unwrap();
        assert_eq!(terms.hops, 0.0);
        assert_eq!(terms.latency, 0.0);
        assert!((terms.performance_bonus - 10.0f64.ln() * 2.0).abs() < EPS);
    }

    #[test]
    fn test_custom_weights() {
        let graph = line_graph();
        let weights = FitnessWeights {
            latency: 0.0,
            bandwidth: 0.0,
            hops: 1.0,
            ..Default::default()
        };
        let evaluator = FitnessEvaluator::new(&graph, weights);
        assert!((cost(evaluator.evaluate(&[0, 1, 2, 3])) - 3.0).abs() < EPS);
    }
}
