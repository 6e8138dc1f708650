//! Graph traversal primitives used to build and repair candidate paths.
//!
//! Every operator in the evolution engine leans on these to keep candidates
//! structurally valid: a path is valid when it is non-empty, every node is
//! known to the graph and every consecutive pair shares an edge.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::schema::{Graph, NodeId, WalkConfig};

/// Undirected neighbor lists keyed by node id.
///
/// Every node of the graph is a key, possibly with no neighbors. Neighbor
/// order follows the edge list, so traversals are deterministic for a given
/// graph and RNG state.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    neighbors: BTreeMap<NodeId, Vec<NodeId>>,
}

impl Adjacency {
    /// Build neighbor lists. Edges touching unknown nodes are dropped.
    pub fn build(graph: &Graph) -> Self {
        let mut neighbors: BTreeMap<NodeId, Vec<NodeId>> =
            graph.nodes.keys().map(|&id| (id, Vec::new())).collect();

        for edge in &graph.edges {
            if !graph.contains(edge.node_a) || !graph.contains(edge.node_b) {
                continue;
            }
            if let Some(list) = neighbors.get_mut(&edge.node_a) {
                list.push(edge.node_b);
            }
            if let Some(list) = neighbors.get_mut(&edge.node_b) {
                list.push(edge.node_a);
            }
        }

        Self { neighbors }
    }

    /// Neighbors of `id`, or `None` if the node is unknown.
    #[inline]
    pub fn neighbors(&self, id: NodeId) -> Option<&[NodeId]> {
        self.neighbors.get(&id).map(Vec::as_slice)
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.neighbors.contains_key(&id)
    }

    /// Whether an edge joins `a` and `b`.
    #[inline]
    pub fn is_adjacent(&self, a: NodeId, b: NodeId) -> bool {
        self.neighbors(a).is_some_and(|list| list.contains(&b))
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Whether `path` is a real walk through known nodes.
    pub fn is_valid_path(&self, path: &[NodeId]) -> bool {
        match path {
            [] => false,
            [only] => self.contains(*only),
            _ => path.windows(2).all(|pair| self.is_adjacent(pair[0], pair[1])),
        }
    }

    /// Length of the longest prefix of `path` that is a valid walk.
    ///
    /// The first node is always kept, even if it is unknown; it is the
    /// anchor the caller repairs from.
    pub fn valid_prefix_len(&self, path: &[NodeId]) -> usize {
        if path.is_empty() {
            return 0;
        }
        1 + path
            .windows(2)
            .take_while(|pair| self.is_adjacent(pair[0], pair[1]))
            .count()
    }

    /// Minimum-hop path from `from` to `to`, both inclusive.
    ///
    /// Returns `[from]` when the two coincide and an empty vector when `to`
    /// is unreachable or either node is unknown. Ties between equally short
    /// paths follow BFS discovery order.
    pub fn shortest_path(&self, from: NodeId, to: NodeId) -> Vec<NodeId> {
        if !self.contains(from) || !self.contains(to) {
            return Vec::new();
        }
        if from == to {
            return vec![from];
        }

        let mut parent: HashMap<NodeId, NodeId> = HashMap::with_capacity(self.len());
        let mut queue = VecDeque::new();
        parent.insert(from, from);
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            let Some(list) = self.neighbors(current) else {
                continue;
            };
            for &next in list {
                if parent.contains_key(&next) {
                    continue;
                }
                parent.insert(next, current);
                if next == to {
                    return unwind(&parent, from, to);
                }
                queue.push_back(next);
            }
        }

        Vec::new()
    }

    /// Append the shortest continuation from the last node of `path` to
    /// `goal`. Leaves `path` untouched and returns `false` if none exists.
    pub fn repair_to_end(&self, path: &mut Vec<NodeId>, goal: NodeId) -> bool {
        let Some(&last) = path.last() else {
            return false;
        };
        let tail = self.shortest_path(last, goal);
        if tail.is_empty() {
            return false;
        }
        path.extend_from_slice(&tail[1..]);
        true
    }

    /// Randomized exploratory walk from `start` towards `goal`.
    ///
    /// Each step moves to a uniformly drawn neighbor. Visited neighbors are
    /// avoided unless a revisit roll succeeds; when redraws cannot find a
    /// fresh neighbor the walk splices in the shortest route to `goal` if
    /// there is one, and otherwise accepts the revisit. A walk that runs out
    /// of steps is repaired to `goal`. Returns an empty vector when no path
    /// could be produced.
    pub fn random_walk<R: Rng>(
        &self,
        start: NodeId,
        goal: NodeId,
        config: &WalkConfig,
        rng: &mut R,
    ) -> Vec<NodeId> {
        if !self.contains(start) || !self.contains(goal) {
            return Vec::new();
        }

        let mut path = Vec::with_capacity(config.max_steps.min(self.len()).max(4));
        path.push(start);
        let mut seen = HashSet::with_capacity(self.len());
        seen.insert(start);
        let mut current = start;

        for _ in 0..config.max_steps {
            if current == goal {
                return path;
            }

            let list = match self.neighbors(current) {
                Some(list) if !list.is_empty() => list,
                _ => break,
            };
            let Some(&drawn) = list.choose(rng) else {
                break;
            };
            let mut next = drawn;

            let allow_revisit = rng.r#gen::<f64>() < config.revisit_probability;
            if !allow_revisit && seen.contains(&next) {
                let fresh = (0..config.revisit_retries)
                    .filter_map(|_| list.choose(rng).copied())
                    .find(|candidate| !seen.contains(candidate));

                match fresh {
                    Some(candidate) => next = candidate,
                    None => {
                        let tail = self.shortest_path(current, goal);
                        if tail.len() >= 2 {
                            path.extend_from_slice(&tail[1..]);
                            return path;
                        }
                    }
                }
            }

            path.push(next);
            seen.insert(next);
            current = next;
        }

        if current == goal || self.repair_to_end(&mut path, goal) {
            path
        } else {
            Vec::new()
        }
    }
}

/// Rebuild the path from BFS parent links.
fn unwind(parent: &HashMap<NodeId, NodeId>, from: NodeId, to: NodeId) -> Vec<NodeId> {
    let mut path = vec![to];
    let mut current = to;
    while current != from {
        match parent.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}

/// Neighbor lists for every node of `graph`.
pub fn build_adjacency(graph: &Graph) -> Adjacency {
    Adjacency::build(graph)
}

/// Whether `path` is a valid walk in `graph`.
pub fn is_valid_path(graph: &Graph, path: &[NodeId]) -> bool {
    Adjacency::build(graph).is_valid_path(path)
}

/// Minimum-hop path between two nodes of `graph`.
pub fn shortest_path(graph: &Graph, from: NodeId, to: NodeId) -> Vec<NodeId> {
    Adjacency::build(graph).shortest_path(from, to)
}

/// Random walk from `graph.start_node` to `graph.end_node` of at most
/// `max_steps` steps before repair.
pub fn random_walk<R: Rng>(graph: &Graph, max_steps: usize, rng: &mut R) -> Vec<NodeId> {
    let config = WalkConfig {
        max_steps,
        ..Default::default()
    };
    Adjacency::build(graph).random_walk(graph.start_node, graph.end_node, &config, rng)
}

/// Extend `path` to `graph.end_node` along a shortest route.
pub fn repair_to_end(graph: &Graph, path: &mut Vec<NodeId>) -> bool {
    Adjacency::build(graph).repair_to_end(path, graph.end_node)
}
