//! Graph-aware genetic operators on node paths.
//!
//! Provides tournament selection, pivot crossover and the two repair-backed
//! mutations. Operators may leave a child incomplete; the engine finalizes
//! every child before admitting it.

use rand::prelude::*;

use crate::compute::Adjacency;
use crate::schema::{Individual, NodeId, OperatorConfig};

/// Which mutation was applied to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Cut at an interior point and repaired to the end node.
    Truncate,
    /// Two interior nodes swapped, broken suffix dropped and repaired.
    Swap,
}

/// Random number generator wrapper for path operations.
pub struct PathRng<R = StdRng> {
    rng: R,
}

impl PathRng<StdRng> {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> PathRng<R> {
    /// Wrap an existing generator.
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Underlying generator, for traversal helpers.
    pub fn inner(&mut self) -> &mut R {
        &mut self.rng
    }

    /// True with probability `p`. Out-of-range values saturate.
    #[inline]
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.r#gen::<f64>() < p
    }

    /// Uniform index below `len`, or `None` for an empty range.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.gen_range(0..len))
    }

    /// Draw `size` members uniformly (with replacement) and return the index
    /// of the cheapest. `None` for an empty population.
    pub fn tournament(&mut self, population: &[Individual], size: usize) -> Option<usize> {
        let mut best = self.index(population.len())?;
        for _ in 1..size.max(1) {
            let idx = self.rng.gen_range(0..population.len());
            if population[idx].fitness.is_better_than(&population[best].fitness) {
                best = idx;
            }
        }
        Some(best)
    }

    /// Splice two parents at a shared interior node.
    ///
    /// The child is `a` up to and including the first occurrence of a random
    /// common interior node, followed by what comes after that node's first
    /// occurrence in `b`. Without a common node the child is a random prefix
    /// of `a` and must be repaired downstream. The first node is forced to
    /// `start`. If either parent has fewer than two nodes, `a` is returned
    /// unchanged.
    pub fn crossover(&mut self, a: &[NodeId], b: &[NodeId], start: NodeId) -> Vec<NodeId> {
        if a.len() < 2 || b.len() < 2 {
            return a.to_vec();
        }

        let b_interior = &b[1..b.len() - 1];
        let common: Vec<NodeId> = a[1..a.len() - 1]
            .iter()
            .copied()
            .filter(|id| b_interior.contains(id))
            .collect();

        let mut child = match common.choose(&mut self.rng) {
            Some(&pivot) => {
                let (Some(ia), Some(ib)) = (
                    a.iter().position(|&id| id == pivot),
                    b.iter().position(|&id| id == pivot),
                ) else {
                    return a.to_vec();
                };
                let mut spliced = Vec::with_capacity(ia + 1 + b.len() - ib);
                spliced.extend_from_slice(&a[..=ia]);
                spliced.extend_from_slice(&b[ib + 1..]);
                spliced
            }
            None => {
                let cut = self.rng.gen_range(1..a.len());
                a[..cut].to_vec()
            }
        };

        if let Some(first) = child.first_mut() {
            *first = start;
        }
        child
    }

    /// Mutate `path` in place with probability `config.mutation_rate`.
    ///
    /// Paths shorter than three nodes have no interior and are left alone.
    /// Returns the mutation applied, if any. The result may still fail to
    /// reach `goal` when repair is impossible.
    pub fn mutate(
        &mut self,
        path: &mut Vec<NodeId>,
        adjacency: &Adjacency,
        goal: NodeId,
        config: &OperatorConfig,
    ) -> Option<Mutation> {
        if path.len() < 3 || !self.chance(config.mutation_rate) {
            return None;
        }

        let interior = 1..path.len() - 1;

        if self.chance(config.truncate_share) {
            let cut = self.rng.gen_range(interior);
            path.truncate(cut);
            adjacency.repair_to_end(path, goal);
            return Some(Mutation::Truncate);
        }

        let i = self.rng.gen_range(interior.clone());
        let j = self.rng.gen_range(interior);
        path.swap(i, j);

        if !adjacency.is_valid_path(path) {
            let keep = adjacency.valid_prefix_len(path);
            path.truncate(keep);
            adjacency.repair_to_end(path, goal);
        }
        Some(Mutation::Swap)
    }
}
