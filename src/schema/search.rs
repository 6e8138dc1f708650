//! Search result and progress types.
//!
//! These are the values the evolution engine hands back to its caller: the
//! champion [`Individual`], per-generation progress snapshots and the final
//! [`SearchReport`].

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::NodeId;

/// Numeric cost reported for an invalid candidate.
///
/// Valid paths on realistic graphs cost a few thousand units at most, so this
/// can never collide with a real score.
pub const INVALID_COST: f64 = 1e18;

/// Scores at or above this are treated as invalid and never admitted into a
/// population.
pub const REJECT_THRESHOLD: f64 = 1e17;

/// Cost of a candidate path. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum Fitness {
    /// Weighted cost of a structurally valid path.
    Score(f64),
    /// Broken or unscored path.
    #[default]
    Invalid,
}

impl Fitness {
    /// Numeric cost, with `Invalid` mapped to [`INVALID_COST`].
    #[inline]
    pub fn cost(&self) -> f64 {
        match self {
            Fitness::Score(cost) => *cost,
            Fitness::Invalid => INVALID_COST,
        }
    }

    /// Whether the candidate may enter a population.
    #[inline]
    pub fn is_admissible(&self) -> bool {
        match self {
            Fitness::Score(cost) => cost.is_finite() && *cost < REJECT_THRESHOLD,
            Fitness::Invalid => false,
        }
    }

    /// Total order on cost, invalid last.
    pub fn compare(&self, other: &Fitness) -> Ordering {
        self.cost().total_cmp(&other.cost())
    }

    /// Strictly cheaper than `other`.
    #[inline]
    pub fn is_better_than(&self, other: &Fitness) -> bool {
        self.compare(other) == Ordering::Less
    }
}

/// A candidate path and its cached fitness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    pub path: Vec<NodeId>,
    pub fitness: Fitness,
}

impl Individual {
    pub fn new(path: Vec<NodeId>, fitness: Fitness) -> Self {
        Self { path, fitness }
    }

    /// Degenerate result for a graph where `start` cannot reach the end node.
    pub fn infeasible(start: NodeId) -> Self {
        Self {
            path: vec![start],
            fitness: Fitness::Invalid,
        }
    }

    /// Number of edges traversed.
    #[inline]
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Progress update emitted once per generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchProgress {
    /// Generations completed so far.
    pub generation: usize,
    /// Total generations planned.
    pub total_generations: usize,
    /// Best cost seen in any generation.
    pub best_fitness: f64,
    /// Best cost in the current population.
    pub generation_best: f64,
    /// Mean cost of the current population.
    pub avg_fitness: f64,
    /// Node count of the champion path.
    pub best_path_len: usize,
}

/// Per-generation statistics for analysis and plotting.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchHistory {
    /// Champion cost after each generation (non-increasing).
    pub best_fitness: Vec<f64>,
    /// Population mean cost after each generation.
    pub avg_fitness: Vec<f64>,
    /// Population cost standard deviation after each generation.
    pub fitness_std: Vec<f64>,
    /// Number of distinct paths in the population after each generation.
    pub distinct_paths: Vec<usize>,
}

/// Why a search stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Ran the full generation budget.
    Completed,
    /// No path exists between start and end.
    Infeasible,
}

/// Counters from a search run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchStats {
    /// Generations evolved.
    pub generations: usize,
    /// Candidates built and scored, admitted or not.
    pub candidates_evaluated: u64,
    /// Candidates discarded during finalization.
    pub candidates_rejected: u64,
    /// Population slots filled by resampling after an attempt budget ran out.
    pub backfilled: u64,
    pub elapsed_seconds: f64,
    pub stop_reason: StopReason,
}

/// Complete outcome of a search run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    /// Best individual seen across all generations.
    pub best: Individual,
    pub stats: SearchStats,
    pub history: SearchHistory,
}

impl SearchReport {
    /// Whether a usable path was found.
    pub fn is_feasible(&self) -> bool {
        self.best.fitness.is_admissible()
    }
}

/// Exported best path, as written to `best_path.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathExport {
    pub fitness: f64,
    pub path: Vec<NodeId>,
}

impl PathExport {
    /// Write as pretty JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read a previously exported path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ExportError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl From<&Individual> for PathExport {
    fn from(individual: &Individual) -> Self {
        Self {
            fitness: individual.fitness.cost(),
            path: individual.path.clone(),
        }
    }
}

/// Search setup errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("No path exists between start node {start} and end node {end}")]
    Infeasible { start: NodeId, end: NodeId },
}

/// Result export errors.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to write result: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode result: {0}")]
    Json(#[from] serde_json::Error),
}
