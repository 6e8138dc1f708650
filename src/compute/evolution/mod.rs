//! Evolutionary search for low-cost paths through a network graph.
//!
//! # Overview
//!
//! The search system consists of:
//!
//! - **Fitness** (`fitness`): Weighted multi-factor path cost
//! - **Operators** (`operators`): Tournament selection, crossover and mutation
//! - **Search** (`search`): The generational engine
//!
//! Candidates are node paths. Operators are free to break a path; the engine
//! repairs and validates every candidate before it enters a population, so
//! each member always runs from the start node to the end node along real
//! edges.
//!
//! # Example
//!
//! ```rust,no_run
//! use evopath::compute::evolution::EvolutionEngine;
//! use evopath::schema::{Graph, SearchConfig};
//!
//! let graph = Graph::load("network.json").unwrap();
//! let mut engine = EvolutionEngine::new(&graph, SearchConfig::default());
//! let report = engine.run_with_callback(|progress| {
//!     println!("Generation {}: best fitness = {:.3}",
//!         progress.generation, progress.best_fitness);
//! });
//!
//! println!("Best path: {:?}", report.best.path);
//! ```

mod fitness;
mod operators;
mod search;

pub use fitness::{FitnessBreakdown, FitnessEvaluator, evaluate};
pub use operators::{Mutation, PathRng};
pub use search::{EvolutionEngine, ProgressCallback};
