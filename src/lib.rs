//! Evopath - Evolutionary search for low-cost network paths.
//!
//! Given an undirected network of typed nodes joined by edges with latency
//! and bandwidth, this crate searches for a path from a start node to an end
//! node that minimizes a weighted cost: total latency, hop count, congestion
//! on low-bandwidth links and repeated visits, offset by a bonus for fast
//! nodes along the way.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Graph model, configuration, generator and result types
//! - `compute`: Traversal primitives, fitness and the evolution engine
//!
//! # Example
//!
//! ```rust,no_run
//! use evopath::{
//!     compute::EvolutionEngine,
//!     schema::{Graph, PathExport, SearchConfig},
//! };
//!
//! let graph = Graph::load("network.json").unwrap();
//!
//! let config = SearchConfig {
//!     random_seed: Some(7),
//!     ..Default::default()
//! };
//! let mut engine = EvolutionEngine::new(&graph, config);
//! let best = engine.run();
//!
//! println!("Best path {:?} costs {:.3}", best.path, best.fitness.cost());
//! PathExport::from(&best).save("best_path.json").unwrap();
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::{EvolutionEngine, FitnessEvaluator};
pub use schema::{Fitness, Graph, Individual, PathExport, SearchConfig, SearchReport};
