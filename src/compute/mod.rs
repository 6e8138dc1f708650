//! Compute module - Path traversal and evolutionary search.

mod traversal;

pub mod evolution;

pub use evolution::{EvolutionEngine, FitnessEvaluator, evaluate};
pub use traversal::*;
