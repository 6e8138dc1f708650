//! Schema module - Graph model, configuration and result types.

mod config;
mod generator;
mod graph;
mod search;

pub use config::*;
pub use generator::*;
pub use graph::*;
pub use search::*;
