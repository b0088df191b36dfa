//! Weighted import graph, concurrent construction, and centrality ranking
//!
//! Pure Rust implementation using petgraph. The graph is built once per run
//! and treated as read-only after construction.

mod builder;
mod centrality;
mod import_graph;

pub use builder::{BuildFailure, BuildOutcome, Granularity, GraphBuilder, MAX_IN_FLIGHT};
pub use centrality::{CentralityMeasure, MeasureError};
pub use import_graph::ImportGraph;
