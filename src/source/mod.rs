mod error;
mod graph;
mod load;
mod payload;

#[cfg(test)]
pub use graph::TypeStats;
pub use graph::{GraphData, Link, LinkKind, Node, NodeKind};
pub use load::load_graph;
