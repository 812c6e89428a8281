mod index;
mod load;
mod model;
mod parse;

pub use index::GraphIndex;
pub use load::{ClusterAlgorithm, ClusterSource, load_snapshot};
pub use model::{ClusterAssignment, ClusterId, GraphSnapshot, Node, NodeId, NodeKind};

#[cfg(test)]
pub(crate) mod fixtures;
