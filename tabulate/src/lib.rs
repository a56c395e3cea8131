//!
//! Turns a DAG of nodes, each contributing header/value attribute groups, into a
//! rectangular table with one row per source-to-sink path.
//!
//! A table is built in 4 steps:
//! 1. Compute a feasible flow (every edge at least 1, interior nodes balanced) with [`FlowInitialiser`].
//! 2. Lower it to the minimum flow and split it into a minimum path cover with [`MinFlowCalculator`].
//! 3. Optionally, assign nodes to layers so that each layer holds a single node type.
//! 4. Merge the attribute groups of every path, layer by layer, into nested columns.
//!
//! Nodes are only ever seen through the [`NodeGraph`] trait, so any arena or
//! adjacency structure can be tabulated as long as it can hand out [`NodeId`]s.

/// typed node ids
mod id;
pub use id::NodeId;

/// the node contract consumed by everything else
mod node;
pub use node::{AttributeGroup, NodeGraph};

/// flow bookkeeping, initial flow and min-flow/path cover
mod flow;
pub use flow::{FlowInitialiser, FlowManager, InitialFlow, MinFlowCalculator};

mod layers;
pub use layers::{Layers, LayersBuilder};

/// nested columns, filled one row at a time
mod contents;
pub use contents::{StructuredTable, TableContents};

mod builder;
pub use builder::{Table, TableBuilder};

/// graphviz export
mod dot;
pub use dot::Dot;

#[cfg(test)]
mod test_graph;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "Negative deficit at {node} while balancing flow backwards \
        (inputs and outputs of the graph are probably inconsistent)"
    )]
    NegativeDeficit { node: String },
    #[error("Node {0} does not belong to this graph")]
    UnknownNode(usize),
}
