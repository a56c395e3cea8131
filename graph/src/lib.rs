//!
//! A concrete [`tabulate::NodeGraph`]: nodes live in an arena, are addressed by name
//! in graph files, and get their type and order hint from a [`NodeFactory`].

mod graph;
pub use graph::Graph;

mod factory;
pub use factory::NodeFactory;

/// building a graph from parsed `.g2t` items
mod load;
pub use load::{load, Loaded};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Node \"{0}\" is defined more than once")]
    DuplicateNode(String),
    #[error("Node \"{0}\" is not defined")]
    NodeNotFound(String),
    #[error("Node id {0} does not belong to this graph")]
    UnknownId(usize),
    #[error("Node \"{0}\" can't link to itself")]
    SelfLink(String),
    #[error("Unknown property \"{1}\" on node \"{0}\"; expected \"type\" or \"order\"")]
    UnknownProperty(String, String),
    #[error("Property \"{1}\" of node \"{0}\" has an invalid value: '{2}'")]
    BadProperty(String, String, String),
    #[error("Unknown order preset \"{0}\"; expected \"isatab\" or \"none\"")]
    UnknownPreset(String),
}
