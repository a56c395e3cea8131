use anyhow::Result;

use tabulate::{AttributeGroup, NodeId};
use util::HashMap;

use crate::{Error, Graph};

/// Creates nodes, filling in their type and order hint.
///
/// A node's type defaults to the header of its first attribute group,
/// and its order hint to the one registered for that type (or -1).
#[derive(Debug, Default, Clone)]
pub struct NodeFactory {
    // keyed by trimmed, lowercased type
    orders: HashMap<String, i32>,
}

impl NodeFactory {
    /// A factory with no registered orders: every node is unordered unless told otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    /// The usual ordering of material and data nodes in ISA-Tab/MAGE-TAB pipelines.
    pub fn isatab() -> Self {
        let mut factory = Self::new();
        for (order, node_type) in [
            "Source Name",
            "Sample Name",
            "Extract Name",
            "Labeled Extract Name",
            "Assay Name",
            "Data File Name",
        ]
        .into_iter()
        .enumerate()
        {
            factory.set_order(node_type, order as i32);
        }
        factory
    }

    /// Factory for a named preset: `isatab` or `none`.
    pub fn preset(name: &str) -> Result<Self> {
        match name {
            "isatab" => Ok(Self::isatab()),
            "none" => Ok(Self::new()),
            _ => Err(Error::UnknownPreset(name.to_owned()).into()),
        }
    }

    pub fn set_order(&mut self, node_type: &str, order: i32) {
        self.orders.insert(key(node_type), order);
    }

    pub fn order_of(&self, node_type: &str) -> Option<i32> {
        self.orders.get(&key(node_type)).copied()
    }

    /// Add a node to `graph`. Explicit `node_type` and `order` win over the defaults.
    pub fn create(
        &self,
        graph: &mut Graph,
        name: &str,
        groups: Vec<AttributeGroup>,
        node_type: Option<&str>,
        order: Option<i32>,
    ) -> Result<NodeId> {
        let node_type = node_type
            .or_else(|| groups.first().map(|g| g.header.as_str()))
            .map(str::to_owned);
        let order = order
            .or_else(|| node_type.as_deref().and_then(|t| self.order_of(t)))
            .unwrap_or(-1);
        log::trace!("node {name}: type {node_type:?}, order {order}");
        graph.add_node(name, groups, node_type, order)
    }
}

fn key(node_type: &str) -> String {
    node_type.trim().to_lowercase()
}
