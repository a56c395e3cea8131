use anyhow::Result;

use tabulate::{AttributeGroup, NodeGraph, NodeId};
use util::{HashMap, IdVec};

use crate::Error;

#[derive(Debug)]
struct NodeData {
    name: String,
    groups: Vec<AttributeGroup>,
    node_type: Option<String>,
    order: i32,
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
}

/// Arena of named nodes. Adjacency lists are kept sorted by natural node order,
/// and hold each neighbour at most once.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: IdVec<NodeId, NodeData>,
    names: HashMap<String, NodeId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Id of the node with the given name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Name the node was defined with.
    pub fn name(&self, node: NodeId) -> &str {
        &self.nodes[node].name
    }

    /// Nodes without inputs, in natural order.
    pub fn sources(&self) -> Vec<NodeId> {
        self.sorted(|n| n.inputs.is_empty())
    }

    /// Nodes without outputs, in natural order.
    pub fn sinks(&self) -> Vec<NodeId> {
        self.sorted(|n| n.outputs.is_empty())
    }

    fn sorted(&self, pred: impl Fn(&NodeData) -> bool) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self
            .nodes
            .enumerate()
            .filter(|(_, data)| pred(data))
            .map(|(id, _)| id)
            .collect();
        nodes.sort_by(|&a, &b| self.compare(a, b));
        nodes
    }
}

// building the graph /////////////
impl Graph {
    /// Add a node; names must be unique within the graph.
    pub fn add_node(
        &mut self,
        name: &str,
        groups: Vec<AttributeGroup>,
        node_type: Option<String>,
        order_hint: i32,
    ) -> Result<NodeId> {
        if self.names.contains_key(name) {
            return Err(Error::DuplicateNode(name.to_owned()).into());
        }
        let id = self.nodes.push(NodeData {
            name: name.to_owned(),
            groups,
            node_type,
            order: order_hint,
            inputs: Vec::new(),
            outputs: Vec::new(),
        });
        self.names.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Add an edge. Linking the same pair twice is a no-op.
    pub fn link(&mut self, from: NodeId, to: NodeId) -> Result<()> {
        for id in [from, to] {
            if !self.contains(id) {
                return Err(Error::UnknownId(id.into()).into());
            }
        }
        if from == to {
            return Err(Error::SelfLink(self.name(from).to_owned()).into());
        }
        let pos = self.nodes[from]
            .outputs
            .binary_search_by(|&probe| self.compare(probe, to));
        if let Err(pos) = pos {
            self.nodes[from].outputs.insert(pos, to);
        }
        let pos = self.nodes[to]
            .inputs
            .binary_search_by(|&probe| self.compare(probe, from));
        if let Err(pos) = pos {
            self.nodes[to].inputs.insert(pos, from);
        }
        log::trace!("linked {} -> {}", self.name(from), self.name(to));
        Ok(())
    }
}

impl NodeGraph for Graph {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn inputs(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node].inputs
    }

    fn outputs(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node].outputs
    }

    fn node_type(&self, node: NodeId) -> Option<&str> {
        self.nodes[node].node_type.as_deref()
    }

    fn order_hint(&self, node: NodeId) -> i32 {
        self.nodes[node].order
    }

    fn attribute_groups(&self, node: NodeId) -> &[AttributeGroup] {
        &self.nodes[node].groups
    }
}
