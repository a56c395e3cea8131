//! In-memory graphs for unit tests.

use util::{HashMap, IdVec};

use crate::{AttributeGroup, NodeGraph, NodeId};

#[derive(Debug, Default)]
struct TestNode {
    groups: Vec<AttributeGroup>,
    node_type: Option<String>,
    order: i32,
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
}

/// Minimal [`NodeGraph`]: typed nodes added by hand, or single-letter nodes
/// keyed by column and added in chains.
#[derive(Debug, Default)]
pub struct TestGraph {
    nodes: IdVec<NodeId, TestNode>,
    by_key: HashMap<(usize, char), NodeId>,
}

impl TestGraph {
    /// Node with a single group; its type is the group header.
    pub fn add(&mut self, header: &str, value: &str, order: i32) -> NodeId {
        self.add_groups(vec![AttributeGroup::new(header, value)], order)
    }

    pub fn add_groups(&mut self, groups: Vec<AttributeGroup>, order: i32) -> NodeId {
        let node_type = groups.first().map(|g| g.header.clone());
        self.nodes.push(TestNode {
            groups,
            node_type,
            order,
            ..Default::default()
        })
    }

    pub fn add_empty(&mut self) -> NodeId {
        self.nodes.push(TestNode {
            order: -1,
            ..Default::default()
        })
    }

    pub fn link(&mut self, from: NodeId, to: NodeId) {
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
    }

    /// Node labelled `letter` in `column`, created on first use with
    /// a single "Foo Header {column}" group.
    pub fn node(&mut self, column: usize, letter: char) -> NodeId {
        if let Some(&id) = self.by_key.get(&(column, letter)) {
            return id;
        }
        let id = self.add(&format!("Foo Header {column}"), &letter.to_string(), -1);
        self.by_key.insert((column, letter), id);
        id
    }

    /// Link consecutive letters, placing each one column to the right of the previous.
    pub fn add_chain(&mut self, start_column: usize, letters: &str) {
        let letters: Vec<char> = letters.chars().collect();
        for (i, pair) in letters.windows(2).enumerate() {
            let from = self.node(start_column + i, pair[0]);
            let to = self.node(start_column + i + 1, pair[1]);
            self.link(from, to);
        }
    }

    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.nodes
            .enumerate()
            .flat_map(|(id, node)| node.outputs.iter().map(move |&out| (id, out)))
            .collect()
    }

    /// A random DAG: edges only go from lower to higher ids, types cycle through
    /// `ntypes` headers and node `i` gets order hint `orders[i]` (-1 past the end).
    pub fn random(
        nnodes: usize,
        edges: &[(usize, usize)],
        ntypes: usize,
        orders: &[i32],
    ) -> Self {
        let mut g = Self::default();
        for i in 0..nnodes {
            let t = i % ntypes.max(1);
            let order = orders.get(i).copied().unwrap_or(-1);
            g.add(&format!("Type {t}"), &format!("n{i:03}"), order);
        }
        for &(a, b) in edges {
            let (a, b) = (a % nnodes, b % nnodes);
            if a != b {
                g.link(NodeId::from(a.min(b)), NodeId::from(a.max(b)));
            }
        }
        g
    }

    /// G1: chains merging into C and forking again at D.
    pub fn g1() -> Self {
        let mut g = Self::default();
        g.add_chain(0, "ACDEF");
        g.add_chain(0, "BC");
        g.add_chain(2, "DGH");
        g.add_chain(3, "GI");
        g
    }

    pub fn g2() -> Self {
        let mut g = Self::default();
        g.add_chain(0, "FEDCA");
        g.add_chain(0, "HGDCB");
        g.add_chain(0, "IGD");
        g
    }

    pub fn g3() -> Self {
        let mut g = Self::default();
        g.add_chain(0, "ACGIKMQR");
        g.add_chain(0, "ADGIKNQT");
        g.add_chain(0, "BEHILOSU");
        g.add_chain(0, "BFHILPS");
        g
    }

    pub fn g4() -> Self {
        let mut g = Self::default();
        for chain in ["ABCDE", "AGHIE", "FGKIE", "MGKLJ", "MGKLP", "MGNOP", "MQRSP"] {
            g.add_chain(0, chain);
        }
        g
    }

    pub fn g5() -> Self {
        let mut g = Self::default();
        g.add_chain(0, "ABCD");
        g.add_chain(0, "AEC");
        g.add_chain(1, "ECD");
        g.add_chain(1, "EFD");
        g.add_chain(2, "FG");
        g.add_chain(2, "FK");
        g.add_chain(0, "HE");
        g.add_chain(0, "HIJK");
        g.add_chain(2, "JO");
        g.add_chain(0, "LMNO");
        g
    }

    /// G6: two isolated nodes.
    pub fn g6() -> Self {
        let mut g = Self::default();
        g.node(0, 'A');
        g.node(0, 'B');
        g
    }
}

impl NodeGraph for TestGraph {
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
