//! Layering assigns every node a column group ("layer") such that each edge goes
//! from a lower layer to a higher one and every layer holds nodes of a single type.
//!
//! It works in two steps:
//! 1. Untyped layering: `layer(n) = 1 + max(layer(input))`, sources at 0.
//! 2. Typed adjustment: walk layers left to right; in a layer mixing types, decide
//!    from the order hints which nodes stay and push the others one layer to the right,
//!    dragging their descendants along when they'd otherwise collide.

use std::collections::BTreeMap;
use std::fmt::Write;

use colored::Colorize;

use util::{HashSet, IdVec};

use crate::node::type_key;
use crate::{NodeGraph, NodeId};

/// Final layer assignment, as computed by [`LayersBuilder`].
#[derive(Debug, Clone)]
pub struct Layers {
    layer_of: IdVec<NodeId, Option<usize>>,
    nodes_of: BTreeMap<usize, Vec<NodeId>>,
}

impl Layers {
    /// Layer of `node`, if it was reached from the end nodes.
    pub fn layer(&self, node: NodeId) -> Option<usize> {
        self.layer_of.try_get(node).copied().flatten()
    }

    /// Nodes in `layer`, in natural order. Empty for unoccupied layers.
    pub fn nodes(&self, layer: usize) -> &[NodeId] {
        self.nodes_of.get(&layer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Highest occupied layer, or `None` if nothing was layered.
    pub fn max_layer(&self) -> Option<usize> {
        self.nodes_of.keys().next_back().copied()
    }

    /// Occupied layers in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[NodeId])> + '_ {
        self.nodes_of.iter().map(|(&layer, nodes)| (layer, nodes.as_slice()))
    }

    /// Text dump of the layering, for debugging.
    pub fn dump<G: NodeGraph>(&self, graph: &G) -> String {
        let mut out = String::new();
        for (layer, nodes) in self.iter() {
            let _ = writeln!(out, "LAYER {layer}:");
            out.push_str(" ");
            for &node in nodes {
                let _ = write!(out, " {}", graph.label(node));
            }
            out.push_str("\n\n");
        }
        out
    }
}

pub struct LayersBuilder<'g, G> {
    graph: &'g G,
    layer_of: IdVec<NodeId, Option<usize>>,
    nodes_of: BTreeMap<usize, Vec<NodeId>>,
}

impl<'g, G: NodeGraph> LayersBuilder<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self {
            graph,
            layer_of: IdVec::fill(None, graph.node_count()),
            nodes_of: BTreeMap::new(),
        }
    }

    /// Layer everything upstream of `end_nodes` (usually the sinks found by the flow
    /// computation).
    pub fn build(mut self, end_nodes: &[NodeId]) -> Layers {
        self.compute_untyped(end_nodes);
        log::debug!(
            "untyped layering: {} layers",
            self.max_layer().map_or(0, |l| l + 1)
        );
        self.compute_typed();
        log::debug!(
            "typed layering: {} layers",
            self.max_layer().map_or(0, |l| l + 1)
        );
        Layers {
            layer_of: self.layer_of,
            nodes_of: self.nodes_of,
        }
    }

    fn max_layer(&self) -> Option<usize> {
        self.nodes_of.keys().next_back().copied()
    }

    /// Move `node` to `layer`, keeping both indexes in sync.
    fn set_layer(&mut self, node: NodeId, layer: usize) {
        let graph = self.graph;
        if let Some(old) = self.layer_of[node] {
            if let Some(nodes) = self.nodes_of.get_mut(&old) {
                nodes.retain(|&n| n != node);
                if nodes.is_empty() {
                    self.nodes_of.remove(&old);
                }
            }
        }
        let nodes = self.nodes_of.entry(layer).or_default();
        if let Err(pos) = nodes.binary_search_by(|&probe| graph.compare(probe, node)) {
            nodes.insert(pos, node);
        }
        self.layer_of[node] = Some(layer);
    }

    // UNTYPED ///////////////

    fn compute_untyped(&mut self, end_nodes: &[NodeId]) {
        let graph = self.graph;
        for &end in end_nodes {
            // (node, inputs already layered)
            let mut stack = vec![(end, false)];
            while let Some((node, ready)) = stack.pop() {
                if self.layer_of[node].is_some() {
                    continue;
                }
                let inputs = graph.inputs(node);
                if ready {
                    let layer = inputs
                        .iter()
                        .filter_map(|&i| self.layer_of[i])
                        .max()
                        .map_or(0, |l| l + 1);
                    self.set_layer(node, layer);
                } else {
                    stack.push((node, true));
                    for &input in inputs.iter().rev() {
                        if self.layer_of[input].is_none() {
                            stack.push((input, false));
                        }
                    }
                }
            }
        }
    }

    // TYPED ///////////////

    fn compute_typed(&mut self) {
        let mut layer = 0;
        while let Some(max) = self.max_layer() {
            if layer > max {
                break;
            }
            self.homogenise(layer);
            layer += 1;
        }
    }

    /// Push nodes out of `layer` until its remaining nodes share a type.
    fn homogenise(&mut self, layer: usize) {
        loop {
            let Some(nodes) = self.nodes_of.get(&layer).cloned() else {
                return;
            };
            if self.same_type(&nodes) {
                return;
            }
            for node in self.nodes_to_push(layer, &nodes) {
                self.push_right(node);
            }
        }
    }

    fn same_type(&self, nodes: &[NodeId]) -> bool {
        let mut types = nodes.iter().map(|&n| type_key(self.graph.node_type(n)));
        match types.next() {
            Some(first) => types.all(|t| t == first),
            None => true,
        }
    }

    /// Decide which nodes leave a mixed layer. Never empty for a mixed layer.
    ///
    /// The node(s) with the smallest order hint normally stay. Unordered (-1) nodes of
    /// another type are pushed when the layer is closer, in order terms, to its left
    /// neighbour; otherwise the smallest-order nodes are pushed and unordered ones stay.
    fn nodes_to_push(&self, layer: usize, nodes: &[NodeId]) -> Vec<NodeId> {
        let graph = self.graph;
        let order = |n: NodeId| graph.order_hint(n);
        let min_order = nodes.iter().map(|&n| order(n)).filter(|&o| o >= 0).min();

        let min_type = match min_order {
            Some(m) => nodes.iter().find(|&&n| order(n) == m),
            None => nodes.first(),
        }
        .map(|&n| type_key(graph.node_type(n)))
        .unwrap_or_default();

        let closer_to_right = match min_order {
            Some(m) => match (self.nearest_order_left(layer), self.nearest_order_right(layer)) {
                (Some(left), Some(right)) => right - m < m - left,
                _ => true,
            },
            None => true,
        };
        let has_unordered = nodes.iter().any(|&n| order(n) < 0);

        log::trace!(
            "layer {layer}: min order {min_order:?} ({}), leaning {}",
            min_type.cyan(),
            if closer_to_right { "right" } else { "left" }
        );

        let other_type = |n: NodeId| type_key(graph.node_type(n)) != min_type;
        let to_push: Vec<NodeId> = nodes
            .iter()
            .copied()
            .filter(|&n| {
                let o = order(n);
                match min_order {
                    None => other_type(n),
                    Some(m) => {
                        o > m
                            || (o < 0 && !closer_to_right && other_type(n))
                            || (o == m && closer_to_right && has_unordered)
                    }
                }
            })
            .collect();
        if !to_push.is_empty() {
            return to_push;
        }

        // different types sharing the smallest order: keep min_type, push the rest
        log::warn!(
            "layer {layer}: order hints can't separate {}",
            nodes
                .iter()
                .map(|&n| graph.label(n))
                .collect::<Vec<_>>()
                .join(", ")
        );
        nodes.iter().copied().filter(|&n| other_type(n)).collect()
    }

    /// Smallest non-negative order hint in the nearest layer on the left that has one.
    fn nearest_order_left(&self, layer: usize) -> Option<i32> {
        self.nodes_of
            .range(..layer)
            .rev()
            .find_map(|(_, nodes)| self.min_order(nodes))
    }

    fn nearest_order_right(&self, layer: usize) -> Option<i32> {
        self.nodes_of
            .range(layer + 1..)
            .find_map(|(_, nodes)| self.min_order(nodes))
    }

    fn min_order(&self, nodes: &[NodeId]) -> Option<i32> {
        nodes
            .iter()
            .map(|&n| self.graph.order_hint(n))
            .filter(|&o| o >= 0)
            .min()
    }

    /// Move `node` one layer right, then move each descendant that would now sit at or
    /// left of its parent one layer right too.
    fn push_right(&mut self, node: NodeId) {
        let graph = self.graph;
        let mut visited = HashSet::default();
        // (node, new layer of the parent that pushed it)
        let mut stack: Vec<(NodeId, Option<usize>)> = vec![(node, None)];
        while let Some((n, parent_layer)) = stack.pop() {
            if visited.contains(&n) {
                continue;
            }
            let Some(old) = self.layer_of[n] else {
                continue;
            };
            if matches!(parent_layer, Some(parent) if old > parent) {
                continue;
            }
            let new = old + 1;
            log::trace!("{} -> layer {new}", graph.label(n));
            self.set_layer(n, new);
            visited.insert(n);
            for &out in graph.outputs(n).iter().rev() {
                stack.push((out, Some(new)));
            }
        }
    }
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::LayersBuilder;
    use crate::node::type_key;
    use crate::test_graph::TestGraph;
    use crate::{NodeGraph, NodeId};

    proptest! {
        #[test]
        fn layers_are_valid_and_homogeneous(
            nnodes in 1usize..24,
            edges in prop::collection::vec((0usize..24, 0usize..24), 0..48),
            ntypes in 1usize..5,
            orders in prop::collection::vec(-1i32..4, 24),
        ) {
            let g = TestGraph::random(nnodes, &edges, ntypes, &orders);
            let sinks: Vec<NodeId> = (0..nnodes)
                .map(|i| NodeId::from(i))
                .filter(|&n| g.is_sink(n))
                .collect();
            let layers = LayersBuilder::new(&g).build(&sinks);

            for i in 0..nnodes {
                prop_assert!(layers.layer(NodeId::from(i)).is_some());
            }
            for (from, to) in g.edges() {
                prop_assert!(layers.layer(from) < layers.layer(to));
            }
            for (_, nodes) in layers.iter() {
                prop_assert!(!nodes.is_empty());
                let first = type_key(g.node_type(nodes[0]));
                for &n in nodes {
                    prop_assert_eq!(&first, &type_key(g.node_type(n)));
                }
            }
        }
    }
}
