use std::fmt;

use util::{HashMap, HashSet};

use crate::{FlowManager, Layers, NodeGraph, NodeId};

// helps following edges by eye
const COLORS: [&str; 8] = [
    "black",
    "red",
    "blue",
    "magenta",
    "green",
    "orange",
    "purple",
    "turquoise",
];

/// Graphviz rendering of a flow (and of its layers, if any), for debugging.
///
/// Nodes are numbered in depth-first discovery order from the start nodes, edges are
/// labelled with their flow and every layer becomes a `rank = same` group.
pub struct Dot<'a, G> {
    graph: &'a G,
    flows: &'a FlowManager,
    start_nodes: &'a [NodeId],
    layers: Option<&'a Layers>,
}

impl<'a, G: NodeGraph> Dot<'a, G> {
    pub fn new(
        graph: &'a G,
        flows: &'a FlowManager,
        start_nodes: &'a [NodeId],
        layers: Option<&'a Layers>,
    ) -> Self {
        Self {
            graph,
            flows,
            start_nodes,
            layers,
        }
    }

    /// Id of `node`, writing its declaration the first time it's seen.
    fn dot_id(
        &self,
        f: &mut fmt::Formatter<'_>,
        ids: &mut HashMap<NodeId, usize>,
        node: NodeId,
    ) -> Result<usize, fmt::Error> {
        if let Some(&id) = ids.get(&node) {
            return Ok(id);
        }
        let id = ids.len();
        ids.insert(node, id);
        let label = self.graph.label(node).replace('"', "\\\"");
        writeln!(
            f,
            "  {id}[label = \"{label}\", style = filled, color = {}, fillcolor = white ];",
            COLORS[id % COLORS.len()]
        )?;
        Ok(id)
    }
}

impl<G: NodeGraph> fmt::Display for Dot<'_, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "strict digraph ExperimentalPipeline {{")?;
        writeln!(f, "  graph [rankdir=LR];")?;

        let mut ids = HashMap::default();
        let mut visited = HashSet::default();
        for &start in self.start_nodes {
            if !visited.insert(start) {
                continue;
            }
            self.dot_id(f, &mut ids, start)?;
            // (node, index of the next output to print)
            let mut stack = vec![(start, 0)];
            while let Some(top) = stack.last_mut() {
                let (node, next) = *top;
                let Some(&out) = self.graph.outputs(node).get(next) else {
                    stack.pop();
                    continue;
                };
                top.1 += 1;
                let from = self.dot_id(f, &mut ids, node)?;
                let to = self.dot_id(f, &mut ids, out)?;
                writeln!(
                    f,
                    "  {from} -> {to}[label = \"{}\" color = {}];",
                    self.flows.get_flow(node, out),
                    COLORS[(from + to) % COLORS.len()]
                )?;
                if visited.insert(out) {
                    stack.push((out, 0));
                }
            }
        }

        if let Some(layers) = self.layers {
            writeln!(f)?;
            for (layer, nodes) in layers.iter() {
                writeln!(f, "    // layer {layer}")?;
                write!(f, "    {{ rank = same")?;
                for id in nodes.iter().filter_map(|n| ids.get(n)) {
                    write!(f, "; {id}")?;
                }
                writeln!(f, " }}\n")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "}}")
    }
}
