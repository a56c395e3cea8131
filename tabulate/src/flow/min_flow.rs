use colored::Colorize;

use util::HashSet;

use super::{FlowInitialiser, FlowManager, InitialFlow};
use crate::{Error, NodeGraph, NodeId};

/// Minimum flow over the graph connected to a set of seeds, where every edge must
/// carry at least 1, and its decomposition into a minimum path cover.
///
/// Starting from an [`InitialFlow`], we look for source-to-sink paths where every
/// edge carries more than 1 and lower the whole path by its smallest slack,
/// until no such path is left.
pub struct MinFlowCalculator<'g, G> {
    graph: &'g G,
    flows: FlowManager,
    start_nodes: Vec<NodeId>,
    end_nodes: Vec<NodeId>,
}

impl<'g, G: NodeGraph> MinFlowCalculator<'g, G> {
    /// Compute the minimum flow for everything reachable from `seeds`.
    pub fn calculate(graph: &'g G, seeds: &[NodeId]) -> Result<Self, Error> {
        let InitialFlow {
            flows,
            start_nodes,
            end_nodes,
        } = FlowInitialiser::new(graph).initialise(seeds)?;

        let mut calc = Self {
            graph,
            flows,
            start_nodes,
            end_nodes,
        };
        calc.minimise();
        Ok(calc)
    }

    /// The minimum flow. Not consumed by [`Self::min_path_cover`].
    pub fn flows(&self) -> &FlowManager {
        &self.flows
    }

    pub fn start_nodes(&self) -> &[NodeId] {
        &self.start_nodes
    }

    pub fn end_nodes(&self) -> &[NodeId] {
        &self.end_nodes
    }

    /// Total flow leaving the sources, i.e. the number of paths in the cover.
    pub fn total_flow(&self) -> i32 {
        self.start_nodes
            .iter()
            .map(|&s| {
                let out: i32 = self.graph.outputs(s).iter().map(|&o| self.flows.get_flow(s, o)).sum();
                // an isolated source still makes a path of its own.
                if self.graph.is_sink(s) {
                    1
                } else {
                    out
                }
            })
            .sum()
    }

    fn minimise(&mut self) {
        let mut npaths = 0;
        while let Some((path, slack)) = self.find_decreasing_path() {
            log::trace!("decreasing path of {} nodes by {slack}", path.len());
            for pair in path.windows(2) {
                self.flows.increase_flow(pair[0], pair[1], -slack);
            }
            npaths += 1;
        }
        log::debug!(
            "minimum flow {} found after {npaths} decreasing paths",
            self.total_flow()
        );
    }

    /// First path (sources tried in natural order) from a source to a sink where every
    /// edge carries more than 1, together with the smallest `flow - 1` along it.
    fn find_decreasing_path(&self) -> Option<(Vec<NodeId>, i32)> {
        self.start_nodes
            .iter()
            .find_map(|&source| self.decreasing_path_from(source))
    }

    fn decreasing_path_from(&self, source: NodeId) -> Option<(Vec<NodeId>, i32)> {
        let graph = self.graph;
        // nodes with no way to a sink through slack edges. Valid for the whole search,
        // since flows don't change until a path is returned.
        let mut dead_ends: HashSet<NodeId> = HashSet::default();
        // (node, index of the next output to try)
        let mut stack: Vec<(NodeId, usize)> = vec![(source, 0)];

        while let Some(top) = stack.last_mut() {
            let (node, next) = *top;
            let outputs = graph.outputs(node);
            if outputs.is_empty() {
                if stack.len() == 1 {
                    // isolated source: no edges to lower
                    return None;
                }
                let path: Vec<NodeId> = stack.iter().map(|&(n, _)| n).collect();
                let slack = path
                    .windows(2)
                    .map(|pair| self.flows.get_flow(pair[0], pair[1]) - 1)
                    .min()?;
                return Some((path, slack));
            }

            let candidate = outputs[next..].iter().position(|&out| {
                !dead_ends.contains(&out) && self.flows.get_flow(node, out) > 1
            });
            match candidate {
                Some(offset) => {
                    top.1 = next + offset + 1;
                    stack.push((outputs[next + offset], 0));
                }
                None => {
                    dead_ends.insert(node);
                    stack.pop();
                }
            }
        }
        None
    }

    /// Split the minimum flow into source-to-sink paths: each edge is walked
    /// exactly as many times as its flow. Isolated sources are one-node paths.
    pub fn min_path_cover(&self) -> Vec<Vec<NodeId>> {
        let mut flows = self.flows.clone();
        let mut paths = Vec::new();
        for &source in &self.start_nodes {
            if self.graph.is_sink(source) {
                paths.push(vec![source]);
                continue;
            }
            while let Some(path) = self.next_cover_path(&mut flows, source) {
                log::trace!(
                    "path {}: {}",
                    paths.len() + 1,
                    self.graph.label(source).cyan()
                );
                paths.push(path);
            }
        }
        log::debug!("{} paths in cover", paths.len());
        paths
    }

    /// Follow the first output still carrying flow from `source` down to a sink,
    /// consuming one unit on every edge taken.
    fn next_cover_path(&self, flows: &mut FlowManager, source: NodeId) -> Option<Vec<NodeId>> {
        let mut path = vec![source];
        let mut node = source;
        loop {
            let outputs = self.graph.outputs(node);
            if outputs.is_empty() {
                return Some(path);
            }
            let next = outputs.iter().copied().find(|&out| flows.get_flow(node, out) > 0);
            let Some(next) = next else {
                if node != source {
                    log::warn!(
                        "flow stops at {} before reaching a sink",
                        self.graph.label(node)
                    );
                }
                return None;
            };
            flows.increase_flow(node, next, -1);
            path.push(next);
            node = next;
        }
    }
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::MinFlowCalculator;
    use crate::test_graph::TestGraph;
    use crate::{NodeGraph, NodeId};

    proptest! {
        #[test]
        fn min_flow_is_balanced_and_minimal(
            nnodes in 1usize..24,
            edges in prop::collection::vec((0usize..24, 0usize..24), 0..48),
        ) {
            let g = TestGraph::random(nnodes, &edges, 3, &[]);
            let seeds: Vec<NodeId> = (0..nnodes).map(|i| NodeId::from(i)).collect();
            let calc = MinFlowCalculator::calculate(&g, &seeds).unwrap();
            let flows = calc.flows();

            for (from, to) in g.edges() {
                prop_assert!(flows.get_flow(from, to) >= 1);
            }
            for &n in &seeds {
                if !g.is_source(n) && !g.is_sink(n) {
                    prop_assert_eq!(0, flows.get_deficit(n));
                }
            }

            // no slack path left
            for &source in calc.start_nodes() {
                let mut stack = vec![source];
                while let Some(n) = stack.pop() {
                    for &out in g.outputs(n) {
                        if flows.get_flow(n, out) > 1 {
                            prop_assert!(!g.is_sink(out));
                            stack.push(out);
                        }
                    }
                }
            }

            // every node shows up in the cover, which walks each edge `flow` times
            let cover = calc.min_path_cover();
            let mut walked = util::HashMap::default();
            let mut seen = util::HashSet::default();
            for path in &cover {
                seen.extend(path.iter().copied());
                for pair in path.windows(2) {
                    *walked.entry((pair[0], pair[1])).or_insert(0) += 1;
                }
            }
            prop_assert_eq!(nnodes, seen.len());
            for (from, to) in g.edges() {
                prop_assert_eq!(flows.get_flow(from, to), walked.get(&(from, to)).copied().unwrap_or(0));
            }
            prop_assert_eq!(calc.total_flow() as usize, cover.len());
        }
    }
}
