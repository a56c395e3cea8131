use colored::Colorize;

use util::HashSet;

use super::FlowManager;
use crate::node::sort_nodes;
use crate::{Error, NodeGraph, NodeId};

/// A feasible flow: every edge reachable from the start nodes carries at least 1,
/// every node with both inputs and outputs is balanced.
#[derive(Debug, Clone)]
pub struct InitialFlow {
    pub flows: FlowManager,
    /// Sources reachable backwards from the seeds, in natural order.
    pub start_nodes: Vec<NodeId>,
    /// Sinks reachable forwards from the start nodes, in natural order.
    /// Isolated nodes show up here as well as in `start_nodes`.
    pub end_nodes: Vec<NodeId>,
}

/// Builds an [`InitialFlow`] in two passes:
/// 1. Walk forward from every source, putting 1 on each untouched edge and pushing any
///    surplus inflow to the outputs. Nodes left with more outflow than inflow are queued.
/// 2. Pop the queued nodes (last first) and pull their missing inflow from the inputs,
///    walking backwards until everything is balanced.
///
/// Inflow is only ever pulled from nodes the forward pass reached, so every unit of
/// flow can be traced back to a start node.
pub struct FlowInitialiser<'g, G> {
    graph: &'g G,
    flows: FlowManager,
    // nodes downstream of (or at) a start node
    reached: HashSet<NodeId>,
    end_nodes: Vec<NodeId>,
    seen_ends: HashSet<NodeId>,
    review: Vec<NodeId>,
}

impl<'g, G: NodeGraph> FlowInitialiser<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self {
            graph,
            flows: FlowManager::new(),
            reached: HashSet::default(),
            end_nodes: Vec::new(),
            seen_ends: HashSet::default(),
            review: Vec::new(),
        }
    }

    /// Run both passes over the part of the graph connected to `seeds`.
    pub fn initialise(mut self, seeds: &[NodeId]) -> Result<InitialFlow, Error> {
        let start_nodes = self.start_nodes(seeds);
        log::debug!("{} start nodes", start_nodes.len());

        for &start in &start_nodes {
            self.balance_right(start);
        }
        log::debug!("{} nodes queued for backward balancing", self.review.len());

        while let Some(node) = self.review.pop() {
            self.balance_left(node)?;
        }

        let mut end_nodes = self.end_nodes;
        sort_nodes(self.graph, &mut end_nodes);
        Ok(InitialFlow {
            flows: self.flows,
            start_nodes,
            end_nodes,
        })
    }

    /// Every source upstream of the seeds (a seed with no inputs is its own source).
    fn start_nodes(&self, seeds: &[NodeId]) -> Vec<NodeId> {
        let mut visited = HashSet::default();
        let mut stack: Vec<NodeId> = seeds.to_vec();
        let mut sources = Vec::new();
        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            let inputs = self.graph.inputs(node);
            if inputs.is_empty() {
                sources.push(node);
            } else {
                stack.extend_from_slice(inputs);
            }
        }
        sort_nodes(self.graph, &mut sources);
        sources
    }

    // FORWARD PASS ////////////

    fn balance_right(&mut self, start: NodeId) {
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            self.reached.insert(node);
            if self.visit_right(node) {
                stack.extend(self.graph.outputs(node).iter().rev());
            }
        }
    }

    /// Balance `node` against its outputs; true if the walk must go on to them.
    fn visit_right(&mut self, node: NodeId) -> bool {
        let graph = self.graph;
        let outputs = graph.outputs(node);
        if outputs.is_empty() {
            if self.seen_ends.insert(node) {
                log::trace!("end node {}", graph.label(node).cyan());
                self.end_nodes.push(node);
            }
            return false;
        }

        let mut changed = false;
        for &out in outputs {
            if self.flows.get_flow(node, out) == 0 {
                self.flows.set_flow(node, out, 1);
                changed = true;
            }
        }

        let deficit = self.flows.get_deficit(node);
        // nothing new reached this node, so what's downstream is already consistent.
        if !changed && deficit == 0 {
            return false;
        }

        if deficit > 0 && !graph.inputs(node).is_empty() {
            log::trace!("{} short of {deficit} inflow", graph.label(node).cyan());
            self.review.push(node);
        } else if deficit < 0 {
            self.spread(node, outputs, -deficit, Direction::Right);
        }
        true
    }

    // BACKWARD PASS ////////////

    fn balance_left(&mut self, start: NodeId) -> Result<(), Error> {
        let graph = self.graph;
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            let deficit = self.flows.get_deficit(node);
            if deficit == 0 {
                continue;
            }
            if deficit < 0 {
                return Err(Error::NegativeDeficit {
                    node: graph.label(node),
                });
            }
            let inputs: Vec<NodeId> = graph
                .inputs(node)
                .iter()
                .copied()
                .filter(|input| self.reached.contains(input))
                .collect();
            if inputs.is_empty() {
                continue;
            }
            self.spread(node, &inputs, deficit, Direction::Left);
            stack.extend(inputs.iter().rev());
        }
        Ok(())
    }

    /// Split `amount` over the edges between `node` and `peers`: each gets
    /// `amount / peers.len()`, the first `amount % peers.len()` get one more.
    fn spread(&mut self, node: NodeId, peers: &[NodeId], amount: i32, dir: Direction) {
        let npeers = peers.len() as i32;
        let (quotient, remainder) = (amount / npeers, amount % npeers);
        for (i, &peer) in peers.iter().enumerate() {
            let delta = quotient + i32::from((i as i32) < remainder);
            if delta == 0 {
                break;
            }
            match dir {
                Direction::Right => self.flows.increase_flow(node, peer, delta),
                Direction::Left => self.flows.increase_flow(peer, node, delta),
            };
        }
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Left,
    Right,
}
