use util::HashMap;

use crate::NodeId;

/// Sparse flow bookkeeping over the edges of a graph.
///
/// Every change of an edge's flow is mirrored in the deficits of both of its ends,
/// so that `deficit(n) == outflow(n) - inflow(n)` holds at all times.
/// Nothing here checks that flows stay non-negative: that's up to the callers.
#[derive(Debug, Clone, Default)]
pub struct FlowManager {
    flows: HashMap<(NodeId, NodeId), i32>,
    deficits: HashMap<NodeId, i32>,
}

impl FlowManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flow on `from -> to`, 0 for an edge never touched.
    #[inline]
    pub fn get_flow(&self, from: NodeId, to: NodeId) -> i32 {
        self.flows.get(&(from, to)).copied().unwrap_or(0)
    }

    /// Outflow minus inflow at `node`.
    #[inline]
    pub fn get_deficit(&self, node: NodeId) -> i32 {
        self.deficits.get(&node).copied().unwrap_or(0)
    }

    /// Add `delta` (possibly negative) to the flow on `from -> to`; returns the new flow.
    pub fn increase_flow(&mut self, from: NodeId, to: NodeId, delta: i32) -> i32 {
        let flow = self.flows.entry((from, to)).or_insert(0);
        *flow += delta;
        let flow = *flow;
        *self.deficits.entry(from).or_insert(0) += delta;
        *self.deficits.entry(to).or_insert(0) -= delta;
        log::trace!("flow {from} -> {to} {delta:+} = {flow}");
        flow
    }

    /// Set the flow on `from -> to`; returns the change that was applied.
    pub fn set_flow(&mut self, from: NodeId, to: NodeId, flow: i32) -> i32 {
        let delta = flow - self.get_flow(from, to);
        if delta != 0 {
            self.increase_flow(from, to, delta);
        }
        delta
    }

    /// All edges carrying a non-zero flow, in no particular order.
    pub fn edges(&self) -> impl Iterator<Item = ((NodeId, NodeId), i32)> + '_ {
        self.flows
            .iter()
            .filter(|(_, &flow)| flow != 0)
            .map(|(&edge, &flow)| (edge, flow))
    }
}
