use std::cmp::Ordering;

use crate::NodeId;

/// A header/value pair contributed by a node to the output table,
/// with nested children (e.g. a "Term Source REF" under a characteristic).
/// Children keep their insertion order through every merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeGroup {
    pub header: String,
    pub value: String,
    pub children: Vec<AttributeGroup>,
}

impl AttributeGroup {
    pub fn new(header: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            value: value.into(),
            children: Vec::new(),
        }
    }

    /// Append a nested group.
    pub fn with_child(mut self, child: AttributeGroup) -> Self {
        self.children.push(child);
        self
    }

    /// Number of columns this group spans once flattened.
    pub fn width(&self) -> usize {
        1 + self.children.iter().map(Self::width).sum::<usize>()
    }
}

/// Read-only view of a DAG whose nodes can be turned into table rows.
///
/// Nodes are addressed by [`NodeId`]; `inputs` and `outputs` must be mirror images of
/// each other (if `b` is in `outputs(a)` then `a` is in `inputs(b)`) and both must be
/// sorted by [`NodeGraph::compare`]. Everything the table builder computes is derived
/// from these methods only.
pub trait NodeGraph {
    /// Number of ids handed out by this graph; valid ids are `0..node_count()`.
    fn node_count(&self) -> usize;

    fn inputs(&self, node: NodeId) -> &[NodeId];

    fn outputs(&self, node: NodeId) -> &[NodeId];

    /// Equality key used by layering. Usually the header of the node's first group.
    fn node_type(&self, node: NodeId) -> Option<&str>;

    /// Rank used to break layering ties; `-1` means "don't care".
    fn order_hint(&self, node: NodeId) -> i32;

    fn attribute_groups(&self, node: NodeId) -> &[AttributeGroup];

    /// Human readable name, for logs and diagnostics.
    fn label(&self, node: NodeId) -> String {
        match self.attribute_groups(node).first() {
            Some(group) => format!("{}: {}", group.header, group.value),
            None => node.to_string(),
        }
    }

    fn contains(&self, node: NodeId) -> bool {
        usize::from(node) < self.node_count()
    }

    fn is_source(&self, node: NodeId) -> bool {
        self.inputs(node).is_empty()
    }

    fn is_sink(&self, node: NodeId) -> bool {
        self.outputs(node).is_empty()
    }

    /// Natural node order: the value of the first attribute group, compared
    /// case-insensitively (nodes without groups first), then node identity.
    fn compare(&self, a: NodeId, b: NodeId) -> Ordering {
        let first_value = |n| self.attribute_groups(n).first().map(|g| g.value.as_str());
        let by_value = match (first_value(a), first_value(b)) {
            (Some(va), Some(vb)) => va
                .chars()
                .flat_map(char::to_lowercase)
                .cmp(vb.chars().flat_map(char::to_lowercase)),
            (va, vb) => va.is_some().cmp(&vb.is_some()),
        };
        by_value.then(a.cmp(&b))
    }
}

/// Sort `nodes` by natural order and drop duplicates.
pub(crate) fn sort_nodes<G: NodeGraph + ?Sized>(graph: &G, nodes: &mut Vec<NodeId>) {
    nodes.sort_by(|&a, &b| graph.compare(a, b));
    nodes.dedup();
}

/// Layering compares types trimmed and case-insensitively; a missing type is a type too.
pub(crate) fn type_key(node_type: Option<&str>) -> String {
    node_type.map(str::trim).unwrap_or_default().to_lowercase()
}
