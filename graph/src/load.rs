use anyhow::{Context, Result};

use syntax::ast;
use tabulate::{AttributeGroup, NodeId};

use crate::{Error, Graph, NodeFactory};

/// A graph built from a file, with the nodes to tabulate from.
#[derive(Debug)]
pub struct Loaded {
    pub graph: Graph,
    /// Seeds declared with `seed`, or every sink if there were none.
    pub seeds: Vec<NodeId>,
}

/// Build a graph from parsed items.
///
/// Items may come in any order: `order` items are applied first, then nodes are
/// created, then linked, so a link can mention a node defined further down.
pub fn load(items: Vec<ast::Item>) -> Result<Loaded> {
    let mut factory = NodeFactory::isatab();
    let mut nodes = Vec::new();
    let mut links = Vec::new();
    let mut seed_names = Vec::new();

    for item in items {
        match item {
            ast::Item::Order(spec) => apply_order(&mut factory, spec)?,
            ast::Item::Node(block) => nodes.push(block),
            ast::Item::Link(chain) => links.push(chain),
            ast::Item::Seed(names) => seed_names.extend(names),
        }
    }

    let mut graph = Graph::new();
    for block in nodes {
        add_node(&factory, &mut graph, block)?;
    }
    for chain in links {
        for pair in chain.windows(2) {
            let (from, to) = (find(&graph, pair[0])?, find(&graph, pair[1])?);
            graph
                .link(from, to)
                .with_context(|| format!("linking {} -> {}", pair[0], pair[1]))?;
        }
    }

    let seeds = if seed_names.is_empty() {
        graph.sinks()
    } else {
        seed_names
            .into_iter()
            .map(|name| find(&graph, name))
            .collect::<Result<Vec<_>>>()?
    };
    log::debug!("loaded {} nodes, {} seeds", graph.len(), seeds.len());
    Ok(Loaded { graph, seeds })
}

fn apply_order(factory: &mut NodeFactory, spec: ast::OrderSpec) -> Result<()> {
    match spec {
        ast::OrderSpec::Preset(name) => *factory = NodeFactory::preset(name)?,
        ast::OrderSpec::Table(entries) => {
            for (node_type, order) in entries {
                factory.set_order(node_type, order);
            }
        }
    }
    Ok(())
}

fn add_node(factory: &NodeFactory, graph: &mut Graph, block: ast::NodeBlock) -> Result<NodeId> {
    let mut node_type = None;
    let mut order = None;
    for (key, val) in block.props {
        match key {
            "type" => node_type = Some(val),
            "order" => {
                let parsed = val.parse::<i32>().map_err(|_| {
                    Error::BadProperty(block.name.to_owned(), key.to_owned(), val.to_owned())
                })?;
                order = Some(parsed);
            }
            _ => return Err(Error::UnknownProperty(block.name.to_owned(), key.to_owned()).into()),
        }
    }
    let groups = block.attributes.iter().map(to_group).collect();
    factory.create(graph, block.name, groups, node_type, order)
}

fn to_group(attr: &ast::Attribute) -> AttributeGroup {
    AttributeGroup {
        header: attr.header.to_owned(),
        value: attr.value.to_owned(),
        children: attr.children.iter().map(to_group).collect(),
    }
}

fn find(graph: &Graph, name: &str) -> Result<NodeId> {
    graph
        .find(name)
        .ok_or_else(|| Error::NodeNotFound(name.to_owned()).into())
}
