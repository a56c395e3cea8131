/// type alias just to make type signatures look more consistent.
pub type Ident<'a> = &'a str;

/// A `"Header" = value` pair inside a node block, with optional nested pairs:
/// `"Characteristic [ Organism ]" = "Mus Musculus" { "Term Source REF" = NCBI }`.
#[derive(Debug, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub header: &'a str,
    pub value: &'a str,
    pub children: Vec<Attribute<'a>>,
}

// These methods are just to assist with writing more legible tests.
#[cfg(test)]
impl<'a> Attribute<'a> {
    pub fn leaf(header: &'a str, value: &'a str) -> Self {
        Self {
            header,
            value,
            children: Vec::new(),
        }
    }
    pub fn nested(header: &'a str, value: &'a str, children: Vec<Self>) -> Self {
        Self {
            header,
            value,
            children,
        }
    }
}

/// A node definition:
/// `node name :: type = "Protocol REF" order = 3 { "Protocol REF" = "sampling" }`.
#[derive(Debug, PartialEq, Eq)]
pub struct NodeBlock<'a> {
    /// Name used by `link` and `seed` lines
    pub name: Ident<'a>,
    /// `key = value` pairs following `::`; their meaning is up to the loader
    pub props: Vec<(Ident<'a>, &'a str)>,
    /// Attributes contained within braces, in order
    pub attributes: Vec<Attribute<'a>>,
}

/// How node types map to layering order hints.
#[derive(Debug, PartialEq, Eq)]
pub enum OrderSpec<'a> {
    /// A named preset, e.g. `order isatab`
    Preset(Ident<'a>),
    /// An explicit table: `order { "Source Name" = 0 "Sample Name" = 1 }`
    Table(Vec<(&'a str, i32)>),
}

/// One high-level item in a graph file.
#[derive(Debug, PartialEq, Eq)]
pub enum Item<'a> {
    /// Type ordering for the nodes defined in the file.
    Order(OrderSpec<'a>),
    /// A node definition.
    Node(NodeBlock<'a>),
    /// A chain of edges: `link a -> b -> c`.
    Link(Vec<Ident<'a>>),
    /// Nodes to start tabulating from: `seed a, b`.
    Seed(Vec<Ident<'a>>),
}
