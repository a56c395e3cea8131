use std::fmt::Write;

use crate::{
    Dot, Error, FlowManager, Layers, LayersBuilder, MinFlowCalculator, NodeGraph, NodeId,
    TableContents,
};

/// A rectangular table: every row has one cell per header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows, one per path; `None` is a blank cell.
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn ncols(&self) -> usize {
        self.headers.len()
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    /// Headers followed by the data rows, as a single matrix.
    pub fn matrix(&self) -> Vec<Vec<Option<String>>> {
        let headers = self.headers.iter().cloned().map(Some).collect();
        std::iter::once(headers)
            .chain(self.rows.iter().cloned())
            .collect()
    }
}

/// Everything computed for a table, kept around for the debugging outputs.
#[derive(Debug)]
struct Computed {
    table: Table,
    flows: FlowManager,
    start_nodes: Vec<NodeId>,
    layers: Option<Layers>,
}

/// Builds the [`Table`] for the part of a graph connected to a set of seeds.
///
/// With layering, seeds are best chosen among the sinks; without, among the sources.
/// Any set reaching the nodes of interest works either way.
/// The table is computed on first use and reused afterwards.
pub struct TableBuilder<'g, G> {
    graph: &'g G,
    seeds: Vec<NodeId>,
    layering: bool,
    computed: Option<Computed>,
}

impl<'g, G: NodeGraph> TableBuilder<'g, G> {
    pub fn new(graph: &'g G, seeds: &[NodeId], layering: bool) -> Self {
        Self {
            graph,
            seeds: seeds.to_vec(),
            layering,
            computed: None,
        }
    }

    pub fn table(&mut self) -> Result<&Table, Error> {
        Ok(&self.computed()?.table)
    }

    /// Layers used for the table, if layering was requested.
    pub fn layers(&mut self) -> Result<Option<&Layers>, Error> {
        Ok(self.computed()?.layers.as_ref())
    }

    /// Fixed-width dump of the table (headers first), for eyeballing.
    pub fn render_debug(&mut self) -> Result<String, Error> {
        let table = self.table()?;
        let mut out = String::new();
        let headers = table.headers().iter().map(|h| Some(h.as_str()));
        render_row(&mut out, headers);
        for row in table.rows() {
            render_row(&mut out, row.iter().map(Option::as_deref));
        }
        out.push('\n');
        Ok(out)
    }

    /// Graphviz view of the minimum flow and of the layers.
    pub fn dot(&mut self) -> Result<Dot<'_, G>, Error> {
        let graph = self.graph;
        let computed = self.computed()?;
        Ok(Dot::new(
            graph,
            &computed.flows,
            &computed.start_nodes,
            computed.layers.as_ref(),
        ))
    }

    fn computed(&mut self) -> Result<&Computed, Error> {
        let computed = match self.computed.take() {
            Some(computed) => computed,
            None => self.compute()?,
        };
        let computed: &Computed = self.computed.insert(computed);
        Ok(computed)
    }

    fn compute(&self) -> Result<Computed, Error> {
        let graph = self.graph;
        if let Some(&unknown) = self.seeds.iter().find(|&&s| !graph.contains(s)) {
            return Err(Error::UnknownNode(unknown.into()));
        }

        let calc = MinFlowCalculator::calculate(graph, &self.seeds)?;
        let paths = calc.min_path_cover();
        let layers = self
            .layering
            .then(|| LayersBuilder::new(graph).build(calc.end_nodes()));
        if let Some(layers) = &layers {
            log::trace!("layers:\n{}", layers.dump(graph));
        }

        let mut contents = TableContents::new();
        for (row, path) in paths.iter().enumerate() {
            match &layers {
                Some(layers) => merge_layered_path(&mut contents, graph, layers, path, row),
                None => {
                    for (layer, &node) in path.iter().enumerate() {
                        contents.merge_node(layer, Some(graph.attribute_groups(node)), row);
                    }
                }
            }
        }

        let table = Table {
            headers: contents.headers(),
            rows: (0..paths.len()).map(|row| contents.row(row)).collect(),
        };
        log::debug!("table of {} rows x {} columns", table.nrows(), table.ncols());
        Ok(Computed {
            table,
            flows: calc.flows().clone(),
            start_nodes: calc.start_nodes().to_vec(),
            layers,
        })
    }
}

/// Merge `path` into `row`, blanking the layers it jumps over and those after its end.
fn merge_layered_path<G: NodeGraph>(
    contents: &mut TableContents,
    graph: &G,
    layers: &Layers,
    path: &[NodeId],
    row: usize,
) {
    let mut next_layer = 0;
    for &node in path {
        let Some(layer) = layers.layer(node) else {
            log::warn!("{} was not layered; leaving it out", graph.label(node));
            continue;
        };
        for gap in next_layer..layer {
            contents.merge_node(gap, None, row);
        }
        contents.merge_node(layer, Some(graph.attribute_groups(node)), row);
        next_layer = layer + 1;
    }
    if let Some(max) = layers.max_layer() {
        for gap in next_layer..=max {
            contents.merge_node(gap, None, row);
        }
    }
}

fn render_row<'a>(out: &mut String, cells: impl Iterator<Item = Option<&'a str>>) {
    for cell in cells {
        let _ = write!(out, "{:>30.30} | ", cell.unwrap_or("null"));
    }
    out.push('\n');
}

#[cfg(test)]
mod test {
    use anyhow::Result;

    use super::{Table, TableBuilder};
    use crate::test_graph::TestGraph;
    use crate::{Error, NodeId};

    /// True if some row has `a` immediately followed by `b`.
    fn has_pair(table: &Table, a: &str, b: &str) -> bool {
        table.rows().iter().any(|row| {
            row.windows(2)
                .any(|w| w[0].as_deref() == Some(a) && w[1].as_deref() == Some(b))
        })
    }

    fn check_pairs(table: &Table, present: &[&str], absent: &[&str]) {
        for pair in present {
            let (a, b) = pair.split_at(1);
            assert!(has_pair(table, a, b), "missing {a}{b}");
        }
        for pair in absent {
            let (a, b) = pair.split_at(1);
            assert!(!has_pair(table, a, b), "unexpected {a}{b}");
        }
    }

    fn cells(row: &[Option<&str>]) -> Vec<Option<String>> {
        row.iter().map(|c| c.map(String::from)).collect()
    }

    #[test]
    fn test_g1() -> Result<()> {
        let mut g = TestGraph::g1();
        let d = g.node(2, 'D');
        let mut builder = TableBuilder::new(&g, &[d], true);
        let table = builder.table()?;

        assert_eq!(4, table.matrix().len());
        assert_eq!(3, table.nrows());
        assert_eq!(5, table.ncols());
        check_pairs(table, &["CD", "GH", "BC", "DE"], &["AB", "EH", "EI", "GF"]);
        Ok(())
    }

    #[test]
    fn test_g2() -> Result<()> {
        let mut g = TestGraph::g2();
        let d = g.node(2, 'D');
        let mut builder = TableBuilder::new(&g, &[d], true);
        let table = builder.table()?;

        assert_eq!(4, table.matrix().len());
        assert_eq!(5, table.ncols());
        check_pairs(table, &["HG", "IG", "CA", "CB", "DC", "FE"], &["IE", "FG"]);
        Ok(())
    }

    #[test]
    fn test_g3() -> Result<()> {
        let mut g = TestGraph::g3();
        let seeds = [g.node(0, 'A'), g.node(0, 'B')];
        let mut builder = TableBuilder::new(&g, &seeds, true);
        let table = builder.table()?;

        assert_eq!(5, table.matrix().len());
        assert_eq!(8, table.ncols());
        check_pairs(
            table,
            &["LO", "QT", "HI", "IK", "AD", "NQ"],
            &["QU", "GK", "LM", "KO"],
        );
        Ok(())
    }

    #[test]
    fn test_g4() -> Result<()> {
        let mut g = TestGraph::g4();
        let seed = g.node(1, 'G');
        let mut builder = TableBuilder::new(&g, &[seed], true);
        let table = builder.table()?;

        assert_eq!(8, table.matrix().len());
        assert_eq!(5, table.ncols());
        check_pairs(
            table,
            &[
                "AB", "BC", "CD", "DE", "AG", "GH", "HI", "IE", "FG", "GK", "KI", "MG", "KL",
                "LJ", "LP", "GN", "NO", "OP", "MQ", "QR", "RS", "SP",
            ],
            &["MN", "PJ", "MH", "NK"],
        );
        Ok(())
    }

    #[test]
    fn test_g5() -> Result<()> {
        let mut g = TestGraph::g5();
        let seeds = [g.node(0, 'A'), g.node(0, 'H'), g.node(0, 'L')];
        let mut builder = TableBuilder::new(&g, &seeds, true);
        let table = builder.table()?;

        assert_eq!(9, table.matrix().len());
        assert_eq!(4, table.ncols());
        check_pairs(
            table,
            &[
                "AB", "BC", "CD", "AE", "EC", "EF", "FD", "FG", "FK", "HE", "HI", "IJ", "JK",
                "JO", "LM", "MN", "NO",
            ],
            &["CF", "FJ", "AA", "HC", "NK"],
        );
        Ok(())
    }

    #[test]
    fn test_isolated_nodes() -> Result<()> {
        let mut g = TestGraph::g6();
        let (a, b) = (g.node(0, 'A'), g.node(0, 'B'));
        let mut builder = TableBuilder::new(&g, &[a, b], true);
        let table = builder.table()?;
        assert_eq!(&["Foo Header 0".to_string()], table.headers());
        assert_eq!(vec![cells(&[Some("A")]), cells(&[Some("B")])], table.rows());

        // next to a connected graph, it gets a row of its own
        let mut g = TestGraph::g1();
        let d = g.node(2, 'D');
        let z = g.node(0, 'Z');
        let mut builder = TableBuilder::new(&g, &[d, z], true);
        let table = builder.table()?;
        assert_eq!(4, table.nrows());
        assert_eq!(5, table.ncols());
        assert_eq!(cells(&[Some("Z"), None, None, None, None]), table.rows()[3]);
        Ok(())
    }

    #[test]
    fn test_seed_keeps_everything_downstream() -> Result<()> {
        let mut g = TestGraph::default();
        let a = g.add("Foo", "a-other", -1);
        let b = g.add("Foo", "b-seed", -1);
        let c = g.add("Foo", "c", -1);
        let x = g.add("Foo", "x", -1);
        let y = g.add("Foo", "y", -1);
        g.link(b, c);
        g.link(a, c);
        g.link(c, x);
        g.link(c, y);

        let mut builder = TableBuilder::new(&g, &[b], true);
        let table = builder.table()?;
        assert_eq!(
            vec![
                cells(&[Some("b-seed"), Some("c"), Some("x")]),
                cells(&[Some("b-seed"), Some("c"), Some("y")]),
            ],
            table.rows()
        );
        Ok(())
    }

    #[test]
    fn test_uneven_graph() -> Result<()> {
        let mut g = TestGraph::default();
        let sr1 = g.add("Source Name", "source 1", 0);
        let sm1 = g.add("Sample Name", "Sample 1", 1);
        let sm2 = g.add("Sample Name", "Sample 2", 1);
        let sm3 = g.add("Sample Name", "Sample 3", 1);
        let p1 = g.add("Protocol REF", "treating protocol 1", -1);
        let p2 = g.add("Protocol REF", "treating protocol 2", -1);
        let p3 = g.add("Protocol REF", "sampling protocol 3", -1);
        let x1 = g.add("Extract Name", "x1", 2);
        let x2 = g.add("Extract Name", "x2", 2);
        for (from, to) in [
            (sr1, sm3),
            (sr1, sm2),
            (sr1, x2),
            (sm3, p3),
            (sm1, sm2),
            (sm1, p1),
            (p1, p2),
            (p2, x1),
            (sm2, x1),
        ] {
            g.link(from, to);
        }

        let mut builder = TableBuilder::new(&g, &[x1, x2, p3], true);
        let table = builder.table()?;
        assert_eq!(
            [
                "Source Name",
                "Sample Name",
                "Sample Name",
                "Protocol REF",
                "Protocol REF",
                "Extract Name"
            ]
            .map(String::from)
            .as_slice(),
            table.headers()
        );
        let expected = vec![
            cells(&[None, Some("Sample 1"), Some("Sample 2"), None, None, Some("x1")]),
            cells(&[
                None,
                Some("Sample 1"),
                None,
                Some("treating protocol 1"),
                Some("treating protocol 2"),
                Some("x1"),
            ]),
            cells(&[Some("source 1"), None, Some("Sample 2"), None, None, Some("x1")]),
            cells(&[
                Some("source 1"),
                Some("Sample 3"),
                None,
                Some("sampling protocol 3"),
                None,
                None,
            ]),
            cells(&[Some("source 1"), None, None, None, None, Some("x2")]),
        ];
        assert_eq!(expected, table.rows());
        Ok(())
    }

    #[test]
    fn test_close_same_types() -> Result<()> {
        let mut g = TestGraph::default();
        let sample1 = g.add("Sample Name", "sample 1", 1);
        let sample2 = g.add("Sample Name", "sample 2", 1);
        let proto1 = g.add("Protocol REF", "treatment protocol 1", -1);
        let sample4 = g.add("Sample Name", "sample 4", 1);
        let extract1 = g.add("Extract Name", "extract 1", 2);
        g.link(sample1, sample2);
        g.link(sample1, proto1);
        g.link(proto1, sample4);
        g.link(sample2, extract1);

        let mut builder = TableBuilder::new(&g, &[sample4, extract1], true);
        let table = builder.table()?;
        assert_eq!(
            ["Sample Name", "Sample Name", "Protocol REF", "Sample Name", "Extract Name"]
                .map(String::from)
                .as_slice(),
            table.headers()
        );
        assert_eq!(
            vec![
                cells(&[Some("sample 1"), Some("sample 2"), None, None, Some("extract 1")]),
                cells(&[
                    Some("sample 1"),
                    None,
                    Some("treatment protocol 1"),
                    Some("sample 4"),
                    None
                ]),
            ],
            table.rows()
        );
        Ok(())
    }

    #[test]
    fn test_without_layering() -> Result<()> {
        let mut g = TestGraph::default();
        let src = g.add("Source Name", "src", 0);
        let sample = g.add("Sample Name", "sample", 1);
        let extract = g.add("Extract Name", "extract", 2);
        g.link(src, sample);
        g.link(sample, extract);
        g.link(src, extract);

        let mut builder = TableBuilder::new(&g, &[src], false);
        assert!(builder.layers()?.is_none());
        let table = builder.table()?;
        // without layers, the shortcut puts its extract in the second column
        assert_eq!(
            ["Source Name", "Extract Name", "Sample Name", "Extract Name"]
                .map(String::from)
                .as_slice(),
            table.headers()
        );
        assert_eq!(
            vec![
                cells(&[Some("src"), Some("extract"), None, None]),
                cells(&[Some("src"), None, Some("sample"), Some("extract")]),
            ],
            table.rows()
        );
        Ok(())
    }

    #[test]
    fn test_table_is_memoized() -> Result<()> {
        let mut g = TestGraph::g5();
        let seeds = [g.node(0, 'A'), g.node(0, 'H'), g.node(0, 'L')];
        let mut builder = TableBuilder::new(&g, &seeds, true);
        let first = builder.table()?.clone();
        let second = builder.table()?.clone();
        assert_eq!(first, second);
        assert_eq!(builder.render_debug()?, builder.render_debug()?);
        Ok(())
    }

    #[test]
    fn test_render_debug() -> Result<()> {
        let mut g = TestGraph::default();
        let a = g.add("Source Name", "a rather long source name that won't fit", 0);
        let b = g.add("Sample Name", "b", 1);
        let c = g.add("Sample Name", "c", 1);
        g.link(a, b);
        let mut builder = TableBuilder::new(&g, &[b, c], true);

        let dump = builder.render_debug()?;
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(4, lines.len());
        assert_eq!(
            format!("{:>30} | {:>30} | ", "Source Name", "Sample Name"),
            lines[0]
        );
        assert_eq!(
            format!("{:>30} | {:>30} | ", "a rather long source name that", "b"),
            lines[1]
        );
        assert_eq!(format!("{:>30} | {:>30} | ", "null", "c"), lines[2]);
        assert_eq!("", lines[3]);
        Ok(())
    }

    #[test]
    fn test_unknown_seed() {
        let g = TestGraph::g1();
        let mut builder = TableBuilder::new(&g, &[NodeId::from(42usize)], true);
        assert!(matches!(builder.table(), Err(Error::UnknownNode(42))));
    }
}
