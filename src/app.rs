use std::io::Write;

use anyhow::{Context, Result};
use colored::Colorize;

use graph::{Graph, Loaded};
use tabulate::{NodeId, TableBuilder};

use crate::fs;
use crate::settings::Settings;
use crate::ui::Ui;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Seed \"{0}\" is not a node in the input file")]
    UnknownSeed(String),
    #[error("Nothing to tabulate: the input file defines no nodes")]
    EmptyGraph,
}

/// This struct actually runs the command-line app.
pub struct App {
    /// Interpreted command line settings
    settings: Settings,
    /// User interface
    ui: Ui,
}

impl App {
    /// Create a new `App`.
    pub fn new(settings: Settings) -> Self {
        let ui = Ui::new(&settings);
        Self { settings, ui }
    }

    /// Run the app: read, parse and load the input, then write the table.
    pub fn run(mut self) -> Result<()> {
        self.ui.start_timer();

        let mut strbuf = String::with_capacity(0); // will be resized later.
        self.ui.verbose_progress_debug("Reading", &self.settings.input);
        fs::read_to_buf(&self.settings.input, &mut strbuf)?;
        self.ui.done();

        let Loaded { graph, seeds } = self.load_graph(&strbuf)?;
        let seeds = self.override_seeds(&graph, seeds)?;

        self.write_outputs(&graph, &seeds)?;
        self.ui.print_elapsed("Tabulating");
        Ok(())
    }
}

// PARSING /////////////////////
impl App {
    fn load_graph(&self, text: &str) -> Result<Loaded> {
        self.ui.verbose_progress("Parsing input");
        let items = syntax::parse(text)
            .with_context(|| format!("parsing {:?}", self.settings.input))?;
        self.ui.done();
        log::debug!("parsed {} items", items.len());

        self.ui.verbose_progress("Building graph");
        let loaded = graph::load(items)?;
        self.ui.done();

        if loaded.graph.is_empty() {
            return Err(Error::EmptyGraph.into());
        }
        Ok(loaded)
    }

    fn override_seeds(&self, graph: &Graph, seeds: Vec<NodeId>) -> Result<Vec<NodeId>> {
        if self.settings.seeds.is_empty() {
            return Ok(seeds);
        }
        self.settings
            .seeds
            .iter()
            .map(|name| {
                graph
                    .find(name)
                    .ok_or_else(|| Error::UnknownSeed(name.to_owned()))
            })
            .collect::<Result<_, _>>()
            .map_err(Into::into)
    }
}

// OUTPUT //////////////////////
impl App {
    fn write_outputs(&self, graph: &Graph, seeds: &[NodeId]) -> Result<()> {
        let mut builder = TableBuilder::new(graph, seeds, self.settings.layering);

        self.ui.verbose_progress("Computing table");
        let table = builder.table().context("computing table")?;
        self.ui.done();
        log::info!(
            "{} rows, {} columns",
            table.nrows().to_string().green(),
            table.ncols().to_string().green()
        );

        let mut w = fs::writer(self.settings.output.as_deref())?;
        fs::tsv::write_table(&mut w, table).context("writing table")?;
        w.flush().context("writing table")?;

        if let Some(dot_path) = &self.settings.dot {
            self.ui.verbose_progress_debug("Writing graph to", dot_path);
            fs::write_display(dot_path, &builder.dot()?)?;
            self.ui.done();
        }

        if self.settings.report {
            self.ui.report(&builder.render_debug()?);
        }
        Ok(())
    }
}
