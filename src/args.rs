use clap::{ArgAction, Parser};

const CMD_NAME: &str = "g2t";

/// Stores our command-line args format.
#[derive(Parser)]
#[command(name = CMD_NAME, version, about = None, long_about = None)]
pub struct Args {
    /// Graph description file
    #[arg(value_name = "INPUT")]
    pub input: String,

    /// TSV output file ('-' for stdout)
    #[arg(short, long, value_name = "FILE")]
    #[arg(env = "GRAPH2TAB_OUTPUT")]
    pub output: Option<String>,

    /// Give each path position its own layer instead of aligning node types
    #[arg(long)]
    pub no_layering: bool,

    /// Write the graph in Graphviz format
    #[arg(short, long, value_name = "FILE")]
    pub dot: Option<String>,

    /// Print a fixed-width rendering of the table to stderr
    #[arg(short, long)]
    pub report: bool,

    /// Start tabulating from this node (overrides seeds in the input file)
    #[arg(short, long = "seed", value_name = "NAME")]
    pub seeds: Vec<String>,

    /// Print additional debugging info (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
