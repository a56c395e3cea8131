use std::path::PathBuf;

use crate::args::Args;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("input file \"{0}\" does not exist")]
    InputNotFound(String),
    #[error("input \"{0}\" is not a file")]
    InputNotFile(String),
}

/// Settings are like Args, except all the logic has
/// been applied so e.g. defaults are added in.
#[derive(Debug)]
pub struct Settings {
    pub input: PathBuf,
    /// `None` writes to stdout
    pub output: Option<PathBuf>,
    pub dot: Option<PathBuf>,
    pub layering: bool,
    pub report: bool,
    /// Empty means use the seeds from the input file
    pub seeds: Vec<String>,
    pub verbose: u8,
}

impl TryFrom<Args> for Settings {
    type Error = anyhow::Error;
    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let input = PathBuf::from(&args.input);
        if !input.exists() {
            return Err(Error::InputNotFound(args.input).into());
        } else if !input.is_file() {
            return Err(Error::InputNotFile(args.input).into());
        }

        let output = match args.output.as_deref() {
            None | Some("-") => None,
            Some(path) => Some(PathBuf::from(path)),
        };

        Ok(Self {
            input,
            output,
            dot: args.dot.map(PathBuf::from),
            layering: !args.no_layering,
            report: args.report,
            seeds: args.seeds,
            verbose: args.verbose,
        })
    }
}
