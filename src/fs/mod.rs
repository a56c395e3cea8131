use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// Writing tables as tab-separated values
pub mod tsv;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Can't write to \"{0}\": path is a directory")]
    IsDirectory(String),
}

/// Read the whole file at `path` into `buf`, replacing its contents.
pub fn read_to_buf(path: &Path, buf: &mut String) -> Result<()> {
    buf.clear();
    let mut file = File::open(path).with_context(|| format!("opening {path:?}"))?;
    file.read_to_string(buf)
        .with_context(|| format!("reading {path:?}"))?;
    Ok(())
}

/// Buffered writer to `path`, or to stdout if there is no path.
pub fn writer(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
        Some(path) => {
            if path.is_dir() {
                return Err(Error::IsDirectory(path.display().to_string()).into());
            }
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).context("creating output directory")?;
            }
            let file = File::create(path).with_context(|| format!("creating {path:?}"))?;
            Ok(Box::new(BufWriter::new(file)))
        }
    }
}

/// Write a displayable value (e.g. a DOT graph) to `path`.
pub fn write_display<T: std::fmt::Display>(path: &Path, value: &T) -> Result<()> {
    let mut w = writer(Some(path))?;
    write!(w, "{}", value).with_context(|| format!("writing {path:?}"))?;
    w.flush()?;
    Ok(())
}
