use std::io::{self, Write};

use tabulate::Table;

/// Write `table` as TSV: headers first, then one line per row.
///
/// Every non-null field is double-quoted, with embedded quotes doubled.
/// Null cells are written as empty fields.
pub fn write_table<W: Write>(w: &mut W, table: &Table) -> io::Result<()> {
    write_line(w, table.headers().iter().map(|h| Some(h.as_str())))?;
    for row in table.rows() {
        write_line(w, row.iter().map(Option::as_deref))?;
    }
    Ok(())
}

fn write_line<'a, W: Write>(
    w: &mut W,
    cells: impl Iterator<Item = Option<&'a str>>,
) -> io::Result<()> {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            w.write_all(b"\t")?;
        }
        if let Some(text) = cell {
            write_quoted(w, text)?;
        }
    }
    w.write_all(b"\n")
}

fn write_quoted<W: Write>(w: &mut W, text: &str) -> io::Result<()> {
    w.write_all(b"\"")?;
    for (i, part) in text.split('"').enumerate() {
        if i > 0 {
            w.write_all(b"\"\"")?;
        }
        w.write_all(part.as_bytes())?;
    }
    w.write_all(b"\"")
}
