//! Delimited-text export of a `ResultSet`.
//!
//! Header first, then one line per entry. Failed entries become a row of
//! empty cells unless `skip_failed` is set. Cells are quoted only when they
//! contain the delimiter, a double quote or a line break.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::normalize::COLUMNS;
use crate::pipeline::ResultSet;

#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    pub delimiter: char,
    pub skip_failed: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            skip_failed: false,
        }
    }
}

const BLANK_ROW: [&str; 15] = [""; 15];

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single delimited row to any writer.
pub fn write_row<W: Write>(mut w: W, row: &[&str], sep: char) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, "{}", sep)?;
        } else {
            first = false;
        }
        if needs_quotes(cell, sep) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{}\"", escaped)?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/// Header plus every entry of `results`. Returns the number of data rows written.
pub fn write_rows<W: Write>(mut w: W, results: &ResultSet, opts: &ExportOptions) -> io::Result<usize> {
    write_row(&mut w, &COLUMNS, opts.delimiter)?;
    let mut written = 0;
    for outcome in results.iter() {
        match &outcome.result {
            Ok(row) => write_row(&mut w, &row.cells(), opts.delimiter)?,
            Err(_) if opts.skip_failed => continue,
            Err(_) => write_row(&mut w, &BLANK_ROW, opts.delimiter)?,
        }
        written += 1;
    }
    Ok(written)
}

/// Create (or truncate) `path` and write the export to it.
pub fn write_result_set(path: &Path, results: &ResultSet, opts: &ExportOptions) -> Result<usize> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    let written = write_rows(&mut out, results, opts)
        .with_context(|| format!("writing {}", path.display()))?;
    out.flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    tracing::info!(rows = written, "export written to {}", path.display());
    Ok(written)
}
