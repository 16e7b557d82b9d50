//! Fixed-format CSV output: every field double quoted, comma separated.

use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::warn;

use crate::dmarc::{OutputRow, COLUMNS};
use crate::error::ReportError;

fn quoted_line<'a, I>(fields: I) -> String
where
	I: IntoIterator<Item = &'a str>,
{
	let quoted: Vec<String> = fields.into_iter().map(|field| format!("\"{}\"", field)).collect();
	quoted.join(",")
}

/// The header line, without line terminator.
pub fn header_line() -> String {
	quoted_line(COLUMNS.iter().copied())
}

/// One row as a CSV line, without line terminator.
pub fn row_line(row: &OutputRow) -> String {
	quoted_line(row.fields().iter().copied())
}

/// Writes the rows to `out`, preceded by the header line when `header` is set.
pub fn write_rows<'a, I, W>(rows: I, mut out: W, header: bool) -> io::Result<()>
where
	I: IntoIterator<Item = &'a OutputRow>,
	W: Write,
{
	if header {
		writeln!(out, "{}", header_line())?;
	}
	for row in rows {
		writeln!(out, "{}", row_line(row))?;
	}
	out.flush()
}

/// Saves the rows as a new CSV file. Fails rather than replace an existing
/// file; a file left incomplete by a write error is removed.
pub fn save<'a, I>(rows: I, path: &Path) -> Result<(), ReportError>
where
	I: IntoIterator<Item = &'a OutputRow>,
{
	let file = OpenOptions::new()
		.write(true)
		.create_new(true)
		.open(path)
		.map_err(|e| ReportError::write(path, e))?;
	fill_or_remove(rows, BufWriter::new(file), path)
}

fn fill_or_remove<'a, I, W>(rows: I, out: W, path: &Path) -> Result<(), ReportError>
where
	I: IntoIterator<Item = &'a OutputRow>,
	W: Write,
{
	write_rows(rows, out, true).map_err(|e| {
		if let Err(remove) = fs::remove_file(path) {
			warn!("could not remove incomplete file {}: {}", path.display(), remove);
		}
		ReportError::write(path, e)
	})
}

/// Prints the rows to standard output without a header.
pub fn echo<'a, I>(rows: I) -> Result<(), ReportError>
where
	I: IntoIterator<Item = &'a OutputRow>,
{
	let stdout = io::stdout();
	write_rows(rows, stdout.lock(), false).map_err(|source| ReportError::WriteError {
		destination: "standard output".to_string(),
		source,
	})
}
