//! Output writers
//!
//! Renders decoded logs as CSV, TSV or JSON. Column selection and cell
//! rendering come from the decoder library; this module only handles
//! separators, quoting and destinations.

use crate::config::OutputFormat;
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use zero_log_decoder::output::{log_json, tabular_columns, tabular_row};
use zero_log_decoder::{LogEntry, LogHeader, SegmentSummary, TabularOptions};

/// Destination name that means standard output
pub const STDOUT_NAME: &str = "-";

/// Write a decoded log in the requested format
pub fn write_log<W: Write>(
    writer: &mut W,
    format: OutputFormat,
    header: &LogHeader,
    entries: &[LogEntry],
    options: TabularOptions,
) -> Result<()> {
    match format {
        OutputFormat::Csv => write_delimited(writer, entries, ',', options)?,
        OutputFormat::Tsv => write_delimited(writer, entries, '\t', options)?,
        OutputFormat::Json => write_json(writer, header, entries)?,
    }
    writer.flush()?;
    Ok(())
}

/// Header row followed by one row per entry
pub fn write_delimited<W: Write>(
    writer: &mut W,
    entries: &[LogEntry],
    delimiter: char,
    options: TabularOptions,
) -> io::Result<()> {
    let columns = tabular_columns(entries);
    write_row(writer, &columns, delimiter)?;
    for entry in entries {
        write_row(writer, &tabular_row(entry, &columns, options), delimiter)?;
    }
    Ok(())
}

fn write_row<W: Write>(writer: &mut W, fields: &[String], delimiter: char) -> io::Result<()> {
    let line = fields
        .iter()
        .map(|field| quote_field(field, delimiter))
        .collect::<Vec<_>>()
        .join(&delimiter.to_string());
    writeln!(writer, "{}", line)
}

/// Quote fields holding the delimiter, quotes or line breaks
fn quote_field(field: &str, delimiter: char) -> Cow<'_, str> {
    let needs_quotes = field
        .chars()
        .any(|c| c == delimiter || c == '"' || c == '\n' || c == '\r');
    if needs_quotes {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

pub fn write_json<W: Write>(writer: &mut W, header: &LogHeader, entries: &[LogEntry]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &log_json(header, entries))?;
    writeln!(writer)?;
    Ok(())
}

/// One line per segment
pub fn write_segments_text<W: Write>(writer: &mut W, segments: &[SegmentSummary]) -> io::Result<()> {
    for segment in segments {
        let span = match (segment.start, segment.end) {
            (Some(start), Some(end)) => format!("{} - {}", start, end),
            _ => "undated".to_string(),
        };
        writeln!(
            writer,
            "{:>4}  {:<8}  entries {}-{} ({})  {}",
            segment.id,
            segment.activity.as_str(),
            segment.first_entry,
            segment.last_entry,
            segment.entry_count,
            span
        )?;
    }
    Ok(())
}

/// Default output location: the input name with the format's extension
pub fn output_path(input: &Path, output_dir: Option<&Path>, format: OutputFormat) -> PathBuf {
    let renamed = input.with_extension(format.extension());
    match (output_dir, renamed.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => renamed,
    }
}

/// Open a buffered writer on a file, or stdout for `-`
pub fn open_output(path: &Path) -> Result<Box<dyn Write>> {
    if path == Path::new(STDOUT_NAME) {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create output file: {:?}", path))?;
    Ok(Box::new(BufWriter::new(file)))
}
