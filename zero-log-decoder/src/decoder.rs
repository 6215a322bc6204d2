//! Main decoder API
//!
//! [`LogFile`] is the entry point: it reads a decoded-text Zero log, parses the
//! header, decodes every data line and runs the segment annotator.

use crate::config::DecoderConfig;
use crate::entry::LogEntry;
use crate::header::LogHeader;
use crate::segments::annotate_segments;
use crate::types::Result;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Line counts of one decoding pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Data lines long enough to be decoded
    pub total_lines: usize,
    pub decoded_lines: usize,
    /// Lines skipped because their entry number did not parse
    pub failed_lines: usize,
}

/// A parsed log file: header plus entries in file order
#[derive(Debug, Clone)]
pub struct LogFile {
    path: Option<PathBuf>,
    config: DecoderConfig,
    header: LogHeader,
    entries: Vec<LogEntry>,
    stats: DecodeStats,
}

impl LogFile {
    /// Read and decode a log file from disk
    ///
    /// # Example
    /// ```no_run
    /// use zero_log_decoder::{DecoderConfig, LogFile};
    /// use std::path::Path;
    ///
    /// let log = LogFile::open(Path::new("VIN_MBB_2018-05-20.txt"), DecoderConfig::new()).unwrap();
    /// println!("{} entries", log.entries().len());
    /// ```
    pub fn open(path: &Path, config: DecoderConfig) -> Result<Self> {
        log::info!("Reading log: {:?}", path);
        let bytes = std::fs::read(path)?;
        let mut log = Self::parse_str(&decode_text(bytes), config)?;
        log.path = Some(path.to_path_buf());
        Ok(log)
    }

    /// Decode a log from any reader
    pub fn from_reader<R: Read>(mut reader: R, config: DecoderConfig) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::parse_str(&decode_text(bytes), config)
    }

    /// Decode a log held in memory
    pub fn parse_str(text: &str, config: DecoderConfig) -> Result<Self> {
        let mut lines = text.lines();
        let header = LogHeader::read(&mut lines, config.max_header_lines)?;
        log::debug!(
            "Header: {:?} ({} lines, {:?} of {:?} entries)",
            header.title,
            header.lines_read,
            header.entries_count,
            header.entries_expected
        );

        let mut stats = DecodeStats::default();
        let mut entries = Vec::new();
        for (index, line) in lines.enumerate() {
            if !config.should_decode_line(line) {
                continue;
            }
            stats.total_lines += 1;
            let line_no = header.lines_read + index + 1;
            log::trace!("Reading log entry (line {})", line_no);
            match LogEntry::decode(line, line_no) {
                Ok(entry) => {
                    stats.decoded_lines += 1;
                    entries.push(entry);
                }
                Err(e) => {
                    stats.failed_lines += 1;
                    log::warn!("Decoding failed: {}", e);
                }
            }
        }

        if config.annotate_segments {
            annotate_segments(&mut entries);
        }

        log::info!(
            "Decoded {} of {} log lines ({} failed)",
            stats.decoded_lines,
            stats.total_lines,
            stats.failed_lines
        );

        Ok(Self {
            path: None,
            config,
            header,
            entries,
            stats,
        })
    }

    /// Re-read the log from its path, replacing header and entries
    ///
    /// Logs that were not read from a path are left unchanged.
    pub fn refresh(&mut self) -> Result<()> {
        let Some(path) = self.path.clone() else {
            log::debug!("Log {:?} has no source path to re-read", self.header.title);
            return Ok(());
        };
        *self = Self::open(&path, self.config.clone())?;
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn header(&self) -> &LogHeader {
        &self.header
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    /// Consume the log, keeping only its entries
    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }
}

/// Decode file bytes as UTF-8, falling back to Latin-1
fn decode_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| {
        log::warn!("Log file is not UTF-8, decoding as Latin-1");
        e.into_bytes().iter().map(|&b| b as char).collect()
    })
}
