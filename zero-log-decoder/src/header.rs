//! Log header parsing
//!
//! Every log starts with a fixed preamble:
//!
//! ```text
//! Zero MBB log
//!
//! Serial number      2015_mbb_48e0f7_00720
//! VIN                538SD9Z37GCG06073
//! ...
//!
//! Printing 8397 of 8397 log entries..
//!
//!  Entry    Time of Log            Event                      Conditions
//! +--------+----------------------+--------------------------+----------
//! ```
//!
//! The divider line closes the header; the two non-blank lines above it are
//! the column headings and the entry-count line.

use crate::types::{DecoderError, LogSource, Result};
use crate::vin::{decode_vin, VinDescriptor};
use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Prefix of the line that closes the header
pub const DIVIDER_MARKER: &str = "+-----";

/// Layout of the BMS `Initial date` field
pub const INITIAL_DATE_FORMAT: &str = "%b %d %Y %H:%M:%S";

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid digit regex"));

static COLUMN_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s\s+").expect("valid column gap regex"));

/// Metadata of a main bike board log
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MbbMetadata {
    pub serial_no: Option<String>,
    pub vin: Option<String>,
    pub firmware_rev: Option<String>,
    pub board_rev: Option<String>,
    pub model: Option<String>,
    /// Decoded from `vin`; absent if the VIN is missing or undecodable
    pub vehicle: Option<VinDescriptor>,
}

/// BMS initial date, kept as text when it does not parse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InitialDate {
    Parsed(NaiveDateTime),
    Raw(String),
}

impl InitialDate {
    fn parse(text: &str) -> Self {
        match NaiveDateTime::parse_from_str(text, INITIAL_DATE_FORMAT) {
            Ok(date) => InitialDate::Parsed(date),
            Err(e) => {
                log::debug!("Keeping raw BMS initial date {:?}: {}", text, e);
                InitialDate::Raw(text.to_string())
            }
        }
    }

    pub fn to_display_string(&self) -> String {
        match self {
            InitialDate::Parsed(date) => date.format("%Y-%m-%d %H:%M:%S").to_string(),
            InitialDate::Raw(text) => text.clone(),
        }
    }
}

/// Metadata of a battery management system log
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BmsMetadata {
    pub serial_no: Option<String>,
    pub pack_serial_no: Option<String>,
    pub initial_date: Option<InitialDate>,
}

/// Source-specific header metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HeaderMetadata {
    Mbb(MbbMetadata),
    Bms(BmsMetadata),
    Unknown,
}

/// Parsed log file header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogHeader {
    pub title: String,
    pub metadata: HeaderMetadata,
    /// Number of entries printed
    pub entries_count: Option<u32>,
    /// Number of entries the device reported
    pub entries_expected: Option<u32>,
    pub column_labels: Vec<String>,
    /// Character positions of `+` in the divider line
    pub divider_indexes: Vec<usize>,
    /// Lines consumed from the input, divider included
    pub lines_read: usize,
}

impl LogHeader {
    /// Read and parse the header from the start of a log
    ///
    /// Fails with [`DecoderError::MissingDivider`] when the divider line does
    /// not appear within `max_lines` lines or before the input ends.
    pub fn read<'a, I>(lines: &mut I, max_lines: usize) -> Result<Self>
    where
        I: Iterator<Item = &'a str>,
    {
        let mut header_lines: Vec<String> = Vec::new();
        loop {
            if header_lines.len() >= max_lines {
                return Err(DecoderError::MissingDivider {
                    lines_read: header_lines.len(),
                });
            }
            let Some(line) = lines.next() else {
                return Err(DecoderError::MissingDivider {
                    lines_read: header_lines.len(),
                });
            };
            let line = line.trim();
            let is_divider = line.starts_with(DIVIDER_MARKER);
            header_lines.push(line.to_string());
            if is_divider {
                break;
            }
        }
        Ok(Self::parse(&header_lines))
    }

    /// Parse already collected header lines; the last line is the divider
    pub fn parse(header_lines: &[String]) -> Self {
        let title = header_lines
            .first()
            .map(|line| line.trim().to_string())
            .unwrap_or_default();

        let metadata = match LogSource::from_title(&title) {
            Some(LogSource::Mbb) => HeaderMetadata::Mbb(Self::parse_mbb(header_lines)),
            Some(LogSource::Bms) => HeaderMetadata::Bms(Self::parse_bms(header_lines)),
            None => {
                log::warn!("Unrecognized log title {:?}", title);
                HeaderMetadata::Unknown
            }
        };

        let structural: Vec<&str> = header_lines
            .iter()
            .map(String::as_str)
            .filter(|line| !line.is_empty())
            .collect();
        let divider = structural.last().copied().unwrap_or_default();
        let labels_line = nth_from_end(&structural, 1);
        let count_line = nth_from_end(&structural, 2);

        let counts: Vec<u32> = DIGIT_RUN
            .find_iter(count_line)
            .filter_map(|m| m.as_str().parse().ok())
            .collect();

        let column_labels = COLUMN_GAP
            .split(labels_line)
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .collect();

        let divider_indexes = divider
            .chars()
            .enumerate()
            .filter(|(_, c)| *c == '+')
            .map(|(i, _)| i)
            .collect();

        Self {
            title,
            metadata,
            entries_count: counts.first().copied(),
            entries_expected: counts.get(1).copied(),
            column_labels,
            divider_indexes,
            lines_read: header_lines.len(),
        }
    }

    fn parse_mbb(header_lines: &[String]) -> MbbMetadata {
        let vin = value_from_lines(header_lines, "VIN");
        let vehicle = vin.as_deref().and_then(decode_header_vin);
        MbbMetadata {
            serial_no: value_from_lines(header_lines, "Serial number"),
            vin,
            firmware_rev: value_from_lines(header_lines, "Firmware rev."),
            board_rev: value_from_lines(header_lines, "Board rev."),
            model: value_from_lines(header_lines, "Model"),
            vehicle,
        }
    }

    fn parse_bms(header_lines: &[String]) -> BmsMetadata {
        BmsMetadata {
            serial_no: value_from_lines(header_lines, "BMS serial number"),
            pack_serial_no: value_from_lines(header_lines, "Pack serial number"),
            initial_date: value_from_lines(header_lines, "Initial date")
                .map(|text| InitialDate::parse(&text)),
        }
    }

    /// Log source kind, if the title was recognized
    pub fn source(&self) -> Option<LogSource> {
        match self.metadata {
            HeaderMetadata::Mbb(_) => Some(LogSource::Mbb),
            HeaderMetadata::Bms(_) => Some(LogSource::Bms),
            HeaderMetadata::Unknown => None,
        }
    }

    /// Vehicle decoded from the VIN of an MBB log
    pub fn vehicle(&self) -> Option<&VinDescriptor> {
        match &self.metadata {
            HeaderMetadata::Mbb(mbb) => mbb.vehicle.as_ref(),
            _ => None,
        }
    }
}

fn nth_from_end<'a>(lines: &[&'a str], n: usize) -> &'a str {
    lines
        .len()
        .checked_sub(n + 1)
        .and_then(|i| lines.get(i))
        .copied()
        .unwrap_or_default()
}

/// Value of the first header line starting with `prefix`, trimmed
fn value_from_lines(header_lines: &[String], prefix: &str) -> Option<String> {
    header_lines
        .iter()
        .find_map(|line| line.strip_prefix(prefix))
        .map(|value| value.trim().to_string())
}

fn decode_header_vin(vin: &str) -> Option<VinDescriptor> {
    if vin.is_empty() || !vin.chars().all(|c| c.is_ascii_graphic()) {
        log::debug!("Skipping non-printable VIN {:?}", vin);
        return None;
    }
    match decode_vin(vin) {
        Ok(descriptor) => Some(descriptor),
        Err(e) => {
            log::warn!("Could not decode header VIN: {}", e);
            None
        }
    }
}
