//! Log entry decoding
//!
//! A data line is fixed-column: the entry number sits in columns 0-9, the
//! timestamp (`MM/DD/YYYY HH:MM:SS`) in columns 10-32 and the message from
//! column 33 on.

use crate::message_decoder::MessageDecoder;
use crate::types::{
    Component, Conditions, DecoderError, EventType, LogLevel, Result, Segment, Timestamp,
};
use chrono::NaiveDateTime;
use std::cmp::Ordering;

const ENTRY_COLUMNS: (usize, usize) = (0, 9);
const TIMESTAMP_COLUMNS: (usize, usize) = (10, 32);
const MESSAGE_COLUMN: usize = 33;

/// Timestamp layout of data lines
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// One decoded log line
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Entry number printed at the start of the line
    pub entry: u32,
    /// Absent when the column is blank or unparseable
    pub timestamp: Option<Timestamp>,
    pub level: Option<LogLevel>,
    pub event_type: Option<EventType>,
    pub component: Component,
    /// Event text left after levels, conditions and numbers are extracted
    pub event: String,
    pub conditions: Conditions,
    /// Set by the segment annotator
    pub segment: Option<Segment>,
    /// Set by the log aggregator on entries of secondary logs
    pub source: Option<String>,
}

impl LogEntry {
    /// Decode one raw data line
    ///
    /// `line` is only used for error reporting.
    ///
    /// # Example
    /// ```
    /// use zero_log_decoder::LogEntry;
    ///
    /// let entry = LogEntry::decode(" 00001     05/13/2018 10:06:43   DEBUG: Sevcon Contactor Drive ON.", 1).unwrap();
    /// assert_eq!(entry.entry, 1);
    /// assert_eq!(entry.event, "Sevcon Contactor Drive ON.");
    /// ```
    pub fn decode(raw: &str, line: usize) -> Result<Self> {
        let text = raw.trim_matches(|c| c == '\n' || c == '\r');

        let entry = column(text, ENTRY_COLUMNS.0, ENTRY_COLUMNS.1)
            .trim()
            .parse::<u32>()
            .map_err(|_| DecoderError::InvalidEntryNumber {
                line,
                content: text.to_string(),
            })?;

        let timestamp_text = column(text, TIMESTAMP_COLUMNS.0, TIMESTAMP_COLUMNS.1);
        let timestamp_text = timestamp_text.trim();
        let timestamp = if timestamp_text.is_empty() {
            None
        } else {
            let parsed = NaiveDateTime::parse_from_str(timestamp_text, TIMESTAMP_FORMAT).ok();
            if parsed.is_none() {
                log::debug!("Line {}: unparseable timestamp {:?}", line, timestamp_text);
            }
            parsed
        };

        let message = column(text, MESSAGE_COLUMN, usize::MAX);
        let decoded = MessageDecoder::decode_message(&message);

        Ok(Self {
            entry,
            timestamp,
            level: decoded.level,
            event_type: decoded.event_type,
            component: decoded.component,
            event: decoded.event,
            conditions: decoded.conditions,
            segment: None,
            source: None,
        })
    }

    /// True if the level is one of INFO/DEBUG/WARNING/ERROR
    pub fn has_level(&self) -> bool {
        self.level.is_some()
    }

    /// True for messages emitted by the battery subsystem
    pub fn is_battery_event(&self) -> bool {
        self.component == Component::Battery
    }

    /// Battery module number lifted out of the message, if any
    pub fn battery_module_no(&self) -> Option<u32> {
        self.conditions.get("Module")?.trim().parse().ok()
    }

    /// Order two entries by timestamp; missing timestamps sort first
    pub fn timestamp_cmp(&self, other: &Self) -> Ordering {
        self.timestamp.cmp(&other.timestamp)
    }
}

/// Character columns `[start, end)` of a line, clamped to its length
fn column(text: &str, start: usize, end: usize) -> String {
    text.chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}
