//! Core types for the Zero log decoder library
//!
//! This module defines the classifications the entry decoder emits for each
//! log line, the error type shared by every stage, and the ordered map used
//! for telemetry conditions.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type used throughout the decoder (log files carry no zone)
pub type Timestamp = NaiveDateTime;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Telemetry conditions of one entry, in the order they appear in the line
pub type Conditions = IndexMap<String, String>;

/// Errors that can occur during decoding
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Invalid VIN {vin:?}: {reason}")]
    InvalidVin { vin: String, reason: String },

    #[error("VIN lookup failed: no {segment} code {code:?}")]
    VinLookup { segment: &'static str, code: String },

    #[error("Log header divider not found after {lines_read} lines")]
    MissingDivider { lines_read: usize },

    #[error("Invalid entry number on line {line}: {content:?}")]
    InvalidEntryNumber { line: usize, content: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Severity level prefix of a log message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Debug,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event type classification of a log message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Riding,
    Charging,
    Connected,
    Disconnected,
    On,
    Off,
    Limit,
    /// Binary/hex payloads; their text carries nothing decodable
    Unknown,
    Enabling,
    Disabling,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Riding => "RIDING",
            EventType::Charging => "CHARGING",
            EventType::Connected => "CONNECTED",
            EventType::Disconnected => "DISCONNECTED",
            EventType::On => "ON",
            EventType::Off => "OFF",
            EventType::Limit => "LIMIT",
            EventType::Unknown => "UNKNOWN",
            EventType::Enabling => "ENABLING",
            EventType::Disabling => "DISABLING",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subsystem that produced a log message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Component {
    /// Main bike board, used when nothing more specific matches
    #[default]
    #[serde(rename = "MBB")]
    Mbb,
    Battery,
    Controller,
    Charger,
    #[serde(rename = "External Charger")]
    ExternalCharger,
    #[serde(rename = "DC-DC Converter")]
    DcDcConverter,
    #[serde(rename = "Charge Tank")]
    ChargeTank,
}

impl Component {
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Mbb => "MBB",
            Component::Battery => "Battery",
            Component::Controller => "Controller",
            Component::Charger => "Charger",
            Component::ExternalCharger => "External Charger",
            Component::DcDcConverter => "DC-DC Converter",
            Component::ChargeTank => "Charge Tank",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Activity label of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SegmentActivity {
    #[default]
    Stopped,
    Started,
    Riding,
    Charging,
}

impl SegmentActivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentActivity::Stopped => "STOPPED",
            SegmentActivity::Started => "STARTED",
            SegmentActivity::Riding => "RIDING",
            SegmentActivity::Charging => "CHARGING",
        }
    }
}

impl fmt::Display for SegmentActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Segment stamp added to an entry by the segment annotator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: u32,
    pub activity: SegmentActivity,
}

/// Kind of device that wrote a log file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogSource {
    /// Main bike board
    #[serde(rename = "MBB")]
    Mbb,
    /// Battery management system
    #[serde(rename = "BMS")]
    Bms,
}

impl LogSource {
    /// Identify the source from a log title line
    pub fn from_title(title: &str) -> Option<Self> {
        if title.contains("MBB") {
            Some(LogSource::Mbb)
        } else if title.contains("BMS") {
            Some(LogSource::Bms)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogSource::Mbb => "MBB",
            LogSource::Bms => "BMS",
        }
    }
}

impl fmt::Display for LogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
