//! Zero Log Decoder Library
//!
//! A reusable library for turning the decoded-text logs of Zero Motorcycles
//! control units (MBB and BMS) into structured records.
//!
//! # Architecture
//!
//! Decoding is a pipeline of independent stages:
//! - Header parsing (title, metadata, entry counts, columns), with VIN decoding
//!   for MBB logs
//! - Entry decoding: level, event type, component, event text and telemetry
//!   conditions of every data line
//! - Segment annotation: stopped/started/riding/charging intervals
//! - Optional aggregation of several logs into one timestamp-ordered stream
//!
//! The library does NOT:
//! - Write files or pick output formats
//! - Parse command lines or initialize logging
//!
//! All of that is in the application layer (zero-log-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use zero_log_decoder::{DecoderConfig, JoinedLog, LogFile};
//! use std::path::Path;
//!
//! let mbb = LogFile::open(Path::new("mbb.txt"), DecoderConfig::new()).unwrap();
//! let bms = LogFile::open(Path::new("bms.txt"), DecoderConfig::new()).unwrap();
//! println!("Failed lines: {}", mbb.stats().failed_lines);
//!
//! let joined = JoinedLog::new(mbb, [("bms".to_string(), bms)]);
//! for entry in joined.entries() {
//!     println!("{:?} {} {}", entry.timestamp, entry.component, entry.event);
//! }
//! ```

// Public modules
pub mod conditions;
pub mod config;
pub mod decoder;
pub mod entry;
pub mod header;
pub mod join;
pub mod message_decoder;
pub mod output;
pub mod segments;
pub mod types;
pub mod vin;

// Re-export main types for convenience
pub use config::DecoderConfig;
pub use decoder::{DecodeStats, LogFile};
pub use entry::LogEntry;
pub use header::{BmsMetadata, HeaderMetadata, InitialDate, LogHeader, MbbMetadata};
pub use join::JoinedLog;
pub use output::TabularOptions;
pub use segments::{annotate_segments, summarize_segments, SegmentAnnotator, SegmentSummary};
pub use types::{
    Component, Conditions, DecoderError, EventType, LogLevel, LogSource, Result, Segment,
    SegmentActivity, Timestamp,
};
pub use vin::{decode_vin, MotorDescriptor, VinDescriptor};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
