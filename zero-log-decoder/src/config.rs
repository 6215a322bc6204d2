//! Decoder configuration types
//!
//! This module defines the small set of knobs the decoder library accepts.
//! Output formats and file naming are handled by the application layer.

use serde::{Deserialize, Serialize};

/// Configuration for the decoder library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Whether to run the segment annotator after decoding entries
    #[serde(default = "default_true")]
    pub annotate_segments: bool,

    /// Maximum number of lines to scan for the header divider
    #[serde(default = "default_max_header_lines")]
    pub max_header_lines: usize,

    /// Data lines shorter than this are treated as blank and skipped
    #[serde(default = "default_min_line_length")]
    pub min_line_length: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_header_lines() -> usize {
    64
}

fn default_min_line_length() -> usize {
    6
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            annotate_segments: true,
            max_header_lines: default_max_header_lines(),
            min_line_length: default_min_line_length(),
        }
    }
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: enable or disable segment annotation
    pub fn with_segment_annotation(mut self, enabled: bool) -> Self {
        self.annotate_segments = enabled;
        self
    }

    /// Builder method: set the header scan limit
    pub fn with_max_header_lines(mut self, lines: usize) -> Self {
        self.max_header_lines = lines;
        self
    }

    /// Builder method: set the minimum data line length
    pub fn with_min_line_length(mut self, length: usize) -> Self {
        self.min_line_length = length;
        self
    }

    /// Check if a raw data line carries enough text to be decoded
    pub fn should_decode_line(&self, line: &str) -> bool {
        line.len() >= self.min_line_length
    }
}
