//! Log aggregation
//!
//! Merges a primary log (usually the MBB log) with tagged secondary logs
//! (usually the BMS log) into one timestamp-ordered stream.

use crate::decoder::LogFile;
use crate::entry::LogEntry;
use crate::types::{Result, Timestamp};
use indexmap::IndexMap;

/// A primary log joined with named secondary logs
#[derive(Debug, Clone)]
pub struct JoinedLog {
    primary: LogFile,
    secondaries: IndexMap<String, LogFile>,
    entries: Vec<LogEntry>,
}

impl JoinedLog {
    /// Join logs; secondary entries are tagged with their name
    pub fn new<I>(primary: LogFile, secondaries: I) -> Self
    where
        I: IntoIterator<Item = (String, LogFile)>,
    {
        let mut joined = Self {
            primary,
            secondaries: secondaries.into_iter().collect(),
            entries: Vec::new(),
        };
        joined.refresh();
        joined
    }

    /// Add or replace a secondary log and re-merge
    pub fn add_secondary(&mut self, tag: impl Into<String>, log: LogFile) {
        self.secondaries.insert(tag.into(), log);
        self.refresh();
    }

    /// Recompute the merged sequence from the constituent logs
    pub fn refresh(&mut self) {
        let mut entries: Vec<LogEntry> = self.primary.entries().to_vec();
        for (tag, log) in &self.secondaries {
            entries.extend(log.entries().iter().cloned().map(|mut entry| {
                entry.source = Some(tag.clone());
                entry
            }));
        }
        // Stable: ties keep each log's own order, primary first
        entries.sort_by(|a, b| a.timestamp_cmp(b));
        log::debug!(
            "Joined {} entries from {} logs",
            entries.len(),
            self.secondaries.len() + 1
        );
        self.entries = entries;
    }

    /// Re-read every constituent log from disk, then re-merge
    pub fn refresh_deep(&mut self) -> Result<()> {
        self.primary.refresh()?;
        for log in self.secondaries.values_mut() {
            log.refresh()?;
        }
        self.refresh();
        Ok(())
    }

    /// First merged entry at or after `timestamp`
    ///
    /// Entries without a timestamp are never returned.
    pub fn find_at_or_after(&self, timestamp: Timestamp) -> Option<&LogEntry> {
        let dated_start = self.entries.partition_point(|e| e.timestamp.is_none());
        let dated = &self.entries[dated_start..];
        let idx = dated.partition_point(|e| e.timestamp.is_some_and(|t| t < timestamp));
        dated.get(idx)
    }

    pub fn primary(&self) -> &LogFile {
        &self.primary
    }

    pub fn secondary(&self, tag: &str) -> Option<&LogFile> {
        self.secondaries.get(tag)
    }

    pub fn secondary_tags(&self) -> impl Iterator<Item = &str> {
        self.secondaries.keys().map(String::as_str)
    }

    /// Merged entries in timestamp order
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }
}
