//! Segment annotation
//!
//! Splits a decoded log into numbered activity intervals. Contactor close and
//! open events of the battery pack, and the first riding or charging entry of
//! a run, start a new segment.

use crate::entry::LogEntry;
use crate::types::{Component, EventType, Segment, SegmentActivity, Timestamp};
use serde::Serialize;

const CONTACTOR_CLOSING: &str = "Module Closing Contactor";
const CONTACTOR_OPENING: &str = "Module Opening Contactor";

/// Forward-only segment state machine
///
/// Entries must be fed in file order.
#[derive(Debug, Clone, Default)]
pub struct SegmentAnnotator {
    id: u32,
    activity: SegmentActivity,
}

impl SegmentAnnotator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the state machine by one entry and return its segment
    pub fn observe(&mut self, entry: &LogEntry) -> Segment {
        if is_pack_contactor(entry, CONTACTOR_CLOSING) {
            self.transition(SegmentActivity::Started);
        } else if is_pack_contactor(entry, CONTACTOR_OPENING) {
            self.transition(SegmentActivity::Stopped);
        } else if entry.event_type == Some(EventType::Riding)
            && self.activity != SegmentActivity::Riding
        {
            self.transition(SegmentActivity::Riding);
        } else if entry.event_type == Some(EventType::Charging)
            && self.activity != SegmentActivity::Charging
        {
            self.transition(SegmentActivity::Charging);
        }
        self.current()
    }

    /// Segment the next entry would get if it triggers nothing
    pub fn current(&self) -> Segment {
        Segment {
            id: self.id,
            activity: self.activity,
        }
    }

    fn transition(&mut self, activity: SegmentActivity) {
        self.id += 1;
        self.activity = activity;
        log::trace!("Segment {} starts: {}", self.id, activity);
    }
}

fn is_pack_contactor(entry: &LogEntry, event: &str) -> bool {
    entry.component == Component::Battery
        && entry.event == event
        && entry.battery_module_no() == Some(0)
}

/// Stamp every entry, in order, with its segment id and activity
pub fn annotate_segments(entries: &mut [LogEntry]) {
    let mut annotator = SegmentAnnotator::new();
    for entry in entries.iter_mut() {
        entry.segment = Some(annotator.observe(entry));
    }
    log::debug!(
        "Annotated {} entries into {} segments",
        entries.len(),
        annotator.current().id + 1
    );
}

/// One contiguous run of entries sharing a segment id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSummary {
    pub id: u32,
    pub activity: SegmentActivity,
    pub first_entry: u32,
    pub last_entry: u32,
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
    pub entry_count: usize,
}

/// Collapse annotated entries into per-segment summaries
///
/// Entries without a segment stamp are ignored.
pub fn summarize_segments(entries: &[LogEntry]) -> Vec<SegmentSummary> {
    let mut summaries: Vec<SegmentSummary> = Vec::new();
    for entry in entries {
        let Some(segment) = entry.segment else {
            continue;
        };
        match summaries.last_mut() {
            Some(current) if current.id == segment.id => {
                current.last_entry = entry.entry;
                current.entry_count += 1;
                if entry.timestamp.is_some() {
                    current.end = entry.timestamp;
                    current.start = current.start.or(entry.timestamp);
                }
            }
            _ => summaries.push(SegmentSummary {
                id: segment.id,
                activity: segment.activity,
                first_entry: entry.entry,
                last_entry: entry.entry,
                start: entry.timestamp,
                end: entry.timestamp,
                entry_count: 1,
            }),
        }
    }
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: u32, line: &str) -> LogEntry {
        LogEntry::decode(
            &format!(" {:05}     05/20/2018 16:{:02}:00   {}", n, n, line),
            n as usize,
        )
        .unwrap()
    }

    #[test]
    fn test_contactor_session() {
        let mut entries = vec![
            entry(1, "Module 00 Closing Contactor    vmod: 112.345V, maxsys: 112.456V"),
            entry(2, "Module 00 Batt Temp   PackTemp: h 21C, l 20C"),
            entry(3, "Module 00 Batt Temp   PackTemp: h 22C, l 20C"),
            entry(4, "Module 00 Batt Temp   PackTemp: h 22C, l 21C"),
            entry(5, "Module 00 Opening Contactor    vmod: 112.345V"),
        ];
        annotate_segments(&mut entries);

        let segments: Vec<Segment> = entries.iter().map(|e| e.segment.unwrap()).collect();
        assert_eq!(segments[0].activity, SegmentActivity::Started);
        assert!(segments[0].id > 0);
        for segment in &segments[1..4] {
            assert_eq!(*segment, segments[0]);
        }
        assert_eq!(segments[4].activity, SegmentActivity::Stopped);
        assert!(segments[4].id > segments[3].id);
    }

    #[test]
    fn test_other_modules_do_not_switch_segments() {
        let mut entries = vec![entry(1, "Module 01 Closing Contactor    vmod: 112.345V")];
        annotate_segments(&mut entries);
        assert_eq!(
            entries[0].segment,
            Some(Segment {
                id: 0,
                activity: SegmentActivity::Stopped
            })
        );
    }

    #[test]
    fn test_riding_and_charging_runs() {
        let mut entries = vec![
            entry(1, "Disarmed"),
            entry(2, "Riding                      PackTemp: h 21C, l 20C, PackSOC: 91%"),
            entry(3, "Riding                      PackTemp: h 22C, l 20C, PackSOC: 90%"),
            entry(4, "Charging                    PackTemp: h 22C, l 21C, PackSOC: 91%"),
            entry(5, "Charging                    PackTemp: h 22C, l 21C, PackSOC: 92%"),
            entry(6, "Riding                      PackTemp: h 21C, l 20C, PackSOC: 91%"),
        ];
        annotate_segments(&mut entries);

        let stamps: Vec<(u32, SegmentActivity)> = entries
            .iter()
            .map(|e| {
                let s = e.segment.unwrap();
                (s.id, s.activity)
            })
            .collect();
        assert_eq!(
            stamps,
            vec![
                (0, SegmentActivity::Stopped),
                (1, SegmentActivity::Riding),
                (1, SegmentActivity::Riding),
                (2, SegmentActivity::Charging),
                (2, SegmentActivity::Charging),
                (3, SegmentActivity::Riding),
            ]
        );

        let summaries = summarize_segments(&entries);
        assert_eq!(summaries.len(), 4);
        assert_eq!(summaries[1].first_entry, 2);
        assert_eq!(summaries[1].last_entry, 3);
        assert_eq!(summaries[1].entry_count, 2);
        assert_eq!(summaries[2].activity, SegmentActivity::Charging);
        assert!(summaries[2].start < summaries[2].end);
    }

    #[test]
    fn test_unannotated_entries_have_no_summaries() {
        let entries = vec![entry(1, "Disarmed")];
        assert!(summarize_segments(&entries).is_empty());
    }
}
