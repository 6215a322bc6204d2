//! Field selection for tabular and JSON output
//!
//! Writers in the application layer consume these rows and values; this
//! module decides which columns exist and how each cell is rendered.

use crate::conditions::tabular_value;
use crate::entry::LogEntry;
use crate::header::{HeaderMetadata, InitialDate, LogHeader};
use serde_json::{json, Value};

/// Columns every tabular output starts with
pub const COMMON_COLUMNS: &[&str] = &[
    "entry",
    "timestamp",
    "component",
    "event_type",
    "event_level",
    "event",
];

/// Columns added when entries carry segment stamps
pub const SEGMENT_COLUMNS: &[&str] = &["segment", "segment_activity"];

/// Column added when entries carry a source tag
pub const SOURCE_COLUMN: &str = "source";

const TIMESTAMP_DISPLAY: &str = "%Y-%m-%d %H:%M:%S";

/// Cell rendering options
#[derive(Debug, Clone, Copy)]
pub struct TabularOptions {
    /// Strip unit letters and convert millivolts to volts
    pub omit_units: bool,
}

impl Default for TabularOptions {
    fn default() -> Self {
        Self { omit_units: true }
    }
}

/// Union of condition labels over all entries, in first-seen order
pub fn condition_keys<'a, I>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    let mut keys: Vec<String> = Vec::new();
    for entry in entries {
        for key in entry.conditions.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
    }
    keys
}

/// Header row for a set of entries
pub fn tabular_columns(entries: &[LogEntry]) -> Vec<String> {
    let mut columns: Vec<String> = COMMON_COLUMNS.iter().map(|c| c.to_string()).collect();
    if entries.iter().any(|e| e.segment.is_some()) {
        columns.extend(SEGMENT_COLUMNS.iter().map(|c| c.to_string()));
    }
    if entries.iter().any(|e| e.source.is_some()) {
        columns.push(SOURCE_COLUMN.to_string());
    }
    columns.extend(condition_keys(entries));
    columns
}

/// Render one cell; built-in fields shadow condition labels of the same name
pub fn tabular_cell(entry: &LogEntry, column: &str, options: TabularOptions) -> String {
    match column {
        "entry" => entry.entry.to_string(),
        "timestamp" => format_timestamp(entry),
        "component" => entry.component.to_string(),
        "event_type" => entry.event_type.map(|t| t.to_string()).unwrap_or_default(),
        "event_level" => entry.level.map(|l| l.to_string()).unwrap_or_default(),
        "event" => entry.event.clone(),
        "segment" => entry.segment.map(|s| s.id.to_string()).unwrap_or_default(),
        "segment_activity" => entry
            .segment
            .map(|s| s.activity.to_string())
            .unwrap_or_default(),
        SOURCE_COLUMN => entry.source.clone().unwrap_or_default(),
        key => entry
            .conditions
            .get(key)
            .map(|value| tabular_value(value, options.omit_units))
            .unwrap_or_default(),
    }
}

/// Render all cells of one entry for the given columns
pub fn tabular_row(entry: &LogEntry, columns: &[String], options: TabularOptions) -> Vec<String> {
    columns
        .iter()
        .map(|column| tabular_cell(entry, column, options))
        .collect()
}

fn format_timestamp(entry: &LogEntry) -> String {
    entry
        .timestamp
        .map(|t| t.format(TIMESTAMP_DISPLAY).to_string())
        .unwrap_or_default()
}

/// JSON view of a header
pub fn header_json(header: &LogHeader) -> Value {
    match &header.metadata {
        HeaderMetadata::Mbb(mbb) => json!({
            "source": "MBB",
            "title": header.title,
            "mbb": {
                "serial_no": mbb.serial_no,
                "vin": mbb.vin,
                "firmware_rev": mbb.firmware_rev,
                "board_rev": mbb.board_rev,
                "model": mbb.model,
            },
            "model": mbb.vehicle,
            "num_entries": header.entries_count,
            "num_entries_expected": header.entries_expected,
        }),
        HeaderMetadata::Bms(bms) => json!({
            "source": "BMS",
            "title": header.title,
            "bms": {
                "serial_no": bms.serial_no,
                "pack_serial_no": bms.pack_serial_no,
                "initial_date": bms.initial_date.as_ref().map(InitialDate::to_display_string),
            },
            "num_entries": header.entries_count,
            "num_entries_expected": header.entries_expected,
        }),
        HeaderMetadata::Unknown => json!({
            "source": Value::Null,
            "title": header.title,
        }),
    }
}

/// JSON view of an entry; conditions keep their raw values
pub fn entry_json(entry: &LogEntry) -> Value {
    let mut value = json!({
        "entry": entry.entry,
        "timestamp": format_timestamp(entry),
        "component": entry.component,
        "event_type": entry.event_type.map(|t| t.as_str()).unwrap_or_default(),
        "event_level": entry.level.map(|l| l.as_str()).unwrap_or_default(),
        "event": entry.event,
        "conditions": entry.conditions,
    });
    if let Value::Object(fields) = &mut value {
        if let Some(segment) = entry.segment {
            fields.insert("segment".to_string(), json!(segment.id));
            fields.insert("segment_activity".to_string(), json!(segment.activity));
        }
        if let Some(source) = &entry.source {
            fields.insert(SOURCE_COLUMN.to_string(), json!(source));
        }
    }
    value
}

/// JSON document of a whole log
pub fn log_json(header: &LogHeader, entries: &[LogEntry]) -> Value {
    json!({
        "header": header_json(header),
        "entries": entries.iter().map(entry_json).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecoderConfig;
    use crate::decoder::LogFile;
    use pretty_assertions::assert_eq;

    const LOG: &str = "Zero MBB log

Serial number      2015_mbb_48e0f7_00720
VIN                538SD9Z37GCG06073
Firmware rev.      51
Board rev.         3
Model              DSR

Printing 8397 of 8397 log entries..

 Entry    Time of Log            Event                      Conditions
+--------+----------------------+--------------------------+----------------------------------
 00001     05/13/2018 10:06:43   DEBUG: Sevcon Contactor Drive ON.
 00002     05/13/2018 10:06:44   Batt Dischg Cur Limited    281 A (40.7%), MinCell: 3383mV, MaxPackTemp: 34C
 00003     05/13/2018 10:06:45   Disarmed                   PackSOC: 91%, Vpack:113.044V
";

    fn log() -> LogFile {
        LogFile::parse_str(LOG, DecoderConfig::new()).unwrap()
    }

    #[test]
    fn test_columns_first_seen_order() {
        let log = log();
        assert_eq!(
            tabular_columns(log.entries()),
            vec![
                "entry",
                "timestamp",
                "component",
                "event_type",
                "event_level",
                "event",
                "segment",
                "segment_activity",
                "MinCell",
                "MaxPackTemp",
                "BattAmps",
                "PackSOC",
                "Vpack",
            ]
        );
    }

    #[test]
    fn test_columns_without_segments() {
        let log = LogFile::parse_str(LOG, DecoderConfig::new().with_segment_annotation(false))
            .unwrap();
        let columns = tabular_columns(log.entries());
        assert!(!columns.iter().any(|c| c == "segment"));
    }

    #[test]
    fn test_rows_normalize_units() {
        let log = log();
        let columns = tabular_columns(log.entries());
        let row = tabular_row(&log.entries()[1], &columns, TabularOptions::default());
        assert_eq!(
            row,
            vec![
                "2",
                "2018-05-13 10:06:44",
                "MBB",
                "LIMIT",
                "",
                "Batt Dischg Cur Limited",
                "0",
                "STOPPED",
                "3.383",
                "34",
                "281",
                "40.7%",
                "",
            ]
        );

        let raw = tabular_row(&log.entries()[1], &columns, TabularOptions { omit_units: false });
        assert_eq!(raw[8], "3383mV");
        assert_eq!(raw[9], "34C");
    }

    #[test]
    fn test_header_json() {
        let log = log();
        assert_eq!(
            header_json(log.header()),
            json!({
                "source": "MBB",
                "title": "Zero MBB log",
                "mbb": {
                    "serial_no": "2015_mbb_48e0f7_00720",
                    "vin": "538SD9Z37GCG06073",
                    "firmware_rev": "51",
                    "board_rev": "3",
                    "model": "DSR",
                },
                "model": {
                    "manufacturer": "Zero Motorcycles",
                    "plant_location": "Santa Cruz, CA",
                    "year": 2016,
                    "platform": "SDS",
                    "model": "DSR",
                    "motor": {"power": "16kW", "size": "75-7R"},
                    "pack_capacity": "13.0",
                },
                "num_entries": 8397,
                "num_entries_expected": 8397,
            })
        );
    }

    #[test]
    fn test_entry_json() {
        let log = log();
        assert_eq!(
            entry_json(&log.entries()[2]),
            json!({
                "entry": 3,
                "timestamp": "2018-05-13 10:06:45",
                "component": "MBB",
                "event_type": "",
                "event_level": "",
                "event": "Disarmed",
                "conditions": {"PackSOC": "91%", "Vpack": "113.044V"},
                "segment": 0,
                "segment_activity": "STOPPED",
            })
        );
    }

    #[test]
    fn test_log_json_shape() {
        let log = log();
        let doc = log_json(log.header(), log.entries());
        assert_eq!(doc["entries"].as_array().unwrap().len(), 3);
        assert_eq!(doc["header"]["source"], "MBB");
    }
}
