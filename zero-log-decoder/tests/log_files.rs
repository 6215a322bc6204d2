// End-to-end decoding of on-disk logs
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;
use zero_log_decoder::{
    output, Component, DecoderConfig, DecoderError, EventType, JoinedLog, LogFile, LogSource,
    SegmentActivity, TabularOptions,
};

const MBB_LOG: &str = "Zero MBB log

Serial number      2015_mbb_48e0f7_00720
VIN                538SD9Z37GCG06073
Firmware rev.      51
Board rev.         3
Model              DSR

Printing 6 of 6 log entries..

 Entry    Time of Log            Event                      Conditions
+--------+----------------------+--------------------------+----------------------------------
 00001     05/21/2018 21:12:20   Disarmed                   PackTemp: h 21C, l 20C, PackSOC: 91%, Vpack:113.044V, MotAmps:   0, BattAmps:   2, Mods: 11,  MotTemp:  26C, CtrlTemp:  19C, AmbTemp:  20C, MotRPM:   0, Odo:48809km
 00002     05/21/2018 21:12:25   DEBUG: Sevcon Contactor Drive ON.
 00003     05/21/2018 21:12:30   Riding                     PackTemp: h 22C, l 20C, PackSOC: 90%, Vpack:112.100V, MotAmps:  40, BattAmps:  38, Mods: 11,  MotTemp:  27C, CtrlTemp:  20C, AmbTemp:  20C, MotRPM: 2100, Odo:48810km
 0000?     05/21/2018 21:12:31   corrupted line
 00005     05/21/2018 21:12:40   Batt Dischg Cur Limited    281 A (40.72463768115942%), MinCell: 3383mV, MaxPackTemp: 34C
 00006     05/21/2018 21:12:50   0x12 0x00 0xfe 0x33
";

const BMS_LOG: &str = "Zero BMS log

Initial date       Mar 04 2017 09:14:56
BMS serial number  2017_bms_1ac2f1_00044
Pack serial number 4044101

Printing 3 of 3 log entries..

 Entry    Time of Log            Event                      Conditions
+--------+----------------------+--------------------------+----------------------------------
 00001     05/21/2018 21:12:22   Module 00 Closing Contactor    vmod: 112.345V, maxsys: 112.456V, minsys: 112.123V
 00002     05/21/2018 21:12:35   Low Chassis Isolation 1234 KOhms to cell 27
 00003     05/21/2018 21:12:55   Module 00 Opening Contactor    vmod: 112.345V
";

fn write_log(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn malformed_line_is_skipped_not_fatal() {
    let file = write_log(MBB_LOG);
    let log = LogFile::open(file.path(), DecoderConfig::new()).unwrap();

    let stats = log.stats();
    assert_eq!(stats.total_lines, 6);
    assert_eq!(stats.decoded_lines, stats.total_lines - 1);
    assert_eq!(stats.failed_lines, 1);
    assert_eq!(
        log.entries().iter().map(|e| e.entry).collect::<Vec<_>>(),
        vec![1, 2, 3, 5, 6]
    );
    assert_eq!(log.path(), Some(file.path()));
}

#[test]
fn decodes_every_stage() {
    let file = write_log(MBB_LOG);
    let log = LogFile::open(file.path(), DecoderConfig::new()).unwrap();
    let entries = log.entries();

    assert_eq!(log.header().source(), Some(LogSource::Mbb));
    assert_eq!(log.header().vehicle().unwrap().platform.as_deref(), Some("SDS"));

    assert_eq!(entries[0].event, "Disarmed");
    assert_eq!(entries[0].conditions.len(), 12);
    assert_eq!(entries[1].component, Component::Controller);
    assert_eq!(entries[2].event_type, Some(EventType::Riding));
    assert_eq!(entries[3].event_type, Some(EventType::Limit));
    assert_eq!(entries[3].conditions["BattAmps"], "281");
    assert_eq!(entries[4].event_type, Some(EventType::Unknown));
    assert_eq!(entries[4].event, "");

    let activities: Vec<SegmentActivity> =
        entries.iter().map(|e| e.segment.unwrap().activity).collect();
    assert_eq!(
        activities,
        vec![
            SegmentActivity::Stopped,
            SegmentActivity::Stopped,
            SegmentActivity::Riding,
            SegmentActivity::Riding,
            SegmentActivity::Riding,
        ]
    );
}

#[test]
fn refresh_picks_up_new_lines() {
    let mut file = write_log(MBB_LOG);
    let mut log = LogFile::open(file.path(), DecoderConfig::new()).unwrap();
    assert_eq!(log.entries().len(), 5);

    writeln!(file, " 00007     05/21/2018 21:13:00   Disarmed").unwrap();
    file.flush().unwrap();
    log.refresh().unwrap();
    assert_eq!(log.entries().len(), 6);
    assert_eq!(log.entries()[5].entry, 7);
}

#[test]
fn joined_mbb_and_bms() {
    let mbb_file = write_log(MBB_LOG);
    let bms_file = write_log(BMS_LOG);
    let mbb = LogFile::open(mbb_file.path(), DecoderConfig::new()).unwrap();
    let bms = LogFile::open(bms_file.path(), DecoderConfig::new()).unwrap();
    assert_eq!(bms.header().source(), Some(LogSource::Bms));

    let mut joined = JoinedLog::new(mbb, [("bms".to_string(), bms)]);
    let entries = joined.entries();
    assert_eq!(entries.len(), 8);
    assert!(entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    assert_eq!(entries[1].source.as_deref(), Some("bms"));
    assert_eq!(entries[1].segment.unwrap().activity, SegmentActivity::Started);

    let columns = output::tabular_columns(entries);
    assert!(columns.iter().any(|c| c == "source"));
    assert!(columns.iter().any(|c| c == "ImpedanceKOhms"));
    let row = output::tabular_row(&entries[1], &columns, TabularOptions::default());
    let source_idx = columns.iter().position(|c| c == "source").unwrap();
    assert_eq!(row[source_idx], "bms");

    joined.refresh_deep().unwrap();
    assert_eq!(joined.entries().len(), 8);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = LogFile::open(&dir.path().join("absent.txt"), DecoderConfig::new()).unwrap_err();
    assert!(matches!(err, DecoderError::Io(_)));
}
