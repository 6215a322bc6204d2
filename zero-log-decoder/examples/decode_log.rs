//! Standalone Zero log inspection tool
//!
//! Decodes an MBB or BMS log and prints its header, segment summary and
//! the first entries.
//!
//! Usage:
//!   decode_log <log_file.txt> [--limit <count>]
//!
//! Example:
//!   decode_log VIN_MBB_2018-05-20.txt --limit 20

use std::env;
use std::path::PathBuf;
use zero_log_decoder::{summarize_segments, DecoderConfig, HeaderMetadata, LogFile};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <log_file.txt> [--limit <count>]", args[0]);
        std::process::exit(1);
    }

    let path = PathBuf::from(&args[1]);
    let mut limit = 10usize;
    let mut i = 2;
    while i < args.len() {
        if args[i] == "--limit" && i + 1 < args.len() {
            limit = args[i + 1].parse().unwrap_or(limit);
            i += 2;
        } else {
            eprintln!("Unknown argument: {}", args[i]);
            std::process::exit(1);
        }
    }

    let log = match LogFile::open(&path, DecoderConfig::new()) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("Failed to decode {:?}: {}", path, e);
            std::process::exit(1);
        }
    };

    let header = log.header();
    println!("=== {} ===", header.title);
    match &header.metadata {
        HeaderMetadata::Mbb(mbb) => {
            println!("Serial: {:?}  VIN: {:?}", mbb.serial_no, mbb.vin);
            if let Some(vehicle) = &mbb.vehicle {
                println!("{}", vehicle.to_text());
            }
        }
        HeaderMetadata::Bms(bms) => {
            println!("Serial: {:?}  Pack: {:?}", bms.serial_no, bms.pack_serial_no);
        }
        HeaderMetadata::Unknown => println!("Unrecognized log type"),
    }

    let stats = log.stats();
    println!(
        "\nDecoded {}/{} lines ({} failed)",
        stats.decoded_lines, stats.total_lines, stats.failed_lines
    );

    println!("\n=== SEGMENTS ===");
    for segment in summarize_segments(log.entries()) {
        println!(
            "{:>4} {:<8} entries {}-{}",
            segment.id,
            segment.activity.as_str(),
            segment.first_entry,
            segment.last_entry
        );
    }

    println!("\n=== FIRST {} ENTRIES ===", limit);
    for entry in log.entries().iter().take(limit) {
        let timestamp = entry
            .timestamp
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>5} {} [{}] {}",
            entry.entry, timestamp, entry.component, entry.event
        );
        for (key, value) in &entry.conditions {
            println!("        {} = {}", key, value);
        }
    }
}
