//! Zero Log CLI Application
//!
//! Command-line interface for the Zero Motorcycles log decoder.
//! It uses the zero-log-decoder library and adds:
//! - TOML configuration
//! - Batch conversion of logs to CSV/TSV/JSON (in parallel)
//! - Joining MBB and BMS logs into one timeline
//! - VIN lookup and segment summaries

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use zero_log_decoder::{
    decode_vin, summarize_segments, DecodeStats, DecoderConfig, JoinedLog, LogFile,
    TabularOptions,
};

mod config;
mod report;

use config::{AppConfig, OutputFormat, SecondaryLogConfig};

/// Zero Log Reader - Decode Zero Motorcycles MBB and BMS logs
#[derive(Parser, Debug)]
#[command(name = "zero-log-cli")]
#[command(about = "Decode Zero Motorcycles MBB/BMS logs", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert logs, writing one output file per input
    Convert {
        /// Decoded-text log files (MBB or BMS)
        #[arg(value_name = "LOG", required = true)]
        logs: Vec<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Merge a primary log with tagged secondary logs
    Join {
        /// Primary log, usually the MBB log
        #[arg(value_name = "LOG")]
        primary: PathBuf,

        /// Secondary log (can be repeated)
        #[arg(long = "secondary", value_name = "TAG=FILE", value_parser = config::parse_secondary)]
        secondaries: Vec<SecondaryLogConfig>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Decode a vehicle identification number
    Vin {
        vin: String,

        #[arg(long, value_enum, default_value_t = SummaryFormat::Text)]
        format: SummaryFormat,
    },

    /// List the stopped/started/riding/charging segments of a log
    Segments {
        #[arg(value_name = "LOG")]
        log: PathBuf,

        #[arg(long, value_enum, default_value_t = SummaryFormat::Text)]
        format: SummaryFormat,
    },
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Output format [default: from config, else tsv]
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file, `-` for stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Directory for generated output files
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Keep unit suffixes in tabular cells
    #[arg(long)]
    keep_units: bool,

    /// Skip segment annotation
    #[arg(long)]
    no_segments: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SummaryFormat {
    Text,
    Json,
}

/// Effective output settings: config file values overridden by flags
#[derive(Debug, Clone)]
struct OutputSettings {
    decoder: DecoderConfig,
    format: OutputFormat,
    output: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    options: TabularOptions,
}

impl OutputSettings {
    fn resolve(args: &OutputArgs, config: &AppConfig) -> Self {
        let mut decoder = config.decoder.clone();
        if args.no_segments {
            decoder = decoder.with_segment_annotation(false);
        }
        Self {
            decoder,
            format: args.format.unwrap_or(config.output.format),
            output: args.output.clone(),
            output_dir: args
                .output_dir
                .clone()
                .or_else(|| config.output.output_dir.clone()),
            options: TabularOptions {
                omit_units: config.output.omit_units && !args.keep_units,
            },
        }
    }

    fn destination(&self, input: &Path) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            report::output_path(input, self.output_dir.as_deref(), self.format)
        })
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Zero Log CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using decoder library v{}", zero_log_decoder::VERSION);

    let config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    match &args.command {
        Command::Convert { logs, output } => {
            convert_mode(logs, &OutputSettings::resolve(output, &config))
        }
        Command::Join {
            primary,
            secondaries,
            output,
        } => {
            let mut all = config.join.secondaries.clone();
            all.extend(secondaries.iter().cloned());
            join_mode(primary, &all, &OutputSettings::resolve(output, &config))
        }
        Command::Vin { vin, format } => vin_mode(vin, *format),
        Command::Segments { log, format } => segments_mode(log, &config.decoder, *format),
    }
}

/// Convert each log to its own output, in parallel
fn convert_mode(logs: &[PathBuf], settings: &OutputSettings) -> Result<()> {
    if logs.len() > 1 && settings.output.is_some() {
        bail!("--output takes a single log; use --output-dir for several");
    }

    let results: Vec<(&PathBuf, Result<(DecodeStats, PathBuf)>)> = logs
        .par_iter()
        .map(|path| (path, convert_one(path, settings)))
        .collect();

    let mut failures = 0;
    for (path, result) in results {
        match result {
            Ok((stats, destination)) => {
                report_stats(path, &stats);
                log::info!("Wrote {:?}", destination);
            }
            Err(e) => {
                failures += 1;
                log::error!("{:?}: {:#}", path, e);
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} logs failed to convert", failures, logs.len());
    }
    Ok(())
}

fn convert_one(path: &Path, settings: &OutputSettings) -> Result<(DecodeStats, PathBuf)> {
    let log = LogFile::open(path, settings.decoder.clone())
        .with_context(|| format!("Failed to decode log: {:?}", path))?;
    let destination = settings.destination(path);
    let mut writer = report::open_output(&destination)?;
    report::write_log(
        &mut writer,
        settings.format,
        log.header(),
        log.entries(),
        settings.options,
    )?;
    Ok((log.stats(), destination))
}

/// Merge the primary log with its secondaries into one output
fn join_mode(
    primary: &Path,
    secondaries: &[SecondaryLogConfig],
    settings: &OutputSettings,
) -> Result<()> {
    let primary_log = LogFile::open(primary, settings.decoder.clone())
        .with_context(|| format!("Failed to decode log: {:?}", primary))?;
    report_stats(primary, &primary_log.stats());

    let mut logs = Vec::with_capacity(secondaries.len());
    for secondary in secondaries {
        let log = LogFile::open(&secondary.file, settings.decoder.clone())
            .with_context(|| format!("Failed to decode {} log: {:?}", secondary.tag, secondary.file))?;
        report_stats(&secondary.file, &log.stats());
        logs.push((secondary.tag.clone(), log));
    }

    let joined = JoinedLog::new(primary_log, logs);
    let destination = settings.output.clone().unwrap_or_else(|| {
        let stem = primary
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let renamed = primary.with_file_name(format!("{}_joined", stem));
        report::output_path(&renamed, settings.output_dir.as_deref(), settings.format)
    });

    let mut writer = report::open_output(&destination)?;
    report::write_log(
        &mut writer,
        settings.format,
        joined.primary().header(),
        joined.entries(),
        settings.options,
    )?;
    log::info!(
        "Joined {} entries from {} logs into {:?}",
        joined.entries().len(),
        secondaries.len() + 1,
        destination
    );
    Ok(())
}

fn vin_mode(vin: &str, format: SummaryFormat) -> Result<()> {
    let descriptor = decode_vin(vin)?;
    match format {
        SummaryFormat::Text => println!("{}", descriptor.to_text()),
        SummaryFormat::Json => println!("{}", serde_json::to_string_pretty(&descriptor)?),
    }
    Ok(())
}

fn segments_mode(path: &Path, decoder: &DecoderConfig, format: SummaryFormat) -> Result<()> {
    let log = LogFile::open(path, decoder.clone().with_segment_annotation(true))?;
    let segments = summarize_segments(log.entries());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        SummaryFormat::Text => report::write_segments_text(&mut out, &segments)?,
        SummaryFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &segments)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Per-file summary on stderr, so stdout output stays clean
fn report_stats(input: &Path, stats: &DecodeStats) {
    eprintln!(
        "{}: decoded {}/{} lines, {} failed",
        input.display(),
        stats.decoded_lines,
        stats.total_lines,
        stats.failed_lines
    );
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
