//! # Teleop Link
//!
//! Operator command link: turns controller samples into motor command
//! frames and writes them to a serial radio at a fixed cycle rate.
//!
//! Samples are read as JSON lines from stdin or a recorded file (see
//! `io::source::ReplaySource`). With `--dry-run` frames are logged
//! instead of written to the port.

use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use teleop_common::config::LogLevel;
use teleop_common::consts::DEFAULT_CONFIG_PATH;
use teleop_common::link::config::LinkConfig;
use teleop_link::config::{Overrides, load_config, summary};
use teleop_link::cycle::ControlLoop;
use teleop_link::io::sink::{ByteSink, MemorySink, SerialSink};
use teleop_link::io::source::{InputSource, ReplaySource};
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// Teleop Link: operator command link
#[derive(Parser, Debug)]
#[command(name = "teleop_link")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Shapes controller input into motor command frames for a serial radio link")]
struct Args {
    /// Path to the link configuration TOML.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Controller samples as JSON lines ("-" reads stdin).
    #[arg(short, long, value_name = "FILE", default_value = "-")]
    input: PathBuf,

    /// Serial device, overrides `serial.device`.
    #[arg(long)]
    device: Option<String>,

    /// Baud rate, overrides `serial.baud_rate`.
    #[arg(long)]
    baud: Option<u32>,

    /// Log frames instead of opening the serial port.
    #[arg(long)]
    dry_run: bool,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,

    /// Stop after this many cycles.
    #[arg(long, value_name = "N")]
    cycles: Option<u64>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            device: self.device.clone(),
            baud_rate: self.baud,
        }
    }
}

fn main() {
    let args = Args::parse();
    let loaded = load_config(&args.config, &args.overrides());
    let base_level = loaded
        .as_ref()
        .map_or(LogLevel::Info, |config| config.shared.log_level);
    setup_tracing(&args, base_level);

    info!("Teleop Link v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = loaded
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|config| run(&args, &config));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Teleop Link shutdown complete");
}

fn run(args: &Args, config: &LinkConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Config OK ({}): {}", args.config.display(), summary(config));

    if args.print_config {
        println!("{}", toml::to_string_pretty(config)?);
        return Ok(());
    }

    // Setup signal handler for graceful shutdown.
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let source = open_input(&args.input)?;
    let sink: Box<dyn ByteSink> = if args.dry_run {
        info!("Dry run: frames are logged, serial port untouched");
        Box::new(MemorySink::logging())
    } else {
        Box::new(SerialSink::open(&config.serial)?)
    };

    let mut control = ControlLoop::new(config, source, sink, Instant::now());
    let end = control.run(&running, args.cycles)?;
    info!(?end, "Link closed");

    Ok(())
}

fn open_input(path: &Path) -> Result<Box<dyn InputSource>, Box<dyn std::error::Error>> {
    if path.as_os_str() == "-" {
        info!("Reading controller samples from stdin");
        return Ok(Box::new(ReplaySource::new(std::io::stdin().lock())));
    }
    let file = File::open(path)
        .map_err(|e| format!("cannot open input {}: {e}", path.display()))?;
    info!("Replaying controller samples from {}", path.display());
    Ok(Box::new(ReplaySource::new(BufReader::new(file))))
}

fn setup_tracing(args: &Args, base: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        base.as_level()
    };
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
