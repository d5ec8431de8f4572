//! CLI driver for the library simulator

use chained_hashtable::{Simulator, TableConfig};
use clap::{ArgAction, Parser};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    prelude::*,
    registry::Registry,
};

macro_rules! die {
    ($fmt:literal, $($arg:tt)*) => {{
        eprintln!($fmt, $($arg)*);
        std::process::exit(1);
    }};

    ($msg:literal) => {{
        eprintln!($msg);
        std::process::exit(1);
    }};
}

fn init_tracing(quiet: bool, verbose: u8) {
    let level_filter = if quiet {
        LevelFilter::ERROR
    } else {
        match verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };

    // Bridge log crate macros to tracing (the library logs through `log`)
    if tracing_log::LogTracer::init().is_err() {
        die!("INTERNAL ERROR: setting log tracer failed");
    }

    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("LIBRARY_LOG")
        .from_env_lossy();

    let subscriber = Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .compact(),
    );

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        die!("INTERNAL ERROR: setting default tracing::subscriber failed");
    }
}

/// Smaller ratios make the first insertion allocate a huge bucket array.
const MIN_LOAD_FACTOR: f64 = 0.1;

fn parse_load_factor(s: &str) -> Result<f64, String> {
    let ratio: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if ratio.is_finite() && ratio >= MIN_LOAD_FACTOR {
        Ok(ratio)
    } else {
        Err(format!("load factor must be finite and >= {MIN_LOAD_FACTOR}"))
    }
}

/// Command-driven library simulator
#[derive(Parser, Debug)]
#[command(name = "library-sim")]
#[command(about = "Runs library commands (ADD_BOOK, BORROW, RETURN, ...) until EXIT")]
struct ToolArgs {
    /// Suppress all output except for errors. This overrides the -v flag.
    #[arg(short, long)]
    quiet: bool,

    /// Turn on verbose output. Supply -v multiple times to increase verbosity.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Initial bucket count of every table
    #[arg(short, long, default_value_t = chained_hashtable::config::DEFAULT_BUCKET_COUNT)]
    buckets: usize,

    /// Average chain length that triggers growth
    #[arg(
        short, long,
        default_value_t = chained_hashtable::config::DEFAULT_MAX_LOAD_FACTOR,
        value_parser = parse_load_factor,
    )]
    load_factor: f64,

    /// Command file (reads stdin if omitted)
    input: Option<PathBuf>,
}

fn main() {
    let args = ToolArgs::parse();
    init_tracing(args.quiet, args.verbose);

    let config = TableConfig::new()
        .initial_buckets(args.buckets)
        .max_load_factor(args.load_factor);
    tracing::debug!(?config, "Starting simulator");
    let mut sim = Simulator::new(config);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = match &args.input {
        Some(path) => match File::open(path) {
            Ok(file) => sim.run(BufReader::new(file), &mut out),
            Err(e) => die!("Cannot open {}: {e}", path.display()),
        },
        None => sim.run(io::stdin().lock(), &mut out),
    };

    if let Err(e) = result.and_then(|()| out.flush().map_err(Into::into)) {
        die!("{e}");
    }
}
