//! The main entry point for the `bulkrep` command-line application.
//!
//! This file is responsible for parsing command-line arguments, setting up
//! logging, and handing the run to the `bulkrep` library.

use bulkrep::cli;
use bulkrep::config::JobConfig;
use bulkrep::errors::Result;
use bulkrep::replacer;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::env;
use std::io;
use std::process;

fn main() {
    // Bare `bulkrep` gets a short usage primer instead of clap's error.
    if env::args_os().len() == 1 {
        eprintln!("⚡ Parallel literal find-and-replace across a file tree\n");
        eprintln!("USAGE EXAMPLES:");
        eprintln!("  bulkrep -o foo -n bar -p .               # Replace foo with bar");
        eprintln!("  bulkrep -o foo -n bar -p . --dry-run     # Preview counts only");
        eprintln!("  bulkrep -o foo -n '' -p notes.md         # Delete every foo");
        eprintln!("\nRun 'bulkrep --help' for all options");
        process::exit(2);
    }

    let args = cli::parse_args();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(args: &cli::Args) -> Result<()> {
    let config = JobConfig::from_args(args)?;
    log::debug!("Job configuration: {config:?}");

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    replacer::run_replace(&config, &args.path, args.format, args.progress, &mut writer)?;

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();

    if let Err(e) = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("Warning: logging is unavailable: {e}");
    }
}
