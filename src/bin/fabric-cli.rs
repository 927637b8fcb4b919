#![forbid(unsafe_code)]
use clap::Parser;
use colored::*;
use fabric_cli::cli::{normalize_legacy_flags, run, Cli};
use fabric_cli::error::CliError;
use fabric_cli::sdk::FabricTools;
use std::io;
use std::process;
use tracing::Level;

fn main() {
    let args = normalize_legacy_flags(std::env::args_os());
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            eprintln!("{}", CliError::from(e));
            process::exit(1);
        }
        Err(e) => {
            // --help and --version
            let _ = e.print();
            process::exit(0);
        }
    };

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = run(&cli, FabricTools::connect, &mut out) {
        eprintln!("{}", e.to_string().red());
        process::exit(1);
    }
}
