//!
//! Parses a `.sc` program and runs the Strict gate.
//!
//! Usage: `check <program.sc>`

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info};

use semio_ast::check_strict;
use semio_parser::parse_program_file;

#[derive(Parser, Debug)]
#[command(name = "check")]
#[command(about = "Parse a .sc program and run Strict-gate checks")]
struct Args {
    /// Path to the .sc program
    program: PathBuf,
}

fn main() {
    semio_tools::init_logging();

    let args = Args::parse();

    let regime = match parse_program_file(&args.program) {
        Ok(r) => r,
        Err(e) => {
            error!("{}", e);
            process::exit(2);
        }
    };

    if let Err(e) = check_strict(&regime) {
        error!("{}", e);
        process::exit(2);
    }

    info!("OK: {}", args.program.display());
    info!("  - Context: {}", regime.chain.canonical());
    info!("  - Statements: {}", regime.body.len());
    if let Some(seed) = regime.seed() {
        info!("  - Seed: {}", seed);
    }
}
