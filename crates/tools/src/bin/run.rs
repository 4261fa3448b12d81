//!
//! Executes a `.sc` program against a world and emits the trace and
//! manifest artifacts.
//!
//! Usage: `run <program.sc> --world W.json --emit-trace T.json --emit-manifest M.json`

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info};

use semio_ast::check_strict;
use semio_contracts::write_canonical_json;
use semio_parser::parse_program_file;
use semio_runtime::execute;
use semio_world::World;

#[derive(Parser, Debug)]
#[command(name = "run")]
#[command(about = "Execute a .sc program against a world")]
struct Args {
    /// Path to the .sc program
    program: PathBuf,

    /// Path to the world JSON
    #[arg(long)]
    world: PathBuf,

    /// Output path for the trace artifact
    #[arg(long = "emit-trace")]
    emit_trace: PathBuf,

    /// Output path for the manifest artifact
    #[arg(long = "emit-manifest")]
    emit_manifest: PathBuf,
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

    let world = match World::load(&args.world) {
        Ok(w) => w,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let provenance = match semio_tools::provenance_for(&args.program, &args.world) {
        Ok(p) => p,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let (trace, manifest) = match execute(&regime, &world, &provenance) {
        Ok(out) => out,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    if let Err(e) = write_canonical_json(&args.emit_trace, &trace) {
        error!("{}", e);
        process::exit(1);
    }
    if let Err(e) = write_canonical_json(&args.emit_manifest, &manifest) {
        error!("{}", e);
        process::exit(1);
    }

    info!("Run complete: {}", manifest.run_id);
    info!("  - Events: {}", trace.events.len());
    if let Some(summary) = &trace.summary {
        info!(
            "  - N={} deltaT={} rho={} kappa={}",
            summary.n, summary.delta_t, summary.rho, summary.kappa
        );
    }
    info!("  - Trace: {}", args.emit_trace.display());
    info!("  - Manifest: {}", args.emit_manifest.display());
}
