//!
//! Scans context permutations of a `.sc` program and reports
//! contextuality witnesses.
//!
//! Usage: `ctxscan <program.sc> --world W.json --emit-report R.json
//!         [--window N] [--max-perms N] [--emit-dir DIR]`

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info, warn};

use semio_ast::check_strict;
use semio_contracts::write_canonical_json;
use semio_ctxscan::{scan, ScanOptions};
use semio_parser::parse_program_file;
use semio_world::World;

#[derive(Parser, Debug)]
#[command(name = "ctxscan")]
#[command(about = "Scan context permutations and report contextuality witnesses")]
struct Args {
    /// Path to the .sc program
    program: PathBuf,

    /// Path to the world JSON
    #[arg(long)]
    world: PathBuf,

    /// Output path for the ctxscan report
    #[arg(long = "emit-report")]
    emit_report: PathBuf,

    /// Sliding window size (whole chain when omitted)
    #[arg(long)]
    window: Option<usize>,

    /// Upper bound on distinct permutations per window
    #[arg(long = "max-perms", default_value = "720")]
    max_perms: usize,

    /// Directory for per-variant traces
    #[arg(long = "emit-dir")]
    emit_dir: Option<PathBuf>,
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

    let mut options = ScanOptions::new(args.window.unwrap_or(regime.chain.len()));
    options.max_perms_per_window = args.max_perms;

    let program_file = semio_tools::portable_path(&args.program);
    let world_file = semio_tools::portable_path(&args.world);

    let outcome = match scan(&regime, &world, &program_file, &world_file, &options) {
        Ok(o) => o,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    if let Some(ref dir) = args.emit_dir {
        for variant in &outcome.variant_traces {
            let path = dir.join(format!(
                "w{}_perm_{:02}.trace.json",
                variant.window_start, variant.index
            ));
            if let Err(e) = write_canonical_json(&path, &variant.trace) {
                error!("{}", e);
                process::exit(1);
            }
        }
    }

    if let Err(e) = write_canonical_json(&args.emit_report, &outcome.report) {
        error!("{}", e);
        process::exit(1);
    }

    let report = &outcome.report;
    info!("Scan complete: {}", report.baseline_ctx);
    info!("  - Windows: {}", report.windows.len());
    info!("  - Variants: {}", outcome.variant_traces.len());
    info!("  - dkappa_max: {}", report.dkappa_max);
    info!(
        "  - noncommuting_fraction: {}",
        report.noncommuting_fraction
    );
    if report.noncontextual {
        info!("  - No contextuality witnesses");
    } else {
        warn!("  - Witnesses: {}", report.witnesses.len());
        for witness in &report.witnesses {
            warn!(
                "    {} vs {} at {} ({} != {})",
                witness.ctx_base,
                witness.ctx_variant,
                witness.projection,
                witness.baseline_obj,
                witness.variant_obj
            );
        }
    }
    info!("  - Report: {}", args.emit_report.display());
}
