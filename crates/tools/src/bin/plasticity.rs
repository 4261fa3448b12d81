//!
//! Computes a plasticity report from one or more trace files.
//!
//! Usage: `plasticity <trace.json>... --ctx CTX --channel CH
//!         --emit-report R.json [--window-size N] [--window-step N]`

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info};

use semio_contracts::write_canonical_json;
use semio_plasticity::{compute_plasticity_report, PlasticityOptions};

#[derive(Parser, Debug)]
#[command(name = "plasticity")]
#[command(about = "Compute a deterministic plasticity report from trace files")]
struct Args {
    /// Trace files to analyze
    #[arg(required = true)]
    traces: Vec<PathBuf>,

    /// Context label to filter events by
    #[arg(long)]
    ctx: String,

    /// Channel to filter events by
    #[arg(long)]
    channel: String,

    /// Output path for the report
    #[arg(long = "emit-report")]
    emit_report: PathBuf,

    /// Window size in events
    #[arg(long = "window-size", default_value = "10")]
    window_size: usize,

    /// Window step in events
    #[arg(long = "window-step", default_value = "10")]
    window_step: usize,
}

fn main() {
    semio_tools::init_logging();

    let args = Args::parse();

    let mut options = PlasticityOptions::new(&args.ctx, &args.channel);
    options.window_size = args.window_size;
    options.window_step = args.window_step;

    let report = match compute_plasticity_report(&args.traces, &options) {
        Ok(r) => r,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    if let Err(e) = write_canonical_json(&args.emit_report, &report) {
        error!("{}", e);
        process::exit(1);
    }

    info!("Plasticity analysis complete: {}", report.verdict.plasticity_state);
    info!("  - Events: {}", report.evidence.n_events);
    info!(
        "  - partition_stability: {}",
        report.metrics.partition_stability
    );
    info!("  - noise_sensitivity: {}", report.metrics.noise_sensitivity);
    info!("  - coherence_loss: {}", report.metrics.coherence_loss);
    info!("  - trend: {}", report.verdict.trend);
    info!("  - Report: {}", args.emit_report.display());
}
