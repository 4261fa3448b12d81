//!
//! Replays a run deterministically from its manifest, optionally
//! asserting equivalence against a reference trace.
//!
//! Usage: `replay --manifest M.json --emit-trace T.json [--expect REF.json]`

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info};

use semio_contracts::write_canonical_json;
use semio_replay::{replay_and_check, replay_from_manifest};
use semio_runtime::Trace;

#[derive(Parser, Debug)]
#[command(name = "replay")]
#[command(about = "Replay a run deterministically from a manifest")]
struct Args {
    /// Path to the manifest JSON
    #[arg(long)]
    manifest: PathBuf,

    /// Output path for the replayed trace
    #[arg(long = "emit-trace")]
    emit_trace: PathBuf,

    /// Reference trace to compare against
    #[arg(long)]
    expect: Option<PathBuf>,
}

fn main() {
    semio_tools::init_logging();

    let args = Args::parse();

    let trace = match args.expect {
        Some(ref reference_path) => {
            let text = match fs::read_to_string(reference_path) {
                Ok(t) => t,
                Err(e) => {
                    error!("cannot read {}: {}", reference_path.display(), e);
                    process::exit(1);
                }
            };
            let reference: Trace = match serde_json::from_str(&text) {
                Ok(t) => t,
                Err(e) => {
                    error!("reference trace is not valid: {}", e);
                    process::exit(1);
                }
            };
            match replay_and_check(&args.manifest, &reference) {
                Ok(t) => {
                    info!("Replay matches reference trace");
                    t
                }
                Err(e) => {
                    error!("{}", e);
                    process::exit(1);
                }
            }
        }
        None => match replay_from_manifest(&args.manifest) {
            Ok(t) => t,
            Err(e) => {
                error!("{}", e);
                process::exit(1);
            }
        },
    };

    if let Err(e) = write_canonical_json(&args.emit_trace, &trace) {
        error!("{}", e);
        process::exit(1);
    }

    info!("Replay complete");
    info!("  - Events: {}", trace.events.len());
    info!("  - Trace: {}", args.emit_trace.display());
}
