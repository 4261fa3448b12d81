//!
//! Optimizes a `.sc` program's operator chain and verifies the
//! resulting proof.
//!
//! Usage: `optimize <program.sc> --emit-proof P.json [--world W.json]
//!         [--emit-ast AST.json]`
//!
//! The structural proof check always runs. Passing `--world` also runs
//! the semantic check: both chains are executed and their traces
//! diffed.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info};

use semio_ast::{check_strict, AstEnvelope};
use semio_contracts::write_canonical_json;
use semio_optimize::{optimize, verify, verify_structural};
use semio_parser::parse_program_file;
use semio_world::World;

#[derive(Parser, Debug)]
#[command(name = "optimize")]
#[command(about = "Optimize an operator chain and emit a machine-checkable proof")]
struct Args {
    /// Path to the .sc program
    program: PathBuf,

    /// Output path for the proof artifact
    #[arg(long = "emit-proof")]
    emit_proof: PathBuf,

    /// World JSON enabling the semantic proof check
    #[arg(long)]
    world: Option<PathBuf>,

    /// Output path for the optimized program's AST envelope
    #[arg(long = "emit-ast")]
    emit_ast: Option<PathBuf>,
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

    let (optimized, proof) = optimize(&regime);

    match args.world {
        Some(ref world_path) => {
            let world = match World::load(world_path) {
                Ok(w) => w,
                Err(e) => {
                    error!("{}", e);
                    process::exit(1);
                }
            };
            if let Err(e) = verify(&proof, &regime, &world) {
                error!("proof verification failed: {}", e);
                process::exit(1);
            }
            info!("Proof verified (structural + semantic)");
        }
        None => {
            if let Err(e) = verify_structural(&proof, &proof.original, &proof.optimized) {
                error!("proof verification failed: {}", e);
                process::exit(1);
            }
            info!("Proof verified (structural)");
        }
    }

    if let Err(e) = write_canonical_json(&args.emit_proof, &proof) {
        error!("{}", e);
        process::exit(1);
    }

    if let Some(ref path) = args.emit_ast {
        let program_file = semio_tools::portable_path(&args.program);
        let ast = AstEnvelope::from_regime(&optimized, &program_file);
        if let Err(e) = write_canonical_json(path, &ast) {
            error!("{}", e);
            process::exit(1);
        }
    }

    info!("Optimization complete");
    info!("  - Original:  {}", proof.original.canonical());
    info!("  - Optimized: {}", optimized.chain.canonical());
    info!("  - Steps: {}", proof.steps.len());
    info!("  - Proof: {}", args.emit_proof.display());
}
