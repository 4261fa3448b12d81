//!
//! Parses a `.sc` program and emits the stable AST envelope and the
//! language manifest.
//!
//! Usage: `parse <program.sc> [--emit-ast PATH] [--emit-lang PATH]`

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::error;

use semio_ast::AstEnvelope;
use semio_contracts::{to_canonical_json, write_canonical_json};
use semio_parser::{parse_program_file, LangManifest};

#[derive(Parser, Debug)]
#[command(name = "parse")]
#[command(about = "Parse a .sc program and emit a stable AST JSON")]
struct Args {
    /// Path to the .sc program
    program: PathBuf,

    /// Output path for the AST envelope (stdout when omitted)
    #[arg(long = "emit-ast")]
    emit_ast: Option<PathBuf>,

    /// Output path for the language manifest
    #[arg(long = "emit-lang")]
    emit_lang: Option<PathBuf>,
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

    let program_file = semio_tools::portable_path(&args.program);
    let ast = AstEnvelope::from_regime(&regime, &program_file);

    if let Some(ref path) = args.emit_lang {
        let lang = LangManifest::new(&program_file);
        if let Err(e) = write_canonical_json(path, &lang) {
            error!("{}", e);
            process::exit(1);
        }
    }

    match args.emit_ast {
        Some(ref path) => {
            if let Err(e) = write_canonical_json(path, &ast) {
                error!("{}", e);
                process::exit(1);
            }
        }
        None => match to_canonical_json(&ast) {
            Ok(text) => print!("{}", text),
            Err(e) => {
                error!("{}", e);
                process::exit(1);
            }
        },
    }
}
