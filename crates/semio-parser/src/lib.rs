//! `.sc` front-end
//!
//! Turns `.sc` source into the canonical regime model. The grammar is
//! line-oriented and small; tokenization uses logos, parsing is a short
//! recursive descent over the token stream.

pub mod error;
pub mod lexer;
pub mod parser;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use semio_ast::Regime;
use semio_contracts::{AST_SCHEMA_V1, LANG_SCHEMA_V1};

pub use error::ParseError;
pub use parser::parse_program;

/// Parse a `.sc` program file.
pub fn parse_program_file(path: &Path) -> Result<Regime, ParseError> {
    let source = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_program(&source)
}

/// `semiocore.lang.v1` manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LangManifest {
    pub schema: String,
    pub program_file: String,
    pub lang_version: String,
    pub features: Vec<String>,
    pub ast_schema: String,
}

impl LangManifest {
    pub fn new(program_file: &str) -> Self {
        Self {
            schema: LANG_SCHEMA_V1.to_string(),
            program_file: program_file.to_string(),
            lang_version: "1".to_string(),
            features: Vec::new(),
            ast_schema: AST_SCHEMA_V1.to_string(),
        }
    }
}
