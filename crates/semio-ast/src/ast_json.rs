//! `semiocore.ast.v1` envelope
//!
//! The interchange form of a parsed program. The execution core consumes
//! regimes; the envelope is what crosses tool boundaries as JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use semio_contracts::AST_SCHEMA_V1;

use crate::op::OperatorChain;
use crate::regime::Regime;
use crate::stmt::Statement;

/// Envelope errors
#[derive(Debug, Error)]
pub enum AstError {
    #[error("unsupported AST schema: {0}")]
    UnsupportedSchema(String),

    #[error("unsupported AST node: {0}")]
    UnsupportedNode(String),
}

/// Top-level AST artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AstEnvelope {
    pub schema: String,
    /// Informational provenance path, not a stable identifier.
    pub program_file: String,
    pub ast: AstProgram,
}

/// Program node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AstProgram {
    pub node: String,
    pub context: OperatorChain,
    pub body: Vec<Statement>,
}

impl AstEnvelope {
    /// Wrap a regime in the v1 envelope.
    pub fn from_regime(regime: &Regime, program_file: &str) -> Self {
        Self {
            schema: AST_SCHEMA_V1.to_string(),
            program_file: program_file.to_string(),
            ast: AstProgram {
                node: "Program".to_string(),
                context: regime.chain.clone(),
                body: regime.body.clone(),
            },
        }
    }

    /// Unwrap an already-validated envelope back into a regime.
    pub fn into_regime(self) -> Result<Regime, AstError> {
        if self.schema != AST_SCHEMA_V1 {
            return Err(AstError::UnsupportedSchema(self.schema));
        }
        if self.ast.node != "Program" {
            return Err(AstError::UnsupportedNode(self.ast.node));
        }
        Ok(Regime::new(self.ast.context, self.ast.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::Operator;

    #[test]
    fn test_envelope_round_trip() {
        let regime = Regime::new(
            OperatorChain::new(vec![Operator::Add { arg: 0.5 }, Operator::Sign]),
            vec![
                Statement::Tick { dt: 1.0 },
                Statement::Sense {
                    binding: "x".into(),
                    channel: "ch".into(),
                },
                Statement::Commit { binding: "x".into() },
                Statement::Summarize,
            ],
        );

        let env = AstEnvelope::from_regime(&regime, "fixtures/p.sc");
        let json = serde_json::to_string(&env).unwrap();
        let back: AstEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back.into_regime().unwrap(), regime);
    }

    #[test]
    fn test_unknown_schema_rejected() {
        let regime = Regime::new(OperatorChain::new(vec![Operator::Sign]), vec![]);
        let mut env = AstEnvelope::from_regime(&regime, "p.sc");
        env.schema = "semiocore.ast.v9".into();
        assert!(matches!(
            env.into_regime(),
            Err(AstError::UnsupportedSchema(_))
        ));
    }
}
