//! Transform operators
//!
//! The operator catalog is closed per language version. Adding a variant
//! is a contract-breaking change; `Operator` is therefore a plain enum,
//! never open dispatch.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One transform operator applied to a sensed scalar.
///
/// `JitterU` is the only variant that consumes RNG state: one uniform
/// draw in `[-epsilon, epsilon]` per application.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum Operator {
    /// Add a constant.
    Add { arg: f64 },
    /// Collapse to `+1.0` for positive inputs, `-1.0` otherwise.
    Sign,
    /// Add one uniform draw from `[-arg, arg]`.
    JitterU { arg: f64 },
}

impl Operator {
    /// Operator name as written in source and in canonical labels.
    pub fn name(&self) -> &'static str {
        match self {
            Operator::Add { .. } => "Add",
            Operator::Sign => "Sign",
            Operator::JitterU { .. } => "JitterU",
        }
    }

    /// Numeric argument, if the variant carries one.
    pub fn arg(&self) -> Option<f64> {
        match self {
            Operator::Add { arg } | Operator::JitterU { arg } => Some(*arg),
            Operator::Sign => None,
        }
    }

    /// Whether applying this operator consumes an RNG draw.
    pub fn consumes_rng(&self) -> bool {
        matches!(self, Operator::JitterU { .. })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.arg() {
            Some(arg) => write!(f, "{}({})", self.name(), arg),
            None => write!(f, "{}", self.name()),
        }
    }
}

/// Ordered composition of operators. Order is semantically meaningful:
/// composition is generally non-commutative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorChain(pub Vec<Operator>);

impl OperatorChain {
    pub fn new(ops: Vec<Operator>) -> Self {
        Self(ops)
    }

    pub fn ops(&self) -> &[Operator] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical composition string, e.g. `Add(0.2)>>Add(0.3)`.
    ///
    /// This rendering is the context label recorded on trace events and
    /// the ordering key for context-scan variants.
    pub fn canonical(&self) -> String {
        self.0
            .iter()
            .map(|op| op.to_string())
            .collect::<Vec<_>>()
            .join(">>")
    }
}

impl fmt::Display for OperatorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

impl From<Vec<Operator>> for OperatorChain {
    fn from(ops: Vec<Operator>) -> Self {
        Self(ops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_rendering() {
        let chain = OperatorChain::new(vec![
            Operator::Add { arg: 0.2 },
            Operator::Add { arg: 0.3 },
        ]);
        assert_eq!(chain.canonical(), "Add(0.2)>>Add(0.3)");
    }

    #[test]
    fn test_canonical_integral_args_render_bare() {
        let chain = OperatorChain::new(vec![Operator::Add { arg: 1.0 }, Operator::Sign]);
        assert_eq!(chain.canonical(), "Add(1)>>Sign");
    }

    #[test]
    fn test_serde_round_trip_preserves_order() {
        let chain = OperatorChain::new(vec![
            Operator::Sign,
            Operator::JitterU { arg: 0.1 },
            Operator::Add { arg: -0.5 },
        ]);
        let json = serde_json::to_string(&chain).unwrap();
        let back: OperatorChain = serde_json::from_str(&json).unwrap();
        assert_eq!(back, chain);
        assert_eq!(back.len(), 3);
    }
}
