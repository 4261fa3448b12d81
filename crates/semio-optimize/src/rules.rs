//! Rewrite rule catalog
//!
//! An explicit ordered list of pure pattern-match functions over
//! operator-chain windows, not a registry with runtime discovery: the
//! catalog order is the declared priority order, and proof structural
//! checks must reproduce it exactly.
//!
//! No rule touches `JitterU`. Removing or reordering a draw changes the
//! RNG counter stream, so any such rewrite would not preserve trace
//! equivalence.

use serde::{Deserialize, Serialize};

use semio_ast::Operator;
use semio_runtime::q10;

/// Identifier of a catalog rule, recorded on every rewrite step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    /// `Add(a) >> Add(b) => Add(a+b)`
    FuseAdd,
    /// `Sign >> Sign => Sign`
    SignIdem,
    /// `Add(0) => ∅`
    AddZero,
}

impl RuleId {
    pub fn name(&self) -> &'static str {
        match self {
            RuleId::FuseAdd => "fuse_add",
            RuleId::SignIdem => "sign_idem",
            RuleId::AddZero => "add_zero",
        }
    }
}

/// One rewrite rule: a window width and a pure matcher returning the
/// replacement for a matching window.
pub struct Rule {
    pub id: RuleId,
    /// Number of consecutive operators the matcher inspects.
    pub width: usize,
    pub matcher: fn(&[Operator]) -> Option<Vec<Operator>>,
}

fn fuse_add(window: &[Operator]) -> Option<Vec<Operator>> {
    match window {
        [Operator::Add { arg: a }, Operator::Add { arg: b }] => Some(vec![Operator::Add {
            // quantized so fused constants stay free of decimal-add artefacts
            arg: q10(a + b),
        }]),
        _ => None,
    }
}

fn sign_idem(window: &[Operator]) -> Option<Vec<Operator>> {
    match window {
        [Operator::Sign, Operator::Sign] => Some(vec![Operator::Sign]),
        _ => None,
    }
}

fn add_zero(window: &[Operator]) -> Option<Vec<Operator>> {
    match window {
        [Operator::Add { arg }] if *arg == 0.0 => Some(Vec::new()),
        _ => None,
    }
}

/// The catalog, in declared priority order.
pub const CATALOG: &[Rule] = &[
    Rule {
        id: RuleId::FuseAdd,
        width: 2,
        matcher: fuse_add,
    },
    Rule {
        id: RuleId::SignIdem,
        width: 2,
        matcher: sign_idem,
    },
    Rule {
        id: RuleId::AddZero,
        width: 1,
        matcher: add_zero,
    },
];

/// Upper bound on rewrite passes. Every catalog rule strictly shrinks
/// the chain, so a pass count beyond the initial length is impossible;
/// the bound still exists so termination never rests on that argument
/// alone.
pub const MAX_PASSES: usize = 10_000;

/// Find the catalog rule with a given id.
pub fn rule_by_id(id: RuleId) -> &'static Rule {
    CATALOG
        .iter()
        .find(|rule| rule.id == id)
        .expect("catalog covers every RuleId variant")
}
