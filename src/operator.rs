// Copyright 2026 Martin Pool

//! Catalog of mutation operators.
//!
//! The actual traversal that finds mutation sites for each genre lives in
//! [`crate::visit`]; this module is the operator's self-description: a
//! stable name plus a handful of `(before, after)` examples that document
//! and property-test the contract each genre promises to uphold.

use crate::mutant::Genre;

/// One worked example of a genre in action: source text before, and one
/// possible mutated replacement after.
pub struct Example {
    pub before: &'static str,
    pub after: &'static str,
}

/// Static description of one operator (mutation genre).
pub struct Operator {
    pub genre: Genre,
    pub examples: &'static [Example],
}

impl Operator {
    pub fn name(&self) -> &'static str {
        self.genre.name()
    }
}

/// All built-in operators, in a stable order used by `list operators`.
pub fn catalog() -> Vec<Operator> {
    vec![
        Operator {
            genre: Genre::FnValue,
            examples: &[Example {
                before: "fn double(x: u32) -> u32 { x * 2 }",
                after: "fn double(x: u32) -> u32 { 0 }",
            }],
        },
        Operator {
            genre: Genre::BinaryOperator,
            examples: &[Example {
                before: "a == b",
                after: "a != b",
            }],
        },
        Operator {
            genre: Genre::UnaryOperator,
            examples: &[Example {
                before: "!condition",
                after: "condition",
            }],
        },
        Operator {
            genre: Genre::MatchArm,
            examples: &[Example {
                before: "match x { Some(v) => v, _ => 0 }",
                after: "match x { _ => 0 }",
            }],
        },
        Operator {
            genre: Genre::MatchArmGuard,
            examples: &[Example {
                before: "match x { v if v > 0 => v, _ => 0 }",
                after: "match x { v if true => v, _ => 0 }",
            }],
        },
        Operator {
            genre: Genre::StructField,
            examples: &[Example {
                before: "Config { timeout: 10, ..Default::default() }",
                after: "Config { ..Default::default() }",
            }],
        },
    ]
}
