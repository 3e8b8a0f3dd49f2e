//! # Analysis Errors
//!
//! Errors raised while analyzing predicates for index usability: expression
//! evaluation and range construction can both fail. These errors never abort
//! enumeration -- the analyzer logs them and treats the index as unusable.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    /// An expression could not be evaluated against a row.
    #[error("cannot evaluate expression: {0}")]
    Eval(String),
    /// An expression shape the range builder does not understand.
    #[error("unsupported expression in range analysis: {0}")]
    UnsupportedExpr(String),
}

pub type Result<T> = std::result::Result<T, PlanError>;
