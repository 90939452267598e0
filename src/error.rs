//! Formal error hierarchy for the ply-draping engine.
//!
//! Every failure the evaluator (C1-C7 in the design notes) can raise is a
//! variant of [`DrapeError`]. Validation (C6) is exhaustive and runs before
//! any evaluation, so a misconfigured laminate plan always fails with a
//! single, specific variant rather than a generic "invalid input" message.

use thiserror::Error;

/// Unified error type returned by every fallible operation in this crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DrapeError {
    #[error("invalid datum '{name}': {reason}")]
    InvalidDatum { name: String, reason: String },

    #[error("ply #{ply_index} references unknown material '{material}'")]
    UnknownMaterial { ply_index: usize, material: String },

    #[error("field '{0}' is not a cell field and cannot be derived from a point field")]
    UnknownField(String),

    #[error("'{0}' references unknown datum '{1}'")]
    UnknownDatum(String, String),

    #[error("operator {operator:?} cannot be applied to operand {operand}")]
    OperandArityMismatch { operator: String, operand: String },

    #[error("unrecognized condition operator '{0}'")]
    UnknownOperator(String),

    #[error("could not parse thickness expression '{expr}': {reason}")]
    ParseError { expr: String, reason: String },

    #[error(
        "plies #{first} and #{second} both resolve to output field name '{name}'"
    )]
    DuplicatePlyName {
        name: String,
        first: usize,
        second: usize,
    },

    #[error("mesh has zero cells")]
    EmptyMesh,

    #[error("I/O failure: {0}")]
    Io(String),

    #[error("document parsing failure: {0}")]
    Document(String),
}

impl From<std::io::Error> for DrapeError {
    fn from(e: std::io::Error) -> Self {
        DrapeError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for DrapeError {
    fn from(e: serde_json::Error) -> Self {
        DrapeError::Document(e.to_string())
    }
}

impl From<serde_yaml::Error> for DrapeError {
    fn from(e: serde_yaml::Error) -> Self {
        DrapeError::Document(e.to_string())
    }
}

pub type DrapeResult<T> = Result<T, DrapeError>;
