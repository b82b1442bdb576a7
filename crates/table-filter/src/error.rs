//! Error types for the table-filter crate.
//!
//! Every variant describes a structural misuse of the API (bad column
//! configuration, an operator the catalog doesn't know, a value shape that
//! doesn't fit the operator). None of them are expected from valid user
//! interaction, so nothing in the crate catches them.

use thiserror::Error;

use crate::column::ColumnDataType;
use crate::operators::FilterOperator;

/// Errors raised while configuring columns or evaluating filters.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Column or orchestration configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Operator is not part of the catalog for the given column type.
    #[error("operator '{operator}' not found for {data_type} columns")]
    OperatorNotFound {
        operator: String,
        data_type: ColumnDataType,
    },

    /// Operation or value was used with an incompatible column type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: String,
        actual: String,
    },

    /// Predicate received a value count its operator cannot take.
    #[error("operator '{operator}' expects {expected} value(s), got {actual}")]
    Arity {
        operator: FilterOperator,
        expected: &'static str,
        actual: usize,
    },

    /// Filter state could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FilterError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub(crate) fn operator_not_found(operator: impl Into<String>, data_type: ColumnDataType) -> Self {
        Self::OperatorNotFound {
            operator: operator.into(),
            data_type,
        }
    }
}

/// Result type for table-filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;
