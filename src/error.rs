//! Error types for relset
//!
//! This module defines all error types used throughout the dataset library.

use thiserror::Error;

/// The main error type for relset
///
/// All variants are synchronous, non-retryable assembly errors: they indicate
/// a mistake in how the dataset is being put together, not a transient
/// condition. Navigation never produces an error for "no match".
#[derive(Error, Debug)]
pub enum Error {
    // ========== Registration Errors ==========
    #[error("Registration error: name '{0}' is already in use")]
    DuplicateName(String),

    #[error("Registration error: table '{0}' not found")]
    UnknownTable(String),

    #[error("Registration error: column '{0}' not found in table '{1}'")]
    UnknownColumn(String, String),

    #[error("Type error: {left} is not comparable with {right}")]
    TypeMismatch { left: String, right: String },

    // ========== Load Errors ==========
    #[error("Load error: duplicate primary key {key} in table '{table}'")]
    DuplicateKey { table: String, key: String },

    #[error("Load error: expected {expected} values, got {got}")]
    ColumnCountMismatch { expected: usize, got: usize },

    #[error("Load error: null value not allowed for column '{0}'")]
    NullNotAllowed(String),

    // ========== Lifecycle Errors ==========
    #[error("Lifecycle error: dataset is frozen and can no longer be modified")]
    FrozenDataSet,

    // ========== I/O Errors ==========
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Snapshot error: {0}")]
    SnapshotError(String),
}

/// Result type alias for relset operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownTable("Customers".to_string());
        assert_eq!(
            err.to_string(),
            "Registration error: table 'Customers' not found"
        );

        let err = Error::DuplicateKey {
            table: "Orders".to_string(),
            key: "(10)".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Load error: duplicate primary key (10) in table 'Orders'"
        );
    }
}
