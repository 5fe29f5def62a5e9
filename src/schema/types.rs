//! Scalar types for relset
//!
//! This module defines the scalar types a dataset column can hold.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar column types
///
/// Every column is nullable at the value level; nullability is a property of
/// the column definition, not of the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    /// Boolean type
    Boolean,
    /// Integer (64-bit)
    Integer,
    /// Decimal (64-bit floating point)
    Decimal,
    /// Variable-length text
    Text,
    /// Timestamp (milliseconds since epoch)
    Timestamp,
}

impl ScalarType {
    /// Check if this type is numeric
    pub fn is_numeric(&self) -> bool {
        matches!(self, ScalarType::Integer | ScalarType::Decimal)
    }

    /// Check if this type is comparable with another type
    ///
    /// Relation endpoints must be comparable for equality: either the same
    /// type, or both numeric.
    pub fn is_comparable_with(&self, other: &ScalarType) -> bool {
        match (self, other) {
            (a, b) if a == b => true,
            (a, b) if a.is_numeric() && b.is_numeric() => true,
            _ => false,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarType::Boolean => write!(f, "BOOLEAN"),
            ScalarType::Integer => write!(f, "INTEGER"),
            ScalarType::Decimal => write!(f, "DECIMAL"),
            ScalarType::Text => write!(f, "TEXT"),
            ScalarType::Timestamp => write!(f, "TIMESTAMP"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_comparison() {
        assert!(ScalarType::Integer.is_comparable_with(&ScalarType::Decimal));
        assert!(ScalarType::Text.is_comparable_with(&ScalarType::Text));
        assert!(!ScalarType::Integer.is_comparable_with(&ScalarType::Text));
        assert!(!ScalarType::Boolean.is_comparable_with(&ScalarType::Timestamp));
    }

    #[test]
    fn test_type_display() {
        assert_eq!(ScalarType::Timestamp.to_string(), "TIMESTAMP");
        assert_eq!(ScalarType::Decimal.to_string(), "DECIMAL");
    }
}
