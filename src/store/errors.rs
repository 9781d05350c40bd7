//! # Document Store Errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures of `count` / `find`. The normalizer never inspects or remaps
/// these; they travel to the transport unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A writer panicked while holding the document lock
    #[error("Document store lock poisoned")]
    Poisoned,

    /// Filter uses an operator the store does not implement
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// Operator received an operand of the wrong shape
    #[error("Invalid operand for {operator}: {reason}")]
    InvalidOperand { operator: String, reason: String },

    /// `$regex` pattern failed to compile
    #[error("Invalid regex: {0}")]
    InvalidRegex(String),

    /// Projection holds exclusion entries
    #[error("Projection cannot mix inclusion and exclusion")]
    MixedProjection,

    /// Document file could not be read or parsed
    #[error("Failed to load documents: {0}")]
    Load(String),
}

impl StoreError {
    pub(crate) fn invalid_operand(operator: &str, reason: impl Into<String>) -> Self {
        StoreError::InvalidOperand {
            operator: operator.to_string(),
            reason: reason.into(),
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Poisoned => "CHARITY_STORE_POISONED",
            StoreError::UnsupportedOperator(_) => "CHARITY_STORE_UNSUPPORTED_OPERATOR",
            StoreError::InvalidOperand { .. } => "CHARITY_STORE_INVALID_OPERAND",
            StoreError::InvalidRegex(_) => "CHARITY_STORE_INVALID_REGEX",
            StoreError::MixedProjection => "CHARITY_STORE_MIXED_PROJECTION",
            StoreError::Load(_) => "CHARITY_STORE_LOAD",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = StoreError::invalid_operand("$in", "expected an array");
        assert_eq!(err.to_string(), "Invalid operand for $in: expected an array");
        assert_eq!(err.code(), "CHARITY_STORE_INVALID_OPERAND");
    }
}
