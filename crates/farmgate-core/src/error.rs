//! # Error Types
//!
//! Domain-specific error types for farmgate-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │  farmgate-core errors (this file)                                  │
//! │  └── ValidationError  - input validation failures                  │
//! │                                                                    │
//! │  farmgate-db errors (separate crate)                               │
//! │  ├── DbError          - storage operation failures                 │
//! │  └── CheckoutError    - Validation | ProductNotFound | Storage     │
//! │                                                                    │
//! │  Expected business outcomes (shortages, lost races) are values in  │
//! │  CommitResult, not errors.                                         │
//! └────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Input validation errors.
///
/// Raised before any ledger access, with a precise field-level message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "cart".to_string(),
        };
        assert_eq!(err.to_string(), "cart is required");

        let err = ValidationError::MustNotBeNegative {
            field: "requested_redemption".to_string(),
        };
        assert_eq!(err.to_string(), "requested_redemption must not be negative");

        let err = ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: 999,
        };
        assert_eq!(err.to_string(), "quantity must be between 1 and 999");
    }
}
