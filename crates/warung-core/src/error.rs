//! # Error Types
//!
//! Domain-specific error types for warung-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  warung-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                    │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  warung-db errors (separate crate)                                  │
//! │  └── StoreError       - Database operation failures                 │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → StoreError → caller            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (code, quantity, amounts)
//! 3. Errors are enum variants, never String
//! 4. Every validation error is detected before any state mutation

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They are always
/// raised before any state has been mutated: an operation either
/// validates fully and commits atomically, or does neither.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout was attempted with no cart lines.
    #[error("cart has no lines")]
    EmptyCart,

    /// The amount tendered does not cover the transaction total.
    ///
    /// ## When This Occurs
    /// - `paid < total` at checkout; nothing has been persisted and no
    ///   stock has been touched when this is returned
    #[error("insufficient payment: total {total_minor}, paid {paid_minor}")]
    InsufficientPayment { total_minor: i64, paid_minor: i64 },

    /// Product cannot be found by its code.
    ///
    /// ## When This Occurs
    /// - Replenishing a code that does not exist (fatal for that row)
    ///
    /// Note that checkout does NOT raise this: an unresolved cart line
    /// degrades to a zero price and zero cost basis instead. That
    /// permissive policy is preserved deliberately.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// A cart line carries a non-positive quantity.
    #[error("invalid quantity {quantity} for {code}")]
    InvalidQuantity { code: String, quantity: i64 },

    /// A replenishment tried to add a non-positive stock delta.
    ///
    /// Stock reductions must never flow through the replenishment
    /// ledger; sales are the only path that decreases stock.
    #[error("invalid stock delta: {added} (must be positive)")]
    InvalidStockDelta { added: i64 },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
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

    /// Invalid format (e.g., bad characters in a product code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientPayment {
            total_minor: 4500,
            paid_minor: 4000,
        };
        assert_eq!(
            err.to_string(),
            "insufficient payment: total 4500, paid 4000"
        );

        let err = CoreError::InvalidQuantity {
            code: "SKU1".to_string(),
            quantity: 0,
        };
        assert_eq!(err.to_string(), "invalid quantity 0 for SKU1");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "code".to_string(),
        };
        assert_eq!(err.to_string(), "code is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "code".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
