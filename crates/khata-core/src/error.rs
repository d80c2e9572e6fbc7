//! # Error Types
//!
//! Domain-specific error types for khata-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  khata-core errors (this file)                                         │
//! │  ├── CoreError        - Recording workflow failures                    │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  khata-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  HTTP API errors (in app)                                              │
//! │  └── ApiError         - What clients see (JSON {error: msg})           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (name, field, id)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to one HTTP status in the API layer

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Recording workflow errors.
///
/// These errors represent business rule violations or reference resolution
/// failures. They are translated to JSON error responses at the API boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A supplier name in a purchase request did not resolve.
    #[error("Invalid supplier name: {0}")]
    UnknownSupplier(String),

    /// An item name in a purchase request did not resolve.
    #[error("Invalid item: {0}")]
    UnknownItem(String),

    /// A value that must be numeric was neither a JSON number nor a
    /// numeric string.
    ///
    /// ## When This Occurs
    /// - `qty`, `purchaseRate`, or `saleRate` sent as `"abc"` or `true`
    /// - `discount_percentage` / `payment` sent as non-numeric values
    #[error("{field} must be numeric")]
    TypeConversion { field: &'static str },

    /// Bill-number generation kept colliding with persisted bill numbers.
    ///
    /// ## When This Occurs
    /// Practically never: the space is item-prefix × unix-second × 36^6
    /// suffixes. Hitting this means the random source is broken or the
    /// table is being flooded within one second.
    #[error("Could not generate a unique bill number after {attempts} attempts")]
    BillNumberExhausted { attempts: u32 },

    /// An item carries no sale rate, so a sale line cannot be priced.
    #[error("Item '{0}' has no sale rate")]
    MissingSaleRate(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when a request body doesn't meet requirements.
/// Used for early validation before reference resolution runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// A collection that must have at least one element is empty.
    #[error("{field} must not be empty")]
    EmptyCollection { field: &'static str },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Invalid format (e.g., malformed body, wrong JSON shape).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: &'static str, reason: String },
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
        let err = CoreError::UnknownItem("Petrol".to_string());
        assert_eq!(err.to_string(), "Invalid item: Petrol");

        let err = CoreError::TypeConversion { field: "qty" };
        assert_eq!(err.to_string(), "qty must be numeric");

        let err = CoreError::BillNumberExhausted { attempts: 5 };
        assert_eq!(
            err.to_string(),
            "Could not generate a unique bill number after 5 attempts"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "purchase_no",
        };
        assert_eq!(err.to_string(), "purchase_no is required");

        let err = ValidationError::EmptyCollection { field: "accounts" };
        assert_eq!(err.to_string(), "accounts must not be empty");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required { field: "slip_no" };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
