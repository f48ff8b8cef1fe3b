//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations (status changes)      │
//! │  └── ValidationError  - Opt-in strict input checks                     │
//! │                                                                         │
//! │  tally-console errors (app)                                            │
//! │  ├── ConfigError      - Config file / environment problems             │
//! │  └── ApiError         - What the command caller sees (serialized)      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → caller                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Never Errors
//! The line-item model and the tax & totals engine have no error paths at
//! all: bad numbers become zero, unknown ids are ignored, unknown tax modes
//! mean "no tax". Errors only exist for the document lifecycle and for the
//! strict validation layer callers may opt into.

use thiserror::Error;

use crate::types::DocumentStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Document cannot move to the requested status.
    ///
    /// ## When This Occurs
    /// - Marking a paid document as sent
    /// - Marking a document sent twice
    #[error("Document {document_id} is {from}, cannot mark it {to}")]
    InvalidStatusTransition {
        document_id: String,
        from: DocumentStatus,
        to: DocumentStatus,
    },

    /// Custom header field not found.
    #[error("Custom field not found: {0}")]
    CustomFieldNotFound(u64),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Produced only by [`crate::validation`] and by strict `FromStr` parsers;
/// the engine itself never raises them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g. invalid UUID, invalid currency code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// A fixed discount larger than the subtotal.
    #[error("{field} of {amount} exceeds the subtotal of {subtotal}")]
    ExceedsSubtotal {
        field: String,
        amount: String,
        subtotal: String,
    },
}

impl ValidationError {
    /// The field this error is about.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBeNonNegative { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::ExceedsSubtotal { field, .. } => field,
        }
    }

    /// Prefixes the field name, e.g. `rate` → `items[3].rate`.
    pub(crate) fn scoped(mut self, scope: &str) -> Self {
        let field = match &mut self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBeNonNegative { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::ExceedsSubtotal { field, .. } => field,
        };
        *field = format!("{scope}.{field}");
        self
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
