//! # Error Types
//!
//! Domain-specific error types for pricebook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pricebook-core errors (this file)                                     │
//! │  ├── DomainError      - {entity, operation, message, id} payload       │
//! │  ├── CoreError        - InvalidScale / MalformedFixedDigit / Validation│
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  pricebook-cli errors (separate crate)                                 │
//! │  └── CliError         - Config, I/O, and core failures                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CliError → operator / end user    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Who Is At Fault?
//! ```text
//! InvalidScale          → programming/config defect → internal error
//! MalformedFixedDigit   → caller input defect       → validation failure
//! MalformedFilter       → range syntax is wrong     → validation failure
//! InvalidAmount         → range boundary is wrong   → validation failure
//! ```
//! None of these are retried.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::validation::ValidationIssue;

// =============================================================================
// Domain Error
// =============================================================================

/// The entity a [`DomainError`] is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEntity {
    Product,
    ProductBatch,
    /// Rendering an amount as a fixed digit string.
    FixedDigit,
    /// Parsing a fixed digit string back into an amount.
    PreciseNumber,
}

impl DomainEntity {
    /// Wire tag of the entity (`FIXED_DIGIT`, `PRECISE_NUMBER`, ...).
    pub const fn as_str(&self) -> &'static str {
        match self {
            DomainEntity::Product => "PRODUCT",
            DomainEntity::ProductBatch => "PRODUCT_BATCH",
            DomainEntity::FixedDigit => "FIXED_DIGIT",
            DomainEntity::PreciseNumber => "PRECISE_NUMBER",
        }
    }
}

impl fmt::Display for DomainEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured description of a domain rule violation.
///
/// ## Serialization
/// ```json
/// {
///   "entity": "FIXED_DIGIT",
///   "operation": "fixed_digit_from_invalid_precise_number",
///   "message": "expected the number of digits as a positive integer",
///   "id": null
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{entity} {operation}: {message}")]
pub struct DomainError {
    /// Entity tag.
    pub entity: DomainEntity,
    /// Machine-readable operation label.
    pub operation: String,
    /// Human-readable message.
    pub message: String,
    /// Identifier for correlation (product id, batch id), if any.
    pub id: Option<String>,
}

impl DomainError {
    /// Creates a domain error without a correlation id.
    pub fn new(
        entity: DomainEntity,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        DomainError {
            entity,
            operation: operation.into(),
            message: message.into(),
            id: None,
        }
    }

    /// Attaches a correlation id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An encode was asked to render at a negative or non-integral number of
    /// fractional digits.
    ///
    /// ## When This Occurs
    /// - A scale read from configuration is negative or fractional
    /// - A caller passed an unchecked scale to the strict encoder
    ///
    /// Always a defect on our side: report it as an internal error.
    #[error("Invalid scale: {0}")]
    InvalidScale(DomainError),

    /// A decode was given a string with more than one decimal separator, a
    /// non-digit body, or an empty integer part.
    ///
    /// Always a caller-input defect: report it as a validation failure.
    #[error("Malformed fixed digit: {0}")]
    MalformedFixedDigit(DomainError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    pub(crate) fn invalid_scale() -> Self {
        CoreError::InvalidScale(DomainError::new(
            DomainEntity::FixedDigit,
            "fixed_digit_from_invalid_precise_number",
            "expected the number of digits as a positive integer",
        ))
    }

    pub(crate) fn malformed_fixed_digit() -> Self {
        CoreError::MalformedFixedDigit(DomainError::new(
            DomainEntity::PreciseNumber,
            "precise_number_from_invalid_fixed_digit",
            "expected valid fixed digit",
        ))
    }

    /// Returns the structured domain payload, if this is a domain error.
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            CoreError::InvalidScale(domain) | CoreError::MalformedFixedDigit(domain) => {
                Some(domain)
            }
            CoreError::Validation(_) => None,
        }
    }

    /// True when the error is our fault rather than the caller's.
    pub fn is_internal(&self) -> bool {
        matches!(self, CoreError::InvalidScale(_))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., invalid UUID, invalid price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// A range filter does not have the `<start>..<end>` shape.
    #[error("{field} is a malformed filter: '{value}'")]
    MalformedFilter { field: String, value: String },

    /// A range boundary is not a valid amount for the target currency.
    #[error("{field} has an invalid amount: '{value}'")]
    InvalidAmount { field: String, value: String },

    /// A range boundary is not a valid RFC 3339 date.
    #[error("{field} has an invalid date: '{value}'")]
    InvalidDate { field: String, value: String },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::MalformedFilter { field, .. }
            | ValidationError::InvalidAmount { field, .. }
            | ValidationError::InvalidDate { field, .. } => field,
        }
    }

    /// Issue code reported to the client.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::Required { .. } => "invalid_type",
            ValidationError::TooLong { .. } => "too_big",
            ValidationError::NotAllowed { .. } => "invalid_value",
            ValidationError::MalformedFilter { .. } => "malformed_filter",
            ValidationError::InvalidFormat { .. }
            | ValidationError::InvalidAmount { .. }
            | ValidationError::InvalidDate { .. } => "invalid_format",
        }
    }

    /// Converts the error into an issue located at `$.<field>`.
    pub fn to_issue(&self) -> ValidationIssue {
        ValidationIssue::at_field(self.field(), self.to_string(), self.code())
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_payload() {
        let err = CoreError::invalid_scale();
        let domain = err.domain().unwrap();
        assert_eq!(domain.entity, DomainEntity::FixedDigit);
        assert_eq!(domain.operation, "fixed_digit_from_invalid_precise_number");
        assert_eq!(
            domain.message,
            "expected the number of digits as a positive integer"
        );
        assert_eq!(domain.id, None);
        assert!(err.is_internal());

        let err = CoreError::malformed_fixed_digit();
        let domain = err.domain().unwrap();
        assert_eq!(domain.entity, DomainEntity::PreciseNumber);
        assert_eq!(domain.operation, "precise_number_from_invalid_fixed_digit");
        assert!(!err.is_internal());
    }

    #[test]
    fn test_domain_error_serializes_entity_tag() {
        let err = DomainError::new(DomainEntity::PreciseNumber, "op", "msg");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "entity": "PRECISE_NUMBER",
                "operation": "op",
                "message": "msg",
                "id": null,
            })
        );

        let err = DomainError::new(DomainEntity::ProductBatch, "op", "msg").with_id("batch-1");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["entity"], "PRODUCT_BATCH");
        assert_eq!(json["id"], "batch-1");
    }

    #[test]
    fn test_error_messages() {
        let err = CoreError::malformed_fixed_digit();
        assert_eq!(
            err.to_string(),
            concat!(
                "Malformed fixed digit: PRECISE_NUMBER ",
                "precise_number_from_invalid_fixed_digit: expected valid fixed digit",
            )
        );

        let err = ValidationError::MalformedFilter {
            field: "range".to_string(),
            value: "1..2..3".to_string(),
        };
        assert_eq!(err.to_string(), "range is a malformed filter: '1..2..3'");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert!(core_err.domain().is_none());
        assert!(!core_err.is_internal());
    }

    #[test]
    fn test_validation_error_to_issue() {
        let err = ValidationError::InvalidAmount {
            field: "range".to_string(),
            value: "1.2.3".to_string(),
        };
        let issue = err.to_issue();
        assert_eq!(issue.path.as_deref(), Some("$.range"));
        assert_eq!(issue.kind, "invalid_format");

        let err = ValidationError::MalformedFilter {
            field: "range".to_string(),
            value: "0..10..90".to_string(),
        };
        assert_eq!(err.to_issue().kind, "malformed_filter");
    }
}
