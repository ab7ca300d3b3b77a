//! # Validation Module
//!
//! Input validation utilities and the issue report sent back to clients.
//!
//! ## Report Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ValidationReport                                                       │
//! │  ├── segment: QUERY                 where the bad input arrived         │
//! │  └── issues:                                                            │
//! │      ├── { message, path: "$.range",  type: "malformed_filter" }        │
//! │      └── { message, path: "$.ordby",  type: "invalid_value" }           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every validator collects as many issues as it can instead of stopping at
//! the first one, so a client can fix a request in one round trip.
//!
//! ## Usage
//! ```rust
//! use pricebook_core::validation::{validate_name_filter, validate_product_id};
//!
//! validate_product_id("550e8400-e29b-41d4-a716-446655440000").unwrap();
//! assert!(validate_name_filter("this name is far too long").is_err());
//! ```

use serde::Serialize;
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::MAX_NAME_FILTER_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Object Paths
// =============================================================================

/// One step of an object path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(field: &str) -> Self {
        PathSegment::Field(field.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Renders a JSONPath-like location: `$`, then `.field` or `[index]` per
/// segment.
///
/// ## Example
/// ```rust
/// use pricebook_core::validation::{object_path, PathSegment};
///
/// let path = object_path(&[PathSegment::from("prices"), PathSegment::from(2)]);
/// assert_eq!(path, "$.prices[2]");
/// assert_eq!(object_path(&[]), "$");
/// ```
pub fn object_path(segments: &[PathSegment]) -> String {
    let mut path = String::from("$");
    for segment in segments {
        match segment {
            PathSegment::Field(field) => {
                path.push('.');
                path.push_str(field);
            }
            PathSegment::Index(index) => {
                path.push('[');
                path.push_str(&index.to_string());
                path.push(']');
            }
        }
    }
    path
}

// =============================================================================
// Validation Issue
// =============================================================================

/// A single problem found in client input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ValidationIssue {
    pub message: String,
    /// Location of the offending value, `None` when it concerns the whole input.
    pub path: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ValidationIssue {
    pub fn new(message: impl Into<String>, path: Option<String>, kind: impl Into<String>) -> Self {
        ValidationIssue {
            message: message.into(),
            path,
            kind: kind.into(),
        }
    }

    /// Issue located at the top-level field `$.<field>`.
    pub fn at_field(field: &str, message: impl Into<String>, kind: impl Into<String>) -> Self {
        ValidationIssue::new(message, Some(object_path(&[PathSegment::from(field)])), kind)
    }
}

impl From<ValidationError> for ValidationIssue {
    fn from(err: ValidationError) -> Self {
        err.to_issue()
    }
}

// =============================================================================
// Validation Report
// =============================================================================

/// Part of a request a report refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub enum RequestSegment {
    #[serde(rename = "BODY")]
    Body,
    #[serde(rename = "PARAM")]
    Params,
    #[serde(rename = "QUERY")]
    Query,
    #[serde(rename = "HEADER")]
    Headers,
    #[serde(rename = "COOKIE")]
    Cookies,
    #[serde(rename = "MULTIPART_FILE")]
    MultipartFile,
    #[serde(rename = "MULTIPART_FIELD")]
    MultipartField,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl RequestSegment {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RequestSegment::Body => "BODY",
            RequestSegment::Params => "PARAM",
            RequestSegment::Query => "QUERY",
            RequestSegment::Headers => "HEADER",
            RequestSegment::Cookies => "COOKIE",
            RequestSegment::MultipartFile => "MULTIPART_FILE",
            RequestSegment::MultipartField => "MULTIPART_FIELD",
            RequestSegment::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for RequestSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every issue found in one segment of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ValidationReport {
    pub segment: RequestSegment,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Error tag clients switch on.
    pub const ERROR: &'static str = "VALIDATION";

    pub fn new(segment: RequestSegment, issues: Vec<ValidationIssue>) -> Self {
        ValidationReport { segment, issues }
    }

    /// Builds a report from validation errors, keeping their order.
    pub fn from_errors(
        segment: RequestSegment,
        errors: impl IntoIterator<Item = ValidationError>,
    ) -> Self {
        ValidationReport::new(segment, errors.into_iter().map(ValidationIssue::from).collect())
    }
}

// =============================================================================
// Validators
// =============================================================================

/// Validates a product id (UUID).
///
/// ## Example
/// ```rust
/// use pricebook_core::validation::validate_product_id;
///
/// assert!(validate_product_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_product_id("not-a-uuid").is_err());
/// ```
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Validates the exact-match name filter of a product listing.
///
/// Length is counted in characters, not bytes.
pub fn validate_name_filter(name: &str) -> ValidationResult<()> {
    if name.chars().count() > MAX_NAME_FILTER_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_FILTER_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path() {
        assert_eq!(object_path(&[]), "$");
        assert_eq!(object_path(&["row".into(), 3.into()]), "$.row[3]");
        assert_eq!(
            object_path(&["prices".into(), "usd".into(), "amount".into()]),
            "$.prices.usd.amount"
        );
    }

    #[test]
    fn test_issue_serializes_kind_as_type() {
        let issue = ValidationIssue::at_field("ordby", "ordby must be one of", "invalid_value");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["path"], "$.ordby");
        assert_eq!(json["type"], "invalid_value");
        assert!(json.get("kind").is_none());

        let whole =
            ValidationIssue::new("Expected file must be UTF-8 encoded", None, "invalid_format");
        assert_eq!(serde_json::to_value(&whole).unwrap()["path"], serde_json::Value::Null);
    }

    #[test]
    fn test_report_keeps_error_order() {
        let report = ValidationReport::from_errors(
            RequestSegment::Query,
            vec![
                ValidationError::TooLong {
                    field: "name".to_string(),
                    max: 16,
                },
                ValidationError::MalformedFilter {
                    field: "range".to_string(),
                    value: "1..2..3".to_string(),
                },
            ],
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["segment"], "QUERY");
        assert_eq!(json["issues"][0]["path"], "$.name");
        assert_eq!(json["issues"][1]["type"], "malformed_filter");
    }

    #[test]
    fn test_validate_product_id() {
        assert!(validate_product_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_product_id("").is_err());
        assert!(validate_product_id("not-a-uuid").is_err());
        assert!(validate_product_id("01ARZ3NDEKTSV4RRFFQ69G5FAV").is_err());
    }

    #[test]
    fn test_validate_name_filter() {
        assert!(validate_name_filter("").is_ok());
        assert!(validate_name_filter("Cheese").is_ok());
        assert!(validate_name_filter(&"é".repeat(16)).is_ok());
        assert!(matches!(
            validate_name_filter(&"a".repeat(17)),
            Err(ValidationError::TooLong { max: 16, .. })
        ));
    }
}
