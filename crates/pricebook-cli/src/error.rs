//! # CLI Error Type
//!
//! Unified error type for `pricebook` commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Command                                                                │
//! │  Result<Value, CliError>                                                │
//! │         │                                                               │
//! │         ├── CoreError::InvalidScale ───────────► INTERNAL   (logged)    │
//! │         ├── CoreError::MalformedFixedDigit ───► VALIDATION              │
//! │         ├── ValidationReport ─────────────────► VALIDATION + issues     │
//! │         ├── config / io / toml ───────────────► CONFIG                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  stderr: {"code": "VALIDATION", "message": "...", "issues": [...]}      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use pricebook_core::validation::{ValidationIssue, ValidationReport};
use pricebook_core::{CoreError, CurrencyCode, ValidationError};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// No exchange rate configured for a currency.
    #[error("No exchange rate configured for {0}")]
    MissingRate(CurrencyCode),

    // =========================================================================
    // Input Errors
    // =========================================================================
    /// Core codec or domain failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// One or more client input issues.
    #[error("Validation failed in {} with {} issue(s)", .0.segment, .0.issues.len())]
    Validation(ValidationReport),

    /// Failed to read an input file.
    #[error("Failed to read {path}: {message}")]
    ReadFailed { path: String, message: String },

    // =========================================================================
    // Output Errors
    // =========================================================================
    /// Failed to serialize command output.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationReport> for CliError {
    fn from(report: ValidationReport) -> Self {
        CliError::Validation(report)
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::Core(CoreError::Validation(err))
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::ConfigLoadFailed(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::SerializationFailed(err.to_string())
    }
}

// =============================================================================
// Error Body
// =============================================================================

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bad input (exit code 2)
    Validation,

    /// Bad configuration (exit code 3)
    Config,

    /// Defect in the program or its trusted data (exit code 1)
    Internal,
}

/// What a failed command prints on stderr.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ValidationIssue>,
}

impl CliError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CliError::InvalidConfig(_)
            | CliError::ConfigLoadFailed(_)
            | CliError::MissingRate(_) => ErrorCode::Config,
            CliError::Core(err) if err.is_internal() => ErrorCode::Internal,
            CliError::Core(_) | CliError::Validation(_) | CliError::ReadFailed { .. } => {
                ErrorCode::Validation
            }
            CliError::SerializationFailed(_) => ErrorCode::Internal,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.code() {
            ErrorCode::Internal => 1,
            ErrorCode::Validation => 2,
            ErrorCode::Config => 3,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        let issues = match self {
            CliError::Validation(report) => report.issues.clone(),
            CliError::Core(CoreError::Validation(err)) => vec![err.to_issue()],
            _ => Vec::new(),
        };

        ErrorBody {
            code: self.code(),
            message: self.to_string(),
            issues,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pricebook_core::validation::RequestSegment;

    #[test]
    fn test_invalid_scale_is_internal() {
        let one = num_bigint::BigInt::from(1);
        let scale_err = pricebook_core::to_fixed_digit(&one, -1).unwrap_err();
        let err = CliError::from(scale_err);
        assert_eq!(err.code(), ErrorCode::Internal);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_malformed_fixed_digit_is_validation() {
        let err = CliError::from(pricebook_core::parse_precise_number("1.2.3").unwrap_err());
        assert_eq!(err.code(), ErrorCode::Validation);
        assert!(err.to_string().contains("expected valid fixed digit"));
    }

    #[test]
    fn test_report_body_carries_issues() {
        let report = ValidationReport::from_errors(
            RequestSegment::Query,
            vec![ValidationError::MalformedFilter {
                field: "range".to_string(),
                value: "1..2..3".to_string(),
            }],
        );
        let body = CliError::from(report).to_body();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], "VALIDATION");
        assert_eq!(json["issues"][0]["path"], "$.range");
    }

    #[test]
    fn test_missing_rate_is_config() {
        let err = CliError::MissingRate(CurrencyCode::Btc);
        assert_eq!(err.to_string(), "No exchange rate configured for BTC");
        assert_eq!(err.exit_code(), 3);
        assert!(serde_json::to_value(err.to_body()).unwrap().get("issues").is_none());
    }
}
