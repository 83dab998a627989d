//! Validation outcome types: [`ErrorCode`], [`ValidationError`], and
//! [`ValidationResult`].
//!
//! These are the values every entity validator returns. They serialise to the
//! wire shape consumed by external tooling:
//!
//! ```json
//! { "valid": false, "errors": [{ "path": "thc_range", "message": "...", "code": "OUT_OF_RANGE" }] }
//! ```

use serde::{Deserialize, Serialize};

/// Stable, machine-readable classification of a validation failure.
///
/// Serialises as SCREAMING_SNAKE_CASE (e.g. `"CYCLE_DETECTED"`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A mandatory field is absent or `null`.
    Required,
    /// A field is present but has the wrong kind of value.
    TypeMismatch,
    /// A number lies outside its declared bounds, or a range is inverted.
    OutOfRange,
    /// A string is not one of the allowed values.
    InvalidEnum,
    /// A string does not match the required pattern.
    PatternMismatch,
    /// A string or array is too short or too long.
    InvalidLength,
    /// A string is not a well-formed URL or date.
    InvalidFormat,
    /// A lineage node repeats one of its own ancestors.
    CycleDetected,
    /// A lineage node lies deeper than the configured maximum.
    DepthExceeded,
    /// A group of percentages does not add up.
    InconsistentPercentage,
}

impl ErrorCode {
    /// The wire-format string for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Required => "REQUIRED",
            ErrorCode::TypeMismatch => "TYPE_MISMATCH",
            ErrorCode::OutOfRange => "OUT_OF_RANGE",
            ErrorCode::InvalidEnum => "INVALID_ENUM",
            ErrorCode::PatternMismatch => "PATTERN_MISMATCH",
            ErrorCode::InvalidLength => "INVALID_LENGTH",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::CycleDetected => "CYCLE_DETECTED",
            ErrorCode::DepthExceeded => "DEPTH_EXCEEDED",
            ErrorCode::InconsistentPercentage => "INCONSISTENT_PERCENTAGE",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single problem found in a document, located by a dot/bracket path such
/// as `genetics_profile.lineage[1].strain_ref`.
///
/// Immutable once created; fields are exposed through accessors only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationError {
    path: String,
    message: String,
    code: ErrorCode,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            code,
        }
    }

    /// Location of the offending field.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Human-readable description.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.path, self.code, self.message)
    }
}

/// The outcome of validating one document.
///
/// `valid` is derived from `errors` at construction and can never disagree
/// with it. Deserialisation rejects payloads where the two are inconsistent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawResult")]
pub struct ValidationResult {
    valid: bool,
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Build a result from the collected errors, in the order they were found.
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// A result with no errors.
    pub fn ok() -> Self {
        Self::from_errors(Vec::new())
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Errors carrying the given code, in report order.
    pub fn errors_with_code(&self, code: ErrorCode) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.code == code)
    }

    /// The first error reported at exactly `path`, if any.
    pub fn error_at(&self, path: &str) -> Option<&ValidationError> {
        self.errors.iter().find(|e| e.path == path)
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

#[derive(Deserialize)]
struct RawResult {
    valid: bool,
    errors: Vec<ValidationError>,
}

impl TryFrom<RawResult> for ValidationResult {
    type Error = String;

    fn try_from(raw: RawResult) -> Result<Self, Self::Error> {
        if raw.valid != raw.errors.is_empty() {
            return Err(format!(
                "inconsistent result: valid = {} with {} error(s)",
                raw.valid,
                raw.errors.len()
            ));
        }
        Ok(Self::from_errors(raw.errors))
    }
}

// --- tests -------------------------------------------------------------------
