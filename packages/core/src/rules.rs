//! Reusable primitive field checks.
//!
//! Every rule has the shape `(value, path, constraints) -> Vec<ValidationError>`
//! and never panics on malformed input: the malformed input is what gets
//! reported. `value` is `None` when the field is absent; all rules except
//! [`required`] treat absence as "nothing to check".

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::result::{ErrorCode, ValidationError};

/// The runtime shape a field is expected to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    /// Any finite number.
    Number,
    /// A number with no fractional part.
    Integer,
    Bool,
    Object,
    Array,
}

impl ValueKind {
    fn name(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Integer => "integer",
            ValueKind::Bool => "boolean",
            ValueKind::Object => "object",
            ValueKind::Array => "array",
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            ValueKind::String => value.is_string(),
            ValueKind::Number => finite_number(value).is_some(),
            ValueKind::Integer => is_integer(value),
            ValueKind::Bool => value.is_boolean(),
            ValueKind::Object => value.is_object(),
            ValueKind::Array => value.is_array(),
        }
    }
}

/// String formats recognised by [`format_check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// An absolute `http` or `https` URL with a host.
    Url,
    /// A calendar date (`YYYY-MM-DD`) or an RFC 3339 timestamp.
    Date,
}

/// Human-readable name of a value's runtime kind, used in messages.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `prefix.name`, or just `name` at the document root.
pub fn field_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// `prefix[index]`.
pub fn index_path(prefix: &str, index: usize) -> String {
    format!("{prefix}[{index}]")
}

/// `REQUIRED` when the value is absent or `null`.
pub fn required(value: Option<&Value>, path: &str) -> Vec<ValidationError> {
    match value {
        None | Some(Value::Null) => vec![ValidationError::new(
            path,
            ErrorCode::Required,
            format!("{path} is required"),
        )],
        Some(_) => vec![],
    }
}

/// `TYPE_MISMATCH` when a present value is not of the expected kind.
pub fn type_check(value: Option<&Value>, path: &str, expected: ValueKind) -> Vec<ValidationError> {
    match value {
        Some(v) if !expected.matches(v) => vec![type_mismatch(path, expected, v)],
        _ => vec![],
    }
}

/// `INVALID_ENUM` when a present string is not in `allowed`; a non-string is
/// a `TYPE_MISMATCH`.
pub fn enum_check(value: Option<&Value>, path: &str, allowed: &[&str]) -> Vec<ValidationError> {
    let Some(v) = value else {
        return vec![];
    };
    match v.as_str() {
        None => vec![type_mismatch(path, ValueKind::String, v)],
        Some(s) if allowed.contains(&s) => vec![],
        Some(s) => vec![ValidationError::new(
            path,
            ErrorCode::InvalidEnum,
            format!("{s:?} is not allowed; expected one of: {}", allowed.join(", ")),
        )],
    }
}

/// `OUT_OF_RANGE` when a present number lies outside `[min, max]`.
///
/// Non-numbers (including non-finite values) are a `TYPE_MISMATCH`.
pub fn range_check(value: Option<&Value>, path: &str, min: f64, max: f64) -> Vec<ValidationError> {
    let Some(v) = value else {
        return vec![];
    };
    match finite_number(v) {
        None => vec![type_mismatch(path, ValueKind::Number, v)],
        Some(n) if n < min || n > max => vec![ValidationError::new(
            path,
            ErrorCode::OutOfRange,
            format!("{n} is outside the allowed range [{min}, {max}]"),
        )],
        Some(_) => vec![],
    }
}

/// `PATTERN_MISMATCH` when a present string does not match `pattern`.
///
/// `description` names the expected shape in the message (e.g.
/// `"lowercase alphanumeric with hyphens"`).
pub fn pattern_check(
    value: Option<&Value>,
    path: &str,
    pattern: &Regex,
    description: &str,
) -> Vec<ValidationError> {
    let Some(v) = value else {
        return vec![];
    };
    match v.as_str() {
        None => vec![type_mismatch(path, ValueKind::String, v)],
        Some(s) if pattern.is_match(s) => vec![],
        Some(s) => vec![ValidationError::new(
            path,
            ErrorCode::PatternMismatch,
            format!("{s:?} must be {description}"),
        )],
    }
}

/// `INVALID_LENGTH` when a present string (in characters) or array (in
/// elements) is shorter than `min` or longer than `max`.
pub fn length_check(
    value: Option<&Value>,
    path: &str,
    min: Option<usize>,
    max: Option<usize>,
) -> Vec<ValidationError> {
    let Some(v) = value else {
        return vec![];
    };
    let len = match v {
        Value::String(s) => s.chars().count(),
        Value::Array(a) => a.len(),
        other => {
            return vec![ValidationError::new(
                path,
                ErrorCode::TypeMismatch,
                format!("expected string or array, found {}", kind_of(other)),
            )]
        }
    };
    let too_short = min.is_some_and(|m| len < m);
    let too_long = max.is_some_and(|m| len > m);
    if !(too_short || too_long) {
        return vec![];
    }
    let bounds = match (min, max) {
        (Some(lo), Some(hi)) => format!("between {lo} and {hi}"),
        (Some(lo), None) => format!("at least {lo}"),
        (None, Some(hi)) => format!("at most {hi}"),
        (None, None) => unreachable!("no bound violated without bounds"),
    };
    vec![ValidationError::new(
        path,
        ErrorCode::InvalidLength,
        format!("length {len} must be {bounds}"),
    )]
}

/// `INVALID_FORMAT` when a present string is not a well-formed `format`.
pub fn format_check(value: Option<&Value>, path: &str, format: Format) -> Vec<ValidationError> {
    let Some(v) = value else {
        return vec![];
    };
    let Some(s) = v.as_str() else {
        return vec![type_mismatch(path, ValueKind::String, v)];
    };
    let (ok, expected) = match format {
        Format::Url => (is_well_formed_url(s), "an absolute http(s) URL"),
        Format::Date => (is_date(s), "a YYYY-MM-DD date or RFC 3339 timestamp"),
    };
    if ok {
        vec![]
    } else {
        vec![ValidationError::new(
            path,
            ErrorCode::InvalidFormat,
            format!("{s:?} must be {expected}"),
        )]
    }
}

/// Whether `s` is an absolute `http`/`https` URL with a host.
pub fn is_well_formed_url(s: &str) -> bool {
    URL_RE.is_match(s)
}

fn is_date(s: &str) -> bool {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        || chrono::DateTime::parse_from_rfc3339(s).is_ok()
}

/// The value as a finite `f64`, or `None` for non-numbers.
pub(crate) fn finite_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite())
}

fn is_integer(value: &Value) -> bool {
    value.is_i64() || value.is_u64() || finite_number(value).is_some_and(|n| n.fract() == 0.0)
}

fn type_mismatch(path: &str, expected: ValueKind, found: &Value) -> ValidationError {
    ValidationError::new(
        path,
        ErrorCode::TypeMismatch,
        format!("expected {}, found {}", expected.name(), kind_of(found)),
    )
}

// --- composition ---------------------------------------------------------------

/// Whether a field must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Presence {
    Required,
    Optional,
}

/// Runs rules against the fields of one object, in the order the caller asks
/// for them, collecting every error under `prefix`.
///
/// Each accessor returns the field's value only when every rule it applied
/// passed, so callers can chain cross-field checks on known-good values
/// without reporting the same problem twice.
pub(crate) struct Fields<'a> {
    object: &'a serde_json::Map<String, Value>,
    prefix: String,
    errors: Vec<ValidationError>,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(object: &'a serde_json::Map<String, Value>, prefix: &str) -> Self {
        Self {
            object,
            prefix: prefix.to_string(),
            errors: Vec::new(),
        }
    }

    pub(crate) fn path(&self, name: &str) -> String {
        field_path(&self.prefix, name)
    }

    /// Whether the field key exists at all (even as `null`).
    pub(crate) fn has(&self, name: &str) -> bool {
        self.object.contains_key(name)
    }

    pub(crate) fn extend(&mut self, errors: Vec<ValidationError>) -> bool {
        let ok = errors.is_empty();
        self.errors.extend(errors);
        ok
    }

    pub(crate) fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub(crate) fn finish(self) -> Vec<ValidationError> {
        self.errors
    }

    /// The raw value, after the `required` rule when `presence` demands it.
    pub(crate) fn get(&mut self, name: &str, presence: Presence) -> Option<&'a Value> {
        let value = self.object.get(name);
        if presence == Presence::Required {
            let path = self.path(name);
            if !self.extend(required(value, &path)) {
                return None;
            }
        }
        value
    }

    fn kind(&mut self, name: &str, presence: Presence, kind: ValueKind) -> Option<&'a Value> {
        let value = self.get(name, presence)?;
        let path = self.path(name);
        self.extend(type_check(Some(value), &path, kind))
            .then_some(value)
    }

    pub(crate) fn string(&mut self, name: &str, presence: Presence) -> Option<&'a str> {
        self.kind(name, presence, ValueKind::String)?.as_str()
    }

    /// A string of at least one character.
    pub(crate) fn text(&mut self, name: &str, presence: Presence) -> Option<&'a str> {
        let value = self.kind(name, presence, ValueKind::String)?;
        let path = self.path(name);
        if self.extend(length_check(Some(value), &path, Some(1), None)) {
            value.as_str()
        } else {
            None
        }
    }

    pub(crate) fn boolean(&mut self, name: &str, presence: Presence) -> Option<bool> {
        self.kind(name, presence, ValueKind::Bool)?.as_bool()
    }

    pub(crate) fn object(
        &mut self,
        name: &str,
        presence: Presence,
    ) -> Option<&'a serde_json::Map<String, Value>> {
        self.kind(name, presence, ValueKind::Object)?.as_object()
    }

    pub(crate) fn array(&mut self, name: &str, presence: Presence) -> Option<&'a Vec<Value>> {
        self.kind(name, presence, ValueKind::Array)?.as_array()
    }

    /// An array whose every element is a string; element errors are
    /// index-qualified.
    pub(crate) fn string_array(&mut self, name: &str, presence: Presence) -> Option<&'a Vec<Value>> {
        let items = self.array(name, presence)?;
        let path = self.path(name);
        let mut ok = true;
        for (i, item) in items.iter().enumerate() {
            ok &= self.extend(type_check(Some(item), &index_path(&path, i), ValueKind::String));
        }
        ok.then_some(items)
    }

    pub(crate) fn enumerated(
        &mut self,
        name: &str,
        allowed: &[&str],
        presence: Presence,
    ) -> Option<&'a str> {
        let value = self.get(name, presence)?;
        let path = self.path(name);
        if self.extend(enum_check(Some(value), &path, allowed)) {
            value.as_str()
        } else {
            None
        }
    }

    /// A number in `[0, 100]`.
    pub(crate) fn percent(&mut self, name: &str, presence: Presence) -> Option<f64> {
        let value = self.get(name, presence)?;
        let path = self.path(name);
        if self.extend(range_check(Some(value), &path, 0.0, 100.0)) {
            finite_number(value)
        } else {
            None
        }
    }

    /// An integer `>= 0`.
    pub(crate) fn non_negative_integer(&mut self, name: &str, presence: Presence) -> Option<u64> {
        let value = self.kind(name, presence, ValueKind::Integer)?;
        let n = finite_number(value)?;
        if n < 0.0 {
            let path = self.path(name);
            self.push(ValidationError::new(
                &path,
                ErrorCode::OutOfRange,
                format!("{n} must not be negative"),
            ));
            return None;
        }
        Some(n as u64)
    }

    pub(crate) fn pattern(
        &mut self,
        name: &str,
        pattern: &Regex,
        description: &str,
        presence: Presence,
    ) -> Option<&'a str> {
        let value = self.get(name, presence)?;
        let path = self.path(name);
        if self.extend(pattern_check(Some(value), &path, pattern, description)) {
            value.as_str()
        } else {
            None
        }
    }

    pub(crate) fn format(&mut self, name: &str, format: Format, presence: Presence) -> Option<&'a str> {
        let value = self.get(name, presence)?;
        let path = self.path(name);
        if self.extend(format_check(Some(value), &path, format)) {
            value.as_str()
        } else {
            None
        }
    }
}

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[A-Za-z0-9](?:[A-Za-z0-9.-]*[A-Za-z0-9])?(?::[0-9]{1,5})?(?:[/?#]\S*)?$")
        .expect("invalid url regex")
});

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn codes(errors: &[ValidationError]) -> Vec<ErrorCode> {
        errors.iter().map(|e| e.code()).collect()
    }

    #[test]
    fn required_absent_and_null() {
        assert_eq!(codes(&required(None, "id")), vec![ErrorCode::Required]);
        assert_eq!(codes(&required(Some(&Value::Null), "id")), vec![ErrorCode::Required]);
        assert!(required(Some(&json!("")), "id").is_empty());
    }

    #[test]
    fn type_check_kinds() {
        assert!(type_check(Some(&json!("x")), "p", ValueKind::String).is_empty());
        assert!(type_check(Some(&json!(1.5)), "p", ValueKind::Number).is_empty());
        assert!(type_check(Some(&json!(3)), "p", ValueKind::Integer).is_empty());
        assert!(type_check(Some(&json!(3.0)), "p", ValueKind::Integer).is_empty());
        assert!(type_check(Some(&json!({})), "p", ValueKind::Object).is_empty());
        assert!(type_check(Some(&json!([])), "p", ValueKind::Array).is_empty());
        assert!(type_check(None, "p", ValueKind::Bool).is_empty());

        let errs = type_check(Some(&json!(3.5)), "p", ValueKind::Integer);
        assert_eq!(codes(&errs), vec![ErrorCode::TypeMismatch]);
        let errs = type_check(Some(&Value::Null), "p", ValueKind::String);
        assert_eq!(errs[0].message(), "expected string, found null");
    }

    #[test]
    fn enum_check_lists_allowed_values() {
        let errs = enum_check(Some(&json!("purple")), "type", &["indica", "sativa"]);
        assert_eq!(codes(&errs), vec![ErrorCode::InvalidEnum]);
        assert!(errs[0].message().contains("indica, sativa"));
        assert!(enum_check(Some(&json!("indica")), "type", &["indica"]).is_empty());
        assert_eq!(
            codes(&enum_check(Some(&json!(1)), "type", &["indica"])),
            vec![ErrorCode::TypeMismatch]
        );
    }

    #[test]
    fn range_check_is_inclusive() {
        assert!(range_check(Some(&json!(0)), "p", 0.0, 100.0).is_empty());
        assert!(range_check(Some(&json!(100)), "p", 0.0, 100.0).is_empty());
        assert_eq!(
            codes(&range_check(Some(&json!(100.01)), "p", 0.0, 100.0)),
            vec![ErrorCode::OutOfRange]
        );
        assert_eq!(
            codes(&range_check(Some(&json!(-1)), "p", 0.0, 100.0)),
            vec![ErrorCode::OutOfRange]
        );
    }

    #[test]
    fn range_check_non_number_is_type_mismatch() {
        assert_eq!(
            codes(&range_check(Some(&json!("12")), "p", 0.0, 100.0)),
            vec![ErrorCode::TypeMismatch]
        );
        // serde_json stores non-finite floats as null
        let nan = serde_json::to_value(f64::NAN).unwrap();
        assert_eq!(
            codes(&range_check(Some(&nan), "p", 0.0, 100.0)),
            vec![ErrorCode::TypeMismatch]
        );
    }

    #[test]
    fn pattern_and_length() {
        let re = Regex::new(r"^[a-z]+$").unwrap();
        assert!(pattern_check(Some(&json!("abc")), "id", &re, "lowercase").is_empty());
        assert_eq!(
            codes(&pattern_check(Some(&json!("ABC")), "id", &re, "lowercase")),
            vec![ErrorCode::PatternMismatch]
        );

        assert!(length_check(Some(&json!("ab")), "n", Some(1), Some(2)).is_empty());
        assert_eq!(
            codes(&length_check(Some(&json!("")), "n", Some(1), None)),
            vec![ErrorCode::InvalidLength]
        );
        assert_eq!(
            codes(&length_check(Some(&json!([1, 2, 3])), "n", None, Some(2))),
            vec![ErrorCode::InvalidLength]
        );
        assert_eq!(
            codes(&length_check(Some(&json!(5)), "n", Some(1), None)),
            vec![ErrorCode::TypeMismatch]
        );
    }

    #[test]
    fn url_and_date_formats() {
        assert!(is_well_formed_url("https://seedfinder.eu/strain/blue-dream"));
        assert!(is_well_formed_url("http://localhost:8080"));
        assert!(!is_well_formed_url("ftp://example.com"));
        assert!(!is_well_formed_url("https://"));
        assert!(!is_well_formed_url("not a url"));
        assert!(!is_well_formed_url("http://localhost:\u{0668}\u{0660}"));

        assert!(format_check(Some(&json!("2025-03-14")), "d", Format::Date).is_empty());
        assert!(format_check(Some(&json!("2025-03-14T10:00:00Z")), "d", Format::Date).is_empty());
        assert_eq!(
            codes(&format_check(Some(&json!("2025-13-40")), "d", Format::Date)),
            vec![ErrorCode::InvalidFormat]
        );
    }

    #[test]
    fn paths() {
        assert_eq!(field_path("", "name"), "name");
        assert_eq!(field_path("genetics_profile", "lineage"), "genetics_profile.lineage");
        assert_eq!(index_path("genetics_profile.lineage", 1), "genetics_profile.lineage[1]");
    }
}
