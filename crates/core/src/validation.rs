//! Field validators and per-field error reporting.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// E.164: `+`, 1-3 digit country code, 4-14 digit subscriber number.
#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static E164_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+(\d{1,3})(\d{4,14})$").unwrap());

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
    )
    .unwrap()
});

/// Whether `value` is an E.164 phone number.
#[must_use]
pub fn is_valid_phone(value: &str) -> bool {
    E164_REGEX.is_match(value)
}

/// Phone field validator. Empty input passes; `Required` covers that case.
pub fn validate_phone(value: &str) -> Result<(), FieldRule> {
    if !value.is_empty() && !is_valid_phone(value) {
        return Err(FieldRule::Phone);
    }
    Ok(())
}

/// Whether `value` is shaped like an email address.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

/// The rule a field value broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum FieldRule {
    Required,
    Email,
    Phone,
    Number,
    Min { min: i64 },
    Max { max: i64 },
    MaxLength { max: usize },
}

/// A failed rule on a named form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// camelCase field name, as used in the serialized form
    pub field: &'static str,
    pub rule: FieldRule,
}

impl FieldError {
    #[must_use]
    pub const fn new(field: &'static str, rule: FieldRule) -> Self {
        Self { field, rule }
    }

    /// Human-readable message, e.g. `COUNTRY CODE is required`.
    #[must_use]
    pub fn message(&self) -> String {
        let label = field_label(self.field);
        match self.rule {
            FieldRule::Required => format!("{label} is required"),
            FieldRule::Email => format!("{label} is not an email"),
            FieldRule::Phone => format!("{label} is not in valid E.164 format"),
            FieldRule::Number => format!("{label} value is not permitted"),
            FieldRule::Min { min } => format!("{label} should be greater than {min}"),
            FieldRule::Max { max } => format!("{label} should be smaller than {max}"),
            FieldRule::MaxLength { max } => format!("{label} is longer than {max}"),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.message())
    }
}

/// All failed rules of a form, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Records `rule` for `field` unless the field already has an error.
    pub fn push(&mut self, field: &'static str, rule: FieldRule) {
        if self.get(field).is_none() {
            self.errors.push(FieldError::new(field, rule));
        }
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let messages: Vec<String> = self.errors.iter().map(FieldError::message).collect();
        f.write_str(&messages.join("; "))
    }
}

/// `countryCode` -> `COUNTRY CODE`.
fn field_label(field: &str) -> String {
    let mut label = String::with_capacity(field.len() + 4);
    for (i, c) in field.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            label.push(' ');
        }
        label.extend(c.to_uppercase());
    }
    label
}
