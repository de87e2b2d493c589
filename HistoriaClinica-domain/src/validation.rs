//! Field validators and violation reporting.
//!
//! Sections declare their rules with `validator` attributes (or a manual
//! `Validate` impl for numeric fields). [`validate_section`] runs them and
//! flattens the result into an ordered list of human readable violations.

use std::borrow::Cow;
use std::fmt;

use chrono::NaiveDate;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

/// Upper bound for free-text clinical fields
pub const LONG_TEXT_MAX: u64 = 4000;

/// Message used when a rule carries no message of its own
pub const DEFAULT_MESSAGE: &str = "Datos inválidos";

/// Format accepted for calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One failed rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

/// All failed rules of a section, in form order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn first(&self) -> Option<&Violation> {
        self.0.first()
    }

    /// Message shown to the user for a rejected save
    pub fn first_message(&self) -> &str {
        self.0
            .first()
            .map(|v| v.message.as_str())
            .unwrap_or(DEFAULT_MESSAGE)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }

    pub fn messages_for(&self, field: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|v| v.field == field)
            .map(|v| v.message.as_str())
            .collect()
    }

    fn from_errors(errors: &ValidationErrors, order: &[&str]) -> Self {
        let mut violations = Vec::new();
        collect(errors, "", &mut violations);
        violations.sort_by_key(|v| position(order, &v.field));
        Violations(violations)
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.first_message())
    }
}

impl std::error::Error for Violations {}

/// A section with validation rules and a display order for its fields
pub trait SectionRules: Validate {
    /// Field paths in form order; nested fields are written `parent.child`
    const FIELD_ORDER: &'static [&'static str];
}

/// Run a section's rules
pub fn validate_section<T: SectionRules>(section: &T) -> Result<(), Violations> {
    match section.validate() {
        Ok(()) => Ok(()),
        Err(errors) => Err(Violations::from_errors(&errors, T::FIELD_ORDER)),
    }
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<Violation>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| DEFAULT_MESSAGE.to_string());
                    out.push(Violation {
                        field: path.clone(),
                        message,
                    });
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(nested, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

// Keys are compared without case or underscores so `numero_identificacion`
// and `numeroIdentificacion` land on the same slot
fn position(order: &[&str], field: &str) -> usize {
    let field = canonical(field.split('[').next().unwrap_or(field));
    order
        .iter()
        .position(|candidate| canonical(candidate) == field)
        .unwrap_or(order.len())
}

fn canonical(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Build an error with a display message
pub fn violation(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Parse a decimal number, rejecting blanks and non-finite values
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a `YYYY-MM-DD` date, tolerating a trailing time component
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = match trimmed.find('T') {
        Some(idx) => &trimmed[..idx],
        None => trimmed,
    };
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
}

/// Bounds and label of an optional numeric field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRule {
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
}

impl NumericRule {
    pub const fn new(label: &'static str, min: f64, max: f64) -> Self {
        Self { label, min, max }
    }

    /// Blank passes; anything else must be a number inside the bounds
    pub fn check(&self, raw: &str) -> Result<(), ValidationError> {
        if raw.trim().is_empty() {
            return Ok(());
        }

        let Some(value) = parse_numeric(raw) else {
            return Err(violation(
                "numeric",
                format!("{} debe ser numérico", self.label),
            ));
        };

        if value < self.min {
            return Err(violation(
                "range_min",
                format!("{} mínimo {}", self.label, self.min),
            ));
        }
        if value > self.max {
            return Err(violation(
                "range_max",
                format!("{} máximo {}", self.label, self.max),
            ));
        }
        Ok(())
    }
}

/// Trimmed value must reach `min` characters
pub fn check_trimmed_min(
    raw: &str,
    min: usize,
    message: &'static str,
) -> Result<(), ValidationError> {
    if raw.trim().chars().count() < min {
        return Err(violation("length", message));
    }
    Ok(())
}

/// Value must be one of the allowed options, or blank when `allow_blank`
pub fn check_one_of(
    raw: &str,
    allowed: &[&str],
    allow_blank: bool,
    message: &'static str,
) -> Result<(), ValidationError> {
    if allow_blank && raw.is_empty() {
        return Ok(());
    }
    if allowed.contains(&raw) {
        Ok(())
    } else {
        Err(violation("one_of", message))
    }
}
