//! Validation rules for the date field

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::value::{parse_public, DateValue};

/// Why a date field value is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("a value is required")]
    RequiredMissing,
    #[error("date is before the minimum allowed date")]
    BelowMinimum,
    #[error("date is after the maximum allowed date")]
    AboveMaximum,
    #[error("day, month and year do not form a calendar date")]
    StructurallyInvalid,
}

/// Inclusive date range. Either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub minimum: Option<NaiveDate>,
    pub maximum: Option<NaiveDate>,
}

impl Bounds {
    /// Build bounds from public-format strings. Strings that do not parse are
    /// treated as "no bound".
    pub fn from_public(minimum: Option<&str>, maximum: Option<&str>) -> Self {
        Self {
            minimum: minimum.and_then(|s| parse_bound(s, "minimum")),
            maximum: maximum.and_then(|s| parse_bound(s, "maximum")),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.minimum.map_or(true, |min| date >= min) && self.maximum.map_or(true, |max| date <= max)
    }
}

fn parse_bound(value: &str, side: &str) -> Option<NaiveDate> {
    if value.trim().is_empty() {
        return None;
    }
    let parsed = parse_public(value);
    if parsed.is_none() {
        log::warn!("ignoring unparseable {side} date bound {value:?}");
    }
    parsed
}

/// Messages shown for each rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationMessages {
    pub required: String,
    pub minimum: String,
    pub maximum: String,
}

impl Default for ValidationMessages {
    fn default() -> Self {
        Self {
            required: "Este campo deve ser preenchido.".to_string(),
            minimum: "A data não pode ser inferior ao limite mínimo".to_string(),
            maximum: "A data não pode ser superior ao limite máximo".to_string(),
        }
    }
}

impl ValidationMessages {
    /// Message for a violation. Structural errors have no dedicated text.
    pub fn for_error(&self, error: ValidationError) -> Option<&str> {
        match error {
            ValidationError::RequiredMissing => Some(self.required.as_str()),
            ValidationError::BelowMinimum => Some(self.minimum.as_str()),
            ValidationError::AboveMaximum => Some(self.maximum.as_str()),
            ValidationError::StructurallyInvalid => None,
        }
    }
}

/// Check a value against the required flag and the bounds.
///
/// If a value is both below the minimum and above the maximum (only possible
/// with minimum > maximum) the maximum violation is reported.
pub fn validate(
    value: Option<&DateValue>,
    required: bool,
    bounds: &Bounds,
) -> Result<(), ValidationError> {
    let Some(value) = value else {
        return if required {
            Err(ValidationError::RequiredMissing)
        } else {
            Ok(())
        };
    };

    let date = value
        .to_naive()
        .ok_or(ValidationError::StructurallyInvalid)?;

    let mut violation = None;
    if bounds.minimum.is_some_and(|min| date < min) {
        violation = Some(ValidationError::BelowMinimum);
    }
    if bounds.maximum.is_some_and(|max| date > max) {
        violation = Some(ValidationError::AboveMaximum);
    }

    match violation {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

/// Derived validity as the text field renders it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationState {
    pub invalid: bool,
    pub error_message: Option<String>,
}

impl ValidationState {
    pub fn valid() -> Self {
        Self::default()
    }

    pub fn from_outcome(outcome: Result<(), ValidationError>, messages: &ValidationMessages) -> Self {
        match outcome {
            Ok(()) => Self::valid(),
            Err(error) => Self {
                invalid: true,
                error_message: messages.for_error(error).map(str::to_string),
            },
        }
    }
}
