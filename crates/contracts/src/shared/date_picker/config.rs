use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::codec::DEFAULT_PATTERN;
use super::locale::Locale;
use super::validation::{Bounds, ValidationMessages};
use super::value::parse_public;

/// Host-supplied settings of a date field.
///
/// Every field has a default, so a host only spells out what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatePickerConfig {
    /// Whether an empty value is a validation error.
    pub required: bool,
    /// Display pattern, e.g. `DD-MM-YYYY`.
    pub format: String,
    /// Earliest accepted date (`YYYY-MM-DD`), inclusive.
    pub minimum_date: Option<String>,
    /// Latest accepted date (`YYYY-MM-DD`), inclusive.
    pub maximum_date: Option<String>,
    pub disabled: bool,
    pub readonly: bool,
    /// Label shown on the text field.
    pub input_placeholder: Option<String>,
    pub tooltip: Option<String>,
    pub messages: ValidationMessages,
    pub locale: Locale,
}

impl Default for DatePickerConfig {
    fn default() -> Self {
        Self {
            required: true,
            format: DEFAULT_PATTERN.to_string(),
            minimum_date: None,
            maximum_date: None,
            disabled: false,
            readonly: false,
            input_placeholder: None,
            tooltip: None,
            messages: ValidationMessages::default(),
            locale: Locale::default(),
        }
    }
}

/// Default configuration embedded in the binary
pub const DEFAULT_CONFIG: &str = r#"
{
    "required": true,
    "format": "DD-MM-YYYY"
}
"#;

impl DatePickerConfig {
    /// Load configuration from a JSON document.
    ///
    /// Unlike programmatic updates, a loaded document must have parseable
    /// bounds in the right order.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: DatePickerConfig =
            serde_json::from_str(json).context("failed to parse date picker config")?;
        config.check_bounds()?;
        Ok(config)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_public(self.minimum_date.as_deref(), self.maximum_date.as_deref())
    }

    /// Whether the popup may be opened at all.
    pub fn is_interactive(&self) -> bool {
        !self.disabled && !self.readonly
    }

    fn check_bounds(&self) -> anyhow::Result<()> {
        let minimum = parse_optional_bound(self.minimum_date.as_deref())
            .context("invalid minimum_date")?;
        let maximum = parse_optional_bound(self.maximum_date.as_deref())
            .context("invalid maximum_date")?;

        if let (Some(minimum), Some(maximum)) = (minimum, maximum) {
            if minimum > maximum {
                anyhow::bail!("minimum_date {minimum} is after maximum_date {maximum}");
            }
        }
        Ok(())
    }
}

fn parse_optional_bound(value: Option<&str>) -> anyhow::Result<Option<chrono::NaiveDate>> {
    match value {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_public(s)
            .map(Some)
            .with_context(|| format!("{s:?} is not a YYYY-MM-DD date")),
    }
}
