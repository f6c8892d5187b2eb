use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Strings handed to the calendar overlay.
///
/// Weekday tables start on Sunday, month tables on January.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Locale {
    pub weekdays: Vec<String>,
    pub weekdays_short: Vec<String>,
    pub month_names: Vec<String>,
    pub month_names_short: Vec<String>,
    pub today: String,
    pub cancel: String,
}

const WEEKDAYS: [&str; 7] = [
    "domingo",
    "segunda-feira",
    "terça-feira",
    "quarta-feira",
    "quinta-feira",
    "sexta-feira",
    "sábado",
];

const WEEKDAYS_SHORT: [&str; 7] = ["dom", "seg", "ter", "qua", "qui", "sex", "sáb"];

const MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

const MONTHS_SHORT: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

impl Default for Locale {
    fn default() -> Self {
        Self {
            weekdays: WEEKDAYS.iter().map(|d| capitalize(d)).collect(),
            weekdays_short: WEEKDAYS_SHORT.iter().map(|d| capitalize(d)).collect(),
            month_names: MONTHS.iter().map(|m| capitalize(m)).collect(),
            month_names_short: MONTHS_SHORT.iter().map(|m| capitalize(m)).collect(),
            today: "Hoje".to_string(),
            cancel: "Cancelar".to_string(),
        }
    }
}

impl Locale {
    /// Full month name for a zero-based month index.
    pub fn month_name(&self, month0: u32) -> &str {
        lookup(&self.month_names, month0 as usize)
    }

    pub fn month_name_short(&self, month0: u32) -> &str {
        lookup(&self.month_names_short, month0 as usize)
    }

    pub fn weekday(&self, date: NaiveDate) -> &str {
        let index = date.weekday().num_days_from_sunday() as usize;
        lookup(&self.weekdays, index)
    }

    pub fn weekday_short(&self, date: NaiveDate) -> &str {
        let index = date.weekday().num_days_from_sunday() as usize;
        lookup(&self.weekdays_short, index)
    }

    /// Long caption shown above the calendar grid, e.g. "Sábado, 15 de Junho de 2024".
    pub fn caption(&self, date: NaiveDate) -> String {
        format!(
            "{}, {} de {} de {}",
            self.weekday(date),
            date.day(),
            self.month_name(date.month0()),
            date.year()
        )
    }
}

// A host-supplied table may be short; fall back to nothing rather than panic.
fn lookup(table: &[String], index: usize) -> &str {
    table.get(index).map(String::as_str).unwrap_or_default()
}

/// Uppercases the first character, leaving the rest untouched.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
