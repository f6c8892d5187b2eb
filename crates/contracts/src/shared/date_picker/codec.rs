//! Free-text parsing and display formatting of dates.
//!
//! Display patterns use the familiar `DD-MM-YYYY` token style. Numeric tokens
//! are translated to chrono strftime items; month and weekday names come from
//! the [`Locale`] table so that they match the calendar overlay.

use std::fmt::Write;

use chrono::{Datelike, NaiveDate};

use super::locale::Locale;
use super::value::DateValue;

pub const DEFAULT_PATTERN: &str = "DD-MM-YYYY";

/// Parse keyboard input into a date.
///
/// Looks for the first run of two digits (day), two digits (month) and four
/// digits (year), each group optionally followed by one non-digit separator:
/// `15-06-2024`, `15/06/2024`, `15062024` and `on 15.06.2024` all match.
/// The returned month is zero-based. The day/month combination is not checked
/// here, `31/02/2024` parses and is rejected later by validation.
pub fn parse(text: &str) -> Option<DateValue> {
    let chars: Vec<char> = text.chars().collect();
    (0..chars.len()).find_map(|start| match_at(&chars, start))
}

fn match_at(chars: &[char], start: usize) -> Option<DateValue> {
    let mut pos = start;
    let day = take_digits(chars, &mut pos, 2)?;
    skip_separator(chars, &mut pos);
    let month = take_digits(chars, &mut pos, 2)?;
    skip_separator(chars, &mut pos);
    let year = take_digits(chars, &mut pos, 4)?;
    Some(DateValue::new(year, month - 1, day))
}

fn take_digits(chars: &[char], pos: &mut usize, count: usize) -> Option<i32> {
    let digits = chars.get(*pos..*pos + count)?;
    let mut number = 0i32;
    for c in digits {
        number = number * 10 + c.to_digit(10)? as i32;
    }
    *pos += count;
    Some(number)
}

fn skip_separator(chars: &[char], pos: &mut usize) {
    if chars.get(*pos).is_some_and(|c| !c.is_ascii_digit()) {
        *pos += 1;
    }
}

/// Render a date with a display pattern.
///
/// Returns `None` when the value is not a real calendar date.
pub fn format(date: &DateValue, pattern: &str, locale: &Locale) -> Option<String> {
    let naive = date.to_naive()?;
    Some(DatePattern::parse(pattern).render(naive, locale))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Year4,
    Year2,
    MonthName,
    MonthShort,
    Month2,
    Month1,
    Day2,
    Day1,
    Weekday,
    WeekdayShort,
    Literal(String),
}

// Longest tokens first so that "MMMM" is not read as "MM" + "MM".
const TOKENS: [(&str, Token); 10] = [
    ("YYYY", Token::Year4),
    ("YY", Token::Year2),
    ("MMMM", Token::MonthName),
    ("MMM", Token::MonthShort),
    ("MM", Token::Month2),
    ("M", Token::Month1),
    ("dddd", Token::Weekday),
    ("ddd", Token::WeekdayShort),
    ("DD", Token::Day2),
    ("D", Token::Day1),
];

/// A tokenized display pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    tokens: Vec<Token>,
}

impl DatePattern {
    /// Tokenize a pattern. Text in `[brackets]` is copied verbatim, any other
    /// character that is not a token is a literal.
    pub fn parse(pattern: &str) -> Self {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut rest = pattern;

        'outer: while !rest.is_empty() {
            if let Some(escaped) = rest.strip_prefix('[') {
                let (text, remaining) = match escaped.split_once(']') {
                    Some((text, remaining)) => (text, remaining),
                    None => (escaped, ""),
                };
                literal.push_str(text);
                rest = remaining;
                continue;
            }

            for (prefix, token) in TOKENS.iter() {
                if let Some(remaining) = rest.strip_prefix(*prefix) {
                    if !literal.is_empty() {
                        tokens.push(Token::Literal(std::mem::take(&mut literal)));
                    }
                    tokens.push(token.clone());
                    rest = remaining;
                    continue 'outer;
                }
            }

            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                literal.push(c);
            }
            rest = chars.as_str();
        }

        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Self { tokens }
    }

    /// Render through chrono; locale names and literals are escaped into the
    /// strftime string.
    pub fn render(&self, date: NaiveDate, locale: &Locale) -> String {
        let mut strftime = String::new();
        for token in &self.tokens {
            match token {
                Token::Year4 => strftime.push_str("%Y"),
                Token::Year2 => strftime.push_str("%y"),
                Token::Month2 => strftime.push_str("%m"),
                Token::Month1 => strftime.push_str("%-m"),
                Token::Day2 => strftime.push_str("%d"),
                Token::Day1 => strftime.push_str("%-d"),
                Token::MonthName => push_escaped(&mut strftime, locale.month_name(date.month0())),
                Token::MonthShort => {
                    push_escaped(&mut strftime, locale.month_name_short(date.month0()))
                }
                Token::Weekday => push_escaped(&mut strftime, locale.weekday(date)),
                Token::WeekdayShort => push_escaped(&mut strftime, locale.weekday_short(date)),
                Token::Literal(text) => push_escaped(&mut strftime, text),
            }
        }

        let mut out = String::new();
        if write!(out, "{}", date.format(&strftime)).is_err() {
            log::warn!("date pattern produced an invalid strftime string: {strftime}");
            return date.format(super::value::PUBLIC_FORMAT).to_string();
        }
        out
    }
}

impl Default for DatePattern {
    fn default() -> Self {
        Self::parse(DEFAULT_PATTERN)
    }
}

fn push_escaped(strftime: &mut String, text: &str) {
    strftime.push_str(&text.replace('%', "%%"));
}
