//! Scalar formatters
//!
//! Every function here is total: any [`Value`], including malformed text and
//! non-finite numbers, produces a display string or a `None` sentinel. Nothing
//! panics and nothing returns an error.
//!
//! Rounding is half-to-even everywhere (`2.5` → `2`, `3.5` → `4`).

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::{ConfigError, Value};

/// Day zero of spreadsheet serial dates.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Serial numbers beyond this many days are treated as unparseable.
const MAX_SERIAL_DAYS: f64 = 3_000_000.0;

/// Display format for dates: `05-Mar-2024`.
pub const DATE_DISPLAY_FORMAT: &str = "%d-%b-%Y";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

// Month-first before day-first, matching how US-style sheets are read.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%d.%m.%Y",
];

// ============================================================================
// Numbers
// ============================================================================

/// Numeric view of a cell: numbers as-is, text trimmed and parsed.
fn coerce_number(value: &Value) -> Option<f64> {
    value.as_number().or_else(|| {
        value
            .as_text()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|n| !n.is_nan())
    })
}

fn integer_string(n: f64) -> String {
    // `{:.0}` renders -0.0 as "-0"
    if n == 0.0 {
        "0".to_string()
    } else {
        format!("{:.0}", n)
    }
}

/// Integer display of a numeric cell.
///
/// Missing or non-numeric input gives `""`; zero gives `"0"`. Infinite
/// values cannot be rounded and are echoed as-is.
pub fn format_integer(value: &Value) -> String {
    match coerce_number(value) {
        None => String::new(),
        Some(n) if n.is_infinite() => value.to_string().trim().to_string(),
        Some(n) => integer_string(n.round_ties_even()),
    }
}

/// Headcount-style display: numeric input is truncated to an integer,
/// anything else is shown as trimmed text.
pub fn format_count(value: &Value) -> String {
    if value.is_missing() {
        return String::new();
    }
    match coerce_number(value) {
        Some(n) if n.is_finite() => integer_string(n.trunc()),
        _ => value.to_string().trim().to_string(),
    }
}

/// Trimmed text form of a cell, `""` when missing.
pub fn format_text(value: &Value) -> String {
    value.to_string().trim().to_string()
}

/// Raw display form, blank for anything falsy (missing, empty, zero).
pub fn format_plain(value: &Value) -> String {
    if value.is_truthy() {
        value.to_string()
    } else {
        String::new()
    }
}

// ============================================================================
// Percentages
// ============================================================================

/// Parse a cell into an integer percent in `[-100, 100]`.
///
/// - `"67%"` → 67 (an explicit `%` means the number already is a percent)
/// - `0.67` → 67 (bare magnitudes up to 1 are fractions)
/// - `67` → 67 (bare magnitudes above 1 are already percents)
/// - `"150"` → 100 (clamped)
///
/// Blank, missing, unparseable or non-finite input gives `None`.
pub fn parse_percent(value: &Value) -> Option<i32> {
    let (num, has_pct) = match value {
        _ if value.is_missing() => return None,
        Value::Number(n) => (*n, false),
        other => {
            let raw = other.to_string();
            let s = raw.trim();
            if s.is_empty() {
                return None;
            }
            let cleaned = s.replace('%', "").replace(',', "");
            let num = cleaned.trim().parse::<f64>().ok()?;
            (num, s.contains('%'))
        }
    };

    if !num.is_finite() {
        return None;
    }

    let pct = if has_pct || num.abs() > 1.0 {
        num
    } else {
        num * 100.0
    };

    Some(pct.round_ties_even().clamp(-100.0, 100.0) as i32)
}

/// Three-way sign classification of a percent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentSign {
    Positive,
    Negative,
    Neutral,
}

impl PercentSign {
    pub fn of(pct: i32) -> Self {
        match pct {
            p if p > 0 => PercentSign::Positive,
            p if p < 0 => PercentSign::Negative,
            _ => PercentSign::Neutral,
        }
    }
}

/// A percent together with its sign class; renderers pick the colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StyledPercent {
    pub value: i32,
    pub sign: PercentSign,
}

impl StyledPercent {
    pub fn new(value: i32) -> Self {
        Self {
            value,
            sign: PercentSign::of(value),
        }
    }
}

impl fmt::Display for StyledPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.value)
    }
}

/// Attach a sign class to a parsed percent. `None` stays unstyled.
pub fn colorize_percent(pct: Option<i32>) -> Option<StyledPercent> {
    pct.map(StyledPercent::new)
}

// ============================================================================
// Dates
// ============================================================================

/// Convert a spreadsheet serial day count into a calendar date. The
/// fractional part is a time of day and never moves the date.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial.abs() > MAX_SERIAL_DAYS {
        return None;
    }
    let (y, m, d) = SERIAL_EPOCH;
    NaiveDate::from_ymd_opt(y, m, d)?.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Parse calendar text. Returns `None` instead of guessing; unparseable text
/// never turns into an epoch default.
pub fn parse_calendar_text(text: &str) -> Option<NaiveDate> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        })
}

/// Render a cell as `DD-Mon-YYYY`.
///
/// Numbers are spreadsheet serials anchored at 1899-12-30. Text goes through
/// [`parse_calendar_text`]. Anything that does not parse comes back as its
/// original string form.
pub fn format_date(value: &Value) -> String {
    let parsed = match value {
        _ if value.is_missing() => return String::new(),
        Value::Number(n) => serial_to_date(*n),
        Value::Date(dt) => Some(dt.date()),
        Value::Text(s) => parse_calendar_text(s),
        Value::Missing => None,
    };
    match parsed {
        Some(date) => date.format(DATE_DISPLAY_FORMAT).to_string(),
        None => value.to_string(),
    }
}

// ============================================================================
// Free text
// ============================================================================

/// Sentence terminators and slash.
pub const SENTENCE_DELIMITERS: &str = ".!?/";

/// Pipe-separated lists.
pub const PIPE_DELIMITERS: &str = "|";

/// Markup line break understood by the display layer.
pub const DEFAULT_BREAK_TOKEN: &str = "<br>";

/// Splits free text into display lines after a configurable set of
/// delimiter characters.
///
/// A delimiter followed by whitespace keeps the delimiter and replaces the
/// whitespace run with one break token. Newlines already in the text also
/// become break tokens.
#[derive(Clone, Debug)]
pub struct LineBreaker {
    delimiters: String,
    token: String,
    pattern: Regex,
}

impl LineBreaker {
    pub fn new(delimiters: &str, token: impl Into<String>) -> Result<Self, ConfigError> {
        if delimiters.is_empty() {
            return Err(ConfigError::Delimiters(
                delimiters.to_string(),
                "at least one delimiter is required".into(),
            ));
        }
        let class: String = delimiters
            .chars()
            .map(|c| regex::escape(c.encode_utf8(&mut [0; 4])))
            .collect();
        let pattern = Regex::new(&format!(r"([{}])\s+", class))
            .map_err(|e| ConfigError::Delimiters(delimiters.to_string(), e.to_string()))?;
        Ok(Self {
            delimiters: delimiters.to_string(),
            token: token.into(),
            pattern,
        })
    }

    /// Break after `.`, `!`, `?` and `/`.
    pub fn sentences() -> Self {
        Self::new(SENTENCE_DELIMITERS, DEFAULT_BREAK_TOKEN).expect("static delimiter set")
    }

    /// Break after `|`.
    pub fn pipe() -> Self {
        Self::new(PIPE_DELIMITERS, DEFAULT_BREAK_TOKEN).expect("static delimiter set")
    }

    pub fn delimiters(&self) -> &str {
        &self.delimiters
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn break_into_lines(&self, value: &Value) -> String {
        if value.is_missing() {
            return String::new();
        }
        let text = value.to_string();
        let broken = self.pattern.replace_all(text.trim(), "${1}\n");
        broken.replace('\n', &self.token)
    }
}

impl Default for LineBreaker {
    fn default() -> Self {
        Self::sentences()
    }
}

impl PartialEq for LineBreaker {
    fn eq(&self, other: &Self) -> bool {
        self.delimiters == other.delimiters && self.token == other.token
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Value {
        Value::from(s)
    }

    #[test]
    fn integer_rounding() {
        assert_eq!(format_integer(&Value::Number(0.0)), "0");
        assert_eq!(format_integer(&Value::Number(3.6)), "4");
        assert_eq!(format_integer(&Value::Number(-0.4)), "0");
        assert_eq!(format_integer(&Value::Number(2.5)), "2");
        assert_eq!(format_integer(&Value::Number(3.5)), "4");
        assert_eq!(format_integer(&Value::Number(-7.6)), "-8");
        assert_eq!(format_integer(&Value::Number(1_234_567.0)), "1234567");
    }

    #[test]
    fn integer_blank_and_text() {
        assert_eq!(format_integer(&Value::Missing), "");
        assert_eq!(format_integer(&Value::Number(f64::NAN)), "");
        assert_eq!(format_integer(&text(" 12.4 ")), "12");
        assert_eq!(format_integer(&text("TBD")), "");
        assert_eq!(format_integer(&text("1,200")), "");
        assert_eq!(format_integer(&Value::Number(f64::INFINITY)), "inf");
    }

    #[test]
    fn count_truncates_or_echoes() {
        assert_eq!(format_count(&Value::Number(12.9)), "12");
        assert_eq!(format_count(&text("7")), "7");
        assert_eq!(format_count(&text(" 5 onsite + 3 offshore ")), "5 onsite + 3 offshore");
        assert_eq!(format_count(&Value::Missing), "");
    }

    #[test]
    fn plain_and_text() {
        assert_eq!(format_text(&text("  12 L  ")), "12 L");
        assert_eq!(format_text(&Value::Missing), "");
        assert_eq!(format_plain(&Value::Number(0.0)), "");
        assert_eq!(format_plain(&text("6 months")), "6 months");
    }

    #[test]
    fn percent_documented_cases() {
        assert_eq!(parse_percent(&text("0.67")), Some(67));
        assert_eq!(parse_percent(&text("67%")), Some(67));
        assert_eq!(parse_percent(&text("67")), Some(67));
        assert_eq!(parse_percent(&text("150")), Some(100));
        assert_eq!(parse_percent(&text("abc")), None);
        assert_eq!(parse_percent(&text("")), None);
    }

    #[test]
    fn percent_more_cases() {
        assert_eq!(parse_percent(&Value::Number(0.67)), Some(67));
        assert_eq!(parse_percent(&Value::Number(1.0)), Some(100));
        assert_eq!(parse_percent(&Value::Number(-0.25)), Some(-25));
        assert_eq!(parse_percent(&text(" 0.67 ")), Some(67));
        assert_eq!(parse_percent(&text("0.5%")), Some(0));
        assert_eq!(parse_percent(&text("-250%")), Some(-100));
        assert_eq!(parse_percent(&text("1,050")), Some(100));
        assert_eq!(parse_percent(&text("   ")), None);
        assert_eq!(parse_percent(&text("nan")), None);
        assert_eq!(parse_percent(&text("inf")), None);
        assert_eq!(parse_percent(&Value::Missing), None);
        assert_eq!(parse_percent(&Value::Number(f64::NAN)), None);
    }

    #[test]
    fn percent_sign_classes() {
        assert_eq!(colorize_percent(None), None);
        assert_eq!(colorize_percent(Some(12)).map(|p| p.sign), Some(PercentSign::Positive));
        assert_eq!(colorize_percent(Some(-3)).map(|p| p.sign), Some(PercentSign::Negative));
        assert_eq!(colorize_percent(Some(0)).map(|p| p.sign), Some(PercentSign::Neutral));
        assert_eq!(StyledPercent::new(-3).to_string(), "-3%");
    }

    #[test]
    fn date_from_serial() {
        assert_eq!(format_date(&Value::Number(45000.0)), "15-Mar-2023");
        assert_eq!(format_date(&Value::Number(45000.75)), "15-Mar-2023");
        assert_eq!(format_date(&Value::Number(0.0)), "30-Dec-1899");
        assert!(format_date(&Value::Number(45000.0)).ends_with("2023"));
    }

    #[test]
    fn date_from_text() {
        assert_eq!(format_date(&text("2024-03-05")), "05-Mar-2024");
        assert_eq!(format_date(&text("2024-03-05 14:30:00")), "05-Mar-2024");
        assert_eq!(format_date(&text("3/5/2024")), "05-Mar-2024");
        assert_eq!(format_date(&text("25/03/2024")), "25-Mar-2024");
        assert_eq!(format_date(&text("05-Mar-2024")), "05-Mar-2024");
        assert_eq!(format_date(&text("March 5, 2024")), "05-Mar-2024");
        assert_eq!(format_date(&text("2024-03-05T10:00:00+05:30")), "05-Mar-2024");
    }

    #[test]
    fn date_failure_echoes_original() {
        assert_eq!(format_date(&text("not a date")), "not a date");
        assert_eq!(format_date(&text("Q3 FY25")), "Q3 FY25");
        assert_eq!(format_date(&Value::Missing), "");
        assert_eq!(format_date(&Value::Number(f64::INFINITY)), "inf");
        assert!(!format_date(&text("garbage")).contains("1970"));
    }

    #[test]
    fn date_from_date_cell() {
        let d = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        assert_eq!(format_date(&Value::from(d)), "01-Dec-2024");
    }

    #[test]
    fn sentence_breaks() {
        let breaker = LineBreaker::sentences();
        assert_eq!(
            breaker.break_into_lines(&text("Design done. Build started! Next? QA/UAT pending")),
            "Design done.<br>Build started!<br>Next?<br>QA/UAT pending"
        );
        assert_eq!(
            breaker.break_into_lines(&text("Phase 1 / Phase 2")),
            "Phase 1 /<br>Phase 2"
        );
    }

    #[test]
    fn whitespace_run_collapses_to_one_break() {
        let breaker = LineBreaker::sentences();
        assert_eq!(breaker.break_into_lines(&text("One.   \n  Two.")), "One.<br>Two.");
    }

    #[test]
    fn decimals_and_trailing_delimiters_are_left_alone() {
        let breaker = LineBreaker::sentences();
        assert_eq!(breaker.break_into_lines(&text("  v1.5 shipped.  ")), "v1.5 shipped.");
    }

    #[test]
    fn pipe_breaks() {
        let breaker = LineBreaker::pipe();
        assert_eq!(
            breaker.break_into_lines(&text("M1 30% | M2 40% | M3 30%. Done")),
            "M1 30% |<br>M2 40% |<br>M3 30%. Done"
        );
    }

    #[test]
    fn existing_newlines_become_tokens() {
        let breaker = LineBreaker::new("|", "\n\n").unwrap();
        assert_eq!(breaker.break_into_lines(&text("a\nb")), "a\n\nb");
        assert_eq!(LineBreaker::pipe().break_into_lines(&text("a\nb")), "a<br>b");
    }

    #[test]
    fn missing_text_is_blank() {
        assert_eq!(LineBreaker::default().break_into_lines(&Value::Missing), "");
    }

    #[test]
    fn regex_metacharacters_are_escaped() {
        let breaker = LineBreaker::new("]-^", "<br>").unwrap();
        assert_eq!(breaker.break_into_lines(&text("a] b- c^ d")), "a]<br>b-<br>c^<br>d");
        assert!(LineBreaker::new("", "<br>").is_err());
    }
}
