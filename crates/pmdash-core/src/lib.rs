//! # pmdash-core
//!
//! Core domain model for the pmdash project-status dashboard.
//!
//! This crate provides:
//! - Domain types: `Value`, `Record`, `Table`
//! - Field resolution over inconsistent spreadsheet headers ([`resolve`])
//! - Total scalar formatters for numbers, percents, dates and text ([`format`])
//! - Conjunctive filtering with cascading option lists ([`filter`])
//! - The assembled per-project view and the `Renderer` trait ([`view`])
//! - Error types and configuration
//!
//! ## Example
//!
//! ```rust
//! use pmdash_core::{Record, Table};
//! use pmdash_core::filter::{evaluate, Constraint, FilterState};
//! use pmdash_core::format::parse_percent;
//! use pmdash_core::resolve::resolve;
//!
//! let table = Table::from_records(vec![
//!     Record::new().with("Region", "West").with("Project", "Atlas").with("Billed", 0.67),
//!     Record::new().with("Region", "East").with("Project", "Borealis").with("Billed", "40%"),
//! ]);
//!
//! let mut state = FilterState::default();
//! state.select("Region", Constraint::is("East"));
//!
//! let evaluation = evaluate(&table, &state);
//! let first = evaluation.first(&table).unwrap();
//! assert_eq!(parse_percent(resolve(first, &["Billed %", "Billed"])), Some(40));
//! ```

pub mod config;
pub mod dashboard;
pub mod filter;
pub mod format;
pub mod resolve;
pub mod view;

pub use config::DashboardConfig;
pub use dashboard::Dashboard;
pub use view::{ProjectView, Renderer};

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Value
// ============================================================================

/// A single raw cell as it came out of the source table.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Null, NaN, or an empty cell
    #[default]
    Missing,
    Number(f64),
    Text(String),
    /// A cell the loader already recognised as a calendar value
    Date(NaiveDateTime),
}

impl Value {
    /// `true` for `Missing` and for a NaN number.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness used to decide whether an optional section is shown:
    /// non-empty text, non-zero number, or any date.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Missing => false,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
            Value::Date(_) => true,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Number(n) if n.is_nan() => Ok(()),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{:.0}", n),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Date(dt) if dt.time().num_seconds_from_midnight() == 0 => {
                write!(f, "{}", dt.format("%Y-%m-%d"))
            }
            Value::Date(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::Date(dt)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d.and_time(chrono::NaiveTime::MIN))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Missing, Into::into)
    }
}

// ============================================================================
// Record
// ============================================================================

/// One table row: column name to raw value, in header order.
///
/// Column names are literal keys. `"Scope"` and `"Scope "` are different
/// columns; alias lists compensate for that at lookup time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Insert or replace a column value, keeping the original position on replace.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((column, value)),
        }
    }

    /// Raw lookup. `None` means the column is absent, which is different
    /// from a present-but-missing cell.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Lowercased rendering of every cell, joined by spaces, used by the
    /// free-text search.
    pub fn search_text(&self) -> String {
        self.iter()
            .map(|(_, value)| value.to_string())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            record.insert(column, value);
        }
        record
    }
}

// ============================================================================
// Table
// ============================================================================

/// An ordered sequence of records with a loosely shared header.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table; the header is the union of record columns in
    /// first-seen order.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut table = Table::new();
        for record in records {
            table.push(record);
        }
        table
    }

    pub fn push(&mut self, record: Record) {
        for column in record.columns() {
            if !self.columns.iter().any(|c| c == column) {
                self.columns.push(column.to_string());
            }
        }
        self.records.push(record);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Configuration loading error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid line-break delimiters {0:?}: {1}")]
    Delimiters(String, String),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Format error: {0}")]
    Format(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn value_missing_covers_nan() {
        assert!(Value::Missing.is_missing());
        assert!(Value::Number(f64::NAN).is_missing());
        assert!(!Value::Number(0.0).is_missing());
        assert!(!Value::Text(String::new()).is_missing());
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::Number(42.0).to_string(), "42");
        assert_eq!(Value::Number(0.5).to_string(), "0.5");
        assert_eq!(Value::Missing.to_string(), "");
        assert_eq!(Value::from("Atlas").to_string(), "Atlas");

        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(Value::from(d).to_string(), "2024-03-05");
    }

    #[test]
    fn value_accessors() {
        assert_eq!(Value::Number(2.5).as_number(), Some(2.5));
        assert_eq!(Value::Number(f64::NAN).as_number(), None);
        assert_eq!(Value::from("2.5").as_number(), None);
        assert_eq!(Value::from("2.5").as_text(), Some("2.5"));
        assert_eq!(Value::Number(2.5).as_text(), None);
    }

    #[test]
    fn record_iter_keeps_column_order() {
        let record = Record::new().with("B", "x").with("A", Value::Missing);
        let pairs: Vec<_> = record.iter().collect();
        assert_eq!(pairs, vec![("B", &Value::from("x")), ("A", &Value::Missing)]);
        assert_eq!(record.search_text(), "x ");
    }

    #[test]
    fn value_truthiness() {
        assert!(!Value::Missing.is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from(" ").is_truthy());
        assert!(Value::Number(-1.0).is_truthy());
    }

    #[test]
    fn record_insert_replaces_in_place() {
        let mut record = Record::new().with("A", 1).with("B", 2);
        record.insert("A", "one");

        let columns: Vec<_> = record.columns().collect();
        assert_eq!(columns, vec!["A", "B"]);
        assert_eq!(record.get("A"), Some(&Value::from("one")));
        assert_eq!(record.get("C"), None);
    }

    #[test]
    fn record_search_text_is_lowercased_values() {
        let record = Record::new()
            .with("Project", "Atlas Upgrade")
            .with("Billed", 0.5)
            .with("Notes", Value::Missing);
        assert_eq!(record.search_text(), "atlas upgrade 0.5 ");
    }

    #[test]
    fn table_header_is_union_in_first_seen_order() {
        let table = Table::from_records(vec![
            Record::new().with("Project", "A").with("Region", "West"),
            Record::new().with("Project", "B").with("Type", "Fixed"),
        ]);
        assert_eq!(table.columns(), &["Project", "Region", "Type"]);
        assert_eq!(table.len(), 2);
        assert!(table.get(2).is_none());
    }
}
