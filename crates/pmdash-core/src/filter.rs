//! Filter evaluation with cascading option lists
//!
//! A [`FilterState`] holds one [`Constraint`] per dimension (in a fixed
//! precedence order, Region → Project → Type by default) plus a free-text
//! query. [`evaluate`] narrows a [`Table`] with it and reports, for every
//! dimension, the values still reachable given the dimensions *above* it.
//! Selecting a region therefore shrinks the project list to projects that
//! occur in that region, while picking a project never shrinks the region
//! list.
//!
//! The state is owned by the caller and only borrowed during evaluation.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::{Record, Table, Value};

/// Default filter dimensions, in precedence order.
pub const DEFAULT_DIMENSIONS: [&str; 3] = ["Region", "Project", "Type"];

/// Label of the unconstrained choice.
pub const ALL_LABEL: &str = "All";

// ============================================================================
// Constraint
// ============================================================================

/// Selection for one dimension.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// No restriction ("All")
    #[default]
    Any,
    /// Cell must equal this value exactly (no trimming, no case folding)
    Is(String),
}

impl Constraint {
    pub fn is(value: impl Into<String>) -> Self {
        Constraint::Is(value.into())
    }

    /// Map a dropdown label back to a constraint; `"All"` is unconstrained.
    pub fn from_label(label: &str) -> Self {
        if label == ALL_LABEL {
            Constraint::Any
        } else {
            Constraint::Is(label.to_string())
        }
    }

    pub fn selected(&self) -> Option<&str> {
        match self {
            Constraint::Any => None,
            Constraint::Is(v) => Some(v),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Constraint::Any)
    }

    /// Missing cells never satisfy a selection.
    pub fn matches(&self, value: Option<&Value>) -> bool {
        match self {
            Constraint::Any => true,
            Constraint::Is(selected) => value
                .filter(|v| !v.is_missing())
                .is_some_and(|v| v.to_string() == *selected),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Any => f.write_str(ALL_LABEL),
            Constraint::Is(v) => f.write_str(v),
        }
    }
}

// ============================================================================
// Filter state
// ============================================================================

/// One filter dimension: the column it reads and its current selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dimension {
    pub column: String,
    pub constraint: Constraint,
}

impl Dimension {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            constraint: Constraint::Any,
        }
    }
}

/// Caller-owned filter selections plus the free-text query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterState {
    dimensions: Vec<Dimension>,
    query: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl FilterState {
    /// Create an unconstrained state over `columns`, in precedence order.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dimensions: columns.into_iter().map(Dimension::new).collect(),
            query: String::new(),
        }
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn constraint(&self, column: &str) -> Option<&Constraint> {
        self.position(column).map(|i| &self.dimensions[i].constraint)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.dimensions.iter().position(|d| d.column == column)
    }

    /// Set one dimension. Returns `false` if `column` is not a dimension.
    pub fn select(&mut self, column: &str, constraint: Constraint) -> bool {
        match self.position(column) {
            Some(i) => {
                self.dimensions[i].constraint = constraint;
                true
            }
            None => false,
        }
    }

    /// Set one dimension, then reset every downstream selection that is no
    /// longer reachable in `table`. Upstream dimensions are left untouched.
    ///
    /// Returns the columns whose selection was reset.
    pub fn select_in(
        &mut self,
        table: &Table,
        column: &str,
        constraint: Constraint,
    ) -> Vec<String> {
        let Some(index) = self.position(column) else {
            return Vec::new();
        };
        self.dimensions[index].constraint = constraint;
        self.reconcile_from(table, index + 1)
    }

    /// Reset every selection that is not among its dimension's options.
    pub fn reconcile(&mut self, table: &Table) -> Vec<String> {
        self.reconcile_from(table, 0)
    }

    fn reconcile_from(&mut self, table: &Table, start: usize) -> Vec<String> {
        let mut reset = Vec::new();
        for i in start..self.dimensions.len() {
            let Some(selected) = self.dimensions[i].constraint.selected() else {
                continue;
            };
            let reachable =
                dimension_options(table, &self.dimensions[..i], &self.dimensions[i].column);
            if !reachable.contains(selected) {
                self.dimensions[i].constraint = Constraint::Any;
                reset.push(self.dimensions[i].column.clone());
            }
        }
        reset
    }

    /// Reset every dimension and the query in one step.
    pub fn clear(&mut self) {
        for dimension in &mut self.dimensions {
            dimension.constraint = Constraint::Any;
        }
        self.query.clear();
    }

    pub fn is_clear(&self) -> bool {
        self.query.is_empty() && self.dimensions.iter().all(|d| d.constraint.is_any())
    }

    /// Whether `record` passes every constraint and the query.
    pub fn matches(&self, record: &Record) -> bool {
        matches_constraints(record, &self.dimensions) && matches_query(record, &self.query)
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, dimension) in self.dimensions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", dimension.column, dimension.constraint)?;
        }
        if !self.query.is_empty() {
            write!(f, "\nSearch: {}", self.query)?;
        }
        Ok(())
    }
}

fn matches_constraints(record: &Record, dimensions: &[Dimension]) -> bool {
    dimensions
        .iter()
        .all(|d| d.constraint.matches(record.get(&d.column)))
}

/// Case-insensitive substring match over the whole row.
fn matches_query(record: &Record, query: &str) -> bool {
    query.is_empty() || record.search_text().contains(&query.to_lowercase())
}

// ============================================================================
// Evaluation
// ============================================================================

/// Values still selectable for one dimension, sorted and distinct.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DimensionOptions {
    pub column: String,
    pub values: Vec<String>,
}

impl DimensionOptions {
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Dropdown labels: `"All"` followed by the values.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        std::iter::once(ALL_LABEL).chain(self.values.iter().map(String::as_str))
    }
}

/// Result of one filter pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    /// Indices of surviving records, in table order
    pub rows: Vec<usize>,
    /// Reachable values per dimension, in precedence order
    pub options: Vec<DimensionOptions>,
}

impl Evaluation {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// First surviving record, the one the dashboard displays.
    pub fn first<'a>(&self, table: &'a Table) -> Option<&'a Record> {
        self.rows.first().and_then(|&i| table.get(i))
    }

    pub fn records<'a>(&'a self, table: &'a Table) -> impl Iterator<Item = &'a Record> + 'a {
        self.rows.iter().filter_map(|&i| table.get(i))
    }

    pub fn options_for(&self, column: &str) -> Option<&DimensionOptions> {
        self.options.iter().find(|o| o.column == column)
    }
}

fn dimension_options(table: &Table, upstream: &[Dimension], column: &str) -> DimensionOptions {
    let values: BTreeSet<String> = table
        .records()
        .iter()
        .filter(|record| matches_constraints(record, upstream))
        .filter_map(|record| record.get(column))
        .filter(|value| !value.is_missing())
        .map(|value| value.to_string())
        .collect();
    let mut values: Vec<String> = values.into_iter().collect();
    values.sort_by(|a, b| option_order(a, b));
    DimensionOptions {
        column: column.to_string(),
        values,
    }
}

/// Numbers first in numeric order, then text in lexical order.
fn option_order(a: &str, b: &str) -> Ordering {
    let numeric = |s: &str| s.trim().parse::<f64>().ok().filter(|n| n.is_finite());
    match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Option lists for every dimension of `state`. Dimension *i* is narrowed by
/// the selections of dimensions `0..i` only; the query does not narrow
/// options.
pub fn options(table: &Table, state: &FilterState) -> Vec<DimensionOptions> {
    let dimensions = state.dimensions();
    (0..dimensions.len())
        .map(|i| dimension_options(table, &dimensions[..i], &dimensions[i].column))
        .collect()
}

/// Apply `state` to `table`.
///
/// Constraints are conjunctive, the query is a case-insensitive substring
/// scan over every cell, and surviving rows keep table order. An empty result
/// is a normal outcome.
pub fn evaluate(table: &Table, state: &FilterState) -> Evaluation {
    let rows = table
        .records()
        .iter()
        .enumerate()
        .filter(|(_, record)| state.matches(record))
        .map(|(i, _)| i)
        .collect();
    Evaluation {
        rows,
        options: options(table, state),
    }
}
