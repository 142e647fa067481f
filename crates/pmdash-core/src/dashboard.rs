//! Table + configuration glue: filter, pick the first row, build its view.

use tracing::{debug, warn};

use crate::config::DashboardConfig;
use crate::filter::{self, Constraint, DimensionOptions, Evaluation, FilterState};
use crate::format::LineBreaker;
use crate::resolve::detect_column;
use crate::view::ProjectView;
use crate::{ConfigError, Table};

/// A loaded table with its display configuration.
#[derive(Clone, Debug)]
pub struct Dashboard {
    table: Table,
    config: DashboardConfig,
    breaker: LineBreaker,
    project_column: Option<String>,
}

impl Dashboard {
    pub fn new(table: Table, config: DashboardConfig) -> Result<Self, ConfigError> {
        let breaker = config.line_breaker()?;
        let project_column =
            detect_column(table.columns(), &config.filters.project_keyword).map(str::to_string);
        match &project_column {
            Some(column) => debug!(column = %column, "detected project column"),
            None => warn!(
                keyword = %config.filters.project_keyword,
                "no project column found, project names will fall back to aliases"
            ),
        }
        Ok(Self {
            table,
            config,
            breaker,
            project_column,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn project_column(&self) -> Option<&str> {
        self.project_column.as_deref()
    }

    /// Unconstrained state over the configured dimensions.
    pub fn filter_state(&self) -> FilterState {
        self.config.filter_state()
    }

    /// Change one selection and drop downstream selections it made unreachable.
    pub fn select(
        &self,
        state: &mut FilterState,
        column: &str,
        constraint: Constraint,
    ) -> Vec<String> {
        let reset = state.select_in(&self.table, column, constraint);
        if !reset.is_empty() {
            debug!(column, ?reset, "reset unreachable downstream selections");
        }
        reset
    }

    pub fn evaluate(&self, state: &FilterState) -> Evaluation {
        let evaluation = filter::evaluate(&self.table, state);
        debug!(
            matched = evaluation.len(),
            total = self.table.len(),
            query = state.query(),
            "evaluated filters"
        );
        evaluation
    }

    pub fn options(&self, state: &FilterState) -> Vec<DimensionOptions> {
        filter::options(&self.table, state)
    }

    /// View of the first surviving row, `None` when nothing matched.
    pub fn view(&self, evaluation: &Evaluation) -> Option<ProjectView> {
        evaluation.first(&self.table).map(|record| {
            ProjectView::from_record(record, &self.config, &self.breaker, self.project_column())
        })
    }

    pub fn report(&self, state: &FilterState) -> Option<ProjectView> {
        self.view(&self.evaluate(state))
    }
}
