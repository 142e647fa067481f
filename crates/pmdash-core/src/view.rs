//! The assembled per-project view
//!
//! [`ProjectView`] is everything the dashboard shows for one record, already
//! resolved and formatted. Renderers only lay it out.

use serde::Serialize;

use crate::config::DashboardConfig;
use crate::format::{
    colorize_percent, format_count, format_date, format_integer, format_plain, format_text,
    parse_percent, LineBreaker, StyledPercent,
};
use crate::resolve::Field;
use crate::{Record, RenderError};

/// Output rendering
pub trait Renderer {
    type Output;

    /// Render a project view to the output format
    fn render(&self, view: &ProjectView) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// View types
// ============================================================================

/// Headline billing figures.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Metrics {
    /// Purchase-order amount, integer string
    pub total_po: String,
    pub billed_till_date: String,
    pub open_billing: String,
    /// Billed share in `[-100, 100]`, if the cell parsed
    pub billed_percent: Option<i32>,
}

impl Metrics {
    /// `"67%"`, or `"N/A"` when the billed share is unknown.
    pub fn billed_label(&self) -> String {
        self.billed_percent
            .map_or_else(|| "N/A".to_string(), |p| format!("{}%", p))
    }

    /// Progress-bar fill in `[0.0, 1.0]`.
    pub fn billed_progress(&self) -> Option<f64> {
        self.billed_percent
            .map(|p| (f64::from(p) / 100.0).clamp(0.0, 1.0))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemKind {
    ProfitYtd,
    ProfitFy,
    Resources,
    MilestoneAmount,
}

impl LineItemKind {
    pub fn label(self) -> &'static str {
        match self {
            LineItemKind::ProfitYtd => "Profit YTD MIS (%)",
            LineItemKind::ProfitFy => "Profit FY24-25 MIS (%)",
            LineItemKind::Resources => "Resources Deployed",
            LineItemKind::MilestoneAmount => "Milestone Billing Amount",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum LineValue {
    /// Signed percent, colored by renderers
    Percent(StyledPercent),
    Text(String),
    /// Money amount shown as entered, without the currency symbol
    Amount(String),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineItem {
    pub kind: LineItemKind,
    pub value: LineValue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    BillingMilestone,
    Scope,
    OverallProgress,
    Technology,
    WeeklyPlan,
    Challenges,
}

impl SectionKind {
    pub fn label(self) -> &'static str {
        match self {
            SectionKind::BillingMilestone => "Billing Milestone",
            SectionKind::Scope => "Scope",
            SectionKind::OverallProgress => "Overall Progress",
            SectionKind::Technology => "Technology / Tools",
            SectionKind::WeeklyPlan => "Weekly Plan",
            SectionKind::Challenges => "Challenges & Risks",
        }
    }
}

/// A free-text block; `body` already contains line-break tokens.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub body: String,
}

/// Everything shown for one project.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProjectView {
    pub name: String,
    pub dates: String,
    pub duration: String,
    pub currency: String,
    pub metrics: Metrics,
    pub line_items: Vec<LineItem>,
    pub sections: Vec<Section>,
    /// `DD-Mon-YYYY`, or the raw cell when it is not a date
    pub updated_on: String,
    /// Break token used inside section bodies
    pub line_break: String,
}

impl ProjectView {
    /// Resolve and format every displayed field of `record`.
    ///
    /// `project_column` is the detected project-name column; it takes
    /// precedence over the configured aliases.
    pub fn from_record(
        record: &Record,
        config: &DashboardConfig,
        breaker: &LineBreaker,
        project_column: Option<&str>,
    ) -> Self {
        let catalog = &config.aliases;
        let field = |f: Field| catalog.lookup(record, f);

        let mut name_aliases: Vec<&str> = project_column.into_iter().collect();
        name_aliases.extend(catalog.aliases(Field::ProjectName));
        let name = format_plain(crate::resolve::resolve(record, &name_aliases));

        let metrics = Metrics {
            total_po: format_integer(field(Field::TotalPo)),
            billed_till_date: format_integer(field(Field::BilledTillDate)),
            open_billing: format_integer(field(Field::OpenBilling)),
            billed_percent: parse_percent(field(Field::BilledPercent)),
        };

        let mut line_items = Vec::new();
        for (kind, f) in [
            (LineItemKind::ProfitYtd, Field::ProfitYtd),
            (LineItemKind::ProfitFy, Field::ProfitFy),
        ] {
            if let Some(pct) = colorize_percent(parse_percent(field(f))).filter(|p| p.value != 0) {
                line_items.push(LineItem {
                    kind,
                    value: LineValue::Percent(pct),
                });
            }
        }
        line_items.push(LineItem {
            kind: LineItemKind::Resources,
            value: LineValue::Text(format_count(field(Field::Resources))),
        });
        let milestone_amount = format_text(field(Field::MilestoneAmount));
        if !milestone_amount.is_empty() {
            line_items.push(LineItem {
                kind: LineItemKind::MilestoneAmount,
                value: LineValue::Amount(milestone_amount),
            });
        }

        let mut sections = Vec::new();
        for (kind, f, always) in [
            (SectionKind::BillingMilestone, Field::BillingMilestone, false),
            (SectionKind::Scope, Field::Scope, true),
            (SectionKind::OverallProgress, Field::OverallProgress, true),
            (SectionKind::Technology, Field::Technology, true),
            (SectionKind::WeeklyPlan, Field::WeeklyPlan, true),
            (SectionKind::Challenges, Field::Challenges, false),
        ] {
            let value = field(f);
            if always || value.is_truthy() {
                sections.push(Section {
                    kind,
                    body: breaker.break_into_lines(value),
                });
            }
        }

        Self {
            name,
            dates: format_plain(field(Field::ProjectDates)),
            duration: format_plain(field(Field::Duration)),
            currency: config.currency.clone(),
            metrics,
            line_items,
            sections,
            updated_on: format_date(field(Field::UpdatedOn)),
            line_break: breaker.token().to_string(),
        }
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn line_item(&self, kind: LineItemKind) -> Option<&LineItem> {
        self.line_items.iter().find(|l| l.kind == kind)
    }
}
