//! Field resolution over inconsistent spreadsheet headers
//!
//! Source workbooks drift: the same logical column shows up as `"Scope"`,
//! `"Scope "` or `"ScopeDetails"` depending on who last edited the file.
//! Instead of probing whatever happens to exist, every displayed attribute is
//! a [`Field`] with an ordered alias list, and [`resolve`] picks the first
//! alias that is present and not missing.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::{Record, Value};

static MISSING: Value = Value::Missing;

/// Return the value of the first alias that is present in `record` and not
/// missing, or `Value::Missing` when none qualifies.
///
/// An absent column is not an error; it simply does not match.
pub fn resolve<'a, S: AsRef<str>>(record: &'a Record, aliases: &[S]) -> &'a Value {
    resolve_entry(record, aliases).map_or(&MISSING, |(_, value)| value)
}

/// Like [`resolve`], but also reports which alias matched.
pub fn resolve_entry<'a, 'b, S: AsRef<str>>(
    record: &'a Record,
    aliases: &'b [S],
) -> Option<(&'b str, &'a Value)> {
    aliases.iter().find_map(|alias| {
        let alias = alias.as_ref();
        record
            .get(alias)
            .filter(|value| !value.is_missing())
            .map(|value| (alias, value))
    })
}

/// Find the column that identifies a project.
///
/// Prefers a column whose trimmed, lowercased name equals `keyword`, then the
/// first column whose lowercased name merely contains it.
pub fn detect_column<'a>(columns: &'a [String], keyword: &str) -> Option<&'a str> {
    let keyword = keyword.trim().to_lowercase();
    columns
        .iter()
        .find(|c| c.trim().to_lowercase() == keyword)
        .or_else(|| columns.iter().find(|c| c.to_lowercase().contains(&keyword)))
        .map(String::as_str)
}

// ============================================================================
// Field catalog
// ============================================================================

/// Logical attributes shown on the dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ProjectName,
    ProjectDates,
    Duration,
    TotalPo,
    BilledTillDate,
    OpenBilling,
    BilledPercent,
    ProfitYtd,
    ProfitFy,
    Resources,
    MilestoneAmount,
    BillingMilestone,
    Scope,
    OverallProgress,
    Technology,
    WeeklyPlan,
    Challenges,
    UpdatedOn,
}

impl Field {
    pub const ALL: [Field; 18] = [
        Field::ProjectName,
        Field::ProjectDates,
        Field::Duration,
        Field::TotalPo,
        Field::BilledTillDate,
        Field::OpenBilling,
        Field::BilledPercent,
        Field::ProfitYtd,
        Field::ProfitFy,
        Field::Resources,
        Field::MilestoneAmount,
        Field::BillingMilestone,
        Field::Scope,
        Field::OverallProgress,
        Field::Technology,
        Field::WeeklyPlan,
        Field::Challenges,
        Field::UpdatedOn,
    ];

    /// Header variants seen in the wild, most common first.
    pub fn default_aliases(self) -> &'static [&'static str] {
        match self {
            Field::ProjectName => &["Project", "Project1"],
            Field::ProjectDates => &[
                "Project Dates",
                "Project Dates ",
                "ProjectDate",
                "Project_Date",
            ],
            Field::Duration => &[
                "Project Duration",
                "ProjectDuration",
                "Duration",
                "Project Duration ",
            ],
            Field::TotalPo => &["Total PO Amt", "Total PO Amt ", "Total_PO_Amt", " Total PO Amt "],
            Field::BilledTillDate => &["Billed Till Date", "Billed Till Date "],
            Field::OpenBilling => &["Open Billing", "Open Billing "],
            Field::BilledPercent => &["Billed", "Billed ", "Billed %", "Billed%"],
            Field::ProfitYtd => &["Profit_YTD MIS", "Profit_YTD_MIS"],
            Field::ProfitFy => &["Profit_FY24-25_MIS", "Profit_FY24-25 MIS"],
            Field::Resources => &["Resource", "Resource Deployed", "Resources", "Resource "],
            Field::MilestoneAmount => &[
                "Milestone billing amount",
                "Milestone billing amount ",
                "MilestoneBillingAmount",
            ],
            Field::BillingMilestone => &["Billing Milestone", "Billing Milestone "],
            Field::Scope => &["Scope", "Scope ", "ScopeDetails"],
            Field::OverallProgress => &["Overall Progress", "OverallProgress", "Overall Progress "],
            Field::Technology => &[
                "Technology / tools",
                "Technology / tools ",
                "Technology",
                "Technology / Tools",
            ],
            Field::WeeklyPlan => &["Weekly Plan", "WeeklyPlan", "Weekly Plan "],
            Field::Challenges => &["Challenges / Risks"],
            Field::UpdatedOn => &["Update Date", "Updated On", "Update", "UpdateDate"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Field::ProjectName => "project_name",
            Field::ProjectDates => "project_dates",
            Field::Duration => "duration",
            Field::TotalPo => "total_po",
            Field::BilledTillDate => "billed_till_date",
            Field::OpenBilling => "open_billing",
            Field::BilledPercent => "billed_percent",
            Field::ProfitYtd => "profit_ytd",
            Field::ProfitFy => "profit_fy",
            Field::Resources => "resources",
            Field::MilestoneAmount => "milestone_amount",
            Field::BillingMilestone => "billing_milestone",
            Field::Scope => "scope",
            Field::OverallProgress => "overall_progress",
            Field::Technology => "technology",
            Field::WeeklyPlan => "weekly_plan",
            Field::Challenges => "challenges",
            Field::UpdatedOn => "updated_on",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alias lists per field, with optional overrides from configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct AliasCatalog {
    overrides: BTreeMap<Field, Vec<String>>,
}

impl AliasCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the alias list of one field.
    pub fn with_aliases<I, S>(mut self, field: Field, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.overrides
            .insert(field, aliases.into_iter().map(Into::into).collect());
        self
    }

    /// The effective alias list for `field`.
    pub fn aliases(&self, field: Field) -> Vec<&str> {
        match self.overrides.get(&field) {
            Some(list) => list.iter().map(String::as_str).collect(),
            None => field.default_aliases().to_vec(),
        }
    }

    /// Resolve `field` against `record`.
    pub fn lookup<'a>(&self, record: &'a Record, field: Field) -> &'a Value {
        resolve(record, &self.aliases(field))
    }
}
