//! Markdown report renderer
//!
//! Produces GitHub-flavored Markdown with a little inline HTML: section
//! bodies keep their `<br>` breaks and signed percents are wrapped in a
//! colored `<span>`.
//!
//! ## Example Output
//!
//! ```text
//! ### 📌 Project : **CRM Migration**
//! **📅 Project Dates**: Jan-2024 to Dec-2024 &nbsp;&nbsp;&nbsp; **📆 Duration**: 12 months
//!
//! ---
//!
//! | 💰 PO Amt (in Lakhs) | 📤 Billing Done (in Lakhs) | 🧾 Open Billing (in Lakhs) | 📊 Billed % |
//! |---|---|---|---|
//! | ₹ 120 | ₹ 80 | ₹ 40 | 67% |
//!
//! **💹 Profit YTD MIS (%)**: <span style='color:red; font-weight:bold'>-12%</span>
//! ```

use pmdash_core::format::{PercentSign, StyledPercent};
use pmdash_core::view::{LineItemKind, LineValue, ProjectView, SectionKind};
use pmdash_core::{RenderError, Renderer};

use crate::money;

/// CSS colors used for signed percents
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PercentColors {
    pub positive: String,
    pub negative: String,
    pub neutral: String,
}

impl Default for PercentColors {
    fn default() -> Self {
        Self {
            positive: "green".into(),
            negative: "red".into(),
            neutral: "black".into(),
        }
    }
}

impl PercentColors {
    pub fn color(&self, sign: PercentSign) -> &str {
        match sign {
            PercentSign::Positive => &self.positive,
            PercentSign::Negative => &self.negative,
            PercentSign::Neutral => &self.neutral,
        }
    }
}

/// Markdown renderer with inline HTML
#[derive(Clone, Debug)]
pub struct MarkdownRenderer {
    /// Prefix headings and labels with emoji
    pub emoji: bool,
    /// Colors for signed percents
    pub colors: PercentColors,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self {
            emoji: true,
            colors: PercentColors::default(),
        }
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain labels without emoji
    pub fn no_emoji(mut self) -> Self {
        self.emoji = false;
        self
    }

    /// Set custom percent colors
    pub fn colors(mut self, colors: PercentColors) -> Self {
        self.colors = colors;
        self
    }

    fn label(&self, icon: &str, text: &str) -> String {
        if self.emoji {
            format!("{} {}", icon, text)
        } else {
            text.to_string()
        }
    }

    /// `<span style='color:red; font-weight:bold'>-12%</span>`
    pub fn percent_span(&self, pct: &StyledPercent) -> String {
        format!(
            "<span style='color:{}; font-weight:bold'>{}</span>",
            self.colors.color(pct.sign),
            pct
        )
    }

    fn line_item_icon(kind: LineItemKind) -> &'static str {
        match kind {
            LineItemKind::ProfitYtd => "💹",
            LineItemKind::ProfitFy => "📈",
            LineItemKind::Resources => "👥",
            LineItemKind::MilestoneAmount => "💵",
        }
    }

    fn section_heading(&self, kind: SectionKind) -> String {
        let (level, icon) = match kind {
            // Sits under the metric tiles, one level smaller than the rest
            SectionKind::BillingMilestone => ("######", "📅"),
            SectionKind::Scope => ("###", "🔧"),
            SectionKind::OverallProgress => ("###", "📈"),
            SectionKind::Technology => ("###", "🛠️"),
            SectionKind::WeeklyPlan => ("###", "📅"),
            SectionKind::Challenges => ("###", "⚠️"),
        };
        format!("{} {}", level, self.label(icon, kind.label()))
    }

    fn metrics_table(&self, view: &ProjectView) -> String {
        let headers = [
            self.label("💰", "PO Amt (in Lakhs)"),
            self.label("📤", "Billing Done (in Lakhs)"),
            self.label("🧾", "Open Billing (in Lakhs)"),
            self.label("📊", "Billed %"),
        ];
        let metrics = &view.metrics;
        let cells = [
            money(&view.currency, &metrics.total_po),
            money(&view.currency, &metrics.billed_till_date),
            money(&view.currency, &metrics.open_billing),
            metrics.billed_label(),
        ];

        let mut out = String::new();
        out.push_str(&format!("| {} |\n", headers.join(" | ")));
        out.push_str(&format!("|{}\n", "---|".repeat(headers.len())));
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
        out
    }
}

impl Renderer for MarkdownRenderer {
    type Output = String;

    fn render(&self, view: &ProjectView) -> Result<String, RenderError> {
        let mut out = String::new();

        // Header
        out.push_str(&format!(
            "### {} : **{}**\n",
            self.label("📌", "Project"),
            view.name
        ));
        out.push_str(&format!(
            "**{}**: {} &nbsp;&nbsp;&nbsp; **{}**: {}\n\n",
            self.label("📅", "Project Dates"),
            view.dates,
            self.label("📆", "Duration"),
            view.duration
        ));
        out.push_str("---\n\n");

        out.push_str(&self.metrics_table(view));
        out.push('\n');

        for item in &view.line_items {
            let value = match &item.value {
                LineValue::Percent(pct) => self.percent_span(pct),
                LineValue::Text(text) => text.clone(),
                LineValue::Amount(amount) => money(&view.currency, amount),
            };
            out.push_str(&format!(
                "**{}**: {}\n\n",
                self.label(Self::line_item_icon(item.kind), item.kind.label()),
                value
            ));
        }

        for section in &view.sections {
            out.push_str(&self.section_heading(section.kind));
            out.push_str("\n\n");
            if !section.body.is_empty() {
                out.push_str(&section.body);
                out.push_str("\n\n");
            }
        }

        out.push_str("---\n\n");
        out.push_str(&format!("Updated on: {}\n", view.updated_on));
        Ok(out)
    }
}
