//! # pmdash-render
//!
//! Rendering backends for pmdash project views.
//!
//! This crate provides:
//! - Markdown output with inline HTML (line breaks, colored percents)
//! - Plain text output for terminals
//! - JSON output for other tools
//!
//! ## Example
//!
//! ```rust,ignore
//! use pmdash_core::{Dashboard, Renderer};
//! use pmdash_render::{MarkdownRenderer, TextRenderer};
//!
//! let view = dashboard.report(&state).expect("at least one match");
//!
//! let markdown = MarkdownRenderer::new().render(&view)?;
//! let text = TextRenderer::new().bar_width(30).render(&view)?;
//! ```

pub mod markdown;

pub use markdown::{MarkdownRenderer, PercentColors};

use pmdash_core::view::{LineValue, ProjectView};
use pmdash_core::{RenderError, Renderer};

/// Split a section body on the view's break token.
pub(crate) fn body_lines<'a>(body: &'a str, token: &str) -> Vec<&'a str> {
    if body.is_empty() {
        Vec::new()
    } else if token.is_empty() {
        vec![body]
    } else {
        body.split(token).collect()
    }
}

/// Money display: `"₹ 120"`, or just the symbol when there is no amount.
pub(crate) fn money(currency: &str, amount: &str) -> String {
    if amount.is_empty() {
        currency.to_string()
    } else {
        format!("{} {}", currency, amount)
    }
}

/// Plain text renderer for console output
#[derive(Clone, Debug)]
pub struct TextRenderer {
    /// Width of the billed progress bar in characters
    pub bar_width: usize,
    /// Width of horizontal rules
    pub rule_width: usize,
    /// Indentation of section body lines
    pub indent: usize,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            bar_width: 20,
            rule_width: 60,
            indent: 2,
        }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure progress bar width
    pub fn bar_width(mut self, width: usize) -> Self {
        self.bar_width = width;
        self
    }

    /// Configure rule width
    pub fn rule_width(mut self, width: usize) -> Self {
        self.rule_width = width;
        self
    }

    fn progress_bar(&self, fraction: f64) -> String {
        let filled = ((fraction * self.bar_width as f64).round() as usize).min(self.bar_width);
        format!("[{}{}]", "#".repeat(filled), "-".repeat(self.bar_width - filled))
    }
}

impl Renderer for TextRenderer {
    type Output = String;

    fn render(&self, view: &ProjectView) -> Result<String, RenderError> {
        let rule = "─".repeat(self.rule_width);
        let pad = " ".repeat(self.indent);
        let mut out = String::new();

        out.push_str(&format!("Project: {}\n", view.name));
        out.push_str(&format!(
            "Dates: {}   Duration: {}\n",
            view.dates, view.duration
        ));
        out.push_str(&rule);
        out.push('\n');

        let metrics = &view.metrics;
        out.push_str(&format!(
            "{:<26}{}\n",
            "PO Amt (in Lakhs):",
            money(&view.currency, &metrics.total_po)
        ));
        out.push_str(&format!(
            "{:<26}{}\n",
            "Billing Done (in Lakhs):",
            money(&view.currency, &metrics.billed_till_date)
        ));
        out.push_str(&format!(
            "{:<26}{}\n",
            "Open Billing (in Lakhs):",
            money(&view.currency, &metrics.open_billing)
        ));
        match metrics.billed_progress() {
            Some(fraction) => out.push_str(&format!(
                "{:<26}{} {}\n",
                "Billed:",
                self.progress_bar(fraction),
                metrics.billed_label()
            )),
            None => out.push_str(&format!("{:<26}{}\n", "Billed:", metrics.billed_label())),
        }

        for item in &view.line_items {
            let value = match &item.value {
                LineValue::Percent(p) => p.to_string(),
                LineValue::Text(t) => t.clone(),
                LineValue::Amount(a) => money(&view.currency, a),
            };
            out.push_str(&format!("{:<26}{}\n", format!("{}:", item.kind.label()), value));
        }

        for section in &view.sections {
            out.push('\n');
            out.push_str(section.kind.label());
            out.push('\n');
            for line in body_lines(&section.body, &view.line_break) {
                out.push_str(&pad);
                out.push_str(line);
                out.push('\n');
            }
        }

        out.push_str(&rule);
        out.push('\n');
        out.push_str(&format!("Updated on: {}\n", view.updated_on));
        Ok(out)
    }
}

/// JSON renderer (pretty-printed `ProjectView`)
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    type Output = String;

    fn render(&self, view: &ProjectView) -> Result<String, RenderError> {
        serde_json::to_string_pretty(view).map_err(|e| RenderError::Format(e.to_string()))
    }
}
