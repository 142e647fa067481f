//! Renderer output for reports assembled through the dashboard

use pmdash_core::filter::Constraint;
use pmdash_core::{Dashboard, DashboardConfig, ProjectView, Record, Renderer, Table, Value};
use pmdash_render::{JsonRenderer, MarkdownRenderer, TextRenderer};

fn dashboard(config: DashboardConfig) -> Dashboard {
    let table = Table::from_records(vec![
        Record::new()
            .with("Region", "West")
            .with("Project", "CRM Migration")
            .with("Type", "Fixed Price")
            .with("Project Dates", "Jan-2024 to Dec-2024")
            .with("Duration", "12 months")
            .with("Total PO Amt", 120.4)
            .with("Billed Till Date", 80.5)
            .with("Open Billing", 40.0)
            .with("Billed %", 0.67)
            .with("Profit_YTD MIS", "-12%")
            .with("Profit_FY24-25_MIS", 0.18)
            .with("Resource", 6.0)
            .with("Milestone billing amount", "15 L")
            .with("Billing Milestone", "M1 done. M2 pending.")
            .with("Scope", "Data migration | Integrations")
            .with("Technology", "Salesforce")
            .with("Challenges / Risks", Value::Missing)
            .with("Update Date", 45000.0),
        Record::new()
            .with("Region", "East")
            .with("Project", "Payroll")
            .with("Type", "T&M")
            .with("Resource", "TBD")
            .with("Update Date", "next week"),
    ]);
    Dashboard::new(table, config).unwrap()
}

fn report(dash: &Dashboard, region: &str) -> ProjectView {
    let mut state = dash.filter_state();
    dash.select(&mut state, "Region", Constraint::is(region));
    dash.report(&state).unwrap()
}

// ============================================================================
// Markdown
// ============================================================================

#[test]
fn markdown_full_report() {
    let dash = dashboard(DashboardConfig::default());
    let md = MarkdownRenderer::new().render(&report(&dash, "West")).unwrap();

    assert!(md.contains("### 📌 Project : **CRM Migration**"));
    assert!(md.contains("| ₹ 120 | ₹ 80 | ₹ 40 | 67% |"));
    assert!(md.contains(
        "**💹 Profit YTD MIS (%)**: <span style='color:red; font-weight:bold'>-12%</span>"
    ));
    assert!(md.contains(
        "**📈 Profit FY24-25 MIS (%)**: <span style='color:green; font-weight:bold'>18%</span>"
    ));
    assert!(md.contains("**👥 Resources Deployed**: 6"));
    assert!(md.contains("**💵 Milestone Billing Amount**: ₹ 15 L"));
    assert!(md.contains("###### 📅 Billing Milestone\n\nM1 done.<br>M2 pending.\n"));
    assert!(!md.contains("Challenges & Risks"));
    assert!(md.ends_with("Updated on: 15-Mar-2023\n"));
}

#[test]
fn markdown_pipe_delimiters_from_config() {
    let config = DashboardConfig::from_toml_str("[text]\nline_break_delimiters = \"|\"").unwrap();
    let dash = dashboard(config);
    let md = MarkdownRenderer::new().render(&report(&dash, "West")).unwrap();
    assert!(md.contains("Data migration |<br>Integrations"));
    // Sentence punctuation no longer splits
    assert!(md.contains("M1 done. M2 pending."));
}

#[test]
fn markdown_sparse_row() {
    let dash = dashboard(DashboardConfig::default());
    let md = MarkdownRenderer::new().render(&report(&dash, "East")).unwrap();
    assert!(md.contains("| ₹ | ₹ | ₹ | N/A |"));
    assert!(md.contains("**👥 Resources Deployed**: TBD"));
    assert!(!md.contains("Profit"));
    assert!(!md.contains("Milestone Billing Amount"));
    assert!(md.ends_with("Updated on: next week\n"));
}

#[test]
fn markdown_currency_from_config() {
    let config = DashboardConfig::from_toml_str("currency = \"$\"").unwrap();
    let md = MarkdownRenderer::new()
        .no_emoji()
        .render(&report(&dashboard(config), "West"))
        .unwrap();
    assert!(md.contains("| $ 120 | $ 80 | $ 40 | 67% |"));
    assert!(md.contains("**Milestone Billing Amount**: $ 15 L"));
}

// ============================================================================
// Text and JSON
// ============================================================================

#[test]
fn text_report_sections_are_indented() {
    let dash = dashboard(DashboardConfig::default());
    let text = TextRenderer::new().render(&report(&dash, "West")).unwrap();
    assert!(text.contains("Billing Milestone\n  M1 done.\n  M2 pending.\n"));
    assert!(text.contains("Profit YTD MIS (%):"));
    assert!(text.contains("-12%"));
    assert!(text.ends_with("Updated on: 15-Mar-2023\n"));
}

#[test]
fn json_report_is_structured() {
    let dash = dashboard(DashboardConfig::default());
    let json = JsonRenderer.render(&report(&dash, "West")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["name"], "CRM Migration");
    assert_eq!(value["metrics"]["total_po"], "120");
    assert_eq!(value["line_items"][0]["kind"], "profit_ytd");
    assert_eq!(value["line_items"][0]["value"]["type"], "percent");
    assert_eq!(value["line_items"][0]["value"]["value"]["sign"], "negative");
    assert_eq!(value["updated_on"], "15-Mar-2023");
}
