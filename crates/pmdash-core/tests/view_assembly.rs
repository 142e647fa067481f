//! Report assembly from messy spreadsheet-style rows

use pmdash_core::filter::Constraint;
use pmdash_core::resolve::{AliasCatalog, Field};
use pmdash_core::view::{LineItemKind, LineValue, SectionKind};
use pmdash_core::{Dashboard, DashboardConfig, Record, Table, Value};
use pretty_assertions::assert_eq;

fn export() -> Table {
    Table::from_records(vec![
        // Header spellings as they come out of hand-edited workbooks
        Record::new()
            .with("Region", "West")
            .with("Project1", "Atlas")
            .with("Type", "Fixed Price")
            .with("Project Duration ", "9 months")
            .with(" Total PO Amt ", 99.5)
            .with("Billed Till Date ", 40.5)
            .with("Open Billing ", "59")
            .with("Billed%", "0.41")
            .with("Profit_FY24-25 MIS", "-3")
            .with("Resources", "6 FTE")
            .with("MilestoneBillingAmount", Value::Missing)
            .with("ScopeDetails", "Build / Run")
            .with("Challenges / Risks", "Attrition? Budget!")
            .with("UpdateDate", "03/15/2024"),
        Record::new()
            .with("Region", "East")
            .with("Project1", "Borealis")
            .with("Type", "Support")
            .with("Billed%", "abc"),
    ])
}

#[test]
fn alias_spellings_resolve() {
    let dash = Dashboard::new(export(), DashboardConfig::default()).unwrap();
    // "Project1" contains the keyword
    assert_eq!(dash.project_column(), Some("Project1"));

    let view = dash.report(&dash.filter_state()).unwrap();
    assert_eq!(view.name, "Atlas");
    assert_eq!(view.duration, "9 months");
    assert_eq!(view.metrics.total_po, "100");
    assert_eq!(view.metrics.billed_till_date, "40");
    assert_eq!(view.metrics.open_billing, "59");
    assert_eq!(view.metrics.billed_percent, Some(41));
    assert_eq!(view.updated_on, "15-Mar-2024");
}

#[test]
fn line_items_and_sections() {
    let dash = Dashboard::new(export(), DashboardConfig::default()).unwrap();
    let view = dash.report(&dash.filter_state()).unwrap();

    let kinds: Vec<_> = view.line_items.iter().map(|l| l.kind).collect();
    assert_eq!(kinds, vec![LineItemKind::ProfitFy, LineItemKind::Resources]);
    assert_eq!(
        view.line_item(LineItemKind::Resources).unwrap().value,
        LineValue::Text("6 FTE".into())
    );

    assert!(view.section(SectionKind::BillingMilestone).is_none());
    assert_eq!(view.section(SectionKind::Scope).unwrap().body, "Build /<br>Run");
    assert_eq!(
        view.section(SectionKind::Challenges).unwrap().body,
        "Attrition?<br>Budget!"
    );
}

#[test]
fn unparseable_percent_is_not_applicable() {
    let dash = Dashboard::new(export(), DashboardConfig::default()).unwrap();
    let mut state = dash.filter_state();
    dash.select(&mut state, "Region", Constraint::is("East"));

    let view = dash.report(&state).unwrap();
    assert_eq!(view.name, "Borealis");
    assert_eq!(view.metrics.billed_percent, None);
    assert_eq!(view.metrics.billed_label(), "N/A");
    assert_eq!(view.sections.len(), 4);
}

#[test]
fn configured_aliases_replace_defaults() {
    let config = DashboardConfig {
        aliases: AliasCatalog::new().with_aliases(Field::TotalPo, ["Open Billing "]),
        ..DashboardConfig::default()
    };
    let dash = Dashboard::new(export(), config).unwrap();
    let view = dash.report(&dash.filter_state()).unwrap();
    assert_eq!(view.metrics.total_po, "59");
}
