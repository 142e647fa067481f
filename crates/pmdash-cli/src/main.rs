//! pmdash CLI - Project Status Reports
//!
//! Command-line interface for filtering a project-status table and rendering
//! the report of the first matching project.

mod exit;
mod load;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pmdash_core::filter::{Constraint, Evaluation, FilterState};
use pmdash_core::{Dashboard, DashboardConfig, Renderer};
use pmdash_render::{JsonRenderer, MarkdownRenderer, TextRenderer};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use exit::ExitCode;

const NO_MATCH_MESSAGE: &str = "No projects match your selection.";

#[derive(Parser)]
#[command(name = "pmdash")]
#[command(author, version, about = "Project status dashboard reports", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the report of the first project matching the filters
    Report {
        /// Input table (.csv or .json)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the filter values available under the current selection
    Options {
        /// Input table (.csv or .json)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OptionsFormat::Text)]
        format: OptionsFormat,
    },
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Region to select ("All" for any)
    #[arg(long)]
    region: Option<String>,

    /// Project to select ("All" for any)
    #[arg(long)]
    project: Option<String>,

    /// Project type to select ("All" for any)
    #[arg(long = "type", value_name = "TYPE")]
    kind: Option<String>,

    /// Select a value in any configured filter column
    #[arg(long = "select", value_name = "COLUMN=VALUE", value_parser = parse_selection)]
    selections: Vec<(String, String)>,

    /// Case-insensitive search over every cell of a row
    #[arg(short, long)]
    search: Option<String>,

    /// Dashboard configuration file (TOML)
    #[arg(short, long, env = "PMDASH_CONFIG")]
    config: Option<PathBuf>,
}

impl FilterArgs {
    fn selections(&self) -> Vec<(String, String)> {
        let named = [
            ("Region", &self.region),
            ("Project", &self.project),
            ("Type", &self.kind),
        ];
        named
            .into_iter()
            .filter_map(|(column, value)| value.as_ref().map(|v| (column.to_string(), v.clone())))
            .chain(self.selections.iter().cloned())
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Markdown,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OptionsFormat {
    Text,
    Json,
}

fn parse_selection(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected COLUMN=VALUE, got `{}`", arg)),
    }
}

fn main() -> Result<std::process::ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match cli.command {
        Commands::Report {
            file,
            filters,
            format,
            output,
        } => cmd_report(&file, &filters, format, output.as_deref())?,
        Commands::Options {
            file,
            filters,
            format,
        } => cmd_options(&file, &filters, format)?,
    };

    Ok(code.into())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_report(
    file: &Path,
    filters: &FilterArgs,
    format: ReportFormat,
    output: Option<&Path>,
) -> Result<ExitCode> {
    let dashboard = open_dashboard(file, filters)?;
    let state = filter_state(&dashboard, filters)?;
    let evaluation = dashboard.evaluate(&state);

    let Some(view) = dashboard.view(&evaluation) else {
        eprintln!("{}", NO_MATCH_MESSAGE);
        return Ok(ExitCode::from_match_count(evaluation.len()));
    };
    if evaluation.len() > 1 {
        info!(
            matched = evaluation.len(),
            project = %view.name,
            "several projects match, reporting the first"
        );
    }

    let rendered = match format {
        ReportFormat::Text => TextRenderer::new().render(&view),
        ReportFormat::Markdown => MarkdownRenderer::new().render(&view),
        ReportFormat::Json => JsonRenderer.render(&view),
    }
    .context("failed to render report")?;

    write_output(output, &rendered)?;
    Ok(ExitCode::Success)
}

fn cmd_options(file: &Path, filters: &FilterArgs, format: OptionsFormat) -> Result<ExitCode> {
    let dashboard = open_dashboard(file, filters)?;
    let state = filter_state(&dashboard, filters)?;
    let evaluation = dashboard.evaluate(&state);

    let rendered = match format {
        OptionsFormat::Text => options_text(&state, &evaluation, dashboard.table().len()),
        OptionsFormat::Json => options_json(&state, &evaluation, dashboard.table().len())?,
    };
    write_output(None, &rendered)?;
    Ok(ExitCode::Success)
}

// ============================================================================
// Helpers
// ============================================================================

fn open_dashboard(file: &Path, filters: &FilterArgs) -> Result<Dashboard> {
    let config = match &filters.config {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            DashboardConfig::load(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?
        }
        None => DashboardConfig::default(),
    };
    let table = load::load_table(file)?;
    if table.is_empty() {
        warn!(path = %file.display(), "input table has no rows");
    }
    Dashboard::new(table, config).context("invalid dashboard configuration")
}

/// Apply selections in dimension order so upstream choices narrow first.
fn filter_state(dashboard: &Dashboard, filters: &FilterArgs) -> Result<FilterState> {
    let mut state = dashboard.filter_state();
    let mut selections = filters.selections();

    for (column, _) in &selections {
        if state.constraint(column).is_none() {
            let configured: Vec<&str> =
                state.dimensions().iter().map(|d| d.column.as_str()).collect();
            bail!(
                "`{}` is not a filter column (configured: {})",
                column,
                configured.join(", ")
            );
        }
    }
    let order = |column: &str| state.dimensions().iter().position(|d| d.column == column);
    selections.sort_by_key(|(column, _)| order(column));

    for (column, value) in &selections {
        debug!(column = %column, value = %value, "selecting");
        dashboard.select(&mut state, column, Constraint::from_label(value));
    }
    if let Some(query) = &filters.search {
        state.set_query(query.clone());
    }
    Ok(state)
}

fn options_text(state: &FilterState, evaluation: &Evaluation, total: usize) -> String {
    let mut out = format!("{}\n\nMatches: {} of {}\n\n", state, evaluation.len(), total);
    for options in &evaluation.options {
        let labels: Vec<&str> = options.labels().collect();
        out.push_str(&format!("{}: {}\n", options.column, labels.join(", ")));
    }
    out
}

fn options_json(state: &FilterState, evaluation: &Evaluation, total: usize) -> Result<String> {
    let selections: Vec<serde_json::Value> = state
        .dimensions()
        .iter()
        .map(|d| {
            serde_json::json!({
                "column": d.column,
                "selected": d.constraint.to_string(),
            })
        })
        .collect();
    let options: Vec<serde_json::Value> = evaluation
        .options
        .iter()
        .map(|o| {
            serde_json::json!({
                "column": o.column,
                "values": o.labels().collect::<Vec<_>>(),
            })
        })
        .collect();
    let document = serde_json::json!({
        "filters": selections,
        "search": state.query(),
        "matches": evaluation.len(),
        "total": total,
        "options": options,
    });
    serde_json::to_string_pretty(&document).context("failed to serialize options")
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    let mut content = content.to_string();
    if !content.ends_with('\n') {
        content.push('\n');
    }
    match output {
        Some(path) => {
            std::fs::write(path, &content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "wrote report");
        }
        None => {
            std::io::stdout()
                .lock()
                .write_all(content.as_bytes())
                .context("failed to write to stdout")?;
        }
    }
    Ok(())
}
