use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use cte_cli::export::export_table;
use cte_cli::settings::{Settings, settings_path};
use cte_client::{HttpTrialsClient, SearchQuery, SuccessRateQuery};
use cte_dashboard::{Dashboard, Notifier, PrecedentFilter, PrecedentLibrary, ResultRow, View};
use cte_model::{Study, StudyResponse};
use cte_outcomes::{Heuristics, visualize_study};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::cli::{
    Cli, Command, ConfigArgs, ExportArgs, OutcomesArgs, OutputFormatArg, PrecedentArgs,
    SearchArgs, StudyArgs, SuccessRateArgs,
};
use crate::render::{
    print_detail, print_json, print_log, print_precedents, print_results, print_statistics,
    print_success_rate, print_visualizations,
};

type Explorer = Dashboard<HttpTrialsClient, StderrNotifier>;

/// Alerts go straight to stderr.
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

pub fn run(cli: &Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref());
    let format = cli.format;
    match &cli.command {
        Command::Search(args) => with_dashboard(cli, &settings, PrecedentLibrary::default(), |d| {
            search(d, args, format)
        }),
        Command::Study(args) => with_dashboard(cli, &settings, PrecedentLibrary::default(), |d| {
            study(d, args, format)
        }),
        Command::Stats => with_dashboard(cli, &settings, PrecedentLibrary::default(), |d| {
            stats(d, format)
        }),
        Command::SuccessRates(args) => {
            with_dashboard(cli, &settings, PrecedentLibrary::default(), |d| {
                success_rates(d, args, format)
            })
        }
        Command::Precedents(args) => {
            let library = match &args.dataset {
                Some(path) => {
                    let json = fs::read_to_string(path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    PrecedentLibrary::from_json(&json)
                        .with_context(|| format!("invalid precedent dataset {}", path.display()))?
                }
                None => PrecedentLibrary::embedded()?,
            };
            with_dashboard(cli, &settings, library, |d| precedents(d, args, format))
        }
        Command::Outcomes(args) => outcomes(args, &settings.heuristics()?, format),
        Command::ExportWarningLetters(args) => export(args),
        Command::Config(args) => config(cli, &settings, args),
    }
}

/// Builds the dashboard, runs `command` and prints the activity log on request.
fn with_dashboard<F>(
    cli: &Cli,
    settings: &Settings,
    precedents: PrecedentLibrary,
    command: F,
) -> Result<()>
where
    F: FnOnce(&mut Explorer) -> Result<()>,
{
    let base_url = cli
        .api_url
        .clone()
        .unwrap_or_else(|| settings.api.base_url.clone());
    let client = HttpTrialsClient::new(base_url, settings.timeout())?;
    let mut dashboard = Dashboard::new(client, StderrNotifier, settings.heuristics()?)
        .with_page_size(settings.page_size())
        .with_precedents(precedents);
    info!(base_url = dashboard.api().base_url(), "Dashboard ready");

    let result = command(&mut dashboard);
    if cli.show_log {
        print_log(&dashboard.state().log);
    }
    result
}

fn search(dashboard: &mut Explorer, args: &SearchArgs, format: OutputFormatArg) -> Result<()> {
    let mut query = SearchQuery::new(args.search_type, args.term.as_str());
    query.phase = args.phase.clone();
    query.status = args.status.clone();
    query.sort = args.sort.clone();
    query.has_results = args.has_results;
    query.advanced = args.advanced.clone();
    query.fields = args.fields.clone();
    query.page_size = args
        .page_size
        .unwrap_or(dashboard.state().query.page_size)
        .max(1);

    if args.all {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
        spinner.enable_steady_tick(Duration::from_millis(100));
        let fetched = dashboard.search_all(query, |progress| {
            let total = progress
                .total
                .map_or_else(String::new, |total| format!(" of {total}"));
            spinner.set_message(format!(
                "page {}: {} studies{total}",
                progress.pages, progress.studies
            ));
        });
        spinner.finish_and_clear();
        fetched?;
    } else {
        dashboard.search(query)?;
        while dashboard.state().view == View::Search
            && dashboard.state().cursor.current_page < args.page
        {
            if !dashboard.next_page()? {
                break;
            }
        }
    }

    let state = dashboard.state();
    if state.view == View::StudyDetail
        && let Some(detail) = &state.detail
    {
        return match format {
            OutputFormatArg::Json => print_json(detail),
            OutputFormatArg::Table => {
                print_detail(detail, dashboard.heuristics());
                Ok(())
            }
        };
    }
    let Some(results) = &state.results else {
        return Ok(());
    };
    if let Some(path) = &args.csv {
        write_csv(path, &results.rows)?;
        info!("Wrote {} rows to {}", results.rows.len(), path.display());
    }
    match format {
        OutputFormatArg::Json => print_json(results),
        OutputFormatArg::Table => {
            print_results(results, dashboard.heuristics());
            Ok(())
        }
    }
}

fn study(dashboard: &mut Explorer, args: &StudyArgs, format: OutputFormatArg) -> Result<()> {
    dashboard.view_study(&args.nct_id)?;
    let Some(detail) = &dashboard.state().detail else {
        return Ok(());
    };
    match format {
        OutputFormatArg::Json => print_json(detail),
        OutputFormatArg::Table => {
            print_detail(detail, dashboard.heuristics());
            Ok(())
        }
    }
}

fn stats(dashboard: &mut Explorer, format: OutputFormatArg) -> Result<()> {
    dashboard.load_statistics()?;
    let Some(view) = &dashboard.state().statistics else {
        return Ok(());
    };
    match format {
        OutputFormatArg::Json => print_json(view),
        OutputFormatArg::Table => {
            print_statistics(view);
            Ok(())
        }
    }
}

fn success_rates(
    dashboard: &mut Explorer,
    args: &SuccessRateArgs,
    format: OutputFormatArg,
) -> Result<()> {
    dashboard.success_rates(SuccessRateQuery {
        condition: args.condition.clone(),
        intervention: args.intervention.clone(),
        phase: args.phase.clone(),
    })?;
    let Some(view) = &dashboard.state().success_rate else {
        return Ok(());
    };
    match format {
        OutputFormatArg::Json => print_json(view),
        OutputFormatArg::Table => {
            print_success_rate(view);
            Ok(())
        }
    }
}

fn precedents(dashboard: &mut Explorer, args: &PrecedentArgs, format: OutputFormatArg) -> Result<()> {
    dashboard.open(View::Precedents);
    let filter = PrecedentFilter {
        division: args.division.clone(),
        biomarker: args.biomarker.clone(),
        drug: args.drug.clone(),
        fda_section: args.fda_section.clone(),
        strength: args.strength,
    };
    let cases = dashboard.precedents(&filter);
    info!("{} precedent cases match", cases.len());
    match format {
        OutputFormatArg::Json => print_json(&cases),
        OutputFormatArg::Table => {
            print_precedents(&cases);
            Ok(())
        }
    }
}

fn outcomes(args: &OutcomesArgs, heuristics: &Heuristics, format: OutputFormatArg) -> Result<()> {
    let json = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let study = parse_study(&json)
        .with_context(|| format!("invalid study file {}", args.file.display()))?;
    let visualizations = visualize_study(&study, heuristics);
    info!(
        nct_id = study.nct_id().unwrap_or_default(),
        outcomes = visualizations.len(),
        "Rendered outcome visualizations"
    );
    match format {
        OutputFormatArg::Json => print_json(&visualizations),
        OutputFormatArg::Table => {
            print_visualizations(&visualizations);
            Ok(())
        }
    }
}

/// A bare study record, or one wrapped in a `{success, data}` envelope.
fn parse_study(json: &str) -> Result<Study> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.get("success").is_none() {
        return Ok(serde_json::from_value(value)?);
    }
    let envelope: StudyResponse = serde_json::from_value(value)?;
    if !envelope.success {
        bail!(envelope.failure_message());
    }
    envelope
        .data
        .context("study envelope contained no data")
}

fn export(args: &ExportArgs) -> Result<()> {
    let count = export_table(&args.db, &args.table, &args.out)?;
    println!(
        "Exported {count} rows from {} to {}",
        args.table,
        args.out.display()
    );
    Ok(())
}

fn config(cli: &Cli, settings: &Settings, args: &ConfigArgs) -> Result<()> {
    let path = cli.config.clone().or_else(settings_path);
    match &path {
        Some(path) => println!("# {}", path.display()),
        None => println!("# no settings path available on this platform"),
    }
    println!("{}", toml::to_string_pretty(settings)?);
    if args.init {
        let Some(path) = path else {
            bail!("no settings path available; pass --config <PATH>");
        };
        settings.save_to(&path)?;
        println!("Wrote settings to {}", path.display());
    }
    Ok(())
}

fn write_csv(path: &Path, rows: &[ResultRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(ResultRow::HEADERS)?;
    for row in rows {
        writer.write_record(row.cells())?;
    }
    writer.flush()?;
    Ok(())
}
