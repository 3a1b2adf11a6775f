// Query Insights is open-source under the Apache License 2.0; see LICENSE for usage and contributions.
// This binary loads configuration and telemetry, then filters, pages and summarises query rows.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use query_insights::config::AppConfig;
use query_insights::domain::query::COLUMNS;
use query_insights::filter::catalog::FilterCatalog;
use query_insights::filter::paginator::PageSize;
use query_insights::insights::heatmap::{HeatmapDimension, HeatmapGrid, HeatmapMetric, TIME_LABELS};
use query_insights::repository::in_memory::InMemoryQueryRepository;
use query_insights::repository::sample::SampleQueryRepository;
use query_insights::repository::QueryRepositoryHandle;
use query_insights::state::{QueryListSession, QueryListView};
use query_insights::telemetry;

#[derive(Parser)]
#[command(name = "query-insights")]
#[command(version, about = "Filter, page and summarise search-cluster query performance", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show one page of the filtered query list
    List(ListArgs),
    /// Average, p90 and p99 of latency, CPU and memory over the filtered rows
    Summary(SourceArgs),
    /// Performance heatmap for a dimension and metric
    Heatmap(HeatmapArgs),
}

#[derive(Args, Default)]
struct SourceArgs {
    /// JSON file holding an array of query rows; synthetic rows when omitted
    #[arg(long, short = 'i')]
    input: Option<PathBuf>,

    /// Filter such as `latency > 500` or `Node = node1`; repeat to combine
    #[arg(long = "filter", short = 'f')]
    filters: Vec<String>,

    /// Free-text search across every field
    #[arg(long, short = 's', default_value = "")]
    search: String,

    /// Seed for synthetic rows
    #[arg(long)]
    seed: Option<u64>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args, Default)]
struct ListArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// 1-based page number; clamped to the last page
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Rows per page: 10, 25 or 50
    #[arg(long)]
    page_size: Option<usize>,
}

#[derive(Args)]
struct HeatmapArgs {
    /// index, node, user, role, wlmGroup or shape
    #[arg(long, default_value = "index")]
    dimension: HeatmapDimension,

    /// count, latency, cpu or memory
    #[arg(long, default_value = "latency")]
    metric: HeatmapMetric,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let cli = Cli::parse();
    let cfg = AppConfig::from_env()?;

    tracing::info!(service = %cfg.service_name, version = %cfg.version, "starting query insights");

    let catalog = Arc::new(FilterCatalog::query_insights().context("built-in filter catalog")?);

    match cli.command.unwrap_or_else(|| Command::List(ListArgs::default())) {
        Command::List(args) => run_list(&cfg, catalog, args),
        Command::Summary(args) => run_summary(&cfg, catalog, args),
        Command::Heatmap(args) => run_heatmap(args),
    }
}

fn open_session(
    cfg: &AppConfig,
    catalog: Arc<FilterCatalog>,
    args: &SourceArgs,
    page_size: PageSize,
) -> Result<QueryListSession> {
    let source: QueryRepositoryHandle = match &args.input {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Arc::new(InMemoryQueryRepository::from_json(&text)?)
        }
        None => Arc::new(
            SampleQueryRepository::new(cfg.sample_rows).with_seed(args.seed.or(cfg.sample_seed)),
        ),
    };

    let mut session = QueryListSession::load(catalog, &source, page_size)?;
    for expression in &args.filters {
        session
            .apply_expression(expression)
            .with_context(|| format!("invalid filter `{expression}`"))?;
    }
    session.set_search_text(args.search.clone());
    Ok(session)
}

fn run_list(cfg: &AppConfig, catalog: Arc<FilterCatalog>, args: ListArgs) -> Result<()> {
    let page_size = match args.page_size {
        Some(size) => PageSize::try_from(size).context("invalid --page-size")?,
        None => cfg.default_page_size,
    };

    let mut session = open_session(cfg, catalog, &args.source, page_size)?;
    session.go_to_page(args.page.saturating_sub(1));
    let view = session.view();

    if args.source.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_view(&view);
    }
    Ok(())
}

fn run_summary(cfg: &AppConfig, catalog: Arc<FilterCatalog>, args: SourceArgs) -> Result<()> {
    let session = open_session(cfg, catalog, &args, cfg.default_page_size)?;
    let summaries = session.summaries();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("{}", session.view().match_label);
    for summary in summaries {
        println!(
            "{:<8} avg {:>9.2}{u}  p90 {:>9.2}{u}  p99 {:>9.2}{u}  ({} rows)",
            summary.field,
            summary.average,
            summary.p90,
            summary.p99,
            summary.count,
            u = summary.unit
        );
    }
    Ok(())
}

fn run_heatmap(args: HeatmapArgs) -> Result<()> {
    let grid = HeatmapGrid::build(args.dimension, args.metric);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&grid)?);
        return Ok(());
    }

    println!("{} by {} ({})", grid.metric, grid.dimension, grid.unit);
    let header: Vec<String> = TIME_LABELS.iter().map(|t| format!("{t:>6}")).collect();
    println!("{:<14}{}", "", header.join(""));
    for row in &grid.rows {
        let cells: Vec<String> = row
            .cells
            .iter()
            .map(|cell| format!("{:>6}", cell.value))
            .collect();
        println!("{:<14}{}", row.label, cells.join(""));
    }
    Ok(())
}

fn print_view(view: &QueryListView) {
    if !view.tokens.is_empty() {
        println!("Filters: {}", view.tokens.join(", "));
    }
    if !view.search_text.is_empty() {
        println!("Search: {}", view.search_text);
    }
    println!("{}", view.match_label);

    let table: Vec<Vec<String>> = view
        .rows
        .iter()
        .map(|row| {
            COLUMNS
                .iter()
                .map(|(key, _)| {
                    row.get(key)
                        .and_then(|value| value.display_text())
                        .unwrap_or_else(|| "-".to_string())
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = COLUMNS
        .iter()
        .enumerate()
        .map(|(idx, (_, label))| {
            table
                .iter()
                .map(|cells| cells[idx].len())
                .chain(std::iter::once(label.len()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let render = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(widths.iter().copied())
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("{}", render(COLUMNS.iter().map(|(_, label)| *label).collect()));
    for cells in &table {
        println!("{}", render(cells.iter().map(String::as_str).collect()));
    }
    println!("{}", view.page);
}
