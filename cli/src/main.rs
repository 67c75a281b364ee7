//! Scholargraph CLI: load, analyse and recommend over a publication graph
//!
//! Talks to Neo4j over its HTTP endpoint, or runs everything in-process with
//! `--backend memory`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use scholargraph::algorithms::{AlgorithmPlan, AlgorithmRunner};
use scholargraph::client::{Connection, GraphClient, MemoryClient, Neo4jHttpClient};
use scholargraph::community::Recommender;
use scholargraph::config::Config;
use scholargraph::loader::{LoadReport, Pipeline, Stage};
use scholargraph::schema::{NodeLabel, RelType};
use scholargraph::statement::Statement;
use scholargraph::{analytics, export};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "scholargraph", version, about = "Academic publication graph loader and analytics")]
struct Cli {
    /// Config file (defaults to ./scholargraph.yaml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Graph backend
    #[arg(long, default_value = "neo4j", global = true)]
    backend: Backend,

    /// Directory for the CSV result tables
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Backend {
    Neo4j,
    Memory,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum StageArg {
    Create,
    Enrich,
    All,
}

impl StageArg {
    fn stages(self) -> &'static [Stage] {
        match self {
            StageArg::Create => &[Stage::Create],
            StageArg::Enrich => &[Stage::Enrich],
            StageArg::All => &[Stage::Create, Stage::Enrich],
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Load the CSV files named in the config
    Load {
        #[arg(long, default_value = "all")]
        stage: StageArg,
    },
    /// Run the analytical queries and export their tables
    Analyze,
    /// Derive community tags, top papers and reviewer suggestions
    Recommend,
    /// Run the graph algorithms on the citation projections
    Algorithms {
        /// Rows kept per algorithm
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Node and relationship counts
    Counts,
    /// Load, analyze, recommend and run algorithms in one go
    Run,
    /// Show and validate the load plan without connecting
    CheckPlan,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.output_dir.clone() {
        config.output_dir = dir;
    }

    if let Commands::CheckPlan = cli.command {
        return check_plan(&config, &cli.format);
    }

    let connection = connect(&config, cli.backend).await?;
    let result = match cli.command {
        Commands::Load { stage } => load(&connection, &config, stage, &cli.format)
            .await
            .map(|_| ()),
        Commands::Analyze => analyze(&connection, &config, &cli.format).await,
        Commands::Recommend => recommend(&connection, &config, &cli.format).await,
        Commands::Algorithms { limit } => {
            algorithms(&connection, &config, limit, &cli.format).await
        }
        Commands::Counts => counts(&connection, &cli.format).await,
        Commands::Run => run_all(&connection, &config, &cli.format).await,
        Commands::CheckPlan => Ok(()),
    };

    let closed = connection.close().await;
    result?;
    closed?;
    Ok(())
}

async fn connect(config: &Config, backend: Backend) -> anyhow::Result<Connection> {
    let client: Arc<dyn GraphClient> = match backend {
        Backend::Neo4j => Arc::new(Neo4jHttpClient::new(config.connection()?)?),
        Backend::Memory => Arc::new(MemoryClient::new()),
    };
    Connection::open(client)
        .await
        .context("cannot connect to the graph store")
}

fn check_plan(config: &Config, format: &OutputFormat) -> anyhow::Result<()> {
    #[derive(Serialize)]
    struct PlanRow {
        order: usize,
        task: String,
        stage: String,
        phase: String,
        path: String,
        exists: bool,
    }

    let plan = config.load_plan()?;
    let rows: Vec<PlanRow> = plan
        .entries()
        .iter()
        .enumerate()
        .map(|(idx, entry)| PlanRow {
            order: idx + 1,
            task: entry.task.to_string(),
            stage: entry.task.stage().to_string(),
            phase: format!("{:?}", entry.task.phase()),
            path: entry.path.display().to_string(),
            exists: entry.path.exists(),
        })
        .collect();
    print_rows(
        "Load plan",
        &["order", "task", "stage", "phase", "path", "exists"],
        &rows,
        format,
    )?;

    plan.validate()?;
    println!("Plan is valid ({} tasks)", plan.len());
    Ok(())
}

async fn load(
    connection: &Connection,
    config: &Config,
    stage: StageArg,
    format: &OutputFormat,
) -> anyhow::Result<LoadReport> {
    let plan = config.load_plan()?;
    let report = Pipeline::new(connection, config.schema)
        .run_stages(&plan, stage.stages())
        .await?;

    print_rows(
        "Load report",
        &[
            "task",
            "rows_read",
            "applied",
            "skipped",
            "parse_errors",
            "unmatched",
            "failed",
            "error",
        ],
        &report.tasks,
        format,
    )?;
    for task in report.tasks.iter().filter(|t| !t.issues.is_empty()) {
        for issue in &task.issues {
            eprintln!("  {}: {}", task.task, issue);
        }
    }
    Ok(report)
}

async fn analyze(connection: &Connection, config: &Config, format: &OutputFormat) -> anyhow::Result<()> {
    let report = analytics::run_all(connection, &config.analytics).await?;
    export::write_analytics(&config.output_dir(), &report)?;

    print_rows(
        "Top cited papers per conference",
        &["conference", "rank", "paper_id", "title", "citations"],
        &report.top_papers,
        format,
    )?;
    print_rows(
        "Conference communities",
        &["conference", "authors"],
        &report.communities,
        format,
    )?;
    print_rows(
        "Journal impact factors",
        &["journal", "year", "papers", "citations", "impact_factor"],
        &report.impact_factors,
        format,
    )?;
    print_rows(
        "Author h-index",
        &["author_id", "author", "papers", "h_index"],
        &report.h_indexes,
        format,
    )
}

async fn recommend(connection: &Connection, config: &Config, format: &OutputFormat) -> anyhow::Result<()> {
    let report = Recommender::new(connection, config.community.clone()).run().await?;
    export::write_community(&config.output_dir(), &report)?;

    print_rows(
        "Community venues",
        &["label", "venue_id", "venue", "papers", "community_papers"],
        &report.tagged_venues,
        format,
    )?;
    print_rows(
        "Top cited community papers",
        &["rank", "paper_id", "title", "citations"],
        &report.top_papers,
        format,
    )?;
    print_rows("Gurus", &["author_id", "author", "top_papers"], &report.gurus, format)
}

async fn algorithms(
    connection: &Connection,
    config: &Config,
    limit: Option<usize>,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let limit = limit.unwrap_or(config.algorithms.limit);
    let scores = AlgorithmRunner::new(connection, limit)
        .run_plan(&AlgorithmPlan::default())
        .await?;
    export::write_algorithm_scores(&config.output_dir(), &scores)?;

    print_rows(
        "Algorithm scores",
        &["algorithm", "projection", "rank", "paper_id", "score"],
        &scores,
        format,
    )
}

async fn counts(connection: &Connection, format: &OutputFormat) -> anyhow::Result<()> {
    #[derive(Serialize)]
    struct CountRow {
        kind: &'static str,
        name: &'static str,
        count: u64,
    }

    let session = connection.session("counts");
    let mut rows = Vec::new();
    for label in NodeLabel::ALL {
        let result = session.run(&Statement::CountNodes { label }).await?;
        rows.push(CountRow {
            kind: "node",
            name: label.as_str(),
            count: result.scalar("count"),
        });
    }
    for rel in RelType::ALL {
        let result = session.run(&Statement::CountEdges { rel }).await?;
        rows.push(CountRow {
            kind: "relationship",
            name: rel.as_str(),
            count: result.scalar("count"),
        });
    }
    drop(session);

    print_rows("Graph counts", &["kind", "name", "count"], &rows, format)
}

async fn run_all(connection: &Connection, config: &Config, format: &OutputFormat) -> anyhow::Result<()> {
    let report = load(connection, config, StageArg::All, format).await?;
    if report.has_issues() {
        eprintln!(
            "Load finished with issues: {} unmatched, {} rejected, {} failed rows",
            report.total_unmatched(),
            report.total_parse_errors(),
            report.total_failed()
        );
    }
    analyze(connection, config, format).await?;
    recommend(connection, config, format).await?;
    algorithms(connection, config, None, format).await
}

/// Print serialisable rows, picking `columns` out of each row
fn print_rows<T: Serialize>(
    title: &str,
    columns: &[&str],
    rows: &[T],
    format: &OutputFormat,
) -> anyhow::Result<()> {
    print!("{}", render_rows(title, columns, rows, format)?);
    Ok(())
}

fn render_rows<T: Serialize>(
    title: &str,
    columns: &[&str],
    rows: &[T],
    format: &OutputFormat,
) -> anyhow::Result<String> {
    let values: Vec<serde_json::Value> = rows
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()?;
    let cells = |value: &serde_json::Value, render: fn(&serde_json::Value) -> String| -> Vec<String> {
        columns
            .iter()
            .map(|c| render(value.get(*c).unwrap_or(&serde_json::Value::Null)))
            .collect()
    };

    let rendered = match format {
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(&values)?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(columns)?;
            for value in &values {
                writer.write_record(cells(value, format_csv_value))?;
            }
            let bytes = writer
                .into_inner()
                .map_err(|e| anyhow::anyhow!("flushing CSV output: {}", e.error()))?;
            String::from_utf8(bytes)?
        }
        OutputFormat::Table => {
            if values.is_empty() {
                return Ok(format!("{}\n(no results)\n\n", title));
            }

            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(columns);
            for value in &values {
                table.add_row(cells(value, format_table_value));
            }
            format!("{}\n{}\n{} row(s)\n\n", title, table, values.len())
        }
    };

    Ok(rendered)
}

fn format_table_value(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => "".to_string(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format!("{:.4}", f),
            _ => n.to_string(),
        },
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(format_table_value)
            .collect::<Vec<_>>()
            .join(", "),
        serde_json::Value::Object(_) => serde_json::to_string(v).unwrap_or_default(),
    }
}

/// One CSV cell; the writer does the quoting
fn format_csv_value(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(format_table_value)
            .collect::<Vec<_>>()
            .join(";"),
        serde_json::Value::Object(_) => serde_json::to_string(v).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[derive(Serialize)]
    struct Paper {
        paper_id: &'static str,
        title: &'static str,
        citations: u64,
        keywords: Vec<&'static str>,
    }

    fn papers() -> Vec<Paper> {
        vec![
            Paper {
                paper_id: "p1",
                title: "Graphs, \"quoted\"",
                citations: 7,
                keywords: vec!["graph", "query"],
            },
            Paper {
                paper_id: "p2",
                title: "Plain",
                citations: 0,
                keywords: vec![],
            },
        ]
    }

    const COLUMNS: &[&str] = &["paper_id", "title", "citations", "keywords"];

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "scholargraph",
            "algorithms",
            "--limit",
            "5",
            "--backend",
            "memory",
            "--format",
            "csv",
        ])
        .unwrap();
        assert!(matches!(cli.backend, Backend::Memory));
        assert!(matches!(cli.format, OutputFormat::Csv));
        assert!(matches!(cli.command, Commands::Algorithms { limit: Some(5) }));
    }

    #[test]
    fn test_parse_load_stage() {
        let cli = Cli::try_parse_from(["scholargraph", "load", "--stage", "enrich"]).unwrap();
        match cli.command {
            Commands::Load { stage } => assert_eq!(stage.stages(), &[Stage::Enrich]),
            _ => panic!("expected load"),
        }
        assert!(matches!(cli.backend, Backend::Neo4j));
        assert!(Cli::try_parse_from(["scholargraph", "load", "--stage", "later"]).is_err());
    }

    #[test]
    fn test_render_csv_quotes_through_writer() {
        let out = render_rows("Papers", COLUMNS, &papers(), &OutputFormat::Csv).unwrap();
        assert_eq!(
            out,
            "paper_id,title,citations,keywords\n\
             p1,\"Graphs, \"\"quoted\"\"\",7,graph;query\n\
             p2,Plain,0,\n"
        );
    }

    #[test]
    fn test_render_json() {
        let out = render_rows("Papers", COLUMNS, &papers(), &OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["paper_id"], "p1");
        assert_eq!(parsed[1]["citations"], 0);
    }

    #[test]
    fn test_render_table() {
        let out = render_rows("Papers", COLUMNS, &papers(), &OutputFormat::Table).unwrap();
        assert!(out.starts_with("Papers\n"));
        assert!(out.contains("graph, query"));
        assert!(out.ends_with("2 row(s)\n\n"));

        let empty: Vec<Paper> = Vec::new();
        let out = render_rows("Papers", COLUMNS, &empty, &OutputFormat::Table).unwrap();
        assert_eq!(out, "Papers\n(no results)\n\n");
    }
}
