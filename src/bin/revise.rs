use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use finals_revise::extract::TabulaEngine;
use finals_revise::matrix::{load_matrix, terms_in_data_dir};
use finals_revise::pipeline::{BatchSummary, Pipeline};
use finals_revise::serve;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "revise",
    version,
    about = "Rebuild finals schedules from registrar matrix PDFs and project them onto term catalogs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Process term documents: fetch, reconstruct, export, project.
    Run(RunArgs),
    /// Serve the data directory over HTTP with permissive CORS.
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Directory holding per-term catalog JSON files and output artifacts.
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,

    /// Path to the matrix catalog mapping term codes to PDF URLs.
    #[arg(long, default_value = "./matrix.json")]
    matrix: PathBuf,

    /// Path to the tabula jar; falls back to the TABULA_JAR env var.
    #[arg(long)]
    tabula_jar: Option<PathBuf>,

    /// Terms to process; defaults to every term document in the data dir.
    terms: Vec<String>,
}

#[derive(Debug, Args)]
struct ServeArgs {
    /// Directory to publish.
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,

    #[arg(long, default_value = "localhost")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn run_batch(args: &RunArgs) -> Result<BatchSummary> {
    let catalog = load_matrix(&args.matrix)
        .with_context(|| format!("failed to load matrix catalog '{}'", args.matrix.display()))?;

    let terms = if args.terms.is_empty() {
        terms_in_data_dir(&args.data_dir).with_context(|| {
            format!("failed to list term documents in '{}'", args.data_dir.display())
        })?
    } else {
        args.terms.clone()
    };
    if terms.is_empty() {
        bail!("no term documents found under '{}'", args.data_dir.display());
    }

    let engine = TabulaEngine::from_env_or(args.tabula_jar.clone())?;
    Ok(Pipeline::new(engine, args.data_dir.clone()).process_terms(&catalog, &terms))
}

fn report_summary(summary: &BatchSummary) {
    for outcome in &summary.processed {
        println!(
            "{}: layout {}, {} schedule rows, {} common exams, {} sections updated",
            outcome.term,
            outcome.layout,
            outcome.schedule_rows,
            outcome.common_rows,
            outcome.sections_updated,
        );
    }

    if summary.failed.is_empty() {
        println!("finished all terms");
    } else {
        let failed: Vec<&str> = summary
            .failed
            .iter()
            .map(|failure| failure.term.as_str())
            .collect();
        eprintln!("failed to parse finals for: {}", failed.join(", "));
        for failure in &summary.failed {
            eprintln!("  {}: {}", failure.term, failure.reason);
        }
    }
}

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("finals_revise=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => match run_batch(&args) {
            Ok(summary) => {
                report_summary(&summary);
                if summary.failed.is_empty() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(2)
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
        Commands::Serve(args) => match serve::run(args.data_dir, &args.host, args.port) {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}
