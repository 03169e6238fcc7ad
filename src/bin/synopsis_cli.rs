//! Command-line companion to the Synopsis server.
//!
//! Summarizes local documents through the same extraction and summarization pipeline as
//! `POST /summarize`, without going through HTTP or the upload directory.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use synopsis::{
    config,
    extraction::{DocumentFormat, extract_text},
    logging,
    processing::{BatchOutcome, InputItem, SummaryService},
    summarization::SummaryType,
};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(
    name = "synopsis-cli",
    version,
    about = "Summarize PDF, TXT, and DOCX documents with Gemini"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize files; directories are searched recursively for pdf/txt/docx files
    Summarize {
        /// Files or directories to summarize
        paths: Vec<PathBuf>,
        /// Requested summary length
        #[arg(
            long,
            default_value = "paragraph",
            value_parser = ["1-line", "3-line", "5-line", "paragraph"]
        )]
        summary_type: String,
        /// Additional text to summarize after the files
        #[arg(long)]
        text: Option<String>,
        /// Print the same JSON body the HTTP endpoint returns
        #[arg(long)]
        json: bool,
    },
    /// Print the extracted text of a single document without summarizing it
    Extract {
        /// Document to extract
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_cli_tracing();

    match cli.command {
        Command::Summarize {
            paths,
            summary_type,
            text,
            json,
        } => summarize(paths, SummaryType::parse_lenient(&summary_type), text, json).await,
        Command::Extract { path } => {
            let text = extract_blocking(path.clone())
                .await
                .with_context(|| format!("failed to extract {}", path.display()))?;
            println!("{text}");
            Ok(())
        }
    }
}

async fn summarize(
    paths: Vec<PathBuf>,
    summary_type: SummaryType,
    text: Option<String>,
    json: bool,
) -> Result<()> {
    let (documents, skipped) = collect_documents(&paths)?;
    if documents.is_empty() && text.as_deref().is_none_or(str::is_empty) {
        bail!("nothing to summarize: no pdf, txt, or docx files found and no --text given");
    }

    let mut items = Vec::with_capacity(documents.len() + 1);
    for path in documents {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let content = extract_blocking(path.clone())
            .await
            .with_context(|| format!("failed to extract {}", path.display()))?;
        items.push(InputItem::new(name, content));
    }
    if let Some(text) = text.filter(|text| !text.is_empty()) {
        items.push(InputItem::direct_text(text));
    }

    let config = Arc::new(config::init_config().context("failed to load configuration")?);
    config.log_summary();
    let service =
        SummaryService::new(config).context("failed to build summarization client")?;
    let outcome = BatchOutcome {
        summaries: service.summarize_inputs(items, summary_type).await,
        skipped,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    for result in &outcome.summaries {
        println!("=== {} ({:.2}% shorter) ===", result.name, result.reduction);
        println!("{}\n", result.summary);
    }
    for name in &outcome.skipped {
        eprintln!("skipped unsupported file: {name}");
    }
    Ok(())
}

/// Expand directories and split explicit paths into accepted documents and skipped names.
fn collect_documents(paths: &[PathBuf]) -> Result<(Vec<PathBuf>, Vec<String>)> {
    let mut documents = Vec::new();
    let mut skipped = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry =
                    entry.with_context(|| format!("failed to walk {}", path.display()))?;
                if entry.file_type().is_file() && DocumentFormat::from_path(entry.path()).is_some()
                {
                    documents.push(entry.into_path());
                }
            }
        } else if DocumentFormat::from_path(path).is_some() {
            documents.push(path.clone());
        } else {
            skipped.push(path.display().to_string());
        }
    }

    Ok((documents, skipped))
}

async fn extract_blocking(path: PathBuf) -> Result<String> {
    let text = tokio::task::spawn_blocking(move || extract_text(Path::new(&path)))
        .await
        .context("extraction task failed")??;
    Ok(text)
}
