use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fraudapt_lib::{
    analyze_many,
    application::AnalysisResponse,
    build_backend_response, build_environment,
    domain::DomainError,
    init_tracing,
    interfaces::report::{render_analysis, render_cases, render_footer},
    set_embedding_backend, STORE_NAME,
};
use tracing::warn;

/// Scam message detector: matches messages against known fraud cases
#[derive(Parser, Debug)]
#[command(name = "fraudapt")]
#[command(about = "Paste a suspicious message and get instant fraud detection", long_about = None)]
struct Args {
    /// Log filter (overrides FRAUDAPT_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one or more messages
    Analyze {
        #[arg(required = true)]
        messages: Vec<String>,

        /// Number of similar cases to return
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Print JSON instead of a text report
        #[arg(long)]
        json: bool,
    },
    /// Analyze every non-empty line of a file
    Batch {
        file: PathBuf,

        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        #[arg(long)]
        json: bool,
    },
    /// List the known fraud cases
    Cases,
    /// Check that the case store and embedder are ready
    Health,
    /// List available embedding backends
    Backends,
    /// Persist a different embedding backend for the next run
    UseBackend {
        id: String,

        #[arg(long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    let handles = build_environment().context("failed to bootstrap FraudAPT environment")?;
    let service = handles.service;

    match args.command {
        Command::Analyze {
            messages,
            top_k,
            json,
        } => {
            let results = analyze_many(service.clone(), messages, top_k).await;
            print_results(results, json, service.config().embedding_model())?;
        }
        Command::Batch { file, top_k, json } => {
            let raw = tokio::task::spawn_blocking(move || std::fs::read_to_string(&file))
                .await?
                .context("failed to read batch file")?;
            let messages: Vec<String> = raw
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect();
            let results = analyze_many(service.clone(), messages, top_k).await;
            print_results(results, json, service.config().embedding_model())?;
        }
        Command::Cases => {
            print!("{}", render_cases(&service.cases()?));
        }
        Command::Health => {
            let status = service.health()?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Backends => {
            let active = handles.config.current().embedding;
            let response = build_backend_response(&active, &service);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::UseBackend { id, model } => {
            let updated = set_embedding_backend(&handles.config, &id, model)?;
            println!(
                "Active backend: {} ({}), saved to {}",
                updated.embedding.id(),
                updated.embedding.model_name(),
                handles.config.path().display()
            );
        }
    }

    Ok(())
}

fn print_results(
    results: Vec<Result<AnalysisResponse, DomainError>>,
    json: bool,
    model: &str,
) -> Result<()> {
    let mut failures = 0usize;
    for result in results {
        match result {
            Ok(response) if json => println!("{}", serde_json::to_string(&response)?),
            Ok(response) => {
                println!("Message: {}", response.message);
                print!("{}", render_analysis(&response));
            }
            Err(err) => {
                failures += 1;
                warn!(target: "fraudapt::cli", error = %err, "analysis failed");
                eprintln!("error: {err}");
            }
        }
    }
    if !json {
        println!("{}", render_footer(model, STORE_NAME));
    }
    if failures > 0 {
        anyhow::bail!("{failures} message(s) could not be analyzed");
    }
    Ok(())
}
