//! batch-runner - submit and track LLM batch jobs from the command line

#![allow(missing_docs)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use litellm_batch::core::batch::BatchResult;
use litellm_batch::utils::jsonl;
use litellm_batch::utils::logging::{LoggingOptions, init_tracing};
use litellm_batch::{BatchConfig, BatchOrchestrator};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

/// Submit and track batch jobs on asynchronous LLM batch APIs
#[derive(Parser, Debug)]
#[command(name = "batch-runner")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Submit and track LLM batch jobs", long_about = None)]
struct Cli {
    /// YAML configuration; providers are read from the environment when omitted
    #[arg(global = true, long = "config", short = 'c', env = "BATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(global = true, long = "json-logs")]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit requests from a JSONL file
    Submit {
        /// JSONL file of requests
        #[arg(long = "input", short = 'i', value_name = "PATH")]
        input: PathBuf,

        /// Where to write JSONL results; stdout when omitted
        #[arg(long = "output", short = 'o', value_name = "PATH")]
        output: Option<PathBuf>,

        /// Provider name
        #[arg(long = "provider", short = 'p')]
        provider: Option<String>,

        /// Model for requests that do not name one
        #[arg(long = "model", short = 'm')]
        model: Option<String>,

        /// Print the submitted job instead of waiting for results
        #[arg(long = "no-wait")]
        no_wait: bool,
    },

    /// Show the current status of a job
    Status {
        #[arg(value_name = "PROVIDER_JOB_ID")]
        job_id: String,

        #[arg(long = "provider", short = 'p')]
        provider: String,
    },

    /// Download results of a completed job
    Results {
        #[arg(value_name = "PROVIDER_JOB_ID")]
        job_id: String,

        #[arg(long = "provider", short = 'p')]
        provider: String,

        #[arg(long = "output", short = 'o', value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Ask the provider to stop a job
    Cancel {
        #[arg(value_name = "PROVIDER_JOB_ID")]
        job_id: String,

        #[arg(long = "provider", short = 'p')]
        provider: String,
    },

    /// Wait for a job submitted earlier
    Resume {
        #[arg(value_name = "PROVIDER_JOB_ID")]
        job_id: String,

        #[arg(long = "provider", short = 'p')]
        provider: String,

        #[arg(long = "output", short = 'o', value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(&LoggingOptions::default().json(cli.json_logs));

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => BatchConfig::from_file(path)
            .await
            .with_context(|| format!("loading {}", path.display()))?,
        None => BatchConfig::from_env().context("loading configuration from environment")?,
    };
    let orchestrator =
        BatchOrchestrator::from_config(&config).context("building batch providers")?;
    info!(providers = ?orchestrator.providers(), "Batch providers registered");

    match cli.command {
        Commands::Submit {
            input,
            output,
            provider,
            model,
            no_wait,
        } => {
            let requests = jsonl::read_requests(&input)
                .await
                .with_context(|| format!("reading {}", input.display()))?;

            let mut options = config.wait_options().with_progress(|job| {
                info!(
                    job_id = %job.provider_job_id,
                    status = %job.status,
                    completed = job.completed_requests,
                    failed = job.failed_requests,
                    total = job.total_requests,
                    "Progress"
                );
            });
            options.submit.provider = provider;
            options.submit.model = model;

            if no_wait {
                let job = orchestrator.submit_batch(&requests, &options.submit).await?;
                println!("{}", serde_json::to_string_pretty(&job)?);
                return Ok(());
            }

            let results = orchestrator.submit_and_wait(&requests, &options).await?;
            emit_results(&results, output.as_deref()).await
        }
        Commands::Status { job_id, provider } => {
            let job = orchestrator
                .get_batch_status(&job_id, Some(&provider))
                .await?;
            println!("{}", serde_json::to_string_pretty(&job)?);
            Ok(())
        }
        Commands::Results {
            job_id,
            provider,
            output,
        } => {
            let results = orchestrator
                .get_batch_results(&job_id, Some(&provider))
                .await?;
            emit_results(&results, output.as_deref()).await
        }
        Commands::Cancel { job_id, provider } => {
            orchestrator.cancel_batch(&job_id, Some(&provider)).await?;
            println!("Cancellation requested for {}", job_id);
            Ok(())
        }
        Commands::Resume {
            job_id,
            provider,
            output,
        } => {
            let results = orchestrator
                .resume_and_wait(&job_id, &provider, &config.wait_options())
                .await
                .with_context(|| format!("resuming {}", job_id))?;
            emit_results(&results, output.as_deref()).await
        }
    }
}

async fn emit_results(results: &[BatchResult], output: Option<&Path>) -> Result<()> {
    let failed = results.iter().filter(|r| !r.success).count();
    match output {
        Some(path) => {
            jsonl::write_results(path, results)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            info!(
                results = results.len(),
                failed,
                path = %path.display(),
                "Results written"
            );
        }
        None => print!("{}", jsonl::render_results(results)?),
    }
    Ok(())
}
