//! latbench - fixed-count latency sampling harness
//!
//! Repeatedly invokes an HTTP endpoint or timed workflow, records the
//! elapsed time of every invocation, and prints summary statistics
//! (mean, min, max, median, p99) in milliseconds.
//!
//! ## Usage
//!
//! ```bash
//! # Endpoint that reports its own runtime in a JSON field
//! latbench run --url https://app.example.dev/txn -n 100
//!
//! # Nanosecond runtime field, attempt index appended to the URL
//! latbench run --url https://app.example.dev/txn -n 100 --unit ns --index-path
//!
//! # Client-side timing around the call boundary
//! latbench probe --url https://app.example.dev/bare -n 100
//!
//! # Timed workflow endpoint (POST payload, runtimeSeconds response)
//! latbench workflow --url https://exec.example.dev -n 50 -H db-host -U user -W pass --steps 10
//! ```

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod cli;
mod error;
mod invoker;
mod output;
mod runner;
mod stats;

use cli::{Args, Command, CommonArgs};
use invoker::{HttpInvoker, Invoke, InvokeMode, WorkflowPayload};
use output::{OutputFormat, ReportFormatter, RunRecord};
use runner::{RunConfig, Runner};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    FmtSubscriber::builder()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_target(false)
        .compact()
        .init();

    match args.command {
        Command::Run(run_args) => {
            let mode = InvokeMode::ServerRuntime {
                field: run_args.runtime_field,
                unit: run_args.unit,
                invocations: run_args.invocations,
                index_path: run_args.index_path,
            };
            sample(&run_args.common, mode).await?;
        }
        Command::Probe(probe_args) => {
            sample(&probe_args.common, InvokeMode::ClientTimed).await?;
        }
        Command::Workflow(wf_args) => {
            let mode = InvokeMode::Workflow {
                payload: WorkflowPayload {
                    hostname: wf_args.hostname,
                    username: wf_args.username,
                    password: wf_args.password,
                    steps: wf_args.steps,
                },
            };
            sample(&wf_args.common, mode).await?;
        }
    }

    Ok(())
}

/// Run one sampling session against the target and print the report.
async fn sample(common: &CommonArgs, mode: InvokeMode) -> Result<()> {
    cli::validate_common(common)?;

    let formatter = ReportFormatter::new(
        OutputFormat::from_str(&common.format)
            .ok_or_else(|| anyhow::anyhow!("unknown output format: {}", common.format))?,
    );

    let invoker = HttpInvoker::new(&common.url, mode, common.timeout)?;
    let config = RunConfig::new(common.executions, common.on_failure)?;

    info!(
        "Sampling {} ({} executions, {})",
        common.url,
        common.executions,
        invoker.strategy()
    );

    let runner = Runner::new(invoker, config);
    let (outcome, report) = runner.run_report().await?;

    println!("{}", formatter.format_report(&report));

    if outcome.failures > 0 {
        info!(
            "{} of {} attempts failed and were excluded",
            outcome.failures, outcome.attempts
        );
    }

    if let Some(path) = &common.output {
        let record = RunRecord {
            target: common.url.clone(),
            executions: common.executions,
            failures: outcome.failures,
            completed_at: Utc::now(),
            report,
        };
        record.save(path)?;
        info!("Saved run record to {}", path.display());
    }

    Ok(())
}
