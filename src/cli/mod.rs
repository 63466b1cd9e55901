//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::{BenchError, BenchResult};
use crate::runner::FailurePolicy;
use crate::stats::DurationUnit;

/// Latency sampling harness for HTTP endpoints and timed workflows
#[derive(Parser, Debug)]
#[command(name = "latbench")]
#[command(version = "0.1.0")]
#[command(about = "Measure per-call latency of an HTTP endpoint and report summary statistics")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sample an endpoint that reports its own runtime in the response
    Run(RunArgs),

    /// Sample an endpoint by timing the call boundary on the client side
    Probe(ProbeArgs),

    /// Sample a workflow endpoint that reports its runtime in seconds
    Workflow(WorkflowArgs),
}

/// Options shared by every sampling subcommand.
#[derive(Parser, Debug)]
pub struct CommonArgs {
    /// Target application URL
    #[arg(short, long)]
    pub url: String,

    /// Number of executions to benchmark
    #[arg(short = 'n', long)]
    pub executions: u32,

    /// What to do when a single attempt fails
    #[arg(long, value_enum, default_value_t = FailurePolicy::Skip)]
    pub on_failure: FailurePolicy,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Output format (text, json, json-pretty)
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Save the run record to a JSON file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the run command (server-reported runtime field)
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Response field holding the measured runtime
    #[arg(long, default_value = "runtime")]
    pub runtime_field: String,

    /// Unit of the runtime field
    #[arg(long, value_enum, default_value_t = DurationUnit::Ms)]
    pub unit: DurationUnit,

    /// Work-size path segment appended to the URL
    #[arg(short, long)]
    pub invocations: Option<u32>,

    /// Append the attempt index as a path segment (varies cache keys)
    #[arg(long)]
    pub index_path: bool,
}

/// Arguments for the probe command (client-measured)
#[derive(Parser, Debug)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the workflow command (POST payload, runtimeSeconds)
#[derive(Parser, Debug)]
pub struct WorkflowArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Database hostname forwarded in the request payload
    #[arg(short = 'H', long)]
    pub hostname: String,

    /// Database username forwarded in the request payload
    #[arg(short = 'U', long)]
    pub username: String,

    /// Database password forwarded in the request payload
    #[arg(short = 'W', long)]
    pub password: String,

    /// Number of workflow steps per invocation
    #[arg(short, long, default_value = "1")]
    pub steps: u32,
}

/// Validate the shared arguments before any network call is made.
pub fn validate_common(args: &CommonArgs) -> BenchResult<()> {
    if args.executions == 0 {
        return Err(BenchError::InvalidArgument(
            "executions must be at least 1".to_string(),
        ));
    }
    if !(args.url.starts_with("http://") || args.url.starts_with("https://")) {
        return Err(BenchError::InvalidArgument(format!(
            "invalid URL '{}'; expected an http:// or https:// address",
            args.url
        )));
    }
    if args.timeout == 0 {
        return Err(BenchError::InvalidArgument(
            "timeout must be at least 1 second".to_string(),
        ));
    }
    Ok(())
}
