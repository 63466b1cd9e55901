//! Sampling run driver
//!
//! Drives an invoker through a fixed number of strictly sequential
//! attempts; attempt i+1 starts only after attempt i completed and its
//! progress line was printed.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{BenchError, BenchResult};
use crate::invoker::Invoke;
use crate::stats::{SampleSet, SummaryReport};

/// What to do when a single invocation attempt fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure, drop the sample, keep going.
    #[default]
    Skip,
    /// Stop after the first failed attempt.
    Abort,
}

/// Sampling run configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    pub executions: u32,
    pub policy: FailurePolicy,
}

impl RunConfig {
    /// Create a validated configuration.
    pub fn new(executions: u32, policy: FailurePolicy) -> BenchResult<Self> {
        if executions == 0 {
            return Err(BenchError::InvalidArgument(
                "executions must be at least 1".to_string(),
            ));
        }
        Ok(Self { executions, policy })
    }
}

/// Outcome of a completed run, before statistics are computed.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    /// Valid samples collected during the run.
    pub samples: SampleSet,
    /// Invocation attempts actually made.
    pub attempts: u32,
    /// Attempts that produced no valid sample.
    pub failures: u32,
}

/// Drives an invoker for a fixed number of sequential attempts.
pub struct Runner<I> {
    invoker: I,
    config: RunConfig,
}

impl<I: Invoke> Runner<I> {
    pub fn new(invoker: I, config: RunConfig) -> Self {
        Self { invoker, config }
    }

    /// Execute the configured number of attempts.
    ///
    /// Prints one progress line per attempt. Per-attempt failures end the
    /// run only under the abort policy; samples collected before the abort
    /// are kept.
    pub async fn run(&self) -> RunOutcome {
        let mut samples = SampleSet::new(self.invoker.strategy());
        let mut attempts = 0u32;
        let mut failures = 0u32;

        for i in 0..self.config.executions {
            attempts += 1;

            match self.invoker.invoke(i as usize).await {
                Ok(latency_ms) => {
                    if samples.push(latency_ms) {
                        println!("Execution {} latency: {latency_ms:.2} milliseconds", i + 1);
                    } else {
                        failures += 1;
                        println!(
                            "Execution {} failed: non-positive latency {latency_ms}",
                            i + 1
                        );
                        warn!("attempt {} produced an invalid sample", i + 1);
                        if self.config.policy == FailurePolicy::Abort {
                            break;
                        }
                    }
                }
                Err(e) => {
                    failures += 1;
                    println!("Execution {} failed: {e}", i + 1);
                    warn!("attempt {} failed: {e}", i + 1);
                    if self.config.policy == FailurePolicy::Abort {
                        info!("aborting after first failure");
                        break;
                    }
                }
            }
        }

        RunOutcome {
            samples,
            attempts,
            failures,
        }
    }

    /// Execute the run and compute the summary report.
    ///
    /// Fails with `EmptySampleSet` when every attempt failed.
    pub async fn run_report(&self) -> BenchResult<(RunOutcome, SummaryReport)> {
        let outcome = self.run().await;
        let report = SummaryReport::from_samples(&outcome.samples)?;
        Ok((outcome, report))
    }
}
