//! Timed invocation of the measured operation
//!
//! One invocation, one duration measurement or one failure.

mod http;

pub use http::{HttpInvoker, InvokeMode, WorkflowPayload};

use crate::error::BenchResult;
use crate::stats::MeasurementStrategy;

/// A single timed invocation of the measured operation.
#[allow(async_fn_in_trait)]
pub trait Invoke {
    /// Which measurement strategy this invoker's samples belong to.
    fn strategy(&self) -> MeasurementStrategy;

    /// Perform attempt `attempt` (zero-based) and return the measured
    /// latency in milliseconds.
    ///
    /// Some endpoints use the attempt index to vary cache keys between
    /// calls; implementations that do not need it may ignore it.
    async fn invoke(&self, attempt: usize) -> BenchResult<f64>;
}
