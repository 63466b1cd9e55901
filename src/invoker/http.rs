//! HTTP invoker
//!
//! Issues one timed request per attempt against the target endpoint. The
//! reqwest client is built once at run start and reused across every
//! attempt, so connection pooling amortizes handshake cost.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::Invoke;
use crate::error::{BenchError, BenchResult};
use crate::stats::{DurationUnit, MeasurementStrategy};

/// Credential and workload fields forwarded verbatim in the workflow
/// request payload.
#[derive(Clone, Debug, Serialize)]
pub struct WorkflowPayload {
    pub hostname: String,
    pub username: String,
    pub password: String,
    pub steps: u32,
}

/// How a single invocation is issued and where its duration comes from.
#[derive(Clone, Debug)]
pub enum InvokeMode {
    /// GET the target; the JSON response reports its own elapsed time in
    /// a numeric field.
    ServerRuntime {
        /// Response field holding the measured runtime.
        field: String,
        /// Unit of that field; normalized to milliseconds on extraction.
        unit: DurationUnit,
        /// Optional work-size path segment appended to the URL.
        invocations: Option<u32>,
        /// Append the attempt index as a final path segment.
        index_path: bool,
    },
    /// POST a workflow payload; the response reports `runtimeSeconds`.
    Workflow { payload: WorkflowPayload },
    /// Time the call boundary on the client side.
    ClientTimed,
}

impl InvokeMode {
    pub fn strategy(&self) -> MeasurementStrategy {
        match self {
            InvokeMode::ClientTimed => MeasurementStrategy::ClientMeasured,
            _ => MeasurementStrategy::ServerReported,
        }
    }
}

/// HTTP invoker for one sampling run.
pub struct HttpInvoker {
    client: Client,
    url: String,
    mode: InvokeMode,
    timeout_secs: u64,
}

impl HttpInvoker {
    /// Create an invoker with its own pooled client.
    pub fn new(url: impl Into<String>, mode: InvokeMode, timeout_secs: u64) -> BenchResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BenchError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            mode,
            timeout_secs,
        })
    }

    fn build_url(&self, attempt: usize) -> String {
        match &self.mode {
            InvokeMode::ServerRuntime {
                invocations,
                index_path,
                ..
            } => {
                let mut url = self.url.trim_end_matches('/').to_string();
                if let Some(n) = invocations {
                    url.push_str(&format!("/{n}"));
                }
                if *index_path {
                    url.push_str(&format!("/{attempt}"));
                }
                url
            }
            _ => self.url.clone(),
        }
    }

    fn map_send_error(&self, url: &str, e: reqwest::Error) -> BenchError {
        if e.is_timeout() {
            BenchError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            BenchError::ConnectionRefused(url.to_string())
        } else {
            BenchError::Transport(e.to_string())
        }
    }

    /// Pull a positive runtime value out of a JSON body and normalize it
    /// to milliseconds.
    fn extract_runtime(body: &Value, field: &str, unit: DurationUnit) -> BenchResult<f64> {
        let raw = body
            .get(field)
            .ok_or_else(|| BenchError::MalformedResponse(format!("missing field '{field}'")))?
            .as_f64()
            .ok_or_else(|| {
                BenchError::MalformedResponse(format!("field '{field}' is not numeric"))
            })?;

        let latency_ms = unit.to_millis(raw);
        if latency_ms <= 0.0 {
            // Some backends report a zero/negative sentinel on failure;
            // that is not a latency.
            return Err(BenchError::MalformedResponse(format!(
                "non-positive runtime {raw} in field '{field}'"
            )));
        }
        Ok(latency_ms)
    }

    /// Extract `runtimeSeconds` from a workflow response.
    ///
    /// Lambda-style proxy responses nest the real payload under a `body`
    /// field, sometimes as a JSON-encoded string.
    fn workflow_runtime(body: &Value) -> BenchResult<f64> {
        if let Some(inner) = body.get("body") {
            let decoded;
            let inner = match inner {
                Value::String(s) => {
                    decoded = serde_json::from_str::<Value>(s).map_err(|e| {
                        BenchError::MalformedResponse(format!("undecodable body field: {e}"))
                    })?;
                    &decoded
                }
                other => other,
            };
            return Self::extract_runtime(inner, "runtimeSeconds", DurationUnit::S);
        }
        Self::extract_runtime(body, "runtimeSeconds", DurationUnit::S)
    }

    async fn read_json(&self, response: reqwest::Response, url: &str) -> BenchResult<Value> {
        let status = response.status();
        if !status.is_success() {
            return Err(BenchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        response
            .json()
            .await
            .map_err(|e| BenchError::MalformedResponse(format!("undecodable response: {e}")))
    }
}

impl Invoke for HttpInvoker {
    fn strategy(&self) -> MeasurementStrategy {
        self.mode.strategy()
    }

    async fn invoke(&self, attempt: usize) -> BenchResult<f64> {
        let url = self.build_url(attempt);
        debug!("attempt {} -> {}", attempt + 1, url);

        match &self.mode {
            InvokeMode::ServerRuntime { field, unit, .. } => {
                let response = self
                    .client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| self.map_send_error(&url, e))?;
                let body = self.read_json(response, &url).await?;
                Self::extract_runtime(&body, field, *unit)
            }
            InvokeMode::Workflow { payload } => {
                let response = self
                    .client
                    .post(&url)
                    .json(payload)
                    .send()
                    .await
                    .map_err(|e| self.map_send_error(&url, e))?;
                let body = self.read_json(response, &url).await?;
                Self::workflow_runtime(&body)
            }
            InvokeMode::ClientTimed => {
                let start = Instant::now();
                let response = self
                    .client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| self.map_send_error(&url, e))?;
                let status = response.status();
                // Drain the body so the measurement covers the whole exchange.
                response
                    .bytes()
                    .await
                    .map_err(|e| BenchError::Transport(e.to_string()))?;
                let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

                if !status.is_success() {
                    return Err(BenchError::HttpStatus {
                        status: status.as_u16(),
                        url,
                    });
                }
                Ok(latency_ms)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn server_runtime_mode(invocations: Option<u32>, index_path: bool) -> InvokeMode {
        InvokeMode::ServerRuntime {
            field: "runtime".to_string(),
            unit: DurationUnit::Ms,
            invocations,
            index_path,
        }
    }

    #[test]
    fn test_build_url_plain() {
        let invoker =
            HttpInvoker::new("http://app.test/txn", server_runtime_mode(None, false), 30).unwrap();
        assert_eq!(invoker.build_url(0), "http://app.test/txn");
        assert_eq!(invoker.build_url(9), "http://app.test/txn");
    }

    #[test]
    fn test_build_url_with_invocations_and_index() {
        let invoker = HttpInvoker::new(
            "http://app.test/wf/",
            server_runtime_mode(Some(5), true),
            30,
        )
        .unwrap();
        assert_eq!(invoker.build_url(7), "http://app.test/wf/5/7");
    }

    #[test]
    fn test_client_timed_ignores_url_suffixes() {
        let invoker = HttpInvoker::new("http://app.test/bare", InvokeMode::ClientTimed, 30).unwrap();
        assert_eq!(invoker.build_url(3), "http://app.test/bare");
        assert_eq!(invoker.strategy(), MeasurementStrategy::ClientMeasured);
    }

    #[test]
    fn test_extract_runtime_nanos_normalized() {
        let body = json!({"runtime": 1_000_000});
        let ms = HttpInvoker::extract_runtime(&body, "runtime", DurationUnit::Ns).unwrap();
        assert!((ms - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_extract_runtime_missing_field() {
        let body = json!({"output": "hello"});
        let err = HttpInvoker::extract_runtime(&body, "runtime", DurationUnit::Ms).unwrap_err();
        assert!(matches!(err, BenchError::MalformedResponse(_)));
    }

    #[test]
    fn test_extract_runtime_wrong_type() {
        let body = json!({"runtime": "fast"});
        let err = HttpInvoker::extract_runtime(&body, "runtime", DurationUnit::Ms).unwrap_err();
        assert!(matches!(err, BenchError::MalformedResponse(_)));
    }

    #[test]
    fn test_extract_runtime_rejects_sentinel() {
        let body = json!({"runtime": -1});
        let err = HttpInvoker::extract_runtime(&body, "runtime", DurationUnit::Ms).unwrap_err();
        assert!(matches!(err, BenchError::MalformedResponse(_)));

        let body = json!({"runtime": 0.0});
        assert!(HttpInvoker::extract_runtime(&body, "runtime", DurationUnit::Ms).is_err());
    }

    #[test]
    fn test_workflow_runtime_flat() {
        let body = json!({"runtimeSeconds": 0.25});
        let ms = HttpInvoker::workflow_runtime(&body).unwrap();
        assert!((ms - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_workflow_runtime_nested_string_body() {
        let body = json!({"statusCode": 200, "body": "{\"runtimeSeconds\": 1.5}"});
        let ms = HttpInvoker::workflow_runtime(&body).unwrap();
        assert!((ms - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn test_workflow_runtime_nested_object_body() {
        let body = json!({"statusCode": 200, "body": {"runtimeSeconds": 2.0}});
        let ms = HttpInvoker::workflow_runtime(&body).unwrap();
        assert!((ms - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_mode_strategy() {
        assert_eq!(
            server_runtime_mode(None, false).strategy(),
            MeasurementStrategy::ServerReported
        );
        let wf = InvokeMode::Workflow {
            payload: WorkflowPayload {
                hostname: "db".into(),
                username: "u".into(),
                password: "p".into(),
                steps: 1,
            },
        };
        assert_eq!(wf.strategy(), MeasurementStrategy::ServerReported);
        assert_eq!(
            InvokeMode::ClientTimed.strategy(),
            MeasurementStrategy::ClientMeasured
        );
    }
}
