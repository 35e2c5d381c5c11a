//! Bounded payload runner
//!
//! One task per payload, gated by a counting semaphore. Within a task the
//! attempts are strictly sequential: a transport error backs off
//! exponentially before the next try, a cached response ends the task at
//! once, and a non-cached response is retried without delay.

use crate::http::Prober;
use crate::models::{PayloadOutcome, ProbeState, ScanConfig};
use crate::report;
use crate::scanner::verdict;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, error};

/// Delay after the first failed attempt; doubles on every further failure
pub const RETRY_BACKOFF_BASE: Duration = Duration::from_millis(25);

/// Backoff after the failed attempt with zero-based index `attempt`
pub fn retry_backoff(attempt: u32) -> Duration {
    RETRY_BACKOFF_BASE.saturating_mul(2u32.saturating_pow(attempt))
}

/// Appends a payload to the base URL after trimming its trailing slashes
pub fn construct_test_url(base_url: &str, payload: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), payload)
}

/// Runs payload batches against one base URL under a shared gate
#[derive(Clone)]
pub struct TestRunner {
    prober: Arc<dyn Prober>,
    headers: Arc<HashMap<String, String>>,
    gate: Arc<Semaphore>,
    request_repeats: u32,
    only_vulnerable: bool,
}

impl TestRunner {
    pub fn new(
        prober: Arc<dyn Prober>,
        headers: HashMap<String, String>,
        gate: Arc<Semaphore>,
        request_repeats: u32,
        only_vulnerable: bool,
    ) -> Self {
        Self {
            prober,
            headers: Arc::new(headers),
            gate,
            request_repeats,
            only_vulnerable,
        }
    }

    pub fn from_config(prober: Arc<dyn Prober>, config: &ScanConfig, gate: Arc<Semaphore>) -> Self {
        Self::new(
            prober,
            config.headers.clone(),
            gate,
            config.request_repeats,
            config.only_vulnerable,
        )
    }

    /// Tests every payload and returns once all of them have finished.
    ///
    /// Result lines are printed as tasks complete, so their order follows
    /// completion rather than submission. Outcomes come back in the same
    /// order.
    pub async fn run(&self, base_url: &str, payloads: Vec<String>) -> Vec<PayloadOutcome> {
        let mut set = JoinSet::new();
        let total = payloads.len();

        for payload in payloads {
            let prober = Arc::clone(&self.prober);
            let headers = Arc::clone(&self.headers);
            let gate = Arc::clone(&self.gate);
            let base_url = base_url.to_string();
            let request_repeats = self.request_repeats;
            let only_vulnerable = self.only_vulnerable;

            set.spawn(async move {
                let Ok(_permit) = gate.acquire_owned().await else {
                    return PayloadOutcome {
                        test_url: construct_test_url(&base_url, &payload),
                        base_url,
                        attempts: 0,
                        state: ProbeState::Failed("concurrency gate closed".to_string()),
                    };
                };

                let outcome =
                    probe_payload(prober.as_ref(), &base_url, &payload, &headers, request_repeats)
                        .await;

                if let Some(line) = report::outcome_line(&outcome, only_vulnerable) {
                    report::print_line(&line);
                }
                outcome
            });
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => error!("Probe task panicked: {e}"),
            }
        }
        outcomes
    }
}

/// Probes one payload up to `request_repeats` times
pub async fn probe_payload(
    prober: &dyn Prober,
    base_url: &str,
    payload: &str,
    headers: &HashMap<String, String>,
    request_repeats: u32,
) -> PayloadOutcome {
    let test_url = construct_test_url(base_url, payload);
    let mut state = ProbeState::default();
    let mut attempts = 0;

    for attempt in 0..request_repeats {
        attempts += 1;

        match prober.probe(&test_url, headers).await {
            Ok(response) => {
                debug!(
                    "Attempt {attempts} for {test_url} sent:\n{}",
                    response.raw_request.trim_end()
                );
                let cached = verdict::is_cached(&response.headers);
                state = state.record_response(response, cached);
                if state.is_terminal() {
                    debug!("{test_url} cached on attempt {attempts}");
                    break;
                }
            }
            Err(e) => {
                debug!("Attempt {attempts} for {test_url} failed: {e}");
                let retryable = e.is_transport();
                state = state.record_error(e.to_string());
                if !retryable {
                    break;
                }
                if attempt + 1 < request_repeats {
                    sleep(retry_backoff(attempt)).await;
                }
            }
        }
    }

    PayloadOutcome {
        base_url: base_url.to_string(),
        test_url,
        attempts,
        state: state.finish(),
    }
}
