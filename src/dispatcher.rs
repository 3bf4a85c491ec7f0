use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use log::{debug, error, info, warn};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::error::LoadTestError;
use crate::models::Order;
use crate::order_generator::OrderPairGenerator;

pub const DEFAULT_TARGET_URL: &str = "http://127.0.0.1:3030/place_order";

/// Result of a single `POST /place_order`.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// HTTP 200 with a JSON body.
    Accepted(Value),
    /// Any other status code, with its body.
    Rejected { status: StatusCode, body: String },
    /// Transport failure or an unreadable body.
    Error(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundReport {
    pub sent: usize,
    pub succeeded: usize,
    pub rejected: usize,
    pub errored: usize,
}

impl RoundReport {
    fn record(&mut self, outcome: &SubmitOutcome) {
        self.sent += 1;
        match outcome {
            SubmitOutcome::Accepted(_) => self.succeeded += 1,
            SubmitOutcome::Rejected { .. } => self.rejected += 1,
            SubmitOutcome::Error(_) => self.errored += 1,
        }
    }

    fn merge(&mut self, other: &RoundReport) {
        self.sent += other.sent;
        self.succeeded += other.succeeded;
        self.rejected += other.rejected;
        self.errored += other.errored;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadTestReport {
    pub rounds: Vec<RoundReport>,
    pub totals: RoundReport,
    pub elapsed: Duration,
}

impl LoadTestReport {
    /// Requests per second over the whole run.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.totals.sent as f64 / secs
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadTestSettings {
    pub target_url: String,
    pub concurrent_requests: usize,
    pub iterations: usize,
    pub request_timeout: Option<Duration>,
}

impl Default for LoadTestSettings {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            concurrent_requests: 50,
            iterations: 20,
            request_timeout: None,
        }
    }
}

/// Posts generated orders to the target endpoint in sequential rounds.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: Client,
    target_url: Arc<str>,
}

impl Dispatcher {
    pub fn new(
        target_url: &str,
        request_timeout: Option<Duration>,
    ) -> Result<Self, LoadTestError> {
        let mut builder = Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            target_url: Arc::from(target_url),
        })
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    pub async fn send_order(&self, order: &Order) -> SubmitOutcome {
        let outcome = match self.client.post(&*self.target_url).json(order).send().await {
            Ok(resp) => {
                let status = resp.status();
                if status == StatusCode::OK {
                    match resp.json::<Value>().await {
                        Ok(body) => SubmitOutcome::Accepted(body),
                        Err(e) => SubmitOutcome::Error(e.to_string()),
                    }
                } else {
                    match resp.text().await {
                        Ok(body) => SubmitOutcome::Rejected { status, body },
                        Err(e) => SubmitOutcome::Error(e.to_string()),
                    }
                }
            }
            Err(e) => SubmitOutcome::Error(e.to_string()),
        };

        match &outcome {
            SubmitOutcome::Accepted(body) => info!("Success: {}", body),
            SubmitOutcome::Rejected { status, body } => {
                warn!("Failed: {} - {}", status.as_u16(), body)
            }
            SubmitOutcome::Error(e) => error!("Error: {} (order {})", e, order.id),
        }
        outcome
    }

    /// Submits every order on its own task and waits for all of them.
    /// Each task holds a `pool` permit while its request is in flight.
    pub async fn run_round(&self, orders: Vec<Order>, pool: Arc<Semaphore>) -> RoundReport {
        let handles: Vec<_> = orders
            .into_iter()
            .map(|order| {
                let dispatcher = self.clone();
                let pool = pool.clone();
                tokio::spawn(async move {
                    let _permit = pool.acquire_owned().await.ok();
                    dispatcher.send_order(&order).await
                })
            })
            .collect();

        let mut report = RoundReport::default();
        for result in join_all(handles).await {
            match result {
                Ok(outcome) => report.record(&outcome),
                Err(e) => {
                    error!("Error: worker task failed: {}", e);
                    report.record(&SubmitOutcome::Error(e.to_string()));
                }
            }
        }
        report
    }

    /// Runs `iterations` rounds of `concurrent_requests / 2` order pairs each.
    pub async fn load_test(
        &self,
        generator: &OrderPairGenerator,
        concurrent_requests: usize,
        iterations: usize,
    ) -> LoadTestReport {
        let start_time = Instant::now();
        let pairs = concurrent_requests / 2;
        if concurrent_requests % 2 != 0 {
            warn!(
                "concurrent_requests={} is odd, sending {} orders per round",
                concurrent_requests,
                pairs * 2
            );
        }

        let width = concurrent_requests.min(Semaphore::MAX_PERMITS);
        let pool = Arc::new(Semaphore::new(width));
        let mut rounds = Vec::with_capacity(iterations);
        let mut totals = RoundReport::default();

        if pairs > 0 {
            for round in 0..iterations {
                let orders = generator.generate_batch(pairs);
                debug!("round {}: submitting {} orders", round + 1, orders.len());

                let report = self.run_round(orders, pool.clone()).await;
                debug!("round {} finished: {:?}", round + 1, report);

                totals.merge(&report);
                rounds.push(report);
            }
        }

        LoadTestReport {
            rounds,
            totals,
            elapsed: start_time.elapsed(),
        }
    }
}

/// Builds a dispatcher for `settings.target_url` and runs the load test.
pub async fn load_test(
    generator: &OrderPairGenerator,
    settings: &LoadTestSettings,
) -> Result<LoadTestReport, LoadTestError> {
    let dispatcher = Dispatcher::new(&settings.target_url, settings.request_timeout)?;
    Ok(dispatcher
        .load_test(generator, settings.concurrent_requests, settings.iterations)
        .await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_report_record() {
        let mut report = RoundReport::default();
        report.record(&SubmitOutcome::Accepted(serde_json::json!({"ok": true})));
        report.record(&SubmitOutcome::Rejected {
            status: StatusCode::BAD_REQUEST,
            body: "bad".into(),
        });
        report.record(&SubmitOutcome::Error("refused".into()));
        report.record(&SubmitOutcome::Error("timeout".into()));

        assert_eq!(
            report,
            RoundReport {
                sent: 4,
                succeeded: 1,
                rejected: 1,
                errored: 2
            }
        );
    }

    #[test]
    fn test_throughput_zero_elapsed() {
        let report = LoadTestReport {
            rounds: vec![],
            totals: RoundReport::default(),
            elapsed: Duration::ZERO,
        };
        assert_eq!(report.throughput(), 0.0);
    }

    #[test]
    fn test_default_settings() {
        let settings = LoadTestSettings::default();
        assert_eq!(settings.target_url, "http://127.0.0.1:3030/place_order");
        assert_eq!(settings.concurrent_requests, 50);
        assert_eq!(settings.iterations, 20);
        assert!(settings.request_timeout.is_none());
    }

    #[tokio::test]
    async fn test_zero_concurrency_sends_nothing() {
        // nothing listens on port 9, any request would be an error
        let dispatcher = Dispatcher::new("http://127.0.0.1:9/place_order", None).unwrap();
        let report = dispatcher
            .load_test(&OrderPairGenerator::default(), 0, 5)
            .await;
        assert_eq!(report.totals.sent, 0);
        assert!(report.rounds.is_empty());
    }
}
