use std::sync::Arc;
use std::time::{Duration, Instant};

use tally_protocol::{HttpQueryClient, ProtocolResult, QueryClient};
use tally_types::{MatchCount, QueryCase, QueryTable};
use tokio::sync::{mpsc, Semaphore};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::LoadgenConfig;
use crate::error::{ConfigError, LoadError, LoadResult};

/// Result of one successful batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub workers: usize,
    /// Answers equal to the expected count.
    pub matched: usize,
    /// Answers that differed from the expectation.
    pub mismatched: usize,
    pub elapsed: Duration,
}

/// Totals over a sequence of rounds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoundsSummary {
    pub rounds: u64,
    pub failed_rounds: u64,
    pub requests: u64,
    pub mismatched: u64,
}

enum WorkerOutcome {
    Matched,
    Mismatched,
    Failed(LoadError),
}

/// Dispatches sampled queries with at most `concurrency_limit` in flight.
///
/// The limiter is created once and shared by every batch. A worker holds its
/// permit only for the duration of the query call, and the permit is
/// returned when the guard drops, whatever the call's outcome.
pub struct LoadDriver<C> {
    client: Arc<C>,
    queries: Arc<QueryTable>,
    limiter: Arc<Semaphore>,
    concurrency_limit: usize,
}

impl LoadDriver<HttpQueryClient> {
    /// Validate `config` and build a driver over HTTP.
    pub fn from_config(config: &LoadgenConfig) -> LoadResult<Self> {
        config.validate()?;
        let client = HttpQueryClient::new(&config.target_url, config.request_timeout())?;
        Self::new(client, config.query_table(), config.concurrency)
    }
}

impl<C> LoadDriver<C>
where
    C: QueryClient + 'static,
{
    pub fn new(client: C, queries: QueryTable, concurrency_limit: usize) -> LoadResult<Self> {
        if concurrency_limit == 0 || concurrency_limit > Semaphore::MAX_PERMITS {
            return Err(ConfigError::Invalid {
                field: "concurrency",
                reason: format!("must be between 1 and {}", Semaphore::MAX_PERMITS),
            }
            .into());
        }
        Ok(Self {
            client: Arc::new(client),
            queries: Arc::new(queries),
            limiter: Arc::new(Semaphore::new(concurrency_limit)),
            concurrency_limit,
        })
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Permits not currently held by a worker.
    pub fn available_permits(&self) -> usize {
        self.limiter.available_permits()
    }

    /// Run one batch of `worker_count` queries.
    ///
    /// Every worker is awaited before returning, so batches never overlap.
    /// If any query failed, the first failure observed is returned; answers
    /// that differ from the expectation are logged and counted, never errors.
    pub async fn run(&self, worker_count: usize) -> LoadResult<BatchReport> {
        let started = Instant::now();
        let (tx, mut rx) = mpsc::unbounded_channel::<WorkerOutcome>();

        for _ in 0..worker_count {
            let client = Arc::clone(&self.client);
            let queries = Arc::clone(&self.queries);
            let limiter = Arc::clone(&self.limiter);
            let tx = tx.clone();
            tokio::spawn(async move {
                let case = queries.sample(&mut rand::thread_rng()).clone();
                let outcome = match Arc::clone(&limiter).acquire_owned().await {
                    Ok(_permit) => {
                        let answer = client.match_count(&case.pattern).await;
                        verify(case, answer)
                    }
                    Err(_) => WorkerOutcome::Failed(LoadError::LimiterClosed),
                };
                let _ = tx.send(outcome);
            });
        }
        drop(tx);

        let mut report = BatchReport {
            workers: worker_count,
            ..Default::default()
        };
        let mut first_error = None;
        let mut received = 0;
        while let Some(outcome) = rx.recv().await {
            received += 1;
            match outcome {
                WorkerOutcome::Matched => report.matched += 1,
                WorkerOutcome::Mismatched => report.mismatched += 1,
                WorkerOutcome::Failed(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        report.elapsed = started.elapsed();

        if let Some(e) = first_error {
            return Err(e);
        }
        if received < worker_count {
            return Err(LoadError::WorkersLost {
                missing: worker_count - received,
                workers: worker_count,
            });
        }
        Ok(report)
    }

    /// Run `worker_count`-sized batches on a fixed-interval timer.
    ///
    /// `rounds == 0` runs forever. A failed round is logged and the loop
    /// carries on. A batch that outlasts the interval delays the next tick
    /// rather than bunching ticks up. A zero interval is rejected.
    pub async fn run_rounds(
        &self,
        worker_count: usize,
        rounds: u64,
        interval: Duration,
    ) -> LoadResult<RoundsSummary> {
        if interval.is_zero() {
            return Err(ConfigError::Invalid {
                field: "interval_ms",
                reason: "must be positive".into(),
            }
            .into());
        }
        info!(
            workers = worker_count,
            concurrency = self.concurrency_limit,
            rounds,
            "starting load driver (0 rounds is unbounded)"
        );
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut summary = RoundsSummary::default();
        while rounds == 0 || summary.rounds < rounds {
            ticker.tick().await;
            let round = summary.rounds;
            debug!(round, "simulating client requests");
            match self.run(worker_count).await {
                Ok(report) => {
                    summary.mismatched += report.mismatched as u64;
                    info!(
                        round,
                        requests = report.workers,
                        mismatched = report.mismatched,
                        elapsed_ms = report.elapsed.as_millis() as u64,
                        "round complete"
                    );
                }
                Err(e) => {
                    summary.failed_rounds += 1;
                    warn!(round, error = %e, "aborted round with error");
                }
            }
            summary.requests += worker_count as u64;
            summary.rounds += 1;
        }
        Ok(summary)
    }
}

fn verify(case: QueryCase, answer: ProtocolResult<MatchCount>) -> WorkerOutcome {
    match answer {
        Ok(observed) if case.matches(observed) => {
            debug!(query = %case.pattern, matched = observed.get(), "query verified");
            WorkerOutcome::Matched
        }
        Ok(observed) => {
            warn!(
                query = %case.pattern,
                expected = case.expected.get(),
                matched = observed.get(),
                "query count mismatch"
            );
            WorkerOutcome::Mismatched
        }
        Err(source) => WorkerOutcome::Failed(LoadError::Query {
            query: case.pattern,
            source,
        }),
    }
}

impl<C> std::fmt::Debug for LoadDriver<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadDriver")
            .field("concurrency_limit", &self.concurrency_limit)
            .field("queries", &self.queries.len())
            .finish()
    }
}
