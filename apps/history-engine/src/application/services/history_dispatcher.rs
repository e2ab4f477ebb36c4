//! History Dispatcher Service
//!
//! Accepts history queries without blocking the caller and serves them on
//! a fixed pool of worker tasks fed by a bounded queue. Every accepted or
//! rejected call produces exactly one `HistoryEvent`.
//!
//! # Flow
//!
//! ```text
//! query_history ──► bounded queue ──► worker ──► contract lookup
//!                                                   │
//!                        history_data? ─── yes ──► gateway port
//!                                      └── no ───► vendor adapter (lazy init)
//!                                                   │
//!                                      event bus ◄──┘
//! ```

use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::application::ports::{
    ContractDirectoryPort, EventBusPort, GatewayHistoryPort, VendorAdapter,
};
use crate::domain::market_history::{
    HistoryError, HistoryEvent, HistoryOutcome, HistoryRequest, Interval, RequestId, into_series,
};
use crate::infrastructure::metrics::{self, QueryPath};

/// Worker pool settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherSettings {
    /// Number of worker tasks.
    pub workers: usize,
    /// Jobs that may wait for a worker before calls are rejected.
    pub queue_capacity: usize,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 256,
        }
    }
}

/// A dispatched query waiting for a worker.
#[derive(Debug, Clone)]
struct HistoryJob {
    request_id: RequestId,
    instrument_id: String,
    interval: Interval,
    start: NaiveDate,
    end: NaiveDate,
}

impl HistoryJob {
    fn into_event(self, request: Option<HistoryRequest>, outcome: HistoryOutcome) -> HistoryEvent {
        HistoryEvent {
            request_id: self.request_id,
            instrument_id: self.instrument_id,
            interval: self.interval,
            start: self.start,
            end: self.end,
            request,
            outcome,
            completed_at: Utc::now(),
        }
    }
}

/// Collaborators shared by all workers.
struct DispatchContext {
    contracts: Arc<dyn ContractDirectoryPort>,
    gateway: Arc<dyn GatewayHistoryPort>,
    adapter: Arc<dyn VendorAdapter>,
    events: Arc<dyn EventBusPort>,
}

impl DispatchContext {
    /// Serve one job and build its result.
    async fn execute(&self, job: &HistoryJob) -> (Option<HistoryRequest>, HistoryOutcome) {
        let started = Instant::now();

        let Some(contract) = self.contracts.get_contract(&job.instrument_id) else {
            metrics::record_query(QueryPath::Unresolved);
            return (
                None,
                Err(HistoryError::UnknownInstrument {
                    instrument_id: job.instrument_id.clone(),
                }),
            );
        };

        let req = HistoryRequest::new(
            contract.symbol.clone(),
            contract.exchange,
            job.interval,
            job.start,
            job.end,
        );

        let (path, source, outcome) = if contract.history_data {
            let outcome = self
                .gateway
                .query_history(&req, &contract.gateway_name)
                .await
                .map(into_series)
                .map_err(|e| HistoryError::Gateway {
                    gateway: contract.gateway_name.clone(),
                    message: e.to_string(),
                });
            (QueryPath::Gateway, contract.gateway_name.as_str(), outcome)
        } else {
            (
                QueryPath::Vendor,
                self.adapter.vendor().tag(),
                self.query_vendor(&req).await,
            )
        };

        metrics::record_query(path);
        metrics::record_query_duration(path, started.elapsed());
        if let Ok(bars) = &outcome {
            metrics::record_bars_delivered(source, bars.len());
        }
        (Some(req), outcome)
    }

    async fn query_vendor(&self, req: &HistoryRequest) -> HistoryOutcome {
        if !self.adapter.is_initialized() {
            self.adapter.init(None).await?;
        }
        self.adapter.query_history(req).await.map(into_series)
    }

    fn publish(&self, event: HistoryEvent) {
        match &event.outcome {
            Ok(bars) => tracing::info!(
                request_id = %event.request_id,
                instrument_id = %event.instrument_id,
                interval = %event.interval,
                bars = bars.len(),
                "history query completed"
            ),
            Err(err) => {
                metrics::record_query_failure(err.reason_code());
                tracing::warn!(
                    request_id = %event.request_id,
                    instrument_id = %event.instrument_id,
                    interval = %event.interval,
                    reason = err.reason_code(),
                    error = %err,
                    "history query failed"
                );
            }
        }

        if let Err(e) = self.events.publish(event) {
            tracing::debug!(error = %e, "history result not delivered");
        }
    }
}

/// Fire-and-forget history query service.
///
/// Must be created inside a tokio runtime; the workers start immediately.
pub struct HistoryDispatcher {
    context: Arc<DispatchContext>,
    sender: Mutex<Option<mpsc::Sender<HistoryJob>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    settings: DispatcherSettings,
}

impl HistoryDispatcher {
    /// Create the dispatcher and start its workers.
    ///
    /// Zero workers or capacity are raised to one.
    #[must_use]
    pub fn new(
        contracts: Arc<dyn ContractDirectoryPort>,
        gateway: Arc<dyn GatewayHistoryPort>,
        adapter: Arc<dyn VendorAdapter>,
        events: Arc<dyn EventBusPort>,
        settings: DispatcherSettings,
    ) -> Self {
        let settings = DispatcherSettings {
            workers: settings.workers.max(1),
            queue_capacity: settings.queue_capacity.max(1),
        };
        let context = Arc::new(DispatchContext {
            contracts,
            gateway,
            adapter,
            events,
        });

        let (tx, rx) = mpsc::channel(settings.queue_capacity);
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let workers = (0..settings.workers)
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    Arc::clone(&rx),
                    Arc::clone(&context),
                ))
            })
            .collect();

        tracing::info!(
            workers = settings.workers,
            queue_capacity = settings.queue_capacity,
            "history dispatcher started"
        );

        Self {
            context,
            sender: Mutex::new(Some(tx)),
            workers: Mutex::new(workers),
            settings,
        }
    }

    /// Effective pool settings.
    #[must_use]
    pub const fn settings(&self) -> DispatcherSettings {
        self.settings
    }

    /// Whether the dispatcher still accepts queries.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.sender.lock().is_some()
    }

    /// Dispatch a history query and return immediately.
    ///
    /// The result arrives as one `HistoryEvent` carrying the returned id.
    /// When the queue is full a `QueueFull` failure is published instead.
    pub fn query_history(
        &self,
        instrument_id: &str,
        interval: Interval,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RequestId {
        let request_id = RequestId::generate();
        let job = HistoryJob {
            request_id: request_id.clone(),
            instrument_id: instrument_id.to_string(),
            interval,
            start,
            end,
        };
        tracing::debug!(%request_id, instrument_id, %interval, %start, %end, "history query dispatched");

        let sender = self.sender.lock().clone();
        let rejected = match sender {
            Some(tx) => match tx.try_send(job) {
                Ok(()) => {
                    metrics::adjust_queue_depth(1.0);
                    None
                }
                Err(TrySendError::Full(job)) => Some((job, HistoryError::QueueFull)),
                Err(TrySendError::Closed(job)) => Some((job, stopped())),
            },
            None => Some((job, stopped())),
        };

        if let Some((job, err)) = rejected {
            self.context.publish(job.into_event(None, Err(err)));
        }
        request_id
    }

    /// Stop accepting queries and wait for queued jobs to finish.
    pub async fn shutdown(&self) {
        drop(self.sender.lock().take());
        let workers: Vec<_> = self.workers.lock().drain(..).collect();
        for handle in workers {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "history worker terminated abnormally");
            }
        }
        tracing::info!("history dispatcher stopped");
    }
}

impl std::fmt::Debug for HistoryDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryDispatcher")
            .field("settings", &self.settings)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

fn stopped() -> HistoryError {
    HistoryError::Internal {
        message: "dispatcher stopped".to_string(),
    }
}

async fn run_worker(
    worker_id: usize,
    queue: Arc<tokio::sync::Mutex<mpsc::Receiver<HistoryJob>>>,
    context: Arc<DispatchContext>,
) {
    tracing::debug!(worker_id, "history worker started");
    loop {
        let next = queue.lock().await.recv().await;
        let Some(job) = next else { break };
        metrics::adjust_queue_depth(-1.0);

        let task_context = Arc::clone(&context);
        let task_job = job.clone();
        let result = tokio::spawn(async move { task_context.execute(&task_job).await }).await;

        let event = match result {
            Ok((request, outcome)) => job.into_event(request, outcome),
            Err(e) => {
                tracing::error!(worker_id, request_id = %job.request_id, error = %e, "history query task aborted");
                job.into_event(
                    None,
                    Err(HistoryError::Internal {
                        message: e.to_string(),
                    }),
                )
            }
        };
        context.publish(event);
    }
    tracing::debug!(worker_id, "history worker stopped");
}
