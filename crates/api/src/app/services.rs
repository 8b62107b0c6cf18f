use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use tokio::sync::broadcast;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};

use tally_accounting::{AuditRecord, AuditSink, InMemoryAuditLog, Registry};
use tally_core::{AccountId, LedgerResult};

use crate::app::errors::ApiError;
use crate::config::ApiConfig;

/// Audit sink that stores records and broadcasts them to live subscribers.
#[derive(Debug)]
pub struct ApiAuditSink {
    log: InMemoryAuditLog,
    realtime_tx: broadcast::Sender<AuditRecord>,
}

impl ApiAuditSink {
    pub fn new(capacity: usize, realtime_tx: broadcast::Sender<AuditRecord>) -> Self {
        Self {
            log: InMemoryAuditLog::with_capacity(capacity),
            realtime_tx,
        }
    }

    pub fn log(&self) -> &InMemoryAuditLog {
        &self.log
    }
}

impl AuditSink for ApiAuditSink {
    fn record(&self, record: AuditRecord) {
        // Lossy; no subscribers (or a lagging one) never blocks the ledger.
        let _ = self.realtime_tx.send(record.clone());
        self.log.record(record);
    }
}

/// Everything a request handler needs: the registry plus the audit trail.
///
/// Constructed once at startup and shared via `Arc`; there is no global state.
#[derive(Debug)]
pub struct AppServices {
    registry: Arc<Registry>,
    audit: Arc<ApiAuditSink>,
    realtime_tx: broadcast::Sender<AuditRecord>,
    request_timeout: Duration,
}

impl AppServices {
    pub fn new(config: &ApiConfig) -> Self {
        let (realtime_tx, _realtime_rx) = broadcast::channel::<AuditRecord>(256);
        let audit = Arc::new(ApiAuditSink::new(config.audit_capacity, realtime_tx.clone()));
        let registry = Arc::new(Registry::new(audit.clone()));

        Self {
            registry,
            audit,
            realtime_tx,
            request_timeout: config.request_timeout,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Runs a ledger operation on the blocking pool and waits for its result.
    ///
    /// The response is only produced once the operation has finished, so a
    /// success acknowledgment always reflects an applied mutation. If the
    /// timeout fires first the caller gets [`ApiError::Timeout`], while the
    /// operation still runs to completion in the background.
    pub async fn run<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Registry) -> LedgerResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let registry = self.registry.clone();
        let task = tokio::task::spawn_blocking(move || op(&registry));

        match tokio::time::timeout(self.request_timeout, task).await {
            Ok(Ok(result)) => result.map_err(ApiError::from),
            Ok(Err(join_err)) => {
                tracing::error!("ledger task failed: {join_err}");
                Err(ApiError::Worker(join_err.to_string()))
            }
            Err(_) => {
                let timeout_ms = self.request_timeout.as_millis() as u64;
                tracing::warn!(timeout_ms, "ledger operation timed out");
                Err(ApiError::Timeout(self.request_timeout))
            }
        }
    }

    /// Retained audit records for one account, oldest first.
    pub fn history(&self, account_id: AccountId) -> Vec<AuditRecord> {
        self.audit.log().for_account(account_id)
    }
}

/// Live audit feed as server-sent events (event name = record kind).
pub fn audit_sse_stream(
    services: Arc<AppServices>,
    account_id: Option<AccountId>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.realtime_tx.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |msg| match msg {
        Ok(record) if account_id.is_none_or(|id| id == record.account_id) => {
            let data = serde_json::to_string(&record).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(record.kind.as_str()).data(data)))
        }
        _ => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
