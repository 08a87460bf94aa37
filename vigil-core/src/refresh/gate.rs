use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use vigil_model::{
    ScanFailureKind, ScanOutcome, ScanRequest, TriggerMode,
};

use crate::refresh::{Clock, ScanDispatcher, SystemClock};
use crate::store::ports::RefreshStateRepository;

/// Outcome of one gate evaluation, reported alongside the alert listing.
#[derive(Debug, Clone)]
pub struct TriggerReport {
    pub triggered: bool,
    pub trigger_mode: Option<TriggerMode>,
    pub scan_result: Option<ScanOutcome>,
    pub now: i64,
    pub last_refresh: i64,
    pub time_since_refresh: i64,
}

/// Throttles engine scans to at most one per TTL window, however many
/// listing requests arrive.
///
/// The gate is deliberately asymmetric about store failures: a failed read
/// treats the state as stale (the listing must stay available), while a
/// failed timestamp write aborts the trigger (never dispatch a scan without
/// having recorded the attempt first). The timestamp write is a
/// compare-and-swap, so concurrent requests racing past the same TTL expiry
/// resolve to a single dispatch.
pub struct RefreshGate {
    refresh_state: Arc<dyn RefreshStateRepository>,
    dispatcher: Arc<dyn ScanDispatcher>,
    clock: Arc<dyn Clock>,
    sync_timeout: Duration,
}

impl std::fmt::Debug for RefreshGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshGate")
            .field("sync_timeout", &self.sync_timeout)
            .finish_non_exhaustive()
    }
}

impl RefreshGate {
    pub fn new(
        refresh_state: Arc<dyn RefreshStateRepository>,
        dispatcher: Arc<dyn ScanDispatcher>,
        sync_timeout: Duration,
    ) -> Self {
        Self {
            refresh_state,
            dispatcher,
            clock: Arc::new(SystemClock),
            sync_timeout,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Evaluate the TTL window and, when stale, record the attempt and
    /// dispatch a scan in the requested mode.
    ///
    /// `effective_ttl_seconds` must be non-negative; callers validate
    /// overrides before reaching the gate.
    pub async fn evaluate_and_maybe_trigger(
        &self,
        effective_ttl_seconds: i64,
        mode: TriggerMode,
    ) -> TriggerReport {
        let now = self.clock.unix_now();

        // Fail-open read: an unreachable store or missing record counts as
        // never refreshed so the listing path is never blocked by the gate.
        let last_refresh = match self.refresh_state.last_refresh().await {
            Ok(Some(ts)) => ts,
            Ok(None) => 0,
            Err(err) => {
                warn!(error = %err, "refresh state unreadable, treating as stale");
                0
            }
        };

        let time_since_refresh = now - last_refresh;

        let mut report = TriggerReport {
            triggered: false,
            trigger_mode: None,
            scan_result: None,
            now,
            last_refresh,
            time_since_refresh,
        };

        if time_since_refresh < effective_ttl_seconds {
            info!(
                time_since_refresh,
                ttl = effective_ttl_seconds,
                "trigger skipped, within TTL window"
            );
            return report;
        }

        // Fail-closed write: the attempt must be on record before anything
        // is dispatched. A lost compare-and-swap means another request owns
        // this window.
        match self.refresh_state.advance(last_refresh, now).await {
            Ok(true) => {}
            Ok(false) => {
                info!("refresh window claimed by a concurrent request");
                return report;
            }
            Err(err) => {
                warn!(error = %err, "refresh timestamp write failed, trigger aborted");
                return report;
            }
        }

        report.triggered = true;
        report.trigger_mode = Some(mode);

        let request = ScanRequest::scan_all(None, false);
        match mode {
            TriggerMode::Background => {
                let dispatcher = Arc::clone(&self.dispatcher);
                tokio::spawn(async move {
                    match dispatcher.dispatch(request).await {
                        ScanOutcome::Completed(counts) => info!(
                            created = counts.created_count,
                            skipped = counts.skipped_count,
                            processed = counts.processed_count,
                            "background scan completed"
                        ),
                        ScanOutcome::Failed(failure) => warn!(
                            error = failure.kind.as_str(),
                            message = %failure.message,
                            "background scan failed"
                        ),
                    }
                });
            }
            TriggerMode::Sync => {
                let outcome = match tokio::time::timeout(
                    self.sync_timeout,
                    self.dispatcher.dispatch(request),
                )
                .await
                {
                    Ok(outcome) => outcome,
                    Err(_) => ScanOutcome::failed(
                        ScanFailureKind::Timeout,
                        format!(
                            "scan did not complete within {}s",
                            self.sync_timeout.as_secs()
                        ),
                    ),
                };
                report.scan_result = Some(outcome);
            }
        }

        report
    }
}
