//! The refresh gate: decides, per listing request, whether enough time has
//! elapsed since the last engine scan to justify triggering a new one.

pub mod gate;

use async_trait::async_trait;
use chrono::Utc;

use vigil_model::{ScanOutcome, ScanRequest};

pub use gate::{RefreshGate, TriggerReport};

/// Time source, injectable so gate behavior is testable at fixed instants.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    /// Current unix time in seconds.
    fn unix_now(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// The gate's view of the scan client. Dispatch is infallible at the type
/// level: failures arrive as tagged outcomes, never as errors that could
/// unwind the listing request.
#[async_trait]
pub trait ScanDispatcher: Send + Sync {
    async fn dispatch(&self, request: ScanRequest) -> ScanOutcome;
}
