//! Session counters
//!
//! - `session_refresh_total` (counter): label `outcome`
//! - `session_retries_total` (counter)
//! - `session_credentials_captured_total` (counter): label `operation`
//!
//! Without an installed recorder these calls are no-ops.

use crate::refresh::RefreshOutcome;

pub fn record_refresh(outcome: RefreshOutcome) {
    metrics::counter!("session_refresh_total", "outcome" => outcome.label()).increment(1);
}

pub fn record_retry() {
    metrics::counter!("session_retries_total").increment(1);
}

pub fn record_capture(operation: &'static str) {
    metrics::counter!("session_credentials_captured_total", "operation" => operation)
        .increment(1);
}
