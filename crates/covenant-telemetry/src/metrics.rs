//! Call metrics.
//!
//! Recorded through the `metrics` facade; installing an exporter is left to
//! the application.
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `covenant_client_calls_total` | Counter | `contract`, `operation`, `status` |
//! | `covenant_client_call_duration_seconds` | Histogram | `contract`, `operation` |

use metrics::{counter, histogram};
use std::time::Duration;

/// Counter of executed calls.
pub const CALLS_TOTAL: &str = "covenant_client_calls_total";

/// Histogram of call durations.
pub const CALL_DURATION_SECONDS: &str = "covenant_client_call_duration_seconds";

/// Records one executed call.
///
/// `status` is the snake_case outcome status.
pub fn record_call(contract: &str, operation: &str, status: &str, duration: Duration) {
    counter!(
        CALLS_TOTAL,
        "contract" => contract.to_string(),
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        CALL_DURATION_SECONDS,
        "contract" => contract.to_string(),
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}
