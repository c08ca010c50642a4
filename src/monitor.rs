//! Resolver monitoring - timing and failure logging around operations

use std::future::Future;
use std::time::Instant;

use tracing::Instrument;

use crate::Result;

/// Run a read operation inside a span, logging its duration and any failure.
///
/// Errors are logged with their full debug form and returned unchanged.
pub async fn monitored<T, F>(operation: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let span = tracing::info_span!("operation", name = operation);
    let started = Instant::now();
    let result = fut.instrument(span).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match &result {
        Ok(_) => tracing::debug!(operation, elapsed_ms, "completed"),
        Err(err) => tracing::error!(operation, elapsed_ms, error = ?err, "{} failed: {}", operation, err),
    }
    result
}

/// Like `monitored`, and records every mutation applied against `key`.
pub async fn audited<T, F>(operation: &'static str, key: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let result = monitored(operation, fut).await;
    if result.is_ok() {
        tracing::info!(operation, key, "mutation applied");
    }
    result
}
