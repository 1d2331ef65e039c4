//! services/catalog/src/cancel.rs
//!
//! Ties port calls to a caller-supplied `CancellationToken`.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use vocab_core::ports::{PortError, PortResult};

/// Runs `fut` unless `cancel` fires first, in which case the in-flight work is
/// dropped and `PortError::Cancelled` is returned.
pub async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> PortResult<T>
where
    F: Future<Output = PortResult<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PortError::Cancelled),
        result = fut => result,
    }
}
