//! Admin dashboard loading.
//!
//! Stats requests are never cancelled. If one is still running after
//! [`SLOW_RESPONSE_AFTER`], a warning is emitted and the load keeps waiting.

use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use i1fashion_core::DashboardStats;
use tracing::warn;

use crate::api::{ApiClient, ApiError};

/// When a dashboard load starts counting as slow.
pub const SLOW_RESPONSE_AFTER: Duration = Duration::from_secs(8);

/// A finished dashboard load.
#[derive(Debug)]
pub struct DashboardLoad<T> {
    pub result: T,
    /// Whether the slow-response warning fired before the result arrived.
    pub was_slow: bool,
}

/// Await `request`, warning once if it outlives `slow_after`.
pub async fn await_with_slow_warning<F: Future>(
    request: F,
    slow_after: Duration,
) -> DashboardLoad<F::Output> {
    let mut request = pin!(request);
    tokio::select! {
        result = &mut request => DashboardLoad { result, was_slow: false },
        () = tokio::time::sleep(slow_after) => {
            warn!(
                after_secs = slow_after.as_secs(),
                "Dashboard is responding slowly, still waiting"
            );
            DashboardLoad { result: request.await, was_slow: true }
        }
    }
}

/// Load dashboard stats through `client`.
pub async fn load_stats(client: &ApiClient) -> DashboardLoad<Result<DashboardStats, ApiError>> {
    await_with_slow_warning(client.fetch_stats(), SLOW_RESPONSE_AFTER).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fast_response_is_not_slow() {
        let load = await_with_slow_warning(
            async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                42
            },
            SLOW_RESPONSE_AFTER,
        )
        .await;

        assert_eq!(load.result, 42);
        assert!(!load.was_slow);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_response_still_completes() {
        let started = tokio::time::Instant::now();
        let load = await_with_slow_warning(
            async {
                tokio::time::sleep(Duration::from_secs(20)).await;
                "stats"
            },
            SLOW_RESPONSE_AFTER,
        )
        .await;

        assert_eq!(load.result, "stats");
        assert!(load.was_slow);
        assert!(started.elapsed() >= Duration::from_secs(20));
    }
}
