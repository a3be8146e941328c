//! Core environment context trait for LiveTrack sessions.

use async_trait::async_trait;
use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// The central interface for environment interaction.
///
/// Abstracts the clock and task spawning so the engine can run against the
/// real world or a fixed clock in tests.
///
/// # Implementations
///
/// - **Production**: `TokioContext` — wraps `tokio::time` and the OS clock
/// - **Tests**: fixed-clock contexts defined next to the tests that need them
#[async_trait]
pub trait ViewerContext: Send + Sync + 'static {
    /// Returns the monotonic time since context creation.
    ///
    /// Used for internal timers and duration measurements.
    fn now(&self) -> Duration;

    /// Returns the wall-clock time.
    ///
    /// Fix timestamps are epoch milliseconds stamped by the publisher;
    /// age display compares them against this clock.
    fn system_time(&self) -> SystemTime;

    /// Wall-clock time as epoch milliseconds.
    ///
    /// Convenience for fix-age math; a pre-epoch clock collapses to 0.
    fn now_ms(&self) -> i64 {
        self.system_time()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }

    /// Suspends execution for the given duration.
    async fn sleep(&self, duration: Duration);

    /// Spawns a background task.
    fn spawn<F>(&self, name: &str, future: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
