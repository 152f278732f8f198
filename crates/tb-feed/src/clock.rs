//! Time source for the polling loop.
//!
//! The loop never calls `tokio::time` or `chrono::Local` directly, so tests
//! can run many cycles instantly with a fixed timestamp.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};

/// Wall clock plus sleep.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current local time, used for output timestamps.
    fn now(&self) -> DateTime<Local>;

    /// Suspend the current task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Real time via `chrono` and `tokio::time`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
