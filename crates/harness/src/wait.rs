//! Condition-based waiting with a hard deadline
//!
//! UI state changes (navigation settling, list re-sorting) are awaited by
//! polling an observable condition, never by a fixed sleep.

use std::time::{Duration, Instant};

use tokio::time::sleep;

use crate::error::{HarnessError, HarnessResult};

/// Interval between condition probes.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Tracks a deadline for one polling loop.
///
/// ```ignore
/// let waiter = Waiter::new(".shopping_cart_badge", timeout);
/// loop {
///     if probe().await? {
///         break;
///     }
///     waiter.tick().await?;
/// }
/// ```
pub struct Waiter {
    what: String,
    deadline: Instant,
}

impl Waiter {
    pub fn new(what: impl Into<String>, timeout: Duration) -> Self {
        Self { what: what.into(), deadline: Instant::now() + timeout }
    }

    /// Sleep one poll interval, or fail with a timeout once the deadline
    /// has passed.
    pub async fn tick(&self) -> HarnessResult<()> {
        if Instant::now() >= self.deadline {
            return Err(HarnessError::Timeout(self.what.clone()));
        }
        sleep(POLL_INTERVAL).await;
        Ok(())
    }
}
