//! Input debouncing
//!
//! Coalesces a rapidly changing value into a single emission once the input has
//! been quiet for the configured delay. Each push restarts the timer, so a pending
//! value that is superseded before its deadline is never emitted.

use tokio::time::{sleep_until, Duration, Instant};

/// Debouncer for values pushed from an event loop
///
/// `settled` is cancellation safe: the pending value is only taken after the
/// deadline has elapsed, so dropping the future inside `tokio::select!` loses nothing.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    /// Creates a debouncer with the given quiet period
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Records a new value and restarts the quiet period
    pub fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.delay));
    }

    /// Drops the pending value without emitting it
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Whether a value is waiting for its quiet period to elapse
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits for the pending value's deadline and returns it
    ///
    /// Never resolves while nothing is pending; guard `select!` branches with
    /// `is_pending()`.
    pub async fn settled(&mut self) -> T {
        loop {
            match &self.pending {
                Some((_, deadline)) => {
                    sleep_until(*deadline).await;
                    if let Some((value, _)) = self.pending.take() {
                        return value;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        }
    }
}
