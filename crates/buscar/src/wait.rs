//! Bounded polling for eventually-consistent lookups.
//!
//! The engine re-runs a probe until it reports [`Probe::Ready`] or the
//! timeout elapses. A failed attempt is an ordinary value
//! ([`Probe::NotYet`]), not an unwound panic; the last failure is what the
//! caller sees when time runs out.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::result::{BuscarError, BuscarResult};

/// Default timeout for retrying lookups (1 second)
pub const DEFAULT_FIND_TIMEOUT_MS: u64 = 1000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Options for retrying lookups
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_FIND_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Outcome of a single polling attempt
#[derive(Debug)]
pub enum Probe<T> {
    /// The lookup produced a definitive value
    Ready(T),
    /// The lookup is not satisfied yet; carries the would-be error
    NotYet(BuscarError),
}

impl<T> Probe<T> {
    /// Check whether the attempt succeeded
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Check whether the attempt is still pending
    #[must_use]
    pub const fn is_not_yet(&self) -> bool {
        matches!(self, Self::NotYet(_))
    }
}

impl<T> From<BuscarResult<T>> for Probe<T> {
    fn from(result: BuscarResult<T>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(err) => Self::NotYet(err),
        }
    }
}

/// Re-run `probe` until it is ready or `options.timeout_ms` elapses.
///
/// On timeout, the error from the LAST attempt propagates unchanged; a
/// dedicated [`BuscarError::Timeout`] is returned only if no attempt ever
/// reported one.
pub fn wait_for<T>(
    mut probe: impl FnMut() -> Probe<T>,
    options: &WaitOptions,
) -> BuscarResult<T> {
    let start = Instant::now();
    let mut attempts: u32 = 0;
    let mut last_error: Option<BuscarError> = None;

    loop {
        attempts += 1;
        match probe() {
            Probe::Ready(value) => {
                debug!(attempts, "lookup satisfied");
                return Ok(value);
            }
            Probe::NotYet(err) => {
                last_error = Some(err);
            }
        }

        if start.elapsed() >= options.timeout() {
            debug!(attempts, "lookup timed out");
            return Err(last_error.unwrap_or(BuscarError::Timeout {
                ms: options.timeout_ms,
            }));
        }

        std::thread::sleep(options.poll_interval());
    }
}
