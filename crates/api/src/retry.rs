// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bounded retry of whole units of work on lock contention.

use std::time::Duration;
use tracing::warn;

use crate::error::ApiError;

/// Attempts per unit of work, the first one included.
pub const MAX_ATTEMPTS: u32 = 4;

const BASE_DELAY_MS: u64 = 20;

/// An error that can say whether repeating the operation may succeed.
pub trait Retryable {
    fn is_transient(&self) -> bool;
}

impl Retryable for ApiError {
    fn is_transient(&self) -> bool {
        Self::is_transient(self)
    }
}

/// Exponential backoff with jitter for attempt `attempt` (1-based).
fn backoff(attempt: u32) -> Duration {
    let exp = BASE_DELAY_MS.saturating_mul(1_u64 << attempt.saturating_sub(1).min(6));
    let jitter = rand::random::<u64>() % BASE_DELAY_MS;
    Duration::from_millis(exp + jitter)
}

/// Runs `f` until it succeeds, fails permanently, or `MAX_ATTEMPTS` is
/// exhausted.
///
/// # Errors
///
/// Returns the last error of `f`.
pub fn with_retry<T, E, F>(operation: &str, mut f: F) -> Result<T, E>
where
    E: Retryable + std::fmt::Display,
    F: FnMut() -> Result<T, E>,
{
    let mut attempt: u32 = 1;
    loop {
        match f() {
            Err(err) if err.is_transient() && attempt < MAX_ATTEMPTS => {
                let delay = backoff(attempt);
                warn!(
                    operation,
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "Store busy, retrying"
                );
                std::thread::sleep(delay);
                attempt += 1;
            }
            outcome => return outcome,
        }
    }
}
