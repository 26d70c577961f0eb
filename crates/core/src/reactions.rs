// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Time windows for the periodic reaction jobs.

use crate::admission::add_duration;
use crate::config::BookingConfig;
use chrono::{DateTime, Duration, Utc};
use tutor_booking_domain::DomainError;

/// A closed instant range `[from, to]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl Window {
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from <= at && at <= self.to
    }
}

/// Pending bookings whose deadline falls in this window get a reminder.
///
/// # Errors
///
/// Returns an error if the window end is unrepresentable.
pub fn pending_expiry_window(
    now: DateTime<Utc>,
    config: &BookingConfig,
) -> Result<Window, DomainError> {
    Ok(Window {
        from: now,
        to: add_duration(
            now,
            config.reminder_before_expired,
            "computing expiry reminder window",
        )?,
    })
}

/// Accepted sessions starting in this window get a reminder.
///
/// # Errors
///
/// Returns an error if the window end is unrepresentable.
pub fn session_reminder_window(
    now: DateTime<Utc>,
    config: &BookingConfig,
) -> Result<Window, DomainError> {
    Ok(Window {
        from: now,
        to: add_duration(
            now,
            config.reminder_before_booking_date,
            "computing session reminder window",
        )?,
    })
}

/// Sessions that started at or before this instant are ready for review.
///
/// # Errors
///
/// Returns an error if the cutoff is unrepresentable.
pub fn review_open_cutoff(
    now: DateTime<Utc>,
    config: &BookingConfig,
) -> Result<DateTime<Utc>, DomainError> {
    now.checked_sub_signed(config.create_review_duration)
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: String::from("computing review open cutoff"),
        })
}

/// Lifetime of a reminder idempotency key: until `target` plus `grace`.
///
/// Never shorter than `grace`, so a key set right at the deadline still
/// covers the next tick.
#[must_use]
pub fn reminder_key_ttl(target: DateTime<Utc>, now: DateTime<Utc>, grace: Duration) -> Duration {
    let remaining = target.signed_duration_since(now);
    if remaining > Duration::zero() {
        remaining + grace
    } else {
        grace
    }
}
