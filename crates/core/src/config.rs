// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::Duration;
use tutor_booking_domain::{CommissionRate, Timezone};

/// Read-only booking policy.
///
/// Built once at startup and passed by reference; nothing mutates it
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingConfig {
    /// How long a tutor has to respond before a pending booking expires.
    pub expired_duration: Duration,
    /// Remind the tutor this long before a pending booking expires.
    pub reminder_before_expired: Duration,
    /// Remind the student this long before an accepted session starts.
    pub reminder_before_booking_date: Duration,
    /// Open the review this long after the session starts.
    pub create_review_duration: Duration,
    /// How long after opening a review the student may edit it.
    pub max_edited_duration: Duration,
    /// Free-first-course bookings per student, per category, per local day.
    pub max_booking_free_first_course: u32,
    /// Optional cap on bookings a student may create per local day.
    pub max_booking_per_day: Option<u32>,
    /// Optional cap on a student's live bookings within one category.
    pub max_booking_per_category: Option<u32>,
    pub commission_rate: CommissionRate,
    /// Attempts at drawing a unique booking code before giving up.
    pub code_retry_limit: u32,
    pub sweep_batch_size: u32,
    /// Timezone that defines "today" and the booking code date.
    pub local_timezone: Timezone,
    /// Extra TTL on reminder idempotency keys.
    pub reminder_key_grace: Duration,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            expired_duration: Duration::hours(6),
            reminder_before_expired: Duration::hours(1),
            reminder_before_booking_date: Duration::hours(1),
            create_review_duration: Duration::hours(2),
            max_edited_duration: Duration::days(7),
            max_booking_free_first_course: 1,
            max_booking_per_day: None,
            max_booking_per_category: None,
            commission_rate: CommissionRate::DEFAULT,
            code_retry_limit: 5,
            sweep_batch_size: 100,
            local_timezone: Timezone::Wib,
            reminder_key_grace: Duration::minutes(5),
        }
    }
}

/// A policy value that would break a booking invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid booking configuration: {0}")]
pub struct ConfigError(pub String);

impl BookingConfig {
    /// Checks that durations and limits are usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` naming the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("expired duration", self.expired_duration),
            ("create review duration", self.create_review_duration),
            ("max edited duration", self.max_edited_duration),
        ];
        for (name, value) in positive {
            if value <= Duration::zero() {
                return Err(ConfigError(format!("{name} must be positive")));
            }
        }
        if self.reminder_before_expired < Duration::zero()
            || self.reminder_before_booking_date < Duration::zero()
        {
            return Err(ConfigError(String::from(
                "reminder lead times must not be negative",
            )));
        }
        if self.code_retry_limit == 0 {
            return Err(ConfigError(String::from(
                "code retry limit must be at least 1",
            )));
        }
        if self.sweep_batch_size == 0 {
            return Err(ConfigError(String::from(
                "sweep batch size must be at least 1",
            )));
        }
        Ok(())
    }
}
