// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The booking aggregate and its human-readable code.

use crate::booking_status::BookingStatus;
use crate::error::DomainError;
use crate::money::Money;
use crate::types::{BookingId, CategoryId, ClassType, CourseId, StudentId, Timezone, TutorId, UserId};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const CODE_PREFIX: &str = "BK";
const CODE_DATE_LEN: usize = 8;

/// Number of random characters after the date in a booking code.
pub const CODE_SUFFIX_LEN: usize = 5;

/// Alphabet the random code suffix is drawn from.
pub const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Human-facing booking code of the form `BK<YYYYMMDD><5 x [A-Z0-9]>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BookingCode(String);

impl BookingCode {
    /// Builds a code from its issue date and random suffix.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBookingCode` if the suffix is not five
    /// characters from `[A-Z0-9]`.
    pub fn new(issued_on: NaiveDate, suffix: &str) -> Result<Self, DomainError> {
        Self::parse(&format!("{CODE_PREFIX}{}{suffix}", issued_on.format("%Y%m%d")))
    }

    /// Validates an existing code against `^BK\d{8}[A-Z0-9]{5}$`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBookingCode` on any mismatch.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::InvalidBookingCode(s.to_string());
        let rest = s.strip_prefix(CODE_PREFIX).ok_or_else(invalid)?;
        if rest.len() != CODE_DATE_LEN + CODE_SUFFIX_LEN || !rest.is_ascii() {
            return Err(invalid());
        }
        let (date, suffix) = rest.split_at(CODE_DATE_LEN);
        if !date.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if !suffix.bytes().all(|b| CODE_ALPHABET.contains(&b)) {
            return Err(invalid());
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for BookingCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BookingCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BookingCode> for String {
    fn from(value: BookingCode) -> Self {
        value.0
    }
}

impl std::fmt::Display for BookingCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Geographic point for offline sessions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Accepts a coordinate pair only when both parts are present and non-zero.
    #[must_use]
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude))
                if latitude != 0.0 && longitude != 0.0 && latitude.is_finite() && longitude.is_finite() =>
            {
                Some(Self {
                    latitude,
                    longitude,
                })
            }
            _ => None,
        }
    }
}

/// A student's request to take a course at a given local date and time.
///
/// `status` is the persisted value. Readers must go through
/// [`Booking::effective_status`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub code: BookingCode,
    pub course_id: CourseId,
    pub tutor_id: TutorId,
    pub student_id: StudentId,
    pub category_id: CategoryId,
    pub class_type: ClassType,
    pub booking_date: NaiveDate,
    pub booking_time: NaiveTime,
    pub timezone: Timezone,
    /// Absolute start of the session, derived from date, time and timezone.
    pub session_starts_at: DateTime<Utc>,
    pub location: Option<Coordinates>,
    pub notes_for_tutor: Option<String>,
    pub notes_for_student: Option<String>,
    pub is_free_first_course: bool,
    /// Course price captured at admission; zero for free bookings.
    pub gross_amount: Money,
    pub status: BookingStatus,
    pub is_reviewed: bool,
    pub expired_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_by: UserId,
    pub updated_by: Option<UserId>,
    pub deleted_by: Option<UserId>,
}

impl Booking {
    #[must_use]
    pub fn effective_status(&self, now: DateTime<Utc>) -> BookingStatus {
        self.status.effective(self.expired_at, now)
    }

    /// Returns true when the booking still occupies its slot at `now`.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.deleted_at.is_none() && self.effective_status(now).holds_slot()
    }

    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Checks that the tutor may still accept or decline this booking.
    ///
    /// # Errors
    ///
    /// Returns `BookingNotPending` when the persisted status is terminal and
    /// `BookingExpired` once the deadline has passed.
    pub fn ensure_respondable(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status != BookingStatus::Pending {
            return Err(DomainError::BookingNotPending {
                status: self.status,
            });
        }
        if now > self.expired_at {
            return Err(DomainError::BookingExpired {
                expired_at: self.expired_at,
            });
        }
        Ok(())
    }

    /// Checks that the scheduler may materialise expiry for this booking.
    ///
    /// # Errors
    ///
    /// Returns `BookingNotPending` for terminal bookings and
    /// `BookingNotYetExpired` while the deadline is still ahead.
    pub fn ensure_expirable(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status != BookingStatus::Pending {
            return Err(DomainError::BookingNotPending {
                status: self.status,
            });
        }
        if now <= self.expired_at {
            return Err(DomainError::BookingNotYetExpired {
                expired_at: self.expired_at,
            });
        }
        Ok(())
    }
}
