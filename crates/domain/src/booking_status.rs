// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking status lifecycle.
//!
//! A booking starts `pending` and moves exactly once to `accepted`,
//! `declined` or `expired`. Persisted `pending` rows whose deadline has
//! passed read as `expired` even before the scheduler materialises them.

use crate::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Waiting for the tutor to respond.
    Pending,
    Accepted,
    Declined,
    /// The tutor did not respond before `expired_at`.
    Expired,
}

impl BookingStatus {
    /// Returns the string representation used for persistence and the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Expired => "expired",
        }
    }

    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            "expired" => Ok(Self::Expired),
            _ => Err(DomainError::InvalidStatus {
                entity: "booking",
                value: s.to_string(),
            }),
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Statuses that occupy the student's slot.
    #[must_use]
    pub const fn holds_slot(&self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }

    /// Derives the status a reader should see at `now`.
    #[must_use]
    pub fn effective(self, expired_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if self == Self::Pending && now > expired_at {
            Self::Expired
        } else {
            self
        }
    }

    /// Validates that the persisted status may move to `new_status`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::BookingNotPending` when the booking is already
    /// terminal, or `DomainError::InvalidStatusTransition` for a
    /// `pending -> pending` no-op.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::BookingNotPending { status: *self });
        }
        if new_status == Self::Pending {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn can_transition_to(&self, new_status: Self) -> bool {
        self.validate_transition(new_status).is_ok()
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
