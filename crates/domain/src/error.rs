// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::booking::Booking;
use crate::booking_status::BookingStatus;
use crate::ledger::WithdrawalStatus;
use crate::money::Money;
use crate::report::ReportStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable error kinds carried on the wire.
///
/// Clients switch on these values, so the string forms never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    StudentAlreadyHasAnotherSchedule,
    MaxBookingFreeFirstCourse,
    MaxBookingPerDay,
    MaxBookingPerCategory,
    BookingAlreadyExists,
    InsufficientBalance,
    Unauthorized,
    Forbidden,
    Conflict,
    Internal,
}

impl ErrorKind {
    /// Returns the wire representation of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "BadRequest",
            Self::NotFound => "NotFound",
            Self::StudentAlreadyHasAnotherSchedule => "StudentAlreadyHasAnotherSchedule",
            Self::MaxBookingFreeFirstCourse => "MaxBookingFreeFirstCourse",
            Self::MaxBookingPerDay => "MaxBookingPerDay",
            Self::MaxBookingPerCategory => "MaxBookingPerCategory",
            Self::BookingAlreadyExists => "BookingAlreadyExists",
            Self::InsufficientBalance => "InsufficientBalance",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::Conflict => "Conflict",
            Self::Internal => "Internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors raised by domain validation and business rules.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// A referenced entity does not exist or is not visible.
    #[error("{entity} not found")]
    NotFound {
        /// Entity name, e.g. `course` or `schedule`.
        entity: &'static str,
    },

    #[error("invalid {entity} id: {value}")]
    InvalidId { entity: &'static str, value: String },

    #[error("invalid class type: {0}")]
    InvalidClassType(String),

    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("invalid day of week: {0}, must be between 1 and 7")]
    InvalidDayOfWeek(u8),

    #[error("invalid date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    #[error("invalid time '{value}': {reason}")]
    InvalidTime { value: String, reason: String },

    #[error("invalid {entity} status: {value}")]
    InvalidStatus { entity: &'static str, value: String },

    #[error("invalid booking code: {0}")]
    InvalidBookingCode(String),

    #[error("offline class requires non-zero latitude and longitude")]
    OfflineRequiresCoordinates,

    #[error("date arithmetic overflow while {operation}")]
    DateArithmeticOverflow { operation: String },

    /// The student already holds a live booking at the same slot.
    #[error("student already has another schedule at this time")]
    StudentAlreadyHasAnotherSchedule { conflicting: Box<Booking> },

    /// The free-first-course quota for today is used up.
    #[error("maximum of {limit} free first course booking(s) per day reached")]
    MaxBookingFreeFirstCourse {
        limit: u32,
        earliest: Option<Box<Booking>>,
    },

    #[error("maximum of {limit} booking(s) per day reached")]
    MaxBookingPerDay { limit: u32 },

    #[error("maximum of {limit} booking(s) per category reached")]
    MaxBookingPerCategory { limit: u32 },

    /// The booking already left `pending`.
    #[error("booking is already {status}")]
    BookingNotPending { status: BookingStatus },

    #[error("booking expired")]
    BookingExpired { expired_at: DateTime<Utc> },

    #[error("booking has not expired yet")]
    BookingNotYetExpired { expired_at: DateTime<Utc> },

    #[error("invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("only the course tutor can respond to this booking")]
    NotBookingTutor,

    #[error("only the booking student can perform this action")]
    NotBookingStudent,

    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance { available: Money, requested: Money },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid bank details: {0}")]
    InvalidBankDetails(String),

    #[error("withdrawal is already {status}")]
    WithdrawalNotPending { status: WithdrawalStatus },

    #[error("invalid rate: {0}, must be between 1 and 5")]
    InvalidRate(i64),

    #[error("review must not be empty")]
    EmptyReview,

    #[error("cannot edit review")]
    ReviewEditWindowClosed,

    #[error("review cannot be opened: {reason}")]
    ReviewNotOpenable { reason: &'static str },

    #[error("review belongs to another student")]
    NotReviewOwner,

    #[error("booking already has a report")]
    ReportAlreadyExists,

    #[error("only accepted bookings can be reported")]
    ReportRequiresAcceptedBooking,

    #[error("report {field} must not be empty")]
    EmptyReportField { field: &'static str },

    #[error("report is already {status}")]
    ReportNotPending { status: ReportStatus },

    #[error("commission rate {0} bps exceeds 10000")]
    InvalidCommissionRate(u32),
}

impl DomainError {
    /// Maps this error to its wire kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::StudentAlreadyHasAnotherSchedule { .. } => {
                ErrorKind::StudentAlreadyHasAnotherSchedule
            }
            Self::MaxBookingFreeFirstCourse { .. } => ErrorKind::MaxBookingFreeFirstCourse,
            Self::MaxBookingPerDay { .. } => ErrorKind::MaxBookingPerDay,
            Self::MaxBookingPerCategory { .. } => ErrorKind::MaxBookingPerCategory,
            Self::BookingNotPending { .. } => ErrorKind::BookingAlreadyExists,
            Self::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            Self::NotBookingTutor | Self::NotBookingStudent | Self::NotReviewOwner => {
                ErrorKind::Forbidden
            }
            Self::ReportAlreadyExists => ErrorKind::Conflict,
            Self::InvalidId { .. }
            | Self::InvalidClassType(_)
            | Self::InvalidTimezone(_)
            | Self::InvalidDayOfWeek(_)
            | Self::InvalidDate { .. }
            | Self::InvalidTime { .. }
            | Self::InvalidStatus { .. }
            | Self::InvalidBookingCode(_)
            | Self::OfflineRequiresCoordinates
            | Self::DateArithmeticOverflow { .. }
            | Self::BookingExpired { .. }
            | Self::BookingNotYetExpired { .. }
            | Self::InvalidStatusTransition { .. }
            | Self::InvalidAmount(_)
            | Self::InvalidBankDetails(_)
            | Self::WithdrawalNotPending { .. }
            | Self::InvalidRate(_)
            | Self::EmptyReview
            | Self::ReviewEditWindowClosed
            | Self::ReviewNotOpenable { .. }
            | Self::ReportRequiresAcceptedBooking
            | Self::EmptyReportField { .. }
            | Self::ReportNotPending { .. }
            | Self::InvalidCommissionRate(_) => ErrorKind::BadRequest,
        }
    }

    /// Returns the booking attached to an admission rejection, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&Booking> {
        match self {
            Self::StudentAlreadyHasAnotherSchedule { conflicting } => Some(conflicting),
            Self::MaxBookingFreeFirstCourse { earliest, .. } => earliest.as_deref(),
            _ => None,
        }
    }
}
