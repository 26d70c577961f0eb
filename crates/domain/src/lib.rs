// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod booking;
mod booking_status;
mod catalog;
mod error;
mod ledger;
mod money;
mod notification;
mod report;
mod review;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use booking::{Booking, BookingCode, CODE_ALPHABET, CODE_SUFFIX_LEN, Coordinates};
pub use booking_status::BookingStatus;
pub use catalog::{Course, CourseSchedule, Student, Tutor};
pub use error::{DomainError, ErrorKind};
pub use ledger::{
    BalanceTransaction, BankDetails, LedgerCheck, ReferenceType, TransactionType, TutorBalance,
    WithdrawalRequest, WithdrawalStatus, verify_ledger,
};
pub use money::{CommissionRate, CommissionSplit, Money};
pub use notification::{Notification, NotificationKind};
pub use report::{ReportBooking, ReportStatus};
pub use review::{Rating, ReviewSubmission, TutorReview};
pub use types::{
    BookingId, CategoryId, ClassType, CourseId, DayOfWeek, NotificationId, ReportId, ReviewId,
    ScheduleId, StudentId, Timezone, TransactionId, TutorId, UserId, WithdrawalId,
};
pub use validation::{
    BookingRequest, RawBookingRequest, normalize_notes, parse_booking_date, parse_booking_time,
};
