// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary of the tutor booking lifecycle.
//!
//! Handlers authenticate the asserted actor, authorize the action, and run
//! the core transitions against the store inside one transaction each.
//! Domain, core and persistence errors are translated explicitly into
//! [`ApiError`]; nothing below this crate leaks to callers.
//!
//! The [`ReactionScheduler`] drives the time-based side of the lifecycle:
//! reminders, expiry of unanswered bookings and opening of reviews.

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

mod auth;
mod env;
mod error;
mod handlers;
mod request_response;
mod retry;
mod scheduler;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthorizationService, Role, authenticate};
pub use env::BookingEnv;
pub use error::{
    ApiError, AuthError, translate_admission_rejection, translate_core_error,
    translate_domain_error, translate_persistence_error,
};
pub use handlers::{
    accept_booking, approve_withdrawal, create_booking, create_report, decline_booking,
    delete_booking, get_balance, get_booking, get_review, list_booking_history,
    list_notifications, list_student_bookings, list_tutor_bookings, list_withdrawals,
    mark_notification_read, reject_withdrawal, request_withdrawal, resolve_report,
    submit_review, verify_tutor_ledger,
};
pub use request_response::{
    BalanceResponse, BookingHistoryResponse, BookingInfo, CreateBookingRequest,
    CreateReportRequest, CreateWithdrawalRequest, DecideWithdrawalRequest, DeleteBookingResponse,
    ListBookingsResponse, ListNotificationsResponse, ListWithdrawalsResponse,
    NotificationResponse, ReportResponse, ResolveReportRequest, RespondBookingRequest,
    RespondBookingResponse, ReviewResponse, StatusHistoryInfo, SubmitReviewRequest,
    WithdrawalResponse,
};
pub use retry::{MAX_ATTEMPTS, Retryable, with_retry};
pub use scheduler::{Job, JobReport, ReactionScheduler, SweepReport};
