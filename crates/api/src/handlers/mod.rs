// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handlers.
//!
//! Every handler authorizes, runs its reads and writes inside one store
//! transaction, and dispatches notifications only after commit. Handlers
//! are synchronous; the server serializes access to the store.

mod bookings;
mod ledger;
mod notifications;
mod reports;
mod reviews;

pub use bookings::{
    accept_booking, create_booking, decline_booking, delete_booking, get_booking,
    list_booking_history, list_student_bookings, list_tutor_bookings,
};
pub use ledger::{
    approve_withdrawal, get_balance, list_withdrawals, reject_withdrawal, request_withdrawal,
    verify_tutor_ledger,
};
pub use notifications::{list_notifications, mark_notification_read};
pub use reports::{create_report, resolve_report};
pub use reviews::{get_review, submit_review};

use chrono::{DateTime, Utc};
use std::str::FromStr;
use tutor_booking::NotificationEvent;
use tutor_booking_domain::{
    Booking, BookingId, DomainError, ErrorKind, Student, StudentId, Tutor, TutorId, UserId,
};
use tutor_booking_persistence::{PersistenceError, Store};

use crate::error::{ApiError, translate_domain_error};

/// Parses a path identifier.
fn parse_id<T>(value: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = DomainError>,
{
    T::from_str(value).map_err(translate_domain_error)
}

fn not_found(entity: &'static str) -> ApiError {
    translate_domain_error(DomainError::NotFound { entity })
}

/// Resolves the student profile the actor acts through.
fn require_student(store: &mut Store<'_>, user_id: UserId) -> Result<Student, ApiError> {
    store
        .find_student_by_user(user_id)?
        .ok_or_else(|| not_found("student"))
}

/// Resolves the tutor profile the actor acts through.
fn require_tutor(store: &mut Store<'_>, user_id: UserId) -> Result<Tutor, ApiError> {
    store
        .find_tutor_by_user(user_id)?
        .ok_or_else(|| not_found("tutor"))
}

pub fn require_booking(
    store: &mut Store<'_>,
    booking_id: BookingId,
) -> Result<Booking, ApiError> {
    store
        .find_booking(booking_id)?
        .ok_or_else(|| not_found("booking"))
}

pub fn tutor_user(store: &mut Store<'_>, tutor_id: TutorId) -> Result<UserId, ApiError> {
    store
        .find_tutor(tutor_id)?
        .map(|tutor| tutor.user_id)
        .ok_or_else(|| not_found("tutor"))
}

pub fn student_user(
    store: &mut Store<'_>,
    student_id: StudentId,
) -> Result<UserId, ApiError> {
    store
        .find_student(student_id)?
        .map(|student| student.user_id)
        .ok_or_else(|| not_found("student"))
}

/// Stores the in-app record of every event.
pub fn record_events(
    store: &mut Store<'_>,
    events: &[NotificationEvent],
    now: DateTime<Utc>,
) -> Result<(), PersistenceError> {
    for event in events {
        store.insert_notification(&event.to_record(now))?;
    }
    Ok(())
}

/// Maps the failure of a write guarded on a previously read state.
///
/// A guard miss means a concurrent writer got there first.
fn guarded_write(err: PersistenceError, entity: &str) -> ApiError {
    match err {
        PersistenceError::NotFound(what) => ApiError::DomainRuleViolation {
            kind: ErrorKind::Conflict,
            message: format!("{entity} changed concurrently: {what}"),
            payload: None,
        },
        other => other.into(),
    }
}
