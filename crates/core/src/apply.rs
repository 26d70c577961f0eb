// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::admission::Admission;
use crate::command::Command;
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use tutor_booking_audit::{Actor, BookingStatusChange};
use tutor_booking_domain::{
    Booking, BookingCode, BookingId, BookingRequest, BookingStatus, DomainError, Money, UserId,
};

/// The new booking state plus the history record describing the change.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    pub booking: Booking,
    pub change: BookingStatusChange,
    /// Status before the change; `None` for a newly created booking.
    pub previous_status: Option<BookingStatus>,
}

/// Builds a new pending booking from an admitted request.
#[must_use]
pub fn create_booking(
    request: &BookingRequest,
    admission: &Admission,
    code: BookingCode,
    created_by: UserId,
    actor: Actor,
    now: DateTime<Utc>,
) -> TransitionResult {
    let gross_amount: Money = if admission.is_free_first_course {
        Money::ZERO
    } else {
        admission.course.price
    };

    let booking: Booking = Booking {
        id: BookingId::generate(),
        code,
        course_id: admission.course.id,
        tutor_id: admission.course.tutor_id,
        student_id: request.student_id,
        category_id: admission.course.category_id,
        class_type: request.class_type,
        booking_date: request.booking_date,
        booking_time: request.booking_time,
        timezone: request.timezone,
        session_starts_at: admission.session_starts_at,
        location: admission.location,
        notes_for_tutor: request.notes.clone(),
        notes_for_student: None,
        is_free_first_course: admission.is_free_first_course,
        gross_amount,
        status: BookingStatus::Pending,
        is_reviewed: false,
        expired_at: admission.expired_at,
        created_at: now,
        updated_at: now,
        deleted_at: None,
        created_by,
        updated_by: None,
        deleted_by: None,
    };
    let change = BookingStatusChange::created(&booking, actor);

    TransitionResult {
        booking,
        change,
        previous_status: None,
    }
}

/// Applies a status command to a booking, producing the new booking state
/// and its history record.
///
/// The input is not modified; the caller persists the result.
///
/// # Errors
///
/// Returns an error if:
/// - The booking is tombstoned
/// - The responding tutor does not own the booking
/// - The booking is no longer pending
/// - Accept or decline arrive after the deadline
/// - Expire arrives before the deadline
pub fn apply(
    booking: &Booking,
    command: Command,
    actor: Actor,
    now: DateTime<Utc>,
) -> Result<TransitionResult, CoreError> {
    if booking.is_deleted() {
        return Err(DomainError::NotFound { entity: "booking" }.into());
    }

    let previous: BookingStatus = booking.status;
    let mut next: Booking = booking.clone();
    let notes: Option<String>;

    match command {
        Command::Accept { tutor_id, notes: n } => {
            if tutor_id != booking.tutor_id {
                return Err(DomainError::NotBookingTutor.into());
            }
            booking.ensure_respondable(now)?;
            previous.validate_transition(BookingStatus::Accepted)?;
            next.status = BookingStatus::Accepted;
            next.notes_for_student.clone_from(&n);
            notes = n;
        }
        Command::Decline { tutor_id, notes: n } => {
            if tutor_id != booking.tutor_id {
                return Err(DomainError::NotBookingTutor.into());
            }
            booking.ensure_respondable(now)?;
            previous.validate_transition(BookingStatus::Declined)?;
            next.status = BookingStatus::Declined;
            next.notes_for_student.clone_from(&n);
            notes = n;
        }
        Command::Expire => {
            booking.ensure_expirable(now)?;
            previous.validate_transition(BookingStatus::Expired)?;
            next.status = BookingStatus::Expired;
            notes = None;
        }
    }

    next.updated_at = now;
    next.updated_by = actor.user_id;
    let change = BookingStatusChange::transition(&next, previous, actor, now, notes);

    Ok(TransitionResult {
        booking: next,
        change,
        previous_status: Some(previous),
    })
}
