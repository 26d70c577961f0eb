// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking mutations.
//!
//! Every status change writes the booking row and appends one history row.
//! Status updates are guarded on the previous persisted status, so a
//! transition computed from a stale read never overwrites a newer one.

use chrono::{DateTime, Utc};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};
use tutor_booking::TransitionResult;
use tutor_booking_audit::BookingStatusChange;
use tutor_booking_domain::{BookingId, UserId};

use crate::data_models::{BookingRow, NewStatusHistoryRow, encode_bool, encode_instant};
use crate::diesel_schema::{booking_status_history, bookings, report_bookings, tutor_reviews};
use crate::error::PersistenceError;

fn append_history(
    conn: &mut SqliteConnection,
    change: &BookingStatusChange,
) -> Result<(), PersistenceError> {
    diesel::insert_into(booking_status_history::table)
        .values(&NewStatusHistoryRow::from_change(change))
        .execute(conn)?;
    Ok(())
}

/// Inserts a newly created booking and its first history row.
///
/// # Errors
///
/// Returns `UniqueViolation` on a booking code collision or when the
/// student already holds a live booking at the slot, or another error if
/// the insert fails.
pub fn insert_booking(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<(), PersistenceError> {
    let booking = &result.booking;
    debug!(booking_id = %booking.id, code = %booking.code, "Inserting booking");

    diesel::insert_into(bookings::table)
        .values(&BookingRow::from_domain(booking))
        .execute(conn)?;
    append_history(conn, &result.change)?;

    info!(
        booking_id = %booking.id,
        code = %booking.code,
        student_id = %booking.student_id,
        "Booking created"
    );
    Ok(())
}

/// Persists a status transition of an existing booking.
///
/// # Errors
///
/// Returns `NotFound` if the booking is gone or its persisted status no
/// longer matches the transition's starting status, or another error if
/// the update fails.
pub fn persist_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<(), PersistenceError> {
    let booking = &result.booking;
    let Some(previous) = result.previous_status else {
        return Err(PersistenceError::QueryFailed(format!(
            "transition for booking {} has no previous status",
            booking.id
        )));
    };

    let updated: usize = diesel::update(bookings::table)
        .filter(bookings::id.eq(booking.id.to_string()))
        .filter(bookings::status.eq(previous.as_str()))
        .filter(bookings::deleted_at.is_null())
        .set((
            bookings::status.eq(booking.status.as_str()),
            bookings::notes_for_student.eq(booking.notes_for_student.clone()),
            bookings::updated_at.eq(encode_instant(booking.updated_at)),
            bookings::updated_by.eq(booking.updated_by.map(|u| u.to_string())),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "{previous} booking {}",
            booking.id
        )));
    }
    append_history(conn, &result.change)?;

    info!(
        booking_id = %booking.id,
        from = %previous,
        to = %booking.status,
        "Booking status changed"
    );
    Ok(())
}

/// Flags a booking as having its review opened.
///
/// # Errors
///
/// Returns `NotFound` if the booking was already flagged or is gone.
pub fn mark_reviewed(
    conn: &mut SqliteConnection,
    booking_id: BookingId,
    now: DateTime<Utc>,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(bookings::table)
        .filter(bookings::id.eq(booking_id.to_string()))
        .filter(bookings::is_reviewed.eq(0))
        .filter(bookings::deleted_at.is_null())
        .set((
            bookings::is_reviewed.eq(encode_bool(true)),
            bookings::updated_at.eq(encode_instant(now)),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "unreviewed booking {booking_id}"
        )));
    }
    Ok(())
}

/// Tombstones a booking and the review and report it owns.
///
/// # Errors
///
/// Returns `NotFound` if the booking does not exist or is already
/// tombstoned.
pub fn tombstone_booking(
    conn: &mut SqliteConnection,
    booking_id: BookingId,
    deleted_by: UserId,
    now: DateTime<Utc>,
) -> Result<(), PersistenceError> {
    let stamp = encode_instant(now);
    let id = booking_id.to_string();

    let updated: usize = diesel::update(bookings::table)
        .filter(bookings::id.eq(id.as_str()))
        .filter(bookings::deleted_at.is_null())
        .set((
            bookings::deleted_at.eq(Some(stamp.clone())),
            bookings::deleted_by.eq(Some(deleted_by.to_string())),
            bookings::updated_at.eq(stamp.as_str()),
            bookings::updated_by.eq(Some(deleted_by.to_string())),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("booking {booking_id}")));
    }

    let reviews: usize = diesel::update(tutor_reviews::table)
        .filter(tutor_reviews::booking_id.eq(id.as_str()))
        .filter(tutor_reviews::deleted_at.is_null())
        .set((
            tutor_reviews::deleted_at.eq(Some(stamp.clone())),
            tutor_reviews::updated_at.eq(stamp.as_str()),
        ))
        .execute(conn)?;
    let reports: usize = diesel::update(report_bookings::table)
        .filter(report_bookings::booking_id.eq(id.as_str()))
        .filter(report_bookings::deleted_at.is_null())
        .set((
            report_bookings::deleted_at.eq(Some(stamp.clone())),
            report_bookings::updated_at.eq(stamp.as_str()),
        ))
        .execute(conn)?;

    info!(
        booking_id = %booking_id,
        deleted_by = %deleted_by,
        reviews,
        reports,
        "Booking tombstoned"
    );
    Ok(())
}
