// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking queries.
//!
//! Rows are returned with their persisted status. Callers derive the
//! effective status with [`Booking::effective_status`] before exposing a
//! booking to a reader.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;
use tutor_booking_domain::{
    Booking, BookingId, BookingStatus, CategoryId, CourseId, StudentId, TutorId,
};

use crate::data_models::{
    BookingRow, StatusHistoryEntry, StatusHistoryRow, decode_rows, encode_date, encode_instant,
    encode_time,
};
use crate::diesel_schema::{booking_status_history, bookings};
use crate::error::PersistenceError;

const LIVE_STATUSES: [&str; 2] = [
    BookingStatus::Pending.as_str(),
    BookingStatus::Accepted.as_str(),
];

fn limit_of(limit: u32) -> i64 {
    i64::from(limit)
}

/// Retrieves a live booking by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_booking(
    conn: &mut SqliteConnection,
    booking_id: BookingId,
) -> Result<Option<Booking>, PersistenceError> {
    debug!(booking_id = %booking_id, "Looking up booking");
    bookings::table
        .filter(bookings::id.eq(booking_id.to_string()))
        .filter(bookings::deleted_at.is_null())
        .select(BookingRow::as_select())
        .first::<BookingRow>(conn)
        .optional()?
        .map(BookingRow::into_domain)
        .transpose()
}

/// Lists a student's bookings, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_student_bookings(
    conn: &mut SqliteConnection,
    student_id: StudentId,
) -> Result<Vec<Booking>, PersistenceError> {
    let rows: Vec<BookingRow> = bookings::table
        .filter(bookings::student_id.eq(student_id.to_string()))
        .filter(bookings::deleted_at.is_null())
        .order((bookings::created_at.desc(), bookings::id.desc()))
        .select(BookingRow::as_select())
        .load(conn)?;
    decode_rows(rows, BookingRow::into_domain)
}

/// Lists a tutor's bookings, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_tutor_bookings(
    conn: &mut SqliteConnection,
    tutor_id: TutorId,
) -> Result<Vec<Booking>, PersistenceError> {
    let rows: Vec<BookingRow> = bookings::table
        .filter(bookings::tutor_id.eq(tutor_id.to_string()))
        .filter(bookings::deleted_at.is_null())
        .order((bookings::created_at.desc(), bookings::id.desc()))
        .select(BookingRow::as_select())
        .load(conn)?;
    decode_rows(rows, BookingRow::into_domain)
}

// ============================================================================
// Admission reads
// ============================================================================

/// Bookings of a student at exactly this local date and time.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn find_student_bookings_at(
    conn: &mut SqliteConnection,
    student_id: StudentId,
    booking_date: NaiveDate,
    booking_time: NaiveTime,
) -> Result<Vec<Booking>, PersistenceError> {
    let rows: Vec<BookingRow> = bookings::table
        .filter(bookings::student_id.eq(student_id.to_string()))
        .filter(bookings::booking_date.eq(encode_date(booking_date)))
        .filter(bookings::booking_time.eq(encode_time(booking_time)))
        .filter(bookings::deleted_at.is_null())
        .order(bookings::created_at.asc())
        .select(BookingRow::as_select())
        .load(conn)?;
    decode_rows(rows, BookingRow::into_domain)
}

/// Any free-first-course booking a student holds for a course, in any
/// status.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_free_booking_for_course(
    conn: &mut SqliteConnection,
    student_id: StudentId,
    course_id: CourseId,
) -> Result<Option<Booking>, PersistenceError> {
    bookings::table
        .filter(bookings::student_id.eq(student_id.to_string()))
        .filter(bookings::course_id.eq(course_id.to_string()))
        .filter(bookings::is_free_first_course.eq(1))
        .filter(bookings::deleted_at.is_null())
        .order(bookings::created_at.asc())
        .select(BookingRow::as_select())
        .first::<BookingRow>(conn)
        .optional()?
        .map(BookingRow::into_domain)
        .transpose()
}

/// Free-first-course bookings in a category created in `[from, to)`,
/// oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn find_free_bookings_created_between(
    conn: &mut SqliteConnection,
    student_id: StudentId,
    category_id: CategoryId,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<Booking>, PersistenceError> {
    let rows: Vec<BookingRow> = bookings::table
        .filter(bookings::student_id.eq(student_id.to_string()))
        .filter(bookings::category_id.eq(category_id.to_string()))
        .filter(bookings::is_free_first_course.eq(1))
        .filter(bookings::deleted_at.is_null())
        .filter(bookings::created_at.ge(encode_instant(from)))
        .filter(bookings::created_at.lt(encode_instant(to)))
        .order((bookings::created_at.asc(), bookings::id.asc()))
        .select(BookingRow::as_select())
        .load(conn)?;
    decode_rows(rows, BookingRow::into_domain)
}

/// Number of bookings a student created in `[from, to)`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_bookings_created_between(
    conn: &mut SqliteConnection,
    student_id: StudentId,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<u64, PersistenceError> {
    let count: i64 = bookings::table
        .filter(bookings::student_id.eq(student_id.to_string()))
        .filter(bookings::deleted_at.is_null())
        .filter(bookings::created_at.ge(encode_instant(from)))
        .filter(bookings::created_at.lt(encode_instant(to)))
        .count()
        .get_result(conn)?;
    Ok(u64::try_from(count).unwrap_or(0))
}

/// A student's persisted-live bookings in a category.
///
/// Effective expiry is applied by the caller.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn find_student_bookings_in_category(
    conn: &mut SqliteConnection,
    student_id: StudentId,
    category_id: CategoryId,
) -> Result<Vec<Booking>, PersistenceError> {
    let rows: Vec<BookingRow> = bookings::table
        .filter(bookings::student_id.eq(student_id.to_string()))
        .filter(bookings::category_id.eq(category_id.to_string()))
        .filter(bookings::status.eq_any(LIVE_STATUSES))
        .filter(bookings::deleted_at.is_null())
        .order(bookings::created_at.asc())
        .select(BookingRow::as_select())
        .load(conn)?;
    decode_rows(rows, BookingRow::into_domain)
}

// ============================================================================
// Sweep candidates
// ============================================================================

/// Pending bookings whose deadline lies in `[from, to]`, soonest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn find_pending_expiring_between(
    conn: &mut SqliteConnection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    limit: u32,
) -> Result<Vec<Booking>, PersistenceError> {
    let rows: Vec<BookingRow> = bookings::table
        .filter(bookings::status.eq(BookingStatus::Pending.as_str()))
        .filter(bookings::deleted_at.is_null())
        .filter(bookings::expired_at.ge(encode_instant(from)))
        .filter(bookings::expired_at.le(encode_instant(to)))
        .order(bookings::expired_at.asc())
        .limit(limit_of(limit))
        .select(BookingRow::as_select())
        .load(conn)?;
    decode_rows(rows, BookingRow::into_domain)
}

/// Persisted-pending bookings whose deadline passed before `now`.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn find_pending_expired_before(
    conn: &mut SqliteConnection,
    now: DateTime<Utc>,
    limit: u32,
) -> Result<Vec<Booking>, PersistenceError> {
    let rows: Vec<BookingRow> = bookings::table
        .filter(bookings::status.eq(BookingStatus::Pending.as_str()))
        .filter(bookings::deleted_at.is_null())
        .filter(bookings::expired_at.lt(encode_instant(now)))
        .order(bookings::expired_at.asc())
        .limit(limit_of(limit))
        .select(BookingRow::as_select())
        .load(conn)?;
    decode_rows(rows, BookingRow::into_domain)
}

/// Accepted bookings whose session starts in `[from, to]`.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn find_accepted_starting_between(
    conn: &mut SqliteConnection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    limit: u32,
) -> Result<Vec<Booking>, PersistenceError> {
    let rows: Vec<BookingRow> = bookings::table
        .filter(bookings::status.eq(BookingStatus::Accepted.as_str()))
        .filter(bookings::deleted_at.is_null())
        .filter(bookings::session_starts_at.ge(encode_instant(from)))
        .filter(bookings::session_starts_at.le(encode_instant(to)))
        .order(bookings::session_starts_at.asc())
        .limit(limit_of(limit))
        .select(BookingRow::as_select())
        .load(conn)?;
    decode_rows(rows, BookingRow::into_domain)
}

/// Accepted, unreviewed bookings whose session started at or before
/// `cutoff`.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn find_unreviewed_started_before(
    conn: &mut SqliteConnection,
    cutoff: DateTime<Utc>,
    limit: u32,
) -> Result<Vec<Booking>, PersistenceError> {
    let rows: Vec<BookingRow> = bookings::table
        .filter(bookings::status.eq(BookingStatus::Accepted.as_str()))
        .filter(bookings::is_reviewed.eq(0))
        .filter(bookings::deleted_at.is_null())
        .filter(bookings::session_starts_at.le(encode_instant(cutoff)))
        .order(bookings::session_starts_at.asc())
        .limit(limit_of(limit))
        .select(BookingRow::as_select())
        .load(conn)?;
    decode_rows(rows, BookingRow::into_domain)
}

// ============================================================================
// History
// ============================================================================

/// Lists a booking's status history in insertion order.
///
/// Tombstoned bookings keep their history.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_status_history(
    conn: &mut SqliteConnection,
    booking_id: BookingId,
) -> Result<Vec<StatusHistoryEntry>, PersistenceError> {
    let rows: Vec<StatusHistoryRow> = booking_status_history::table
        .filter(booking_status_history::booking_id.eq(booking_id.to_string()))
        .order(booking_status_history::id.asc())
        .select(StatusHistoryRow::as_select())
        .load(conn)?;
    decode_rows(rows, StatusHistoryRow::into_entry)
}
