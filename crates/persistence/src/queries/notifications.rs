// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tutor_booking_domain::{BookingId, Notification, NotificationId, NotificationKind, UserId};

use crate::data_models::{NotificationRow, decode_rows};
use crate::diesel_schema::notifications;
use crate::error::PersistenceError;

/// Lists a user's notifications, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_notifications(
    conn: &mut SqliteConnection,
    user_id: UserId,
) -> Result<Vec<Notification>, PersistenceError> {
    let rows: Vec<NotificationRow> = notifications::table
        .filter(notifications::recipient_user_id.eq(user_id.to_string()))
        .order((notifications::created_at.desc(), notifications::id.desc()))
        .select(NotificationRow::as_select())
        .load(conn)?;
    decode_rows(rows, NotificationRow::into_domain)
}

/// Retrieves a notification by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_notification(
    conn: &mut SqliteConnection,
    notification_id: NotificationId,
) -> Result<Option<Notification>, PersistenceError> {
    notifications::table
        .filter(notifications::id.eq(notification_id.to_string()))
        .select(NotificationRow::as_select())
        .first::<NotificationRow>(conn)
        .optional()?
        .map(NotificationRow::into_domain)
        .transpose()
}

/// Whether a notification of `kind` about a booking was already recorded.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn has_booking_notification(
    conn: &mut SqliteConnection,
    booking_id: BookingId,
    kind: NotificationKind,
) -> Result<bool, PersistenceError> {
    let count: i64 = notifications::table
        .filter(notifications::booking_id.eq(booking_id.to_string()))
        .filter(notifications::kind.eq(kind.as_str()))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}
