// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{DateTime, Utc};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;
use tutor_booking_domain::{Notification, NotificationId};

use crate::data_models::{NotificationRow, encode_instant};
use crate::diesel_schema::notifications;
use crate::error::PersistenceError;

/// Inserts a notification.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_notification(
    conn: &mut SqliteConnection,
    notification: &Notification,
) -> Result<(), PersistenceError> {
    diesel::insert_into(notifications::table)
        .values(&NotificationRow::from_domain(notification))
        .execute(conn)?;
    debug!(
        notification_id = %notification.id,
        kind = %notification.kind,
        recipient = %notification.recipient_user_id,
        "Notification stored"
    );
    Ok(())
}

/// Marks a notification read. A notification already read keeps its
/// original timestamp.
///
/// Returns whether this call changed the row.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn mark_notification_read(
    conn: &mut SqliteConnection,
    notification_id: NotificationId,
    now: DateTime<Utc>,
) -> Result<bool, PersistenceError> {
    let updated: usize = diesel::update(notifications::table)
        .filter(notifications::id.eq(notification_id.to_string()))
        .filter(notifications::read_at.is_null())
        .set(notifications::read_at.eq(Some(encode_instant(now))))
        .execute(conn)?;
    Ok(updated > 0)
}
