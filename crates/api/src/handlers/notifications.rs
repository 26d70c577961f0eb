// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tracing::debug;
use tutor_booking_domain::{Notification, NotificationId, UserId};
use tutor_booking_persistence::Persistence;

use super::{not_found, parse_id};
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::env::BookingEnv;
use crate::error::ApiError;
use crate::request_response::{ListNotificationsResponse, NotificationResponse};
use crate::retry::with_retry;

/// Lists a user's notifications, newest first.
///
/// # Errors
///
/// Returns an error if the actor is neither the recipient nor an admin.
pub fn list_notifications(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    user_id: &str,
) -> Result<ListNotificationsResponse, ApiError> {
    let user_id: UserId = parse_id(user_id)?;
    AuthorizationService::authorize_view_notifications(authenticated_actor, user_id)?;
    let notifications: Vec<Notification> =
        persistence.read(|store| store.list_notifications(user_id))?;
    let unread = notifications
        .iter()
        .filter(|notification| notification.read_at.is_none())
        .count();
    Ok(ListNotificationsResponse {
        notifications,
        unread,
    })
}

/// Marks a notification read. Marking it again keeps the first read time.
///
/// # Errors
///
/// Returns an error if the notification does not exist or belongs to
/// another user.
pub fn mark_notification_read(
    persistence: &mut Persistence,
    env: &BookingEnv,
    authenticated_actor: &AuthenticatedActor,
    notification_id: &str,
) -> Result<NotificationResponse, ApiError> {
    let notification_id: NotificationId = parse_id(notification_id)?;
    let now = env.now();

    let notification = with_retry("mark_notification_read", || {
        persistence.transaction(|store| -> Result<Notification, ApiError> {
            let notification = store
                .find_notification(notification_id)?
                .ok_or_else(|| not_found("notification"))?;
            if notification.recipient_user_id != authenticated_actor.user_id {
                return Err(ApiError::Unauthorized {
                    action: String::from("mark_notification_read"),
                    required_role: String::from("recipient"),
                });
            }
            let changed = store.mark_notification_read(notification_id, now)?;
            debug!(notification_id = %notification_id, changed, "Notification read");
            store
                .find_notification(notification_id)?
                .ok_or_else(|| not_found("notification"))
        })
    })?;

    Ok(NotificationResponse { notification })
}
