// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Outbound notification sink.
//!
//! Notifications are fire-and-forget: they are emitted after the store
//! commits and a failed delivery never rolls anything back.

use chrono::{DateTime, Utc};
use std::sync::{Mutex, PoisonError};
use tutor_booking_domain::{
    Booking, BookingId, Notification, NotificationKind, UserId, WithdrawalRequest,
    WithdrawalStatus,
};

/// A message to push to a user through email or push channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub kind: NotificationKind,
    pub recipient: UserId,
    pub booking_id: Option<BookingId>,
    pub title: String,
    pub body: String,
}

impl NotificationEvent {
    fn about_booking(
        kind: NotificationKind,
        recipient: UserId,
        booking: &Booking,
        title: &str,
        body: String,
    ) -> Self {
        Self {
            kind,
            recipient,
            booking_id: Some(booking.id),
            title: title.to_string(),
            body,
        }
    }

    fn session_label(booking: &Booking) -> String {
        format!(
            "{} {} {}",
            booking.booking_date,
            booking.booking_time.format("%H:%M"),
            booking.timezone
        )
    }

    #[must_use]
    pub fn booking_created(booking: &Booking, tutor_user: UserId) -> Self {
        Self::about_booking(
            NotificationKind::StudentBookingCreated,
            tutor_user,
            booking,
            "New booking request",
            format!(
                "Booking {} for {} is waiting for your response",
                booking.code,
                Self::session_label(booking)
            ),
        )
    }

    #[must_use]
    pub fn booking_accepted(booking: &Booking, student_user: UserId) -> Self {
        Self::about_booking(
            NotificationKind::BookingAccepted,
            student_user,
            booking,
            "Booking accepted",
            format!(
                "Your booking {} for {} was accepted",
                booking.code,
                Self::session_label(booking)
            ),
        )
    }

    #[must_use]
    pub fn booking_declined(booking: &Booking, student_user: UserId) -> Self {
        Self::about_booking(
            NotificationKind::BookingDeclined,
            student_user,
            booking,
            "Booking declined",
            format!("Your booking {} was declined", booking.code),
        )
    }

    /// Expiry is reported to the tutor only.
    #[must_use]
    pub fn booking_expired(booking: &Booking, tutor_user: UserId) -> Self {
        Self::about_booking(
            NotificationKind::BookingExpired,
            tutor_user,
            booking,
            "Booking expired",
            format!(
                "Booking {} expired before you responded",
                booking.code
            ),
        )
    }

    #[must_use]
    pub fn pending_expiry_reminder(
        booking: &Booking,
        tutor_user: UserId,
        location: Option<&str>,
    ) -> Self {
        let mut body = format!(
            "Booking {} for {} expires at {}",
            booking.code,
            Self::session_label(booking),
            booking.expired_at.format("%Y-%m-%d %H:%M UTC")
        );
        if let Some(place) = location {
            body.push_str(&format!(" (location: {place})"));
        }
        Self::about_booking(
            NotificationKind::PendingExpiryReminder,
            tutor_user,
            booking,
            "Respond to your booking request",
            body,
        )
    }

    #[must_use]
    pub fn upcoming_session_reminder(
        booking: &Booking,
        student_user: UserId,
        location: Option<&str>,
    ) -> Self {
        let mut body = format!(
            "Your session {} starts at {}",
            booking.code,
            Self::session_label(booking)
        );
        if let Some(place) = location {
            body.push_str(&format!(" at {place}"));
        }
        Self::about_booking(
            NotificationKind::UpcomingSessionReminder,
            student_user,
            booking,
            "Upcoming session",
            body,
        )
    }

    #[must_use]
    pub fn review_opened(booking: &Booking, recipient: UserId) -> Self {
        Self::about_booking(
            NotificationKind::ReviewOpened,
            recipient,
            booking,
            "Session review is open",
            format!("The review for booking {} is now open", booking.code),
        )
    }

    #[must_use]
    pub fn review_submitted(booking_id: BookingId, tutor_user: UserId, rate: u8) -> Self {
        Self {
            kind: NotificationKind::ReviewSubmitted,
            recipient: tutor_user,
            booking_id: Some(booking_id),
            title: String::from("New review"),
            body: format!("A student rated your session {rate}/5"),
        }
    }

    #[must_use]
    pub fn withdrawal_decided(withdrawal: &WithdrawalRequest, tutor_user: UserId) -> Self {
        let (kind, title) = match withdrawal.status {
            WithdrawalStatus::Completed => {
                (NotificationKind::WithdrawalCompleted, "Withdrawal completed")
            }
            _ => (NotificationKind::WithdrawalRejected, "Withdrawal rejected"),
        };
        Self {
            kind,
            recipient: tutor_user,
            booking_id: None,
            title: title.to_string(),
            body: format!(
                "Your withdrawal of {} is {}",
                withdrawal.amount, withdrawal.status
            ),
        }
    }

    #[must_use]
    pub fn report_resolved(booking_id: BookingId, student_user: UserId, outcome: &str) -> Self {
        Self {
            kind: NotificationKind::ReportResolved,
            recipient: student_user,
            booking_id: Some(booking_id),
            title: String::from("Report resolved"),
            body: format!("Your report was marked {outcome}"),
        }
    }

    /// The persisted in-app copy of this event.
    #[must_use]
    pub fn to_record(&self, now: DateTime<Utc>) -> Notification {
        Notification::new(
            self.recipient,
            self.kind,
            self.title.clone(),
            self.body.clone(),
            self.booking_id,
            now,
        )
    }
}

/// Delivery failed; the caller logs and moves on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

pub trait Notifier: Send + Sync {
    /// Hands `event` to the delivery channel without waiting for delivery.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` if the channel refused the event.
    fn notify(&self, event: NotificationEvent) -> Result<(), NotifyError>;
}

/// Emits notifications as log lines only.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, event: NotificationEvent) -> Result<(), NotifyError> {
        tracing::info!(
            kind = %event.kind,
            recipient = %event.recipient,
            booking_id = ?event.booking_id,
            title = %event.title,
            "Notification dispatched"
        );
        Ok(())
    }
}

/// Keeps every event in memory for assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<NotificationEvent>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Counts recorded events of `kind`.
    #[must_use]
    pub fn count(&self, kind: NotificationKind) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|event| event.kind == kind)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: NotificationEvent) -> Result<(), NotifyError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        Ok(())
    }
}
