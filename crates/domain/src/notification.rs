// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{BookingId, NotificationId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What a user-facing notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    StudentBookingCreated,
    BookingAccepted,
    BookingDeclined,
    BookingExpired,
    PendingExpiryReminder,
    UpcomingSessionReminder,
    ReviewOpened,
    ReviewSubmitted,
    WithdrawalCompleted,
    WithdrawalRejected,
    ReportResolved,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StudentBookingCreated => "student_booking_created",
            Self::BookingAccepted => "booking_accepted",
            Self::BookingDeclined => "booking_declined",
            Self::BookingExpired => "booking_expired",
            Self::PendingExpiryReminder => "pending_expiry_reminder",
            Self::UpcomingSessionReminder => "upcoming_session_reminder",
            Self::ReviewOpened => "review_opened",
            Self::ReviewSubmitted => "review_submitted",
            Self::WithdrawalCompleted => "withdrawal_completed",
            Self::WithdrawalRejected => "withdrawal_rejected",
            Self::ReportResolved => "report_resolved",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student_booking_created" => Ok(Self::StudentBookingCreated),
            "booking_accepted" => Ok(Self::BookingAccepted),
            "booking_declined" => Ok(Self::BookingDeclined),
            "booking_expired" => Ok(Self::BookingExpired),
            "pending_expiry_reminder" => Ok(Self::PendingExpiryReminder),
            "upcoming_session_reminder" => Ok(Self::UpcomingSessionReminder),
            "review_opened" => Ok(Self::ReviewOpened),
            "review_submitted" => Ok(Self::ReviewSubmitted),
            "withdrawal_completed" => Ok(Self::WithdrawalCompleted),
            "withdrawal_rejected" => Ok(Self::WithdrawalRejected),
            "report_resolved" => Ok(Self::ReportResolved),
            _ => Err(DomainError::InvalidStatus {
                entity: "notification kind",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted in-app notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub booking_id: Option<BookingId>,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl Notification {
    #[must_use]
    pub fn new(
        recipient_user_id: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        booking_id: Option<BookingId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NotificationId::generate(),
            recipient_user_id,
            kind,
            title: title.into(),
            body: body.into(),
            booking_id,
            created_at: now,
            read_at: None,
        }
    }

    #[must_use]
    pub const fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}
