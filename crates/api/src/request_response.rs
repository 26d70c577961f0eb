// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Field names are camelCase on the wire.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tutor_booking_audit::ActorRole;
use tutor_booking_domain::{
    BalanceTransaction, Booking, BookingCode, BookingId, BookingStatus, CategoryId, ClassType,
    CourseId, Money, Notification, ReportBooking, StudentId, Timezone, TutorId, TutorReview,
    UserId, WithdrawalRequest,
};
use tutor_booking_persistence::StatusHistoryEntry;

/// API request to book a course slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub course_id: String,
    /// `online` or `offline`.
    pub class_type: String,
    /// `YYYY-MM-DD`.
    pub booking_date: String,
    /// `HH:MM:SS`.
    pub booking_time: String,
    /// `WIB`, `WITA` or `WIT`; the server's local zone when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A booking as returned to readers.
///
/// `status` is always the effective status at the time of the read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInfo {
    pub id: BookingId,
    pub code: BookingCode,
    pub course_id: CourseId,
    pub tutor_id: TutorId,
    pub student_id: StudentId,
    pub category_id: CategoryId,
    pub class_type: ClassType,
    pub booking_date: NaiveDate,
    pub booking_time: NaiveTime,
    pub timezone: Timezone,
    pub session_starts_at: DateTime<Utc>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes_for_tutor: Option<String>,
    pub notes_for_student: Option<String>,
    pub is_free_first_course: bool,
    pub gross_amount: Money,
    pub status: BookingStatus,
    pub is_reviewed: bool,
    pub expired_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingInfo {
    /// Projects `booking` as seen at `now`.
    #[must_use]
    pub fn new(booking: &Booking, now: DateTime<Utc>) -> Self {
        Self {
            id: booking.id,
            code: booking.code.clone(),
            course_id: booking.course_id,
            tutor_id: booking.tutor_id,
            student_id: booking.student_id,
            category_id: booking.category_id,
            class_type: booking.class_type,
            booking_date: booking.booking_date,
            booking_time: booking.booking_time,
            timezone: booking.timezone,
            session_starts_at: booking.session_starts_at,
            latitude: booking.location.map(|point| point.latitude),
            longitude: booking.location.map(|point| point.longitude),
            notes_for_tutor: booking.notes_for_tutor.clone(),
            notes_for_student: booking.notes_for_student.clone(),
            is_free_first_course: booking.is_free_first_course,
            gross_amount: booking.gross_amount,
            status: booking.effective_status(now),
            is_reviewed: booking.is_reviewed,
            expired_at: booking.expired_at,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBookingsResponse {
    pub bookings: Vec<BookingInfo>,
}

/// One recorded status change of a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryInfo {
    pub previous_status: Option<BookingStatus>,
    pub new_status: BookingStatus,
    pub transitioned_at: DateTime<Utc>,
    pub actor_user_id: Option<UserId>,
    pub actor_role: ActorRole,
    pub notes: Option<String>,
}

impl From<StatusHistoryEntry> for StatusHistoryInfo {
    fn from(entry: StatusHistoryEntry) -> Self {
        Self {
            previous_status: entry.previous_status,
            new_status: entry.new_status,
            transitioned_at: entry.transitioned_at,
            actor_user_id: entry.actor_user_id,
            actor_role: entry.actor_role,
            notes: entry.notes,
        }
    }
}

/// Status history of a booking, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingHistoryResponse {
    pub booking_id: BookingId,
    pub history: Vec<StatusHistoryInfo>,
}

/// API request to accept or decline a booking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondBookingRequest {
    /// Message shown to the student.
    #[serde(default)]
    pub notes: Option<String>,
}

/// API response for a tutor's answer to a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondBookingResponse {
    pub booking: BookingInfo,
    /// Net amount credited to the tutor; absent when nothing was owed.
    pub credited: Option<Money>,
    pub commission: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBookingResponse {
    pub booking_id: BookingId,
    pub deleted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub topic: String,
    pub body: String,
}

/// API request to close a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveReportRequest {
    /// `done` or `cancel`.
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub report: ReportBooking,
}

/// A tutor's balance together with the log that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub tutor_id: TutorId,
    pub balance: Money,
    pub updated_at: Option<DateTime<Utc>>,
    /// Newest first.
    pub transactions: Vec<BalanceTransaction>,
    /// Whether the balance equals the signed sum of `transactions`.
    pub consistent: bool,
}

/// API request to withdraw earnings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWithdrawalRequest {
    /// Decimal amount with at most two fractional digits.
    pub amount: String,
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
}

/// API request to approve or reject a withdrawal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideWithdrawalRequest {
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalResponse {
    pub withdrawal: WithdrawalRequest,
    /// Balance after the operation.
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListWithdrawalsResponse {
    pub withdrawals: Vec<WithdrawalRequest>,
}

/// API request to submit or edit a review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewRequest {
    pub review: String,
    /// 1 to 5.
    pub rate: i64,
    #[serde(default)]
    pub recommend: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub review: TutorReview,
    /// Last instant the review may still be edited.
    pub editable_until: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsResponse {
    /// Newest first.
    pub notifications: Vec<Notification>,
    pub unread: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub notification: Notification,
}
