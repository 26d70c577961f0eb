// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and their conversions to and from domain values.
//!
//! Every table has one row struct usable for both reads and inserts.
//! Conversions are the only place that knows the stored encodings:
//!
//! - UUIDs as hyphenated text
//! - instants as fixed-width UTC text, see [`encode_instant`]
//! - booleans as `0`/`1` integers
//! - money as `BIGINT` minor units

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use diesel::prelude::*;
use std::str::FromStr;
use tutor_booking_audit::{ActorRole, BookingStatusChange};
use tutor_booking_domain::{
    BalanceTransaction, BankDetails, Booking, BookingStatus, Coordinates, Course, CourseSchedule,
    DayOfWeek, Money, Notification, Rating, ReportBooking, Student, Tutor, TutorBalance,
    TutorReview, UserId, WithdrawalRequest,
};
use uuid::Uuid;

use crate::diesel_schema::{
    balance_transactions, booking_status_history, bookings, course_schedules, courses,
    notifications, report_bookings, students, tutor_balances, tutor_reviews, tutors,
    withdrawal_requests,
};
use crate::error::PersistenceError;

// ============================================================================
// Encoding helpers
// ============================================================================

/// Encodes an instant as `YYYY-MM-DDTHH:MM:SS.ffffffZ`.
///
/// The width is fixed so text comparison in SQL orders instants correctly.
#[must_use]
pub fn encode_instant(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn encode_optional_instant(at: Option<DateTime<Utc>>) -> Option<String> {
    at.map(encode_instant)
}

pub(crate) fn encode_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn encode_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

pub(crate) fn encode_bool(value: bool) -> i32 {
    i32::from(value)
}

fn decode_instant(column: &'static str, value: &str) -> Result<DateTime<Utc>, PersistenceError> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| PersistenceError::CorruptRow {
            column,
            reason: e.to_string(),
        })
}

fn decode_optional_instant(
    column: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, PersistenceError> {
    value.map(|v| decode_instant(column, v)).transpose()
}

fn decode<T>(column: &'static str, value: &str) -> Result<T, PersistenceError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    T::from_str(value).map_err(|e| PersistenceError::CorruptRow {
        column,
        reason: e.to_string(),
    })
}

fn decode_optional<T>(column: &'static str, value: Option<&str>) -> Result<Option<T>, PersistenceError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.map(|v| decode(column, v)).transpose()
}

const fn decode_bool(value: i32) -> bool {
    value != 0
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tutors)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TutorRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub response_time: Option<String>,
    pub level_point: i64,
    pub deleted_at: Option<String>,
}

impl TutorRow {
    pub fn from_domain(tutor: &Tutor) -> Self {
        Self {
            id: tutor.id.to_string(),
            user_id: tutor.user_id.to_string(),
            name: tutor.name.clone(),
            response_time: tutor.response_time.clone(),
            level_point: tutor.level_point,
            deleted_at: encode_optional_instant(tutor.deleted_at),
        }
    }

    pub fn into_domain(self) -> Result<Tutor, PersistenceError> {
        Ok(Tutor {
            id: decode("tutors.id", &self.id)?,
            user_id: decode("tutors.user_id", &self.user_id)?,
            name: self.name,
            response_time: self.response_time,
            level_point: self.level_point,
            deleted_at: decode_optional_instant("tutors.deleted_at", self.deleted_at.as_deref())?,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = students)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StudentRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub deleted_at: Option<String>,
}

impl StudentRow {
    pub fn from_domain(student: &Student) -> Self {
        Self {
            id: student.id.to_string(),
            user_id: student.user_id.to_string(),
            name: student.name.clone(),
            deleted_at: encode_optional_instant(student.deleted_at),
        }
    }

    pub fn into_domain(self) -> Result<Student, PersistenceError> {
        Ok(Student {
            id: decode("students.id", &self.id)?,
            user_id: decode("students.user_id", &self.user_id)?,
            name: self.name,
            deleted_at: decode_optional_instant(
                "students.deleted_at",
                self.deleted_at.as_deref(),
            )?,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CourseRow {
    pub id: String,
    pub tutor_id: String,
    pub category_id: String,
    pub title: String,
    pub is_published: i32,
    pub is_free_first_course: i32,
    pub class_type: String,
    pub price: i64,
    pub deleted_at: Option<String>,
}

impl CourseRow {
    pub fn from_domain(course: &Course) -> Self {
        Self {
            id: course.id.to_string(),
            tutor_id: course.tutor_id.to_string(),
            category_id: course.category_id.to_string(),
            title: course.title.clone(),
            is_published: encode_bool(course.is_published),
            is_free_first_course: encode_bool(course.is_free_first_course),
            class_type: course.class_type.as_str().to_string(),
            price: course.price.minor(),
            deleted_at: encode_optional_instant(course.deleted_at),
        }
    }

    pub fn into_domain(self) -> Result<Course, PersistenceError> {
        Ok(Course {
            id: decode("courses.id", &self.id)?,
            tutor_id: decode("courses.tutor_id", &self.tutor_id)?,
            category_id: decode("courses.category_id", &self.category_id)?,
            title: self.title,
            is_published: decode_bool(self.is_published),
            is_free_first_course: decode_bool(self.is_free_first_course),
            class_type: decode("courses.class_type", &self.class_type)?,
            price: Money::from_minor(self.price),
            deleted_at: decode_optional_instant("courses.deleted_at", self.deleted_at.as_deref())?,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = course_schedules)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CourseScheduleRow {
    pub id: String,
    pub course_id: String,
    pub day_of_week: i32,
    pub start_time: String,
    pub timezone: String,
    pub class_type: String,
}

impl CourseScheduleRow {
    pub fn from_domain(schedule: &CourseSchedule) -> Self {
        Self {
            id: schedule.id.to_string(),
            course_id: schedule.course_id.to_string(),
            day_of_week: i32::from(schedule.day_of_week.value()),
            start_time: encode_time(schedule.start_time),
            timezone: schedule.timezone.as_str().to_string(),
            class_type: schedule.class_type.as_str().to_string(),
        }
    }

    pub fn into_domain(self) -> Result<CourseSchedule, PersistenceError> {
        let day_of_week = u8::try_from(self.day_of_week)
            .ok()
            .and_then(|day| DayOfWeek::new(day).ok())
            .ok_or_else(|| PersistenceError::CorruptRow {
                column: "course_schedules.day_of_week",
                reason: format!("{} is not in 1..=7", self.day_of_week),
            })?;
        Ok(CourseSchedule {
            id: decode("course_schedules.id", &self.id)?,
            course_id: decode("course_schedules.course_id", &self.course_id)?,
            day_of_week,
            start_time: decode("course_schedules.start_time", &self.start_time)?,
            timezone: decode("course_schedules.timezone", &self.timezone)?,
            class_type: decode("course_schedules.class_type", &self.class_type)?,
        })
    }
}

// ============================================================================
// Bookings
// ============================================================================

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BookingRow {
    pub id: String,
    pub code: String,
    pub course_id: String,
    pub tutor_id: String,
    pub student_id: String,
    pub category_id: String,
    pub class_type: String,
    pub booking_date: String,
    pub booking_time: String,
    pub timezone: String,
    pub session_starts_at: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes_for_tutor: Option<String>,
    pub notes_for_student: Option<String>,
    pub is_free_first_course: i32,
    pub gross_amount: i64,
    pub status: String,
    pub is_reviewed: i32,
    pub expired_at: String,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
    pub created_by: String,
    pub updated_by: Option<String>,
    pub deleted_by: Option<String>,
}

impl BookingRow {
    pub fn from_domain(booking: &Booking) -> Self {
        Self {
            id: booking.id.to_string(),
            code: booking.code.as_str().to_string(),
            course_id: booking.course_id.to_string(),
            tutor_id: booking.tutor_id.to_string(),
            student_id: booking.student_id.to_string(),
            category_id: booking.category_id.to_string(),
            class_type: booking.class_type.as_str().to_string(),
            booking_date: encode_date(booking.booking_date),
            booking_time: encode_time(booking.booking_time),
            timezone: booking.timezone.as_str().to_string(),
            session_starts_at: encode_instant(booking.session_starts_at),
            latitude: booking.location.map(|l| l.latitude),
            longitude: booking.location.map(|l| l.longitude),
            notes_for_tutor: booking.notes_for_tutor.clone(),
            notes_for_student: booking.notes_for_student.clone(),
            is_free_first_course: encode_bool(booking.is_free_first_course),
            gross_amount: booking.gross_amount.minor(),
            status: booking.status.as_str().to_string(),
            is_reviewed: encode_bool(booking.is_reviewed),
            expired_at: encode_instant(booking.expired_at),
            created_at: encode_instant(booking.created_at),
            updated_at: encode_instant(booking.updated_at),
            deleted_at: encode_optional_instant(booking.deleted_at),
            created_by: booking.created_by.to_string(),
            updated_by: booking.updated_by.map(|u| u.to_string()),
            deleted_by: booking.deleted_by.map(|u| u.to_string()),
        }
    }

    pub fn into_domain(self) -> Result<Booking, PersistenceError> {
        Ok(Booking {
            id: decode("bookings.id", &self.id)?,
            code: decode("bookings.code", &self.code)?,
            course_id: decode("bookings.course_id", &self.course_id)?,
            tutor_id: decode("bookings.tutor_id", &self.tutor_id)?,
            student_id: decode("bookings.student_id", &self.student_id)?,
            category_id: decode("bookings.category_id", &self.category_id)?,
            class_type: decode("bookings.class_type", &self.class_type)?,
            booking_date: decode::<NaiveDate>("bookings.booking_date", &self.booking_date)?,
            booking_time: decode::<NaiveTime>("bookings.booking_time", &self.booking_time)?,
            timezone: decode("bookings.timezone", &self.timezone)?,
            session_starts_at: decode_instant(
                "bookings.session_starts_at",
                &self.session_starts_at,
            )?,
            location: Coordinates::from_parts(self.latitude, self.longitude),
            notes_for_tutor: self.notes_for_tutor,
            notes_for_student: self.notes_for_student,
            is_free_first_course: decode_bool(self.is_free_first_course),
            gross_amount: Money::from_minor(self.gross_amount),
            status: decode::<BookingStatus>("bookings.status", &self.status)?,
            is_reviewed: decode_bool(self.is_reviewed),
            expired_at: decode_instant("bookings.expired_at", &self.expired_at)?,
            created_at: decode_instant("bookings.created_at", &self.created_at)?,
            updated_at: decode_instant("bookings.updated_at", &self.updated_at)?,
            deleted_at: decode_optional_instant("bookings.deleted_at", self.deleted_at.as_deref())?,
            created_by: decode("bookings.created_by", &self.created_by)?,
            updated_by: decode_optional::<UserId>("bookings.updated_by", self.updated_by.as_deref())?,
            deleted_by: decode_optional::<UserId>("bookings.deleted_by", self.deleted_by.as_deref())?,
        })
    }
}

/// Insert form of a status history row; the id is assigned by `SQLite`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = booking_status_history)]
pub struct NewStatusHistoryRow {
    pub booking_id: String,
    pub previous_status: Option<String>,
    pub new_status: String,
    pub transitioned_at: String,
    pub actor_user_id: Option<String>,
    pub actor_role: String,
    pub notes: Option<String>,
}

impl NewStatusHistoryRow {
    pub fn from_change(change: &BookingStatusChange) -> Self {
        Self {
            booking_id: change.booking_id.to_string(),
            previous_status: change.previous_status.map(|s| s.as_str().to_string()),
            new_status: change.new_status.as_str().to_string(),
            transitioned_at: encode_instant(change.transitioned_at),
            actor_user_id: change.actor.user_id.map(|u| u.to_string()),
            actor_role: change.actor.role.as_str().to_string(),
            notes: change.notes.clone(),
        }
    }
}

/// A persisted status history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusHistoryEntry {
    pub id: i64,
    pub previous_status: Option<BookingStatus>,
    pub new_status: BookingStatus,
    pub transitioned_at: DateTime<Utc>,
    pub actor_user_id: Option<UserId>,
    pub actor_role: ActorRole,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = booking_status_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StatusHistoryRow {
    pub id: i64,
    pub booking_id: String,
    pub previous_status: Option<String>,
    pub new_status: String,
    pub transitioned_at: String,
    pub actor_user_id: Option<String>,
    pub actor_role: String,
    pub notes: Option<String>,
}

impl StatusHistoryRow {
    pub fn into_entry(self) -> Result<StatusHistoryEntry, PersistenceError> {
        Ok(StatusHistoryEntry {
            id: self.id,
            previous_status: decode_optional(
                "booking_status_history.previous_status",
                self.previous_status.as_deref(),
            )?,
            new_status: decode("booking_status_history.new_status", &self.new_status)?,
            transitioned_at: decode_instant(
                "booking_status_history.transitioned_at",
                &self.transitioned_at,
            )?,
            actor_user_id: decode_optional(
                "booking_status_history.actor_user_id",
                self.actor_user_id.as_deref(),
            )?,
            actor_role: decode("booking_status_history.actor_role", &self.actor_role)?,
            notes: self.notes,
        })
    }
}

// ============================================================================
// Ledger
// ============================================================================

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tutor_balances)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TutorBalanceRow {
    pub tutor_id: String,
    pub balance: i64,
    pub updated_at: Option<String>,
}

impl TutorBalanceRow {
    pub fn from_domain(balance: &TutorBalance) -> Self {
        Self {
            tutor_id: balance.tutor_id.to_string(),
            balance: balance.balance.minor(),
            updated_at: encode_optional_instant(balance.updated_at),
        }
    }

    pub fn into_domain(self) -> Result<TutorBalance, PersistenceError> {
        Ok(TutorBalance {
            tutor_id: decode("tutor_balances.tutor_id", &self.tutor_id)?,
            balance: Money::from_minor(self.balance),
            updated_at: decode_optional_instant(
                "tutor_balances.updated_at",
                self.updated_at.as_deref(),
            )?,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = balance_transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BalanceTransactionRow {
    pub id: String,
    pub tutor_id: String,
    pub transaction_type: String,
    pub amount: i64,
    pub commission: i64,
    pub reference_type: String,
    pub reference_id: String,
    pub description: String,
    pub created_at: String,
}

impl BalanceTransactionRow {
    pub fn from_domain(tx: &BalanceTransaction) -> Self {
        Self {
            id: tx.id.to_string(),
            tutor_id: tx.tutor_id.to_string(),
            transaction_type: tx.transaction_type.as_str().to_string(),
            amount: tx.amount.minor(),
            commission: tx.commission.minor(),
            reference_type: tx.reference_type.as_str().to_string(),
            reference_id: tx.reference_id.as_hyphenated().to_string(),
            description: tx.description.clone(),
            created_at: encode_instant(tx.created_at),
        }
    }

    pub fn into_domain(self) -> Result<BalanceTransaction, PersistenceError> {
        Ok(BalanceTransaction {
            id: decode("balance_transactions.id", &self.id)?,
            tutor_id: decode("balance_transactions.tutor_id", &self.tutor_id)?,
            transaction_type: decode(
                "balance_transactions.transaction_type",
                &self.transaction_type,
            )?,
            amount: Money::from_minor(self.amount),
            commission: Money::from_minor(self.commission),
            reference_type: decode("balance_transactions.reference_type", &self.reference_type)?,
            reference_id: decode::<Uuid>("balance_transactions.reference_id", &self.reference_id)?,
            description: self.description,
            created_at: decode_instant("balance_transactions.created_at", &self.created_at)?,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = withdrawal_requests)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WithdrawalRow {
    pub id: String,
    pub tutor_id: String,
    pub amount: i64,
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
    pub status: String,
    pub admin_note: Option<String>,
    pub processed_at: Option<String>,
    pub processed_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl WithdrawalRow {
    pub fn from_domain(withdrawal: &WithdrawalRequest) -> Self {
        Self {
            id: withdrawal.id.to_string(),
            tutor_id: withdrawal.tutor_id.to_string(),
            amount: withdrawal.amount.minor(),
            bank_name: withdrawal.bank.bank_name.clone(),
            account_number: withdrawal.bank.account_number.clone(),
            account_holder: withdrawal.bank.account_holder.clone(),
            status: withdrawal.status.as_str().to_string(),
            admin_note: withdrawal.admin_note.clone(),
            processed_at: encode_optional_instant(withdrawal.processed_at),
            processed_by: withdrawal.processed_by.map(|u| u.to_string()),
            created_at: encode_instant(withdrawal.created_at),
            updated_at: encode_instant(withdrawal.updated_at),
        }
    }

    pub fn into_domain(self) -> Result<WithdrawalRequest, PersistenceError> {
        Ok(WithdrawalRequest {
            id: decode("withdrawal_requests.id", &self.id)?,
            tutor_id: decode("withdrawal_requests.tutor_id", &self.tutor_id)?,
            amount: Money::from_minor(self.amount),
            // Stored values were validated on the way in.
            bank: BankDetails {
                bank_name: self.bank_name,
                account_number: self.account_number,
                account_holder: self.account_holder,
            },
            status: decode("withdrawal_requests.status", &self.status)?,
            admin_note: self.admin_note,
            processed_at: decode_optional_instant(
                "withdrawal_requests.processed_at",
                self.processed_at.as_deref(),
            )?,
            processed_by: decode_optional(
                "withdrawal_requests.processed_by",
                self.processed_by.as_deref(),
            )?,
            created_at: decode_instant("withdrawal_requests.created_at", &self.created_at)?,
            updated_at: decode_instant("withdrawal_requests.updated_at", &self.updated_at)?,
        })
    }
}

// ============================================================================
// Reviews, reports, notifications
// ============================================================================

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tutor_reviews)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TutorReviewRow {
    pub id: String,
    pub booking_id: String,
    pub course_id: String,
    pub tutor_id: String,
    pub student_id: String,
    pub review: Option<String>,
    pub rate: Option<i32>,
    pub recommend_by_student: i32,
    pub is_submitted: i32,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

impl TutorReviewRow {
    pub fn from_domain(review: &TutorReview) -> Self {
        Self {
            id: review.id.to_string(),
            booking_id: review.booking_id.to_string(),
            course_id: review.course_id.to_string(),
            tutor_id: review.tutor_id.to_string(),
            student_id: review.student_id.to_string(),
            review: review.review.clone(),
            rate: review.rate.map(|r| i32::from(r.value())),
            recommend_by_student: encode_bool(review.recommend_by_student),
            is_submitted: encode_bool(review.is_submitted),
            created_at: encode_instant(review.created_at),
            updated_at: encode_instant(review.updated_at),
            deleted_at: encode_optional_instant(review.deleted_at),
        }
    }

    pub fn into_domain(self) -> Result<TutorReview, PersistenceError> {
        let rate = self
            .rate
            .map(|r| Rating::new(i64::from(r)))
            .transpose()
            .map_err(|e| PersistenceError::CorruptRow {
                column: "tutor_reviews.rate",
                reason: e.to_string(),
            })?;
        Ok(TutorReview {
            id: decode("tutor_reviews.id", &self.id)?,
            booking_id: decode("tutor_reviews.booking_id", &self.booking_id)?,
            course_id: decode("tutor_reviews.course_id", &self.course_id)?,
            tutor_id: decode("tutor_reviews.tutor_id", &self.tutor_id)?,
            student_id: decode("tutor_reviews.student_id", &self.student_id)?,
            review: self.review,
            rate,
            recommend_by_student: decode_bool(self.recommend_by_student),
            is_submitted: decode_bool(self.is_submitted),
            created_at: decode_instant("tutor_reviews.created_at", &self.created_at)?,
            updated_at: decode_instant("tutor_reviews.updated_at", &self.updated_at)?,
            deleted_at: decode_optional_instant(
                "tutor_reviews.deleted_at",
                self.deleted_at.as_deref(),
            )?,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = report_bookings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReportRow {
    pub id: String,
    pub booking_id: String,
    pub student_id: String,
    pub topic: String,
    pub body: String,
    pub status: String,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

impl ReportRow {
    pub fn from_domain(report: &ReportBooking) -> Self {
        Self {
            id: report.id.to_string(),
            booking_id: report.booking_id.to_string(),
            student_id: report.student_id.to_string(),
            topic: report.topic.clone(),
            body: report.body.clone(),
            status: report.status.as_str().to_string(),
            resolved_by: report.resolved_by.map(|u| u.to_string()),
            resolved_at: encode_optional_instant(report.resolved_at),
            created_at: encode_instant(report.created_at),
            updated_at: encode_instant(report.updated_at),
            deleted_at: encode_optional_instant(report.deleted_at),
        }
    }

    pub fn into_domain(self) -> Result<ReportBooking, PersistenceError> {
        Ok(ReportBooking {
            id: decode("report_bookings.id", &self.id)?,
            booking_id: decode("report_bookings.booking_id", &self.booking_id)?,
            student_id: decode("report_bookings.student_id", &self.student_id)?,
            topic: self.topic,
            body: self.body,
            status: decode("report_bookings.status", &self.status)?,
            resolved_by: decode_optional("report_bookings.resolved_by", self.resolved_by.as_deref())?,
            resolved_at: decode_optional_instant(
                "report_bookings.resolved_at",
                self.resolved_at.as_deref(),
            )?,
            created_at: decode_instant("report_bookings.created_at", &self.created_at)?,
            updated_at: decode_instant("report_bookings.updated_at", &self.updated_at)?,
            deleted_at: decode_optional_instant(
                "report_bookings.deleted_at",
                self.deleted_at.as_deref(),
            )?,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NotificationRow {
    pub id: String,
    pub recipient_user_id: String,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub booking_id: Option<String>,
    pub created_at: String,
    pub read_at: Option<String>,
}

impl NotificationRow {
    pub fn from_domain(notification: &Notification) -> Self {
        Self {
            id: notification.id.to_string(),
            recipient_user_id: notification.recipient_user_id.to_string(),
            kind: notification.kind.as_str().to_string(),
            title: notification.title.clone(),
            body: notification.body.clone(),
            booking_id: notification.booking_id.map(|b| b.to_string()),
            created_at: encode_instant(notification.created_at),
            read_at: encode_optional_instant(notification.read_at),
        }
    }

    pub fn into_domain(self) -> Result<Notification, PersistenceError> {
        Ok(Notification {
            id: decode("notifications.id", &self.id)?,
            recipient_user_id: decode("notifications.recipient_user_id", &self.recipient_user_id)?,
            kind: decode("notifications.kind", &self.kind)?,
            title: self.title,
            body: self.body,
            booking_id: decode_optional("notifications.booking_id", self.booking_id.as_deref())?,
            created_at: decode_instant("notifications.created_at", &self.created_at)?,
            read_at: decode_optional_instant("notifications.read_at", self.read_at.as_deref())?,
        })
    }
}

/// Decodes a list of rows, failing on the first corrupt one.
pub(crate) fn decode_rows<R, T>(
    rows: Vec<R>,
    into_domain: impl Fn(R) -> Result<T, PersistenceError>,
) -> Result<Vec<T>, PersistenceError> {
    rows.into_iter().map(into_domain).collect()
}
