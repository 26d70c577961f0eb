// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the tutor booking lifecycle.
//!
//! Built on Diesel with the `SQLite` backend. Migrations are embedded and
//! applied on open; foreign key enforcement is verified at startup.
//!
//! ## Transactions
//!
//! All access goes through a [`Store`], a short-lived view over the
//! connection:
//!
//! - [`Persistence::transaction`] opens `BEGIN IMMEDIATE`, so the write
//!   lock is held from the first read. Admission reads, the booking insert,
//!   and ledger updates therefore see and produce one consistent state.
//! - [`Persistence::read`] runs plain reads with no transaction.
//!
//! Lock contention surfaces as [`PersistenceError::Transient`] once the
//! busy timeout elapses; retrying is the caller's decision.
//!
//! ## Testing
//!
//! [`Persistence::new_in_memory`] gives every caller its own shared-cache
//! in-memory database, so tests never observe each other.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

pub mod backend;
mod data_models;
mod diesel_schema;
mod error;
pub mod mutations;
pub mod queries;

#[cfg(test)]
mod tests;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tutor_booking::{AdmissionReader, LedgerEntry, TransitionResult};
use tutor_booking_domain::{
    BalanceTransaction, Booking, BookingId, CategoryId, Course, CourseId, CourseSchedule,
    Notification, NotificationId, NotificationKind, ReportBooking, ReportId, ReviewId, Student,
    StudentId, Tutor, TutorBalance, TutorId, TutorReview, UserId, WithdrawalId, WithdrawalRequest,
};

pub use data_models::{StatusHistoryEntry, encode_instant};
pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter owning one `SQLite` connection.
pub struct Persistence {
    conn: SqliteConnection,
}

/// Error raised inside a transaction body.
///
/// Keeps caller errors apart from Diesel errors so the caller's error type
/// only needs to convert from [`PersistenceError`].
enum TxFailure<E> {
    Aborted(E),
    Database(diesel::result::Error),
}

impl<E> From<diesel::result::Error> for TxFailure<E> {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(err)
    }
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    /// Runs `f` inside a `BEGIN IMMEDIATE` transaction.
    ///
    /// Commits when `f` returns `Ok`, rolls back otherwise.
    ///
    /// # Errors
    ///
    /// Returns the error of `f`, or a converted [`PersistenceError`] if the
    /// transaction cannot begin or commit.
    pub fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Store<'_>) -> Result<T, E>,
        E: From<PersistenceError>,
    {
        let outcome: Result<T, TxFailure<E>> = self.conn.immediate_transaction(|conn| {
            let mut store = Store { conn };
            f(&mut store).map_err(TxFailure::Aborted)
        });
        outcome.map_err(|failure| match failure {
            TxFailure::Aborted(err) => err,
            TxFailure::Database(err) => E::from(PersistenceError::from(err)),
        })
    }

    /// Runs read-only `f` without opening a transaction.
    ///
    /// # Errors
    ///
    /// Returns the error of `f`.
    pub fn read<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Store<'_>) -> Result<T, E>,
    {
        let mut store = Store {
            conn: &mut self.conn,
        };
        f(&mut store)
    }

    /// Lists the user tables of the migrated schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog query fails.
    pub fn list_tables(&mut self) -> Result<Vec<String>, PersistenceError> {
        backend::sqlite::list_tables(&mut self.conn)
    }

    /// Lists the columns of a table in declaration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_columns(&mut self, table: &str) -> Result<Vec<String>, PersistenceError> {
        backend::sqlite::list_columns(&mut self.conn, table)
    }
}

/// A view over the connection for the duration of one unit of work.
pub struct Store<'c> {
    conn: &'c mut SqliteConnection,
}

impl Store<'_> {
    // ========================================================================
    // Catalog
    // ========================================================================

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_course(&mut self, course_id: CourseId) -> Result<Option<Course>, PersistenceError> {
        queries::catalog::find_course(self.conn, course_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_tutor(&mut self, tutor_id: TutorId) -> Result<Option<Tutor>, PersistenceError> {
        queries::catalog::find_tutor(self.conn, tutor_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_tutor_by_user(
        &mut self,
        user_id: UserId,
    ) -> Result<Option<Tutor>, PersistenceError> {
        queries::catalog::find_tutor_by_user(self.conn, user_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_student(
        &mut self,
        student_id: StudentId,
    ) -> Result<Option<Student>, PersistenceError> {
        queries::catalog::find_student(self.conn, student_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_student_by_user(
        &mut self,
        user_id: UserId,
    ) -> Result<Option<Student>, PersistenceError> {
        queries::catalog::find_student_by_user(self.conn, user_id)
    }

    /// Seeds a tutor. For tests and local runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_tutor(&mut self, tutor: &Tutor) -> Result<(), PersistenceError> {
        mutations::catalog::insert_tutor(self.conn, tutor)
    }

    /// Seeds a student. For tests and local runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_student(&mut self, student: &Student) -> Result<(), PersistenceError> {
        mutations::catalog::insert_student(self.conn, student)
    }

    /// Seeds a course. For tests and local runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_course(&mut self, course: &Course) -> Result<(), PersistenceError> {
        mutations::catalog::insert_course(self.conn, course)
    }

    /// Seeds a schedule slot. For tests and local runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_course_schedule(
        &mut self,
        schedule: &CourseSchedule,
    ) -> Result<(), PersistenceError> {
        mutations::catalog::insert_course_schedule(self.conn, schedule)
    }

    /// # Errors
    ///
    /// Returns an error if the tutor does not exist or the update fails.
    pub fn increment_level_point(
        &mut self,
        tutor_id: TutorId,
        by: i64,
    ) -> Result<(), PersistenceError> {
        mutations::catalog::increment_level_point(self.conn, tutor_id, by)
    }

    // ========================================================================
    // Bookings
    // ========================================================================

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_booking(
        &mut self,
        booking_id: BookingId,
    ) -> Result<Option<Booking>, PersistenceError> {
        queries::bookings::find_booking(self.conn, booking_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_student_bookings(
        &mut self,
        student_id: StudentId,
    ) -> Result<Vec<Booking>, PersistenceError> {
        queries::bookings::list_student_bookings(self.conn, student_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_tutor_bookings(
        &mut self,
        tutor_id: TutorId,
    ) -> Result<Vec<Booking>, PersistenceError> {
        queries::bookings::list_tutor_bookings(self.conn, tutor_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_pending_expiring_between(
        &mut self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Booking>, PersistenceError> {
        queries::bookings::find_pending_expiring_between(self.conn, from, to, limit)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_pending_expired_before(
        &mut self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Booking>, PersistenceError> {
        queries::bookings::find_pending_expired_before(self.conn, now, limit)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_accepted_starting_between(
        &mut self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Booking>, PersistenceError> {
        queries::bookings::find_accepted_starting_between(self.conn, from, to, limit)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_unreviewed_started_before(
        &mut self,
        cutoff: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Booking>, PersistenceError> {
        queries::bookings::find_unreviewed_started_before(self.conn, cutoff, limit)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_status_history(
        &mut self,
        booking_id: BookingId,
    ) -> Result<Vec<StatusHistoryEntry>, PersistenceError> {
        queries::bookings::list_status_history(self.conn, booking_id)
    }

    /// # Errors
    ///
    /// Returns `UniqueViolation` on a code or slot collision.
    pub fn insert_booking(&mut self, result: &TransitionResult) -> Result<(), PersistenceError> {
        mutations::bookings::insert_booking(self.conn, result)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the persisted status moved on.
    pub fn persist_transition(
        &mut self,
        result: &TransitionResult,
    ) -> Result<(), PersistenceError> {
        mutations::bookings::persist_transition(self.conn, result)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the booking was already flagged.
    pub fn mark_reviewed(
        &mut self,
        booking_id: BookingId,
        now: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        mutations::bookings::mark_reviewed(self.conn, booking_id, now)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the booking is missing or already tombstoned.
    pub fn tombstone_booking(
        &mut self,
        booking_id: BookingId,
        deleted_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        mutations::bookings::tombstone_booking(self.conn, booking_id, deleted_by, now)
    }

    // ========================================================================
    // Ledger
    // ========================================================================

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_balance(&mut self, tutor_id: TutorId) -> Result<TutorBalance, PersistenceError> {
        queries::ledger::find_balance(self.conn, tutor_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_transactions(
        &mut self,
        tutor_id: TutorId,
    ) -> Result<Vec<BalanceTransaction>, PersistenceError> {
        queries::ledger::list_transactions(self.conn, tutor_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_withdrawal(
        &mut self,
        withdrawal_id: WithdrawalId,
    ) -> Result<Option<WithdrawalRequest>, PersistenceError> {
        queries::ledger::find_withdrawal(self.conn, withdrawal_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_withdrawals(
        &mut self,
        tutor_id: TutorId,
    ) -> Result<Vec<WithdrawalRequest>, PersistenceError> {
        queries::ledger::list_withdrawals(self.conn, tutor_id)
    }

    /// # Errors
    ///
    /// Returns an error if a write fails.
    pub fn apply_ledger_entry(&mut self, entry: &LedgerEntry) -> Result<(), PersistenceError> {
        mutations::ledger::apply_ledger_entry(self.conn, entry)
    }

    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_withdrawal(
        &mut self,
        withdrawal: &WithdrawalRequest,
    ) -> Result<(), PersistenceError> {
        mutations::ledger::insert_withdrawal(self.conn, withdrawal)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the withdrawal is no longer pending.
    pub fn update_withdrawal_decision(
        &mut self,
        withdrawal: &WithdrawalRequest,
    ) -> Result<(), PersistenceError> {
        mutations::ledger::update_withdrawal_decision(self.conn, withdrawal)
    }

    // ========================================================================
    // Reviews and reports
    // ========================================================================

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_review(
        &mut self,
        review_id: ReviewId,
    ) -> Result<Option<TutorReview>, PersistenceError> {
        queries::reviews::find_review(self.conn, review_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_review_by_booking(
        &mut self,
        booking_id: BookingId,
    ) -> Result<Option<TutorReview>, PersistenceError> {
        queries::reviews::find_review_by_booking(self.conn, booking_id)
    }

    /// # Errors
    ///
    /// Returns `UniqueViolation` if the booking already has a review.
    pub fn insert_review(&mut self, review: &TutorReview) -> Result<(), PersistenceError> {
        mutations::reviews::insert_review(self.conn, review)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the review is gone.
    pub fn update_review_submission(
        &mut self,
        review: &TutorReview,
    ) -> Result<(), PersistenceError> {
        mutations::reviews::update_review_submission(self.conn, review)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_report(
        &mut self,
        report_id: ReportId,
    ) -> Result<Option<ReportBooking>, PersistenceError> {
        queries::reports::find_report(self.conn, report_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_report_by_booking(
        &mut self,
        booking_id: BookingId,
    ) -> Result<Option<ReportBooking>, PersistenceError> {
        queries::reports::find_report_by_booking(self.conn, booking_id)
    }

    /// # Errors
    ///
    /// Returns `UniqueViolation` if the booking already has a report.
    pub fn insert_report(&mut self, report: &ReportBooking) -> Result<(), PersistenceError> {
        mutations::reports::insert_report(self.conn, report)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the report is no longer pending.
    pub fn update_report_resolution(
        &mut self,
        report: &ReportBooking,
    ) -> Result<(), PersistenceError> {
        mutations::reports::update_report_resolution(self.conn, report)
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_notifications(
        &mut self,
        user_id: UserId,
    ) -> Result<Vec<Notification>, PersistenceError> {
        queries::notifications::list_notifications(self.conn, user_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_notification(
        &mut self,
        notification_id: NotificationId,
    ) -> Result<Option<Notification>, PersistenceError> {
        queries::notifications::find_notification(self.conn, notification_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn has_booking_notification(
        &mut self,
        booking_id: BookingId,
        kind: NotificationKind,
    ) -> Result<bool, PersistenceError> {
        queries::notifications::has_booking_notification(self.conn, booking_id, kind)
    }

    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_notification(
        &mut self,
        notification: &Notification,
    ) -> Result<(), PersistenceError> {
        mutations::notifications::insert_notification(self.conn, notification)
    }

    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn mark_notification_read(
        &mut self,
        notification_id: NotificationId,
        now: DateTime<Utc>,
    ) -> Result<bool, PersistenceError> {
        mutations::notifications::mark_notification_read(self.conn, notification_id, now)
    }
}

impl AdmissionReader for Store<'_> {
    type Error = PersistenceError;

    fn find_course(&mut self, course_id: CourseId) -> Result<Option<Course>, Self::Error> {
        queries::catalog::find_course(self.conn, course_id)
    }

    fn find_course_schedules(
        &mut self,
        course_id: CourseId,
    ) -> Result<Vec<CourseSchedule>, Self::Error> {
        queries::catalog::find_course_schedules(self.conn, course_id)
    }

    fn find_student_bookings_at(
        &mut self,
        student_id: StudentId,
        booking_date: NaiveDate,
        booking_time: NaiveTime,
    ) -> Result<Vec<Booking>, Self::Error> {
        queries::bookings::find_student_bookings_at(self.conn, student_id, booking_date, booking_time)
    }

    fn find_free_booking_for_course(
        &mut self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Option<Booking>, Self::Error> {
        queries::bookings::find_free_booking_for_course(self.conn, student_id, course_id)
    }

    fn find_free_bookings_created_between(
        &mut self,
        student_id: StudentId,
        category_id: CategoryId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, Self::Error> {
        queries::bookings::find_free_bookings_created_between(
            self.conn,
            student_id,
            category_id,
            from,
            to,
        )
    }

    fn count_bookings_created_between(
        &mut self,
        student_id: StudentId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, Self::Error> {
        queries::bookings::count_bookings_created_between(self.conn, student_id, from, to)
    }

    fn find_student_bookings_in_category(
        &mut self,
        student_id: StudentId,
        category_id: CategoryId,
    ) -> Result<Vec<Booking>, Self::Error> {
        queries::bookings::find_student_bookings_in_category(self.conn, student_id, category_id)
    }
}
