// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;
use tutor_booking_domain::{Course, CourseId, CourseSchedule, Student, StudentId, Tutor, TutorId, UserId};

use crate::data_models::{CourseRow, CourseScheduleRow, StudentRow, TutorRow, decode_rows};
use crate::diesel_schema::{course_schedules, courses, students, tutors};
use crate::error::PersistenceError;

/// Retrieves a live course by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_course(
    conn: &mut SqliteConnection,
    course_id: CourseId,
) -> Result<Option<Course>, PersistenceError> {
    debug!(course_id = %course_id, "Looking up course");
    courses::table
        .filter(courses::id.eq(course_id.to_string()))
        .filter(courses::deleted_at.is_null())
        .select(CourseRow::as_select())
        .first::<CourseRow>(conn)
        .optional()?
        .map(CourseRow::into_domain)
        .transpose()
}

/// Lists the schedule slots of a course.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn find_course_schedules(
    conn: &mut SqliteConnection,
    course_id: CourseId,
) -> Result<Vec<CourseSchedule>, PersistenceError> {
    let rows: Vec<CourseScheduleRow> = course_schedules::table
        .filter(course_schedules::course_id.eq(course_id.to_string()))
        .order((course_schedules::day_of_week.asc(), course_schedules::start_time.asc()))
        .select(CourseScheduleRow::as_select())
        .load(conn)?;
    decode_rows(rows, CourseScheduleRow::into_domain)
}

/// Retrieves a live tutor by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_tutor(
    conn: &mut SqliteConnection,
    tutor_id: TutorId,
) -> Result<Option<Tutor>, PersistenceError> {
    tutors::table
        .filter(tutors::id.eq(tutor_id.to_string()))
        .filter(tutors::deleted_at.is_null())
        .select(TutorRow::as_select())
        .first::<TutorRow>(conn)
        .optional()?
        .map(TutorRow::into_domain)
        .transpose()
}

/// Retrieves the live tutor profile of a user.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_tutor_by_user(
    conn: &mut SqliteConnection,
    user_id: UserId,
) -> Result<Option<Tutor>, PersistenceError> {
    tutors::table
        .filter(tutors::user_id.eq(user_id.to_string()))
        .filter(tutors::deleted_at.is_null())
        .select(TutorRow::as_select())
        .first::<TutorRow>(conn)
        .optional()?
        .map(TutorRow::into_domain)
        .transpose()
}

/// Retrieves a live student by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_student(
    conn: &mut SqliteConnection,
    student_id: StudentId,
) -> Result<Option<Student>, PersistenceError> {
    students::table
        .filter(students::id.eq(student_id.to_string()))
        .filter(students::deleted_at.is_null())
        .select(StudentRow::as_select())
        .first::<StudentRow>(conn)
        .optional()?
        .map(StudentRow::into_domain)
        .transpose()
}

/// Retrieves the live student profile of a user.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_student_by_user(
    conn: &mut SqliteConnection,
    user_id: UserId,
) -> Result<Option<Student>, PersistenceError> {
    students::table
        .filter(students::user_id.eq(user_id.to_string()))
        .filter(students::deleted_at.is_null())
        .select(StudentRow::as_select())
        .first::<StudentRow>(conn)
        .optional()?
        .map(StudentRow::into_domain)
        .transpose()
}
