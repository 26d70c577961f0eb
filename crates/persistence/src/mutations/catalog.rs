// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog mutations.
//!
//! The catalog belongs to the wider marketplace. Inserts here exist to seed
//! tests and local runs; the only write the booking lifecycle itself makes
//! is the tutor level point bump on a first review.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};
use tutor_booking_domain::{Course, CourseSchedule, Student, Tutor, TutorId};

use crate::data_models::{CourseRow, CourseScheduleRow, StudentRow, TutorRow};
use crate::diesel_schema::{course_schedules, courses, students, tutors};
use crate::error::PersistenceError;

/// Seeds a tutor.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_tutor(conn: &mut SqliteConnection, tutor: &Tutor) -> Result<(), PersistenceError> {
    debug!(tutor_id = %tutor.id, "Seeding tutor");
    diesel::insert_into(tutors::table)
        .values(&TutorRow::from_domain(tutor))
        .execute(conn)?;
    Ok(())
}

/// Seeds a student.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_student(
    conn: &mut SqliteConnection,
    student: &Student,
) -> Result<(), PersistenceError> {
    debug!(student_id = %student.id, "Seeding student");
    diesel::insert_into(students::table)
        .values(&StudentRow::from_domain(student))
        .execute(conn)?;
    Ok(())
}

/// Seeds a course.
///
/// # Errors
///
/// Returns an error if the insert fails, e.g. the tutor does not exist.
pub fn insert_course(conn: &mut SqliteConnection, course: &Course) -> Result<(), PersistenceError> {
    debug!(course_id = %course.id, "Seeding course");
    diesel::insert_into(courses::table)
        .values(&CourseRow::from_domain(course))
        .execute(conn)?;
    Ok(())
}

/// Seeds a schedule slot.
///
/// # Errors
///
/// Returns an error if the insert fails, e.g. the course does not exist.
pub fn insert_course_schedule(
    conn: &mut SqliteConnection,
    schedule: &CourseSchedule,
) -> Result<(), PersistenceError> {
    diesel::insert_into(course_schedules::table)
        .values(&CourseScheduleRow::from_domain(schedule))
        .execute(conn)?;
    Ok(())
}

/// Adds `by` to a tutor's level point.
///
/// # Errors
///
/// Returns `NotFound` if the tutor does not exist, or an error if the
/// update fails.
pub fn increment_level_point(
    conn: &mut SqliteConnection,
    tutor_id: TutorId,
    by: i64,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(tutors::table)
        .filter(tutors::id.eq(tutor_id.to_string()))
        .set(tutors::level_point.eq(tutors::level_point + by))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("tutor {tutor_id}")));
    }
    info!(tutor_id = %tutor_id, by, "Tutor level point incremented");
    Ok(())
}
