// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::AdmissionReader;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use std::convert::Infallible;
use tutor_booking_domain::{
    Booking, BookingCode, BookingId, BookingRequest, BookingStatus, CategoryId, ClassType, Course,
    CourseId, CourseSchedule, DayOfWeek, Money, ScheduleId, StudentId, Timezone, TutorId, UserId,
};

pub fn instant(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Monday 2026-03-02 01:00 UTC (08:00 WIB).
pub fn test_now() -> DateTime<Utc> {
    instant(2026, 3, 2, 1, 0)
}

/// Tuesday 2026-03-03.
pub fn session_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 3).unwrap()
}

pub fn session_time() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).unwrap()
}

pub fn create_test_course(class_type: ClassType, free: bool) -> Course {
    Course {
        id: CourseId::generate(),
        tutor_id: TutorId::generate(),
        category_id: CategoryId::generate(),
        title: String::from("Calculus I"),
        is_published: true,
        is_free_first_course: free,
        class_type,
        price: Money::from_minor(20_000_000),
        deleted_at: None,
    }
}

pub fn create_test_schedule(course: &Course, class_type: ClassType) -> CourseSchedule {
    CourseSchedule {
        id: ScheduleId::generate(),
        course_id: course.id,
        day_of_week: DayOfWeek::of_date(session_date()),
        start_time: session_time(),
        timezone: Timezone::Wib,
        class_type,
    }
}

pub fn create_test_request(student_id: StudentId, course: &Course) -> BookingRequest {
    BookingRequest {
        student_id,
        course_id: course.id,
        class_type: ClassType::Online,
        booking_date: session_date(),
        booking_time: session_time(),
        timezone: Timezone::Wib,
        latitude: None,
        longitude: None,
        notes: None,
    }
}

/// A booking of `student_id` on `course` at the standard session slot.
pub fn create_test_booking(
    student_id: StudentId,
    course: &Course,
    status: BookingStatus,
    created_at: DateTime<Utc>,
) -> Booking {
    Booking {
        id: BookingId::generate(),
        code: BookingCode::new(created_at.date_naive(), "TEST0").unwrap(),
        course_id: course.id,
        tutor_id: course.tutor_id,
        student_id,
        category_id: course.category_id,
        class_type: ClassType::Online,
        booking_date: session_date(),
        booking_time: session_time(),
        timezone: Timezone::Wib,
        session_starts_at: Timezone::Wib.combine(session_date(), session_time()).unwrap(),
        location: None,
        notes_for_tutor: None,
        notes_for_student: None,
        is_free_first_course: false,
        gross_amount: course.price,
        status,
        is_reviewed: false,
        expired_at: created_at + chrono::Duration::hours(6),
        created_at,
        updated_at: created_at,
        deleted_at: None,
        created_by: UserId::generate(),
        updated_by: None,
        deleted_by: None,
    }
}

/// In-memory admission reader over plain vectors.
#[derive(Debug, Default)]
pub struct FakeReader {
    pub courses: Vec<Course>,
    pub schedules: Vec<CourseSchedule>,
    pub bookings: Vec<Booking>,
}

impl FakeReader {
    fn live(&self) -> impl Iterator<Item = &Booking> {
        self.bookings.iter().filter(|b| b.deleted_at.is_none())
    }
}

impl AdmissionReader for FakeReader {
    type Error = Infallible;

    fn find_course(&mut self, course_id: CourseId) -> Result<Option<Course>, Infallible> {
        Ok(self.courses.iter().find(|c| c.id == course_id).cloned())
    }

    fn find_course_schedules(
        &mut self,
        course_id: CourseId,
    ) -> Result<Vec<CourseSchedule>, Infallible> {
        Ok(self
            .schedules
            .iter()
            .filter(|s| s.course_id == course_id)
            .cloned()
            .collect())
    }

    fn find_student_bookings_at(
        &mut self,
        student_id: StudentId,
        booking_date: NaiveDate,
        booking_time: NaiveTime,
    ) -> Result<Vec<Booking>, Infallible> {
        Ok(self
            .live()
            .filter(|b| {
                b.student_id == student_id
                    && b.booking_date == booking_date
                    && b.booking_time == booking_time
            })
            .cloned()
            .collect())
    }

    fn find_free_booking_for_course(
        &mut self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Option<Booking>, Infallible> {
        Ok(self
            .live()
            .find(|b| b.student_id == student_id && b.course_id == course_id && b.is_free_first_course)
            .cloned())
    }

    fn find_free_bookings_created_between(
        &mut self,
        student_id: StudentId,
        category_id: CategoryId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, Infallible> {
        let mut found: Vec<Booking> = self
            .live()
            .filter(|b| {
                b.student_id == student_id
                    && b.category_id == category_id
                    && b.is_free_first_course
                    && b.created_at >= from
                    && b.created_at < to
            })
            .cloned()
            .collect();
        found.sort_by_key(|b| b.created_at);
        Ok(found)
    }

    fn count_bookings_created_between(
        &mut self,
        student_id: StudentId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, Infallible> {
        Ok(self
            .live()
            .filter(|b| b.student_id == student_id && b.created_at >= from && b.created_at < to)
            .count() as u64)
    }

    fn find_student_bookings_in_category(
        &mut self,
        student_id: StudentId,
        category_id: CategoryId,
    ) -> Result<Vec<Booking>, Infallible> {
        Ok(self
            .live()
            .filter(|b| b.student_id == student_id && b.category_id == category_id)
            .cloned()
            .collect())
    }
}
