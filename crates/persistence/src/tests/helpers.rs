// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use tutor_booking::{
    Admission, AdmissionError, BookingConfig, TransitionResult, create_booking, evaluate_admission,
};
use tutor_booking_audit::{Actor, ActorRole};
use tutor_booking_domain::{
    BookingCode, BookingRequest, CategoryId, ClassType, Course, CourseId, CourseSchedule,
    DayOfWeek, Money, ScheduleId, Student, StudentId, Timezone, Tutor, TutorId, UserId,
};

use crate::{Persistence, PersistenceError};

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

/// A seeded tutor, student and one published online course with a slot on
/// Tuesdays 10:00 WIB.
pub struct Fixture {
    pub db: Persistence,
    pub tutor: Tutor,
    pub student: Student,
    pub course: Course,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_course(false)
    }

    pub fn with_course(free_first_course: bool) -> Self {
        let mut db = Persistence::new_in_memory().unwrap();
        let tutor = Tutor {
            id: TutorId::generate(),
            user_id: UserId::generate(),
            name: String::from("Budi Santoso"),
            response_time: Some(String::from("1h")),
            level_point: 0,
            deleted_at: None,
        };
        let student = Student {
            id: StudentId::generate(),
            user_id: UserId::generate(),
            name: String::from("Siti Rahma"),
            deleted_at: None,
        };
        let course = Course {
            id: CourseId::generate(),
            tutor_id: tutor.id,
            category_id: CategoryId::generate(),
            title: String::from("Calculus I"),
            is_published: true,
            is_free_first_course: free_first_course,
            class_type: ClassType::All,
            price: Money::from_minor(20_000_000),
            deleted_at: None,
        };
        let schedule = CourseSchedule {
            id: ScheduleId::generate(),
            course_id: course.id,
            day_of_week: DayOfWeek::of_date(session_date()),
            start_time: session_time(),
            timezone: Timezone::Wib,
            class_type: ClassType::All,
        };
        db.transaction(|store| -> Result<(), PersistenceError> {
            store.insert_tutor(&tutor)?;
            store.insert_student(&student)?;
            store.insert_course(&course)?;
            store.insert_course_schedule(&schedule)
        })
        .unwrap();

        Self {
            db,
            tutor,
            student,
            course,
        }
    }

    pub fn request(&self) -> BookingRequest {
        BookingRequest {
            student_id: self.student.id,
            course_id: self.course.id,
            class_type: ClassType::Online,
            booking_date: session_date(),
            booking_time: session_time(),
            timezone: Timezone::Wib,
            latitude: None,
            longitude: None,
            notes: Some(String::from("Chapter 3 please")),
        }
    }

    pub fn student_actor(&self) -> Actor {
        Actor::user(self.student.user_id, ActorRole::Student)
    }

    pub fn tutor_actor(&self) -> Actor {
        Actor::user(self.tutor.user_id, ActorRole::Tutor)
    }

    /// Admits and inserts a booking in one transaction.
    pub fn book(&mut self, suffix: &str, now: DateTime<Utc>) -> TransitionResult {
        let request = self.request();
        let config = BookingConfig::default();
        let created_by = self.student.user_id;
        let actor = self.student_actor();
        self.db
            .transaction(|store| -> Result<TransitionResult, PersistenceError> {
                let admission: Admission = match evaluate_admission(store, &request, &config, now)
                {
                    Ok(admission) => admission,
                    Err(AdmissionError::Store(err)) => return Err(err),
                    Err(AdmissionError::Rejected(err)) => panic!("admission rejected: {err}"),
                };
                let code = BookingCode::new(now.date_naive(), suffix).unwrap();
                let result = create_booking(&request, &admission, code, created_by, actor, now);
                store.insert_booking(&result)?;
                Ok(result)
            })
            .unwrap()
    }
}
