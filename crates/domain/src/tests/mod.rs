// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod ledger;

use crate::{
    Booking, BookingCode, BookingId, BookingStatus, CategoryId, ClassType, CourseId, Money,
    StudentId, Timezone, TutorId, UserId,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

pub fn instant(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// A pending online booking created at 2026-03-02 01:00 UTC for
/// Tuesday 2026-03-03 10:00 WIB, expiring six hours after creation.
pub fn create_test_booking() -> Booking {
    let created_at = instant(2026, 3, 2, 1, 0);
    let booking_date = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
    let booking_time = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
    Booking {
        id: BookingId::generate(),
        code: BookingCode::new(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(), "AB12C").unwrap(),
        course_id: CourseId::generate(),
        tutor_id: TutorId::generate(),
        student_id: StudentId::generate(),
        category_id: CategoryId::generate(),
        class_type: ClassType::Online,
        booking_date,
        booking_time,
        timezone: Timezone::Wib,
        session_starts_at: Timezone::Wib.combine(booking_date, booking_time).unwrap(),
        location: None,
        notes_for_tutor: None,
        notes_for_student: None,
        is_free_first_course: false,
        gross_amount: Money::from_minor(20_000_000),
        status: BookingStatus::Pending,
        is_reviewed: false,
        expired_at: created_at + Duration::hours(6),
        created_at,
        updated_at: created_at,
        deleted_at: None,
        created_by: UserId::generate(),
        updated_by: None,
        deleted_by: None,
    }
}
