// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    FakeReader, create_test_booking, create_test_course, create_test_request,
    create_test_schedule, instant, test_now,
};
use crate::{AdmissionError, BookingConfig, evaluate_admission, local_day_bounds};
use chrono::{Duration, NaiveTime};
use tutor_booking_domain::{BookingStatus, ClassType, DomainError, StudentId, Timezone};

fn reader_with(class_type: ClassType, free: bool) -> FakeReader {
    let course = create_test_course(class_type, free);
    let schedule = create_test_schedule(&course, class_type);
    FakeReader {
        courses: vec![course],
        schedules: vec![schedule],
        bookings: Vec::new(),
    }
}

fn rejection<E: std::fmt::Debug>(result: Result<crate::Admission, AdmissionError<E>>) -> DomainError {
    match result {
        Err(AdmissionError::Rejected(err)) => err,
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn test_admits_valid_request_with_deadline() {
    let mut reader = reader_with(ClassType::All, false);
    let course = reader.courses[0].clone();
    let request = create_test_request(StudentId::generate(), &course);
    let config = BookingConfig::default();

    let admission = evaluate_admission(&mut reader, &request, &config, test_now()).unwrap();

    assert_eq!(admission.expired_at, test_now() + Duration::hours(6));
    assert_eq!(admission.session_starts_at, instant(2026, 3, 3, 3, 0));
    assert!(!admission.is_free_first_course);
    assert!(admission.location.is_none());
}

#[test]
fn test_unknown_course_is_not_found() {
    let mut reader = reader_with(ClassType::All, false);
    let mut request = create_test_request(StudentId::generate(), &reader.courses[0].clone());
    request.course_id = tutor_booking_domain::CourseId::generate();

    let err = rejection(evaluate_admission(
        &mut reader,
        &request,
        &BookingConfig::default(),
        test_now(),
    ));
    assert_eq!(err, DomainError::NotFound { entity: "course" });
}

#[test]
fn test_unpublished_or_incompatible_course_is_not_found() {
    let mut reader = reader_with(ClassType::Offline, false);
    let course = reader.courses[0].clone();
    let request = create_test_request(StudentId::generate(), &course);

    let err = rejection(evaluate_admission(
        &mut reader,
        &request,
        &BookingConfig::default(),
        test_now(),
    ));
    assert_eq!(err, DomainError::NotFound { entity: "course" });

    let mut reader = reader_with(ClassType::All, false);
    reader.courses[0].is_published = false;
    let course = reader.courses[0].clone();
    let request = create_test_request(StudentId::generate(), &course);
    let err = rejection(evaluate_admission(
        &mut reader,
        &request,
        &BookingConfig::default(),
        test_now(),
    ));
    assert_eq!(err, DomainError::NotFound { entity: "course" });
}

#[test]
fn test_schedule_must_match_day_time_and_timezone() {
    let mut reader = reader_with(ClassType::All, false);
    let course = reader.courses[0].clone();

    let mut request = create_test_request(StudentId::generate(), &course);
    request.booking_time = NaiveTime::from_hms_opt(11, 0, 0).unwrap();
    let err = rejection(evaluate_admission(
        &mut reader,
        &request,
        &BookingConfig::default(),
        test_now(),
    ));
    assert_eq!(err, DomainError::NotFound { entity: "schedule" });

    let mut request = create_test_request(StudentId::generate(), &course);
    request.timezone = Timezone::Wita;
    let err = rejection(evaluate_admission(
        &mut reader,
        &request,
        &BookingConfig::default(),
        test_now(),
    ));
    assert_eq!(err, DomainError::NotFound { entity: "schedule" });

    let mut request = create_test_request(StudentId::generate(), &course);
    request.booking_date = request.booking_date.succ_opt().unwrap();
    let err = rejection(evaluate_admission(
        &mut reader,
        &request,
        &BookingConfig::default(),
        test_now(),
    ));
    assert_eq!(err, DomainError::NotFound { entity: "schedule" });
}

#[test]
fn test_live_booking_at_same_slot_conflicts() {
    let mut reader = reader_with(ClassType::All, false);
    let course = reader.courses[0].clone();
    let student = StudentId::generate();
    let existing = create_test_booking(student, &course, BookingStatus::Pending, test_now());
    reader.bookings.push(existing.clone());

    let request = create_test_request(student, &course);
    let err = rejection(evaluate_admission(
        &mut reader,
        &request,
        &BookingConfig::default(),
        test_now() + Duration::minutes(5),
    ));
    match err {
        DomainError::StudentAlreadyHasAnotherSchedule { conflicting } => {
            assert_eq!(conflicting.id, existing.id);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_effectively_expired_booking_frees_the_slot() {
    let mut reader = reader_with(ClassType::All, false);
    let course = reader.courses[0].clone();
    let student = StudentId::generate();
    let stale = create_test_booking(student, &course, BookingStatus::Pending, test_now());
    reader.bookings.push(stale.clone());

    let later = stale.expired_at + Duration::minutes(1);
    let request = create_test_request(student, &course);
    let admission =
        evaluate_admission(&mut reader, &request, &BookingConfig::default(), later).unwrap();

    assert_eq!(admission.stale_pending.len(), 1);
    assert_eq!(admission.stale_pending[0].id, stale.id);
}

#[test]
fn test_declined_and_tombstoned_bookings_do_not_conflict() {
    let mut reader = reader_with(ClassType::All, false);
    let course = reader.courses[0].clone();
    let student = StudentId::generate();
    reader.bookings.push(create_test_booking(
        student,
        &course,
        BookingStatus::Declined,
        test_now(),
    ));
    let mut deleted = create_test_booking(student, &course, BookingStatus::Accepted, test_now());
    deleted.deleted_at = Some(test_now());
    reader.bookings.push(deleted);

    let request = create_test_request(student, &course);
    assert!(
        evaluate_admission(&mut reader, &request, &BookingConfig::default(), test_now()).is_ok()
    );
}

#[test]
fn test_offline_requires_coordinates() {
    let mut reader = reader_with(ClassType::All, false);
    let course = reader.courses[0].clone();
    let mut request = create_test_request(StudentId::generate(), &course);
    request.class_type = ClassType::Offline;
    request.latitude = Some(-6.2);
    request.longitude = Some(0.0);

    let err = rejection(evaluate_admission(
        &mut reader,
        &request,
        &BookingConfig::default(),
        test_now(),
    ));
    assert_eq!(err, DomainError::OfflineRequiresCoordinates);

    request.longitude = Some(106.8);
    let admission =
        evaluate_admission(&mut reader, &request, &BookingConfig::default(), test_now()).unwrap();
    assert!(admission.location.is_some());
}

#[test]
fn test_first_free_booking_is_flagged_free() {
    let mut reader = reader_with(ClassType::All, true);
    let course = reader.courses[0].clone();
    let request = create_test_request(StudentId::generate(), &course);

    let admission =
        evaluate_admission(&mut reader, &request, &BookingConfig::default(), test_now()).unwrap();
    assert!(admission.is_free_first_course);
}

#[test]
fn test_repeat_course_after_free_booking_is_paid() {
    let mut reader = reader_with(ClassType::All, true);
    let course = reader.courses[0].clone();
    let student = StudentId::generate();
    let mut earlier = create_test_booking(
        student,
        &course,
        BookingStatus::Accepted,
        test_now() - Duration::days(3),
    );
    earlier.is_free_first_course = true;
    earlier.booking_date = earlier.booking_date.pred_opt().unwrap();
    reader.bookings.push(earlier);

    let request = create_test_request(student, &course);
    let admission =
        evaluate_admission(&mut reader, &request, &BookingConfig::default(), test_now()).unwrap();
    assert!(!admission.is_free_first_course);
}

#[test]
fn test_free_quota_per_category_per_day() {
    let mut reader = reader_with(ClassType::All, true);
    let first_course = reader.courses[0].clone();
    let student = StudentId::generate();

    // A free booking on another course in the same category, created today.
    let mut sibling = create_test_course(ClassType::All, true);
    sibling.category_id = first_course.category_id;
    let mut used = create_test_booking(student, &sibling, BookingStatus::Pending, test_now());
    used.is_free_first_course = true;
    used.booking_date = used.booking_date.pred_opt().unwrap();
    reader.bookings.push(used.clone());

    let request = create_test_request(student, &first_course);
    let err = rejection(evaluate_admission(
        &mut reader,
        &request,
        &BookingConfig::default(),
        test_now() + Duration::hours(1),
    ));
    match err {
        DomainError::MaxBookingFreeFirstCourse { limit, earliest } => {
            assert_eq!(limit, 1);
            assert_eq!(earliest.map(|b| b.id), Some(used.id));
        }
        other => panic!("unexpected {other:?}"),
    }

    // The next local day the quota resets.
    let tomorrow = instant(2026, 3, 2, 17, 30);
    assert!(evaluate_admission(&mut reader, &request, &BookingConfig::default(), tomorrow).is_ok());
}

#[test]
fn test_per_day_cap() {
    let mut reader = reader_with(ClassType::All, false);
    let course = reader.courses[0].clone();
    let student = StudentId::generate();
    let mut other = create_test_booking(student, &course, BookingStatus::Declined, test_now());
    other.booking_date = other.booking_date.pred_opt().unwrap();
    reader.bookings.push(other);

    let config = BookingConfig {
        max_booking_per_day: Some(1),
        ..BookingConfig::default()
    };
    let request = create_test_request(student, &course);
    let err = rejection(evaluate_admission(&mut reader, &request, &config, test_now()));
    assert_eq!(err, DomainError::MaxBookingPerDay { limit: 1 });
}

#[test]
fn test_per_category_cap_counts_live_bookings() {
    let mut reader = reader_with(ClassType::All, false);
    let course = reader.courses[0].clone();
    let student = StudentId::generate();
    let mut live = create_test_booking(
        student,
        &course,
        BookingStatus::Accepted,
        test_now() - Duration::days(2),
    );
    live.booking_date = live.booking_date.pred_opt().unwrap();
    reader.bookings.push(live);

    let config = BookingConfig {
        max_booking_per_category: Some(1),
        ..BookingConfig::default()
    };
    let request = create_test_request(student, &course);
    let err = rejection(evaluate_admission(&mut reader, &request, &config, test_now()));
    assert_eq!(err, DomainError::MaxBookingPerCategory { limit: 1 });
}

#[test]
fn test_checks_run_in_order() {
    // Unknown schedule wins over missing coordinates.
    let mut reader = reader_with(ClassType::All, false);
    let course = reader.courses[0].clone();
    let mut request = create_test_request(StudentId::generate(), &course);
    request.class_type = ClassType::Offline;
    request.booking_time = NaiveTime::from_hms_opt(7, 0, 0).unwrap();

    let err = rejection(evaluate_admission(
        &mut reader,
        &request,
        &BookingConfig::default(),
        test_now(),
    ));
    assert_eq!(err, DomainError::NotFound { entity: "schedule" });
}

#[test]
fn test_local_day_bounds_follow_wib() {
    let (start, end) = local_day_bounds(test_now(), Timezone::Wib).unwrap();
    assert_eq!(start, instant(2026, 3, 1, 17, 0));
    assert_eq!(end, instant(2026, 3, 2, 17, 0));
}
