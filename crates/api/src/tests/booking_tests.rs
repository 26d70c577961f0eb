// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::Duration;
use std::sync::Arc;
use tutor_booking::{BookingConfig, SequenceCodeGenerator};
use tutor_booking_audit::ActorRole;
use tutor_booking_domain::{BookingStatus, ErrorKind, Money, NotificationKind};

use super::helpers::{Harness, PRICE_MINOR, session_start, test_now};
use crate::{
    ApiError, CreateBookingRequest, RespondBookingRequest, accept_booking, create_booking,
    decline_booking, delete_booking, get_booking, get_balance, list_booking_history,
    list_notifications, list_student_bookings, list_tutor_bookings,
};

fn notes(text: &str) -> RespondBookingRequest {
    RespondBookingRequest {
        notes: Some(text.to_string()),
    }
}

#[test]
fn test_create_booking_is_pending_with_dated_code() {
    let mut harness = Harness::new();
    let booking = harness.book();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert!(booking.code.to_string().starts_with("BK20260302"));
    assert_eq!(booking.code.to_string().len(), 15);
    assert_eq!(booking.expired_at, test_now() + Duration::hours(6));
    assert_eq!(booking.session_starts_at, session_start());
    assert_eq!(booking.gross_amount, Money::from_minor(PRICE_MINOR));
    assert!(!booking.is_free_first_course);
    assert_eq!(booking.tutor_id, harness.tutor.id);

    assert_eq!(
        harness.notifier.count(NotificationKind::StudentBookingCreated),
        1
    );
    let tutor_actor = harness.tutor_actor();
    let inbox = list_notifications(
        &mut harness.db,
        &tutor_actor,
        &harness.tutor.user_id.to_string(),
    )
    .unwrap();
    assert_eq!(inbox.notifications.len(), 1);
    assert_eq!(inbox.unread, 1);
}

#[test]
fn test_only_students_create_bookings() {
    let mut harness = Harness::new();
    let tutor = harness.tutor_actor();
    let request = harness.request();

    let err = create_booking(&mut harness.db, &harness.env, &tutor, &request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[test]
fn test_malformed_requests_are_bad_requests() {
    let mut harness = Harness::new();
    let student = harness.student_actor();

    let mut request = harness.request();
    request.class_type = String::from("all");
    let err = create_booking(&mut harness.db, &harness.env, &student, &request).unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "classType"));

    let mut request = harness.request();
    request.booking_date = String::from("03/03/2026");
    let err = create_booking(&mut harness.db, &harness.env, &student, &request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadRequest);

    let mut request = harness.request();
    request.timezone = Some(String::from("UTC"));
    let err = create_booking(&mut harness.db, &harness.env, &student, &request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadRequest);

    let mut request = harness.request();
    request.course_id = String::from("not-a-course");
    let err = create_booking(&mut harness.db, &harness.env, &student, &request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadRequest);
}

#[test]
fn test_unknown_slot_is_not_found() {
    let mut harness = Harness::new();
    let student = harness.student_actor();
    let mut request = harness.request();
    request.booking_time = String::from("11:00:00");

    let err = create_booking(&mut harness.db, &harness.env, &student, &request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(matches!(err, ApiError::ResourceNotFound { ref resource_type, .. } if resource_type == "schedule"));
}

#[test]
fn test_offline_booking_requires_coordinates() {
    let mut harness = Harness::new();
    let student = harness.student_actor();
    let mut request = harness.request();
    request.class_type = String::from("offline");

    let err = create_booking(&mut harness.db, &harness.env, &student, &request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadRequest);

    request.latitude = Some(-6.2);
    request.longitude = Some(106.816_666);
    let booking = harness.book_as(&student, &request);
    assert_eq!(booking.latitude, Some(-6.2));
}

#[test]
fn test_double_booking_returns_conflicting_booking() {
    let mut harness = Harness::new();
    let first = harness.book();
    let student = harness.student_actor();
    let request = harness.request();

    let err = create_booking(&mut harness.db, &harness.env, &student, &request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StudentAlreadyHasAnotherSchedule);
    assert_eq!(err.payload().map(|booking| booking.id), Some(first.id));

    let listed = list_student_bookings(
        &mut harness.db,
        &harness.env,
        &student,
        &harness.student.id.to_string(),
    )
    .unwrap();
    assert_eq!(listed.bookings.len(), 1);
}

#[test]
fn test_accepted_booking_credits_tutor() {
    let mut harness = Harness::new();
    let booking = harness.book();
    harness.advance(Duration::minutes(30));

    let response = harness.accept(booking.id);
    assert_eq!(response.booking.status, BookingStatus::Accepted);
    assert_eq!(
        response.booking.notes_for_student.as_deref(),
        Some("See you there")
    );
    assert_eq!(response.credited, Some(Money::from_minor(18_000_000)));
    assert_eq!(response.commission, Some(Money::from_minor(2_000_000)));

    let tutor = harness.tutor_actor();
    let balance = get_balance(&mut harness.db, &tutor, &harness.tutor.id.to_string()).unwrap();
    assert_eq!(balance.balance, Money::from_minor(18_000_000));
    assert_eq!(balance.transactions.len(), 1);
    assert!(balance.consistent);
    assert_eq!(harness.notifier.count(NotificationKind::BookingAccepted), 1);
}

#[test]
fn test_only_the_course_tutor_may_respond() {
    let mut harness = Harness::new();
    let booking = harness.book();
    let (_, other_tutor) = harness.add_tutor("Andi Wijaya");

    let err = accept_booking(
        &mut harness.db,
        &harness.env,
        &other_tutor,
        &booking.id.to_string(),
        &notes("mine"),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let student = harness.student_actor();
    let err = accept_booking(
        &mut harness.db,
        &harness.env,
        &student,
        &booking.id.to_string(),
        &notes("self"),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[test]
fn test_decline_leaves_ledger_untouched() {
    let mut harness = Harness::new();
    let booking = harness.book();
    let tutor = harness.tutor_actor();

    let response = decline_booking(
        &mut harness.db,
        &harness.env,
        &tutor,
        &booking.id.to_string(),
        &notes("Fully booked"),
    )
    .unwrap();
    assert_eq!(response.booking.status, BookingStatus::Declined);
    assert_eq!(response.credited, None);

    let balance = get_balance(&mut harness.db, &tutor, &harness.tutor.id.to_string()).unwrap();
    assert_eq!(balance.balance, Money::ZERO);
    assert!(balance.transactions.is_empty());
    assert_eq!(harness.notifier.count(NotificationKind::BookingDeclined), 1);
}

#[test]
fn test_terminal_status_is_final() {
    let mut harness = Harness::new();
    let booking = harness.book();
    harness.accept(booking.id);
    let tutor = harness.tutor_actor();

    let err = decline_booking(
        &mut harness.db,
        &harness.env,
        &tutor,
        &booking.id.to_string(),
        &notes("changed my mind"),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BookingAlreadyExists);

    let balance = get_balance(&mut harness.db, &tutor, &harness.tutor.id.to_string()).unwrap();
    assert_eq!(balance.transactions.len(), 1);
}

#[test]
fn test_overdue_booking_reads_expired_and_cannot_be_accepted() {
    let mut harness = Harness::new();
    let booking = harness.book();
    harness.advance(Duration::hours(6) + Duration::minutes(1));

    let student = harness.student_actor();
    let read = get_booking(
        &mut harness.db,
        &harness.env,
        &student,
        &booking.id.to_string(),
    )
    .unwrap();
    assert_eq!(read.status, BookingStatus::Expired);

    let tutor = harness.tutor_actor();
    let err = accept_booking(
        &mut harness.db,
        &harness.env,
        &tutor,
        &booking.id.to_string(),
        &notes("late"),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadRequest);
    let balance = get_balance(&mut harness.db, &tutor, &harness.tutor.id.to_string()).unwrap();
    assert_eq!(balance.balance, Money::ZERO);
}

#[test]
fn test_rebooking_a_stale_slot_expires_the_old_booking() {
    let mut harness = Harness::new();
    let first = harness.book();
    harness.advance(Duration::hours(7));

    let second = harness.book();
    assert_ne!(second.id, first.id);
    assert_eq!(second.status, BookingStatus::Pending);

    let student = harness.student_actor();
    let history =
        list_booking_history(&mut harness.db, &student, &first.id.to_string()).unwrap();
    let last = history.history.last().unwrap();
    assert_eq!(last.new_status, BookingStatus::Expired);
    assert_eq!(last.actor_role, ActorRole::System);
    assert_eq!(harness.notifier.count(NotificationKind::BookingExpired), 1);
}

#[test]
fn test_code_collision_draws_a_new_code() {
    let codes = SequenceCodeGenerator::new(["AAAA1", "AAAA1", "BBBB2"]);
    let mut harness = Harness::with_codes(BookingConfig::default(), Arc::new(codes));
    let first = harness.book();
    assert!(first.code.to_string().ends_with("AAAA1"));

    let (_, other) = harness.add_student("Dewi Lestari");
    let request = harness.request();
    let second = harness.book_as(&other, &request);
    assert!(second.code.to_string().ends_with("BBBB2"));
}

#[test]
fn test_code_collisions_give_up_after_the_retry_limit() {
    let config = BookingConfig {
        code_retry_limit: 3,
        ..BookingConfig::default()
    };
    let codes = SequenceCodeGenerator::new(["AAAA1"]);
    let mut harness = Harness::with_codes(config, Arc::new(codes));
    harness.book();

    let (other_student, other) = harness.add_student("Dewi Lestari");
    let request = harness.request();
    let err = create_booking(&mut harness.db, &harness.env, &other, &request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let listed = list_student_bookings(
        &mut harness.db,
        &harness.env,
        &other,
        &other_student.id.to_string(),
    )
    .unwrap();
    assert!(listed.bookings.is_empty());
}

#[test]
fn test_booking_reads_are_limited_to_parties() {
    let mut harness = Harness::new();
    let booking = harness.book();
    let (other_student, other) = harness.add_student("Dewi Lestari");
    let (other_tutor_profile, other_tutor) = harness.add_tutor("Andi Wijaya");

    let err = get_booking(
        &mut harness.db,
        &harness.env,
        &other,
        &booking.id.to_string(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    let err = get_booking(
        &mut harness.db,
        &harness.env,
        &other_tutor,
        &booking.id.to_string(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let tutor = harness.tutor_actor();
    let mine = list_tutor_bookings(
        &mut harness.db,
        &harness.env,
        &tutor,
        &harness.tutor.id.to_string(),
    )
    .unwrap();
    assert_eq!(mine.bookings.len(), 1);

    let err = list_student_bookings(
        &mut harness.db,
        &harness.env,
        &other,
        &harness.student.id.to_string(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    let theirs = list_tutor_bookings(
        &mut harness.db,
        &harness.env,
        &other_tutor,
        &other_tutor_profile.id.to_string(),
    )
    .unwrap();
    assert!(theirs.bookings.is_empty());
    let own = list_student_bookings(
        &mut harness.db,
        &harness.env,
        &other,
        &other_student.id.to_string(),
    )
    .unwrap();
    assert!(own.bookings.is_empty());
}

#[test]
fn test_history_records_each_transition() {
    let mut harness = Harness::new();
    let booking = harness.book();
    harness.accept(booking.id);
    let tutor = harness.tutor_actor();

    let history = list_booking_history(&mut harness.db, &tutor, &booking.id.to_string()).unwrap();
    assert_eq!(history.history.len(), 2);
    assert_eq!(history.history[0].previous_status, None);
    assert_eq!(history.history[0].actor_role, ActorRole::Student);
    assert_eq!(
        history.history[1].previous_status,
        Some(BookingStatus::Pending)
    );
    assert_eq!(history.history[1].new_status, BookingStatus::Accepted);
    assert_eq!(history.history[1].actor_user_id, Some(harness.tutor.user_id));
}

#[test]
fn test_admin_tombstones_booking() {
    let mut harness = Harness::new();
    let booking = harness.book();
    let student = harness.student_actor();

    let err = delete_booking(
        &mut harness.db,
        &harness.env,
        &student,
        &booking.id.to_string(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let admin = Harness::admin_actor();
    let deleted = delete_booking(
        &mut harness.db,
        &harness.env,
        &admin,
        &booking.id.to_string(),
    )
    .unwrap();
    assert_eq!(deleted.booking_id, booking.id);

    let err = get_booking(
        &mut harness.db,
        &harness.env,
        &admin,
        &booking.id.to_string(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = delete_booking(
        &mut harness.db,
        &harness.env,
        &admin,
        &booking.id.to_string(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    // The slot is free again.
    let rebooked = harness.book();
    assert_eq!(rebooked.status, BookingStatus::Pending);
}

#[test]
fn test_daily_cap_rejects_extra_bookings() {
    let config = BookingConfig {
        max_booking_per_day: Some(1),
        ..BookingConfig::default()
    };
    let mut harness = Harness::with_config(config);
    harness.book();
    let category = harness.course.category_id;
    let course = harness.add_course(category, false, "13:00:00");

    let student = harness.student_actor();
    let mut request = harness.request();
    request.course_id = course.id.to_string();
    request.booking_time = String::from("13:00:00");
    let err = create_booking(&mut harness.db, &harness.env, &student, &request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MaxBookingPerDay);
}

#[test]
fn test_booking_wire_shape() {
    let mut harness = Harness::new();
    let booking = harness.book();

    let json = serde_json::to_value(&booking).unwrap();
    assert_eq!(json["status"], "pending");
    assert_eq!(json["classType"], "online");
    assert_eq!(json["timezone"], "WIB");
    assert_eq!(json["grossAmount"], "200000.00");
    assert_eq!(json["isFreeFirstCourse"], false);
    assert_eq!(json["code"], booking.code.to_string());
    assert!(json.get("sessionStartsAt").is_some());
}

/// A request for a second free course in the same category, at 11:00.
fn sibling_free_request(harness: &mut Harness) -> CreateBookingRequest {
    let category = harness.course.category_id;
    let sibling = harness.add_course(category, true, "11:00:00");
    let mut request = harness.request();
    request.course_id = sibling.id.to_string();
    request.booking_time = String::from("11:00:00");
    request
}

#[test]
fn test_free_first_quota_per_category_per_day() {
    let mut harness = Harness::with_free_course();
    let first = harness.book();
    assert!(first.is_free_first_course);

    let request = sibling_free_request(&mut harness);
    let student = harness.student_actor();
    let err = create_booking(&mut harness.db, &harness.env, &student, &request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MaxBookingFreeFirstCourse);
    assert_eq!(err.payload().map(|booking| booking.id), Some(first.id));
}

#[test]
fn test_quota_rejection_reports_overdue_booking_as_expired() {
    let mut harness = Harness::with_free_course();
    let first = harness.book();
    assert!(first.is_free_first_course);

    // Past the response window but still the same local day.
    harness.advance(Duration::hours(7));
    let request = sibling_free_request(&mut harness);
    let student = harness.student_actor();
    let err = create_booking(&mut harness.db, &harness.env, &student, &request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MaxBookingFreeFirstCourse);

    let payload = err.payload().unwrap();
    assert_eq!(payload.id, first.id);
    assert_eq!(payload.status, BookingStatus::Expired);
}

#[test]
fn test_second_booking_of_a_free_course_is_paid() {
    let mut harness = Harness::with_free_course();
    let first = harness.book();
    assert!(first.is_free_first_course);

    let course_id = harness.course.id;
    harness.add_schedule(course_id, "13:00:00");
    let student = harness.student_actor();
    let mut request = harness.request();
    request.booking_time = String::from("13:00:00");
    let second = harness.book_as(&student, &request);
    assert!(!second.is_free_first_course);

    let response = harness.accept(second.id);
    assert_eq!(response.credited, Some(Money::from_minor(18_000_000)));
}
