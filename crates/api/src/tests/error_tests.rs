// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{TimeZone, Utc};
use tutor_booking::CoreError;
use tutor_booking_domain::{BookingStatus, DomainError, ErrorKind, Money, WithdrawalStatus};
use tutor_booking_persistence::PersistenceError;

use crate::{
    ApiError, AuthError, Role, authenticate, translate_core_error, translate_domain_error,
    translate_persistence_error,
};

#[test]
fn test_lifecycle_errors_map_to_stable_kinds() {
    let cases = [
        (
            DomainError::BookingNotPending {
                status: BookingStatus::Accepted,
            },
            ErrorKind::BookingAlreadyExists,
        ),
        (
            DomainError::BookingExpired {
                expired_at: Utc.with_ymd_and_hms(2026, 3, 2, 7, 0, 0).unwrap(),
            },
            ErrorKind::BadRequest,
        ),
        (
            DomainError::InsufficientBalance {
                available: Money::from_minor(100),
                requested: Money::from_minor(200),
            },
            ErrorKind::InsufficientBalance,
        ),
        (
            DomainError::WithdrawalNotPending {
                status: WithdrawalStatus::Completed,
            },
            ErrorKind::BadRequest,
        ),
        (DomainError::ReviewEditWindowClosed, ErrorKind::BadRequest),
        (DomainError::NotBookingTutor, ErrorKind::Forbidden),
        (DomainError::NotReviewOwner, ErrorKind::Forbidden),
        (DomainError::ReportAlreadyExists, ErrorKind::Conflict),
        (
            DomainError::NotFound { entity: "course" },
            ErrorKind::NotFound,
        ),
        (
            DomainError::InvalidClassType(String::from("hybrid")),
            ErrorKind::BadRequest,
        ),
    ];

    for (err, expected) in cases {
        let message = err.to_string();
        let translated = translate_domain_error(err);
        assert_eq!(translated.kind(), expected, "{message}");
    }
}

#[test]
fn test_core_errors_unwrap_domain_violations() {
    let wrapped = CoreError::DomainViolation(DomainError::NotBookingStudent);
    assert_eq!(translate_core_error(wrapped).kind(), ErrorKind::Forbidden);

    let overflow = CoreError::LedgerOverflow("crediting a booking");
    assert!(matches!(
        translate_core_error(overflow),
        ApiError::Internal { .. }
    ));
}

#[test]
fn test_persistence_errors_hide_database_details() {
    let busy = translate_persistence_error(PersistenceError::Transient(String::from(
        "database is locked",
    )));
    assert!(busy.is_transient());
    assert_eq!(busy.kind(), ErrorKind::Internal);

    let unique = translate_persistence_error(PersistenceError::UniqueViolation(String::from(
        "UNIQUE constraint failed: bookings.code",
    )));
    assert_eq!(unique.kind(), ErrorKind::Conflict);
    assert!(!unique.is_transient());

    let broken = translate_persistence_error(PersistenceError::QueryFailed(String::from(
        "no such column: secret_column",
    )));
    assert_eq!(broken.kind(), ErrorKind::Internal);
    assert!(!broken.to_string().contains("secret_column"));
}

#[test]
fn test_authentication_requires_both_headers() {
    let user = "7d1e1a8e-2b4f-4f8e-9a57-0c2d3f4e5a6b";

    let actor = authenticate(Some(user), Some("Tutor")).unwrap();
    assert_eq!(actor.role, Role::Tutor);
    assert_eq!(actor.user_id.to_string(), user);

    for (id, role) in [
        (None, Some("student")),
        (Some(user), None),
        (Some("  "), Some("student")),
        (Some("user-42"), Some("student")),
        (Some(user), Some("parent")),
    ] {
        let err = authenticate(id, role).unwrap_err();
        assert!(matches!(err, AuthError::AuthenticationFailed { .. }));
        assert_eq!(ApiError::from(err).kind(), ErrorKind::Unauthorized);
    }
}

#[test]
fn test_concurrent_change_carries_no_payload() {
    let err = ApiError::DomainRuleViolation {
        kind: ErrorKind::Conflict,
        message: String::from("booking changed concurrently"),
        payload: None,
    };
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.payload().is_none());
    assert_eq!(err.to_string(), "booking changed concurrently");
}
