// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{create_test_booking, create_test_course, test_now};
use crate::{
    CoreError, approve_withdrawal, credit_from_booking, reject_withdrawal, request_withdrawal,
};
use tutor_booking_domain::{
    BankDetails, BookingStatus, ClassType, CommissionRate, DomainError, Money, ReferenceType,
    StudentId, TransactionType, TutorBalance, UserId, WithdrawalStatus, verify_ledger,
};

fn bank() -> BankDetails {
    BankDetails::new("BCA", "1234567890", "Budi Santoso").unwrap()
}

#[test]
fn test_credit_adds_net_and_records_commission() {
    let course = create_test_course(ClassType::All, false);
    let booking = create_test_booking(
        StudentId::generate(),
        &course,
        BookingStatus::Accepted,
        test_now(),
    );
    let balance = TutorBalance::empty(course.tutor_id);

    let credit = credit_from_booking(&balance, &booking, CommissionRate::DEFAULT, test_now())
        .unwrap()
        .unwrap();

    assert_eq!(credit.entry.balance.balance, Money::from_minor(18_000_000));
    let tx = &credit.entry.transaction;
    assert_eq!(tx.transaction_type, TransactionType::Credit);
    assert_eq!(tx.amount, Money::from_minor(18_000_000));
    assert_eq!(tx.commission, Money::from_minor(2_000_000));
    assert_eq!(tx.reference_type, ReferenceType::BookingPayment);
    assert_eq!(tx.reference_id, *booking.id.as_uuid());
    assert!(verify_ledger(credit.entry.balance.balance, std::slice::from_ref(tx)).consistent);
}

#[test]
fn test_free_booking_credits_nothing() {
    let course = create_test_course(ClassType::All, true);
    let mut booking = create_test_booking(
        StudentId::generate(),
        &course,
        BookingStatus::Accepted,
        test_now(),
    );
    booking.is_free_first_course = true;
    booking.gross_amount = Money::ZERO;

    let credit = credit_from_booking(
        &TutorBalance::empty(course.tutor_id),
        &booking,
        CommissionRate::DEFAULT,
        test_now(),
    )
    .unwrap();
    assert!(credit.is_none());
}

#[test]
fn test_withdrawal_request_requires_cover() {
    let mut balance = TutorBalance::empty(tutor_booking_domain::TutorId::generate());
    balance.balance = Money::from_minor(10_000);

    let err = request_withdrawal(&balance, Money::from_minor(10_001), bank(), test_now());
    assert!(matches!(
        err,
        Err(CoreError::DomainViolation(
            DomainError::InsufficientBalance { .. }
        ))
    ));

    let ok = request_withdrawal(&balance, Money::from_minor(10_000), bank(), test_now()).unwrap();
    assert_eq!(ok.status, WithdrawalStatus::Pending);

    let zero = request_withdrawal(&balance, Money::ZERO, bank(), test_now());
    assert!(matches!(
        zero,
        Err(CoreError::DomainViolation(DomainError::InvalidAmount(_)))
    ));
}

#[test]
fn test_approval_debits_and_completes() {
    let mut balance = TutorBalance::empty(tutor_booking_domain::TutorId::generate());
    balance.balance = Money::from_minor(50_000);
    let request = request_withdrawal(&balance, Money::from_minor(30_000), bank(), test_now())
        .unwrap();
    let admin = UserId::generate();

    let approval = approve_withdrawal(&balance, &request, admin, None, test_now()).unwrap();

    assert_eq!(approval.entry.balance.balance, Money::from_minor(20_000));
    assert_eq!(approval.withdrawal.status, WithdrawalStatus::Completed);
    assert_eq!(approval.withdrawal.processed_by, Some(admin));
    assert_eq!(
        approval.entry.transaction.transaction_type,
        TransactionType::Debit
    );
    assert_eq!(approval.entry.transaction.commission, Money::ZERO);

    let again = approve_withdrawal(
        &approval.entry.balance,
        &approval.withdrawal,
        admin,
        None,
        test_now(),
    );
    assert!(matches!(
        again,
        Err(CoreError::DomainViolation(
            DomainError::WithdrawalNotPending { .. }
        ))
    ));
}

#[test]
fn test_approval_rechecks_balance() {
    let mut balance = TutorBalance::empty(tutor_booking_domain::TutorId::generate());
    balance.balance = Money::from_minor(50_000);
    let request = request_withdrawal(&balance, Money::from_minor(40_000), bank(), test_now())
        .unwrap();
    balance.balance = Money::from_minor(39_999);

    let result = approve_withdrawal(&balance, &request, UserId::generate(), None, test_now());
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::InsufficientBalance { .. }
        ))
    ));
}

#[test]
fn test_rejection_keeps_note_and_moves_no_money() {
    let mut balance = TutorBalance::empty(tutor_booking_domain::TutorId::generate());
    balance.balance = Money::from_minor(50_000);
    let request = request_withdrawal(&balance, Money::from_minor(40_000), bank(), test_now())
        .unwrap();

    let rejected = reject_withdrawal(
        &request,
        UserId::generate(),
        Some(String::from("account name mismatch")),
        test_now(),
    )
    .unwrap();
    assert_eq!(rejected.status, WithdrawalStatus::Rejected);
    assert_eq!(rejected.admin_note.as_deref(), Some("account name mismatch"));
    assert!(rejected.processed_at.is_some());
}
