// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::instant;
use crate::{
    BalanceTransaction, BankDetails, DomainError, Money, ReferenceType, TransactionId,
    TransactionType, TutorId, WithdrawalStatus, verify_ledger,
};
use uuid::Uuid;

fn transaction(tutor_id: TutorId, kind: TransactionType, minor: i64) -> BalanceTransaction {
    BalanceTransaction {
        id: TransactionId::generate(),
        tutor_id,
        transaction_type: kind,
        amount: Money::from_minor(minor),
        commission: Money::ZERO,
        reference_type: match kind {
            TransactionType::Credit => ReferenceType::BookingPayment,
            TransactionType::Debit => ReferenceType::Withdrawal,
        },
        reference_id: Uuid::new_v4(),
        description: String::from("test"),
        created_at: instant(2026, 3, 2, 1, 0),
    }
}

#[test]
fn test_verify_ledger_matches_signed_sum() {
    let tutor = TutorId::generate();
    let txs = vec![
        transaction(tutor, TransactionType::Credit, 18_000_000),
        transaction(tutor, TransactionType::Credit, 9_000_000),
        transaction(tutor, TransactionType::Debit, 5_000_000),
    ];
    let check = verify_ledger(Money::from_minor(22_000_000), &txs);
    assert!(check.consistent);
    assert_eq!(check.computed, Money::from_minor(22_000_000));

    let check = verify_ledger(Money::from_minor(21_000_000), &txs);
    assert!(!check.consistent);
}

#[test]
fn test_empty_ledger_is_consistent_with_zero() {
    assert!(verify_ledger(Money::ZERO, &[]).consistent);
}

#[test]
fn test_withdrawal_decision_requires_pending() {
    assert!(WithdrawalStatus::Pending.ensure_pending().is_ok());
    assert!(matches!(
        WithdrawalStatus::Completed.ensure_pending(),
        Err(DomainError::WithdrawalNotPending {
            status: WithdrawalStatus::Completed
        })
    ));
    assert!(WithdrawalStatus::Processing.ensure_pending().is_err());
}

#[test]
fn test_bank_details_trim_and_reject_blank() {
    let bank = BankDetails::new(" BCA ", "1234567890", "Siti Aminah").unwrap();
    assert_eq!(bank.bank_name, "BCA");
    assert!(matches!(
        BankDetails::new("BCA", "   ", "Siti"),
        Err(DomainError::InvalidBankDetails(_))
    ));
}
