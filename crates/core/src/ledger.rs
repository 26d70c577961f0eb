// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Earnings ledger transitions.
//!
//! Each function takes the current balance row and returns the new row
//! together with the transaction to append. Callers persist both in the
//! same transaction, which keeps the balance equal to the signed sum of
//! the log.

use crate::error::CoreError;
use chrono::{DateTime, Utc};
use tutor_booking_domain::{
    BalanceTransaction, BankDetails, Booking, CommissionRate, CommissionSplit, DomainError, Money,
    ReferenceType, TransactionId, TransactionType, TutorBalance, UserId, WithdrawalId,
    WithdrawalRequest, WithdrawalStatus,
};

/// A balance row and the transaction that moved it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub balance: TutorBalance,
    pub transaction: BalanceTransaction,
}

/// Outcome of crediting an accepted booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditResult {
    pub entry: LedgerEntry,
    pub split: CommissionSplit,
}

/// Credits the tutor with the net earnings of an accepted booking.
///
/// Returns `Ok(None)` when nothing is owed: free-first-course bookings
/// carry no gross amount, and a 100 % commission leaves no net.
///
/// # Errors
///
/// Returns `CoreError::LedgerOverflow` if the balance would overflow.
pub fn credit_from_booking(
    balance: &TutorBalance,
    booking: &Booking,
    rate: CommissionRate,
    now: DateTime<Utc>,
) -> Result<Option<CreditResult>, CoreError> {
    let split = rate.split(booking.gross_amount);
    if !split.net.is_positive() {
        return Ok(None);
    }

    let new_balance = balance
        .balance
        .checked_add(split.net)
        .ok_or(CoreError::LedgerOverflow("crediting booking earnings"))?;

    let transaction = BalanceTransaction {
        id: TransactionId::generate(),
        tutor_id: booking.tutor_id,
        transaction_type: TransactionType::Credit,
        amount: split.net,
        commission: split.commission,
        reference_type: ReferenceType::BookingPayment,
        reference_id: *booking.id.as_uuid(),
        description: format!("Payment for booking {}", booking.code),
        created_at: now,
    };

    Ok(Some(CreditResult {
        entry: LedgerEntry {
            balance: TutorBalance {
                tutor_id: booking.tutor_id,
                balance: new_balance,
                updated_at: Some(now),
            },
            transaction,
        },
        split,
    }))
}

/// Opens a pending withdrawal.
///
/// The balance is only checked here; the debit happens on approval.
///
/// # Errors
///
/// Returns `InvalidAmount` for a non-positive amount or
/// `InsufficientBalance` when the balance does not cover it.
pub fn request_withdrawal(
    balance: &TutorBalance,
    amount: Money,
    bank: BankDetails,
    now: DateTime<Utc>,
) -> Result<WithdrawalRequest, CoreError> {
    let amount = amount.ensure_positive()?;
    if balance.balance < amount {
        return Err(DomainError::InsufficientBalance {
            available: balance.balance,
            requested: amount,
        }
        .into());
    }
    Ok(WithdrawalRequest {
        id: WithdrawalId::generate(),
        tutor_id: balance.tutor_id,
        amount,
        bank,
        status: WithdrawalStatus::Pending,
        admin_note: None,
        processed_at: None,
        processed_by: None,
        created_at: now,
        updated_at: now,
    })
}

/// Result of an approved withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalApproval {
    pub withdrawal: WithdrawalRequest,
    pub entry: LedgerEntry,
}

/// Approves a pending withdrawal and debits the balance.
///
/// # Errors
///
/// Returns `WithdrawalNotPending` if already decided, or
/// `InsufficientBalance` if credits since the request no longer cover it.
pub fn approve_withdrawal(
    balance: &TutorBalance,
    withdrawal: &WithdrawalRequest,
    admin: UserId,
    note: Option<String>,
    now: DateTime<Utc>,
) -> Result<WithdrawalApproval, CoreError> {
    withdrawal.status.ensure_pending()?;
    let new_balance = balance
        .balance
        .checked_sub(withdrawal.amount)
        .filter(|remaining| !remaining.is_negative())
        .ok_or(DomainError::InsufficientBalance {
            available: balance.balance,
            requested: withdrawal.amount,
        })?;

    let mut approved = withdrawal.clone();
    approved.status = WithdrawalStatus::Completed;
    approved.admin_note = note;
    approved.processed_at = Some(now);
    approved.processed_by = Some(admin);
    approved.updated_at = now;

    let transaction = BalanceTransaction {
        id: TransactionId::generate(),
        tutor_id: withdrawal.tutor_id,
        transaction_type: TransactionType::Debit,
        amount: withdrawal.amount,
        commission: Money::ZERO,
        reference_type: ReferenceType::Withdrawal,
        reference_id: *withdrawal.id.as_uuid(),
        description: format!("Withdrawal to {}", withdrawal.bank.bank_name),
        created_at: now,
    };

    Ok(WithdrawalApproval {
        withdrawal: approved,
        entry: LedgerEntry {
            balance: TutorBalance {
                tutor_id: withdrawal.tutor_id,
                balance: new_balance,
                updated_at: Some(now),
            },
            transaction,
        },
    })
}

/// Rejects a pending withdrawal without touching the balance.
///
/// # Errors
///
/// Returns `WithdrawalNotPending` if already decided.
pub fn reject_withdrawal(
    withdrawal: &WithdrawalRequest,
    admin: UserId,
    note: Option<String>,
    now: DateTime<Utc>,
) -> Result<WithdrawalRequest, CoreError> {
    withdrawal.status.ensure_pending()?;
    let mut rejected = withdrawal.clone();
    rejected.status = WithdrawalStatus::Rejected;
    rejected.admin_note = note;
    rejected.processed_at = Some(now);
    rejected.processed_by = Some(admin);
    rejected.updated_at = now;
    Ok(rejected)
}
