// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Earnings ledger mutations.
//!
//! The balance row and its transaction are always written together by
//! [`apply_ledger_entry`]; nothing else touches `tutor_balances`.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::info;
use tutor_booking::LedgerEntry;
use tutor_booking_domain::{WithdrawalRequest, WithdrawalStatus};

use crate::data_models::{
    BalanceTransactionRow, TutorBalanceRow, WithdrawalRow, encode_instant,
    encode_optional_instant,
};
use crate::diesel_schema::{balance_transactions, tutor_balances, withdrawal_requests};
use crate::error::PersistenceError;

/// Upserts the tutor balance and appends the transaction that moved it.
///
/// # Errors
///
/// Returns `UniqueViolation` if a transaction for the same reference was
/// already recorded, or another error if a write fails.
pub fn apply_ledger_entry(
    conn: &mut SqliteConnection,
    entry: &LedgerEntry,
) -> Result<(), PersistenceError> {
    let balance = TutorBalanceRow::from_domain(&entry.balance);
    diesel::insert_into(tutor_balances::table)
        .values(&balance)
        .on_conflict(tutor_balances::tutor_id)
        .do_update()
        .set((
            tutor_balances::balance.eq(balance.balance),
            tutor_balances::updated_at.eq(balance.updated_at.clone()),
        ))
        .execute(conn)?;

    diesel::insert_into(balance_transactions::table)
        .values(&BalanceTransactionRow::from_domain(&entry.transaction))
        .execute(conn)?;

    info!(
        tutor_id = %entry.balance.tutor_id,
        transaction_type = %entry.transaction.transaction_type.as_str(),
        amount = %entry.transaction.amount,
        balance = %entry.balance.balance,
        "Ledger entry applied"
    );
    Ok(())
}

/// Inserts a new withdrawal request.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_withdrawal(
    conn: &mut SqliteConnection,
    withdrawal: &WithdrawalRequest,
) -> Result<(), PersistenceError> {
    diesel::insert_into(withdrawal_requests::table)
        .values(&WithdrawalRow::from_domain(withdrawal))
        .execute(conn)?;
    info!(
        withdrawal_id = %withdrawal.id,
        tutor_id = %withdrawal.tutor_id,
        amount = %withdrawal.amount,
        "Withdrawal requested"
    );
    Ok(())
}

/// Writes the decision fields of a withdrawal that is still pending.
///
/// # Errors
///
/// Returns `NotFound` if no pending withdrawal with this id exists.
pub fn update_withdrawal_decision(
    conn: &mut SqliteConnection,
    withdrawal: &WithdrawalRequest,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(withdrawal_requests::table)
        .filter(withdrawal_requests::id.eq(withdrawal.id.to_string()))
        .filter(withdrawal_requests::status.eq(WithdrawalStatus::Pending.as_str()))
        .set((
            withdrawal_requests::status.eq(withdrawal.status.as_str()),
            withdrawal_requests::admin_note.eq(withdrawal.admin_note.clone()),
            withdrawal_requests::processed_at.eq(encode_optional_instant(withdrawal.processed_at)),
            withdrawal_requests::processed_by.eq(withdrawal.processed_by.map(|u| u.to_string())),
            withdrawal_requests::updated_at.eq(encode_instant(withdrawal.updated_at)),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "pending withdrawal {}",
            withdrawal.id
        )));
    }
    info!(
        withdrawal_id = %withdrawal.id,
        status = %withdrawal.status,
        "Withdrawal decided"
    );
    Ok(())
}
