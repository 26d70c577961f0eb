// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Earnings ledger queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tutor_booking_domain::{
    BalanceTransaction, TutorBalance, TutorId, WithdrawalId, WithdrawalRequest,
};

use crate::data_models::{BalanceTransactionRow, TutorBalanceRow, WithdrawalRow, decode_rows};
use crate::diesel_schema::{balance_transactions, tutor_balances, withdrawal_requests};
use crate::error::PersistenceError;

/// Returns a tutor's balance; a tutor without a row has a zero balance.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_balance(
    conn: &mut SqliteConnection,
    tutor_id: TutorId,
) -> Result<TutorBalance, PersistenceError> {
    let row: Option<TutorBalanceRow> = tutor_balances::table
        .filter(tutor_balances::tutor_id.eq(tutor_id.to_string()))
        .select(TutorBalanceRow::as_select())
        .first::<TutorBalanceRow>(conn)
        .optional()?;
    row.map_or_else(
        || Ok(TutorBalance::empty(tutor_id)),
        TutorBalanceRow::into_domain,
    )
}

/// Lists a tutor's transactions, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_transactions(
    conn: &mut SqliteConnection,
    tutor_id: TutorId,
) -> Result<Vec<BalanceTransaction>, PersistenceError> {
    let rows: Vec<BalanceTransactionRow> = balance_transactions::table
        .filter(balance_transactions::tutor_id.eq(tutor_id.to_string()))
        .order((
            balance_transactions::created_at.desc(),
            balance_transactions::id.desc(),
        ))
        .select(BalanceTransactionRow::as_select())
        .load(conn)?;
    decode_rows(rows, BalanceTransactionRow::into_domain)
}

/// Retrieves a withdrawal request by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_withdrawal(
    conn: &mut SqliteConnection,
    withdrawal_id: WithdrawalId,
) -> Result<Option<WithdrawalRequest>, PersistenceError> {
    withdrawal_requests::table
        .filter(withdrawal_requests::id.eq(withdrawal_id.to_string()))
        .select(WithdrawalRow::as_select())
        .first::<WithdrawalRow>(conn)
        .optional()?
        .map(WithdrawalRow::into_domain)
        .transpose()
}

/// Lists a tutor's withdrawal requests, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_withdrawals(
    conn: &mut SqliteConnection,
    tutor_id: TutorId,
) -> Result<Vec<WithdrawalRequest>, PersistenceError> {
    let rows: Vec<WithdrawalRow> = withdrawal_requests::table
        .filter(withdrawal_requests::tutor_id.eq(tutor_id.to_string()))
        .order((
            withdrawal_requests::created_at.desc(),
            withdrawal_requests::id.desc(),
        ))
        .select(WithdrawalRow::as_select())
        .load(conn)?;
    decode_rows(rows, WithdrawalRow::into_domain)
}
