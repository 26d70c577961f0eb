// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tutor balances and withdrawals.

use std::str::FromStr;
use tracing::{info, warn};
use tutor_booking::NotificationEvent;
use tutor_booking_domain::{
    BankDetails, LedgerCheck, Money, Tutor, TutorId, WithdrawalId, WithdrawalRequest,
    verify_ledger,
};
use tutor_booking_persistence::{Persistence, Store};

use super::{guarded_write, not_found, parse_id, record_events, tutor_user};
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::env::BookingEnv;
use crate::error::{ApiError, translate_core_error, translate_domain_error};
use crate::request_response::{
    BalanceResponse, CreateWithdrawalRequest, DecideWithdrawalRequest, ListWithdrawalsResponse,
    WithdrawalResponse,
};
use crate::retry::with_retry;

fn require_visible_tutor(
    store: &mut Store<'_>,
    authenticated_actor: &AuthenticatedActor,
    tutor_id: TutorId,
) -> Result<Tutor, ApiError> {
    let tutor = store
        .find_tutor(tutor_id)?
        .ok_or_else(|| not_found("tutor"))?;
    AuthorizationService::authorize_view_tutor(authenticated_actor, &tutor)?;
    Ok(tutor)
}

fn require_withdrawal(
    store: &mut Store<'_>,
    withdrawal_id: WithdrawalId,
) -> Result<WithdrawalRequest, ApiError> {
    store
        .find_withdrawal(withdrawal_id)?
        .ok_or_else(|| not_found("withdrawal"))
}

/// Reads a tutor's balance and transaction log.
///
/// A tutor that was never credited has a zero balance.
///
/// # Errors
///
/// Returns an error if the tutor does not exist or the actor may not view
/// it.
pub fn get_balance(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    tutor_id: &str,
) -> Result<BalanceResponse, ApiError> {
    let tutor_id: TutorId = parse_id(tutor_id)?;
    persistence.read(|store| {
        require_visible_tutor(store, authenticated_actor, tutor_id)?;
        let balance = store.find_balance(tutor_id)?;
        let transactions = store.list_transactions(tutor_id)?;
        let check = verify_ledger(balance.balance, &transactions);
        Ok(BalanceResponse {
            tutor_id,
            balance: balance.balance,
            updated_at: balance.updated_at,
            transactions,
            consistent: check.consistent,
        })
    })
}

/// Recomputes a tutor's balance from its transactions.
///
/// # Errors
///
/// Returns an error if the tutor does not exist or the actor may not view
/// it.
pub fn verify_tutor_ledger(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    tutor_id: &str,
) -> Result<LedgerCheck, ApiError> {
    let tutor_id: TutorId = parse_id(tutor_id)?;
    let check = persistence.read(|store| -> Result<LedgerCheck, ApiError> {
        require_visible_tutor(store, authenticated_actor, tutor_id)?;
        let balance = store.find_balance(tutor_id)?;
        let transactions = store.list_transactions(tutor_id)?;
        Ok(verify_ledger(balance.balance, &transactions))
    })?;
    if !check.consistent {
        warn!(
            tutor_id = %tutor_id,
            recorded = %check.recorded,
            computed = %check.computed,
            "Tutor ledger is inconsistent"
        );
    }
    Ok(check)
}

/// Lists a tutor's withdrawal requests, newest first.
///
/// # Errors
///
/// Returns an error if the tutor does not exist or the actor may not view
/// it.
pub fn list_withdrawals(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    tutor_id: &str,
) -> Result<ListWithdrawalsResponse, ApiError> {
    let tutor_id: TutorId = parse_id(tutor_id)?;
    persistence.read(|store| {
        require_visible_tutor(store, authenticated_actor, tutor_id)?;
        Ok(ListWithdrawalsResponse {
            withdrawals: store.list_withdrawals(tutor_id)?,
        })
    })
}

/// Files a pending withdrawal for the acting tutor.
///
/// The balance must cover the amount now, but nothing is debited until an
/// admin approves the request.
///
/// # Errors
///
/// Returns an error if the actor does not own the tutor profile, the
/// amount or bank details are invalid, or the balance is insufficient.
pub fn request_withdrawal(
    persistence: &mut Persistence,
    env: &BookingEnv,
    authenticated_actor: &AuthenticatedActor,
    tutor_id: &str,
    request: &CreateWithdrawalRequest,
) -> Result<WithdrawalResponse, ApiError> {
    AuthorizationService::authorize_request_withdrawal(authenticated_actor)?;
    let tutor_id: TutorId = parse_id(tutor_id)?;
    let amount = Money::from_str(&request.amount).map_err(translate_domain_error)?;
    let bank = BankDetails::new(
        &request.bank_name,
        &request.account_number,
        &request.account_holder,
    )
    .map_err(translate_domain_error)?;
    let now = env.now();

    let response = with_retry("request_withdrawal", || {
        persistence.transaction(|store| -> Result<WithdrawalResponse, ApiError> {
            require_visible_tutor(store, authenticated_actor, tutor_id)?;
            let balance = store.find_balance(tutor_id)?;
            let withdrawal = tutor_booking::request_withdrawal(&balance, amount, bank.clone(), now)
                .map_err(translate_core_error)?;
            store.insert_withdrawal(&withdrawal)?;
            Ok(WithdrawalResponse {
                withdrawal,
                balance: balance.balance,
            })
        })
    })?;

    info!(
        withdrawal_id = %response.withdrawal.id,
        tutor_id = %tutor_id,
        amount = %amount,
        "Withdrawal requested"
    );
    Ok(response)
}

/// Approves a pending withdrawal and debits the tutor's balance.
///
/// The balance is re-checked under the write lock, so credits and debits
/// that landed since the request are taken into account.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the withdrawal is not
/// pending, or the balance no longer covers it.
pub fn approve_withdrawal(
    persistence: &mut Persistence,
    env: &BookingEnv,
    authenticated_actor: &AuthenticatedActor,
    withdrawal_id: &str,
    request: &DecideWithdrawalRequest,
) -> Result<WithdrawalResponse, ApiError> {
    AuthorizationService::authorize_decide_withdrawal(authenticated_actor)?;
    let withdrawal_id: WithdrawalId = parse_id(withdrawal_id)?;
    let now = env.now();

    let (response, events) = with_retry("approve_withdrawal", || {
        persistence.transaction(|store| -> Result<_, ApiError> {
            let withdrawal = require_withdrawal(store, withdrawal_id)?;
            let balance = store.find_balance(withdrawal.tutor_id)?;
            let approval = tutor_booking::approve_withdrawal(
                &balance,
                &withdrawal,
                authenticated_actor.user_id,
                request.note.clone(),
                now,
            )
            .map_err(translate_core_error)?;
            store
                .update_withdrawal_decision(&approval.withdrawal)
                .map_err(|err| guarded_write(err, "withdrawal"))?;
            store.apply_ledger_entry(&approval.entry)?;

            let recipient = tutor_user(store, withdrawal.tutor_id)?;
            let events = vec![NotificationEvent::withdrawal_decided(
                &approval.withdrawal,
                recipient,
            )];
            record_events(store, &events, now)?;
            Ok((
                WithdrawalResponse {
                    withdrawal: approval.withdrawal,
                    balance: approval.entry.balance.balance,
                },
                events,
            ))
        })
    })?;

    info!(
        withdrawal_id = %withdrawal_id,
        balance = %response.balance,
        "Withdrawal approved"
    );
    env.dispatch(events);
    Ok(response)
}

/// Rejects a pending withdrawal; the balance is untouched.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the withdrawal is not
/// pending.
pub fn reject_withdrawal(
    persistence: &mut Persistence,
    env: &BookingEnv,
    authenticated_actor: &AuthenticatedActor,
    withdrawal_id: &str,
    request: &DecideWithdrawalRequest,
) -> Result<WithdrawalResponse, ApiError> {
    AuthorizationService::authorize_decide_withdrawal(authenticated_actor)?;
    let withdrawal_id: WithdrawalId = parse_id(withdrawal_id)?;
    let now = env.now();

    let (response, events) = with_retry("reject_withdrawal", || {
        persistence.transaction(|store| -> Result<_, ApiError> {
            let withdrawal = require_withdrawal(store, withdrawal_id)?;
            let rejected = tutor_booking::reject_withdrawal(
                &withdrawal,
                authenticated_actor.user_id,
                request.note.clone(),
                now,
            )
            .map_err(translate_core_error)?;
            store
                .update_withdrawal_decision(&rejected)
                .map_err(|err| guarded_write(err, "withdrawal"))?;
            let balance = store.find_balance(withdrawal.tutor_id)?;

            let recipient = tutor_user(store, withdrawal.tutor_id)?;
            let events = vec![NotificationEvent::withdrawal_decided(&rejected, recipient)];
            record_events(store, &events, now)?;
            Ok((
                WithdrawalResponse {
                    withdrawal: rejected,
                    balance: balance.balance,
                },
                events,
            ))
        })
    })?;

    info!(withdrawal_id = %withdrawal_id, "Withdrawal rejected");
    env.dispatch(events);
    Ok(response)
}
