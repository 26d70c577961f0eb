// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tutor earnings: balances, the append-only transaction log and
//! withdrawal requests.

use crate::error::DomainError;
use crate::money::Money;
use crate::types::{TransactionId, TutorId, UserId, WithdrawalId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl FromStr for TransactionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            _ => Err(DomainError::InvalidStatus {
                entity: "transaction type",
                value: s.to_string(),
            }),
        }
    }
}

/// What a ledger transaction refers back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    BookingPayment,
    Withdrawal,
}

impl ReferenceType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BookingPayment => "booking_payment",
            Self::Withdrawal => "withdrawal",
        }
    }
}

impl FromStr for ReferenceType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "booking_payment" => Ok(Self::BookingPayment),
            "withdrawal" => Ok(Self::Withdrawal),
            _ => Err(DomainError::InvalidStatus {
                entity: "reference type",
                value: s.to_string(),
            }),
        }
    }
}

/// An immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceTransaction {
    pub id: TransactionId,
    pub tutor_id: TutorId,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Always positive; the direction comes from `transaction_type`.
    pub amount: Money,
    /// Platform cut recorded on credits; zero on debits.
    pub commission: Money,
    pub reference_type: ReferenceType,
    pub reference_id: Uuid,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl BalanceTransaction {
    /// Returns the amount with the sign it contributes to the balance.
    #[must_use]
    pub fn signed_amount(&self) -> Money {
        match self.transaction_type {
            TransactionType::Credit => self.amount,
            TransactionType::Debit => Money::from_minor(-self.amount.minor()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorBalance {
    pub tutor_id: TutorId,
    pub balance: Money,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TutorBalance {
    /// A tutor with no ledger row has a zero balance.
    #[must_use]
    pub const fn empty(tutor_id: TutorId) -> Self {
        Self {
            tutor_id,
            balance: Money::ZERO,
            updated_at: None,
        }
    }
}

/// Outcome of recomputing a tutor balance from its transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerCheck {
    pub recorded: Money,
    pub computed: Money,
    pub consistent: bool,
}

/// Compares a recorded balance with the signed sum of its transactions.
#[must_use]
pub fn verify_ledger(recorded: Money, transactions: &[BalanceTransaction]) -> LedgerCheck {
    let computed_minor: i128 = transactions
        .iter()
        .map(|tx| i128::from(tx.signed_amount().minor()))
        .sum();
    let computed = i64::try_from(computed_minor).map_or(Money::from_minor(i64::MAX), Money::from_minor);
    LedgerCheck {
        recorded,
        computed,
        consistent: i128::from(recorded.minor()) == computed_minor && !recorded.is_negative(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    Pending,
    /// Reserved for payout integrations; never produced by core transitions.
    Processing,
    Completed,
    Rejected,
}

impl WithdrawalStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }

    /// Requires `pending` before an admin decision.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::WithdrawalNotPending` otherwise.
    pub const fn ensure_pending(&self) -> Result<(), DomainError> {
        match self {
            Self::Pending => Ok(()),
            other => Err(DomainError::WithdrawalNotPending { status: *other }),
        }
    }
}

impl FromStr for WithdrawalStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "rejected" => Ok(Self::Rejected),
            _ => Err(DomainError::InvalidStatus {
                entity: "withdrawal",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Destination account for a payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
}

impl BankDetails {
    /// Builds bank details, trimming whitespace.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBankDetails` if any field is blank.
    pub fn new(
        bank_name: &str,
        account_number: &str,
        account_holder: &str,
    ) -> Result<Self, DomainError> {
        let field = |name: &str, value: &str| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(DomainError::InvalidBankDetails(format!(
                    "{name} must not be empty"
                )))
            } else {
                Ok(trimmed.to_string())
            }
        };
        Ok(Self {
            bank_name: field("bank name", bank_name)?,
            account_number: field("account number", account_number)?,
            account_holder: field("account holder", account_holder)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    pub id: WithdrawalId,
    pub tutor_id: TutorId,
    pub amount: Money,
    #[serde(flatten)]
    pub bank: BankDetails,
    pub status: WithdrawalStatus,
    pub admin_note: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
