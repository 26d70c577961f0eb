// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fixed-point money and commission arithmetic.
//!
//! Amounts are held as integer minor units (scale 2). Floating point is
//! never used for currency.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const MINOR_PER_MAJOR: i64 = 100;
const BPS_DENOMINATOR: i128 = 10_000;

/// A currency amount in minor units (1/100 of the major unit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    /// Creates an amount from minor units.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the amount in minor units.
    #[must_use]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Requires a strictly positive amount.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAmount` for zero or negative amounts.
    pub fn ensure_positive(self) -> Result<Self, DomainError> {
        if self.is_positive() {
            Ok(self)
        } else {
            Err(DomainError::InvalidAmount(format!(
                "{self} must be greater than zero"
            )))
        }
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per = MINOR_PER_MAJOR.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / per, abs % per)
    }
}

impl FromStr for Money {
    type Err = DomainError;

    /// Parses `"180000"`, `"180000.5"` or `"180000.50"`. More than two
    /// fractional digits are rejected rather than rounded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| DomainError::InvalidAmount(format!("'{s}': {reason}"));
        let trimmed = s.trim();
        let (negative, digits) = trimmed
            .strip_prefix('-')
            .map_or((false, trimmed), |rest| (true, rest));
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("expected a decimal number"));
        }
        if fraction.len() > 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("at most two decimal places are allowed"));
        }
        if digits.ends_with('.') {
            return Err(invalid("missing decimal places"));
        }

        let whole: i64 = whole.parse().map_err(|_| invalid("amount too large"))?;
        let fraction_minor: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid("bad fraction"))? * 10,
            _ => fraction.parse::<i64>().map_err(|_| invalid("bad fraction"))?,
        };
        let minor = whole
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|m| m.checked_add(fraction_minor))
            .ok_or_else(|| invalid("amount too large"))?;

        Ok(Self(if negative { -minor } else { minor }))
    }
}

impl TryFrom<String> for Money {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Money> for String {
    fn from(value: Money) -> Self {
        value.to_string()
    }
}

/// Platform commission expressed in basis points (1000 = 10 %).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRate(u32);

impl CommissionRate {
    pub const DEFAULT: Self = Self(1_000);

    /// Creates a rate from basis points.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCommissionRate` above 100 %.
    pub const fn from_bps(bps: u32) -> Result<Self, DomainError> {
        if bps > 10_000 {
            return Err(DomainError::InvalidCommissionRate(bps));
        }
        Ok(Self(bps))
    }

    #[must_use]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Splits a gross amount into commission and net.
    ///
    /// Commission is rounded half-up to the minor unit; net is whatever
    /// remains so that `commission + net == gross` always holds.
    #[must_use]
    pub fn split(&self, gross: Money) -> CommissionSplit {
        let gross_minor = i128::from(gross.minor());
        let product = gross_minor * i128::from(self.0);
        let half = BPS_DENOMINATOR / 2;
        let rounded = if product >= 0 {
            (product + half) / BPS_DENOMINATOR
        } else {
            (product - half) / BPS_DENOMINATOR
        };
        // |rounded| <= |gross| because bps <= 10000
        let commission = Money(i64::try_from(rounded).unwrap_or(gross.minor()));
        CommissionSplit {
            gross,
            commission,
            net: Money(gross.minor() - commission.minor()),
        }
    }
}

impl Default for CommissionRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Result of applying a commission rate to a gross amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommissionSplit {
    pub gross: Money,
    pub commission: Money,
    pub net: Money,
}
