// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking code generation.

use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use std::sync::{Mutex, PoisonError};
use tutor_booking_domain::{
    BookingCode, CODE_ALPHABET, CODE_SUFFIX_LEN, DomainError, Timezone,
};

/// Produces candidate booking codes.
///
/// Uniqueness is enforced by the store; callers retry on collision.
pub trait BookingCodeGenerator: Send + Sync {
    /// Draws a code dated with the local calendar day of `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the generated code is malformed.
    fn generate(&self, now: DateTime<Utc>, timezone: Timezone) -> Result<BookingCode, DomainError>;
}

/// Draws suffix characters uniformly from the thread-local CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl BookingCodeGenerator for RandomCodeGenerator {
    fn generate(&self, now: DateTime<Utc>, timezone: Timezone) -> Result<BookingCode, DomainError> {
        let mut rng = rand::rng();
        let suffix: String = (0..CODE_SUFFIX_LEN)
            .filter_map(|_| CODE_ALPHABET.choose(&mut rng))
            .map(|&byte| char::from(byte))
            .collect();
        BookingCode::new(timezone.local_date(now)?, &suffix)
    }
}

/// Hands out a fixed list of suffixes in order, then repeats the last one.
///
/// Used to force collisions in tests.
#[derive(Debug)]
pub struct SequenceCodeGenerator {
    suffixes: Vec<String>,
    next: Mutex<usize>,
}

impl SequenceCodeGenerator {
    #[must_use]
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffixes: suffixes.into_iter().map(Into::into).collect(),
            next: Mutex::new(0),
        }
    }
}

impl BookingCodeGenerator for SequenceCodeGenerator {
    fn generate(&self, now: DateTime<Utc>, timezone: Timezone) -> Result<BookingCode, DomainError> {
        let mut next = self.next.lock().unwrap_or_else(PoisonError::into_inner);
        let index = (*next).min(self.suffixes.len().saturating_sub(1));
        *next += 1;
        let suffix = self
            .suffixes
            .get(index)
            .ok_or_else(|| DomainError::InvalidBookingCode(String::from("no suffixes configured")))?;
        BookingCode::new(timezone.local_date(now)?, suffix)
    }
}
