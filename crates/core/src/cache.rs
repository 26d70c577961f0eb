// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Short-lived key/value cache.
//!
//! The cache is never authoritative. It only suppresses duplicate
//! reminders and memoises location lookups, so losing it costs at most a
//! repeated side effect.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

pub trait CacheKv: Send + Sync {
    /// Returns the value stored under `key` if it has not expired at `now`.
    fn get(&self, key: &str, now: DateTime<Utc>) -> Option<String>;

    /// Stores `value` under `key` until `now + ttl`.
    fn set(&self, key: &str, value: String, ttl: Duration, now: DateTime<Utc>);

    /// Returns true if a live entry exists for `key`.
    fn contains(&self, key: &str, now: DateTime<Utc>) -> bool {
        self.get(key, now).is_some()
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// In-process cache with per-entry expiry.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every entry that has expired at `now`.
    pub fn cleanup_expired(&self, now: DateTime<Utc>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, entry| entry.expires_at > now);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheKv for MemoryCache {
    fn get(&self, key: &str, now: DateTime<Utc>) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone())
    }

    fn set(&self, key: &str, value: String, ttl: Duration, now: DateTime<Utc>) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
    }
}

/// Cache key guarding the pending-expiry reminder for a booking.
#[must_use]
pub fn expiry_reminder_key(booking_id: impl std::fmt::Display) -> String {
    format!("reminder-expired-booking:{booking_id}")
}

/// Cache key guarding the upcoming-session reminder for a booking.
#[must_use]
pub fn session_reminder_key(booking_id: impl std::fmt::Display) -> String {
    format!("reminder-course-booking:{booking_id}")
}
