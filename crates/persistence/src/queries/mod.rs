// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Query modules for persistence layer.
//!
//! This module contains all read-only queries for the persistence layer.
//!
//! ## Module Organization
//!
//! - `catalog`: Courses, schedules, tutors and students
//! - `bookings`: Booking lookups, admission reads and sweep candidates
//! - `ledger`: Balances, transactions and withdrawals
//! - `reviews`: Tutor reviews
//! - `reports`: Booking reports
//! - `notifications`: Persisted notifications
//!
//! Unless a function says otherwise, tombstoned rows are invisible.

pub mod bookings;
pub mod catalog;
pub mod ledger;
pub mod notifications;
pub mod reports;
pub mod reviews;
