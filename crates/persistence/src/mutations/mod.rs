// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations for the persistence layer.
//!
//! ## Module Organization
//!
//! - `catalog`: Seeding of courses, schedules, tutors and students, and
//!   the tutor level point bump
//! - `bookings`: Booking inserts, status transitions and tombstones
//! - `ledger`: Balance upserts, transaction appends and withdrawals
//! - `reviews`: Review open and submission
//! - `reports`: Report create and resolve
//! - `notifications`: Notification inserts and read marks
//!
//! Mutations never open their own transaction. Callers run them inside
//! [`crate::Persistence::transaction`].

pub mod bookings;
pub mod catalog;
pub mod ledger;
pub mod notifications;
pub mod reports;
pub mod reviews;
