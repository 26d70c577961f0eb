// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod admission;
mod apply;
mod cache;
mod clock;
mod codes;
mod command;
mod config;
mod error;
mod ledger;
mod location;
mod notifier;
mod reactions;
mod review;

#[cfg(test)]
mod tests;

pub use admission::{
    Admission, AdmissionError, AdmissionReader, evaluate_admission, local_day_bounds,
};
pub use apply::{TransitionResult, apply, create_booking};
pub use cache::{CacheKv, MemoryCache, expiry_reminder_key, session_reminder_key};
pub use clock::{Clock, ManualClock, SystemClock};
pub use codes::{BookingCodeGenerator, RandomCodeGenerator, SequenceCodeGenerator};
pub use command::Command;
pub use config::{BookingConfig, ConfigError};
pub use error::CoreError;
pub use ledger::{
    CreditResult, LedgerEntry, WithdrawalApproval, approve_withdrawal, credit_from_booking,
    reject_withdrawal, request_withdrawal,
};
pub use location::{CoordinateGeocoder, Geocoder, LocationResolver};
pub use notifier::{
    NotificationEvent, Notifier, NotifyError, RecordingNotifier, TracingNotifier,
};
pub use reactions::{
    Window, pending_expiry_window, reminder_key_ttl, review_open_cutoff, session_reminder_window,
};
pub use review::{SubmittedReview, open_review, submit_review};
