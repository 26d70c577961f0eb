// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Periodic reaction jobs.
//!
//! A tick runs four sweeps in order: the pending-expiry reminder, the
//! materialisation of expired pending bookings, the upcoming-session
//! reminder, and the opening of review windows. Every sweep is idempotent:
//! a reminder is sent only if no notification of its kind is recorded for
//! the booking, and state changes are guarded on the stored status. The
//! cache keys only spare the store a lookup.
//!
//! Each row is processed in its own transaction. A failing row is logged
//! and counted, and the sweep moves on.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::{Mutex, TryLockError};
use tracing::{debug, error, info, warn};
use tutor_booking::{
    Command, NotificationEvent, apply, expiry_reminder_key, open_review, pending_expiry_window,
    reminder_key_ttl, review_open_cutoff, session_reminder_key, session_reminder_window,
};
use tutor_booking_audit::Actor;
use tutor_booking_domain::{Booking, BookingId, BookingStatus, NotificationKind};
use tutor_booking_persistence::{Persistence, PersistenceError, Store};

use crate::env::BookingEnv;
use crate::error::{ApiError, translate_core_error};
use crate::handlers::{record_events, require_booking, student_user, tutor_user};
use crate::retry::with_retry;

/// The reaction jobs, in the order a tick runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Job {
    PendingExpiryReminder,
    PendingExpiry,
    UpcomingSessionReminder,
    ReviewOpen,
}

impl Job {
    pub const ALL: [Self; 4] = [
        Self::PendingExpiryReminder,
        Self::PendingExpiry,
        Self::UpcomingSessionReminder,
        Self::ReviewOpen,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PendingExpiryReminder => "pending_expiry_reminder",
            Self::PendingExpiry => "pending_expiry",
            Self::UpcomingSessionReminder => "upcoming_session_reminder",
            Self::ReviewOpen => "review_open",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::PendingExpiryReminder => 0,
            Self::PendingExpiry => 1,
            Self::UpcomingSessionReminder => 2,
            Self::ReviewOpen => 3,
        }
    }
}

impl std::fmt::Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// What one job did during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobReport {
    pub job: Job,
    /// Distinct rows the job looked at.
    pub candidates: usize,
    pub processed: usize,
    /// Rows already handled by an earlier run or changed underneath.
    pub skipped: usize,
    pub failed: usize,
    /// True if another run of this job was still in flight.
    pub lock_held: bool,
}

impl JobReport {
    const fn new(job: Job) -> Self {
        Self {
            job,
            candidates: 0,
            processed: 0,
            skipped: 0,
            failed: 0,
            lock_held: false,
        }
    }
}

/// What a whole tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub started_at: DateTime<Utc>,
    pub jobs: Vec<JobReport>,
}

impl SweepReport {
    /// Returns the report of `job`, if it ran.
    #[must_use]
    pub fn job(&self, job: Job) -> Option<&JobReport> {
        self.jobs.iter().find(|report| report.job == job)
    }

    #[must_use]
    pub fn processed(&self, job: Job) -> usize {
        self.job(job).map_or(0, |report| report.processed)
    }

    #[must_use]
    pub fn total_failed(&self) -> usize {
        self.jobs.iter().map(|report| report.failed).sum()
    }
}

/// Outcome of processing one row.
enum RowOutcome {
    Done(Vec<NotificationEvent>),
    Skipped,
}

/// Whether processed rows leave the job's candidate query.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Paging {
    /// Processed rows drop out of the query.
    Drains,
    /// Every row stays matched; the fetch widens to page past them.
    Widens,
}

/// Runs the reaction jobs with at most one run of each job in flight.
#[derive(Debug, Default)]
pub struct ReactionScheduler {
    locks: [Mutex<()>; 4],
}

impl ReactionScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every job once, in order, at the environment's current time.
    pub fn run_tick(&self, persistence: &mut Persistence, env: &BookingEnv) -> SweepReport {
        let started_at = env.now();
        let jobs = Job::ALL
            .iter()
            .map(|job| self.run_job(*job, persistence, env))
            .collect();
        SweepReport { started_at, jobs }
    }

    /// Runs one job unless another run of it is still in flight.
    pub fn run_job(&self, job: Job, persistence: &mut Persistence, env: &BookingEnv) -> JobReport {
        let _guard = match self.locks[job.index()].try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                debug!(job = %job, "Job already running, skipping tick");
                let mut report = JobReport::new(job);
                report.lock_held = true;
                return report;
            }
        };

        let now = env.now();
        let mut report = JobReport::new(job);
        let run = match job {
            Job::PendingExpiryReminder => pending_expiry_reminder,
            Job::PendingExpiry => pending_expiry,
            Job::UpcomingSessionReminder => upcoming_session_reminder,
            Job::ReviewOpen => review_open,
        };
        run(persistence, env, now, &mut report);

        info!(
            job = %job,
            candidates = report.candidates,
            processed = report.processed,
            skipped = report.skipped,
            failed = report.failed,
            "Reaction job finished"
        );
        report
    }
}

/// Feeds every candidate row to `process` once.
///
/// `query` receives the fetch limit. Rows already seen in this run are
/// not processed again.
fn sweep<Q, P>(
    persistence: &mut Persistence,
    env: &BookingEnv,
    report: &mut JobReport,
    paging: Paging,
    mut query: Q,
    mut process: P,
) where
    Q: FnMut(&mut Store<'_>, u32) -> Result<Vec<Booking>, PersistenceError>,
    P: FnMut(&mut Persistence, &Booking) -> Result<RowOutcome, ApiError>,
{
    let batch = env.config.sweep_batch_size;
    let mut limit = batch;
    let mut seen: HashSet<BookingId> = HashSet::new();

    loop {
        let rows = match persistence.read(|store| query(store, limit)) {
            Ok(rows) => rows,
            Err(err) => {
                warn!(job = %report.job, error = %err, "Candidate query failed");
                report.failed += 1;
                return;
            }
        };
        let fetched = rows.len();
        let fresh: Vec<Booking> = rows
            .into_iter()
            .filter(|booking| seen.insert(booking.id))
            .collect();
        if fresh.is_empty() {
            return;
        }
        report.candidates += fresh.len();

        for booking in &fresh {
            match process(persistence, booking) {
                Ok(RowOutcome::Done(events)) => {
                    report.processed += 1;
                    env.dispatch(events);
                }
                Ok(RowOutcome::Skipped) => report.skipped += 1,
                Err(err) => {
                    warn!(
                        job = %report.job,
                        booking_id = %booking.id,
                        error = %err,
                        "Reaction failed for booking"
                    );
                    report.failed += 1;
                }
            }
        }

        if u32::try_from(fetched).is_ok_and(|n| n < limit) {
            return;
        }
        let still_matched = match paging {
            Paging::Drains => seen.len().saturating_sub(report.processed),
            Paging::Widens => seen.len(),
        };
        limit = batch.saturating_add(u32::try_from(still_matched).unwrap_or(u32::MAX));
    }
}

fn pending_expiry_reminder(
    persistence: &mut Persistence,
    env: &BookingEnv,
    now: DateTime<Utc>,
    report: &mut JobReport,
) {
    let window = match pending_expiry_window(now, &env.config) {
        Ok(window) => window,
        Err(err) => {
            error!(job = %report.job, error = %err, "Cannot compute reminder window");
            report.failed += 1;
            return;
        }
    };
    let grace = env.config.reminder_key_grace;

    sweep(
        persistence,
        env,
        report,
        Paging::Widens,
        |store, limit| store.find_pending_expiring_between(window.from, window.to, limit),
        |persistence, booking| {
            let key = expiry_reminder_key(booking.id);
            if env.cache.contains(&key, now) || !window.contains(booking.expired_at) {
                return Ok(RowOutcome::Skipped);
            }
            let location = booking
                .location
                .and_then(|point| env.locations.resolve(point, now));
            let sent = with_retry(Job::PendingExpiryReminder.name(), || {
                persistence.transaction(|store| -> Result<Option<NotificationEvent>, ApiError> {
                    let kind = NotificationKind::PendingExpiryReminder;
                    if store.has_booking_notification(booking.id, kind)? {
                        return Ok(None);
                    }
                    let recipient = tutor_user(store, booking.tutor_id)?;
                    let event = NotificationEvent::pending_expiry_reminder(
                        booking,
                        recipient,
                        location.as_deref(),
                    );
                    record_events(store, std::slice::from_ref(&event), now)?;
                    Ok(Some(event))
                })
            })?;
            env.cache.set(
                &key,
                booking.code.to_string(),
                reminder_key_ttl(booking.expired_at, now, grace),
                now,
            );
            Ok(sent.map_or(RowOutcome::Skipped, |event| RowOutcome::Done(vec![event])))
        },
    );
}

fn pending_expiry(
    persistence: &mut Persistence,
    env: &BookingEnv,
    now: DateTime<Utc>,
    report: &mut JobReport,
) {
    sweep(
        persistence,
        env,
        report,
        Paging::Drains,
        |store, limit| store.find_pending_expired_before(now, limit),
        |persistence, candidate| {
            with_retry(Job::PendingExpiry.name(), || {
                persistence.transaction(|store| -> Result<RowOutcome, ApiError> {
                    let booking = require_booking(store, candidate.id)?;
                    if booking.status != BookingStatus::Pending {
                        return Ok(RowOutcome::Skipped);
                    }
                    let expired = apply(&booking, Command::Expire, Actor::system(), now)
                        .map_err(translate_core_error)?;
                    store.persist_transition(&expired)?;
                    let recipient = tutor_user(store, booking.tutor_id)?;
                    let events = vec![NotificationEvent::booking_expired(
                        &expired.booking,
                        recipient,
                    )];
                    record_events(store, &events, now)?;
                    Ok(RowOutcome::Done(events))
                })
            })
        },
    );
}

fn upcoming_session_reminder(
    persistence: &mut Persistence,
    env: &BookingEnv,
    now: DateTime<Utc>,
    report: &mut JobReport,
) {
    let window = match session_reminder_window(now, &env.config) {
        Ok(window) => window,
        Err(err) => {
            error!(job = %report.job, error = %err, "Cannot compute reminder window");
            report.failed += 1;
            return;
        }
    };
    let grace = env.config.reminder_key_grace;

    sweep(
        persistence,
        env,
        report,
        Paging::Widens,
        |store, limit| store.find_accepted_starting_between(window.from, window.to, limit),
        |persistence, booking| {
            let key = session_reminder_key(booking.id);
            if env.cache.contains(&key, now) || !window.contains(booking.session_starts_at) {
                return Ok(RowOutcome::Skipped);
            }
            let location = booking
                .location
                .and_then(|point| env.locations.resolve(point, now));
            let sent = with_retry(Job::UpcomingSessionReminder.name(), || {
                persistence.transaction(|store| -> Result<Option<NotificationEvent>, ApiError> {
                    let kind = NotificationKind::UpcomingSessionReminder;
                    if store.has_booking_notification(booking.id, kind)? {
                        return Ok(None);
                    }
                    let recipient = student_user(store, booking.student_id)?;
                    let event = NotificationEvent::upcoming_session_reminder(
                        booking,
                        recipient,
                        location.as_deref(),
                    );
                    record_events(store, std::slice::from_ref(&event), now)?;
                    Ok(Some(event))
                })
            })?;
            env.cache.set(
                &key,
                booking.code.to_string(),
                reminder_key_ttl(booking.session_starts_at, now, grace),
                now,
            );
            Ok(sent.map_or(RowOutcome::Skipped, |event| RowOutcome::Done(vec![event])))
        },
    );
}

fn review_open(
    persistence: &mut Persistence,
    env: &BookingEnv,
    now: DateTime<Utc>,
    report: &mut JobReport,
) {
    let cutoff = match review_open_cutoff(now, &env.config) {
        Ok(cutoff) => cutoff,
        Err(err) => {
            error!(job = %report.job, error = %err, "Cannot compute review cutoff");
            report.failed += 1;
            return;
        }
    };

    sweep(
        persistence,
        env,
        report,
        Paging::Drains,
        |store, limit| store.find_unreviewed_started_before(cutoff, limit),
        |persistence, candidate| {
            with_retry(Job::ReviewOpen.name(), || {
                persistence.transaction(|store| -> Result<RowOutcome, ApiError> {
                    let booking = require_booking(store, candidate.id)?;
                    if booking.status != BookingStatus::Accepted || booking.is_reviewed {
                        return Ok(RowOutcome::Skipped);
                    }
                    let review =
                        open_review(&booking, &env.config, now).map_err(translate_core_error)?;
                    store.insert_review(&review)?;
                    store.mark_reviewed(booking.id, now)?;

                    let student = student_user(store, booking.student_id)?;
                    let tutor = tutor_user(store, booking.tutor_id)?;
                    let events = vec![
                        NotificationEvent::review_opened(&booking, student),
                        NotificationEvent::review_opened(&booking, tutor),
                    ];
                    record_events(store, &events, now)?;
                    debug!(booking_id = %booking.id, review_id = %review.id, "Review opened");
                    Ok(RowOutcome::Done(events))
                })
            })
        },
    );
}
