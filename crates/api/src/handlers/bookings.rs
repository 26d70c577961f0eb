// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking creation, responses, reads and tombstoning.

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use tutor_booking::{
    AdmissionError, Command, NotificationEvent, apply, credit_from_booking,
    evaluate_admission,
};
use tutor_booking_audit::Actor;
use tutor_booking_domain::{
    Booking, BookingCode, BookingId, BookingRequest, CommissionSplit, ErrorKind,
    RawBookingRequest, StudentId, TutorId, UserId,
};
use tutor_booking_persistence::{Persistence, PersistenceError, Store};

use super::{
    guarded_write, not_found, parse_id, record_events, require_booking, require_student,
    require_tutor, student_user, tutor_user,
};
use crate::auth::{AuthenticatedActor, AuthorizationService, Role};
use crate::env::BookingEnv;
use crate::error::{
    ApiError, translate_admission_rejection, translate_core_error, translate_domain_error,
};
use crate::request_response::{
    BookingHistoryResponse, BookingInfo, CreateBookingRequest, DeleteBookingResponse,
    ListBookingsResponse, RespondBookingRequest, RespondBookingResponse,
};
use crate::retry::{Retryable, with_retry};

/// Storage column whose uniqueness protects booking codes.
const CODE_CONSTRAINT: &str = "bookings.code";

/// Why one create attempt failed.
#[derive(Debug)]
enum CreateFailure {
    /// The drawn code is taken; draw another.
    CodeCollision,
    Api(ApiError),
}

impl From<ApiError> for CreateFailure {
    fn from(err: ApiError) -> Self {
        Self::Api(err)
    }
}

impl From<PersistenceError> for CreateFailure {
    fn from(err: PersistenceError) -> Self {
        if err.is_unique_violation_on(CODE_CONSTRAINT) {
            Self::CodeCollision
        } else if matches!(err, PersistenceError::UniqueViolation(_)) {
            // The live-slot index lost a race with a concurrent create.
            Self::Api(ApiError::DomainRuleViolation {
                kind: ErrorKind::StudentAlreadyHasAnotherSchedule,
                message: String::from("student already has another booking at this schedule"),
                payload: None,
            })
        } else {
            Self::Api(err.into())
        }
    }
}

impl Retryable for CreateFailure {
    fn is_transient(&self) -> bool {
        matches!(self, Self::Api(err) if err.is_transient())
    }
}

impl std::fmt::Display for CreateFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CodeCollision => write!(f, "booking code collision"),
            Self::Api(err) => write!(f, "{err}"),
        }
    }
}

/// Admits and stores one booking with the given code.
///
/// Stale pending bookings the admission read uncovered at the slot are
/// expired first so the slot frees up in the same transaction.
fn admit_and_insert(
    store: &mut Store<'_>,
    env: &BookingEnv,
    request: &BookingRequest,
    code: BookingCode,
    created_by: UserId,
    actor: Actor,
    now: DateTime<Utc>,
) -> Result<(Booking, Vec<NotificationEvent>), CreateFailure> {
    let admission = match evaluate_admission(store, request, &env.config, now) {
        Ok(admission) => admission,
        Err(AdmissionError::Rejected(err)) => {
            return Err(translate_admission_rejection(err, now).into());
        }
        Err(AdmissionError::Store(err)) => return Err(err.into()),
    };

    let mut events: Vec<NotificationEvent> = Vec::new();
    for stale in &admission.stale_pending {
        let expired = apply(stale, Command::Expire, Actor::system(), now)
            .map_err(translate_core_error)?;
        store
            .persist_transition(&expired)
            .map_err(|err| guarded_write(err, "booking"))?;
        let recipient = tutor_user(store, stale.tutor_id)?;
        events.push(NotificationEvent::booking_expired(&expired.booking, recipient));
    }

    let created = tutor_booking::create_booking(request, &admission, code, created_by, actor, now);
    store.insert_booking(&created)?;

    let recipient = tutor_user(store, created.booking.tutor_id)?;
    events.push(NotificationEvent::booking_created(&created.booking, recipient));
    record_events(store, &events, now)?;
    Ok((created.booking, events))
}

/// Creates a booking for the acting student.
///
/// A booking code collision draws a fresh code, up to the configured retry
/// limit. Lock contention is retried with backoff independently.
///
/// # Errors
///
/// Returns an error if the actor is not a student, the request is
/// malformed, admission rejects it, or no unique code could be drawn.
pub fn create_booking(
    persistence: &mut Persistence,
    env: &BookingEnv,
    authenticated_actor: &AuthenticatedActor,
    request: &CreateBookingRequest,
) -> Result<BookingInfo, ApiError> {
    AuthorizationService::authorize_create_booking(authenticated_actor)?;
    let actor: Actor = authenticated_actor.to_audit_actor();

    let student = persistence.read(|store| require_student(store, authenticated_actor.user_id))?;
    let raw = RawBookingRequest {
        course_id: &request.course_id,
        class_type: &request.class_type,
        booking_date: &request.booking_date,
        booking_time: &request.booking_time,
        timezone: request.timezone.as_deref(),
        latitude: request.latitude,
        longitude: request.longitude,
        notes: request.notes.as_deref(),
    };
    let parsed = BookingRequest::parse(student.id, raw, env.config.local_timezone)
        .map_err(translate_domain_error)?;

    let limit = env.config.code_retry_limit;
    for attempt in 1..=limit {
        let now = env.now();
        let code = env
            .codes
            .generate(now, env.config.local_timezone)
            .map_err(translate_domain_error)?;
        let outcome = with_retry("create_booking", || {
            persistence.transaction(|store| {
                admit_and_insert(
                    store,
                    env,
                    &parsed,
                    code.clone(),
                    authenticated_actor.user_id,
                    actor,
                    now,
                )
            })
        });
        match outcome {
            Ok((booking, events)) => {
                env.dispatch(events);
                return Ok(BookingInfo::new(&booking, now));
            }
            Err(CreateFailure::CodeCollision) => {
                warn!(attempt, code = %code, "Booking code collision, drawing a new code");
            }
            Err(CreateFailure::Api(err)) => return Err(err),
        }
    }

    error!(attempts = limit, "Exhausted booking code retries");
    Err(ApiError::Conflict {
        message: format!("no unique booking code after {limit} attempts"),
    })
}

/// The tutor's answer to a pending booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Accept,
    Decline,
}

impl Decision {
    const fn name(self) -> &'static str {
        match self {
            Self::Accept => "accept_booking",
            Self::Decline => "decline_booking",
        }
    }
}

struct Responded {
    booking: Booking,
    credited: Option<CommissionSplit>,
    events: Vec<NotificationEvent>,
}

fn respond(
    persistence: &mut Persistence,
    env: &BookingEnv,
    authenticated_actor: &AuthenticatedActor,
    booking_id: &str,
    request: &RespondBookingRequest,
    decision: Decision,
) -> Result<RespondBookingResponse, ApiError> {
    AuthorizationService::authorize_respond_booking(authenticated_actor)?;
    let booking_id: BookingId = parse_id(booking_id)?;
    let actor: Actor = authenticated_actor.to_audit_actor();
    let now = env.now();

    let responded = with_retry(decision.name(), || {
        persistence.transaction(|store| -> Result<Responded, ApiError> {
            let tutor = require_tutor(store, authenticated_actor.user_id)?;
            let booking = require_booking(store, booking_id)?;
            let command = match decision {
                Decision::Accept => Command::Accept {
                    tutor_id: tutor.id,
                    notes: request.notes.clone(),
                },
                Decision::Decline => Command::Decline {
                    tutor_id: tutor.id,
                    notes: request.notes.clone(),
                },
            };
            let result = apply(&booking, command, actor, now).map_err(translate_core_error)?;
            store
                .persist_transition(&result)
                .map_err(|err| guarded_write(err, "booking"))?;

            let mut credited = None;
            if decision == Decision::Accept {
                let balance = store.find_balance(tutor.id)?;
                if let Some(credit) =
                    credit_from_booking(&balance, &result.booking, env.config.commission_rate, now)
                        .map_err(translate_core_error)?
                {
                    store.apply_ledger_entry(&credit.entry)?;
                    credited = Some(credit.split);
                }
            }

            let recipient = student_user(store, result.booking.student_id)?;
            let event = match decision {
                Decision::Accept => NotificationEvent::booking_accepted(&result.booking, recipient),
                Decision::Decline => NotificationEvent::booking_declined(&result.booking, recipient),
            };
            let events = vec![event];
            record_events(store, &events, now)?;
            Ok(Responded {
                booking: result.booking,
                credited,
                events,
            })
        })
    })?;

    info!(
        booking_id = %booking_id,
        decision = decision.name(),
        credited = responded.credited.is_some(),
        "Booking answered"
    );
    env.dispatch(responded.events);
    Ok(RespondBookingResponse {
        booking: BookingInfo::new(&responded.booking, now),
        credited: responded.credited.map(|split| split.net),
        commission: responded.credited.map(|split| split.commission),
    })
}

/// Accepts a pending booking and credits the tutor in the same transaction.
///
/// # Errors
///
/// Returns an error if the actor is not the booking's tutor or the booking
/// is no longer pending.
pub fn accept_booking(
    persistence: &mut Persistence,
    env: &BookingEnv,
    authenticated_actor: &AuthenticatedActor,
    booking_id: &str,
    request: &RespondBookingRequest,
) -> Result<RespondBookingResponse, ApiError> {
    respond(
        persistence,
        env,
        authenticated_actor,
        booking_id,
        request,
        Decision::Accept,
    )
}

/// Declines a pending booking.
///
/// # Errors
///
/// Returns an error if the actor is not the booking's tutor or the booking
/// is no longer pending.
pub fn decline_booking(
    persistence: &mut Persistence,
    env: &BookingEnv,
    authenticated_actor: &AuthenticatedActor,
    booking_id: &str,
    request: &RespondBookingRequest,
) -> Result<RespondBookingResponse, ApiError> {
    respond(
        persistence,
        env,
        authenticated_actor,
        booking_id,
        request,
        Decision::Decline,
    )
}

/// Checks that the actor is a party to the booking or an admin.
fn authorize_booking_party(
    store: &mut Store<'_>,
    authenticated_actor: &AuthenticatedActor,
    booking: &Booking,
) -> Result<(), ApiError> {
    let allowed = match authenticated_actor.role {
        Role::Admin => true,
        Role::Student => store
            .find_student_by_user(authenticated_actor.user_id)?
            .is_some_and(|student| student.id == booking.student_id),
        Role::Tutor => store
            .find_tutor_by_user(authenticated_actor.user_id)?
            .is_some_and(|tutor| tutor.id == booking.tutor_id),
    };
    if allowed {
        Ok(())
    } else {
        Err(ApiError::Unauthorized {
            action: String::from("view_booking"),
            required_role: String::from("booking party or admin"),
        })
    }
}

/// Reads one booking with its effective status.
///
/// # Errors
///
/// Returns an error if the booking does not exist or the actor is not a
/// party to it.
pub fn get_booking(
    persistence: &mut Persistence,
    env: &BookingEnv,
    authenticated_actor: &AuthenticatedActor,
    booking_id: &str,
) -> Result<BookingInfo, ApiError> {
    let booking_id: BookingId = parse_id(booking_id)?;
    let booking = persistence.read(|store| -> Result<Booking, ApiError> {
        let booking = require_booking(store, booking_id)?;
        authorize_booking_party(store, authenticated_actor, &booking)?;
        Ok(booking)
    })?;
    Ok(BookingInfo::new(&booking, env.now()))
}

/// Reads the status history of a booking.
///
/// # Errors
///
/// Returns an error if the booking does not exist or the actor is not a
/// party to it.
pub fn list_booking_history(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    booking_id: &str,
) -> Result<BookingHistoryResponse, ApiError> {
    let booking_id: BookingId = parse_id(booking_id)?;
    let history = persistence.read(|store| -> Result<_, ApiError> {
        let booking = require_booking(store, booking_id)?;
        authorize_booking_party(store, authenticated_actor, &booking)?;
        Ok(store.list_status_history(booking_id)?)
    })?;
    Ok(BookingHistoryResponse {
        booking_id,
        history: history.into_iter().map(Into::into).collect(),
    })
}

/// Lists a student's bookings, newest first.
///
/// # Errors
///
/// Returns an error if the student does not exist or the actor may not
/// view them.
pub fn list_student_bookings(
    persistence: &mut Persistence,
    env: &BookingEnv,
    authenticated_actor: &AuthenticatedActor,
    student_id: &str,
) -> Result<ListBookingsResponse, ApiError> {
    let student_id: StudentId = parse_id(student_id)?;
    let bookings = persistence.read(|store| -> Result<Vec<Booking>, ApiError> {
        let student = store
            .find_student(student_id)?
            .ok_or_else(|| not_found("student"))?;
        AuthorizationService::authorize_view_student(authenticated_actor, &student)?;
        Ok(store.list_student_bookings(student_id)?)
    })?;
    let now = env.now();
    Ok(ListBookingsResponse {
        bookings: bookings
            .iter()
            .map(|booking| BookingInfo::new(booking, now))
            .collect(),
    })
}

/// Lists a tutor's bookings, newest first.
///
/// # Errors
///
/// Returns an error if the tutor does not exist or the actor may not view
/// them.
pub fn list_tutor_bookings(
    persistence: &mut Persistence,
    env: &BookingEnv,
    authenticated_actor: &AuthenticatedActor,
    tutor_id: &str,
) -> Result<ListBookingsResponse, ApiError> {
    let tutor_id: TutorId = parse_id(tutor_id)?;
    let bookings = persistence.read(|store| -> Result<Vec<Booking>, ApiError> {
        let tutor = store
            .find_tutor(tutor_id)?
            .ok_or_else(|| not_found("tutor"))?;
        AuthorizationService::authorize_view_tutor(authenticated_actor, &tutor)?;
        Ok(store.list_tutor_bookings(tutor_id)?)
    })?;
    let now = env.now();
    Ok(ListBookingsResponse {
        bookings: bookings
            .iter()
            .map(|booking| BookingInfo::new(booking, now))
            .collect(),
    })
}

/// Tombstones a booking together with its review and report.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the booking does not
/// exist.
pub fn delete_booking(
    persistence: &mut Persistence,
    env: &BookingEnv,
    authenticated_actor: &AuthenticatedActor,
    booking_id: &str,
) -> Result<DeleteBookingResponse, ApiError> {
    AuthorizationService::authorize_delete_booking(authenticated_actor)?;
    let booking_id: BookingId = parse_id(booking_id)?;
    let now = env.now();

    with_retry("delete_booking", || {
        persistence.transaction(|store| -> Result<(), ApiError> {
            store
                .tombstone_booking(booking_id, authenticated_actor.user_id, now)
                .map_err(|err| match err {
                    PersistenceError::NotFound(_) => not_found("booking"),
                    other => other.into(),
                })
        })
    })?;

    Ok(DeleteBookingResponse {
        booking_id,
        deleted_at: now,
    })
}
