// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use chrono::{DateTime, Utc};
use tracing::error;
use tutor_booking::CoreError;
use tutor_booking_domain::{DomainError, ErrorKind};
use tutor_booking_persistence::PersistenceError;

use crate::request_response::BookingInfo;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
/// Every variant maps to one stable [`ErrorKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// An admission or lifecycle rule rejected the request.
    DomainRuleViolation {
        /// The wire kind of the violated rule.
        kind: ErrorKind,
        /// A human-readable description of the violation.
        message: String,
        /// The booking the rejection refers to, if any.
        payload: Option<Box<BookingInfo>>,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// A uniqueness conflict that retrying did not resolve.
    Conflict {
        message: String,
    },
    /// The store stayed busy after every retry.
    Unavailable {
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Returns the stable wire kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthenticationFailed { .. } => ErrorKind::Unauthorized,
            Self::Unauthorized { .. } => ErrorKind::Forbidden,
            Self::DomainRuleViolation { kind, .. } => *kind,
            Self::InvalidInput { .. } => ErrorKind::BadRequest,
            Self::ResourceNotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Unavailable { .. } | Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Returns the booking attached to an admission rejection, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&BookingInfo> {
        match self {
            Self::DomainRuleViolation { payload, .. } => payload.as_deref(),
            _ => None,
        }
    }

    /// Returns true if the failure came from lock contention and the whole
    /// operation may be retried.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { message, .. } => write!(f, "{message}"),
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::Unavailable { message } => write!(f, "Service busy: {message}"),
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        translate_persistence_error(err)
    }
}

fn invalid(field: &str, err: &DomainError) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message: err.to_string(),
    }
}

fn rule(err: DomainError) -> ApiError {
    let kind = err.kind();
    let message = err.to_string();
    ApiError::DomainRuleViolation {
        kind,
        message,
        payload: None,
    }
}

/// Translates an admission rejection, attaching the booking it refers to as
/// a reader would see it at `now`.
#[must_use]
pub fn translate_admission_rejection(err: DomainError, now: DateTime<Utc>) -> ApiError {
    let payload = err
        .payload()
        .map(|booking| Box::new(BookingInfo::new(booking, now)));
    match translate_domain_error(err) {
        ApiError::DomainRuleViolation { kind, message, .. } => ApiError::DomainRuleViolation {
            kind,
            message,
            payload,
        },
        other => other,
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::NotFound { entity } => ApiError::ResourceNotFound {
            resource_type: entity.to_string(),
            message: format!("{entity} does not exist"),
        },
        DomainError::InvalidId { entity, .. } => invalid(&format!("{entity}Id"), &err),
        DomainError::InvalidClassType(_) => invalid("classType", &err),
        DomainError::InvalidTimezone(_) => invalid("timezone", &err),
        DomainError::InvalidDayOfWeek(_) => invalid("dayOfWeek", &err),
        DomainError::InvalidDate { .. } => invalid("bookingDate", &err),
        DomainError::InvalidTime { .. } => invalid("bookingTime", &err),
        DomainError::InvalidStatus { .. } => invalid("status", &err),
        DomainError::InvalidBookingCode(_) => invalid("code", &err),
        DomainError::OfflineRequiresCoordinates => invalid("location", &err),
        DomainError::DateArithmeticOverflow { .. } => invalid("date", &err),
        DomainError::InvalidAmount(_) => invalid("amount", &err),
        DomainError::InvalidBankDetails(_) => invalid("bank", &err),
        DomainError::InvalidRate(_) => invalid("rate", &err),
        DomainError::EmptyReview => invalid("review", &err),
        DomainError::EmptyReportField { field } => invalid(field, &err),
        DomainError::InvalidCommissionRate(_) => invalid("commissionRate", &err),
        DomainError::NotBookingTutor => ApiError::Unauthorized {
            action: String::from("respond_booking"),
            required_role: String::from("course tutor"),
        },
        DomainError::NotBookingStudent => ApiError::Unauthorized {
            action: String::from("booking_student_action"),
            required_role: String::from("booking student"),
        },
        DomainError::NotReviewOwner => ApiError::Unauthorized {
            action: String::from("submit_review"),
            required_role: String::from("review owner"),
        },
        DomainError::ReportAlreadyExists => ApiError::Conflict {
            message: err.to_string(),
        },
        DomainError::StudentAlreadyHasAnotherSchedule { .. }
        | DomainError::MaxBookingFreeFirstCourse { .. }
        | DomainError::MaxBookingPerDay { .. }
        | DomainError::MaxBookingPerCategory { .. }
        | DomainError::BookingNotPending { .. }
        | DomainError::BookingExpired { .. }
        | DomainError::BookingNotYetExpired { .. }
        | DomainError::InvalidStatusTransition { .. }
        | DomainError::InsufficientBalance { .. }
        | DomainError::WithdrawalNotPending { .. }
        | DomainError::ReviewEditWindowClosed
        | DomainError::ReviewNotOpenable { .. }
        | DomainError::ReportRequiresAcceptedBooking
        | DomainError::ReportNotPending { .. } => rule(err),
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::LedgerOverflow(_) => {
            error!(error = %err, "Ledger arithmetic failed");
            ApiError::Internal {
                message: err.to_string(),
            }
        }
    }
}

/// Translates a persistence error into an API error.
///
/// Database internals are logged and replaced with an opaque message.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(what) => ApiError::ResourceNotFound {
            resource_type: String::from("record"),
            message: what,
        },
        PersistenceError::UniqueViolation(message) => ApiError::Conflict { message },
        PersistenceError::Transient(message) => ApiError::Unavailable { message },
        other => {
            error!(error = %other, "Persistence failure");
            ApiError::Internal {
                message: String::from("storage failure"),
            }
        }
    }
}
