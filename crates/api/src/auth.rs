// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.
//!
//! Identity is asserted by the caller (an upstream gateway) as a user id
//! plus a role. This layer only checks that the role may perform the
//! action and that the user owns the profile it acts through.

use std::str::FromStr;
use tutor_booking_audit::{Actor, ActorRole};
use tutor_booking_domain::{Student, Tutor, UserId};

use crate::error::AuthError;

/// Actor roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Books courses, reviews sessions and files reports.
    Student,
    /// Responds to bookings and withdraws earnings.
    Tutor,
    /// Platform operator: deletes bookings, decides withdrawals and
    /// resolves reports.
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Tutor => "tutor",
            Self::Admin => "admin",
        }
    }

    const fn audit_role(self) -> ActorRole {
        match self {
            Self::Student => ActorRole::Student,
            Self::Tutor => ActorRole::Tutor,
            Self::Admin => ActorRole::Admin,
        }
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "tutor" => Ok(Self::Tutor),
            "admin" => Ok(Self::Admin),
            other => Err(AuthError::AuthenticationFailed {
                reason: format!("unknown role '{other}'"),
            }),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An authenticated actor with an associated role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The login account of this actor.
    pub user_id: UserId,
    /// The role assigned to this actor.
    pub role: Role,
}

impl AuthenticatedActor {
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Converts this authenticated actor into an audit Actor.
    ///
    /// This is used when recording status history to attribute changes
    /// to the acting user.
    #[must_use]
    pub const fn to_audit_actor(&self) -> Actor {
        Actor::user(self.user_id, self.role.audit_role())
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Builds an actor from the asserted identity headers.
///
/// # Errors
///
/// Returns `AuthenticationFailed` if either value is missing or malformed.
pub fn authenticate(
    actor_id: Option<&str>,
    actor_role: Option<&str>,
) -> Result<AuthenticatedActor, AuthError> {
    let id = actor_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AuthError::AuthenticationFailed {
            reason: String::from("missing actor id"),
        })?;
    let user_id = UserId::from_str(id).map_err(|_| AuthError::AuthenticationFailed {
        reason: format!("malformed actor id '{id}'"),
    })?;
    let role = actor_role
        .ok_or_else(|| AuthError::AuthenticationFailed {
            reason: String::from("missing actor role"),
        })?
        .parse::<Role>()?;
    Ok(AuthenticatedActor::new(user_id, role))
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    fn require(
        actor: &AuthenticatedActor,
        required: Role,
        action: &str,
    ) -> Result<(), AuthError> {
        if actor.role == required {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: required.to_string(),
            })
        }
    }

    /// Only students may create bookings.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not a student.
    pub fn authorize_create_booking(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, Role::Student, "create_booking")
    }

    /// Only tutors may accept or decline bookings.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not a tutor.
    pub fn authorize_respond_booking(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, Role::Tutor, "respond_booking")
    }

    /// # Errors
    ///
    /// Returns an error if the actor is not an admin.
    pub fn authorize_delete_booking(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, Role::Admin, "delete_booking")
    }

    /// # Errors
    ///
    /// Returns an error if the actor is not a student.
    pub fn authorize_create_report(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, Role::Student, "create_report")
    }

    /// # Errors
    ///
    /// Returns an error if the actor is not an admin.
    pub fn authorize_resolve_report(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, Role::Admin, "resolve_report")
    }

    /// # Errors
    ///
    /// Returns an error if the actor is not a student.
    pub fn authorize_submit_review(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, Role::Student, "submit_review")
    }

    /// # Errors
    ///
    /// Returns an error if the actor is not a tutor.
    pub fn authorize_request_withdrawal(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, Role::Tutor, "request_withdrawal")
    }

    /// # Errors
    ///
    /// Returns an error if the actor is not an admin.
    pub fn authorize_decide_withdrawal(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, Role::Admin, "decide_withdrawal")
    }

    /// A student profile is visible to its owner and to admins.
    ///
    /// # Errors
    ///
    /// Returns an error for any other actor.
    pub fn authorize_view_student(
        actor: &AuthenticatedActor,
        student: &Student,
    ) -> Result<(), AuthError> {
        if actor.is_admin() || (actor.role == Role::Student && actor.user_id == student.user_id) {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: String::from("view_student"),
                required_role: String::from("owning student or admin"),
            })
        }
    }

    /// A tutor profile and its ledger are visible to their owner and to
    /// admins.
    ///
    /// # Errors
    ///
    /// Returns an error for any other actor.
    pub fn authorize_view_tutor(actor: &AuthenticatedActor, tutor: &Tutor) -> Result<(), AuthError> {
        if actor.is_admin() || (actor.role == Role::Tutor && actor.user_id == tutor.user_id) {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: String::from("view_tutor"),
                required_role: String::from("owning tutor or admin"),
            })
        }
    }

    /// Notifications are private to their recipient; admins may read any.
    ///
    /// # Errors
    ///
    /// Returns an error for any other actor.
    pub fn authorize_view_notifications(
        actor: &AuthenticatedActor,
        recipient: UserId,
    ) -> Result<(), AuthError> {
        if actor.is_admin() || actor.user_id == recipient {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: String::from("view_notifications"),
                required_role: String::from("recipient or admin"),
            })
        }
    }
}
