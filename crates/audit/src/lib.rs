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
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tutor_booking_domain::{Booking, BookingId, BookingStatus, DomainError, UserId};

/// The kind of party performing an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Student,
    Tutor,
    Admin,
    /// The periodic scheduler.
    System,
}

impl ActorRole {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Tutor => "tutor",
            Self::Admin => "admin",
            Self::System => "system",
        }
    }
}

impl FromStr for ActorRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "tutor" => Ok(Self::Tutor),
            "admin" => Ok(Self::Admin),
            "system" => Ok(Self::System),
            _ => Err(DomainError::InvalidStatus {
                entity: "actor role",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents the entity performing an action.
///
/// Human actors carry the user id of their login account. The scheduler
/// acts without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Option<UserId>,
    pub role: ActorRole,
}

impl Actor {
    #[must_use]
    pub const fn user(user_id: UserId, role: ActorRole) -> Self {
        Self {
            user_id: Some(user_id),
            role,
        }
    }

    #[must_use]
    pub const fn system() -> Self {
        Self {
            user_id: None,
            role: ActorRole::System,
        }
    }

    #[must_use]
    pub const fn is_system(&self) -> bool {
        matches!(self.role, ActorRole::System)
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.user_id {
            Some(id) => write!(f, "{}:{id}", self.role),
            None => write!(f, "{}", self.role),
        }
    }
}

/// An immutable record of one persisted booking status change.
///
/// Every successful create, accept, decline and expire produces exactly
/// one of these, so the history of a booking replays its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStatusChange {
    pub booking_id: BookingId,
    /// `None` for the creation record.
    pub previous_status: Option<BookingStatus>,
    pub new_status: BookingStatus,
    pub transitioned_at: DateTime<Utc>,
    pub actor: Actor,
    pub notes: Option<String>,
}

impl BookingStatusChange {
    /// Records the creation of a booking in `pending`.
    #[must_use]
    pub fn created(booking: &Booking, actor: Actor) -> Self {
        Self {
            booking_id: booking.id,
            previous_status: None,
            new_status: booking.status,
            transitioned_at: booking.created_at,
            actor,
            notes: booking.notes_for_tutor.clone(),
        }
    }

    /// Records a move from `previous` to the booking's current status.
    #[must_use]
    pub fn transition(
        booking: &Booking,
        previous: BookingStatus,
        actor: Actor,
        at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Self {
        Self {
            booking_id: booking.id,
            previous_status: Some(previous),
            new_status: booking.status,
            transitioned_at: at,
            actor,
            notes,
        }
    }

}
