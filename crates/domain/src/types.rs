// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Generates an opaque UUID-backed identifier type.
///
/// Every entity id is a distinct type so a `TutorId` can never be passed
/// where a `StudentId` is expected.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0.as_hyphenated())
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|_| DomainError::InvalidId {
                        entity: $label,
                        value: s.to_string(),
                    })
            }
        }
    };
}

entity_id!(
    /// Identifier of a booking.
    BookingId,
    "booking"
);
entity_id!(
    /// Identifier of a course.
    CourseId,
    "course"
);
entity_id!(
    /// Identifier of a course schedule slot.
    ScheduleId,
    "schedule"
);
entity_id!(
    /// Identifier of a course category.
    CategoryId,
    "category"
);
entity_id!(
    /// Identifier of a tutor profile.
    TutorId,
    "tutor"
);
entity_id!(
    /// Identifier of a student profile.
    StudentId,
    "student"
);
entity_id!(
    /// Identifier of the login account behind a tutor or student profile.
    UserId,
    "user"
);
entity_id!(
    /// Identifier of a tutor review.
    ReviewId,
    "review"
);
entity_id!(
    /// Identifier of a booking report.
    ReportId,
    "report"
);
entity_id!(
    /// Identifier of a withdrawal request.
    WithdrawalId,
    "withdrawal"
);
entity_id!(
    /// Identifier of a ledger transaction.
    TransactionId,
    "transaction"
);
entity_id!(
    /// Identifier of a user-facing notification.
    NotificationId,
    "notification"
);

/// How a session is delivered.
///
/// Requests carry `Online` or `Offline`; `All` only appears on courses and
/// schedule slots and means either is acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassType {
    Online,
    Offline,
    All,
}

impl ClassType {
    /// Converts this class type to its wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::All => "all",
        }
    }

    /// Parses the class type of a booking request, where `all` is not allowed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidClassType` for `all` or unknown values.
    pub fn parse_requested(s: &str) -> Result<Self, DomainError> {
        match Self::from_str(s)? {
            Self::All => Err(DomainError::InvalidClassType(s.to_string())),
            requested => Ok(requested),
        }
    }

    /// Returns whether an offering of this class type accepts `requested`.
    #[must_use]
    pub fn accepts(&self, requested: Self) -> bool {
        *self == Self::All || *self == requested
    }
}

impl FromStr for ClassType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            "all" => Ok(Self::All),
            _ => Err(DomainError::InvalidClassType(s.to_string())),
        }
    }
}

impl std::fmt::Display for ClassType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Indonesian civil timezones recognised on schedules.
///
/// None of them observes daylight saving time, so each maps to a fixed
/// UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timezone {
    /// Western Indonesia Time, UTC+7.
    #[default]
    #[serde(rename = "WIB")]
    Wib,
    /// Central Indonesia Time, UTC+8.
    #[serde(rename = "WITA")]
    Wita,
    /// Eastern Indonesia Time, UTC+9.
    #[serde(rename = "WIT")]
    Wit,
}

impl Timezone {
    /// Converts this timezone to its wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Wib => "WIB",
            Self::Wita => "WITA",
            Self::Wit => "WIT",
        }
    }

    /// Hours east of UTC.
    #[must_use]
    pub const fn utc_offset_hours(&self) -> i32 {
        match self {
            Self::Wib => 7,
            Self::Wita => 8,
            Self::Wit => 9,
        }
    }

    /// Returns the fixed offset for this timezone.
    ///
    /// # Errors
    ///
    /// Returns an error if the offset cannot be represented, which cannot
    /// happen for the three supported zones.
    pub fn offset(&self) -> Result<FixedOffset, DomainError> {
        FixedOffset::east_opt(self.utc_offset_hours() * 3600)
            .ok_or_else(|| DomainError::InvalidTimezone(self.as_str().to_string()))
    }

    /// Combines a local calendar date and wall time in this timezone into an
    /// absolute instant.
    ///
    /// # Errors
    ///
    /// Returns an error if the local date-time cannot be mapped to UTC.
    pub fn combine(&self, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>, DomainError> {
        date.and_time(time)
            .and_local_timezone(self.offset()?)
            .single()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| DomainError::InvalidDate {
                value: format!("{date} {time} {self}"),
                reason: String::from("local time cannot be mapped to an instant"),
            })
    }

    /// Returns the local calendar date of `instant` in this timezone.
    ///
    /// # Errors
    ///
    /// Returns an error if the offset cannot be constructed.
    pub fn local_date(&self, instant: DateTime<Utc>) -> Result<NaiveDate, DomainError> {
        Ok(instant.with_timezone(&self.offset()?).date_naive())
    }
}

impl FromStr for Timezone {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WIB" => Ok(Self::Wib),
            "WITA" => Ok(Self::Wita),
            "WIT" => Ok(Self::Wit),
            _ => Err(DomainError::InvalidTimezone(s.to_string())),
        }
    }
}

impl std::fmt::Display for Timezone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Day of week encoded 1..=7 with 1 = Monday and 7 = Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    /// Creates a day of week from its 1-based number.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDayOfWeek` outside 1..=7.
    pub const fn new(value: u8) -> Result<Self, DomainError> {
        if value >= 1 && value <= 7 {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidDayOfWeek(value))
        }
    }

    /// Returns the weekday of a calendar date.
    #[must_use]
    pub fn of_date(date: NaiveDate) -> Self {
        // number_from_monday is always 1..=7
        #[allow(clippy::cast_possible_truncation)]
        Self(date.weekday().number_from_monday() as u8)
    }

    /// Returns the 1-based number.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> Self {
        day.0
    }
}
