// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{BookingId, ReportId, StudentId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle of a student's complaint about an accepted booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Done,
    Cancel,
}

impl ReportStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
            Self::Cancel => "cancel",
        }
    }

    /// Parses an admin resolution, which must be `done` or `cancel`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatus` for anything else.
    pub fn parse_resolution(s: &str) -> Result<Self, DomainError> {
        match Self::from_str(s)? {
            Self::Pending => Err(DomainError::InvalidStatus {
                entity: "report resolution",
                value: s.to_string(),
            }),
            resolved => Ok(resolved),
        }
    }
}

impl FromStr for ReportStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "done" => Ok(Self::Done),
            "cancel" => Ok(Self::Cancel),
            _ => Err(DomainError::InvalidStatus {
                entity: "report",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportBooking {
    pub id: ReportId,
    pub booking_id: BookingId,
    pub student_id: StudentId,
    pub topic: String,
    pub body: String,
    pub status: ReportStatus,
    pub resolved_by: Option<UserId>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ReportBooking {
    /// Validates and creates a pending report.
    ///
    /// # Errors
    ///
    /// Returns `EmptyReportField` when the topic or body is blank.
    pub fn new(
        booking_id: BookingId,
        student_id: StudentId,
        topic: &str,
        body: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(DomainError::EmptyReportField { field: "topic" });
        }
        let body = body.trim();
        if body.is_empty() {
            return Err(DomainError::EmptyReportField { field: "body" });
        }
        Ok(Self {
            id: ReportId::generate(),
            booking_id,
            student_id,
            topic: topic.to_string(),
            body: body.to_string(),
            status: ReportStatus::Pending,
            resolved_by: None,
            resolved_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    /// Moves a pending report to `resolution`.
    ///
    /// # Errors
    ///
    /// Returns `ReportNotPending` if the report was already resolved.
    pub fn resolve(
        &mut self,
        resolution: ReportStatus,
        admin: UserId,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if self.status != ReportStatus::Pending {
            return Err(DomainError::ReportNotPending {
                status: self.status,
            });
        }
        self.status = resolution;
        self.resolved_by = Some(admin);
        self.resolved_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}
