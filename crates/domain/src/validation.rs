// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{ClassType, CourseId, StudentId, Timezone};
use chrono::{NaiveDate, NaiveTime};
use std::str::FromStr;

/// Parses an ISO `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns `DomainError::InvalidDate` for any other shape or an impossible
/// date such as `2026-02-30`.
pub fn parse_booking_date(value: &str) -> Result<NaiveDate, DomainError> {
    if value.len() != 10 {
        return Err(DomainError::InvalidDate {
            value: value.to_string(),
            reason: String::from("expected YYYY-MM-DD"),
        });
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| DomainError::InvalidDate {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Parses a local wall time `HH:MM:SS`.
///
/// # Errors
///
/// Returns `DomainError::InvalidTime` for any other shape.
pub fn parse_booking_time(value: &str) -> Result<NaiveTime, DomainError> {
    if value.len() != 8 {
        return Err(DomainError::InvalidTime {
            value: value.to_string(),
            reason: String::from("expected HH:MM:SS"),
        });
    }
    NaiveTime::parse_from_str(value, "%H:%M:%S").map_err(|e| DomainError::InvalidTime {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Normalises optional free text: blank strings become `None`.
#[must_use]
pub fn normalize_notes(notes: Option<&str>) -> Option<String> {
    notes
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(ToString::to_string)
}

/// A booking request whose wire values have been parsed.
///
/// Coordinates stay raw; whether they are required depends on the class
/// type and is checked during admission.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub class_type: ClassType,
    pub booking_date: NaiveDate,
    pub booking_time: NaiveTime,
    pub timezone: Timezone,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: Option<String>,
}

/// Unparsed booking request fields as received from a client.
#[derive(Debug, Clone, Copy)]
pub struct RawBookingRequest<'a> {
    pub course_id: &'a str,
    pub class_type: &'a str,
    pub booking_date: &'a str,
    pub booking_time: &'a str,
    pub timezone: Option<&'a str>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: Option<&'a str>,
}

impl BookingRequest {
    /// Validates raw request fields for `student_id`.
    ///
    /// A missing timezone falls back to `default_timezone`.
    ///
    /// # Errors
    ///
    /// Returns the first field error encountered.
    pub fn parse(
        student_id: StudentId,
        raw: RawBookingRequest<'_>,
        default_timezone: Timezone,
    ) -> Result<Self, DomainError> {
        let course_id = CourseId::from_str(raw.course_id)?;
        let class_type = ClassType::parse_requested(raw.class_type)?;
        let booking_date = parse_booking_date(raw.booking_date)?;
        let booking_time = parse_booking_time(raw.booking_time)?;
        let timezone = raw
            .timezone
            .map_or(Ok(default_timezone), Timezone::from_str)?;

        Ok(Self {
            student_id,
            course_id,
            class_type,
            booking_date,
            booking_time,
            timezone,
            latitude: raw.latitude,
            longitude: raw.longitude,
            notes: normalize_notes(raw.notes),
        })
    }
}
