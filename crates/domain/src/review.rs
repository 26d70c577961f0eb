// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Post-session reviews.
//!
//! A review is opened unsubmitted once the session has ended, then the
//! student submits and may edit it until the edit window closes.

use crate::booking::Booking;
use crate::error::DomainError;
use crate::types::{BookingId, CourseId, ReviewId, StudentId, TutorId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Star rating, 1 to 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRate` outside 1..=5.
    pub fn new(value: i64) -> Result<Self, DomainError> {
        match u8::try_from(value) {
            Ok(v @ 1..=5) => Ok(Self(v)),
            _ => Err(DomainError::InvalidRate(value)),
        }
    }

    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i64 {
    fn from(value: Rating) -> Self {
        Self::from(value.0)
    }
}

/// A validated review submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSubmission {
    pub review: String,
    pub rate: Rating,
    pub recommend: bool,
}

impl ReviewSubmission {
    /// # Errors
    ///
    /// Returns `EmptyReview` for blank text or `InvalidRate` for a rate
    /// outside 1..=5.
    pub fn new(review: &str, rate: i64, recommend: Option<bool>) -> Result<Self, DomainError> {
        let review = review.trim();
        if review.is_empty() {
            return Err(DomainError::EmptyReview);
        }
        Ok(Self {
            review: review.to_string(),
            rate: Rating::new(rate)?,
            recommend: recommend.unwrap_or(false),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorReview {
    pub id: ReviewId,
    pub booking_id: BookingId,
    pub course_id: CourseId,
    pub tutor_id: TutorId,
    pub student_id: StudentId,
    pub review: Option<String>,
    pub rate: Option<Rating>,
    pub recommend_by_student: bool,
    pub is_submitted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TutorReview {
    /// Opens an empty review for an accepted booking.
    #[must_use]
    pub fn open(booking: &Booking, now: DateTime<Utc>) -> Self {
        Self {
            id: ReviewId::generate(),
            booking_id: booking.id,
            course_id: booking.course_id,
            tutor_id: booking.tutor_id,
            student_id: booking.student_id,
            review: None,
            rate: None,
            recommend_by_student: false,
            is_submitted: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Returns the last instant the review may be written.
    ///
    /// # Errors
    ///
    /// Returns `DateArithmeticOverflow` if the window end is unrepresentable.
    pub fn edit_deadline(&self, max_edited: Duration) -> Result<DateTime<Utc>, DomainError> {
        self.created_at
            .checked_add_signed(max_edited)
            .ok_or_else(|| DomainError::DateArithmeticOverflow {
                operation: String::from("computing review edit deadline"),
            })
    }

    /// Checks ownership and the edit window for `student` at `now`.
    ///
    /// # Errors
    ///
    /// Returns `NotReviewOwner` for another student and
    /// `ReviewEditWindowClosed` once `now` is past the deadline.
    pub fn ensure_editable(
        &self,
        student: StudentId,
        now: DateTime<Utc>,
        max_edited: Duration,
    ) -> Result<(), DomainError> {
        if self.student_id != student {
            return Err(DomainError::NotReviewOwner);
        }
        if now > self.edit_deadline(max_edited)? {
            return Err(DomainError::ReviewEditWindowClosed);
        }
        Ok(())
    }

    /// Applies a submission and reports whether it was the first one.
    pub fn apply(&mut self, submission: ReviewSubmission, now: DateTime<Utc>) -> bool {
        let first_submission = !self.is_submitted;
        self.review = Some(submission.review);
        self.rate = Some(submission.rate);
        self.recommend_by_student = submission.recommend;
        self.is_submitted = true;
        self.updated_at = now;
        first_submission
    }
}
