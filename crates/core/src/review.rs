// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::admission::add_duration;
use crate::config::BookingConfig;
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use tutor_booking_domain::{
    Booking, BookingStatus, DomainError, ReviewSubmission, StudentId, TutorReview,
};

/// Opens an unsubmitted review for a finished accepted session.
///
/// # Errors
///
/// Returns an error if the booking is not accepted, already reviewed, or
/// the review window has not started yet.
pub fn open_review(
    booking: &Booking,
    config: &BookingConfig,
    now: DateTime<Utc>,
) -> Result<TutorReview, CoreError> {
    if booking.status != BookingStatus::Accepted || booking.is_deleted() {
        return Err(DomainError::ReviewNotOpenable {
            reason: "booking is not an accepted session",
        }
        .into());
    }
    if booking.is_reviewed {
        return Err(DomainError::ReviewNotOpenable {
            reason: "review already opened",
        }
        .into());
    }
    let opens_at = add_duration(
        booking.session_starts_at,
        config.create_review_duration,
        "computing review open time",
    )?;
    if now < opens_at {
        return Err(DomainError::ReviewNotOpenable {
            reason: "session has not finished",
        }
        .into());
    }
    Ok(TutorReview::open(booking, now))
}

/// A review after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedReview {
    pub review: TutorReview,
    /// True only for the first submission; the caller bumps the tutor's
    /// level point exactly then.
    pub first_submission: bool,
}

/// Submits or edits a review on behalf of `student`.
///
/// # Errors
///
/// Returns `NotReviewOwner` or `ReviewEditWindowClosed` as appropriate.
pub fn submit_review(
    review: &TutorReview,
    student: StudentId,
    submission: ReviewSubmission,
    config: &BookingConfig,
    now: DateTime<Utc>,
) -> Result<SubmittedReview, CoreError> {
    if review.deleted_at.is_some() {
        return Err(DomainError::NotFound { entity: "review" }.into());
    }
    review.ensure_editable(student, now, config.max_edited_duration)?;
    let mut updated = review.clone();
    let first_submission = updated.apply(submission, now);
    Ok(SubmittedReview {
        review: updated,
        first_submission,
    })
}
