// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tutor_booking_domain::{BookingId, ReviewId, TutorReview};

use crate::data_models::TutorReviewRow;
use crate::diesel_schema::tutor_reviews;
use crate::error::PersistenceError;

/// Retrieves a live review by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_review(
    conn: &mut SqliteConnection,
    review_id: ReviewId,
) -> Result<Option<TutorReview>, PersistenceError> {
    tutor_reviews::table
        .filter(tutor_reviews::id.eq(review_id.to_string()))
        .filter(tutor_reviews::deleted_at.is_null())
        .select(TutorReviewRow::as_select())
        .first::<TutorReviewRow>(conn)
        .optional()?
        .map(TutorReviewRow::into_domain)
        .transpose()
}

/// Retrieves the live review opened for a booking.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_review_by_booking(
    conn: &mut SqliteConnection,
    booking_id: BookingId,
) -> Result<Option<TutorReview>, PersistenceError> {
    tutor_reviews::table
        .filter(tutor_reviews::booking_id.eq(booking_id.to_string()))
        .filter(tutor_reviews::deleted_at.is_null())
        .select(TutorReviewRow::as_select())
        .first::<TutorReviewRow>(conn)
        .optional()?
        .map(TutorReviewRow::into_domain)
        .transpose()
}
