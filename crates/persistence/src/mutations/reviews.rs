// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::info;
use tutor_booking_domain::TutorReview;

use crate::data_models::{TutorReviewRow, encode_bool, encode_instant};
use crate::diesel_schema::tutor_reviews;
use crate::error::PersistenceError;

/// Inserts an opened, unsubmitted review.
///
/// # Errors
///
/// Returns `UniqueViolation` if the booking already has a review.
pub fn insert_review(
    conn: &mut SqliteConnection,
    review: &TutorReview,
) -> Result<(), PersistenceError> {
    diesel::insert_into(tutor_reviews::table)
        .values(&TutorReviewRow::from_domain(review))
        .execute(conn)?;
    info!(review_id = %review.id, booking_id = %review.booking_id, "Review opened");
    Ok(())
}

/// Writes the submitted fields of a live review.
///
/// # Errors
///
/// Returns `NotFound` if the review is gone.
pub fn update_review_submission(
    conn: &mut SqliteConnection,
    review: &TutorReview,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(tutor_reviews::table)
        .filter(tutor_reviews::id.eq(review.id.to_string()))
        .filter(tutor_reviews::deleted_at.is_null())
        .set((
            tutor_reviews::review.eq(review.review.clone()),
            tutor_reviews::rate.eq(review.rate.map(|r| i32::from(r.value()))),
            tutor_reviews::recommend_by_student.eq(encode_bool(review.recommend_by_student)),
            tutor_reviews::is_submitted.eq(encode_bool(review.is_submitted)),
            tutor_reviews::updated_at.eq(encode_instant(review.updated_at)),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("review {}", review.id)));
    }
    info!(review_id = %review.id, "Review submitted");
    Ok(())
}
