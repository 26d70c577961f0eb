// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tracing::info;
use tutor_booking::NotificationEvent;
use tutor_booking_domain::{ReviewId, ReviewSubmission, TutorReview};
use tutor_booking_persistence::{Persistence, Store};

use super::{not_found, parse_id, record_events, require_student, tutor_user};
use crate::auth::{AuthenticatedActor, AuthorizationService, Role};
use crate::env::BookingEnv;
use crate::error::{ApiError, translate_core_error, translate_domain_error};
use crate::request_response::{ReviewResponse, SubmitReviewRequest};
use crate::retry::with_retry;

fn require_review(store: &mut Store<'_>, review_id: ReviewId) -> Result<TutorReview, ApiError> {
    store
        .find_review(review_id)?
        .ok_or_else(|| not_found("review"))
}

fn review_response(env: &BookingEnv, review: TutorReview) -> Result<ReviewResponse, ApiError> {
    let editable_until = review
        .edit_deadline(env.config.max_edited_duration)
        .map_err(translate_domain_error)?;
    Ok(ReviewResponse {
        review,
        editable_until,
    })
}

/// Reads a review.
///
/// Visible to the reviewing student, the reviewed tutor, and admins.
///
/// # Errors
///
/// Returns an error if the review does not exist or the actor may not view
/// it.
pub fn get_review(
    persistence: &mut Persistence,
    env: &BookingEnv,
    authenticated_actor: &AuthenticatedActor,
    review_id: &str,
) -> Result<ReviewResponse, ApiError> {
    let review_id: ReviewId = parse_id(review_id)?;
    let review = persistence.read(|store| -> Result<TutorReview, ApiError> {
        let review = require_review(store, review_id)?;
        let allowed = match authenticated_actor.role {
            Role::Admin => true,
            Role::Student => store
                .find_student_by_user(authenticated_actor.user_id)?
                .is_some_and(|student| student.id == review.student_id),
            Role::Tutor => store
                .find_tutor_by_user(authenticated_actor.user_id)?
                .is_some_and(|tutor| tutor.id == review.tutor_id),
        };
        if !allowed {
            return Err(ApiError::Unauthorized {
                action: String::from("view_review"),
                required_role: String::from("review party or admin"),
            });
        }
        Ok(review)
    })?;
    review_response(env, review)
}

/// Submits or edits the acting student's review.
///
/// The first submission raises the tutor's level point by one in the same
/// transaction; later edits do not.
///
/// # Errors
///
/// Returns an error if the actor does not own the review, the edit window
/// has closed, or the rate or text is invalid.
pub fn submit_review(
    persistence: &mut Persistence,
    env: &BookingEnv,
    authenticated_actor: &AuthenticatedActor,
    review_id: &str,
    request: &SubmitReviewRequest,
) -> Result<ReviewResponse, ApiError> {
    AuthorizationService::authorize_submit_review(authenticated_actor)?;
    let review_id: ReviewId = parse_id(review_id)?;
    let submission = ReviewSubmission::new(&request.review, request.rate, request.recommend)
        .map_err(translate_domain_error)?;
    let now = env.now();

    let (review, first_submission, events) = with_retry("submit_review", || {
        persistence.transaction(|store| -> Result<_, ApiError> {
            let student = require_student(store, authenticated_actor.user_id)?;
            let review = require_review(store, review_id)?;
            let submitted = tutor_booking::submit_review(
                &review,
                student.id,
                submission.clone(),
                &env.config,
                now,
            )
            .map_err(translate_core_error)?;
            store.update_review_submission(&submitted.review)?;

            if submitted.first_submission {
                store.increment_level_point(review.tutor_id, 1)?;
            }
            let recipient = tutor_user(store, review.tutor_id)?;
            let events = vec![NotificationEvent::review_submitted(
                review.booking_id,
                recipient,
                submission.rate.value(),
            )];
            record_events(store, &events, now)?;
            Ok((submitted.review, submitted.first_submission, events))
        })
    })?;

    info!(
        review_id = %review_id,
        first_submission,
        "Review submitted"
    );
    env.dispatch(events);
    review_response(env, review)
}
