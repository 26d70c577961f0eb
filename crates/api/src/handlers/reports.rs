// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tracing::info;
use tutor_booking::NotificationEvent;
use tutor_booking_domain::{
    BookingId, BookingStatus, DomainError, ReportBooking, ReportId, ReportStatus,
};
use tutor_booking_persistence::Persistence;

use super::{
    guarded_write, not_found, parse_id, record_events, require_booking, require_student,
    student_user,
};
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::env::BookingEnv;
use crate::error::{ApiError, translate_domain_error};
use crate::request_response::{CreateReportRequest, ReportResponse, ResolveReportRequest};
use crate::retry::with_retry;

/// Files a report against the acting student's accepted booking.
///
/// # Errors
///
/// Returns an error if the booking is not the student's, is not accepted,
/// already has a report, or the topic or body is blank.
pub fn create_report(
    persistence: &mut Persistence,
    env: &BookingEnv,
    authenticated_actor: &AuthenticatedActor,
    booking_id: &str,
    request: &CreateReportRequest,
) -> Result<ReportResponse, ApiError> {
    AuthorizationService::authorize_create_report(authenticated_actor)?;
    let booking_id: BookingId = parse_id(booking_id)?;
    let now = env.now();

    let report = with_retry("create_report", || {
        persistence.transaction(|store| -> Result<ReportBooking, ApiError> {
            let student = require_student(store, authenticated_actor.user_id)?;
            let booking = require_booking(store, booking_id)?;
            if booking.student_id != student.id {
                return Err(translate_domain_error(DomainError::NotBookingStudent));
            }
            if booking.effective_status(now) != BookingStatus::Accepted {
                return Err(translate_domain_error(
                    DomainError::ReportRequiresAcceptedBooking,
                ));
            }
            if store.find_report_by_booking(booking_id)?.is_some() {
                return Err(translate_domain_error(DomainError::ReportAlreadyExists));
            }
            let report = ReportBooking::new(
                booking_id,
                student.id,
                &request.topic,
                &request.body,
                now,
            )
            .map_err(translate_domain_error)?;
            store.insert_report(&report)?;
            Ok(report)
        })
    })?;

    info!(report_id = %report.id, booking_id = %booking_id, "Report filed");
    Ok(ReportResponse { report })
}

/// Closes a pending report as `done` or `cancel` and tells the student.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the resolution is not
/// `done` or `cancel`, or the report was already resolved.
pub fn resolve_report(
    persistence: &mut Persistence,
    env: &BookingEnv,
    authenticated_actor: &AuthenticatedActor,
    report_id: &str,
    request: &ResolveReportRequest,
) -> Result<ReportResponse, ApiError> {
    AuthorizationService::authorize_resolve_report(authenticated_actor)?;
    let report_id: ReportId = parse_id(report_id)?;
    let resolution =
        ReportStatus::parse_resolution(request.status.trim()).map_err(translate_domain_error)?;
    let now = env.now();

    let (report, events) = with_retry("resolve_report", || {
        persistence.transaction(|store| -> Result<_, ApiError> {
            let mut report = store
                .find_report(report_id)?
                .ok_or_else(|| not_found("report"))?;
            report
                .resolve(resolution, authenticated_actor.user_id, now)
                .map_err(translate_domain_error)?;
            store
                .update_report_resolution(&report)
                .map_err(|err| guarded_write(err, "report"))?;

            let recipient = student_user(store, report.student_id)?;
            let events = vec![NotificationEvent::report_resolved(
                report.booking_id,
                recipient,
                resolution.as_str(),
            )];
            record_events(store, &events, now)?;
            Ok((report, events))
        })
    })?;

    info!(report_id = %report_id, resolution = %resolution, "Report resolved");
    env.dispatch(events);
    Ok(ReportResponse { report })
}
