// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::info;
use tutor_booking_domain::{ReportBooking, ReportStatus};

use crate::data_models::{ReportRow, encode_instant, encode_optional_instant};
use crate::diesel_schema::report_bookings;
use crate::error::PersistenceError;

/// Inserts a pending report.
///
/// # Errors
///
/// Returns `UniqueViolation` if the booking already has a report.
pub fn insert_report(
    conn: &mut SqliteConnection,
    report: &ReportBooking,
) -> Result<(), PersistenceError> {
    diesel::insert_into(report_bookings::table)
        .values(&ReportRow::from_domain(report))
        .execute(conn)?;
    info!(report_id = %report.id, booking_id = %report.booking_id, "Report filed");
    Ok(())
}

/// Writes the resolution of a report that is still pending.
///
/// # Errors
///
/// Returns `NotFound` if no live pending report with this id exists.
pub fn update_report_resolution(
    conn: &mut SqliteConnection,
    report: &ReportBooking,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(report_bookings::table)
        .filter(report_bookings::id.eq(report.id.to_string()))
        .filter(report_bookings::status.eq(ReportStatus::Pending.as_str()))
        .filter(report_bookings::deleted_at.is_null())
        .set((
            report_bookings::status.eq(report.status.as_str()),
            report_bookings::resolved_by.eq(report.resolved_by.map(|u| u.to_string())),
            report_bookings::resolved_at.eq(encode_optional_instant(report.resolved_at)),
            report_bookings::updated_at.eq(encode_instant(report.updated_at)),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "pending report {}",
            report.id
        )));
    }
    info!(report_id = %report.id, status = %report.status, "Report resolved");
    Ok(())
}
