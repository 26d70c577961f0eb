// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tutor_booking_domain::{BookingId, ReportBooking, ReportId};

use crate::data_models::ReportRow;
use crate::diesel_schema::report_bookings;
use crate::error::PersistenceError;

/// Retrieves a live report by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_report(
    conn: &mut SqliteConnection,
    report_id: ReportId,
) -> Result<Option<ReportBooking>, PersistenceError> {
    report_bookings::table
        .filter(report_bookings::id.eq(report_id.to_string()))
        .filter(report_bookings::deleted_at.is_null())
        .select(ReportRow::as_select())
        .first::<ReportRow>(conn)
        .optional()?
        .map(ReportRow::into_domain)
        .transpose()
}

/// Retrieves the report filed against a booking, tombstoned or not.
///
/// The one-report-per-booking rule holds across tombstones.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_report_by_booking(
    conn: &mut SqliteConnection,
    booking_id: BookingId,
) -> Result<Option<ReportBooking>, PersistenceError> {
    report_bookings::table
        .filter(report_bookings::booking_id.eq(booking_id.to_string()))
        .select(ReportRow::as_select())
        .first::<ReportRow>(conn)
        .optional()?
        .map(ReportRow::into_domain)
        .transpose()
}
