// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Admission policy for new booking requests.
//!
//! The checks run in a fixed order and the first failure wins, so a
//! request for an unknown course never reports a quota problem. All
//! reads go through an [`AdmissionReader`], which the store implements on
//! top of the same write transaction that later inserts the booking.

use crate::config::BookingConfig;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use tutor_booking_domain::{
    Booking, BookingRequest, BookingStatus, CategoryId, ClassType, Coordinates, Course, CourseId,
    CourseSchedule, DayOfWeek, DomainError, StudentId, Timezone,
};

/// Store reads the admission checks depend on.
///
/// Every method ignores tombstoned rows.
pub trait AdmissionReader {
    type Error;

    fn find_course(&mut self, course_id: CourseId) -> Result<Option<Course>, Self::Error>;

    fn find_course_schedules(
        &mut self,
        course_id: CourseId,
    ) -> Result<Vec<CourseSchedule>, Self::Error>;

    /// Bookings of `student_id` at exactly this local date and time.
    fn find_student_bookings_at(
        &mut self,
        student_id: StudentId,
        booking_date: NaiveDate,
        booking_time: NaiveTime,
    ) -> Result<Vec<Booking>, Self::Error>;

    /// Any free-first-course booking the student holds for `course_id`.
    fn find_free_booking_for_course(
        &mut self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Option<Booking>, Self::Error>;

    /// Free-first-course bookings in a category created in `[from, to)`,
    /// oldest first.
    fn find_free_bookings_created_between(
        &mut self,
        student_id: StudentId,
        category_id: CategoryId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, Self::Error>;

    /// Number of bookings the student created in `[from, to)`.
    fn count_bookings_created_between(
        &mut self,
        student_id: StudentId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, Self::Error>;

    fn find_student_bookings_in_category(
        &mut self,
        student_id: StudentId,
        category_id: CategoryId,
    ) -> Result<Vec<Booking>, Self::Error>;
}

/// Why a request was not admitted.
#[derive(Debug)]
pub enum AdmissionError<E> {
    /// A policy check failed.
    Rejected(DomainError),
    /// The store could not answer.
    Store(E),
}

impl<E> From<DomainError> for AdmissionError<E> {
    fn from(err: DomainError) -> Self {
        Self::Rejected(err)
    }
}

/// Everything the booking insert needs once a request is admitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Admission {
    pub course: Course,
    pub schedule: CourseSchedule,
    pub location: Option<Coordinates>,
    pub is_free_first_course: bool,
    pub session_starts_at: DateTime<Utc>,
    pub expired_at: DateTime<Utc>,
    /// Persisted-pending bookings at the same slot whose deadline has
    /// passed. They must be materialised as expired before the insert so
    /// the slot uniqueness constraint only sees live bookings.
    pub stale_pending: Vec<Booking>,
}

/// UTC bounds of the local calendar day containing `now`.
///
/// # Errors
///
/// Returns an error if the day boundaries cannot be represented.
pub fn local_day_bounds(
    now: DateTime<Utc>,
    timezone: Timezone,
) -> Result<(DateTime<Utc>, DateTime<Utc>), DomainError> {
    let today = timezone.local_date(now)?;
    let tomorrow = today
        .succ_opt()
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: String::from("computing the next local day"),
        })?;
    Ok((
        timezone.combine(today, NaiveTime::MIN)?,
        timezone.combine(tomorrow, NaiveTime::MIN)?,
    ))
}

/// Runs every admission check for `request` at `now`.
///
/// # Errors
///
/// Returns `AdmissionError::Rejected` with the first failing rule, or
/// `AdmissionError::Store` if a read fails.
pub fn evaluate_admission<R: AdmissionReader>(
    reader: &mut R,
    request: &BookingRequest,
    config: &BookingConfig,
    now: DateTime<Utc>,
) -> Result<Admission, AdmissionError<R::Error>> {
    // 1. course
    let course = reader
        .find_course(request.course_id)
        .map_err(AdmissionError::Store)?
        .filter(|course| course.is_bookable_for(request.class_type))
        .ok_or(DomainError::NotFound { entity: "course" })?;

    // 2. schedule slot
    let day_of_week = DayOfWeek::of_date(request.booking_date);
    let schedule = reader
        .find_course_schedules(course.id)
        .map_err(AdmissionError::Store)?
        .into_iter()
        .find(|slot| {
            slot.matches(
                day_of_week,
                request.booking_time,
                request.timezone,
                request.class_type,
            )
        })
        .ok_or(DomainError::NotFound {
            entity: "schedule",
        })?;

    // 3. student collision
    let at_slot = reader
        .find_student_bookings_at(
            request.student_id,
            request.booking_date,
            request.booking_time,
        )
        .map_err(AdmissionError::Store)?;
    if let Some(conflicting) = at_slot.iter().find(|b| b.is_active_at(now)) {
        return Err(DomainError::StudentAlreadyHasAnotherSchedule {
            conflicting: Box::new(conflicting.clone()),
        }
        .into());
    }
    let stale_pending: Vec<Booking> = at_slot
        .into_iter()
        .filter(|b| b.status == BookingStatus::Pending && b.deleted_at.is_none())
        .collect();

    // 4. offline location
    let location = match request.class_type {
        ClassType::Offline => Some(
            Coordinates::from_parts(request.latitude, request.longitude)
                .ok_or(DomainError::OfflineRequiresCoordinates)?,
        ),
        ClassType::Online | ClassType::All => None,
    };

    let (day_start, day_end) = local_day_bounds(now, config.local_timezone)?;

    // 5. free first course
    let is_free_first_course = if course.is_free_first_course {
        evaluate_free_first_course(reader, request, &course, config, day_start, day_end)?
    } else {
        false
    };

    // 6. optional caps
    if let Some(limit) = config.max_booking_per_day {
        let created_today = reader
            .count_bookings_created_between(request.student_id, day_start, day_end)
            .map_err(AdmissionError::Store)?;
        if created_today >= u64::from(limit) {
            return Err(DomainError::MaxBookingPerDay { limit }.into());
        }
    }
    if let Some(limit) = config.max_booking_per_category {
        let live_in_category = reader
            .find_student_bookings_in_category(request.student_id, course.category_id)
            .map_err(AdmissionError::Store)?
            .iter()
            .filter(|b| b.is_active_at(now))
            .count();
        if live_in_category >= usize::try_from(limit).unwrap_or(usize::MAX) {
            return Err(DomainError::MaxBookingPerCategory { limit }.into());
        }
    }

    let session_starts_at = request
        .timezone
        .combine(request.booking_date, request.booking_time)?;
    let expired_at = add_duration(now, config.expired_duration, "computing booking expiry")?;

    Ok(Admission {
        course,
        schedule,
        location,
        is_free_first_course,
        session_starts_at,
        expired_at,
        stale_pending,
    })
}

fn evaluate_free_first_course<R: AdmissionReader>(
    reader: &mut R,
    request: &BookingRequest,
    course: &Course,
    config: &BookingConfig,
    day_start: DateTime<Utc>,
    day_end: DateTime<Utc>,
) -> Result<bool, AdmissionError<R::Error>> {
    // Already used the promotion on this course: book as paid.
    if reader
        .find_free_booking_for_course(request.student_id, course.id)
        .map_err(AdmissionError::Store)?
        .is_some()
    {
        return Ok(false);
    }

    let used_today = reader
        .find_free_bookings_created_between(
            request.student_id,
            course.category_id,
            day_start,
            day_end,
        )
        .map_err(AdmissionError::Store)?;
    let limit = config.max_booking_free_first_course;
    if used_today.len() >= usize::try_from(limit).unwrap_or(usize::MAX) {
        return Err(DomainError::MaxBookingFreeFirstCourse {
            limit,
            earliest: used_today.into_iter().next().map(Box::new),
        }
        .into());
    }
    Ok(true)
}

pub(crate) fn add_duration(
    at: DateTime<Utc>,
    by: Duration,
    operation: &str,
) -> Result<DateTime<Utc>, DomainError> {
    at.checked_add_signed(by)
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: operation.to_string(),
        })
}
