// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test harness: an in-memory store seeded with one tutor, one student and
//! one published course, plus deterministic collaborators.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use std::path::Path;
use std::sync::Arc;
use tutor_booking::{
    BookingCodeGenerator, BookingConfig, CoordinateGeocoder, ManualClock, MemoryCache,
    RandomCodeGenerator, RecordingNotifier,
};
use tutor_booking_domain::{
    BookingId, CategoryId, ClassType, Course, CourseId, CourseSchedule, DayOfWeek, Money,
    ScheduleId, Student, StudentId, Timezone, Tutor, TutorId, TutorReview, UserId,
};
use tutor_booking_persistence::{Persistence, PersistenceError};

use crate::{
    AuthenticatedActor, BookingEnv, BookingInfo, CreateBookingRequest, ReactionScheduler,
    RespondBookingRequest, RespondBookingResponse, Role, SweepReport, accept_booking,
    create_booking,
};

fn in_memory() -> Persistence {
    Persistence::new_in_memory().unwrap()
}

pub fn instant(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Monday 2026-03-02 01:00 UTC (08:00 WIB).
pub fn test_now() -> DateTime<Utc> {
    instant(2026, 3, 2, 1, 0)
}

/// Tuesday 2026-03-03 10:00 WIB.
pub fn session_start() -> DateTime<Utc> {
    instant(2026, 3, 3, 3, 0)
}

pub const SESSION_DATE: &str = "2026-03-03";
pub const SESSION_TIME: &str = "10:00:00";

/// Course price: 200,000.00.
pub const PRICE_MINOR: i64 = 20_000_000;

pub struct Harness {
    pub db: Persistence,
    pub env: BookingEnv,
    pub clock: Arc<ManualClock>,
    pub notifier: Arc<RecordingNotifier>,
    pub cache: Arc<MemoryCache>,
    pub scheduler: ReactionScheduler,
    pub tutor: Tutor,
    pub student: Student,
    pub course: Course,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(
            in_memory(),
            BookingConfig::default(),
            false,
            Arc::new(RandomCodeGenerator),
        )
    }

    /// A harness over a database file, so other handles can open it too.
    pub fn on_file(path: &Path) -> Self {
        Self::build(
            Persistence::new_with_file(path).unwrap(),
            BookingConfig::default(),
            false,
            Arc::new(RandomCodeGenerator),
        )
    }

    pub fn with_config(config: BookingConfig) -> Self {
        Self::build(in_memory(), config, false, Arc::new(RandomCodeGenerator))
    }

    pub fn with_free_course() -> Self {
        Self::build(
            in_memory(),
            BookingConfig::default(),
            true,
            Arc::new(RandomCodeGenerator),
        )
    }

    pub fn with_codes(config: BookingConfig, codes: Arc<dyn BookingCodeGenerator>) -> Self {
        Self::build(in_memory(), config, false, codes)
    }

    fn build(
        db: Persistence,
        config: BookingConfig,
        free_first_course: bool,
        codes: Arc<dyn BookingCodeGenerator>,
    ) -> Self {
        let clock = Arc::new(ManualClock::new(test_now()));
        let notifier = Arc::new(RecordingNotifier::new());
        let cache = Arc::new(MemoryCache::new());
        let env = BookingEnv::new(
            config,
            clock.clone(),
            notifier.clone(),
            cache.clone(),
            codes,
            Arc::new(CoordinateGeocoder),
        )
        .unwrap();

        let mut harness = Self {
            db,
            env,
            clock,
            notifier,
            cache,
            scheduler: ReactionScheduler::new(),
            tutor: new_tutor("Budi Santoso"),
            student: new_student("Siti Rahma"),
            course: new_course(TutorId::generate(), CategoryId::generate(), free_first_course),
        };
        harness.course.tutor_id = harness.tutor.id;

        let (tutor, student, course) = (
            harness.tutor.clone(),
            harness.student.clone(),
            harness.course.clone(),
        );
        harness
            .db
            .transaction(|store| -> Result<(), PersistenceError> {
                store.insert_tutor(&tutor)?;
                store.insert_student(&student)?;
                store.insert_course(&course)
            })
            .unwrap();
        harness.add_schedule(course.id, "10:00:00");
        harness
    }

    /// Rebuilds the environment over the same store with an empty cache, as
    /// after a process restart.
    pub fn restart(&mut self) {
        self.cache = Arc::new(MemoryCache::new());
        self.env = BookingEnv::new(
            self.env.config.clone(),
            self.clock.clone(),
            self.notifier.clone(),
            self.cache.clone(),
            self.env.codes.clone(),
            Arc::new(CoordinateGeocoder),
        )
        .unwrap();
        self.scheduler = ReactionScheduler::new();
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.env.now()
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    pub fn set_now(&self, to: DateTime<Utc>) {
        self.clock.set(to);
    }

    pub fn student_actor(&self) -> AuthenticatedActor {
        AuthenticatedActor::new(self.student.user_id, Role::Student)
    }

    pub fn tutor_actor(&self) -> AuthenticatedActor {
        AuthenticatedActor::new(self.tutor.user_id, Role::Tutor)
    }

    pub fn admin_actor() -> AuthenticatedActor {
        AuthenticatedActor::new(UserId::generate(), Role::Admin)
    }

    pub fn add_student(&mut self, name: &str) -> (Student, AuthenticatedActor) {
        let student = new_student(name);
        let stored = student.clone();
        self.db
            .transaction(|store| store.insert_student(&stored))
            .unwrap();
        let actor = AuthenticatedActor::new(student.user_id, Role::Student);
        (student, actor)
    }

    pub fn add_tutor(&mut self, name: &str) -> (Tutor, AuthenticatedActor) {
        let tutor = new_tutor(name);
        let stored = tutor.clone();
        self.db
            .transaction(|store| store.insert_tutor(&stored))
            .unwrap();
        let actor = AuthenticatedActor::new(tutor.user_id, Role::Tutor);
        (tutor, actor)
    }

    /// Adds a course by the harness tutor in `category_id` with a Tuesday
    /// slot at `time`.
    pub fn add_course(
        &mut self,
        category_id: CategoryId,
        free_first_course: bool,
        time: &str,
    ) -> Course {
        let course = new_course(self.tutor.id, category_id, free_first_course);
        let stored = course.clone();
        self.db
            .transaction(|store| store.insert_course(&stored))
            .unwrap();
        self.add_schedule(course.id, time);
        course
    }

    /// Adds a Tuesday WIB slot for any class type.
    pub fn add_schedule(&mut self, course_id: CourseId, time: &str) {
        let schedule = CourseSchedule {
            id: ScheduleId::generate(),
            course_id,
            day_of_week: DayOfWeek::new(2).unwrap(),
            start_time: NaiveTime::parse_from_str(time, "%H:%M:%S").unwrap(),
            timezone: Timezone::Wib,
            class_type: ClassType::All,
        };
        self.db
            .transaction(|store| store.insert_course_schedule(&schedule))
            .unwrap();
    }

    /// An online request for the harness course's Tuesday 10:00 slot.
    pub fn request(&self) -> CreateBookingRequest {
        CreateBookingRequest {
            course_id: self.course.id.to_string(),
            class_type: String::from("online"),
            booking_date: String::from(SESSION_DATE),
            booking_time: String::from(SESSION_TIME),
            timezone: None,
            latitude: None,
            longitude: None,
            notes: Some(String::from("Chapter 3 please")),
        }
    }

    pub fn book(&mut self) -> BookingInfo {
        let actor = self.student_actor();
        let request = self.request();
        self.book_as(&actor, &request)
    }

    pub fn book_as(
        &mut self,
        actor: &AuthenticatedActor,
        request: &CreateBookingRequest,
    ) -> BookingInfo {
        create_booking(&mut self.db, &self.env, actor, request).unwrap()
    }

    pub fn accept(&mut self, booking_id: BookingId) -> RespondBookingResponse {
        let actor = self.tutor_actor();
        accept_booking(
            &mut self.db,
            &self.env,
            &actor,
            &booking_id.to_string(),
            &RespondBookingRequest {
                notes: Some(String::from("See you there")),
            },
        )
        .unwrap()
    }

    pub fn tick(&mut self) -> SweepReport {
        self.scheduler.run_tick(&mut self.db, &self.env)
    }

    pub fn review_for(&mut self, booking_id: BookingId) -> TutorReview {
        self.db
            .read(|store| store.find_review_by_booking(booking_id))
            .unwrap()
            .unwrap()
    }

    /// Books and accepts the harness slot, then runs a tick two hours after
    /// the session started so its review opens.
    pub fn reviewed_session(&mut self) -> (BookingInfo, TutorReview) {
        let booking = self.book();
        self.accept(booking.id);
        self.set_now(session_start() + Duration::hours(2));
        self.tick();
        let review = self.review_for(booking.id);
        (booking, review)
    }

    pub fn level_point(&mut self) -> i64 {
        let tutor_id = self.tutor.id;
        self.db
            .read(|store| store.find_tutor(tutor_id))
            .unwrap()
            .unwrap()
            .level_point
    }
}

pub fn new_tutor(name: &str) -> Tutor {
    Tutor {
        id: TutorId::generate(),
        user_id: UserId::generate(),
        name: name.to_string(),
        response_time: Some(String::from("1h")),
        level_point: 0,
        deleted_at: None,
    }
}

pub fn new_student(name: &str) -> Student {
    Student {
        id: StudentId::generate(),
        user_id: UserId::generate(),
        name: name.to_string(),
        deleted_at: None,
    }
}

pub fn new_course(tutor_id: TutorId, category_id: CategoryId, free_first_course: bool) -> Course {
    Course {
        id: CourseId::generate(),
        tutor_id,
        category_id,
        title: String::from("Calculus I"),
        is_published: true,
        is_free_first_course: free_first_course,
        class_type: ClassType::All,
        price: Money::from_minor(PRICE_MINOR),
        deleted_at: None,
    }
}
