// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod ticker;

use axum::{
    Json, Router,
    extract::{Path, State as AxumState},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info};
use tutor_booking::{
    BookingConfig, CoordinateGeocoder, MemoryCache, RandomCodeGenerator, SystemClock,
    TracingNotifier,
};
use tutor_booking_api::{
    ApiError, AuthenticatedActor, BalanceResponse, BookingEnv, BookingHistoryResponse,
    BookingInfo, CreateBookingRequest, CreateReportRequest, CreateWithdrawalRequest,
    DecideWithdrawalRequest, DeleteBookingResponse, ListBookingsResponse,
    ListNotificationsResponse, ListWithdrawalsResponse, NotificationResponse,
    ReactionScheduler, ReportResponse, ResolveReportRequest, RespondBookingRequest,
    RespondBookingResponse, ReviewResponse, SubmitReviewRequest, WithdrawalResponse,
    accept_booking, approve_withdrawal, authenticate, create_booking, create_report,
    decline_booking, delete_booking, get_balance, get_booking, get_review, list_booking_history,
    list_notifications, list_student_bookings, list_tutor_bookings, list_withdrawals,
    mark_notification_read, reject_withdrawal, request_withdrawal, resolve_report, submit_review,
    verify_tutor_ledger,
};
use tutor_booking_domain::{CommissionRate, ErrorKind, LedgerCheck};
use tutor_booking_persistence::Persistence;

/// Header carrying the caller's user id, asserted by the gateway.
const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header carrying the caller's role: `student`, `tutor` or `admin`.
const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Tutor Booking Server - HTTP server for the tutor booking lifecycle
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Seconds between reaction ticks
    #[arg(long, default_value_t = 60)]
    tick_seconds: u64,

    /// How long a request may wait for the store before failing as busy
    #[arg(long, default_value_t = 5_000)]
    request_timeout_ms: u64,

    /// Hours a tutor has to respond to a booking
    #[arg(long)]
    expired_hours: Option<u32>,

    /// Platform commission in basis points (1000 = 10%)
    #[arg(long)]
    commission_bps: Option<u32>,

    /// Free-first-course bookings per student, category and day
    #[arg(long)]
    max_free_first_course: Option<u32>,

    /// Cap on bookings a student may create per day
    #[arg(long)]
    max_booking_per_day: Option<u32>,

    /// Cap on a student's live bookings within one category
    #[arg(long)]
    max_booking_per_category: Option<u32>,
}

impl Args {
    /// Applies the command-line overrides to the default policy.
    fn booking_config(&self) -> Result<BookingConfig, Box<dyn std::error::Error>> {
        let mut config = BookingConfig::default();
        if let Some(hours) = self.expired_hours {
            config.expired_duration = chrono::Duration::hours(i64::from(hours));
        }
        if let Some(bps) = self.commission_bps {
            config.commission_rate = CommissionRate::from_bps(bps)?;
        }
        if let Some(limit) = self.max_free_first_course {
            config.max_booking_free_first_course = limit;
        }
        config.max_booking_per_day = self.max_booking_per_day;
        config.max_booking_per_category = self.max_booking_per_category;
        Ok(config)
    }
}

/// Application state shared across handlers and the ticker.
///
/// Every store access goes through the async mutex, so handlers and
/// reaction jobs never interleave inside one transaction.
#[derive(Clone)]
struct AppState {
    persistence: Arc<Mutex<Persistence>>,
    env: Arc<BookingEnv>,
    scheduler: Arc<ReactionScheduler>,
    /// Upper bound on waiting for the store lock.
    request_timeout: Duration,
}

/// Error response type.
#[derive(Debug, Clone, Serialize)]
struct ErrorResponse {
    /// Stable error kind, e.g. `StudentAlreadyHasAnotherSchedule`.
    error: ErrorKind,
    message: String,
    /// The booking an admission rejection refers to, with its effective
    /// status.
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<BookingInfo>,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    body: ErrorResponse,
}

impl HttpError {
    fn busy() -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: ErrorResponse {
                error: ErrorKind::Internal,
                message: String::from("store busy, try again"),
                payload: None,
            },
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Maps an API error onto its HTTP status.
const fn status_for(err: &ApiError) -> StatusCode {
    if err.is_transient() {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    match err.kind() {
        ErrorKind::BadRequest
        | ErrorKind::StudentAlreadyHasAnotherSchedule
        | ErrorKind::MaxBookingFreeFirstCourse
        | ErrorKind::MaxBookingPerDay
        | ErrorKind::MaxBookingPerCategory
        | ErrorKind::InsufficientBalance => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::BookingAlreadyExists | ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status = status_for(&err);
        if status.is_server_error() {
            error!(error = %err, "Request failed");
        }
        Self {
            status,
            body: ErrorResponse {
                error: err.kind(),
                message: err.to_string(),
                payload: err.payload().cloned(),
            },
        }
    }
}

/// Builds the acting identity from the gateway headers.
fn actor_from_headers(headers: &HeaderMap) -> Result<AuthenticatedActor, HttpError> {
    let header = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());
    authenticate(header(ACTOR_ID_HEADER), header(ACTOR_ROLE_HEADER))
        .map_err(|err| HttpError::from(ApiError::from(err)))
}

/// Authenticates the caller, takes the store lock and runs `operation`.
async fn with_store<T, F>(
    app_state: &AppState,
    headers: &HeaderMap,
    operation: F,
) -> Result<T, HttpError>
where
    F: FnOnce(&mut Persistence, &BookingEnv, &AuthenticatedActor) -> Result<T, ApiError> + Send,
{
    let actor = actor_from_headers(headers)?;
    let mut persistence = tokio::time::timeout(
        app_state.request_timeout,
        app_state.persistence.lock(),
    )
    .await
    .map_err(|_| HttpError::busy())?;
    let result = operation(&mut *persistence, &app_state.env, &actor);
    drop(persistence);
    Ok(result?)
}

/// Handler for POST `/bookings` endpoint.
async fn handle_create_booking(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingInfo>), HttpError> {
    info!(course_id = %req.course_id, "Handling create_booking request");
    let booking = with_store(&app_state, &headers, |store, env, actor| {
        create_booking(store, env, actor, &req)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Handler for GET `/bookings/{id}` endpoint.
async fn handle_get_booking(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(booking_id): Path<String>,
) -> Result<Json<BookingInfo>, HttpError> {
    with_store(&app_state, &headers, |store, env, actor| {
        get_booking(store, env, actor, &booking_id)
    })
    .await
    .map(Json)
}

/// Handler for DELETE `/bookings/{id}` endpoint.
async fn handle_delete_booking(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(booking_id): Path<String>,
) -> Result<Json<DeleteBookingResponse>, HttpError> {
    info!(booking_id = %booking_id, "Handling delete_booking request");
    with_store(&app_state, &headers, |store, env, actor| {
        delete_booking(store, env, actor, &booking_id)
    })
    .await
    .map(Json)
}

/// Handler for GET `/bookings/{id}/history` endpoint.
async fn handle_booking_history(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(booking_id): Path<String>,
) -> Result<Json<BookingHistoryResponse>, HttpError> {
    with_store(&app_state, &headers, |store, _, actor| {
        list_booking_history(store, actor, &booking_id)
    })
    .await
    .map(Json)
}

/// Handler for POST `/bookings/{id}/accept` endpoint.
async fn handle_accept_booking(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(booking_id): Path<String>,
    Json(req): Json<RespondBookingRequest>,
) -> Result<Json<RespondBookingResponse>, HttpError> {
    info!(booking_id = %booking_id, "Handling accept_booking request");
    with_store(&app_state, &headers, |store, env, actor| {
        accept_booking(store, env, actor, &booking_id, &req)
    })
    .await
    .map(Json)
}

/// Handler for POST `/bookings/{id}/decline` endpoint.
async fn handle_decline_booking(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(booking_id): Path<String>,
    Json(req): Json<RespondBookingRequest>,
) -> Result<Json<RespondBookingResponse>, HttpError> {
    info!(booking_id = %booking_id, "Handling decline_booking request");
    with_store(&app_state, &headers, |store, env, actor| {
        decline_booking(store, env, actor, &booking_id, &req)
    })
    .await
    .map(Json)
}

/// Handler for POST `/bookings/{id}/report` endpoint.
async fn handle_create_report(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(booking_id): Path<String>,
    Json(req): Json<CreateReportRequest>,
) -> Result<(StatusCode, Json<ReportResponse>), HttpError> {
    let report = with_store(&app_state, &headers, |store, env, actor| {
        create_report(store, env, actor, &booking_id, &req)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// Handler for POST `/reports/{id}/resolve` endpoint.
async fn handle_resolve_report(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(report_id): Path<String>,
    Json(req): Json<ResolveReportRequest>,
) -> Result<Json<ReportResponse>, HttpError> {
    with_store(&app_state, &headers, |store, env, actor| {
        resolve_report(store, env, actor, &report_id, &req)
    })
    .await
    .map(Json)
}

/// Handler for GET `/students/{id}/bookings` endpoint.
async fn handle_list_student_bookings(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(student_id): Path<String>,
) -> Result<Json<ListBookingsResponse>, HttpError> {
    with_store(&app_state, &headers, |store, env, actor| {
        list_student_bookings(store, env, actor, &student_id)
    })
    .await
    .map(Json)
}

/// Handler for GET `/tutors/{id}/bookings` endpoint.
async fn handle_list_tutor_bookings(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(tutor_id): Path<String>,
) -> Result<Json<ListBookingsResponse>, HttpError> {
    with_store(&app_state, &headers, |store, env, actor| {
        list_tutor_bookings(store, env, actor, &tutor_id)
    })
    .await
    .map(Json)
}

/// Handler for GET `/tutors/{id}/balance` endpoint.
async fn handle_get_balance(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(tutor_id): Path<String>,
) -> Result<Json<BalanceResponse>, HttpError> {
    with_store(&app_state, &headers, |store, _, actor| {
        get_balance(store, actor, &tutor_id)
    })
    .await
    .map(Json)
}

/// Handler for GET `/tutors/{id}/ledger/verify` endpoint.
async fn handle_verify_ledger(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(tutor_id): Path<String>,
) -> Result<Json<LedgerCheck>, HttpError> {
    with_store(&app_state, &headers, |store, _, actor| {
        verify_tutor_ledger(store, actor, &tutor_id)
    })
    .await
    .map(Json)
}

/// Handler for GET `/tutors/{id}/withdrawals` endpoint.
async fn handle_list_withdrawals(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(tutor_id): Path<String>,
) -> Result<Json<ListWithdrawalsResponse>, HttpError> {
    with_store(&app_state, &headers, |store, _, actor| {
        list_withdrawals(store, actor, &tutor_id)
    })
    .await
    .map(Json)
}

/// Handler for POST `/tutors/{id}/withdrawals` endpoint.
async fn handle_request_withdrawal(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(tutor_id): Path<String>,
    Json(req): Json<CreateWithdrawalRequest>,
) -> Result<(StatusCode, Json<WithdrawalResponse>), HttpError> {
    info!(tutor_id = %tutor_id, amount = %req.amount, "Handling request_withdrawal request");
    let withdrawal = with_store(&app_state, &headers, |store, env, actor| {
        request_withdrawal(store, env, actor, &tutor_id, &req)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(withdrawal)))
}

/// Handler for POST `/withdrawals/{id}/approve` endpoint.
async fn handle_approve_withdrawal(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(withdrawal_id): Path<String>,
    Json(req): Json<DecideWithdrawalRequest>,
) -> Result<Json<WithdrawalResponse>, HttpError> {
    with_store(&app_state, &headers, |store, env, actor| {
        approve_withdrawal(store, env, actor, &withdrawal_id, &req)
    })
    .await
    .map(Json)
}

/// Handler for POST `/withdrawals/{id}/reject` endpoint.
async fn handle_reject_withdrawal(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(withdrawal_id): Path<String>,
    Json(req): Json<DecideWithdrawalRequest>,
) -> Result<Json<WithdrawalResponse>, HttpError> {
    with_store(&app_state, &headers, |store, env, actor| {
        reject_withdrawal(store, env, actor, &withdrawal_id, &req)
    })
    .await
    .map(Json)
}

/// Handler for GET `/reviews/{id}` endpoint.
async fn handle_get_review(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(review_id): Path<String>,
) -> Result<Json<ReviewResponse>, HttpError> {
    with_store(&app_state, &headers, |store, env, actor| {
        get_review(store, env, actor, &review_id)
    })
    .await
    .map(Json)
}

/// Handler for PUT `/reviews/{id}` endpoint.
async fn handle_submit_review(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(review_id): Path<String>,
    Json(req): Json<SubmitReviewRequest>,
) -> Result<Json<ReviewResponse>, HttpError> {
    with_store(&app_state, &headers, |store, env, actor| {
        submit_review(store, env, actor, &review_id, &req)
    })
    .await
    .map(Json)
}

/// Handler for GET `/users/{id}/notifications` endpoint.
async fn handle_list_notifications(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Json<ListNotificationsResponse>, HttpError> {
    with_store(&app_state, &headers, |store, _, actor| {
        list_notifications(store, actor, &user_id)
    })
    .await
    .map(Json)
}

/// Handler for POST `/notifications/{id}/read` endpoint.
async fn handle_mark_notification_read(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(notification_id): Path<String>,
) -> Result<Json<NotificationResponse>, HttpError> {
    with_store(&app_state, &headers, |store, env, actor| {
        mark_notification_read(store, env, actor, &notification_id)
    })
    .await
    .map(Json)
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/bookings", post(handle_create_booking))
        .route(
            "/bookings/{id}",
            get(handle_get_booking).delete(handle_delete_booking),
        )
        .route("/bookings/{id}/history", get(handle_booking_history))
        .route("/bookings/{id}/accept", post(handle_accept_booking))
        .route("/bookings/{id}/decline", post(handle_decline_booking))
        .route("/bookings/{id}/report", post(handle_create_report))
        .route("/reports/{id}/resolve", post(handle_resolve_report))
        .route("/students/{id}/bookings", get(handle_list_student_bookings))
        .route("/tutors/{id}/bookings", get(handle_list_tutor_bookings))
        .route("/tutors/{id}/balance", get(handle_get_balance))
        .route("/tutors/{id}/ledger/verify", get(handle_verify_ledger))
        .route(
            "/tutors/{id}/withdrawals",
            get(handle_list_withdrawals).post(handle_request_withdrawal),
        )
        .route("/withdrawals/{id}/approve", post(handle_approve_withdrawal))
        .route("/withdrawals/{id}/reject", post(handle_reject_withdrawal))
        .route(
            "/reviews/{id}",
            get(handle_get_review).put(handle_submit_review),
        )
        .route("/users/{id}/notifications", get(handle_list_notifications))
        .route(
            "/notifications/{id}/read",
            post(handle_mark_notification_read),
        )
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Tutor Booking Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let config = args.booking_config()?;
    info!(
        expired_hours = config.expired_duration.num_hours(),
        commission_bps = config.commission_rate.bps(),
        "Booking policy loaded"
    );
    let env = BookingEnv::new(
        config,
        Arc::new(SystemClock),
        Arc::new(TracingNotifier),
        Arc::new(MemoryCache::new()),
        Arc::new(RandomCodeGenerator),
        Arc::new(CoordinateGeocoder),
    )?;

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        env: Arc::new(env),
        scheduler: Arc::new(ReactionScheduler::new()),
        request_timeout: Duration::from_millis(args.request_timeout_ms),
    };

    // Background reaction jobs
    tokio::spawn(ticker::run(
        app_state.clone(),
        Duration::from_secs(args.tick_seconds.max(1)),
    ));

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode as HttpStatusCode},
    };
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use tutor_booking::{ManualClock, RecordingNotifier};
    use tutor_booking_api::Job;
    use tutor_booking_domain::{
        CategoryId, ClassType, Course, CourseId, CourseSchedule, DayOfWeek, Money, ScheduleId,
        Student, StudentId, Timezone, Tutor, TutorId, UserId,
    };
    use tutor_booking_persistence::PersistenceError;

    struct TestApp {
        state: AppState,
        clock: Arc<ManualClock>,
        tutor: Tutor,
        student: Student,
        course: Course,
    }

    /// Helper to create test app state with an in-memory store seeded with
    /// one tutor, one student and one course with a Tuesday 10:00 WIB slot.
    async fn create_test_app() -> TestApp {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 2, 1, 0, 0).unwrap(),
        ));
        let env = BookingEnv::new(
            BookingConfig::default(),
            clock.clone(),
            Arc::new(RecordingNotifier::new()),
            Arc::new(MemoryCache::new()),
            Arc::new(RandomCodeGenerator),
            Arc::new(CoordinateGeocoder),
        )
        .expect("Failed to build booking environment");
        let persistence =
            Persistence::new_in_memory().expect("Failed to create in-memory persistence");
        let state = AppState {
            persistence: Arc::new(Mutex::new(persistence)),
            env: Arc::new(env),
            scheduler: Arc::new(ReactionScheduler::new()),
            request_timeout: Duration::from_millis(500),
        };

        let tutor = Tutor {
            id: TutorId::generate(),
            user_id: UserId::generate(),
            name: String::from("Budi Santoso"),
            response_time: None,
            level_point: 0,
            deleted_at: None,
        };
        let student = Student {
            id: StudentId::generate(),
            user_id: UserId::generate(),
            name: String::from("Siti Rahma"),
            deleted_at: None,
        };
        let course = Course {
            id: CourseId::generate(),
            tutor_id: tutor.id,
            category_id: CategoryId::generate(),
            title: String::from("Physics"),
            is_published: true,
            is_free_first_course: false,
            class_type: ClassType::All,
            price: Money::from_minor(20_000_000),
            deleted_at: None,
        };
        let schedule = CourseSchedule {
            id: ScheduleId::generate(),
            course_id: course.id,
            day_of_week: DayOfWeek::new(2).unwrap(),
            start_time: chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            timezone: Timezone::Wib,
            class_type: ClassType::All,
        };
        state
            .persistence
            .lock()
            .await
            .transaction(|store| -> Result<(), PersistenceError> {
                store.insert_tutor(&tutor)?;
                store.insert_student(&student)?;
                store.insert_course(&course)?;
                store.insert_course_schedule(&schedule)
            })
            .expect("Failed to seed catalog");

        TestApp {
            state,
            clock,
            tutor,
            student,
            course,
        }
    }

    fn booking_body(course_id: CourseId) -> Value {
        json!({
            "courseId": course_id.to_string(),
            "classType": "online",
            "bookingDate": "2026-03-03",
            "bookingTime": "10:00:00",
            "notes": "Kinematics"
        })
    }

    async fn send(
        app: &TestApp,
        method: Method,
        uri: &str,
        actor: Option<(UserId, &str)>,
        body: Option<Value>,
    ) -> (HttpStatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some((user_id, role)) = actor {
            builder = builder
                .header(ACTOR_ID_HEADER, user_id.to_string())
                .header(ACTOR_ROLE_HEADER, role);
        }
        let body = body.map_or_else(Body::empty, |value| Body::from(value.to_string()));
        let response = build_router(app.state.clone())
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_create_booking_returns_created() {
        let app = create_test_app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/bookings",
            Some((app.student.user_id, "student")),
            Some(booking_body(app.course.id)),
        )
        .await;

        assert_eq!(status, HttpStatusCode::CREATED);
        assert_eq!(body["status"], "pending");
        assert_eq!(body["grossAmount"], "200000.00");
        assert!(body["code"].as_str().unwrap().starts_with("BK20260302"));
    }

    #[tokio::test]
    async fn test_missing_actor_headers_are_unauthorized() {
        let app = create_test_app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/bookings",
            None,
            Some(booking_body(app.course.id)),
        )
        .await;

        assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_double_booking_returns_conflicting_payload() {
        let app = create_test_app().await;
        let student = Some((app.student.user_id, "student"));
        let (_, first) = send(
            &app,
            Method::POST,
            "/bookings",
            student,
            Some(booking_body(app.course.id)),
        )
        .await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/bookings",
            student,
            Some(booking_body(app.course.id)),
        )
        .await;

        assert_eq!(status, HttpStatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "StudentAlreadyHasAnotherSchedule");
        assert_eq!(body["payload"]["id"], first["id"]);
        assert_eq!(body["payload"]["status"], "pending");
    }

    #[tokio::test]
    async fn test_accept_then_balance() {
        let app = create_test_app().await;
        let (_, booking) = send(
            &app,
            Method::POST,
            "/bookings",
            Some((app.student.user_id, "student")),
            Some(booking_body(app.course.id)),
        )
        .await;
        let booking_id = booking["id"].as_str().unwrap().to_string();
        let tutor = Some((app.tutor.user_id, "tutor"));

        let (status, accepted) = send(
            &app,
            Method::POST,
            &format!("/bookings/{booking_id}/accept"),
            tutor,
            Some(json!({ "notes": "See you" })),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(accepted["booking"]["status"], "accepted");
        assert_eq!(accepted["credited"], "180000.00");

        let (status, again) = send(
            &app,
            Method::POST,
            &format!("/bookings/{booking_id}/decline"),
            tutor,
            Some(json!({})),
        )
        .await;
        assert_eq!(status, HttpStatusCode::CONFLICT);
        assert_eq!(again["error"], "BookingAlreadyExists");

        let (status, balance) = send(
            &app,
            Method::GET,
            &format!("/tutors/{}/balance", app.tutor.id),
            tutor,
            None,
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(balance["balance"], "180000.00");
        assert_eq!(balance["consistent"], true);
    }

    #[tokio::test]
    async fn test_unknown_booking_is_not_found() {
        let app = create_test_app().await;
        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/bookings/{}", uuid_like()),
            Some((app.student.user_id, "student")),
            None,
        )
        .await;
        assert_eq!(status, HttpStatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NotFound");
    }

    fn uuid_like() -> &'static str {
        "00000000-0000-0000-0000-000000000000"
    }

    #[tokio::test]
    async fn test_students_cannot_delete_bookings() {
        let app = create_test_app().await;
        let (_, booking) = send(
            &app,
            Method::POST,
            "/bookings",
            Some((app.student.user_id, "student")),
            Some(booking_body(app.course.id)),
        )
        .await;
        let uri = format!("/bookings/{}", booking["id"].as_str().unwrap());

        let (status, _) = send(
            &app,
            Method::DELETE,
            &uri,
            Some((app.student.user_id, "student")),
            None,
        )
        .await;
        assert_eq!(status, HttpStatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            Method::DELETE,
            &uri,
            Some((UserId::generate(), "admin")),
            None,
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
    }

    #[tokio::test]
    async fn test_ticker_expires_overdue_bookings() {
        let app = create_test_app().await;
        send(
            &app,
            Method::POST,
            "/bookings",
            Some((app.student.user_id, "student")),
            Some(booking_body(app.course.id)),
        )
        .await;

        app.clock.advance(chrono::Duration::hours(7));
        let report = ticker::tick_once(&app.state).await;
        assert_eq!(report.processed(Job::PendingExpiry), 1);
        assert_eq!(report.total_failed(), 0);

        let (_, listed) = send(
            &app,
            Method::GET,
            &format!("/students/{}/bookings", app.student.id),
            Some((app.student.user_id, "student")),
            None,
        )
        .await;
        assert_eq!(listed["bookings"][0]["status"], "expired");
    }

    #[tokio::test]
    async fn test_busy_store_returns_service_unavailable() {
        let app = create_test_app().await;
        let held = app.state.persistence.lock().await;
        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/tutors/{}/balance", app.tutor.id),
            Some((app.tutor.user_id, "tutor")),
            None,
        )
        .await;
        drop(held);

        assert_eq!(status, HttpStatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Internal");
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_test_app().await;
        let response = build_router(app.state.clone())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::OK);
    }

    #[test]
    fn test_status_mapping() {
        let busy = ApiError::Unavailable {
            message: String::from("database is locked"),
        };
        assert_eq!(status_for(&busy), StatusCode::SERVICE_UNAVAILABLE);

        let conflict = ApiError::Conflict {
            message: String::from("code collision"),
        };
        assert_eq!(status_for(&conflict), StatusCode::CONFLICT);

        let internal = ApiError::Internal {
            message: String::from("storage failure"),
        };
        assert_eq!(status_for(&internal), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_cli_overrides_policy() {
        let args = Args::parse_from([
            "tutor-booking-server",
            "--expired-hours",
            "12",
            "--commission-bps",
            "1500",
            "--max-booking-per-day",
            "3",
        ]);
        let config = args.booking_config().unwrap();
        assert_eq!(config.expired_duration, chrono::Duration::hours(12));
        assert_eq!(config.commission_rate.bps(), 1_500);
        assert_eq!(config.max_booking_per_day, Some(3));
        assert_eq!(config.max_booking_per_category, None);
        assert_eq!(args.port, 3000);
    }
}
