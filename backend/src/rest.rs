//! REST layer: axum handlers mapping the public DTOs in `shared` to the
//! domain command types, plus the status-code mapping for the domain
//! error taxonomy. Store failures never propagate past the initiating
//! handler; they are logged, reported through the notifier, and answered
//! with a retryable error status.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::domain::auth::{AuthProvider, CurrentUser};
use crate::domain::billing_service::BillingService;
use crate::domain::commands::billing::{MonthLedgerQuery, StudentSessionTotalQuery};
use crate::domain::commands::ledger::{AddWeekCommand, UpdateRecordCommand};
use crate::domain::commands::rates::{ClearRateCommand, GetRateQuery, SetRateCommand};
use crate::domain::commands::sessions::{
    DeleteSessionCommand, MonthSessionsQuery, ScheduleSessionCommand, ScheduleSlotCommand,
    WeekSessionsQuery,
};
use crate::domain::commands::students::{
    CreateStudentCommand, DeleteStudentCommand, ListStudentsQuery,
};
use crate::domain::errors::DomainError;
use crate::domain::group;
use crate::domain::ledger_service::LedgerService;
use crate::domain::models::rate::StudentRate as DomainStudentRate;
use crate::domain::models::session::{
    ClassSession as DomainClassSession, SessionKind as DomainSessionKind,
};
use crate::domain::models::student::Student as DomainStudent;
use crate::domain::models::weekly_record::WeeklyRecord as DomainWeeklyRecord;
use crate::domain::month_calendar;
use crate::domain::notifier::Notifier;
use crate::domain::rate_service::RateService;
use crate::domain::session_service::SessionService;
use crate::domain::student_service::StudentService;
use crate::domain::time_grid;
use crate::domain::week_cursor::{self, WeekCursor};
use crate::storage::csv::CsvConnection;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub student_service: StudentService<CsvConnection>,
    pub session_service: SessionService<CsvConnection>,
    pub ledger_service: LedgerService<CsvConnection>,
    pub billing_service: BillingService<CsvConnection>,
    pub rate_service: RateService<CsvConnection>,
    pub week_cursor: WeekCursor,
    pub auth: Arc<dyn AuthProvider>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(
        connection: Arc<CsvConnection>,
        auth: Arc<dyn AuthProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            student_service: StudentService::new(connection.clone()),
            session_service: SessionService::new(connection.clone()),
            ledger_service: LedgerService::new(connection.clone()),
            billing_service: BillingService::new(connection.clone()),
            rate_service: RateService::new(connection),
            week_cursor: WeekCursor::new(),
            auth,
            notifier,
        }
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/me", get(get_current_user))
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/sign-out", post(sign_out))
        .route("/students", get(list_students).post(create_student))
        .route("/students/:id", delete(delete_student))
        .route(
            "/students/:id/rate",
            get(get_student_rate)
                .put(set_student_rate)
                .delete(clear_student_rate),
        )
        .route("/sessions", post(schedule_session))
        .route("/sessions/slot", post(schedule_slot_session))
        .route("/sessions/:id", delete(delete_session))
        .route("/sessions/week", get(get_week_sessions))
        .route("/grid/week", get(get_week_grid))
        .route("/calendar/:year/:month", get(get_month_calendar))
        .route("/ledger/weeks", post(add_ledger_week))
        .route("/ledger/records/:id", patch(update_ledger_record))
        .route("/ledger/:year/:month", get(get_month_ledger))
        .route("/ledger/:year/:month/weeks", get(get_month_weeks))
        .route("/billing/students/:id", get(get_student_session_total))
        .route("/cursor", get(get_cursor))
        .route("/cursor/advance", post(advance_cursor))
        .route("/cursor/retreat", post(retreat_cursor))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// DTO mapping

fn student_to_dto(student: DomainStudent) -> shared::Student {
    shared::Student {
        id: student.id,
        name: student.name,
        owner_id: student.owner_id,
        created_at: student.created_at.to_rfc3339(),
        updated_at: student.updated_at.to_rfc3339(),
    }
}

fn kind_to_dto(kind: DomainSessionKind) -> shared::SessionKind {
    match kind {
        DomainSessionKind::Individual => shared::SessionKind::Individual,
        DomainSessionKind::Group => shared::SessionKind::Group,
    }
}

fn kind_from_dto(kind: shared::SessionKind) -> DomainSessionKind {
    match kind {
        shared::SessionKind::Individual => DomainSessionKind::Individual,
        shared::SessionKind::Group => DomainSessionKind::Group,
    }
}

fn session_to_dto(session: DomainClassSession) -> shared::ClassSession {
    shared::ClassSession {
        id: session.id,
        participant_ref: group::encode(&session.participants),
        date: session.date.format(DATETIME_FORMAT).to_string(),
        duration_hours: session.duration_hours,
        kind: kind_to_dto(session.kind),
        rate: session.rate,
        notes: session.notes,
        owner_id: session.owner_id,
    }
}

fn record_to_dto(record: DomainWeeklyRecord) -> shared::WeeklyRecord {
    shared::WeeklyRecord {
        id: record.id,
        student_id: record.student_id,
        owner_id: record.owner_id,
        week_number: record.week_number,
        month: record.month,
        year: record.year,
        individual_hours: record.individual_hours,
        group_hours: record.group_hours,
        individual_rate: record.individual_rate,
        group_rate: record.group_rate,
    }
}

fn rate_to_dto(rate: DomainStudentRate) -> shared::StudentRate {
    shared::StudentRate {
        student_id: rate.student_id,
        individual_rate: rate.individual_rate,
        group_rate: rate.group_rate,
    }
}

// ---------------------------------------------------------------------------
// Error mapping

/// Convert a service error into a response, logging it and pushing a
/// user-visible notification. The failed operation left local state
/// untouched, so every error here is retryable.
fn error_response(state: &AppState, context: &str, err: anyhow::Error) -> Response {
    error!("{}: {:?}", context, err);

    let (status, message) = match err.downcast_ref::<DomainError>() {
        Some(DomainError::NotAuthenticated) => {
            (StatusCode::UNAUTHORIZED, "Not authenticated".to_string())
        }
        Some(DomainError::NotFound { .. }) => (StatusCode::NOT_FOUND, err.to_string()),
        Some(DomainError::SlotOccupied { .. }) => (StatusCode::CONFLICT, err.to_string()),
        Some(DomainError::StoreFailure(_)) | None => {
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    };

    state.notifier.error(&message);
    (status, message).into_response()
}

/// Resolve the signed-in user or answer 401. All owner-scoped routes go
/// through this.
fn require_user(state: &AppState) -> Result<CurrentUser, Response> {
    match state.auth.current_user() {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err((StatusCode::UNAUTHORIZED, "Not authenticated").into_response()),
        Err(err) => {
            error!("Auth provider failure: {:?}", err);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Auth provider failure").into_response())
        }
    }
}

// ---------------------------------------------------------------------------
// Auth handlers

pub async fn get_current_user(State(state): State<AppState>) -> impl IntoResponse {
    match state.auth.current_user() {
        Ok(user) => (
            StatusCode::OK,
            Json(shared::CurrentUserResponse {
                user: user.map(|u| shared::UserInfo {
                    id: u.id,
                    display_name: u.display_name,
                }),
            }),
        )
            .into_response(),
        Err(err) => error_response(&state, "Error reading current user", err),
    }
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<shared::SignInRequest>,
) -> impl IntoResponse {
    info!("POST /auth/sign-in - user: {}", request.user_id);

    let user = CurrentUser {
        id: request.user_id,
        display_name: request.display_name,
    };
    match state.auth.sign_in(user.clone()) {
        Ok(()) => (
            StatusCode::OK,
            Json(shared::CurrentUserResponse {
                user: Some(shared::UserInfo {
                    id: user.id,
                    display_name: user.display_name,
                }),
            }),
        )
            .into_response(),
        Err(err) => error_response(&state, "Error signing in", err),
    }
}

pub async fn sign_out(State(state): State<AppState>) -> impl IntoResponse {
    match state.auth.logout() {
        Ok(()) => (
            StatusCode::OK,
            Json(shared::SignOutResponse {
                success_message: "Signed out".to_string(),
            }),
        )
            .into_response(),
        Err(err) => error_response(&state, "Error signing out", err),
    }
}

// ---------------------------------------------------------------------------
// Student handlers

pub async fn list_students(State(state): State<AppState>) -> impl IntoResponse {
    let user = match require_user(&state) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state
        .student_service
        .list_students(ListStudentsQuery { owner_id: user.id })
    {
        Ok(result) => (
            StatusCode::OK,
            Json(shared::StudentListResponse {
                students: result.students.into_iter().map(student_to_dto).collect(),
            }),
        )
            .into_response(),
        Err(err) => error_response(&state, "Error listing students", err),
    }
}

pub async fn create_student(
    State(state): State<AppState>,
    Json(request): Json<shared::CreateStudentRequest>,
) -> impl IntoResponse {
    info!("POST /students - name: {}", request.name);
    let user = match require_user(&state) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.student_service.create_student(CreateStudentCommand {
        owner_id: user.id,
        name: request.name,
    }) {
        Ok(result) => {
            let message = format!("Student '{}' created", result.student.name);
            state.notifier.success(&message);
            (
                StatusCode::CREATED,
                Json(shared::StudentResponse {
                    student: student_to_dto(result.student),
                    success_message: message,
                }),
            )
                .into_response()
        }
        Err(err) => error_response(&state, "Error creating student", err),
    }
}

pub async fn delete_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /students/{}", student_id);
    let user = match require_user(&state) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.student_service.delete_student(DeleteStudentCommand {
        owner_id: user.id,
        student_id,
    }) {
        Ok(result) => {
            state.notifier.success(&result.success_message);
            (
                StatusCode::OK,
                Json(shared::DeleteStudentResponse {
                    success_message: result.success_message,
                    removed_sessions: result.removed_sessions,
                    removed_records: result.removed_records,
                }),
            )
                .into_response()
        }
        Err(err) => error_response(&state, "Error deleting student", err),
    }
}

// ---------------------------------------------------------------------------
// Rate handlers

pub async fn get_student_rate(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> impl IntoResponse {
    let user = match require_user(&state) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.rate_service.get_rate(GetRateQuery {
        owner_id: user.id,
        student_id,
    }) {
        Ok(result) => (
            StatusCode::OK,
            Json(shared::StudentRateResponse {
                rate: result.rate.map(rate_to_dto),
                success_message: String::new(),
            }),
        )
            .into_response(),
        Err(err) => error_response(&state, "Error reading rate", err),
    }
}

pub async fn set_student_rate(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Json(request): Json<shared::SetStudentRateRequest>,
) -> impl IntoResponse {
    info!("PUT /students/{}/rate", student_id);
    let user = match require_user(&state) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.rate_service.set_rate(SetRateCommand {
        owner_id: user.id,
        student_id,
        individual_rate: request.individual_rate,
        group_rate: request.group_rate,
    }) {
        Ok(result) => {
            state.notifier.success(&result.success_message);
            (
                StatusCode::OK,
                Json(shared::StudentRateResponse {
                    rate: Some(rate_to_dto(result.rate)),
                    success_message: result.success_message,
                }),
            )
                .into_response()
        }
        Err(err) => error_response(&state, "Error setting rate", err),
    }
}

pub async fn clear_student_rate(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> impl IntoResponse {
    let user = match require_user(&state) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.rate_service.clear_rate(ClearRateCommand {
        owner_id: user.id,
        student_id,
    }) {
        Ok(result) => (
            StatusCode::OK,
            Json(shared::StudentRateResponse {
                rate: None,
                success_message: result.success_message,
            }),
        )
            .into_response(),
        Err(err) => error_response(&state, "Error clearing rate", err),
    }
}

// ---------------------------------------------------------------------------
// Session handlers

pub async fn schedule_session(
    State(state): State<AppState>,
    Json(request): Json<shared::ScheduleSessionRequest>,
) -> impl IntoResponse {
    info!("POST /sessions - date: {}", request.date);
    let user = match require_user(&state) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let date = match NaiveDateTime::parse_from_str(&request.date, DATETIME_FORMAT) {
        Ok(date) => date,
        Err(_) => {
            return (StatusCode::BAD_REQUEST, "Invalid date format").into_response();
        }
    };

    match state
        .session_service
        .schedule_session(ScheduleSessionCommand {
            owner_id: user.id,
            date,
            participant_ids: request.participant_ids,
            duration_hours: request.duration_hours,
            kind: kind_from_dto(request.kind),
            rate: request.rate,
            notes: request.notes,
        }) {
        Ok(result) => {
            state.notifier.success(&result.success_message);
            (
                StatusCode::CREATED,
                Json(shared::SessionResponse {
                    session: session_to_dto(result.session),
                    success_message: result.success_message,
                }),
            )
                .into_response()
        }
        Err(err) => error_response(&state, "Error scheduling session", err),
    }
}

pub async fn schedule_slot_session(
    State(state): State<AppState>,
    Json(request): Json<shared::ScheduleSlotSessionRequest>,
) -> impl IntoResponse {
    info!(
        "POST /sessions/slot - week: {} day: {} hour: {}",
        request.week_start, request.day_index, request.hour
    );
    let user = match require_user(&state) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let week_start = match NaiveDate::parse_from_str(&request.week_start, DATE_FORMAT) {
        Ok(date) => week_cursor::start_of_week(date),
        Err(_) => {
            return (StatusCode::BAD_REQUEST, "Invalid week start").into_response();
        }
    };

    match state
        .session_service
        .schedule_slot_session(ScheduleSlotCommand {
            owner_id: user.id,
            week_start,
            day_index: request.day_index,
            hour: request.hour,
            participant_ids: request.participant_ids,
            duration_hours: request.duration_hours,
            kind: kind_from_dto(request.kind),
            rate: request.rate,
            notes: request.notes,
        }) {
        Ok(result) => {
            state.notifier.success(&result.success_message);
            (
                StatusCode::CREATED,
                Json(shared::SessionResponse {
                    session: session_to_dto(result.session),
                    success_message: result.success_message,
                }),
            )
                .into_response()
        }
        Err(err) => error_response(&state, "Error scheduling session", err),
    }
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /sessions/{}", session_id);
    let user = match require_user(&state) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.session_service.delete_session(DeleteSessionCommand {
        owner_id: user.id,
        session_id,
    }) {
        Ok(result) => {
            state.notifier.success(&result.success_message);
            (
                StatusCode::OK,
                Json(shared::DeleteSessionResponse {
                    success_message: result.success_message,
                }),
            )
                .into_response()
        }
        Err(err) => error_response(&state, "Error deleting session", err),
    }
}

/// Query parameters for week-scoped session endpoints
#[derive(Deserialize, Debug)]
pub struct WeekQuery {
    /// A day of the requested week; defaults to the cursor's selection
    pub start: Option<String>,
}

fn resolve_week_start(state: &AppState, query: &WeekQuery) -> Result<NaiveDate, Response> {
    match &query.start {
        Some(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(week_cursor::start_of_week)
            .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid start date").into_response()),
        None => Ok(state.week_cursor.week_start()),
    }
}

pub async fn get_week_sessions(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> impl IntoResponse {
    let user = match require_user(&state) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let week_start = match resolve_week_start(&state, &query) {
        Ok(week_start) => week_start,
        Err(response) => return response,
    };

    match state.session_service.list_week_sessions(WeekSessionsQuery {
        owner_id: user.id,
        week_start,
    }) {
        Ok(result) => (
            StatusCode::OK,
            Json(shared::WeekSessionsResponse {
                week_start: week_start.format(DATE_FORMAT).to_string(),
                week_end: (week_start + chrono::Duration::days(6))
                    .format(DATE_FORMAT)
                    .to_string(),
                sessions: result.sessions.into_iter().map(session_to_dto).collect(),
            }),
        )
            .into_response(),
        Err(err) => error_response(&state, "Error listing week sessions", err),
    }
}

/// The weekly grid with geometry and resolved participant names
pub async fn get_week_grid(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> impl IntoResponse {
    let user = match require_user(&state) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let week_start = match resolve_week_start(&state, &query) {
        Ok(week_start) => week_start,
        Err(response) => return response,
    };

    let sessions = match state.session_service.list_week_sessions(WeekSessionsQuery {
        owner_id: user.id.clone(),
        week_start,
    }) {
        Ok(result) => result.sessions,
        Err(err) => return error_response(&state, "Error listing week sessions", err),
    };
    let students = match state
        .student_service
        .list_students(ListStudentsQuery { owner_id: user.id })
    {
        Ok(result) => result.students,
        Err(err) => return error_response(&state, "Error listing students", err),
    };

    let positioned: Vec<shared::PositionedSession> = sessions
        .into_iter()
        .map(|session| {
            let day_index = (session.date.date() - week_start).num_days().max(0) as u32;
            let cell = time_grid::cell_for(
                session.date.date(),
                session.date.hour(),
                session.date.minute(),
            );
            let rect = time_grid::geometry_for(&session, day_index);
            let participant_ref = group::encode(&session.participants);
            shared::PositionedSession {
                participant_names: group::resolve_names(&participant_ref, &students),
                session: session_to_dto(session),
                cell,
                rect,
            }
        })
        .collect();

    (
        StatusCode::OK,
        Json(shared::WeekGridResponse {
            week_start: week_start.format(DATE_FORMAT).to_string(),
            week_end: (week_start + chrono::Duration::days(6))
                .format(DATE_FORMAT)
                .to_string(),
            sessions: positioned,
        }),
    )
        .into_response()
}

pub async fn get_month_calendar(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> impl IntoResponse {
    let user = match require_user(&state) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state
        .session_service
        .list_month_sessions(MonthSessionsQuery {
            owner_id: user.id,
            month,
            year,
        }) {
        Ok(result) => {
            let sessions = result.sessions.into_iter().map(session_to_dto).collect();
            let calendar = month_calendar::generate_month(month, year, sessions);
            (StatusCode::OK, Json(calendar)).into_response()
        }
        Err(err) => error_response(&state, "Error building month calendar", err),
    }
}

// ---------------------------------------------------------------------------
// Ledger and billing handlers

pub async fn add_ledger_week(
    State(state): State<AppState>,
    Json(request): Json<shared::AddWeekRequest>,
) -> impl IntoResponse {
    info!("POST /ledger/weeks - {}/{}", request.month, request.year);
    let user = match require_user(&state) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.ledger_service.add_week(AddWeekCommand {
        owner_id: user.id,
        month: request.month,
        year: request.year,
    }) {
        Ok(result) => {
            state.notifier.success(&result.success_message);
            (
                StatusCode::CREATED,
                Json(shared::AddWeekResponse {
                    records: result.records.into_iter().map(record_to_dto).collect(),
                    week_number: result.week_number,
                    success_message: result.success_message,
                }),
            )
                .into_response()
        }
        Err(err) => error_response(&state, "Error adding ledger week", err),
    }
}

pub async fn update_ledger_record(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
    Json(request): Json<shared::UpdateWeeklyRecordRequest>,
) -> impl IntoResponse {
    info!("PATCH /ledger/records/{}", record_id);
    let user = match require_user(&state) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.ledger_service.update_record(UpdateRecordCommand {
        owner_id: user.id,
        record_id,
        individual_hours: request.individual_hours,
        group_hours: request.group_hours,
        individual_rate: request.individual_rate,
        group_rate: request.group_rate,
    }) {
        Ok(result) => {
            state.notifier.success(&result.success_message);
            (
                StatusCode::OK,
                Json(shared::WeeklyRecordResponse {
                    record: record_to_dto(result.record),
                    success_message: result.success_message,
                }),
            )
                .into_response()
        }
        Err(err) => error_response(&state, "Error updating ledger record", err),
    }
}

pub async fn get_month_ledger(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> impl IntoResponse {
    let user = match require_user(&state) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.billing_service.month_ledger(MonthLedgerQuery {
        owner_id: user.id,
        month,
        year,
    }) {
        Ok(result) => (
            StatusCode::OK,
            Json(shared::MonthLedgerResponse {
                month,
                year,
                records: result.records.into_iter().map(record_to_dto).collect(),
                record_totals: result
                    .record_totals
                    .into_iter()
                    .map(|t| shared::RecordTotal {
                        record_id: t.record_id,
                        formatted_total: shared::format_currency(t.total),
                        total: t.total,
                    })
                    .collect(),
                student_totals: result
                    .student_totals
                    .into_iter()
                    .map(|t| shared::StudentMonthTotal {
                        student_id: t.student_id,
                        student_name: t.student_name,
                        formatted_total: shared::format_currency(t.total),
                        total: t.total,
                    })
                    .collect(),
                formatted_grand_total: shared::format_currency(result.grand_total),
                grand_total: result.grand_total,
            }),
        )
            .into_response(),
        Err(err) => error_response(&state, "Error building month ledger", err),
    }
}

pub async fn get_month_weeks(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> impl IntoResponse {
    let user = match require_user(&state) {
        Ok(user) => user,
        Err(response) => return response,
    };

    // Calendar week numbers spanned by the month, plus the next free
    // ledger ordinal derived from the existing rows
    let week_numbers = week_cursor::month_to_weeks(year, month);
    match state
        .ledger_service
        .existing_week_numbers(&user.id, month, year)
    {
        Ok(existing) => (
            StatusCode::OK,
            Json(shared::MonthWeeksResponse {
                year,
                month,
                week_numbers,
                next_week_number: week_cursor::next_week_number(&existing),
            }),
        )
            .into_response(),
        Err(err) => error_response(&state, "Error listing month weeks", err),
    }
}

/// Query parameters for the session-ledger total endpoint
#[derive(Deserialize, Debug)]
pub struct SessionTotalQuery {
    pub year: i32,
    pub month: u32,
    /// Optional filter: "individual" or "group"
    pub kind: Option<String>,
}

pub async fn get_student_session_total(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Query(query): Query<SessionTotalQuery>,
) -> impl IntoResponse {
    let user = match require_user(&state) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let kind = match query.kind.as_deref() {
        Some("individual") => Some(DomainSessionKind::Individual),
        Some("group") => Some(DomainSessionKind::Group),
        Some(_) => {
            return (StatusCode::BAD_REQUEST, "Unknown session kind").into_response();
        }
        None => None,
    };

    match state
        .billing_service
        .student_session_total(StudentSessionTotalQuery {
            owner_id: user.id,
            student_id: student_id.clone(),
            month: query.month,
            year: query.year,
            kind,
        }) {
        Ok(result) => (
            StatusCode::OK,
            Json(shared::StudentSessionTotalResponse {
                student_id,
                month: query.month,
                year: query.year,
                formatted_total: shared::format_currency(result.total),
                total: result.total,
            }),
        )
            .into_response(),
        Err(err) => error_response(&state, "Error computing session total", err),
    }
}

// ---------------------------------------------------------------------------
// Week cursor handlers

fn cursor_response(state: &AppState) -> shared::WeekCursorResponse {
    shared::WeekCursorResponse {
        reference_date: state
            .week_cursor
            .reference()
            .format(DATETIME_FORMAT)
            .to_string(),
        week_start: state
            .week_cursor
            .week_start()
            .format(DATE_FORMAT)
            .to_string(),
        week_end: state.week_cursor.week_end().format(DATE_FORMAT).to_string(),
    }
}

pub async fn get_cursor(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(cursor_response(&state))).into_response()
}

pub async fn advance_cursor(State(state): State<AppState>) -> impl IntoResponse {
    state.week_cursor.advance();
    (StatusCode::OK, Json(cursor_response(&state))).into_response()
}

pub async fn retreat_cursor(State(state): State<AppState>) -> impl IntoResponse {
    state.week_cursor.retreat();
    (StatusCode::OK, Json(cursor_response(&state))).into_response()
}
