//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    HealthResponse, HelperDto, HelperListResponse, PlannerPath, ShiftListQuery,
    ShiftListResponse, SignUpRequest,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::repository::ShiftFilter;
use crate::db::services as db_services;
use crate::models::*;
use crate::routes::{PlannerDay, ShiftSummary};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Result type for handlers that create a record.
pub type CreatedResult<T> = Result<(StatusCode, Json<T>), AppError>;

fn created<T>(value: T) -> CreatedResult<T> {
    Ok((StatusCode::CREATED, Json(value)))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and database is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Shifts
// =============================================================================

/// GET /v1/shifts
///
/// List shift summaries, optionally narrowed to a facility, a calendar day
/// or shifts that have not ended yet.
pub async fn list_shifts(
    State(state): State<AppState>,
    Query(query): Query<ShiftListQuery>,
) -> HandlerResult<ShiftListResponse> {
    let mut filter = ShiftFilter::all();
    if let Some(facility_id) = query.facility_id {
        filter = filter.facility(facility_id);
    }
    if let Some(date) = query.date {
        filter = filter.on_date(date);
    }
    if query.open {
        filter = filter.open_at(chrono::Local::now().naive_local());
    }

    let shifts =
        db_services::shift_summaries(state.repository.as_ref(), &filter, &state.display).await?;
    let total = shifts.len();

    Ok(Json(ShiftListResponse { shifts, total }))
}

/// POST /v1/shifts
pub async fn create_shift(
    State(state): State<AppState>,
    Json(request): Json<NewShift>,
) -> CreatedResult<Shift> {
    let shift = db_services::create_shift(state.repository.as_ref(), request).await?;
    created(shift)
}

/// GET /v1/shifts/{shift_id}
pub async fn get_shift(
    State(state): State<AppState>,
    Path(shift_id): Path<ShiftId>,
) -> HandlerResult<ShiftSummary> {
    let summary =
        db_services::shift_summary(state.repository.as_ref(), shift_id, &state.display).await?;
    Ok(Json(summary))
}

/// DELETE /v1/shifts/{shift_id}
///
/// Removes the shift together with its sign-ups.
pub async fn delete_shift(
    State(state): State<AppState>,
    Path(shift_id): Path<ShiftId>,
) -> Result<StatusCode, AppError> {
    if db_services::delete_shift(state.repository.as_ref(), shift_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Shift {} not found", shift_id)))
    }
}

// =============================================================================
// Sign-ups
// =============================================================================

/// GET /v1/shifts/{shift_id}/helpers
pub async fn list_helpers(
    State(state): State<AppState>,
    Path(shift_id): Path<ShiftId>,
) -> HandlerResult<HelperListResponse> {
    // Distinguish an unknown shift from one nobody has joined yet.
    state.repository.get_shift(shift_id).await?;

    let helpers: Vec<HelperDto> = db_services::shift_helpers(state.repository.as_ref(), shift_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let total = helpers.len();

    Ok(Json(HelperListResponse { helpers, total }))
}

/// POST /v1/shifts/{shift_id}/helpers
///
/// Sign a volunteer up. A second sign-up for the same shift answers 409
/// with code `ALREADY_JOINED`.
pub async fn sign_up(
    State(state): State<AppState>,
    Path(shift_id): Path<ShiftId>,
    Json(request): Json<SignUpRequest>,
) -> CreatedResult<ShiftHelper> {
    let helper = db_services::sign_up(
        state.repository.as_ref(),
        request.user_account_id,
        shift_id,
    )
    .await
    .map_err(AppError::conflict_on_unique("ALREADY_JOINED"))?;
    created(helper)
}

/// DELETE /v1/shifts/{shift_id}/helpers/{user_account_id}
pub async fn withdraw(
    State(state): State<AppState>,
    Path((shift_id, user_account_id)): Path<(ShiftId, UserAccountId)>,
) -> Result<StatusCode, AppError> {
    if db_services::withdraw(state.repository.as_ref(), user_account_id, shift_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!(
            "User account {} has not joined shift {}",
            user_account_id, shift_id
        )))
    }
}

// =============================================================================
// Organization
// =============================================================================

/// POST /v1/contacts
pub async fn create_contact(
    State(state): State<AppState>,
    Json(request): Json<NewContactPerson>,
) -> CreatedResult<ContactPerson> {
    created(db_services::create_contact(state.repository.as_ref(), request).await?)
}

/// POST /v1/facilities
pub async fn create_facility(
    State(state): State<AppState>,
    Json(request): Json<NewFacility>,
) -> CreatedResult<Facility> {
    created(db_services::create_facility(state.repository.as_ref(), request).await?)
}

/// POST /v1/workplaces
pub async fn create_workplace(
    State(state): State<AppState>,
    Json(request): Json<NewWorkplace>,
) -> CreatedResult<Workplace> {
    created(db_services::create_workplace(state.repository.as_ref(), request).await?)
}

/// POST /v1/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<NewTask>,
) -> CreatedResult<Task> {
    created(db_services::create_task(state.repository.as_ref(), request).await?)
}

/// POST /v1/accounts
///
/// A taken username answers 409 with code `USERNAME_TAKEN`.
pub async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<NewUserAccount>,
) -> CreatedResult<UserAccount> {
    let account = db_services::create_user_account(state.repository.as_ref(), request)
        .await
        .map_err(AppError::conflict_on_unique("USERNAME_TAKEN"))?;
    created(account)
}

// =============================================================================
// Planner
// =============================================================================

/// GET /shifts/{pk}/{year}/{month}/{day}/
///
/// The page a shift's canonical URL points at: every shift of the facility
/// overlapping that day.
pub async fn planner_by_facility(
    State(state): State<AppState>,
    Path(path): Path<PlannerPath>,
) -> HandlerResult<PlannerDay> {
    let date = path.date().ok_or_else(|| {
        AppError::BadRequest(format!(
            "Invalid date {}-{}-{}",
            path.year, path.month, path.day
        ))
    })?;

    let day =
        db_services::planner_day(state.repository.as_ref(), path.pk, date, &state.display).await?;
    Ok(Json(day))
}
