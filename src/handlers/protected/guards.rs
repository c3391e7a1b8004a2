// handlers/protected/guards.rs - Guard roster queries (any authenticated member)

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::app::AppState;
use crate::database::ProcedureResult;
use crate::error::ApiError;
use crate::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct GuardsByDateRequest {
    /// `YYYY-MM-DD`
    pub miqaat_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct GuardCheckRequest {
    pub its_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct GuardsWithDutyRequest {
    pub miqaat_id: i32,
    pub duty_id: i32,
    pub team_id: i32,
}

/// POST /Guards/GetAcceptedGuardsByMiqaatDate
pub async fn accepted_guards_by_miqaat_date(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<GuardsByDateRequest>, JsonRejection>,
) -> Result<Json<ProcedureResult>, ApiError> {
    let Json(request) = payload?;
    tracing::info!(
        "Accepted guards by miqaat date requested by user {:?} for date: {}",
        user.its_id(),
        request.miqaat_date
    );

    let result = state.guards.accepted_by_miqaat_date(request.miqaat_date).await?;
    Ok(Json(result))
}

/// POST /Guards/GuardCheck
pub async fn guard_check(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<GuardCheckRequest>, JsonRejection>,
) -> Result<Json<ProcedureResult>, ApiError> {
    let Json(request) = payload?;
    tracing::info!(
        "Guard check requested by user {:?} for its_id: {}",
        user.its_id(),
        request.its_id
    );

    let result = state.guards.guard_check(request.its_id).await?;
    Ok(Json(result))
}

/// POST /Guards/GetAllGuardsWithDuty
pub async fn all_guards_with_duty(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<GuardsWithDutyRequest>, JsonRejection>,
) -> Result<Json<ProcedureResult>, ApiError> {
    let Json(request) = payload?;
    tracing::info!(
        "Guards with duty requested by user {:?} for miqaat {}, duty {}, team {}",
        user.its_id(),
        request.miqaat_id,
        request.duty_id,
        request.team_id
    );

    let result = state
        .guards
        .all_with_duty(request.miqaat_id, request.duty_id, request.team_id)
        .await?;
    Ok(Json(result))
}
