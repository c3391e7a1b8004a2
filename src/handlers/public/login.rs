// handlers/public/login.rs - POST /Login/CheckLogin and POST /Login/RefreshToken

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::net::SocketAddr;

use crate::app::AppState;
use crate::auth::{claims::ITS_ID, TokenPair};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// ITS id of the member
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenPair>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub success: bool,
    pub message: String,
    pub tokens: TokenPair,
}

/// POST /Login/CheckLogin - check credentials and, on success, issue an access/refresh pair
///
/// A rejected login is still `200` with `success: false`; only a broken backend is an error.
///
/// ```json
/// {
///   "success": true,
///   "message": "Login successful",
///   "data": { "its_id": 12345678, "full_name": "...", "is_admin": false },
///   "tokens": { "access_token": "...", "refresh_token": "...", "token_type": "bearer", "expires_in": 3600 }
/// }
/// ```
pub async fn check_login(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;

    let client_ip = connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let outcome = state
        .login
        .check_login(&request.username, &request.password, &client_ip)
        .await?;

    let tokens = match &outcome.data {
        Some(data) if outcome.success && data.get(ITS_ID).is_some_and(|id| !id.is_null()) => {
            Some(state.tokens.issue_pair(data)?)
        }
        _ => None,
    };

    if outcome.success && tokens.is_none() {
        tracing::warn!(
            "Login for {} succeeded without member data; no tokens issued",
            request.username
        );
    }

    Ok(Json(LoginResponse {
        success: outcome.success,
        message: outcome.message,
        data: outcome.data,
        tokens,
    }))
}

/// POST /Login/RefreshToken - trade a refresh token for a new pair
pub async fn refresh_token(
    State(state): State<AppState>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<Json<RefreshTokenResponse>, ApiError> {
    let Json(request) = payload?;
    let tokens = state.tokens.refresh(&request.refresh_token)?;

    Ok(Json(RefreshTokenResponse {
        success: true,
        message: "Token refreshed successfully".to_string(),
        tokens,
    }))
}
