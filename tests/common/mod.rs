#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    middleware::from_fn_with_state,
    routing::get,
    Extension, Json, Router,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Map, Value};
use tower::ServiceExt;

use burhani_guards_api::auth::{CurrentUser, ManualClock, TokenAuthority};
use burhani_guards_api::config::{AppConfig, Environment};
use burhani_guards_api::database::{DatabaseError, FunctionArg, StoredFunctions};
use burhani_guards_api::middleware::{require_permission, PermissionGate};
use burhani_guards_api::{app, AppState};

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const BASE: &str = "/BURHANI_GUARDS_API_TEST/api";

/// Stored-function double: canned results per function name, plus a call log
#[derive(Debug)]
pub struct StubFunctions {
    responses: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<(String, Vec<FunctionArg>)>>,
    healthy: AtomicBool,
}

impl Default for StubFunctions {
    fn default() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            healthy: AtomicBool::new(true),
        }
    }
}

impl StubFunctions {
    pub fn respond(&self, function: &str, result: Value) {
        self.responses.lock().unwrap().insert(function.to_string(), result);
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<(String, Vec<FunctionArg>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Option<(String, Vec<FunctionArg>)> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl StoredFunctions for StubFunctions {
    async fn call_json_function(&self, function: &str, args: &[FunctionArg]) -> Result<Option<Value>, DatabaseError> {
        self.calls.lock().unwrap().push((function.to_string(), args.to_vec()));
        Ok(self.responses.lock().unwrap().get(function).cloned())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DatabaseError::Sqlx(sqlx::Error::PoolClosed))
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub functions: Arc<StubFunctions>,
    pub clock: Arc<ManualClock>,
    pub tokens: Arc<TokenAuthority>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// In-process app on a manual clock fixed at a whole second
pub fn test_app() -> TestApp {
    let mut config = AppConfig::for_environment(Environment::Development);
    config.auth.secret = TEST_SECRET.to_string();
    config.api.base_path = BASE.to_string();

    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap()));
    let tokens = Arc::new(TokenAuthority::new(&config.auth, clock.clone()).unwrap());
    let functions = Arc::new(StubFunctions::default());

    let state = AppState::new(Arc::new(config), tokens.clone(), functions.clone());

    TestApp {
        router: app(state),
        functions,
        clock,
        tokens,
    }
}

impl TestApp {
    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<TestResponse> {
        self.send(Method::GET, path, None, token.map(|t| format!("Bearer {}", t))).await
    }

    pub async fn get_with_authorization(&self, path: &str, authorization: &str) -> Result<TestResponse> {
        self.send(Method::GET, path, None, Some(authorization.to_string())).await
    }

    pub async fn post(&self, path: &str, body: Value, token: Option<&str>) -> Result<TestResponse> {
        self.send(Method::POST, path, Some(body.to_string()), token.map(|t| format!("Bearer {}", t)))
            .await
    }

    pub async fn post_raw(&self, path: &str, raw: &str) -> Result<TestResponse> {
        self.send(Method::POST, path, Some(raw.to_string()), None).await
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        authorization: Option<String>,
    ) -> Result<TestResponse> {
        send_to(&self.router, method, path, body, authorization).await
    }

    /// Access token for a member, issued by the app's own authority
    pub fn access_token(&self, member: &Map<String, Value>) -> String {
        self.tokens.issue_access_token(member, None).unwrap()
    }

    /// Script a successful CHECK_LOGIN for this member
    pub fn accept_login(&self, member: &Map<String, Value>) {
        self.functions.respond(
            "com_spr_login_json",
            json!({
                "success": true,
                "status_code": 200,
                "message": "Login successful",
                "data": member,
            }),
        );
    }
}

pub async fn send_to(
    router: &Router,
    method: Method,
    path: &str,
    body: Option<String>,
    authorization: Option<String>,
) -> Result<TestResponse> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(authorization) = authorization {
        builder = builder.header(header::AUTHORIZATION, authorization);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))?,
        None => builder.body(Body::empty())?,
    };

    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    Ok(TestResponse { status, headers, body })
}

/// Single `GET /gated` route behind a permission layer built by the checker factory
pub fn permission_router(tokens: Arc<TokenAuthority>, permission: &str) -> Router {
    async fn gated(Extension(user): Extension<CurrentUser>) -> Json<Value> {
        Json(json!({"its_id": user.its_id()}))
    }

    Router::new()
        .route("/gated", get(gated))
        .route_layer(from_fn_with_state(PermissionGate::new(tokens, permission), require_permission))
}

pub fn path(route: &str) -> String {
    format!("{}{}", BASE, route)
}

/// Business payload as the login function returns it
pub fn member(its_id: i64, access_rights: &str, is_admin: Value) -> Map<String, Value> {
    let value = json!({
        "its_id": its_id,
        "full_name": "Ali Hussain",
        "email": "ali@example.com",
        "team_id": 4,
        "role_id": 2,
        "is_admin": is_admin,
        "access_rights": access_rights,
        "jamaat_id": 11,
        "jamiaat_id": 3,
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}
