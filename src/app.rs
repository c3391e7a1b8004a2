// app.rs - Router assembly and shared request state

use axum::{
    extract::FromRef,
    http::Uri,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::TokenAuthority;
use crate::config::AppConfig;
use crate::database::StoredFunctions;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::services::{GuardsService, LoginService};

/// Everything a handler may need. Cloned per request; all members are shared handles.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenAuthority>,
    pub functions: Arc<dyn StoredFunctions>,
    pub login: LoginService,
    pub guards: GuardsService,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, tokens: Arc<TokenAuthority>, functions: Arc<dyn StoredFunctions>) -> Self {
        Self {
            login: LoginService::new(functions.clone()),
            guards: GuardsService::new(functions.clone()),
            config,
            tokens,
            functions,
        }
    }
}

impl FromRef<AppState> for Arc<TokenAuthority> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

/// Build the full HTTP application. API routes are mounted under `api.base_path`.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(public::health::health))
        .merge(login_routes())
        .merge(guards_routes());

    let base = normalize_base_path(&state.config.api.base_path);
    let router = match base {
        Some(base) => Router::new().nest(&base, api),
        None => api,
    };

    router
        .route("/", get(public::health::root))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn login_routes() -> Router<AppState> {
    use protected::session;
    use public::{health, login};

    Router::new()
        // Token acquisition
        .route("/Login/CheckLogin", post(login::check_login))
        .route("/Login/RefreshToken", post(login::refresh_token))
        .route("/Login/health", get(health::login_health))
        // Guarded by extractors
        .route("/Login/Me", get(session::me))
        .route("/Login/Session", get(session::session))
        .route("/Login/Admin/Check", get(session::admin_check))
}

fn guards_routes() -> Router<AppState> {
    use protected::guards;
    use public::health;

    Router::new()
        // Guarded by the current-user extractor
        .route(
            "/Guards/GetAcceptedGuardsByMiqaatDate",
            post(guards::accepted_guards_by_miqaat_date),
        )
        .route("/Guards/GuardCheck", post(guards::guard_check))
        .route("/Guards/GetAllGuardsWithDuty", post(guards::all_guards_with_duty))
        .route("/Guards/health", get(health::guards_health))
}

/// `None` when routes mount at the root; otherwise a `/`-prefixed path without trailing slash
fn normalize_base_path(base_path: &str) -> Option<String> {
    let trimmed = base_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("/{}", trimmed))
    }
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Route {} not found", uri.path()))
}
