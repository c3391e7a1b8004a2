use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use std::sync::Arc;

use crate::auth::{current_user, optional_auth, require_admin, AuthError, CurrentUser, PermissionChecker, TokenAuthority};
use crate::error::ApiError;

/// Pull the bearer credential out of the `Authorization` header.
///
/// Missing header or empty credentials answer 403 "Not authenticated";
/// any scheme other than `bearer` (case-insensitive) answers 403
/// "Invalid authentication credentials".
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidScheme)?;

    let (scheme, credentials) = match value.split_once(' ') {
        Some((scheme, rest)) => (scheme, rest.trim()),
        None => (value, ""),
    };

    if scheme.is_empty() || credentials.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidScheme);
    }
    Ok(credentials)
}

/// Authenticated access-token holder
#[derive(Debug, Clone)]
pub struct AuthUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    Arc<TokenAuthority>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let authority = Arc::<TokenAuthority>::from_ref(state);
        let token = bearer_token(&parts.headers)?;
        Ok(AuthUser(current_user(&authority, token)?))
    }
}

/// Authenticated holder whose `is_admin` claim is truthy
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    Arc<TokenAuthority>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        Ok(AdminUser(require_admin(user)?))
    }
}

/// Identity if a valid access token came along, `None` otherwise. Never rejects.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    Arc<TokenAuthority>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let authority = Arc::<TokenAuthority>::from_ref(state);
        let token = bearer_token(&parts.headers).ok();
        Ok(MaybeUser(optional_auth(&authority, token)))
    }
}

/// State for the `require_permission` route layer
#[derive(Debug, Clone)]
pub struct PermissionGate {
    pub authority: Arc<TokenAuthority>,
    pub checker: PermissionChecker,
}

impl PermissionGate {
    pub fn new(authority: Arc<TokenAuthority>, permission: &str) -> Self {
        Self {
            authority,
            checker: PermissionChecker::new(permission),
        }
    }
}

/// Route layer: admit access-token holders that are admins or carry the gate's permission.
/// The verified `CurrentUser` is stored in request extensions for the handler.
///
/// ```ignore
/// Router::new()
///     .route("/Duty/Assign", post(assign_duty))
///     .route_layer(from_fn_with_state(PermissionGate::new(tokens, "assign_duties"), require_permission))
/// ```
pub async fn require_permission(
    State(gate): State<PermissionGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())?;
    let user = gate.checker.check(&gate.authority, token)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
