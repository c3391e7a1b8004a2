// Guards composed in front of route handlers: current-user, admin, permission, optional.

use std::sync::Arc;

use super::claims::{CurrentUser, TokenClass};
use super::error::AuthError;
use super::token::TokenAuthority;

/// Resolve a bearer credential into the session identity.
/// Only access tokens carrying a subject identity are accepted.
pub fn current_user(authority: &TokenAuthority, token: &str) -> Result<CurrentUser, AuthError> {
    let claims = authority.verify(token)?;

    if claims.token_class != Some(TokenClass::Access) {
        return Err(AuthError::WrongTokenClass);
    }

    if claims.its_id().is_none() {
        return Err(AuthError::MissingIdentity);
    }

    Ok(CurrentUser::from_claims(claims))
}

/// Pass the user through only if the admin flag is truthy
pub fn require_admin(user: CurrentUser) -> Result<CurrentUser, AuthError> {
    if !user.is_admin() {
        return Err(AuthError::AdminRequired);
    }
    Ok(user)
}

/// Admins bypass; everyone else needs `required` in their rights string
pub fn check_permission(required: &str, user: CurrentUser) -> Result<CurrentUser, AuthError> {
    if user.is_admin() || user.permissions.contains(required) {
        return Ok(user);
    }

    tracing::debug!(
        its_id = ?user.its_id(),
        "Permission '{}' denied",
        required
    );
    Err(AuthError::PermissionDenied(required.to_string()))
}

/// Reusable guard bound to one permission name
#[derive(Debug, Clone)]
pub struct PermissionChecker {
    required: Arc<str>,
}

impl PermissionChecker {
    pub fn new(required: impl Into<Arc<str>>) -> Self {
        Self {
            required: required.into(),
        }
    }

    pub fn required(&self) -> &str {
        &self.required
    }

    pub fn check(&self, authority: &TokenAuthority, token: &str) -> Result<CurrentUser, AuthError> {
        check_permission(&self.required, current_user(authority, token)?)
    }
}

/// Enrich-if-possible guard. Absent credentials or a failed verification yield `None`;
/// it never rejects. Any verified token is passed through as-is, whatever its class.
pub fn optional_auth(authority: &TokenAuthority, token: Option<&str>) -> Option<CurrentUser> {
    let token = token?;
    match authority.verify(token) {
        Ok(claims) => Some(CurrentUser::from_claims(claims)),
        Err(e) => {
            tracing::debug!("Optional auth ignored credential: {}", e);
            None
        }
    }
}
