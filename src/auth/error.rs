use axum::http::StatusCode;
use thiserror::Error;

/// Every way the token authority or a guard can reject a request
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    // No credential presented where one is required
    #[error("Not authenticated")]
    MissingCredentials,

    #[error("Invalid authentication credentials")]
    InvalidScheme,

    // Bad signature, undecodable payload, or missing expiry
    #[error("Could not validate credentials")]
    InvalidToken,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token type")]
    WrongTokenClass,

    #[error("Invalid token payload")]
    MissingIdentity,

    #[error("Could not validate refresh token")]
    InvalidRefreshToken,

    #[error("Refresh token has expired")]
    RefreshExpired,

    #[error("Admin privileges required")]
    AdminRequired,

    #[error("Permission denied: '{0}' required")]
    PermissionDenied(String),

    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("Token lifetime must be at least one second")]
    InvalidLifetime,

    #[error("Token signing failed: {0}")]
    Signing(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials
            | AuthError::InvalidScheme
            | AuthError::AdminRequired
            | AuthError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AuthError::InvalidToken
            | AuthError::Expired
            | AuthError::WrongTokenClass
            | AuthError::MissingIdentity
            | AuthError::InvalidRefreshToken
            | AuthError::RefreshExpired => StatusCode::UNAUTHORIZED,
            AuthError::MissingSecret | AuthError::InvalidLifetime | AuthError::Signing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
