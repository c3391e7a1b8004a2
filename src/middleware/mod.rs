// HTTP boundary for the token guards: bearer extraction, extractors, permission layer.

pub mod auth;

pub use auth::{bearer_token, require_permission, AdminUser, AuthUser, MaybeUser, PermissionGate};
