// handlers/protected/session.rs - GET /Login/Me, /Login/Session, /Login/Admin/Check

use axum::Json;
use serde_json::{json, Value};

use crate::middleware::{AdminUser, AuthUser, MaybeUser};

/// GET /Login/Me - the verified claims of the presented access token
pub async fn me(AuthUser(user): AuthUser) -> Json<Value> {
    let permissions: Vec<&str> = user.permissions.iter().collect();

    Json(json!({
        "success": true,
        "data": {
            "claims": user.claims,
            "is_admin": user.is_admin(),
            "permissions": permissions,
        }
    }))
}

/// GET /Login/Session - guest or authenticated; never rejects
pub async fn session(MaybeUser(user): MaybeUser) -> Json<Value> {
    match user {
        Some(user) => Json(json!({
            "success": true,
            "authenticated": true,
            "its_id": user.its_id(),
            "is_admin": user.is_admin(),
        })),
        None => Json(json!({
            "success": true,
            "authenticated": false,
            "its_id": null,
            "is_admin": false,
        })),
    }
}

/// GET /Login/Admin/Check - admin-only check
pub async fn admin_check(AdminUser(user): AdminUser) -> Json<Value> {
    tracing::info!("Admin check passed for {:?}", user.its_id());

    Json(json!({
        "success": true,
        "message": "Admin access granted",
        "its_id": user.its_id(),
    }))
}
