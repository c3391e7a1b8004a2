mod common;

use anyhow::Result;
use axum::http::{header, Method, StatusCode};
use serde_json::{json, Value};

use burhani_guards_api::auth::TokenAuthority;
use burhani_guards_api::config::AuthConfig;
use common::{member, path, permission_router, send_to, test_app};

#[tokio::test]
async fn missing_authorization_is_forbidden_not_authenticated() -> Result<()> {
    let app = test_app();

    let res = app.get(&path("/Login/Me"), None).await?;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["message"], "Not authenticated");
    assert_eq!(res.body["success"], false);
    assert!(res.headers.get(header::WWW_AUTHENTICATE).is_none());
    Ok(())
}

#[tokio::test]
async fn non_bearer_scheme_is_forbidden() -> Result<()> {
    let app = test_app();

    let res = app
        .get_with_authorization(&path("/Login/Me"), "Basic dXNlcjpwYXNz")
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["message"], "Invalid authentication credentials");

    let res = app.get_with_authorization(&path("/Login/Me"), "Bearer").await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["message"], "Not authenticated");
    Ok(())
}

#[tokio::test]
async fn garbage_token_is_unauthorized_with_challenge() -> Result<()> {
    let app = test_app();

    let res = app.get(&path("/Login/Me"), Some("not.a.token")).await?;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["message"], "Could not validate credentials");
    assert_eq!(res.headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    Ok(())
}

#[tokio::test]
async fn token_from_another_secret_is_rejected() -> Result<()> {
    let app = test_app();
    let foreign = TokenAuthority::with_system_clock(&AuthConfig::with_secret("some-other-secret"))?;
    let token = foreign.issue_access_token(&member(10001001, "", json!(false)), None)?;

    let res = app.get(&path("/Login/Me"), Some(&token)).await?;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["message"], "Could not validate credentials");
    Ok(())
}

#[tokio::test]
async fn refresh_token_is_not_a_session_credential() -> Result<()> {
    let app = test_app();
    let refresh = app.tokens.issue_refresh_token(&member(10001001, "", json!(false)))?;

    let res = app.get(&path("/Login/Me"), Some(&refresh)).await?;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["message"], "Invalid token type");
    Ok(())
}

#[tokio::test]
async fn token_without_identity_is_rejected() -> Result<()> {
    let app = test_app();
    let mut payload = member(10001001, "", json!(false));
    payload.remove("its_id");
    let token = app.access_token(&payload);

    let res = app.get(&path("/Login/Me"), Some(&token)).await?;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["message"], "Invalid token payload");
    Ok(())
}

#[tokio::test]
async fn me_returns_verified_claims() -> Result<()> {
    let app = test_app();
    let token = app.access_token(&member(10001001, "view_guards, view_duties", json!(false)));

    let res = app.get(&path("/Login/Me"), Some(&token)).await?;

    assert_eq!(res.status, StatusCode::OK);
    let data = &res.body["data"];
    assert_eq!(data["claims"]["its_id"], 10001001);
    assert_eq!(data["claims"]["full_name"], "Ali Hussain");
    assert_eq!(data["claims"]["type"], "access");
    assert_eq!(data["is_admin"], false);
    assert_eq!(data["permissions"], json!(["view_duties", "view_guards"]));
    Ok(())
}

#[tokio::test]
async fn admin_check_requires_truthy_admin_flag() -> Result<()> {
    let app = test_app();

    for falsy in [json!(false), json!(0), json!(""), Value::Null] {
        let token = app.access_token(&member(10001001, "", falsy.clone()));
        let res = app.get(&path("/Login/Admin/Check"), Some(&token)).await?;
        assert_eq!(res.status, StatusCode::FORBIDDEN, "is_admin = {}", falsy);
        assert_eq!(res.body["message"], "Admin privileges required");
    }

    for truthy in [json!(true), json!(1), json!("yes")] {
        let token = app.access_token(&member(10001001, "", truthy.clone()));
        let res = app.get(&path("/Login/Admin/Check"), Some(&token)).await?;
        assert_eq!(res.status, StatusCode::OK, "is_admin = {}", truthy);
        assert_eq!(res.body["its_id"], 10001001);
    }
    Ok(())
}

#[tokio::test]
async fn session_never_rejects() -> Result<()> {
    let app = test_app();
    let refresh = app.tokens.issue_refresh_token(&member(10001001, "", json!(false)))?;

    let guest = app.get(&path("/Login/Session"), None).await?;
    assert_eq!(guest.status, StatusCode::OK);
    assert_eq!(guest.body["authenticated"], false);

    let basic = app
        .get_with_authorization(&path("/Login/Session"), "Basic dXNlcjpwYXNz")
        .await?;
    assert_eq!(basic.status, StatusCode::OK);
    assert_eq!(basic.body["authenticated"], false);

    let garbage = app.get(&path("/Login/Session"), Some("garbage")).await?;
    assert_eq!(garbage.status, StatusCode::OK);
    assert_eq!(garbage.body["authenticated"], false);

    // Any verified token enriches the session, refresh class included
    let refreshing = app.get(&path("/Login/Session"), Some(&refresh)).await?;
    assert_eq!(refreshing.status, StatusCode::OK);
    assert_eq!(refreshing.body["authenticated"], true);
    assert_eq!(refreshing.body["its_id"], 10001001);

    let token = app.access_token(&member(10001001, "", json!(true)));
    let user = app.get(&path("/Login/Session"), Some(&token)).await?;
    assert_eq!(user.status, StatusCode::OK);
    assert_eq!(user.body["authenticated"], true);
    assert_eq!(user.body["its_id"], 10001001);
    assert_eq!(user.body["is_admin"], true);
    Ok(())
}

#[tokio::test]
async fn guard_queries_need_only_an_access_token() -> Result<()> {
    let app = test_app();
    app.functions.respond(
        "spr_guards",
        json!({"success": true, "status_code": 200, "message": "ok", "data": []}),
    );
    let body = json!({"its_id": 10001001});

    let res = app.post(&path("/Guards/GuardCheck"), body.clone(), None).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["message"], "Not authenticated");

    let refresh = app.tokens.issue_refresh_token(&member(10001001, "", json!(false)))?;
    let res = app.post(&path("/Guards/GuardCheck"), body.clone(), Some(&refresh)).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["message"], "Invalid token type");

    // A member with no rights at all is admitted
    let member_token = app.access_token(&member(10001002, "", json!(false)));
    let res = app.post(&path("/Guards/GuardCheck"), body, Some(&member_token)).await?;
    assert_eq!(res.status, StatusCode::OK);

    // Only the admitted request reached the database
    assert_eq!(app.functions.calls().len(), 1);
    Ok(())
}

#[tokio::test]
async fn permission_layer_admits_admins_and_exact_grants() -> Result<()> {
    let app = test_app();
    let router = permission_router(app.tokens.clone(), "view_guards");
    let bearer = |token: &str| Some(format!("Bearer {}", token));

    let res = send_to(&router, Method::GET, "/gated", None, None).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["message"], "Not authenticated");

    let viewer = app.access_token(&member(10001001, "view_duties, view_guards", json!(false)));
    let res = send_to(&router, Method::GET, "/gated", None, bearer(&viewer)).await?;
    assert_eq!(res.status, StatusCode::OK);

    let outsider = app.access_token(&member(10001002, "view_duties", json!(false)));
    let res = send_to(&router, Method::GET, "/gated", None, bearer(&outsider)).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["message"], "Permission denied: 'view_guards' required");

    // Names are case-sensitive
    let shouting = app.access_token(&member(10001004, "View_Guards", json!(false)));
    let res = send_to(&router, Method::GET, "/gated", None, bearer(&shouting)).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let admin = app.access_token(&member(10001003, "", json!(true)));
    let res = send_to(&router, Method::GET, "/gated", None, bearer(&admin)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["its_id"], 10001003);
    Ok(())
}

#[tokio::test]
async fn guard_health_stays_public() -> Result<()> {
    let app = test_app();

    let res = app.get(&path("/Guards/health"), None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "healthy");

    let res = app.get(&path("/Login/health"), None).await?;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}
