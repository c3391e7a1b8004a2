use serde_json::{Map, Value};
use std::sync::Arc;

use crate::database::{DatabaseError, FunctionArg, StoredFunctions};

/// What the credential-check function decided
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub success: bool,
    pub message: String,
    /// Member business data (its_id, full_name, team/role ids, rights...) on success
    pub data: Option<Map<String, Value>>,
}

impl LoginOutcome {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Login collaborator: checks credentials via `com_spr_login_json`.
/// The token authority trusts the returned data verbatim.
#[derive(Clone)]
pub struct LoginService {
    functions: Arc<dyn StoredFunctions>,
}

impl LoginService {
    pub const FUNCTION: &'static str = "com_spr_login_json";

    pub fn new(functions: Arc<dyn StoredFunctions>) -> Self {
        Self { functions }
    }

    pub async fn check_login(
        &self,
        username: &str,
        password: &str,
        client_ip: &str,
    ) -> Result<LoginOutcome, DatabaseError> {
        let its_id = its_id_from_username(username);
        tracing::info!("Login attempt for ITS ID: {}", username);

        let result = self
            .functions
            .call_json_function(
                Self::FUNCTION,
                &[
                    FunctionArg::text("CHECK_LOGIN"),
                    FunctionArg::Int(Some(its_id)),
                    FunctionArg::text(password),
                    FunctionArg::text(client_ip),
                ],
            )
            .await?;

        Ok(parse_outcome(result))
    }
}

/// Usernames are ITS ids; anything non-numeric is sent as 0 and fails database-side
pub fn its_id_from_username(username: &str) -> i32 {
    if username.is_empty() || !username.chars().all(|c| c.is_ascii_digit()) {
        return 0;
    }
    username.parse().unwrap_or(0)
}

fn parse_outcome(result: Option<Value>) -> LoginOutcome {
    let result = match result {
        Some(Value::String(raw)) if raw.is_empty() => None,
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(&raw) {
            Ok(parsed) => Some(parsed),
            Err(_) => return LoginOutcome::failed("Invalid response format from server"),
        },
        other => other,
    };

    match result {
        Some(Value::Object(envelope)) => LoginOutcome {
            success: envelope.get("success").and_then(Value::as_bool).unwrap_or(false),
            message: envelope
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Login failed")
                .to_string(),
            data: envelope.get("data").and_then(Value::as_object).cloned(),
        },
        None | Some(Value::Null) => LoginOutcome::failed("No response from authentication server"),
        Some(_) => LoginOutcome::failed("Invalid response format from server"),
    }
}
