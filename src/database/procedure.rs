use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result-code envelope returned by the JSON stored functions:
/// `{ "success": bool, "status_code": int, "message": str, "data": ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureResult {
    pub success: bool,
    pub status_code: Option<i64>,
    pub message: Option<String>,
    pub data: Option<Value>,
}

impl ProcedureResult {
    pub fn failure(status_code: i64, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code: Some(status_code),
            message: Some(message.into()),
            data: None,
        }
    }

    /// Interpret a raw function result. Functions declared as text hand back the
    /// envelope as a JSON string, so strings are parsed once more.
    pub fn from_function_result(result: Option<Value>) -> Self {
        let result = match result {
            Some(Value::String(raw)) if raw.is_empty() => None,
            Some(Value::String(raw)) => match serde_json::from_str::<Value>(&raw) {
                Ok(parsed) => Some(parsed),
                Err(_) => return Self::failure(500, "Invalid response format from database"),
            },
            other => other,
        };

        match result {
            Some(Value::Object(envelope)) if !envelope.is_empty() => Self {
                success: envelope.get("success").and_then(Value::as_bool).unwrap_or(false),
                status_code: Some(envelope.get("status_code").and_then(Value::as_i64).unwrap_or(200)),
                message: Some(
                    envelope
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("Query executed")
                        .to_string(),
                ),
                data: envelope.get("data").cloned().filter(|d| !d.is_null()),
            },
            None | Some(Value::Null) | Some(Value::Object(_)) => Self::failure(500, "No response from database"),
            Some(_) => Self::failure(500, "Invalid response format from database"),
        }
    }
}
