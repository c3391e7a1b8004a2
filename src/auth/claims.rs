use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

// Business claim names, as returned by the login function
pub const ITS_ID: &str = "its_id";
pub const FULL_NAME: &str = "full_name";
pub const EMAIL: &str = "email";
pub const TEAM_ID: &str = "team_id";
pub const ROLE_ID: &str = "role_id";
pub const IS_ADMIN: &str = "is_admin";
pub const ACCESS_RIGHTS: &str = "access_rights";
pub const JAMAAT_ID: &str = "jamaat_id";
pub const JAMIAAT_ID: &str = "jamiaat_id";

/// Claim names owned by the token authority. Stripped from business payloads.
pub const TOKEN_METADATA: [&str; 3] = ["exp", "iat", "type"];

/// Discriminator between the two capability classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenClass {
    Access,
    Refresh,
}

impl TokenClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenClass::Access => "access",
            TokenClass::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token payload: the three management claims plus whatever business data was signed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Expiry (seconds since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Issued-at (seconds since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_class: Option<TokenClass>,
    #[serde(flatten)]
    pub business: Map<String, Value>,
}

impl Claims {
    /// Wrap a caller payload. The caller's map is copied and any management claims in it are dropped.
    pub fn from_payload(payload: &Map<String, Value>) -> Self {
        Self {
            exp: None,
            iat: None,
            token_class: None,
            business: strip_token_metadata(payload.clone()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.business.get(key).filter(|v| !v.is_null())
    }

    /// Subject identity, if present and non-null
    pub fn its_id(&self) -> Option<&Value> {
        self.get(ITS_ID)
    }

    pub fn is_admin(&self) -> bool {
        self.business.get(IS_ADMIN).map(is_truthy).unwrap_or(false)
    }

    pub fn access_rights(&self) -> Option<&str> {
        self.get(ACCESS_RIGHTS).and_then(Value::as_str)
    }

    /// Business claims only, ready to be re-issued
    pub fn into_business(self) -> Map<String, Value> {
        strip_token_metadata(self.business)
    }
}

pub fn strip_token_metadata(mut payload: Map<String, Value>) -> Map<String, Value> {
    for key in TOKEN_METADATA {
        payload.remove(key);
    }
    payload
}

/// Loose truthiness used by the admin flag: null, false, 0, "" and empty containers are false
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Normalized permission set parsed from a comma-separated rights string.
/// Entries are trimmed, empties dropped, matching is case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Permissions(BTreeSet<String>);

impl Permissions {
    pub fn parse(rights: &str) -> Self {
        Self(
            rights
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Verified access-token identity handed to route handlers
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub claims: Claims,
    pub permissions: Permissions,
}

impl CurrentUser {
    pub fn from_claims(claims: Claims) -> Self {
        let permissions = claims.access_rights().map(Permissions::parse).unwrap_or_default();
        Self { claims, permissions }
    }

    pub fn its_id(&self) -> Option<&Value> {
        self.claims.its_id()
    }

    pub fn is_admin(&self) -> bool {
        self.claims.is_admin()
    }
}
