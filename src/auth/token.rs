use chrono::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

use super::claims::{Claims, TokenClass};
use super::clock::{Clock, SystemClock};
use super::error::AuthError;
use crate::config::AuthConfig;

/// Access/refresh pair returned by login and refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expiry {
    Valid,
    Expired,
    // No exp claim, or exp not after iat
    Invalid,
}

/// Issues, verifies and refreshes signed bearer tokens.
///
/// Holds the process-wide signing material read-only; every operation is a pure
/// transform over its inputs and the injected clock, so one instance is shared
/// across all requests without locking.
pub struct TokenAuthority {
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("algorithm", &self.header.alg)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("clock", &self.clock)
            .finish()
    }
}

impl TokenAuthority {
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Result<Self, AuthError> {
        if config.secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }

        let access_ttl =
            Duration::try_minutes(config.access_token_ttl_minutes).ok_or(AuthError::InvalidLifetime)?;
        let refresh_ttl = Duration::try_days(config.refresh_token_ttl_days).ok_or(AuthError::InvalidLifetime)?;
        if access_ttl < Duration::seconds(1) || refresh_ttl < Duration::seconds(1) {
            return Err(AuthError::InvalidLifetime);
        }

        // Expiry is compared against the injected clock in `expiry`, not by the library
        let mut validation = Validation::new(config.algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::new();

        Ok(Self {
            header: Header::new(config.algorithm),
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            access_ttl,
            refresh_ttl,
            clock,
        })
    }

    pub fn with_system_clock(config: &AuthConfig) -> Result<Self, AuthError> {
        Self::new(config, Arc::new(SystemClock))
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Sign `payload` as an access token. `ttl` overrides the configured access lifetime.
    pub fn issue_access_token(
        &self,
        payload: &Map<String, Value>,
        ttl: Option<Duration>,
    ) -> Result<String, AuthError> {
        self.issue(payload, TokenClass::Access, ttl.unwrap_or(self.access_ttl))
    }

    /// Sign `payload` as a refresh token. The lifetime is always the configured one.
    pub fn issue_refresh_token(&self, payload: &Map<String, Value>) -> Result<String, AuthError> {
        self.issue(payload, TokenClass::Refresh, self.refresh_ttl)
    }

    pub fn issue_pair(&self, payload: &Map<String, Value>) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.issue_access_token(payload, None)?,
            refresh_token: self.issue_refresh_token(payload)?,
            token_type: "bearer".to_string(),
            expires_in: self.access_ttl.num_seconds(),
        })
    }

    /// Check signature and expiry; all-or-nothing.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.decode(token).ok_or(AuthError::InvalidToken)?;

        match self.expiry(&claims) {
            Expiry::Valid => Ok(claims),
            Expiry::Expired => Err(AuthError::Expired),
            Expiry::Invalid => Err(AuthError::InvalidToken),
        }
    }

    /// Exchange a refresh token for a brand-new pair carrying the same business claims.
    ///
    /// The presented token stays cryptographically valid until its own expiry;
    /// there is no revocation store.
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.decode(refresh_token).ok_or(AuthError::InvalidRefreshToken)?;

        if claims.token_class != Some(TokenClass::Refresh) {
            tracing::warn!(
                presented = ?claims.token_class,
                "refresh attempted with a non-refresh token"
            );
            return Err(AuthError::WrongTokenClass);
        }

        match self.expiry(&claims) {
            Expiry::Valid => {}
            Expiry::Expired => return Err(AuthError::RefreshExpired),
            Expiry::Invalid => return Err(AuthError::InvalidRefreshToken),
        }

        self.issue_pair(&claims.into_business())
    }

    fn issue(&self, payload: &Map<String, Value>, class: TokenClass, ttl: Duration) -> Result<String, AuthError> {
        if ttl < Duration::seconds(1) {
            return Err(AuthError::InvalidLifetime);
        }

        let now = self.clock.now().timestamp();
        let mut claims = Claims::from_payload(payload);
        claims.iat = Some(now);
        claims.exp = Some(now + ttl.num_seconds());
        claims.token_class = Some(class);

        encode(&self.header, &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign {} token: {}", class, e);
            AuthError::Signing(e.to_string())
        })
    }

    fn decode(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::warn!("JWT decode error: {}", e);
                None
            }
        }
    }

    // The one place expiry is decided
    fn expiry(&self, claims: &Claims) -> Expiry {
        let Some(exp) = claims.exp else {
            return Expiry::Invalid;
        };
        if claims.iat.is_some_and(|iat| exp <= iat) {
            return Expiry::Invalid;
        }
        if exp < self.clock.now().timestamp() {
            Expiry::Expired
        } else {
            Expiry::Valid
        }
    }
}
