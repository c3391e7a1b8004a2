use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the stored function gateway
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Positional argument for a stored function call. `None` binds SQL NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionArg {
    Text(Option<String>),
    Int(Option<i32>),
    Date(Option<NaiveDate>),
}

impl FunctionArg {
    pub fn text(value: impl Into<String>) -> Self {
        FunctionArg::Text(Some(value.into()))
    }
}

/// Boundary to the database-side business logic. Every route that touches data
/// goes through a JSON-returning stored function.
#[async_trait]
pub trait StoredFunctions: Send + Sync {
    /// Call `<schema>.<function>(args...)` and return its JSON result, if any
    async fn call_json_function(&self, function: &str, args: &[FunctionArg]) -> Result<Option<Value>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// PostgreSQL pool plus the schema the stored functions live in
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
    schema: String,
}

impl Database {
    /// Build the pool without connecting; the first query opens connections.
    /// Startup therefore succeeds even while PostgreSQL is down.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        if !Self::is_valid_identifier(&config.schema) {
            return Err(DatabaseError::InvalidIdentifier(config.schema.clone()));
        }

        let url = config
            .connection_url()
            .map_err(|e| sqlx::Error::Configuration(Box::new(e)))?;

        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect_lazy(&url)?;

        info!(
            "PostgreSQL pool configured for {}:{}/{} (schema {}, {}..{} connections)",
            config.host, config.port, config.database, config.schema, config.min_connections, config.max_connections
        );

        Ok(Self {
            pool,
            schema: config.schema.clone(),
        })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }

    fn function_sql(schema: &str, function: &str, arity: usize) -> Result<String, DatabaseError> {
        for name in [schema, function] {
            if !Self::is_valid_identifier(name) {
                return Err(DatabaseError::InvalidIdentifier(name.to_string()));
            }
        }

        let placeholders = (1..=arity).map(|i| format!("${}", i)).collect::<Vec<_>>().join(", ");
        // The cast accepts functions declared as json, jsonb or text-holding-json
        Ok(format!(
            "SELECT CAST({}.{}({}) AS jsonb)",
            Self::quote_identifier(schema),
            Self::quote_identifier(function),
            placeholders
        ))
    }

    /// Quote SQL identifier to prevent injection
    fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Schema and function names are plain lowercase-ish identifiers: [A-Za-z_][A-Za-z0-9_]*
    fn is_valid_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

#[async_trait]
impl StoredFunctions for Database {
    async fn call_json_function(&self, function: &str, args: &[FunctionArg]) -> Result<Option<Value>, DatabaseError> {
        let sql = Self::function_sql(&self.schema, function, args.len())?;

        let mut query = sqlx::query_scalar::<_, Option<Value>>(&sql);
        for arg in args {
            query = match arg {
                FunctionArg::Text(v) => query.bind(v.clone()),
                FunctionArg::Int(v) => query.bind(*v),
                FunctionArg::Date(v) => query.bind(*v),
            };
        }

        let result = query.fetch_optional(&self.pool).await.map_err(|e| {
            tracing::error!("Error calling function {}.{}: {}", self.schema, function, e);
            e
        })?;

        Ok(result.flatten())
    }

    /// Pings the pool to ensure connectivity
    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
