use thiserror::Error;

use crate::models::TenantId;

#[derive(Error, Debug)]
pub enum Error {
    /// Fatal, raised before any migration attempt. No retry.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Catalog-scope migration failure. Fatal for the whole run.
    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Per-tenant initialization failure. Recoverable at the run level:
    /// recorded in the bootstrap summary, never aborts the remaining tenants.
    #[error("Tenant '{tenant_id}' initialization failed: {reason}")]
    TenantInit { tenant_id: TenantId, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bootstrap cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for a per-tenant failure wrapping any error message.
    pub fn tenant_init(tenant_id: TenantId, reason: impl Into<String>) -> Self {
        Self::TenantInit {
            tenant_id,
            reason: reason.into(),
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            // Map "no rows" to NotFound
            sqlx::Error::RowNotFound => Self::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().unwrap_or_default();
                match code.as_ref() {
                    // PostgreSQL unique_violation: a tenant id collision is a
                    // defined no-op at the directory level, but any other path
                    // hitting this maps to AlreadyExists.
                    "23505" => Self::AlreadyExists("Tenant already registered".to_string()),
                    // PostgreSQL check_violation (empty id / connection string)
                    "23514" => Self::InvalidInput("Constraint check failed".to_string()),
                    // PostgreSQL not_null_violation
                    "23502" => Self::InvalidInput("Required field is missing".to_string()),
                    _ => Self::Database(err),
                }
            }
            _ => Self::Database(err),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for Error {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Migration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
