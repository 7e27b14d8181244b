//! Schema migration seam
//!
//! The bootstrapper only needs two questions answered per database: "is
//! anything pending?" and "apply it". The concrete engine stays behind the
//! [`SchemaMigrator`] trait; [`SqlxMigrator`] is the Postgres implementation
//! used for the shared catalog.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::{Error, Result};

/// Migrations for the shared catalog (the tenants table itself).
pub static CATALOG_MIGRATOR: Migrator = sqlx::migrate!("../migrations");

/// Reports pending migrations and applies them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaMigrator: Send + Sync {
    async fn has_pending_migrations(&self) -> Result<bool>;

    async fn apply_migrations(&self, cancel: CancellationToken) -> Result<()>;
}

/// [`SchemaMigrator`] backed by a `sqlx` migrator and a connection pool.
pub struct SqlxMigrator {
    pool: PgPool,
    migrator: &'static Migrator,
}

impl SqlxMigrator {
    #[must_use]
    pub const fn new(pool: PgPool, migrator: &'static Migrator) -> Self {
        Self { pool, migrator }
    }

    /// Migrator for the shared catalog database.
    #[must_use]
    pub fn catalog(pool: PgPool) -> Self {
        Self::new(pool, &CATALOG_MIGRATOR)
    }
}

#[async_trait]
impl SchemaMigrator for SqlxMigrator {
    /// Compare the migrator's list against the `_sqlx_migrations` table.
    /// A missing table means nothing has ever been applied.
    async fn has_pending_migrations(&self) -> Result<bool> {
        let applied: Vec<(i64,)> =
            match sqlx::query_as("SELECT version FROM _sqlx_migrations ORDER BY version")
                .fetch_all(&self.pool)
                .await
            {
                Ok(rows) => rows,
                Err(_) => return Ok(true), // table may not exist yet
            };

        let applied_versions: HashSet<i64> = applied.into_iter().map(|(v,)| v).collect();

        Ok(self
            .migrator
            .migrations
            .iter()
            .any(|m| !applied_versions.contains(&m.version)))
    }

    async fn apply_migrations(&self, cancel: CancellationToken) -> Result<()> {
        // Coarse-grained: once the run starts it goes to completion rather
        // than leaving the catalog half-migrated.
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        self.migrator.run(&self.pool).await.map_err(|e| {
            error!("Failed to apply migrations: {e}");
            Error::from(e)
        })
    }
}
