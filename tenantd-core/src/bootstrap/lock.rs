//! Bootstrap advisory lock
//!
//! Multiple replicas of the hosting process may start against the same
//! catalog. Catalog migration and root seeding are single-writer operations,
//! so hosts running more than one replica take this Postgres advisory lock
//! around the whole bootstrap run. Single-replica deployments can skip it.

use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};
use tracing::{debug, info};

use crate::Result;

/// Advisory lock key shared by every bootstrapper instance.
const BOOTSTRAP_LOCK_KEY: i64 = 0x7465_6e61_6e74_6462; // "tenantdb"

pub struct PgBootstrapLock {
    pool: PgPool,
}

impl PgBootstrapLock {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Block until this instance holds the bootstrap lock.
    pub async fn acquire(&self) -> Result<BootstrapLockGuard> {
        let mut conn = self.pool.acquire().await?;
        debug!("Acquiring bootstrap advisory lock");
        sqlx::query("SELECT pg_advisory_lock($1)")
            .bind(BOOTSTRAP_LOCK_KEY)
            .execute(&mut *conn)
            .await?;
        info!("Bootstrap advisory lock acquired");
        Ok(BootstrapLockGuard { conn })
    }

    /// Non-blocking variant. `Ok(None)` when another instance holds the lock.
    pub async fn try_acquire(&self) -> Result<Option<BootstrapLockGuard>> {
        let mut conn = self.pool.acquire().await?;
        let (locked,): (bool,) = sqlx::query_as("SELECT pg_try_advisory_lock($1)")
            .bind(BOOTSTRAP_LOCK_KEY)
            .fetch_one(&mut *conn)
            .await?;
        Ok(locked.then_some(BootstrapLockGuard { conn }))
    }
}

/// Holds the advisory lock for as long as the guard's connection lives.
///
/// Advisory locks are session-scoped and pooled connections outlive the
/// guard, so callers must release explicitly when the bootstrap run ends.
pub struct BootstrapLockGuard {
    conn: PoolConnection<Postgres>,
}

impl BootstrapLockGuard {
    pub async fn release(mut self) -> Result<()> {
        sqlx::query("SELECT pg_advisory_unlock($1)")
            .bind(BOOTSTRAP_LOCK_KEY)
            .execute(&mut *self.conn)
            .await?;
        debug!("Bootstrap advisory lock released");
        Ok(())
    }
}
