pub mod memory;
pub mod tenant;

pub use memory::InMemoryTenantDirectory;
pub use tenant::PgTenantDirectory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{TenantId, TenantRecord};
use crate::Result;

/// Durable store of tenant records, backed by the shared catalog database.
///
/// Invariant: at most one record per id. `try_add` on an existing id is a
/// defined no-op (`Ok(false)`), never an error, which is what makes
/// lookup-before-insert seeding idempotent.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Materialized snapshot of every registered tenant, in a stable order.
    /// The bootstrapper reads this once per run; additions made while the
    /// run is in flight are not observed until the next run.
    async fn get_all(&self) -> Result<Vec<TenantRecord>>;

    /// Lookup by id. A miss is `Ok(None)`, not an error.
    async fn try_get(&self, id: &TenantId) -> Result<Option<TenantRecord>>;

    /// Insert if absent. Returns `Ok(false)` when the id is already present.
    async fn try_add(&self, record: &TenantRecord) -> Result<bool>;

    /// Adjust a tenant's validity window, the only permitted mutation.
    async fn set_validity(
        &self,
        id: &TenantId,
        valid_until: Option<DateTime<Utc>>,
    ) -> Result<TenantRecord>;
}
