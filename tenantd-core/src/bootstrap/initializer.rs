//! Tenant bootstrapper
//!
//! Drives the startup sequence: migrate the shared catalog, seed the root
//! tenant, then walk a snapshot of the directory and initialize each tenant
//! inside its own context scope. Safe to run repeatedly.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::BootstrapConfig;
use crate::context::TenantContext;
use crate::migrator::{SchemaMigrator, SqlxMigrator};
use crate::models::{ConnectionString, TenantId, TenantRecord};
use crate::repository::{PgTenantDirectory, TenantDirectory};
use crate::{Config, Error, Result};

use super::root::seed_root_tenant;

/// One tenant's application-level initialization (schema + seed), opaque to
/// the bootstrapper. Executed with [`TenantContext`] already pointing at the
/// target tenant, so the implementation picks its connection from there.
#[async_trait]
pub trait TenantUnitOfWork: Send + Sync {
    async fn run(&self, cancel: CancellationToken) -> Result<()>;
}

/// Knobs for the per-tenant walk.
#[derive(Debug, Clone)]
pub struct BootstrapPolicy {
    /// Skip tenants whose validity window has closed. Defaults to false:
    /// every listed tenant is initialized regardless of validity.
    pub skip_inactive: bool,
    /// Validity granted to the root tenant when first seeded.
    pub root_validity_days: u32,
}

impl Default for BootstrapPolicy {
    fn default() -> Self {
        Self {
            skip_inactive: false,
            root_validity_days: 365,
        }
    }
}

impl From<&BootstrapConfig> for BootstrapPolicy {
    fn from(config: &BootstrapConfig) -> Self {
        Self {
            skip_inactive: config.skip_inactive,
            root_validity_days: config.root_validity_days,
        }
    }
}

/// A single tenant's failure, reported but never fatal to the run.
#[derive(Debug, Clone)]
pub struct TenantFailure {
    pub tenant_id: TenantId,
    pub reason: String,
}

/// Outcome of one bootstrap pass.
///
/// Per-tenant failures are collected here rather than propagated: one
/// misconfigured tenant must not block the rest of the fleet. The run itself
/// only fails on configuration, catalog-migration or root-seeding errors.
#[derive(Debug, Clone, Default)]
pub struct BootstrapSummary {
    /// Tenants whose unit of work was invoked (success or failure).
    pub processed: usize,
    /// Tenants skipped by the inactive policy.
    pub skipped: usize,
    pub failures: Vec<TenantFailure>,
}

impl BootstrapSummary {
    /// True when every processed tenant initialized successfully.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Orchestrates the end-to-end startup sequence.
pub struct TenantBootstrapper {
    catalog_migrator: Arc<dyn SchemaMigrator>,
    directory: Arc<dyn TenantDirectory>,
    unit_of_work: Arc<dyn TenantUnitOfWork>,
    root_connection: ConnectionString,
    policy: BootstrapPolicy,
}

impl TenantBootstrapper {
    /// Build a bootstrapper from its collaborators.
    ///
    /// The root connection string is the catalog descriptor from external
    /// configuration; an empty one is a fatal configuration error, raised
    /// here before any migration attempt.
    pub fn new(
        catalog_migrator: Arc<dyn SchemaMigrator>,
        directory: Arc<dyn TenantDirectory>,
        unit_of_work: Arc<dyn TenantUnitOfWork>,
        root_connection: ConnectionString,
    ) -> Result<Self> {
        if root_connection.is_empty() {
            return Err(Error::Configuration(
                "Catalog connection string is not configured".to_string(),
            ));
        }

        Ok(Self {
            catalog_migrator,
            directory,
            unit_of_work,
            root_connection,
            policy: BootstrapPolicy::default(),
        })
    }

    /// Wire the standard Postgres collaborators onto a catalog pool.
    pub fn from_catalog(
        pool: PgPool,
        config: &Config,
        unit_of_work: Arc<dyn TenantUnitOfWork>,
    ) -> Result<Self> {
        let bootstrapper = Self::new(
            Arc::new(SqlxMigrator::catalog(pool.clone())),
            Arc::new(PgTenantDirectory::new(pool)),
            unit_of_work,
            config.database.url.clone(),
        )?;
        Ok(bootstrapper.with_policy(BootstrapPolicy::from(&config.bootstrap)))
    }

    #[must_use]
    pub fn with_policy(mut self, policy: BootstrapPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run the full startup sequence. Idempotent: a second run finds the
    /// catalog migrated and the root tenant present and does no extra writes.
    ///
    /// Cancellation is checked between tenants; a tenant whose unit of work
    /// has started runs to completion so no tenant is left half-migrated.
    pub async fn initialize_all(&self, cancel: CancellationToken) -> Result<BootstrapSummary> {
        self.migrate_catalog(cancel.clone()).await?;

        seed_root_tenant(
            self.directory.as_ref(),
            &self.root_connection,
            self.policy.root_validity_days,
        )
        .await?;

        // Snapshot once: tenants registered while the walk is in flight are
        // picked up by the next run, never by this one.
        let tenants = self.directory.get_all().await?;
        info!(tenants = tenants.len(), "Starting per-tenant initialization");

        let mut summary = BootstrapSummary::default();
        for tenant in tenants {
            if cancel.is_cancelled() {
                warn!(
                    processed = summary.processed,
                    failed = summary.failures.len(),
                    "Bootstrap cancelled between tenants"
                );
                return Err(Error::Cancelled);
            }

            if self.policy.skip_inactive && !tenant.is_active() {
                debug!(tenant = %tenant.id, "Skipping inactive tenant");
                summary.skipped += 1;
                continue;
            }

            self.initialize_tenant(tenant, cancel.clone(), &mut summary)
                .await;
        }

        if summary.is_complete() {
            info!(
                processed = summary.processed,
                skipped = summary.skipped,
                "Tenant bootstrap complete"
            );
        } else {
            warn!(
                processed = summary.processed,
                failed = summary.failures.len(),
                "Tenant bootstrap finished with failures"
            );
        }

        Ok(summary)
    }

    async fn migrate_catalog(&self, cancel: CancellationToken) -> Result<()> {
        if self.catalog_migrator.has_pending_migrations().await? {
            info!("Applying catalog migrations");
            self.catalog_migrator.apply_migrations(cancel).await?;
            info!("Catalog migrations applied");
        } else {
            debug!("Catalog schema is up to date");
        }
        Ok(())
    }

    /// Run one tenant's unit of work inside its own context scope.
    ///
    /// The scope closes when the unit of work returns, success or failure,
    /// so the next tenant always starts with a clean slot.
    async fn initialize_tenant(
        &self,
        tenant: TenantRecord,
        cancel: CancellationToken,
        summary: &mut BootstrapSummary,
    ) {
        let tenant_id = tenant.id.clone();
        debug!(tenant = %tenant_id, "Initializing tenant database");

        let unit_of_work = Arc::clone(&self.unit_of_work);
        let result = TenantContext::scope(tenant, async move {
            unit_of_work.run(cancel).await
        })
        .await;

        summary.processed += 1;
        match result {
            Ok(()) => debug!(tenant = %tenant_id, "Tenant initialized"),
            Err(e) => {
                error!(tenant = %tenant_id, error = %e, "Tenant initialization failed, continuing with remaining tenants");
                summary.failures.push(TenantFailure {
                    tenant_id,
                    reason: e.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrator::MockSchemaMigrator;
    use crate::repository::InMemoryTenantDirectory;

    struct NoopUnitOfWork;

    #[async_trait]
    impl TenantUnitOfWork for NoopUnitOfWork {
        async fn run(&self, _cancel: CancellationToken) -> Result<()> {
            Ok(())
        }
    }

    fn catalog_conn() -> ConnectionString {
        ConnectionString::from("postgres://catalog-db/catalog")
    }

    #[tokio::test]
    async fn test_empty_root_connection_is_a_configuration_error() {
        let result = TenantBootstrapper::new(
            Arc::new(MockSchemaMigrator::new()),
            Arc::new(InMemoryTenantDirectory::new()),
            Arc::new(NoopUnitOfWork),
            ConnectionString::from(""),
        );

        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[tokio::test]
    async fn test_apply_is_skipped_when_nothing_pending() {
        let mut migrator = MockSchemaMigrator::new();
        migrator
            .expect_has_pending_migrations()
            .times(1)
            .returning(|| Ok(false));
        migrator.expect_apply_migrations().times(0);

        let bootstrapper = TenantBootstrapper::new(
            Arc::new(migrator),
            Arc::new(InMemoryTenantDirectory::new()),
            Arc::new(NoopUnitOfWork),
            catalog_conn(),
        )
        .expect("bootstrapper");

        let summary = bootstrapper
            .initialize_all(CancellationToken::new())
            .await
            .expect("run succeeds");
        // The freshly seeded root tenant is itself initialized.
        assert_eq!(summary.processed, 1);
        assert!(summary.is_complete());
    }

    #[tokio::test]
    async fn test_catalog_migration_failure_is_fatal() {
        let mut migrator = MockSchemaMigrator::new();
        migrator
            .expect_has_pending_migrations()
            .returning(|| Ok(true));
        migrator
            .expect_apply_migrations()
            .returning(|_| Err(Error::Migration("relation is locked".to_string())));

        let directory = Arc::new(InMemoryTenantDirectory::new());
        let bootstrapper = TenantBootstrapper::new(
            Arc::new(migrator),
            directory.clone(),
            Arc::new(NoopUnitOfWork),
            catalog_conn(),
        )
        .expect("bootstrapper");

        let result = bootstrapper.initialize_all(CancellationToken::new()).await;
        assert!(matches!(result, Err(Error::Migration(_))));
        // Root seeding never ran: the system cannot proceed without a catalog.
        assert!(directory.is_empty());
    }
}
