//! Root tenant seeding

use chrono::{Duration, Utc};
use tracing::{debug, info};

use crate::models::{
    ConnectionString, TenantId, TenantRecord, ROOT_ADMIN_EMAIL, ROOT_TENANT_ID, ROOT_TENANT_NAME,
};
use crate::repository::TenantDirectory;
use crate::Result;

/// Ensure the well-known root tenant record exists.
///
/// Idempotent by construction: lookup-before-insert, and the insert itself is
/// a `try_add` that treats an existing id as a no-op. The root tenant routes
/// to the catalog database, so its connection descriptor is the catalog
/// connection string.
pub async fn seed_root_tenant(
    directory: &dyn TenantDirectory,
    root_connection: &ConnectionString,
    validity_days: u32,
) -> Result<()> {
    if directory.try_get(&TenantId::root()).await?.is_some() {
        debug!("Root tenant already exists, skipping seed");
        return Ok(());
    }

    let mut root = TenantRecord::new(
        ROOT_TENANT_ID,
        ROOT_TENANT_NAME,
        root_connection.clone(),
        ROOT_ADMIN_EMAIL,
    )?;
    root.set_validity(Some(Utc::now() + Duration::days(i64::from(validity_days))));

    if directory.try_add(&root).await? {
        info!(tenant = ROOT_TENANT_ID, "Root tenant seeded");
    } else {
        // Another writer won the insert; either way the record exists.
        debug!("Root tenant appeared concurrently, nothing to seed");
    }

    Ok(())
}
