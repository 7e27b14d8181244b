//! In-memory tenant directory
//!
//! Preserves insertion order, which gives tests a deterministic iteration
//! order to assert against. Useful for embedded hosts and as the directory
//! double in the bootstrap tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::models::{TenantId, TenantRecord};
use crate::{Error, Result};

use super::TenantDirectory;

#[derive(Default)]
pub struct InMemoryTenantDirectory {
    records: Mutex<Vec<TenantRecord>>,
}

impl InMemoryTenantDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated directory, in the given order.
    #[must_use]
    pub fn with_records(records: Vec<TenantRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl TenantDirectory for InMemoryTenantDirectory {
    async fn get_all(&self) -> Result<Vec<TenantRecord>> {
        Ok(self.records.lock().clone())
    }

    async fn try_get(&self, id: &TenantId) -> Result<Option<TenantRecord>> {
        Ok(self.records.lock().iter().find(|r| &r.id == id).cloned())
    }

    async fn try_add(&self, record: &TenantRecord) -> Result<bool> {
        let mut records = self.records.lock();
        if records.iter().any(|r| r.id == record.id) {
            return Ok(false);
        }
        records.push(record.clone());
        Ok(true)
    }

    async fn set_validity(
        &self,
        id: &TenantId,
        valid_until: Option<DateTime<Utc>>,
    ) -> Result<TenantRecord> {
        let mut records = self.records.lock();
        match records.iter_mut().find(|r| &r.id == id) {
            Some(record) => {
                record.set_validity(valid_until);
                Ok(record.clone())
            }
            None => Err(Error::NotFound(format!("Tenant '{id}' is not registered"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TenantFixture;

    #[tokio::test]
    async fn test_try_add_is_idempotent() {
        let directory = InMemoryTenantDirectory::new();
        let tenant = TenantFixture::new().with_id("acme").build();

        assert!(directory.try_add(&tenant).await.expect("first add"));
        assert!(!directory.try_add(&tenant).await.expect("second add"));
        assert_eq!(directory.len(), 1);
    }

    #[tokio::test]
    async fn test_get_all_preserves_insertion_order() {
        let directory = InMemoryTenantDirectory::new();
        for id in ["c", "a", "b"] {
            let tenant = TenantFixture::new().with_id(id).build();
            directory.try_add(&tenant).await.expect("add");
        }

        let ids: Vec<_> = directory
            .get_all()
            .await
            .expect("snapshot")
            .into_iter()
            .map(|r| r.id.as_str().to_string())
            .collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_set_validity_mutates_only_the_window() {
        let directory = InMemoryTenantDirectory::new();
        let tenant = TenantFixture::new().with_id("acme").build();
        directory.try_add(&tenant).await.expect("add");

        let until = Utc::now() + chrono::Duration::days(7);
        let updated = directory
            .set_validity(&TenantId::from("acme"), Some(until))
            .await
            .expect("update");

        assert_eq!(updated.valid_until, Some(until));
        assert_eq!(updated.name, tenant.name);

        let missing = directory
            .set_validity(&TenantId::from("ghost"), None)
            .await;
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }
}
