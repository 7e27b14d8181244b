//! Current-tenant context
//!
//! Downstream data access reads the context to pick a connection string.
//! The slot is a tokio task-local, so it is carried by the scope that set it
//! and dies with that scope. Two concurrent scopes each see their own tenant,
//! which keeps the door open for parallel initialization later without any
//! change to callers.

use std::future::Future;

use crate::models::{ConnectionString, TenantId, TenantRecord};

tokio::task_local! {
    static CURRENT_TENANT: TenantRecord;
}

/// Accessor for the scope-local "current tenant" slot.
pub struct TenantContext;

impl TenantContext {
    /// Run `f` with `tenant` as the current tenant.
    ///
    /// The binding only exists for the duration of the returned future;
    /// nested scopes shadow the outer binding and restore it on exit.
    pub async fn scope<F>(tenant: TenantRecord, f: F) -> F::Output
    where
        F: Future,
    {
        CURRENT_TENANT.scope(tenant, f).await
    }

    /// The tenant the enclosing scope was opened for, if any.
    #[must_use]
    pub fn current() -> Option<TenantRecord> {
        CURRENT_TENANT.try_with(Clone::clone).ok()
    }

    #[must_use]
    pub fn current_id() -> Option<TenantId> {
        CURRENT_TENANT.try_with(|t| t.id.clone()).ok()
    }

    /// Connection string of the current tenant, read by tenant-scoped
    /// data access to select a connection.
    #[must_use]
    pub fn current_connection_string() -> Option<ConnectionString> {
        CURRENT_TENANT.try_with(|t| t.connection_string.clone()).ok()
    }

    /// Borrowing accessor that avoids cloning the whole record.
    pub fn with_current<R>(f: impl FnOnce(&TenantRecord) -> R) -> Option<R> {
        CURRENT_TENANT.try_with(f).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TenantFixture;

    #[tokio::test]
    async fn test_no_tenant_outside_scope() {
        assert!(TenantContext::current().is_none());
        assert!(TenantContext::current_id().is_none());
    }

    #[tokio::test]
    async fn test_scope_binds_and_releases() {
        let tenant = TenantFixture::new().with_id("acme").build();

        TenantContext::scope(tenant.clone(), async {
            assert_eq!(TenantContext::current(), Some(tenant.clone()));
            assert_eq!(TenantContext::current_id(), Some(TenantId::from("acme")));
        })
        .await;

        assert!(TenantContext::current().is_none());
    }

    #[tokio::test]
    async fn test_nested_scopes_shadow_and_restore() {
        let outer = TenantFixture::new().with_id("outer").build();
        let inner = TenantFixture::new().with_id("inner").build();

        TenantContext::scope(outer.clone(), async {
            TenantContext::scope(inner, async {
                assert_eq!(TenantContext::current_id(), Some(TenantId::from("inner")));
            })
            .await;
            assert_eq!(TenantContext::current_id(), Some(TenantId::from("outer")));
        })
        .await;
    }

    #[tokio::test]
    async fn test_concurrent_scopes_are_isolated() {
        let a = TenantFixture::new().with_id("tenant-a").build();
        let b = TenantFixture::new().with_id("tenant-b").build();

        let task_a = tokio::spawn(TenantContext::scope(a, async {
            tokio::task::yield_now().await;
            TenantContext::current_id()
        }));
        let task_b = tokio::spawn(TenantContext::scope(b, async {
            tokio::task::yield_now().await;
            TenantContext::current_id()
        }));

        let (seen_a, seen_b) = tokio::join!(task_a, task_b);
        assert_eq!(seen_a.expect("task a"), Some(TenantId::from("tenant-a")));
        assert_eq!(seen_b.expect("task b"), Some(TenantId::from("tenant-b")));
    }

    #[tokio::test]
    async fn test_with_current_borrows() {
        let tenant = TenantFixture::new().with_id("acme").with_name("Acme Corp").build();

        let name = TenantContext::scope(tenant, async {
            TenantContext::with_current(|t| t.name.clone())
        })
        .await;

        assert_eq!(name.as_deref(), Some("Acme Corp"));
    }
}
