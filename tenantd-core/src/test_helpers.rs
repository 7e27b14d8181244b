//! Test helpers and fixtures for tenantd-core tests

use crate::models::{ConnectionString, TenantId, TenantRecord};

/// Test fixture builder for TenantRecord
pub struct TenantFixture {
    id: TenantId,
    name: String,
    connection_string: ConnectionString,
    admin_email: String,
}

impl TenantFixture {
    pub fn new() -> Self {
        Self {
            id: TenantId::from("test-tenant"),
            name: "Test Tenant".to_string(),
            connection_string: ConnectionString::from("postgres://tenant-db/test"),
            admin_email: "admin@test.example".to_string(),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = TenantId::from(id);
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_connection_string(mut self, conn: &str) -> Self {
        self.connection_string = ConnectionString::from(conn);
        self
    }

    pub fn build(self) -> TenantRecord {
        TenantRecord::new(self.id, self.name, self.connection_string, self.admin_email)
            .expect("fixture record is valid")
    }
}

impl Default for TenantFixture {
    fn default() -> Self {
        Self::new()
    }
}
