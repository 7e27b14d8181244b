pub mod id;
pub mod tenant;

pub use id::TenantId;
pub use tenant::{
    ConnectionString, TenantRecord, ROOT_ADMIN_EMAIL, ROOT_TENANT_ID, ROOT_TENANT_NAME,
};
