pub mod bootstrap;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod migrator;
pub mod models;
pub mod repository;

#[cfg(test)]
pub mod test_helpers;

pub use bootstrap::{
    BootstrapPolicy, BootstrapSummary, TenantBootstrapper, TenantFailure, TenantUnitOfWork,
};
pub use config::Config;
pub use context::TenantContext;
pub use error::{Error, Result};
pub use migrator::SchemaMigrator;
pub use repository::TenantDirectory;
