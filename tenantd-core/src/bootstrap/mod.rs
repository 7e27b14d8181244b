//! Bootstrap module for initializing the multi-tenant data layer
//!
//! This module handles:
//! - Catalog database connection and migration
//! - Configuration loading
//! - Root tenant seeding
//! - Per-tenant initialization (context scope + unit of work)

pub mod config;
pub mod database;
pub mod initializer;
pub mod lock;
pub mod root;

pub use config::load_config;
pub use database::init_catalog_pool;
pub use initializer::{
    BootstrapPolicy, BootstrapSummary, TenantBootstrapper, TenantFailure, TenantUnitOfWork,
};
pub use lock::{BootstrapLockGuard, PgBootstrapLock};
pub use root::seed_root_tenant;
