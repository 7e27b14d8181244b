//! Tenant directory backed by the shared catalog database

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::debug;

use crate::models::{TenantId, TenantRecord};
use crate::{Error, Result};

use super::TenantDirectory;

/// Postgres-backed [`TenantDirectory`]
#[derive(Clone)]
pub struct PgTenantDirectory {
    pool: PgPool,
}

impl PgTenantDirectory {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the catalog pool
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_record(&self, row: PgRow) -> Result<TenantRecord> {
        Ok(TenantRecord {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            connection_string: row.try_get("connection_string")?,
            admin_email: row.try_get("admin_email")?,
            valid_from: row.try_get("valid_from")?,
            valid_until: row.try_get("valid_until")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl TenantDirectory for PgTenantDirectory {
    async fn get_all(&self) -> Result<Vec<TenantRecord>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, connection_string, admin_email, valid_from, valid_until, created_at, updated_at
            FROM tenants
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let records: Result<Vec<_>> = rows
            .into_iter()
            .map(|row| self.row_to_record(row))
            .collect();

        let records = records?;
        debug!("Retrieved {} tenant records", records.len());
        Ok(records)
    }

    async fn try_get(&self, id: &TenantId) -> Result<Option<TenantRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, name, connection_string, admin_email, valid_from, valid_until, created_at, updated_at
            FROM tenants
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.row_to_record(row)?)),
            None => Ok(None),
        }
    }

    async fn try_add(&self, record: &TenantRecord) -> Result<bool> {
        // ON CONFLICT DO NOTHING makes the insert race-free: whichever
        // writer loses still gets a defined `false`, not an error.
        let result = sqlx::query(
            r"
            INSERT INTO tenants (id, name, connection_string, admin_email, valid_from, valid_until, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO NOTHING
            ",
        )
        .bind(record.id.as_str())
        .bind(&record.name)
        .bind(&record.connection_string)
        .bind(&record.admin_email)
        .bind(record.valid_from)
        .bind(record.valid_until)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        let inserted = result.rows_affected() == 1;
        if inserted {
            debug!(tenant = %record.id, "Registered tenant");
        } else {
            debug!(tenant = %record.id, "Tenant already registered");
        }
        Ok(inserted)
    }

    async fn set_validity(
        &self,
        id: &TenantId,
        valid_until: Option<DateTime<Utc>>,
    ) -> Result<TenantRecord> {
        let row = sqlx::query(
            r"
            UPDATE tenants
            SET valid_until = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, name, connection_string, admin_email, valid_from, valid_until, created_at, updated_at
            ",
        )
        .bind(valid_until)
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => self.row_to_record(row),
            None => Err(Error::NotFound(format!("Tenant '{id}' is not registered"))),
        }
    }
}
