//! Database connection pool, migrations, and health check.
//!
//! Postgres plays the document store: one `documents` table keyed by UUID,
//! partitioned by collection name, with a JSONB body.

pub mod documents;

use crate::error::{Error, Result};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

/// Database handle. Owns the connection pool shared across all handlers.
pub struct Db {
    pool: PgPool,
}

impl Db {
    /// Build a pool without opening a connection.
    ///
    /// Connections are made on first use, so the server can start while the
    /// database is down and report it through diagnostics instead.
    /// `database` overrides the database named in `url`.
    pub fn connect_lazy(url: &str, database: Option<&str>, max_connections: u32) -> Result<Self> {
        let mut options: PgConnectOptions = url.parse()?;
        if let Some(name) = database {
            options = options.database(name);
        }
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy_with(options);
        Ok(Self { pool })
    }

    /// Run all pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Other(format!("migration failed: {e}")))?;
        Ok(())
    }

    /// Simple health check: run a SELECT 1.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }
}
