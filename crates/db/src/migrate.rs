//! Idempotent schema bootstrap.
//!
//! Applied migrations are recorded in `schema_migrations`; each pending one
//! runs in its own transaction together with its ledger row. A transaction
//! scoped advisory lock, taken before the ledger itself is created, serializes
//! concurrent starters.

use anyhow::Context;
use bookstore_kernel::Migration;
use sqlx::{PgPool, Postgres, Transaction};

/// Arbitrary key for `pg_advisory_xact_lock`, shared by every instance.
const MIGRATION_LOCK_KEY: i64 = 0x626f_6f6b_7374;

const CREATE_LEDGER: &str = r#"
    CREATE TABLE IF NOT EXISTS schema_migrations (
        module     TEXT        NOT NULL,
        id         TEXT        NOT NULL,
        applied_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (module, id)
    )
"#;

/// Apply every migration not yet recorded. Returns how many were applied.
pub async fn run_migrations(
    pool: &PgPool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    let mut tx = pool.begin().await.context("failed to open transaction")?;
    lock(&mut tx).await?;
    sqlx::query(CREATE_LEDGER)
        .execute(&mut *tx)
        .await
        .context("failed to create schema_migrations table")?;
    tx.commit()
        .await
        .context("failed to commit schema_migrations table")?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let mut tx = pool.begin().await.context("failed to open transaction")?;
        lock(&mut tx).await?;

        let already: Option<(String,)> =
            sqlx::query_as("SELECT id FROM schema_migrations WHERE module = $1 AND id = $2")
                .bind(module)
                .bind(migration.id)
                .fetch_optional(&mut *tx)
                .await
                .context("failed to read schema_migrations")?;

        if already.is_some() {
            tracing::debug!(module = %module, migration = migration.id, "migration already applied");
            continue;
        }

        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration {module}/{} failed", migration.id))?;

        sqlx::query("INSERT INTO schema_migrations (module, id) VALUES ($1, $2)")
            .bind(module)
            .bind(migration.id)
            .execute(&mut *tx)
            .await
            .context("failed to record migration")?;

        tx.commit()
            .await
            .with_context(|| format!("failed to commit migration {module}/{}", migration.id))?;

        tracing::info!(module = %module, migration = migration.id, "migration applied");
        applied += 1;
    }

    tracing::info!(applied, total = migrations.len(), "database migrations complete");
    Ok(applied)
}

/// Held until the surrounding transaction ends.
async fn lock(tx: &mut Transaction<'_, Postgres>) -> anyhow::Result<()> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .execute(&mut **tx)
        .await
        .context("failed to take migration lock")?;
    Ok(())
}
