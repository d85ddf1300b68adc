//! Versioned schema migrations, applied explicitly (`users-api migrate`) rather than on every boot.
//! All versions run in one transaction under an advisory lock so concurrent deploys serialize.

use crate::store::quote_ident;
use sqlx::PgPool;

/// Bookkeeping table, created next to the users table.
pub const MIGRATIONS_TABLE: &str = "_schema_migrations";

/// Arbitrary constant shared by every instance that migrates this service.
const MIGRATION_LOCK_KEY: i64 = 0x7573_6572_735f_6170;

pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    /// DDL template; `{schema}` is replaced with the quoted schema name.
    pub sql: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "create users",
    sql: r#"
        CREATE TABLE IF NOT EXISTS {schema}."users" (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL DEFAULT ''
        )
    "#,
}];

pub fn latest_version() -> i64 {
    MIGRATIONS.iter().map(|m| m.version).max().unwrap_or(0)
}

fn render(sql: &str, schema: &str) -> String {
    sql.replace("{schema}", &quote_ident(schema))
}

fn migrations_table(schema: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(MIGRATIONS_TABLE))
}

fn unapplied(applied: &[i64]) -> Vec<&'static Migration> {
    MIGRATIONS
        .iter()
        .filter(|m| !applied.contains(&m.version))
        .collect()
}

/// Apply every migration not yet recorded for `schema`. Idempotent; returns the versions applied.
pub async fn apply_migrations(pool: &PgPool, schema: &str) -> Result<Vec<i64>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .execute(&mut *tx)
        .await?;

    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema)))
        .execute(&mut *tx)
        .await?;
    let table = migrations_table(schema);
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            version BIGINT PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        table
    ))
    .execute(&mut *tx)
    .await?;

    let applied: Vec<i64> = sqlx::query_scalar(&format!("SELECT version FROM {}", table))
        .fetch_all(&mut *tx)
        .await?;

    let mut done = Vec::new();
    for m in unapplied(&applied) {
        tracing::info!("applying migration {} ({}) to schema {}", m.version, m.description, schema);
        sqlx::query(&render(m.sql, schema)).execute(&mut *tx).await?;
        sqlx::query(&format!("INSERT INTO {} (version, description) VALUES ($1, $2)", table))
            .bind(m.version)
            .bind(m.description)
            .execute(&mut *tx)
            .await?;
        done.push(m.version);
    }

    tx.commit().await?;
    Ok(done)
}

/// Versions not yet applied to `schema`. Read-only.
pub async fn pending_migrations(pool: &PgPool, schema: &str) -> Result<Vec<i64>, sqlx::Error> {
    let table = migrations_table(schema);
    let exists: bool = sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
        .bind(&table)
        .fetch_one(pool)
        .await?;
    let applied: Vec<i64> = if exists {
        sqlx::query_scalar(&format!("SELECT version FROM {}", table))
            .fetch_all(pool)
            .await?
    } else {
        Vec::new()
    };
    Ok(unapplied(&applied).into_iter().map(|m| m.version).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_are_strictly_increasing() {
        let versions: Vec<i64> = MIGRATIONS.iter().map(|m| m.version).collect();
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(latest_version(), *versions.last().unwrap());
    }

    #[test]
    fn render_qualifies_with_schema() {
        let sql = render(MIGRATIONS[0].sql, "tenant_a");
        assert!(sql.contains(r#""tenant_a"."users""#));
        assert!(!sql.contains("{schema}"));
    }

    #[test]
    fn unapplied_skips_recorded_versions() {
        assert_eq!(unapplied(&[]).len(), MIGRATIONS.len());
        let all: Vec<i64> = MIGRATIONS.iter().map(|m| m.version).collect();
        assert!(unapplied(&all).is_empty());
    }
}
