//! `SQLite` schema bootstrap logic.
//!
//! All table definitions use `CREATE TABLE IF NOT EXISTS` and are safe to
//! re-run on every server startup.

use sqlx::SqlitePool;

use crate::Result;

/// Apply all table definitions to the connected `SQLite` database.
///
/// # Errors
///
/// Returns `AppError::Db` if any DDL statement fails.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<()> {
    let ddl = r"
CREATE TABLE IF NOT EXISTS communication_template (
    id              TEXT PRIMARY KEY NOT NULL,
    title           TEXT NOT NULL,
    content         TEXT NOT NULL,
    category        TEXT NOT NULL,
    trigger_kind    TEXT NOT NULL CHECK(trigger_kind IN ('after_hours','common_questions','maintenance_requests','payment_inquiries','lease_questions','emergency_situations')),
    status          TEXT NOT NULL CHECK(status IN ('draft','pending','approved','rejected')),
    created_by      TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    reviewed_by     TEXT,
    reviewed_at     TEXT,
    review_comments TEXT,
    confidence      REAL NOT NULL CHECK(confidence >= 0.0 AND confidence <= 1.0)
);

CREATE INDEX IF NOT EXISTS idx_template_status ON communication_template(status);
CREATE INDEX IF NOT EXISTS idx_template_trigger ON communication_template(trigger_kind);
";

    sqlx::raw_sql(ddl).execute(pool).await?;
    Ok(())
}
