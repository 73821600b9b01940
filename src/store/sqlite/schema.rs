use anyhow::Context;
use sqlx::SqlitePool;

const SCHEMA_META_TABLE: &str = "
CREATE TABLE IF NOT EXISTS strandkeep_schema_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
)";
const SCHEMA_VERSION_KEY: &str = "document_schema_version";
const SCHEMA_VERSION: u32 = 1;

pub(super) async fn init_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::raw_sql(
        "CREATE TABLE IF NOT EXISTS users (
            api_key     TEXT PRIMARY KEY,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS user_projects (
            api_key     TEXT NOT NULL REFERENCES users(api_key),
            project_id  TEXT NOT NULL,
            seq         INTEGER NOT NULL,
            PRIMARY KEY (api_key, seq)
        );

        CREATE TABLE IF NOT EXISTS projects (
            project_id     TEXT PRIMARY KEY,
            owner_api_key  TEXT NOT NULL,
            project_name   TEXT NOT NULL,
            created_at     TEXT NOT NULL,
            UNIQUE (owner_api_key, project_name)
        );

        -- Append-only array fields of a project (memory_strands, summaries,
        -- chat_history). seq is dense per (project_id, field) starting at 0.
        CREATE TABLE IF NOT EXISTS project_entries (
            project_id  TEXT NOT NULL REFERENCES projects(project_id),
            field       TEXT NOT NULL,
            seq         INTEGER NOT NULL,
            payload     TEXT NOT NULL,
            PRIMARY KEY (project_id, field, seq)
        );",
    )
    .execute(pool)
    .await
    .context("create document store tables")?;

    ensure_schema_version(pool).await
}

async fn ensure_schema_version(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(SCHEMA_META_TABLE)
        .execute(pool)
        .await
        .context("create schema meta table")?;

    let stored: Option<(String,)> =
        sqlx::query_as("SELECT value FROM strandkeep_schema_meta WHERE key = ?1")
            .bind(SCHEMA_VERSION_KEY)
            .fetch_optional(pool)
            .await
            .context("load document schema version")?;

    if let Some((value,)) = stored {
        let parsed = value
            .parse::<u32>()
            .with_context(|| format!("invalid document schema version value: {value}"))?;
        anyhow::ensure!(
            parsed == SCHEMA_VERSION,
            "incompatible document schema version: stored={parsed}, expected={SCHEMA_VERSION}"
        );
        return Ok(());
    }

    sqlx::query("INSERT INTO strandkeep_schema_meta (key, value) VALUES (?1, ?2)")
        .bind(SCHEMA_VERSION_KEY)
        .bind(SCHEMA_VERSION.to_string())
        .execute(pool)
        .await
        .context("persist document schema version")?;

    Ok(())
}
