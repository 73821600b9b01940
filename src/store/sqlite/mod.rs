mod codec;
mod repository;
mod schema;

use super::traits::{DocumentStore, ProjectInsert};
use super::types::{ArrayEntry, ChatPair, Project, ProjectFilter, UserRecord};
use anyhow::Context;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::time::Duration;

pub const IN_MEMORY_DATABASE: &str = ":memory:";

/// Open (or create) the SQLite database shared by the document and vector
/// stores. `":memory:"` opens a private in-memory database on one connection.
pub async fn open_pool(database: &str) -> anyhow::Result<SqlitePool> {
    if database == IN_MEMORY_DATABASE {
        return SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("open in-memory SQLite");
    }

    let db_path = Path::new(database);
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("create database directory: {}", parent.display()))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
        .with_context(|| format!("open SQLite database: {}", db_path.display()))
}

/// SQLite-backed document store.
///
/// Projects live in one row each; their array fields are rows of
/// `project_entries` keyed by a dense per-field sequence number.
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub async fn new(pool: SqlitePool) -> anyhow::Result<Self> {
        schema::init_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn open(database: &str) -> anyhow::Result<Self> {
        Self::new(open_pool(database).await?).await
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn insert_user<'a>(
        &'a self,
        user: &'a UserRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move { repository::insert_user(&self.pool, user).await })
    }

    fn link_project_to_user<'a>(
        &'a self,
        api_key: &'a str,
        project_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<u64>> + Send + 'a>> {
        Box::pin(async move { repository::link_project_to_user(&self.pool, api_key, project_id).await })
    }

    fn insert_project<'a>(
        &'a self,
        project: &'a Project,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ProjectInsert>> + Send + 'a>> {
        Box::pin(async move { repository::insert_project(&self.pool, project).await })
    }

    fn find_project<'a>(
        &'a self,
        filter: ProjectFilter<'a>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Project>>> + Send + 'a>> {
        Box::pin(async move { repository::find_project(&self.pool, filter).await })
    }

    fn push_to_array<'a>(
        &'a self,
        filter: ProjectFilter<'a>,
        entry: &'a ArrayEntry,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<u64>> + Send + 'a>> {
        Box::pin(async move { repository::push_to_array(&self.pool, filter, entry).await })
    }

    fn push_if_len<'a>(
        &'a self,
        filter: ProjectFilter<'a>,
        entry: &'a ArrayEntry,
        expected_len: usize,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<u64>> + Send + 'a>> {
        Box::pin(async move {
            repository::push_if_len(&self.pool, filter, entry, expected_len).await
        })
    }

    fn recent_chats<'a>(
        &'a self,
        filter: ProjectFilter<'a>,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Vec<ChatPair>>>> + Send + 'a>> {
        Box::pin(async move { repository::recent_chats(&self.pool, filter, limit).await })
    }
}
