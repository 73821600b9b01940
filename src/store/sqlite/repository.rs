use super::codec;
use crate::store::traits::ProjectInsert;
use crate::store::types::{ArrayEntry, ChatPair, Project, ProjectArray, ProjectFilter, UserRecord};
use anyhow::Context;
use sqlx::SqlitePool;

// Appends are a single INSERT .. SELECT: the write lock is taken before the
// next seq is computed, so concurrent pushes serialize instead of colliding.
const PUSH_ENTRY_SQL: &str = "
INSERT INTO project_entries (project_id, field, seq, payload)
SELECT p.project_id,
       ?3,
       (SELECT COALESCE(MAX(e.seq), -1) + 1
          FROM project_entries e
         WHERE e.project_id = p.project_id AND e.field = ?3),
       ?4
  FROM projects p
 WHERE p.owner_api_key = ?1 AND p.project_name = ?2";

const PUSH_ENTRY_IF_LEN_SQL: &str = "
INSERT INTO project_entries (project_id, field, seq, payload)
SELECT p.project_id,
       ?3,
       (SELECT COALESCE(MAX(e.seq), -1) + 1
          FROM project_entries e
         WHERE e.project_id = p.project_id AND e.field = ?3),
       ?4
  FROM projects p
 WHERE p.owner_api_key = ?1 AND p.project_name = ?2
   AND (SELECT COUNT(*)
          FROM project_entries e
         WHERE e.project_id = p.project_id AND e.field = ?3) = ?5";

pub(super) async fn insert_user(pool: &SqlitePool, user: &UserRecord) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO users (api_key, created_at) VALUES (?1, ?2)")
        .bind(&user.api_key)
        .bind(user.created_at.to_rfc3339())
        .execute(pool)
        .await
        .context("insert user record")?;
    Ok(())
}

pub(super) async fn link_project_to_user(
    pool: &SqlitePool,
    api_key: &str,
    project_id: &str,
) -> anyhow::Result<u64> {
    let done = sqlx::query(
        "INSERT INTO user_projects (api_key, project_id, seq)
         SELECT u.api_key,
                ?2,
                (SELECT COUNT(*) FROM user_projects up WHERE up.api_key = u.api_key)
           FROM users u
          WHERE u.api_key = ?1",
    )
    .bind(api_key)
    .bind(project_id)
    .execute(pool)
    .await
    .context("link project to user")?;
    Ok(done.rows_affected())
}

pub(super) async fn insert_project(
    pool: &SqlitePool,
    project: &Project,
) -> anyhow::Result<ProjectInsert> {
    let mut tx = pool.begin().await.context("begin project insert")?;

    let inserted = sqlx::query(
        "INSERT INTO projects (project_id, owner_api_key, project_name, created_at)
         VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(&project.project_id)
    .bind(&project.owner_api_key)
    .bind(&project.project_name)
    .bind(project.created_at.to_rfc3339())
    .execute(&mut *tx)
    .await;

    match inserted {
        Ok(_) => {}
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Ok(ProjectInsert::AlreadyExists);
        }
        Err(error) => return Err(error).context("insert project record"),
    }

    let entries = project
        .memory_strands
        .iter()
        .cloned()
        .map(ArrayEntry::MemoryStrand)
        .chain(project.summaries.iter().cloned().map(ArrayEntry::Summary))
        .chain(project.chat_history.iter().cloned().map(ArrayEntry::Chat));

    let mut next_seq = [0_i64; 3];
    for entry in entries {
        let slot = match entry.field() {
            ProjectArray::MemoryStrands => 0,
            ProjectArray::Summaries => 1,
            ProjectArray::ChatHistory => 2,
        };
        sqlx::query(
            "INSERT INTO project_entries (project_id, field, seq, payload)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&project.project_id)
        .bind(entry.field().as_str())
        .bind(next_seq[slot])
        .bind(codec::encode_entry(&entry)?)
        .execute(&mut *tx)
        .await
        .context("insert initial project entry")?;
        next_seq[slot] += 1;
    }

    tx.commit().await.context("commit project insert")?;
    Ok(ProjectInsert::Inserted)
}

pub(super) async fn find_project(
    pool: &SqlitePool,
    filter: ProjectFilter<'_>,
) -> anyhow::Result<Option<Project>> {
    let row: Option<(String, String, String, String)> = sqlx::query_as(
        "SELECT project_id, owner_api_key, project_name, created_at
           FROM projects
          WHERE owner_api_key = ?1 AND project_name = ?2",
    )
    .bind(filter.owner_api_key)
    .bind(filter.project_name)
    .fetch_optional(pool)
    .await
    .context("load project record")?;

    let Some((project_id, owner_api_key, project_name, created_at)) = row else {
        return Ok(None);
    };

    let mut project = Project {
        created_at: codec::parse_timestamp(&created_at)?,
        project_id,
        owner_api_key,
        project_name,
        memory_strands: Vec::new(),
        summaries: Vec::new(),
        chat_history: Vec::new(),
    };

    let entries: Vec<(String, String)> = sqlx::query_as(
        "SELECT field, payload
           FROM project_entries
          WHERE project_id = ?1
          ORDER BY field, seq",
    )
    .bind(&project.project_id)
    .fetch_all(pool)
    .await
    .context("load project entries")?;

    for (field, payload) in entries {
        match codec::parse_field(&field) {
            Some(ProjectArray::MemoryStrands) => {
                project.memory_strands.push(codec::decode_strand(&payload)?);
            }
            Some(ProjectArray::Summaries) => {
                project.summaries.push(codec::decode_summary(&payload)?);
            }
            Some(ProjectArray::ChatHistory) => {
                project.chat_history.push(codec::decode_chat(&payload)?);
            }
            None => {
                tracing::warn!(field = %field, project_id = %project.project_id, "skipping unknown project entry field");
            }
        }
    }

    Ok(Some(project))
}

pub(super) async fn push_to_array(
    pool: &SqlitePool,
    filter: ProjectFilter<'_>,
    entry: &ArrayEntry,
) -> anyhow::Result<u64> {
    let payload = codec::encode_entry(entry)?;
    let done = sqlx::query(PUSH_ENTRY_SQL)
        .bind(filter.owner_api_key)
        .bind(filter.project_name)
        .bind(entry.field().as_str())
        .bind(payload)
        .execute(pool)
        .await
        .with_context(|| format!("push {} entry", entry.field().as_str()))?;
    Ok(done.rows_affected())
}

pub(super) async fn push_if_len(
    pool: &SqlitePool,
    filter: ProjectFilter<'_>,
    entry: &ArrayEntry,
    expected_len: usize,
) -> anyhow::Result<u64> {
    let payload = codec::encode_entry(entry)?;
    let expected = i64::try_from(expected_len).context("expected length out of range")?;
    let done = sqlx::query(PUSH_ENTRY_IF_LEN_SQL)
        .bind(filter.owner_api_key)
        .bind(filter.project_name)
        .bind(entry.field().as_str())
        .bind(payload)
        .bind(expected)
        .execute(pool)
        .await
        .with_context(|| format!("conditional push {} entry", entry.field().as_str()))?;
    Ok(done.rows_affected())
}

pub(super) async fn recent_chats(
    pool: &SqlitePool,
    filter: ProjectFilter<'_>,
    limit: usize,
) -> anyhow::Result<Option<Vec<ChatPair>>> {
    let project: Option<(String,)> = sqlx::query_as(
        "SELECT project_id FROM projects WHERE owner_api_key = ?1 AND project_name = ?2",
    )
    .bind(filter.owner_api_key)
    .bind(filter.project_name)
    .fetch_optional(pool)
    .await
    .context("look up project for recent chats")?;

    let Some((project_id,)) = project else {
        return Ok(None);
    };

    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let payloads: Vec<(String,)> = sqlx::query_as(
        "SELECT payload
           FROM project_entries
          WHERE project_id = ?1 AND field = ?2
          ORDER BY seq DESC
          LIMIT ?3",
    )
    .bind(&project_id)
    .bind(ProjectArray::ChatHistory.as_str())
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("load recent chats")?;

    let mut chats = payloads
        .iter()
        .map(|(payload,)| codec::decode_chat(payload))
        .collect::<anyhow::Result<Vec<_>>>()?;
    chats.reverse();
    Ok(Some(chats))
}
