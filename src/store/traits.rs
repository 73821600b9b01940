use super::types::{ArrayEntry, ChatPair, Project, ProjectFilter, UserRecord};
use std::future::Future;
use std::pin::Pin;

/// Outcome of inserting a project record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectInsert {
    Inserted,
    /// A project with the same `(owner_api_key, project_name)` already exists.
    AlreadyExists,
}

/// Document-store boundary.
///
/// Every array mutation is a single atomic operation on the backing store:
/// concurrent pushes never lose entries and the returned count is the number
/// of projects the filter matched (0 or 1).
pub trait DocumentStore: Send + Sync {
    fn name(&self) -> &str;

    fn insert_user<'a>(
        &'a self,
        user: &'a UserRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

    /// Record that `api_key` owns `project_id`. Returns the matched user count.
    fn link_project_to_user<'a>(
        &'a self,
        api_key: &'a str,
        project_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<u64>> + Send + 'a>>;

    fn insert_project<'a>(
        &'a self,
        project: &'a Project,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ProjectInsert>> + Send + 'a>>;

    fn find_project<'a>(
        &'a self,
        filter: ProjectFilter<'a>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Project>>> + Send + 'a>>;

    fn push_to_array<'a>(
        &'a self,
        filter: ProjectFilter<'a>,
        entry: &'a ArrayEntry,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<u64>> + Send + 'a>>;

    /// Push only while the target array still holds exactly `expected_len`
    /// entries. Returns 0 when the project is missing or the length moved.
    fn push_if_len<'a>(
        &'a self,
        filter: ProjectFilter<'a>,
        entry: &'a ArrayEntry,
        expected_len: usize,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<u64>> + Send + 'a>>;

    /// Last `limit` chat pairs in chronological order, `None` if the project
    /// does not exist.
    fn recent_chats<'a>(
        &'a self,
        filter: ProjectFilter<'a>,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Vec<ChatPair>>>> + Send + 'a>>;
}
