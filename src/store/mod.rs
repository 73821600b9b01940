pub mod sqlite;
pub mod traits;
pub mod types;
pub mod validate;

pub use sqlite::{SqliteDocumentStore, open_pool};
pub use traits::{DocumentStore, ProjectInsert};
pub use types::{
    ArrayEntry, ChatPair, MemoryStrand, Project, ProjectArray, ProjectFilter, SummaryRevision,
    UserRecord,
};

use crate::error::{Result, StrandError, ValidationError};
use chrono::Utc;
use std::sync::Arc;
use validate::{API_KEY_PREFIX, validate_content, validate_target};

/// Typed project operations over a [`DocumentStore`].
///
/// Validates identifiers and content before touching the store; every
/// mutation targets exactly one project by `(owner_api_key, project_name)`.
#[derive(Clone)]
pub struct ProjectStore {
    docs: Arc<dyn DocumentStore>,
}

impl ProjectStore {
    pub fn new(docs: Arc<dyn DocumentStore>) -> Self {
        Self { docs }
    }

    pub fn backend_name(&self) -> &str {
        self.docs.name()
    }

    /// Issue and persist a fresh API key.
    pub async fn issue_api_key(&self) -> Result<String> {
        let user = UserRecord {
            api_key: format!("{API_KEY_PREFIX}{}", uuid::Uuid::new_v4()),
            created_at: Utc::now(),
        };
        self.docs
            .insert_user(&user)
            .await
            .map_err(StrandError::store)?;
        tracing::info!("issued new API key");
        Ok(user.api_key)
    }

    /// Create a project with one empty summary revision; returns its id.
    pub async fn create_project(&self, api_key: &str, project_name: &str) -> Result<String> {
        validate_target(api_key, project_name)?;

        let project = Project::fresh(uuid::Uuid::new_v4().to_string(), api_key, project_name);
        match self
            .docs
            .insert_project(&project)
            .await
            .map_err(StrandError::store)?
        {
            ProjectInsert::Inserted => {}
            ProjectInsert::AlreadyExists => return Err(StrandError::Duplicate),
        }

        let linked = self
            .docs
            .link_project_to_user(api_key, &project.project_id)
            .await
            .map_err(StrandError::store)?;
        if linked == 0 {
            tracing::debug!(project_name, "project owner has no user record to link");
        }

        tracing::info!(project_name, project_id = %project.project_id, "project created");
        Ok(project.project_id)
    }

    pub async fn append_chat(
        &self,
        api_key: &str,
        project_name: &str,
        user_message: &str,
        assistant_message: &str,
    ) -> Result<u64> {
        validate_target(api_key, project_name)?;
        let user = validate_content("User message", user_message)?;
        let assistant = validate_content("Assistant message", assistant_message)?;

        let entry = ArrayEntry::Chat(ChatPair::new(user, assistant));
        self.push(api_key, project_name, &entry).await
    }

    pub async fn append_fact(&self, api_key: &str, project_name: &str, text: &str) -> Result<u64> {
        validate_target(api_key, project_name)?;
        let content = validate_content("Memory strand", text)?;

        let entry = ArrayEntry::MemoryStrand(MemoryStrand {
            content: content.to_string(),
            timestamp: Utc::now(),
        });
        self.push(api_key, project_name, &entry).await
    }

    pub async fn append_summary(
        &self,
        api_key: &str,
        project_name: &str,
        text: &str,
    ) -> Result<u64> {
        validate_target(api_key, project_name)?;
        let summary = validate_content("Summary text", text)?;

        self.push(api_key, project_name, &summary_entry(summary))
            .await
    }

    /// Append a summary revision only if the project still holds exactly
    /// `expected_revisions` revisions. `Ok(false)` means another writer won.
    pub async fn append_summary_if_revision(
        &self,
        api_key: &str,
        project_name: &str,
        expected_revisions: usize,
        text: &str,
    ) -> Result<bool> {
        validate_target(api_key, project_name)?;
        let summary = validate_content("Summary text", text)?;
        let filter = ProjectFilter::new(api_key, project_name);

        let matched = self
            .docs
            .push_if_len(filter, &summary_entry(summary), expected_revisions)
            .await
            .map_err(StrandError::store)?;
        if matched > 0 {
            return Ok(true);
        }

        // Either the project is gone or the revision count moved.
        match self.docs.find_project(filter).await.map_err(StrandError::store)? {
            Some(_) => Ok(false),
            None => Err(StrandError::project_not_found()),
        }
    }

    pub async fn get_project(&self, api_key: &str, project_name: &str) -> Result<Project> {
        validate_target(api_key, project_name)?;
        self.docs
            .find_project(ProjectFilter::new(api_key, project_name))
            .await
            .map_err(StrandError::store)?
            .ok_or_else(StrandError::project_not_found)
    }

    /// Last `limit` chats, oldest first. Empty when the project has none.
    pub async fn recent_chats(
        &self,
        api_key: &str,
        project_name: &str,
        limit: usize,
    ) -> Result<Vec<ChatPair>> {
        validate_target(api_key, project_name)?;
        if limit == 0 {
            return Err(ValidationError::Limit.into());
        }
        self.docs
            .recent_chats(ProjectFilter::new(api_key, project_name), limit)
            .await
            .map_err(StrandError::store)?
            .ok_or_else(StrandError::project_not_found)
    }

    async fn push(&self, api_key: &str, project_name: &str, entry: &ArrayEntry) -> Result<u64> {
        let matched = self
            .docs
            .push_to_array(ProjectFilter::new(api_key, project_name), entry)
            .await
            .map_err(StrandError::store)?;
        if matched == 0 {
            return Err(StrandError::project_not_found());
        }
        Ok(matched)
    }
}

fn summary_entry(summary: &str) -> ArrayEntry {
    ArrayEntry::Summary(SummaryRevision {
        summary: summary.to_string(),
        timestamp: Utc::now(),
    })
}
