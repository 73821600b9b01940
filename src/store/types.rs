use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One conversational turn: what the user said and what the assistant replied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPair {
    pub user: String,
    pub assistant: String,
}

impl ChatPair {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
        }
    }
}

/// A persisted fact ("strand") record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStrand {
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// A summary revision. The last revision of a project is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRevision {
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub api_key: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: String,
    pub owner_api_key: String,
    pub project_name: String,
    pub created_at: DateTime<Utc>,
    pub memory_strands: Vec<MemoryStrand>,
    pub summaries: Vec<SummaryRevision>,
    pub chat_history: Vec<ChatPair>,
}

impl Project {
    /// A freshly created project: no facts, no chats, one empty summary.
    pub fn fresh(
        project_id: impl Into<String>,
        owner_api_key: impl Into<String>,
        project_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            project_id: project_id.into(),
            owner_api_key: owner_api_key.into(),
            project_name: project_name.into(),
            created_at: now,
            memory_strands: Vec::new(),
            summaries: vec![SummaryRevision {
                summary: String::new(),
                timestamp: now,
            }],
            chat_history: Vec::new(),
        }
    }

    /// Text of the authoritative (most recent) summary revision, `""` if none.
    pub fn current_summary(&self) -> &str {
        self.summaries
            .last()
            .map_or("", |revision| revision.summary.as_str())
    }
}

/// Selects one project by its unique `(owner, name)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectFilter<'a> {
    pub owner_api_key: &'a str,
    pub project_name: &'a str,
}

impl<'a> ProjectFilter<'a> {
    pub const fn new(owner_api_key: &'a str, project_name: &'a str) -> Self {
        Self {
            owner_api_key,
            project_name,
        }
    }
}

/// The append-only array fields of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectArray {
    MemoryStrands,
    Summaries,
    ChatHistory,
}

impl ProjectArray {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MemoryStrands => "memory_strands",
            Self::Summaries => "summaries",
            Self::ChatHistory => "chat_history",
        }
    }
}

/// A value pushed onto one of the project's array fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayEntry {
    MemoryStrand(MemoryStrand),
    Summary(SummaryRevision),
    Chat(ChatPair),
}

impl ArrayEntry {
    pub const fn field(&self) -> ProjectArray {
        match self {
            Self::MemoryStrand(_) => ProjectArray::MemoryStrands,
            Self::Summary(_) => ProjectArray::Summaries,
            Self::Chat(_) => ProjectArray::ChatHistory,
        }
    }
}
