use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `Strandkeep`.
///
/// Each subsystem defines its own error variant. Callers (the HTTP gateway in
/// particular) match on these to pick a status code; boundary implementations
/// continue to use `anyhow::Result` for ad-hoc context chains and are wrapped
/// into [`StrandError::Store`] by the adapters.
#[derive(Debug, Error)]
pub enum StrandError {
    // ── Client input ────────────────────────────────────────────────────
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // ── Lookup ──────────────────────────────────────────────────────────
    #[error("{0} not found")]
    NotFound(String),

    #[error("project with this name already exists for this user")]
    Duplicate,

    // ── Language model ──────────────────────────────────────────────────
    #[error(transparent)]
    Generation(#[from] GenerationError),

    // ── Similarity store ────────────────────────────────────────────────
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    // ── Document store (wraps anyhow for interop) ───────────────────────
    #[error("store: {0}")]
    Store(#[source] anyhow::Error),

    // ── Remote service (client side) ────────────────────────────────────
    #[error("recall service error: {0}")]
    Unavailable(String),
}

impl StrandError {
    pub fn project_not_found() -> Self {
        Self::NotFound("project".into())
    }

    pub fn store(error: impl Into<anyhow::Error>) -> Self {
        Self::Store(error.into())
    }
}

// ─── Validation errors ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid API key format")]
    ApiKey,

    #[error("invalid project name. Must be 1-100 chars, alphanumeric, underscore, or hyphen only")]
    ProjectName,

    #[error("{field} must be a non-empty string with max {max} characters")]
    Content { field: &'static str, max: usize },

    #[error("{0} is required")]
    Missing(&'static str),

    #[error("limit must be a positive integer")]
    Limit,

    /// Rejection reported by a remote recall service.
    #[error("{0}")]
    Rejected(String),
}

// ─── Language-model errors ──────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("completion failed: {0}")]
    Completion(String),

    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("model output is not a list of strings: {0}")]
    Unparseable(String),
}

// ─── Retrieval errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("vector upsert failed: {0}")]
    Upsert(String),

    #[error("vector query failed: {0}")]
    Query(String),

    #[error(transparent)]
    Embedding(#[from] GenerationError),
}

pub type Result<T, E = StrandError> = std::result::Result<T, E>;
