use crate::error::ValidationError;

pub const API_KEY_PREFIX: &str = "rcll_";
pub const API_KEY_LEN: usize = 41;
pub const MAX_PROJECT_NAME_CHARS: usize = 100;
pub const MAX_CONTENT_CHARS: usize = 10_000;

pub fn validate_api_key(api_key: &str) -> Result<(), ValidationError> {
    if api_key.starts_with(API_KEY_PREFIX) && api_key.len() == API_KEY_LEN {
        Ok(())
    } else {
        Err(ValidationError::ApiKey)
    }
}

pub fn validate_project_name(project_name: &str) -> Result<(), ValidationError> {
    let len = project_name.chars().count();
    let charset_ok = project_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if (1..=MAX_PROJECT_NAME_CHARS).contains(&len) && charset_ok {
        Ok(())
    } else {
        Err(ValidationError::ProjectName)
    }
}

/// Validate free text and return it trimmed.
pub fn validate_content<'a>(
    field: &'static str,
    content: &'a str,
) -> Result<&'a str, ValidationError> {
    let trimmed = content.trim();
    let len = trimmed.chars().count();
    if (1..=MAX_CONTENT_CHARS).contains(&len) {
        Ok(trimmed)
    } else {
        Err(ValidationError::Content {
            field,
            max: MAX_CONTENT_CHARS,
        })
    }
}

pub fn validate_target(api_key: &str, project_name: &str) -> Result<(), ValidationError> {
    validate_api_key(api_key)?;
    validate_project_name(project_name)
}
