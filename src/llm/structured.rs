use super::scrub::sanitize_api_error;
use crate::error::GenerationError;

/// Decode a model reply that must be a JSON array of strings.
///
/// One surrounding markdown code fence is tolerated. Entries are trimmed and
/// blank entries dropped; anything that is not an array of strings fails.
pub fn parse_string_list(raw: &str) -> Result<Vec<String>, GenerationError> {
    let body = strip_code_fence(raw.trim());
    let items: Vec<String> = serde_json::from_str(body)
        .map_err(|error| GenerationError::Unparseable(format!("{error}: {}", sanitize_api_error(body))))?;

    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return text;
    };
    // Drop the info string (e.g. "json") on the opening fence line.
    match inner.split_once('\n') {
        Some((info, body)) if !info.trim_start().starts_with('[') => body.trim(),
        _ => inner.trim(),
    }
}
