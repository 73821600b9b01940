use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 200;
const REDACTED: &str = "[REDACTED]";

// Token prefixes of credentials this service handles: OpenAI keys, Pinecone
// keys, our own API keys, and bearer/JWT material.
const PREFIX_PATTERNS: [&str; 5] = ["sk-", "pcsk_", "rcll_", "eyJ", "AKIA"];

const MARKER_PATTERNS: [&str; 8] = [
    "Authorization: Bearer ",
    "authorization: bearer ",
    "Api-Key: ",
    "api-key: ",
    "api_key=",
    "\"api_key\":\"",
    "\"openai_key\":\"",
    "\"apiKey\":\"",
];

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '/' | '=')
}

fn redact_after(scrubbed: &mut String, marker: &str, keep_marker: bool) {
    let mut search_from = 0;
    while let Some(rel) = scrubbed[search_from..].find(marker) {
        let start = search_from + rel;
        let value_start = start + marker.len();
        let value_len: usize = scrubbed[value_start..]
            .chars()
            .take_while(|c| is_secret_char(*c))
            .map(char::len_utf8)
            .sum();

        if value_len == 0 {
            search_from = value_start;
            continue;
        }

        let replace_from = if keep_marker { value_start } else { start };
        scrubbed.replace_range(replace_from..value_start + value_len, REDACTED);
        search_from = replace_from + REDACTED.len();
    }
}

/// Redact credential-looking tokens from provider error text.
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    let hit = PREFIX_PATTERNS
        .iter()
        .chain(MARKER_PATTERNS.iter())
        .any(|pattern| input.contains(pattern));
    if !hit {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for marker in MARKER_PATTERNS {
        redact_after(&mut scrubbed, marker, true);
    }
    for prefix in PREFIX_PATTERNS {
        redact_after(&mut scrubbed, prefix, false);
    }
    Cow::Owned(scrubbed)
}

/// Scrub and truncate error text before it reaches errors or logs.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);
    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed.into_owned();
    }

    let truncated: String = scrubbed.chars().take(MAX_API_ERROR_CHARS).collect();
    format!("{truncated}...")
}

/// Build a sanitized error from a failed HTTP response.
pub async fn api_error(service: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());
    anyhow::anyhow!("{service} API error ({status}): {}", sanitize_api_error(&body))
}

/// Loggable prefix of an API key.
pub fn key_prefix(key: &str) -> &str {
    let end = key
        .char_indices()
        .nth(9)
        .map_or(key.len(), |(idx, _)| idx);
    &key[..end]
}
