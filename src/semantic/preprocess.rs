//! Text preprocessing for stored questions and embedding input.

/// Maximum content length for embedding input (characters, not tokens)
const MAX_CONTENT_LENGTH: usize = 512;

/// Ellipsis suffix when content is truncated
const TRUNCATION_SUFFIX: &str = "...";

/// Remove a single trailing `\n`, leaving everything else untouched.
pub fn strip_trailing_newline(text: &str) -> String {
    text.strip_suffix('\n').unwrap_or(text).to_string()
}

/// Trim whitespace and cap the text at `MAX_CONTENT_LENGTH` characters.
pub fn prepare_for_embedding(text: &str) -> String {
    let text = text.trim();

    if text.chars().count() <= MAX_CONTENT_LENGTH {
        return text.to_string();
    }

    // Find a safe truncation point (don't break UTF-8 sequences)
    let max_chars = MAX_CONTENT_LENGTH - TRUNCATION_SUFFIX.len();
    let truncated: String = text.chars().take(max_chars).collect();

    format!("{}{}", truncated, TRUNCATION_SUFFIX)
}
