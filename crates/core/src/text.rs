//! Character-budget helpers shared by the transcript formatter and the tail
//! generator.
//!
//! All lengths are counted in `char`s so a cut never lands inside a UTF-8
//! sequence.

/// Marker appended whenever text is cut short.
pub const ELLIPSIS: &str = "...";

/// Rough characters-per-token ratio. Not a tokenizer; good enough for budgeting.
pub const CHARS_PER_TOKEN: usize = 4;

/// Number of chars in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// First `n` chars of `s`.
pub fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncate to at most `max` chars. The ellipsis counts toward `max`.
pub fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    if char_len(s) <= max {
        return s.to_string();
    }
    if max < ELLIPSIS.len() {
        return take_chars(s, max).to_string();
    }
    format!("{}{}", take_chars(s, max - ELLIPSIS.len()), ELLIPSIS)
}

/// Estimated token count: `ceil(chars / 4)`.
pub fn estimate_tokens(s: &str) -> usize {
    char_len(s).div_ceil(CHARS_PER_TOKEN)
}

/// Cut `s` so that `estimate_tokens(result) <= max_tokens`.
pub fn truncate_to_tokens(s: &str, max_tokens: usize) -> String {
    truncate_with_ellipsis(s, max_tokens.saturating_mul(CHARS_PER_TOKEN))
}
