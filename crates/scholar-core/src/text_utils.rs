/// Number of leading characters of the paper shown to the metadata call.
pub const METADATA_EXCERPT_CHARS: usize = 15_000;

/// Number of leading characters of the paper shown to the final synthesis call.
pub const REPORT_EXCERPT_CHARS: usize = 20_000;

/// Return the first `max_chars` characters of `text`.
///
/// Counts Unicode scalar values, never splits a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
