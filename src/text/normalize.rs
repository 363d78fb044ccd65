//! Text normalization applied before token counting and embedding

use itertools::Itertools;
use tracing::debug;

#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Normalize text for embedding.
///
/// Every character that is not alphanumeric or `_` (punctuation, symbols and
/// whitespace of any kind, including newlines) acts as a separator, and the
/// remaining runs are joined with single spaces. The result has no leading or
/// trailing whitespace and no blank lines.
///
/// `normalize(&normalize(x)) == normalize(x)` holds for any input.
pub fn normalize(text: &str) -> String {
    debug!("Text normalization started: {} chars", text.len());
    let normalized = text
        .split(|c: char| !is_word_char(c))
        .filter(|s| !s.is_empty())
        .join(" ");
    debug!("Text normalization finished: {} chars", normalized.len());
    normalized
}
