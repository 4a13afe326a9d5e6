//! Splitting a Markdown document into per-slide fragments.

use crate::domain::slides::SlideFragment;

/// Delimiter separating slides when none is configured.
pub const DEFAULT_DELIMITER: &str = "---";

/// Split `document` on every literal occurrence of `delimiter`.
///
/// Pieces are trimmed and blank ones dropped; the remaining fragments keep
/// their order of appearance. An empty delimiter leaves the document whole.
pub fn segment<'a>(document: &'a str, delimiter: &str) -> Vec<SlideFragment<'a>> {
    if delimiter.is_empty() {
        return SlideFragment::from_piece(document).into_iter().collect();
    }

    document
        .split(delimiter)
        .filter_map(SlideFragment::from_piece)
        .collect()
}
