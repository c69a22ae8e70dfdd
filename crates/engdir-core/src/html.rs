//! Plain-text extraction for the free-text `description` field.
//!
//! The registry stores descriptions as HTML that is itself often entity-escaped
//! (`&lt;p&gt;...`). Decoding happens first, then every tag is dropped and the
//! text nodes are concatenated in document order without adding separators.

use scraper::Html;

/// Text content of an HTML fragment: entities decoded, tags removed.
pub fn fragment_text(fragment: &str) -> String {
    if !fragment.contains(['<', '&']) {
        return fragment.to_string();
    }
    let doc = Html::parse_fragment(fragment);
    doc.root_element().text().collect()
}

/// Decode entities in the raw description, then strip the markup that the
/// decoding revealed (or that was already there).
///
/// `"A &amp; B <b>bold</b> text"` -> `"A & B bold text"`.
pub fn description_text(raw: &str) -> String {
    let decoded = fragment_text(raw);
    fragment_text(&decoded)
}
