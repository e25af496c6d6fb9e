//! Text cleanup applied before content becomes bullet text.

/// Strips inline HTML tags and comments and collapses whitespace.
///
/// Input is Markdown text whose entities markdown-rs has already decoded, so
/// entities are left alone here.
///
/// ```
/// use deckmark_core::text::clean_text;
///
/// assert_eq!(clean_text("  <b>Fast</b> &amp;\n cheap <!-- hidden -->"), "Fast &amp; cheap");
/// ```
pub fn clean_text(input: &str) -> String {
    normalize_whitespace(&strip_tags(input))
}

/// Like [`clean_text`], for raw HTML blocks: entities are decoded after the
/// tags are stripped.
pub fn clean_html(input: &str) -> String {
    let stripped = strip_tags(input);
    normalize_whitespace(&html_escape::decode_html_entities(&stripped))
}

/// Removes `<!-- ... -->` comments and `<tag ...>` markup, keeping the text between.
///
/// A `<` that does not start a tag (e.g. `a < b`) is kept as-is.
pub fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('<') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after_open) = tail.strip_prefix("<!--") {
            match after_open.find("-->") {
                Some(end) => rest = &after_open[end + 3..],
                // Unterminated comment swallows the remainder.
                None => rest = "",
            }
            continue;
        }

        if starts_tag(&tail[1..])
            && let Some(end) = tail.find('>')
        {
            rest = &tail[end + 1..];
            continue;
        }

        out.push('<');
        rest = &tail[1..];
    }

    out.push_str(rest);
    out
}

fn starts_tag(after_lt: &str) -> bool {
    let mut chars = after_lt.chars();
    match chars.next() {
        Some('/') => chars.next().is_some_and(|c| c.is_ascii_alphabetic()),
        Some(c) => c.is_ascii_alphabetic(),
        None => false,
    }
}

/// Collapses every whitespace run to a single space and trims the ends.
pub fn normalize_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
