use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use thiserror::Error;

/// Frontmatter key/values, stringified. Ordered so output never depends on hash seeds.
pub type Metadata = BTreeMap<String, String>;

/// Errors emitted while parsing or extracting frontmatter.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// Unclosed YAML fence (e.g., missing terminating `---`).
    #[error("Unterminated YAML frontmatter block: expected closing '---'")]
    Unterminated,
    /// YAML failed to parse.
    #[error("Frontmatter parse error: {0}")]
    Parse(String),
    /// Top-level YAML node was not a mapping.
    #[error("Frontmatter must be a YAML mapping at the top level")]
    InvalidRootType,
}

/// Splits a document into metadata and body, never failing.
///
/// A well-formed block is removed from the body. A block whose YAML does not
/// parse is still removed but contributes no metadata. A block whose YAML
/// parses to something other than a mapping (prose between two horizontal
/// rules) and an unterminated fence are not frontmatter at all, and the whole
/// input is body. The error, if any, is returned for diagnostics.
pub fn split_frontmatter(input: &str) -> (Metadata, &str, Option<FrontmatterError>) {
    let located = match find_yaml_block(input) {
        Ok(located) => located,
        Err(err) => return (Metadata::new(), input, Some(err)),
    };

    match located {
        Some((block, body_start)) => {
            let body = &input[body_start..];
            match parse_yaml_block(&block) {
                Ok(value) => (stringify_scalars(&value), body, None),
                Err(err @ FrontmatterError::InvalidRootType) => {
                    (Metadata::new(), input, Some(err))
                }
                Err(err) => (Metadata::new(), body, Some(err)),
            }
        }
        None => (Metadata::new(), input, None),
    }
}

fn parse_yaml_block(block: &str) -> Result<JsonValue, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(JsonValue::Object(Default::default()));
    }

    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(block).map_err(|err| FrontmatterError::Parse(err.to_string()))?;
    let json_value =
        serde_json::to_value(yaml_value).map_err(|err| FrontmatterError::Parse(err.to_string()))?;

    match json_value {
        JsonValue::Null => Ok(JsonValue::Object(Default::default())),
        JsonValue::Object(_) => Ok(json_value),
        _ => Err(FrontmatterError::InvalidRootType),
    }
}

/// Keeps string, number and boolean values; nested structures are dropped.
fn stringify_scalars(value: &JsonValue) -> Metadata {
    let mut metadata = Metadata::new();
    if let JsonValue::Object(map) = value {
        for (key, value) in map {
            let text = match value {
                JsonValue::String(s) => s.clone(),
                JsonValue::Number(n) => n.to_string(),
                JsonValue::Bool(b) => b.to_string(),
                _ => continue,
            };
            metadata.insert(key.clone(), text);
        }
    }
    metadata
}

fn find_yaml_block(input: &str) -> Result<Option<(String, usize)>, FrontmatterError> {
    let (without_bom, bom_len) = strip_bom(input);
    let mut cursor = 0usize;

    loop {
        match next_line(without_bom, cursor) {
            Some((line, next_cursor)) => {
                if line.trim().is_empty() {
                    cursor = next_cursor;
                    continue;
                }

                if !is_yaml_fence(line) {
                    return Ok(None);
                }

                let block_start = next_cursor;
                let mut scan_cursor = next_cursor;

                loop {
                    match next_line(without_bom, scan_cursor) {
                        Some((block_line, next_line_cursor)) => {
                            if is_yaml_fence(block_line) {
                                let raw_block = &without_bom[block_start..scan_cursor];
                                let trimmed = raw_block.trim_end_matches(['\r', '\n']);
                                let body_index = bom_len + next_line_cursor;
                                return Ok(Some((trimmed.to_string(), body_index)));
                            }
                            scan_cursor = next_line_cursor;
                        }
                        None => return Err(FrontmatterError::Unterminated),
                    }
                }
            }
            None => return Ok(None),
        }
    }
}

fn strip_bom(input: &str) -> (&str, usize) {
    if let Some(stripped) = input.strip_prefix('\u{feff}') {
        (stripped, '\u{feff}'.len_utf8())
    } else {
        (input, 0)
    }
}

fn next_line(input: &str, start: usize) -> Option<(&str, usize)> {
    if start >= input.len() {
        return None;
    }

    let bytes = &input.as_bytes()[start..];
    if let Some(pos) = bytes.iter().position(|b| *b == b'\n') {
        let line_end = start + pos;
        let line = &input[start..line_end];
        Some((line, line_end + 1))
    } else {
        Some((&input[start..], input.len()))
    }
}

fn is_yaml_fence(line: &str) -> bool {
    line.trim_end_matches('\r') == "---"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_empty_when_no_frontmatter() {
        let (metadata, body, err) = split_frontmatter("# Title\nBody");
        assert!(metadata.is_empty());
        assert_eq!(body, "# Title\nBody");
        assert!(err.is_none());
    }

    #[test]
    fn parses_basic_yaml() {
        let input = "---\ntitle: Quarterly Review\nauthor: Ada\nyear: 2024\ndraft: true\ntags:\n  - q1\n---\n# Content";
        let (metadata, body, err) = split_frontmatter(input);
        assert!(err.is_none());
        assert_eq!(body, "# Content");
        assert_eq!(metadata["title"], "Quarterly Review");
        assert_eq!(metadata["author"], "Ada");
        assert_eq!(metadata["year"], "2024");
        assert_eq!(metadata["draft"], "true");
        assert!(!metadata.contains_key("tags"));
    }

    #[test]
    fn handles_empty_block() {
        let (metadata, body, err) = split_frontmatter("---\n---\n# Body");
        assert!(metadata.is_empty());
        assert_eq!(body, "# Body");
        assert!(err.is_none());
    }

    #[test]
    fn preserves_bom_and_whitespace() {
        let (metadata, body, _) = split_frontmatter("\u{feff}\n   \n---\nfoo: bar\n---\nBody");
        assert_eq!(metadata["foo"], "bar");
        assert_eq!(body, "Body");
    }

    #[test]
    fn split_falls_back_to_empty_metadata_on_bad_yaml() {
        let input = "---\ninvalid: [unterminated\n---\n# Body";
        let (metadata, body, err) = split_frontmatter(input);
        assert!(metadata.is_empty());
        assert_eq!(body, "# Body");
        assert!(err.is_some());
    }

    #[test]
    fn split_treats_unterminated_fence_as_body() {
        let input = "---\ntitle: test";
        let (metadata, body, err) = split_frontmatter(input);
        assert!(metadata.is_empty());
        assert_eq!(body, input);
        assert!(matches!(err, Some(FrontmatterError::Unterminated)));
    }

    #[test]
    fn split_keeps_body_when_root_is_not_a_mapping() {
        let input = "---\n- a\n- b\n---\nText";
        let (metadata, body, err) = split_frontmatter(input);
        assert!(metadata.is_empty());
        assert_eq!(body, input);
        assert!(matches!(err, Some(FrontmatterError::InvalidRootType)));
    }

    #[test]
    fn leading_rule_with_prose_is_not_frontmatter() {
        let input = "---\nOpening remarks\n---\n# Title";
        let (metadata, body, err) = split_frontmatter(input);
        assert!(metadata.is_empty());
        assert_eq!(body, input);
        assert!(matches!(err, Some(FrontmatterError::InvalidRootType)));
    }
}
