//! Directive parsing.
//!
//! Directives are instructions embedded in the document rather than visible
//! content. They arrive either as HTML comments:
//!
//! ```text
//! <!-- slide: type="custom" title="Layout" elements='[...]' -->
//! <!-- notes: Mention the Q3 numbers -->
//! <!-- chart: type="line" title="Revenue" -->
//! ```
//!
//! or as fenced code blocks whose language tag is `slide` or `notes`, with the
//! block body as the argument text.

use crate::model::{ChartType, SlideElement};
use std::collections::BTreeMap;
use thiserror::Error;

/// Attribute map produced by [`parse_attributes`].
pub type Attributes = BTreeMap<String, String>;

/// Which directive a comment or fence names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `slide:`
    Slide,
    /// `notes:`
    Notes,
    /// `chart:`
    Chart,
}

impl DirectiveKind {
    fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "slide" => Some(DirectiveKind::Slide),
            "notes" => Some(DirectiveKind::Notes),
            "chart" => Some(DirectiveKind::Chart),
            _ => None,
        }
    }

    /// Directive kind for a fenced block language tag (`slide` or `notes`).
    pub fn from_fence_lang(lang: &str) -> Option<Self> {
        match Self::from_name(lang)? {
            DirectiveKind::Chart => None,
            kind => Some(kind),
        }
    }
}

/// A parsed directive.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Slide control.
    Slide(SlideDirective),
    /// Speaker notes for the nearest preceding or in-progress slide.
    Notes(String),
    /// Chart seed for the next chart-data block.
    Chart(ChartDirective),
}

/// What a `slide:` directive asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirectiveKind {
    /// Emit a custom slide from the directive's elements.
    Custom,
    /// Close the current slide and start a new text slide.
    Text,
}

/// Arguments of a `slide:` directive.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideDirective {
    /// Requested slide kind.
    pub kind: SlideDirectiveKind,
    /// Slide title.
    pub title: Option<String>,
    /// Background color.
    pub background: Option<String>,
    /// Elements for custom slides.
    pub elements: Vec<SlideElement>,
    /// Every attribute as written, including ones the converter ignores.
    pub params: Attributes,
}

/// Arguments of a `chart:` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartDirective {
    /// Chart kind for the seeded chart.
    pub chart_type: ChartType,
    /// Title for the seeded chart.
    pub title: Option<String>,
    /// Every attribute as written.
    pub params: Attributes,
}

/// Reasons a recognised directive could not be applied.
#[derive(Debug, Error, PartialEq)]
pub enum DirectiveError {
    /// A quoted attribute value never closed.
    #[error("unterminated quoted value for '{0}'")]
    UnterminatedQuote(String),
    /// `notes:` with no text.
    #[error("notes directive is empty")]
    EmptyNotes,
    /// `slide:` with a `type` other than `custom` or `text`.
    #[error("unknown slide type '{0}'")]
    UnknownSlideType(String),
    /// `chart:` with an unsupported `type`.
    #[error("{0}")]
    UnknownChartType(String),
    /// `elements` was not a JSON array of slide elements.
    #[error("invalid custom slide elements: {0}")]
    InvalidElements(String),
}

/// Returns the inside of an HTML comment, trimmed, or `None` if `html` is not
/// exactly one comment.
pub fn comment_body(html: &str) -> Option<&str> {
    let inner = html.trim().strip_prefix("<!--")?.strip_suffix("-->")?;
    if inner.contains("-->") {
        return None;
    }
    Some(inner.trim())
}

/// Splits `name: arguments`, returning `None` unless `name` is a known directive.
pub fn split_directive(body: &str) -> Option<(DirectiveKind, &str)> {
    let (name, args) = body.split_once(':')?;
    let kind = DirectiveKind::from_name(name)?;
    Some((kind, args.trim()))
}

/// Parses an HTML comment directive.
///
/// Returns `None` for comments that are not directives at all, and
/// `Some(Err(_))` for recognised directives with bad arguments.
pub fn parse_comment_directive(html: &str) -> Option<Result<Directive, DirectiveError>> {
    let body = comment_body(html)?;
    let (kind, args) = split_directive(body)?;
    Some(parse_directive(kind, args))
}

/// Parses directive arguments for a known directive kind.
pub fn parse_directive(kind: DirectiveKind, args: &str) -> Result<Directive, DirectiveError> {
    match kind {
        DirectiveKind::Notes => {
            let text = args.trim();
            if text.is_empty() {
                Err(DirectiveError::EmptyNotes)
            } else {
                Ok(Directive::Notes(text.to_string()))
            }
        }
        DirectiveKind::Slide => parse_slide_directive(args).map(Directive::Slide),
        DirectiveKind::Chart => parse_chart_directive(args).map(Directive::Chart),
    }
}

fn parse_slide_directive(args: &str) -> Result<SlideDirective, DirectiveError> {
    let params = strict_attributes(args)?;

    let kind = match params.get("type").map(|t| t.to_ascii_lowercase()) {
        None => SlideDirectiveKind::Text,
        Some(t) if t == "text" => SlideDirectiveKind::Text,
        Some(t) if t == "custom" => SlideDirectiveKind::Custom,
        Some(other) => return Err(DirectiveError::UnknownSlideType(other)),
    };

    let elements = match params.get("elements") {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str(raw)
            .map_err(|err| DirectiveError::InvalidElements(err.to_string()))?,
        _ => Vec::new(),
    };

    Ok(SlideDirective {
        kind,
        title: non_empty(params.get("title")),
        background: non_empty(
            params
                .get("background")
                .or_else(|| params.get("backgroundColor")),
        ),
        elements,
        params,
    })
}

fn parse_chart_directive(args: &str) -> Result<ChartDirective, DirectiveError> {
    let params = strict_attributes(args)?;
    let chart_type = match params.get("type") {
        Some(t) => t.parse().map_err(DirectiveError::UnknownChartType)?,
        None => ChartType::default(),
    };

    Ok(ChartDirective {
        chart_type,
        title: non_empty(params.get("title")),
        params,
    })
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}

fn strict_attributes(args: &str) -> Result<Attributes, DirectiveError> {
    let scan = scan_attributes(args);
    match scan.unterminated {
        Some(key) => Err(DirectiveError::UnterminatedQuote(key)),
        None => Ok(scan.attributes),
    }
}

/// Parses `key="value"` pairs.
///
/// - Values may be double- or single-quoted, or bare up to the next space.
/// - A key with no `=` maps to the empty string.
/// - Duplicate keys: the last occurrence wins.
/// - An unterminated quote takes the rest of the input as its value.
///
/// ```
/// use deckmark_core::directives::parse_attributes;
///
/// let attrs = parse_attributes(r#"type="line" title='Q1 revenue' legend"#);
/// assert_eq!(attrs["type"], "line");
/// assert_eq!(attrs["title"], "Q1 revenue");
/// assert_eq!(attrs["legend"], "");
/// ```
pub fn parse_attributes(text: &str) -> Attributes {
    scan_attributes(text).attributes
}

struct AttributeScan {
    attributes: Attributes,
    unterminated: Option<String>,
}

fn scan_attributes(text: &str) -> AttributeScan {
    let mut attributes = Attributes::new();
    let mut unterminated = None;
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() || c == '=' || c == '"' || c == '\'' {
            chars.next();
            continue;
        }

        // Key runs to whitespace or '='.
        let mut end = text.len();
        while let Some(&(i, c)) = chars.peek() {
            if c.is_whitespace() || c == '=' {
                end = i;
                break;
            }
            chars.next();
        }
        let key = text[start..end].to_string();

        if chars.peek().map(|&(_, c)| c) != Some('=') {
            attributes.insert(key, String::new());
            continue;
        }
        chars.next(); // '='

        let value = match chars.peek().copied() {
            Some((i, quote @ ('"' | '\''))) => {
                chars.next();
                let value_start = i + quote.len_utf8();
                let mut value_end = None;
                for (j, c) in chars.by_ref() {
                    if c == quote {
                        value_end = Some(j);
                        break;
                    }
                }
                match value_end {
                    Some(j) => text[value_start..j].to_string(),
                    None => {
                        unterminated = Some(key.clone());
                        text[value_start..].to_string()
                    }
                }
            }
            Some((i, _)) => {
                let mut value_end = text.len();
                while let Some(&(j, c)) = chars.peek() {
                    if c.is_whitespace() {
                        value_end = j;
                        break;
                    }
                    chars.next();
                }
                text[i..value_end].to_string()
            }
            None => String::new(),
        };

        attributes.insert(key, value);
    }

    AttributeScan {
        attributes,
        unterminated,
    }
}
