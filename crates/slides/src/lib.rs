#![deny(missing_docs)]
//! deckmark slides: turns Markdown (with YAML frontmatter) or raw JSON into a
//! [`Presentation`] ready for a rendering backend.
//!
//! ```
//! use deckmark_slides::{ConvertOptions, convert_markdown};
//!
//! let deck = convert_markdown("# Launch\n\n- Faster\n- Cheaper\n", &ConvertOptions::default())
//!     .unwrap();
//! assert_eq!(deck.title, "Launch");
//! assert_eq!(deck.slides.len(), 2);
//! ```

/// Parallel conversion of many documents.
pub mod batch;
/// Renderer, template processor and validator seams.
pub mod collaborators;
/// Per-conversion parsing state.
pub mod context;
/// Block handlers.
pub mod handlers;
/// Conversion options.
pub mod options;
/// Table of contents and slide numbering.
pub mod postprocess;

pub use batch::{
    BatchInput, BatchOptions, BatchProcessingResult, BatchResult, BatchStats, convert_batch,
};
pub use collaborators::{
    DeliveryError, FieldError, Renderer, TemplateProcessor, ValidationReport, Validator, deliver,
    deliver_with_template,
};
pub use context::ParsingContext;
pub use deckmark_core::{ConversionWarning, DeckError, Diagnostics, Presentation};
pub use options::ConvertOptions;

use deckmark_core::model::UNTITLED;
use deckmark_core::{Layout, ParseOptions, split_frontmatter, tokenize_at};

/// A converted deck plus the warnings raised while building it.
#[derive(Debug)]
pub struct Conversion {
    /// The converted deck.
    pub presentation: Presentation,
    /// Non-fatal problems, in document order.
    pub diagnostics: Diagnostics,
}

/// Converts Markdown to a presentation, discarding warnings.
pub fn convert_markdown(input: &str, options: &ConvertOptions) -> Result<Presentation, DeckError> {
    convert_markdown_with_diagnostics(input, options).map(|conversion| conversion.presentation)
}

/// Converts Markdown to a presentation and reports what was skipped.
///
/// Frontmatter is advisory: a malformed block becomes a warning and the
/// conversion proceeds without metadata.
pub fn convert_markdown_with_diagnostics(
    input: &str,
    options: &ConvertOptions,
) -> Result<Conversion, DeckError> {
    let (metadata, body, frontmatter_error) = split_frontmatter(input);
    let line_offset = input[..input.len() - body.len()].matches('\n').count();
    let blocks = tokenize_at(body, &ParseOptions::slides(), line_offset)?;

    let mut ctx = ParsingContext::new(options, &metadata);
    if let Some(err) = frontmatter_error {
        ctx.warn(ConversionWarning::MalformedFrontmatter {
            message: err.to_string(),
        });
    }
    for block in &blocks {
        handlers::dispatch(block, &mut ctx);
    }
    let output = ctx.finish();

    let title = metadata
        .get("title")
        .filter(|title| !title.trim().is_empty())
        .cloned()
        .or_else(|| {
            output
                .slides
                .iter()
                .find(|slide| slide.layout() == Layout::Title && !slide.is_section_divider())
                .and_then(|slide| slide.title.clone())
        })
        .unwrap_or_else(|| UNTITLED.to_string());

    let mut presentation = Presentation::new(title);
    presentation.author = metadata.get("author").cloned();
    presentation.company = metadata.get("company").cloned();
    presentation.subject = metadata.get("subject").cloned();
    presentation.theme = metadata.get("theme").cloned();
    presentation.slides = output.slides;
    postprocess::apply(&mut presentation.slides, options);

    log::debug!(
        "Converted '{}' into {} slides with {} warning(s)",
        presentation.title,
        presentation.slides.len(),
        output.diagnostics.count()
    );

    Ok(Conversion {
        presentation,
        diagnostics: output.diagnostics,
    })
}

/// Loads a presentation from its JSON form and runs the post-processors.
pub fn convert_json(input: &str, options: &ConvertOptions) -> Result<Presentation, DeckError> {
    let mut presentation = Presentation::from_json(input)?;
    postprocess::apply(&mut presentation.slides, options);
    Ok(presentation)
}

/// Converts either input form: JSON when the text starts with `{`, Markdown otherwise.
pub fn convert_document(input: &str, options: &ConvertOptions) -> Result<Presentation, DeckError> {
    if input.trim_start().starts_with('{') {
        convert_json(input, options)
    } else {
        convert_markdown(input, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckmark_core::{SlideBody, SourceLocation};

    #[test]
    fn frontmatter_title_wins() {
        let input = "---\ntitle: Deck\nauthor: Ada\ntheme: dark\n---\n# Heading\n";
        let deck = convert_markdown(input, &ConvertOptions::default()).unwrap();
        assert_eq!(deck.title, "Deck");
        assert_eq!(deck.author.as_deref(), Some("Ada"));
        assert_eq!(deck.theme.as_deref(), Some("dark"));
        assert_eq!(deck.slides[0].title.as_deref(), Some("Heading"));
    }

    #[test]
    fn untitled_without_metadata_or_h1() {
        let deck = convert_markdown("## Section\n", &ConvertOptions::default()).unwrap();
        assert_eq!(deck.title, UNTITLED);
    }

    #[test]
    fn malformed_frontmatter_is_a_warning() {
        let input = "---\ntitle: [unclosed\n---\n# Hi\n";
        let conversion =
            convert_markdown_with_diagnostics(input, &ConvertOptions::default()).unwrap();
        assert_eq!(conversion.presentation.title, "Hi");
        assert!(matches!(
            conversion.diagnostics.warnings.as_slice(),
            [ConversionWarning::MalformedFrontmatter { .. }]
        ));
    }

    #[test]
    fn warning_locations_count_frontmatter_lines() {
        let input = "---\ntitle: x\n---\n<!-- notes: too early -->\n";
        let conversion =
            convert_markdown_with_diagnostics(input, &ConvertOptions::default()).unwrap();
        assert_eq!(
            conversion.diagnostics.warnings,
            vec![ConversionWarning::OrphanNotes {
                location: SourceLocation::new(4, 1)
            }]
        );
    }

    #[test]
    fn document_routes_json() {
        let deck = convert_document(
            r#"  {"title": "Raw", "slides": [{"layout": "notes", "content": "x"}]}"#,
            &ConvertOptions {
                slide_numbers: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(deck.title, "Raw");
        assert_eq!(deck.slides[0].slide_number.as_deref(), Some("1 / 1"));
        assert_eq!(
            deck.slides[0].body,
            SlideBody::Notes {
                content: "x".to_string()
            }
        );
    }

    #[test]
    fn invalid_json_is_fatal() {
        let err = convert_json("{", &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, DeckError::InvalidJson(_)));
    }
}
