#![deny(missing_docs)]
//! deckmark core: slide-deck model, frontmatter extraction, document
//! tokenizer, directive parsing, and content classifiers.

/// Chart-data parsing and the chart-versus-table heuristic.
pub mod chart;
/// Directive comment and attribute parsing.
pub mod directives;
/// Core error and diagnostic types.
pub mod error;
/// YAML frontmatter extraction helpers.
pub mod frontmatter;
/// The slide-deck model.
pub mod model;
/// Markdown tokenizer producing flat block sequences.
pub mod parse;
/// Text cleanup for bullet content.
pub mod text;

pub use chart::{
    CHART_TABLE_THRESHOLD, ChartDataError, ChartSource, ParsedChart, columns_to_chart,
    detect_chart_data, is_chart_table, parse_chart_data, parse_number,
};
pub use directives::{
    Attributes, ChartDirective, Directive, DirectiveError, DirectiveKind, SlideDirective,
    SlideDirectiveKind, parse_attributes, parse_comment_directive, parse_directive,
};
pub use error::{ConversionWarning, DeckError, Diagnostics, SourceLocation};
pub use frontmatter::{FrontmatterError, Metadata, split_frontmatter};
pub use model::{
    ChartData, ChartType, Dataset, ElementKind, ImageSizing, ImageSource, Layout, Presentation,
    SizingKind, Slide, SlideBody, SlideElement, TableStyle,
};
pub use parse::{Block, BlockKind, ParseOptions, tokenize, tokenize_at};
pub use text::{clean_html, clean_text};
