use thiserror::Error;

/// Source location information for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Location of the first character of a document.
    pub fn start() -> Self {
        Self::new(1, 1)
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Fatal errors that abort a conversion.
///
/// Classification never produces one of these; only the tokenizer and the
/// raw JSON input path can.
#[derive(Debug, Error)]
pub enum DeckError {
    /// markdown-rs parser error surfaced through the adapter.
    #[error("Parse error at {location}: {message}")]
    MarkdownAdapter {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// Raw JSON input did not describe a presentation.
    #[error("Invalid presentation JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl DeckError {
    /// Create a parse error with location
    pub fn parse_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::MarkdownAdapter {
            message: message.into(),
            location: SourceLocation::new(line, column),
        }
    }
}

/// Non-fatal problems found while converting a document.
///
/// Each one means some content was skipped or degraded; conversion always
/// continues past them.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionWarning {
    /// Frontmatter block could not be parsed and was ignored.
    MalformedFrontmatter {
        /// Parser message
        message: String,
    },
    /// A directive comment was recognised but its arguments were invalid.
    MalformedDirective {
        /// Source location of the directive
        location: SourceLocation,
        /// What was wrong with it
        message: String,
    },
    /// Content looked like chart data but could not be turned into a chart.
    UnparseableChartData {
        /// Source location of the block
        location: SourceLocation,
        /// Parser message
        message: String,
    },
    /// A notes directive appeared before any slide existed.
    OrphanNotes {
        /// Source location of the directive
        location: SourceLocation,
    },
    /// A pending skeleton carrying notes was discarded because it had no content.
    DiscardedNotes {
        /// The notes text that was dropped
        notes: String,
    },
    /// A chart directive was never followed by chart data.
    UnusedChartSeed {
        /// Source location of the chart directive
        location: SourceLocation,
    },
}

impl ConversionWarning {
    /// Get the location of this warning, if it has one
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            ConversionWarning::MalformedDirective { location, .. }
            | ConversionWarning::UnparseableChartData { location, .. }
            | ConversionWarning::OrphanNotes { location }
            | ConversionWarning::UnusedChartSeed { location } => Some(*location),
            ConversionWarning::MalformedFrontmatter { .. }
            | ConversionWarning::DiscardedNotes { .. } => None,
        }
    }
}

impl std::fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversionWarning::MalformedFrontmatter { message } => {
                write!(f, "frontmatter ignored: {}", message)
            }
            ConversionWarning::MalformedDirective { location, message } => {
                write!(f, "{}: malformed directive: {}", location, message)
            }
            ConversionWarning::UnparseableChartData { location, message } => {
                write!(f, "{}: chart data dropped: {}", location, message)
            }
            ConversionWarning::OrphanNotes { location } => {
                write!(f, "{}: notes directive has no slide to attach to", location)
            }
            ConversionWarning::DiscardedNotes { notes } => {
                write!(f, "notes discarded with empty slide: '{}'", notes)
            }
            ConversionWarning::UnusedChartSeed { location } => {
                write!(f, "{}: chart directive was never followed by data", location)
            }
        }
    }
}

/// Collection of non-fatal diagnostics produced by one conversion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    /// Warnings in the order they were raised
    pub warnings: Vec<ConversionWarning>,
}

impl Diagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and log it.
    pub fn warn(&mut self, warning: ConversionWarning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Get total count of all diagnostics
    pub fn count(&self) -> usize {
        self.warnings.len()
    }
}
