//! Parsing context for the slide converter.

use crate::options::ConvertOptions;
use deckmark_core::model::join_notes;
use deckmark_core::{
    ChartType, ConversionWarning, Diagnostics, Metadata, Slide, SlideBody, SourceLocation,
};

/// Title given to text slides whose content arrived without a heading.
pub const DEFAULT_TEXT_TITLE: &str = "Content";

/// The in-flight text slide: everything but its bullets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingSlide {
    /// Title, if a heading or directive supplied one.
    pub title: Option<String>,
    /// Notes attached while the slide was open.
    pub notes: Option<String>,
    /// Background requested by a slide directive.
    pub background_color: Option<String>,
}

/// Chart type and title from a `chart:` directive, waiting for data.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeed {
    /// Chart type, when the directive named one.
    pub chart_type: Option<ChartType>,
    /// Requested title.
    pub title: Option<String>,
    /// Where the directive appeared.
    pub location: SourceLocation,
}

/// Mutable state for one conversion.
///
/// Handlers read and write this as blocks stream past in document order.
/// Text content accumulates in `current_bullets`/`current_level` under a
/// `current_slide` skeleton until [`ParsingContext::flush`] turns it into a
/// slide. Standalone slides (tables, images, charts, notes) go straight to
/// [`ParsingContext::emit`] after the pending text has been flushed.
pub struct ParsingContext<'a> {
    /// Finished slides, append-only.
    pub slides: Vec<Slide>,

    current_slide: Option<PendingSlide>,
    current_bullets: Vec<String>,
    current_level: Vec<u8>,
    section_depth: u8,
    slide_count: usize,
    chart_seed: Option<ChartSeed>,

    metadata: &'a Metadata,
    options: &'a ConvertOptions,
    diagnostics: Diagnostics,
}

/// What remains of a context once the document has been consumed.
#[derive(Debug)]
pub struct ContextOutput {
    /// Slides in document order.
    pub slides: Vec<Slide>,
    /// Warnings raised during conversion.
    pub diagnostics: Diagnostics,
}

impl<'a> ParsingContext<'a> {
    /// Creates an empty context.
    pub fn new(options: &'a ConvertOptions, metadata: &'a Metadata) -> Self {
        Self {
            slides: Vec::new(),
            current_slide: None,
            current_bullets: Vec::new(),
            current_level: Vec::new(),
            section_depth: 0,
            slide_count: 0,
            chart_seed: None,
            metadata,
            options,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Conversion options.
    pub fn options(&self) -> &ConvertOptions {
        self.options
    }

    /// Frontmatter value for `key`.
    pub fn meta(&self, key: &str) -> Option<String> {
        self.metadata.get(key).cloned()
    }

    /// Level of the most recent structural heading (0 after an opener, 2 after a section).
    pub fn section_depth(&self) -> u8 {
        self.section_depth
    }

    /// Records the level of the most recent structural heading.
    pub fn set_section_depth(&mut self, depth: u8) {
        self.section_depth = depth;
    }

    /// Number of slides emitted so far.
    pub fn slide_count(&self) -> usize {
        self.slide_count
    }

    /// Returns true if bullets are waiting to be flushed.
    pub fn has_bullets(&self) -> bool {
        !self.current_bullets.is_empty()
    }

    /// Returns the pending skeleton, if any.
    pub fn current_slide(&self) -> Option<&PendingSlide> {
        self.current_slide.as_ref()
    }

    /// Records a warning.
    pub fn warn(&mut self, warning: ConversionWarning) {
        self.diagnostics.warn(warning);
    }

    /// Appends one bullet, opening a `"Content"` skeleton if none is pending.
    ///
    /// Auto-split runs after the append: reaching the threshold flushes at once,
    /// so the next bullet opens a fresh slide.
    pub fn push_bullet(&mut self, text: String, level: u8) {
        self.current_slide.get_or_insert_with(PendingSlide::default);
        self.current_bullets.push(text);
        self.current_level.push(level);

        if let Some(max) = self.options.split_threshold()
            && self.current_bullets.len() >= max
        {
            log::debug!("Auto-splitting text slide at {} bullets", max);
            self.flush();
        }
    }

    /// Flushes pending content and opens a new skeleton.
    pub fn start_slide(&mut self, title: Option<String>, background_color: Option<String>) {
        self.flush();
        self.current_slide = Some(PendingSlide {
            title,
            notes: None,
            background_color,
        });
    }

    /// Finalizes pending content into a slide.
    ///
    /// Bullets become a text slide under the skeleton's title. A skeleton with
    /// no bullets is discarded: empty slides are never emitted.
    pub fn flush(&mut self) {
        let pending = self.current_slide.take();

        if !self.current_bullets.is_empty() {
            let pending = pending.unwrap_or_default();
            let bullets = std::mem::take(&mut self.current_bullets);
            let level = std::mem::take(&mut self.current_level);

            let mut slide = Slide::new(SlideBody::Text {
                bullets,
                level: Some(level),
            })
            .with_title(
                pending
                    .title
                    .unwrap_or_else(|| DEFAULT_TEXT_TITLE.to_string()),
            );
            slide.notes = pending.notes;
            slide.background_color = pending.background_color;
            self.emit(slide);
        } else if let Some(pending) = pending {
            log::debug!("Discarding empty slide skeleton {:?}", pending.title);
            if let Some(notes) = pending.notes {
                self.warn(ConversionWarning::DiscardedNotes { notes });
            }
        }
    }

    /// Prepares for a standalone slide.
    ///
    /// A skeleton with no bullets (e.g. an H3 right above a table) is handed
    /// back so the standalone slide can take its title and notes. Anything
    /// else is flushed and `None` is returned.
    pub fn take_for_standalone(&mut self) -> Option<PendingSlide> {
        if self.current_bullets.is_empty() {
            self.current_slide.take()
        } else {
            self.flush();
            None
        }
    }

    /// Pushes a finished slide.
    pub fn emit(&mut self, slide: Slide) {
        self.slides.push(slide);
        self.slide_count += 1;
    }

    /// Attaches notes to the in-progress slide, or else to the last emitted one.
    pub fn attach_notes(&mut self, text: &str, location: SourceLocation) {
        if let Some(pending) = self.current_slide.as_mut() {
            pending.notes = Some(join_notes(pending.notes.take(), text));
        } else if let Some(last) = self.slides.last_mut() {
            last.append_notes(text);
        } else {
            self.warn(ConversionWarning::OrphanNotes { location });
        }
    }

    /// Stores a chart seed for the next chart, replacing any unused one.
    pub fn seed_chart(&mut self, seed: ChartSeed) {
        if let Some(previous) = self.chart_seed.replace(seed) {
            self.warn(ConversionWarning::UnusedChartSeed {
                location: previous.location,
            });
        }
    }

    /// Takes the pending chart seed.
    pub fn take_chart_seed(&mut self) -> Option<ChartSeed> {
        let seed = self.chart_seed.take();
        if let Some(seed) = &seed {
            log::debug!("Applying chart seed from {}", seed.location);
        }
        seed
    }

    /// Drains pending content and returns the finished slides.
    pub fn finish(mut self) -> ContextOutput {
        self.flush();

        if let Some(seed) = self.chart_seed.take() {
            self.warn(ConversionWarning::UnusedChartSeed {
                location: seed.location,
            });
        }

        ContextOutput {
            slides: self.slides,
            diagnostics: self.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckmark_core::Layout;

    fn bullets(slide: &Slide) -> (&[String], Option<&[u8]>) {
        match &slide.body {
            SlideBody::Text { bullets, level } => (bullets, level.as_deref()),
            other => panic!("expected text slide, got {:?}", other),
        }
    }

    #[test]
    fn flush_builds_text_slide_with_default_title() {
        let options = ConvertOptions::default();
        let metadata = Metadata::new();
        let mut ctx = ParsingContext::new(&options, &metadata);

        ctx.push_bullet("a".to_string(), 0);
        ctx.push_bullet("b".to_string(), 1);
        ctx.flush();

        assert_eq!(ctx.slides.len(), 1);
        assert_eq!(ctx.slides[0].title.as_deref(), Some(DEFAULT_TEXT_TITLE));
        let (items, level) = bullets(&ctx.slides[0]);
        assert_eq!(items, ["a", "b"]);
        assert_eq!(level, Some(&[0u8, 1][..]));
        assert!(!ctx.has_bullets());
        assert!(ctx.current_slide().is_none());
    }

    #[test]
    fn empty_skeleton_is_discarded() {
        let options = ConvertOptions::default();
        let metadata = Metadata::new();
        let mut ctx = ParsingContext::new(&options, &metadata);

        ctx.start_slide(Some("Empty".to_string()), None);
        ctx.flush();

        assert!(ctx.slides.is_empty());
        assert_eq!(ctx.slide_count(), 0);
    }

    #[test]
    fn discarding_skeleton_with_notes_warns() {
        let options = ConvertOptions::default();
        let metadata = Metadata::new();
        let mut ctx = ParsingContext::new(&options, &metadata);

        ctx.start_slide(Some("Empty".to_string()), None);
        ctx.attach_notes("lost", SourceLocation::start());
        let output = ctx.finish();

        assert!(output.slides.is_empty());
        assert_eq!(
            output.diagnostics.warnings,
            vec![ConversionWarning::DiscardedNotes {
                notes: "lost".to_string()
            }]
        );
    }

    #[test]
    fn auto_split_flushes_at_threshold() {
        let options = ConvertOptions {
            max_bullets_per_slide: 2,
            ..Default::default()
        };
        let metadata = Metadata::new();
        let mut ctx = ParsingContext::new(&options, &metadata);

        for text in ["a", "b", "c"] {
            ctx.push_bullet(text.to_string(), 0);
        }
        assert_eq!(ctx.slides.len(), 1);
        assert!(ctx.has_bullets());

        let output = ctx.finish();
        assert_eq!(output.slides.len(), 2);
        assert_eq!(bullets(&output.slides[1]).0, ["c"]);
    }

    #[test]
    fn standalone_claims_empty_skeleton() {
        let options = ConvertOptions::default();
        let metadata = Metadata::new();
        let mut ctx = ParsingContext::new(&options, &metadata);

        ctx.start_slide(Some("Sales".to_string()), None);
        let claimed = ctx.take_for_standalone();
        assert_eq!(claimed.and_then(|p| p.title).as_deref(), Some("Sales"));
        assert!(ctx.slides.is_empty());
    }

    #[test]
    fn standalone_flushes_bullets() {
        let options = ConvertOptions::default();
        let metadata = Metadata::new();
        let mut ctx = ParsingContext::new(&options, &metadata);

        ctx.push_bullet("a".to_string(), 0);
        assert!(ctx.take_for_standalone().is_none());
        assert_eq!(ctx.slides.len(), 1);
        assert_eq!(ctx.slides[0].layout(), Layout::Text);
    }

    #[test]
    fn notes_prefer_pending_slide() {
        let options = ConvertOptions::default();
        let metadata = Metadata::new();
        let mut ctx = ParsingContext::new(&options, &metadata);

        ctx.push_bullet("first".to_string(), 0);
        ctx.flush();
        ctx.push_bullet("second".to_string(), 0);
        ctx.attach_notes("for second", SourceLocation::start());
        let output = ctx.finish();

        assert_eq!(output.slides[0].notes, None);
        assert_eq!(output.slides[1].notes.as_deref(), Some("for second"));
    }

    #[test]
    fn notes_without_any_slide_warn() {
        let options = ConvertOptions::default();
        let metadata = Metadata::new();
        let mut ctx = ParsingContext::new(&options, &metadata);

        ctx.attach_notes("nowhere", SourceLocation::new(2, 1));
        let output = ctx.finish();
        assert_eq!(
            output.diagnostics.warnings,
            vec![ConversionWarning::OrphanNotes {
                location: SourceLocation::new(2, 1)
            }]
        );
    }

    #[test]
    fn unused_chart_seed_is_reported() {
        let options = ConvertOptions::default();
        let metadata = Metadata::new();
        let mut ctx = ParsingContext::new(&options, &metadata);

        ctx.seed_chart(ChartSeed {
            chart_type: Some(ChartType::Pie),
            title: None,
            location: SourceLocation::new(3, 1),
        });
        let output = ctx.finish();
        assert_eq!(
            output.diagnostics.warnings,
            vec![ConversionWarning::UnusedChartSeed {
                location: SourceLocation::new(3, 1)
            }]
        );
    }
}
