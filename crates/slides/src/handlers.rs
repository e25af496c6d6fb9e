//! Block handlers.
//!
//! [`dispatch`] matches on the block kind and hands it to one handler. Each
//! handler either extends the in-progress text slide, flushes and opens a new
//! one, or emits a standalone slide.

use crate::context::{ChartSeed, ParsingContext, PendingSlide};
use deckmark_core::directives::comment_body;
use deckmark_core::{
    Block, BlockKind, ChartType, ConversionWarning, Directive, DirectiveError,
    DirectiveKind, ImageSource, ParsedChart, Slide, SlideBody, SlideDirective,
    SlideDirectiveKind, SourceLocation, TableStyle, clean_html, clean_text, columns_to_chart,
    detect_chart_data, is_chart_table, parse_chart_data, parse_comment_directive,
    parse_directive,
};

/// Background forced onto section divider slides.
pub const SECTION_BACKGROUND: &str = "#1F4E79";

/// Title of slides made from blockquotes.
pub const BLOCKQUOTE_TITLE: &str = "Note";

/// Processes one block.
pub fn dispatch(block: &Block, ctx: &mut ParsingContext) {
    let location = block.location;
    match &block.kind {
        BlockKind::Heading { depth, text } => handle_heading(*depth, text, location, ctx),
        BlockKind::Paragraph { text } => process_text(text, 0, location, ctx),
        BlockKind::ListItem { text, indent, .. } => {
            process_text(text, list_level(*indent), location, ctx)
        }
        BlockKind::Table { headers, rows } => handle_table(headers, rows, ctx),
        BlockKind::Image { url, alt, title } => handle_image(url, alt, title.as_deref(), ctx),
        BlockKind::Code { lang, value } => handle_code(lang.as_deref(), value, location, ctx),
        BlockKind::Blockquote { text } => handle_blockquote(text, ctx),
        BlockKind::ThematicBreak => ctx.flush(),
        BlockKind::Html { value } => handle_html(value, location, ctx),
    }
}

/// Maps list-marker indentation to a bullet level: two columns per level.
fn list_level(indent: usize) -> u8 {
    u8::try_from(indent / 2).unwrap_or(u8::MAX)
}

fn handle_heading(depth: u8, text: &str, location: SourceLocation, ctx: &mut ParsingContext) {
    let text = clean_text(text);
    if text.is_empty() {
        ctx.flush();
        return;
    }

    match depth {
        1 => {
            ctx.flush();
            let body = SlideBody::Title {
                subtitle: ctx.meta("subtitle").or_else(|| ctx.meta("subject")),
                author: ctx.meta("author"),
                date: ctx.meta("date"),
            };
            ctx.emit(Slide::new(body).with_title(text));
            ctx.set_section_depth(0);
        }
        2 => {
            ctx.flush();
            let body = SlideBody::Title {
                subtitle: None,
                author: None,
                date: None,
            };
            ctx.emit(
                Slide::new(body)
                    .with_title(text)
                    .with_background(SECTION_BACKGROUND),
            );
            ctx.set_section_depth(2);
        }
        3 => {
            if ctx.has_bullets() {
                ctx.push_bullet(format!("**{}**", text), 0);
            } else {
                ctx.start_slide(Some(text), None);
            }
        }
        _ => process_text(&text, 0, location, ctx),
    }
}

/// Shared path for paragraphs and list items: directive, then chart data, then bullet.
fn process_text(raw: &str, level: u8, location: SourceLocation, ctx: &mut ParsingContext) {
    if let Some(parsed) = parse_comment_directive(raw) {
        apply_directive(parsed, location, ctx);
        return;
    }

    if ctx.options().detect_charts && detect_chart_data(raw).is_some() {
        chart_block(raw, location, ctx);
        return;
    }

    let text = clean_text(raw);
    if !text.is_empty() {
        ctx.push_bullet(text, level);
    }
}

/// Emits a chart for text already known to be chart data. Text that fails to
/// parse produces a warning and no slide.
fn chart_block(text: &str, location: SourceLocation, ctx: &mut ParsingContext) {
    match parse_chart_data(text) {
        Ok(parsed) => {
            let claimed = ctx.take_for_standalone();
            emit_chart(parsed, claimed, ctx);
        }
        Err(err) => ctx.warn(ConversionWarning::UnparseableChartData {
            location,
            message: err.to_string(),
        }),
    }
}

/// Emits a chart slide. Type and title come from the chart seed first, then
/// the data itself, then (title only) the claimed skeleton.
fn emit_chart(parsed: ParsedChart, claimed: Option<PendingSlide>, ctx: &mut ParsingContext) {
    let seed = ctx.take_chart_seed();
    let claimed = claimed.unwrap_or_default();

    let chart_type = seed
        .as_ref()
        .and_then(|s| s.chart_type)
        .or(parsed.chart_type)
        .unwrap_or_default();
    let title = seed
        .and_then(|s| s.title)
        .or(parsed.title)
        .or(claimed.title);

    let mut slide = Slide::new(SlideBody::Chart {
        chart_type,
        data: parsed.data,
    })
    .with_optional_title(title);
    slide.notes = claimed.notes;
    slide.background_color = claimed.background_color;
    ctx.emit(slide);
}

fn handle_table(headers: &[String], rows: &[Vec<String>], ctx: &mut ParsingContext) {
    let claimed = ctx.take_for_standalone();

    if ctx.options().detect_charts && is_chart_table(headers, rows) {
        let parsed = ParsedChart {
            chart_type: None,
            title: None,
            data: columns_to_chart(headers, rows),
        };
        emit_chart(parsed, claimed, ctx);
        return;
    }

    let claimed = claimed.unwrap_or_default();
    let mut slide = Slide::new(SlideBody::Table {
        headers: (!headers.is_empty()).then(|| headers.to_vec()),
        table_data: rows.to_vec(),
        style: Some(TableStyle::default()),
    })
    .with_optional_title(claimed.title);
    slide.notes = claimed.notes;
    slide.background_color = claimed.background_color;
    ctx.emit(slide);
}

fn handle_image(url: &str, alt: &str, title: Option<&str>, ctx: &mut ParsingContext) {
    let claimed = ctx.take_for_standalone().unwrap_or_default();
    let alt = alt.trim();

    let mut slide = Slide::new(SlideBody::Image {
        source: ImageSource::from_target(url),
        caption: (!alt.is_empty()).then(|| alt.to_string()),
        sizing: None,
    })
    .with_optional_title(
        claimed
            .title
            .or_else(|| title.filter(|t| !t.trim().is_empty()).map(str::to_string)),
    );
    slide.notes = claimed.notes;
    slide.background_color = claimed.background_color;
    ctx.emit(slide);
}

fn handle_code(lang: Option<&str>, value: &str, location: SourceLocation, ctx: &mut ParsingContext) {
    let lang = lang.map(str::trim).filter(|l| !l.is_empty());

    if let Some(kind) = lang.and_then(DirectiveKind::from_fence_lang) {
        apply_directive(parse_directive(kind, value), location, ctx);
        return;
    }

    let fenced_chart = lang
        .is_some_and(|l| l.eq_ignore_ascii_case("chart") || l.eq_ignore_ascii_case("csv"));
    let detected = ctx.options().detect_charts && detect_chart_data(value).is_some();
    if fenced_chart || detected {
        chart_block(value, location, ctx);
        return;
    }

    ctx.flush();
    let slide = Slide::new(SlideBody::Notes {
        content: value.to_string(),
    })
    .with_title(format!("Code: {}", lang.unwrap_or("text")));
    ctx.emit(slide);
}

fn handle_blockquote(text: &str, ctx: &mut ParsingContext) {
    ctx.flush();
    let content = text.trim();
    if content.is_empty() {
        return;
    }
    let slide = Slide::new(SlideBody::Notes {
        content: content.to_string(),
    })
    .with_title(BLOCKQUOTE_TITLE);
    ctx.emit(slide);
}

fn handle_html(value: &str, location: SourceLocation, ctx: &mut ParsingContext) {
    if let Some(parsed) = parse_comment_directive(value) {
        apply_directive(parsed, location, ctx);
        return;
    }
    if comment_body(value).is_some() {
        return;
    }

    let text = clean_html(value);
    if !text.is_empty() {
        ctx.push_bullet(text, 0);
    }
}

fn apply_directive(
    parsed: Result<Directive, DirectiveError>,
    location: SourceLocation,
    ctx: &mut ParsingContext,
) {
    let directive = match parsed {
        Ok(directive) => directive,
        Err(err) => {
            ctx.warn(ConversionWarning::MalformedDirective {
                location,
                message: err.to_string(),
            });
            return;
        }
    };

    match directive {
        Directive::Notes(text) => ctx.attach_notes(&text, location),
        Directive::Chart(chart) => ctx.seed_chart(ChartSeed {
            chart_type: chart.params.contains_key("type").then_some(chart.chart_type),
            title: chart.title,
            location,
        }),
        Directive::Slide(slide) => apply_slide_directive(slide, ctx),
    }
}

fn apply_slide_directive(directive: SlideDirective, ctx: &mut ParsingContext) {
    match directive.kind {
        SlideDirectiveKind::Text if directive.title.is_none() && directive.background.is_none() => {
            ctx.flush()
        }
        SlideDirectiveKind::Text => ctx.start_slide(directive.title, directive.background),
        SlideDirectiveKind::Custom => {
            let claimed = ctx.take_for_standalone().unwrap_or_default();
            let mut slide = Slide::new(SlideBody::Custom {
                elements: directive.elements,
            })
            .with_optional_title(directive.title.or(claimed.title));
            slide.notes = claimed.notes;
            slide.background_color = directive.background.or(claimed.background_color);
            ctx.emit(slide);
        }
    }
}
