//! Post-processors that run over a finished slide sequence.

use crate::options::ConvertOptions;
use deckmark_core::{Layout, Slide, SlideBody};

/// Title of the inserted table-of-contents slide.
pub const TOC_TITLE: &str = "Table of Contents";

/// Applies the post-processors enabled in `options`: table of contents first,
/// so numbering counts the inserted slide.
pub fn apply(slides: &mut Vec<Slide>, options: &ConvertOptions) {
    if options.table_of_contents {
        insert_table_of_contents(slides);
    }
    if options.slide_numbers {
        number_slides(slides);
    }
}

/// Inserts a text slide listing every section divider title.
///
/// The slide goes right after the first opener (a title slide that is not a
/// section divider), or at position 1 when there is none. Decks without
/// section dividers are left unchanged.
pub fn insert_table_of_contents(slides: &mut Vec<Slide>) {
    let bullets: Vec<String> = slides
        .iter()
        .filter(|slide| slide.is_section_divider())
        .filter_map(|slide| slide.title.clone())
        .collect();
    if bullets.is_empty() {
        return;
    }

    let position = slides
        .iter()
        .position(|slide| slide.layout() == Layout::Title && !slide.is_section_divider())
        .map(|index| index + 1)
        .unwrap_or_else(|| slides.len().min(1));

    log::debug!(
        "Inserting table of contents with {} sections at {}",
        bullets.len(),
        position
    );
    let level = vec![0; bullets.len()];
    let toc = Slide::new(SlideBody::Text {
        bullets,
        level: Some(level),
    })
    .with_title(TOC_TITLE);
    slides.insert(position, toc);
}

/// Sets `"<n> / <total>"` on every non-title slide. `n` counts all slides.
pub fn number_slides(slides: &mut [Slide]) {
    let total = slides.len();
    for (index, slide) in slides.iter_mut().enumerate() {
        if slide.layout() != Layout::Title {
            slide.slide_number = Some(format!("{} / {}", index + 1, total));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(text: &str) -> Slide {
        Slide::new(SlideBody::Title {
            subtitle: None,
            author: None,
            date: None,
        })
        .with_title(text)
    }

    fn section(text: &str) -> Slide {
        title(text).with_background("#1F4E79")
    }

    fn text(bullet: &str) -> Slide {
        Slide::new(SlideBody::Text {
            bullets: vec![bullet.to_string()],
            level: Some(vec![0]),
        })
    }

    #[test]
    fn toc_follows_opener() {
        let mut slides = vec![title("Deck"), section("One"), text("a"), section("Two")];
        insert_table_of_contents(&mut slides);

        assert_eq!(slides.len(), 5);
        assert_eq!(slides[1].title.as_deref(), Some(TOC_TITLE));
        assert_eq!(
            slides[1].body,
            SlideBody::Text {
                bullets: vec!["One".to_string(), "Two".to_string()],
                level: Some(vec![0, 0]),
            }
        );
    }

    #[test]
    fn toc_without_opener_goes_second() {
        let mut slides = vec![section("One"), text("a")];
        insert_table_of_contents(&mut slides);
        assert_eq!(slides[1].title.as_deref(), Some(TOC_TITLE));
    }

    #[test]
    fn toc_skipped_without_sections() {
        let mut slides = vec![title("Deck"), text("a")];
        insert_table_of_contents(&mut slides);
        assert_eq!(slides.len(), 2);
    }

    #[test]
    fn numbering_skips_title_slides() {
        let mut slides = vec![title("Deck"), text("a"), section("S"), text("b")];
        number_slides(&mut slides);

        let numbers: Vec<Option<&str>> =
            slides.iter().map(|s| s.slide_number.as_deref()).collect();
        assert_eq!(numbers, vec![None, Some("2 / 4"), None, Some("4 / 4")]);
    }

    #[test]
    fn apply_numbers_after_toc() {
        let mut slides = vec![title("Deck"), section("One"), text("a")];
        let options = ConvertOptions {
            table_of_contents: true,
            slide_numbers: true,
            ..Default::default()
        };
        apply(&mut slides, &options);

        assert_eq!(slides.len(), 4);
        assert_eq!(slides[1].slide_number.as_deref(), Some("2 / 4"));
        assert_eq!(slides[3].slide_number.as_deref(), Some("4 / 4"));
    }
}
