//! The slide-deck model handed to renderers and template processors.

use crate::DeckError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Title used when neither frontmatter nor a level-1 heading provides one.
pub const UNTITLED: &str = "Untitled Presentation";

/// A complete presentation: deck metadata plus its ordered slides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    /// Presentation title.
    pub title: String,
    /// Author shown in document properties and on title slides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Company shown in document properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Subject shown in document properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Theme name, interpreted by the renderer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// Slides in presentation order.
    #[serde(default)]
    pub slides: Vec<Slide>,
}

impl Presentation {
    /// Creates an empty presentation with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: None,
            company: None,
            subject: None,
            theme: None,
            slides: Vec::new(),
        }
    }

    /// Deserializes a presentation from its JSON form.
    pub fn from_json(input: &str) -> Result<Self, DeckError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Serializes the presentation to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, DeckError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// One slide: layout-specific body plus the fields every layout shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    /// Layout discriminant and layout-specific fields.
    #[serde(flatten)]
    pub body: SlideBody,
    /// Slide title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Speaker notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Background color as `#RRGGBB`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// `"<n> / <total>"` annotation added by slide numbering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_number: Option<String>,
}

impl Slide {
    /// Creates an untitled slide with the given body.
    pub fn new(body: SlideBody) -> Self {
        Self {
            body,
            title: None,
            notes: None,
            background_color: None,
            slide_number: None,
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the title when one is given.
    pub fn with_optional_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Sets the background color.
    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    /// Returns the layout discriminant.
    pub fn layout(&self) -> Layout {
        self.body.layout()
    }

    /// True for level-2 section dividers: title slides with a forced background.
    pub fn is_section_divider(&self) -> bool {
        self.layout() == Layout::Title && self.background_color.is_some()
    }

    /// Appends speaker notes, joining with a newline when notes already exist.
    pub fn append_notes(&mut self, text: &str) {
        self.notes = Some(join_notes(self.notes.take(), text));
    }
}

/// Joins existing notes with new text.
pub fn join_notes(existing: Option<String>, text: &str) -> String {
    match existing {
        Some(mut notes) if !notes.is_empty() => {
            notes.push('\n');
            notes.push_str(text);
            notes
        }
        _ => text.to_string(),
    }
}

/// Slide layout tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Layout {
    /// Opener or section divider.
    Title,
    /// Bulleted text.
    Text,
    /// Single image.
    Image,
    /// Chart.
    Chart,
    /// Table.
    Table,
    /// Free-form notes or code.
    Notes,
    /// Positioned custom elements.
    Custom,
}

/// Layout-specific slide content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SlideBody {
    /// Opener or section divider.
    Title {
        /// Subtitle line.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subtitle: Option<String>,
        /// Author line.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        author: Option<String>,
        /// Date line.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        date: Option<String>,
    },
    /// Bulleted text.
    Text {
        /// Bullet text in order.
        bullets: Vec<String>,
        /// Indent level per bullet, parallel to `bullets`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        level: Option<Vec<u8>>,
    },
    /// Single image.
    Image {
        /// Where the image comes from.
        #[serde(flatten)]
        source: ImageSource,
        /// Caption text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
        /// Sizing hint for the renderer.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sizing: Option<ImageSizing>,
    },
    /// Chart.
    Chart {
        /// Chart kind.
        chart_type: ChartType,
        /// Labels and datasets.
        data: ChartData,
    },
    /// Table.
    Table {
        /// Header row.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        headers: Option<Vec<String>>,
        /// Body rows, passed through as parsed.
        table_data: Vec<Vec<String>>,
        /// Presentation defaults for the table.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<TableStyle>,
    },
    /// Free-form notes or code.
    Notes {
        /// Raw content.
        content: String,
    },
    /// Positioned custom elements.
    Custom {
        /// Elements to place on the slide.
        #[serde(default)]
        elements: Vec<SlideElement>,
    },
}

impl SlideBody {
    /// Returns the layout discriminant.
    pub fn layout(&self) -> Layout {
        match self {
            SlideBody::Title { .. } => Layout::Title,
            SlideBody::Text { .. } => Layout::Text,
            SlideBody::Image { .. } => Layout::Image,
            SlideBody::Chart { .. } => Layout::Chart,
            SlideBody::Table { .. } => Layout::Table,
            SlideBody::Notes { .. } => Layout::Notes,
            SlideBody::Custom { .. } => Layout::Custom,
        }
    }
}

/// Exactly one of a local path or a remote URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSource {
    /// Local file path.
    #[serde(rename = "imagePath")]
    Path(String),
    /// HTTP(S) URL.
    #[serde(rename = "imageUrl")]
    Url(String),
}

impl ImageSource {
    /// Classifies an image target: HTTP(S) prefixes become URLs, anything else a path.
    pub fn from_target(target: &str) -> Self {
        let lower = target.trim_start().to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            ImageSource::Url(target.to_string())
        } else {
            ImageSource::Path(target.to_string())
        }
    }
}

/// Image sizing hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSizing {
    /// Sizing strategy.
    #[serde(rename = "type")]
    pub kind: SizingKind,
    /// Target width in inches.
    pub w: f64,
    /// Target height in inches.
    pub h: f64,
}

/// Image sizing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SizingKind {
    /// Scale to fit inside the box.
    Contain,
    /// Scale to cover the box.
    Cover,
    /// Crop to the box.
    Crop,
}

/// Chart kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartType {
    /// Vertical bars.
    #[default]
    Bar,
    /// Lines.
    Line,
    /// Pie.
    Pie,
    /// Doughnut.
    Doughnut,
    /// Filled area.
    Area,
    /// Scatter plot.
    Scatter,
    /// Radar.
    Radar,
}

impl FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bar" => Ok(ChartType::Bar),
            "line" => Ok(ChartType::Line),
            "pie" => Ok(ChartType::Pie),
            "doughnut" => Ok(ChartType::Doughnut),
            "area" => Ok(ChartType::Area),
            "scatter" => Ok(ChartType::Scatter),
            "radar" => Ok(ChartType::Radar),
            other => Err(format!("unknown chart type '{}'", other)),
        }
    }
}

/// Normalized chart data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartData {
    /// Category labels.
    pub labels: Vec<String>,
    /// One series per dataset.
    pub datasets: Vec<Dataset>,
}

impl ChartData {
    /// True when every dataset has exactly one value per label.
    pub fn is_consistent(&self) -> bool {
        self.datasets
            .iter()
            .all(|dataset| dataset.data.len() == self.labels.len())
    }
}

/// One named series of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Series name.
    pub label: String,
    /// Values, one per label.
    pub data: Vec<f64>,
}

/// Presentation defaults attached to table slides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStyle {
    /// Header row fill.
    pub header_background: String,
    /// Header row text color.
    pub header_color: String,
    /// Fill for every other body row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_row_background: Option<String>,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header_background: "#1F4E79".to_string(),
            header_color: "#FFFFFF".to_string(),
            alternate_row_background: Some("#F2F2F2".to_string()),
        }
    }
}

/// A positioned element on a custom slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideElement {
    /// Element kind.
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Left offset in inches.
    pub x: f64,
    /// Top offset in inches.
    pub y: f64,
    /// Width in inches.
    pub w: f64,
    /// Height in inches.
    pub h: f64,
    /// Kind-specific payload (text, image path, chart data, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
}

/// Custom element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementKind {
    /// Text box.
    Text,
    /// Image.
    Image,
    /// Shape.
    Shape,
    /// Chart.
    Chart,
    /// Table.
    Table,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_slide_serializes_with_layout_tag() {
        let slide = Slide::new(SlideBody::Text {
            bullets: vec!["One".to_string()],
            level: Some(vec![0]),
        })
        .with_title("Agenda");

        let value = serde_json::to_value(&slide).unwrap();
        assert_eq!(
            value,
            json!({"layout": "text", "bullets": ["One"], "level": [0], "title": "Agenda"})
        );
    }

    #[test]
    fn image_source_flattens_to_single_key() {
        let slide = Slide::new(SlideBody::Image {
            source: ImageSource::from_target("https://example.com/a.png"),
            caption: None,
            sizing: None,
        });
        let value = serde_json::to_value(&slide).unwrap();
        assert_eq!(value["imageUrl"], "https://example.com/a.png");
        assert!(value.get("imagePath").is_none());
    }

    #[test]
    fn image_target_classification() {
        assert_eq!(
            ImageSource::from_target("HTTPS://x.io/a.png"),
            ImageSource::Url("HTTPS://x.io/a.png".to_string())
        );
        assert_eq!(
            ImageSource::from_target("img/a.png"),
            ImageSource::Path("img/a.png".to_string())
        );
    }

    #[test]
    fn chart_slide_uses_camel_case_fields() {
        let slide = Slide::new(SlideBody::Chart {
            chart_type: ChartType::Line,
            data: ChartData::default(),
        });
        let value = serde_json::to_value(&slide).unwrap();
        assert_eq!(value["layout"], "chart");
        assert_eq!(value["chartType"], "line");
    }

    #[test]
    fn presentation_round_trips_through_json() {
        let input = r#"{
            "title": "Deck",
            "author": "Ada",
            "slides": [
                {"layout": "title", "title": "Hello", "subtitle": "World"},
                {"layout": "table", "headers": ["A"], "tableData": [["1"]]},
                {"layout": "image", "imagePath": "a.png", "caption": "A"},
                {"layout": "notes", "title": "Note", "content": "text"}
            ]
        }"#;
        let deck = Presentation::from_json(input).unwrap();
        assert_eq!(deck.slides.len(), 4);
        assert_eq!(deck.slides[0].layout(), Layout::Title);
        assert_eq!(
            deck.slides[2].body,
            SlideBody::Image {
                source: ImageSource::Path("a.png".to_string()),
                caption: Some("A".to_string()),
                sizing: None,
            }
        );
        let again = Presentation::from_json(&deck.to_json_pretty().unwrap()).unwrap();
        assert_eq!(again, deck);
    }

    #[test]
    fn unknown_layout_is_rejected() {
        let err = Presentation::from_json(r#"{"title": "x", "slides": [{"layout": "wat"}]}"#);
        assert!(matches!(err, Err(DeckError::InvalidJson(_))));
    }

    #[test]
    fn chart_type_parsing() {
        assert_eq!("Line".parse::<ChartType>(), Ok(ChartType::Line));
        assert!("sparkline".parse::<ChartType>().is_err());
    }

    #[test]
    fn notes_are_joined() {
        let mut slide = Slide::new(SlideBody::Notes {
            content: String::new(),
        });
        slide.append_notes("a");
        slide.append_notes("b");
        assert_eq!(slide.notes.as_deref(), Some("a\nb"));
    }

    #[test]
    fn section_divider_requires_background() {
        let body = SlideBody::Title {
            subtitle: None,
            author: None,
            date: None,
        };
        assert!(!Slide::new(body.clone()).is_section_divider());
        assert!(Slide::new(body).with_background("#000000").is_section_divider());
    }
}
