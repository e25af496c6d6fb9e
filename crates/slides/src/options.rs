//! Conversion options.

use serde::{Deserialize, Serialize};

/// Bullets per slide before auto-split closes the slide.
pub const DEFAULT_MAX_BULLETS: usize = 6;

/// Options controlling one conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOptions {
    /// Close a text slide as soon as it reaches `max_bullets_per_slide`.
    #[serde(default = "default_true")]
    pub auto_split: bool,
    /// Auto-split threshold. `0` means no limit.
    #[serde(default = "default_max_bullets")]
    pub max_bullets_per_slide: usize,
    /// Insert a table-of-contents slide listing section dividers.
    #[serde(default)]
    pub table_of_contents: bool,
    /// Annotate non-title slides with `"<n> / <total>"`.
    #[serde(default)]
    pub slide_numbers: bool,
    /// Classify paragraphs, code blocks and tables as chart data when they fit.
    /// Fenced `chart`/`csv` blocks are charts regardless.
    #[serde(default = "default_true")]
    pub detect_charts: bool,
}

impl ConvertOptions {
    /// Returns the bullet count that triggers auto-split, if auto-split applies.
    pub fn split_threshold(&self) -> Option<usize> {
        (self.auto_split && self.max_bullets_per_slide > 0).then_some(self.max_bullets_per_slide)
    }
}

fn default_true() -> bool {
    true
}

fn default_max_bullets() -> usize {
    DEFAULT_MAX_BULLETS
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            auto_split: default_true(),
            max_bullets_per_slide: default_max_bullets(),
            table_of_contents: false,
            slide_numbers: false,
            detect_charts: default_true(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ConvertOptions::default();
        assert!(options.auto_split);
        assert_eq!(options.split_threshold(), Some(6));
        assert!(!options.table_of_contents);
        assert!(!options.slide_numbers);
        assert!(options.detect_charts);
    }

    #[test]
    fn deserializes_partial_camel_case_config() {
        let options: ConvertOptions =
            serde_json::from_str(r#"{"maxBulletsPerSlide": 4, "slideNumbers": true}"#).unwrap();
        assert_eq!(options.max_bullets_per_slide, 4);
        assert!(options.slide_numbers);
        assert!(options.auto_split);
        assert!(options.detect_charts);
    }

    #[test]
    fn threshold_disabled() {
        let off = ConvertOptions {
            auto_split: false,
            ..Default::default()
        };
        assert_eq!(off.split_threshold(), None);

        let unlimited = ConvertOptions {
            max_bullets_per_slide: 0,
            ..Default::default()
        };
        assert_eq!(unlimited.split_threshold(), None);
    }
}
