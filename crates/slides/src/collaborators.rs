//! Seams for the consumers of a converted deck.
//!
//! The converter stops at the [`Presentation`] model. Rendering to a binary
//! file, filling an existing template, and structural validation belong to
//! implementations of the traits below.

use deckmark_core::Presentation;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Renders a presentation to file bytes.
pub trait Renderer {
    /// Backend error.
    type Error: std::error::Error + 'static;

    /// Produces the finished file.
    fn render(&self, presentation: &Presentation) -> Result<Vec<u8>, Self::Error>;
}

/// Maps a presentation onto the placeholders of an existing file.
pub trait TemplateProcessor {
    /// Backend error.
    type Error: std::error::Error + 'static;

    /// Returns the template with the presentation applied.
    fn apply_template(
        &self,
        presentation: &Presentation,
        template: &[u8],
    ) -> Result<Vec<u8>, Self::Error>;
}

/// Checks structural invariants the converter does not enforce: dataset
/// lengths, ragged table rows, color formats.
pub trait Validator {
    /// Validates without failing; problems are reported as field errors.
    fn validate(&self, presentation: &Presentation) -> ValidationReport;
}

impl<F> Validator for F
where
    F: Fn(&Presentation) -> ValidationReport,
{
    fn validate(&self, presentation: &Presentation) -> ValidationReport {
        (self)(presentation)
    }
}

/// Result of [`Validator::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True when no errors were found.
    pub valid: bool,
    /// Field-level errors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    /// A passing report.
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// A report that is valid exactly when `errors` is empty.
    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// One validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Path to the offending field, e.g. `slides[2].data.datasets[0]`.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Why a deck was not delivered.
#[derive(Debug, Error)]
pub enum DeliveryError<E: std::error::Error + 'static> {
    /// The validator rejected the deck.
    #[error("presentation failed validation with {} error(s)", .0.len())]
    Invalid(Vec<FieldError>),
    /// The renderer or template processor failed.
    #[error("backend failed: {0}")]
    Backend(#[source] E),
}

/// Validates, then renders.
pub fn deliver<V, R>(
    presentation: &Presentation,
    validator: &V,
    renderer: &R,
) -> Result<Vec<u8>, DeliveryError<R::Error>>
where
    V: Validator + ?Sized,
    R: Renderer + ?Sized,
{
    check(presentation, validator).map_err(DeliveryError::Invalid)?;
    renderer
        .render(presentation)
        .map_err(DeliveryError::Backend)
}

/// Validates, then applies the deck to `template`.
pub fn deliver_with_template<V, T>(
    presentation: &Presentation,
    validator: &V,
    processor: &T,
    template: &[u8],
) -> Result<Vec<u8>, DeliveryError<T::Error>>
where
    V: Validator + ?Sized,
    T: TemplateProcessor + ?Sized,
{
    check(presentation, validator).map_err(DeliveryError::Invalid)?;
    processor
        .apply_template(presentation, template)
        .map_err(DeliveryError::Backend)
}

fn check<V>(presentation: &Presentation, validator: &V) -> Result<(), Vec<FieldError>>
where
    V: Validator + ?Sized,
{
    let report = validator.validate(presentation);
    if report.valid && report.errors.is_empty() {
        Ok(())
    } else {
        log::warn!(
            "Presentation '{}' failed validation with {} error(s)",
            presentation.title,
            report.errors.len()
        );
        Err(report.errors)
    }
}
