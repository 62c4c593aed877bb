//! Spans: the typed, formatted text leaves of the document tree.

use crate::schema::polygon::PolygonBox;
use serde::{Deserialize, Serialize};

/// Inline formatting carried by a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanFormat {
    Plain,
    Bold,
    Italic,
    Math,
}

/// How a span's text came to exist.
///
/// Upstream extraction produces `Pdftext` or `Ocr` spans with real font
/// metadata; the correction pipeline synthesizes `Vlm` spans whose font
/// fields are placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    Pdftext,
    Ocr,
    Vlm,
}

/// A typed text fragment belonging to a [`Line`](crate::schema::Line).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub polygon: PolygonBox,
    pub text: String,
    pub font: String,
    pub font_weight: f32,
    pub font_size: f32,
    pub minimum_position: u64,
    pub maximum_position: u64,
    pub formats: Vec<SpanFormat>,
    pub text_extraction_method: ExtractionMethod,
}

impl Span {
    /// An upstream-extracted span with real font metadata.
    pub fn extracted(
        polygon: PolygonBox,
        text: impl Into<String>,
        format: SpanFormat,
        font: impl Into<String>,
        font_weight: f32,
        font_size: f32,
    ) -> Self {
        Self {
            polygon,
            text: text.into(),
            font: font.into(),
            font_weight,
            font_size,
            minimum_position: 0,
            maximum_position: 0,
            formats: vec![format],
            text_extraction_method: ExtractionMethod::Pdftext,
        }
    }

    /// A span synthesized from a model correction. No font was observed, so
    /// the font fields are zeroed placeholders; the geometry is inherited
    /// from the owning line.
    pub fn synthesized(polygon: PolygonBox, text: impl Into<String>, format: SpanFormat) -> Self {
        Self {
            polygon,
            text: text.into(),
            font: "Unknown".to_string(),
            font_weight: 0.0,
            font_size: 0.0,
            minimum_position: 0,
            maximum_position: 0,
            formats: vec![format],
            text_extraction_method: ExtractionMethod::Vlm,
        }
    }

    /// The span's text wrapped in its inline tag, the inverse of the markup
    /// parser. `Plain` spans render as bare text.
    pub fn formatted_text(&self) -> String {
        match self.formats.first() {
            Some(SpanFormat::Bold) => format!("<b>{}</b>", self.text),
            Some(SpanFormat::Italic) => format!("<i>{}</i>", self.text),
            Some(SpanFormat::Math) => format!("<math>{}</math>", self.text),
            Some(SpanFormat::Plain) | None => self.text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_span_has_placeholder_font() {
        let s = Span::synthesized(PolygonBox::new(0.0, 0.0, 1.0, 1.0), "x = 1", SpanFormat::Math);
        assert_eq!(s.font, "Unknown");
        assert_eq!(s.font_weight, 0.0);
        assert_eq!(s.font_size, 0.0);
        assert_eq!(s.text_extraction_method, ExtractionMethod::Vlm);
        assert_eq!(s.formats, vec![SpanFormat::Math]);
    }

    #[test]
    fn formatted_text_wraps_tagged_formats() {
        let poly = PolygonBox::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(
            Span::synthesized(poly, "foo", SpanFormat::Bold).formatted_text(),
            "<b>foo</b>"
        );
        assert_eq!(
            Span::synthesized(poly, " bar", SpanFormat::Plain).formatted_text(),
            " bar"
        );
    }
}
