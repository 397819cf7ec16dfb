//! Pre-rendered digit glyph cache.
//!
//! Every two-digit value 00..99 is rendered once, eagerly, when a countdown
//! template is built. The table is immutable afterwards: frames reference
//! the same images, so glyph rendering cost is paid once per template no
//! matter how many frames are composited.

use image::RgbaImage;
use tracing::debug;

use crate::color::Argb;
use crate::config::DigitStyle;
use crate::error::{RenderError, Result};
use crate::text::{styled_text_image, FontCatalog, TextAttrs};

/// Number of pre-rendered glyphs: one per two-digit value.
pub const GLYPH_COUNT: usize = 100;

/// Immutable table of 100 colorized digit glyph images, index = value.
pub struct GlyphTable {
    glyphs: Vec<RgbaImage>,
}

impl GlyphTable {
    /// Eagerly render all 100 glyphs from the shared digit style and an
    /// optional text template.
    pub fn build(
        style: &DigitStyle,
        text_template: Option<&str>,
        catalog: &mut FontCatalog,
    ) -> Result<Self> {
        let attrs = TextAttrs {
            color: Argb::from_hex(&style.color),
            font: style.font.clone(),
            font_file: style.font_file.clone(),
            box_width: style.width,
            box_height: style.height,
            anchor: style.text_alignment,
            padding_top: 0,
            padding_bottom: 0,
        };

        let mut glyphs = Vec::with_capacity(GLYPH_COUNT);
        for value in 0..GLYPH_COUNT {
            let text = glyph_text(value as u32, text_template);
            glyphs.push(styled_text_image(catalog, &text, &attrs)?);
        }

        debug!("glyph table built: {} entries", glyphs.len());
        Ok(Self { glyphs })
    }

    /// Look up the glyph for a two-digit value.
    pub fn get(&self, value: u32) -> Option<&RgbaImage> {
        self.glyphs.get(value as usize)
    }

    /// Look up a glyph, failing loudly on an out-of-range value.
    pub fn get_checked(&self, unit: &'static str, value: u32) -> std::result::Result<&RgbaImage, RenderError> {
        self.get(value)
            .ok_or(RenderError::DigitOutOfRange { unit, value })
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// The text rendered for one glyph: the zero-padded two-digit value,
/// substituted into the template's single `%s` placeholder when a template
/// is configured.
fn glyph_text(value: u32, text_template: Option<&str>) -> String {
    let digits = format!("{value:02}");
    match text_template.filter(|t| !t.is_empty()) {
        Some(template) => template.replacen("%s", &digits, 1),
        None => digits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DigitStyle;
    use crate::text::system_font_path;

    #[test]
    fn test_glyph_text_zero_padded() {
        assert_eq!(glyph_text(0, None), "00");
        assert_eq!(glyph_text(7, None), "07");
        assert_eq!(glyph_text(42, None), "42");
        assert_eq!(glyph_text(99, None), "99");
    }

    #[test]
    fn test_glyph_text_template_substitution() {
        assert_eq!(glyph_text(7, Some("Day %s")), "Day 07");
        assert_eq!(glyph_text(99, Some("%s left")), "99 left");
        // an empty template is treated as absent
        assert_eq!(glyph_text(3, Some("")), "03");
        // only the first placeholder is consumed
        assert_eq!(glyph_text(5, Some("%s/%s")), "05/%s");
    }

    #[test]
    fn test_table_has_exactly_100_entries() {
        let Some(path) = system_font_path() else {
            return;
        };
        let style = DigitStyle {
            font_file: Some(path),
            ..DigitStyle::default()
        };
        let mut catalog = FontCatalog::new();
        let table = GlyphTable::build(&style, None, &mut catalog).unwrap();

        assert_eq!(table.len(), GLYPH_COUNT);
        assert!(table.get(0).is_some());
        assert!(table.get(99).is_some());
        assert!(table.get(100).is_none());
    }

    #[test]
    fn test_fixed_box_gives_uniform_glyph_sizes() {
        let Some(path) = system_font_path() else {
            return;
        };
        let style = DigitStyle {
            width: 60,
            height: 40,
            font_file: Some(path),
            ..DigitStyle::default()
        };
        let mut catalog = FontCatalog::new();
        let table = GlyphTable::build(&style, None, &mut catalog).unwrap();

        for value in [0, 7, 55, 99] {
            assert_eq!(table.get(value).unwrap().dimensions(), (60, 40));
        }
    }

    #[test]
    fn test_out_of_range_lookup_fails_loudly() {
        let Some(path) = system_font_path() else {
            return;
        };
        let style = DigitStyle {
            font_file: Some(path),
            ..DigitStyle::default()
        };
        let mut catalog = FontCatalog::new();
        let table = GlyphTable::build(&style, None, &mut catalog).unwrap();

        let err = table.get_checked("seconds", 100).unwrap_err();
        assert!(matches!(
            err,
            RenderError::DigitOutOfRange {
                unit: "seconds",
                value: 100
            }
        ));
    }
}
