//! Text mask rasterization and colorization.
//!
//! The pipeline mirrors how overlay glyphs are built: rasterize the text to
//! a natural-size alpha mask, optionally pad its vertical extent, optionally
//! align it inside an explicit bounding box, then join a constant color with
//! the mask as its alpha channel.

use std::path::PathBuf;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{GrayImage, Rgba, RgbaImage};
use tracing::{debug, warn};

use crate::color::Argb;
use crate::config::Anchor;
use crate::error::RenderError;
use crate::text::fonts::{FontCatalog, FontSpec};

/// Everything needed to turn a string into a colorized overlay image.
#[derive(Debug, Clone, Default)]
pub struct TextAttrs {
    pub color: Argb,
    pub font: Option<String>,
    pub font_file: Option<PathBuf>,
    /// Bounding box; 0 means "natural size" per axis.
    pub box_width: u32,
    pub box_height: u32,
    pub anchor: Anchor,
    pub padding_top: u32,
    pub padding_bottom: u32,
}

/// Rasterize `text` into a single-channel coverage mask at its natural size.
///
/// Glyphs are laid out horizontally with kerning; overlapping coverage takes
/// the maximum. Empty text cannot be rasterized and is an error.
pub fn render_mask(
    font: &FontVec,
    size: f32,
    text: &str,
) -> std::result::Result<GrayImage, RenderError> {
    if text.is_empty() {
        return Err(RenderError::InvalidText);
    }

    let scale = PxScale::from(size);
    let scaled = font.as_scaled(scale);

    // Measure the advance width first.
    let mut width = 0.0f32;
    let mut prev = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }
    let height = scaled.height();

    let pad = 2;
    let mask_w = (width.ceil() as u32 + pad).max(1);
    let mask_h = (height.ceil() as u32 + pad).max(1);
    let mut mask = GrayImage::new(mask_w, mask_h);

    let baseline = scaled.ascent();
    let mut cursor = 0.0f32;
    let mut prev = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            cursor += scaled.kern(prev, id);
        }

        let glyph = id.with_scale_and_position(scale, ab_glyph::point(cursor, baseline));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, coverage| {
                let x = px as i32 + bounds.min.x as i32;
                let y = py as i32 + bounds.min.y as i32;
                if x >= 0 && y >= 0 && (x as u32) < mask_w && (y as u32) < mask_h {
                    let value = (coverage * 255.0) as u8;
                    let pixel = mask.get_pixel_mut(x as u32, y as u32);
                    pixel.0[0] = pixel.0[0].max(value);
                }
            });
        }

        cursor += scaled.h_advance(id);
        prev = Some(id);
    }

    Ok(mask)
}

/// Extend a mask's vertical extent by transparent rows above and below.
pub fn pad_vertical(mask: &GrayImage, top: u32, bottom: u32) -> GrayImage {
    if top == 0 && bottom == 0 {
        return mask.clone();
    }

    let mut out = GrayImage::new(mask.width(), mask.height() + top + bottom);
    for (x, y, pixel) in mask.enumerate_pixels() {
        out.put_pixel(x, y + top, *pixel);
    }
    out
}

/// Place a mask inside a bounding box at the given anchor.
///
/// A requested dimension of 0 keeps the natural size on that axis. A box
/// smaller than the mask never crops: the box is silently widened to the
/// natural size and a diagnostic is emitted.
pub fn align_in_box(mask: &GrayImage, anchor: Anchor, width: u32, height: u32) -> GrayImage {
    let natural_w = mask.width();
    let natural_h = mask.height();

    let mut out_w = if width > 0 { width } else { natural_w };
    let mut out_h = if height > 0 { height } else { natural_h };

    if out_w < natural_w {
        warn!(
            "requested box width {out_w} is smaller than the rendered text width {natural_w}, \
             widening to fit"
        );
        out_w = natural_w;
    }
    if out_h < natural_h {
        warn!(
            "requested box height {out_h} is smaller than the rendered text height {natural_h}, \
             widening to fit"
        );
        out_h = natural_h;
    }

    if out_w == natural_w && out_h == natural_h {
        return mask.clone();
    }

    let (dx, dy) = anchor_offset(anchor, natural_w, natural_h, out_w, out_h);
    let mut out = GrayImage::new(out_w, out_h);
    for (x, y, pixel) in mask.enumerate_pixels() {
        out.put_pixel(x + dx, y + dy, *pixel);
    }
    out
}

/// Offset of the inner rectangle inside the outer one for an anchor.
/// The outer rectangle is never smaller than the inner one.
fn anchor_offset(anchor: Anchor, inner_w: u32, inner_h: u32, outer_w: u32, outer_h: u32) -> (u32, u32) {
    let dx = outer_w - inner_w;
    let dy = outer_h - inner_h;

    let x = match anchor {
        Anchor::TopLeft | Anchor::Left | Anchor::BottomLeft => 0,
        Anchor::Top | Anchor::Center | Anchor::Bottom => dx / 2,
        Anchor::TopRight | Anchor::Right | Anchor::BottomRight => dx,
    };
    let y = match anchor {
        Anchor::TopLeft | Anchor::Top | Anchor::TopRight => 0,
        Anchor::Left | Anchor::Center | Anchor::Right => dy / 2,
        Anchor::BottomLeft | Anchor::Bottom | Anchor::BottomRight => dy,
    };
    (x, y)
}

/// Join a constant color with a coverage mask as its alpha channel.
///
/// Only the color's RGB channels are used; the mask alone decides coverage.
pub fn colorize(mask: &GrayImage, color: Argb) -> RgbaImage {
    RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
        Rgba([color.r, color.g, color.b, mask.get_pixel(x, y).0[0]])
    })
}

/// Render a styled overlay image: mask, pad, align, colorize.
///
/// Padding expands the mask before alignment; alignment only applies when an
/// explicit box dimension is set.
pub fn styled_text_image(
    catalog: &mut FontCatalog,
    text: &str,
    attrs: &TextAttrs,
) -> std::result::Result<RgbaImage, RenderError> {
    let font = catalog.resolve(attrs.font_file.as_deref())?;
    let spec = FontSpec::parse(attrs.font.as_deref());
    if let Some(family) = &spec.family {
        debug!("font family {family:?} requested; glyphs come from the resolved font file");
    }

    let mut mask = render_mask(&font, spec.size, text)?;

    if attrs.padding_top > 0 || attrs.padding_bottom > 0 {
        mask = pad_vertical(&mask, attrs.padding_top, attrs.padding_bottom);
    }

    if attrs.box_width > 0 || attrs.box_height > 0 {
        mask = align_in_box(&mask, attrs.anchor, attrs.box_width, attrs.box_height);
    }

    Ok(colorize(&mask, attrs.color))
}
