//! Pixel surface and alpha compositing.
//!
//! [`Canvas`] is a thin wrapper around an RGBA buffer providing the
//! compositing primitives the engine needs: solid-color construction, file
//! decode, Porter-Duff "over" blending of positioned layers, and encoding
//! to a file.

use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::color::Argb;
use crate::error::Result;

/// A single RGBA pixel surface.
#[derive(Clone, Debug)]
pub struct Canvas {
    buffer: RgbaImage,
}

impl Canvas {
    /// Wrap an existing RGBA buffer.
    pub fn new(buffer: RgbaImage) -> Self {
        Self { buffer }
    }

    /// Create an opaque constant-color canvas.
    ///
    /// Only the color's RGB channels are used; the canvas is always opaque.
    pub fn solid(width: u32, height: u32, color: Argb) -> Self {
        let buffer =
            RgbaImage::from_pixel(width, height, Rgba([color.r, color.g, color.b, 255]));
        Self { buffer }
    }

    /// Decode an image file into a canvas.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let buffer = image::open(path.as_ref())?.to_rgba8();
        Ok(Self { buffer })
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.buffer
    }

    pub fn into_image(self) -> RgbaImage {
        self.buffer
    }

    /// Blend a layer over this canvas at the given offset.
    ///
    /// Standard "over" compositing; the layer is clipped to the canvas
    /// bounds, so offsets may be negative or run past the edges.
    pub fn blend_layer(&mut self, layer: &RgbaImage, x: i32, y: i32) {
        let canvas_w = self.buffer.width() as i32;
        let canvas_h = self.buffer.height() as i32;
        let layer_w = layer.width() as i32;
        let layer_h = layer.height() as i32;

        let x_start = x.max(0);
        let y_start = y.max(0);
        let x_end = (x + layer_w).min(canvas_w);
        let y_end = (y + layer_h).min(canvas_h);

        for ty in y_start..y_end {
            for tx in x_start..x_end {
                let lx = (tx - x) as u32;
                let ly = (ty - y) as u32;

                let fg = *layer.get_pixel(lx, ly);
                let bg = *self.buffer.get_pixel(tx as u32, ty as u32);
                self.buffer
                    .put_pixel(tx as u32, ty as u32, blend_over(bg, fg));
            }
        }
    }

    /// Encode the canvas to a file; the format follows the extension.
    ///
    /// JPEG has no alpha channel, so those files get an RGB conversion.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let is_jpeg = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
            .unwrap_or(false);

        if is_jpeg {
            let rgb = image::DynamicImage::ImageRgba8(self.buffer.clone()).to_rgb8();
            rgb.save(path)?;
        } else {
            self.buffer.save(path)?;
        }
        Ok(())
    }
}

/// Porter-Duff "over": the upper layer's alpha decides how much of the
/// lower layer shows through.
fn blend_over(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    let fg_alpha = foreground[3] as f32 / 255.0;
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);
    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend = |fg: u8, bg: u8| -> u8 {
        let fg = fg as f32 / 255.0;
        let bg = bg as f32 / 255.0;
        let result = (fg * fg_alpha + bg * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend(foreground[0], background[0]),
        blend(foreground[1], background[1]),
        blend(foreground[2], background[2]),
        (out_alpha * 255.0) as u8,
    ])
}
