//! # Text Rendering Module
//!
//! Rasterizes text into alpha masks and colorized overlay images: font
//! resolution, natural-size mask rendering, vertical padding, anchor
//! alignment inside a bounding box, and colorization.

pub mod fonts;
pub mod renderer;

pub use fonts::{system_font_path, FontCatalog, FontSpec, DEFAULT_FONT_SIZE};
pub use renderer::{align_in_box, colorize, pad_vertical, render_mask, styled_text_image, TextAttrs};
