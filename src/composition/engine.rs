//! Countdown composition engine.
//!
//! [`Compositor`] is the opaque engine instance behind every exposed
//! operation. It exists in one of two modes:
//!
//! - **image mode** ([`Compositor::with_background`], [`Compositor::from_file`]):
//!   a plain canvas that supports [`draw_text`](Compositor::draw_text) and
//!   [`save`](Compositor::save);
//! - **countdown mode** ([`Compositor::countdown`]): additionally holds the
//!   pre-baked template state needed by [`render`](Compositor::render).
//!
//! Countdown template state is built exactly once, at construction: the
//! static labels are composited into the background and the 100 digit
//! glyphs are pre-rendered. Both are immutable afterwards, so repeated
//! `render` calls on one instance are cheap, and frames can be composed
//! concurrently against the shared read-only state.

use std::path::Path;

use image::RgbaImage;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::animation::AnimationAsset;
use crate::clock::{Moment, TimeUnit};
use crate::color::Argb;
use crate::composition::canvas::Canvas;
use crate::composition::glyphs::{GlyphTable, GLYPH_COUNT};
use crate::config::{
    CountdownTemplate, CreationOptions, LabelSpec, TextOverlay, DEFAULT_TEXT_COLOR,
};
use crate::error::{RenderError, Result};
use crate::text::{styled_text_image, FontCatalog, TextAttrs};

/// Countdown-mode state: built once per template, read-only afterwards.
struct CountdownSetup {
    glyphs: GlyphTable,
    /// Placement origin per time unit, in [`TimeUnit`] order.
    positions: [(i32, i32); 4],
}

/// The composition engine instance.
pub struct Compositor {
    canvas: Canvas,
    fonts: FontCatalog,
    countdown: Option<CountdownSetup>,
}

impl Compositor {
    /// Open an existing image file as a plain canvas.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("opening image {:?}", path);
        Ok(Self {
            canvas: Canvas::open(path)?,
            fonts: FontCatalog::new(),
            countdown: None,
        })
    }

    /// Create a plain constant-color canvas.
    pub fn with_background(options: &CreationOptions) -> Self {
        Self {
            canvas: Canvas::solid(
                options.width,
                options.height,
                Argb::from_hex(&options.bg_color),
            ),
            fonts: FontCatalog::new(),
            countdown: None,
        }
    }

    /// Build a countdown engine from a validated template.
    ///
    /// Bakes every static label into the background and pre-renders the
    /// digit glyph table. Label compositing cost is paid here once,
    /// regardless of how many frames are rendered later.
    pub fn countdown(template: &CountdownTemplate) -> Result<Self> {
        info!(
            "building countdown template: {}x{}, {} labels",
            template.width,
            template.height,
            template.labels.len()
        );

        let mut fonts = FontCatalog::new();
        let mut canvas = Canvas::solid(
            template.width,
            template.height,
            Argb::from_hex(&template.bg_color),
        );

        for (name, label) in &template.labels {
            let overlay = styled_text_image(&mut fonts, &label.text, &label_attrs(label))?;
            canvas.blend_layer(&overlay, label.position.x, label.position.y);
            debug!(
                "baked label {name:?} at ({}, {})",
                label.position.x, label.position.y
            );
        }

        let glyphs = GlyphTable::build(
            &template.digits.style,
            template.digits.text_template.as_deref(),
            &mut fonts,
        )?;

        let mut positions = [(0, 0); 4];
        for unit in TimeUnit::ALL {
            let position = &template.digits.positions[unit.index()];
            positions[unit.index()] = (position.x, position.y);
        }

        Ok(Self {
            canvas,
            fonts,
            countdown: Some(CountdownSetup { glyphs, positions }),
        })
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    /// Whether this instance was built from a countdown template.
    pub fn is_countdown(&self) -> bool {
        self.countdown.is_some()
    }

    /// Draw free text onto the canvas at the given origin.
    ///
    /// Works in both modes; in countdown mode the text becomes part of the
    /// baked background used by subsequent renders.
    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, overlay: &TextOverlay) -> Result<()> {
        if text.is_empty() {
            return Err(RenderError::InvalidText.into());
        }

        let color = overlay.color.as_deref().unwrap_or(DEFAULT_TEXT_COLOR);
        let attrs = TextAttrs {
            color: Argb::from_hex(color),
            font: overlay.font.clone(),
            font_file: overlay.font_file.clone(),
            ..TextAttrs::default()
        };

        let image = styled_text_image(&mut self.fonts, text, &attrs)?;
        self.canvas.blend_layer(&image, x, y);
        Ok(())
    }

    /// Encode the current canvas to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.canvas.save(path)
    }

    /// Render the countdown animation.
    ///
    /// Produces `frames` pages (minimum 1) starting at `start`, advancing
    /// the duration by one second per frame. Fails with a mode error when
    /// the instance holds no countdown template, and with a unit-named
    /// error when a start component exceeds the two-digit glyph range.
    ///
    /// Frames only share the immutable baked background and glyph table, so
    /// they are composed in parallel and collected back into sequence
    /// order.
    pub fn render(&self, start: Moment, frames: u32) -> Result<AnimationAsset> {
        let setup = self.countdown.as_ref().ok_or(RenderError::NotCountdownMode)?;

        for unit in TimeUnit::ALL {
            let value = start.part(unit);
            if value as usize >= GLYPH_COUNT {
                return Err(RenderError::DigitOutOfRange {
                    unit: unit.name(),
                    value,
                }
                .into());
            }
        }

        let frame_count = frames.max(1) as usize;
        info!("rendering {frame_count} countdown frames from {start:?}");

        let mut moments = Vec::with_capacity(frame_count);
        let mut current = start;
        for _ in 0..frame_count {
            moments.push(current);
            current = current.advance();
        }

        let pages = moments
            .par_iter()
            .map(|moment| self.compose_frame(setup, *moment))
            .collect::<Result<Vec<RgbaImage>>>()?;

        AnimationAsset::assemble(pages, self.canvas.height())
    }

    /// Compose one frame: the baked background with the four digit glyphs
    /// for the given moment blended over it.
    fn compose_frame(&self, setup: &CountdownSetup, moment: Moment) -> Result<RgbaImage> {
        let mut frame = self.canvas.clone();
        for unit in TimeUnit::ALL {
            let glyph = setup.glyphs.get_checked(unit.name(), moment.part(unit))?;
            let (x, y) = setup.positions[unit.index()];
            frame.blend_layer(glyph, x, y);
        }
        Ok(frame.into_image())
    }
}

fn label_attrs(label: &LabelSpec) -> TextAttrs {
    TextAttrs {
        color: Argb::from_hex(&label.color),
        font: label.font.clone(),
        font_file: label.font_file.clone(),
        box_width: label.position.width,
        box_height: label.position.height,
        anchor: label.text_alignment,
        padding_top: label.padding_top,
        padding_bottom: label.padding_bottom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::FRAME_DELAY_MS;
    use crate::config::{Anchor, DigitLayout, DigitStyle, Position2D};
    use crate::error::CountdownError;
    use crate::text::system_font_path;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn test_template(font_file: PathBuf) -> CountdownTemplate {
        let mut labels = BTreeMap::new();
        labels.insert(
            "go".to_string(),
            LabelSpec {
                text: "GO!".to_string(),
                position: Position2D::new(10, 10),
                color: "#000000".to_string(),
                text_alignment: Anchor::Center,
                font: None,
                font_file: Some(font_file.clone()),
                padding_top: 0,
                padding_bottom: 0,
            },
        );

        CountdownTemplate {
            width: 320,
            height: 120,
            bg_color: "#FFFFFF".to_string(),
            labels,
            digits: DigitLayout {
                positions: [
                    Position2D::new(20, 60),
                    Position2D::new(100, 60),
                    Position2D::new(180, 60),
                    Position2D::new(260, 60),
                ],
                style: DigitStyle {
                    font_file: Some(font_file),
                    ..DigitStyle::default()
                },
                text_template: None,
            },
        }
    }

    #[test]
    fn test_render_requires_countdown_mode() {
        let engine = Compositor::with_background(&CreationOptions::new(100, 100));
        let err = engine.render(Moment::new(0, 0, 0, 5), 3).unwrap_err();
        assert!(matches!(
            err,
            CountdownError::Render(RenderError::NotCountdownMode)
        ));
    }

    #[test]
    fn test_draw_text_rejects_empty_text() {
        let mut engine = Compositor::with_background(&CreationOptions::new(100, 100));
        let err = engine
            .draw_text("", 0, 0, &TextOverlay::default())
            .unwrap_err();
        assert!(matches!(
            err,
            CountdownError::Render(RenderError::InvalidText)
        ));
    }

    #[test]
    fn test_out_of_range_start_fails_before_compositing() {
        let Some(font) = system_font_path() else {
            return;
        };
        let engine = Compositor::countdown(&test_template(font)).unwrap();
        let err = engine.render(Moment::new(0, 0, 0, 120), 2).unwrap_err();
        assert!(matches!(
            err,
            CountdownError::Render(RenderError::DigitOutOfRange {
                unit: "seconds",
                value: 120
            })
        ));
    }

    #[test]
    fn test_end_to_end_countdown_render() {
        let Some(font) = system_font_path() else {
            return;
        };
        let engine = Compositor::countdown(&test_template(font)).unwrap();

        let asset = engine.render(Moment::new(0, 0, 0, 5), 6).unwrap();
        assert_eq!(asset.page_count(), 6);
        assert_eq!(asset.page_height(), 120);
        assert_eq!(asset.delay_ms(), FRAME_DELAY_MS);
        for frame in asset.frames() {
            assert_eq!(frame.dimensions(), (320, 120));
        }

        // the final frame floors at zero: it must equal a render of the
        // all-zero moment
        let floored = engine.render(Moment::ZERO, 1).unwrap();
        assert_eq!(
            asset.frames().last().unwrap().as_raw(),
            floored.frames()[0].as_raw()
        );

        // the seconds glyph changes between pages
        assert_ne!(asset.frames()[0].as_raw(), asset.frames()[1].as_raw());

        let bytes = asset.to_gif_bytes().unwrap();
        assert!(bytes.starts_with(b"GIF89a"));
    }

    #[test]
    fn test_parallel_render_matches_sequential_composition() {
        let Some(font) = system_font_path() else {
            return;
        };
        let engine = Compositor::countdown(&test_template(font)).unwrap();
        let start = Moment::new(0, 0, 1, 2);

        let asset = engine.render(start, 5).unwrap();

        // Compose the expected sequence one frame at a time.
        let mut moment = start;
        for index in 0..5 {
            let expected = engine.render(moment, 1).unwrap();
            assert_eq!(
                asset.frames()[index].as_raw(),
                expected.frames()[0].as_raw(),
                "frame {index} out of order"
            );
            moment = moment.advance();
        }
    }

    #[test]
    fn test_labels_are_baked_into_every_frame() {
        let Some(font) = system_font_path() else {
            return;
        };
        let template = test_template(font);
        let engine = Compositor::countdown(&template).unwrap();
        let plain = Compositor::with_background(&CreationOptions::new(320, 120));

        // the baked background differs from a plain canvas somewhere near
        // the label origin
        let asset = engine.render(Moment::new(0, 0, 0, 3), 2).unwrap();
        let label_region_differs = (10..90).any(|x| {
            (10..50).any(|y| {
                asset.frames()[0].get_pixel(x, y) != plain.canvas.as_image().get_pixel(x, y)
            })
        });
        assert!(label_region_differs, "label was not baked into the frame");

        // and the label region is identical across frames
        for x in 0..90 {
            for y in 0..50 {
                assert_eq!(
                    asset.frames()[0].get_pixel(x, y),
                    asset.frames()[1].get_pixel(x, y)
                );
            }
        }
    }

    #[test]
    fn test_frame_count_clamped_to_one() {
        let Some(font) = system_font_path() else {
            return;
        };
        let engine = Compositor::countdown(&test_template(font)).unwrap();
        let asset = engine.render(Moment::new(0, 0, 0, 5), 0).unwrap();
        assert_eq!(asset.page_count(), 1);
    }
}
