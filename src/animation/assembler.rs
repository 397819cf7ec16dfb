//! Multi-frame asset assembly and GIF encoding.
//!
//! Frames are stacked into a multi-page container, one page per frame, each
//! page the height of the canvas. Every frame carries the same fixed delay;
//! the delay is a policy constant, not derived from caller input. Encoding
//! the same frames always yields the same bytes, whether written to memory
//! or to a file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use gif::{Encoder, Frame, Repeat};
use image::RgbaImage;
use tracing::debug;

use crate::error::{AnimationError, Result};

/// Uniform per-frame delay in milliseconds. One display tick per frame.
pub const FRAME_DELAY_MS: u16 = 1000;

/// Quantization speed for the GIF palette (1 = best, 30 = fastest).
const QUANTIZATION_SPEED: i32 = 10;

/// An assembled countdown animation: the ordered frame sequence plus the
/// container metadata needed to encode it.
#[derive(Debug)]
pub struct AnimationAsset {
    frames: Vec<RgbaImage>,
    page_height: u32,
    delay_ms: u16,
}

impl AnimationAsset {
    /// Validate and wrap an ordered frame sequence.
    ///
    /// Every frame must match the first frame's width and the given page
    /// height; the container format relies on uniform page geometry to find
    /// frame boundaries.
    pub fn assemble(frames: Vec<RgbaImage>, page_height: u32) -> Result<Self> {
        if frames.is_empty() {
            return Err(AnimationError::NoFrames.into());
        }

        let page_width = frames[0].width();
        for (index, frame) in frames.iter().enumerate() {
            if frame.width() != page_width || frame.height() != page_height {
                return Err(AnimationError::PageSizeMismatch {
                    index,
                    width: frame.width(),
                    height: frame.height(),
                    expected_width: page_width,
                    expected_height: page_height,
                }
                .into());
            }
        }

        debug!(
            "assembled {} pages of {}x{}",
            frames.len(),
            page_width,
            page_height
        );

        Ok(Self {
            frames,
            page_height,
            delay_ms: FRAME_DELAY_MS,
        })
    }

    pub fn page_count(&self) -> usize {
        self.frames.len()
    }

    pub fn page_width(&self) -> u32 {
        self.frames[0].width()
    }

    pub fn page_height(&self) -> u32 {
        self.page_height
    }

    pub fn delay_ms(&self) -> u16 {
        self.delay_ms
    }

    pub fn frames(&self) -> &[RgbaImage] {
        &self.frames
    }

    /// Encode to an in-memory GIF buffer.
    pub fn to_gif_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.encode(&mut buffer)?;
        Ok(buffer)
    }

    /// Encode straight to a file.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.encode(&mut writer)?;
        Ok(())
    }

    fn encode<W: Write>(&self, writer: W) -> Result<()> {
        let width = dimension_to_u16(self.page_width())?;
        let height = dimension_to_u16(self.page_height)?;

        let mut encoder = Encoder::new(writer, width, height, &[]).map_err(encode_error)?;
        encoder.set_repeat(Repeat::Infinite).map_err(encode_error)?;

        // GIF delays count in 10ms units.
        let delay = self.delay_ms / 10;

        for image in &self.frames {
            let mut pixels = image.as_raw().clone();
            let mut frame = Frame::from_rgba_speed(width, height, &mut pixels, QUANTIZATION_SPEED);
            frame.delay = delay;
            encoder.write_frame(&frame).map_err(encode_error)?;
        }

        Ok(())
    }
}

fn dimension_to_u16(value: u32) -> Result<u16> {
    u16::try_from(value).map_err(|_| {
        AnimationError::EncodingFailed {
            reason: format!("page dimension {value} exceeds the GIF limit"),
        }
        .into()
    })
}

fn encode_error(err: gif::EncodingError) -> crate::error::CountdownError {
    AnimationError::EncodingFailed {
        reason: err.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CountdownError;
    use image::codecs::gif::GifDecoder;
    use image::{AnimationDecoder, Rgba};
    use std::io::Cursor;
    use tempfile::tempdir;

    fn solid_frame(width: u32, height: u32, rgb: [u8; 3]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([rgb[0], rgb[1], rgb[2], 255]))
    }

    fn sample_frames() -> Vec<RgbaImage> {
        vec![
            solid_frame(20, 12, [255, 0, 0]),
            solid_frame(20, 12, [0, 255, 0]),
            solid_frame(20, 12, [0, 0, 255]),
        ]
    }

    #[test]
    fn test_assemble_records_geometry_and_delay() {
        let asset = AnimationAsset::assemble(sample_frames(), 12).unwrap();
        assert_eq!(asset.page_count(), 3);
        assert_eq!(asset.page_width(), 20);
        assert_eq!(asset.page_height(), 12);
        assert_eq!(asset.delay_ms(), FRAME_DELAY_MS);
    }

    #[test]
    fn test_assemble_rejects_empty() {
        let err = AnimationAsset::assemble(Vec::new(), 12).unwrap_err();
        assert!(matches!(
            err,
            CountdownError::Animation(AnimationError::NoFrames)
        ));
    }

    #[test]
    fn test_assemble_rejects_mismatched_pages() {
        let mut frames = sample_frames();
        frames.push(solid_frame(20, 13, [0, 0, 0]));
        let err = AnimationAsset::assemble(frames, 12).unwrap_err();
        assert!(matches!(
            err,
            CountdownError::Animation(AnimationError::PageSizeMismatch { index: 3, .. })
        ));
    }

    #[test]
    fn test_encoded_gif_round_trips() {
        let asset = AnimationAsset::assemble(sample_frames(), 12).unwrap();
        let bytes = asset.to_gif_bytes().unwrap();

        let decoder = GifDecoder::new(Cursor::new(&bytes)).unwrap();
        let frames = decoder.into_frames().collect_frames().unwrap();
        assert_eq!(frames.len(), 3);

        for frame in &frames {
            let (numerator, denominator) = frame.delay().numer_denom_ms();
            assert_eq!(numerator / denominator.max(1), FRAME_DELAY_MS as u32);
            assert_eq!(frame.buffer().height(), 12);
        }

        // page 0 is red, page 2 is blue (allow for palette quantization)
        let first = frames[0].buffer().get_pixel(5, 5);
        assert!(first.0[0] > 200 && first.0[1] < 60 && first.0[2] < 60);
        let last = frames[2].buffer().get_pixel(5, 5);
        assert!(last.0[2] > 200 && last.0[0] < 60 && last.0[1] < 60);
    }

    #[test]
    fn test_buffer_and_file_output_are_identical() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("animation.gif");

        let asset = AnimationAsset::assemble(sample_frames(), 12).unwrap();
        let bytes = asset.to_gif_bytes().unwrap();
        asset.write_to_file(&path).unwrap();

        let from_file = std::fs::read(&path).unwrap();
        assert_eq!(bytes, from_file);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let a = AnimationAsset::assemble(sample_frames(), 12).unwrap();
        let b = AnimationAsset::assemble(sample_frames(), 12).unwrap();
        assert_eq!(a.to_gif_bytes().unwrap(), b.to_gif_bytes().unwrap());
    }
}
