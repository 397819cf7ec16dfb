//! # Countdown-Compositor
//!
//! Render parameterized countdown animations as animated GIFs.
//!
//! A countdown animation is a static background with baked text labels,
//! overlaid frame-by-frame with a two-digit glyph per time unit
//! (days/hours/minutes/seconds), decrementing once per frame. All 100
//! digit glyphs are pre-rendered once per template; frames reuse them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use countdown_compositor::{
//!     clock::Moment,
//!     composition::Compositor,
//!     config::CountdownTemplate,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let template = CountdownTemplate::from_file("template.json")?;
//! let engine = Compositor::countdown(&template)?;
//!
//! let asset = engine.render(Moment::new(0, 0, 1, 30), 10)?;
//! asset.write_to_file("countdown.gif")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`config`] - Template parsing and validation
//! - [`clock`] - Duration rollover arithmetic
//! - [`text`] - Font resolution and text mask rendering
//! - [`composition`] - Glyph cache, canvas compositing, and the engine
//! - [`animation`] - Multi-frame GIF assembly
//!
//! ## Error handling
//!
//! Configuration parsing is strict and fail-fast: every violation names the
//! offending field and nothing is rendered. In-render color decoding is
//! deliberately lenient — a malformed hex string becomes transparent black
//! instead of failing (see [`color::Argb::from_hex`]).

pub mod animation;
pub mod clock;
pub mod color;
pub mod composition;
pub mod config;
pub mod error;
pub mod text;

// Re-export commonly used types for convenience
pub use crate::{
    animation::{AnimationAsset, FRAME_DELAY_MS},
    clock::{Moment, TimeUnit},
    color::Argb,
    composition::Compositor,
    config::{CountdownTemplate, CreationOptions, TextOverlay},
    error::{CountdownError, Result},
};
