//! # Animation Module
//!
//! Joins an ordered frame sequence into a single multi-frame GIF asset with
//! uniform per-frame timing metadata.

pub mod assembler;

pub use assembler::{AnimationAsset, FRAME_DELAY_MS};
