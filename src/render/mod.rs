//! Raster operations for the export pipeline.
//!
//! This module bakes layer effects into bitmaps, resamples nine-slice
//! images and encodes PNGs.

pub mod composite;
mod effects;
pub mod nine_slice;
mod png;

pub use composite::AlphaMap;
pub use effects::{required_padding, stroke_samples, Baked, EffectBaker};
pub use png::encode_png;
