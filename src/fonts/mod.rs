// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Font sources and style resolution
//!
//! This crate does not decode font files or rasterize outlines. Both jobs
//! belong to an external [`FontSource`]: given a codepoint it reports the
//! source-internal glyph identifier, per-size glyph and line metrics,
//! kerning between glyph pairs, and writes coverage bitmaps on demand.
//! A [`FontLoader`] turns a binary font payload into a source when one is
//! attached to the system.
//!
//! ### Sizes
//!
//! All metrics are requested per *rendered size*, an integer the source is
//! free to interpret (typically pixels per em). The same source queried at
//! two sizes feeds two independent glyph caches, so sources need not cache
//! per-size state themselves.
//!
//! ### Attachment and roles
//!
//! Any number of sources may be attached to one system; each is a fallback
//! "plain" source, consulted in attachment order. At most one source holds
//! each of the bold, italic and bold-italic *roles* used by rich-text style
//! resolution; attaching another source to an occupied role replaces the
//! previous holder.

mod faces;

pub use faces::FaceId;
pub(crate) use faces::FaceSet;

use thiserror::Error;

/// Glyph identifier internal to one [`FontSource`]
///
/// Only meaningful to the source that produced it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GlyphId(pub u16);

/// Per-size metrics for one glyph
///
/// `x0`/`y0`/`x1`/`y1` are the corners of the glyph's bounding box in
/// integer pixels relative to the pen origin (y grows downwards, so a
/// typical Latin glyph has negative `y0`). `advance` is the horizontal pen
/// advance, before kerning.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphMetrics {
    pub advance: i32,
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

/// Per-size metrics for a whole source
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SizeMetrics {
    /// Distance from the top of a line to the baseline
    pub ascent: f32,
    /// Distance from the baseline to the bottom of a line (typically ≤ 0)
    pub descent: f32,
    /// Baseline-to-baseline distance, before extra line spacing
    pub line_height: f32,
}

/// A source of glyphs: the rasterizing side of a loaded font
///
/// Implementations wrap whatever font machinery the application uses; the
/// layout engine only ever talks to this trait.
pub trait FontSource {
    /// Look up the glyph for a codepoint
    ///
    /// `None` means this source cannot render `codepoint`; resolution then
    /// moves on to the next candidate source.
    fn glyph_id(&self, codepoint: char) -> Option<GlyphId>;

    /// Metrics of one glyph at the given rendered size
    fn glyph_metrics(&self, id: GlyphId, size: i32) -> GlyphMetrics;

    /// Line metrics of the source at the given rendered size
    fn size_metrics(&self, size: i32) -> SizeMetrics;

    /// Kerning advance between two glyphs of *this* source
    ///
    /// Never called with glyphs from different sources.
    fn kern_advance(&self, left: GlyphId, right: GlyphId, size: i32) -> f32;

    /// Write 8-bit coverage for a glyph into a caller-provided buffer
    ///
    /// The glyph box is `width` × `height` pixels; row `r` starts at
    /// `buf[r * stride]`. Pixels outside the glyph outline must be left
    /// untouched (the buffer arrives zeroed).
    fn rasterize(
        &self,
        id: GlyphId,
        size: i32,
        buf: &mut [u8],
        width: i32,
        height: i32,
        stride: i32,
    );
}

/// Decodes a binary font payload into a [`FontSource`]
pub trait FontLoader {
    fn load(&self, data: &[u8]) -> Result<Box<dyn FontSource>, FontLoadError>;
}

/// A font payload could not be decoded
#[derive(Error, Debug)]
#[error("failed to load font: {0}")]
pub struct FontLoadError(pub String);
