// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Dynamic glyph-atlas caching and rich-text layout
//!
//! This library turns strings into positioned texture quads. Glyph bitmaps
//! are cached in dynamically-grown atlas pages; layout walks codepoints,
//! interprets inline `<b>`/`<i>`/`<c=…>` markup, applies kerning and line
//! breaks, and hands quads to a draw sink. It does not rasterize font
//! outlines, decode font files, or own GPU resources: those jobs reach the
//! library through the [`fonts::FontSource`], [`fonts::FontLoader`] and
//! [`TextureCreator`] traits, and quads leave through [`DrawSink`].
//!
//! Not covered, by design: bidirectional text, shaping/ligatures and word
//! wrapping (only explicit `\n` breaks lines).
//!
//! # Example
//!
//! ```
//! use atlas_text::fonts::{
//!     FontLoadError, FontLoader, FontSource, GlyphId, GlyphMetrics, SizeMetrics,
//! };
//! use atlas_text::{Color, DrawSink, FontSystem, FontSystemOptions, Rect, TextureCreator, Vec2};
//!
//! // A stand-in monospaced source; a real one wraps an outline rasterizer.
//! struct Mono;
//!
//! impl FontSource for Mono {
//!     fn glyph_id(&self, c: char) -> Option<GlyphId> {
//!         c.is_ascii_graphic().then(|| GlyphId(c as u16))
//!     }
//!     fn glyph_metrics(&self, _: GlyphId, size: i32) -> GlyphMetrics {
//!         GlyphMetrics { advance: size / 2, x0: 0, y0: -size, x1: size / 2, y1: 0 }
//!     }
//!     fn size_metrics(&self, size: i32) -> SizeMetrics {
//!         SizeMetrics {
//!             ascent: size as f32,
//!             descent: 0.0,
//!             line_height: size as f32 * 1.2,
//!         }
//!     }
//!     fn kern_advance(&self, _: GlyphId, _: GlyphId, _: i32) -> f32 {
//!         0.0
//!     }
//!     fn rasterize(&self, _: GlyphId, _: i32, buf: &mut [u8], w: i32, h: i32, stride: i32) {
//!         for y in 0..h {
//!             for x in 0..w {
//!                 buf[(y * stride + x) as usize] = 255;
//!             }
//!         }
//!     }
//! }
//!
//! struct MonoLoader;
//!
//! impl FontLoader for MonoLoader {
//!     fn load(&self, _data: &[u8]) -> Result<Box<dyn FontSource>, FontLoadError> {
//!         Ok(Box::new(Mono))
//!     }
//! }
//!
//! // CPU-side page textures; a real creator uploads to the GPU.
//! struct CpuCreator;
//!
//! impl TextureCreator for CpuCreator {
//!     type Texture = Vec<u8>;
//!     fn create(&mut self, w: i32, h: i32) -> Vec<u8> {
//!         vec![0; (w * h * 4) as usize]
//!     }
//!     fn update(&mut self, _texture: &mut Vec<u8>, _region: Rect, _pixels: &[u8]) {
//!         // copy the region's rows into the page / upload to the GPU
//!     }
//! }
//!
//! struct CountingSink(usize);
//!
//! impl DrawSink<Vec<u8>> for CountingSink {
//!     fn draw(&mut self, _: &Vec<u8>, _dest: Rect, _src: Rect, _color: Color, _depth: f32) {
//!         self.0 += 1;
//!     }
//! }
//!
//! let options = FontSystemOptions { width: 256, height: 256, ..Default::default() };
//! let mut system = FontSystem::new(Box::new(MonoLoader), CpuCreator, options)?;
//! system.add_font(b"font payload", false, false)?;
//!
//! let mut sink = CountingSink(0);
//! let pen = system
//!     .font(16)
//!     .draw_text(&mut sink, 10.0, 10.0, "Hello <b>world</b>", Color::WHITE, Vec2::ONE, 0.0)?;
//! assert!(pen > 10.0);
//! assert_eq!(sink.0, "Hello world".len() - 1); // the space resolves no glyph
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod atlas;
mod cache;
mod conv;
mod data;
mod display;
pub mod fonts;
mod rich;
mod system;

pub use atlas::{AtlasPage, PackError, TextureCreator};
pub use cache::Glyph;
pub use data::{Bounds, Color, Rect, Vec2};
pub use display::{DrawSink, SizedFont};
pub use fonts::FaceId;
pub use rich::{RichState, StyleFlags};
pub use system::{ConfigError, FontSystem, FontSystemOptions, MAX_EFFECT};
