// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Text layout: the per-size draw and measurement surfaces
//!
//! [`SizedFont`] walks the scalar values of a string, feeds `<` characters
//! to the rich-text scanner, pulls glyphs from the per-size cache (which
//! resolves and rasterizes on miss) and converts pen positions into
//! positioned quads.
//!
//! Layout rules, applied identically by every surface:
//!
//! - Ascent and line height come from the source of the *first* glyph that
//!   resolves in the string and stay fixed for the whole call, regardless
//!   of later style or font switches.
//! - A line feed returns the pen to the starting x, drops it by one line
//!   height plus the configured line spacing, and resets kerning state.
//! - Kerning applies only between consecutive glyphs of the same source;
//!   the extra character spacing applies between every consecutive pair.
//! - An unresolvable codepoint falls back to the configured default
//!   codepoint, or contributes nothing at all (no advance, no quad).
//!
//! Drawing rasterizes missing glyphs into the atlas; the measurement
//! surfaces ([`SizedFont::text_bounds`], [`SizedFont::measure_size`],
//! [`SizedFont::glyph_rects`]) only ever touch metrics.

use crate::atlas::{AtlasSet, TextureCreator};
use crate::cache::{Glyph, GlyphCache};
use crate::conv::to_usize;
use crate::fonts::FaceSet;
use crate::rich::consume_tag;
use crate::system::FontSystem;
use crate::{Bounds, Color, PackError, Rect, RichState, StyleFlags, Vec2};

/// Receives positioned textured quads from [`SizedFont::draw_text`]
///
/// `dest` is the screen-space destination in integer pixels; `source` is
/// the glyph's region on `texture` in atlas-local pixels.
pub trait DrawSink<T> {
    fn draw(&mut self, texture: &T, dest: Rect, source: Rect, color: Color, depth: f32);
}

/// Cursor over the Unicode scalar values of a string
///
/// `&str` is UTF-8, so `char` decoding already yields whole codepoints;
/// surrogate pairing is a transport-encoding concern that cannot arise
/// here.
struct TextCursor<'a> {
    text: &'a str,
    index: usize,
}

impl<'a> TextCursor<'a> {
    fn new(text: &'a str) -> Self {
        TextCursor { text, index: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.index..].chars().next()
    }

    /// Unconsumed tail, starting at the peeked codepoint
    fn rest(&self) -> &'a str {
        &self.text[self.index..]
    }

    fn advance(&mut self, bytes: usize) {
        self.index += bytes;
    }

    fn bump(&mut self, c: char) {
        self.index += c.len_utf8();
    }
}

/// A positioned glyph quad: scaled destination corners plus the unscaled
/// atlas-local source rectangle
struct Quad {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    src: Rect,
}

#[derive(Clone, Copy)]
enum TextColor<'a> {
    Uniform(Color),
    PerCodepoint(&'a [Color]),
}

/// Per-size handle onto a [`FontSystem`]: layout, drawing and measurement
///
/// Obtained from [`FontSystem::font`]; borrows the system mutably since
/// drawing may rasterize new glyphs and grow the atlas.
pub struct SizedFont<'a, C: TextureCreator> {
    system: &'a mut FontSystem<C>,
    size: i32,
}

impl<'a, C: TextureCreator> SizedFont<'a, C> {
    pub(crate) fn new(system: &'a mut FontSystem<C>, size: i32) -> Self {
        SizedFont { system, size }
    }

    /// The rendered size of this handle
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Draw `text` at `(x, y)` in one color
    ///
    /// Rich-text color tags tint `color` rather than replace it. Returns
    /// the final pen x position. Fails only if a glyph bitmap cannot fit an
    /// empty atlas page.
    pub fn draw_text<S: DrawSink<C::Texture>>(
        &mut self,
        sink: &mut S,
        x: f32,
        y: f32,
        text: impl AsRef<str>,
        color: Color,
        scale: impl Into<Vec2>,
        depth: f32,
    ) -> Result<f32, PackError> {
        self.draw_impl(
            sink,
            x,
            y,
            text.as_ref(),
            TextColor::Uniform(color),
            scale.into(),
            depth,
        )
    }

    /// Draw `text` with one color per codepoint
    ///
    /// The color index advances once per codepoint of the input, including
    /// line feeds and codepoints that produce no glyph, so `colors` aligns
    /// with the string's own codepoint positions. Consumed rich-text tags
    /// do not advance the index; color tags have no effect on this surface.
    ///
    /// Panics if `colors` has fewer entries than `text` has codepoints.
    pub fn draw_text_colors<S: DrawSink<C::Texture>>(
        &mut self,
        sink: &mut S,
        x: f32,
        y: f32,
        text: impl AsRef<str>,
        colors: &[Color],
        scale: impl Into<Vec2>,
        depth: f32,
    ) -> Result<f32, PackError> {
        self.draw_impl(
            sink,
            x,
            y,
            text.as_ref(),
            TextColor::PerCodepoint(colors),
            scale.into(),
            depth,
        )
    }

    fn draw_impl<S: DrawSink<C::Texture>>(
        &mut self,
        sink: &mut S,
        x: f32,
        y: f32,
        text: &str,
        color: TextColor,
        scale: Vec2,
        depth: f32,
    ) -> Result<f32, PackError> {
        if text.is_empty() {
            return Ok(x);
        }
        let (ascent, line_height) = self.line_metrics(text);

        let size = self.size;
        let sys = &mut *self.system;
        let cache = sys
            .caches
            .entry(size)
            .or_insert_with(|| GlyphCache::new(size));

        let mut origin = Vec2(0.0, ascent);
        let mut prev: Option<Glyph> = None;
        let mut state = RichState::default();
        let mut pos = 0;
        let mut cursor = TextCursor::new(text);

        while let Some(c) = cursor.peek() {
            if c == '\n' {
                cursor.bump(c);
                origin.0 = 0.0;
                origin.1 += line_height;
                prev = None;
                pos += 1;
                continue;
            }
            if sys.rich_text && c == '<' {
                if let Some(len) = consume_tag(cursor.rest(), &mut state) {
                    cursor.advance(len);
                    continue;
                }
            }
            cursor.bump(c);

            let glyph = match lookup_bitmap(
                &sys.faces,
                &mut sys.atlas,
                cache,
                sys.rich_text,
                sys.default_codepoint,
                c,
                state.style,
            )? {
                Some(glyph) => glyph,
                None => {
                    pos += 1;
                    continue;
                }
            };

            let quad = step_pen(
                &sys.faces,
                size,
                sys.kerning,
                sys.character_spacing,
                &glyph,
                prev.as_ref(),
                scale,
                &mut origin,
            );
            if !glyph.is_empty() {
                if let Some(page) = glyph.page {
                    let dest = Rect::new(
                        (x + quad.x0) as i32,
                        (y + quad.y0) as i32,
                        (quad.x1 - quad.x0) as i32,
                        (quad.y1 - quad.y0) as i32,
                    );
                    let tint = match color {
                        TextColor::Uniform(base) => state.blend(base),
                        TextColor::PerCodepoint(colors) => colors[pos],
                    };
                    let texture = sys.atlas.pages()[to_usize(page)].texture();
                    sink.draw(texture, dest, quad.src, tint, depth);
                }
            }

            prev = Some(glyph);
            pos += 1;
        }

        Ok(x + origin.0)
    }

    /// Measure `text` laid out from `(x, y)`
    ///
    /// Returns the total pen advance and the bounding box of all glyph
    /// quads. The right bound is widened by twice the stroke amount, which
    /// glyph metrics alone would not capture. Never touches the atlas.
    pub fn text_bounds(
        &mut self,
        x: f32,
        y: f32,
        text: impl AsRef<str>,
        scale: impl Into<Vec2>,
    ) -> (f32, Bounds) {
        let text = text.as_ref();
        let scale = scale.into();
        if text.is_empty() {
            return (0.0, Bounds::default());
        }
        let (ascent, line_height) = self.line_metrics(text);

        let size = self.size;
        let sys = &mut *self.system;
        let cache = sys
            .caches
            .entry(size)
            .or_insert_with(|| GlyphCache::new(size));
        let pad = sys.atlas.pad();

        let start_x = x;
        let mut origin = Vec2(x, y + ascent);
        let (mut min_x, mut max_x) = (x, x);
        let (mut min_y, mut max_y) = (origin.1, origin.1);
        let mut prev: Option<Glyph> = None;
        let mut state = RichState::default();
        let mut cursor = TextCursor::new(text);

        while let Some(c) = cursor.peek() {
            if c == '\n' {
                cursor.bump(c);
                origin.0 = start_x;
                origin.1 += line_height;
                prev = None;
                continue;
            }
            if sys.rich_text && c == '<' {
                if let Some(len) = consume_tag(cursor.rest(), &mut state) {
                    cursor.advance(len);
                    continue;
                }
            }
            cursor.bump(c);

            let glyph = match lookup_metrics(
                &sys.faces,
                cache,
                pad,
                sys.rich_text,
                sys.default_codepoint,
                c,
                state.style,
            ) {
                Some(glyph) => glyph,
                None => continue,
            };

            let quad = step_pen(
                &sys.faces,
                size,
                sys.kerning,
                sys.character_spacing,
                &glyph,
                prev.as_ref(),
                scale,
                &mut origin,
            );
            min_x = min_x.min(quad.x0);
            max_x = max_x.max(origin.0);
            min_y = min_y.min(quad.y0);
            max_y = max_y.max(quad.y1);
            prev = Some(glyph);
        }

        max_x += (sys.atlas.stroke() * 2) as f32;

        let bounds = Bounds {
            min: Vec2(min_x, min_y),
            max: Vec2(max_x, max_y),
        };
        (origin.0 - start_x, bounds)
    }

    /// Measure the size of `text` laid out from the origin
    pub fn measure_size(&mut self, text: impl AsRef<str>, scale: impl Into<Vec2>) -> Vec2 {
        let (_, bounds) = self.text_bounds(0.0, 0.0, text, scale);
        Vec2(bounds.max.0, bounds.max.1)
    }

    /// Per-glyph quad rectangles, for caret and selection UIs
    ///
    /// Codepoints that resolve no glyph contribute no rectangle. Never
    /// touches the atlas.
    pub fn glyph_rects(
        &mut self,
        x: f32,
        y: f32,
        text: impl AsRef<str>,
        scale: impl Into<Vec2>,
    ) -> Vec<Rect> {
        let text = text.as_ref();
        let scale = scale.into();
        let mut rects = Vec::new();
        if text.is_empty() {
            return rects;
        }
        let (ascent, line_height) = self.line_metrics(text);

        let size = self.size;
        let sys = &mut *self.system;
        let cache = sys
            .caches
            .entry(size)
            .or_insert_with(|| GlyphCache::new(size));
        let pad = sys.atlas.pad();

        let start_x = x;
        let mut origin = Vec2(x, y + ascent);
        let mut prev: Option<Glyph> = None;
        let mut state = RichState::default();
        let mut cursor = TextCursor::new(text);

        while let Some(c) = cursor.peek() {
            if c == '\n' {
                cursor.bump(c);
                origin.0 = start_x;
                origin.1 += line_height;
                prev = None;
                continue;
            }
            if sys.rich_text && c == '<' {
                if let Some(len) = consume_tag(cursor.rest(), &mut state) {
                    cursor.advance(len);
                    continue;
                }
            }
            cursor.bump(c);

            let glyph = match lookup_metrics(
                &sys.faces,
                cache,
                pad,
                sys.rich_text,
                sys.default_codepoint,
                c,
                state.style,
            ) {
                Some(glyph) => glyph,
                None => continue,
            };

            let quad = step_pen(
                &sys.faces,
                size,
                sys.kerning,
                sys.character_spacing,
                &glyph,
                prev.as_ref(),
                scale,
                &mut origin,
            );
            rects.push(Rect::new(
                quad.x0 as i32,
                quad.y0 as i32,
                (quad.x1 - quad.x0) as i32,
                (quad.y1 - quad.y0) as i32,
            ));
            prev = Some(glyph);
        }

        rects
    }

    /// Ascent and effective line height for one call
    ///
    /// Derived from the first glyph that resolves (consuming any leading
    /// rich-text tags on the way); `(0, 0)` if nothing resolves.
    fn line_metrics(&mut self, text: &str) -> (f32, f32) {
        let size = self.size;
        let sys = &mut *self.system;
        let cache = sys
            .caches
            .entry(size)
            .or_insert_with(|| GlyphCache::new(size));
        let pad = sys.atlas.pad();

        let mut state = RichState::default();
        let mut cursor = TextCursor::new(text);
        while let Some(c) = cursor.peek() {
            if sys.rich_text && c == '<' {
                if let Some(len) = consume_tag(cursor.rest(), &mut state) {
                    cursor.advance(len);
                    continue;
                }
            }
            cursor.bump(c);

            let glyph = lookup_metrics(
                &sys.faces,
                cache,
                pad,
                sys.rich_text,
                sys.default_codepoint,
                c,
                state.style,
            );
            if let Some(glyph) = glyph {
                let m = sys.faces.get(glyph.face).size_metrics(size);
                return (m.ascent, m.line_height + sys.line_spacing as f32);
            }
        }
        (0.0, 0.0)
    }
}

/// Apply kerning and spacing, emit the quad, advance the pen
fn step_pen(
    faces: &FaceSet,
    size: i32,
    kerning: bool,
    character_spacing: i32,
    glyph: &Glyph,
    prev: Option<&Glyph>,
    scale: Vec2,
    origin: &mut Vec2,
) -> Quad {
    if let Some(prev) = prev {
        let mut kern = 0.0;
        if kerning && prev.face == glyph.face {
            kern = faces.get(glyph.face).kern_advance(prev.id, glyph.id, size);
        }
        origin.0 += ((kern + character_spacing as f32 + 0.5) as i32) as f32;
    }

    let rx = origin.0 + glyph.x_offset as f32;
    let ry = origin.1 + glyph.y_offset as f32;
    let quad = Quad {
        x0: rx * scale.0,
        y0: ry * scale.1,
        x1: (rx + glyph.bounds.width as f32) * scale.0,
        y1: (ry + glyph.bounds.height as f32) * scale.1,
        src: glyph.bounds,
    };
    origin.0 += glyph.x_advance as f32;
    quad
}

/// Cached-or-created glyph, metrics only, with default-codepoint fallback
fn lookup_metrics(
    faces: &FaceSet,
    cache: &mut GlyphCache,
    pad: i32,
    rich_text: bool,
    default_codepoint: Option<char>,
    c: char,
    style: StyleFlags,
) -> Option<Glyph> {
    cache.get_or_create(faces, pad, rich_text, c, style).or_else(|| {
        let d = default_codepoint?;
        cache.get_or_create(faces, pad, rich_text, d, style)
    })
}

/// As [`lookup_metrics`], additionally rasterizing into the atlas
fn lookup_bitmap<C: TextureCreator>(
    faces: &FaceSet,
    atlas: &mut AtlasSet<C>,
    cache: &mut GlyphCache,
    rich_text: bool,
    default_codepoint: Option<char>,
    c: char,
    style: StyleFlags,
) -> Result<Option<Glyph>, PackError> {
    match lookup_one(faces, atlas, cache, rich_text, c, style)? {
        Some(glyph) => Ok(Some(glyph)),
        None => match default_codepoint {
            Some(d) => lookup_one(faces, atlas, cache, rich_text, d, style),
            None => Ok(None),
        },
    }
}

fn lookup_one<C: TextureCreator>(
    faces: &FaceSet,
    atlas: &mut AtlasSet<C>,
    cache: &mut GlyphCache,
    rich_text: bool,
    c: char,
    style: StyleFlags,
) -> Result<Option<Glyph>, PackError> {
    let Some(mut glyph) = cache.get_or_create(faces, atlas.pad(), rich_text, c, style) else {
        return Ok(None);
    };
    if glyph.page.is_none() {
        atlas.place_and_render(faces.get(glyph.face), cache.size(), &mut glyph)?;
        cache.update(style, glyph);
    }
    Ok(Some(glyph))
}
