// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Mock collaborators shared by the integration tests
//!
//! `SpanFont` is a synthetic monospaced font covering one codepoint range;
//! its settings round-trip through a semicolon-separated descriptor payload
//! so that tests exercise the real `FontLoader` attachment path.

#![allow(dead_code)] // not every test binary uses every helper

use atlas_text::fonts::{
    FontLoadError, FontLoader, FontSource, GlyphId, GlyphMetrics, SizeMetrics,
};
use atlas_text::{Color, DrawSink, FontSystem, FontSystemOptions, Rect, TextureCreator};
use std::cell::Cell;
use std::rc::Rc;

pub struct SpanFont {
    pub first: char,
    pub last: char,
    pub advance: i32,
    pub width: i32,
    pub height: i32,
    pub ascent: f32,
    pub descent: f32,
    pub line_height: f32,
    pub kern: f32,
}

/// Covers `first..=last` with 8x10 glyph boxes, advance 10, ascent 12,
/// line height 16, no kerning
pub fn span(first: char, last: char) -> SpanFont {
    SpanFont {
        first,
        last,
        advance: 10,
        width: 8,
        height: 10,
        ascent: 12.0,
        descent: -3.0,
        line_height: 16.0,
        kern: 0.0,
    }
}

impl SpanFont {
    /// The binary payload format understood by [`SpanLoader`]
    pub fn descriptor(&self) -> Vec<u8> {
        format!(
            "{};{};{};{};{};{};{};{};{}",
            self.first as u32,
            self.last as u32,
            self.advance,
            self.width,
            self.height,
            self.ascent,
            self.descent,
            self.line_height,
            self.kern
        )
        .into_bytes()
    }
}

impl FontSource for SpanFont {
    fn glyph_id(&self, c: char) -> Option<GlyphId> {
        (self.first..=self.last)
            .contains(&c)
            .then(|| GlyphId(c as u16))
    }

    fn glyph_metrics(&self, _: GlyphId, _: i32) -> GlyphMetrics {
        GlyphMetrics {
            advance: self.advance,
            x0: 0,
            y0: -self.height,
            x1: self.width,
            y1: 0,
        }
    }

    fn size_metrics(&self, _: i32) -> SizeMetrics {
        SizeMetrics {
            ascent: self.ascent,
            descent: self.descent,
            line_height: self.line_height,
        }
    }

    fn kern_advance(&self, _: GlyphId, _: GlyphId, _: i32) -> f32 {
        self.kern
    }

    fn rasterize(&self, _: GlyphId, _: i32, buf: &mut [u8], width: i32, height: i32, stride: i32) {
        for y in 0..height {
            for x in 0..width {
                buf[(y * stride + x) as usize] = 255;
            }
        }
    }
}

fn field<T: std::str::FromStr>(parts: &mut std::str::Split<'_, char>) -> Result<T, FontLoadError> {
    parts
        .next()
        .ok_or_else(|| FontLoadError("truncated descriptor".into()))?
        .parse()
        .map_err(|_| FontLoadError("malformed descriptor".into()))
}

pub struct SpanLoader;

impl FontLoader for SpanLoader {
    fn load(&self, data: &[u8]) -> Result<Box<dyn FontSource>, FontLoadError> {
        let text = std::str::from_utf8(data).map_err(|e| FontLoadError(e.to_string()))?;
        let mut parts = text.split(';');
        let codepoint = |raw: u32| {
            char::from_u32(raw).ok_or_else(|| FontLoadError("descriptor codepoint invalid".into()))
        };
        Ok(Box::new(SpanFont {
            first: codepoint(field(&mut parts)?)?,
            last: codepoint(field(&mut parts)?)?,
            advance: field(&mut parts)?,
            width: field(&mut parts)?,
            height: field(&mut parts)?,
            ascent: field(&mut parts)?,
            descent: field(&mut parts)?,
            line_height: field(&mut parts)?,
            kern: field(&mut parts)?,
        }))
    }
}

/// Counts page texture allocations across clones
#[derive(Clone, Default)]
pub struct PageCounter(pub Rc<Cell<usize>>);

impl PageCounter {
    pub fn get(&self) -> usize {
        self.0.get()
    }
}

pub struct TestCreator {
    created: PageCounter,
}

impl TestCreator {
    pub fn new() -> (TestCreator, PageCounter) {
        let created = PageCounter::default();
        let creator = TestCreator {
            created: created.clone(),
        };
        (creator, created)
    }
}

pub struct TestTexture {
    pub width: i32,
    pub height: i32,
    /// Every region updated on this page, in order
    pub writes: Vec<Rect>,
}

impl TextureCreator for TestCreator {
    type Texture = TestTexture;

    fn create(&mut self, width: i32, height: i32) -> TestTexture {
        self.created.0.set(self.created.0.get() + 1);
        TestTexture {
            width,
            height,
            writes: Vec::new(),
        }
    }

    fn update(&mut self, texture: &mut TestTexture, region: Rect, pixels: &[u8]) {
        assert!(region.x >= 0 && region.y >= 0, "region {region:?} off-page");
        assert!(
            region.right() <= texture.width && region.bottom() <= texture.height,
            "region {region:?} off-page"
        );
        assert_eq!(
            pixels.len(),
            (region.width * region.height * 4) as usize,
            "pixel buffer does not match region {region:?}"
        );
        texture.writes.push(region);
    }
}

#[derive(Clone, Copy, Debug)]
pub struct DrawnQuad {
    pub dest: Rect,
    pub src: Rect,
    pub color: Color,
    pub depth: f32,
}

#[derive(Default)]
pub struct TestSink {
    pub quads: Vec<DrawnQuad>,
}

impl DrawSink<TestTexture> for TestSink {
    fn draw(&mut self, _: &TestTexture, dest: Rect, source: Rect, color: Color, depth: f32) {
        self.quads.push(DrawnQuad {
            dest,
            src: source,
            color,
            depth,
        });
    }
}

pub type TestSystem = (FontSystem<TestCreator>, PageCounter);

/// A system over [`SpanLoader`] and [`TestCreator`], plus the page counter
pub fn system(options: FontSystemOptions) -> TestSystem {
    let created = PageCounter::default();
    let creator = TestCreator {
        created: created.clone(),
    };
    let system = FontSystem::new(Box::new(SpanLoader), creator, options).unwrap();
    (system, created)
}

/// [`system`] with one plain source covering `' '..='z'`
pub fn basic_system() -> TestSystem {
    let (mut sys, counter) = system(FontSystemOptions::default());
    sys.add_font(&span(' ', 'z').descriptor(), false, false)
        .unwrap();
    (sys, counter)
}
