// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Glyph atlas pages and rectangle packing
//!
//! Glyph bitmaps are packed into fixed-size texture pages using a skyline
//! bottom-left heuristic: the skyline is kept as a list of nodes, each a
//! horizontal segment at some height, and a rectangle is placed at the
//! candidate position minimizing the resulting top edge (ties broken by
//! narrower node). Placed rectangles never overlap.
//!
//! Pages are append-only. When the current page cannot take a rectangle,
//! the page-full notification fires, a fresh page is allocated and the
//! placement is retried exactly once; a rectangle that does not fit an
//! empty page is a [`PackError`], which indicates a misconfiguration (page
//! too small for the glyph size plus effect padding).

use crate::cache::{effect_pad, Glyph};
use crate::conv::{px_usize, to_u32};
use crate::fonts::FontSource;
use crate::Rect;
use thiserror::Error;

/// Texture allocation, the GPU-facing side of the atlas
///
/// The implementation owns the resource lifetime; this crate only asks for
/// creation and region updates. `update` receives tightly-packed RGBA
/// pixels (premultiplied white: `r = g = b = a = coverage`).
pub trait TextureCreator {
    type Texture;

    fn create(&mut self, width: i32, height: i32) -> Self::Texture;

    fn update(&mut self, texture: &mut Self::Texture, region: Rect, pixels: &[u8]);
}

/// A glyph bitmap cannot fit even an empty atlas page
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("glyph bitmap {width}x{height} does not fit an empty {page_width}x{page_height} atlas page")]
pub struct PackError {
    pub width: i32,
    pub height: i32,
    pub page_width: i32,
    pub page_height: i32,
}

#[derive(Clone, Copy, Debug)]
struct SkylineNode {
    x: i32,
    y: i32,
    width: i32,
}

/// One fixed-size atlas texture plus its free-space skyline
pub struct AtlasPage<T> {
    width: i32,
    height: i32,
    nodes: Vec<SkylineNode>,
    texture: T,
}

impl<T> AtlasPage<T> {
    pub(crate) fn new(width: i32, height: i32, texture: T) -> Self {
        AtlasPage {
            width,
            height,
            nodes: vec![SkylineNode { x: 0, y: 0, width }],
            texture,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// The backing texture, for use in draw calls
    pub fn texture(&self) -> &T {
        &self.texture
    }

    /// Lowest y at which `width`×`height` fits with its left edge at node
    /// `index`, or `None`
    fn fit(&self, index: usize, width: i32, height: i32) -> Option<i32> {
        let x = self.nodes[index].x;
        if x + width > self.width {
            return None;
        }

        let mut y = self.nodes[index].y;
        let mut remaining = width;
        let mut i = index;
        while remaining > 0 {
            let node = self.nodes.get(i)?;
            y = y.max(node.y);
            if y + height > self.height {
                return None;
            }
            remaining -= node.width;
            i += 1;
        }
        Some(y)
    }

    /// Raise the skyline over a newly placed rectangle
    fn add_level(&mut self, index: usize, x: i32, y: i32, width: i32, height: i32) {
        self.nodes.insert(
            index,
            SkylineNode {
                x,
                y: y + height,
                width,
            },
        );

        // Shrink or drop nodes now shadowed by the new segment
        let mut i = index + 1;
        while i < self.nodes.len() {
            let covered = self.nodes[i - 1].x + self.nodes[i - 1].width - self.nodes[i].x;
            if covered <= 0 {
                break;
            }
            self.nodes[i].x += covered;
            self.nodes[i].width -= covered;
            if self.nodes[i].width > 0 {
                break;
            }
            self.nodes.remove(i);
        }

        // Merge adjacent segments at equal height
        let mut i = 0;
        while i + 1 < self.nodes.len() {
            if self.nodes[i].y == self.nodes[i + 1].y {
                self.nodes[i].width += self.nodes[i + 1].width;
                self.nodes.remove(i + 1);
            } else {
                i += 1;
            }
        }
    }

    /// Reserve a rectangle, returning its top-left corner
    pub(crate) fn place(&mut self, width: i32, height: i32) -> Option<(i32, i32)> {
        let mut best: Option<(usize, i32, i32)> = None;
        let mut best_top = self.height + 1;
        let mut best_width = self.width + 1;
        for i in 0..self.nodes.len() {
            if let Some(y) = self.fit(i, width, height) {
                let top = y + height;
                if top < best_top || (top == best_top && self.nodes[i].width < best_width) {
                    best = Some((i, self.nodes[i].x, y));
                    best_top = top;
                    best_width = self.nodes[i].width;
                }
            }
        }

        let (index, x, y) = best?;
        self.add_level(index, x, y, width, height);
        Some((x, y))
    }

    #[cfg(test)]
    fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// The ordered page list plus rasterization into reserved regions
pub(crate) struct AtlasSet<C: TextureCreator> {
    creator: C,
    pages: Vec<AtlasPage<C::Texture>>,
    /// Placement target; `None` until the first placement and after a page
    /// fills up
    current: Option<usize>,
    page_width: i32,
    page_height: i32,
    blur: i32,
    stroke: i32,
    on_full: Option<Box<dyn FnMut(usize)>>,
}

impl<C: TextureCreator> AtlasSet<C> {
    pub fn new(creator: C, page_width: i32, page_height: i32, blur: i32, stroke: i32) -> Self {
        AtlasSet {
            creator,
            pages: Vec::new(),
            current: None,
            page_width,
            page_height,
            blur,
            stroke,
            on_full: None,
        }
    }

    pub fn blur(&self) -> i32 {
        self.blur
    }

    pub fn stroke(&self) -> i32 {
        self.stroke
    }

    /// Padding around every glyph bitmap on these pages
    pub fn pad(&self) -> i32 {
        effect_pad(self.blur).max(effect_pad(self.stroke))
    }

    pub fn pages(&self) -> &[AtlasPage<C::Texture>] {
        &self.pages
    }

    pub fn set_on_full(&mut self, notify: Box<dyn FnMut(usize)>) {
        self.on_full = Some(notify);
    }

    /// Drop all pages; the next placement starts from a fresh page
    pub fn reset(&mut self, page_width: i32, page_height: i32) {
        self.pages.clear();
        self.current = None;
        self.page_width = page_width;
        self.page_height = page_height;
    }

    fn current_page(&mut self) -> usize {
        match self.current {
            Some(index) => index,
            None => {
                let texture = self.creator.create(self.page_width, self.page_height);
                self.pages
                    .push(AtlasPage::new(self.page_width, self.page_height, texture));
                let index = self.pages.len() - 1;
                self.current = Some(index);
                index
            }
        }
    }

    /// Reserve space for a glyph bitmap, render it and record the placement
    ///
    /// On overflow of the current page the full-notification fires once and
    /// placement is retried on one fresh page.
    pub fn place_and_render(
        &mut self,
        source: &dyn FontSource,
        size: i32,
        glyph: &mut Glyph,
    ) -> Result<(), PackError> {
        let (gw, gh) = (glyph.bounds.width, glyph.bounds.height);
        let mut index = self.current_page();
        let (x, y) = match self.pages[index].place(gw, gh) {
            Some(at) => at,
            None => {
                if let Some(notify) = self.on_full.as_mut() {
                    notify(index);
                }
                log::debug!("atlas page {index} full; opening a fresh page");
                self.current = None;
                index = self.current_page();
                self.pages[index].place(gw, gh).ok_or(PackError {
                    width: gw,
                    height: gh,
                    page_width: self.page_width,
                    page_height: self.page_height,
                })?
            }
        };

        glyph.bounds.x = x;
        glyph.bounds.y = y;
        self.render(index, source, size, glyph);
        glyph.page = Some(to_u32(index));
        Ok(())
    }

    /// Rasterize into the reserved region, applying blur or stroke
    fn render(&mut self, index: usize, source: &dyn FontSource, size: i32, glyph: &Glyph) {
        let (gw, gh) = (glyph.bounds.width, glyph.bounds.height);
        let pad = self.pad();
        let mut coverage = vec![0u8; px_usize(gw) * px_usize(gh)];

        let inner_w = gw - 2 * pad;
        let inner_h = gh - 2 * pad;
        if inner_w > 0 && inner_h > 0 {
            let start = px_usize(pad * gw + pad);
            source.rasterize(glyph.id, size, &mut coverage[start..], inner_w, inner_h, gw);
        }

        if self.stroke > 0 {
            dilate(&mut coverage, gw, gh, self.stroke);
        } else if self.blur > 0 {
            blur(&mut coverage, gw, gh, self.blur);
        }

        let mut pixels = Vec::with_capacity(coverage.len() * 4);
        for c in coverage {
            pixels.extend_from_slice(&[c, c, c, c]);
        }
        self.creator
            .update(&mut self.pages[index].texture, glyph.bounds, &pixels);
    }
}

/// Expand coverage outwards by `radius` pixels (Chebyshev max filter)
fn dilate(buf: &mut [u8], width: i32, height: i32, radius: i32) {
    let src = buf.to_vec();
    for y in 0..height {
        for x in 0..width {
            let mut max = 0u8;
            for sy in (y - radius).max(0)..=(y + radius).min(height - 1) {
                for sx in (x - radius).max(0)..=(x + radius).min(width - 1) {
                    max = max.max(src[px_usize(sy * width + sx)]);
                }
            }
            buf[px_usize(y * width + x)] = max;
        }
    }
}

const BLUR_APREC: i32 = 16;
const BLUR_ZPREC: i32 = 7;

#[inline]
fn blur_step(z: &mut i32, p: &mut u8, alpha: i32) {
    *z += (alpha * (((*p as i32) << BLUR_ZPREC) - *z)) >> BLUR_APREC;
    *p = (*z >> BLUR_ZPREC) as u8;
}

fn blur_rows(buf: &mut [u8], width: i32, alpha: i32) {
    let w = px_usize(width);
    for row in buf.chunks_exact_mut(w) {
        let mut z = 0;
        for x in 1..w {
            blur_step(&mut z, &mut row[x], alpha);
        }
        row[w - 1] = 0;
        z = 0;
        for x in (0..w - 1).rev() {
            blur_step(&mut z, &mut row[x], alpha);
        }
        row[0] = 0;
    }
}

fn blur_cols(buf: &mut [u8], width: i32, height: i32, alpha: i32) {
    let (w, h) = (px_usize(width), px_usize(height));
    for x in 0..w {
        let mut z = 0;
        for y in 1..h {
            blur_step(&mut z, &mut buf[y * w + x], alpha);
        }
        buf[(h - 1) * w + x] = 0;
        z = 0;
        for y in (0..h - 1).rev() {
            blur_step(&mut z, &mut buf[y * w + x], alpha);
        }
        buf[x] = 0;
    }
}

/// Two iterations of a separable exponential box blur, in fixed point
///
/// Borders are forced to zero on each pass; the padding reserved around
/// the glyph guarantees the visible falloff fits the bitmap.
fn blur(buf: &mut [u8], width: i32, height: i32, amount: i32) {
    if amount < 1 {
        return;
    }
    let sigma = amount as f32 * 0.57735; // 1 / sqrt(3)
    let alpha = ((1 << BLUR_APREC) as f32 * (1.0 - (-2.3 / (sigma + 1.0)).exp())) as i32;
    for _ in 0..2 {
        blur_rows(buf, width, alpha);
        blur_cols(buf, width, height, alpha);
    }
}
