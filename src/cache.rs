// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Per-size glyph caching

use crate::fonts::{FaceSet, GlyphId};
use crate::{FaceId, Rect, StyleFlags};
use std::collections::HashMap;

/// Padding reserved around a glyph bitmap for a blur or stroke effect
///
/// Two pixels minimum even with no effect; quad sampling assumes this
/// guard band between neighbouring glyphs.
pub(crate) fn effect_pad(amount: i32) -> i32 {
    amount + 2
}

/// A cached glyph: metrics plus (eventually) an atlas placement
///
/// Created on the first lookup of a (codepoint, style) pair at one size.
/// `bounds.x`/`bounds.y` and `page` are written exactly once, when the
/// glyph is first rasterized; everything else is immutable. `page == None`
/// means the metrics are known but no bitmap exists yet — the state every
/// glyph stays in if only measurement calls touch it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Glyph {
    /// The codepoint this glyph was cached under
    pub codepoint: char,
    /// Source-internal glyph identifier
    pub id: GlyphId,
    /// The source that resolved this glyph
    pub face: FaceId,
    /// Bitmap rectangle; atlas-local once placed, origin zero before
    pub bounds: Rect,
    /// Horizontal pen advance, before kerning
    pub x_advance: i32,
    /// Bitmap left edge relative to the pen position
    pub x_offset: i32,
    /// Bitmap top edge relative to the baseline
    pub y_offset: i32,
    /// Index of the atlas page holding the bitmap, if rasterized
    pub page: Option<u32>,
}

impl Glyph {
    /// True if there is nothing to draw for this glyph
    pub fn is_empty(&self) -> bool {
        self.bounds.width == 0 || self.bounds.height == 0
    }
}

/// Codepoint → glyph maps for one rendered size
///
/// Four independent maps, one per style variant: the same codepoint may
/// resolve to a different source and glyph id under each variant. Entries
/// are only ever removed wholesale, by [`crate::FontSystem::reset`].
pub(crate) struct GlyphCache {
    size: i32,
    maps: [HashMap<char, Glyph>; 4],
}

impl GlyphCache {
    pub fn new(size: i32) -> Self {
        GlyphCache {
            size,
            maps: Default::default(),
        }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn get(&self, style: StyleFlags, c: char) -> Option<Glyph> {
        self.maps[style.variant()].get(&c).copied()
    }

    /// Re-store a glyph after its atlas placement was filled in
    pub fn update(&mut self, style: StyleFlags, glyph: Glyph) {
        self.maps[style.variant()].insert(glyph.codepoint, glyph);
    }

    /// Fetch the cached glyph for (codepoint, style), creating it on miss
    ///
    /// A miss resolves the codepoint through `faces` and memoizes the
    /// metrics; the bitmap box is padded by `pad` on every side and the
    /// offsets shifted to match. Returns `None` (and caches nothing) when
    /// no attached source covers the codepoint.
    pub fn get_or_create(
        &mut self,
        faces: &FaceSet,
        pad: i32,
        rich_text: bool,
        c: char,
        style: StyleFlags,
    ) -> Option<Glyph> {
        if let Some(glyph) = self.get(style, c) {
            return Some(glyph);
        }

        let (face, id) = faces.resolve(c, style, rich_text)?;
        let m = faces.get(face).glyph_metrics(id, self.size);
        let glyph = Glyph {
            codepoint: c,
            id,
            face,
            bounds: Rect::new(0, 0, m.x1 - m.x0 + pad * 2, m.y1 - m.y0 + pad * 2),
            x_advance: m.advance,
            x_offset: m.x0 - pad,
            y_offset: m.y0 - pad,
            page: None,
        };
        self.maps[style.variant()].insert(c, glyph);
        Some(glyph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::{FontSource, GlyphMetrics, SizeMetrics};

    struct Mono;

    impl FontSource for Mono {
        fn glyph_id(&self, c: char) -> Option<GlyphId> {
            c.is_ascii_alphanumeric().then(|| GlyphId(c as u16))
        }
        fn glyph_metrics(&self, _: GlyphId, _: i32) -> GlyphMetrics {
            GlyphMetrics {
                advance: 12,
                x0: 1,
                y0: -10,
                x1: 9,
                y1: 0,
            }
        }
        fn size_metrics(&self, _: i32) -> SizeMetrics {
            SizeMetrics::default()
        }
        fn kern_advance(&self, _: GlyphId, _: GlyphId, _: i32) -> f32 {
            0.0
        }
        fn rasterize(&self, _: GlyphId, _: i32, _: &mut [u8], _: i32, _: i32, _: i32) {}
    }

    fn faces() -> FaceSet {
        let mut faces = FaceSet::default();
        faces.push(Box::new(Mono), false, false);
        faces
    }

    #[test]
    fn padding_applied_to_bounds_and_offsets() {
        let faces = faces();
        let mut cache = GlyphCache::new(20);
        let g = cache
            .get_or_create(&faces, effect_pad(3), true, 'a', StyleFlags::empty())
            .unwrap();
        // box 8x10 plus 5 pixels of padding per side
        assert_eq!(g.bounds, Rect::new(0, 0, 18, 20));
        assert_eq!(g.x_offset, 1 - 5);
        assert_eq!(g.y_offset, -10 - 5);
        assert_eq!(g.x_advance, 12);
        assert_eq!(g.page, None);
    }

    #[test]
    fn lookup_is_memoized() {
        let faces = faces();
        let mut cache = GlyphCache::new(20);
        let a = cache
            .get_or_create(&faces, 2, true, 'a', StyleFlags::empty())
            .unwrap();
        let b = cache
            .get_or_create(&faces, 2, true, 'a', StyleFlags::empty())
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn variants_cache_independently() {
        let faces = faces();
        let mut cache = GlyphCache::new(20);
        cache
            .get_or_create(&faces, 2, true, 'a', StyleFlags::BOLD)
            .unwrap();
        assert!(cache.get(StyleFlags::empty(), 'a').is_none());
        assert!(cache.get(StyleFlags::BOLD, 'a').is_some());
    }

    #[test]
    fn unresolved_codepoint_not_cached() {
        let faces = faces();
        let mut cache = GlyphCache::new(20);
        assert!(cache
            .get_or_create(&faces, 2, true, '!', StyleFlags::empty())
            .is_none());
        assert!(cache.get(StyleFlags::empty(), '!').is_none());
    }
}
