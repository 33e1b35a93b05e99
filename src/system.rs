// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! The font system: attached sources, atlas pages and per-size caches

use crate::atlas::{AtlasPage, AtlasSet, TextureCreator};
use crate::cache::GlyphCache;
use crate::display::SizedFont;
use crate::fonts::{FaceId, FaceSet, FontLoadError, FontLoader};
use std::collections::HashMap;
use thiserror::Error;

/// Highest accepted blur or stroke amount
pub const MAX_EFFECT: i32 = 20;

/// Construction parameters for a [`FontSystem`]
///
/// `width`/`height` are the atlas page dimensions. `blur` and `stroke` are
/// mutually exclusive post-processing effects in `0..=`[`MAX_EFFECT`]. The
/// remaining fields seed the matching public fields of the system and may
/// be changed later.
#[derive(Clone, Debug)]
pub struct FontSystemOptions {
    pub width: i32,
    pub height: i32,
    pub blur: i32,
    pub stroke: i32,
    pub kerning: bool,
    pub default_codepoint: Option<char>,
    pub character_spacing: i32,
    pub line_spacing: i32,
    pub rich_text: bool,
}

impl Default for FontSystemOptions {
    fn default() -> Self {
        FontSystemOptions {
            width: 1024,
            height: 1024,
            blur: 0,
            stroke: 0,
            kerning: true,
            default_codepoint: Some(' '),
            character_spacing: 0,
            line_spacing: 0,
            rich_text: true,
        }
    }
}

/// Invalid [`FontSystemOptions`]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("atlas page dimensions must be positive, got {0}x{1}")]
    PageSize(i32, i32),
    #[error("blur amount {0} out of range (0..=20 allowed)")]
    Blur(i32),
    #[error("stroke amount {0} out of range (0..=20 allowed)")]
    Stroke(i32),
    #[error("blur and stroke are mutually exclusive")]
    BlurAndStroke,
}

/// Dynamic glyph cache and atlas over a set of font sources
///
/// One system owns the attached sources, the atlas page list and a glyph
/// cache per rendered size. All state is internal and single-threaded;
/// repeated draws of cached text cost hash lookups only, and the only way
/// to reclaim atlas space is [`FontSystem::reset`].
///
/// Drawing and measuring happen through the per-size handle returned by
/// [`FontSystem::font`].
pub struct FontSystem<C: TextureCreator> {
    pub(crate) faces: FaceSet,
    pub(crate) atlas: AtlasSet<C>,
    pub(crate) caches: HashMap<i32, GlyphCache>,
    loader: Box<dyn FontLoader>,
    page_width: i32,
    page_height: i32,

    /// Apply kerning between glyph pairs from the same source
    pub kerning: bool,
    /// Codepoint drawn in place of any unresolvable codepoint
    pub default_codepoint: Option<char>,
    /// Extra pixels between consecutive glyphs
    pub character_spacing: i32,
    /// Extra pixels between lines
    pub line_spacing: i32,
    /// Interpret inline `<b>`/`<i>`/`<c=…>` markup
    pub rich_text: bool,
}

impl<C: TextureCreator> FontSystem<C> {
    /// Construct a system
    ///
    /// `loader` decodes font payloads passed to [`FontSystem::add_font`];
    /// `creator` allocates atlas page textures on demand (no page exists
    /// until the first glyph is rasterized).
    pub fn new(
        loader: Box<dyn FontLoader>,
        creator: C,
        options: FontSystemOptions,
    ) -> Result<Self, ConfigError> {
        if options.width <= 0 || options.height <= 0 {
            return Err(ConfigError::PageSize(options.width, options.height));
        }
        if !(0..=MAX_EFFECT).contains(&options.blur) {
            return Err(ConfigError::Blur(options.blur));
        }
        if !(0..=MAX_EFFECT).contains(&options.stroke) {
            return Err(ConfigError::Stroke(options.stroke));
        }
        if options.blur != 0 && options.stroke != 0 {
            return Err(ConfigError::BlurAndStroke);
        }

        Ok(FontSystem {
            faces: FaceSet::default(),
            atlas: AtlasSet::new(
                creator,
                options.width,
                options.height,
                options.blur,
                options.stroke,
            ),
            caches: HashMap::new(),
            loader,
            page_width: options.width,
            page_height: options.height,
            kerning: options.kerning,
            default_codepoint: options.default_codepoint,
            character_spacing: options.character_spacing,
            line_spacing: options.line_spacing,
            rich_text: options.rich_text,
        })
    }

    /// Attach a font
    ///
    /// `bold`/`italic` select the style role this source fills: both for
    /// bold-italic, one for bold or italic, neither for a plain source.
    /// Every attached source additionally serves as a plain fallback, in
    /// attachment order.
    pub fn add_font(
        &mut self,
        data: &[u8],
        bold: bool,
        italic: bool,
    ) -> Result<FaceId, FontLoadError> {
        let source = self.loader.load(data)?;
        Ok(self.faces.push(source, bold, italic))
    }

    pub fn has_bold_variant(&self) -> bool {
        self.faces.has_bold()
    }

    pub fn has_italic_variant(&self) -> bool {
        self.faces.has_italic()
    }

    pub fn has_bold_italic_variant(&self) -> bool {
        self.faces.has_bold_italic()
    }

    /// Configured blur amount
    pub fn blur(&self) -> i32 {
        self.atlas.blur()
    }

    /// Configured stroke amount
    pub fn stroke(&self) -> i32 {
        self.atlas.stroke()
    }

    /// Register the page-full notification
    ///
    /// Called with the index of the exhausted page, exactly once per page
    /// transition, before the replacement page is allocated.
    pub fn on_page_full(&mut self, notify: impl FnMut(usize) + 'static) {
        self.atlas.set_on_full(Box::new(notify));
    }

    /// The atlas pages allocated so far
    pub fn pages(&self) -> &[AtlasPage<C::Texture>] {
        self.atlas.pages()
    }

    /// The per-size layout, draw and measurement surface
    pub fn font(&mut self, size: i32) -> SizedFont<'_, C> {
        SizedFont::new(self, size)
    }

    /// Discard all atlas pages and all cached glyphs
    ///
    /// Attached fonts survive; subsequent draws re-resolve and re-rasterize
    /// from scratch. This is the only reclamation mechanism.
    pub fn reset(&mut self) {
        let (w, h) = (self.page_width, self.page_height);
        self.reset_with_size(w, h);
    }

    /// [`FontSystem::reset`], additionally changing the atlas page size
    pub fn reset_with_size(&mut self, width: i32, height: i32) {
        self.caches.clear();
        self.atlas.reset(width, height);
        self.page_width = width;
        self.page_height = height;
    }
}
