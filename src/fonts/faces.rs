// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Attached font sources and style resolution

use super::{FontSource, GlyphId};
use crate::conv::{to_u32, to_usize};
use crate::StyleFlags;
use smallvec::SmallVec;

/// Identifies an attached font source by attachment index
///
/// Glyphs store a `FaceId` rather than a reference to their source; kerning
/// compares these ids to decide whether two glyphs share a source.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FaceId(pub(crate) u32);

impl FaceId {
    /// Get as `usize`
    pub fn get(self) -> usize {
        to_usize(self.0)
    }
}

/// The set of sources attached to one font system
///
/// Holds every source in attachment order plus the three optional style
/// roles. Sources are never detached; the set only grows.
#[derive(Default)]
pub(crate) struct FaceSet {
    sources: SmallVec<[Box<dyn FontSource>; 4]>,
    bold: Option<FaceId>,
    italic: Option<FaceId>,
    bold_italic: Option<FaceId>,
}

impl FaceSet {
    /// Attach a source, optionally claiming a style role
    pub fn push(&mut self, source: Box<dyn FontSource>, bold: bool, italic: bool) -> FaceId {
        let id = FaceId(to_u32(self.sources.len()));
        self.sources.push(source);

        let role = match (bold, italic) {
            (true, true) => Some(&mut self.bold_italic),
            (true, false) => Some(&mut self.bold),
            (false, true) => Some(&mut self.italic),
            (false, false) => None,
        };
        if let Some(role) = role {
            if let Some(prev) = role.replace(id) {
                log::warn!(
                    "font role (bold={bold}, italic={italic}) moved from face {} to face {}",
                    prev.get(),
                    id.get()
                );
            }
        }
        id
    }

    pub fn get(&self, id: FaceId) -> &dyn FontSource {
        &*self.sources[id.get()]
    }

    pub fn has_bold(&self) -> bool {
        self.bold.is_some()
    }

    pub fn has_italic(&self) -> bool {
        self.italic.is_some()
    }

    pub fn has_bold_italic(&self) -> bool {
        self.bold_italic.is_some()
    }

    fn try_role(&self, role: Option<FaceId>, c: char) -> Option<(FaceId, GlyphId)> {
        let id = role?;
        self.get(id).glyph_id(c).map(|g| (id, g))
    }

    /// Resolve a codepoint to (source, glyph id) under the given style
    ///
    /// Style roles are only consulted when `rich_text` is set. A bold-italic
    /// request that cannot be satisfied degrades to italic, then bold, then
    /// the plain scan — italic deliberately outranks bold; changing the
    /// order would change rendered output for existing content. The plain
    /// scan tries every attached source in attachment order.
    pub fn resolve(
        &self,
        c: char,
        style: StyleFlags,
        rich_text: bool,
    ) -> Option<(FaceId, GlyphId)> {
        if rich_text {
            if style.contains(StyleFlags::BOLD | StyleFlags::ITALIC) {
                if let Some(found) = self.try_role(self.bold_italic, c) {
                    return Some(found);
                }
            }
            if style.contains(StyleFlags::ITALIC) {
                if let Some(found) = self.try_role(self.italic, c) {
                    return Some(found);
                }
            }
            if style.contains(StyleFlags::BOLD) {
                if let Some(found) = self.try_role(self.bold, c) {
                    return Some(found);
                }
            }
        }

        self.sources
            .iter()
            .enumerate()
            .find_map(|(i, source)| source.glyph_id(c).map(|g| (FaceId(to_u32(i)), g)))
    }
}
