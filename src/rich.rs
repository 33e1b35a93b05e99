// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Inline rich-text markup
//!
//! A tiny markup grammar embedded in drawn strings: `<b>`/`</b>` toggles
//! bold, `<i>`/`</i>` italic, `<c=VALUE>`/`</c>` a color override where
//! VALUE is `#RRGGBB`, `#RRGGBBAA` or one of a few literal names. Tag
//! letters are case-insensitive; color names are not.
//!
//! The grammar is deliberately flat: there is no nesting stack, so
//! re-opening a tag before closing it simply overwrites the corresponding
//! state field. A malformed tag has no effect at all and the `<` is
//! rendered as an ordinary character.
//!
//! [`RichState`] is the transient style state mutated by tags. It is created
//! fresh for each top-level draw or measure call and discarded at the end;
//! it never persists between calls.

use crate::Color;
use bitflags::bitflags;

bitflags! {
    /// Style variant selector
    ///
    /// The four combinations of these bits identify the four glyph cache
    /// maps: plain, bold, italic and bold-italic.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct StyleFlags: u8 {
        const BOLD = 1 << 0;
        const ITALIC = 1 << 1;
    }
}

impl StyleFlags {
    /// Index of the cache map for this variant (0..=3)
    pub(crate) fn variant(self) -> usize {
        self.bits() as usize
    }
}

/// Call-scoped rich-text state
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RichState {
    /// Requested style variant
    pub style: StyleFlags,
    /// Color override, if a `<c=…>` tag is open
    pub color: Option<Color>,
}

impl RichState {
    /// Apply the color override, if any, to a caller-supplied base color
    ///
    /// The override tints rather than replaces: the result is the
    /// channel-wise product of `base` and the override.
    pub fn blend(&self, base: Color) -> Color {
        match self.color {
            Some(tint) => base.modulate(tint),
            None => base,
        }
    }
}

fn named_color(name: &str) -> Option<Color> {
    Some(match name {
        "red" => Color::RED,
        "yellow" => Color::YELLOW,
        "blue" => Color::BLUE,
        "green" => Color::GREEN,
        "cyan" => Color::CYAN,
        "orange" => Color::ORANGE,
        _ => return None,
    })
}

/// Try to consume one tag at the start of `rest`
///
/// `rest` must begin with `<`. On success mutates `state` and returns the
/// byte length of the consumed tag; on failure returns `None` with `state`
/// untouched (the caller renders `<` literally).
pub(crate) fn consume_tag(rest: &str, state: &mut RichState) -> Option<usize> {
    let b = rest.as_bytes();
    debug_assert_eq!(b.first(), Some(&b'<'));

    match b.get(1)? {
        b'/' => {
            // Closing form: exactly `</x>`
            if b.get(3) != Some(&b'>') {
                return None;
            }
            match b.get(2)? {
                b'b' | b'B' => state.style.set(StyleFlags::BOLD, false),
                b'i' | b'I' => state.style.set(StyleFlags::ITALIC, false),
                b'c' | b'C' => state.color = None,
                _ => return None,
            }
            Some(4)
        }
        b'b' | b'B' if b.get(2) == Some(&b'>') => {
            state.style.set(StyleFlags::BOLD, true);
            Some(3)
        }
        b'i' | b'I' if b.get(2) == Some(&b'>') => {
            state.style.set(StyleFlags::ITALIC, true);
            Some(3)
        }
        b'c' | b'C' if b.get(2) == Some(&b'=') => {
            let gt = rest[3..].find('>')? + 3;
            let value = &rest[3..gt];
            if value.is_empty() {
                return None;
            }
            let color = if value.starts_with('#') {
                Color::from_hex(value)?
            } else {
                named_color(value)?
            };
            state.color = Some(color);
            Some(gt + 1)
        }
        _ => None,
    }
}
