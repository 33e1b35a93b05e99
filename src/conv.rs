// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Type conversion utilities
//!
//! Atlas and glyph geometry uses `i32` pixels (font metrics may be negative)
//! while face and page identifiers use `u32` (to save space over `usize`).
//! These helpers bridge to `usize` for indexing and buffer sizing; via
//! `easy_cast` they assert that no value is mangled in the process.

use easy_cast::Cast;

/// Convert a `usize` index → `u32` identifier
#[inline]
pub(crate) fn to_u32(x: usize) -> u32 {
    x.cast()
}

/// Convert a `u32` identifier → `usize` index
#[inline]
pub(crate) fn to_usize(x: u32) -> usize {
    x.cast()
}

/// Convert non-negative `i32` pixel geometry → `usize` for indexing
///
/// Panics if `x` is negative; callers only pass validated dimensions.
#[inline]
pub(crate) fn px_usize(x: i32) -> usize {
    x.cast()
}
