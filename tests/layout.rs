// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Layout engine behavior: pen movement, kerning, line breaks, measurement

mod common;

use atlas_text::{Bounds, Color, FontSystemOptions, Vec2};
use common::{basic_system, span, system, TestSink};

#[test]
fn draw_returns_final_pen_x() {
    let (mut sys, _) = basic_system();
    let mut sink = TestSink::default();
    let pen = sys
        .font(16)
        .draw_text(&mut sink, 5.0, 0.0, "ab", Color::WHITE, Vec2::ONE, 0.0)
        .unwrap();
    assert_eq!(pen, 25.0); // two advances of 10 from x = 5
    assert_eq!(sink.quads.len(), 2);
}

#[test]
fn empty_text_is_a_no_op() {
    let (mut sys, counter) = basic_system();
    let mut sink = TestSink::default();
    let pen = sys
        .font(16)
        .draw_text(&mut sink, 5.0, 0.0, "", Color::WHITE, Vec2::ONE, 0.0)
        .unwrap();
    assert_eq!(pen, 5.0);
    assert!(sink.quads.is_empty());

    let (advance, bounds) = sys.font(16).text_bounds(5.0, 5.0, "", Vec2::ONE);
    assert_eq!(advance, 0.0);
    assert_eq!(bounds, Bounds::default());
    assert_eq!(counter.get(), 0);
}

#[test]
fn quad_positions_account_for_ascent_and_offsets() {
    let (mut sys, _) = basic_system();
    // glyph box 8x10 plus 2px padding; ascent 12
    let rects = sys.font(16).glyph_rects(5.0, 7.0, "A", Vec2::ONE);
    assert_eq!(rects.len(), 1);
    assert_eq!(rects[0].x, 3); // 5 + x_offset (0 - 2)
    assert_eq!(rects[0].y, 7); // 7 + ascent 12 + y_offset (-10 - 2)
    assert_eq!(rects[0].width, 12);
    assert_eq!(rects[0].height, 14);
}

#[test]
fn line_feed_resets_pen_and_advances_baseline() {
    let (mut sys, _) = basic_system();
    let rects = sys.font(16).glyph_rects(0.0, 0.0, "AB\nC", Vec2::ONE);
    assert_eq!(rects.len(), 3);
    assert_eq!(rects[2].x, rects[0].x, "pen x must reset to the start");
    assert_eq!(rects[2].y - rects[0].y, 16, "one line height down");
}

#[test]
fn line_spacing_adds_to_line_height() {
    let (mut sys, _) = basic_system();
    sys.line_spacing = 4;
    let rects = sys.font(16).glyph_rects(0.0, 0.0, "A\nB", Vec2::ONE);
    assert_eq!(rects[1].y - rects[0].y, 20);
}

#[test]
fn kerning_applies_within_one_source() {
    let (mut sys, _) = system(FontSystemOptions::default());
    let mut left = span(' ', 'm');
    left.kern = 3.0;
    let mut right = span('n', 'z');
    right.kern = 5.0;
    sys.add_font(&left.descriptor(), false, false).unwrap();
    sys.add_font(&right.descriptor(), false, false).unwrap();

    let (advance, _) = sys.font(16).text_bounds(0.0, 0.0, "ab", Vec2::ONE);
    assert_eq!(advance, 23.0); // 10 + trunc(3 + 0.5) + 10
}

#[test]
fn kerning_suppressed_across_sources() {
    let (mut sys, _) = system(FontSystemOptions::default());
    let mut left = span(' ', 'm');
    left.kern = 3.0;
    let mut right = span('n', 'z');
    right.kern = 5.0;
    sys.add_font(&left.descriptor(), false, false).unwrap();
    sys.add_font(&right.descriptor(), false, false).unwrap();

    // 'a' and 'n' come from different sources: no kerning at the join
    let (advance, _) = sys.font(16).text_bounds(0.0, 0.0, "an", Vec2::ONE);
    assert_eq!(advance, 20.0);
}

#[test]
fn kerning_disabled_by_flag() {
    let (mut sys, _) = system(FontSystemOptions::default());
    let mut font = span(' ', 'z');
    font.kern = 3.0;
    sys.add_font(&font.descriptor(), false, false).unwrap();
    sys.kerning = false;

    let (advance, _) = sys.font(16).text_bounds(0.0, 0.0, "ab", Vec2::ONE);
    assert_eq!(advance, 20.0);
}

#[test]
fn character_spacing_applies_between_every_pair() {
    let (mut sys, _) = system(FontSystemOptions::default());
    let mut left = span(' ', 'm');
    left.kern = 3.0;
    let mut right = span('n', 'z');
    right.kern = 5.0;
    sys.add_font(&left.descriptor(), false, false).unwrap();
    sys.add_font(&right.descriptor(), false, false).unwrap();
    sys.character_spacing = 2;

    let (same, _) = sys.font(16).text_bounds(0.0, 0.0, "ab", Vec2::ONE);
    assert_eq!(same, 25.0); // 10 + trunc(3 + 2 + 0.5) + 10
    let (cross, _) = sys.font(16).text_bounds(0.0, 0.0, "an", Vec2::ONE);
    assert_eq!(cross, 22.0); // spacing still applies without kerning
}

#[test]
fn measurement_reports_advance_and_bounds() {
    let (mut sys, _) = basic_system();
    let (advance, bounds) = sys.font(16).text_bounds(0.0, 0.0, "ab", Vec2::ONE);
    assert_eq!(advance, 20.0);
    assert_eq!(bounds.min, Vec2(-2.0, 0.0)); // x_offset / ascent + y_offset
    assert_eq!(bounds.max.0, 20.0); // final pen x, no stroke widening
    assert_eq!(bounds.max.1, 14.0); // quad bottom: ascent + y_offset + box
}

#[test]
fn measure_size_is_max_corner_from_origin() {
    let (mut sys, _) = basic_system();
    let size = sys.font(16).measure_size("ab", Vec2::ONE);
    assert_eq!(size, Vec2(20.0, 14.0));
}

#[test]
fn stroke_widens_max_bound_only() {
    let (mut sys, _) = system(FontSystemOptions {
        stroke: 2,
        ..Default::default()
    });
    sys.add_font(&span(' ', 'z').descriptor(), false, false)
        .unwrap();

    let (advance, bounds) = sys.font(16).text_bounds(0.0, 0.0, "A", Vec2::ONE);
    assert_eq!(advance, 10.0);
    assert_eq!(bounds.max.0, 14.0); // pen 10 + 2 * stroke
    assert_eq!(bounds.min.0, -4.0); // stroke pad shifts the quad left
}

#[test]
fn scale_multiplies_quads_but_not_pen() {
    let (mut sys, _) = basic_system();
    let rects = sys.font(16).glyph_rects(0.0, 0.0, "ab", Vec2(2.0, 2.0));
    assert_eq!(rects[0].width, 24);
    assert_eq!(rects[0].height, 28);
    // second quad: pen advanced 10 unscaled, then scaled at quad build
    assert_eq!(rects[1].x, (10.0f32 - 2.0) as i32 * 2);

    let (advance, _) = sys.font(16).text_bounds(0.0, 0.0, "ab", Vec2(2.0, 2.0));
    assert_eq!(advance, 20.0, "advance stays in pen space");
}

#[test]
fn line_metrics_fixed_by_first_resolved_glyph() {
    let (mut sys, _) = system(FontSystemOptions::default());
    sys.add_font(&span(' ', 'z').descriptor(), false, false)
        .unwrap();
    let mut bold = span('a', 'z');
    bold.ascent = 20.0;
    bold.line_height = 30.0;
    sys.add_font(&bold.descriptor(), true, false).unwrap();

    // First glyph bold: its metrics hold for the whole call
    let rects = sys.font(16).glyph_rects(0.0, 0.0, "<b>a</b>\na", Vec2::ONE);
    assert_eq!(rects[1].y - rects[0].y, 30);

    // First glyph plain: plain metrics hold even for the bold second line
    let rects = sys.font(16).glyph_rects(0.0, 0.0, "a\n<b>a</b>", Vec2::ONE);
    assert_eq!(rects[1].y - rects[0].y, 16);
}

#[test]
fn unresolvable_codepoint_falls_back_to_default() {
    let (mut sys, _) = basic_system();
    sys.default_codepoint = Some('?');

    let (advance, _) = sys.font(16).text_bounds(0.0, 0.0, "A\u{2728}B", Vec2::ONE);
    assert_eq!(advance, 30.0, "sparkles render as the default codepoint");
}

#[test]
fn unresolvable_codepoint_skipped_without_default() {
    let (mut sys, _) = basic_system();
    sys.default_codepoint = None;

    let mut sink = TestSink::default();
    let pen = sys
        .font(16)
        .draw_text(&mut sink, 0.0, 0.0, "A\u{2728}B", Color::WHITE, Vec2::ONE, 0.0)
        .unwrap();
    assert_eq!(sink.quads.len(), 2);
    assert_eq!(pen, 20.0, "skipped codepoints add no advance");
}

#[test]
fn surrogate_free_iteration_handles_astral_codepoints() {
    // U+1F600 needs a surrogate pair in UTF-16; here it is one scalar and
    // must count as a single (unresolvable) codepoint
    let (mut sys, _) = basic_system();
    sys.default_codepoint = None;
    let (advance, _) = sys.font(16).text_bounds(0.0, 0.0, "a\u{1F600}b", Vec2::ONE);
    assert_eq!(advance, 20.0);
}

#[test]
fn growable_buffers_share_the_iteration_contract() {
    let (mut sys, _) = basic_system();
    let fixed = sys.font(16).measure_size("ab\ncd", Vec2::ONE);

    let mut buffer = String::new();
    buffer.push_str("ab\n");
    buffer.push_str("cd");
    let grown = sys.font(16).measure_size(&buffer, Vec2::ONE);
    assert_eq!(fixed, grown);
}
