//! Property-Based Tests
//!
//! Invariants of the coordinate math and the field model:
//! - Text baselines follow the page-height inversion exactly
//! - Images always fit their box and keep their aspect ratio
//! - Clamped boxes stay on the surface
//! - Wrapped lines never overflow their box

use pdf_fields::field::MIN_FONT_SIZE;
use pdf_fields::layout::{contain, image_placement, text_origin, Surface};
use pdf_fields::pdf::text::{text_width, wrap_lines};
use pdf_fields::{FieldKind, FieldModel, Position, Size};
use proptest::prelude::*;

// ============================================================================
// Coordinate Properties
// ============================================================================

/// Property: text origin is (left + 3, H - top - fontSize - 3)
#[test]
fn proptest_text_origin_formula() {
    proptest!(|(
        top in 0.0f32..1000.0,
        left in 0.0f32..1000.0,
        font_size in 1u32..96,
        page_height in 100.0f32..2000.0,
    )| {
        let origin = text_origin(Position { top, left }, font_size as f32, page_height, 3.0);
        prop_assert_eq!(origin.x, left + 3.0);
        prop_assert_eq!(origin.y, page_height - top - font_size as f32 - 3.0);
    });
}

/// Property: contained images fit their bounds and keep their ratio
#[test]
fn proptest_contain_fits_and_keeps_ratio() {
    proptest!(|(
        iw in 1u32..4000,
        ih in 1u32..4000,
        bw in 1.0f32..1000.0,
        bh in 1.0f32..1000.0,
    )| {
        let intrinsic = Size::new(iw as f32, ih as f32);
        let drawn = contain(intrinsic, Size::new(bw, bh));

        prop_assert!(drawn.width <= bw);
        prop_assert!(drawn.height <= bh);
        prop_assert!(drawn.width > 0.0 && drawn.height > 0.0);

        // One axis touches its bound
        let touches = (drawn.width - bw).abs() <= bw * 1e-5 || (drawn.height - bh).abs() <= bh * 1e-5;
        prop_assert!(touches, "{:?} in {}x{}", drawn, bw, bh);

        let ratio = (drawn.width / drawn.height) / (intrinsic.width / intrinsic.height);
        prop_assert!((ratio - 1.0).abs() < 1e-3, "ratio drifted: {}", ratio);
    });
}

/// Property: an image's top edge lines up with the top of its box
#[test]
fn proptest_image_anchored_at_box_top() {
    proptest!(|(
        top in 0.0f32..700.0,
        left in 0.0f32..500.0,
        iw in 1u32..2000,
        ih in 1u32..2000,
    )| {
        let page_height = 792.0f32;
        let rect = image_placement(
            Position { top, left },
            Size::new(100.0, 80.0),
            Size::new(iw as f32, ih as f32),
            page_height,
        );
        prop_assert_eq!(rect.x, left);
        prop_assert!((rect.y + rect.height - (page_height - top)).abs() < 1e-3);
    });
}

/// Property: clamped positions keep the whole box on the surface
#[test]
fn proptest_clamp_keeps_box_on_surface() {
    proptest!(|(
        top in -500.0f32..1500.0,
        left in -500.0f32..1500.0,
        width in 0.0f32..612.0,
        height in 0.0f32..792.0,
    )| {
        let surface = Surface::new(612.0, 792.0);
        let size = Size::new(width, height);
        let clamped = surface.clamp_position(Position { top, left }, size);

        prop_assert!(clamped.top >= 0.0 && clamped.top + height <= 792.0 + 1e-3);
        prop_assert!(clamped.left >= 0.0 && clamped.left + width <= 612.0 + 1e-3);
    });
}

// ============================================================================
// Text Properties
// ============================================================================

/// Property: wrapped lines fit whenever the box can hold any single glyph
#[test]
fn proptest_wrapped_lines_fit() {
    proptest!(|(
        text in "[a-zA-Z ]{0,120}",
        font_size in 6u32..24,
        max_width in 50.0f32..400.0,
    )| {
        let font_size = font_size as f32;
        for line in wrap_lines(&text, font_size, max_width) {
            prop_assert!(text_width(&line, font_size) <= max_width + 1e-3, "{:?} overflows", line);
        }
    });
}

/// Property: wrapping never drops characters
#[test]
fn proptest_wrap_keeps_characters() {
    proptest!(|(text in "[a-z ]{0,120}", max_width in 1.0f32..300.0)| {
        let kept: usize = wrap_lines(&text, 12.0, max_width)
            .iter()
            .map(|l| l.chars().filter(|c| *c != ' ').count())
            .sum();
        prop_assert_eq!(kept, text.chars().filter(|c| *c != ' ').count());
    });
}

// ============================================================================
// Model Properties
// ============================================================================

/// Property: font size never drops below the minimum
#[test]
fn proptest_font_size_floor() {
    proptest!(|(deltas in prop::collection::vec(-40i32..40, 0..30))| {
        let mut model = FieldModel::default();
        let id = model.add_field(FieldKind::Text);
        for delta in deltas {
            model.set_font_size(id, delta);
            prop_assert!(model.field(id).unwrap().font_size >= MIN_FONT_SIZE);
        }
    });
}

/// Property: ids are unique and increasing in creation order
#[test]
fn proptest_ids_strictly_increase() {
    proptest!(|(count in 1usize..50)| {
        let mut model = FieldModel::default();
        let ids: Vec<_> = (0..count).map(|_| model.add_field(FieldKind::Image)).collect();
        prop_assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    });
}
