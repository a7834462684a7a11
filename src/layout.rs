//! Coordinate translation between screen space and PDF space
//!
//! Screen space has its origin at the top-left of the editor surface with Y
//! growing downward. PDF space has its origin at the bottom-left of the page
//! with Y growing upward. Every draw goes through one of the functions here.

use crate::field::{Position, Size};

/// A point in PDF space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// A rectangle in PDF space, anchored at its bottom-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDimensions {
    pub width: f32,
    pub height: f32,
}

impl PageDimensions {
    /// US Letter size (8.5" × 11")
    pub fn letter() -> Self {
        Self { width: 612.0, height: 792.0 }
    }

    /// A4 size (210mm × 297mm)
    pub fn a4() -> Self {
        Self { width: 595.28, height: 841.89 }
    }
}

/// The editor surface fields are placed on, in screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub width: f32,
    pub height: f32,
}

impl Surface {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A surface that renders a page at 1px per point
    pub fn for_page(page: PageDimensions) -> Self {
        Self { width: page.width, height: page.height }
    }

    /// Keep a box size within `[0, surface]` on each axis
    pub fn clamp_size(&self, size: Size) -> Size {
        Size {
            width: clamp(size.width, 0.0, self.width),
            height: clamp(size.height, 0.0, self.height),
        }
    }

    /// Keep a box of `size` entirely on the surface
    pub fn clamp_position(&self, position: Position, size: Size) -> Position {
        Position {
            top: clamp(position.top, 0.0, self.height - size.height),
            left: clamp(position.left, 0.0, self.width - size.width),
        }
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::for_page(PageDimensions::letter())
    }
}

/// min-then-max, so an inverted range collapses to `lo`
fn clamp(value: f32, lo: f32, hi: f32) -> f32 {
    value.min(hi).max(lo)
}

/// Baseline origin of the first line of a text field
///
/// `padding` insets the text from the box's left and top edges.
pub fn text_origin(position: Position, font_size: f32, page_height: f32, padding: f32) -> Point {
    Point {
        x: position.left + padding,
        y: page_height - position.top - font_size - padding,
    }
}

/// Largest size with the intrinsic aspect ratio that fits inside `bounds`
///
/// Zero or negative intrinsic dimensions give a zero size.
pub fn contain(intrinsic: Size, bounds: Size) -> Size {
    if intrinsic.width <= 0.0 || intrinsic.height <= 0.0 {
        return Size::default();
    }

    let scale = (bounds.width / intrinsic.width)
        .min(bounds.height / intrinsic.height)
        .max(0.0);

    Size {
        width: (intrinsic.width * scale).min(bounds.width.max(0.0)),
        height: (intrinsic.height * scale).min(bounds.height.max(0.0)),
    }
}

/// Where an image field lands on the page
///
/// The image is scaled to fit its box and anchored at the box's top-left
/// corner, so the bottom edge sits `scaled height` below the box top.
pub fn image_placement(position: Position, bounds: Size, intrinsic: Size, page_height: f32) -> Rect {
    let drawn = contain(intrinsic, bounds);
    Rect {
        x: position.left,
        y: page_height - position.top - drawn.height,
        width: drawn.width,
        height: drawn.height,
    }
}
