//! Placement resolution
//!
//! Given the anchor box, the overlay size, the gap between them and the
//! viewport, pick which of the twelve placements to use and where the
//! overlay's top-left corner lands.
//!
//! Everything here is pure. Callers measure, this module decides.

use perch_types::{Align, Placement, PositionResult, Rect, Side, Size};

/// Pick the placement to actually use.
///
/// Without `auto` the desired placement passes through untouched, even if it
/// overflows the viewport. With `auto` the side and the alignment are each
/// checked once against a fixed boundary and flipped when they don't fit.
pub fn resolve_placement(
    target: &Rect,
    size: Size,
    spacing: f64,
    desired: Placement,
    viewport: &Rect,
    auto: bool,
) -> Placement {
    if !auto {
        return desired;
    }

    let side = desired.side();
    let (side, align) = if side.is_vertical() {
        (
            flip_vertical_side(side, target, size, spacing, viewport),
            flip_horizontal_align(desired.align(), target, size, viewport),
        )
    } else {
        (
            flip_horizontal_side(side, target, size, spacing, viewport),
            flip_vertical_align(desired.align(), target, size, viewport),
        )
    };

    let resolved = Placement::from_parts(side, align).unwrap_or(desired);
    if resolved != desired {
        tracing::trace!(%desired, %resolved, "placement flipped to fit viewport");
    }
    resolved
}

fn flip_vertical_side(side: Side, target: &Rect, size: Size, spacing: f64, viewport: &Rect) -> Side {
    match side {
        Side::Top if target.top - size.height - spacing <= viewport.top => Side::Bottom,
        Side::Bottom if target.bottom + size.height + spacing >= viewport.bottom => Side::Top,
        other => other,
    }
}

fn flip_horizontal_side(
    side: Side,
    target: &Rect,
    size: Size,
    spacing: f64,
    viewport: &Rect,
) -> Side {
    match side {
        Side::Left if target.left - size.width - spacing <= viewport.left => Side::Right,
        Side::Right if target.right + size.width + spacing >= viewport.right => Side::Left,
        other => other,
    }
}

/// Alignment along a top/bottom side
fn flip_horizontal_align(align: Align, target: &Rect, size: Size, viewport: &Rect) -> Align {
    match align {
        Align::Left if target.right - size.width <= viewport.left => Align::Right,
        Align::Right if target.left + size.width >= viewport.right => Align::Left,
        Align::Center if target.center_x() + size.width / 2.0 >= viewport.right => Align::Left,
        Align::Center if target.center_x() - size.width / 2.0 <= viewport.left => Align::Right,
        other => other,
    }
}

/// Alignment along a left/right side
fn flip_vertical_align(align: Align, target: &Rect, size: Size, viewport: &Rect) -> Align {
    match align {
        Align::Top if target.bottom - size.height <= viewport.top => Align::Bottom,
        Align::Bottom if target.top + size.height >= viewport.bottom => Align::Top,
        Align::Center if target.center_y() + size.height / 2.0 >= viewport.bottom => Align::Top,
        Align::Center if target.center_y() - size.height / 2.0 <= viewport.top => Align::Bottom,
        other => other,
    }
}

/// Unrounded `(top, left)` of the overlay for a given placement
pub fn compute_coordinates(
    target: &Rect,
    size: Size,
    spacing: f64,
    placement: Placement,
) -> (f64, f64) {
    let side = placement.side();
    let align = placement.align();

    match side {
        Side::Top | Side::Bottom => {
            let top = if side == Side::Top {
                target.top - size.height - spacing
            } else {
                target.bottom + spacing
            };
            let left = match align {
                Align::Left => target.right - size.width,
                Align::Right => target.left,
                _ => target.center_x() - size.width / 2.0,
            };
            (top, left)
        }
        Side::Left | Side::Right => {
            let left = if side == Side::Left {
                target.left - size.width - spacing
            } else {
                target.right + spacing
            };
            let top = match align {
                Align::Top => target.bottom - size.height,
                Align::Bottom => target.top,
                _ => target.center_y() - size.height / 2.0,
            };
            (top, left)
        }
    }
}

/// Resolve the placement and its pixel coordinates in one step
pub fn resolve(
    target: &Rect,
    size: Size,
    spacing: f64,
    desired: Placement,
    viewport: &Rect,
    auto: bool,
) -> PositionResult {
    let placement = resolve_placement(target, size, spacing, desired, viewport, auto);
    let (top, left) = compute_coordinates(target, size, spacing, placement);
    PositionResult {
        placement,
        top: round_half_up(top),
        left: round_half_up(left),
    }
}

/// Nearest whole pixel, ties towards positive infinity (`-0.5` -> `0`)
fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}
