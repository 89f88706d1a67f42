//! Shared value types for perch
//!
//! This crate contains the serializable geometry, placement and option types
//! shared between the positioning engine (perch-core) and the command line
//! frontend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Geometry
// ─────────────────────────────────────────────────────────────────────────────

/// An axis-aligned box in a single coordinate space.
///
/// Boxes produced by a host are document-relative unless stated otherwise.
/// A `Rect` is a value: derived boxes are new values, never in-place edits.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Build a box from its origin and dimensions
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            bottom: top + height,
            right: left + width,
            width,
            height,
        }
    }

    /// Build a box from its four edges
    pub fn from_edges(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Zero-size box at a point. Coordinates are truncated to whole pixels.
    pub fn point(x: f64, y: f64) -> Self {
        let (x, y) = (x.trunc(), y.trunc());
        Self {
            top: y,
            left: x,
            bottom: y,
            right: x,
            width: 0.0,
            height: 0.0,
        }
    }

    /// Same box shifted by the given offsets
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            top: self.top + dy,
            left: self.left + dx,
            bottom: self.bottom + dy,
            right: self.right + dx,
            ..*self
        }
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.top + self.height / 2.0
    }

    /// Check the edge/dimension invariant within a sub-pixel tolerance
    pub fn is_consistent(&self) -> bool {
        const EPSILON: f64 = 0.5;
        (self.right - self.left - self.width).abs() < EPSILON
            && (self.bottom - self.top - self.height).abs() < EPSILON
    }
}

/// Width and height of an overlay
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A fixed coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Placement
// ─────────────────────────────────────────────────────────────────────────────

/// The side of the anchor an overlay sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    /// Top and bottom stack the overlay above/below the anchor
    pub fn is_vertical(&self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Alignment suffix along the chosen side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Align {
    /// No suffix: overlay centered on the anchor's cross axis
    Center,
    Left,
    Right,
    Top,
    Bottom,
}

/// One of the twelve discrete overlay placements.
///
/// The string form (`"top-left"`, `"right"`, ...) doubles as the CSS class
/// applied to the overlay element while that placement is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    #[default]
    Top,
    TopLeft,
    TopRight,
    Bottom,
    BottomLeft,
    BottomRight,
    Left,
    LeftTop,
    LeftBottom,
    Right,
    RightTop,
    RightBottom,
}

impl Placement {
    pub const ALL: [Placement; 12] = [
        Placement::Top,
        Placement::TopLeft,
        Placement::TopRight,
        Placement::Bottom,
        Placement::BottomLeft,
        Placement::BottomRight,
        Placement::Left,
        Placement::LeftTop,
        Placement::LeftBottom,
        Placement::Right,
        Placement::RightTop,
        Placement::RightBottom,
    ];

    pub fn side(&self) -> Side {
        match self {
            Placement::Top | Placement::TopLeft | Placement::TopRight => Side::Top,
            Placement::Bottom | Placement::BottomLeft | Placement::BottomRight => Side::Bottom,
            Placement::Left | Placement::LeftTop | Placement::LeftBottom => Side::Left,
            Placement::Right | Placement::RightTop | Placement::RightBottom => Side::Right,
        }
    }

    pub fn align(&self) -> Align {
        match self {
            Placement::Top | Placement::Bottom | Placement::Left | Placement::Right => {
                Align::Center
            }
            Placement::TopLeft | Placement::BottomLeft => Align::Left,
            Placement::TopRight | Placement::BottomRight => Align::Right,
            Placement::LeftTop | Placement::RightTop => Align::Top,
            Placement::LeftBottom | Placement::RightBottom => Align::Bottom,
        }
    }

    /// Recombine a side and an alignment.
    /// Returns None for alignments that don't run along the side.
    pub fn from_parts(side: Side, align: Align) -> Option<Placement> {
        let placement = match (side, align) {
            (Side::Top, Align::Center) => Placement::Top,
            (Side::Top, Align::Left) => Placement::TopLeft,
            (Side::Top, Align::Right) => Placement::TopRight,
            (Side::Bottom, Align::Center) => Placement::Bottom,
            (Side::Bottom, Align::Left) => Placement::BottomLeft,
            (Side::Bottom, Align::Right) => Placement::BottomRight,
            (Side::Left, Align::Center) => Placement::Left,
            (Side::Left, Align::Top) => Placement::LeftTop,
            (Side::Left, Align::Bottom) => Placement::LeftBottom,
            (Side::Right, Align::Center) => Placement::Right,
            (Side::Right, Align::Top) => Placement::RightTop,
            (Side::Right, Align::Bottom) => Placement::RightBottom,
            _ => return None,
        };
        Some(placement)
    }

    /// Identifier, also used as the element's placement class
    pub fn as_str(&self) -> &'static str {
        match self {
            Placement::Top => "top",
            Placement::TopLeft => "top-left",
            Placement::TopRight => "top-right",
            Placement::Bottom => "bottom",
            Placement::BottomLeft => "bottom-left",
            Placement::BottomRight => "bottom-right",
            Placement::Left => "left",
            Placement::LeftTop => "left-top",
            Placement::LeftBottom => "left-bottom",
            Placement::Right => "right",
            Placement::RightTop => "right-top",
            Placement::RightBottom => "right-bottom",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An identifier outside the twelve known placements
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown placement '{value}'")]
pub struct ParsePlacementError {
    pub value: String,
}

impl FromStr for Placement {
    type Err = ParsePlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Placement::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ParsePlacementError {
                value: s.to_string(),
            })
    }
}

/// Outcome of one resolution: the placement actually used and its
/// rounded pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionResult {
    pub placement: Placement,
    pub top: i32,
    pub left: i32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────────────────────────────────────

/// Per-overlay configuration.
///
/// Missing fields in serialized input fall back to [`OverlayOptions::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayOptions {
    /// Class always present on the overlay element
    pub base_class: String,
    /// Mutually exclusive "type" class slot
    pub type_class: Option<String>,
    /// Mutually exclusive "effect" class slot; enables transition timing on hide
    pub effect_class: Option<String>,
    /// Class toggled to run the transition in
    pub in_class: Option<String>,
    /// Desired placement
    pub place: Placement,
    /// Gap between anchor and overlay. Derived from the element style when unset.
    pub spacing: Option<f64>,
    /// Whether the overlay receives pointer events
    pub interactive: bool,
    /// Flip placement to stay inside the viewport
    pub auto: bool,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            base_class: "tooltip".to_string(),
            type_class: None,
            effect_class: None,
            in_class: Some("in".to_string()),
            place: Placement::Top,
            spacing: None,
            interactive: false,
            auto: false,
        }
    }
}
