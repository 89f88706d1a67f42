//! Platform abstraction for overlay hosts
//!
//! This module defines the capabilities a rendering host must provide:
//! measuring anchors, reporting the viewport, and mutating the overlay
//! element. The engine only ever talks to these traits, so it runs the same
//! against a browser binding, a native toolkit or the in-memory
//! [`headless`] backend.

use std::fmt;
use std::time::Duration;

use perch_types::{Point, Rect, Size};

use crate::utils::{parse_duration, parse_number};

pub mod headless;

/// Mutable set of class names on an element
pub trait ClassList {
    fn add(&mut self, class: &str);

    fn remove(&mut self, class: &str);

    fn has(&self, class: &str) -> bool;

    /// Flip a class, returning whether it is now present
    fn toggle(&mut self, class: &str) -> bool {
        if self.has(class) {
            self.remove(class);
            false
        } else {
            self.add(class);
            true
        }
    }
}

/// The element an overlay renders into
pub trait OverlayElement: ClassList {
    /// Whatever the host accepts as overlay body (markup, a node, plain text)
    type Content;

    /// Replace the rendered body
    fn set_content(&mut self, content: Self::Content);

    /// Insert the element into the render tree
    fn mount(&mut self);

    /// Remove the element from the render tree
    fn unmount(&mut self);

    fn is_mounted(&self) -> bool;

    /// Keep the element laid out but invisible so it can be measured
    fn set_measuring(&mut self, measuring: bool);

    /// Rendered size. Only meaningful while mounted.
    fn offset_size(&self) -> Size;

    /// Raw computed value of a style property, e.g. `"10px"`
    fn computed_style(&self, property: &str) -> Option<String>;

    /// Write the element's absolute position in whole pixels
    fn set_position(&mut self, top: i32, left: i32);

    /// Whether the element receives pointer events or lets them pass through
    fn set_pointer_events(&mut self, enabled: bool);

    /// Force pending style changes to be laid out.
    /// Default is no-op for hosts without deferred layout.
    fn flush_layout(&mut self) {}

    /// Duration of the element's configured transition
    fn transition_duration(&self) -> Duration {
        self.computed_style("transition-duration")
            .or_else(|| self.computed_style("-webkit-transition-duration"))
            .map(|value| parse_duration(&value))
            .unwrap_or(Duration::ZERO)
    }

    /// Gap implied by the element's own `top` offset style
    fn style_offset(&self) -> f64 {
        self.computed_style("top")
            .map(|value| parse_number(&value))
            .unwrap_or(0.0)
    }
}

/// Trait that all overlay hosts must implement
pub trait Host: 'static {
    type Element: OverlayElement + 'static;

    /// Reference to something an overlay can be attached to
    type Anchor: Clone + fmt::Debug + 'static;

    /// Create a fresh, unmounted overlay element
    fn create_element(&self) -> Self::Element;

    /// Document-relative box of an anchor.
    /// Returns None when the anchor is not part of the document.
    fn measure(&self, anchor: &Self::Anchor) -> Option<Rect>;

    /// Document-relative box of the visible viewport
    fn viewport(&self) -> Rect;
}

/// What an overlay is positioned against, resolved once per reposition
#[derive(Debug, Clone, PartialEq)]
pub enum AnchorTarget<A> {
    Element(A),
    Point(Point),
    None,
}

impl<A> AnchorTarget<A> {
    pub fn is_none(&self) -> bool {
        matches!(self, AnchorTarget::None)
    }
}
