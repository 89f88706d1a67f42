//! Tooltip placement and repositioning engine
//!
//! - [`placement`] resolves where an overlay goes relative to a target box
//! - [`tooltip`] owns an overlay element and its visibility lifecycle
//! - [`scheduler`] coalesces viewport changes into reposition passes
//! - [`platform`] is the seam to whatever actually renders the overlay

pub mod error;
pub mod placement;
pub mod platform;
pub mod scheduler;
pub mod tooltip;
pub mod utils;

#[cfg(test)]
mod tooltip_tests;

pub use perch_types;

// Re-exports for convenience
pub use error::PerchError;
pub use placement::{compute_coordinates, resolve, resolve_placement};
pub use platform::headless::{HeadlessElement, HeadlessHost};
pub use platform::{AnchorTarget, ClassList, Host, OverlayElement};
pub use scheduler::{DEFAULT_FRAME_INTERVAL, Scheduler, SchedulerConfig, TooltipId, ViewportEvent};
pub use tooltip::{ContentOf, Tooltip, Visibility};
