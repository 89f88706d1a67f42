//! Overlay instances
//!
//! A [`Tooltip`] owns one overlay element and decides where it goes. It
//! caches the element's size and spacing, tracks what it is anchored to,
//! and re-runs placement resolution whenever the geometry may have changed:
//! new content, a new placement, a new anchor, showing, or a scheduler pass.
//!
//! # Lifecycle
//!
//! ```text
//!            show()                 hide()
//!  Hidden ───────────▶ Visible ───────────▶ Hiding
//!    ▲                   ▲                    │
//!    │                   └──── show() ────────┤
//!    └──────── transition duration elapsed ───┘
//! ```
//!
//! `Hiding` keeps the element mounted while its transition-out runs. The
//! removal is a local task whose handle is aborted by an intervening
//! `show()` or by dropping the tooltip.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use perch_types::{OverlayOptions, Placement, Point, PositionResult, Rect, Size};
use tokio::task::JoinHandle;

use crate::error::PerchError;
use crate::placement;
use crate::platform::{AnchorTarget, ClassList, Host, OverlayElement};
use crate::scheduler::{Scheduler, TooltipId};

/// Content type accepted by a host's overlay element
pub type ContentOf<H> = <<H as Host>::Element as OverlayElement>::Content;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Not in the render tree
    Hidden,
    Visible,
    /// Transitioning out; still mounted until the transition ends
    Hiding,
}

#[derive(Debug, Clone, Copy)]
enum ClassSlot {
    Type,
    Effect,
}

pub(crate) struct TooltipState<H: Host> {
    id: TooltipId,
    host: Rc<H>,
    element: H::Element,
    options: OverlayOptions,
    visibility: Visibility,
    size: Size,
    measured: bool,
    spacing: Option<f64>,
    placement: Option<Placement>,
    last_position: Option<PositionResult>,
    anchor: Option<H::Anchor>,
    point: Option<Point>,
    hide_task: Option<JoinHandle<()>>,
    destroyed: bool,
}

impl<H: Host> TooltipState<H> {
    pub(crate) fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Anchor element first, then the last explicit point
    fn target(&self) -> AnchorTarget<H::Anchor> {
        match (&self.anchor, self.point) {
            (Some(anchor), _) => AnchorTarget::Element(anchor.clone()),
            (None, Some(point)) => AnchorTarget::Point(point),
            (None, None) => AnchorTarget::None,
        }
    }

    pub(crate) fn reposition(&mut self) -> bool {
        let target = self.target();
        self.position_against(target)
    }

    fn position_against(&mut self, target: AnchorTarget<H::Anchor>) -> bool {
        let rect = match target {
            AnchorTarget::Element(anchor) => match self.host.measure(&anchor) {
                Some(rect) => rect,
                None => {
                    tracing::debug!(tooltip = %self.id, ?anchor, "anchor not in document, skipping reposition");
                    return false;
                }
            },
            AnchorTarget::Point(point) => Rect::point(point.x, point.y),
            AnchorTarget::None => return false,
        };

        let viewport = self.host.viewport();
        let result = placement::resolve(
            &rect,
            self.size,
            self.spacing.unwrap_or(0.0),
            self.options.place,
            &viewport,
            self.options.auto,
        );

        if self.placement != Some(result.placement) {
            if let Some(previous) = self.placement {
                self.element.remove(previous.as_str());
            }
            self.element.add(result.placement.as_str());
            self.placement = Some(result.placement);
        }

        self.element.set_position(result.top, result.left);
        self.last_position = Some(result);
        true
    }

    /// Refresh the cached size. A hidden element is mounted invisibly for
    /// the measurement and taken out again afterwards.
    fn measure(&mut self) {
        let hidden = self.visibility == Visibility::Hidden;
        if hidden {
            self.element.set_measuring(true);
            self.element.mount();
        }

        self.size = self.element.offset_size();
        self.measured = true;
        if self.spacing.is_none() {
            let spacing = match self.options.spacing {
                Some(spacing) => spacing,
                None => self.element.style_offset(),
            };
            self.spacing = Some(spacing);
        }

        if hidden {
            self.element.unmount();
            self.element.set_measuring(false);
        }
        tracing::trace!(tooltip = %self.id, width = self.size.width, height = self.size.height, "measured");
    }

    /// Returns whether the overlay is anchored and should be registered
    fn show(&mut self) -> bool {
        if let Some(task) = self.hide_task.take() {
            task.abort();
        }
        if !self.measured {
            self.measure();
        }

        let anchored = self.anchor.is_some();
        if anchored {
            self.reposition();
        }

        if self.visibility == Visibility::Hidden {
            self.element.mount();
        }
        self.visibility = Visibility::Visible;

        if let Some(in_class) = &self.options.in_class {
            if self.options.effect_class.is_some() {
                self.element.flush_layout();
            }
            self.element.add(in_class);
        }

        tracing::debug!(tooltip = %self.id, anchored, "overlay shown");
        anchored
    }

    fn hide(&mut self, handle: Weak<RefCell<Self>>) {
        let mut duration = Duration::ZERO;
        if let Some(in_class) = &self.options.in_class {
            self.element.remove(in_class);
            if self.options.effect_class.is_some() {
                duration = self.element.transition_duration();
            }
        }

        self.visibility = Visibility::Hiding;
        if let Some(task) = self.hide_task.take() {
            task.abort();
        }
        self.hide_task = Some(tokio::task::spawn_local(async move {
            tokio::time::sleep(duration).await;
            if let Some(state) = handle.upgrade() {
                state.borrow_mut().finish_hide();
            }
        }));

        tracing::debug!(tooltip = %self.id, ?duration, "overlay hiding");
    }

    fn finish_hide(&mut self) {
        self.hide_task = None;
        self.element.unmount();
        self.visibility = Visibility::Hidden;
        tracing::debug!(tooltip = %self.id, "overlay removed");
    }

    fn change_class_slot(&mut self, slot: ClassSlot, class: Option<&str>) {
        let current = match slot {
            ClassSlot::Type => &mut self.options.type_class,
            ClassSlot::Effect => &mut self.options.effect_class,
        };
        if let Some(previous) = current.take() {
            self.element.remove(&previous);
        }
        if let Some(class) = class.filter(|c| !c.is_empty()) {
            self.element.add(class);
            *current = Some(class.to_string());
        }
    }

    fn destroy(&mut self) {
        if let Some(task) = self.hide_task.take() {
            task.abort();
        }
        if self.visibility != Visibility::Hidden {
            self.element.unmount();
        }
        self.visibility = Visibility::Hidden;
        self.anchor = None;
        self.point = None;
        self.destroyed = true;
        tracing::debug!(tooltip = %self.id, "overlay destroyed");
    }
}

/// A floating overlay positioned next to an anchor or a point.
///
/// Dropping a tooltip destroys it: its pending hide is cancelled, it leaves
/// the scheduler and its element is unmounted.
pub struct Tooltip<H: Host> {
    id: TooltipId,
    scheduler: Scheduler<H>,
    state: Rc<RefCell<TooltipState<H>>>,
}

impl<H: Host> fmt::Debug for Tooltip<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Tooltip")
            .field("id", &self.id)
            .field("visibility", &state.visibility)
            .field("placement", &state.placement)
            .field("anchor", &state.anchor)
            .finish()
    }
}

impl<H: Host> Tooltip<H> {
    /// Create a hidden tooltip with an empty body
    pub fn new(scheduler: &Scheduler<H>, options: OverlayOptions) -> Self {
        let host = scheduler.host_rc();
        let mut element = host.create_element();
        if !options.base_class.is_empty() {
            element.add(&options.base_class);
        }
        element.set_pointer_events(options.interactive);
        for class in [&options.type_class, &options.effect_class]
            .into_iter()
            .flatten()
            .filter(|c| !c.is_empty())
        {
            element.add(class);
        }

        let id = scheduler.next_id();
        let state = TooltipState {
            id,
            host,
            element,
            options,
            visibility: Visibility::Hidden,
            size: Size::default(),
            measured: false,
            spacing: None,
            placement: None,
            last_position: None,
            anchor: None,
            point: None,
            hide_task: None,
            destroyed: false,
        };

        tracing::debug!(tooltip = %id, "overlay created");
        Self {
            id,
            scheduler: scheduler.clone(),
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Create a hidden tooltip and measure it with the given body
    pub fn with_content(
        scheduler: &Scheduler<H>,
        content: ContentOf<H>,
        options: OverlayOptions,
    ) -> Self {
        let mut tooltip = Self::new(scheduler, options);
        tooltip.content(content);
        tooltip
    }

    fn with_state(&mut self, f: impl FnOnce(&mut TooltipState<H>)) -> &mut Self {
        f(&mut self.state.borrow_mut());
        self
    }

    fn register(&self) {
        self.scheduler.register(self.id, Rc::downgrade(&self.state));
    }

    /// Replace the body, then re-measure and reposition
    pub fn content(&mut self, content: ContentOf<H>) -> &mut Self {
        self.state.borrow_mut().element.set_content(content);
        self.update_size()
    }

    /// Swap the type class. `None` or an empty name clears the slot.
    pub fn set_type(&mut self, name: Option<&str>) -> &mut Self {
        self.with_state(|state| state.change_class_slot(ClassSlot::Type, name))
    }

    /// Swap the effect class. `None` or an empty name clears the slot.
    pub fn effect(&mut self, name: Option<&str>) -> &mut Self {
        self.with_state(|state| state.change_class_slot(ClassSlot::Effect, name))
    }

    /// Choose the desired placement, repositioning if on screen
    pub fn place(&mut self, placement: Placement) -> &mut Self {
        self.with_state(|state| {
            state.options.place = placement;
            if state.visibility != Visibility::Hidden {
                state.reposition();
            }
        })
    }

    /// Like [`Tooltip::place`], for textual identifiers such as `"top-left"`
    pub fn place_str(&mut self, placement: &str) -> Result<&mut Self, PerchError> {
        let placement: Placement = placement.parse()?;
        Ok(self.place(placement))
    }

    /// Anchor the tooltip to a host element
    pub fn attach(&mut self, anchor: H::Anchor) -> &mut Self {
        let visible = {
            let mut state = self.state.borrow_mut();
            tracing::debug!(tooltip = %self.id, ?anchor, "attached");
            state.anchor = Some(anchor);
            if state.visibility != Visibility::Hidden {
                state.reposition();
            }
            state.visibility == Visibility::Visible
        };
        if visible {
            self.register();
        }
        self
    }

    /// Hide, then forget the anchor
    pub fn detach(&mut self) -> &mut Self {
        self.hide();
        self.scheduler.unregister(self.id);
        self.with_state(|state| {
            if state.anchor.take().is_some() {
                tracing::debug!(tooltip = %state.id, "detached");
            }
        })
    }

    /// Show the tooltip. No-op while already visible.
    ///
    /// # Panics
    ///
    /// Cancelling a pending hide requires a `tokio::task::LocalSet`.
    pub fn show(&mut self) -> &mut Self {
        let anchored = {
            let mut state = self.state.borrow_mut();
            if state.visibility == Visibility::Visible {
                None
            } else {
                Some(state.show())
            }
        };
        if anchored == Some(true) {
            self.register();
        }
        self
    }

    /// Start hiding the tooltip. No-op unless visible.
    ///
    /// # Panics
    ///
    /// The deferred removal is spawned with `tokio::task::spawn_local` and
    /// panics outside a `LocalSet`.
    pub fn hide(&mut self) -> &mut Self {
        let hiding = {
            let mut state = self.state.borrow_mut();
            if state.visibility == Visibility::Visible {
                state.hide(Rc::downgrade(&self.state));
                true
            } else {
                false
            }
        };
        if hiding {
            self.scheduler.unregister(self.id);
        }
        self
    }

    /// Hide when visible, show otherwise
    pub fn toggle(&mut self) -> &mut Self {
        if self.is_visible() {
            self.hide()
        } else {
            self.show()
        }
    }

    /// Re-measure the element; reposition if on screen
    pub fn update_size(&mut self) -> &mut Self {
        self.with_state(|state| {
            state.measure();
            if state.visibility != Visibility::Hidden {
                state.reposition();
            }
        })
    }

    /// Reposition against the anchor, or replay the last explicit point
    pub fn position(&mut self) -> &mut Self {
        self.with_state(|state| {
            state.reposition();
        })
    }

    /// Position against a fixed point for this call. The anchor, if any,
    /// stays attached and wins on the next reposition.
    pub fn position_at(&mut self, x: f64, y: f64) -> &mut Self {
        self.with_state(|state| {
            let point = Point::new(x, y);
            state.point = Some(point);
            state.position_against(AnchorTarget::Point(point));
        })
    }

    /// Release the tooltip. Equivalent to dropping it.
    pub fn destroy(self) {
        drop(self);
    }

    pub fn id(&self) -> TooltipId {
        self.id
    }

    pub fn visibility(&self) -> Visibility {
        self.state.borrow().visibility
    }

    pub fn is_hidden(&self) -> bool {
        self.visibility() == Visibility::Hidden
    }

    pub fn is_visible(&self) -> bool {
        self.visibility() == Visibility::Visible
    }

    pub fn is_hiding(&self) -> bool {
        self.visibility() == Visibility::Hiding
    }

    /// Last resolved placement, None before the first positioning
    pub fn placement(&self) -> Option<Placement> {
        self.state.borrow().placement
    }

    pub fn last_position(&self) -> Option<PositionResult> {
        self.state.borrow().last_position
    }

    pub fn size(&self) -> Size {
        self.state.borrow().size
    }

    pub fn spacing(&self) -> Option<f64> {
        self.state.borrow().spacing
    }

    pub fn options(&self) -> OverlayOptions {
        self.state.borrow().options.clone()
    }

    pub fn anchor(&self) -> Option<H::Anchor> {
        self.state.borrow().anchor.clone()
    }

    pub fn with_element<R>(&self, f: impl FnOnce(&H::Element) -> R) -> R {
        f(&self.state.borrow().element)
    }

    pub fn element(&self) -> H::Element
    where
        H::Element: Clone,
    {
        self.state.borrow().element.clone()
    }
}

impl<H: Host> Drop for Tooltip<H> {
    fn drop(&mut self) {
        self.scheduler.unregister(self.id);
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.destroy();
        }
    }
}
