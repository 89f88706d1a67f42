//! Reposition scheduler
//!
//! Keeps the set of overlays that are visible and attached to an anchor,
//! i.e. the ones whose position depends on the viewport. Scroll and resize
//! events only request a pass; any number of requests arriving within one
//! frame interval collapse into a single pass over every registered overlay.
//!
//! Passes run on the current `tokio::task::LocalSet`, so the scheduler and
//! every tooltip created from it must be driven from inside one.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::platform::Host;
use crate::tooltip::TooltipState;

/// Fallback frame interval for hosts without a frame callback
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(17);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Delay between the first trigger and the pass it schedules
    pub frame_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }
}

/// Viewport changes that can move anchored overlays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportEvent {
    Scroll,
    Resize,
}

/// Stable identity of a tooltip within its scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TooltipId(u64);

impl fmt::Display for TooltipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Entry<H: Host> {
    id: TooltipId,
    state: Weak<RefCell<TooltipState<H>>>,
}

struct Shared<H: Host> {
    host: Rc<H>,
    config: SchedulerConfig,
    /// Registration order is pass order
    registry: RefCell<Vec<Entry<H>>>,
    pending: RefCell<Option<JoinHandle<()>>>,
    next_id: Cell<u64>,
    passes: Cell<u64>,
}

/// Process-wide reposition service. Clones share the same registry.
pub struct Scheduler<H: Host> {
    shared: Rc<Shared<H>>,
}

impl<H: Host> Clone for Scheduler<H> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<H: Host> fmt::Debug for Scheduler<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("registered", &self.registered())
            .field("pending", &self.is_pending())
            .field("passes", &self.passes())
            .finish()
    }
}

impl<H: Host> Scheduler<H> {
    pub fn new(host: H) -> Self {
        Self::with_config(host, SchedulerConfig::default())
    }

    pub fn with_config(host: H, config: SchedulerConfig) -> Self {
        Self {
            shared: Rc::new(Shared {
                host: Rc::new(host),
                config,
                registry: RefCell::new(Vec::new()),
                pending: RefCell::new(None),
                next_id: Cell::new(1),
                passes: Cell::new(0),
            }),
        }
    }

    /// The host every tooltip of this scheduler renders into
    pub fn host(&self) -> &H {
        &self.shared.host
    }

    pub(crate) fn host_rc(&self) -> Rc<H> {
        Rc::clone(&self.shared.host)
    }

    pub fn config(&self) -> SchedulerConfig {
        self.shared.config
    }

    pub(crate) fn next_id(&self) -> TooltipId {
        let id = self.shared.next_id.get();
        self.shared.next_id.set(id + 1);
        TooltipId(id)
    }

    /// Add an overlay to the registry. No-op if already present.
    pub(crate) fn register(&self, id: TooltipId, state: Weak<RefCell<TooltipState<H>>>) {
        let mut registry = self.shared.registry.borrow_mut();
        if registry.iter().any(|e| e.id == id) {
            return;
        }
        registry.push(Entry { id, state });
        tracing::debug!(tooltip = %id, registered = registry.len(), "overlay is viewport aware");
    }

    /// Remove an overlay from the registry. No-op if absent.
    pub(crate) fn unregister(&self, id: TooltipId) {
        let mut registry = self.shared.registry.borrow_mut();
        let before = registry.len();
        registry.retain(|e| e.id != id);
        if registry.len() != before {
            tracing::debug!(tooltip = %id, registered = registry.len(), "overlay no longer viewport aware");
        }
    }

    pub fn contains(&self, id: TooltipId) -> bool {
        self.shared.registry.borrow().iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.shared.registry.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.registry.borrow().is_empty()
    }

    /// Registered overlays in pass order
    pub fn registered(&self) -> Vec<TooltipId> {
        self.shared.registry.borrow().iter().map(|e| e.id).collect()
    }

    /// Whether a pass is scheduled and has not run yet
    pub fn is_pending(&self) -> bool {
        self.shared.pending.borrow().is_some()
    }

    /// Number of completed passes
    pub fn passes(&self) -> u64 {
        self.shared.passes.get()
    }

    /// Entry point for the host's scroll and resize listeners
    pub fn on_viewport_event(&self, event: ViewportEvent) {
        tracing::trace!(?event, "viewport changed");
        self.request_reposition();
    }

    /// Schedule a pass for the next frame unless one is already pending.
    ///
    /// # Panics
    ///
    /// Panics when called outside a `tokio::task::LocalSet`.
    pub fn request_reposition(&self) {
        if self.is_pending() || self.is_empty() {
            return;
        }

        let shared = Rc::downgrade(&self.shared);
        let interval = self.shared.config.frame_interval;
        let handle = tokio::task::spawn_local(async move {
            tokio::time::sleep(interval).await;
            if let Some(shared) = shared.upgrade() {
                shared.pending.borrow_mut().take();
                Scheduler { shared }.run_pass();
            }
        });
        *self.shared.pending.borrow_mut() = Some(handle);
    }

    /// Run a pending pass now instead of waiting for the frame interval.
    /// Returns the number of overlays repositioned, 0 if nothing was pending.
    pub fn flush(&self) -> usize {
        let pending = self.shared.pending.borrow_mut().take();
        match pending {
            Some(handle) => {
                handle.abort();
                self.run_pass()
            }
            None => 0,
        }
    }

    /// Reposition every registered overlay once.
    ///
    /// Works from a snapshot of the registry; overlays unregistered or
    /// destroyed while the pass is running are skipped.
    pub fn run_pass(&self) -> usize {
        let snapshot: Vec<(TooltipId, Weak<RefCell<TooltipState<H>>>)> = self
            .shared
            .registry
            .borrow()
            .iter()
            .map(|e| (e.id, Weak::clone(&e.state)))
            .collect();

        let mut repositioned = 0;
        for (id, state) in snapshot {
            if !self.contains(id) {
                continue;
            }
            let Some(cell) = state.upgrade() else {
                continue;
            };
            let Ok(mut state) = cell.try_borrow_mut() else {
                continue;
            };
            if state.is_destroyed() {
                continue;
            }
            state.reposition();
            repositioned += 1;
        }

        self.shared.passes.set(self.shared.passes.get() + 1);
        tracing::trace!(repositioned, "reposition pass complete");
        repositioned
    }
}
