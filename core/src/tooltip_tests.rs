//! Tests for Tooltip lifecycle and scheduler interaction
//!
//! Everything runs against the headless host. Async tests use a paused
//! clock inside a LocalSet so transition timers are deterministic.

use std::time::Duration;

use perch_types::{OverlayOptions, Placement, Rect, Size};
use tokio::task::LocalSet;

use crate::error::PerchError;
use crate::platform::headless::{HeadlessElement, HeadlessHost};
use crate::platform::{ClassList, OverlayElement};
use crate::scheduler::{Scheduler, ViewportEvent};
use crate::tooltip::{Tooltip, Visibility};

fn scheduler() -> Scheduler<HeadlessHost> {
    let host = HeadlessHost::new(300.0, 200.0);
    host.set_class_style("tooltip", "top", "10px");
    host.set_class_style("fade", "transition-duration", "300ms");
    Scheduler::new(host)
}

/// Tooltip with a pinned element size, already measured
fn sized(
    scheduler: &Scheduler<HeadlessHost>,
    options: OverlayOptions,
    width: f64,
    height: f64,
) -> Tooltip<HeadlessHost> {
    let mut tip = Tooltip::new(scheduler, options);
    tip.with_element(|e| e.set_fixed_size(Size::new(width, height)));
    tip.update_size();
    tip
}

fn placement_classes(el: &HeadlessElement) -> Vec<String> {
    el.classes()
        .into_iter()
        .filter(|c| c.parse::<Placement>().is_ok())
        .collect()
}

fn fading() -> OverlayOptions {
    OverlayOptions {
        effect_class: Some("fade".to_string()),
        ..Default::default()
    }
}

#[test]
fn test_fixed_point_positioning() {
    let sched = scheduler();
    let options = OverlayOptions {
        place: Placement::Bottom,
        spacing: Some(5.0),
        ..Default::default()
    };
    let mut tip = sized(&sched, options, 40.0, 20.0);

    tip.position_at(100.0, 100.0);

    let el = tip.element();
    assert_eq!(el.position(), Some((105, 80)));
    assert_eq!(tip.placement(), Some(Placement::Bottom));
    assert!(el.has("bottom"));
}

#[test]
fn test_auto_flip_against_anchor() {
    let sched = scheduler();
    sched
        .host()
        .add_anchor("button", Rect::from_edges(10.0, 50.0, 30.0, 150.0));
    let options = OverlayOptions {
        place: Placement::Top,
        auto: true,
        ..Default::default()
    };
    let mut tip = sized(&sched, options, 80.0, 40.0);
    // spacing comes from the stylesheet's `top: 10px`
    assert_eq!(tip.spacing(), Some(10.0));

    tip.attach("button".to_string()).show();

    assert_eq!(tip.placement(), Some(Placement::Bottom));
    assert_eq!(tip.element().position(), Some((40, 60)));
    assert!(sched.contains(tip.id()));
}

#[test]
fn test_without_auto_overflow_is_kept() {
    let sched = scheduler();
    sched
        .host()
        .add_anchor("button", Rect::from_edges(10.0, 50.0, 30.0, 150.0));
    let mut tip = sized(&sched, OverlayOptions::default(), 80.0, 40.0);

    tip.attach("button".to_string()).show();

    assert_eq!(tip.placement(), Some(Placement::Top));
    assert_eq!(tip.element().position(), Some((-40, 60)));
}

#[test]
fn test_single_placement_class() {
    let sched = scheduler();
    let mut tip = sized(&sched, OverlayOptions::default(), 20.0, 20.0);
    let el = tip.element();
    assert_eq!(tip.placement(), None);

    tip.position_at(50.0, 50.0);
    assert_eq!(placement_classes(&el), vec!["top".to_string()]);

    // hidden: placement changes are stored, applied on the next reposition
    tip.place(Placement::LeftBottom);
    assert_eq!(placement_classes(&el), vec!["top".to_string()]);

    tip.position();
    assert_eq!(placement_classes(&el), vec!["left-bottom".to_string()]);
    assert_eq!(tip.placement(), Some(Placement::LeftBottom));

    for placement in Placement::ALL {
        tip.place(placement).position();
        assert_eq!(placement_classes(&el), vec![placement.to_string()]);
    }
}

#[test]
fn test_place_str_rejects_unknown() {
    let sched = scheduler();
    let mut tip = Tooltip::new(&sched, OverlayOptions::default());

    let err = tip.place_str("middle").unwrap_err();
    assert!(matches!(err, PerchError::InvalidPlacement(_)));
    assert_eq!(tip.options().place, Placement::Top);

    tip.place_str("right-top").unwrap();
    assert_eq!(tip.options().place, Placement::RightTop);
}

#[test]
fn test_show_is_idempotent() {
    let sched = scheduler();
    sched
        .host()
        .add_anchor("a", Rect::new(100.0, 100.0, 40.0, 20.0));
    let mut tip = sized(&sched, OverlayOptions::default(), 30.0, 10.0);
    let el = tip.element();
    tip.attach("a".to_string());

    tip.show();
    let writes = el.position_writes();
    let mounts = el.mounts();
    tip.show();

    assert!(tip.is_visible());
    assert_eq!(sched.len(), 1);
    assert_eq!(el.position_writes(), writes);
    assert_eq!(el.mounts(), mounts);
    assert!(el.has("in"));
    assert!(el.is_mounted());
}

#[test]
fn test_element_setup_from_options() {
    let sched = scheduler();
    let options = OverlayOptions {
        type_class: Some("info".to_string()),
        effect_class: Some("fade".to_string()),
        interactive: true,
        ..Default::default()
    };
    let tip = Tooltip::new(&sched, options);
    let el = tip.element();

    assert_eq!(
        el.classes(),
        vec!["tooltip".to_string(), "info".to_string(), "fade".to_string()]
    );
    assert!(el.pointer_events());
    assert!(!el.is_mounted());
    assert!(tip.is_hidden());
}

#[test]
fn test_type_and_effect_slots() {
    let sched = scheduler();
    let mut tip = Tooltip::new(&sched, OverlayOptions::default());
    let el = tip.element();

    tip.set_type(Some("info"));
    assert!(el.has("info"));

    tip.set_type(Some("warning"));
    assert!(!el.has("info"));
    assert!(el.has("warning"));
    assert_eq!(tip.options().type_class.as_deref(), Some("warning"));

    tip.set_type(None);
    assert!(!el.has("warning"));
    assert_eq!(tip.options().type_class, None);

    tip.effect(Some("fade"));
    assert!(el.has("fade"));
    tip.effect(Some(""));
    assert!(!el.has("fade"));
    assert_eq!(tip.options().effect_class, None);
    assert!(el.has("tooltip"));
}

#[test]
fn test_content_measures_while_hidden() {
    let sched = scheduler();
    let tip = Tooltip::with_content(&sched, "hello".to_string(), OverlayOptions::default());
    let el = tip.element();

    assert_eq!(tip.size(), Size::new(48.0, 26.0));
    assert_eq!(tip.spacing(), Some(10.0));
    assert_eq!(el.content(), "hello");
    // measured through a temporary mount, then restored
    assert_eq!(el.mounts(), 1);
    assert!(!el.is_mounted());
    assert!(!el.is_measuring());
    assert!(tip.is_hidden());
}

#[test]
fn test_content_while_visible_repositions() {
    let sched = scheduler();
    sched
        .host()
        .add_anchor("a", Rect::new(100.0, 100.0, 100.0, 20.0));
    let mut tip = Tooltip::with_content(&sched, "hi".to_string(), OverlayOptions::default());
    tip.attach("a".to_string()).show();
    let el = tip.element();
    let before = el.position();

    tip.content("a considerably longer body".to_string());

    assert_eq!(tip.size().width, 26.0 * 8.0 + 8.0);
    assert_ne!(el.position(), before);
    assert!(el.is_mounted());
}

#[test]
fn test_explicit_point_does_not_clear_anchor() {
    let sched = scheduler();
    sched
        .host()
        .add_anchor("a", Rect::new(100.0, 100.0, 40.0, 20.0));
    let options = OverlayOptions {
        place: Placement::Bottom,
        spacing: Some(0.0),
        ..Default::default()
    };
    let mut tip = sized(&sched, options, 10.0, 10.0);
    let el = tip.element();
    tip.attach("a".to_string());

    tip.position_at(10.0, 10.0);
    assert_eq!(el.position(), Some((10, 5)));

    tip.position();
    assert_eq!(el.position(), Some((120, 115)));
    assert_eq!(tip.anchor().as_deref(), Some("a"));
}

#[test]
fn test_missing_anchor_is_skipped() {
    let sched = scheduler();
    let mut tip = sized(&sched, OverlayOptions::default(), 10.0, 10.0);
    let el = tip.element();

    tip.attach("ghost".to_string()).show();

    assert!(tip.is_visible());
    assert_eq!(el.position(), None);
    assert_eq!(tip.placement(), None);
    assert_eq!(el.position_writes(), 0);
}

#[test]
fn test_attach_while_visible_registers() {
    let sched = scheduler();
    sched
        .host()
        .add_anchor("a", Rect::new(100.0, 100.0, 40.0, 20.0));
    let mut tip = sized(&sched, OverlayOptions::default(), 10.0, 10.0);

    tip.show();
    assert!(sched.is_empty());

    tip.attach("a".to_string());
    assert!(sched.contains(tip.id()));
    assert!(tip.element().position().is_some());
}

#[test]
fn test_registry_holds_each_overlay_once() {
    let sched = scheduler();
    let host = sched.host();
    host.add_anchor("a", Rect::new(100.0, 100.0, 40.0, 20.0));
    host.add_anchor("b", Rect::new(120.0, 150.0, 40.0, 20.0));
    let mut first = sized(&sched, OverlayOptions::default(), 10.0, 10.0);
    let mut second = sized(&sched, OverlayOptions::default(), 10.0, 10.0);

    first.attach("a".to_string()).show();
    second.attach("b".to_string()).show();

    // re-attaching a visible overlay registers it again
    first.attach("b".to_string());
    first.attach("a".to_string());
    second.attach("b".to_string());

    assert_eq!(sched.len(), 2);
    assert_eq!(sched.registered(), vec![first.id(), second.id()]);
}

#[tokio::test(start_paused = true)]
async fn test_hide_is_idempotent() {
    LocalSet::new()
        .run_until(async {
            let sched = scheduler();
            sched
                .host()
                .add_anchor("a", Rect::new(100.0, 100.0, 40.0, 20.0));
            let mut tip = sized(&sched, OverlayOptions::default(), 10.0, 10.0);
            let el = tip.element();
            tip.attach("a".to_string()).show();
            let unmounts = el.unmounts();

            tip.hide().hide();
            assert_eq!(tip.visibility(), Visibility::Hiding);
            assert!(sched.is_empty());
            assert!(!el.has("in"));

            tokio::time::sleep(Duration::from_millis(1)).await;
            assert!(tip.is_hidden());
            assert!(!el.is_mounted());
            assert_eq!(el.unmounts(), unmounts + 1);

            tip.hide();
            assert!(tip.is_hidden());
            assert_eq!(el.unmounts(), unmounts + 1);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_hide_waits_for_transition() {
    LocalSet::new()
        .run_until(async {
            let sched = scheduler();
            let mut tip = sized(&sched, fading(), 10.0, 10.0);
            let el = tip.element();
            tip.show();
            assert_eq!(el.layout_flushes(), 1);

            tip.hide();
            tokio::time::sleep(Duration::from_millis(299)).await;
            assert!(tip.is_hiding());
            assert!(el.is_mounted());

            tokio::time::sleep(Duration::from_millis(2)).await;
            assert!(tip.is_hidden());
            assert!(!el.is_mounted());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_show_during_hide_cancels_removal() {
    LocalSet::new()
        .run_until(async {
            let sched = scheduler();
            sched
                .host()
                .add_anchor("a", Rect::new(100.0, 100.0, 40.0, 20.0));
            let mut tip = sized(&sched, fading(), 10.0, 10.0);
            let el = tip.element();
            tip.attach("a".to_string()).show();
            let unmounts = el.unmounts();
            let mounts = el.mounts();

            tip.hide();
            assert!(el.is_mounted());
            tokio::time::sleep(Duration::from_millis(100)).await;
            tip.show();

            tokio::time::sleep(Duration::from_millis(500)).await;
            assert!(tip.is_visible());
            assert!(el.is_mounted());
            assert!(el.has("in"));
            assert_eq!(el.unmounts(), unmounts);
            assert_eq!(el.mounts(), mounts);
            assert!(sched.contains(tip.id()));
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_toggle() {
    LocalSet::new()
        .run_until(async {
            let sched = scheduler();
            let mut tip = sized(&sched, OverlayOptions::default(), 10.0, 10.0);

            tip.toggle();
            assert!(tip.is_visible());
            tip.toggle();
            assert!(tip.is_hiding());
            // a hide in flight toggles back to visible
            tip.toggle();
            assert!(tip.is_visible());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_detach_hides_and_forgets_anchor() {
    LocalSet::new()
        .run_until(async {
            let sched = scheduler();
            sched
                .host()
                .add_anchor("a", Rect::new(100.0, 100.0, 40.0, 20.0));
            let mut tip = sized(&sched, OverlayOptions::default(), 10.0, 10.0);
            tip.attach("a".to_string()).show();
            assert_eq!(sched.len(), 1);

            tip.detach();
            assert!(tip.is_hiding());
            assert_eq!(tip.anchor(), None);
            assert!(sched.is_empty());

            tokio::time::sleep(Duration::from_millis(1)).await;
            assert!(tip.is_hidden());

            // showing again without an anchor does not register
            tip.show();
            assert!(sched.is_empty());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_scroll_events_coalesce_into_one_pass() {
    LocalSet::new()
        .run_until(async {
            let sched = scheduler();
            let host = sched.host();
            host.add_anchor("a", Rect::new(100.0, 20.0, 40.0, 20.0));
            host.add_anchor("b", Rect::new(120.0, 150.0, 40.0, 20.0));

            let mut first = sized(&sched, OverlayOptions::default(), 10.0, 10.0);
            let mut second = sized(&sched, OverlayOptions::default(), 10.0, 10.0);
            let mut loose = sized(&sched, OverlayOptions::default(), 10.0, 10.0);
            first.attach("a".to_string()).show();
            second.attach("b".to_string()).show();
            loose.position_at(5.0, 5.0).show();
            assert_eq!(sched.registered(), vec![first.id(), second.id()]);

            let (a, b, c) = (first.element(), second.element(), loose.element());
            let before = (a.position_writes(), b.position_writes(), c.position_writes());

            for _ in 0..10 {
                sched.on_viewport_event(ViewportEvent::Scroll);
            }
            assert!(sched.is_pending());
            assert_eq!(sched.passes(), 0);

            tokio::time::sleep(Duration::from_millis(20)).await;
            assert_eq!(sched.passes(), 1);
            assert!(!sched.is_pending());
            assert_eq!(a.position_writes(), before.0 + 1);
            assert_eq!(b.position_writes(), before.1 + 1);
            assert_eq!(c.position_writes(), before.2);

            // nothing further without a fresh trigger
            tokio::time::sleep(Duration::from_millis(100)).await;
            assert_eq!(sched.passes(), 1);

            sched.on_viewport_event(ViewportEvent::Resize);
            tokio::time::sleep(Duration::from_millis(20)).await;
            assert_eq!(sched.passes(), 2);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_scroll_flips_anchored_overlay() {
    LocalSet::new()
        .run_until(async {
            let sched = scheduler();
            sched
                .host()
                .add_anchor("a", Rect::from_edges(100.0, 110.0, 120.0, 190.0));
            let options = OverlayOptions {
                auto: true,
                ..Default::default()
            };
            let mut tip = sized(&sched, options, 80.0, 40.0);
            tip.attach("a".to_string()).show();
            assert_eq!(tip.placement(), Some(Placement::Top));
            assert_eq!(tip.element().position(), Some((50, 110)));

            sched.host().scroll_by(0.0, 60.0);
            sched.on_viewport_event(ViewportEvent::Scroll);
            tokio::time::sleep(Duration::from_millis(20)).await;

            let el = tip.element();
            assert_eq!(tip.placement(), Some(Placement::Bottom));
            assert_eq!(el.position(), Some((130, 110)));
            assert_eq!(placement_classes(&el), vec!["bottom".to_string()]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_trigger_without_registered_overlays_is_ignored() {
    LocalSet::new()
        .run_until(async {
            let sched = scheduler();
            sched.request_reposition();
            assert!(!sched.is_pending());
            assert_eq!(sched.flush(), 0);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_flush_runs_pending_pass_once() {
    LocalSet::new()
        .run_until(async {
            let sched = scheduler();
            sched
                .host()
                .add_anchor("a", Rect::new(100.0, 100.0, 40.0, 20.0));
            let mut tip = sized(&sched, OverlayOptions::default(), 10.0, 10.0);
            tip.attach("a".to_string()).show();

            sched.request_reposition();
            assert_eq!(sched.flush(), 1);
            assert!(!sched.is_pending());

            tokio::time::sleep(Duration::from_millis(50)).await;
            assert_eq!(sched.passes(), 1);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_removed_anchor_survives_pass() {
    LocalSet::new()
        .run_until(async {
            let sched = scheduler();
            sched
                .host()
                .add_anchor("a", Rect::new(100.0, 100.0, 40.0, 20.0));
            let mut tip = sized(&sched, OverlayOptions::default(), 10.0, 10.0);
            tip.attach("a".to_string()).show();
            let el = tip.element();
            let position = el.position();

            sched.host().remove_anchor("a").unwrap();
            sched.on_viewport_event(ViewportEvent::Scroll);
            tokio::time::sleep(Duration::from_millis(20)).await;

            assert_eq!(sched.passes(), 1);
            assert_eq!(el.position(), position);
            assert!(tip.is_visible());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_destroy_releases_everything() {
    LocalSet::new()
        .run_until(async {
            let sched = scheduler();
            sched
                .host()
                .add_anchor("a", Rect::new(100.0, 100.0, 40.0, 20.0));
            let mut keep = sized(&sched, OverlayOptions::default(), 10.0, 10.0);
            let mut gone = sized(&sched, fading(), 10.0, 10.0);
            keep.attach("a".to_string()).show();
            gone.attach("a".to_string()).show();
            let el = gone.element();
            assert_eq!(sched.len(), 2);

            // destroyed with a pass pending
            sched.request_reposition();
            gone.destroy();

            assert_eq!(sched.registered(), vec![keep.id()]);
            assert!(!el.is_mounted());

            tokio::time::sleep(Duration::from_millis(20)).await;
            assert_eq!(sched.passes(), 1);

            // destroyed while hiding: the pending removal never fires
            let mut hiding = sized(&sched, fading(), 10.0, 10.0);
            let hiding_el = hiding.element();
            hiding.show().hide();
            let unmounts = hiding_el.unmounts();
            drop(hiding);
            assert_eq!(hiding_el.unmounts(), unmounts + 1);

            tokio::time::sleep(Duration::from_millis(500)).await;
            assert_eq!(hiding_el.unmounts(), unmounts + 1);
        })
        .await;
}
