use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use gauge_config::{GaugeConfig, SizingMode};
use gauge_core::animation::{
    AnimationEvent, DEFAULT_EVENT_CAPACITY, FrameQueue, ValueInterpolator,
};
use gauge_core::layout::{LayoutHost, SizeSample};
use gauge_core::ring::{RingRenderer, RingSizing, RingStyle, RingTone, RingView};
use taffy::NodeId;
use taffy::prelude::{Dimension, Size, Style};

/// Viewport-wide panel with no padding, so its content width is the viewport width.
fn full_width_panel() -> Result<(LayoutHost, NodeId)> {
    let host = LayoutHost::new();
    let panel = host.new_leaf(Style {
        size: Size {
            width: Dimension::Percent(1.0),
            height: Dimension::Length(320.0),
        },
        ..Default::default()
    })?;
    let root = host.new_with_children(
        Style {
            size: Size {
                width: Dimension::Percent(1.0),
                height: Dimension::Percent(1.0),
            },
            ..Default::default()
        },
        &[panel],
    )?;
    host.set_root(root)?;
    Ok((host, panel))
}

fn ring_on(host: &LayoutHost, queue: &FrameQueue) -> RingRenderer<LayoutHost> {
    let value = ValueInterpolator::new(Rc::new(queue.clone())).with_duration(800.0);
    RingRenderer::with_interpolator(value, host.clone(), RingStyle::default())
}

fn record(ring: &RingRenderer<LayoutHost>) -> Rc<RefCell<Vec<f64>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    ring.interpolator().on_value(move |v| sink.borrow_mut().push(v));
    log
}

#[test]
fn ring_follows_panel_width() -> Result<()> {
    let (host, panel) = full_width_panel()?;
    let queue = FrameQueue::new();
    let mut ring = ring_on(&host, &queue);
    ring.observe(Some(panel));

    // Not laid out yet: the lower bound applies.
    assert_eq!(ring.geometry().diameter_px, 140.0);

    host.resize_viewport(500.0, 600.0)?;
    assert_eq!(ring.tracker().size(), SizeSample::new(500.0, 320.0));
    assert_eq!(ring.geometry().diameter_px, 140.0);

    host.resize_viewport(1000.0, 600.0)?;
    assert_eq!(ring.geometry().diameter_px, 260.0);

    host.resize_viewport(750.0, 600.0)?;
    assert_eq!(ring.geometry().diameter_px, 210.0);
    Ok(())
}

#[test]
fn animation_converges_exactly() -> Result<()> {
    let (host, panel) = full_width_panel()?;
    let queue = FrameQueue::new();
    let mut ring = ring_on(&host, &queue);
    ring.observe(Some(panel));
    host.resize_viewport(1000.0, 600.0)?;
    let values = record(&ring);

    ring.set_percent(64.0);
    let last = queue.run_until_idle(0.0, 16.0, 500);
    assert!(last >= 800.0);

    let values = values.borrow();
    assert_eq!(values.last().copied(), Some(64.0));
    assert_eq!(values.iter().filter(|v| **v == 64.0).count(), 1);
    assert!(values.windows(2).all(|w| w[1] >= w[0]));

    let view = ring.render();
    assert_eq!(view.label, "64%");
    assert_eq!(view.geometry.diameter_px, 260.0);
    assert!((view.geometry.sweep_angle_deg - 230.4).abs() < 1e-9);
    Ok(())
}

#[test]
fn retarget_continues_from_displayed_value() -> Result<()> {
    let (host, _panel) = full_width_panel()?;
    let queue = FrameQueue::new();
    let mut ring = ring_on(&host, &queue);
    let values = record(&ring);

    ring.set_percent(80.0);
    queue.run_frame(0.0);
    queue.run_frame(400.0);
    let before = ring.interpolator().value();
    assert!((before - 70.0).abs() < 1e-9);

    ring.set_percent(20.0);
    assert_eq!(queue.pending(), 1);
    queue.run_frame(416.0);
    assert_eq!(ring.interpolator().value(), before);

    queue.run_until_idle(432.0, 16.0, 500);
    let values = values.borrow();
    assert_eq!(values.last().copied(), Some(20.0));

    let turn = values
        .iter()
        .position(|v| *v == before)
        .ok_or_else(|| anyhow::anyhow!("retarget point missing"))?;
    assert!(values[..=turn].windows(2).all(|w| w[1] >= w[0]));
    assert!(values[turn..].windows(2).all(|w| w[1] <= w[0]));
    Ok(())
}

#[test]
fn out_of_range_targets_clamp() -> Result<()> {
    let (host, _panel) = full_width_panel()?;
    let queue = FrameQueue::new();
    let mut ring = ring_on(&host, &queue);

    ring.set_percent(250.0);
    queue.run_until_idle(0.0, 16.0, 500);
    assert_eq!(ring.interpolator().value(), 100.0);
    assert_eq!(ring.render().geometry.sweep_angle_deg, 360.0);

    ring.set_percent(-40.0);
    queue.run_until_idle(1000.0, 16.0, 500);
    assert_eq!(ring.interpolator().value(), 0.0);
    assert_eq!(ring.render().label, "0%");
    Ok(())
}

#[test]
fn zero_duration_snaps_on_next_frame() -> Result<()> {
    let (host, _panel) = full_width_panel()?;
    let queue = FrameQueue::new();
    let mut ring = ring_on(&host, &queue);

    ring.set_percent_with_duration(42.0, 0.0);
    assert_eq!(ring.interpolator().value(), 0.0);
    assert_eq!(queue.run_frame(5.0), 1);
    assert_eq!(ring.interpolator().value(), 42.0);
    assert!(queue.is_idle());
    Ok(())
}

#[test]
fn same_target_is_a_no_op() -> Result<()> {
    let (host, _panel) = full_width_panel()?;
    let queue = FrameQueue::new();
    let mut ring = ring_on(&host, &queue);
    ring.set_percent(30.0);
    queue.run_until_idle(0.0, 16.0, 500);
    let generation = ring.interpolator().generation();

    ring.set_percent(30.0);
    assert!(queue.is_idle());
    assert_eq!(ring.interpolator().generation(), generation);
    Ok(())
}

#[test]
fn teardown_mid_run_is_silent() -> Result<()> {
    let (host, panel) = full_width_panel()?;
    let queue = FrameQueue::new();
    let mut ring = ring_on(&host, &queue);
    ring.observe(Some(panel));
    host.resize_viewport(900.0, 600.0)?;
    let values = record(&ring);

    ring.set_percent(90.0);
    queue.run_frame(0.0);
    queue.run_frame(200.0);
    let emitted = values.borrow().len();

    ring.teardown();
    assert!(queue.is_idle());
    assert_eq!(host.observer_count(), 0);
    queue.run_until_idle(216.0, 16.0, 100);
    host.resize_viewport(400.0, 600.0)?;
    assert_eq!(values.borrow().len(), emitted);

    let events = ring.interpolator().drain_events();
    assert!(matches!(events.first(), Some(AnimationEvent::Started { .. })));
    assert!(matches!(events.last(), Some(AnimationEvent::Cancelled { .. })));
    Ok(())
}

#[test]
fn renderer_from_config_uses_fixed_sizing() -> Result<()> {
    let mut config = GaugeConfig::default();
    config.sizing.mode = SizingMode::Fixed;
    config.animation.easing = "linear".to_string();
    config.animation.duration_ms = 100.0;

    let (host, panel) = full_width_panel()?;
    let queue = FrameQueue::new();
    let mut ring = RingRenderer::from_config(Rc::new(queue.clone()), host.clone(), &config);
    ring.observe(Some(panel));
    host.resize_viewport(1000.0, 600.0)?;
    assert_eq!(ring.style().sizing, RingSizing::FIXED);

    ring.set_percent(50.0);
    queue.run_frame(0.0);
    queue.run_frame(50.0);
    assert!((ring.interpolator().value() - 25.0).abs() < 1e-9);

    let view = ring.render();
    assert_eq!(view.geometry.diameter_px, 220.0);
    assert_eq!(view.inner_diameter_px, 196.0);
    Ok(())
}

#[test]
fn ring_view_serializes_for_backends() -> Result<()> {
    let (host, _panel) = full_width_panel()?;
    let queue = FrameQueue::new();
    let mut ring = ring_on(&host, &queue);
    ring.set_tone(RingTone::for_score(72.0));
    ring.set_percent(72.0);
    queue.run_until_idle(0.0, 16.0, 500);

    let json = serde_json::to_value(ring.render())?;
    assert_eq!(json["label"], "72%");
    assert_eq!(json["tone"], "positive");
    assert_eq!(json["geometry"]["diameter_px"], 140.0);

    let back: RingView = serde_json::from_value(json)?;
    assert_eq!(back.geometry, ring.render().geometry);
    assert_eq!(back.tone, RingTone::Positive);
    Ok(())
}

#[test]
fn long_lived_ring_keeps_event_backlog_bounded() -> Result<()> {
    let (host, _panel) = full_width_panel()?;
    let queue = FrameQueue::new();
    let mut ring = ring_on(&host, &queue);

    for n in 0..10_000 {
        ring.set_percent_with_duration((n % 100) as f64 + 0.5, 0.0);
        queue.run_frame(n as f64 * 16.0);
    }
    let events = ring.drain_events();
    assert_eq!(events.len(), DEFAULT_EVENT_CAPACITY);
    assert!(matches!(events.last(), Some(AnimationEvent::Ended { value, .. }) if *value == 99.5));
    Ok(())
}

#[test]
fn resize_listener_can_shrink_its_own_panel() -> Result<()> {
    let (host, panel) = full_width_panel()?;
    let queue = FrameQueue::new();
    let mut ring = ring_on(&host, &queue);

    // Clamp the viewport back down whenever the panel grows past 800px.
    let relayout = host.clone();
    ring.tracker().on_resize(move |size| {
        if size.width > 800.0 {
            let _ = relayout.resize_viewport(600.0, 600.0);
        }
    });
    ring.observe(Some(panel));

    host.resize_viewport(1200.0, 600.0)?;
    assert_eq!(ring.tracker().size().width, 600.0);
    assert_eq!(host.viewport(), Some(SizeSample::new(600.0, 600.0)));
    assert_eq!(ring.geometry().diameter_px, 168.0);
    Ok(())
}

#[test]
fn foreign_panel_does_not_break_layout() -> Result<()> {
    let (host, panel) = full_width_panel()?;
    let (other, _) = full_width_panel()?;
    let mut foreign = other.new_leaf(Style::default())?;
    for _ in 0..3 {
        foreign = other.new_leaf(Style::default())?;
    }

    let queue = FrameQueue::new();
    let mut stray = ring_on(&host, &queue);
    stray.observe(Some(foreign));
    let mut ring = ring_on(&host, &queue);
    ring.observe(Some(panel));

    host.resize_viewport(1000.0, 600.0)?;
    assert_eq!(ring.geometry().diameter_px, 260.0);
    assert_eq!(stray.geometry().diameter_px, 140.0);
    Ok(())
}
