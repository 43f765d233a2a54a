use std::path::PathBuf;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use gauge_config::GaugeConfig;
use gauge_core::animation::{FrameQueue, percent_from_fraction};
use gauge_core::layout::LayoutHost;
use gauge_core::ring::{
    RingRenderer, RingSizing, RingStyle, RingTone, TrustBand, Verdict, render_ring,
};
use gauge_core::taffy::prelude::{Dimension, Size, Style};

/// Frame cap per target.
const MAX_FRAMES_PER_TARGET: usize = 10_000;

fn load_config() -> Result<GaugeConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let path = PathBuf::from(path);
            let mut config = GaugeConfig::load_from_file(&path)
                .with_context(|| format!("loading {}", path.display()))?;
            config.merge_with_env();
            config.validate().context("validating configuration")?;
            Ok(config)
        }
        None => Ok(GaugeConfig::load()),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let config = load_config()?;
    log::info!(
        "rune-gauge: duration={}ms easing={} sizing={:?} panel_width={}",
        config.animation.duration_ms,
        config.animation.easing,
        config.sizing.mode,
        config.demo.panel_width
    );

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
    host.resize_viewport(config.demo.panel_width, 720.0)
        .context("laying out demo panel")?;

    let queue = FrameQueue::new();
    let mut ring = RingRenderer::from_config(Rc::new(queue.clone()), host.clone(), &config);
    ring.observe(Some(panel));

    let interval = Duration::from_secs_f64(config.demo.frame_interval_ms / 1000.0);
    let clock = Instant::now();
    let now_ms = || clock.elapsed().as_secs_f64() * 1000.0;

    for &target in &config.demo.targets {
        ring.set_tone(RingTone::for_score(target));
        ring.set_percent(target);

        let mut frames = 0;
        while !queue.is_idle() && frames < MAX_FRAMES_PER_TARGET {
            thread::sleep(interval);
            queue.run_frame(now_ms());
            frames += 1;
            if ring.take_redraw() {
                let view = ring.render();
                log::trace!(
                    "frame {frames}: {} sweep={:.1}deg",
                    view.label,
                    view.geometry.sweep_angle_deg
                );
            }
        }

        let view = ring.render();
        let events = ring.drain_events();
        log::info!(
            "target {target} settled after {frames} frames: {} ({} lifecycle events)",
            view.label,
            events.len()
        );
        println!("{}", serde_json::to_string_pretty(&view)?);
    }

    // Narrow the panel to show the ring falling back to its lower bound.
    host.resize_viewport(config.demo.panel_width / 2.0, 720.0)?;
    log::info!(
        "panel narrowed to {}px: ring diameter {}px",
        config.demo.panel_width / 2.0,
        ring.geometry().diameter_px
    );

    if let Some(&last) = config.demo.targets.last() {
        let fraction = last / 100.0;
        let verdict = Verdict::from_validity(fraction);
        let style = RingStyle::default()
            .with_sizing(RingSizing::fixed(140.0))
            .with_tone(RingTone::for_verdict(verdict));
        let summary = render_ring(
            percent_from_fraction(fraction).unwrap_or(0.0),
            Default::default(),
            &style,
        );
        log::info!(
            "summary: {} {} {} ({})",
            summary.label,
            verdict,
            summary.color.to_hex(),
            TrustBand::for_score(last).caption()
        );
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    ring.teardown();
    Ok(())
}
