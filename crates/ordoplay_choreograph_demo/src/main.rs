// SPDX-License-Identifier: MIT OR Apache-2.0
//! `OrdoPlay` choreograph demo
//!
//! Builds a short sequence (a motion group with two keyframed motions and a
//! few cues), then steps it frame by frame until every item has finished.
//!
//! Usage: `choreograph_demo [settings.ron]`

use ordoplay_choreograph::{
    Channel, InterpolationMode, Keyframe, Motion, MotionGroup, Timeline, TimelineItem,
    TimelineSettings,
};
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Upper bound on simulated frames, in case settings make playback stall
const MAX_FRAMES: u32 = 10_000;

fn main() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ordoplay_choreograph=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = load_settings();
    tracing::info!(
        "Playing at speed {} and {} frames per unit",
        settings.speed,
        settings.frame_rate
    );

    let mut timeline = Timeline::with_settings(settings);
    let position = Rc::new(Cell::new([0.0_f32; 2]));
    let opacity = Rc::new(Cell::new(0.0_f32));

    let sequence = build_sequence(&timeline, Rc::clone(&position), Rc::clone(&opacity));
    timeline.add(sequence);

    timeline.cue(|| tracing::info!("Cue: halfway marker"), 1.0);
    let (_, skipped) = timeline.cue(|| tracing::info!("Cue: never shown"), 1.5);
    skipped.cancel();

    let mut frames = 0;
    while !timeline.is_empty() && frames < MAX_FRAMES {
        timeline.step_frame();
        frames += 1;
    }

    let [x, y] = position.get();
    tracing::info!(
        "Finished after {} frames at time {:.3}: position = ({:.1}, {:.1}), opacity = {:.2}",
        frames,
        timeline.time(),
        x,
        y,
        opacity.get()
    );
}

fn load_settings() -> TimelineSettings {
    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        return TimelineSettings::default();
    };

    match TimelineSettings::load(&path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to load settings from {:?}: {}. Using defaults.", path, e);
            TimelineSettings::default()
        }
    }
}

fn build_sequence(
    timeline: &Timeline,
    position: Rc<Cell<[f32; 2]>>,
    opacity: Rc<Cell<f32>>,
) -> MotionGroup {
    let path: Channel<[f32; 2]> = [
        Keyframe::new(0.0, [0.0, 0.0]).with_interpolation(InterpolationMode::EaseInOut),
        Keyframe::new(1.0, [100.0, 50.0]).with_interpolation(InterpolationMode::EaseOut),
        Keyframe::new(2.0, [200.0, 0.0]),
    ]
    .into_iter()
    .collect();

    let fade = Channel::new()
        .with_keyframe(0.0, 0.0_f32)
        .with_keyframe(0.5, 1.0);

    let mut movement = Motion::new(path, move |value| position.set(value));
    movement.set_finish_fn(|motion| tracing::info!("Movement done at {:.3}", motion.time()));

    let mut group = MotionGroup::new(2.0);
    group.add(movement);
    group.add(Motion::new(fade, move |value| opacity.set(value)));

    group.set_start_fn(|group| tracing::info!("Sequence started with {} motions", group.len()));

    let pending = timeline.pending();
    group.set_finish_fn(move |_| {
        tracing::info!("Sequence finished");
        pending.cue(|| tracing::info!("Cue: encore"), 0.25);
    });

    group
}
