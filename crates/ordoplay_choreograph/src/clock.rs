// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared time state and the stepping contract for timeline items.
//!
//! Every playable item (motion group, cue, leaf motion) owns a [`Clock`] and
//! implements [`TimelineItem::update`]. Stepping, seeking and finish detection
//! are provided by the trait so that all items agree on the order in which
//! `time` and `previous_time` change.

use serde::{Deserialize, Serialize};

/// Time value on the timeline axis (same unit as the step delta)
pub type Time = f32;

/// Time state of a timeline item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    time: Time,
    previous_time: Time,
    /// Playback rate; the sign selects the direction
    pub speed: f32,
    /// Delay before the item's local zero, relative to its owner
    pub start_time: Time,
    /// Length of the active window
    pub duration: Time,
    /// Whether an owning timeline may drop the item once finished
    pub remove_on_finish: bool,
}

impl Clock {
    /// Create a clock at time zero playing forward
    pub fn new(duration: Time) -> Self {
        Self {
            time: 0.0,
            previous_time: 0.0,
            speed: 1.0,
            start_time: 0.0,
            duration,
            remove_on_finish: true,
        }
    }

    /// Create a clock whose local zero lies `start_time` ahead
    pub fn delayed(start_time: Time, duration: Time) -> Self {
        let mut clock = Self::new(duration);
        clock.delay(start_time);
        clock
    }

    /// Set the start delay and move both time values to `-start_time`
    pub fn delay(&mut self, start_time: Time) {
        self.start_time = start_time;
        self.time = -start_time;
        self.previous_time = -start_time;
    }

    /// Current time
    pub fn time(&self) -> Time {
        self.time
    }

    /// Time as of the previous step or jump
    pub fn previous_time(&self) -> Time {
        self.previous_time
    }

    /// End of the active window
    pub fn end_time(&self) -> Time {
        self.start_time + self.duration
    }

    /// Playing forward (a paused clock counts as forward)
    pub fn forward(&self) -> bool {
        self.speed >= 0.0
    }

    /// Playing backward
    pub fn backward(&self) -> bool {
        self.speed < 0.0
    }

    /// Time left before the item reports finished, in caller time
    pub fn time_until_finish(&self) -> Time {
        let remaining = if self.backward() {
            self.time
        } else {
            self.duration - self.time
        };
        if self.speed == 0.0 {
            return if remaining > 0.0 { Time::INFINITY } else { 0.0 };
        }
        (remaining / self.speed.abs()).max(0.0)
    }

    /// Whether the last change of `time` entered the active window
    pub fn crossed_start(&self) -> bool {
        if self.forward() {
            self.time > 0.0 && self.previous_time <= 0.0
        } else {
            self.time < self.duration && self.previous_time >= self.duration
        }
    }

    /// Whether the last change of `time` left the active window
    pub fn crossed_finish(&self) -> bool {
        if self.forward() {
            self.time >= self.duration && self.previous_time < self.duration
        } else {
            self.time <= 0.0 && self.previous_time > 0.0
        }
    }

    /// Whether the last change of `time` reached zero
    pub fn reached_zero(&self) -> bool {
        if self.forward() {
            self.time >= 0.0 && self.previous_time < 0.0
        } else {
            self.time <= 0.0 && self.previous_time > 0.0
        }
    }

    fn is_finished(&self) -> bool {
        if self.backward() {
            self.time <= 0.0
        } else {
            self.time >= self.duration
        }
    }

    fn reset(&mut self) {
        let time = if self.forward() { 0.0 } else { self.end_time() };
        self.time = time;
        self.previous_time = time;
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// An item driven along the timeline by `step` and `jump_to`
///
/// Implementors supply the clock and the `update` hook; everything else is
/// provided. `update` runs after `time` changes and before `previous_time`
/// catches up, so boundary checks inside it compare the old and new values.
pub trait TimelineItem {
    /// Time state of this item
    fn clock(&self) -> &Clock;

    /// Mutable time state of this item
    fn clock_mut(&mut self) -> &mut Clock;

    /// Called after every change of `time`
    fn update(&mut self);

    /// Whether the item can still produce output
    fn is_valid(&self) -> bool {
        true
    }

    /// Advance by `dt * speed`
    fn step(&mut self, dt: Time) {
        let clock = self.clock_mut();
        clock.time += dt * clock.speed;
        self.update();
        let clock = self.clock_mut();
        clock.previous_time = clock.time;
    }

    /// Seek to `time`, ignoring speed
    fn jump_to(&mut self, time: Time) {
        self.clock_mut().time = time;
        self.update();
        let clock = self.clock_mut();
        clock.previous_time = clock.time;
    }

    /// Past the end in the current direction
    fn is_finished(&self) -> bool {
        self.clock().is_finished()
    }

    /// Rewind to the start of the current direction without firing anything
    fn reset_time(&mut self) {
        self.clock_mut().reset();
    }

    /// Current time
    fn time(&self) -> Time {
        self.clock().time()
    }

    /// Time as of the previous step or jump
    fn previous_time(&self) -> Time {
        self.clock().previous_time()
    }

    /// Playing forward
    fn forward(&self) -> bool {
        self.clock().forward()
    }

    /// Playing backward
    fn backward(&self) -> bool {
        self.clock().backward()
    }

    /// Playback rate
    fn speed(&self) -> f32 {
        self.clock().speed
    }

    /// Set the playback rate; a negative rate plays backward
    fn set_speed(&mut self, speed: f32) {
        self.clock_mut().speed = speed;
    }

    /// Start delay
    fn start_time(&self) -> Time {
        self.clock().start_time
    }

    /// Set the start delay without moving the current time
    fn set_start_time(&mut self, start_time: Time) {
        self.clock_mut().start_time = start_time;
    }

    /// Length of the active window
    fn duration(&self) -> Time {
        self.clock().duration
    }

    /// Start delay plus duration
    fn end_time(&self) -> Time {
        self.clock().end_time()
    }

    /// Time left before the item reports finished
    fn time_until_finish(&self) -> Time {
        self.clock().time_until_finish()
    }

    /// Whether an owning timeline may drop the item once finished
    fn remove_on_finish(&self) -> bool {
        self.clock().remove_on_finish
    }

    /// Set whether an owning timeline may drop the item once finished
    fn set_remove_on_finish(&mut self, remove: bool) {
        self.clock_mut().remove_on_finish = remove;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records the (time, previous_time) pair seen by each update
    struct Tracker {
        clock: Clock,
        seen: Vec<(Time, Time)>,
    }

    impl Tracker {
        fn new(duration: Time) -> Self {
            Self {
                clock: Clock::new(duration),
                seen: Vec::new(),
            }
        }
    }

    impl TimelineItem for Tracker {
        fn clock(&self) -> &Clock {
            &self.clock
        }

        fn clock_mut(&mut self) -> &mut Clock {
            &mut self.clock
        }

        fn update(&mut self) {
            self.seen.push((self.clock.time(), self.clock.previous_time()));
        }
    }

    #[test]
    fn test_step_scales_by_speed() {
        let mut tracker = Tracker::new(4.0);
        tracker.step(1.0);
        assert_eq!(tracker.time(), 1.0);

        tracker.set_speed(2.0);
        tracker.step(0.5);
        assert_eq!(tracker.time(), 2.0);

        tracker.set_speed(-1.0);
        tracker.step(0.5);
        assert_eq!(tracker.time(), 1.5);
    }

    #[test]
    fn test_previous_time_trails_update() {
        let mut tracker = Tracker::new(4.0);
        tracker.step(1.0);
        tracker.jump_to(3.0);
        assert_eq!(tracker.seen, vec![(1.0, 0.0), (3.0, 1.0)]);
        assert_eq!(tracker.previous_time(), 3.0);
    }

    #[test]
    fn test_jump_ignores_speed() {
        let mut tracker = Tracker::new(4.0);
        tracker.set_speed(-3.0);
        tracker.jump_to(2.5);
        assert_eq!(tracker.time(), 2.5);
    }

    #[test]
    fn test_is_finished_by_direction() {
        let mut tracker = Tracker::new(2.0);
        assert!(!tracker.is_finished());
        tracker.jump_to(2.0);
        assert!(tracker.is_finished());

        tracker.set_speed(-1.0);
        assert!(!tracker.is_finished());
        tracker.jump_to(0.0);
        assert!(tracker.is_finished());

        // Zero speed reads as forward
        tracker.set_speed(0.0);
        assert!(!tracker.is_finished());
    }

    #[test]
    fn test_reset_time() {
        let mut tracker = Tracker::new(2.0);
        tracker.set_start_time(1.0);
        tracker.step(1.5);
        tracker.reset_time();
        assert_eq!(tracker.time(), 0.0);
        assert_eq!(tracker.previous_time(), 0.0);

        tracker.set_speed(-1.0);
        tracker.reset_time();
        assert_eq!(tracker.end_time(), 3.0);
        assert_eq!(tracker.time(), 3.0);
        assert_eq!(tracker.previous_time(), 3.0);
    }

    #[test]
    fn test_delayed_clock_starts_before_zero() {
        let clock = Clock::delayed(0.5, 1.0);
        assert_eq!(clock.time(), -0.5);
        assert_eq!(clock.previous_time(), -0.5);
        assert_eq!(clock.end_time(), 1.5);
    }

    #[test]
    fn test_time_until_finish() {
        let mut tracker = Tracker::new(4.0);
        tracker.jump_to(1.0);
        assert_eq!(tracker.time_until_finish(), 3.0);

        tracker.set_speed(2.0);
        assert_eq!(tracker.time_until_finish(), 1.5);

        tracker.set_speed(-0.5);
        assert_eq!(tracker.time_until_finish(), 2.0);

        tracker.set_speed(0.0);
        assert!(tracker.time_until_finish().is_infinite());

        tracker.jump_to(5.0);
        assert_eq!(tracker.time_until_finish(), 0.0);
    }

    #[test]
    fn test_boundary_predicates() {
        let mut clock = Clock::new(2.0);
        clock.time = 0.5;
        assert!(clock.crossed_start());
        assert!(!clock.crossed_finish());

        clock.previous_time = 0.5;
        clock.time = 2.0;
        assert!(!clock.crossed_start());
        assert!(clock.crossed_finish());

        clock.speed = -1.0;
        clock.previous_time = 2.0;
        clock.time = 1.0;
        assert!(clock.crossed_start());

        clock.previous_time = 0.1;
        clock.time = -0.1;
        assert!(clock.crossed_finish());
        assert!(clock.reached_zero());
    }
}
