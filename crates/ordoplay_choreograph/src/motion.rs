// SPDX-License-Identifier: MIT OR Apache-2.0
//! Leaf motions: sample a value source and hand the result to an output.

use crate::callback::CallbackSlot;
use crate::clock::{Clock, Time, TimelineItem};
use crate::cue::Control;
use std::fmt;

/// Produces the value of a motion at a point in its local time
pub trait MotionSource<T> {
    /// Value at `time`, where `0 <= time <= duration()`
    fn value_at(&self, time: Time) -> T;

    /// Length of the source
    fn duration(&self) -> Time;
}

/// Callback fired on a motion boundary or update
pub type MotionCallback<T> = Box<dyn FnMut(&mut Motion<T>)>;

/// A timeline item that writes sampled values to an output
///
/// The source is sampled at the current time clamped to `[0, duration]`, so
/// a motion seeked past either end holds its first or last value. Once its
/// control is cancelled the motion stops writing and reports invalid.
pub struct Motion<T: 'static> {
    clock: Clock,
    source: Box<dyn MotionSource<T>>,
    output: Box<dyn FnMut(T)>,
    control: Control,
    start_fn: CallbackSlot<MotionCallback<T>>,
    update_fn: CallbackSlot<MotionCallback<T>>,
    finish_fn: CallbackSlot<MotionCallback<T>>,
}

impl<T: 'static> Motion<T> {
    /// Create a motion playing `source` into `output`
    pub fn new(source: impl MotionSource<T> + 'static, output: impl FnMut(T) + 'static) -> Self {
        Self {
            clock: Clock::new(source.duration()),
            source: Box::new(source),
            output: Box::new(output),
            control: Control::new(),
            start_fn: CallbackSlot::default(),
            update_fn: CallbackSlot::default(),
            finish_fn: CallbackSlot::default(),
        }
    }

    /// Delay the motion's local zero by `delay`
    pub fn with_start_time(mut self, delay: Time) -> Self {
        self.clock.delay(delay);
        self
    }

    /// Handle for disconnecting this motion's output
    pub fn control(&self) -> Control {
        self.control.clone()
    }

    /// Value of the source at the current (clamped) time
    pub fn value(&self) -> T {
        self.source.value_at(self.sample_time())
    }

    /// Set the callback fired when playback enters the motion
    pub fn set_start_fn(&mut self, start_fn: impl FnMut(&mut Motion<T>) + 'static) {
        self.start_fn.set(Box::new(start_fn));
    }

    /// Set the callback fired after every output write
    pub fn set_update_fn(&mut self, update_fn: impl FnMut(&mut Motion<T>) + 'static) {
        self.update_fn.set(Box::new(update_fn));
    }

    /// Set the callback fired when playback leaves the motion
    pub fn set_finish_fn(&mut self, finish_fn: impl FnMut(&mut Motion<T>) + 'static) {
        self.finish_fn.set(Box::new(finish_fn));
    }

    /// Remove the start callback
    pub fn clear_start_fn(&mut self) {
        self.start_fn.clear();
    }

    /// Remove the update callback
    pub fn clear_update_fn(&mut self) {
        self.update_fn.clear();
    }

    /// Remove the finish callback
    pub fn clear_finish_fn(&mut self) {
        self.finish_fn.clear();
    }

    fn sample_time(&self) -> Time {
        self.clock.time().max(0.0).min(self.clock.duration)
    }

    fn fire(&mut self, slot: fn(&mut Self) -> &mut CallbackSlot<MotionCallback<T>>) {
        let Some((mut callback, revision)) = slot(self).take() else {
            return;
        };
        callback(self);
        slot(self).restore(callback, revision);
    }
}

impl<T: 'static> TimelineItem for Motion<T> {
    fn clock(&self) -> &Clock {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    fn update(&mut self) {
        if !self.control.is_valid() {
            return;
        }

        if self.clock.crossed_start() {
            self.fire(|motion| &mut motion.start_fn);
        }

        let value = self.value();
        (self.output)(value);
        self.fire(|motion| &mut motion.update_fn);

        if self.clock.crossed_finish() {
            self.fire(|motion| &mut motion.finish_fn);
        }
    }

    fn is_valid(&self) -> bool {
        self.control.is_valid()
    }
}

impl<T: 'static> fmt::Debug for Motion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Motion")
            .field("clock", &self.clock)
            .field("valid", &self.control.is_valid())
            .finish_non_exhaustive()
    }
}
