// SPDX-License-Identifier: MIT OR Apache-2.0
//! Groups of timeline items advanced in lockstep.

use crate::callback::CallbackSlot;
use crate::clock::{Clock, Time, TimelineItem};
use std::fmt;

/// Callback fired on a group boundary
pub type GroupCallback = Box<dyn FnMut(&mut MotionGroup)>;

/// A timeline item that owns child items and drives them to its own time
///
/// Each update fires the start callback (if the window was just entered),
/// jumps every child to the group's time in order, then fires the finish
/// callback (if the window was just left). Callbacks run before or after
/// child propagation, never during it, so they may add children freely.
///
/// A single step large enough to span the whole window fires both callbacks
/// in the same update; a jump from inside the window past its end fires only
/// the finish callback.
pub struct MotionGroup {
    clock: Clock,
    motions: Vec<Box<dyn TimelineItem>>,
    start_fn: CallbackSlot<GroupCallback>,
    finish_fn: CallbackSlot<GroupCallback>,
}

impl MotionGroup {
    /// Create an empty group with the given duration
    pub fn new(duration: Time) -> Self {
        Self {
            clock: Clock::new(duration),
            motions: Vec::new(),
            start_fn: CallbackSlot::default(),
            finish_fn: CallbackSlot::default(),
        }
    }

    /// Create a group owning `motions`, in order
    pub fn with_children(
        duration: Time,
        motions: impl IntoIterator<Item = Box<dyn TimelineItem>>,
    ) -> Self {
        let mut group = Self::new(duration);
        group.motions.extend(motions);
        group
    }

    /// Delay the group's local zero by `delay`
    pub fn with_start_time(mut self, delay: Time) -> Self {
        self.clock.delay(delay);
        self
    }

    /// Append a child
    pub fn add(&mut self, motion: impl TimelineItem + 'static) {
        self.motions.push(Box::new(motion));
    }

    /// Append an already boxed child
    pub fn add_boxed(&mut self, motion: Box<dyn TimelineItem>) {
        self.motions.push(motion);
    }

    /// Children in propagation order
    pub fn children(&self) -> impl Iterator<Item = &(dyn TimelineItem + 'static)> {
        self.motions.iter().map(Box::as_ref)
    }

    /// Child count
    pub fn len(&self) -> usize {
        self.motions.len()
    }

    /// No children
    pub fn is_empty(&self) -> bool {
        self.motions.is_empty()
    }

    /// Set the callback fired when playback enters the group
    pub fn set_start_fn(&mut self, start_fn: impl FnMut(&mut MotionGroup) + 'static) {
        self.start_fn.set(Box::new(start_fn));
    }

    /// Set the callback fired when playback leaves the group
    pub fn set_finish_fn(&mut self, finish_fn: impl FnMut(&mut MotionGroup) + 'static) {
        self.finish_fn.set(Box::new(finish_fn));
    }

    /// Remove the start callback
    pub fn clear_start_fn(&mut self) {
        self.start_fn.clear();
    }

    /// Remove the finish callback
    pub fn clear_finish_fn(&mut self) {
        self.finish_fn.clear();
    }

    fn fire(&mut self, slot: fn(&mut Self) -> &mut CallbackSlot<GroupCallback>) {
        let Some((mut callback, revision)) = slot(self).take() else {
            return;
        };
        callback(self);
        slot(self).restore(callback, revision);
    }
}

impl TimelineItem for MotionGroup {
    fn clock(&self) -> &Clock {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    fn update(&mut self) {
        if self.start_fn.is_set() && self.clock.crossed_start() {
            tracing::trace!(time = self.clock.time(), "motion group started");
            self.fire(|group| &mut group.start_fn);
        }

        let time = self.clock.time();
        for motion in &mut self.motions {
            motion.jump_to(time);
        }

        if self.finish_fn.is_set() && self.clock.crossed_finish() {
            tracing::trace!(time = self.clock.time(), "motion group finished");
            self.fire(|group| &mut group.finish_fn);
        }
    }

    fn is_valid(&self) -> bool {
        self.motions.iter().all(|m| m.is_valid())
    }
}

impl fmt::Debug for MotionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionGroup")
            .field("clock", &self.clock)
            .field("children", &self.motions.len())
            .field("start_fn", &self.start_fn)
            .field("finish_fn", &self.finish_fn)
            .finish()
    }
}
