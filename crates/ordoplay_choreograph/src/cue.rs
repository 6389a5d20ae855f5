// SPDX-License-Identifier: MIT OR Apache-2.0
//! One-shot callbacks scheduled on the timeline.

use crate::clock::{Clock, Time, TimelineItem};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Shared cancellation flag
///
/// Clones share one flag. Holding a `Control` does not keep the item it
/// came from alive; it can only cancel it.
#[derive(Debug, Clone)]
pub struct Control {
    valid: Rc<Cell<bool>>,
}

impl Control {
    /// Create a new, valid control
    pub fn new() -> Self {
        Self {
            valid: Rc::new(Cell::new(true)),
        }
    }

    /// Cancel permanently. Cancelling twice is a no-op.
    pub fn cancel(&self) {
        self.valid.set(false);
    }

    /// Not yet cancelled
    pub fn is_valid(&self) -> bool {
        self.valid.get()
    }
}

impl Default for Control {
    fn default() -> Self {
        Self::new()
    }
}

/// A zero-length item that fires a callback when its time reaches zero
pub struct Cue {
    clock: Clock,
    cue: Box<dyn FnMut()>,
    control: Control,
}

impl Cue {
    /// Create a cue that fires once `delay` has elapsed
    pub fn new(cue: impl FnMut() + 'static, delay: Time) -> Self {
        Self {
            clock: Clock::delayed(delay, 0.0),
            cue: Box::new(cue),
            control: Control::new(),
        }
    }

    /// Handle for cancelling this cue
    pub fn control(&self) -> Control {
        self.control.clone()
    }
}

impl TimelineItem for Cue {
    fn clock(&self) -> &Clock {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    fn update(&mut self) {
        if self.control.is_valid() && self.clock.reached_zero() {
            tracing::trace!(time = self.clock.time(), "cue fired");
            (self.cue)();
        }
    }

    fn is_valid(&self) -> bool {
        self.control.is_valid()
    }
}

impl fmt::Debug for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cue")
            .field("clock", &self.clock)
            .field("valid", &self.control.is_valid())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_cue(delay: Time) -> (Cue, Rc<Cell<u32>>) {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let cue = Cue::new(move || counter.set(counter.get() + 1), delay);
        (cue, count)
    }

    #[test]
    fn test_fires_once_at_delay() {
        let (mut cue, count) = counting_cue(0.5);
        assert_eq!(cue.start_time(), 0.5);
        assert_eq!(cue.duration(), 0.0);

        cue.step(0.25);
        assert_eq!(count.get(), 0);
        cue.step(0.25);
        assert_eq!(count.get(), 1);
        assert!(cue.is_finished());

        cue.step(0.25);
        cue.step(10.0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_backward_crossing() {
        let (mut cue, count) = counting_cue(0.5);
        cue.set_speed(-1.0);

        cue.jump_to(1.0);
        assert_eq!(count.get(), 0);
        cue.jump_to(0.4);
        assert_eq!(count.get(), 0);
        cue.jump_to(-0.1);
        assert_eq!(count.get(), 1);
        cue.jump_to(-0.1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_refires_on_each_new_crossing() {
        let (mut cue, count) = counting_cue(0.0);
        cue.jump_to(-1.0);
        cue.jump_to(1.0);
        cue.jump_to(-1.0);
        cue.jump_to(1.0);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_cancel_before_crossing() {
        let (mut cue, count) = counting_cue(1.0);
        let control = cue.control();
        control.cancel();
        assert!(!cue.is_valid());

        cue.step(2.0);
        cue.jump_to(-1.0);
        cue.jump_to(1.0);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_cancel_after_firing() {
        let (mut cue, count) = counting_cue(0.5);
        cue.step(1.0);
        assert_eq!(count.get(), 1);

        let control = cue.control();
        control.cancel();
        control.cancel();
        assert!(!control.is_valid());
        assert_eq!(count.get(), 1);

        cue.jump_to(-1.0);
        cue.jump_to(1.0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_zero_speed_never_fires() {
        let (mut cue, count) = counting_cue(0.5);
        cue.set_speed(0.0);
        for _ in 0..3 {
            cue.step(1.0);
        }
        assert!(cue.forward());
        assert_eq!(cue.time(), -0.5);
        assert_eq!(count.get(), 0);
        assert!(!cue.is_finished());
    }

    #[test]
    fn test_control_outlives_cue() {
        let (cue, _count) = counting_cue(0.5);
        let control = cue.control();
        drop(cue);
        assert!(control.is_valid());
        control.cancel();
        assert!(!control.is_valid());
    }
}
