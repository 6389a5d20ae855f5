// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframed channels usable as motion sources.

use crate::clock::Time;
use crate::motion::MotionSource;
use serde::{Deserialize, Serialize};

/// Values that can be blended linearly
pub trait Lerp: Clone {
    /// Blend from `self` toward `other` by `t` in `[0, 1]`
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl<const N: usize> Lerp for [f32; N] {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        std::array::from_fn(|i| self[i].lerp(&other[i], t))
    }
}

/// Interpolation mode between a keyframe and the next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InterpolationMode {
    /// Hold the value until the next keyframe
    Constant,
    /// Linear interpolation
    #[default]
    Linear,
    /// Quadratic ease in
    EaseIn,
    /// Quadratic ease out
    EaseOut,
    /// Quadratic ease in and out
    EaseInOut,
}

impl InterpolationMode {
    /// Map linear progress `t` onto this mode's curve
    pub fn ease(self, t: f32) -> f32 {
        match self {
            Self::Constant => 0.0,
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
        }
    }
}

/// A value pinned to a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<T> {
    /// Time of the keyframe
    pub time: Time,
    /// Value at this keyframe
    pub value: T,
    /// Interpolation toward the next keyframe
    pub interpolation: InterpolationMode,
}

impl<T> Keyframe<T> {
    /// Create a linearly interpolated keyframe
    pub fn new(time: Time, value: T) -> Self {
        Self {
            time,
            value,
            interpolation: InterpolationMode::Linear,
        }
    }

    /// Set interpolation mode
    pub fn with_interpolation(mut self, mode: InterpolationMode) -> Self {
        self.interpolation = mode;
        self
    }
}

/// Time-ordered keyframes of one value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel<T> {
    keyframes: Vec<Keyframe<T>>,
}

impl<T> Channel<T> {
    /// Create an empty channel
    pub fn new() -> Self {
        Self {
            keyframes: Vec::new(),
        }
    }

    /// Add a keyframe, keeping time order
    pub fn add_keyframe(&mut self, keyframe: Keyframe<T>) {
        let idx = self.keyframes.partition_point(|k| k.time <= keyframe.time);
        self.keyframes.insert(idx, keyframe);
    }

    /// Builder form of [`Channel::add_keyframe`]
    pub fn with_keyframe(mut self, time: Time, value: T) -> Self {
        self.add_keyframe(Keyframe::new(time, value));
        self
    }

    /// All keyframes in time order
    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.keyframes
    }

    /// Keyframe count
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// No keyframes
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Time of the last keyframe
    pub fn end(&self) -> Time {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }
}

impl<T: Lerp> Channel<T> {
    /// Evaluate the channel; `None` when it has no keyframes
    pub fn sample(&self, time: Time) -> Option<T> {
        // First keyframe strictly after `time`; an exact hit lands on its own value
        let next_idx = self.keyframes.iter().position(|k| k.time > time);

        match next_idx {
            None => self.keyframes.last().map(|k| k.value.clone()),
            Some(0) => self.keyframes.first().map(|k| k.value.clone()),
            Some(idx) => {
                let a = &self.keyframes[idx - 1];
                let b = &self.keyframes[idx];
                let t = a.interpolation.ease((time - a.time) / (b.time - a.time));
                Some(a.value.lerp(&b.value, t))
            }
        }
    }
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<Keyframe<T>> for Channel<T> {
    fn from_iter<I: IntoIterator<Item = Keyframe<T>>>(iter: I) -> Self {
        let mut channel = Self::new();
        for keyframe in iter {
            channel.add_keyframe(keyframe);
        }
        channel
    }
}

impl<T: Lerp + Default> MotionSource<T> for Channel<T> {
    fn value_at(&self, time: Time) -> T {
        self.sample(time).unwrap_or_default()
    }

    fn duration(&self) -> Time {
        self.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyframes_stay_sorted() {
        let channel: Channel<f32> = [
            Keyframe::new(2.0, 20.0),
            Keyframe::new(0.0, 0.0),
            Keyframe::new(1.0, 10.0),
        ]
        .into_iter()
        .collect();

        let times: Vec<Time> = channel.keyframes().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0]);
        assert_eq!(channel.duration(), 2.0);
    }

    #[test]
    fn test_linear_sampling() {
        let channel = Channel::new().with_keyframe(0.0, 0.0).with_keyframe(2.0, 10.0);
        assert_eq!(channel.sample(-1.0), Some(0.0));
        assert_eq!(channel.sample(0.5), Some(2.5));
        assert_eq!(channel.sample(3.0), Some(10.0));
    }

    #[test]
    fn test_constant_holds_value() {
        let mut channel = Channel::new();
        channel.add_keyframe(Keyframe::new(0.0, 1.0).with_interpolation(InterpolationMode::Constant));
        channel.add_keyframe(Keyframe::new(1.0, 5.0));
        assert_eq!(channel.sample(0.99), Some(1.0));
        assert_eq!(channel.sample(1.0), Some(5.0));
    }

    #[test]
    fn test_exact_hits_return_keyframe_values() {
        let channel = Channel::new()
            .with_keyframe(0.0, 0.0_f32)
            .with_keyframe(1.0, 10.0)
            .with_keyframe(1.0, 20.0)
            .with_keyframe(2.0, 30.0);
        assert_eq!(channel.sample(0.0), Some(0.0));
        assert_eq!(channel.sample(1.0), Some(20.0));
        assert_eq!(channel.sample(1.5), Some(25.0));
        assert_eq!(channel.sample(2.0), Some(30.0));
    }

    #[test]
    fn test_constant_segment_motion_reaches_last_value() {
        use crate::clock::TimelineItem;
        use crate::motion::Motion;
        use std::cell::Cell;
        use std::rc::Rc;

        let mut channel = Channel::new();
        channel.add_keyframe(Keyframe::new(0.0, 1.0_f32).with_interpolation(InterpolationMode::Constant));
        channel.add_keyframe(Keyframe::new(1.0, 5.0));

        let written = Rc::new(Cell::new(0.0));
        let sink = Rc::clone(&written);
        let mut motion = Motion::new(channel, move |v| sink.set(v));
        motion.step(0.5);
        assert_eq!(written.get(), 1.0);
        motion.step(1.5);
        assert_eq!(written.get(), 5.0);
    }

    #[test]
    fn test_ease_curves_hit_endpoints() {
        for mode in [
            InterpolationMode::Linear,
            InterpolationMode::EaseIn,
            InterpolationMode::EaseOut,
            InterpolationMode::EaseInOut,
        ] {
            assert_eq!(mode.ease(0.0), 0.0);
            assert_eq!(mode.ease(1.0), 1.0);
        }
        assert_eq!(InterpolationMode::EaseIn.ease(0.5), 0.25);
        assert_eq!(InterpolationMode::EaseOut.ease(0.5), 0.75);
        assert_eq!(InterpolationMode::EaseInOut.ease(0.5), 0.5);
    }

    #[test]
    fn test_array_lerp() {
        let a = [0.0, 10.0, -4.0];
        let b = [1.0, 20.0, 4.0];
        assert_eq!(a.lerp(&b, 0.5), [0.5, 15.0, 0.0]);
    }

    #[test]
    fn test_empty_channel_source() {
        let channel: Channel<[f32; 2]> = Channel::new();
        assert_eq!(channel.sample(1.0), None);
        assert_eq!(channel.value_at(1.0), [0.0, 0.0]);
        assert_eq!(MotionSource::duration(&channel), 0.0);
    }

    #[test]
    fn test_ron_round_trip() {
        let channel = Channel::new().with_keyframe(0.0, 1.0_f32).with_keyframe(1.0, 2.0);
        let text = ron::to_string(&channel).unwrap();
        let loaded: Channel<f32> = ron::from_str(&text).unwrap();
        assert_eq!(loaded, channel);
    }
}
