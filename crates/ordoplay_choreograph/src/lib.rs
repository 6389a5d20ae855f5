// SPDX-License-Identifier: MIT OR Apache-2.0
//! Time-stepping core for `OrdoPlay` choreography.
//!
//! This crate drives animation and scheduled callbacks along a shared,
//! bidirectional time axis:
//! - Motion groups that advance child items in lockstep
//! - Cues that fire a callback once when their instant is crossed
//! - Leaf motions that sample a value source into an output
//! - A timeline that owns top-level items and reclaims finished ones
//!
//! ## Architecture
//!
//! Every item implements [`TimelineItem`], which provides `step`, `jump_to`,
//! `is_finished` and `reset_time` on top of a [`Clock`] and a per-item
//! `update` hook. Boundary callbacks fire exactly once per crossing of the
//! item's start or end in the direction given by the sign of its speed.

mod callback;
pub mod clock;
pub mod cue;
pub mod group;
pub mod keyframe;
pub mod motion;
pub mod settings;
pub mod timeline;

pub use clock::{Clock, Time, TimelineItem};
pub use cue::{Control, Cue};
pub use group::{GroupCallback, MotionGroup};
pub use keyframe::{Channel, InterpolationMode, Keyframe, Lerp};
pub use motion::{Motion, MotionCallback, MotionSource};
pub use settings::{SettingsError, TimelineSettings};
pub use timeline::{ItemId, PendingItems, Timeline};
