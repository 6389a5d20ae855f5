// SPDX-License-Identifier: MIT OR Apache-2.0
//! Container that owns top-level timeline items and reclaims finished ones.

use crate::clock::{Time, TimelineItem};
use crate::cue::{Control, Cue};
use crate::settings::TimelineSettings;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Unique identifier for a timeline item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    /// Create a new random item ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

/// Items waiting to join a timeline
///
/// Callbacks cannot reach the timeline that is stepping them, so they capture
/// a clone of this queue instead. Queued items join after the current step or
/// jump has finished.
#[derive(Clone, Default)]
pub struct PendingItems {
    queue: Rc<RefCell<Vec<(ItemId, Box<dyn TimelineItem>)>>>,
}

impl PendingItems {
    /// Queue an item
    pub fn add(&self, item: impl TimelineItem + 'static) -> ItemId {
        let id = ItemId::new();
        self.queue.borrow_mut().push((id, Box::new(item)));
        id
    }

    /// Queue a cue firing `delay` after it joins
    ///
    /// The cue starts at `-delay` and fires when stepping carries it to zero.
    /// With a zero delay it is already at zero, so it never fires on a
    /// forward step and is dropped as finished after the next step.
    pub fn cue(&self, cue: impl FnMut() + 'static, delay: Time) -> (ItemId, Control) {
        let cue = Cue::new(cue, delay);
        let control = cue.control();
        (self.add(cue), control)
    }

    /// Number of queued items
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Nothing queued
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    fn drain(&self) -> Vec<(ItemId, Box<dyn TimelineItem>)> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }
}

impl fmt::Debug for PendingItems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingItems").field("len", &self.len()).finish()
    }
}

struct Entry {
    item: Box<dyn TimelineItem>,
    /// Timeline time when the item joined
    origin: Time,
}

/// Owner of top-level timeline items
///
/// Stepping the timeline steps every item by the same delta, in insertion
/// order. Afterwards invalid items are dropped, as are finished items whose
/// `remove_on_finish` flag is set (unless the settings disable removal).
pub struct Timeline {
    time: Time,
    settings: TimelineSettings,
    entries: IndexMap<ItemId, Entry>,
    pending: PendingItems,
}

impl Timeline {
    /// Create an empty timeline with default settings
    pub fn new() -> Self {
        Self::with_settings(TimelineSettings::default())
    }

    /// Create an empty timeline
    pub fn with_settings(settings: TimelineSettings) -> Self {
        Self {
            time: 0.0,
            settings,
            entries: IndexMap::new(),
            pending: PendingItems::default(),
        }
    }

    /// Current timeline time
    pub fn time(&self) -> Time {
        self.time
    }

    /// Playback settings
    pub fn settings(&self) -> &TimelineSettings {
        &self.settings
    }

    /// Mutable playback settings
    pub fn settings_mut(&mut self) -> &mut TimelineSettings {
        &mut self.settings
    }

    /// Queue for adding items from inside callbacks
    pub fn pending(&self) -> PendingItems {
        self.pending.clone()
    }

    /// Add an item
    pub fn add(&mut self, item: impl TimelineItem + 'static) -> ItemId {
        self.add_boxed(Box::new(item))
    }

    /// Add an already boxed item
    pub fn add_boxed(&mut self, item: Box<dyn TimelineItem>) -> ItemId {
        let id = ItemId::new();
        self.insert(id, item);
        id
    }

    /// Add a cue firing `delay` from now
    ///
    /// The cue starts at `-delay` and fires when stepping carries it to zero.
    /// With a zero delay it is already at zero, so it never fires on a
    /// forward step and is dropped as finished after the next step.
    pub fn cue(&mut self, cue: impl FnMut() + 'static, delay: Time) -> (ItemId, Control) {
        let cue = Cue::new(cue, delay);
        let control = cue.control();
        (self.add(cue), control)
    }

    /// Remove an item, keeping the order of the rest
    pub fn remove(&mut self, id: ItemId) -> Option<Box<dyn TimelineItem>> {
        self.entries.shift_remove(&id).map(|entry| entry.item)
    }

    /// Get an item
    pub fn get(&self, id: ItemId) -> Option<&(dyn TimelineItem + 'static)> {
        self.entries.get(&id).map(|entry| entry.item.as_ref())
    }

    /// Get a mutable item
    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut (dyn TimelineItem + 'static)> {
        self.entries.get_mut(&id).map(|entry| entry.item.as_mut())
    }

    /// Whether an item is still owned by the timeline
    pub fn contains(&self, id: ItemId) -> bool {
        self.entries.contains_key(&id)
    }

    /// All items in insertion order
    pub fn items(&self) -> impl Iterator<Item = (ItemId, &(dyn TimelineItem + 'static))> {
        self.entries.iter().map(|(id, entry)| (*id, entry.item.as_ref()))
    }

    /// Item count
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No items
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every item, including queued ones
    pub fn clear(&mut self) {
        self.entries.clear();
        self.pending.drain();
    }

    /// Advance every item by `dt` scaled by the timeline speed
    pub fn step(&mut self, dt: Time) {
        let dt = dt * self.settings.speed;
        self.time += dt;
        for entry in self.entries.values_mut() {
            entry.item.step(dt);
        }
        self.reclaim();
    }

    /// Advance by one frame at the configured frame rate
    pub fn step_frame(&mut self) {
        self.step(self.settings.frame_duration());
    }

    /// Seek to `time`
    ///
    /// Each item jumps to the time elapsed since it joined, scaled by its own
    /// speed, minus its start delay. This is where stepping would have put it
    /// had its speed stayed constant.
    pub fn jump_to(&mut self, time: Time) {
        self.time = time;
        for entry in self.entries.values_mut() {
            let item = &mut entry.item;
            let local = (time - entry.origin) * item.speed() - item.start_time();
            item.jump_to(local);
        }
        self.reclaim();
    }

    fn insert(&mut self, id: ItemId, item: Box<dyn TimelineItem>) {
        tracing::debug!(?id, time = self.time, "timeline item added");
        self.entries.insert(
            id,
            Entry {
                item,
                origin: self.time,
            },
        );
    }

    fn reclaim(&mut self) {
        let remove_finished = self.settings.remove_on_finish;
        self.entries.retain(|id, entry| {
            let item = &entry.item;
            let keep = item.is_valid()
                && !(remove_finished && item.remove_on_finish() && item.is_finished());
            if !keep {
                tracing::debug!(?id, valid = item.is_valid(), "timeline item removed");
            }
            keep
        });

        for (id, item) in self.pending.drain() {
            self.insert(id, item);
        }
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("time", &self.time)
            .field("settings", &self.settings)
            .field("items", &self.entries.len())
            .field("pending", &self.pending)
            .finish()
    }
}
