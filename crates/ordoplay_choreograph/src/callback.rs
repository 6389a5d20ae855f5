// SPDX-License-Identifier: MIT OR Apache-2.0
//! Storage for callbacks that receive their owner by `&mut`.

use std::fmt;

/// Optional callback that can be taken out while it runs
///
/// The owner takes the callback, calls it with `&mut self`, then restores it.
/// If the callback replaced or cleared the slot meanwhile, the restore is
/// skipped so the newer state wins.
pub(crate) struct CallbackSlot<F> {
    callback: Option<F>,
    revision: u64,
}

impl<F> CallbackSlot<F> {
    pub(crate) fn set(&mut self, callback: F) {
        self.callback = Some(callback);
        self.revision = self.revision.wrapping_add(1);
    }

    pub(crate) fn clear(&mut self) {
        self.callback = None;
        self.revision = self.revision.wrapping_add(1);
    }

    pub(crate) fn is_set(&self) -> bool {
        self.callback.is_some()
    }

    pub(crate) fn take(&mut self) -> Option<(F, u64)> {
        self.callback.take().map(|callback| (callback, self.revision))
    }

    pub(crate) fn restore(&mut self, callback: F, revision: u64) {
        if self.revision == revision {
            self.callback = Some(callback);
        }
    }
}

impl<F> Default for CallbackSlot<F> {
    fn default() -> Self {
        Self {
            callback: None,
            revision: 0,
        }
    }
}

impl<F> fmt::Debug for CallbackSlot<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_set() { "Some(..)" } else { "None" })
    }
}
