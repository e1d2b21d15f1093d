// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;
use std::time::Duration;

/// Identifies a registered event.
///
/// Ids are handed out by [`EventRegistry::register`] from a monotonically
/// increasing counter starting at 1. Id 0 is never issued and ids are never
/// reused within a process lifetime.
///
/// [`EventRegistry::register`]: super::EventRegistry::register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub(crate) u64);

impl EventId {
    /// Returns the raw numeric id.
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event#{}", self.0)
    }
}

/// A polymorphic callback target for event notifications.
///
/// Reactions run on a dispatch worker thread, never on the thread that
/// triggered the event, so implementors must use interior mutability for
/// any state they touch.
///
/// The registry holds subscriptions as [`Weak`](std::sync::Weak)
/// references: subscribing never extends a listener's lifetime, and a
/// listener whose owner dropped its last [`Arc`](std::sync::Arc) is lazily
/// purged on the next trigger scan without being invoked.
pub trait Listener: Send + Sync {
    /// Reacts to a discrete trigger of `event`.
    fn on_event(&self, event: EventId);

    /// Reacts to a clock-driven tick of `event`.
    ///
    /// `elapsed` is the scale-weighted interval covered by the tick.
    fn on_event_elapsed(&self, event: EventId, elapsed: Duration);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_id_display_and_raw() {
        let id = EventId(7);
        assert_eq!(id.raw(), 7);
        assert_eq!(id.to_string(), "event#7");
    }
}
