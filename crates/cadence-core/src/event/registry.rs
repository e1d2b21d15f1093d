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

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use crate::dispatch::{DispatchWorker, Envelope};

use super::error::{EventError, EventResult};
use super::listener::{EventId, Listener};

/// An event's pre-process gate, evaluated before every dispatch of that
/// event. A `false` return silently short-circuits the trigger.
type Gate = Arc<dyn Fn() -> bool + Send + Sync>;

/// The subscription table: the id → listener multimap and the per-event
/// gate map, mutated together under one lock.
#[derive(Default)]
struct SubscriptionTable {
    subscribers: HashMap<EventId, Vec<Weak<dyn Listener>>>,
    gates: HashMap<EventId, Gate>,
}

/// The single source of truth mapping event identities to interested
/// listeners, and the algorithm that turns "this event fired" into "these
/// listeners get notified, asynchronously, once per live subscription".
///
/// # Design
///
/// - **Explicit construction.** There is no global instance; the
///   application owns the registry and shares it via `Arc`. Tests can run
///   any number of independent registries side by side.
/// - **Weak subscriptions.** The table stores `Weak<dyn Listener>`; a
///   listener whose owner released its last `Arc` is detected during the
///   next trigger scan and purged in place, never invoked.
/// - **Asynchronous delivery.** The registry owns two
///   [`DispatchWorker`]s, one for discrete wakes and one for elapsed-time
///   ticks. [`trigger`] returns once the work is posted, not once it is
///   handled; within one worker, deliveries stay FIFO.
/// - **Typed results.** Every fallible operation logs its diagnostic at
///   the boundary and returns an [`EventError`], so callers can tell "no
///   one cared" from a usage bug without reading logs.
///
/// Dropping the registry shuts both workers down deterministically after
/// draining whatever was already posted.
///
/// [`trigger`]: EventRegistry::trigger
pub struct EventRegistry {
    table: Mutex<SubscriptionTable>,
    /// Reusable trigger-time staging buffer. Separate lock from the table
    /// so subscription churn and trigger scans serialize independently.
    staging: Mutex<Vec<Arc<dyn Listener>>>,
    next_id: AtomicU64,
    wake_worker: DispatchWorker,
    tick_worker: DispatchWorker,
}

impl EventRegistry {
    /// Creates a registry and spawns its two dispatch worker threads.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: Mutex::new(SubscriptionTable::default()),
            staging: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            wake_worker: DispatchWorker::spawn("wake"),
            tick_worker: DispatchWorker::spawn("tick"),
        }
    }

    /// Registers a new event and returns its id.
    ///
    /// Ids are sequential from 1 and never reused. The event's gate
    /// defaults to always-proceed.
    pub fn register(&self) -> EventId {
        EventId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers a new event whose dispatch is conditional on `gate`.
    ///
    /// The gate runs on the triggering thread, before any listener is
    /// staged; returning `false` aborts the trigger silently. Gates are
    /// evaluated outside the registry's locks, so they may call back into
    /// the registry if they need to.
    pub fn register_gated<F>(&self, gate: F) -> EventId
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        let event = self.register();
        self.table
            .lock()
            .unwrap()
            .gates
            .insert(event, Arc::new(gate));
        event
    }

    /// Registers `count` events at once and returns their ids in order.
    pub fn register_many(&self, count: usize) -> Vec<EventId> {
        (0..count).map(|_| self.register()).collect()
    }

    /// Subscribes `listener` to `event`.
    ///
    /// The registration is weak and carries no uniqueness constraint: the
    /// same listener may subscribe multiple times and will be notified
    /// once per subscription.
    pub fn subscribe(&self, event: EventId, listener: &Arc<dyn Listener>) {
        let mut table = self.table.lock().unwrap();
        table
            .subscribers
            .entry(event)
            .or_default()
            .push(Arc::downgrade(listener));
        log::trace!("{event}: listener subscribed");
    }

    /// Subscribes `listener` to every event in `events`.
    pub fn subscribe_all(&self, events: &[EventId], listener: &Arc<dyn Listener>) {
        let mut table = self.table.lock().unwrap();
        for &event in events {
            table
                .subscribers
                .entry(event)
                .or_default()
                .push(Arc::downgrade(listener));
        }
    }

    /// Removes exactly one live subscription of `listener` under `event`.
    pub fn unsubscribe(&self, event: EventId, listener: &Arc<dyn Listener>) -> EventResult<()> {
        let mut table = self.table.lock().unwrap();
        let Some(entries) = table.subscribers.get_mut(&event) else {
            log::warn!("unsubscribe: {event} has no subscriptions");
            return Err(EventError::EventNotFound(event));
        };
        let position = entries
            .iter()
            .position(|weak| weak.upgrade().map_or(false, |l| Arc::ptr_eq(&l, listener)));
        match position {
            Some(index) => {
                entries.remove(index);
                if entries.is_empty() {
                    table.subscribers.remove(&event);
                }
                Ok(())
            }
            None => {
                log::warn!("unsubscribe: listener not found under {event}");
                Err(EventError::ListenerNotFound(event))
            }
        }
    }

    /// Drops every subscription under `event`.
    ///
    /// Typically used on teardown, e.g. an end-of-game cleanup that
    /// retires a whole trigger point at once.
    pub fn unsubscribe_event(&self, event: EventId) -> EventResult<()> {
        let mut table = self.table.lock().unwrap();
        if table.subscribers.remove(&event).is_none() {
            log::warn!("unsubscribe_event: {event} has no subscriptions");
            return Err(EventError::EventNotFound(event));
        }
        Ok(())
    }

    /// Removes every subscription that resolves to `listener`.
    ///
    /// Full-table scan; fine for the rare teardown path it exists for,
    /// not something to call per frame.
    pub fn unsubscribe_listener(&self, listener: &Arc<dyn Listener>) -> EventResult<()> {
        let mut table = self.table.lock().unwrap();
        let mut matched = false;
        table.subscribers.retain(|_, entries| {
            entries.retain(|weak| {
                let hit = weak.upgrade().map_or(false, |l| Arc::ptr_eq(&l, listener));
                if hit {
                    matched = true;
                }
                !hit
            });
            !entries.is_empty()
        });
        if matched {
            Ok(())
        } else {
            log::warn!("unsubscribe_listener: listener has no subscriptions");
            Err(EventError::ListenerNotSubscribed)
        }
    }

    /// Returns `true` if `event` currently has at least one subscription
    /// entry. Silent; never logs.
    #[must_use]
    pub fn has_subscribers(&self, event: EventId) -> bool {
        self.table.lock().unwrap().subscribers.contains_key(&event)
    }

    /// Existence check that reports the miss: logs a diagnostic and
    /// returns `false` when `event` has no subscriptions.
    #[must_use]
    pub fn ensure_subscribed(&self, event: EventId) -> bool {
        let present = self.has_subscribers(event);
        if !present {
            log::warn!("ensure_subscribed: {event} has no subscriptions");
        }
        present
    }

    /// Triggers `event`, posting a discrete wake to every live subscriber.
    ///
    /// Fire-and-forget: returns once the work items are posted to the
    /// wake worker, not once listeners have run. Expired subscriptions
    /// encountered during the scan are purged in place.
    pub fn trigger(&self, event: EventId) -> EventResult<()> {
        self.dispatch(event, None)
    }

    /// Triggers `event` with an elapsed-time payload, posting a tick to
    /// every live subscriber.
    ///
    /// This is the entry point the frame clock uses when a clock period
    /// elapses; `elapsed` is the scale-weighted span the tick covers.
    pub fn trigger_elapsed(&self, event: EventId, elapsed: Duration) -> EventResult<()> {
        self.dispatch(event, Some(elapsed))
    }

    fn dispatch(&self, event: EventId, elapsed: Option<Duration>) -> EventResult<()> {
        // Locate the event and clone its gate out of the lock; gates are
        // user code and must not run while the table is held.
        let gate = {
            let table = self.table.lock().unwrap();
            match table.subscribers.get(&event) {
                Some(entries) if !entries.is_empty() => table.gates.get(&event).cloned(),
                _ => {
                    log::warn!("trigger: {event} has no subscriptions");
                    return Err(EventError::EventNotFound(event));
                }
            }
        };
        // A gate veto is the designed short-circuit for conditional
        // events, not an error.
        if let Some(gate) = gate {
            if !gate() {
                log::trace!("{event}: gate vetoed dispatch");
                return Ok(());
            }
        }
        let mut staging = self.staging.lock().unwrap();
        {
            let mut table = self.table.lock().unwrap();
            if let Some(entries) = table.subscribers.get_mut(&event) {
                // Stage live listeners, purge expired entries in place.
                entries.retain(|weak| match weak.upgrade() {
                    Some(listener) => {
                        staging.push(listener);
                        true
                    }
                    None => false,
                });
                if entries.is_empty() {
                    table.subscribers.remove(&event);
                }
            }
        }
        let worker = match elapsed {
            Some(_) => &self.tick_worker,
            None => &self.wake_worker,
        };
        for listener in staging.drain(..) {
            worker.post(Envelope {
                event,
                listener,
                elapsed,
            });
        }
        Ok(())
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}
