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

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::event::{EventId, Listener};

use super::queue::MessageQueue;

/// One unit of asynchronous dispatch work.
///
/// A single composite record carries everything the worker needs, so
/// concurrent producers can never tear a posting apart: the event id, the
/// listener to wake, and the elapsed payload for tick deliveries.
pub struct Envelope {
    /// The event that fired.
    pub event: EventId,
    /// The listener to notify; already resolved to a live reference by
    /// the trigger scan.
    pub listener: Arc<dyn Listener>,
    /// `Some` for clock-driven ticks, `None` for discrete wakes. Selects
    /// which reaction the worker invokes.
    pub elapsed: Option<Duration>,
}

impl Envelope {
    fn deliver(self) {
        match self.elapsed {
            Some(elapsed) => self.listener.on_event_elapsed(self.event, elapsed),
            None => self.listener.on_event(self.event),
        }
    }
}

/// A dedicated thread that invokes listener reactions.
///
/// The worker decouples trigger time from invocation time: producers
/// [`post`] envelopes and return immediately, while the worker thread
/// blocks on its [`MessageQueue`] and delivers envelopes one at a time in
/// FIFO order. Listener code therefore runs concurrently with whatever
/// thread triggered the event, but never concurrently with itself on the
/// same worker.
///
/// Dropping the worker shuts it down deterministically: the queue's only
/// producer handle goes away, the blocked pop wakes up, pending envelopes
/// drain, and the thread is joined.
///
/// [`post`]: DispatchWorker::post
pub struct DispatchWorker {
    queue: Option<MessageQueue<Envelope>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl DispatchWorker {
    /// Spawns a worker thread named `cadence-dispatch-{name}`.
    ///
    /// # Panics
    ///
    /// Panics if the OS refuses to spawn the thread; workers exist only
    /// during registry construction and a process that cannot spawn its
    /// dispatch threads cannot run at all.
    #[must_use]
    pub fn spawn(name: &str) -> Self {
        let queue = MessageQueue::new();
        let receiver = queue.receiver();
        let thread_name = format!("cadence-dispatch-{name}");
        let handle = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || Self::run(receiver))
            .expect("failed to spawn dispatch worker thread");
        log::debug!("{thread_name}: worker started");
        Self {
            queue: Some(queue),
            handle: Some(handle),
        }
    }

    /// Enqueues one unit of work. Fire-and-forget; never blocks on the
    /// delivery itself.
    pub fn post(&self, envelope: Envelope) {
        if let Some(queue) = &self.queue {
            queue.push(envelope);
        }
    }

    fn run(receiver: flume::Receiver<Envelope>) {
        while let Ok(envelope) = receiver.recv() {
            envelope.deliver();
        }
        log::debug!("dispatch worker: queue disconnected, exiting");
    }
}

impl Drop for DispatchWorker {
    fn drop(&mut self) {
        // Dropping the queue drops its producer side and wakes the worker.
        self.queue.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("dispatch worker thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventId;

    struct Probe {
        sender: flume::Sender<(EventId, Option<Duration>)>,
    }

    impl Listener for Probe {
        fn on_event(&self, event: EventId) {
            self.sender.send((event, None)).ok();
        }

        fn on_event_elapsed(&self, event: EventId, elapsed: Duration) {
            self.sender.send((event, Some(elapsed))).ok();
        }
    }

    fn probe() -> (Arc<dyn Listener>, flume::Receiver<(EventId, Option<Duration>)>) {
        let (sender, receiver) = flume::unbounded();
        (Arc::new(Probe { sender }), receiver)
    }

    #[test]
    fn delivers_in_fifo_order() {
        let worker = DispatchWorker::spawn("fifo-test");
        let (listener, deliveries) = probe();

        for id in 1..=3 {
            worker.post(Envelope {
                event: EventId(id),
                listener: Arc::clone(&listener),
                elapsed: None,
            });
        }

        for expected in 1..=3 {
            let (event, elapsed) = deliveries
                .recv_timeout(Duration::from_secs(1))
                .expect("delivery timed out");
            assert_eq!(event, EventId(expected));
            assert_eq!(elapsed, None);
        }
    }

    #[test]
    fn routes_elapsed_payload_to_tick_reaction() {
        let worker = DispatchWorker::spawn("tick-test");
        let (listener, deliveries) = probe();

        worker.post(Envelope {
            event: EventId(9),
            listener,
            elapsed: Some(Duration::from_millis(100)),
        });

        let (event, elapsed) = deliveries
            .recv_timeout(Duration::from_secs(1))
            .expect("delivery timed out");
        assert_eq!(event, EventId(9));
        assert_eq!(elapsed, Some(Duration::from_millis(100)));
    }

    #[test]
    fn drop_drains_pending_work_then_joins() {
        let worker = DispatchWorker::spawn("drain-test");
        let (listener, deliveries) = probe();

        for id in 1..=5 {
            worker.post(Envelope {
                event: EventId(id),
                listener: Arc::clone(&listener),
                elapsed: None,
            });
        }

        // Drop joins the thread, so every posted envelope must already be
        // delivered once this returns.
        drop(worker);
        let received: Vec<_> = deliveries.try_iter().collect();
        assert_eq!(received.len(), 5);
    }

    #[test]
    fn drop_wakes_an_idle_worker() {
        let worker = DispatchWorker::spawn("idle-test");
        // The worker is blocked on an empty queue; drop must still return
        // rather than waiting for a message that never comes.
        drop(worker);
    }
}
