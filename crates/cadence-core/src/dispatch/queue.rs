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

/// A generic, thread-safe FIFO with a blocking pop.
///
/// Thin wrapper over an unbounded `flume` channel. Producers never block
/// beyond brief channel internals; consumers block in [`pop`] until an
/// item arrives or every producer handle is gone.
///
/// The disconnect behavior is deliberate: once the queue value itself and
/// all handles returned by [`sender`] are dropped, a blocked [`pop`] wakes
/// up and returns `None` after draining pending items. That makes the
/// blocking wait cancellable, so a consumer loop shuts down
/// deterministically without sentinel messages.
///
/// [`pop`]: MessageQueue::pop
/// [`sender`]: MessageQueue::sender
#[derive(Debug)]
pub struct MessageQueue<T> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T> MessageQueue<T> {
    /// Creates a new, empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    /// Enqueues a message.
    ///
    /// Logs an error instead of panicking if every consumer handle is
    /// already gone; a queue without consumers is a teardown-order issue,
    /// not a reason to take the producer down.
    pub fn push(&self, message: T) {
        if self.sender.send(message).is_err() {
            log::error!("MessageQueue: push failed, all consumers disconnected");
        }
    }

    /// Blocks until a message is available and dequeues it.
    ///
    /// Returns `None` once the queue is disconnected (all producer handles
    /// dropped) and every pending message has been drained.
    #[must_use]
    pub fn pop(&self) -> Option<T> {
        self.receiver.recv().ok()
    }

    /// Dequeues a message if one is immediately available.
    #[must_use]
    pub fn try_pop(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Returns the number of queued messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if no messages are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Returns an additional producer handle for this queue.
    #[must_use]
    pub fn sender(&self) -> flume::Sender<T> {
        self.sender.clone()
    }

    /// Returns an additional consumer handle for this queue.
    ///
    /// Consumer handles compete for messages; each message is delivered
    /// exactly once.
    #[must_use]
    pub fn receiver(&self) -> flume::Receiver<T> {
        self.receiver.clone()
    }
}

impl<T> Default for MessageQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{thread, time::Duration};

    #[test]
    fn queue_starts_empty() {
        let queue = MessageQueue::<u32>::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn push_then_pop_preserves_fifo_order() {
        let queue = MessageQueue::new();
        queue.push(1);
        queue.push(2);
        queue.push(3);

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
        assert!(queue.is_empty());
    }

    #[test]
    fn pop_blocks_until_a_producer_pushes() {
        let queue = MessageQueue::new();
        let sender = queue.sender();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            sender.send(42).expect("send from thread failed");
        });

        // This pop has nothing to take yet; it must wait for the thread.
        assert_eq!(queue.pop(), Some(42));
        handle.join().expect("thread join failed");
    }

    #[test]
    fn pop_returns_none_once_producers_are_gone() {
        let queue = MessageQueue::new();
        queue.push(7);
        let consumer = queue.receiver();
        drop(queue);

        // Pending items drain first, then the disconnect surfaces.
        assert_eq!(consumer.recv().ok(), Some(7));
        assert!(consumer.recv().is_err());
    }

    #[test]
    fn multiple_producers_share_one_queue() {
        let queue = MessageQueue::new();
        let sender1 = queue.sender();
        let sender2 = queue.sender();

        sender1.send("a").expect("send 1 failed");
        sender2.send("b").expect("send 2 failed");

        let first = queue.pop();
        let second = queue.pop();
        assert!(matches!((first, second), (Some("a"), Some("b")) | (Some("b"), Some("a"))));
    }
}
