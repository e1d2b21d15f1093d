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

//! Asynchronous delivery machinery behind the event registry.
//!
//! Triggering an event only *posts* work; the actual listener reactions
//! run here, on a dedicated [`DispatchWorker`] thread per handler kind
//! (discrete wakes and elapsed-time ticks), each pulling composite
//! [`Envelope`] records off its own [`MessageQueue`] in FIFO order.

mod queue;
mod worker;

pub use self::queue::MessageQueue;
pub use self::worker::{DispatchWorker, Envelope};
