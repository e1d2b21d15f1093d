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

//! Observer-pattern event dispatch with asynchronous delivery.
//!
//! The [`EventRegistry`] is the single source of truth mapping event ids
//! to interested [`Listener`]s. Subscriptions are weak: the registry never
//! extends a listener's lifetime, and entries whose owner has gone away
//! are lazily purged during the next trigger scan.
//!
//! Triggering is fire-and-forget. The registry resolves the live
//! subscribers, posts one work item per subscription to a dispatch worker
//! thread, and returns; the listener reactions run later, off the calling
//! thread.

mod error;
mod listener;
mod registry;

pub use self::error::{EventError, EventResult};
pub use self::listener::{EventId, Listener};
pub use self::registry::EventRegistry;
