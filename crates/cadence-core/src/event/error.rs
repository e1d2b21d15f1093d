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

//! Error types for the event dispatch subsystem.

use std::fmt;

use super::listener::EventId;

/// A recoverable condition reported by [`EventRegistry`] operations.
///
/// The registry logs each of these at the operation boundary and returns
/// the typed value to the caller, who decides whether absence is a usage
/// bug or an expected no-op. None of them ever aborts the process.
///
/// [`EventRegistry`]: super::EventRegistry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventError {
    /// The event id has no subscriptions in the table.
    EventNotFound(EventId),
    /// The listener is not subscribed under the given event id.
    ListenerNotFound(EventId),
    /// The listener has no subscriptions anywhere in the table.
    ListenerNotSubscribed,
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventError::EventNotFound(event) => {
                write!(f, "{event} has no subscriptions")
            }
            EventError::ListenerNotFound(event) => {
                write!(f, "listener is not subscribed under {event}")
            }
            EventError::ListenerNotSubscribed => {
                write!(f, "listener has no subscriptions")
            }
        }
    }
}

impl std::error::Error for EventError {}

/// Convenience alias for fallible [`EventRegistry`] operations.
///
/// [`EventRegistry`]: super::EventRegistry
pub type EventResult<T> = Result<T, EventError>;
