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

//! Error types for the frame clock subsystem.

use std::fmt;

use crate::event::EventId;

/// A recoverable condition reported by [`FrameClock`] operations.
///
/// Rejected operations leave the clock's prior state untouched.
///
/// [`FrameClock`]: super::FrameClock
#[derive(Debug, Clone, PartialEq)]
pub enum ClockError {
    /// No clock is registered under the given key.
    ClockNotFound(String),
    /// A clock already exists under the given key.
    ClockExists(String),
    /// The requested rate lies outside the accepted bounds.
    RateOutOfRange(f64),
    /// The requested time-scale factor lies outside the accepted bounds.
    ScaleOutOfRange(f64),
    /// The event to attach has no subscriptions in the event registry.
    EventNotFound(EventId),
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockError::ClockNotFound(key) => write!(f, "clock {key} not found"),
            ClockError::ClockExists(key) => write!(f, "clock {key} already exists"),
            ClockError::RateOutOfRange(rate) => {
                write!(f, "rate {rate} Hz is outside the accepted bounds")
            }
            ClockError::ScaleOutOfRange(scale) => {
                write!(f, "scale {scale} is outside the accepted bounds")
            }
            ClockError::EventNotFound(event) => {
                write!(f, "{event} has no subscriptions to tick")
            }
        }
    }
}

impl std::error::Error for ClockError {}

/// Convenience alias for fallible [`FrameClock`] operations.
///
/// [`FrameClock`]: super::FrameClock
pub type ClockResult<T> = Result<T, ClockError>;
