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

//! # Cadence Core
//!
//! A small engine toolkit built around two cooperating pieces:
//!
//! - an observer-pattern **event dispatch system** ([`EventRegistry`]):
//!   events are opaque ids, listeners subscribe through weak references,
//!   and triggering hands the actual callbacks off to dedicated worker
//!   threads so the triggering thread never runs listener code;
//! - a pull-based **frame clock** ([`FrameClock`]): logical clocks polled
//!   by the caller's own loop that fire elapsed-time ticks into the event
//!   registry whenever their update period has passed.
//!
//! Both registries are plain, explicitly constructed values. There is no
//! global instance; the application entry point owns them and shares them
//! via [`Arc`](std::sync::Arc).

#![warn(missing_docs)]

pub mod clock;
pub mod dispatch;
pub mod event;

pub use clock::{ClockError, ClockResult, FrameClock};
pub use dispatch::{DispatchWorker, Envelope, MessageQueue};
pub use event::{EventError, EventId, EventRegistry, EventResult, Listener};
