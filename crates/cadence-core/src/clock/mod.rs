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

//! A polling frame clock keyed by caller-chosen handles.
//!
//! [`FrameClock`] manages any number of independent logical clocks. The
//! clock has no thread of its own: the caller's loop polls
//! [`update`](FrameClock::update), and whenever a clock's period has
//! elapsed the clock fires, accumulating scale-weighted time and fanning
//! an elapsed-time tick out to every event attached to it.
//!
//! Clocks support pause/resume (paused time counts toward nothing),
//! time-scaling, duplication, and absolute/relative elapsed queries.

mod element;
mod error;
mod registry;

pub use self::error::{ClockError, ClockResult};
pub use self::registry::{FrameClock, MAX_RATE_HZ, MAX_SCALE, MIN_RATE_HZ, MIN_SCALE};
