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

use std::time::{Duration, Instant};

use crate::event::EventId;

/// Mutable state of one logical clock.
///
/// Each element lives behind its own mutex inside [`FrameClock`], so
/// independent clocks update without contending on a registry-wide lock.
///
/// [`FrameClock`]: super::FrameClock
#[derive(Debug, Clone)]
pub(super) struct ClockState {
    /// Poll point of the most recent firing.
    pub fire_point: Instant,
    /// Poll point of the firing before that; `fire_point - prev_fire_point`
    /// is the span of the last completed period.
    pub prev_fire_point: Instant,
    /// Creation or last reset point; absolute elapsed counts from here.
    pub origin: Instant,
    /// Set while paused, capturing the instant the pause began. Resume
    /// folds the frozen span back into the other instants.
    pub paused_at: Option<Instant>,
    /// Accumulated scale-weighted time across all firings.
    pub relative_total: Duration,
    /// Minimum real-time span between firings.
    pub period: Duration,
    /// Time-scale factor applied to relative measurements.
    pub scale: f64,
    /// Events ticked whenever this clock fires.
    pub events: Vec<EventId>,
}

impl ClockState {
    pub fn new(period: Duration) -> Self {
        let now = Instant::now();
        Self {
            fire_point: now,
            prev_fire_point: now,
            origin: now,
            paused_at: None,
            relative_total: Duration::ZERO,
            period,
            scale: 1.0,
            events: Vec::new(),
        }
    }

    /// An independently paced copy: tunables and the accumulated relative
    /// total survive, every instant restarts at now, and the attached
    /// event list starts empty.
    pub fn duplicate(&self) -> Self {
        let now = Instant::now();
        Self {
            fire_point: now,
            prev_fire_point: now,
            origin: now,
            paused_at: self.paused_at.map(|_| now),
            relative_total: self.relative_total,
            period: self.period,
            scale: self.scale,
            events: Vec::new(),
        }
    }

    /// The instant measurements are taken against: frozen at the pause
    /// point while paused, `now` otherwise.
    pub fn effective_now(&self, now: Instant) -> Instant {
        self.paused_at.unwrap_or(now)
    }
}
