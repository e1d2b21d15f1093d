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
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use crate::event::{EventId, EventRegistry};

use super::element::ClockState;
use super::error::{ClockError, ClockResult};

/// Lowest accepted clock rate, in firings per second.
pub const MIN_RATE_HZ: f64 = 0.001;
/// Highest accepted clock rate, in firings per second.
pub const MAX_RATE_HZ: f64 = 1000.0;
/// Lowest accepted time-scale factor.
pub const MIN_SCALE: f64 = 0.001;
/// Highest accepted time-scale factor.
pub const MAX_SCALE: f64 = 1000.0;

/// A registry of independent, pull-based logical clocks.
///
/// Clocks are keyed by any hashable, printable handle type — an id, a
/// name, whatever the caller prefers; one generic registry serves both.
/// The registry holds an injected [`EventRegistry`] handle and, whenever
/// a clock fires, calls
/// [`trigger_elapsed`](EventRegistry::trigger_elapsed) for every event
/// attached to that clock.
///
/// There is no internal thread. Whatever thread calls
/// [`update`](FrameClock::update) in its own loop drives the clock; the
/// listener callbacks still run on the event registry's dispatch workers.
///
/// Locking is per element: the key map sits under a read-write lock and
/// each clock's state behind its own mutex, so polling one clock never
/// contends with polling another.
pub struct FrameClock<K = String>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    events: Arc<EventRegistry>,
    clocks: RwLock<HashMap<K, Arc<Mutex<ClockState>>>>,
}

impl<K> FrameClock<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    /// Creates a clock registry that fires ticks into `events`.
    #[must_use]
    pub fn new(events: Arc<EventRegistry>) -> Self {
        Self {
            events,
            clocks: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a new clock under `key`, firing at `rate_hz` updates per
    /// second, running and unscaled.
    pub fn create(&self, key: K, rate_hz: f64) -> ClockResult<()> {
        let period = Self::period_from_rate(rate_hz)?;
        let mut clocks = self.clocks.write().unwrap();
        if clocks.contains_key(&key) {
            log::warn!("create: clock {key:?} already exists");
            return Err(ClockError::ClockExists(format!("{key:?}")));
        }
        clocks.insert(key, Arc::new(Mutex::new(ClockState::new(period))));
        Ok(())
    }

    /// Removes the clock under `key`.
    pub fn erase(&self, key: &K) -> ClockResult<()> {
        let mut clocks = self.clocks.write().unwrap();
        if clocks.remove(key).is_none() {
            log::warn!("erase: clock {key:?} not found");
            return Err(ClockError::ClockNotFound(format!("{key:?}")));
        }
        Ok(())
    }

    /// Duplicates the clock under `src` as a new clock under `dst`.
    ///
    /// Tunables (period, scale, pause flag) carry over; the instants
    /// restart at now, so the copy paces itself independently from the
    /// moment it is created. Attached events do not carry over.
    pub fn copy(&self, src: &K, dst: K) -> ClockResult<()> {
        let mut clocks = self.clocks.write().unwrap();
        if clocks.contains_key(&dst) {
            log::warn!("copy: clock {dst:?} already exists");
            return Err(ClockError::ClockExists(format!("{dst:?}")));
        }
        let Some(source) = clocks.get(src) else {
            log::warn!("copy: clock {src:?} not found");
            return Err(ClockError::ClockNotFound(format!("{src:?}")));
        };
        let duplicate = source.lock().unwrap().duplicate();
        clocks.insert(dst, Arc::new(Mutex::new(duplicate)));
        Ok(())
    }

    /// Polls the clock under `key`: returns `Ok(true)` and fires if the
    /// update period has elapsed, `Ok(false)` otherwise.
    ///
    /// Firing rolls the clock's fire points forward, accumulates the
    /// scale-weighted span, and posts an elapsed-time tick for every
    /// attached event. Paused clocks never fire and make no progress.
    pub fn update(&self, key: &K) -> ClockResult<bool> {
        let element = self.element(key)?;
        let (relative_passed, events) = {
            let mut state = element.lock().unwrap();
            if state.paused_at.is_some() {
                return Ok(false);
            }
            let now = Instant::now();
            if now.duration_since(state.fire_point) <= state.period {
                return Ok(false);
            }
            state.prev_fire_point = state.fire_point;
            state.fire_point = now;
            let relative_passed = state
                .fire_point
                .duration_since(state.prev_fire_point)
                .mul_f64(state.scale);
            state.relative_total += relative_passed;
            (relative_passed, state.events.clone())
        };
        // Tick dispatch runs outside the element lock; a listener-less
        // event is reported by the registry but does not stop the rest.
        for event in events {
            if let Err(error) = self.events.trigger_elapsed(event, relative_passed) {
                log::warn!("clock {key:?}: tick dispatch failed: {error}");
            }
        }
        Ok(true)
    }

    /// Pauses or resumes the clock under `key`. Setting the current state
    /// again is a no-op.
    ///
    /// Pausing captures the instant; resuming folds the frozen span back
    /// into the fire points and the origin, so paused time counts neither
    /// toward period progress nor toward elapsed-since-creation.
    pub fn set_paused(&self, key: &K, paused: bool) -> ClockResult<()> {
        let element = self.element(key)?;
        let mut state = element.lock().unwrap();
        match (state.paused_at, paused) {
            (Some(_), true) | (None, false) => {}
            (None, true) => state.paused_at = Some(Instant::now()),
            (Some(since), false) => {
                let frozen = since.elapsed();
                state.fire_point += frozen;
                state.prev_fire_point += frozen;
                state.origin += frozen;
                state.paused_at = None;
            }
        }
        Ok(())
    }

    /// Returns whether the clock under `key` is paused.
    pub fn is_paused(&self, key: &K) -> ClockResult<bool> {
        let element = self.element(key)?;
        let state = element.lock().unwrap();
        Ok(state.paused_at.is_some())
    }

    /// Returns the clock's rate in firings per second.
    pub fn rate(&self, key: &K) -> ClockResult<f64> {
        let element = self.element(key)?;
        let state = element.lock().unwrap();
        Ok(1.0 / state.period.as_secs_f64())
    }

    /// Sets the clock's rate. Out-of-range values are rejected and the
    /// previous period is retained.
    pub fn set_rate(&self, key: &K, rate_hz: f64) -> ClockResult<()> {
        let period = Self::period_from_rate(rate_hz)?;
        let element = self.element(key)?;
        element.lock().unwrap().period = period;
        Ok(())
    }

    /// Returns the clock's time-scale factor.
    pub fn scale(&self, key: &K) -> ClockResult<f64> {
        let element = self.element(key)?;
        let state = element.lock().unwrap();
        Ok(state.scale)
    }

    /// Sets the clock's time-scale factor. Out-of-range values are
    /// rejected and the previous scale is retained.
    pub fn set_scale(&self, key: &K, scale: f64) -> ClockResult<()> {
        if !(MIN_SCALE..=MAX_SCALE).contains(&scale) {
            log::warn!("set_scale: {scale} is out of range for clock {key:?}");
            return Err(ClockError::ScaleOutOfRange(scale));
        }
        let element = self.element(key)?;
        element.lock().unwrap().scale = scale;
        Ok(())
    }

    /// Absolute time since the clock was created (or last reset),
    /// ignoring scale and excluding paused spans. Frozen while paused.
    pub fn elapsed(&self, key: &K) -> ClockResult<Duration> {
        let element = self.element(key)?;
        let state = element.lock().unwrap();
        let now = state.effective_now(Instant::now());
        Ok(now.duration_since(state.origin))
    }

    /// Absolute span of the last completed period.
    pub fn tick(&self, key: &K) -> ClockResult<Duration> {
        let element = self.element(key)?;
        let state = element.lock().unwrap();
        Ok(state.fire_point.duration_since(state.prev_fire_point))
    }

    /// Scale-weighted time since creation: the accumulated relative total
    /// plus the scaled in-progress span.
    pub fn elapsed_relative(&self, key: &K) -> ClockResult<Duration> {
        let element = self.element(key)?;
        let state = element.lock().unwrap();
        let now = state.effective_now(Instant::now());
        let in_progress = now.duration_since(state.fire_point).mul_f64(state.scale);
        Ok(state.relative_total + in_progress)
    }

    /// Scale-weighted span of the last completed period.
    pub fn tick_relative(&self, key: &K) -> ClockResult<Duration> {
        let element = self.element(key)?;
        let state = element.lock().unwrap();
        Ok(state
            .fire_point
            .duration_since(state.prev_fire_point)
            .mul_f64(state.scale))
    }

    /// Restarts the clock's creation point at now and zeroes the
    /// accumulated relative total.
    pub fn reset(&self, key: &K) -> ClockResult<()> {
        let element = self.element(key)?;
        let mut state = element.lock().unwrap();
        state.origin = Instant::now();
        state.relative_total = Duration::ZERO;
        Ok(())
    }

    /// Attaches `event` to the clock: every firing of the clock ticks the
    /// event with the scale-weighted span.
    ///
    /// The event must currently have subscriptions in the event registry.
    pub fn attach_event(&self, key: &K, event: EventId) -> ClockResult<()> {
        if !self.events.has_subscribers(event) {
            log::warn!("attach_event: {event} has no subscriptions");
            return Err(ClockError::EventNotFound(event));
        }
        let element = self.element(key)?;
        element.lock().unwrap().events.push(event);
        Ok(())
    }

    /// Detaches one occurrence of `event` from the clock.
    pub fn detach_event(&self, key: &K, event: EventId) -> ClockResult<()> {
        let element = self.element(key)?;
        let mut state = element.lock().unwrap();
        match state.events.iter().position(|&attached| attached == event) {
            Some(index) => {
                state.events.remove(index);
                Ok(())
            }
            None => {
                log::warn!("detach_event: {event} is not attached to clock {key:?}");
                Err(ClockError::EventNotFound(event))
            }
        }
    }

    /// Returns the events currently attached to the clock.
    pub fn attached_events(&self, key: &K) -> ClockResult<Vec<EventId>> {
        let element = self.element(key)?;
        let state = element.lock().unwrap();
        Ok(state.events.clone())
    }

    /// Detaches every event from the clock.
    pub fn clear_events(&self, key: &K) -> ClockResult<()> {
        let element = self.element(key)?;
        element.lock().unwrap().events.clear();
        Ok(())
    }

    fn element(&self, key: &K) -> ClockResult<Arc<Mutex<ClockState>>> {
        let clocks = self.clocks.read().unwrap();
        match clocks.get(key) {
            Some(element) => Ok(Arc::clone(element)),
            None => {
                log::warn!("clock {key:?} not found");
                Err(ClockError::ClockNotFound(format!("{key:?}")))
            }
        }
    }

    fn period_from_rate(rate_hz: f64) -> ClockResult<Duration> {
        if !(MIN_RATE_HZ..=MAX_RATE_HZ).contains(&rate_hz) {
            log::warn!("rate {rate_hz} Hz is out of range");
            return Err(ClockError::RateOutOfRange(rate_hz));
        }
        Ok(Duration::from_secs_f64(1.0 / rate_hz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const SLEEP_MARGIN: Duration = Duration::from_millis(50);

    fn clock() -> FrameClock<&'static str> {
        FrameClock::new(Arc::new(EventRegistry::new()))
    }

    #[test]
    fn create_rejects_out_of_range_rate() {
        let frame_clock = clock();
        assert_eq!(
            frame_clock.create("a", 0.0),
            Err(ClockError::RateOutOfRange(0.0))
        );
        assert_eq!(
            frame_clock.create("a", 5000.0),
            Err(ClockError::RateOutOfRange(5000.0))
        );
        assert!(frame_clock.create("a", 60.0).is_ok());
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let frame_clock = clock();
        frame_clock.create("a", 60.0).expect("create failed");
        assert_eq!(
            frame_clock.create("a", 30.0),
            Err(ClockError::ClockExists("\"a\"".to_string()))
        );
        // The original clock kept its rate.
        let rate = frame_clock.rate(&"a").expect("rate failed");
        assert!((rate - 60.0).abs() < 0.5);
    }

    #[test]
    fn unknown_key_is_reported_everywhere() {
        let frame_clock = clock();
        let missing = ClockError::ClockNotFound("\"ghost\"".to_string());
        assert_eq!(frame_clock.update(&"ghost"), Err(missing.clone()));
        assert_eq!(frame_clock.erase(&"ghost"), Err(missing.clone()));
        assert_eq!(frame_clock.set_paused(&"ghost", true), Err(missing));
    }

    #[test]
    fn set_rate_out_of_range_keeps_previous_period() {
        let frame_clock = clock();
        frame_clock.create("a", 10.0).expect("create failed");

        assert_eq!(
            frame_clock.set_rate(&"a", 5000.0),
            Err(ClockError::RateOutOfRange(5000.0))
        );
        assert_eq!(
            frame_clock.set_rate(&"a", 0.0001),
            Err(ClockError::RateOutOfRange(0.0001))
        );

        let rate = frame_clock.rate(&"a").expect("rate failed");
        assert!((rate - 10.0).abs() < 0.5, "rate changed to {rate}");
    }

    #[test]
    fn set_scale_out_of_range_keeps_previous_scale() {
        let frame_clock = clock();
        frame_clock.create("a", 10.0).expect("create failed");
        frame_clock.set_scale(&"a", 2.0).expect("set_scale failed");

        assert_eq!(
            frame_clock.set_scale(&"a", 1001.0),
            Err(ClockError::ScaleOutOfRange(1001.0))
        );
        let scale = frame_clock.scale(&"a").expect("scale failed");
        assert!((scale - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn update_fires_after_one_period() {
        let frame_clock = clock();
        frame_clock.create("a", 50.0).expect("create failed");

        // Immediately after creation no period has elapsed.
        assert_eq!(frame_clock.update(&"a"), Ok(false));

        thread::sleep(Duration::from_millis(25));
        assert_eq!(frame_clock.update(&"a"), Ok(true));
        // And the very next poll starts a fresh period.
        assert_eq!(frame_clock.update(&"a"), Ok(false));

        let tick = frame_clock.tick(&"a").expect("tick failed");
        assert!(tick >= Duration::from_millis(20), "tick span {tick:?}");
    }

    #[test]
    fn paused_clock_neither_fires_nor_advances_elapsed() {
        let frame_clock = clock();
        frame_clock.create("a", 50.0).expect("create failed");

        frame_clock.set_paused(&"a", true).expect("pause failed");
        assert_eq!(frame_clock.is_paused(&"a"), Ok(true));
        let frozen = frame_clock.elapsed(&"a").expect("elapsed failed");

        thread::sleep(Duration::from_millis(100));
        assert_eq!(frame_clock.update(&"a"), Ok(false));
        assert_eq!(frame_clock.elapsed(&"a"), Ok(frozen));
    }

    #[test]
    fn resume_excludes_the_paused_span_from_elapsed() {
        let frame_clock = clock();
        frame_clock.create("a", 50.0).expect("create failed");

        thread::sleep(Duration::from_millis(20));
        frame_clock.set_paused(&"a", true).expect("pause failed");
        thread::sleep(Duration::from_millis(100));
        frame_clock.set_paused(&"a", false).expect("resume failed");

        let elapsed = frame_clock.elapsed(&"a").expect("elapsed failed");
        assert!(
            elapsed >= Duration::from_millis(20),
            "elapsed {elapsed:?} lost running time"
        );
        assert!(
            elapsed < Duration::from_millis(20) + SLEEP_MARGIN,
            "elapsed {elapsed:?} includes paused time"
        );
    }

    #[test]
    fn redundant_pause_transitions_are_no_ops() {
        let frame_clock = clock();
        frame_clock.create("a", 50.0).expect("create failed");

        frame_clock.set_paused(&"a", false).expect("no-op failed");
        frame_clock.set_paused(&"a", true).expect("pause failed");
        frame_clock.set_paused(&"a", true).expect("no-op failed");
        assert_eq!(frame_clock.is_paused(&"a"), Ok(true));
    }

    #[test]
    fn copy_duplicates_tunables_and_restarts_instants() {
        let frame_clock = clock();
        frame_clock.create("a", 10.0).expect("create failed");
        frame_clock.set_scale(&"a", 2.0).expect("set_scale failed");
        thread::sleep(Duration::from_millis(40));

        frame_clock.copy(&"a", "b").expect("copy failed");

        let copied_rate = frame_clock.rate(&"b").expect("rate failed");
        assert!((copied_rate - 10.0).abs() < 0.5);
        let copied_scale = frame_clock.scale(&"b").expect("scale failed");
        assert!((copied_scale - 2.0).abs() < f64::EPSILON);

        let original_elapsed = frame_clock.elapsed(&"a").expect("elapsed failed");
        let copied_elapsed = frame_clock.elapsed(&"b").expect("elapsed failed");
        assert!(copied_elapsed < original_elapsed);

        assert_eq!(
            frame_clock.copy(&"a", "b"),
            Err(ClockError::ClockExists("\"b\"".to_string()))
        );
    }

    #[test]
    fn relative_queries_apply_the_scale() {
        let frame_clock = clock();
        frame_clock.create("a", 50.0).expect("create failed");
        frame_clock.set_scale(&"a", 2.0).expect("set_scale failed");

        thread::sleep(Duration::from_millis(25));
        assert_eq!(frame_clock.update(&"a"), Ok(true));

        let tick = frame_clock.tick(&"a").expect("tick failed");
        let tick_relative = frame_clock.tick_relative(&"a").expect("tick_relative failed");
        assert_eq!(tick_relative, tick.mul_f64(2.0));

        let elapsed_relative = frame_clock
            .elapsed_relative(&"a")
            .expect("elapsed_relative failed");
        assert!(elapsed_relative >= tick_relative);
    }

    #[test]
    fn reset_restarts_elapsed_and_relative_total() {
        let frame_clock = clock();
        frame_clock.create("a", 50.0).expect("create failed");

        thread::sleep(Duration::from_millis(40));
        assert_eq!(frame_clock.update(&"a"), Ok(true));
        frame_clock.reset(&"a").expect("reset failed");

        let elapsed = frame_clock.elapsed(&"a").expect("elapsed failed");
        assert!(elapsed < SLEEP_MARGIN, "elapsed {elapsed:?} after reset");
        let relative = frame_clock
            .elapsed_relative(&"a")
            .expect("elapsed_relative failed");
        assert!(relative < SLEEP_MARGIN, "relative {relative:?} after reset");
    }

    #[test]
    fn attach_requires_a_subscribed_event() {
        let events = Arc::new(EventRegistry::new());
        let frame_clock = FrameClock::new(Arc::clone(&events));
        frame_clock.create("a", 10.0).expect("create failed");

        let orphan = events.register();
        assert_eq!(
            frame_clock.attach_event(&"a", orphan),
            Err(ClockError::EventNotFound(orphan))
        );
        assert_eq!(frame_clock.attached_events(&"a"), Ok(Vec::new()));
    }

    #[test]
    fn detach_and_clear_manage_the_event_list() {
        use crate::event::Listener;

        struct Sink;
        impl Listener for Sink {
            fn on_event(&self, _event: EventId) {}
            fn on_event_elapsed(&self, _event: EventId, _elapsed: Duration) {}
        }

        let events = Arc::new(EventRegistry::new());
        let frame_clock = FrameClock::new(Arc::clone(&events));
        frame_clock.create("a", 10.0).expect("create failed");

        let listener: Arc<dyn Listener> = Arc::new(Sink);
        let first = events.register();
        let second = events.register();
        events.subscribe(first, &listener);
        events.subscribe(second, &listener);

        frame_clock.attach_event(&"a", first).expect("attach failed");
        frame_clock.attach_event(&"a", second).expect("attach failed");
        assert_eq!(frame_clock.attached_events(&"a"), Ok(vec![first, second]));

        frame_clock.detach_event(&"a", first).expect("detach failed");
        assert_eq!(frame_clock.attached_events(&"a"), Ok(vec![second]));
        assert_eq!(
            frame_clock.detach_event(&"a", first),
            Err(ClockError::EventNotFound(first))
        );

        frame_clock.clear_events(&"a").expect("clear failed");
        assert_eq!(frame_clock.attached_events(&"a"), Ok(Vec::new()));
    }

    #[test]
    fn erase_removes_the_clock() {
        let frame_clock = clock();
        frame_clock.create("a", 10.0).expect("create failed");
        frame_clock.erase(&"a").expect("erase failed");
        assert!(matches!(
            frame_clock.update(&"a"),
            Err(ClockError::ClockNotFound(_))
        ));
    }
}
