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

// Cadence Sandbox
// Two players and a judge play rock-paper-scissors, one round per second,
// entirely through clock-ticked events.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use cadence_core::{EventId, EventRegistry, FrameClock, Listener};
use rand::Rng;

const TARGET_WINS: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Gesture {
    Rock,
    Paper,
    Scissors,
}

impl Gesture {
    fn random() -> Self {
        match rand::thread_rng().gen_range(0..3) {
            0 => Gesture::Rock,
            1 => Gesture::Paper,
            _ => Gesture::Scissors,
        }
    }

    fn beats(self, other: Gesture) -> bool {
        matches!(
            (self, other),
            (Gesture::Rock, Gesture::Scissors)
                | (Gesture::Paper, Gesture::Rock)
                | (Gesture::Scissors, Gesture::Paper)
        )
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gesture::Rock => write!(f, "rock"),
            Gesture::Paper => write!(f, "paper"),
            Gesture::Scissors => write!(f, "scissors"),
        }
    }
}

/// A contestant. Each `play` tick it commits to a fresh random gesture,
/// which the judge reads later in the same clock firing.
struct Player {
    name: &'static str,
    play_event: EventId,
    gesture: Mutex<Option<Gesture>>,
    wins: AtomicU32,
}

impl Player {
    fn new(name: &'static str, play_event: EventId) -> Arc<Self> {
        Arc::new(Self {
            name,
            play_event,
            gesture: Mutex::new(None),
            wins: AtomicU32::new(0),
        })
    }

    fn gesture(&self) -> Option<Gesture> {
        *self.gesture.lock().unwrap()
    }

    fn award_win(&self) {
        self.wins.fetch_add(1, Ordering::Relaxed);
    }

    fn wins(&self) -> u32 {
        self.wins.load(Ordering::Relaxed)
    }
}

impl Listener for Player {
    fn on_event(&self, _event: EventId) {}

    fn on_event_elapsed(&self, event: EventId, _elapsed: Duration) {
        if event == self.play_event {
            let gesture = Gesture::random();
            *self.gesture.lock().unwrap() = Some(gesture);
            println!("{}: I choose {gesture}!", self.name);
        }
    }
}

/// The per-firing event sequence of one match round. Attachment order is
/// delivery order, so the judge always reads gestures the players just
/// committed.
#[derive(Clone, Copy)]
struct MatchEvents {
    start: EventId,
    round: EventId,
    play: EventId,
    judgement: EventId,
    score: EventId,
}

struct Judge {
    name: &'static str,
    events: MatchEvents,
    players: [Arc<Player>; 2],
    round: AtomicU32,
    game_over: AtomicBool,
}

impl Judge {
    fn new(name: &'static str, events: MatchEvents, players: [Arc<Player>; 2]) -> Arc<Self> {
        Arc::new(Self {
            name,
            events,
            players,
            round: AtomicU32::new(1),
            game_over: AtomicBool::new(false),
        })
    }

    fn game_over(&self) -> bool {
        self.game_over.load(Ordering::Relaxed)
    }

    fn judge_round(&self) {
        let [first, second] = &self.players;
        let (Some(a), Some(b)) = (first.gesture(), second.gesture()) else {
            log::warn!("{}: a player has not played yet, skipping the round", self.name);
            return;
        };
        if a == b {
            println!("{}: Tie!", self.name);
        } else if a.beats(b) {
            println!("{}: {} wins!", self.name, first.name);
            first.award_win();
        } else {
            println!("{}: {} wins!", self.name, second.name);
            second.award_win();
        }
    }

    fn announce_score(&self) {
        let [first, second] = &self.players;
        println!(
            "{}: {} won {} times, {} won {} times.",
            self.name,
            first.name,
            first.wins(),
            second.name,
            second.wins()
        );
        for player in &self.players {
            if player.wins() >= TARGET_WINS {
                println!("{}: Game over! {} wins the game!", self.name, player.name);
                self.game_over.store(true, Ordering::Relaxed);
                return;
            }
        }
    }
}

impl Listener for Judge {
    fn on_event(&self, event: EventId) {
        if event == self.events.start {
            let [first, second] = &self.players;
            println!(
                "Welcome to this exciting rock-paper-scissors game, where {} faces off \
                 against {}.\nThe first player to win {TARGET_WINS} rounds takes the match!",
                first.name, second.name
            );
        }
    }

    fn on_event_elapsed(&self, event: EventId, _elapsed: Duration) {
        if event == self.events.round {
            let round = self.round.fetch_add(1, Ordering::Relaxed);
            println!("{}: Round {round}.", self.name);
        } else if event == self.events.judgement {
            self.judge_round();
        } else if event == self.events.score {
            self.announce_score();
        }
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let registry = Arc::new(EventRegistry::new());
    let clock = FrameClock::new(Arc::clone(&registry));
    let match_clock = "match".to_string();
    clock.create(match_clock.clone(), 1.0)?;

    let events = MatchEvents {
        start: registry.register(),
        round: registry.register(),
        play: registry.register(),
        judgement: registry.register(),
        score: registry.register(),
    };

    let andy = Player::new("Andy", events.play);
    let bob = Player::new("Bob", events.play);
    let judge = Judge::new("Judge", events, [Arc::clone(&andy), Arc::clone(&bob)]);

    let andy_listener: Arc<dyn Listener> = andy;
    let bob_listener: Arc<dyn Listener> = bob;
    let judge_listener: Arc<dyn Listener> = judge.clone();

    registry.subscribe(events.start, &judge_listener);
    registry.subscribe_all(&[events.round, events.judgement, events.score], &judge_listener);
    registry.subscribe(events.play, &andy_listener);
    registry.subscribe(events.play, &bob_listener);

    for event in [events.round, events.play, events.judgement, events.score] {
        clock.attach_event(&match_clock, event)?;
    }

    registry.trigger(events.start)?;

    while !judge.game_over() {
        clock.update(&match_clock)?;
        thread::sleep(Duration::from_millis(1));
    }

    // Retire the match: drop the trigger points, then the clock itself.
    for event in [events.round, events.play, events.judgement, events.score] {
        registry.unsubscribe_event(event)?;
    }
    registry.unsubscribe_event(events.start)?;
    clock.erase(&match_clock)?;
    Ok(())
}
