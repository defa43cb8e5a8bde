//! The pure step function.
//!
//! [`tick`] maps `(state, dt, params)` to a new state and touches nothing
//! else. Randomness in the walk is derived from `(seed, horse, sample)`
//! rather than drawn from a stateful generator, so the result of a tick
//! never depends on what ran before it on this machine.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::params::RaceParams;
use crate::types::{Effect, GimmickKind, WeatherKind};

/// Seconds of race time between random walk samples.
pub const WALK_INTERVAL: f64 = 0.5;
const WALK_MIN: f64 = 0.85;
const WALK_MAX: f64 = 1.15;
/// Exponential approach rate towards the current walk sample, per second.
const WALK_SMOOTHING: f64 = 3.0;

/// Remaining distance at which slow motion kicks in, in metres.
pub const SLOW_MOTION_DISTANCE: f64 = 15.0;
/// Wall-to-race time factor while slow motion is on.
pub const SLOW_MOTION_SCALE: f64 = 0.35;

const COAST_DECAY: f64 = 1.5;
const COAST_FLOOR: f64 = 3.0;

/// Race time after which stragglers are judged where they stand.
pub const MAX_RACE_TIME: f64 = 600.0;

/// An effect currently applied to a horse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEffect {
    pub kind: GimmickKind,
    pub remaining: f64,
    pub follow_up: Option<Effect>,
}

/// Dynamic state of one horse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HorseState {
    /// Leading edge, metres from the start.
    pub position: f64,
    /// Effective speed during the last tick, m/s.
    pub speed: f64,
    /// Smoothed random walk factor.
    pub walk: f64,
    walk_target: f64,
    walk_sample: u64,
    /// Index of the next gimmick that has not fired yet.
    pub next_gimmick: usize,
    pub effect: Option<ActiveEffect>,
    /// Race time at which the leading edge crossed the line.
    pub judged_at: Option<f64>,
    /// Trailing edge is over the line too.
    pub finished: bool,
}

impl HorseState {
    fn new(seed: u64, horse: usize) -> Self {
        Self {
            position: 0.0,
            speed: 0.0,
            walk: 1.0,
            walk_target: walk_sample(seed, horse, 0),
            walk_sample: 0,
            next_gimmick: 0,
            effect: None,
            judged_at: None,
            finished: false,
        }
    }

    /// Places a horse at `position`, for setting up scenarios.
    pub fn at(seed: u64, horse: usize, position: f64) -> Self {
        Self {
            position,
            ..Self::new(seed, horse)
        }
    }

    pub fn is_judged(&self) -> bool {
        self.judged_at.is_some()
    }
}

/// Dynamic state of a whole race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceState {
    /// Race time in seconds.
    pub elapsed: f64,
    pub horses: Vec<HorseState>,
    /// Highest weather entry reached so far. Never decreases.
    pub weather_index: Option<usize>,
    pub slow_motion: bool,
}

impl RaceState {
    /// Everyone on the start line.
    pub fn new(params: &RaceParams) -> Self {
        let horses = (0..params.horses.len())
            .map(|i| HorseState::new(params.seed, i))
            .collect();
        let mut state = Self {
            elapsed: 0.0,
            horses,
            weather_index: None,
            slow_motion: false,
        };
        state.update_weather(params);
        state
    }

    pub fn weather(&self, params: &RaceParams) -> WeatherKind {
        self.weather_index
            .and_then(|i| params.weather.get(i))
            .map(|w| w.weather)
            .unwrap_or_default()
    }

    /// Index of the horse furthest along. Lowest index wins a tie.
    pub fn leader(&self) -> Option<usize> {
        self.horses
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, h)| match best {
                Some((_, p)) if p >= h.position => best,
                _ => Some((i, h.position)),
            })
            .map(|(i, _)| i)
    }

    pub fn all_judged(&self) -> bool {
        self.horses.iter().all(HorseState::is_judged)
    }

    pub fn all_finished(&self) -> bool {
        self.horses.iter().all(|h| h.finished)
    }

    /// How many seconds of race time one second of wall time is worth.
    pub fn time_scale(&self) -> f64 {
        if self.slow_motion {
            SLOW_MOTION_SCALE
        } else {
            1.0
        }
    }

    fn update_weather(&mut self, params: &RaceParams) {
        let Some(leader) = self.leader() else {
            return;
        };
        let progress = self.horses[leader].position / params.finish_line;
        let reached = params
            .weather
            .iter()
            .rposition(|w| progress >= w.trigger);
        self.weather_index = match (self.weather_index, reached) {
            (Some(old), Some(new)) => Some(old.max(new)),
            (old, new) => old.or(new),
        };
    }

    fn update_slow_motion(&mut self, params: &RaceParams) {
        self.slow_motion = self.leader().is_some_and(|i| {
            let h = &self.horses[i];
            !h.is_judged()
                && params.finish_line - h.position <= SLOW_MOTION_DISTANCE
        });
    }
}

/// Deterministic walk sample for `(seed, horse, sample)`.
fn walk_sample(seed: u64, horse: usize, sample: u64) -> f64 {
    let key = seed
        ^ (horse as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ sample.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    ChaCha8Rng::seed_from_u64(key).random_range(WALK_MIN..=WALK_MAX)
}

/// Advances the race by `dt` seconds of race time.
pub fn tick(state: &RaceState, dt: f64, params: &RaceParams) -> RaceState {
    let mut next = state.clone();
    if state.all_finished() {
        return next;
    }

    let weather = state.weather(params);
    let sample = (state.elapsed / WALK_INTERVAL).floor() as u64;

    for (i, (horse, hp)) in
        next.horses.iter_mut().zip(&params.horses).enumerate()
    {
        if horse.finished {
            horse.speed = 0.0;
            continue;
        }
        let length = hp.vehicle.length();

        if horse.is_judged() {
            let coast = (horse.speed * (-COAST_DECAY * dt).exp())
                .max(COAST_FLOOR);
            horse.speed = coast;
            horse.position += coast * dt;
            horse.finished = horse.position - length >= params.finish_line;
            continue;
        }

        // Gimmicks. A fresh trigger replaces whatever is running. At most
        // one fires per tick, so every crossed entry gets at least a tick.
        let progress = horse.position / params.finish_line;
        let due = hp
            .gimmicks
            .get(horse.next_gimmick)
            .filter(|g| progress >= g.trigger);
        if let Some(g) = due {
            horse.effect = Some(ActiveEffect {
                kind: g.effect.kind,
                remaining: g.effect.duration,
                follow_up: g.follow_up,
            });
            horse.next_gimmick += 1;
        }
        let effect_mult = horse.effect.map_or(1.0, |e| e.kind.multiplier());
        horse.effect = horse.effect.and_then(|mut e| {
            e.remaining -= dt;
            if e.remaining > 0.0 {
                Some(e)
            } else {
                e.follow_up.map(|f| ActiveEffect {
                    kind: f.kind,
                    remaining: f.duration,
                    follow_up: None,
                })
            }
        });

        // Random walk.
        if sample != horse.walk_sample {
            horse.walk_sample = sample;
            horse.walk_target = walk_sample(params.seed, i, sample);
        }
        horse.walk += (horse.walk_target - horse.walk)
            * (1.0 - (-WALK_SMOOTHING * dt).exp());

        let speed = hp.base_speed
            * horse.walk
            * weather.multiplier(hp.vehicle)
            * effect_mult;
        let before = horse.position;
        horse.position = (before + speed * dt).max(0.0);
        horse.speed = speed;

        if horse.position >= params.finish_line {
            let travelled = horse.position - before;
            let fraction = if travelled > 0.0 {
                ((params.finish_line - before) / travelled).clamp(0.0, 1.0)
            } else {
                1.0
            };
            horse.judged_at = Some(state.elapsed + dt * fraction);
            horse.speed = speed.max(COAST_FLOOR);
            horse.effect = None;
            horse.finished = horse.position - length >= params.finish_line;
        }
    }

    next.elapsed = state.elapsed + dt;
    if next.elapsed >= MAX_RACE_TIME {
        judge_stragglers(&mut next);
    }
    next.update_weather(params);
    next.update_slow_motion(params);
    next
}

/// Judges every unjudged horse in position order and ends the race.
fn judge_stragglers(state: &mut RaceState) {
    let mut pending: Vec<usize> = (0..state.horses.len())
        .filter(|&i| !state.horses[i].is_judged())
        .collect();
    pending.sort_by(|&a, &b| {
        state.horses[b].position.total_cmp(&state.horses[a].position)
    });
    for (rank, i) in pending.into_iter().enumerate() {
        state.horses[i].judged_at = Some(state.elapsed + rank as f64 * 1e-3);
    }
    for horse in &mut state.horses {
        horse.finished = true;
        horse.speed = 0.0;
    }
}
