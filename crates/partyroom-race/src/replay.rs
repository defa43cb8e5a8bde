//! Fixed-step driver around [`tick`].
//!
//! Wall-clock frame deltas are accumulated and converted into whole
//! [`FIXED_DT`] steps of race time. Slow motion only changes the rate at
//! which wall time is converted, never the step size, so a replay and the
//! authoritative [`simulate`] run execute exactly the same sequence of
//! ticks.

use serde::{Deserialize, Serialize};

use crate::engine::{MAX_RACE_TIME, RaceState, SLOW_MOTION_SCALE, tick};
use crate::params::RaceParams;
use crate::ranking::{RankEntry, ranking};

/// Race time advanced by each step.
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Frame deltas above this are clamped, so a backgrounded tab does not
/// try to catch up minutes of race in one frame.
const MAX_FRAME_DT: f64 = 0.25;

const MAX_STEPS: u64 = (MAX_RACE_TIME / FIXED_DT) as u64 + 1;

/// Result of running a race to completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceOutcome {
    pub ranking: Vec<RankEntry>,
    /// Race time until the last horse fully finished.
    pub duration: f64,
    /// Race time spent in slow motion.
    pub slow_motion_time: f64,
}

impl RaceOutcome {
    /// Wall-clock seconds a client needs to play the race back.
    pub fn playback_duration(&self) -> f64 {
        self.duration + self.slow_motion_time * (1.0 / SLOW_MOTION_SCALE - 1.0)
    }
}

/// Runs the race to completion in fixed steps.
pub fn simulate(params: &RaceParams) -> RaceOutcome {
    let mut state = RaceState::new(params);
    let mut slow_motion_time = 0.0;
    let mut steps = 0;
    while !state.all_finished() && steps < MAX_STEPS {
        if state.slow_motion {
            slow_motion_time += FIXED_DT;
        }
        state = tick(&state, FIXED_DT, params);
        steps += 1;
    }
    RaceOutcome {
        ranking: ranking(&state),
        duration: state.elapsed,
        slow_motion_time,
    }
}

/// Client-side playback of a broadcast parameter set.
#[derive(Debug, Clone)]
pub struct Replay {
    params: RaceParams,
    state: RaceState,
    accumulator: f64,
    steps: u64,
}

impl Replay {
    pub fn new(params: RaceParams) -> Self {
        let state = RaceState::new(&params);
        Self {
            params,
            state,
            accumulator: 0.0,
            steps: 0,
        }
    }

    /// Feeds one frame of wall time and returns the state to draw.
    pub fn advance(&mut self, frame_dt: f64) -> &RaceState {
        let frame_dt = frame_dt.clamp(0.0, MAX_FRAME_DT);
        self.accumulator += frame_dt * self.state.time_scale();
        while self.accumulator >= FIXED_DT && !self.is_finished() {
            self.state = tick(&self.state, FIXED_DT, &self.params);
            self.accumulator -= FIXED_DT;
            self.steps += 1;
        }
        &self.state
    }

    pub fn state(&self) -> &RaceState {
        &self.state
    }

    pub fn params(&self) -> &RaceParams {
        &self.params
    }

    /// Number of fixed steps executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_finished(&self) -> bool {
        self.state.all_finished() || self.steps >= MAX_STEPS
    }

    /// Current finish order. Final once [`is_finished`](Self::is_finished).
    pub fn ranking(&self) -> Vec<RankEntry> {
        ranking(&self.state)
    }
}
