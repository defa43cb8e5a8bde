//! Race simulation engine for partyroom.
//!
//! The server generates a compact [`RaceParams`] once per round, computes
//! the outcome with [`simulate`], and broadcasts the parameters. Every
//! client feeds the same parameters into a [`Replay`] and watches the race
//! unfold locally with no further server involvement.
//!
//! Both sides run the same [`tick`] function, and [`Replay`] always steps
//! it with [`FIXED_DT`] of race time no matter how uneven the caller's
//! frame deltas are. That is what keeps the finish order identical across
//! the authoritative run and every replay.
//!
//! ```text
//! RaceParams::generate ──► simulate ──► RaceOutcome (server)
//!        │
//!        └──── broadcast ──► Replay::advance(frame_dt) … (each client)
//! ```

mod engine;
mod error;
mod params;
mod ranking;
mod replay;
mod types;

pub use engine::{
    ActiveEffect, HorseState, MAX_RACE_TIME, RaceState, SLOW_MOTION_DISTANCE,
    SLOW_MOTION_SCALE, WALK_INTERVAL, tick,
};
pub use error::RaceError;
pub use params::{HorseParams, RaceParams};
pub use ranking::{RankEntry, ranking, winners, winning_horse};
pub use replay::{FIXED_DT, RaceOutcome, Replay, simulate};
pub use types::{
    Effect, Gimmick, GimmickKind, TrackLength, TrackPreset, VehicleType,
    WeatherEntry, WeatherKind, WinMode,
};

/// Fewest horses a round may field.
pub const MIN_HORSES: usize = 4;

/// Most horses a round may field.
pub const MAX_HORSES: usize = 6;
