//! Fixed vocabularies and lookup tables shared by server and replay.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Track presets
// ---------------------------------------------------------------------------

/// Named track length preset.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TrackLength {
    Short,
    #[default]
    Medium,
    Long,
}

/// Distance and base speed range of a track preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPreset {
    /// Finish line distance in metres.
    pub distance: f64,
    /// Slowest base speed a horse may draw, in m/s.
    pub min_speed: f64,
    /// Fastest base speed a horse may draw, in m/s.
    pub max_speed: f64,
}

impl TrackLength {
    /// All presets, shortest first.
    pub const ALL: [TrackLength; 3] =
        [TrackLength::Short, TrackLength::Medium, TrackLength::Long];

    /// Returns the fixed preset table entry.
    pub const fn preset(self) -> TrackPreset {
        match self {
            TrackLength::Short => TrackPreset {
                distance: 300.0,
                min_speed: 14.0,
                max_speed: 18.0,
            },
            TrackLength::Medium => TrackPreset {
                distance: 500.0,
                min_speed: 15.0,
                max_speed: 19.0,
            },
            TrackLength::Long => TrackPreset {
                distance: 800.0,
                min_speed: 16.0,
                max_speed: 20.0,
            },
        }
    }
}

impl fmt::Display for TrackLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackLength::Short => write!(f, "short"),
            TrackLength::Medium => write!(f, "medium"),
            TrackLength::Long => write!(f, "long"),
        }
    }
}

// ---------------------------------------------------------------------------
// Vehicles
// ---------------------------------------------------------------------------

/// What a "horse" is drawn as. Cosmetic, except that it sets the body
/// length and how the weather treats it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    #[default]
    Horse,
    Car,
    Bicycle,
    Boat,
    Rocket,
}

impl VehicleType {
    pub const ALL: [VehicleType; 5] = [
        VehicleType::Horse,
        VehicleType::Car,
        VehicleType::Bicycle,
        VehicleType::Boat,
        VehicleType::Rocket,
    ];

    /// Body length in metres: the gap between finish-judging (nose on the
    /// line) and fully finishing (tail over the line).
    pub const fn length(self) -> f64 {
        match self {
            VehicleType::Horse => 2.4,
            VehicleType::Car => 4.5,
            VehicleType::Bicycle => 1.8,
            VehicleType::Boat => 5.0,
            VehicleType::Rocket => 6.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// Global weather condition.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum WeatherKind {
    #[default]
    Sunny,
    Rain,
    Snow,
    Wind,
    Fog,
}

impl WeatherKind {
    pub const ALL: [WeatherKind; 5] = [
        WeatherKind::Sunny,
        WeatherKind::Rain,
        WeatherKind::Snow,
        WeatherKind::Wind,
        WeatherKind::Fog,
    ];

    /// Speed multiplier this weather applies to a vehicle.
    pub const fn multiplier(self, vehicle: VehicleType) -> f64 {
        use VehicleType::*;
        match self {
            WeatherKind::Sunny => 1.0,
            WeatherKind::Rain => match vehicle {
                Horse => 0.92,
                Car => 0.85,
                Bicycle => 0.8,
                Boat => 1.15,
                Rocket => 1.0,
            },
            WeatherKind::Snow => match vehicle {
                Horse => 0.85,
                Car => 0.75,
                Bicycle => 0.7,
                Boat => 0.95,
                Rocket => 0.95,
            },
            WeatherKind::Wind => match vehicle {
                Horse => 0.95,
                Car => 1.0,
                Bicycle => 0.85,
                Boat => 1.1,
                Rocket => 0.9,
            },
            WeatherKind::Fog => match vehicle {
                Horse => 0.97,
                Car => 0.9,
                Bicycle => 0.95,
                Boat => 0.9,
                Rocket => 1.05,
            },
        }
    }
}

/// Weather change that takes effect once the leader's progress ratio
/// reaches `trigger`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherEntry {
    pub trigger: f64,
    pub weather: WeatherKind,
}

// ---------------------------------------------------------------------------
// Gimmicks
// ---------------------------------------------------------------------------

/// Kind of temporary speed modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GimmickKind {
    Stop,
    Slow,
    Sprint,
    ItemBoost,
    Reverse,
    Wobble,
}

impl GimmickKind {
    pub const ALL: [GimmickKind; 6] = [
        GimmickKind::Stop,
        GimmickKind::Slow,
        GimmickKind::Sprint,
        GimmickKind::ItemBoost,
        GimmickKind::Reverse,
        GimmickKind::Wobble,
    ];

    /// Factor applied to the horse's speed while the effect lasts.
    pub const fn multiplier(self) -> f64 {
        match self {
            GimmickKind::Stop => 0.0,
            GimmickKind::Slow => 0.5,
            GimmickKind::Sprint => 2.0,
            GimmickKind::ItemBoost => 2.5,
            GimmickKind::Reverse => -1.5,
            GimmickKind::Wobble => 0.8,
        }
    }
}

/// A single timed effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub kind: GimmickKind,
    /// Seconds of race time.
    pub duration: f64,
}

/// A scheduled gimmick on one horse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gimmick {
    /// Progress ratio of this horse at which the gimmick fires.
    pub trigger: f64,
    pub effect: Effect,
    /// Applied when `effect` expires, before returning to baseline.
    pub follow_up: Option<Effect>,
}

// ---------------------------------------------------------------------------
// Win mode
// ---------------------------------------------------------------------------

/// Which end of the ranking pays out.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum WinMode {
    #[default]
    First,
    Last,
}
