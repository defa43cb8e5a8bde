//! Per-round race parameters and their random generation.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::MAX_HORSES;
use crate::error::RaceError;
use crate::types::{
    Effect, Gimmick, GimmickKind, TrackLength, VehicleType, WeatherEntry,
    WeatherKind,
};

const GIMMICKS_PER_HORSE: std::ops::RangeInclusive<usize> = 1..=3;
const GIMMICK_TRIGGER_MIN: f64 = 0.15;
const GIMMICK_TRIGGER_MAX: f64 = 0.85;
const GIMMICK_DURATION_MIN: f64 = 0.5;
const GIMMICK_DURATION_MAX: f64 = 2.0;
const FOLLOW_UP_CHANCE: f64 = 0.3;

const EXTRA_WEATHER_CHANGES: std::ops::RangeInclusive<usize> = 0..=2;
const WEATHER_TRIGGER_MIN: f64 = 0.2;
const WEATHER_TRIGGER_MAX: f64 = 0.8;

/// Fixed parameters of one horse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HorseParams {
    pub vehicle: VehicleType,
    /// Metres per second before walk, weather and gimmicks.
    pub base_speed: f64,
    /// Sorted by ascending trigger.
    pub gimmicks: Vec<Gimmick>,
}

/// Everything needed to run or replay a race.
///
/// This is the whole payload the server broadcasts when a race starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceParams {
    /// Seeds the per-horse random walk.
    pub seed: u64,
    pub track: TrackLength,
    /// Metres from start to the finish line.
    pub finish_line: f64,
    pub horses: Vec<HorseParams>,
    /// Sorted by ascending trigger.
    pub weather: Vec<WeatherEntry>,
}

impl RaceParams {
    /// Draws a fresh parameter set for the given vehicles.
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        track: TrackLength,
        vehicles: &[VehicleType],
    ) -> Self {
        let preset = track.preset();
        let horses = vehicles
            .iter()
            .map(|&vehicle| HorseParams {
                vehicle,
                base_speed: rng
                    .random_range(preset.min_speed..=preset.max_speed),
                gimmicks: generate_gimmicks(rng),
            })
            .collect();

        Self {
            seed: rng.random(),
            track,
            finish_line: preset.distance,
            horses,
            weather: generate_weather(rng),
        }
    }

    /// Checks the invariants the engine relies on.
    pub fn validate(&self) -> Result<(), RaceError> {
        if self.horses.is_empty() || self.horses.len() > MAX_HORSES {
            return Err(RaceError::HorseCount(self.horses.len()));
        }
        if !(self.finish_line.is_finite() && self.finish_line > 0.0) {
            return Err(RaceError::FinishLine(self.finish_line));
        }
        for (i, horse) in self.horses.iter().enumerate() {
            if !(horse.base_speed.is_finite() && horse.base_speed > 0.0) {
                return Err(RaceError::BaseSpeed(i));
            }
            let effects_ok = horse.gimmicks.iter().all(|g| {
                ratio_ok(g.trigger)
                    && duration_ok(g.effect.duration)
                    && g.follow_up.is_none_or(|f| duration_ok(f.duration))
            });
            let sorted = horse
                .gimmicks
                .windows(2)
                .all(|w| w[0].trigger <= w[1].trigger);
            if !(effects_ok && sorted) {
                return Err(RaceError::GimmickSchedule(i));
            }
        }
        let weather_ok = self.weather.iter().all(|w| ratio_ok(w.trigger))
            && self.weather.windows(2).all(|w| w[0].trigger <= w[1].trigger);
        if !weather_ok {
            return Err(RaceError::WeatherSchedule);
        }
        Ok(())
    }
}

fn ratio_ok(r: f64) -> bool {
    (0.0..=1.0).contains(&r)
}

fn duration_ok(d: f64) -> bool {
    d.is_finite() && d > 0.0
}

impl VehicleType {
    /// Picks a random vehicle for each of `count` horses.
    pub fn random_lineup<R: Rng + ?Sized>(
        rng: &mut R,
        count: usize,
    ) -> Vec<VehicleType> {
        (0..count)
            .map(|_| Self::ALL[rng.random_range(0..Self::ALL.len())])
            .collect()
    }
}

fn random_effect<R: Rng + ?Sized>(rng: &mut R) -> Effect {
    Effect {
        kind: GimmickKind::ALL[rng.random_range(0..GimmickKind::ALL.len())],
        duration: rng.random_range(GIMMICK_DURATION_MIN..=GIMMICK_DURATION_MAX),
    }
}

fn generate_gimmicks<R: Rng + ?Sized>(rng: &mut R) -> Vec<Gimmick> {
    let count = rng.random_range(GIMMICKS_PER_HORSE);
    let mut gimmicks: Vec<Gimmick> = (0..count)
        .map(|_| Gimmick {
            trigger: rng
                .random_range(GIMMICK_TRIGGER_MIN..=GIMMICK_TRIGGER_MAX),
            effect: random_effect(rng),
            follow_up: rng
                .random_bool(FOLLOW_UP_CHANCE)
                .then(|| random_effect(rng)),
        })
        .collect();
    gimmicks.sort_by(|a, b| a.trigger.total_cmp(&b.trigger));
    gimmicks
}

fn generate_weather<R: Rng + ?Sized>(rng: &mut R) -> Vec<WeatherEntry> {
    let pick = |rng: &mut R| {
        WeatherKind::ALL[rng.random_range(0..WeatherKind::ALL.len())]
    };
    let mut schedule = vec![WeatherEntry {
        trigger: 0.0,
        weather: pick(&mut *rng),
    }];
    let extra = rng.random_range(EXTRA_WEATHER_CHANGES);
    let mut triggers: Vec<f64> = (0..extra)
        .map(|_| rng.random_range(WEATHER_TRIGGER_MIN..=WEATHER_TRIGGER_MAX))
        .collect();
    triggers.sort_by(f64::total_cmp);
    schedule.extend(triggers.into_iter().map(|trigger| WeatherEntry {
        trigger,
        weather: pick(&mut *rng),
    }));
    schedule
}
