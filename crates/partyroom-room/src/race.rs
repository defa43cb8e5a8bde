//! Horse-race rounds: selection, countdown, the run and its result.

use std::time::Duration;

use partyroom_protocol::{GameType, Recipient, ServerEvent, TrackLength, VehicleType, WinMode};
use partyroom_race::{MAX_HORSES, MIN_HORSES, RaceParams, simulate, winners};
use partyroom_transport::ConnectionId;
use rand::Rng;
use tokio::time::Instant;

use crate::room::{PhaseTimer, Room};
use crate::{RoomError, RoomState};

impl Room {
    fn require_horse_race(&self) -> Result<(), RoomError> {
        if self.game_type == GameType::HorseRace {
            Ok(())
        } else {
            Err(RoomError::Validation("this room does not race".into()))
        }
    }

    /// Fields `clamp(players, 4, 6)` horses and opens betting.
    pub(crate) fn begin_selection(&mut self, players: Vec<String>) {
        let count = players.len().clamp(MIN_HORSES, MAX_HORSES);
        let lineup = VehicleType::random_lineup(&mut self.rng, count);

        self.set_state(RoomState::Selecting);
        self.round.players = players.clone();
        self.round.lineup = lineup.clone();
        self.emit(
            Recipient::All,
            ServerEvent::GameStarted {
                game_type: GameType::HorseRace,
                players: players.clone(),
            },
        );
        self.emit(
            Recipient::All,
            ServerEvent::HorseSelectionStarted {
                horses: (0..count).collect(),
                vehicles: lineup,
                players,
                track_length: self.track,
                win_mode: self.win_mode,
            },
        );
    }

    /// Places or moves the sender's bet. `None` picks a horse at random.
    pub fn select_horse(
        &mut self,
        conn: ConnectionId,
        horse: Option<usize>,
    ) -> Result<(), RoomError> {
        let name = self.require_member(conn)?;
        self.require_horse_race()?;
        if self.state != RoomState::Selecting {
            return Err(RoomError::Conflict("horses can only be picked during selection".into()));
        }
        if !self.round.players.contains(&name) {
            return Err(RoomError::Conflict("you are not playing this round".into()));
        }
        let count = self.round.lineup.len();
        let horse = match horse {
            Some(h) if h < count => h,
            Some(h) => {
                return Err(RoomError::Validation(format!(
                    "horse {h} does not exist, pick 0-{}",
                    count.saturating_sub(1)
                )));
            }
            None => self.rng.random_range(0..count),
        };

        self.round.bets.insert(name, horse);
        let selected = self.round.bets.keys().cloned().collect();
        self.emit(Recipient::All, ServerEvent::HorseSelectionUpdated { selected });
        Ok(())
    }

    /// Host closes betting and starts the countdown.
    pub fn start_horse_race(&mut self, conn: ConnectionId, now: Instant) -> Result<(), RoomError> {
        self.require_horse_race()?;
        self.require_host(conn)?;
        if self.state != RoomState::Selecting {
            return Err(RoomError::Conflict("no selection is open".into()));
        }
        let missing: Vec<&str> = self
            .round
            .players
            .iter()
            .filter(|p| !self.round.bets.contains_key(*p))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(RoomError::Conflict(format!(
                "still picking: {}",
                missing.join(", ")
            )));
        }

        self.set_state(RoomState::Countdown);
        self.arm(now + self.config.countdown, PhaseTimer::Countdown);
        self.emit(
            Recipient::All,
            ServerEvent::HorseRaceCountdown {
                seconds: self.config.countdown.as_secs(),
                bets: self.round.bets.clone(),
            },
        );
        Ok(())
    }

    /// Countdown expired: compute the outcome once and broadcast it.
    pub(crate) fn begin_race(&mut self, now: Instant) {
        if self.state != RoomState::Countdown {
            return;
        }
        let params = RaceParams::generate(&mut self.rng, self.track, &self.round.lineup);
        let outcome = simulate(&params);
        let playback = outcome.playback_duration();

        tracing::info!(
            room_id = %self.code,
            horses = params.horses.len(),
            track = %self.track,
            duration = playback,
            "race started"
        );
        self.set_state(RoomState::Active);
        let safety = Duration::try_from_secs_f64(playback).unwrap_or_default()
            + self.config.race_safety_margin;
        self.arm(now + safety, PhaseTimer::RaceSafety);
        self.emit(
            Recipient::All,
            ServerEvent::HorseRaceStarted {
                params: params.clone(),
                rankings: outcome.ranking.clone(),
                bets: self.round.bets.clone(),
                duration: playback,
            },
        );
        self.round.race = Some((params, outcome));
    }

    /// The first snapshot player to finish the animation ends the run.
    /// Reports from anyone else, or after the run, are ignored.
    pub fn race_animation_complete(
        &mut self,
        conn: ConnectionId,
        now: Instant,
    ) -> Result<(), RoomError> {
        let name = self.require_member(conn)?;
        self.require_horse_race()?;
        if self.state == RoomState::Active && self.round.players.contains(&name) {
            self.finish_race(false, now);
        }
        Ok(())
    }

    pub(crate) fn finish_race(&mut self, forced: bool, now: Instant) {
        if self.state != RoomState::Active {
            return;
        }
        let rankings = self
            .round
            .race
            .as_ref()
            .map(|(_, outcome)| outcome.ranking.clone())
            .unwrap_or_default();
        let winners = winners(&rankings, self.win_mode, &self.round.bets);

        tracing::info!(
            room_id = %self.code,
            winners = winners.len(),
            forced,
            "race ended"
        );
        let record = self.record(winners.clone(), Vec::new(), rankings.clone(), forced);
        self.race_history.push(record);

        self.set_state(RoomState::Result);
        if !self.auto_restart.is_zero() {
            self.arm(now + self.auto_restart, PhaseTimer::AutoRestart);
        }
        self.emit(
            Recipient::All,
            ServerEvent::HorseRaceEnded {
                rankings,
                winners,
                mode: self.win_mode,
                forced,
            },
        );
    }

    /// Host control that steps the race along whatever phase it is in:
    /// force-ends a run, dismisses a result, or cancels betting.
    pub fn end_horse_race(&mut self, conn: ConnectionId, now: Instant) -> Result<(), RoomError> {
        self.require_horse_race()?;
        self.require_host(conn)?;
        match self.state {
            RoomState::Active => self.finish_race(true, now),
            RoomState::Result | RoomState::Selecting | RoomState::Countdown => {
                self.return_to_waiting();
            }
            RoomState::Waiting => {
                return Err(RoomError::Conflict("no race is running".into()));
            }
        }
        Ok(())
    }

    /// Host discards past results and returns the room to waiting.
    pub fn reset_horse_race(&mut self, conn: ConnectionId) -> Result<(), RoomError> {
        self.require_horse_race()?;
        self.require_host(conn)?;
        self.race_history.clear();
        if self.state == RoomState::Waiting {
            self.emit(Recipient::All, ServerEvent::HorseRaceReset);
        } else {
            self.return_to_waiting();
        }
        Ok(())
    }

    pub(crate) fn return_to_waiting(&mut self) {
        tracing::debug!(room_id = %self.code, from = %self.state, "race reset");
        self.emit(Recipient::All, ServerEvent::HorseRaceReset);
        self.end_round();
    }

    pub fn set_track_length(
        &mut self,
        conn: ConnectionId,
        track_length: TrackLength,
    ) -> Result<(), RoomError> {
        self.require_horse_race()?;
        self.require_host(conn)?;
        if !matches!(self.state, RoomState::Waiting | RoomState::Selecting) {
            return Err(RoomError::Conflict(
                "track length is fixed once the countdown starts".into(),
            ));
        }
        self.track = track_length;
        self.emit(Recipient::All, ServerEvent::TrackLengthChanged { track_length });
        Ok(())
    }

    pub fn set_win_mode(&mut self, conn: ConnectionId, mode: WinMode) -> Result<(), RoomError> {
        self.require_horse_race()?;
        self.require_host(conn)?;
        if matches!(self.state, RoomState::Countdown | RoomState::Active) {
            return Err(RoomError::Conflict("win mode is fixed while racing".into()));
        }
        self.win_mode = mode;
        self.emit(Recipient::All, ServerEvent::WinModeChanged { mode });
        Ok(())
    }

    /// Zero turns the automatic return to waiting off.
    pub fn set_auto_restart(&mut self, conn: ConnectionId, seconds: u64) -> Result<(), RoomError> {
        self.require_horse_race()?;
        self.require_host(conn)?;
        let max = self.config.max_auto_restart.as_secs();
        if seconds > max {
            return Err(RoomError::Validation(format!(
                "auto restart must be 0-{max} seconds"
            )));
        }
        self.auto_restart = Duration::from_secs(seconds);
        self.emit(Recipient::All, ServerEvent::AutoRestartChanged { seconds });
        Ok(())
    }
}
