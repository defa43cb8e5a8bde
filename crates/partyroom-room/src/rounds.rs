//! Round lifecycle shared by every game, plus dice and roulette.

use partyroom_protocol::{DiceRoll, GameType, Recipient, RequestRoll, ServerEvent};
use partyroom_transport::ConnectionId;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::time::Instant;

use crate::room::{PhaseTimer, Room};
use crate::{RoomError, RoomState};

/// Rolls one die from a client-chosen seed. The same seed and bounds
/// always give the same result.
pub fn roll_die(seed: u64, min: u32, max: u32) -> u32 {
    ChaCha8Rng::seed_from_u64(seed).random_range(min..=max)
}

impl Room {
    /// Host starts a round with every connected ready member.
    pub fn start_game(&mut self, conn: ConnectionId, now: Instant) -> Result<(), RoomError> {
        self.require_host(conn)?;
        if self.state != RoomState::Waiting {
            return Err(RoomError::Conflict("a round is already running".into()));
        }
        let players: Vec<String> = self
            .members
            .connected()
            .filter(|m| self.ready.contains(&m.name))
            .map(|m| m.name.clone())
            .collect();
        if players.is_empty() {
            return Err(RoomError::Validation("nobody is ready".into()));
        }
        if self.game_type == GameType::Roulette && players.len() < 2 {
            return Err(RoomError::Validation(
                "roulette needs at least two ready players".into(),
            ));
        }

        tracing::info!(
            room_id = %self.code,
            game = %self.game_type,
            players = players.len(),
            "round started"
        );
        match self.game_type {
            GameType::Dice => {
                self.set_state(RoomState::Active);
                self.round.players = players.clone();
                self.emit(
                    Recipient::All,
                    ServerEvent::GameStarted {
                        game_type: GameType::Dice,
                        players,
                    },
                );
                self.emit_roll_progress();
            }
            GameType::Roulette => {
                let winner = players[self.rng.random_range(0..players.len())].clone();
                self.set_state(RoomState::Active);
                self.round.players = players.clone();
                self.round.roulette_winner = Some(winner.clone());
                self.arm(now + self.config.roulette_spin, PhaseTimer::RouletteSpin);
                self.emit(
                    Recipient::All,
                    ServerEvent::GameStarted {
                        game_type: GameType::Roulette,
                        players: players.clone(),
                    },
                );
                self.emit(
                    Recipient::All,
                    ServerEvent::RouletteStarted {
                        players,
                        winner,
                        spin_ms: self.config.roulette_spin.as_millis() as u64,
                    },
                );
            }
            GameType::HorseRace => self.begin_selection(players),
        }
        Ok(())
    }

    /// Host closes a dice or roulette round early.
    pub fn end_game(&mut self, conn: ConnectionId) -> Result<(), RoomError> {
        self.require_host(conn)?;
        match (self.game_type, self.state) {
            (GameType::HorseRace, _) => Err(RoomError::Validation(
                "horse races end with endHorseRace".into(),
            )),
            (GameType::Dice, RoomState::Active) => {
                self.finish_dice(true);
                Ok(())
            }
            (GameType::Roulette, RoomState::Active) => {
                self.end_roulette(true);
                Ok(())
            }
            _ => Err(RoomError::Conflict("no round is running".into())),
        }
    }

    /// One roll per snapshot player per round.
    pub fn request_roll(&mut self, conn: ConnectionId, req: RequestRoll) -> Result<(), RoomError> {
        let name = self.require_member(conn)?;
        if self.game_type != GameType::Dice {
            return Err(RoomError::Validation("this room does not play dice".into()));
        }
        if self.state != RoomState::Active {
            return Err(RoomError::Conflict("no round is running".into()));
        }
        if req.user_name.trim() != name {
            return Err(RoomError::Validation("you can only roll for yourself".into()));
        }
        if !self.round.players.contains(&name) {
            return Err(RoomError::Conflict("you are not playing this round".into()));
        }
        if self.round.completed.contains(&name) {
            return Err(RoomError::Conflict("you already rolled this round".into()));
        }
        let (default_min, default_max) = self
            .dice_ranges
            .get(&name)
            .copied()
            .unwrap_or(self.config.dice_default_range);
        let min = req.min.unwrap_or(default_min);
        let max = req.max.unwrap_or(default_max);
        self.check_range(min, max)?;

        let roll = DiceRoll {
            user_name: name.clone(),
            seed: req.seed,
            min,
            max,
            result: roll_die(req.seed, min, max),
        };
        tracing::debug!(room_id = %self.code, name = %name, result = roll.result, "dice rolled");
        self.round.rolls.push(roll.clone());
        self.round.completed.insert(name);
        self.emit(Recipient::All, ServerEvent::DiceRolled(roll));
        self.emit_roll_progress();
        self.check_round_completion();
        Ok(())
    }

    /// Stores the sender's default dice bounds.
    pub fn update_dice_range(
        &mut self,
        conn: ConnectionId,
        min: u32,
        max: u32,
    ) -> Result<(), RoomError> {
        let user_name = self.require_member(conn)?;
        self.check_range(min, max)?;
        self.dice_ranges.insert(user_name.clone(), (min, max));
        self.emit(
            Recipient::All,
            ServerEvent::DiceRangeUpdated { user_name, min, max },
        );
        Ok(())
    }

    fn check_range(&self, min: u32, max: u32) -> Result<(), RoomError> {
        if min >= max || max > self.config.dice_max {
            return Err(RoomError::Validation(format!(
                "dice range {min}..={max} must satisfy min < max <= {}",
                self.config.dice_max
            )));
        }
        Ok(())
    }

    pub(crate) fn emit_roll_progress(&mut self) {
        let not_rolled: Vec<String> = self
            .round
            .players
            .iter()
            .filter(|p| !self.round.completed.contains(*p))
            .cloned()
            .collect();
        let total = self.round.players.len();
        self.emit(
            Recipient::All,
            ServerEvent::RollProgress {
                rolled: total - not_rolled.len(),
                total,
                not_rolled,
            },
        );
    }

    /// Ends the round if nothing is left to wait for.
    ///
    /// Runs after every turn and every departure. Calling it again once
    /// the round is over does nothing.
    pub(crate) fn check_round_completion(&mut self) {
        if self.state == RoomState::Waiting {
            return;
        }
        let snapshot_empty = self.round.players.is_empty();
        match self.game_type {
            GameType::Dice => {
                if snapshot_empty {
                    self.finish_dice(true);
                } else if self
                    .round
                    .players
                    .iter()
                    .all(|p| self.round.completed.contains(p))
                {
                    self.emit(
                        Recipient::All,
                        ServerEvent::AllPlayersRolled {
                            results: self.round.rolls.clone(),
                        },
                    );
                    self.finish_dice(false);
                }
            }
            GameType::Roulette => {
                if snapshot_empty {
                    self.end_roulette(true);
                }
            }
            GameType::HorseRace => {
                if snapshot_empty && self.state != RoomState::Result {
                    tracing::info!(room_id = %self.code, "race cancelled, no players left");
                    self.return_to_waiting();
                }
            }
        }
    }

    fn finish_dice(&mut self, forced: bool) {
        let history = std::mem::take(&mut self.round.rolls);
        // Highest roll wins; the earlier roll keeps a tie.
        let winner = history
            .iter()
            .fold(None::<&DiceRoll>, |best, roll| match best {
                Some(b) if b.result >= roll.result => Some(b),
                _ => Some(roll),
            })
            .map(|r| r.user_name.clone());

        tracing::info!(
            room_id = %self.code,
            rolls = history.len(),
            forced,
            "dice round ended"
        );
        self.emit(
            Recipient::All,
            ServerEvent::GameEnded {
                game_type: GameType::Dice,
                history: history.clone(),
                winner: winner.clone(),
                forced,
            },
        );
        self.record(winner.into_iter().collect(), history, Vec::new(), forced);
        self.end_round();
    }

    /// Draws a new roulette winner from the remaining snapshot. With
    /// nobody left the round is closed by the completion check instead.
    pub(crate) fn redraw_roulette_winner(&mut self) {
        if self.game_type != GameType::Roulette || self.state != RoomState::Active {
            return;
        }
        if self.round.players.is_empty() {
            self.round.roulette_winner = None;
            return;
        }
        let players = self.round.players.clone();
        let winner = players[self.rng.random_range(0..players.len())].clone();
        tracing::info!(room_id = %self.code, winner = %winner, "roulette winner redrawn");
        self.round.roulette_winner = Some(winner.clone());
        self.emit(
            Recipient::All,
            ServerEvent::RouletteWinnerChanged { players, winner },
        );
    }

    pub(crate) fn end_roulette(&mut self, forced: bool) {
        if self.game_type != GameType::Roulette || self.state != RoomState::Active {
            return;
        }
        let winner = self.round.roulette_winner.take();
        if let Some(winner) = &winner {
            self.emit(
                Recipient::All,
                ServerEvent::RouletteEnded {
                    winner: winner.clone(),
                },
            );
        }
        tracing::info!(room_id = %self.code, forced, "roulette round ended");
        self.emit(
            Recipient::All,
            ServerEvent::GameEnded {
                game_type: GameType::Roulette,
                history: Vec::new(),
                winner: winner.clone(),
                forced,
            },
        );
        self.record(winner.into_iter().collect(), Vec::new(), Vec::new(), forced);
        self.end_round();
    }
}
