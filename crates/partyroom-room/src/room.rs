//! The per-room state machine.
//!
//! A [`Room`] is plain synchronous state. Every operation validates first,
//! then mutates and queues events, so a rejected request leaves nothing
//! behind. The actor in `actor.rs` owns one `Room`, feeds it commands in
//! arrival order and fans out whatever [`Room::take_outbox`] returns.
//!
//! Time only enters through the `now` arguments; the room never reads a
//! clock for scheduling, which keeps timer behaviour testable.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::net::IpAddr;
use std::time::Duration;

use partyroom_protocol::{
    ChatMessage, ClientEvent, CreateRoom, DiceRoll, ExpiryHours, GameType,
    JoinRoom, Recipient, RoomCode, RoomSnapshot, RoomSummary, ServerEvent,
    TrackLength, VehicleType, WinMode,
};
use partyroom_race::{RaceOutcome, RaceParams};
use partyroom_session::resolve_unique_name;
use partyroom_transport::ConnectionId;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::time::Instant;

use crate::members::{Member, Members};
use crate::outbox::{Outbox, RoundRecord, unix_millis};
use crate::{RoomConfig, RoomError, RoomState};

/// Longest emoji key accepted by `toggleReaction`.
const MAX_EMOJI_LEN: usize = 16;

/// A connection asking to enter a room.
#[derive(Debug, Clone, Copy)]
pub struct Joiner {
    pub conn: ConnectionId,
    pub ip: IpAddr,
}

/// Which phase timer is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PhaseTimer {
    Countdown,
    RaceSafety,
    AutoRestart,
    RouletteSpin,
}

/// The round in progress. Reset wholesale when the room returns to
/// waiting.
#[derive(Debug, Default)]
pub(crate) struct Round {
    /// Frozen at round start. Departures and dice players who drop
    /// before rolling are purged, nobody is added.
    pub players: Vec<String>,
    /// Players who have taken their turn.
    pub completed: BTreeSet<String>,
    pub rolls: Vec<DiceRoll>,
    pub roulette_winner: Option<String>,
    pub lineup: Vec<VehicleType>,
    pub bets: BTreeMap<String, usize>,
    pub race: Option<(RaceParams, RaceOutcome)>,
}

pub struct Room {
    pub(crate) code: RoomCode,
    pub(crate) title: String,
    pub(crate) game_type: GameType,
    /// `Some` iff the room is private.
    pub(crate) password: Option<String>,
    pub(crate) expiry: ExpiryHours,
    pub(crate) block_ip_per_user: bool,
    pub(crate) created_at: u64,
    pub(crate) config: RoomConfig,

    pub(crate) state: RoomState,
    pub(crate) members: Members,
    pub(crate) ready: BTreeSet<String>,
    /// Per-member dice bounds from `updateDiceRange`.
    pub(crate) dice_ranges: BTreeMap<String, (u32, u32)>,
    pub(crate) round: Round,

    pub(crate) track: TrackLength,
    pub(crate) win_mode: WinMode,
    pub(crate) auto_restart: Duration,
    pub(crate) race_history: Vec<RoundRecord>,

    pub(crate) chat: VecDeque<ChatMessage>,
    pub(crate) next_message_id: u64,

    /// At most one phase timer is armed; any state change disarms it.
    pub(crate) phase_deadline: Option<(Instant, PhaseTimer)>,
    pub(crate) rng: StdRng,
    pub(crate) out: Outbox,
}

impl Room {
    /// Opens a room with `creator` as host.
    ///
    /// # Errors
    /// - [`RoomError::Validation`] on an empty or overlong name or title,
    ///   or a private room without a usable password.
    pub fn create(
        code: RoomCode,
        creator: Joiner,
        req: CreateRoom,
        config: RoomConfig,
    ) -> Result<Self, RoomError> {
        let user_name = clean(&req.user_name, config.max_name_len, "user name")?;
        let title = clean(&req.room_name, config.max_title_len, "room name")?;
        let password = if req.is_private {
            let pw = req.password.unwrap_or_default();
            let len = pw.chars().count();
            if len == 0 || len > config.max_password_len {
                return Err(RoomError::Validation(format!(
                    "private rooms need a password of 1-{} characters",
                    config.max_password_len
                )));
            }
            Some(pw)
        } else {
            None
        };

        let mut room = Self {
            code,
            title,
            game_type: req.game_type,
            password,
            expiry: req.expiry_hours,
            block_ip_per_user: req.block_ip_per_user,
            created_at: unix_millis(),
            state: RoomState::Waiting,
            members: Members::default(),
            ready: BTreeSet::new(),
            dice_ranges: BTreeMap::new(),
            round: Round::default(),
            track: TrackLength::default(),
            win_mode: WinMode::default(),
            auto_restart: config.auto_restart,
            race_history: Vec::new(),
            chat: VecDeque::new(),
            next_message_id: 1,
            phase_deadline: None,
            rng: StdRng::from_os_rng(),
            out: Outbox::default(),
            config,
        };
        room.members.push(Member::new(
            creator.conn,
            user_name.clone(),
            creator.ip,
            req.device_id,
        ));
        room.members.settle_host();
        room.ready.insert(user_name.clone());

        tracing::info!(
            room_id = %room.code,
            game = %room.game_type,
            host = %user_name,
            private = room.password.is_some(),
            "room created"
        );
        let snapshot = room.snapshot_for(&user_name);
        room.emit(Recipient::Conn(creator.conn), ServerEvent::RoomCreated(snapshot));
        Ok(room)
    }

    /// Replaces the room's random source. Tests use this to pin roulette
    /// picks, lineups and race parameters.
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    pub fn state(&self) -> RoomState {
        self.state
    }

    pub fn members(&self) -> &Members {
        &self.members
    }

    pub fn host(&self) -> Option<&str> {
        self.members.host()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn expiry(&self) -> ExpiryHours {
        self.expiry
    }

    /// Ready members in join order.
    pub fn ready_users(&self) -> Vec<String> {
        self.members
            .names()
            .filter(|n| self.ready.contains(*n))
            .map(str::to_string)
            .collect()
    }

    pub fn game_players(&self) -> &[String] {
        &self.round.players
    }

    pub fn dice_history(&self) -> &[DiceRoll] {
        &self.round.rolls
    }

    /// Finished races since the last `resetHorseRace`.
    pub fn race_history(&self) -> &[RoundRecord] {
        &self.race_history
    }

    pub fn chat(&self) -> impl Iterator<Item = &ChatMessage> {
        self.chat.iter()
    }

    /// Name of the connected member on `conn`.
    pub fn member_name(&self, conn: ConnectionId) -> Option<&str> {
        self.members.by_conn(conn).map(|m| m.name.as_str())
    }

    /// Drains events and records queued since the last call.
    pub fn take_outbox(&mut self) -> Outbox {
        std::mem::take(&mut self.out)
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            room_id: self.code.clone(),
            room_name: self.title.clone(),
            game_type: self.game_type,
            is_private: self.password.is_some(),
            members: self.members.len(),
            game_active: self.state.is_round_active(),
            expiry_hours: self.expiry,
            created_at: self.created_at,
        }
    }

    /// Full view for the member called `name`.
    pub fn snapshot_for(&self, name: &str) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.code.clone(),
            room_name: self.title.clone(),
            game_type: self.game_type,
            is_private: self.password.is_some(),
            expiry_hours: self.expiry,
            created_at: self.created_at,
            your_name: name.to_string(),
            is_host: self.host() == Some(name),
            phase: self.state.into(),
            game_active: self.state.is_round_active(),
            users: self.user_infos(),
            ready_users: self.ready_users(),
            game_players: self.round.players.clone(),
            dice_history: self.round.rolls.clone(),
            chat: self.chat.iter().cloned().collect(),
            track_length: self.track,
            win_mode: self.win_mode,
            auto_restart_secs: self.auto_restart.as_secs(),
        }
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Adds `joiner` and returns the name they were given.
    ///
    /// A name matching a disconnected member reclaims that record.
    /// Otherwise the name is made unique within the room.
    pub fn join(&mut self, joiner: Joiner, req: JoinRoom) -> Result<String, RoomError> {
        let requested = clean(&req.user_name, self.config.max_name_len, "user name")?;
        if let Some(expected) = &self.password {
            if req.password.as_deref() != Some(expected.as_str()) {
                return Err(RoomError::Permission("wrong room password".into()));
            }
        }
        if self.members.by_conn(joiner.conn).is_some() {
            return Err(RoomError::Conflict("already in this room".into()));
        }

        if self.members.by_name(&requested).is_some_and(|m| !m.connected) {
            return Ok(self.reconnect(joiner, requested, req.device_id));
        }

        if self.members.len() >= self.config.max_members {
            return Err(RoomError::Conflict("room is full".into()));
        }
        if self.block_ip_per_user
            && self
                .members
                .connected()
                .any(|m| m.same_origin(joiner.ip, req.device_id.as_deref()))
        {
            return Err(RoomError::Conflict(
                "someone from this network is already in the room".into(),
            ));
        }
        if req.is_host && self.members.has_connected_host() {
            return Err(RoomError::Conflict("room already has a host".into()));
        }

        let name =
            resolve_unique_name(&requested, self.members.names(), self.config.max_name_len);
        self.members.push(Member::new(
            joiner.conn,
            name.clone(),
            joiner.ip,
            req.device_id,
        ));
        if !self.state.is_round_active() {
            self.ready.insert(name.clone());
        }
        let host_changed = self.members.settle_host();

        tracing::info!(
            room_id = %self.code,
            conn_id = %joiner.conn,
            name = %name,
            members = self.members.len(),
            "member joined"
        );
        self.announce_arrival(joiner.conn, &name, host_changed);
        Ok(name)
    }

    fn reconnect(
        &mut self,
        joiner: Joiner,
        name: String,
        device_id: Option<String>,
    ) -> String {
        if let Some(member) = self.members.by_name_mut(&name) {
            member.conn = joiner.conn;
            member.ip = joiner.ip;
            member.connected = true;
            member.stale_until = None;
            if device_id.is_some() {
                member.device_id = device_id;
            }
        }
        let host_changed = self.members.settle_host();

        tracing::info!(
            room_id = %self.code,
            conn_id = %joiner.conn,
            name = %name,
            "member reconnected"
        );
        self.announce_arrival(joiner.conn, &name, host_changed);
        name
    }

    fn announce_arrival(
        &mut self,
        conn: ConnectionId,
        name: &str,
        host_changed: Option<String>,
    ) {
        let snapshot = self.snapshot_for(name);
        self.emit(Recipient::Conn(conn), ServerEvent::RoomJoined(snapshot));
        if let Some(host) = host_changed {
            self.emit(Recipient::AllExcept(conn), ServerEvent::HostChanged { host });
        }
        self.emit_users(Recipient::AllExcept(conn));
        self.emit(
            Recipient::AllExcept(conn),
            ServerEvent::ReadyUsersUpdated {
                ready_users: self.ready_users(),
            },
        );
    }

    /// Explicit `leaveRoom`.
    pub fn leave(&mut self, conn: ConnectionId) -> Result<(), RoomError> {
        let name = self.require_member(conn)?;
        self.emit(
            Recipient::Conn(conn),
            ServerEvent::RoomLeft {
                room_id: self.code.clone(),
            },
        );
        self.depart(&name);
        Ok(())
    }

    /// The connection on `conn` dropped without leaving.
    ///
    /// The member is kept as a disconnected record for the reconnect
    /// grace, or removed at once when the grace is zero.
    pub fn disconnect(&mut self, conn: ConnectionId, now: Instant) {
        let Some(name) = self.member_name(conn).map(str::to_string) else {
            return;
        };
        if self.config.reconnect_grace.is_zero() {
            self.depart(&name);
            return;
        }

        if let Some(member) = self.members.by_name_mut(&name) {
            member.connected = false;
            member.stale_until = Some(now + self.config.reconnect_grace);
        }
        tracing::info!(room_id = %self.code, %conn, name = %name, "member disconnected");

        if let Some(host) = self.members.settle_host() {
            tracing::info!(room_id = %self.code, host = %host, "host changed");
            self.emit(Recipient::All, ServerEvent::HostChanged { host });
        }
        self.emit_users(Recipient::All);

        // A pending roller stops blocking the round. Their completed turn
        // and ready flag stay with the stale record.
        if self.game_type == GameType::Dice
            && self.state == RoomState::Active
            && !self.round.completed.contains(&name)
            && self.round.players.contains(&name)
        {
            self.round.players.retain(|p| *p != name);
            self.emit_roll_progress();
            self.check_round_completion();
        }
    }

    /// Removes `name` for good and runs the completion check.
    pub(crate) fn depart(&mut self, name: &str) {
        if self.members.remove(name).is_none() {
            return;
        }
        let was_ready = self.ready.remove(name);
        self.dice_ranges.remove(name);
        self.round.players.retain(|p| p != name);
        self.round.completed.remove(name);
        self.round.bets.remove(name);

        tracing::info!(
            room_id = %self.code,
            name = %name,
            members = self.members.len(),
            "member left"
        );

        let host_changed = self.members.settle_host();
        if self.members.is_empty() {
            self.phase_deadline = None;
            return;
        }

        // Host and membership go out before anything the departure causes.
        if let Some(host) = host_changed {
            tracing::info!(room_id = %self.code, host = %host, "host changed");
            self.emit(Recipient::All, ServerEvent::HostChanged { host });
        }
        self.emit_users(Recipient::All);
        if was_ready {
            self.emit(
                Recipient::All,
                ServerEvent::ReadyUsersUpdated {
                    ready_users: self.ready_users(),
                },
            );
        }
        if self.game_type == GameType::Dice && self.state == RoomState::Active {
            self.emit_roll_progress();
        }
        if self.round.roulette_winner.as_deref() == Some(name) {
            self.redraw_roulette_winner();
        }
        self.check_round_completion();
    }

    /// Flips the sender's ready flag. Only between rounds.
    pub fn toggle_ready(&mut self, conn: ConnectionId) -> Result<(), RoomError> {
        let name = self.require_member(conn)?;
        if self.state.is_round_active() {
            return Err(RoomError::Conflict("cannot change ready during a round".into()));
        }
        let is_ready = if self.ready.remove(&name) {
            false
        } else {
            self.ready.insert(name);
            true
        };
        self.emit(Recipient::Conn(conn), ServerEvent::ReadyStateChanged { is_ready });
        self.emit(
            Recipient::All,
            ServerEvent::ReadyUsersUpdated {
                ready_users: self.ready_users(),
            },
        );
        Ok(())
    }

    pub fn kick(&mut self, conn: ConnectionId, target: &str) -> Result<(), RoomError> {
        let by = self.require_host(conn)?;
        let Some(member) = self.members.by_name(target) else {
            return Err(RoomError::NotFound(format!("no member named {target}")));
        };
        if member.name == by {
            return Err(RoomError::Validation("cannot kick yourself".into()));
        }
        if member.connected {
            let to = Recipient::Conn(member.conn);
            self.emit(to, ServerEvent::Kicked { by: by.clone() });
        }
        tracing::info!(room_id = %self.code, target = %target, by = %by, "member kicked");
        self.depart(target);
        Ok(())
    }

    pub fn transfer_host(&mut self, conn: ConnectionId, target: &str) -> Result<(), RoomError> {
        self.members.transfer_host(conn, target)?;
        tracing::info!(room_id = %self.code, host = %target, "host transferred");
        self.emit(
            Recipient::All,
            ServerEvent::HostChanged {
                host: target.to_string(),
            },
        );
        self.emit_users(Recipient::All);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Chat
    // -----------------------------------------------------------------------

    pub fn send_message(&mut self, conn: ConnectionId, message: &str) -> Result<(), RoomError> {
        let user_name = self.require_member(conn)?;
        let message = message.trim();
        let len = message.chars().count();
        if len == 0 || len > self.config.max_message_len {
            return Err(RoomError::Validation(format!(
                "messages must be 1-{} characters",
                self.config.max_message_len
            )));
        }

        let msg = ChatMessage {
            id: self.next_message_id,
            user_name,
            message: message.to_string(),
            sent_at: unix_millis(),
            reactions: BTreeMap::new(),
        };
        self.next_message_id += 1;
        self.chat.push_back(msg.clone());
        while self.chat.len() > self.config.chat_history {
            self.chat.pop_front();
        }
        self.emit(Recipient::All, ServerEvent::NewMessage(msg));
        Ok(())
    }

    /// Adds or removes the sender under `emoji` on a message.
    pub fn toggle_reaction(
        &mut self,
        conn: ConnectionId,
        message_id: u64,
        emoji: &str,
    ) -> Result<(), RoomError> {
        let name = self.require_member(conn)?;
        let emoji = emoji.trim();
        if emoji.is_empty() || emoji.chars().count() > MAX_EMOJI_LEN {
            return Err(RoomError::Validation("invalid reaction".into()));
        }
        let Some(msg) = self.chat.iter_mut().find(|m| m.id == message_id) else {
            return Err(RoomError::NotFound(format!("no message {message_id}")));
        };

        let names = msg.reactions.entry(emoji.to_string()).or_default();
        match names.iter().position(|n| *n == name) {
            Some(idx) => {
                names.remove(idx);
            }
            None => names.push(name),
        }
        if names.is_empty() {
            msg.reactions.remove(emoji);
        }
        let reactions = msg.reactions.clone();
        self.emit(
            Recipient::All,
            ServerEvent::MessageReactionUpdated {
                message_id,
                reactions,
            },
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Dispatch and timers
    // -----------------------------------------------------------------------

    /// Applies one in-room client event from `conn`.
    pub fn handle_event(
        &mut self,
        conn: ConnectionId,
        event: ClientEvent,
        now: Instant,
    ) -> Result<(), RoomError> {
        match event {
            ClientEvent::CreateRoom(_)
            | ClientEvent::JoinRoom(_)
            | ClientEvent::LeaveRoom
            | ClientEvent::ListRooms
            | ClientEvent::GetMenus { .. }
            | ClientEvent::AddMenu { .. }
            | ClientEvent::Heartbeat { .. } => Err(RoomError::Validation(
                "lobby events are not handled by rooms".into(),
            )),

            ClientEvent::ToggleReady => self.toggle_ready(conn),
            ClientEvent::KickPlayer { target_name } => self.kick(conn, &target_name),
            ClientEvent::TransferHost { target_name } => {
                self.transfer_host(conn, &target_name)
            }

            ClientEvent::StartGame => self.start_game(conn, now),
            ClientEvent::EndGame => self.end_game(conn),
            ClientEvent::RequestRoll(req) => self.request_roll(conn, req),
            ClientEvent::UpdateDiceRange { min, max } => {
                self.update_dice_range(conn, min, max)
            }

            ClientEvent::SelectHorse { horse_index } => {
                self.select_horse(conn, Some(horse_index))
            }
            ClientEvent::SelectRandomHorse => self.select_horse(conn, None),
            ClientEvent::StartHorseRace => self.start_horse_race(conn, now),
            ClientEvent::EndHorseRace => self.end_horse_race(conn, now),
            ClientEvent::ResetHorseRace => self.reset_horse_race(conn),
            ClientEvent::RaceAnimationComplete => {
                self.race_animation_complete(conn, now)
            }
            ClientEvent::SetTrackLength { track_length } => {
                self.set_track_length(conn, track_length)
            }
            ClientEvent::SetWinMode { mode } => self.set_win_mode(conn, mode),
            ClientEvent::SetAutoRestart { seconds } => self.set_auto_restart(conn, seconds),

            ClientEvent::SendMessage { message } => self.send_message(conn, &message),
            ClientEvent::ToggleReaction { message_id, emoji } => {
                self.toggle_reaction(conn, message_id, &emoji)
            }
        }
    }

    /// When the actor should next call [`on_timer`](Self::on_timer).
    pub fn next_deadline(&self) -> Option<Instant> {
        let phase = self.phase_deadline.map(|(at, _)| at);
        match (phase, self.members.next_stale_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fires every timer due at `now`. Timers whose phase has already
    /// moved on were disarmed by the state change and never fire here.
    pub fn on_timer(&mut self, now: Instant) {
        for name in self.members.expired(now) {
            tracing::debug!(room_id = %self.code, name = %name, "reconnect grace expired");
            self.depart(&name);
        }

        let Some((at, timer)) = self.phase_deadline else {
            return;
        };
        if at > now {
            return;
        }
        self.phase_deadline = None;
        match timer {
            PhaseTimer::Countdown => self.begin_race(now),
            PhaseTimer::RaceSafety => self.finish_race(false, now),
            PhaseTimer::AutoRestart => {
                if self.state == RoomState::Result {
                    self.return_to_waiting();
                }
            }
            PhaseTimer::RouletteSpin => self.end_roulette(false),
        }
    }

    // -----------------------------------------------------------------------
    // Helpers shared with rounds.rs and race.rs
    // -----------------------------------------------------------------------

    /// Queues `event` for every connected member `to` covers.
    pub(crate) fn emit(&mut self, to: Recipient, event: ServerEvent) {
        let conns = self
            .members
            .connected()
            .map(|m| m.conn)
            .filter(|c| to.includes(*c))
            .collect();
        self.out.push(conns, event);
    }

    fn emit_users(&mut self, to: Recipient) {
        let users = self.user_infos();
        self.emit(to, ServerEvent::UpdateUsers { users });
    }

    fn user_infos(&self) -> Vec<partyroom_protocol::UserInfo> {
        self.members.user_infos(|n| self.ready.contains(n))
    }

    /// Moves to `next` and disarms any pending phase timer.
    pub(crate) fn set_state(&mut self, next: RoomState) {
        debug_assert!(
            self.state.can_transition_to(next, self.game_type),
            "{} -> {next} is not a {} transition",
            self.state,
            self.game_type
        );
        tracing::debug!(room_id = %self.code, from = %self.state, to = %next, "phase change");
        self.state = next;
        self.phase_deadline = None;
    }

    pub(crate) fn arm(&mut self, at: Instant, timer: PhaseTimer) {
        self.phase_deadline = Some((at, timer));
    }

    pub(crate) fn require_member(&self, conn: ConnectionId) -> Result<String, RoomError> {
        self.member_name(conn)
            .map(str::to_string)
            .ok_or_else(|| RoomError::NotFound("not a member of this room".into()))
    }

    /// The sender's name if they are the host.
    pub(crate) fn require_host(&self, conn: ConnectionId) -> Result<String, RoomError> {
        let name = self.require_member(conn)?;
        if self.members.is_host(conn) {
            Ok(name)
        } else {
            Err(RoomError::Permission("only the host can do that".into()))
        }
    }

    pub(crate) fn record(
        &mut self,
        winners: Vec<String>,
        dice: Vec<DiceRoll>,
        rankings: Vec<partyroom_protocol::RankEntry>,
        forced: bool,
    ) -> RoundRecord {
        let record = RoundRecord {
            room_id: self.code.clone(),
            room_name: self.title.clone(),
            game_type: self.game_type,
            players: self.round.players.clone(),
            winners,
            dice,
            rankings,
            forced,
            finished_at: unix_millis(),
        };
        self.out.records.push(record.clone());
        record
    }

    /// Closes the round: back to waiting, nobody ready.
    pub(crate) fn end_round(&mut self) {
        self.set_state(RoomState::Waiting);
        self.round = Round::default();
        self.ready.clear();
        self.emit(
            Recipient::All,
            ServerEvent::ReadyUsersUpdated {
                ready_users: Vec::new(),
            },
        );
    }
}

/// Trims `raw` and checks it is 1..=`max` characters.
fn clean(raw: &str, max: usize, what: &str) -> Result<String, RoomError> {
    let value = raw.trim();
    let len = value.chars().count();
    if len == 0 || len > max {
        return Err(RoomError::Validation(format!("{what} must be 1-{max} characters")));
    }
    Ok(value.to_string())
}
