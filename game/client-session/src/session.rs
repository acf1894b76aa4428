use std::{sync::Arc, time::Duration};

use base::system::{System, SystemTimeInterface};
use model::{
    events::events::SimulationEvent,
    game_options::game_options::Craft,
    game_session::game_session::GameSession,
    level::level::Level,
    track::track::Track,
    types::types::SimulationTime,
};
use object_factory::ObjectFactory;
use parking_lot::Mutex;
use strum::IntoEnumIterator;
use thiserror::Error;

use crate::{
    chat::{ChatComposer, ChatMessage, ChatStack},
    clock::Clock,
    meta::{MetaSession, TrackPeer},
    phase::Phase,
    player::Player,
    results::{HitResult, RaceResult},
    rules::Rules,
};

pub const MAX_PLAYERS: usize = 4;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("a track can only be loaded before the race")]
    NotInInitPhase,
    #[error("failed to load the track: {0}")]
    Load(#[from] anyhow::Error),
}

/// One race as the local client sees it.
///
/// The session is driven by calling [`ClientSession::process`] once per
/// frame. Time is read from the [`System`] time source only.
#[derive(Debug)]
pub struct ClientSession {
    phase: Phase,
    system: System,
    last_process: Duration,

    rules: Arc<Rules>,
    game_session: GameSession,
    title: String,
    track_peer: Option<TrackPeer>,
    meta: Option<Arc<dyn MetaSession>>,

    players: [Option<Arc<Player>>; MAX_PLAYERS],
    finish_order: Vec<usize>,
    postgame_start: SimulationTime,

    clock: Clock,
    countdown: Clock,
    countdown_armed: bool,

    chat: Mutex<ChatStack>,
    chat_inbox: Mutex<Vec<String>>,
    composer: ChatComposer,
}

impl ClientSession {
    pub fn new(rules: Arc<Rules>, factory: Arc<ObjectFactory>, system: System) -> Self {
        let game_session = GameSession::new(factory, rules.game_options.clone());
        Self {
            phase: Phase::Init,
            last_process: system.time_get_nanoseconds(),
            system,

            rules,
            game_session,
            title: String::new(),
            track_peer: None,
            meta: None,

            players: Default::default(),
            finish_order: Vec::new(),
            postgame_start: 0,

            clock: Clock::default(),
            countdown: Clock::default(),
            countdown_armed: false,

            chat: Default::default(),
            chat_inbox: Default::default(),
            composer: Default::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Moves to the next phase, `false` once the session is done.
    ///
    /// Entering [`Phase::Pregame`] starts the countdown to the race.
    pub fn advance_phase(&mut self) -> bool {
        let Some(next) = self.phase.next() else {
            return false;
        };
        log::info!(target: "client_session", "phase {} -> {next}", self.phase);
        self.phase = next;

        match next {
            Phase::Pregame => self.countdown_to_next_phase(self.rules.countdown),
            Phase::Playing => {
                self.countdown_armed = false;
                self.clock.set(0);
            }
            Phase::Postgame => self.postgame_start = self.clock.time(),
            Phase::Init | Phase::Done => {}
        }

        if let Some(meta) = &self.meta {
            meta.on_phase_changed(next);
        }
        true
    }

    /// Like [`ClientSession::advance_phase`], but only if `phase` is the next one.
    pub fn advance_phase_to(&mut self, phase: Phase) -> bool {
        if self.phase.next() != Some(phase) {
            log::error!(
                target: "client_session",
                "invalid phase transition {} -> {phase}",
                self.phase
            );
            return false;
        }
        self.advance_phase()
    }

    /// Loads the track of the race. Crafts are created for the players
    /// that are already attached.
    pub fn load_new(&mut self, title: &str, track: Track) -> Result<(), SessionError> {
        if self.phase != Phase::Init {
            return Err(SessionError::NotInInitPhase);
        }

        self.game_session.load_new(track);
        self.game_session.set_lap_count(self.rules.laps);
        let laps = self.game_session.lap_count();
        self.track_peer = self
            .game_session
            .header()
            .map(|header| TrackPeer::new(header, laps));
        self.title = title.to_string();
        self.finish_order.clear();
        self.clock.set(0);

        for slot in 0..MAX_PLAYERS {
            if let Some(player) = self.players[slot].clone() {
                self.add_craft(slot, &player)?;
            }
        }
        Ok(())
    }

    fn add_craft(&mut self, slot: usize, player: &Player) -> anyhow::Result<()> {
        let options = self.game_session.options();
        let craft = if options.is_craft_allowed(player.craft()) {
            player.craft()
        } else {
            let craft = Craft::iter()
                .find(|&craft| options.is_craft_allowed(craft))
                .unwrap_or_default();
            log::warn!(
                target: "client_session",
                "craft {} of {} is not allowed, using {craft}",
                player.craft(),
                player.name()
            );
            craft
        };
        self.game_session.add_main_character(slot, craft)
    }

    /// Puts a player in slot `index`.
    ///
    /// Panics if `index` is not below [`MAX_PLAYERS`].
    pub fn attach_player(&mut self, index: usize, player: Arc<Player>) {
        assert!(
            index < MAX_PLAYERS,
            "player slot {index} is out of range (max {MAX_PLAYERS})"
        );
        log::debug!(target: "client_session", "{} takes slot {index}", player.name());
        if self.game_session.header().is_some() {
            if let Err(err) = self.add_craft(index, &player) {
                log::error!(
                    target: "client_session",
                    "no craft for {}: {err}",
                    player.name()
                );
            }
        }
        self.players[index] = Some(player);
    }

    /// Runs one frame: chat, countdown and the simulation up to now.
    pub fn process(&mut self) {
        let now = self.system.time_get_nanoseconds();
        let elapsed = SimulationTime::try_from(
            now.as_millis()
                .saturating_sub(self.last_process.as_millis()),
        )
        .unwrap_or(SimulationTime::MAX);
        self.last_process = now;

        let inbox = std::mem::take(&mut *self.chat_inbox.lock());
        for msg in inbox {
            self.add_message(&msg);
        }

        let was_racing = self.phase.is_racing();
        let mut race_elapsed = if was_racing { elapsed } else { 0 };
        if self.countdown_armed {
            let left = self.countdown.advance(elapsed);
            if left >= 0 {
                self.countdown_armed = false;
                self.countdown.set(0);
                self.advance_phase();
                // only the time after the start counts for the race
                if !was_racing && self.phase.is_racing() {
                    race_elapsed = left;
                }
            }
        }

        if self.phase.is_racing() {
            self.clock.advance(race_elapsed);
            self.simulate();
        }
    }

    fn simulate(&mut self) {
        for (slot, player) in self.players.iter().enumerate() {
            if let Some(player) = player {
                self.game_session.set_controls(slot, player.controls());
            }
        }

        for event in self.game_session.simulate(self.clock.time()) {
            match event {
                SimulationEvent::Finished { slot, time } => {
                    log::info!(
                        target: "client_session",
                        "slot {slot} finished in {}",
                        crate::clock::fmt_sim_time(time)
                    );
                    self.finish_order.push(slot);
                    if let Some(meta) = &self.meta {
                        meta.on_player_finished(slot, time);
                    }
                }
                SimulationEvent::LapCompleted { slot, lap, lap_time } => {
                    log::debug!(
                        target: "client_session",
                        "slot {slot} completed lap {lap} in {}",
                        crate::clock::fmt_sim_time(lap_time)
                    );
                }
                _ => {}
            }
        }

        if self.phase == Phase::Playing && !self.finish_order.is_empty() {
            self.advance_phase();
        }
        if self.phase == Phase::Postgame {
            let crafts = (0..MAX_PLAYERS)
                .filter(|&slot| self.game_session.character(slot).is_some())
                .count();
            let timed_out =
                self.clock.time() - self.postgame_start >= self.rules.post_game_timeout;
            if self.finish_order.len() >= crafts || timed_out {
                self.advance_phase();
            }
        }
    }

    /// Number of players that finished the race.
    pub fn result_available(&self) -> usize {
        self.finish_order.len()
    }

    /// Slots in race order: finishers first, the others by laps done.
    fn ranking(&self) -> Vec<usize> {
        let mut others: Vec<_> = (0..MAX_PLAYERS)
            .filter(|slot| self.players[*slot].is_some() && !self.finish_order.contains(slot))
            .collect();
        others.sort_by_key(|&slot| {
            let laps = self
                .game_session
                .character(slot)
                .map_or(0, |c| c.state.lap.laps_done());
            (std::cmp::Reverse(laps), slot)
        });
        self.finish_order
            .iter()
            .copied()
            .chain(others)
            .collect()
    }

    /// Result of the player at race position `position` (0 is the winner).
    pub fn get_result(&self, position: usize) -> Option<RaceResult> {
        let slot = *self.ranking().get(position)?;
        let player = self.players[slot].as_ref()?;
        let lap = self.game_session.character(slot).map(|c| &c.state.lap);
        Some(RaceResult {
            slot,
            name: player.name().to_string(),
            id: player.id(),
            connected: player.is_connected(),
            laps: lap.map_or(0, |lap| lap.laps_done()),
            finish_time: lap.and_then(|lap| lap.finish_time()),
            best_lap: lap.and_then(|lap| lap.best_lap()),
        })
    }

    /// Hit statistics ordered by most hits given.
    pub fn get_hit_result(&self, position: usize) -> Option<HitResult> {
        let mut results: Vec<_> = self
            .players
            .iter()
            .enumerate()
            .filter_map(|(slot, player)| {
                let player = player.as_ref()?;
                let state = self.game_session.character(slot).map(|c| &c.state);
                Some(HitResult {
                    slot,
                    name: player.name().to_string(),
                    id: player.id(),
                    connected: player.is_connected(),
                    hits_given: state.map_or(0, |s| s.hits_given),
                    hits_received: state.map_or(0, |s| s.hits_received),
                })
            })
            .collect();
        results.sort_by_key(|r| (std::cmp::Reverse(r.hits_given), r.hits_received, r.slot));
        results.into_iter().nth(position)
    }

    /// Race position of the player in `slot`.
    pub fn get_rank(&self, slot: usize) -> Option<usize> {
        self.ranking().iter().position(|&s| s == slot)
    }

    pub fn get_nb_players(&self) -> usize {
        self.players.iter().flatten().count()
    }

    pub fn get_player(&self, slot: usize) -> Option<&Player> {
        self.players.get(slot)?.as_deref()
    }

    pub fn share_player(&self, slot: usize) -> Option<Arc<Player>> {
        self.players.get(slot)?.clone()
    }

    /// Feeds a key to the message being composed, a committed message is added.
    pub fn add_message_key(&mut self, key: char) {
        if let Some(msg) = self.composer.add_key(key) {
            self.add_message(&msg);
        }
    }

    pub fn get_current_message(&self) -> &str {
        self.composer.current()
    }

    pub fn add_message(&self, msg: &str) -> u64 {
        let now = self.system.time_get_nanoseconds();
        let index = self.chat.lock().add(msg, now);
        log::debug!(target: "chat", "{msg}");
        index
    }

    /// Queues a message from any thread, it shows up on the next
    /// [`ClientSession::process`].
    pub fn post_message(&self, msg: &str) {
        self.chat_inbox.lock().push(msg.to_string());
    }

    pub fn get_message_stack(&self, level: usize, expiration: Duration) -> Option<ChatMessage> {
        let now = self.system.time_get_nanoseconds();
        self.chat.lock().get(level, expiration, now).cloned()
    }

    pub fn last_message_index(&self) -> Option<u64> {
        self.chat.lock().last_index()
    }

    /// Race clock, zero at the start.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Negative while counting down.
    pub fn countdown(&self) -> &Clock {
        &self.countdown
    }

    /// The session moves to the next phase once `duration` ms have passed.
    pub fn countdown_to_next_phase(&mut self, duration: SimulationTime) {
        self.countdown.set(-duration.max(0));
        self.countdown_armed = true;
    }

    pub fn set_simulation_time(&mut self, time: SimulationTime) {
        self.clock.set(time);
    }

    pub fn get_simulation_time(&self) -> SimulationTime {
        self.clock.time()
    }

    pub fn get_meta(&self) -> Option<&Arc<dyn MetaSession>> {
        self.meta.as_ref()
    }

    pub fn set_meta(&mut self, meta: Arc<dyn MetaSession>) {
        self.meta = Some(meta);
    }

    pub fn get_track_peer(&self) -> Option<&TrackPeer> {
        self.track_peer.as_ref()
    }

    pub fn get_rules(&self) -> &Arc<Rules> {
        &self.rules
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// `None` until a track is loaded.
    pub fn get_current_level(&self) -> Option<&Level> {
        self.game_session
            .header()
            .map(|_| self.game_session.level())
    }

    pub fn game_session(&self) -> &GameSession {
        &self.game_session
    }

    pub fn game_session_mut(&mut self) -> &mut GameSession {
        &mut self.game_session
    }
}
