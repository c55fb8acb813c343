use derivative::Derivative;
use lax_common::{
    bundles::HomeAwayBundle,
    clock_string,
    config::{Game as GameConfig, ValidationError},
    game_snapshot::{GamePeriod, GameSnapshot, PenaltySnapshot},
    position::Position,
    stats::{StatKind, UnknownStat},
    team::Team,
};
use log::*;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::watch;

pub mod clock;
use clock::Clock;

pub mod game_log;
use game_log::{EventContext, GameLog};

pub mod penalty;
use penalty::ActivePenalty;

pub mod roster;
use roster::{Player, PlayerRef, Roster};

mod stat_ledger;
pub use stat_ledger::RecordOutcome;
use stat_ledger::StatLedger;

/// Something the clocks did during a tick that the host may want to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// The game clock hit zero. The clock is stopped, the period is not advanced.
    PeriodEnded(GamePeriod),
    ShotClockExpired,
    PenaltyExpired(PlayerRef),
    /// No further period applies after the one that just ended
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    pub snapshot: GameSnapshot,
    pub events: Vec<ClockEvent>,
}

#[derive(Derivative)]
#[derivative(Debug)]
pub struct GameEngine {
    pub(crate) settings: GameConfig,
    pub(crate) game_number: u32,
    pub(crate) period: GamePeriod,
    pub(crate) game_clock: Clock,
    pub(crate) shot_clock: Clock,
    pub(crate) scores: HomeAwayBundle<u16>,
    pub(crate) roster: Roster,
    pub(crate) last_passer: Option<PlayerRef>,
    pub(crate) log: GameLog,
    pub(crate) game_over: bool,
    #[derivative(Debug = "ignore")]
    snapshot_tx: watch::Sender<GameSnapshot>,
    #[derivative(Debug = "ignore")]
    running_tx: watch::Sender<bool>,
}

impl GameEngine {
    pub fn new(settings: GameConfig) -> Result<Self> {
        settings.validate()?;
        Ok(Self::from_parts(
            settings.clone(),
            1,
            GamePeriod::Regulation(1),
            Clock::new(settings.period_length),
            Clock::new(settings.shot_clock_length),
            Default::default(),
            Roster::default(),
            GameLog::default(),
        ))
    }

    /// Assembles a stopped engine. Callers are responsible for validating the parts.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        settings: GameConfig,
        game_number: u32,
        period: GamePeriod,
        game_clock: Clock,
        shot_clock: Clock,
        scores: HomeAwayBundle<u16>,
        roster: Roster,
        log: GameLog,
    ) -> Self {
        let (running_tx, _) = watch::channel(false);
        let (snapshot_tx, _) = watch::channel(GameSnapshot {
            game_number,
            period,
            time_remaining: game_clock.remaining(),
            shot_clock_remaining: shot_clock.remaining(),
            is_running: false,
            game_over: false,
            scores,
            players: vec![],
            active_penalties: vec![],
        });
        let engine = Self {
            settings,
            game_number,
            period,
            game_clock,
            shot_clock,
            scores,
            roster,
            last_passer: None,
            log,
            game_over: false,
            snapshot_tx,
            running_tx,
        };
        engine.snapshot_tx.send_replace(engine.snapshot());
        engine
    }

    pub fn settings(&self) -> &GameConfig {
        &self.settings
    }

    /// Settings can only change while the clock is stopped. A clock that has
    /// not been moved since its last reset picks up the new length, a clock
    /// that is past the new length is cut back to it.
    pub fn set_settings(&mut self, settings: GameConfig) -> Result<()> {
        if self.is_running() {
            warn!("{} Refusing to change settings while running", self.status_string());
            return Err(EngineError::ClockIsRunning);
        }
        settings.validate()?;
        if !self.period.exists_in(&settings) {
            warn!(
                "{} Refusing settings that leave no {}",
                self.status_string(),
                self.period
            );
            return Err(EngineError::Validation(format!(
                "{} does not exist with the new settings",
                self.period
            )));
        }
        self.roster.check_scope(settings.number_scope)?;

        let old_length = self.period.duration(&self.settings);
        let new_length = self.period.duration(&settings);
        let remaining = self.game_clock.remaining();
        if remaining == old_length || remaining > new_length {
            self.game_clock.reset(new_length);
        }
        let remaining = self.shot_clock.remaining();
        if remaining == self.settings.shot_clock_length || remaining > settings.shot_clock_length {
            self.shot_clock.reset(settings.shot_clock_length);
        }

        self.settings = settings;
        info!(
            "{} Settings changed to {:?}",
            self.status_string(),
            self.settings
        );
        self.publish();
        Ok(())
    }

    pub fn game_number(&self) -> u32 {
        self.game_number
    }

    pub fn period(&self) -> GamePeriod {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.game_clock.is_running()
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn game_clock(&self) -> &Clock {
        &self.game_clock
    }

    pub fn shot_clock(&self) -> &Clock {
        &self.shot_clock
    }

    pub fn scores(&self) -> HomeAwayBundle<u16> {
        self.scores
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn last_passer(&self) -> Option<PlayerRef> {
        self.last_passer
    }

    pub fn log(&self) -> &GameLog {
        &self.log
    }

    /// Receives a new snapshot after every change to the game
    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Receives `true` when the clock starts and `false` when it stops
    pub fn clock_running_rx(&self) -> watch::Receiver<bool> {
        self.running_tx.subscribe()
    }

    pub fn start_period(&mut self) -> Result<()> {
        if self.game_over {
            warn!("{} Can't start the clock, the game is over", self.status_string());
            return Err(EngineError::GameOver);
        }
        if self.game_clock.is_exhausted() {
            warn!("{} Can't start the clock, no time left", self.status_string());
            return Err(EngineError::Validation(format!(
                "{} has no time remaining",
                self.period
            )));
        }
        if self.game_clock.start() {
            if !self.shot_clock.is_exhausted() {
                self.shot_clock.start();
            }
            info!("{} Starting the game clock", self.status_string());
            self.send_clock_running(true);
            self.publish();
        }
        Ok(())
    }

    /// Returns true if the clock was stopped, false if it was already stopped
    pub fn pause(&mut self) -> bool {
        self.shot_clock.pause();
        if self.game_clock.pause() {
            info!("{} Stopping the game clock", self.status_string());
            self.send_clock_running(false);
            self.publish();
            true
        } else {
            false
        }
    }

    /// Moves the game forward by one second. Does nothing while stopped.
    pub fn tick(&mut self) -> TickOutcome {
        let mut events = vec![];
        if !self.is_running() {
            trace!("{} Ignoring tick while stopped", self.status_string());
            return TickOutcome {
                snapshot: self.snapshot(),
                events,
            };
        }

        let before = self.game_clock.remaining();
        let period_over = self.game_clock.tick();
        if self.game_clock.remaining() < before {
            if self.shot_clock.is_running() && self.shot_clock.tick() {
                self.shot_clock.pause();
                info!("{} Shot clock expired", self.status_string());
                events.push(ClockEvent::ShotClockExpired);
            }

            for (team, player) in self.roster.iter_mut() {
                let expired = player.penalties.advance(1);
                let player_ref = PlayerRef::new(team, player.number);
                events.extend((0..expired).map(|_| ClockEvent::PenaltyExpired(player_ref)));
            }
            for event in &events {
                if let ClockEvent::PenaltyExpired(player) = event {
                    info!("{} Penalty served by {player}", self.status_string());
                }
            }
        }
        trace!("{} Tick", self.status_string());

        if period_over {
            self.game_clock.pause();
            self.shot_clock.pause();
            info!("{} End of {}", self.status_string(), self.period);
            events.push(ClockEvent::PeriodEnded(self.period));

            let tied = !self.scores.are_not_equal();
            if self.period.next_period(&self.settings, tied).is_none() {
                info!("{} Game over, final score {}", self.status_string(), self.scores);
                self.game_over = true;
                events.push(ClockEvent::GameOver);
            }
            self.send_clock_running(false);
        }

        TickOutcome {
            snapshot: self.publish(),
            events,
        }
    }

    /// Back to the start of the first period with the clock stopped. Scores,
    /// stats and penalties are left alone.
    pub fn reset_period(&mut self) {
        self.period = GamePeriod::Regulation(1);
        self.game_clock.reset(self.settings.period_length);
        self.shot_clock.reset(self.settings.shot_clock_length);
        self.game_over = false;
        info!("{} Period reset", self.status_string());
        self.send_clock_running(false);
        self.publish();
    }

    /// Moves to the following period with fresh clocks
    pub fn next_period(&mut self) -> Result<GamePeriod> {
        if self.is_running() {
            warn!("{} Can't change period while running", self.status_string());
            return Err(EngineError::ClockIsRunning);
        }
        if self.game_over {
            return Err(EngineError::GameOver);
        }
        let tied = !self.scores.are_not_equal();
        let next = self
            .period
            .next_period(&self.settings, tied)
            .ok_or_else(|| EngineError::Validation(format!("No period follows {}", self.period)))?;

        self.period = next;
        self.game_clock.reset(next.duration(&self.settings));
        self.shot_clock.reset(self.settings.shot_clock_length);
        info!("{} Entering {next}", self.status_string());
        self.publish();
        Ok(next)
    }

    /// Sets the game clock while it is stopped
    pub fn set_game_clock(&mut self, secs: u32) -> Result<()> {
        if self.is_running() {
            return Err(EngineError::ClockIsRunning);
        }
        let max = self.period.duration(&self.settings);
        if secs > max {
            return Err(EngineError::Validation(format!(
                "{} is longer than a {} second period",
                clock_string(secs),
                max
            )));
        }
        self.game_clock.reset(secs);
        info!("{} Game clock set", self.status_string());
        self.publish();
        Ok(())
    }

    /// Puts the full shot clock back up, running if the game clock is
    pub fn reset_shot_clock(&mut self) {
        self.restart_shot_clock();
        info!("{} Shot clock reset", self.status_string());
        self.publish();
    }

    fn restart_shot_clock(&mut self) {
        self.shot_clock.reset(self.settings.shot_clock_length);
        if self.is_running() {
            self.shot_clock.start();
        }
    }

    pub fn add_player(
        &mut self,
        team: Team,
        number: u8,
        first_name: &str,
        last_name: &str,
        position: Position,
    ) -> Result<PlayerRef> {
        let player = Player::new(number, first_name, last_name, position);
        let player_ref = self
            .roster
            .add(team, player, self.settings.number_scope)
            .inspect_err(|e| warn!("Could not add {team} #{number}: {e}"))?;
        info!(
            "{} Added {player_ref} {first_name} {last_name} ({position})",
            self.status_string()
        );
        self.publish();
        Ok(player_ref)
    }

    pub fn remove_player(&mut self, player: PlayerRef) -> Result<Player> {
        let removed = self
            .roster
            .remove(player)
            .ok_or(EngineError::NotFound(player))?;
        if self.last_passer == Some(player) {
            self.last_passer = None;
        }
        info!("{} Removed {player}", self.status_string());
        self.publish();
        Ok(removed)
    }

    pub fn record(
        &mut self,
        player: PlayerRef,
        stat: StatKind,
        amount: i32,
        now: OffsetDateTime,
    ) -> Result<RecordOutcome> {
        let status = self.status_string();
        let ctx = self.event_context(now);
        let outcome = self
            .ledger()
            .record(&ctx, player, stat, amount)
            .inspect_err(|e| warn!("{status} Rejected {stat} for {player}: {e}"))?;

        match &outcome.penalty {
            Some(pen) => info!("{status} {}s penalty for {player}", pen.total_duration),
            None => info!("{status} Recorded {amount} {stat} for {player}"),
        }
        if outcome.goal {
            match outcome.assisted_by {
                Some(passer) => info!("{status} Goal by {player}, assisted by {passer}"),
                None => info!("{status} Goal by {player}"),
            }
            info!("{status} Scores are now {}", self.scores);
            self.restart_shot_clock();
            self.check_sudden_victory();
        }

        self.publish();
        Ok(outcome)
    }

    /// Same as `record`, with the stat given by its key (eg. `"shotsOnGoal"`)
    pub fn record_by_key(
        &mut self,
        player: PlayerRef,
        stat: &str,
        amount: i32,
        now: OffsetDateTime,
    ) -> Result<RecordOutcome> {
        let stat: StatKind = stat.parse()?;
        self.record(player, stat, amount, now)
    }

    /// Issues a penalty, clamping the duration into the allowed range.
    /// Returns the penalty as it now appears on the board.
    pub fn add_penalty(
        &mut self,
        player: PlayerRef,
        duration: u32,
        now: OffsetDateTime,
    ) -> Result<PenaltySnapshot> {
        let ctx = self.event_context(now);
        let snapshot = self.ledger().issue_penalty(&ctx, player, duration)?;

        info!(
            "{} {}s penalty for {player}",
            self.status_string(),
            snapshot.total_duration
        );
        self.publish();
        Ok(snapshot)
    }

    /// Removes one of a player's active penalties early. An index that does
    /// not exist is ignored.
    pub fn dismiss_penalty(&mut self, player: PlayerRef, index: usize) -> Result<Option<ActivePenalty>> {
        let p = self
            .roster
            .get_mut(player)
            .ok_or(EngineError::NotFound(player))?;
        let removed = p.penalties.dismiss(index);
        if removed.is_some() {
            info!(
                "{} Dismissed penalty {index} of {player}",
                self.status_string()
            );
            self.publish();
        } else {
            debug!("{player} has no penalty at index {index}");
        }
        Ok(removed)
    }

    /// Every active penalty in the game, soonest to expire first
    pub fn active_penalties(&self) -> Vec<PenaltySnapshot> {
        let mut penalties: Vec<_> = self
            .roster
            .iter()
            .flat_map(|(team, p)| p.penalties.as_snapshots(team, p.number))
            .collect();
        penalties.sort_by_key(|pen| pen.remaining);
        penalties
    }

    /// Manual score correction. Does not touch any player stats.
    pub fn adjust_score(&mut self, team: Team, score: u16) {
        let mut scores = self.scores;
        scores[team] = score;
        self.set_scores(scores);
    }

    pub fn set_scores(&mut self, scores: HomeAwayBundle<u16>) {
        self.scores = scores;
        info!("{} Scores set to {scores}", self.status_string());
        self.check_sudden_victory();
        self.publish();
    }

    fn check_sudden_victory(&mut self) {
        if self.period.is_overtime() && self.settings.sudden_victory && self.scores.are_not_equal() {
            self.game_clock.pause();
            self.shot_clock.pause();
            self.game_over = true;
            info!(
                "{} Sudden victory, final score {}",
                self.status_string(),
                self.scores
            );
            self.send_clock_running(false);
        }
    }

    /// Hands back the finished game for saving and sets up the next one. The
    /// roster is kept, every player's stats and penalties start over.
    pub fn new_game(&mut self, now: OffsetDateTime) -> crate::game_data::GameData {
        let finished = self.serialize(now);

        self.game_number += 1;
        self.period = GamePeriod::Regulation(1);
        self.game_clock.reset(self.settings.period_length);
        self.shot_clock.reset(self.settings.shot_clock_length);
        self.scores = Default::default();
        self.last_passer = None;
        self.log.clear();
        self.game_over = false;
        self.roster
            .iter_mut()
            .for_each(|(_, player)| player.clear_game_data());

        info!("{} Starting game {}", self.status_string(), self.game_number);
        self.send_clock_running(false);
        self.publish();
        finished
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            game_number: self.game_number,
            period: self.period,
            time_remaining: self.game_clock.remaining(),
            shot_clock_remaining: self.shot_clock.remaining(),
            is_running: self.is_running(),
            game_over: self.game_over,
            scores: self.scores,
            players: self
                .roster
                .iter()
                .map(|(team, p)| p.as_snapshot(team))
                .collect(),
            active_penalties: self.active_penalties(),
        }
    }

    pub(crate) fn publish(&self) -> GameSnapshot {
        let snapshot = self.snapshot();
        self.snapshot_tx.send_replace(snapshot.clone());
        snapshot
    }

    pub(crate) fn send_clock_running(&self, running: bool) {
        self.running_tx.send_if_modified(|current| {
            let changed = *current != running;
            *current = running;
            changed
        });
    }

    fn ledger(&mut self) -> StatLedger<'_> {
        StatLedger {
            roster: &mut self.roster,
            scores: &mut self.scores,
            last_passer: &mut self.last_passer,
            log: &mut self.log,
            teammate_assists_only: self.settings.teammate_assists_only,
        }
    }

    fn event_context(&self, now: OffsetDateTime) -> EventContext {
        EventContext {
            timestamp: now,
            period: self.period,
            game_time: self.game_clock.remaining(),
        }
    }

    fn status_string(&self) -> String {
        let secs = self.game_clock.remaining();
        format!(
            "[{:02}:{:02} {}]",
            secs / 60,
            secs % 60,
            self.period.short_name()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Invalid settings: {0}")]
    Settings(#[from] ValidationError),
    #[error("{0}")]
    Validation(String),
    #[error("No {0} on the roster")]
    NotFound(PlayerRef),
    #[error("Invalid stat: {0}")]
    InvalidStat(String),
    #[error("Number {1} is already taken by a {0} player")]
    DuplicateNumber(Team, u8),
    #[error("Amount must be at least 1, got {0}")]
    InvalidAmount(i32),
    #[error("Can't do that while the clock is running")]
    ClockIsRunning,
    #[error("The game is over")]
    GameOver,
}

impl From<UnknownStat> for EngineError {
    fn from(err: UnknownStat) -> Self {
        Self::InvalidStat(err.0)
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
