use crate::game_engine::{
    EngineError, GameEngine, Result,
    clock::Clock,
    game_log::{GameEvent, GameLog, iso8601_short_year},
    penalty::PENALTY_DURATION_RANGE,
    roster::{Player, Roster},
};
use lax_common::{
    bundles::HomeAwayBundle, config::Game as GameConfig, game_snapshot::GamePeriod,
};
use log::*;
use serde_derive::{Deserialize, Serialize};
use time::OffsetDateTime;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMetadata {
    pub format_version: u32,
    pub game_number: u32,
    #[serde(with = "iso8601_short_year")]
    pub saved_at: OffsetDateTime,
}

/// Everything needed to pick a game back up. The clocks are always restored
/// stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameData {
    pub metadata: GameMetadata,
    pub settings: GameConfig,
    pub scores: HomeAwayBundle<u16>,
    pub period: GamePeriod,
    pub time_remaining: u32,
    pub shot_clock_remaining: u32,
    #[serde(default)]
    pub game_over: bool,
    pub players: HomeAwayBundle<Vec<Player>>,
    pub events: Vec<GameEvent>,
}

impl GameData {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    fn check(&self) -> Result<()> {
        if self.metadata.format_version > FORMAT_VERSION {
            return Err(EngineError::Validation(format!(
                "Unsupported game data version {}",
                self.metadata.format_version
            )));
        }
        self.settings.validate()?;

        if !self.period.exists_in(&self.settings) {
            return Err(EngineError::Validation(format!(
                "{} does not exist with the saved settings",
                self.period
            )));
        }
        if self.time_remaining > self.period.duration(&self.settings) {
            return Err(EngineError::Validation(format!(
                "{}s left is longer than {}",
                self.time_remaining, self.period
            )));
        }
        if self.shot_clock_remaining > self.settings.shot_clock_length {
            return Err(EngineError::Validation(format!(
                "{}s left is longer than the shot clock",
                self.shot_clock_remaining
            )));
        }

        for (team, players) in self.players.iter() {
            for player in players {
                if player.stats().shots_on_goal > player.stats().shots {
                    return Err(EngineError::Validation(format!(
                        "{team} #{} has more shots on goal than shots",
                        player.number
                    )));
                }
                let bad_penalty = player.penalties().iter().any(|pen| {
                    !PENALTY_DURATION_RANGE.contains(&pen.total_duration())
                        || pen.is_served()
                        || pen.remaining() > pen.total_duration()
                });
                if bad_penalty {
                    return Err(EngineError::Validation(format!(
                        "{team} #{} has an invalid penalty",
                        player.number
                    )));
                }
                let active = player.penalties();
                let active_time: u32 = active.iter().map(|pen| pen.total_duration()).sum();
                if active.len() > player.stats().penalties as usize
                    || active_time > player.stats().penalty_time
                {
                    return Err(EngineError::Validation(format!(
                        "{team} #{} has more active penalties than penalty stats",
                        player.number
                    )));
                }
            }
        }
        Ok(())
    }
}

impl GameEngine {
    /// Captures the full state of the game without changing it
    pub fn serialize(&self, now: OffsetDateTime) -> GameData {
        GameData {
            metadata: GameMetadata {
                format_version: FORMAT_VERSION,
                game_number: self.game_number,
                saved_at: now,
            },
            settings: self.settings.clone(),
            scores: self.scores,
            period: self.period,
            time_remaining: self.game_clock.remaining(),
            shot_clock_remaining: self.shot_clock.remaining(),
            game_over: self.game_over,
            players: self.roster.players().clone(),
            events: self.log.events().to_vec(),
        }
    }

    /// Rebuilds a stopped engine from saved data, rejecting anything the
    /// engine could not have produced itself
    pub fn deserialize(data: GameData) -> Result<Self> {
        data.check()
            .inspect_err(|e| warn!("Rejecting game data: {e}"))?;
        let roster = Roster::from_players(data.players, data.settings.number_scope)?;

        let mut engine = Self::from_parts(
            data.settings,
            data.metadata.game_number,
            data.period,
            Clock::new(data.time_remaining),
            Clock::new(data.shot_clock_remaining),
            data.scores,
            roster,
            GameLog::from_events(data.events),
        );
        engine.game_over = data.game_over;
        info!(
            "Restored game {} saved at {}",
            engine.game_number, data.metadata.saved_at
        );
        Ok(engine)
    }

    /// Replaces the game with saved data, keeping every subscriber. The clock
    /// is stopped afterwards. On error the current game is left as it was.
    pub fn restore(&mut self, data: GameData) -> Result<()> {
        let GameEngine {
            settings,
            game_number,
            period,
            game_clock,
            shot_clock,
            scores,
            roster,
            last_passer,
            log,
            game_over,
            ..
        } = Self::deserialize(data)?;

        self.settings = settings;
        self.game_number = game_number;
        self.period = period;
        self.game_clock = game_clock;
        self.shot_clock = shot_clock;
        self.scores = scores;
        self.roster = roster;
        self.last_passer = last_passer;
        self.log = log;
        self.game_over = game_over;

        self.send_clock_running(false);
        self.publish();
        Ok(())
    }
}
