use crate::{
    bundles::HomeAwayBundle, clock_string, config::Game, position::Position, stats::Stats,
    team::Team,
};
use serde::{Deserialize, Serialize};

/// Everything a renderer needs to draw the scorebook at one point in time
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game_number: u32,
    pub period: GamePeriod,
    pub time_remaining: u32,
    pub shot_clock_remaining: u32,
    pub is_running: bool,
    pub game_over: bool,
    pub scores: HomeAwayBundle<u16>,
    pub players: Vec<PlayerSnapshot>,
    /// Every active penalty in the game, soonest to expire first
    pub active_penalties: Vec<PenaltySnapshot>,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub team: Team,
    pub number: u8,
    pub first_name: String,
    pub last_name: String,
    pub position: Position,
    pub stats: Stats,
    pub penalties: Vec<PenaltySnapshot>,
}

impl PlayerSnapshot {
    pub fn display_name(&self) -> String {
        format!("#{} {}", self.number, self.last_name)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct PenaltySnapshot {
    pub team: Team,
    pub player_number: u8,
    /// Position in the player's active penalty list, used to dismiss it
    pub index: usize,
    pub total_duration: u32,
    pub remaining: u32,
    pub is_expiring: bool,
}

impl PenaltySnapshot {
    pub fn time_string(&self) -> String {
        clock_string(self.remaining)
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum GamePeriod {
    Regulation(u8),
    Overtime(u8),
}

impl Default for GamePeriod {
    fn default() -> Self {
        Self::Regulation(1)
    }
}

impl GamePeriod {
    pub fn number(self) -> u8 {
        match self {
            Self::Regulation(n) | Self::Overtime(n) => n,
        }
    }

    pub fn is_overtime(self) -> bool {
        matches!(self, Self::Overtime(_))
    }

    pub fn duration(self, config: &Game) -> u32 {
        match self {
            Self::Regulation(_) => config.period_length,
            Self::Overtime(_) => config.overtime_length,
        }
    }

    /// Whether a game played with `config` can ever reach this period
    pub fn exists_in(self, config: &Game) -> bool {
        match self {
            Self::Regulation(n) => (1..=config.num_periods).contains(&n),
            Self::Overtime(n) => config.overtime_enabled && n >= 1,
        }
    }

    /// Returns `None` when the game is finished after this period
    pub fn next_period(self, config: &Game, tied: bool) -> Option<GamePeriod> {
        match self {
            Self::Regulation(n) if n < config.num_periods => Some(Self::Regulation(n + 1)),
            Self::Regulation(_) if config.overtime_enabled && tied => Some(Self::Overtime(1)),
            Self::Overtime(n) if tied => n.checked_add(1).map(Self::Overtime),
            Self::Regulation(_) | Self::Overtime(_) => None,
        }
    }

    pub fn short_name(self) -> String {
        match self {
            Self::Regulation(n) => format!("P{n}"),
            Self::Overtime(n) => format!("OT{n}"),
        }
    }
}

impl core::fmt::Display for GamePeriod {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            GamePeriod::Regulation(n) => write!(f, "Period {n}"),
            GamePeriod::Overtime(n) => write!(f, "Overtime {n}"),
        }
    }
}
