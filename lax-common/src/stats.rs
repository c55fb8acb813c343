use core::ops::{Index, IndexMut};
use enum_iterator::{Sequence, all};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// The fixed set of per-player counters a scorekeeper can track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Sequence)]
#[serde(rename_all = "camelCase")]
pub enum StatKind {
    Goals,
    Assists,
    Shots,
    ShotsOnGoal,
    GroundBalls,
    Turnovers,
    CausedTurnovers,
    Saves,
    GoalsAllowed,
    Penalties,
    PenaltyTime,
}

impl StatKind {
    /// The key used by the UI and in exported game data
    pub fn key(self) -> &'static str {
        match self {
            Self::Goals => "goals",
            Self::Assists => "assists",
            Self::Shots => "shots",
            Self::ShotsOnGoal => "shotsOnGoal",
            Self::GroundBalls => "groundBalls",
            Self::Turnovers => "turnovers",
            Self::CausedTurnovers => "causedTurnovers",
            Self::Saves => "saves",
            Self::GoalsAllowed => "goalsAllowed",
            Self::Penalties => "penalties",
            Self::PenaltyTime => "penaltyTime",
        }
    }

    /// Counters that move only when a penalty is issued
    pub fn is_penalty_stat(self) -> bool {
        matches!(self, Self::Penalties | Self::PenaltyTime)
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown stat `{0}`")]
pub struct UnknownStat(pub String);

impl FromStr for StatKind {
    type Err = UnknownStat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all::<StatKind>()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| UnknownStat(s.to_string()))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub goals: u32,
    pub assists: u32,
    pub shots: u32,
    pub shots_on_goal: u32,
    pub ground_balls: u32,
    pub turnovers: u32,
    pub caused_turnovers: u32,
    pub saves: u32,
    pub goals_allowed: u32,
    pub penalties: u32,
    pub penalty_time: u32,
}

impl Stats {
    pub fn iter(&self) -> impl Iterator<Item = (StatKind, u32)> + '_ {
        all::<StatKind>().map(|kind| (kind, self[kind]))
    }

    /// The counters worth showing: anything non-zero, plus goals and assists
    pub fn displayed(&self) -> impl Iterator<Item = (StatKind, u32)> + '_ {
        self.iter().filter(|(kind, value)| {
            *value > 0 || matches!(kind, StatKind::Goals | StatKind::Assists)
        })
    }
}

impl Index<StatKind> for Stats {
    type Output = u32;

    fn index(&self, kind: StatKind) -> &Self::Output {
        match kind {
            StatKind::Goals => &self.goals,
            StatKind::Assists => &self.assists,
            StatKind::Shots => &self.shots,
            StatKind::ShotsOnGoal => &self.shots_on_goal,
            StatKind::GroundBalls => &self.ground_balls,
            StatKind::Turnovers => &self.turnovers,
            StatKind::CausedTurnovers => &self.caused_turnovers,
            StatKind::Saves => &self.saves,
            StatKind::GoalsAllowed => &self.goals_allowed,
            StatKind::Penalties => &self.penalties,
            StatKind::PenaltyTime => &self.penalty_time,
        }
    }
}

impl IndexMut<StatKind> for Stats {
    fn index_mut(&mut self, kind: StatKind) -> &mut Self::Output {
        match kind {
            StatKind::Goals => &mut self.goals,
            StatKind::Assists => &mut self.assists,
            StatKind::Shots => &mut self.shots,
            StatKind::ShotsOnGoal => &mut self.shots_on_goal,
            StatKind::GroundBalls => &mut self.ground_balls,
            StatKind::Turnovers => &mut self.turnovers,
            StatKind::CausedTurnovers => &mut self.caused_turnovers,
            StatKind::Saves => &mut self.saves,
            StatKind::GoalsAllowed => &mut self.goals_allowed,
            StatKind::Penalties => &mut self.penalties,
            StatKind::PenaltyTime => &mut self.penalty_time,
        }
    }
}
