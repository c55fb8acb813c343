use lax_common::{
    game_snapshot::{GamePeriod, PenaltySnapshot},
    team::Team,
};
use serde_derive::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const PENALTY_DURATION_RANGE: RangeInclusive<u32> = 5..=300;
pub const EXPIRING_SECS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePenalty {
    pub(crate) total_duration: u32,
    pub(crate) remaining: u32,
    pub(crate) start_period: GamePeriod,
    pub(crate) start_game_time: u32,
}

impl ActivePenalty {
    /// `duration` is clamped into the allowed penalty range
    pub(crate) fn new(duration: u32, start_period: GamePeriod, start_game_time: u32) -> Self {
        let duration = clamp_duration(duration);
        Self {
            total_duration: duration,
            remaining: duration,
            start_period,
            start_game_time,
        }
    }

    pub fn total_duration(&self) -> u32 {
        self.total_duration
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn start_period(&self) -> GamePeriod {
        self.start_period
    }

    pub fn start_game_time(&self) -> u32 {
        self.start_game_time
    }

    pub fn is_expiring(&self) -> bool {
        self.remaining <= EXPIRING_SECS
    }

    pub fn is_served(&self) -> bool {
        self.remaining == 0
    }

    fn advance(&mut self, elapsed: u32) {
        self.remaining = self.remaining.saturating_sub(elapsed);
    }

    pub fn as_snapshot(&self, team: Team, player_number: u8, index: usize) -> PenaltySnapshot {
        PenaltySnapshot {
            team,
            player_number,
            index,
            total_duration: self.total_duration,
            remaining: self.remaining,
            is_expiring: self.is_expiring(),
        }
    }
}

pub fn clamp_duration(duration: u32) -> u32 {
    duration.clamp(
        *PENALTY_DURATION_RANGE.start(),
        *PENALTY_DURATION_RANGE.end(),
    )
}

/// A player's penalties that are still being served, in the order they were issued
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PenaltyTracker {
    active: Vec<ActivePenalty>,
}

impl PenaltyTracker {
    pub(crate) fn add(&mut self, penalty: ActivePenalty) -> &ActivePenalty {
        self.active.push(penalty);
        &self.active[self.active.len() - 1]
    }

    /// Counts every penalty down by `elapsed` seconds and drops the ones that
    /// have been served. Returns how many were dropped.
    pub(crate) fn advance(&mut self, elapsed: u32) -> usize {
        let before = self.active.len();
        self.active.iter_mut().for_each(|pen| pen.advance(elapsed));
        self.active.retain(|pen| !pen.is_served());
        before - self.active.len()
    }

    /// Out of range indices are ignored
    pub(crate) fn dismiss(&mut self, index: usize) -> Option<ActivePenalty> {
        if index < self.active.len() {
            Some(self.active.remove(index))
        } else {
            None
        }
    }

    pub(crate) fn clear(&mut self) {
        self.active.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivePenalty> {
        self.active.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ActivePenalty> {
        self.active.get(index)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn as_snapshots(&self, team: Team, player_number: u8) -> Vec<PenaltySnapshot> {
        self.active
            .iter()
            .enumerate()
            .map(|(i, pen)| pen.as_snapshot(team, player_number, i))
            .collect()
    }
}
