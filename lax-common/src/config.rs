use derivative::Derivative;
use enum_derive_2018::EnumDisplay;
use macro_attr_2018::macro_attr;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use thiserror::Error;

pub const PERIOD_LENGTH_RANGE: RangeInclusive<u32> = 60..=1800;
pub const NUM_PERIODS_RANGE: RangeInclusive<u8> = 1..=6;
pub const SHOT_CLOCK_RANGE: RangeInclusive<u32> = 10..=300;

macro_attr! {
    /// Where a jersey number has to be unique
    #[derive(Debug, Clone, Copy, Derivative, PartialEq, Eq, Serialize, Deserialize, EnumDisplay!)]
    #[derivative(Default)]
    pub enum NumberScope {
        /// The same number may be worn by one home and one away player
        #[derivative(Default)]
        PerTeam,
        Global,
    }
}

/// Game settings. All times are in seconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub period_length: u32,
    pub num_periods: u8,
    pub overtime_enabled: bool,
    pub overtime_length: u32,
    /// A goal in overtime ends the game
    pub sudden_victory: bool,
    pub shot_clock_length: u32,
    /// Only credit the last shooter with an assist when they play for the scoring team
    pub teammate_assists_only: bool,
    pub number_scope: NumberScope,
}

impl Default for Game {
    fn default() -> Self {
        Self {
            period_length: 720,
            num_periods: 4,
            overtime_enabled: true,
            overtime_length: 240,
            sudden_victory: true,
            shot_clock_length: 80,
            teammate_assists_only: false,
            number_scope: NumberScope::PerTeam,
        }
    }
}

impl Game {
    /// Settings are rejected, never clamped
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !PERIOD_LENGTH_RANGE.contains(&self.period_length) {
            return Err(ValidationError::PeriodLength(self.period_length));
        }
        if !NUM_PERIODS_RANGE.contains(&self.num_periods) {
            return Err(ValidationError::NumPeriods(self.num_periods));
        }
        if self.overtime_enabled && !PERIOD_LENGTH_RANGE.contains(&self.overtime_length) {
            return Err(ValidationError::OvertimeLength(self.overtime_length));
        }
        if !SHOT_CLOCK_RANGE.contains(&self.shot_clock_length) {
            return Err(ValidationError::ShotClockLength(self.shot_clock_length));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(
        "Period length must be between {min} and {max} seconds, got {0}",
        min = PERIOD_LENGTH_RANGE.start(),
        max = PERIOD_LENGTH_RANGE.end()
    )]
    PeriodLength(u32),
    #[error(
        "Number of periods must be between {min} and {max}, got {0}",
        min = NUM_PERIODS_RANGE.start(),
        max = NUM_PERIODS_RANGE.end()
    )]
    NumPeriods(u8),
    #[error(
        "Overtime length must be between {min} and {max} seconds, got {0}",
        min = PERIOD_LENGTH_RANGE.start(),
        max = PERIOD_LENGTH_RANGE.end()
    )]
    OvertimeLength(u32),
    #[error(
        "Shot clock length must be between {min} and {max} seconds, got {0}",
        min = SHOT_CLOCK_RANGE.start(),
        max = SHOT_CLOCK_RANGE.end()
    )]
    ShotClockLength(u32),
}
