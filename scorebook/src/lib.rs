//! Clock, penalty and stat keeping for a lacrosse scorebook.
//!
//! `GameEngine` owns all game state. A renderer reads `GameSnapshot`s from it,
//! either by calling `snapshot()` or through `subscribe()`, and a `Ticker`
//! drives the clocks once a second while the game clock runs.

pub mod config;
pub mod game_data;
pub mod game_engine;
pub mod storage;
pub mod ticker;

pub use game_data::GameData;
pub use game_engine::{
    ClockEvent, EngineError, GameEngine, RecordOutcome, TickOutcome,
    roster::{Player, PlayerRef},
};
pub use ticker::Ticker;
