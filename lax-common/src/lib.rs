pub mod team;

pub mod bundles;

pub mod stats;

pub mod position;

pub mod config;

pub mod game_snapshot;

pub fn clock_string(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
