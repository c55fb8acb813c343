use crate::game_engine::{GameEngine, TickOutcome};
use log::*;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Duration, Instant, MissedTickBehavior, interval_at},
};

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Calls `GameEngine::tick` once a second while the engine's clock runs. The
/// first tick comes one second after the clock starts, and no tick is
/// scheduled while it is stopped. Dropping the `Ticker` stops the task.
///
/// The engine behind the mutex may be swapped for another one (eg. a restored
/// game); the ticker follows the new engine's clock.
#[derive(Debug)]
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    pub fn spawn(engine: Arc<Mutex<GameEngine>>) -> Self {
        Self::spawn_with(engine, |_| {})
    }

    /// `on_tick` gets the outcome of every tick, after the engine lock is released
    pub fn spawn_with<F>(engine: Arc<Mutex<GameEngine>>, mut on_tick: F) -> Self
    where
        F: FnMut(TickOutcome) + Send + 'static,
    {
        let mut clock_running_rx = subscribe(&engine);

        let handle = tokio::spawn(async move {
            debug!("Ticker started");
            loop {
                while !*clock_running_rx.borrow_and_update() {
                    debug!("Awaiting a new clock running message");
                    if clock_running_rx.changed().await.is_err() {
                        warn!("Engine was replaced, resubscribing");
                        clock_running_rx = subscribe(&engine);
                    }
                }

                let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        biased;
                        changed = clock_running_rx.changed() => {
                            if changed.is_err() {
                                warn!("Engine was replaced, resubscribing");
                                clock_running_rx = subscribe(&engine);
                                break;
                            }
                            trace!("Received clock running message: {}", *clock_running_rx.borrow());
                            break;
                        }
                        _ = interval.tick() => {
                            let outcome = tick_engine(&engine);
                            on_tick(outcome);
                        }
                    }
                }
            }
        });

        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        debug!("Stopping ticker");
        self.handle.abort();
    }
}

fn subscribe(engine: &Mutex<GameEngine>) -> watch::Receiver<bool> {
    engine
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clock_running_rx()
}

fn tick_engine(engine: &Mutex<GameEngine>) -> TickOutcome {
    engine.lock().unwrap_or_else(PoisonError::into_inner).tick()
}
