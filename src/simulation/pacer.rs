//! Real-time pacing: one simulated minute every `60 / speed` seconds
//!
//! The pacer owns the universe while it runs and hands it back on shutdown.
//! Controls arrive over an mpsc channel so a UI or stdin reader can drive it.

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::simulation::universe::{Universe, MIN_TICK_PERIOD};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    Play,
    Pause,
    Step,
    SetSpeed(f64),
    Reinit,
    Shutdown,
}

enum Wake {
    Tick,
    Control(Option<Control>),
}

pub struct Pacer {
    universe: Universe,
    ticker: Option<Interval>,
}

impl Pacer {
    pub fn new(universe: Universe) -> Self {
        Self {
            universe,
            ticker: None,
        }
    }

    /// Drive the universe until `Shutdown` or until every sender is dropped
    pub async fn run(mut self, mut controls: mpsc::UnboundedReceiver<Control>) -> Universe {
        if self.universe.is_running() {
            self.restart_timer();
        }

        loop {
            let wake = tokio::select! {
                _ = next_tick(&mut self.ticker) => Wake::Tick,
                control = controls.recv() => Wake::Control(control),
            };

            match wake {
                Wake::Tick => {
                    if self.universe.is_running() {
                        self.universe.step();
                    }
                }
                Wake::Control(None) | Wake::Control(Some(Control::Shutdown)) => break,
                Wake::Control(Some(control)) => self.handle(control),
            }
        }

        tracing::debug!(ticks = self.universe.ticks(), "pacer stopped");
        self.universe
    }

    fn handle(&mut self, control: Control) {
        tracing::debug!(?control, "pacer control");
        match control {
            Control::Play => {
                if !self.universe.is_running() || self.ticker.is_none() {
                    self.universe.play();
                    self.restart_timer();
                }
            }
            Control::Pause => {
                self.universe.pause();
                self.ticker = None;
            }
            Control::Step => self.universe.step(),
            Control::SetSpeed(speed) => {
                self.universe.set_speed(speed);
                if self.universe.is_running() {
                    self.restart_timer();
                }
            }
            Control::Reinit => self.universe.reinit(),
            Control::Shutdown => {}
        }
    }

    /// Replace the interval; the first tick is one full period away
    fn restart_timer(&mut self) {
        let period = self.universe.tick_period().max(MIN_TICK_PERIOD);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.ticker = Some(ticker);
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
