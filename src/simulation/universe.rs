//! Universe - the per-minute driver
//!
//! Owns simulated time, the run/pause flag, the speed multiplier, the nap
//! counter and the single agent. Each `step()` is one simulated minute:
//!
//! 1. Day boundary: on the configured start hour, clear daily bookkeeping
//! 2. Busy agent: apply the activity's effects and advance the clock
//! 3. Otherwise: evaluate the rule engine and schedule its decision
//!
//! Time does not move on a scheduling minute; the freshly scheduled activity
//! consumes that minute on the next step.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::actions::catalog::{ActivityCatalog, ActivityId};
use crate::core::calendar::SimClock;
use crate::core::config::SimConfig;
use crate::core::error::Result;
use crate::core::types::Timestamp;
use crate::entity::agent::{Agent, AgentState};
use crate::rules::policy::{self, Decision, RuleContext};
use crate::simulation::events::{LogSink, SimEvent, SimEventKind};

pub const DEFAULT_AGENT_NAME: &str = "PG";

/// Fastest accepted speed: one simulated minute per real millisecond
pub const MAX_SPEED: f64 = 60_000.0;
/// Slowest accepted speed: one simulated minute per real day
pub const MIN_SPEED: f64 = 60.0 / 86_400.0;
pub const MIN_TICK_PERIOD: std::time::Duration = std::time::Duration::from_millis(1);

/// Serializable view for renderers
#[derive(Debug, Clone, Serialize)]
pub struct UniverseSnapshot {
    pub time: Timestamp,
    pub running: bool,
    pub speed: f64,
    pub nap_count: u32,
    pub agent: AgentState,
}

#[derive(Debug)]
pub struct Universe {
    config: Arc<SimConfig>,
    clock: SimClock,
    running: bool,
    /// Simulated minutes per real second
    speed: f64,
    nap_count: u32,
    last_day_reset: Option<NaiveDate>,
    ticks: u64,
    agent: Agent,
}

impl Universe {
    /// Validate `config`, build the catalog and place the clock at the day start
    pub fn new(config: SimConfig, sink: Box<dyn LogSink>) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let catalog = Arc::new(ActivityCatalog::builtin()?);
        let agent = Agent::new(DEFAULT_AGENT_NAME, config.clone(), catalog, sink);

        tracing::info!(start = %config.start_time(), "universe created");

        Ok(Self {
            clock: SimClock::new(config.start_time()),
            config,
            running: false,
            speed: 1.0,
            nap_count: 0,
            last_day_reset: None,
            ticks: 0,
            agent,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut Agent {
        &mut self.agent
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn nap_count(&self) -> u32 {
        self.nap_count
    }

    /// Steps processed since construction
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Real time per simulated minute: `60000 / speed` ms, never below 1 ms
    pub fn tick_period(&self) -> std::time::Duration {
        std::time::Duration::try_from_secs_f64(60.0 / self.speed)
            .unwrap_or(MIN_TICK_PERIOD)
            .max(MIN_TICK_PERIOD)
    }

    pub fn play(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// One simulated minute, allowed while paused
    pub fn step(&mut self) {
        self.advance_minute();
    }

    /// Ignored unless `speed` lies within `MIN_SPEED..=MAX_SPEED`
    pub fn set_speed(&mut self, speed: f64) {
        if (MIN_SPEED..=MAX_SPEED).contains(&speed) {
            self.speed = speed;
        } else {
            tracing::warn!(speed, min = MIN_SPEED, max = MAX_SPEED, "ignoring out-of-range speed");
        }
    }

    /// Reset clock, agent and nap counter together
    pub fn reinit(&mut self) {
        self.clock.set(self.config.start_time());
        self.agent.reset();
        self.nap_count = 0;
        self.last_day_reset = None;

        tracing::info!(at = %self.clock.now(), "day reinitialized");
        self.agent.emit(SimEvent::new(self.clock.now(), SimEventKind::Reinit));
    }

    /// Process `steps` minutes back to back
    pub fn run_steps(&mut self, steps: u64) {
        for _ in 0..steps {
            self.advance_minute();
        }
    }

    /// Step until the clock reaches `until`
    pub fn run_until(&mut self, until: Timestamp) {
        while self.clock.now() < until {
            self.advance_minute();
        }
    }

    /// Process one minute. Returns the decision when the rule engine ran.
    pub fn advance_minute(&mut self) -> Option<Decision> {
        self.ticks += 1;
        self.check_day_boundary();

        let now = self.clock.now();
        if self.agent.is_busy(now) {
            let next = self.agent.apply_activity_minute(now);
            self.clock.set(next);
            return None;
        }

        let decision = {
            let state = self.agent.state();
            policy::evaluate(&RuleContext {
                needs: &state.needs,
                meals_eaten: &state.meta.meals,
                config: &self.config,
                now,
                nap_count: self.nap_count,
            })
        };
        tracing::trace!(rule = ?decision.rule, activity = ?decision.activity, "rule matched");

        self.apply_decision(&decision);
        Some(decision)
    }

    fn check_day_boundary(&mut self) {
        let date = self.clock.date();
        if !self.clock.is_on_hour(self.config.time.start_hour) || self.last_day_reset == Some(date) {
            return;
        }

        self.agent.reset_daily();
        self.nap_count = 0;
        self.last_day_reset = Some(date);

        tracing::info!(%date, "day started");
        self.agent.emit(SimEvent::new(self.clock.now(), SimEventKind::DayStarted { date }));
    }

    fn apply_decision(&mut self, decision: &Decision) {
        let now = self.clock.now();
        if decision.is_nap() {
            self.nap_count += 1;
        }

        match decision.activity {
            ActivityId::Eat => self.agent.record_meal(now, decision.meal),
            ActivityId::Wash => self.agent.record_shower(now),
            activity if activity.is_sleep() => self.agent.record_sleep(now),
            _ => {}
        }

        self.agent.schedule(now, decision.activity.label(), decision.minutes);
    }

    pub fn snapshot(&self) -> UniverseSnapshot {
        UniverseSnapshot {
            time: self.clock.now(),
            running: self.running,
            speed: self.speed,
            nap_count: self.nap_count,
            agent: self.agent.state().clone(),
        }
    }

    pub fn snapshot_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }
}
