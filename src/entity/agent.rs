//! The simulated person: needs, the activity slot and daily bookkeeping
//!
//! The agent owns exactly one activity slot. Scheduling either extends the slot
//! (same activity re-armed right after it ran out) or replaces it with a new
//! occurrence, emitting `finished`/`started` events to the log sink.

use std::sync::Arc;

use ahash::AHashMap;
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::actions::catalog::{ActivityCatalog, ActivityId};
use crate::core::config::SimConfig;
use crate::core::types::{MealType, Minutes, NeedKind, Timestamp};
use crate::entity::needs::NeedSet;
use crate::simulation::events::{LogSink, SimEvent, SimEventKind};

pub const IDLE: &str = "Idle";

/// Current activity. `until == None` means nothing is scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySlot {
    pub name: String,
    pub start: Option<Timestamp>,
    pub until: Option<Timestamp>,
}

impl Default for ActivitySlot {
    fn default() -> Self {
        Self {
            name: IDLE.to_string(),
            start: None,
            until: None,
        }
    }
}

impl ActivitySlot {
    pub fn is_in_progress(&self, now: Timestamp) -> bool {
        self.until.is_some_and(|until| now < until)
    }

    /// Scheduled end reached (false when nothing was scheduled)
    pub fn has_finished(&self, now: Timestamp) -> bool {
        self.until.is_some_and(|until| now >= until)
    }
}

/// "Already eaten today" flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealFlags {
    pub breakfast: bool,
    pub lunch: bool,
    pub dinner: bool,
}

impl MealFlags {
    pub fn eaten(&self, meal: MealType) -> bool {
        match meal {
            MealType::Breakfast => self.breakfast,
            MealType::Lunch => self.lunch,
            MealType::Dinner => self.dinner,
        }
    }

    pub fn toggle(&mut self, meal: MealType) {
        let flag = match meal {
            MealType::Breakfast => &mut self.breakfast,
            MealType::Lunch => &mut self.lunch,
            MealType::Dinner => &mut self.dinner,
        };
        *flag = !*flag;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub last_meal: Option<Timestamp>,
    pub last_sleep: Option<Timestamp>,
    pub last_shower: Option<Timestamp>,
    pub meals: MealFlags,
}

/// Everything a renderer may read about the agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub needs: NeedSet,
    pub activity: ActivitySlot,
    /// Completions per activity name since the last day start
    pub daily_activities: AHashMap<String, u32>,
    pub meta: Meta,
}

/// Callbacks used by [`Agent::check_primary_needs`]
pub trait PrimaryNeedHandlers {
    fn do_sleep(&mut self, variant: ActivityId, minutes: Minutes);
    fn do_eat(&mut self, minutes: Minutes);
    fn do_wash(&mut self, minutes: Minutes);
}

pub struct Agent {
    name: String,
    config: Arc<SimConfig>,
    catalog: Arc<ActivityCatalog>,
    state: AgentState,
    sink: Box<dyn LogSink>,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        config: Arc<SimConfig>,
        catalog: Arc<ActivityCatalog>,
        sink: Box<dyn LogSink>,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            catalog,
            state: AgentState::default(),
            sink,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    /// Direct write access for drivers and tests. Needs written here must
    /// stay within 0..=100.
    pub fn state_mut(&mut self) -> &mut AgentState {
        &mut self.state
    }

    pub fn needs(&self) -> &NeedSet {
        &self.state.needs
    }

    pub fn set_need(&mut self, kind: NeedKind, value: f64) {
        self.state.needs.set(kind, value);
    }

    pub fn daily_count(&self, name: &str) -> u32 {
        self.state.daily_activities.get(name).copied().unwrap_or(0)
    }

    pub fn is_busy(&self, now: Timestamp) -> bool {
        self.state.activity.is_in_progress(now)
    }

    /// Forward an event to tracing and the log sink
    pub fn emit(&mut self, event: SimEvent) {
        tracing::debug!(agent = %self.name, at = %event.at, "{}", event);
        self.sink.emit(&event.log_line());
    }

    fn count_completion(&mut self, name: &str) {
        *self.state.daily_activities.entry(name.to_string()).or_insert(0) += 1;
    }

    /// Start `name` for `minutes`, or extend it when the same activity has
    /// just run out.
    pub fn schedule(&mut self, now: Timestamp, name: &str, minutes: Minutes) {
        let length = Duration::minutes(i64::from(minutes));
        let finished = self.state.activity.has_finished(now);

        if finished && self.state.activity.name == name {
            if let Some(until) = self.state.activity.until.as_mut() {
                *until += length;
            }
            self.count_completion(name);
            tracing::debug!(
                agent = %self.name,
                activity = name,
                until = ?self.state.activity.until,
                "activity extended"
            );
            return;
        }

        let previous = std::mem::take(&mut self.state.activity);
        if let Some(start) = previous.start {
            if finished {
                self.count_completion(&previous.name);
            }
            self.emit(SimEvent::new(
                now,
                SimEventKind::ActivityFinished {
                    name: previous.name,
                    duration: now - start,
                },
            ));
        }

        self.state.activity = ActivitySlot {
            name: name.to_string(),
            start: Some(now),
            until: Some(now + length),
        };
        self.emit(SimEvent::new(
            now,
            SimEventKind::ActivityStarted { name: name.to_string() },
        ));
    }

    /// Apply one minute of the running activity and return the next minute
    ///
    /// Unknown activities have no effect and decay normally.
    pub fn apply_activity_minute(&mut self, now: Timestamp) -> Timestamp {
        let skip_decay = match self.catalog.lookup(&self.state.activity.name) {
            Some(definition) => {
                for (need, delta) in &definition.effects {
                    self.state.needs.add(*need, *delta);
                }
                definition.skip_decay
            }
            None => false,
        };

        if skip_decay {
            self.state.needs.clamp();
        } else {
            self.state.needs.decay_minute(&self.config.decay);
        }

        now + Duration::minutes(1)
    }

    /// Remember a meal. A named meal toggles its "eaten today" flag.
    pub fn record_meal(&mut self, time: Timestamp, meal: Option<MealType>) {
        self.state.meta.last_meal = Some(time);
        if let Some(meal) = meal {
            self.state.meta.meals.toggle(meal);
        }
    }

    pub fn record_sleep(&mut self, time: Timestamp) {
        self.state.meta.last_sleep = Some(time);
    }

    pub fn record_shower(&mut self, time: Timestamp) {
        self.state.meta.last_shower = Some(time);
    }

    /// Emergency guard: energy, nutrition, hygiene against the critical
    /// thresholds. Calls at most one handler.
    pub fn check_primary_needs<H: PrimaryNeedHandlers + ?Sized>(&self, handlers: &mut H) -> bool {
        let needs = &self.state.needs;
        let crit = &self.config.crit;

        if needs.energy < crit.energy {
            handlers.do_sleep(ActivityId::PowerNap, 30);
        } else if needs.nutrition < crit.nutrition {
            handlers.do_eat(45);
        } else if needs.hygiene < crit.hygiene {
            handlers.do_wash(12);
        } else {
            return false;
        }
        true
    }

    /// Clear the per-day counters and meal flags
    pub fn reset_daily(&mut self) {
        self.state.daily_activities.clear();
        self.state.meta.meals = MealFlags::default();
    }

    /// Fresh needs, idle slot, empty counters. The sink is kept.
    pub fn reset(&mut self) {
        self.state = AgentState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::events::LogBuffer;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn agent_with_log() -> (Agent, LogBuffer) {
        let log = LogBuffer::new();
        let agent = Agent::new(
            "PG",
            Arc::new(SimConfig::default()),
            Arc::new(ActivityCatalog::builtin().unwrap()),
            Box::new(log.clone()),
        );
        (agent, log)
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(&'static str, Minutes)>,
    }

    impl PrimaryNeedHandlers for Recorder {
        fn do_sleep(&mut self, variant: ActivityId, minutes: Minutes) {
            assert_eq!(variant, ActivityId::PowerNap);
            self.calls.push(("sleep", minutes));
        }
        fn do_eat(&mut self, minutes: Minutes) {
            self.calls.push(("eat", minutes));
        }
        fn do_wash(&mut self, minutes: Minutes) {
            self.calls.push(("wash", minutes));
        }
    }

    #[test]
    fn test_new_agent_is_idle() {
        let (agent, log) = agent_with_log();
        assert_eq!(agent.state().activity.name, IDLE);
        assert!(!agent.is_busy(at(7, 0)));
        assert!(log.is_empty());
    }

    #[test]
    fn test_schedule_new_occurrence() {
        let (mut agent, log) = agent_with_log();
        agent.schedule(at(7, 0), "Work", 30);
        assert!(agent.is_busy(at(7, 29)));
        assert!(!agent.is_busy(at(7, 30)));
        assert_eq!(agent.state().activity.start, Some(at(7, 0)));
        assert_eq!(log.count_containing("started Work"), 1);
    }

    #[test]
    fn test_extension_keeps_single_occurrence() {
        let (mut agent, log) = agent_with_log();
        agent.schedule(at(9, 0), "Work", 30);
        agent.schedule(at(9, 30), "Work", 30);
        agent.schedule(at(10, 0), "Work", 30);

        let slot = &agent.state().activity;
        assert_eq!(slot.start, Some(at(9, 0)));
        assert_eq!(slot.until, Some(at(10, 30)));
        assert_eq!(log.count_containing("started Work"), 1);
        assert_eq!(log.count_containing("finished Work"), 0);
        assert_eq!(agent.daily_count("Work"), 2);

        agent.schedule(at(10, 30), "Eat", 10);
        assert_eq!(log.count_containing("finished Work (duration 1h 30m)"), 1);
        assert_eq!(agent.daily_count("Work"), 3);
    }

    #[test]
    fn test_preempted_activity_is_not_counted() {
        let (mut agent, log) = agent_with_log();
        agent.schedule(at(9, 0), "Leisure", 60);
        agent.schedule(at(9, 20), "Wash", 12);
        assert_eq!(agent.daily_count("Leisure"), 0);
        assert!(log.lines().iter().any(|l| l.ends_with("finished Leisure (duration 20m)")));
    }

    #[test]
    fn test_same_name_before_until_is_new_occurrence() {
        let (mut agent, log) = agent_with_log();
        agent.schedule(at(9, 0), "Work", 30);
        agent.schedule(at(9, 10), "Work", 30);
        assert_eq!(log.count_containing("started Work"), 2);
        assert_eq!(agent.state().activity.until, Some(at(9, 40)));
    }

    #[test]
    fn test_apply_minute_effects_and_decay() {
        let (mut agent, _) = agent_with_log();
        agent.schedule(at(12, 0), "Eat", 40);
        let before = agent.needs().clone();
        let next = agent.apply_activity_minute(at(12, 0));
        assert_eq!(next, at(12, 1));

        let after = agent.needs();
        let expected = before.nutrition + 50.0 / 40.0 - 4.0 / 60.0;
        assert!((after.nutrition - expected).abs() < 1e-9);
        assert!((after.energy - (before.energy - 3.0 / 60.0)).abs() < 1e-9);
    }

    #[test]
    fn test_night_sleep_skips_decay() {
        let (mut agent, _) = agent_with_log();
        agent.set_need(NeedKind::Energy, 50.0);
        agent.schedule(at(23, 0), "Sleep", 480);
        let before = agent.needs().clone();
        agent.apply_activity_minute(at(23, 0));

        let after = agent.needs();
        assert!((after.energy - (50.0 + 12.5 / 60.0)).abs() < 1e-9);
        assert!((after.nutrition - (before.nutrition - 1.0 / 60.0)).abs() < 1e-9);
        assert_eq!(after.hygiene, before.hygiene);
        assert_eq!(after.fun, before.fun);
    }

    #[test]
    fn test_unknown_activity_only_decays() {
        let (mut agent, _) = agent_with_log();
        agent.schedule(at(9, 0), "Test", 5);
        let before = agent.needs().clone();
        agent.apply_activity_minute(at(9, 0));
        assert!((agent.needs().fun - (before.fun - 2.0 / 60.0)).abs() < 1e-9);
    }

    #[test]
    fn test_apply_minute_clamps() {
        let (mut agent, _) = agent_with_log();
        agent.set_need(NeedKind::Energy, 100.0);
        agent.schedule(at(14, 0), "Power nap", 20);
        for minute in 0..20 {
            agent.apply_activity_minute(at(14, minute));
            assert!(agent.needs().iter().all(|(_, v)| (0.0..=100.0).contains(&v)));
        }
    }

    #[test]
    fn test_record_meal_toggles() {
        let (mut agent, _) = agent_with_log();
        agent.record_meal(at(12, 0), Some(MealType::Lunch));
        assert!(agent.state().meta.meals.lunch);
        agent.record_meal(at(12, 30), Some(MealType::Lunch));
        assert!(!agent.state().meta.meals.lunch);
        assert_eq!(agent.state().meta.last_meal, Some(at(12, 30)));

        agent.record_meal(at(16, 0), None);
        assert_eq!(agent.state().meta.meals, MealFlags::default());
    }

    #[test]
    fn test_primary_needs_order() {
        let (mut agent, _) = agent_with_log();
        let mut recorder = Recorder::default();
        assert!(!agent.check_primary_needs(&mut recorder));
        assert!(recorder.calls.is_empty());

        agent.set_need(NeedKind::Hygiene, 14.0);
        assert!(agent.check_primary_needs(&mut recorder));
        agent.set_need(NeedKind::Nutrition, 14.0);
        assert!(agent.check_primary_needs(&mut recorder));
        agent.set_need(NeedKind::Energy, 19.0);
        assert!(agent.check_primary_needs(&mut recorder));

        assert_eq!(recorder.calls, vec![("wash", 12), ("eat", 45), ("sleep", 30)]);
    }

    #[test]
    fn test_reset_daily_and_reset() {
        let (mut agent, _) = agent_with_log();
        agent.schedule(at(9, 0), "Work", 1);
        agent.schedule(at(9, 1), "Work", 1);
        agent.record_meal(at(9, 1), Some(MealType::Breakfast));
        agent.set_need(NeedKind::Fun, 3.0);

        agent.reset_daily();
        assert!(agent.state().daily_activities.is_empty());
        assert!(!agent.state().meta.meals.breakfast);
        assert_eq!(agent.state().activity.name, "Work");

        agent.reset();
        assert_eq!(agent.state(), &AgentState::default());
    }
}
