//! Ordered day policy: first matching rule wins
//!
//! Each rule is a pure function of the agent's needs, the meal flags, the
//! config and the clock. The driver applies the returned [`Decision`]; rules
//! never mutate anything themselves.

use chrono::Timelike;
use serde::Serialize;

use crate::actions::catalog::ActivityId;
use crate::core::calendar::{is_weekend, next_hour_mark};
use crate::core::config::SimConfig;
use crate::core::types::{MealType, Minutes, Timestamp};
use crate::entity::agent::MealFlags;
use crate::entity::needs::NeedSet;

/// Night sleep window: from this hour...
pub const BEDTIME_HOUR: u32 = 23;
/// ...until this hour
pub const WAKE_HOUR: u32 = 7;
/// Exhausted agents may go to bed from this hour
pub const EARLY_BEDTIME_HOUR: u32 = 21;
pub const MIN_NIGHT_SLEEP: Minutes = 360;
pub const MAX_NIGHT_SLEEP: Minutes = 540;
/// Social activities are open to everyone from this hour on weekdays
pub const EVENING_HOUR: u32 = 19;

pub const WORK_BLOCK_MINUTES: Minutes = 30;
pub const EMERGENCY_NAP_MINUTES: Minutes = 30;
pub const EMERGENCY_MEAL_MINUTES: Minutes = 45;
pub const WASH_MINUTES: Minutes = 12;
pub const DAY_NAP_MINUTES: Minutes = 20;
pub const SOCIAL_MINUTES: Minutes = 90;
pub const FUN_MINUTES: Minutes = 60;
pub const IDLE_MINUTES: Minutes = 5;

/// Which rule produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RuleName {
    NightSleep,
    Meals,
    Work,
    Emergencies,
    DayNap,
    Social,
    Fun,
    Hygiene,
    Idle,
}

/// What the agent should do next
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Decision {
    pub rule: RuleName,
    pub activity: ActivityId,
    pub minutes: Minutes,
    /// Set when a meal-window rule fired
    pub meal: Option<MealType>,
}

impl Decision {
    pub fn new(rule: RuleName, activity: ActivityId, minutes: Minutes) -> Self {
        Self {
            rule,
            activity,
            minutes,
            meal: None,
        }
    }

    fn with_meal(mut self, meal: MealType) -> Self {
        self.meal = Some(meal);
        self
    }

    /// Every power nap counts toward the daily nap limit
    pub fn is_nap(&self) -> bool {
        self.activity == ActivityId::PowerNap
    }
}

/// Read-only view handed to every rule
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub needs: &'a NeedSet,
    pub meals_eaten: &'a MealFlags,
    pub config: &'a SimConfig,
    pub now: Timestamp,
    pub nap_count: u32,
}

impl RuleContext<'_> {
    pub fn hour(&self) -> u32 {
        self.now.hour()
    }

    pub fn is_weekend(&self) -> bool {
        is_weekend(self.now)
    }
}

pub type RuleFn = fn(&RuleContext) -> Option<Decision>;

/// Rules in priority order. Reordering changes behavior.
pub const DAY_RULES: [(RuleName, RuleFn); 9] = [
    (RuleName::NightSleep, night_sleep),
    (RuleName::Meals, meals),
    (RuleName::Work, work),
    (RuleName::Emergencies, emergencies),
    (RuleName::DayNap, day_nap),
    (RuleName::Social, social),
    (RuleName::Fun, fun),
    (RuleName::Hygiene, hygiene),
    (RuleName::Idle, idle),
];

/// Evaluate the rules top to bottom and return the first decision
pub fn evaluate(ctx: &RuleContext) -> Decision {
    DAY_RULES
        .iter()
        .find_map(|(_, rule)| rule(ctx))
        .unwrap_or(Decision::new(RuleName::Idle, ActivityId::Idle, IDLE_MINUTES))
}

/// Length of a night's sleep starting at `now`
pub fn night_sleep_minutes(now: Timestamp) -> Minutes {
    let until_morning = (next_hour_mark(now, WAKE_HOUR) - now).num_minutes();
    until_morning.clamp(i64::from(MIN_NIGHT_SLEEP), i64::from(MAX_NIGHT_SLEEP)) as Minutes
}

pub fn night_sleep(ctx: &RuleContext) -> Option<Decision> {
    let h = ctx.hour();
    let exhausted = ctx.needs.energy < ctx.config.crit.energy && h >= EARLY_BEDTIME_HOUR;
    if h >= BEDTIME_HOUR || h < WAKE_HOUR || exhausted {
        return Some(Decision::new(
            RuleName::NightSleep,
            ActivityId::SleepNight,
            night_sleep_minutes(ctx.now),
        ));
    }
    None
}

pub fn meals(ctx: &RuleContext) -> Option<Decision> {
    let meal = ctx.config.meals.meal_at(ctx.hour())?;
    if ctx.meals_eaten.eaten(meal) {
        return None;
    }

    let need = 100.0 - ctx.needs.nutrition;
    let minutes = if need > 30.0 {
        40
    } else if need > 15.0 {
        25
    } else if need > 0.0 {
        10
    } else {
        return None;
    };
    Some(Decision::new(RuleName::Meals, ActivityId::Eat, minutes).with_meal(meal))
}

/// Nap, meal or wash when a primary need is below its critical threshold
fn critical_response(ctx: &RuleContext, rule: RuleName) -> Option<Decision> {
    let needs = ctx.needs;
    let crit = &ctx.config.crit;
    if needs.energy < crit.energy {
        Some(Decision::new(rule, ActivityId::PowerNap, EMERGENCY_NAP_MINUTES))
    } else if needs.nutrition < crit.nutrition {
        Some(Decision::new(rule, ActivityId::Eat, EMERGENCY_MEAL_MINUTES))
    } else if needs.hygiene < crit.hygiene {
        Some(Decision::new(rule, ActivityId::Wash, WASH_MINUTES))
    } else {
        None
    }
}

pub fn work(ctx: &RuleContext) -> Option<Decision> {
    let cfg = &ctx.config.work;
    let h = ctx.hour();
    if !cfg.on || ctx.is_weekend() || h < cfg.start || h >= cfg.end {
        return None;
    }
    critical_response(ctx, RuleName::Work).or(Some(Decision::new(
        RuleName::Work,
        ActivityId::WorkBlock,
        WORK_BLOCK_MINUTES,
    )))
}

pub fn emergencies(ctx: &RuleContext) -> Option<Decision> {
    critical_response(ctx, RuleName::Emergencies)
}

pub fn day_nap(ctx: &RuleContext) -> Option<Decision> {
    if ctx.needs.energy < ctx.config.thr.energy
        && ctx.nap_count < ctx.config.limits.max_naps_per_day
    {
        return Some(Decision::new(RuleName::DayNap, ActivityId::PowerNap, DAY_NAP_MINUTES));
    }
    None
}

pub fn social(ctx: &RuleContext) -> Option<Decision> {
    if (ctx.is_weekend() || ctx.hour() >= EVENING_HOUR) && ctx.needs.social < ctx.config.thr.social {
        return Some(Decision::new(RuleName::Social, ActivityId::Social, SOCIAL_MINUTES));
    }
    None
}

pub fn fun(ctx: &RuleContext) -> Option<Decision> {
    (ctx.needs.fun < ctx.config.thr.fun)
        .then(|| Decision::new(RuleName::Fun, ActivityId::Fun, FUN_MINUTES))
}

pub fn hygiene(ctx: &RuleContext) -> Option<Decision> {
    (ctx.needs.hygiene < ctx.config.thr.hygiene)
        .then(|| Decision::new(RuleName::Hygiene, ActivityId::Wash, WASH_MINUTES))
}

pub fn idle(_ctx: &RuleContext) -> Option<Decision> {
    Some(Decision::new(RuleName::Idle, ActivityId::Idle, IDLE_MINUTES))
}
