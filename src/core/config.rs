//! Simulation configuration with documented defaults
//!
//! Every tunable of the day policy lives here. The config is built once,
//! validated, and then shared read-only by the driver, the agent and the
//! rule engine.

use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{MealType, NeedKind, Timestamp};

/// Configuration for one simulated run
///
/// Loading from TOML requires the `thr` and `crit` tables in full; every other
/// section falls back to its default when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Reserved for future stochastic extensions. The policy never reads it.
    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default)]
    pub time: TimeConfig,

    #[serde(default)]
    pub work: WorkConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub meals: MealWindows,

    /// Ambient decay, expressed per simulated hour
    #[serde(default)]
    pub decay: DecayRates,

    /// Low thresholds: below these a need is worth attending to
    pub thr: NeedThresholds,

    /// Critical thresholds: below these emergency rules override everything
    /// except night sleep and meals
    pub crit: NeedThresholds,
}

fn default_seed() -> u64 {
    12345
}

/// Day start and simulation origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeConfig {
    /// Hour at which the day starts: daily counters reset here and reinit
    /// places the clock here
    pub start_hour: u32,

    /// Calendar date of the first simulated day (2025-01-01 is a Wednesday)
    pub start_date: NaiveDate,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            start_hour: 7,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or(NaiveDate::MIN),
        }
    }
}

/// Weekday work window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkConfig {
    pub on: bool,
    /// First working hour (inclusive)
    pub start: u32,
    /// End hour (exclusive)
    pub end: u32,
}

impl Default for WorkConfig {
    fn default() -> Self {
        Self { on: true, start: 9, end: 17 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Daytime naps allowed before the nap rule stops firing
    pub max_naps_per_day: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { max_naps_per_day: 2 }
    }
}

/// Half-open hour interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourWindow(pub u32, pub u32);

impl HourWindow {
    pub fn contains(&self, hour: u32) -> bool {
        hour >= self.0 && hour < self.1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealWindows {
    pub breakfast: HourWindow,
    pub lunch: HourWindow,
    pub dinner: HourWindow,
}

impl MealWindows {
    pub fn window(&self, meal: MealType) -> HourWindow {
        match meal {
            MealType::Breakfast => self.breakfast,
            MealType::Lunch => self.lunch,
            MealType::Dinner => self.dinner,
        }
    }

    /// First meal whose window contains `hour`, checked breakfast, lunch, dinner
    pub fn meal_at(&self, hour: u32) -> Option<MealType> {
        MealType::ALL
            .into_iter()
            .find(|meal| self.window(*meal).contains(hour))
    }
}

impl Default for MealWindows {
    fn default() -> Self {
        Self {
            breakfast: HourWindow(6, 9),
            lunch: HourWindow(12, 15),
            dinner: HourWindow(19, 22),
        }
    }
}

/// Energy decay is nested so that modifiers can be added beside `base`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyDecay {
    pub base: f64,
}

/// Per-hour ambient decay of each need
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayRates {
    pub energy: EnergyDecay,
    pub nutrition: f64,
    pub hygiene: f64,
    pub social: f64,
    pub fun: f64,
}

impl DecayRates {
    pub fn per_hour(&self, kind: NeedKind) -> f64 {
        match kind {
            NeedKind::Energy => self.energy.base,
            NeedKind::Nutrition => self.nutrition,
            NeedKind::Hygiene => self.hygiene,
            NeedKind::Social => self.social,
            NeedKind::Fun => self.fun,
        }
    }
}

impl Default for DecayRates {
    fn default() -> Self {
        Self {
            energy: EnergyDecay { base: 3.0 },
            nutrition: 4.0,
            hygiene: 2.0,
            social: 1.5,
            fun: 2.0,
        }
    }
}

/// One threshold per need. All five keys are mandatory in TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedThresholds {
    pub energy: f64,
    pub nutrition: f64,
    pub hygiene: f64,
    pub social: f64,
    pub fun: f64,
}

impl NeedThresholds {
    pub fn get(&self, kind: NeedKind) -> f64 {
        match kind {
            NeedKind::Energy => self.energy,
            NeedKind::Nutrition => self.nutrition,
            NeedKind::Hygiene => self.hygiene,
            NeedKind::Social => self.social,
            NeedKind::Fun => self.fun,
        }
    }

    pub fn low() -> Self {
        Self { energy: 35.0, nutrition: 30.0, hygiene: 25.0, social: 35.0, fun: 35.0 }
    }

    pub fn critical() -> Self {
        Self { energy: 20.0, nutrition: 15.0, hygiene: 15.0, social: 10.0, fun: 10.0 }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            time: TimeConfig::default(),
            work: WorkConfig::default(),
            limits: LimitsConfig::default(),
            meals: MealWindows::default(),
            decay: DecayRates::default(),
            thr: NeedThresholds::low(),
            crit: NeedThresholds::critical(),
        }
    }
}

impl SimConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// First simulated instant: `start_date` at `start_hour`:00
    pub fn start_time(&self) -> Timestamp {
        let midnight = self
            .time
            .start_date
            .and_hms_opt(0, 0, 0)
            .unwrap_or(NaiveDateTime::MIN);
        midnight + Duration::hours(i64::from(self.time.start_hour))
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(SimError::InvalidConfig(msg));

        if self.time.start_hour >= 24 {
            return invalid(format!("time.start_hour ({}) must be < 24", self.time.start_hour));
        }

        if self.work.start >= self.work.end || self.work.end > 24 {
            return invalid(format!(
                "work window [{}, {}) must be non-empty and within 0..24",
                self.work.start, self.work.end
            ));
        }

        for meal in MealType::ALL {
            let HourWindow(start, end) = self.meals.window(meal);
            if start >= end || end > 24 {
                return invalid(format!(
                    "meals.{:?} window [{}, {}) must be non-empty and within 0..24",
                    meal, start, end
                ));
            }
        }

        for kind in NeedKind::ALL {
            let rate = self.decay.per_hour(kind);
            if !rate.is_finite() || rate < 0.0 {
                return invalid(format!("decay.{} ({}) must be >= 0", kind, rate));
            }

            let low = self.thr.get(kind);
            let crit = self.crit.get(kind);
            for (table, value) in [("thr", low), ("crit", crit)] {
                if !(0.0..=100.0).contains(&value) {
                    return invalid(format!("{}.{} ({}) must be within 0..=100", table, kind, value));
                }
            }
            if crit > low {
                return invalid(format!(
                    "crit.{} ({}) should be <= thr.{} ({})",
                    kind, crit, kind, low
                ));
            }
        }

        Ok(())
    }
}
