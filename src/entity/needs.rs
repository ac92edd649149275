//! Bounded physiological needs and their decay

use serde::{Deserialize, Serialize};

use crate::core::config::DecayRates;
use crate::core::types::NeedKind;

pub const NEED_MIN: f64 = 0.0;
pub const NEED_MAX: f64 = 100.0;

/// Five need levels. 100 = fully satisfied, 0 = depleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedSet {
    pub energy: f64,
    pub nutrition: f64,
    pub hygiene: f64,
    pub social: f64,
    pub fun: f64,
}

impl Default for NeedSet {
    fn default() -> Self {
        Self {
            energy: 95.0,
            nutrition: 85.0,
            hygiene: 80.0,
            social: 75.0,
            fun: 80.0,
        }
    }
}

impl NeedSet {
    pub fn get(&self, kind: NeedKind) -> f64 {
        match kind {
            NeedKind::Energy => self.energy,
            NeedKind::Nutrition => self.nutrition,
            NeedKind::Hygiene => self.hygiene,
            NeedKind::Social => self.social,
            NeedKind::Fun => self.fun,
        }
    }

    fn slot_mut(&mut self, kind: NeedKind) -> &mut f64 {
        match kind {
            NeedKind::Energy => &mut self.energy,
            NeedKind::Nutrition => &mut self.nutrition,
            NeedKind::Hygiene => &mut self.hygiene,
            NeedKind::Social => &mut self.social,
            NeedKind::Fun => &mut self.fun,
        }
    }

    /// Add `delta` without clamping. Callers must `clamp()` before the value
    /// is observed.
    pub fn add(&mut self, kind: NeedKind, delta: f64) {
        *self.slot_mut(kind) += delta;
    }

    /// Set a need, clamped into range
    pub fn set(&mut self, kind: NeedKind, value: f64) {
        *self.slot_mut(kind) = value.clamp(NEED_MIN, NEED_MAX);
    }

    /// Apply one minute of ambient decay (rates are per hour), then clamp
    pub fn decay_minute(&mut self, rates: &DecayRates) {
        for kind in NeedKind::ALL {
            *self.slot_mut(kind) -= rates.per_hour(kind) / 60.0;
        }
        self.clamp();
    }

    pub fn clamp(&mut self) {
        for kind in NeedKind::ALL {
            let value = *self.slot_mut(kind);
            // NaN would survive f64::clamp
            *self.slot_mut(kind) = if value.is_nan() {
                NEED_MIN
            } else {
                value.clamp(NEED_MIN, NEED_MAX)
            };
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (NeedKind, f64)> + '_ {
        NeedKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}
