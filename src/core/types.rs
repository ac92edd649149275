//! Core type definitions used throughout the codebase

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Simulated wall-clock instant (minute resolution in practice)
pub type Timestamp = NaiveDateTime;

/// Length of an activity or schedule entry in simulated minutes
pub type Minutes = u32;

/// The five physiological needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeedKind {
    Energy,
    Nutrition,
    Hygiene,
    Social,
    Fun,
}

impl NeedKind {
    pub const ALL: [NeedKind; 5] = [
        NeedKind::Energy,
        NeedKind::Nutrition,
        NeedKind::Hygiene,
        NeedKind::Social,
        NeedKind::Fun,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NeedKind::Energy => "energy",
            NeedKind::Nutrition => "nutrition",
            NeedKind::Hygiene => "hygiene",
            NeedKind::Social => "social",
            NeedKind::Fun => "fun",
        }
    }
}

impl std::fmt::Display for NeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Meals tracked by the "already eaten today" flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    pub const ALL: [MealType; 3] = [MealType::Breakfast, MealType::Lunch, MealType::Dinner];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_need_kind_names() {
        let names: Vec<_> = NeedKind::ALL.iter().map(|k| k.to_string()).collect();
        assert_eq!(names, ["energy", "nutrition", "hygiene", "social", "fun"]);
    }

    #[test]
    fn test_meal_type_serializes_lowercase() {
        let json = serde_json::to_string(&MealType::Lunch).unwrap();
        assert_eq!(json, "\"lunch\"");
    }
}
