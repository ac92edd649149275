//! Activity definitions and catalog

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{Minutes, NeedKind};

/// Built-in activity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityId {
    SleepNight,
    SleepShort,
    PowerNap,
    WorkBlock,
    Eat,
    Wash,
    Social,
    Fun,
    Idle,
}

impl ActivityId {
    pub const ALL: [ActivityId; 9] = [
        ActivityId::SleepNight,
        ActivityId::SleepShort,
        ActivityId::PowerNap,
        ActivityId::WorkBlock,
        ActivityId::Eat,
        ActivityId::Wash,
        ActivityId::Social,
        ActivityId::Fun,
        ActivityId::Idle,
    ];

    /// Internal lookup key
    pub fn key(&self) -> &'static str {
        match self {
            ActivityId::SleepNight => "sleep.night",
            ActivityId::SleepShort => "sleep.short",
            ActivityId::PowerNap => "sleep.power",
            ActivityId::WorkBlock => "work.block",
            ActivityId::Eat => "eat",
            ActivityId::Wash => "wash",
            ActivityId::Social => "social",
            ActivityId::Fun => "fun",
            ActivityId::Idle => "idle",
        }
    }

    /// Display label, also the name carried by the agent's activity slot
    pub fn label(&self) -> &'static str {
        match self {
            ActivityId::SleepNight => "Sleep",
            ActivityId::SleepShort => "Sleep (short)",
            ActivityId::PowerNap => "Power nap",
            ActivityId::WorkBlock => "Work",
            ActivityId::Eat => "Eat",
            ActivityId::Wash => "Wash",
            ActivityId::Social => "Socialize",
            ActivityId::Fun => "Leisure",
            ActivityId::Idle => "Idle",
        }
    }

    pub fn is_sleep(&self) -> bool {
        matches!(
            self,
            ActivityId::SleepNight | ActivityId::SleepShort | ActivityId::PowerNap
        )
    }

    pub fn definition(&self) -> ActivityDefinition {
        let def = ActivityDefinition::new(self.label());
        match self {
            ActivityId::SleepNight => def
                .with_duration(480)
                .with_effect(NeedKind::Energy, 12.5 / 60.0)
                .with_effect(NeedKind::Nutrition, -1.0 / 60.0)
                .skipping_decay(),
            ActivityId::SleepShort => def
                .with_duration(120)
                .with_effect(NeedKind::Energy, 8.0 / 60.0)
                .with_effect(NeedKind::Nutrition, -0.5 / 60.0),
            ActivityId::PowerNap => def
                .with_duration(20)
                .with_effect(NeedKind::Energy, 0.5),
            ActivityId::WorkBlock => def
                .with_duration(30)
                .with_effect(NeedKind::Energy, -4.0 / 60.0)
                .with_effect(NeedKind::Nutrition, -2.0 / 60.0),
            ActivityId::Eat => def
                .with_duration(40)
                .with_effect(NeedKind::Nutrition, 50.0 / 40.0),
            ActivityId::Wash => def
                .with_duration(12)
                .with_effect(NeedKind::Hygiene, 40.0 / 12.0),
            ActivityId::Social => def
                .with_duration(90)
                .with_effect(NeedKind::Social, 35.0 / 90.0)
                .with_effect(NeedKind::Fun, 10.0 / 90.0)
                .with_effect(NeedKind::Energy, -1.0 / 60.0),
            ActivityId::Fun => def
                .with_duration(60)
                .with_effect(NeedKind::Fun, 25.0 / 60.0),
            ActivityId::Idle => def
                .with_duration(5)
                .with_effect(NeedKind::Energy, 0.2),
        }
    }
}

/// Immutable catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDefinition {
    pub label: String,
    /// Default block length, used by planning helpers only
    pub duration: Option<Minutes>,
    /// Per-minute additive deltas
    pub effects: Vec<(NeedKind, f64)>,
    /// Suppress ambient decay while running
    pub skip_decay: bool,
}

impl ActivityDefinition {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            duration: None,
            effects: Vec::new(),
            skip_decay: false,
        }
    }

    pub fn with_duration(mut self, minutes: Minutes) -> Self {
        self.duration = Some(minutes);
        self
    }

    pub fn with_effect(mut self, need: NeedKind, per_minute: f64) -> Self {
        self.effects.push((need, per_minute));
        self
    }

    pub fn skipping_decay(mut self) -> Self {
        self.skip_decay = true;
        self
    }
}

/// Registry of activity definitions, addressable by key or by label
#[derive(Debug, Clone)]
pub struct ActivityCatalog {
    definitions: Vec<ActivityDefinition>,
    by_key: AHashMap<String, usize>,
    by_label: AHashMap<String, usize>,
}

impl ActivityCatalog {
    /// Build a catalog. Keys and labels must both be unique.
    pub fn from_definitions<I, K>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, ActivityDefinition)>,
        K: Into<String>,
    {
        let mut catalog = Self {
            definitions: Vec::new(),
            by_key: AHashMap::new(),
            by_label: AHashMap::new(),
        };

        for (key, definition) in entries {
            let key = key.into();
            if catalog.by_key.contains_key(&key) {
                return Err(SimError::DuplicateActivity { field: "key", value: key });
            }
            if catalog.by_label.contains_key(&definition.label) {
                return Err(SimError::DuplicateActivity {
                    field: "label",
                    value: definition.label,
                });
            }

            let idx = catalog.definitions.len();
            catalog.by_key.insert(key, idx);
            catalog.by_label.insert(definition.label.clone(), idx);
            catalog.definitions.push(definition);
        }

        Ok(catalog)
    }

    /// The standard activity set
    pub fn builtin() -> Result<Self> {
        Self::from_definitions(ActivityId::ALL.iter().map(|id| (id.key(), id.definition())))
    }

    /// Resolve by internal key, falling back to label
    pub fn lookup(&self, key: &str) -> Option<&ActivityDefinition> {
        self.by_key
            .get(key)
            .or_else(|| self.by_label.get(key))
            .and_then(|idx| self.definitions.get(*idx))
    }

    pub fn get(&self, id: ActivityId) -> Option<&ActivityDefinition> {
        self.lookup(id.key())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
