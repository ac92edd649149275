//! Day policy: ordered condition -> activity rules

pub mod policy;

pub use policy::{evaluate, Decision, RuleContext, RuleName, DAY_RULES};
