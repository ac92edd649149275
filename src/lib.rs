//! Daylife - minute-by-minute simulation of one person's day
//!
//! A single agent with five decaying needs is driven through the day by an
//! ordered rule engine: sleep, meals, work, emergencies, naps, leisure.

pub mod actions;
pub mod core;
pub mod entity;
pub mod rules;
pub mod simulation;
