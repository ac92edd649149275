pub mod calendar;
pub mod config;
pub mod error;
pub mod types;

pub use calendar::{format_duration, SimClock};
pub use config::SimConfig;
pub use error::{Result, SimError};
