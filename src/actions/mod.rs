pub mod catalog;
pub mod schedule;

pub use catalog::{ActivityCatalog, ActivityDefinition, ActivityId};
pub use schedule::{build_schedule, ScheduleEntry};
