pub mod events;
pub mod pacer;
pub mod universe;

pub use events::{LogBuffer, LogSink, NullSink, SimEvent, SimEventKind, LOG_CAPACITY};
pub use pacer::{Control, Pacer};
pub use universe::{
    Universe, UniverseSnapshot, DEFAULT_AGENT_NAME, MAX_SPEED, MIN_SPEED, MIN_TICK_PERIOD,
};
