//! Events emitted by the agent and driver, and the sinks that receive them
//!
//! The sink is the collaborator-facing channel: it gets one formatted line per
//! event and never pushes back. Tracing mirrors the same events for operators.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use parking_lot::Mutex;

use crate::core::calendar::format_duration;
use crate::core::types::Timestamp;

/// Lines kept by [`LogBuffer`] before the oldest is dropped
pub const LOG_CAPACITY: usize = 300;

#[derive(Debug, Clone, PartialEq)]
pub enum SimEventKind {
    /// A new occurrence of an activity began
    ActivityStarted { name: String },
    /// The previous occurrence ended, naturally or pre-empted
    ActivityFinished { name: String, duration: Duration },
    /// The clock crossed the configured day-start minute
    DayStarted { date: NaiveDate },
    /// The day was reinitialised by the driver
    Reinit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimEvent {
    pub at: Timestamp,
    pub kind: SimEventKind,
}

impl SimEvent {
    pub fn new(at: Timestamp, kind: SimEventKind) -> Self {
        Self { at, kind }
    }

    /// Line handed to the log sink
    pub fn log_line(&self) -> String {
        format!("{} {}", self.at.format("%a %H:%M"), self)
    }
}

impl std::fmt::Display for SimEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            SimEventKind::ActivityStarted { name } => write!(f, "started {}", name),
            SimEventKind::ActivityFinished { name, duration } => {
                write!(f, "finished {} (duration {})", name, format_duration(*duration))
            }
            SimEventKind::DayStarted { date } => write!(f, "day started {}", date),
            SimEventKind::Reinit => write!(f, "day reinitialized"),
        }
    }
}

/// Receiver of log lines. Best effort: implementations must not fail.
pub trait LogSink: Send {
    fn emit(&mut self, message: &str);
}

impl<F> LogSink for F
where
    F: FnMut(&str) + Send,
{
    fn emit(&mut self, message: &str) {
        self(message)
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn emit(&mut self, _message: &str) {}
}

/// Bounded, shareable log. Clones see the same lines.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    lines: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().iter().cloned().collect()
    }

    /// Number of lines containing `needle`
    pub fn count_containing(&self, needle: &str) -> usize {
        self.lines.lock().iter().filter(|l| l.contains(needle)).count()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

impl LogSink for LogBuffer {
    fn emit(&mut self, message: &str) {
        let mut lines = self.lines.lock();
        if lines.len() >= self.capacity {
            lines.pop_front();
        }
        lines.push_back(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32, minute: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_event_lines() {
        let started = SimEvent::new(
            at(7, 0),
            SimEventKind::ActivityStarted { name: "Work".into() },
        );
        assert_eq!(started.log_line(), "Wed 07:00 started Work");

        let finished = SimEvent::new(
            at(8, 5),
            SimEventKind::ActivityFinished {
                name: "Work".into(),
                duration: Duration::minutes(65),
            },
        );
        assert!(finished.log_line().ends_with("finished Work (duration 1h 5m)"));
    }

    #[test]
    fn test_log_buffer_is_bounded_and_shared() {
        let buffer = LogBuffer::with_capacity(2);
        let mut sink = buffer.clone();
        sink.emit("one");
        sink.emit("two");
        sink.emit("three");
        assert_eq!(buffer.lines(), vec!["two", "three"]);
        assert_eq!(buffer.count_containing("t"), 2);
    }

    #[test]
    fn test_closure_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = seen.clone();
        let mut sink = move |msg: &str| captured.lock().push(msg.to_string());
        sink.emit("hello");
        assert_eq!(*seen.lock(), vec!["hello".to_string()]);
    }
}
