//! Work-day planning: fixed work blocks with interstitial activities

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::actions::catalog::ActivityId;
use crate::core::types::{Minutes, Timestamp};

/// One planned activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub start: Timestamp,
    pub name: String,
    pub duration: Minutes,
}

impl ScheduleEntry {
    pub fn new(start: Timestamp, name: impl Into<String>, duration: Minutes) -> Self {
        Self {
            start,
            name: name.into(),
            duration,
        }
    }

    pub fn end(&self) -> Timestamp {
        self.start + Duration::minutes(i64::from(self.duration))
    }
}

fn minutes_between(from: Timestamp, to: Timestamp) -> i64 {
    (to - from).num_minutes()
}

/// Push work blocks of at most `block` minutes from `*cursor` up to `until`
fn fill_work(result: &mut Vec<ScheduleEntry>, cursor: &mut Timestamp, until: Timestamp, block: i64) {
    let mut remaining = minutes_between(*cursor, until);
    while remaining > 0 {
        let chunk = block.min(remaining);
        result.push(ScheduleEntry::new(
            *cursor,
            ActivityId::WorkBlock.label(),
            chunk as Minutes,
        ));
        *cursor += Duration::minutes(chunk);
        remaining -= chunk;
    }
}

/// Lay out `[start, end)` as work blocks of `block_minutes`, splicing in
/// `inserts` at their own start times.
///
/// Inserts are taken in start order. An insert that began before the cursor
/// (before the window, or overlapping the previous insert) moves the cursor to
/// its end without being emitted; one starting exactly at the cursor is
/// emitted. Inserts that start at or after `end` are ignored. The result is
/// contiguous, gap-free and non-overlapping whenever the inserts themselves do
/// not overlap.
pub fn build_schedule(
    start: Timestamp,
    end: Timestamp,
    block_minutes: Minutes,
    inserts: &[ScheduleEntry],
) -> Vec<ScheduleEntry> {
    let block = i64::from(block_minutes.max(1));
    let mut extras: Vec<&ScheduleEntry> = inserts.iter().filter(|e| e.duration > 0).collect();
    extras.sort_by_key(|e| e.start);

    let mut result = Vec::new();
    let mut cursor = start;
    let mut next = 0;

    while cursor < end {
        match extras.get(next) {
            Some(extra) if extra.end() <= cursor => {
                next += 1;
            }
            Some(extra) if extra.start < cursor => {
                cursor = extra.end();
                next += 1;
            }
            Some(extra) if extra.start < end => {
                fill_work(&mut result, &mut cursor, extra.start, block);
                result.push((*extra).clone());
                cursor = extra.end();
                next += 1;
            }
            _ => {
                fill_work(&mut result, &mut cursor, end, block);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn names(entries: &[ScheduleEntry]) -> Vec<(&str, Minutes)> {
        entries.iter().map(|e| (e.name.as_str(), e.duration)).collect()
    }

    #[test]
    fn test_plain_work_day() {
        let plan = build_schedule(at(9, 0), at(11, 0), 30, &[]);
        assert_eq!(plan.len(), 4);
        assert!(plan.iter().all(|e| e.name == "Work" && e.duration == 30));
        assert_eq!(plan[3].start, at(10, 30));
    }

    #[test]
    fn test_last_block_is_truncated() {
        let plan = build_schedule(at(9, 0), at(10, 10), 30, &[]);
        assert_eq!(names(&plan), vec![("Work", 30), ("Work", 30), ("Work", 10)]);
    }

    #[test]
    fn test_insert_is_spliced() {
        let lunch = ScheduleEntry::new(at(12, 0), "Eat", 45);
        let plan = build_schedule(at(11, 0), at(13, 15), 30, &[lunch.clone()]);
        assert_eq!(
            names(&plan),
            vec![("Work", 30), ("Work", 30), ("Eat", 45), ("Work", 30)]
        );
        assert_eq!(plan[2], lunch);
        assert_eq!(plan[3].start, at(12, 45));
    }

    #[test]
    fn test_short_gap_before_insert() {
        let coffee = ScheduleEntry::new(at(9, 40), "Leisure", 10);
        let plan = build_schedule(at(9, 0), at(10, 30), 30, &[coffee]);
        assert_eq!(
            names(&plan),
            vec![("Work", 30), ("Work", 10), ("Leisure", 10), ("Work", 30), ("Work", 10)]
        );
    }

    #[test]
    fn test_insert_spanning_window_start_is_skipped() {
        let breakfast = ScheduleEntry::new(at(8, 30), "Eat", 45);
        let plan = build_schedule(at(9, 0), at(10, 15), 30, &[breakfast]);
        assert_eq!(plan[0].start, at(9, 15));
        assert_eq!(names(&plan), vec![("Work", 30), ("Work", 30)]);
    }

    #[test]
    fn test_insert_at_window_start_and_back_to_back() {
        let standup = ScheduleEntry::new(at(9, 0), "Socialize", 15);
        let coffee = ScheduleEntry::new(at(9, 15), "Leisure", 10);
        let plan = build_schedule(at(9, 0), at(10, 0), 30, &[coffee, standup]);
        assert_eq!(
            names(&plan),
            vec![("Socialize", 15), ("Leisure", 10), ("Work", 30), ("Work", 5)]
        );
        assert_eq!(plan[2].start, at(9, 25));
    }

    #[test]
    fn test_inserts_are_sorted() {
        let late = ScheduleEntry::new(at(10, 0), "Wash", 12);
        let early = ScheduleEntry::new(at(9, 30), "Eat", 10);
        let plan = build_schedule(at(9, 0), at(10, 30), 30, &[late, early]);
        assert_eq!(
            names(&plan),
            vec![("Work", 30), ("Eat", 10), ("Work", 20), ("Wash", 12), ("Work", 18)]
        );
    }

    #[test]
    fn test_stale_insert_before_window_does_not_block_later_ones() {
        let stale = ScheduleEntry::new(at(7, 0), "Eat", 30);
        let later = ScheduleEntry::new(at(9, 30), "Wash", 12);
        let plan = build_schedule(at(9, 0), at(10, 0), 30, &[stale, later]);
        assert_eq!(names(&plan), vec![("Work", 30), ("Wash", 12), ("Work", 18)]);
    }

    #[test]
    fn test_empty_window() {
        assert!(build_schedule(at(9, 0), at(9, 0), 30, &[]).is_empty());
        assert!(build_schedule(at(10, 0), at(9, 0), 30, &[]).is_empty());
    }
}
