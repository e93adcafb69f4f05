//! Date- and hour-keyed projections.
//!
//! Matching a record to a calendar day is a prefix test on the raw timestamp
//! string, never a range comparison on parsed values.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, TimeDelta};

use crate::visit::VisitRecord;

use super::{DailyStat, HourBlock, WeekdayComparison};

/// Labels of the six 4-hour buckets, in output order.
pub const HOUR_BLOCKS: [&str; 6] = ["00-04", "04-08", "08-12", "12-16", "16-20", "20-24"];

pub const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const DAILY_WINDOW_DAYS: i64 = 7;

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn on_date(record: &VisitRecord, key: &str) -> bool {
    record.timestamp.starts_with(key)
}

/// Clock hour of a `YYYY-MM-DD HH:MM:SS` timestamp. `None` when the time part
/// is missing or its hour is not 0..=23.
pub fn hour_of(timestamp: &str) -> Option<u32> {
    let time = timestamp.split(' ').nth(1)?;
    let hour: u32 = time.split(':').next()?.trim().parse().ok()?;
    (hour < 24).then_some(hour)
}

pub fn count_on(records: &[VisitRecord], key: &str) -> u64 {
    records.iter().filter(|r| on_date(r, key)).count() as u64
}

pub fn unique_on(records: &[VisitRecord], key: &str) -> u64 {
    records
        .iter()
        .filter(|r| on_date(r, key))
        .map(|r| r.visitor_id.as_str())
        .collect::<HashSet<_>>()
        .len() as u64
}

/// Views and distinct visitors for each of the seven days ending at `today`,
/// oldest first.
pub fn daily_series(records: &[VisitRecord], today: NaiveDate) -> Vec<DailyStat> {
    (0..DAILY_WINDOW_DAYS)
        .rev()
        .map(|offset| {
            let date = date_key(today - TimeDelta::days(offset));
            DailyStat {
                views: count_on(records, &date),
                unique_visitors: unique_on(records, &date),
                date,
            }
        })
        .collect()
}

/// Sunday-first comparison of this calendar week against the previous one.
pub fn week_comparison(records: &[VisitRecord], today: NaiveDate) -> Vec<WeekdayComparison> {
    let week_start =
        today - TimeDelta::days(i64::from(today.weekday().num_days_from_sunday()));
    WEEKDAY_NAMES
        .iter()
        .zip(0i64..)
        .map(|(day, offset)| {
            let this_week = week_start + TimeDelta::days(offset);
            let last_week = this_week - TimeDelta::days(7);
            WeekdayComparison {
                day: (*day).to_string(),
                this_week: count_on(records, &date_key(this_week)),
                last_week: count_on(records, &date_key(last_week)),
            }
        })
        .collect()
}

pub fn hour_distribution(records: &[VisitRecord]) -> Vec<HourBlock> {
    let mut counts = [0u64; HOUR_BLOCKS.len()];
    for hour in records.iter().filter_map(|r| hour_of(&r.timestamp)) {
        counts[(hour / 4) as usize] += 1;
    }
    HOUR_BLOCKS
        .iter()
        .zip(counts)
        .map(|(block, count)| HourBlock {
            block: (*block).to_string(),
            count,
        })
        .collect()
}

/// Busiest bucket; the earliest one wins a tie.
pub fn peak_hour(blocks: &[HourBlock]) -> Option<HourBlock> {
    blocks
        .iter()
        .fold(None::<&HourBlock>, |best, block| match best {
            Some(b) if b.count >= block.count => Some(b),
            _ => Some(block),
        })
        .cloned()
}
