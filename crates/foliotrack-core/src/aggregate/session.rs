use chrono::{NaiveDateTime, TimeDelta};

/// Inactivity gap after which a visitor's next record starts a new session.
pub const SESSION_TIMEOUT_MINUTES: i64 = 30;

pub fn session_timeout() -> TimeDelta {
    TimeDelta::minutes(SESSION_TIMEOUT_MINUTES)
}

/// Partition a time-ordered sequence into runs, starting a new run whenever
/// the gap to the previous item is strictly greater than `max_gap`.
///
/// An item without a timestamp never starts a new run, and neither does the
/// item right after it since there is no gap to measure. Every returned run is
/// non-empty.
pub fn split_on_gap<T, I>(pairs: I, max_gap: TimeDelta) -> Vec<Vec<T>>
where
    I: IntoIterator<Item = (Option<NaiveDateTime>, T)>,
{
    let mut runs = Vec::new();
    let mut current: Vec<T> = Vec::new();
    let mut last: Option<NaiveDateTime> = None;

    for (ts, payload) in pairs {
        if let (Some(prev), Some(at)) = (last, ts) {
            if at - prev > max_gap && !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        }
        current.push(payload);
        last = ts;
    }

    if !current.is_empty() {
        runs.push(current);
    }
    runs
}
