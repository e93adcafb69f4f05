//! Dashboard aggregation over the visit log.
//!
//! [`summarize`] is a pure function of the records and the supplied `now`; it
//! never reads the wall clock, never mutates its input, and is defined for
//! every input (empty or malformed rows degrade to zero counts).

pub mod calendar;
pub mod journey;
pub mod rank;
pub mod session;

use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::visit::{VisitRecord, DIRECT, UNKNOWN};

use self::rank::rank_counts;

/// Cap applied to every ranked list except the event breakdown.
pub const TOP_N: usize = 10;

pub const RECENT_VISITOR_LIMIT: usize = 10;

const VISITOR_ID_PREVIEW_CHARS: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub summary: SummaryCounts,
    pub daily_stats: Vec<DailyStat>,
    pub week_comparison: Vec<WeekdayComparison>,
    pub hour_blocks: Vec<HourBlock>,
    pub top_locations: Vec<LocationCount>,
    pub top_countries: Vec<CountryCount>,
    pub top_referrers: Vec<ReferrerCount>,
    pub event_breakdown: Vec<EventCount>,
    pub recent_visitors: Vec<RecentVisitor>,
    pub top_pages: Vec<PageCount>,
    pub top_journeys: Vec<JourneyCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCounts {
    pub total_page_views: u64,
    pub unique_visitors: u64,
    pub today_views: u64,
    pub today_unique: u64,
    /// Rows written while their visitor id was unseen.
    pub new_visitors: u64,
    pub returning_visitors: u64,
    /// Rows per distinct visitor, one decimal, `"0"` with no visitors.
    pub avg_pages_per_visitor: String,
    pub peak_hour: Option<HourBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStat {
    pub date: String,
    pub views: u64,
    pub unique_visitors: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayComparison {
    pub day: String,
    pub this_week: u64,
    pub last_week: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourBlock {
    pub block: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCount {
    pub location: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryCount {
    pub country: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferrerCount {
    pub referrer: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCount {
    pub event: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageCount {
    pub page: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyCount {
    pub journey: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentVisitor {
    /// First eight characters of the id followed by `...`.
    pub visitor_id: String,
    pub location: String,
    pub last_visit: String,
    /// Rows logged for this visitor across the whole log.
    pub page_count: u64,
    pub status: String,
}

fn is_known(value: &str) -> bool {
    !value.is_empty() && value != UNKNOWN
}

/// Build every dashboard projection from the full visit log.
pub fn summarize(records: &[VisitRecord], now: NaiveDateTime) -> DashboardSummary {
    let today = now.date();
    let today_key = calendar::date_key(today);

    let total = records.len() as u64;
    let unique = records
        .iter()
        .map(|r| r.visitor_id.as_str())
        .collect::<HashSet<_>>()
        .len() as u64;

    let hour_blocks = calendar::hour_distribution(records);

    let summary = SummaryCounts {
        total_page_views: total,
        unique_visitors: unique,
        today_views: calendar::count_on(records, &today_key),
        today_unique: calendar::unique_on(records, &today_key),
        new_visitors: records.iter().filter(|r| r.status == "New").count() as u64,
        returning_visitors: records.iter().filter(|r| r.status == "Existing").count() as u64,
        avg_pages_per_visitor: average_one_decimal(total, unique),
        peak_hour: calendar::peak_hour(&hour_blocks),
    };

    let top_locations = rank_counts(
        records,
        |r| is_known(&r.city).then(|| format!("{}, {}", r.city, r.country)),
        Some(TOP_N),
    )
    .into_iter()
    .map(|(location, count)| LocationCount { location, count })
    .collect();

    let top_countries = rank_counts(
        records,
        |r| is_known(&r.country).then_some(r.country.as_str()),
        Some(TOP_N),
    )
    .into_iter()
    .map(|(country, count)| CountryCount {
        country: country.to_string(),
        count,
    })
    .collect();

    let top_referrers = rank_counts(
        records,
        |r| (!r.referrer.is_empty() && r.referrer != DIRECT).then_some(r.referrer.as_str()),
        Some(TOP_N),
    )
    .into_iter()
    .map(|(referrer, count)| ReferrerCount {
        referrer: referrer.to_string(),
        count,
    })
    .collect();

    let event_breakdown = rank_counts(records, |r| r.event_name(), None)
        .into_iter()
        .map(|(event, count)| EventCount {
            event: event.to_string(),
            count,
        })
        .collect();

    let top_pages = rank_counts(
        records,
        |r| (!r.is_event()).then_some(r.path.as_str()),
        Some(TOP_N),
    )
    .into_iter()
    .map(|(page, count)| PageCount {
        page: page.to_string(),
        count,
    })
    .collect();

    let top_journeys = rank_counts(journey::visitor_journeys(records), Some, Some(TOP_N))
        .into_iter()
        .map(|(journey, count)| JourneyCount { journey, count })
        .collect();

    DashboardSummary {
        summary,
        daily_stats: calendar::daily_series(records, today),
        week_comparison: calendar::week_comparison(records, today),
        hour_blocks,
        top_locations,
        top_countries,
        top_referrers,
        event_breakdown,
        recent_visitors: recent_visitors(records),
        top_pages,
        top_journeys,
    }
}

/// The ten most recently active visitors, newest first.
pub fn recent_visitors(records: &[VisitRecord]) -> Vec<RecentVisitor> {
    let mut page_counts: HashMap<&str, u64> = HashMap::new();
    for record in records {
        *page_counts.entry(record.visitor_id.as_str()).or_default() += 1;
    }

    let mut by_recency: Vec<&VisitRecord> = records.iter().collect();
    by_recency.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut seen: HashSet<&str> = HashSet::new();
    let mut recent = Vec::with_capacity(RECENT_VISITOR_LIMIT);
    for record in by_recency {
        if recent.len() >= RECENT_VISITOR_LIMIT {
            break;
        }
        if !seen.insert(record.visitor_id.as_str()) {
            continue;
        }
        recent.push(RecentVisitor {
            visitor_id: visitor_id_preview(&record.visitor_id),
            location: format!("{}, {}", record.city, record.country),
            last_visit: record.timestamp.clone(),
            page_count: page_counts
                .get(record.visitor_id.as_str())
                .copied()
                .unwrap_or_default(),
            status: record.status.clone(),
        });
    }
    recent
}

/// `total / unique` with one decimal, `"0"` when there are no visitors.
///
/// Rounds to the nearest tenth of the exact `f64` quotient; an exact half
/// rounds up (`1.25` is `"1.3"`), unlike `{:.1}`, which rounds it to even.
pub fn average_one_decimal(total: u64, unique: u64) -> String {
    if unique == 0 {
        return "0".to_string();
    }
    // Only quotients of the form k/4 sit exactly on a half-tenth in binary:
    // 20 * total / unique is then an odd multiple of 5.
    let twentieths = total.saturating_mul(20);
    if twentieths % unique == 0 {
        let q = twentieths / unique;
        if q % 2 == 1 && q % 5 == 0 {
            let tenths = (q + 1) / 2;
            return format!("{}.{}", tenths / 10, tenths % 10);
        }
    }
    format!("{:.1}", total as f64 / unique as f64)
}

fn visitor_id_preview(visitor_id: &str) -> String {
    let prefix: String = visitor_id.chars().take(VISITOR_ID_PREVIEW_CHARS).collect();
    format!("{prefix}...")
}
