use std::collections::HashMap;

use crate::clock::parse_timestamp;
use crate::visit::{VisitRecord, EVENT_PREFIX};

use super::session::{session_timeout, split_on_gap};

/// Joins the steps of one journey.
pub const JOURNEY_SEPARATOR: &str = " → ";

/// Display prefix of an interaction step.
pub const EVENT_STEP_PREFIX: &str = "🔗 ";

const PROJECT_PATH_PREFIX: &str = "/projects/";

/// Display label of one logged path.
pub fn step_label(path: &str) -> String {
    if let Some(name) = path.strip_prefix(EVENT_PREFIX) {
        return format!("{EVENT_STEP_PREFIX}{name}");
    }
    if path == "/" {
        return "Home".to_string();
    }
    if let Some(project) = path.strip_prefix(PROJECT_PATH_PREFIX) {
        return format!("Project: {project}");
    }
    path.to_string()
}

pub fn journey_key<'a, I>(paths: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    paths
        .into_iter()
        .map(step_label)
        .collect::<Vec<_>>()
        .join(JOURNEY_SEPARATOR)
}

/// Every session of every visitor, rendered as a journey string.
///
/// Visitors are walked in the order they first appear in `records`; each
/// visitor's rows are ordered by timestamp before being split into sessions.
pub fn visitor_journeys(records: &[VisitRecord]) -> Vec<String> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut per_visitor: Vec<Vec<&VisitRecord>> = Vec::new();
    for record in records {
        match index.get(record.visitor_id.as_str()) {
            Some(&i) => per_visitor[i].push(record),
            None => {
                index.insert(record.visitor_id.as_str(), per_visitor.len());
                per_visitor.push(vec![record]);
            }
        }
    }

    let mut journeys = Vec::new();
    for mut visits in per_visitor {
        visits.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        let sessions = split_on_gap(
            visits
                .into_iter()
                .map(|v| (parse_timestamp(&v.timestamp), v.path.as_str())),
            session_timeout(),
        );
        journeys.extend(sessions.into_iter().map(journey_key));
    }
    journeys
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visit(ts: &str, visitor: &str, path: &str) -> VisitRecord {
        VisitRecord {
            timestamp: ts.to_string(),
            visitor_id: visitor.to_string(),
            ip: "203.0.113.7".to_string(),
            country: "US".to_string(),
            region: "Texas".to_string(),
            city: "Austin".to_string(),
            timezone: "America/Chicago".to_string(),
            isp: "Unknown".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            referrer: "Direct".to_string(),
            latitude: String::new(),
            longitude: String::new(),
            source: "none".to_string(),
            status: "New".to_string(),
            path: path.to_string(),
        }
    }

    #[test]
    fn labels_steps() {
        assert_eq!(step_label("/"), "Home");
        assert_eq!(step_label("/projects/rustdb"), "Project: rustdb");
        assert_eq!(step_label("EVENT: contact_click"), "🔗 contact_click");
        assert_eq!(step_label("EVENT:resume"), "EVENT:resume");
        assert_eq!(step_label("/about"), "/about");
    }

    #[test]
    fn journey_key_joins_with_arrow() {
        assert_eq!(
            journey_key(["/", "/projects/x", "EVENT: resume_download"]),
            "Home → Project: x → 🔗 resume_download"
        );
    }

    #[test]
    fn out_of_order_rows_are_sorted_per_visitor() {
        let records = vec![
            visit("2024-01-01 10:05:00", "a", "/projects/x"),
            visit("2024-01-01 10:00:00", "a", "/"),
        ];
        assert_eq!(visitor_journeys(&records), vec!["Home → Project: x"]);
    }

    #[test]
    fn long_gap_yields_two_journeys() {
        let records = vec![
            visit("2024-01-01 10:00:00", "a", "/"),
            visit("2024-01-01 10:10:00", "a", "/projects/x"),
            visit("2024-01-01 10:45:00", "a", "/"),
        ];
        assert_eq!(
            visitor_journeys(&records),
            vec!["Home → Project: x".to_string(), "Home".to_string()]
        );
    }

    #[test]
    fn visitors_are_kept_apart() {
        let records = vec![
            visit("2024-01-01 10:00:00", "a", "/"),
            visit("2024-01-01 10:01:00", "b", "EVENT: contact_click"),
            visit("2024-01-01 10:02:00", "a", "/projects/x"),
        ];
        assert_eq!(
            visitor_journeys(&records),
            vec!["Home → Project: x".to_string(), "🔗 contact_click".to_string()]
        );
    }
}
