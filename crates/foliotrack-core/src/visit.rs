use serde::{Deserialize, Serialize};

/// Prefix of a `path` value that records a tracked interaction instead of a
/// page view.
pub const EVENT_MARKER: &str = "EVENT:";

/// What the ingest endpoint writes in front of an event name, and the only
/// text stripped when reading the name back.
pub const EVENT_PREFIX: &str = "EVENT: ";

/// Placeholder for geo/network fields that could not be resolved.
pub const UNKNOWN: &str = "Unknown";

/// Referrer value for visits without an external origin.
pub const DIRECT: &str = "Direct";

/// The payload the tracker script sends to POST /api/analytics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TrackPayload {
    pub path: Option<String>,
    /// Id persisted in the browser. Absent on a first visit.
    pub visitor_id: Option<String>,
    /// Full referrer URL, or `"Direct"`.
    pub referrer: Option<String>,
    /// Interaction name; when set the row is logged as `EVENT: <event>`.
    pub event: Option<String>,
}

impl TrackPayload {
    /// The `path` column value for this payload.
    pub fn logged_path(&self) -> String {
        match self.event.as_deref() {
            Some(event) => format!("{EVENT_PREFIX}{event}"),
            None => match self.path.as_deref() {
                Some(path) if !path.is_empty() => path.to_string(),
                _ => "/".to_string(),
            },
        }
    }
}

/// Whether a visitor id had been seen before the row was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisitStatus {
    New,
    Existing,
}

impl VisitStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VisitStatus::New => "New",
            VisitStatus::Existing => "Existing",
        }
    }
}

/// One row of the visit log. Mirrors the `visitor_logs` table columns.
///
/// Every field is kept as the string that was written so a malformed row read
/// back from the store never fails to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitRecord {
    /// `YYYY-MM-DD HH:MM:SS`, UTC.
    pub timestamp: String,
    pub visitor_id: String,
    pub ip: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub timezone: String,
    pub isp: String,
    pub user_agent: String,
    /// Referrer hostname or `"Direct"`.
    pub referrer: String,
    pub latitude: String,
    pub longitude: String,
    /// Which geolocation source filled the geo columns.
    pub source: String,
    /// `"New"` or `"Existing"`, fixed at write time.
    pub status: String,
    pub path: String,
}

impl VisitRecord {
    pub fn is_event(&self) -> bool {
        self.path.starts_with(EVENT_MARKER)
    }

    /// Event name with `EVENT: ` stripped, or `None` for page views.
    pub fn event_name(&self) -> Option<&str> {
        event_name(&self.path)
    }
}

/// Name of the event a marked path records.
///
/// Only the exact `EVENT: ` prefix is removed; a marked path written without
/// the space (`EVENT:resume`) is its own name.
pub fn event_name(path: &str) -> Option<&str> {
    if !path.starts_with(EVENT_MARKER) {
        return None;
    }
    Some(path.strip_prefix(EVENT_PREFIX).unwrap_or(path))
}
