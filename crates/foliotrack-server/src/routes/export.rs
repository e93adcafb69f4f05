use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::Response,
};

use foliotrack_core::visit::VisitRecord;

use crate::{error::AppError, state::AppState};

/// Download name of the exported log.
const EXPORT_FILENAME: &str = "visitor-logs.csv";

/// Header row, in column order of the visit log.
const EXPORT_COLUMNS: [&str; 15] = [
    "timestamp",
    "visitorId",
    "ip",
    "country",
    "region",
    "city",
    "timezone",
    "isp",
    "userAgent",
    "referrer",
    "latitude",
    "longitude",
    "source",
    "status",
    "path",
];

/// `GET /api/admin/analytics/export`: the raw visit log as CSV.
///
/// Rows come back in append order. Response: `Content-Type: text/csv` with
/// `Content-Disposition: attachment`.
#[tracing::instrument(skip(state))]
pub async fn export_visits(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let visits = state
        .store
        .read_all_visits()
        .await
        .map_err(AppError::Internal)?;

    let csv_bytes = build_csv(&visits).map_err(AppError::Internal)?;
    tracing::info!(rows = visits.len(), "Visit log exported");

    build_csv_response(EXPORT_FILENAME, Bytes::from(csv_bytes))
}

/// Sanitize a CSV field value against formula injection.
///
/// Spreadsheet apps interpret values that begin with `=`, `+`, `-`, `@`, TAB,
/// or CR as formula expressions. A leading single quote (`'`) makes them treat
/// the value as a literal string.
fn sanitize_csv_field(val: &str) -> Cow<'_, str> {
    if val.starts_with(['=', '+', '-', '@', '\t', '\r']) {
        Cow::Owned(format!("'{val}"))
    } else {
        Cow::Borrowed(val)
    }
}

fn record_fields(v: &VisitRecord) -> [&str; 15] {
    [
        v.timestamp.as_str(),
        v.visitor_id.as_str(),
        v.ip.as_str(),
        v.country.as_str(),
        v.region.as_str(),
        v.city.as_str(),
        v.timezone.as_str(),
        v.isp.as_str(),
        v.user_agent.as_str(),
        v.referrer.as_str(),
        v.latitude.as_str(),
        v.longitude.as_str(),
        v.source.as_str(),
        v.status.as_str(),
        v.path.as_str(),
    ]
}

fn build_csv(visits: &[VisitRecord]) -> anyhow::Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::with_capacity(visits.len().saturating_mul(256)));

    wtr.write_record(EXPORT_COLUMNS)
        .map_err(|e| anyhow::anyhow!("csv write_record failed: {e}"))?;

    for visit in visits {
        let fields = record_fields(visit).map(sanitize_csv_field);
        wtr.write_record(fields.iter().map(|f| f.as_bytes()))
            .map_err(|e| anyhow::anyhow!("csv write_record failed: {e}"))?;
    }

    wtr.into_inner()
        .map_err(|e| anyhow::anyhow!("csv flush failed: {e}"))
}

fn build_csv_response(filename: &str, csv_bytes: Bytes) -> Result<Response, AppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(csv_bytes))
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formula_prefixes_are_quoted() {
        assert_eq!(sanitize_csv_field("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(sanitize_csv_field("+31 20"), "'+31 20");
        assert_eq!(sanitize_csv_field("-4.90"), "'-4.90");
        assert_eq!(sanitize_csv_field("@cmd"), "'@cmd");
        assert_eq!(sanitize_csv_field("\tx"), "'\tx");
    }

    #[test]
    fn plain_values_pass_through() {
        assert!(matches!(sanitize_csv_field("/projects/x"), Cow::Borrowed(_)));
        assert_eq!(sanitize_csv_field(""), "");
    }

    #[test]
    fn empty_log_exports_header_only() {
        let bytes = build_csv(&[]).expect("csv");
        let text = String::from_utf8(bytes).expect("utf-8");
        assert_eq!(
            text,
            "timestamp,visitorId,ip,country,region,city,timezone,isp,userAgent,referrer,\
             latitude,longitude,source,status,path\n"
        );
    }
}
