use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use foliotrack_core::clock::FixedClock;
use foliotrack_core::visit::VisitRecord;
use foliotrack_duckdb::DuckDbBackend;
use foliotrack_server::app::build_app;
use foliotrack_server::config::Config;
use foliotrack_server::state::AppState;

const TOKEN: &str = "test-admin-token";

fn test_config(admin_token: Option<&str>) -> Config {
    Config {
        port: 0,
        data_dir: "/tmp/foliotrack-test".to_string(),
        geoip_path: "/nonexistent/GeoLite2-City.mmdb".to_string(),
        asn_path: "/nonexistent/GeoLite2-ASN.mmdb".to_string(),
        admin_token: admin_token.map(str::to_string),
        cors_origins: vec![],
        duckdb_memory_limit: "256MB".to_string(),
    }
}

fn visit(ts: &str, visitor_id: &str, path: &str, status: &str) -> VisitRecord {
    VisitRecord {
        timestamp: ts.to_string(),
        visitor_id: visitor_id.to_string(),
        ip: "198.51.100.4".to_string(),
        country: "NL".to_string(),
        region: "North Holland".to_string(),
        city: "Amsterdam".to_string(),
        timezone: "Europe/Amsterdam".to_string(),
        isp: "Unknown".to_string(),
        user_agent: "Mozilla/5.0".to_string(),
        referrer: "Direct".to_string(),
        latitude: "52.3676".to_string(),
        longitude: "4.9041".to_string(),
        source: "maxmind".to_string(),
        status: status.to_string(),
        path: path.to_string(),
    }
}

async fn setup(admin_token: Option<&str>) -> (Arc<AppState>, axum::Router) {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let now = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid datetime");
    let state = Arc::new(AppState::with_clock(
        db,
        test_config(admin_token),
        Arc::new(FixedClock(now)),
    ));
    for row in [
        visit("2024-01-01 10:00:00", "visitor-a", "/", "New"),
        visit("2024-01-01 10:05:00", "visitor-a", "/projects/x", "Existing"),
        visit("2024-01-01 11:00:00", "visitor-b", "EVENT: contact_click", "New"),
    ] {
        state.db.append_visit(&row).await.expect("append");
    }
    let app = build_app(Arc::clone(&state));
    (state, app)
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse JSON")
}

fn dashboard_request(auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri("/api/admin/analytics");
    if let Some(value) = auth {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::empty()).expect("build request")
}

#[tokio::test]
async fn test_dashboard_requires_bearer_token() {
    let (_state, app) = setup(Some(TOKEN)).await;

    let response = app
        .clone()
        .oneshot(dashboard_request(None))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "unauthorized");

    let response = app
        .clone()
        .oneshot(dashboard_request(Some("Bearer wrong-token")))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Token without the Bearer scheme.
    let response = app
        .oneshot(dashboard_request(Some(TOKEN)))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_dashboard_rejects_everything_without_configured_token() {
    let (_state, app) = setup(None).await;

    let response = app
        .oneshot(dashboard_request(Some("Bearer anything")))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_dashboard_summarizes_log() {
    let (_state, app) = setup(Some(TOKEN)).await;

    let response = app
        .oneshot(dashboard_request(Some(&format!("Bearer {TOKEN}"))))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    let summary = &json["summary"];
    assert_eq!(summary["totalPageViews"], 3);
    assert_eq!(summary["uniqueVisitors"], 2);
    assert_eq!(summary["todayViews"], 3);
    assert_eq!(summary["todayUnique"], 2);
    assert_eq!(summary["newVisitors"], 2);
    assert_eq!(summary["returningVisitors"], 1);
    assert_eq!(summary["avgPagesPerVisitor"], "1.5");
    assert_eq!(summary["peakHour"]["block"], "08-12");
    assert_eq!(summary["peakHour"]["count"], 3);

    let daily = json["dailyStats"].as_array().expect("dailyStats");
    assert_eq!(daily.len(), 7);
    assert_eq!(daily[6]["date"], "2024-01-01");
    assert_eq!(daily[6]["views"], 3);
    assert_eq!(daily[6]["uniqueVisitors"], 2);

    assert_eq!(json["hourBlocks"].as_array().expect("hourBlocks").len(), 6);
    assert_eq!(json["weekComparison"].as_array().expect("weekComparison").len(), 7);

    let pages = json["topPages"].as_array().expect("topPages");
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0]["page"], "/");
    assert_eq!(pages[1]["page"], "/projects/x");

    assert_eq!(json["eventBreakdown"][0]["event"], "contact_click");
    assert_eq!(json["eventBreakdown"][0]["count"], 1);

    assert_eq!(json["topJourneys"][0]["journey"], "Home → Project: x");
    assert_eq!(json["topJourneys"][0]["count"], 1);

    assert_eq!(json["topLocations"][0]["location"], "Amsterdam, NL");
    assert_eq!(json["topLocations"][0]["count"], 3);
    assert!(json["topReferrers"].as_array().expect("topReferrers").is_empty());

    let recent = json["recentVisitors"].as_array().expect("recentVisitors");
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0]["visitorId"], "visitor-...");
    assert_eq!(recent[0]["lastVisit"], "2024-01-01 11:00:00");
}

#[tokio::test]
async fn test_dashboard_is_deterministic_for_fixed_clock() {
    let (_state, app) = setup(Some(TOKEN)).await;
    let auth = format!("Bearer {TOKEN}");

    let first = app
        .clone()
        .oneshot(dashboard_request(Some(&auth)))
        .await
        .expect("request");
    let first = first.into_body().collect().await.expect("body").to_bytes();

    let second = app
        .oneshot(dashboard_request(Some(&auth)))
        .await
        .expect("request");
    let second = second.into_body().collect().await.expect("body").to_bytes();

    assert_eq!(first, second);
}
