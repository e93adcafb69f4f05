use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use foliotrack_core::visit::VisitRecord;
use foliotrack_duckdb::DuckDbBackend;
use foliotrack_server::app::build_app;
use foliotrack_server::config::Config;
use foliotrack_server::state::AppState;

const TOKEN: &str = "test-admin-token";

fn test_config() -> Config {
    Config {
        port: 0,
        data_dir: "/tmp/foliotrack-test".to_string(),
        geoip_path: "/nonexistent/GeoLite2-City.mmdb".to_string(),
        asn_path: "/nonexistent/GeoLite2-ASN.mmdb".to_string(),
        admin_token: Some(TOKEN.to_string()),
        cors_origins: vec![],
        duckdb_memory_limit: "256MB".to_string(),
    }
}

fn visit(ts: &str, visitor_id: &str, path: &str) -> VisitRecord {
    VisitRecord {
        timestamp: ts.to_string(),
        visitor_id: visitor_id.to_string(),
        ip: "unknown".to_string(),
        country: "Unknown".to_string(),
        region: "Unknown".to_string(),
        city: "Unknown".to_string(),
        timezone: "Unknown".to_string(),
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

async fn text_body(response: axum::http::Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

fn export_request(auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("GET")
        .uri("/api/admin/analytics/export");
    if let Some(value) = auth {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::empty()).expect("build request")
}

#[tokio::test]
async fn test_export_requires_bearer_token() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let app = build_app(Arc::new(AppState::new(db, test_config())));

    let response = app.oneshot(export_request(None)).await.expect("request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_export_returns_sanitized_csv_in_append_order() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    db.append_visit(&visit("2024-01-01 10:05:00", "v1", "/projects/x"))
        .await
        .expect("append");
    db.append_visit(&visit("2024-01-01 10:00:00", "=cmd|'/C calc'!A0", "/"))
        .await
        .expect("append");
    let app = build_app(Arc::new(AppState::new(db, test_config())));

    let response = app
        .oneshot(export_request(Some(&format!("Bearer {TOKEN}"))))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .expect("content-type");
    assert!(content_type.starts_with("text/csv"));
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .expect("content-disposition")
        .to_string();
    assert_eq!(disposition, "attachment; filename=\"visitor-logs.csv\"");

    let body = text_body(response).await;
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("timestamp,visitorId,ip,"));
    assert!(lines[0].ends_with(",source,status,path"));
    assert!(lines[1].starts_with("2024-01-01 10:05:00,v1,"));
    assert!(lines[1].ends_with(",/projects/x"));
    assert!(lines[2].starts_with("2024-01-01 10:00:00,'=cmd|"));
}
