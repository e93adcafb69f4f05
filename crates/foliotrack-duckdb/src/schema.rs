/// DuckDB initialization SQL.
///
/// Executed once at database open time via `Connection::execute_batch`.
/// Every statement uses `IF NOT EXISTS` so it is safe to re-run on each
/// startup.
///
/// `memory_limit` comes from `Config.duckdb_memory_limit`
/// (env `FOLIOTRACK_DUCKDB_MEMORY`, default `"1GB"`).
///
/// The visit log is append-only: no code path issues UPDATE or DELETE against
/// `visitor_logs`. `seq` records append order, which readers rely on for
/// first-occurrence tie-breaking in rankings.
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;

CREATE SEQUENCE IF NOT EXISTS visitor_logs_seq START 1;

-- ===========================================
-- VISITOR LOGS (one row per page view or tracked event)
-- ===========================================
CREATE TABLE IF NOT EXISTS visitor_logs (
    seq             BIGINT PRIMARY KEY DEFAULT nextval('visitor_logs_seq'),
    visited_at      VARCHAR NOT NULL,              -- 'YYYY-MM-DD HH:MM:SS', UTC
    visitor_id      VARCHAR NOT NULL,
    ip              VARCHAR NOT NULL,
    country         VARCHAR NOT NULL,              -- 'Unknown' when unresolved
    region          VARCHAR NOT NULL,
    city            VARCHAR NOT NULL,
    timezone        VARCHAR NOT NULL,
    isp             VARCHAR NOT NULL,
    user_agent      VARCHAR NOT NULL,
    referrer        VARCHAR NOT NULL,              -- hostname or 'Direct'
    latitude        VARCHAR NOT NULL,
    longitude       VARCHAR NOT NULL,
    source          VARCHAR NOT NULL,              -- geolocation source
    status          VARCHAR NOT NULL,              -- 'New' | 'Existing'
    path            VARCHAR NOT NULL               -- page path or 'EVENT: <name>'
);
CREATE INDEX IF NOT EXISTS idx_visitor_logs_visitor ON visitor_logs(visitor_id);
"#
    )
}
