use anyhow::Result;

use foliotrack_core::visit::VisitRecord;

use crate::DuckDbBackend;

const SELECT_COLUMNS: &str = "visited_at, visitor_id, ip, country, region, city, timezone, \
     isp, user_agent, referrer, latitude, longitude, source, status, path";

impl DuckDbBackend {
    /// Append one row to `visitor_logs`.
    pub async fn append_visit(&self, record: &VisitRecord) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            r#"INSERT INTO visitor_logs (
                visited_at, visitor_id, ip,
                country, region, city, timezone, isp,
                user_agent, referrer, latitude, longitude,
                source, status, path
            ) VALUES (
                ?1,  ?2,  ?3,
                ?4,  ?5,  ?6,  ?7,  ?8,
                ?9,  ?10, ?11, ?12,
                ?13, ?14, ?15
            )"#,
            duckdb::params![
                record.timestamp,
                record.visitor_id,
                record.ip,
                record.country,
                record.region,
                record.city,
                record.timezone,
                record.isp,
                record.user_agent,
                record.referrer,
                record.latitude,
                record.longitude,
                record.source,
                record.status,
                record.path,
            ],
        )?;
        tracing::debug!(visitor_id = %record.visitor_id, path = %record.path, "Visit appended");
        Ok(())
    }

    /// Return `true` if any logged row carries `visitor_id`.
    pub async fn visitor_exists(&self, visitor_id: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT COUNT(*) FROM visitor_logs WHERE visitor_id = ?1")?;
        let count: i64 = stmt.query_row(duckdb::params![visitor_id], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Every row of the log in append order.
    pub async fn read_all_visits(&self) -> Result<Vec<VisitRecord>> {
        let conn = self.conn.lock().await;
        let sql = format!("SELECT {SELECT_COLUMNS} FROM visitor_logs ORDER BY seq ASC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(VisitRecord {
                timestamp: row.get(0)?,
                visitor_id: row.get(1)?,
                ip: row.get(2)?,
                country: row.get(3)?,
                region: row.get(4)?,
                city: row.get(5)?,
                timezone: row.get(6)?,
                isp: row.get(7)?,
                user_agent: row.get(8)?,
                referrer: row.get(9)?,
                latitude: row.get(10)?,
                longitude: row.get(11)?,
                source: row.get(12)?,
                status: row.get(13)?,
                path: row.get(14)?,
            })
        })?;

        let mut visits = Vec::new();
        for row in rows {
            visits.push(row?);
        }
        Ok(visits)
    }

    /// Number of rows in the log.
    pub async fn count_visits(&self) -> Result<u64> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT COUNT(*) FROM visitor_logs")?;
        let count: i64 = stmt.query_row([], |row| row.get(0))?;
        Ok(u64::try_from(count)?)
    }
}
