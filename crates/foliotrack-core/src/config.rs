use crate::error::CoreError;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: String,
    pub geoip_path: String,
    /// MaxMind ASN database used for the `isp` column.
    pub asn_path: String,
    /// Bearer token guarding `/api/admin/*`. When unset every admin request is
    /// rejected.
    pub admin_token: Option<String>,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
    pub duckdb_memory_limit: String,
}

impl Config {
    pub fn from_env() -> Result<Self, CoreError> {
        Ok(Self {
            port: std::env::var("FOLIOTRACK_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| CoreError::InvalidConfig(format!("invalid port: {e}")))?,
            data_dir: std::env::var("FOLIOTRACK_DATA_DIR")
                .unwrap_or_else(|_| "./data".to_string()),
            geoip_path: std::env::var("FOLIOTRACK_GEOIP_PATH")
                .unwrap_or_else(|_| "./GeoLite2-City.mmdb".to_string()),
            asn_path: std::env::var("FOLIOTRACK_ASN_PATH")
                .unwrap_or_else(|_| "./GeoLite2-ASN.mmdb".to_string()),
            admin_token: std::env::var("FOLIOTRACK_ADMIN_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            cors_origins: std::env::var("FOLIOTRACK_CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            duckdb_memory_limit: std::env::var("FOLIOTRACK_DUCKDB_MEMORY")
                .unwrap_or_else(|_| "1GB".to_string()),
        })
    }

    pub fn db_path(&self) -> String {
        format!("{}/foliotrack.db", self.data_dir)
    }
}
