use std::sync::Arc;

use chrono::NaiveDateTime;

use foliotrack_core::{
    clock::{Clock, SystemClock},
    config::Config,
    store::VisitLogStore,
};
use foliotrack_duckdb::DuckDbBackend;

use crate::geo::{GeoLookup, IspLookup};

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
pub struct AppState {
    /// The DuckDB backend, used directly for liveness checks.
    pub db: Arc<DuckDbBackend>,

    /// The same backend seen through the store trait the handlers depend on.
    pub store: Arc<dyn VisitLogStore>,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,

    /// Source of "now" for row timestamps and dashboard windows.
    pub clock: Arc<dyn Clock>,

    /// `None` when no GeoIP database is available.
    pub geo: Option<GeoLookup>,

    /// `None` when no ASN database is available.
    pub isp: Option<IspLookup>,
}

impl AppState {
    /// Construct a new `AppState` wrapping the given backend and config, using
    /// the UTC wall clock.
    pub fn new(db: DuckDbBackend, config: Config) -> Self {
        Self::with_clock(db, config, Arc::new(SystemClock))
    }

    pub fn with_clock(db: DuckDbBackend, config: Config, clock: Arc<dyn Clock>) -> Self {
        let db = Arc::new(db);
        let store: Arc<dyn VisitLogStore> = db.clone();
        let geo = GeoLookup::open(&config.geoip_path);
        let isp = IspLookup::open(&config.asn_path);
        Self {
            db,
            store,
            config: Arc::new(config),
            clock,
            geo,
            isp,
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }
}
