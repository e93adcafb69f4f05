use std::net::IpAddr;
use std::str::FromStr;

use foliotrack_core::visit::UNKNOWN;

/// Value of the `source` column when a MaxMind lookup filled the geo fields.
pub const SOURCE_MAXMIND: &str = "maxmind";

/// Value of the `source` column when no lookup was possible.
pub const SOURCE_NONE: &str = "none";

/// Geo columns of a visit row. Unresolved fields are `"Unknown"`; coordinates
/// are empty strings when unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoInfo {
    pub country: String,
    pub region: String,
    pub city: String,
    pub timezone: String,
    pub latitude: String,
    pub longitude: String,
    pub source: String,
}

impl GeoInfo {
    pub fn unknown() -> Self {
        Self {
            country: UNKNOWN.to_string(),
            region: UNKNOWN.to_string(),
            city: UNKNOWN.to_string(),
            timezone: UNKNOWN.to_string(),
            latitude: String::new(),
            longitude: String::new(),
            source: SOURCE_NONE.to_string(),
        }
    }
}

/// Offline IP geolocation backed by a MaxMind City database.
pub struct GeoLookup {
    reader: maxminddb::Reader<Vec<u8>>,
}

impl GeoLookup {
    /// Load the database at `path`.
    ///
    /// Returns `None` if the file is missing or unreadable; visits are then
    /// logged with `"Unknown"` geo fields.
    pub fn open(path: &str) -> Option<Self> {
        open_reader(path, "FOLIOTRACK_GEOIP_PATH", "City").map(|reader| Self { reader })
    }

    /// Resolve `ip`. `None` for unparseable, non-public or unlisted addresses.
    pub fn lookup(&self, ip: &str) -> Option<GeoInfo> {
        let ip_addr = IpAddr::from_str(ip.trim()).ok()?;
        if !is_public_ip(ip_addr) {
            return None;
        }

        let record: maxminddb::geoip2::City = self.reader.lookup(ip_addr).ok()?;

        let country = record
            .country
            .as_ref()
            .and_then(|c| c.iso_code)
            .map(str::to_string);

        let region = record
            .subdivisions
            .as_ref()
            .and_then(|subs| subs.first())
            .and_then(|sub| sub.names.as_ref())
            .and_then(|names| names.get("en"))
            .map(|s| s.to_string());

        let city = record
            .city
            .as_ref()
            .and_then(|c| c.names.as_ref())
            .and_then(|names| names.get("en"))
            .map(|s| s.to_string());

        let location = record.location.as_ref();
        let timezone = location.and_then(|l| l.time_zone).map(str::to_string);
        let latitude = location.and_then(|l| l.latitude);
        let longitude = location.and_then(|l| l.longitude);

        let unknown = || UNKNOWN.to_string();
        Some(GeoInfo {
            country: country.unwrap_or_else(unknown),
            region: region.unwrap_or_else(unknown),
            city: city.unwrap_or_else(unknown),
            timezone: timezone.unwrap_or_else(unknown),
            latitude: latitude.map(|v| v.to_string()).unwrap_or_default(),
            longitude: longitude.map(|v| v.to_string()).unwrap_or_default(),
            source: SOURCE_MAXMIND.to_string(),
        })
    }
}

/// Offline ISP lookup backed by a MaxMind ASN database.
pub struct IspLookup {
    reader: maxminddb::Reader<Vec<u8>>,
}

impl IspLookup {
    /// Load the database at `path`. `None` leaves the `isp` column `"Unknown"`.
    pub fn open(path: &str) -> Option<Self> {
        open_reader(path, "FOLIOTRACK_ASN_PATH", "ASN").map(|reader| Self { reader })
    }

    /// Organisation operating the autonomous system `ip` belongs to.
    pub fn lookup(&self, ip: &str) -> Option<String> {
        let ip_addr = IpAddr::from_str(ip.trim()).ok()?;
        if !is_public_ip(ip_addr) {
            return None;
        }
        let record: maxminddb::geoip2::Asn = self.reader.lookup(ip_addr).ok()?;
        record
            .autonomous_system_organization
            .filter(|org| !org.is_empty())
            .map(str::to_string)
    }
}

fn open_reader(path: &str, env_var: &str, kind: &str) -> Option<maxminddb::Reader<Vec<u8>>> {
    if !std::path::Path::new(path).exists() {
        tracing::warn!(
            db_path = %path,
            "MaxMind {kind} database not found. The columns it fills are logged as Unknown. \
             Set {env_var} to a GeoLite2/DB-IP {kind} .mmdb file."
        );
        return None;
    }
    match maxminddb::Reader::open_readfile(path) {
        Ok(reader) => {
            tracing::info!(db_path = %path, "MaxMind {kind} database loaded");
            Some(reader)
        }
        Err(e) => {
            tracing::warn!(db_path = %path, error = %e, "MaxMind {kind} database unreadable");
            None
        }
    }
}

/// `false` for loopback, unspecified, private and link-local addresses, which
/// no geolocation database can place.
pub fn is_public_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_loopback() || v4.is_unspecified() || v4.is_private() || v4.is_link_local())
        }
        IpAddr::V6(v6) => !(v6.is_loopback() || v6.is_unspecified()),
    }
}
