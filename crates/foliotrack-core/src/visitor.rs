use crate::visit::DIRECT;

/// Mint an id for a browser that does not have one yet.
///
/// The client stores it and sends it back on every later request, so the id is
/// only ever generated once per browser.
pub fn new_visitor_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Hostname of a referrer URL, or `"Direct"` when the referrer is empty,
/// literally `"Direct"`, or cannot be parsed as an absolute URL with a host.
pub fn referrer_source(referrer: Option<&str>) -> String {
    let Some(raw) = referrer.map(str::trim).filter(|r| !r.is_empty()) else {
        return DIRECT.to_string();
    };
    match url::Url::parse(raw) {
        Ok(parsed) => parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| DIRECT.to_string()),
        Err(_) => DIRECT.to_string(),
    }
}
