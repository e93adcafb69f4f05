/// Re-export `Config` from `foliotrack-core` for use within this crate.
///
/// All environment-variable parsing lives in `foliotrack-core` so it can be
/// shared with integration tests without depending on the full server.
pub use foliotrack_core::config::Config;
