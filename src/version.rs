//! Version information.

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// `User-Agent` sent by the reqwest transport: `godpanel/{version}`.
pub fn user_agent() -> String {
    format!("godpanel/{PKG_VERSION}")
}
