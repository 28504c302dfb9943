//! Build metadata

use serde::Serialize;

/// Version information for the binary
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub name: &'static str,
    pub version: &'static str,
}

pub fn version_info() -> VersionInfo {
    VersionInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    }
}

/// `User-Agent` sent to Marathon
pub fn user_agent() -> String {
    let info = version_info();
    format!("{}/{}", info.name, info.version)
}
