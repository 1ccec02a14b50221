//! Application metadata shared by binaries

use serde::{Deserialize, Serialize};

/// Name and environment of the running application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppInfo {
    /// Application name
    pub app_name: String,
    /// Application version
    pub version: String,
    /// Environment (dev, prod, etc.)
    pub environment: String,
}

impl AppInfo {
    /// Build from the calling crate's name and version
    pub fn new(app_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            version: version.into(),
            environment: std::env::var("RESEARCH_ENV").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// User agent string for outbound HTTP requests
    pub fn user_agent(&self) -> String {
        format!("{}/{}", self.app_name, self.version)
    }
}

impl Default for AppInfo {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }
}
