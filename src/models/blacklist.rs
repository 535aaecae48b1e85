use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BlacklistEntry {
    pub id: i64,
    pub ip_address: String,
}

/// Body of `POST /api/{lang}/blacklist`
#[derive(Debug, Default, Deserialize)]
pub struct BlacklistRequest {
    #[serde(default)]
    pub ip_address: Option<String>,
}

impl BlacklistRequest {
    /// The requested address, if present and not blank
    pub fn ip(&self) -> Option<&str> {
        self.ip_address
            .as_deref()
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    }
}
