use chrono::DateTime;
use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;

/// Layout used for timestamps in JSON responses and CSV exports
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single recorded visit.
///
/// `timestamp` is stored as Unix seconds (UTC) and rendered as
/// `YYYY-MM-DD HH:MM:SS` when serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Visit {
    pub id: i64,
    pub ip_address: String,
    pub location: Option<String>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: i64,
}

impl Visit {
    pub fn formatted_timestamp(&self) -> String {
        format_timestamp(self.timestamp)
    }
}

/// Render Unix seconds as `YYYY-MM-DD HH:MM:SS` in UTC
pub fn format_timestamp(secs: i64) -> String {
    match DateTime::from_timestamp(secs, 0) {
        Some(dt) => dt.format(TIMESTAMP_FORMAT).to_string(),
        None => secs.to_string(),
    }
}

fn serialize_timestamp<S>(secs: &i64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_timestamp(*secs))
}

#[derive(Debug, Deserialize)]
pub struct VisitQuery {
    pub include_location: Option<String>,
}

impl VisitQuery {
    /// Build from raw query pairs; the first `include_location` wins
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let include_location = pairs
            .into_iter()
            .find(|(name, _)| name == "include_location")
            .map(|(_, value)| value);

        Self { include_location }
    }

    /// Location lookup is on unless the flag is present and not `true`
    pub fn include_location(&self) -> bool {
        self.include_location
            .as_deref()
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(true)
    }
}

/// Response of `GET /api/{lang}/visit`
#[derive(Debug, Serialize)]
pub struct VisitResponse {
    pub message: String,
    pub ip: String,
    pub location: Option<String>,
}
