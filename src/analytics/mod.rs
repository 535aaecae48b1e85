//! Visitor analytics
//!
//! Resolves client addresses to coarse locations and aggregates stored
//! visits into statistics. Location lookup is best-effort: every backend
//! reports failures as [`UNKNOWN_LOCATION`] rather than an error.

pub mod geoip;
pub mod ip_extractor;
pub mod ipinfo;
pub mod reports;

pub use geoip::GeoIpService;
pub use ip_extractor::extract_client_ip;
pub use ipinfo::IpInfoLookup;
pub use reports::{ReportEngine, Stats};

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{GeoBackend, GeoConfig};

/// Location recorded when a lookup cannot produce one
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// Resolves an address to a `"City, Region"` string
#[async_trait]
pub trait GeoLookup: Send + Sync {
    /// Never fails; returns [`UNKNOWN_LOCATION`] when nothing is known
    async fn resolve(&self, ip: &str) -> String;
}

/// Backend that performs no lookup at all
pub struct DisabledLookup;

#[async_trait]
impl GeoLookup for DisabledLookup {
    async fn resolve(&self, _ip: &str) -> String {
        UNKNOWN_LOCATION.to_string()
    }
}

/// Join optional city and region, substituting [`UNKNOWN_LOCATION`] per slot
pub fn format_location(city: Option<&str>, region: Option<&str>) -> String {
    format!(
        "{}, {}",
        city.unwrap_or(UNKNOWN_LOCATION),
        region.unwrap_or(UNKNOWN_LOCATION)
    )
}

/// Build the lookup backend selected by configuration
pub fn build_geo_lookup(config: &GeoConfig) -> Result<Arc<dyn GeoLookup>> {
    let lookup: Arc<dyn GeoLookup> = match config.backend {
        GeoBackend::Ipinfo => {
            tracing::info!("🌍 Geolocation via {}", config.ipinfo_url);
            Arc::new(IpInfoLookup::new(config)?)
        }
        GeoBackend::Mmdb => {
            let path = config.mmdb_path.as_deref();
            tracing::info!("🌍 Geolocation via MaxMind database {:?}", path);
            Arc::new(GeoIpService::new(path)?)
        }
        GeoBackend::Disabled => {
            tracing::info!("🌍 Geolocation disabled, locations will be recorded as Unknown");
            Arc::new(DisabledLookup)
        }
    };

    Ok(lookup)
}
