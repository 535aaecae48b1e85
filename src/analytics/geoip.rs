//! GeoIP lookup using a local MaxMind GeoLite2/GeoIP2 City database
//!
//! The database is memory-mapped once at startup and shared between
//! requests; lookups never touch the network.

use anyhow::{Context, Result};
use async_trait::async_trait;
use maxminddb::{geoip2, Mmap, Reader};
use std::net::IpAddr;
use std::sync::Arc;

use super::{format_location, GeoLookup, UNKNOWN_LOCATION};

#[derive(Clone)]
pub struct GeoIpService {
    city_reader: Option<Arc<Reader<Mmap>>>,
}

impl GeoIpService {
    /// Create a new GeoIP service from an MMDB file path
    ///
    /// With no path every lookup resolves to [`UNKNOWN_LOCATION`].
    pub fn new(city_path: Option<&str>) -> Result<Self> {
        let city_reader = if let Some(path) = city_path {
            let reader = unsafe { Reader::open_mmap(path) }
                .with_context(|| format!("Failed to open GeoIP City database at {}", path))?;
            Some(Arc::new(reader))
        } else {
            None
        };

        Ok(Self { city_reader })
    }

    /// City and first subdivision for `ip`, if the database knows either
    pub fn lookup(&self, ip: IpAddr) -> Option<(Option<String>, Option<String>)> {
        let reader = self.city_reader.as_ref()?;
        let result = reader.lookup(ip).ok()?;
        let city = result.decode::<geoip2::City>().ok()??;

        let name = city.city.names.english.map(|s| s.to_string());
        let region = city
            .subdivisions
            .first()
            .and_then(|s| s.names.english)
            .map(|s| s.to_string());

        if name.is_none() && region.is_none() {
            return None;
        }

        Some((name, region))
    }
}

#[async_trait]
impl GeoLookup for GeoIpService {
    async fn resolve(&self, ip: &str) -> String {
        let Ok(addr) = ip.parse::<IpAddr>() else {
            tracing::debug!(ip = %ip, "not an IP address, skipping GeoIP lookup");
            return UNKNOWN_LOCATION.to_string();
        };

        match self.lookup(addr) {
            Some((city, region)) => format_location(city.as_deref(), region.as_deref()),
            None => UNKNOWN_LOCATION.to_string(),
        }
    }
}
