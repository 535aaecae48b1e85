//! Location lookup against an ipinfo.io-compatible HTTP service

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{format_location, GeoLookup, UNKNOWN_LOCATION};
use crate::config::GeoConfig;

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    city: Option<String>,
    region: Option<String>,
}

pub struct IpInfoLookup {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl IpInfoLookup {
    pub fn new(config: &GeoConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build geolocation HTTP client")?;

        let base_url = Url::parse(&config.ipinfo_url)
            .with_context(|| format!("Invalid GEO_IPINFO_URL '{}'", config.ipinfo_url))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("GEO_IPINFO_URL '{}' cannot be a base URL", base_url));
        }

        Ok(Self {
            client,
            base_url,
            token: config.ipinfo_token.clone(),
        })
    }

    /// `{base}/{ip}/json[?token=...]`, with `ip` escaped as a single segment
    fn lookup_url(&self, ip: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("base URL cannot carry path segments"))?
            .pop_if_empty()
            .push(ip)
            .push("json");

        if let Some(token) = &self.token {
            url.query_pairs_mut().append_pair("token", token);
        }

        Ok(url)
    }

    async fn fetch(&self, ip: &str) -> Result<IpInfoResponse> {
        let url = self.lookup_url(ip)?;

        let response = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<IpInfoResponse>().await?)
    }
}

#[async_trait]
impl GeoLookup for IpInfoLookup {
    async fn resolve(&self, ip: &str) -> String {
        match self.fetch(ip).await {
            Ok(IpInfoResponse {
                city: None,
                region: None,
            }) => {
                debug!(ip = %ip, "geolocation response had no city or region");
                UNKNOWN_LOCATION.to_string()
            }
            Ok(info) => format_location(info.city.as_deref(), info.region.as_deref()),
            Err(e) => {
                warn!(ip = %ip, error = %e, "geolocation lookup failed");
                UNKNOWN_LOCATION.to_string()
            }
        }
    }
}
