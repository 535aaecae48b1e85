use anyhow::{bail, Context};
use ipnet::IpNet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub api_server: ServerConfig,
    pub auth: AuthConfig,
    pub geo: GeoConfig,
    pub proxy: ProxyConfig,
    pub frontend: FrontendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret expected in the `x-api-key` header
    pub api_key: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoBackend {
    Ipinfo,
    Mmdb,
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoConfig {
    pub backend: GeoBackend,
    /// Base URL of the ipinfo-compatible lookup service
    pub ipinfo_url: String,
    #[serde(default)]
    pub ipinfo_token: Option<String>,
    #[serde(default = "GeoConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    /// Path to a MaxMind City database, required for the mmdb backend
    #[serde(default)]
    pub mmdb_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Peer networks whose `X-Forwarded-For` header is honoured
    pub trusted_proxies: Vec<IpNet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Path to directory containing the landing page
    /// If None, uses the embedded page
    pub static_dir: Option<String>,
}

impl GeoConfig {
    pub const DEFAULT_IPINFO_URL: &'static str = "https://ipinfo.io";

    const fn default_timeout_secs() -> u64 {
        5
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            trusted_proxies: ProxyConfig::default_trusted_proxies(),
        }
    }
}

impl ProxyConfig {
    fn default_trusted_proxies() -> Vec<IpNet> {
        ["127.0.0.1/32", "::1/128"]
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect()
    }
}

/// Parse a comma-separated list of networks; bare addresses become host routes
pub fn parse_trusted_proxies(value: &str) -> anyhow::Result<Vec<IpNet>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<IpNet>()
                .or_else(|_| s.parse::<std::net::IpAddr>().map(IpNet::from))
                .with_context(|| format!("Invalid TRUSTED_PROXIES entry '{s}'"))
        })
        .collect()
}

/// Positive number of seconds for the geolocation HTTP timeout
pub fn parse_timeout_secs(value: &str) -> anyhow::Result<u64> {
    let secs = value
        .trim()
        .parse::<u64>()
        .context("GEO_TIMEOUT_SECS must be a positive integer")?;
    if secs == 0 {
        bail!("GEO_TIMEOUT_SECS must be greater than zero");
    }
    Ok(secs)
}

impl DatabaseConfig {
    /// Database settings alone, for tools that do not serve HTTP
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend_str =
            std::env::var("DATABASE_BACKEND").unwrap_or_else(|_| "sqlite".to_string());

        let backend = match backend_str.to_lowercase().as_str() {
            "postgres" | "postgresql" => DatabaseBackend::Postgres,
            _ => DatabaseBackend::Sqlite,
        };

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./visits.db?mode=rwc".to_string());

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        Ok(DatabaseConfig {
            backend,
            url: database_url,
            max_connections,
        })
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database = DatabaseConfig::from_env()?;

        let api_host = std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = std::env::var("API_PORT")
            .unwrap_or_else(|_| "10000".to_string())
            .parse::<u16>()
            .context("API_PORT must be a valid port number")?;

        let api_key = std::env::var("API_KEY").context("API_KEY must be set")?;
        if api_key.trim().is_empty() {
            bail!("API_KEY must not be empty");
        }

        let geo_backend = match std::env::var("GEO_BACKEND")
            .unwrap_or_else(|_| "ipinfo".to_string())
            .to_lowercase()
            .as_str()
        {
            "ipinfo" => GeoBackend::Ipinfo,
            "mmdb" => GeoBackend::Mmdb,
            "disabled" | "none" => GeoBackend::Disabled,
            other => {
                tracing::warn!(
                    "Unknown GEO_BACKEND '{other}', falling back to 'ipinfo'. Supported values: ipinfo, mmdb, disabled"
                );
                GeoBackend::Ipinfo
            }
        };

        let ipinfo_url = std::env::var("GEO_IPINFO_URL")
            .unwrap_or_else(|_| GeoConfig::DEFAULT_IPINFO_URL.to_string());
        let ipinfo_token = std::env::var("GEO_IPINFO_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());
        let timeout_secs = match std::env::var("GEO_TIMEOUT_SECS") {
            Ok(value) => parse_timeout_secs(&value)?,
            Err(_) => GeoConfig::default_timeout_secs(),
        };

        let mmdb_path = std::env::var("GEO_MMDB_PATH").ok();
        if matches!(geo_backend, GeoBackend::Mmdb) && mmdb_path.is_none() {
            bail!("GEO_MMDB_PATH must be set when GEO_BACKEND=mmdb");
        }

        let trusted_proxies = match std::env::var("TRUSTED_PROXIES") {
            Ok(value) => parse_trusted_proxies(&value)?,
            Err(_) => ProxyConfig::default_trusted_proxies(),
        };

        let frontend_static_dir = std::env::var("FRONTEND_STATIC_DIR").ok();

        Ok(Config {
            database,
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
            },
            auth: AuthConfig { api_key },
            geo: GeoConfig {
                backend: geo_backend,
                ipinfo_url,
                ipinfo_token,
                timeout_secs,
                mmdb_path,
            },
            proxy: ProxyConfig { trusted_proxies },
            frontend: FrontendConfig {
                static_dir: frontend_static_dir,
            },
        })
    }
}
