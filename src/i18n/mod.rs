//! Localized response messages
//!
//! Catalogs live in `locales/<tag>.json`, are embedded at build time and
//! parsed once at startup. Loading fails if any catalog is missing a key
//! from [`MessageKey::ALL`], so lookups never miss at request time.

use anyhow::{bail, Context, Result};
use rust_embed::RustEmbed;
use std::collections::HashMap;
use std::path::Path;

#[derive(RustEmbed)]
#[folder = "locales"]
struct Locales;

/// Language used when the request tag has no catalog
pub const DEFAULT_LANG: &str = "en";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    VisitLogged,
    IpAddressRequired,
    IpBlacklisted,
    IpAlreadyBlacklisted,
    Visits,
    VisitDetails,
    TotalVisits,
    UniqueVisitors,
    /// Label for the CSV export; present in every catalog, used by no response body
    DownloadVisits,
    Unauthorized,
    InvalidRequest,
    InternalError,
}

impl MessageKey {
    pub const ALL: [MessageKey; 12] = [
        MessageKey::VisitLogged,
        MessageKey::IpAddressRequired,
        MessageKey::IpBlacklisted,
        MessageKey::IpAlreadyBlacklisted,
        MessageKey::Visits,
        MessageKey::VisitDetails,
        MessageKey::TotalVisits,
        MessageKey::UniqueVisitors,
        MessageKey::DownloadVisits,
        MessageKey::Unauthorized,
        MessageKey::InvalidRequest,
        MessageKey::InternalError,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            MessageKey::VisitLogged => "visit_logged",
            MessageKey::IpAddressRequired => "ip_address_required",
            MessageKey::IpBlacklisted => "ip_blacklisted",
            MessageKey::IpAlreadyBlacklisted => "ip_already_blacklisted",
            MessageKey::Visits => "visits",
            MessageKey::VisitDetails => "visit_details",
            MessageKey::TotalVisits => "total_visits",
            MessageKey::UniqueVisitors => "unique_visitors",
            MessageKey::DownloadVisits => "download_visits",
            MessageKey::Unauthorized => "unauthorized",
            MessageKey::InvalidRequest => "invalid_request",
            MessageKey::InternalError => "internal_error",
        }
    }
}

/// Messages for one language
#[derive(Debug, Clone)]
pub struct Catalog {
    lang: String,
    messages: HashMap<MessageKey, String>,
}

impl Catalog {
    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn get(&self, key: MessageKey) -> &str {
        self.messages
            .get(&key)
            .map(String::as_str)
            .unwrap_or(key.as_str())
    }

    /// Message with its `{ip}` placeholder filled in
    pub fn with_ip(&self, key: MessageKey, ip: &str) -> String {
        self.get(key).replace("{ip}", ip)
    }
}

/// Immutable language tag → catalog table
#[derive(Debug, Clone)]
pub struct Translations {
    catalogs: HashMap<String, Catalog>,
    default: Catalog,
}

impl Translations {
    /// Load and validate the embedded catalogs
    pub fn load() -> Result<Self> {
        let mut sources = Vec::new();

        for file in Locales::iter() {
            let name = file.as_ref();
            let Some(lang) = Path::new(name)
                .extension()
                .filter(|ext| *ext == "json")
                .and_then(|_| Path::new(name).file_stem())
                .and_then(|stem| stem.to_str())
            else {
                continue;
            };

            let content = Locales::get(name)
                .with_context(|| format!("Embedded catalog {name} disappeared"))?;
            let text = std::str::from_utf8(&content.data)
                .with_context(|| format!("Catalog {name} is not valid UTF-8"))?
                .to_string();

            sources.push((lang.to_string(), text));
        }

        Self::from_sources(sources)
    }

    /// Build the table from `(lang, json)` pairs, rejecting incomplete catalogs
    pub fn from_sources<I, L, S>(sources: I) -> Result<Self>
    where
        I: IntoIterator<Item = (L, S)>,
        L: Into<String>,
        S: AsRef<str>,
    {
        let mut catalogs = HashMap::new();

        for (lang, json) in sources {
            let lang = lang.into();
            let mut raw: HashMap<String, String> = serde_json::from_str(json.as_ref())
                .with_context(|| format!("Failed to parse catalog for '{lang}'"))?;

            let mut messages = HashMap::with_capacity(MessageKey::ALL.len());
            let mut missing = Vec::new();
            for key in MessageKey::ALL {
                match raw.remove(key.as_str()) {
                    Some(text) => {
                        messages.insert(key, text);
                    }
                    None => missing.push(key.as_str()),
                }
            }

            if !missing.is_empty() {
                bail!(
                    "Catalog for '{lang}' is missing keys: {}",
                    missing.join(", ")
                );
            }

            if !raw.is_empty() {
                let mut unused: Vec<_> = raw.keys().map(String::as_str).collect();
                unused.sort_unstable();
                tracing::warn!(lang = %lang, keys = ?unused, "catalog contains unused keys");
            }

            catalogs.insert(lang.clone(), Catalog { lang, messages });
        }

        let Some(default) = catalogs.get(DEFAULT_LANG).cloned() else {
            bail!("No catalog for default language '{DEFAULT_LANG}'");
        };

        Ok(Self { catalogs, default })
    }

    /// Catalog for `lang`, or the default language when unsupported
    pub fn catalog(&self, lang: &str) -> &Catalog {
        self.catalogs.get(lang).unwrap_or(&self.default)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.catalogs.keys().map(String::as_str)
    }
}
