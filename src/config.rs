use crate::adapters::outbound::DEFAULT_BODY_LIMIT;
use crate::domain::entities::SiteScope;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // Edge server settings
    pub edge_listen_addr: String,
    pub origin_url: String,
    pub origin_timeout_secs: u64,
    pub max_body_bytes: usize,
    pub geoip_path: Option<String>,
    pub trust_forwarded_for: bool,

    // Configuration API settings
    pub api_listen_addr: String,

    // Site variable storage
    pub db_path: Option<String>,
    pub site_id: String,
    pub account_id: String,

    pub debug: bool,
}

impl Config {
    /// The site the edge server fronts.
    pub fn site_scope(&self) -> SiteScope {
        SiteScope::new(self.account_id.clone(), self.site_id.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            edge_listen_addr: "0.0.0.0:8080".to_string(),
            origin_url: "http://127.0.0.1:3000".to_string(),
            origin_timeout_secs: 30,
            max_body_bytes: DEFAULT_BODY_LIMIT,
            geoip_path: None,
            trust_forwarded_for: false,
            api_listen_addr: "0.0.0.0:8081".to_string(),
            db_path: None,
            site_id: "default-site".to_string(),
            account_id: "default-account".to_string(),
            debug: false,
        }
    }
}

/// Load configuration from the process environment.
pub fn load_config() -> anyhow::Result<Config> {
    load_config_from(|key| std::env::var(key).ok())
}

/// Load configuration from any key lookup.
///
/// Unparseable numbers fall back to their defaults.
pub fn load_config_from<F>(lookup: F) -> anyhow::Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = Config::default();

    // Empty values read as unset
    let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

    let edge_listen_addr =
        lookup("GEOBLOCK_EDGE_LISTEN_ADDR").unwrap_or(defaults.edge_listen_addr);

    let origin_url = lookup("GEOBLOCK_ORIGIN_URL").unwrap_or(defaults.origin_url);
    if !origin_url.starts_with("http://") && !origin_url.starts_with("https://") {
        anyhow::bail!("GEOBLOCK_ORIGIN_URL must be an http(s) URL, got {}", origin_url);
    }

    let origin_timeout_secs = lookup("GEOBLOCK_ORIGIN_TIMEOUT_SECS")
        .and_then(|v| v.parse().ok())
        .unwrap_or(defaults.origin_timeout_secs);

    let max_body_bytes = lookup("GEOBLOCK_MAX_BODY_BYTES")
        .and_then(|v| v.parse().ok())
        .unwrap_or(defaults.max_body_bytes);

    let geoip_path = lookup("GEOBLOCK_GEOIP_PATH");

    let trust_forwarded_for = lookup("GEOBLOCK_TRUST_FORWARDED_FOR")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false);

    let api_listen_addr = lookup("GEOBLOCK_API_LISTEN_ADDR").unwrap_or(defaults.api_listen_addr);

    let db_path = lookup("GEOBLOCK_DB_PATH");

    let site_id = lookup("GEOBLOCK_SITE_ID").unwrap_or(defaults.site_id);

    let account_id = lookup("GEOBLOCK_ACCOUNT_ID").unwrap_or(defaults.account_id);

    let debug = lookup("DEBUG").is_some();

    Ok(Config {
        edge_listen_addr,
        origin_url,
        origin_timeout_secs,
        max_body_bytes,
        geoip_path,
        trust_forwarded_for,
        api_listen_addr,
        db_path,
        site_id,
        account_id,
        debug,
    })
}
