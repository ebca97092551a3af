use crate::humanize::HumanDuration;
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub thingiverse: ThingiverseSettings,
    #[serde(default)]
    pub mccord: McCordSettings,
}

/// Shared HTTP client settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpSettings {
    /// Minimum spacing between two consecutive requests
    #[serde(default = "default_request_delay")]
    pub request_delay: HumanDuration,
    /// Wait between a failed attempt and its retry
    #[serde(default = "default_retry_delay")]
    pub retry_delay: HumanDuration,
    #[serde(default = "default_timeout")]
    pub timeout: HumanDuration,
    /// Retries after the first attempt
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_delay: default_request_delay(),
            retry_delay: default_retry_delay(),
            timeout: default_timeout(),
            retries: default_retries(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_request_delay() -> HumanDuration {
    HumanDuration::from_secs(1)
}

fn default_retry_delay() -> HumanDuration {
    HumanDuration::from_secs(1)
}

fn default_timeout() -> HumanDuration {
    HumanDuration::from_secs(60)
}

fn default_retries() -> u32 {
    5
}

fn default_user_agent() -> String {
    "ccingest/0.1.0".to_string()
}

/// Thingiverse API provider settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThingiverseSettings {
    /// Listing endpoint walked page by page
    #[serde(default = "default_thingiverse_endpoint")]
    pub endpoint: String,
    /// Base for per-thing resources (`/things/{id}`, `/tags`, `/files`)
    #[serde(default = "default_thingiverse_api_base")]
    pub api_base: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_start_page")]
    pub start_page: u32,
    /// Upper bound on in-window things collected per run
    #[serde(default = "default_max_things")]
    pub max_things: usize,
    #[serde(default = "default_thingiverse_creator")]
    pub default_creator: String,
    /// `{}` is replaced by the creator account name
    #[serde(default = "default_creator_url_template")]
    pub creator_url_template: String,
    /// `{}` is replaced by the thing id
    #[serde(default = "default_landing_url_template")]
    pub landing_url_template: String,
    /// API access token (loaded from environment, not from config file)
    #[serde(skip)]
    pub access_token: String,
}

impl Default for ThingiverseSettings {
    fn default() -> Self {
        Self {
            endpoint: default_thingiverse_endpoint(),
            api_base: default_thingiverse_api_base(),
            per_page: default_per_page(),
            start_page: default_start_page(),
            max_things: default_max_things(),
            default_creator: default_thingiverse_creator(),
            creator_url_template: default_creator_url_template(),
            landing_url_template: default_landing_url_template(),
            access_token: String::new(),
        }
    }
}

fn default_thingiverse_endpoint() -> String {
    "https://api.thingiverse.com/newest".to_string()
}

fn default_thingiverse_api_base() -> String {
    "https://api.thingiverse.com".to_string()
}

fn default_per_page() -> u32 {
    30
}

fn default_start_page() -> u32 {
    1
}

fn default_max_things() -> usize {
    1000
}

fn default_thingiverse_creator() -> String {
    "Thingiverse".to_string()
}

fn default_creator_url_template() -> String {
    "https://www.thingiverse.com/{}".to_string()
}

fn default_landing_url_template() -> String {
    "https://www.thingiverse.com/thing:{}".to_string()
}

/// McCord Museum scraper settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct McCordSettings {
    /// Origin that relative image and artist links are resolved against
    #[serde(default = "default_mccord_domain")]
    pub domain: String,
    /// Creator used when a page names no artist
    #[serde(default)]
    pub default_creator: Option<String>,
}

impl Default for McCordSettings {
    fn default() -> Self {
        Self {
            domain: default_mccord_domain(),
            default_creator: None,
        }
    }
}

fn default_mccord_domain() -> String {
    "http://collections.musee-mccord.qc.ca".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.http.retries, 5);
        assert_eq!(config.http.request_delay.as_duration(), Duration::from_secs(1));
        assert_eq!(config.thingiverse.per_page, 30);
        assert_eq!(config.thingiverse.start_page, 1);
        assert_eq!(config.thingiverse.endpoint, "https://api.thingiverse.com/newest");
        assert!(config.thingiverse.access_token.is_empty());
        assert!(config.mccord.default_creator.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
[http]
retries = 2
retry_delay = "250ms"

[thingiverse]
per_page = 10
        "#,
        )
        .unwrap();

        assert_eq!(config.http.retries, 2);
        assert_eq!(config.http.retry_delay.as_duration(), Duration::from_millis(250));
        assert_eq!(config.http.timeout.as_duration(), Duration::from_secs(60));
        assert_eq!(config.thingiverse.per_page, 10);
        assert_eq!(config.thingiverse.default_creator, "Thingiverse");
    }
}
