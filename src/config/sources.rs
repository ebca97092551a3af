use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "CCINGEST_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/ccingest.toml";
const ENV_PREFIX: &str = "CCINGEST";
const ENV_SEPARATOR: &str = "__";
const THINGIVERSE_TOKEN_VAR: &str = "THINGIVERSE_ACCESS_TOKEN";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
///
/// An explicit `path` wins over `CCINGEST_CONFIG` and the default location.
pub fn load(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    let config_path = path.unwrap_or_else(|| {
        env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    });

    let mut config = load_from_sources(config_path)?;

    load_secrets(&mut config);

    Ok(config)
}

/// Secrets are never stored in TOML files, only in environment
fn load_secrets(config: &mut Config) {
    if let Ok(token) = env::var(THINGIVERSE_TOKEN_VAR) {
        config.thingiverse.access_token = token.trim().to_string();
    }
}

/// Load configuration from a specific path and environment
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // CCINGEST__HTTP__RETRIES -> http.retries
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.thingiverse.per_page, 30);
        assert_eq!(config.mccord.domain, "http://collections.musee-mccord.qc.ca");
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[http]
request_delay = "200ms"
retries = 3
user_agent = "test-agent/1.0"

[thingiverse]
endpoint = "http://127.0.0.1:9000/newest"
api_base = "http://127.0.0.1:9000"
max_things = 50

[mccord]
domain = "http://localhost:8081"
default_creator = "McCord Museum"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.http.request_delay.as_duration(), Duration::from_millis(200));
        assert_eq!(config.http.retries, 3);
        assert_eq!(config.http.user_agent, "test-agent/1.0");
        assert_eq!(config.thingiverse.endpoint, "http://127.0.0.1:9000/newest");
        assert_eq!(config.thingiverse.max_things, 50);
        assert_eq!(config.mccord.default_creator.as_deref(), Some("McCord Museum"));
    }

    #[test]
    fn test_access_token_not_read_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(
            &config_path,
            r#"
[thingiverse]
access_token = "should-be-ignored"
        "#,
        )
        .unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert!(config.thingiverse.access_token.is_empty());
    }
}
