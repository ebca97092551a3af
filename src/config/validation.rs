use super::models::Config;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} must be positive")]
    NotPositive { field: String },

    #[error("{field} is not a valid absolute URL: '{value}'")]
    InvalidUrl { field: String, value: String },

    #[error("{field} must contain a '{{}}' placeholder: '{value}'")]
    MissingPlaceholder { field: String, value: String },

    #[error("retries ({actual}) exceeds limit of {limit}")]
    TooManyRetries { actual: u32, limit: u32 },
}

const MAX_RETRIES: u32 = 20;

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_http(config)?;
    validate_thingiverse(config)?;
    validate_mccord(config)?;
    Ok(())
}

fn validate_http(config: &Config) -> Result<(), ValidationError> {
    if config.http.retries > MAX_RETRIES {
        return Err(ValidationError::TooManyRetries {
            actual: config.http.retries,
            limit: MAX_RETRIES,
        });
    }

    if config.http.timeout.as_duration().is_zero() {
        return Err(ValidationError::NotPositive {
            field: "http.timeout".to_string(),
        });
    }

    Ok(())
}

fn validate_thingiverse(config: &Config) -> Result<(), ValidationError> {
    let settings = &config.thingiverse;

    let counters = [
        ("thingiverse.per_page", settings.per_page as usize),
        ("thingiverse.start_page", settings.start_page as usize),
        ("thingiverse.max_things", settings.max_things),
    ];
    for (field, value) in counters {
        if value == 0 {
            return Err(ValidationError::NotPositive {
                field: field.to_string(),
            });
        }
    }

    validate_url("thingiverse.endpoint", &settings.endpoint)?;
    validate_url("thingiverse.api_base", &settings.api_base)?;
    validate_template("thingiverse.creator_url_template", &settings.creator_url_template)?;
    validate_template("thingiverse.landing_url_template", &settings.landing_url_template)?;

    Ok(())
}

fn validate_mccord(config: &Config) -> Result<(), ValidationError> {
    validate_url("mccord.domain", &config.mccord.domain)
}

fn validate_url(field: &str, value: &str) -> Result<(), ValidationError> {
    match Url::parse(value) {
        Ok(url) if url.has_host() => Ok(()),
        _ => Err(ValidationError::InvalidUrl {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

fn validate_template(field: &str, value: &str) -> Result<(), ValidationError> {
    if !value.contains("{}") {
        return Err(ValidationError::MissingPlaceholder {
            field: field.to_string(),
            value: value.to_string(),
        });
    }

    validate_url(field, &value.replacen("{}", "placeholder", 1))
}
