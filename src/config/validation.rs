use crate::config::types::{
    Config, CrawlerConfig, OutputConfig, RetryConfig, SelectorConfig, UserAgentConfig,
};
use crate::{ConfigError, ConfigResult};
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_retry_config(&config.retry)?;
    validate_output_config(&config.output)?;
    validate_selectors(&config.selectors)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    crate::url::parse_origin(&config.origin)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid origin '{}': {}", config.origin, e)))?;

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1 when set".to_string(),
        ));
    }

    if !config.min_delay_secs.is_finite() || config.min_delay_secs < 0.0 {
        return Err(ConfigError::Validation(format!(
            "min_delay_secs must be a non-negative number, got {}",
            config.min_delay_secs
        )));
    }

    if !config.max_delay_secs.is_finite() || config.max_delay_secs < config.min_delay_secs {
        return Err(ConfigError::Validation(format!(
            "max_delay_secs must be >= min_delay_secs ({}), got {}",
            config.min_delay_secs, config.max_delay_secs
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    // The name doubles as the robots.txt product token
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates the retry policy
fn validate_retry_config(config: &RetryConfig) -> ConfigResult<()> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if !config.backoff_factor.is_finite() || config.backoff_factor < 0.0 {
        return Err(ConfigError::Validation(format!(
            "backoff_factor must be a non-negative number, got {}",
            config.backoff_factor
        )));
    }

    if !config.backoff_max_secs.is_finite() || config.backoff_max_secs < 0.0 {
        return Err(ConfigError::Validation(format!(
            "backoff_max_secs must be a non-negative number, got {}",
            config.backoff_max_secs
        )));
    }

    if let Some(status) = config
        .status_forcelist
        .iter()
        .find(|status| !(100..=599).contains(*status))
    {
        return Err(ConfigError::Validation(format!(
            "status_forcelist contains invalid HTTP status {}",
            status
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every selector parses
fn validate_selectors(config: &SelectorConfig) -> ConfigResult<()> {
    let fields = [
        ("quote", &config.quote),
        ("text", &config.text),
        ("author", &config.author),
        ("tags", &config.tags),
        ("next", &config.next),
    ];

    for (field, selector) in fields {
        if Selector::parse(selector).is_err() {
            return Err(ConfigError::InvalidSelector {
                field: field.to_string(),
                selector: selector.clone(),
            });
        }
    }

    Ok(())
}
