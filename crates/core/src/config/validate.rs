use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - BGG API URL is set
/// - Batch size and timeout are positive
/// - Cache max age is a non-negative number of days
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let bgg = &config.bgg;

    if bgg.api_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "bgg.api_url cannot be empty".to_string(),
        ));
    }

    if bgg.batch_size == 0 {
        return Err(ConfigError::ValidationError(
            "bgg.batch_size must be at least 1".to_string(),
        ));
    }

    if !bgg.max_age_days.is_finite() || bgg.max_age_days < 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "bgg.max_age_days must be a non-negative number, got {}",
            bgg.max_age_days
        )));
    }

    if bgg.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "bgg.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
