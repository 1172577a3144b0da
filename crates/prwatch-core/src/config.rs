use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("PRWATCH_ENV", "development"))?;
    let log_level = or_default("PRWATCH_LOG_LEVEL", "info");
    let youtube_api_key = lookup("YOUTUBE_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());

    let brands_path = PathBuf::from(or_default("PRWATCH_BRANDS_PATH", "./config/brands.yaml"));
    let output_dir = PathBuf::from(or_default("PRWATCH_OUTPUT_DIR", "./output"));
    let log_dir = PathBuf::from(or_default("PRWATCH_LOG_DIR", "./logs"));

    let catalog_base_url = or_default(
        "PRWATCH_CATALOG_BASE_URL",
        "https://www.googleapis.com/youtube/v3/",
    );
    let captions_base_url = or_default("PRWATCH_CAPTIONS_BASE_URL", "https://www.youtube.com/");
    let caption_languages =
        parse_languages(&or_default("PRWATCH_CAPTION_LANGUAGES", "ja,en"))?;

    let request_timeout_secs = parse_u64("PRWATCH_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("PRWATCH_USER_AGENT", "prwatch/0.1 (sponsorship-audit)");
    let max_retries = parse_u32("PRWATCH_MAX_RETRIES", "5")?;
    let retry_backoff_base_secs = parse_u64("PRWATCH_RETRY_BACKOFF_BASE_SECS", "2")?;

    Ok(AppConfig {
        env,
        log_level,
        youtube_api_key,
        brands_path,
        output_dir,
        log_dir,
        catalog_base_url,
        captions_base_url,
        caption_languages,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRWATCH_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Split a comma-separated language list, dropping blanks.
fn parse_languages(raw: &str) -> Result<Vec<String>, ConfigError> {
    let languages: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
        .collect();

    if languages.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRWATCH_CAPTION_LANGUAGES".to_string(),
            reason: "at least one language code is required".to_string(),
        });
    }
    Ok(languages)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
