use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Longest retention window accepted, in days (100 years).
pub const MAX_RETENTION_DAYS: u32 = 36_500;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
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
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`
/// lookup, with no `set_var`/`remove_var` needed.
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = lookup("DATABASE_URL").ok().filter(|v| !v.is_empty());
    let env = parse_environment(&or_default("JOBHARVEST_ENV", "development"))?;
    let log_level = or_default("JOBHARVEST_LOG_LEVEL", "info");
    let platforms_path = PathBuf::from(or_default(
        "JOBHARVEST_PLATFORMS_PATH",
        "./config/platforms.yaml",
    ));

    let db_max_connections = parse_u32("JOBHARVEST_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("JOBHARVEST_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("JOBHARVEST_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_request_timeout_secs =
        parse_u64("JOBHARVEST_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default("JOBHARVEST_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let scraper_min_delay_ms = parse_u64("JOBHARVEST_SCRAPER_MIN_DELAY_MS", "1000")?;
    let scraper_max_delay_ms = parse_u64("JOBHARVEST_SCRAPER_MAX_DELAY_MS", "3500")?;
    if scraper_min_delay_ms > scraper_max_delay_ms {
        return Err(ConfigError::InvalidEnvVar {
            var: "JOBHARVEST_SCRAPER_MIN_DELAY_MS".to_string(),
            reason: format!(
                "min delay {scraper_min_delay_ms}ms exceeds max delay {scraper_max_delay_ms}ms"
            ),
        });
    }
    let scraper_max_retries = parse_u32("JOBHARVEST_SCRAPER_MAX_RETRIES", "3")?;
    let scraper_retry_backoff_base_ms =
        parse_u64("JOBHARVEST_SCRAPER_RETRY_BACKOFF_BASE_MS", "1000")?;
    let webdriver_url = lookup("JOBHARVEST_WEBDRIVER_URL")
        .ok()
        .filter(|v| !v.is_empty());

    let retention_days = parse_u32("JOBHARVEST_RETENTION_DAYS", "7")?;
    if !(1..=MAX_RETENTION_DAYS).contains(&retention_days) {
        return Err(ConfigError::InvalidEnvVar {
            var: "JOBHARVEST_RETENTION_DAYS".to_string(),
            reason: format!("must be between 1 and {MAX_RETENTION_DAYS}"),
        });
    }
    let cycle_interval_secs = parse_u64("JOBHARVEST_CYCLE_INTERVAL_SECS", "300")?;
    if cycle_interval_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "JOBHARVEST_CYCLE_INTERVAL_SECS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let max_concurrent_cycles = parse_usize("JOBHARVEST_MAX_CONCURRENT_CYCLES", "2")?.max(1);

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        platforms_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_min_delay_ms,
        scraper_max_delay_ms,
        scraper_max_retries,
        scraper_retry_backoff_base_ms,
        webdriver_url,
        retention_days,
        cycle_interval_secs,
        max_concurrent_cycles,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "JOBHARVEST_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
