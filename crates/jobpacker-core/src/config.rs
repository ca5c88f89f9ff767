use std::collections::BTreeMap;

use crate::app_config::{AppConfig, BoardSettings, Environment};
use crate::query::MAX_RESULTS_PER_SOURCE;
use crate::source::SourceId;
use crate::ConfigError;

/// Upper bound for any per-board deadline, in seconds.
pub const MAX_SOURCE_TIMEOUT_SECS: u64 = 3600;

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
/// Decoupled from the process environment so tests can use a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("JOBPACKER_ENV", "development"))?;
    let log_level = or_default("JOBPACKER_LOG_LEVEL", "info");
    let state_dir = PathBuf::from(or_default("JOBPACKER_STATE_DIR", "."));

    let check_timeout = |var: &str, secs: u64| -> Result<u64, ConfigError> {
        if secs == 0 || secs > MAX_SOURCE_TIMEOUT_SECS {
            return Err(invalid(
                var,
                format!("must be between 1 and {MAX_SOURCE_TIMEOUT_SECS} seconds"),
            ));
        }
        Ok(secs)
    };

    let source_timeout_secs = check_timeout(
        "JOBPACKER_SOURCE_TIMEOUT_SECS",
        parse_u64("JOBPACKER_SOURCE_TIMEOUT_SECS", "30")?,
    )?;

    let user_agent = or_default("JOBPACKER_USER_AGENT", "jobpacker/0.1 (job-harvester)");
    let inter_request_delay_ms = parse_u64("JOBPACKER_INTER_REQUEST_DELAY_MS", "250")?;

    let page_size = parse_u32("JOBPACKER_PAGE_SIZE", "25")?;
    if page_size == 0 || page_size > MAX_RESULTS_PER_SOURCE {
        return Err(invalid(
            "JOBPACKER_PAGE_SIZE",
            format!("must be between 1 and {MAX_RESULTS_PER_SOURCE}"),
        ));
    }

    let mut boards = BTreeMap::new();
    for source in SourceId::ALL {
        let key = source.env_key();
        let endpoint = lookup(&format!("JOBPACKER_{key}_ENDPOINT"))
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let timeout_var = format!("JOBPACKER_{key}_TIMEOUT_SECS");
        let timeout_secs = match lookup(&timeout_var) {
            Ok(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| invalid(&timeout_var, e.to_string()))?;
                Some(check_timeout(&timeout_var, secs)?)
            }
            Err(_) => None,
        };

        boards.insert(
            source,
            BoardSettings {
                endpoint,
                timeout_secs,
            },
        );
    }

    Ok(AppConfig {
        env,
        log_level,
        state_dir,
        source_timeout_secs,
        user_agent,
        inter_request_delay_ms,
        page_size,
        boards,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "JOBPACKER_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
