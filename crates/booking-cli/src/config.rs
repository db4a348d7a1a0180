//! Runtime configuration: command-line flags over environment variables over
//! defaults. A `.env` file in the working directory is loaded into the
//! environment before this is read.

use std::env::{self, VarError};
use std::path::PathBuf;

use chrono_tz::Tz;
use thiserror::Error;

/// Path of the JSON data file.
pub const DATA_FILE_VAR: &str = "SCHEDULER_DATA_FILE";
/// IANA timezone used to read and print local times.
pub const TIMEZONE_VAR: &str = "SCHEDULER_TIMEZONE";

pub const DEFAULT_DATA_FILE: &str = "scheduler.json";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Environment variable {0} is not valid unicode")]
    NotUnicode(&'static str),

    #[error("Unknown timezone '{0}' (expected an IANA name such as Europe/Berlin)")]
    InvalidTimezone(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_file: PathBuf,
    pub timezone: Tz,
}

impl Config {
    /// Resolve the configuration. Explicit values (from flags) take precedence
    /// over the environment.
    pub fn load(data_file: Option<PathBuf>, timezone: Option<String>) -> Result<Self, ConfigError> {
        let data_file = match data_file {
            Some(path) => path,
            None => env_var(DATA_FILE_VAR)?
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
        };
        let timezone = match timezone {
            Some(name) => Some(name),
            None => env_var(TIMEZONE_VAR)?,
        };
        let timezone = match timezone {
            Some(name) => parse_timezone(&name)?,
            None => Tz::UTC,
        };
        Ok(Config {
            data_file,
            timezone,
        })
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidTimezone(name.to_string()))
}

fn env_var(name: &'static str) -> Result<Option<String>, ConfigError> {
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_values_win() {
        let config = Config::load(
            Some(PathBuf::from("/tmp/bookings.json")),
            Some("Europe/Berlin".to_string()),
        )
        .unwrap();
        assert_eq!(config.data_file, PathBuf::from("/tmp/bookings.json"));
        assert_eq!(config.timezone, chrono_tz::Europe::Berlin);
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        assert_eq!(
            parse_timezone("Mars/Olympus"),
            Err(ConfigError::InvalidTimezone("Mars/Olympus".to_string()))
        );
        assert_eq!(parse_timezone(" UTC ").unwrap(), Tz::UTC);
    }
}
