use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::link::SerialSettings;
use crate::logging::LogConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub log: LogConfig,
    pub serial: SerialSettings,
    /// Brightness the dry-run driver reports before anything is set.
    pub dry_run_brightness: u8,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = LogConfig::default();
        let log = LogConfig {
            file: lookup("MCTRL300_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.file),
            max_bytes: parse_or(&lookup, "MCTRL300_LOG_MAX_BYTES", defaults.max_bytes)?,
            backups: parse_or(&lookup, "MCTRL300_LOG_BACKUPS", defaults.backups)?,
        };

        let serial = SerialSettings {
            baud_rate: parse_or(&lookup, "MCTRL300_BAUD_RATE", 115_200)?,
            timeout: Duration::from_millis(parse_or(&lookup, "MCTRL300_TIMEOUT_MS", 1000)?),
        };

        Ok(Self {
            log,
            serial,
            dry_run_brightness: parse_or(&lookup, "MCTRL300_DRY_RUN_BRIGHTNESS", 255)?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {key}: {raw:?}")),
        None => Ok(default),
    }
}
