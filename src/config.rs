use std::path::Path;

use crate::domain::HardwareAddress;
use crate::error::ConfigError;

const DEFAULT_CONFIG_PATH: &str = "/etc/ipmac.conf";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Interface to capture on; the first suitable one when unset
    pub interface: Option<String>,
    /// Hardware addresses to track
    pub watch: Vec<HardwareAddress>,
    /// Track every hardware address instead of only `watch`
    pub track_all: bool,
    /// Drop frames that cannot carry a claim before extraction
    pub prefilter: bool,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interface: None,
            watch: Vec::new(),
            track_all: false,
            prefilter: true,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load from `IPMAC_CONFIG` (or the default path, if present), then
    /// apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("IPMAC_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&config_path).exists() {
            Self::load_from(Path::new(&config_path))?
        } else {
            Self::default()
        };

        // Allow environment variable overrides
        if let Ok(val) = std::env::var("IPMAC_INTERFACE") {
            config.interface = Some(val);
        }
        if let Ok(val) = std::env::var("IPMAC_LOG") {
            config.log_filter = val;
        }

        Ok(config)
    }

    /// Load a `key = value` file. Unknown keys are ignored.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "interface" => config.interface = Some(value.to_string()),
                "watch" => {
                    config.watch = value
                        .split(',')
                        .map(str::trim)
                        .filter(|mac| !mac.is_empty())
                        .map(|mac| mac.parse::<HardwareAddress>().map_err(|_| invalid(key, mac)))
                        .collect::<Result<_, _>>()?;
                }
                "track_all" => config.track_all = parse_bool(key, value)?,
                "prefilter" => config.prefilter = parse_bool(key, value)?,
                "log_filter" => config.log_filter = value.to_string(),
                _ => {}
            }
        }

        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}
