use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use crawldash_core::{DEFAULT_POLL_INTERVAL, POLL_INTERVAL_PRESETS};
use crawldash_engine::{read_if_exists, write_atomic, DEFAULT_BASE_URL};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::logging::LogDestination;

pub const DEFAULT_SETTINGS_FILE: &str = "crawldash.ron";

/// User settings stored as RON next to where the tool runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub poll_interval_secs: u64,
    /// Start newly added jobs right away.
    pub auto_start: bool,
    pub log_level: String,
    pub log_destination: LogDestination,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            auto_start: true,
            log_level: "info".to_string(),
            log_destination: LogDestination::default(),
        }
    }
}

impl Settings {
    /// A stored interval of zero means "use the default".
    pub fn poll_interval(&self) -> Duration {
        match self.poll_interval_secs {
            0 => DEFAULT_POLL_INTERVAL,
            secs => Duration::from_secs(secs),
        }
    }

    pub fn level_filter(&self) -> LevelFilter {
        crawldash_logging::parse_level(&self.log_level)
    }
}

/// Settings plus anything that went wrong reading them.
///
/// Loading happens before the logger exists, so problems are handed back
/// for the caller to log once it is up.
#[derive(Debug)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub warning: Option<String>,
}

pub fn load(path: &Path) -> LoadedSettings {
    let content = match read_if_exists(path) {
        Ok(Some(text)) => text,
        Ok(None) => {
            return LoadedSettings {
                settings: Settings::default(),
                warning: None,
            }
        }
        Err(err) => {
            return LoadedSettings {
                settings: Settings::default(),
                warning: Some(format!("Failed to read settings from {:?}: {}", path, err)),
            }
        }
    };

    match ron::from_str(&content) {
        Ok(settings) => LoadedSettings {
            settings,
            warning: None,
        },
        Err(err) => LoadedSettings {
            settings: Settings::default(),
            warning: Some(format!("Failed to parse settings from {:?}: {}", path, err)),
        },
    }
}

pub fn save(path: &Path, settings: &Settings) -> anyhow::Result<()> {
    let pretty = ron::ser::PrettyConfig::new();
    let content =
        ron::ser::to_string_pretty(settings, pretty).context("serializing settings")?;
    write_atomic(path, &content).with_context(|| format!("writing settings to {:?}", path))?;
    Ok(())
}

/// Whether `secs` is one of the intervals offered in the UI.
pub fn is_preset_interval(secs: u64) -> bool {
    POLL_INTERVAL_PRESETS
        .iter()
        .any(|preset| preset.as_secs() == secs)
}
