//! Runtime settings that can be changed through commands
//!
//! Stored as `settings.json` next to the project store.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{TrackerError, TrackerResult};

pub const DEFAULT_INACTIVITY_TIMEOUT_MINUTES: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Start tracking as soon as a project becomes the current one
    pub auto_start_on_open: bool,
    pub inactivity_timeout_minutes: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_start_on_open: false,
            inactivity_timeout_minutes: DEFAULT_INACTIVITY_TIMEOUT_MINUTES,
        }
    }
}

/// Parse a timeout typed by the user. Only positive whole minutes pass.
pub fn parse_timeout_minutes(input: &str) -> TrackerResult<u32> {
    let trimmed = input.trim();
    match trimmed.parse::<u32>() {
        Ok(0) => Err(TrackerError::InvalidConfigurationInput(
            "Please enter a positive number of minutes".to_string(),
        )),
        Ok(minutes) => Ok(minutes),
        Err(_) if trimmed.parse::<i64>().is_ok() => Err(TrackerError::InvalidConfigurationInput(
            "Please enter a positive number of minutes".to_string(),
        )),
        Err(_) => Err(TrackerError::InvalidConfigurationInput(
            "Please enter a valid number".to_string(),
        )),
    }
}

/// Settings plus where they are saved
#[derive(Debug)]
pub struct SettingsStore {
    settings: Settings,
    path: Option<PathBuf>,
}

impl SettingsStore {
    pub fn in_memory(settings: Settings) -> Self {
        Self {
            settings,
            path: None,
        }
    }

    /// Load settings, falling back to defaults when the file is missing or broken.
    pub fn load(path: &Path) -> Self {
        let settings = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring malformed settings file {}: {}", path.display(), e);
                Settings::default()
            }),
            Err(_) => Settings::default(),
        };

        let settings = if settings.inactivity_timeout_minutes == 0 {
            warn!("Stored inactivity timeout is zero, using default");
            Settings {
                inactivity_timeout_minutes: DEFAULT_INACTIVITY_TIMEOUT_MINUTES,
                ..settings
            }
        } else {
            settings
        };

        Self {
            settings,
            path: Some(path.to_path_buf()),
        }
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Flip auto-start and save. Returns the new value.
    pub fn toggle_auto_start(&mut self) -> TrackerResult<bool> {
        let next = Settings {
            auto_start_on_open: !self.settings.auto_start_on_open,
            ..self.settings.clone()
        };
        self.replace(next)?;
        info!("Auto start set to {}", self.settings.auto_start_on_open);
        Ok(self.settings.auto_start_on_open)
    }

    pub fn set_inactivity_timeout(&mut self, minutes: u32) -> TrackerResult<()> {
        if minutes == 0 {
            return Err(TrackerError::InvalidConfigurationInput(
                "Please enter a positive number of minutes".to_string(),
            ));
        }
        self.replace(Settings {
            inactivity_timeout_minutes: minutes,
            ..self.settings.clone()
        })
    }

    /// Write `next` and only then make it the settings in effect.
    fn replace(&mut self, next: Settings) -> TrackerResult<()> {
        Self::save(self.path.as_deref(), &next)?;
        self.settings = next;
        Ok(())
    }

    fn save(path: Option<&Path>, settings: &Settings) -> TrackerResult<()> {
        let Some(path) = path else {
            return Ok(());
        };

        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(settings)?;
            fs::write(path, content)
        };

        write().map_err(|source| TrackerError::PersistenceWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}
