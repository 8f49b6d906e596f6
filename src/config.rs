//! Configuration loading and management
//!
//! Handles parsing of the `config.toml` file in the tempo data directory.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Space card layout configuration
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Auto-scheduler configuration
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// External feed configuration
    #[serde(default)]
    pub feeds: FeedsConfig,
}

/// Layout sizing for space cards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Base display size for a space card
    #[serde(default = "default_min_size")]
    pub min_size: f64,

    /// Additional size span distributed by blended ratio
    #[serde(default = "default_max_span")]
    pub max_span: f64,
}

fn default_min_size() -> f64 {
    150.0
}

fn default_max_span() -> f64 {
    400.0
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_size: default_min_size(),
            max_span: default_max_span(),
        }
    }
}

/// Auto-scheduler tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Slot granularity in minutes; candidate start times snap to this grid
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: u32,

    /// How far ahead the scheduler searches for a free slot
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
}

fn default_slot_minutes() -> u32 {
    30
}

fn default_horizon_days() -> u32 {
    90
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            slot_minutes: default_slot_minutes(),
            horizon_days: default_horizon_days(),
        }
    }
}

/// External feed handling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedsConfig {
    /// Default event window in days for agenda and event listing
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

fn default_window_days() -> u32 {
    30
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
        }
    }
}

impl Config {
    /// Load configuration from a `config.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the data directory, or return defaults
    /// when no config file exists yet
    pub fn load_from_dir(data_dir: &Path) -> crate::error::Result<Self> {
        let config_path = data_dir.join("config.toml");
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> crate::error::Result<()> {
        self.layout.validate()?;
        self.scheduler.validate()?;
        self.feeds.validate()?;
        Ok(())
    }
}

impl LayoutConfig {
    fn validate(&self) -> crate::error::Result<()> {
        if !self.min_size.is_finite() || self.min_size <= 0.0 {
            return Err(crate::error::Error::InvalidConfig(
                "layout.min_size must be > 0".to_string(),
            ));
        }
        if !self.max_span.is_finite() || self.max_span < 0.0 {
            return Err(crate::error::Error::InvalidConfig(
                "layout.max_span must be >= 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl SchedulerConfig {
    fn validate(&self) -> crate::error::Result<()> {
        if self.slot_minutes == 0 || self.slot_minutes > 240 {
            return Err(crate::error::Error::InvalidConfig(
                "scheduler.slot_minutes must be between 1 and 240".to_string(),
            ));
        }
        if 24 * 60 % self.slot_minutes != 0 {
            return Err(crate::error::Error::InvalidConfig(format!(
                "scheduler.slot_minutes must divide a day evenly, got {}",
                self.slot_minutes
            )));
        }
        if self.horizon_days == 0 || self.horizon_days > 365 {
            return Err(crate::error::Error::InvalidConfig(
                "scheduler.horizon_days must be between 1 and 365".to_string(),
            ));
        }
        Ok(())
    }
}

impl FeedsConfig {
    fn validate(&self) -> crate::error::Result<()> {
        if self.window_days == 0 || self.window_days > 365 {
            return Err(crate::error::Error::InvalidConfig(
                "feeds.window_days must be between 1 and 365".to_string(),
            ));
        }
        Ok(())
    }
}
