//! Application configuration
//!
//! Loaded from a TOML file in the platform config directory, falling back
//! to defaults when the file is missing or unreadable.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::*;
use crate::error::{Error, Result};

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub audio: AudioConfig,
}

/// Network configuration shared by sender and receiver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Destination host for outgoing audio
    pub target_host: String,
    /// Destination port for outgoing audio
    pub target_port: u16,
    /// Local port the receiver binds
    pub listen_port: u16,
    /// Default address tag for audio messages
    pub osc_address: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            target_host: "127.0.0.1".to_string(),
            target_port: DEFAULT_OSC_PORT,
            listen_port: DEFAULT_OSC_PORT,
            osc_address: DEFAULT_OSC_ADDRESS.to_string(),
        }
    }
}

/// Audio configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Block size in frames
    pub buffer_size: usize,
    /// Playback volume in [0, 1]
    pub volume: f32,
    /// Mock-source sine frequency in Hz
    pub frequency: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            buffer_size: DEFAULT_BUFFER_SIZE,
            volume: DEFAULT_VOLUME,
            frequency: DEFAULT_FREQUENCY,
        }
    }
}

impl AppConfig {
    /// Path of the config file in the platform config directory
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "osc-audio-streamer", "osc-audio-streamer")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load the configuration, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Invalid config file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Write the configuration to the platform config directory
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| Error::Config("No config directory available".to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(&path, contents)?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.network.target_port, DEFAULT_OSC_PORT);
        assert_eq!(config.network.osc_address, "/audio/stream");
        assert_eq!(config.audio.sample_rate, 44_100);
        assert_eq!(config.audio.buffer_size, 512);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.network.target_host, config.network.target_host);
        assert_eq!(parsed.audio.volume, config.audio.volume);
    }
}
