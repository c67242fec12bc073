use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::midi::handler::InputSelection;
use crate::types::waveform::Waveform;

/// Top-level configuration structure
/// Every section is optional; a missing file means all defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub devices: DeviceConfig,

    #[serde(default)]
    pub synth: SynthSettings,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl MonitorConfig {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: MonitorConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.synth.validate().context("Invalid synth configuration")?;

        if self.display.max_log_lines == 0 {
            return Err(anyhow!("display.max_log_lines must be at least 1"));
        }

        if !LOG_LEVELS.contains(&self.log.level.to_lowercase().as_str()) {
            return Err(anyhow!(
                "log.level must be one of {}, got '{}'",
                LOG_LEVELS.join("|"),
                self.log.level
            ));
        }

        Ok(())
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Device configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// "all", or an index / name substring of one input port
    #[serde(default = "default_midiin")]
    pub midiin: String,

    /// "default", or an index / name substring of an output device
    #[serde(default = "default_audioout")]
    pub audioout: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            midiin: default_midiin(),
            audioout: default_audioout(),
        }
    }
}

impl DeviceConfig {
    pub fn input_selection(&self) -> InputSelection {
        InputSelection::parse(&self.midiin)
    }

    /// None when the host's default output device should be used
    pub fn audio_output(&self) -> Option<&str> {
        let spec = self.audioout.trim();
        if spec.is_empty() || spec.eq_ignore_ascii_case("default") {
            None
        } else {
            Some(spec)
        }
    }
}

/// Synthesizer settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SynthSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub wave: Waveform,

    #[serde(default = "default_attack")]
    pub attack: f32,

    #[serde(default = "default_decay")]
    pub decay: f32,

    #[serde(default = "default_sustain")]
    pub sustain: f32,

    #[serde(default = "default_release")]
    pub release: f32,

    #[serde(default = "default_gain")]
    pub gain: f32,
}

impl Default for SynthSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            wave: Waveform::default(),
            attack: default_attack(),
            decay: default_decay(),
            sustain: default_sustain(),
            release: default_release(),
            gain: default_gain(),
        }
    }
}

impl SynthSettings {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=10.0).contains(&self.attack) {
            return Err(anyhow!("Attack must be between 0.0 and 10.0 seconds"));
        }
        if !(0.0..=10.0).contains(&self.decay) {
            return Err(anyhow!("Decay must be between 0.0 and 10.0 seconds"));
        }
        if !(0.0..=1.0).contains(&self.sustain) {
            return Err(anyhow!("Sustain must be between 0.0 and 1.0"));
        }
        if !(0.0..=10.0).contains(&self.release) {
            return Err(anyhow!("Release must be between 0.0 and 10.0 seconds"));
        }
        if !(0.0..=1.0).contains(&self.gain) {
            return Err(anyhow!("Gain must be between 0.0 and 1.0"));
        }
        Ok(())
    }
}

/// Display configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Event log lines kept before the oldest are dropped
    #[serde(default = "default_max_log_lines")]
    pub max_log_lines: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_log_lines: default_max_log_lines(),
        }
    }
}

/// Tracing output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// Log file used while the TUI owns the terminal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Default filter level, RUST_LOG takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: default_log_level(),
        }
    }
}

// Default value functions for serde
fn default_midiin() -> String {
    "all".to_string()
}

fn default_audioout() -> String {
    "default".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_attack() -> f32 {
    0.01
}

fn default_decay() -> f32 {
    0.1
}

fn default_sustain() -> f32 {
    0.7
}

fn default_release() -> f32 {
    0.3
}

fn default_gain() -> f32 {
    0.8
}

fn default_max_log_lines() -> usize {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}
