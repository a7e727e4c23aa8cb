//! Control utility configuration management

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Timeout for ordinary commands, in milliseconds
pub const COMMAND_TIMEOUT_MS: u64 = 1000;

/// Timeout for the mode-opening commands, in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 20000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControlConfig {
    #[serde(default)]
    pub control: ControlSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    pub log_level: String,
    pub vendor_id: u16,
    pub product_id: u16,
    /// Timeout for ordinary commands
    pub timeout_ms: u64,
    /// Timeout for open-inject, open-monitor and open-inject-monitor
    pub open_timeout_ms: u64,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            vendor_id: 0xffff,
            product_id: 0x0005,
            timeout_ms: COMMAND_TIMEOUT_MS,
            open_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ControlSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn open_timeout(&self) -> Duration {
        Duration::from_millis(self.open_timeout_ms)
    }
}

impl ControlConfig {
    /// Load configuration from the specified path
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p
        } else {
            let candidates = vec![
                Self::default_path(),
                PathBuf::from("/etc/usbproxy-dot11/control.toml"),
            ];

            candidates
                .into_iter()
                .find(|p| p.exists())
                .ok_or_else(|| anyhow!("No configuration file found, using defaults"))?
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: ControlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        config.validate()?;

        tracing::info!("Loaded configuration from: {}", config_path.display());
        Ok(config)
    }

    /// Load configuration or return defaults if not found
    pub fn load_or_default() -> Self {
        match Self::load(None) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration to the specified path
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("usbproxy-dot11").join("control.toml")
        } else {
            PathBuf::from(".config/usbproxy-dot11/control.toml")
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.control.log_level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}', must be one of: {}",
                self.control.log_level,
                valid_levels.join(", ")
            ));
        }

        if self.control.timeout_ms == 0 || self.control.open_timeout_ms == 0 {
            return Err(anyhow!("Timeouts must be greater than 0"));
        }

        Ok(())
    }
}

/// Parse a USB vendor or product ID
///
/// Accepts `0x`-prefixed or bare hex, 1-4 digits.
pub fn parse_usb_id(id: &str) -> Result<u16> {
    let hex_part = id
        .strip_prefix("0x")
        .or_else(|| id.strip_prefix("0X"))
        .unwrap_or(id);

    if hex_part.is_empty() || hex_part.len() > 4 {
        return Err(anyhow!(
            "Invalid USB ID '{}', hex part must be 1-4 digits",
            id
        ));
    }

    u16::from_str_radix(hex_part, 16)
        .map_err(|_| anyhow!("Invalid USB ID '{}', not a valid hex number", id))
}

/// Expand `~` in a user-supplied path
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ControlConfig::default();
        assert_eq!(config.control.vendor_id, 0xffff);
        assert_eq!(config.control.product_id, 0x0005);
        assert_eq!(config.control.timeout(), Duration::from_secs(1));
        assert_eq!(config.control.open_timeout(), Duration::from_secs(20));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_usb_id() {
        assert_eq!(parse_usb_id("0xffff").unwrap(), 0xffff);
        assert_eq!(parse_usb_id("0X1D50").unwrap(), 0x1d50);
        assert_eq!(parse_usb_id("5").unwrap(), 0x0005);
        assert!(parse_usb_id("0x").is_err());
        assert!(parse_usb_id("0x12345").is_err());
        assert!(parse_usb_id("0xGHIJ").is_err());
    }

    #[test]
    fn test_validate() {
        let mut config = ControlConfig::default();
        config.control.log_level = "chatty".to_string();
        assert!(config.validate().is_err());

        let mut config = ControlConfig::default();
        config.control.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config: ControlConfig = toml::from_str(
            r#"
            [control]
            product_id = 0x6002
            timeout_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.control.vendor_id, 0xffff);
        assert_eq!(config.control.product_id, 0x6002);
        assert_eq!(config.control.timeout_ms, 250);
        assert_eq!(config.control.open_timeout_ms, DEFAULT_TIMEOUT_MS);
    }
}
