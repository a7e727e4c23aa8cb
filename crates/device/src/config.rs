//! Device proxy configuration management

use crate::descriptors::DeviceIdentity;
use anyhow::{Context, Result, anyhow};
use protocol::MAX_STRING_UNITS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration key naming the wireless interface
pub const INTERFACE_KEY: &str = "802.11_interface";

/// Backends `dot11.backend` may name
pub const BACKENDS: [&str; 2] = ["lorcon", "simulated"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub proxy: ProxySettings,
    pub dot11: Dot11Settings,
    /// Identity reported in the descriptors
    #[serde(default)]
    pub descriptor: DeviceIdentity,
    /// Free-form keys answered by [`ProxyConfig::get`]
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxySettings {
    pub log_level: String,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dot11Settings {
    /// Interface handed to the injection library, e.g. "wlan0"
    #[serde(default)]
    pub interface: String,
    /// "lorcon" or "simulated"
    #[serde(default = "Dot11Settings::default_backend")]
    pub backend: String,
}

impl Default for Dot11Settings {
    fn default() -> Self {
        Self {
            interface: String::new(),
            backend: Self::default_backend(),
        }
    }
}

impl Dot11Settings {
    fn default_backend() -> String {
        if cfg!(feature = "lorcon") {
            "lorcon".to_string()
        } else {
            "simulated".to_string()
        }
    }
}

impl ProxyConfig {
    /// Load configuration from the specified path
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p
        } else {
            let candidates = vec![
                Self::default_path(),
                PathBuf::from("/etc/usbproxy-dot11/proxy.toml"),
            ];

            candidates
                .into_iter()
                .find(|p| p.exists())
                .ok_or_else(|| anyhow!("No configuration file found, using defaults"))?
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: ProxyConfig = toml::from_str(&content)
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
            config_dir.join("usbproxy-dot11").join("proxy.toml")
        } else {
            PathBuf::from(".config/usbproxy-dot11/proxy.toml")
        }
    }

    /// Look up a configuration value by key
    ///
    /// [`INTERFACE_KEY`] maps to `dot11.interface`. Every other key is read
    /// from `[options]`.
    pub fn get(&self, key: &str) -> Option<&str> {
        if key == INTERFACE_KEY && !self.dot11.interface.is_empty() {
            return Some(&self.dot11.interface);
        }
        self.options.get(key).map(String::as_str)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.proxy.log_level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}', must be one of: {}",
                self.proxy.log_level,
                valid_levels.join(", ")
            ));
        }

        if !BACKENDS.contains(&self.dot11.backend.as_str()) {
            return Err(anyhow!(
                "Invalid backend '{}', must be one of: {}",
                self.dot11.backend,
                BACKENDS.join(", ")
            ));
        }

        let identity = &self.descriptor;
        for (name, value) in [
            ("manufacturer", &identity.manufacturer),
            ("product", &identity.product),
            ("serial", &identity.serial),
            ("configuration", &identity.configuration),
        ] {
            Self::validate_string(name, value)?;
        }

        Ok(())
    }

    /// Check a descriptor string fits in one string descriptor
    fn validate_string(name: &str, value: &str) -> Result<()> {
        let units = value.encode_utf16().count();
        if units > MAX_STRING_UNITS {
            return Err(anyhow!(
                "Descriptor string '{}' is {} UTF-16 units long, limit is {}",
                name,
                units,
                MAX_STRING_UNITS
            ));
        }
        Ok(())
    }
}

/// Load a configuration file, expanding a leading `~`
pub fn load_config(path: &str) -> Result<ProxyConfig> {
    ProxyConfig::load(Some(expand_path(path)))
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
        let config = ProxyConfig::default();
        assert_eq!(config.proxy.log_level, "info");
        assert!(config.dot11.interface.is_empty());
        assert_eq!(config.descriptor, DeviceIdentity::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_get_interface() {
        let mut config = ProxyConfig::default();
        assert_eq!(config.get(INTERFACE_KEY), None);

        config.dot11.interface = "wlan1".to_string();
        assert_eq!(config.get(INTERFACE_KEY), Some("wlan1"));
    }

    #[test]
    fn test_get_options() {
        let mut config = ProxyConfig::default();
        config
            .options
            .insert(INTERFACE_KEY.to_string(), "wlan2".to_string());
        config
            .options
            .insert("channel_hint".to_string(), "11".to_string());

        assert_eq!(config.get(INTERFACE_KEY), Some("wlan2"));
        assert_eq!(config.get("channel_hint"), Some("11"));
        assert_eq!(config.get("missing"), None);
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = ProxyConfig::default();
        config.proxy.log_level = "invalid".to_string();
        assert!(config.validate().is_err());

        config.proxy.log_level = "debug".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_backend() {
        let mut config = ProxyConfig::default();
        config.dot11.backend = "pcap".to_string();
        assert!(config.validate().is_err());

        config.dot11.backend = "lorcon".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_string_length() {
        let mut config = ProxyConfig::default();
        config.descriptor.product = "x".repeat(MAX_STRING_UNITS);
        assert!(config.validate().is_ok());

        config.descriptor.product.push('x');
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [proxy]
            log_level = "debug"

            [dot11]
            interface = "wlan0"

            [descriptor]
            vendor_id = 0x1d50
            "#,
        )
        .unwrap();

        assert_eq!(config.get(INTERFACE_KEY), Some("wlan0"));
        assert_eq!(config.descriptor.vendor_id, 0x1d50);
        assert_eq!(config.descriptor.product_id, 0x0005);
        assert_eq!(config.descriptor.product, "802.11 HID Device");
    }
}
