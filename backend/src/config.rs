//! # Configuration
//!
//! Application settings loaded from a YAML file, with defaults for every key
//! and a few environment overrides for deployment.
//!
//! ```yaml
//! api:
//!   base_url: https://academia.example.com/api
//!   timeout_secs: 30
//! cash_register:
//!   closing_policy: allow_discrepancy
//!   history_limit: 10
//!   recent_movements: 10
//! logging:
//!   level: info
//! location: principal
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::domain::models::cash_register::ClosingPolicy;

pub const ENV_API_URL: &str = "ACADEMIA_API_URL";
pub const ENV_API_TIMEOUT_SECS: &str = "ACADEMIA_API_TIMEOUT_SECS";
pub const ENV_LOCATION: &str = "ACADEMIA_LOCATION";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CashRegisterConfig {
    pub closing_policy: ClosingPolicy,
    /// Maximum registers returned by a history query
    pub history_limit: usize,
    /// Size of the latest-movements panel
    pub recent_movements: usize,
}

impl Default for CashRegisterConfig {
    fn default() -> Self {
        Self {
            closing_policy: ClosingPolicy::AllowDiscrepancy,
            history_limit: 10,
            recent_movements: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub cash_register: CashRegisterConfig,
    pub logging: LoggingConfig,
    /// Operational context of the cash register ledger
    pub location: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            cash_register: CashRegisterConfig::default(),
            logging: LoggingConfig::default(),
            location: "principal".to_string(),
        }
    }
}

impl AppConfig {
    /// Read and validate a YAML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        info!("⚙️ Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Like [`AppConfig::load`], but a missing file yields the defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("⚙️ No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; used with the process environment
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_API_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!("Ignoring {}={}: not a number of seconds", ENV_API_TIMEOUT_SECS, raw),
            }
        }
        if let Some(location) = lookup(ENV_LOCATION).filter(|v| !v.trim().is_empty()) {
            self.location = location.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            bail!("api.base_url must not be empty");
        }
        if self.api.timeout_secs == 0 {
            bail!("api.timeout_secs must be greater than zero");
        }
        if self.cash_register.history_limit == 0 {
            bail!("cash_register.history_limit must be greater than zero");
        }
        if self.location.trim().is_empty() {
            bail!("location must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.base_url, "http://localhost:3000/api");
        assert_eq!(config.cash_register.history_limit, 10);
        assert_eq!(config.cash_register.closing_policy, ClosingPolicy::AllowDiscrepancy);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api:\n  base_url: https://academia.example.com/api\ncash_register:\n  closing_policy: require_match\n"
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.api.base_url, "https://academia.example.com/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.cash_register.closing_policy, ClosingPolicy::RequireMatch);
        assert_eq!(config.cash_register.recent_movements, 10);
        assert_eq!(config.location, "principal");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "api:\n  timeout_secs: 0\n").unwrap();
        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load_or_default(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(AppConfig::load(dir.path().join("absent.yaml")).is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_API_URL, "https://prod.example.com/api"),
            (ENV_API_TIMEOUT_SECS, "not-a-number"),
            (ENV_LOCATION, "filial-2"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "https://prod.example.com/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.location, "filial-2");
    }
}
