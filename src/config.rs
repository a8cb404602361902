use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    /// PostgreSQL connection URL; memory stores are used when absent
    #[serde(default)]
    pub postgres_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

/// Authentication gate configuration.
///
/// Injected into the gate at construction; never read from ambient globals.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    /// Dev bypass: short literal refs authenticate without signature checks
    pub dev_mode: bool,
    /// Production deployments must never run with dev_mode set
    pub production: bool,
    /// Allow-list flag for the admin replay-override route
    pub admin_override_enabled: bool,
    /// Recognized dev reference strings, matched case-insensitively
    pub dev_refs: Vec<String>,
    /// Freshness window: maximum token age
    pub max_hours_old: i64,
    /// Freshness window: maximum tolerated client clock lead
    pub max_hours_ahead: i64,
    /// Trailing window for the throttle count
    pub throttle_interval_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            dev_mode: false,
            production: true,
            admin_override_enabled: false,
            dev_refs: Vec::new(),
            max_hours_old: 24,
            max_hours_ahead: 1,
            throttle_interval_minutes: 10,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        let config: AppConfig =
            serde_yaml::from_str(&content).expect("Failed to parse config yaml");
        config.validate().expect("Invalid configuration");
        config
    }

    /// Reject contradictory flag combinations before anything starts.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.auth.production && self.auth.dev_mode {
            anyhow::bail!("dev_mode must not be enabled in a production configuration");
        }
        if self.auth.max_hours_old < 0 || self.auth.max_hours_ahead < 0 {
            anyhow::bail!("freshness window bounds must be non-negative");
        }
        if self.auth.throttle_interval_minutes <= 0 {
            anyhow::bail!("throttle_interval_minutes must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig {
            log_level: "info".to_string(),
            log_dir: "logs".to_string(),
            log_file: "gate.log".to_string(),
            use_json: false,
            rotation: "daily".to_string(),
            gateway: GatewayConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            auth: AuthConfig::default(),
            postgres_url: None,
        }
    }

    #[test]
    fn default_auth_config_is_production_safe() {
        let auth = AuthConfig::default();
        assert!(!auth.dev_mode);
        assert!(auth.production);
        assert!(!auth.admin_override_enabled);
        assert_eq!(auth.max_hours_old, 24);
        assert_eq!(auth.max_hours_ahead, 1);
    }

    #[test]
    fn dev_mode_in_production_is_rejected() {
        let mut config = test_config();
        config.auth.dev_mode = true;
        config.auth.production = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn dev_mode_outside_production_is_allowed() {
        let mut config = test_config();
        config.auth.dev_mode = true;
        config.auth.production = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn negative_window_is_rejected() {
        let mut config = test_config();
        config.auth.max_hours_old = -1;
        assert!(config.validate().is_err());
    }
}
