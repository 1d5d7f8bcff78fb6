use serde::{Deserialize, Serialize};

use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub hostd: HostdConfig,
}

/// Where the panel reaches the host process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// TCP address of the push socket (inbound openUI/closeUI/updateVehicles).
    #[serde(default = "default_push_address")]
    pub push_address: String,
    /// Base URL for outbound commands; the command name is appended as the path.
    #[serde(default = "default_command_base_url")]
    pub command_base_url: String,
}

/// Development mode — exercise the panel without a live host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// When true, dispatcher calls that supply a canned response resolve
    /// locally after a fixed delay instead of touching the network.
    #[serde(default)]
    pub enabled: bool,
}

/// Settings for the garage-hostd stand-in host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostdConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_push_port")]
    pub push_port: u16,
    #[serde(default = "default_command_port")]
    pub command_port: u16,
    /// Seconds between simulated gauge drifts (updateVehicles deltas).
    #[serde(default = "default_delta_interval_secs")]
    pub delta_interval_secs: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            push_address: default_push_address(),
            command_base_url: default_command_base_url(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { enabled: false }
    }
}

impl Default for HostdConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            push_port: default_push_port(),
            command_port: default_command_port(),
            delta_interval_secs: default_delta_interval_secs(),
        }
    }
}

fn default_push_address() -> String {
    platform::default_push_address()
}

fn default_command_base_url() -> String {
    platform::default_command_base_url()
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_push_port() -> u16 {
    platform::HOST_PUSH_PORT
}

fn default_command_port() -> u16 {
    platform::HOST_COMMAND_PORT
}

fn default_delta_interval_secs() -> u64 {
    5
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> std::path::PathBuf {
        platform::config_dir().join("config.toml")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: HostConfig::default(),
            simulation: SimulationConfig::default(),
            hostd: HostdConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.host.push_address.ends_with(":9430"));
        assert!(config.host.command_base_url.starts_with("http://"));
        assert!(!config.simulation.enabled);
        assert_eq!(config.hostd.push_port, 9430);
        assert_eq!(config.hostd.command_port, 9431);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [simulation]
            enabled = true
            "#,
        )
        .unwrap();
        assert!(config.simulation.enabled);
        assert_eq!(config.hostd.delta_interval_secs, 5);
        assert!(config.host.push_address.contains("127.0.0.1"));
    }
}
