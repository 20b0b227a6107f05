//! Configuration module for the voice bridge
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: CLI overrides > YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use waav_voice_bridge::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable base
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

mod env;
mod merge;
mod validation;
mod yaml;

pub use yaml::YamlConfig;

use crate::core::codec::RealtimeVoice;

/// Values supplied on the command line. They win over every other source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
}

/// Server configuration
///
/// Contains everything needed to answer calls:
/// - Server settings (bind address, public host for the connect document)
/// - OpenAI Realtime credentials and endpoint
/// - Assistant persona (instructions, greeting, voice, temperature)
/// - Schedule webhook destination
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,
    /// Host placed in the media-stream URL of the connect document.
    /// Falls back to the request's `Host` header.
    pub public_host: Option<String>,

    // OpenAI Realtime
    pub openai_api_key: String,
    pub realtime_url: String,

    // Assistant
    pub system_message: String,
    pub greeting: String,
    pub voice: RealtimeVoice,
    pub temperature: f32,

    // Schedule webhook
    pub webhook_url: String,
}

/// Implement Drop to zeroize secret fields when ServerConfig is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        self.openai_api_key.zeroize();
    }
}

impl ServerConfig {
    /// Load configuration from environment variables only
    ///
    /// The .env file is loaded in main.rs before this is called.
    ///
    /// # Errors
    /// Returns an error naming every required variable that is missing, or
    /// describing the first invalid value.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load(None, &ConfigOverrides::default())
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - A required value is missing from every source
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        Self::load(Some(path), &ConfigOverrides::default())
    }

    /// Load from environment, an optional YAML file and command-line overrides.
    pub fn load(
        path: Option<&PathBuf>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = path.map(YamlConfig::from_file).transpose()?;

        let config = merge::merge_config(env::EnvConfig::load(), yaml_config, overrides)?;

        validation::validate_webhook_url(&config.webhook_url)?;
        validation::validate_realtime_url(&config.realtime_url)?;
        validation::validate_temperature(config.temperature)?;

        Ok(config)
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    const VARS: &[&str] = &[
        "HOST",
        "PORT",
        "PUBLIC_HOST",
        "OPENAI_API_KEY",
        "OPENAI_REALTIME_URL",
        "OPENAI_REALTIME_VOICE",
        "OPENAI_REALTIME_TEMPERATURE",
        "SYSTEM_MESSAGE",
        "GREETINGS_RESPONSE",
        "WEBHOOK_URL",
    ];

    // Helper to clean up environment variables
    fn cleanup_env_vars() {
        for var in VARS {
            unsafe {
                env::remove_var(var);
            }
        }
    }

    fn set_required_env_vars() {
        unsafe {
            env::set_var("OPENAI_API_KEY", "sk-env");
            env::set_var("SYSTEM_MESSAGE", "You are a scheduling assistant");
            env::set_var("PORT", "1313");
            env::set_var("GREETINGS_RESPONSE", "Hello!");
            env::set_var("WEBHOOK_URL", "https://hooks.example.com/schedule");
        }
    }

    #[test]
    #[serial]
    fn test_from_env_required_only() {
        cleanup_env_vars();
        set_required_env_vars();

        let config = ServerConfig::from_env().unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 1313);
        assert_eq!(config.address(), "0.0.0.0:1313");
        assert_eq!(config.openai_api_key, "sk-env");
        assert_eq!(config.system_message, "You are a scheduling assistant");
        assert_eq!(config.greeting, "Hello!");
        assert_eq!(config.webhook_url, "https://hooks.example.com/schedule");
        assert_eq!(
            config.realtime_url,
            crate::core::codec::realtime::OPENAI_REALTIME_URL
        );
        assert_eq!(config.voice, RealtimeVoice::Alloy);
        assert!((config.temperature - 0.8).abs() < f32::EPSILON);
        assert!(config.public_host.is_none());

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_names_missing_variables() {
        cleanup_env_vars();
        unsafe {
            env::set_var("OPENAI_API_KEY", "sk-env");
            env::set_var("PORT", "1313");
        }

        let err = ServerConfig::from_env().unwrap_err().to_string();
        assert!(err.contains("SYSTEM_MESSAGE"), "{err}");
        assert!(err.contains("GREETINGS_RESPONSE"), "{err}");
        assert!(err.contains("WEBHOOK_URL"), "{err}");
        assert!(!err.contains("OPENAI_API_KEY"), "{err}");

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_empty_variable_counts_as_missing() {
        cleanup_env_vars();
        set_required_env_vars();
        unsafe {
            env::set_var("GREETINGS_RESPONSE", "");
        }

        let err = ServerConfig::from_env().unwrap_err().to_string();
        assert!(err.contains("GREETINGS_RESPONSE"), "{err}");

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_port_override_satisfies_missing_port() {
        cleanup_env_vars();
        set_required_env_vars();
        unsafe {
            env::remove_var("PORT");
        }

        assert!(ServerConfig::from_env().is_err());

        let overrides = ConfigOverrides { port: Some(4000) };
        let config = ServerConfig::load(None, &overrides).unwrap();
        assert_eq!(config.port, 4000);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_invalid_values_rejected() {
        cleanup_env_vars();
        set_required_env_vars();

        unsafe {
            env::set_var("PORT", "not-a-port");
        }
        assert!(
            ServerConfig::from_env()
                .unwrap_err()
                .to_string()
                .contains("Invalid PORT")
        );

        set_required_env_vars();
        unsafe {
            env::set_var("WEBHOOK_URL", "ftp://hooks.example.com");
        }
        assert!(
            ServerConfig::from_env()
                .unwrap_err()
                .to_string()
                .contains("WEBHOOK_URL")
        );

        set_required_env_vars();
        unsafe {
            env::set_var("OPENAI_REALTIME_TEMPERATURE", "2.5");
        }
        assert!(
            ServerConfig::from_env()
                .unwrap_err()
                .to_string()
                .contains("temperature")
        );

        cleanup_env_vars();
        set_required_env_vars();
        unsafe {
            env::set_var("OPENAI_REALTIME_VOICE", "robot");
        }
        assert!(
            ServerConfig::from_env()
                .unwrap_err()
                .to_string()
                .contains("Unsupported voice")
        );

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_yaml_overrides_env() {
        cleanup_env_vars();
        set_required_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let yaml_content = r#"
server:
  host: "127.0.0.1"
  port: 8080
  public_host: "calls.example.com"

assistant:
  greeting: "Welcome to Acme"
  voice: "shimmer"
  temperature: 1.0

webhook:
  url: "https://yaml.example.com/hook"
"#;

        fs::write(&config_path, yaml_content).unwrap();

        let config = ServerConfig::from_file(&config_path).unwrap();

        // YAML overrides ENV
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.public_host.as_deref(), Some("calls.example.com"));
        assert_eq!(config.greeting, "Welcome to Acme");
        assert_eq!(config.voice, RealtimeVoice::Shimmer);
        assert_eq!(config.webhook_url, "https://yaml.example.com/hook");
        // Values from ENV
        assert_eq!(config.openai_api_key, "sk-env");
        assert_eq!(config.system_message, "You are a scheduling assistant");

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_yaml_only() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let yaml_content = r#"
server:
  port: 9000

openai:
  api_key: "sk-yaml"
  realtime_url: "ws://localhost:9001/v1/realtime"

assistant:
  system_message: "Be brief"
  greeting: "Hi"

webhook:
  url: "http://localhost:9002/hook"
"#;

        fs::write(&config_path, yaml_content).unwrap();

        let config = ServerConfig::from_file(&config_path).unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.openai_api_key, "sk-yaml");
        assert_eq!(config.realtime_url, "ws://localhost:9001/v1/realtime");

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_cli_port_overrides_yaml() {
        cleanup_env_vars();
        set_required_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "server:\n  port: 8080\n").unwrap();

        let overrides = ConfigOverrides { port: Some(7070) };
        let config = ServerConfig::load(Some(&config_path), &overrides).unwrap();
        assert_eq!(config.port, 7070);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_missing_file() {
        cleanup_env_vars();

        let config_path = PathBuf::from("/nonexistent/config.yaml");
        let result = ServerConfig::from_file(&config_path);

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );

        cleanup_env_vars();
    }
}
