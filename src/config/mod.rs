//! Configuration loading and management.
//!
//! Every section and field has a default, so an empty file (or no file at
//! all) yields a runnable server.

mod defaults;
mod validation;

pub use validation::ValidationError;

use defaults::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", validation::describe(.0))]
    Invalid(Vec<ValidationError>),
}

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server identity.
    pub server: ServerConfig,
    /// Listener settings.
    pub listen: ListenConfig,
    /// Word filter and warning escalation.
    pub moderation: ModerationConfig,
    /// Display-name rules.
    pub names: NamesConfig,
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Name used in logs.
    pub name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
        }
    }
}

/// Network listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    /// Interface to bind (e.g. "0.0.0.0").
    pub host: String,
    /// Preferred port; `-csp` overrides it.
    pub port: u16,
    /// Ports tried in order when `port` cannot be bound.
    pub fallback_ports: Vec<u16>,
    /// Longest accepted input line in bytes.
    pub max_line_length: usize,
    /// Outbound lines a connection may have queued before it is dropped as
    /// a slow consumer.
    pub send_queue: usize,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_listen_host(),
            port: default_listen_port(),
            fallback_ports: default_fallback_ports(),
            max_line_length: default_max_line_length(),
            send_queue: default_send_queue(),
        }
    }
}

/// Moderation configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    /// Path to the bad-word list.
    pub word_list: PathBuf,
    /// Line prefix that brackets the word section of the list file.
    pub section_marker: String,
    /// Words shorter than this (in characters) are skipped on load.
    pub min_word_length: usize,
    /// Warnings at which a connection is forcibly disconnected.
    pub warning_threshold: u32,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            word_list: default_word_list(),
            section_marker: default_section_marker(),
            min_word_length: default_min_word_length(),
            warning_threshold: default_warning_threshold(),
        }
    }
}

/// Display-name rules applied during negotiation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NamesConfig {
    /// Minimum length in characters.
    pub min_length: usize,
    /// Maximum length in characters.
    pub max_length: usize,
    /// Substrings no name may contain, matched case-insensitively.
    pub reserved: Vec<String>,
}

impl Default for NamesConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_name_length(),
            max_length: default_max_name_length(),
            reserved: default_reserved_names(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate(self).map_err(ConfigError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.listen.port, 14001);
        assert_eq!(config.listen.fallback_ports.len(), 10);
        assert_eq!(config.listen.max_line_length, 4096);
        assert_eq!(config.listen.send_queue, 1024);
        assert_eq!(config.moderation.warning_threshold, 3);
        assert_eq!(config.moderation.min_word_length, 3);
        assert_eq!(config.moderation.section_marker, "-----------");
        assert_eq!(config.names.min_length, 2);
        assert_eq!(config.names.max_length, 20);
        assert_eq!(config.names.reserved, vec!["admin", "server"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
            [listen]
            host = "127.0.0.1"
            port = 16800
            fallback_ports = []

            [moderation]
            warning_threshold = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.listen.host, "127.0.0.1");
        assert_eq!(config.listen.port, 16800);
        assert!(config.listen.fallback_ports.is_empty());
        assert_eq!(config.listen.max_line_length, 4096);
        assert_eq!(config.moderation.warning_threshold, 5);
        assert_eq!(config.moderation.word_list, PathBuf::from("bad_words.txt"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nname = \"relay.test\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.name, "relay.test");
    }

    #[test]
    fn test_load_errors() {
        let missing = Config::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(missing, ConfigError::Io(_)));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listen]\nport = \"not a number\"").unwrap();
        let bad = Config::load(file.path()).unwrap_err();
        assert!(matches!(bad, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validate_rejects_zero_threshold() {
        let mut config = Config::default();
        config.moderation.warning_threshold = 0;
        config.listen.max_line_length = 0;

        let err = config.validate().unwrap_err();
        let ConfigError::Invalid(errors) = &err else {
            panic!("expected Invalid, got {err}");
        };
        assert_eq!(errors.len(), 2);
        assert!(err.to_string().contains("warning_threshold"));
    }
}
