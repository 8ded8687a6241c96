//! Layered process configuration.
//!
//! Deserialized from `config.toml` (or `AUTOSAGE_CONFIG`), with every
//! section defaulted via `#[serde(default)]` so a missing or partial file
//! is never fatal — mirrors the teacher gateway's config module.

pub mod execution;
pub mod server;
pub mod workspace;

pub use execution::ExecutionConfig;
pub use server::{CorsConfig, ServerConfig};
pub use workspace::WorkspaceConfig;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub workspace: WorkspaceConfig,
    pub execution: ExecutionConfig,
}

/// Severity of a configuration validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSeverity {
    Warning,
    Error,
}

/// One validation finding, rendered the way the CLI `doctor`/`config
/// validate` commands print it.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: ConfigSeverity,
    pub message: String,
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            ConfigSeverity::Warning => "warning",
            ConfigSeverity::Error => "error",
        };
        write!(f, "[{label}] {}", self.message)
    }
}

impl Config {
    /// Load from `path` if it exists, falling back to defaults otherwise.
    pub fn load(path: &std::path::Path) -> crate::error::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| crate::error::Error::Config(e.to_string()))
    }

    /// Non-fatal sanity checks run at startup.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.server.port == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                message: "server.port must be nonzero".into(),
            });
        }

        if self.execution.default_limits.timeout_ms == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                message: "execution.default_limits.timeout_ms must be nonzero".into(),
            });
        }

        if self.execution.default_limits.max_artifacts == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                message: "execution.default_limits.max_artifacts is 0 — no tool will ever \
                          report an artifact"
                    .into(),
            });
        }

        if self.server.api_token.is_none() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                message: "server.api_token is unset — running without request authentication"
                    .into(),
            });
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_clean() {
        let config = Config::default();
        let issues = config.validate();
        assert!(issues.iter().all(|i| i.severity != ConfigSeverity::Error));
    }

    #[test]
    fn zero_port_is_an_error() {
        let mut config = Config::default();
        config.server.port = 0;
        let issues = config.validate();
        assert!(issues
            .iter()
            .any(|i| i.severity == ConfigSeverity::Error && i.message.contains("port")));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load(std::path::Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }
}
