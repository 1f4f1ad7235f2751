//! Error types for txview-config

use std::path::PathBuf;

use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("Invalid field value: {field} - {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    /// Hints printed next to a failed startup
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            ConfigError::FileNotFound { .. } => vec![
                "Check if the config file path is correct.".to_string(),
                "Omit --config to start with the built-in defaults.".to_string(),
            ],
            ConfigError::Read { .. } => {
                vec!["Check the file permissions.".to_string()]
            }
            ConfigError::InvalidYaml(error) => {
                let mut hints = Vec::new();
                if let Some(location) = error.location() {
                    hints.push(format!(
                        "Fix the document near line {}, column {}.",
                        location.line(),
                        location.column()
                    ));
                }
                hints.push("See default_config.yaml for the expected layout.".to_string());
                hints
            }
            ConfigError::InvalidValue { field, reason } => {
                vec![format!("Set {}: {}", field, reason)]
            }
        }
    }
}
