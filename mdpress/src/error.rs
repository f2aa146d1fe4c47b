use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Failed to read {}: {source}", path.display())]
  Read {
    path:   PathBuf,
    source: std::io::Error,
  },

  #[error("Failed to parse TOML config from {}: {source}", path.display())]
  Parse {
    path:   PathBuf,
    source: toml::de::Error,
  },

  #[error("Unknown stylesheet: {0}")]
  UnknownStyle(String),

  #[error("Unknown template set: {0}")]
  UnknownTemplate(String),
}
