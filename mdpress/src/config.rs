use std::{
  fs,
  path::{Path, PathBuf},
  time::Duration,
};

use mdpress_core::{CoverData, DocumentOptions, SignatureData, TocConfig};
use mdpress_templates::{self as templates, TemplateSet};
use serde::Deserialize;

use crate::error::ConfigError;

/// File looked up next to the input when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "mdpress.toml";

/// Per-document settings loaded from `mdpress.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
  /// Document title. Falls back to the cover title.
  pub title: Option<String>,

  /// Built-in stylesheet name.
  pub style: String,

  /// Built-in cover/signature template set name.
  pub template: String,

  /// Stylesheet file used instead of the built-in one.
  pub stylesheet_path: Option<PathBuf>,

  /// Base directory for relative resources. Defaults to the input's parent.
  pub source_dir: Option<PathBuf>,

  pub cover:     Option<CoverData>,
  pub signature: Option<SignatureData>,

  /// Table of contents settings. A TOC with default settings is generated
  /// when this table is absent.
  pub toc: TocConfig,

  /// Set to `false` to omit the table of contents.
  pub toc_enabled: bool,

  /// Seconds before assembly is abandoned.
  pub timeout_secs: Option<u64>,
}

impl Default for DocumentConfig {
  fn default() -> Self {
    Self {
      title:           None,
      style:           templates::DEFAULT_NAME.to_string(),
      template:        templates::DEFAULT_NAME.to_string(),
      stylesheet_path: None,
      source_dir:      None,
      cover:           None,
      signature:       None,
      toc:             TocConfig::default(),
      toc_enabled:     true,
      timeout_secs:    None,
    }
  }
}

/// Command line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
  pub style:      Option<String>,
  pub template:   Option<String>,
  pub source_dir: Option<PathBuf>,
  pub no_toc:     bool,
  pub timeout:    Option<u64>,
}

impl DocumentConfig {
  /// Parse a config file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or is not valid TOML.
  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let content =
      fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
      })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Load the explicit config file, else `mdpress.toml` beside `input`, else
  /// defaults.
  ///
  /// # Errors
  ///
  /// Returns an error if a config file exists but cannot be loaded.
  pub fn load(
    explicit: Option<&Path>,
    input: &Path,
  ) -> Result<Self, ConfigError> {
    if let Some(path) = explicit {
      log::debug!("Loading config from {}", path.display());
      return Self::from_file(path);
    }

    let discovered = input_dir(input).join(DEFAULT_CONFIG_FILE);
    if discovered.is_file() {
      log::debug!("Discovered config at {}", discovered.display());
      return Self::from_file(&discovered);
    }

    log::debug!("No config file found, using defaults");
    Ok(Self::default())
  }

  /// Apply command line overrides.
  #[must_use]
  pub fn with_overrides(mut self, overrides: Overrides) -> Self {
    if let Some(style) = overrides.style {
      self.style = style;
      self.stylesheet_path = None;
    }
    if let Some(template) = overrides.template {
      self.template = template;
    }
    if let Some(source_dir) = overrides.source_dir {
      self.source_dir = Some(source_dir);
    }
    if overrides.no_toc {
      self.toc_enabled = false;
    }
    if let Some(timeout) = overrides.timeout {
      self.timeout_secs = Some(timeout);
    }
    self
  }

  /// Stylesheet text: the configured file, else the named built-in.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or the name is unknown.
  pub fn stylesheet(&self) -> Result<String, ConfigError> {
    if let Some(path) = &self.stylesheet_path {
      return fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
      });
    }
    templates::stylesheet(&self.style)
      .map(str::to_string)
      .ok_or_else(|| ConfigError::UnknownStyle(self.style.clone()))
  }

  /// # Errors
  ///
  /// Returns an error if the template set name is unknown.
  pub fn template_set(&self) -> Result<TemplateSet, ConfigError> {
    templates::template_set(&self.template)
      .ok_or_else(|| ConfigError::UnknownTemplate(self.template.clone()))
  }

  #[must_use]
  pub fn timeout(&self) -> Option<Duration> {
    self.timeout_secs.map(Duration::from_secs)
  }

  /// Build pipeline options for `input`.
  ///
  /// # Errors
  ///
  /// Returns an error if the stylesheet cannot be resolved.
  pub fn document_options(
    &self,
    input: &Path,
  ) -> Result<DocumentOptions, ConfigError> {
    let title = self.title.clone().or_else(|| {
      self
        .cover
        .as_ref()
        .map(|cover| cover.title.clone())
        .filter(|title| !title.is_empty())
    });

    Ok(DocumentOptions {
      title,
      css: self.stylesheet()?,
      cover: self.cover.clone(),
      signature: self.signature.clone(),
      toc: self.toc_enabled.then(|| self.toc.clone()),
      source_dir: self
        .source_dir
        .clone()
        .unwrap_or_else(|| input_dir(input).to_path_buf()),
    })
  }
}

fn input_dir(input: &Path) -> &Path {
  match input.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  }
}
