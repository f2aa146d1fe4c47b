use std::{fmt, io, path::PathBuf};

use thiserror::Error;

/// The template-rendering stage that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
  Cover,
  Signature,
}

impl fmt::Display for RenderStage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Cover => f.write_str("cover"),
      Self::Signature => f.write_str("signature"),
    }
  }
}

/// Top-level error type for the document assembly pipeline.
///
/// Only three conditions are fatal: template rendering, cancellation and
/// structural parsing. Everything else (missing anchors, empty payloads,
/// rejected paths) degrades gracefully and never surfaces here.
#[derive(Debug, Error)]
pub enum Error {
  #[error("Failed to render {stage} template: {source}")]
  Render {
    stage:  RenderStage,
    #[source]
    source: tera::Error,
  },

  #[error("Operation cancelled")]
  Cancelled,

  #[error("Markdown conversion failed: {0}")]
  Conversion(String),

  #[error("HTML parse error: {0}")]
  Parse(String),

  #[error("Failed to resolve source directory {}: {source}", path.display())]
  SourceDir {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
}

impl Error {
  pub(crate) fn cover(source: tera::Error) -> Self {
    Self::Render {
      stage: RenderStage::Cover,
      source,
    }
  }

  pub(crate) fn signature(source: tera::Error) -> Self {
    Self::Render {
      stage: RenderStage::Signature,
      source,
    }
  }

  /// The failing stage, if this is a rendering failure.
  #[must_use]
  pub const fn render_stage(&self) -> Option<RenderStage> {
    match self {
      Self::Render { stage, .. } => Some(*stage),
      _ => None,
    }
  }

  #[must_use]
  pub const fn is_cancelled(&self) -> bool {
    matches!(self, Self::Cancelled)
  }
}

impl From<std::string::FromUtf8Error> for Error {
  fn from(e: std::string::FromUtf8Error) -> Self {
    Self::Parse(e.to_string())
  }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
