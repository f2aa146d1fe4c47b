//! Payload records consumed by the injection stages.
//!
//! These are plain values supplied by configuration. A stage that receives
//! `None` for its payload skips itself and returns its input unchanged.
use serde::{Deserialize, Serialize};

/// A heading found in converted HTML, eligible for the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingInfo {
  /// Heading level (1-6).
  pub level:     u8,
  /// Value of the heading's `id` attribute, entity-decoded.
  pub anchor_id: String,
  /// Heading text with markup stripped and entities decoded exactly once.
  pub text:      String,
}

/// A labelled link rendered in the signature block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
  pub label: String,
  pub url:   String,
}

/// Author signature rendered at the end of the document body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureData {
  pub name:         String,
  pub title:        String,
  pub email:        String,
  pub organization: String,
  pub image_path:   String,
  pub links:        Vec<Link>,
  pub phone:        String,
  pub address:      String,
  pub department:   String,
}

/// Cover page rendered at the start of the document body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverData {
  pub title:          String,
  pub subtitle:       String,
  pub logo:           String,
  pub author:         String,
  pub author_title:   String,
  pub organization:   String,
  pub date:           String,
  pub version:        String,
  pub client_name:    String,
  pub project_name:   String,
  pub document_type:  String,
  pub document_id:    String,
  pub department:     String,
  pub classification: String,
  pub description:    String,
}

/// Table of contents settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TocConfig {
  /// Title rendered above the entries. Empty means no title.
  pub title:     String,
  /// Shallowest heading level included (1-6).
  pub min_depth: u8,
  /// Deepest heading level included (1-6).
  pub max_depth: u8,
}

impl Default for TocConfig {
  fn default() -> Self {
    Self {
      title:     "Table of Contents".to_string(),
      min_depth: 1,
      max_depth: 3,
    }
  }
}

impl TocConfig {
  /// The inclusive level range this configuration selects.
  ///
  /// Both bounds are clamped to 1..=6 and a maximum below the minimum
  /// collapses onto the minimum.
  #[must_use]
  pub fn depth_range(&self) -> (u8, u8) {
    let min = self.min_depth.clamp(1, 6);
    let max = self.max_depth.clamp(1, 6).max(min);
    (min, max)
  }
}
