use std::collections::HashMap;

pub const DEFAULT_CSS: &str = include_str!("../templates/default.css");
pub const MINIMAL_CSS: &str = include_str!("../templates/minimal.css");

pub const COVER_TEMPLATE: &str = include_str!("../templates/cover.html");
pub const SIGNATURE_TEMPLATE: &str =
  include_str!("../templates/signature.html");
pub const MINIMAL_COVER_TEMPLATE: &str =
  include_str!("../templates/minimal-cover.html");
pub const MINIMAL_SIGNATURE_TEMPLATE: &str =
  include_str!("../templates/minimal-signature.html");

/// Name of the stylesheet and template set used when none is configured.
pub const DEFAULT_NAME: &str = "default";

/// A cover template paired with its signature template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateSet {
  pub cover:     &'static str,
  pub signature: &'static str,
}

/// Look up a built-in stylesheet by name.
#[must_use]
pub fn stylesheet(name: &str) -> Option<&'static str> {
  match name {
    "default" => Some(DEFAULT_CSS),
    "minimal" => Some(MINIMAL_CSS),
    _ => None,
  }
}

/// Look up a built-in cover/signature template pair by name.
#[must_use]
pub fn template_set(name: &str) -> Option<TemplateSet> {
  match name {
    "default" => {
      Some(TemplateSet {
        cover:     COVER_TEMPLATE,
        signature: SIGNATURE_TEMPLATE,
      })
    },
    "minimal" => {
      Some(TemplateSet {
        cover:     MINIMAL_COVER_TEMPLATE,
        signature: MINIMAL_SIGNATURE_TEMPLATE,
      })
    },
    _ => None,
  }
}

/// Every embedded asset keyed by file name, for exporting.
#[must_use]
pub fn all_templates() -> HashMap<&'static str, &'static str> {
  let mut templates = HashMap::new();
  templates.insert("default.css", DEFAULT_CSS);
  templates.insert("minimal.css", MINIMAL_CSS);
  templates.insert("cover.html", COVER_TEMPLATE);
  templates.insert("signature.html", SIGNATURE_TEMPLATE);
  templates.insert("minimal-cover.html", MINIMAL_COVER_TEMPLATE);
  templates.insert("minimal-signature.html", MINIMAL_SIGNATURE_TEMPLATE);
  templates
}
