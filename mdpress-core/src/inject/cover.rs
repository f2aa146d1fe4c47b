use tera::Tera;

use super::{Anchor, Fallback, insert_at_anchor};
use crate::{
  cancel::CancelToken,
  error::{Error, Result},
  types::CoverData,
  utils::BODY_OPEN_RE,
};

/// Marker placed right after the cover block. The table of contents is
/// inserted after it so it always follows the cover.
pub const COVER_END_MARKER: &str = "<!-- mdpress:cover-end -->";

const TEMPLATE_NAME: &str = "cover.html";

/// Renders the cover template and splices it after the opening `<body>`.
#[derive(Debug, Clone)]
pub struct CoverInjector {
  tera: Tera,
}

impl CoverInjector {
  /// Compile the cover template.
  ///
  /// # Errors
  ///
  /// Returns [`Error::Render`] tagged as the cover stage if the template does
  /// not parse.
  pub fn new(template: &str) -> Result<Self> {
    let mut tera = Tera::default();
    tera
      .add_raw_template(TEMPLATE_NAME, template)
      .map_err(Error::cover)?;
    Ok(Self { tera })
  }

  /// Render `data` and insert the cover block into `html`.
  ///
  /// Returns `html` unchanged when `data` is `None`. Without a `<body>` tag
  /// the block is prepended.
  ///
  /// # Errors
  ///
  /// Returns [`Error::Cancelled`] if `cancel` has fired, or a cover-tagged
  /// [`Error::Render`] if the template fails to render.
  pub fn inject(
    &self,
    html: &str,
    data: Option<&CoverData>,
    cancel: &CancelToken,
  ) -> Result<String> {
    let Some(data) = data else {
      log::debug!("Cover injection skipped: no cover data");
      return Ok(html.to_string());
    };
    cancel.check()?;

    let context = tera::Context::from_serialize(data).map_err(Error::cover)?;
    let rendered = self
      .tera
      .render(TEMPLATE_NAME, &context)
      .map_err(Error::cover)?;

    let block = format!("\n{}\n{COVER_END_MARKER}\n", rendered.trim());
    Ok(insert_at_anchor(
      html,
      &block,
      &[Anchor::After(&BODY_OPEN_RE)],
      Fallback::Prepend,
    ))
  }
}
