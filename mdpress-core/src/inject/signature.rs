use tera::Tera;

use super::{Anchor, Fallback, insert_at_anchor};
use crate::{
  cancel::CancelToken,
  error::{Error, Result},
  types::SignatureData,
  utils::BODY_CLOSE_RE,
};

const TEMPLATE_NAME: &str = "signature.html";

/// Renders the signature template and splices it before `</body>`.
#[derive(Debug, Clone)]
pub struct SignatureInjector {
  tera: Tera,
}

impl SignatureInjector {
  /// Compile the signature template.
  ///
  /// # Errors
  ///
  /// Returns [`Error::Render`] tagged as the signature stage if the template
  /// does not parse.
  pub fn new(template: &str) -> Result<Self> {
    let mut tera = Tera::default();
    tera
      .add_raw_template(TEMPLATE_NAME, template)
      .map_err(Error::signature)?;
    Ok(Self { tera })
  }

  /// Render `data` and insert the signature block into `html`.
  ///
  /// Returns `html` unchanged when `data` is `None`. Without a `</body>` tag
  /// the block is appended.
  ///
  /// # Errors
  ///
  /// Returns [`Error::Cancelled`] if `cancel` has fired, or a
  /// signature-tagged [`Error::Render`] if the template fails to render.
  pub fn inject(
    &self,
    html: &str,
    data: Option<&SignatureData>,
    cancel: &CancelToken,
  ) -> Result<String> {
    let Some(data) = data else {
      log::debug!("Signature injection skipped: no signature data");
      return Ok(html.to_string());
    };
    cancel.check()?;

    let context =
      tera::Context::from_serialize(data).map_err(Error::signature)?;
    let rendered = self
      .tera
      .render(TEMPLATE_NAME, &context)
      .map_err(Error::signature)?;

    let block = format!("{}\n", rendered.trim());
    Ok(insert_at_anchor(
      html,
      &block,
      &[Anchor::Before(&BODY_CLOSE_RE)],
      Fallback::Append,
    ))
  }
}

#[cfg(test)]
#[allow(clippy::expect_used, reason = "Panics are fine inside tests.")]
mod tests {
  use super::*;
  use crate::{error::RenderStage, types::Link};

  const TEMPLATE: &str = r#"<div class="signature">
<span class="name">{{ name }}</span>
{% if email %}
<a class="email" href="mailto:{{ email }}">{{ email }}</a>
{% endif %}
{% if links %}<ul class="links">{% for link in links %}
<li><a href="{{ link.url }}">{{ link.label }}</a></li>
{% endfor %}</ul>{% endif %}
</div>"#;

  fn injector() -> SignatureInjector {
    SignatureInjector::new(TEMPLATE).expect("template should compile")
  }

  fn data(name: &str) -> SignatureData {
    SignatureData {
      name: name.to_string(),
      ..Default::default()
    }
  }

  #[test]
  fn none_is_identity() {
    let html = "<body><p>x</p></body>";
    let out = injector().inject(html, None, &CancelToken::new());
    assert_eq!(out.ok().as_deref(), Some(html));
  }

  #[test]
  fn inserts_before_body_close() {
    let out = injector()
      .inject(
        "<html><body><p>x</p></BODY></html>",
        Some(&data("Ada")),
        &CancelToken::new(),
      )
      .expect("signature should render");
    assert!(out.starts_with("<html><body><p>x</p><div class=\"signature\">"));
    assert!(out.ends_with("</div>\n</BODY></html>"));
  }

  #[test]
  fn appends_without_body() {
    let out = injector()
      .inject("<p>x</p>", Some(&data("Ada")), &CancelToken::new())
      .expect("signature should render");
    assert!(out.starts_with("<p>x</p><div class=\"signature\">"));
  }

  #[test]
  fn empty_optional_fields_leave_no_markup() {
    let out = injector()
      .inject("<body></body>", Some(&data("Ada")), &CancelToken::new())
      .expect("signature should render");
    assert!(!out.contains("class=\"email\""));
    assert!(!out.contains("<ul"));
  }

  #[test]
  fn renders_links() {
    let mut sig = data("Ada");
    sig.links = vec![Link {
      label: "Site".to_string(),
      url:   "https://example.com".to_string(),
    }];
    let out = injector()
      .inject("<body></body>", Some(&sig), &CancelToken::new())
      .expect("signature should render");
    assert!(out.contains("<ul class=\"links\">"));
    assert!(out.contains(">Site</a>"));
  }

  #[test]
  fn cancelled_is_an_error() {
    let token = CancelToken::new();
    token.cancel();
    let out = injector().inject("<body></body>", Some(&data("A")), &token);
    assert!(matches!(out, Err(Error::Cancelled)));
  }

  #[test]
  fn render_failure_is_tagged_signature() {
    let stage = SignatureInjector::new("{% for x in %}")
      .err()
      .and_then(|e| e.render_stage());
    assert_eq!(stage, Some(RenderStage::Signature));
  }
}
