use super::{Anchor, Fallback, insert_at_anchor};
use crate::{
  cancel::CancelToken,
  utils::{BODY_OPEN_RE, HEAD_CLOSE_RE},
};

/// Escape `</` so stylesheet text cannot close its `<style>` container.
#[must_use]
pub fn sanitize_css(css: &str) -> String {
  css.replace("</", "<\\/")
}

/// Insert `css` as a `<style>` block.
///
/// The block goes before `</head>`, else right after the opening `<body>`
/// tag, else at the very start. Returns `html` unchanged when `css` is empty
/// or `cancel` has fired.
#[must_use]
pub fn inject_style(html: &str, css: &str, cancel: &CancelToken) -> String {
  if css.is_empty() {
    return html.to_string();
  }
  if cancel.is_cancelled() {
    log::debug!("Style injection skipped: cancelled");
    return html.to_string();
  }

  let block = format!("<style>\n{}\n</style>\n", sanitize_css(css));
  insert_at_anchor(
    html,
    &block,
    &[Anchor::Before(&HEAD_CLOSE_RE), Anchor::After(&BODY_OPEN_RE)],
    Fallback::Prepend,
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  fn inject(html: &str, css: &str) -> String {
    inject_style(html, css, &CancelToken::new())
  }

  #[test]
  fn empty_css_is_identity() {
    let html = "<html><head></head><body><p>x</p></body></html>";
    assert_eq!(inject(html, ""), html);
  }

  #[test]
  fn inserts_before_head_close_case_insensitive() {
    let out = inject(
      "<HTML><HEAD><TITLE>t</TITLE></HEAD><BODY></BODY></HTML>",
      "p{}",
    );
    assert_eq!(
      out,
      "<HTML><HEAD><TITLE>t</TITLE><style>\np{}\n</style>\n</HEAD><BODY></\
       BODY></HTML>"
    );
  }

  #[test]
  fn inserts_after_body_open_when_no_head() {
    let out = inject("<body id=\"main\"><p>x</p></body>", "p{}");
    assert_eq!(
      out,
      "<body id=\"main\"><style>\np{}\n</style>\n<p>x</p></body>"
    );
  }

  #[test]
  fn prepends_to_fragment() {
    let out = inject("<p>x</p>", "p{}");
    assert_eq!(out, "<style>\np{}\n</style>\n<p>x</p>");
  }

  #[test]
  fn escapes_closing_sequences() {
    let out = inject(
      "<html><head></head><body></body></html>",
      "</style><script>alert(1)</script>",
    );
    let style_start = out.find("<style>").unwrap_or(usize::MAX);
    let head_close = out.find("</head>").unwrap_or(0);
    assert!(style_start < head_close);
    assert!(out.contains("<\\/style><script>alert(1)<\\/script>"));
    assert_eq!(out.matches("</style>").count(), 1);
  }

  #[test]
  fn cancelled_returns_input() {
    let token = CancelToken::new();
    token.cancel();
    let html = "<html><head></head></html>";
    assert_eq!(inject_style(html, "p{}", &token), html);
  }
}
