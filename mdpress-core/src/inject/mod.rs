//! Block injection into assembled HTML.
//!
//! Every injector follows the same shape: try an ordered list of anchors and
//! splice the fragment at the first one that matches, otherwise fall back to
//! one end of the document. [`insert_at_anchor`] is that shared shape.
pub mod cover;
pub mod signature;
pub mod style;

use regex::Regex;

pub use self::{
  cover::{COVER_END_MARKER, CoverInjector},
  signature::SignatureInjector,
  style::inject_style,
};

/// A place to splice a fragment, relative to the first match of a pattern.
#[derive(Debug, Clone, Copy)]
pub enum Anchor<'a> {
  /// Insert immediately before the match.
  Before(&'a Regex),
  /// Insert immediately after the match.
  After(&'a Regex),
}

/// Where a fragment goes when no anchor matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
  Prepend,
  Append,
}

/// Insert `fragment` at the first matching anchor, trying `anchors` in order.
///
/// Exactly one strategy applies per call: the first anchor whose pattern
/// matches, or `fallback` if none do.
#[must_use]
pub fn insert_at_anchor(
  html: &str,
  fragment: &str,
  anchors: &[Anchor<'_>],
  fallback: Fallback,
) -> String {
  for anchor in anchors {
    let (re, before) = match anchor {
      Anchor::Before(re) => (*re, true),
      Anchor::After(re) => (*re, false),
    };
    if let Some(m) = re.find(html) {
      let at = if before { m.start() } else { m.end() };
      return splice(html, fragment, at);
    }
  }

  log::debug!("No anchor matched, falling back to {fallback:?}");
  match fallback {
    Fallback::Prepend => splice(html, fragment, 0),
    Fallback::Append => splice(html, fragment, html.len()),
  }
}

fn splice(html: &str, fragment: &str, at: usize) -> String {
  let mut out = String::with_capacity(html.len() + fragment.len());
  out.push_str(&html[..at]);
  out.push_str(fragment);
  out.push_str(&html[at..]);
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::utils::{BODY_CLOSE_RE, BODY_OPEN_RE, HEAD_CLOSE_RE};

  #[test]
  fn first_matching_anchor_wins() {
    let html = "<html><head></head><body></body></html>";
    let out = insert_at_anchor(
      html,
      "X",
      &[Anchor::Before(&HEAD_CLOSE_RE), Anchor::After(&BODY_OPEN_RE)],
      Fallback::Prepend,
    );
    assert_eq!(out, "<html><head>X</head><body></body></html>");
  }

  #[test]
  fn later_anchor_used_when_earlier_missing() {
    let html = "<body class=\"a\"><p>hi</p></body>";
    let out = insert_at_anchor(
      html,
      "X",
      &[Anchor::Before(&HEAD_CLOSE_RE), Anchor::After(&BODY_OPEN_RE)],
      Fallback::Prepend,
    );
    assert_eq!(out, "<body class=\"a\">X<p>hi</p></body>");
  }

  #[test]
  fn fallbacks() {
    let html = "<p>hi</p>";
    assert_eq!(
      insert_at_anchor(
        html,
        "X",
        &[Anchor::Before(&BODY_CLOSE_RE)],
        Fallback::Append
      ),
      "<p>hi</p>X"
    );
    assert_eq!(
      insert_at_anchor(
        html,
        "X",
        &[Anchor::After(&BODY_OPEN_RE)],
        Fallback::Prepend
      ),
      "X<p>hi</p>"
    );
  }
}
