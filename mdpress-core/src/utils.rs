use std::sync::LazyLock;

use regex::Regex;

/// Matches any tag, used to strip markup down to text.
pub static TAG_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"(?s)<[^>]*>", "TAG_RE"));

/// Matches the opening `<body ...>` tag, attributes included.
pub static BODY_OPEN_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"(?i)<body(?:\s[^>]*)?>", "BODY_OPEN_RE"));

/// Matches the closing `</body>` tag.
pub static BODY_CLOSE_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"(?i)</body\s*>", "BODY_CLOSE_RE"));

/// Matches the closing `</head>` tag.
pub static HEAD_CLOSE_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"(?i)</head\s*>", "HEAD_CLOSE_RE"));

/// Compile a static pattern, falling back to a never-matching regex.
///
/// All patterns in this crate are literals, so the fallback only guards
/// against a regex engine regression; it is logged rather than propagated.
pub fn compile_regex(pattern: &str, name: &str) -> Regex {
  Regex::new(pattern).unwrap_or_else(|e| {
    log::error!(
      "Failed to compile {name} regex: {e}\n Falling back to never matching \
       regex."
    );
    never_matching_regex()
  })
}

/// Create a regex that never matches anything.
///
/// # Panics
///
/// Panics if the fallback pattern `^\b$` fails to compile, which should never
/// happen.
#[must_use]
pub fn never_matching_regex() -> Regex {
  Regex::new(r"[^\s\S]").unwrap_or_else(|_| {
    #[allow(
      clippy::expect_used,
      reason = "This pattern is guaranteed to be valid"
    )]
    Regex::new(r"^\b$").expect("regex pattern ^\\b$ should always compile")
  })
}

/// Slugify heading text for use as an anchor ID.
///
/// Lowercases, keeps alphanumerics, `-` and `_`, turns whitespace into `-`
/// and drops everything else.
#[must_use]
pub fn slugify(text: &str) -> String {
  let mut slug = String::with_capacity(text.len());
  for c in text.trim().chars() {
    if c.is_alphanumeric() || c == '_' || c == '-' {
      slug.extend(c.to_lowercase());
    } else if c.is_whitespace() {
      slug.push('-');
    }
  }
  slug
}

/// Strip tags from an HTML snippet and decode entities once.
///
/// Runs of whitespace collapse to a single space.
#[must_use]
pub fn html_to_text(html: &str) -> String {
  let stripped = TAG_RE.replace_all(html, "");
  let decoded = html_escape::decode_html_entities(&stripped);
  decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn slugify_basic() {
    assert_eq!(slugify("Hello World"), "hello-world");
    assert_eq!(slugify("  Getting Started!  "), "getting-started");
    assert_eq!(slugify("A & B"), "a--b");
    assert_eq!(slugify("Café_2"), "café_2");
  }

  #[test]
  fn html_to_text_strips_and_decodes_once() {
    assert_eq!(html_to_text("<em>A</em> &amp; <code>B</code>"), "A & B");
    assert_eq!(html_to_text("&amp;amp;"), "&amp;");
    assert_eq!(html_to_text("one\n   two"), "one two");
  }

  #[test]
  fn never_matching_regex_never_matches() {
    let re = never_matching_regex();
    assert!(!re.is_match(""));
    assert!(!re.is_match("anything"));
  }

  #[test]
  fn body_open_matches_with_attributes_only() {
    assert!(BODY_OPEN_RE.is_match("<BODY class=\"x\">"));
    assert!(BODY_OPEN_RE.is_match("<body>"));
    assert!(!BODY_OPEN_RE.is_match("<bodyguard>"));
  }
}
