//! Table of contents generation.
//!
//! Headings are found with patterns rather than a full parse: converted HTML
//! is machine-generated and headings never nest, so a tag-level scan is
//! enough and keeps this stage independent of the structural parser used by
//! the path rewriter.
mod numbering;

use std::{fmt::Write, sync::LazyLock};

use html_escape::{encode_double_quoted_attribute, encode_text};
use regex::Regex;

pub use self::numbering::NumberingState;
use crate::{
  cancel::CancelToken,
  inject::{Anchor, COVER_END_MARKER, Fallback, insert_at_anchor},
  types::{HeadingInfo, TocConfig},
  utils::{BODY_OPEN_RE, compile_regex, html_to_text},
};

/// Left padding per nesting step, in `em`.
const INDENT_EM: f64 = 1.5;

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(r"(?is)<h([1-6])(\s[^>]*)?>(.*?)</h([1-6])\s*>", "HEADING_RE")
});

static ID_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(
    r#"(?i)(?:^|\s)id\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#,
    "ID_ATTR_RE",
  )
});

static COVER_END_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(&regex::escape(COVER_END_MARKER), "COVER_END_RE")
});

/// Collect headings with a non-empty `id` whose level is within
/// `min_depth..=max_depth`.
///
/// Tag and attribute names match case-insensitively. Heading text has its
/// markup stripped and entities decoded once.
#[must_use]
pub fn extract_headings(
  html: &str,
  min_depth: u8,
  max_depth: u8,
) -> Vec<HeadingInfo> {
  HEADING_RE
    .captures_iter(html)
    .filter_map(|caps| {
      let level: u8 = caps[1].parse().ok()?;
      if caps[4].parse::<u8>().ok()? != level {
        return None;
      }
      if level < min_depth || level > max_depth {
        return None;
      }

      let attrs = caps.get(2).map_or("", |m| m.as_str());
      let id_caps = ID_ATTR_RE.captures(attrs)?;
      let raw_id = id_caps
        .get(1)
        .or_else(|| id_caps.get(2))
        .or_else(|| id_caps.get(3))?
        .as_str();
      let anchor_id = html_escape::decode_html_entities(raw_id).into_owned();
      if anchor_id.trim().is_empty() {
        return None;
      }

      Some(HeadingInfo {
        level,
        anchor_id,
        text: html_to_text(&caps[3]),
      })
    })
    .collect()
}

/// Render the navigation block for `headings`.
///
/// Returns an empty string when there are no headings.
#[must_use]
pub fn render_toc(headings: &[HeadingInfo], title: &str) -> String {
  if headings.is_empty() {
    return String::new();
  }

  let mut state = NumberingState::new();
  let mut out = String::from("<nav class=\"toc\">\n");
  if !title.is_empty() {
    let _ = writeln!(
      out,
      "<h2 class=\"toc-title\">{}</h2>",
      encode_text(title)
    );
  }
  out.push_str("<ul class=\"toc-list\">\n");

  for heading in headings {
    let (number, depth) = state.next(heading.level);
    #[allow(
      clippy::cast_precision_loss,
      reason = "Depth is at most six"
    )]
    let padding = (depth - 1) as f64 * INDENT_EM;
    let _ = writeln!(
      out,
      "<li class=\"toc-item toc-level-{depth}\" style=\"padding-left: \
       {padding}em\"><a href=\"#{}\"><span \
       class=\"toc-number\">{}</span> {}</a></li>",
      encode_double_quoted_attribute(&heading.anchor_id),
      encode_text(&number),
      encode_text(&heading.text),
    );
  }

  out.push_str("</ul>\n</nav>\n");
  out
}

/// Generate a table of contents and insert it into `html`.
///
/// The block goes after the cover-end marker, else after the opening `<body>`
/// tag, else at the start. Returns `html` unchanged when `config` is `None`,
/// no heading qualifies, or `cancel` has fired.
#[must_use]
pub fn inject_toc(
  html: &str,
  config: Option<&TocConfig>,
  cancel: &CancelToken,
) -> String {
  let Some(config) = config else {
    log::debug!("TOC injection skipped: no TOC config");
    return html.to_string();
  };
  if cancel.is_cancelled() {
    log::debug!("TOC injection skipped: cancelled");
    return html.to_string();
  }

  let (min_depth, max_depth) = config.depth_range();
  let headings = extract_headings(html, min_depth, max_depth);
  let toc = render_toc(&headings, &config.title);
  if toc.is_empty() {
    log::debug!(
      "TOC injection skipped: no headings in {min_depth}..={max_depth}"
    );
    return html.to_string();
  }
  log::debug!("Generated TOC with {} entries", headings.len());

  insert_at_anchor(
    html,
    &toc,
    &[Anchor::After(&COVER_END_RE), Anchor::After(&BODY_OPEN_RE)],
    Fallback::Prepend,
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  fn config() -> TocConfig {
    TocConfig {
      title:     "Contents".to_string(),
      min_depth: 1,
      max_depth: 6,
    }
  }

  #[test]
  fn extracts_only_headings_with_ids() {
    let html = concat!(
      r#"<h1 id="a">A</h1><h2>No id</h2>"#,
      r#"<H3 ID='c' class="x">C</H3><h4 id="">E</h4>"#,
    );
    let headings = extract_headings(html, 1, 6);
    assert_eq!(headings.len(), 2);
    assert_eq!(headings[0], HeadingInfo {
      level:     1,
      anchor_id: "a".to_string(),
      text:      "A".to_string(),
    });
    assert_eq!(headings[1].level, 3);
    assert_eq!(headings[1].anchor_id, "c");
  }

  #[test]
  fn filters_by_depth() {
    let html = r#"<h1 id="a">A</h1><h2 id="b">B</h2><h3 id="c">C</h3>"#;
    let ids: Vec<_> = extract_headings(html, 2, 2)
      .into_iter()
      .map(|h| h.anchor_id)
      .collect();
    assert_eq!(ids, ["b"]);
  }

  #[test]
  fn ignores_data_id_attributes() {
    let html = r#"<h2 data-id="x">B</h2>"#;
    assert!(extract_headings(html, 1, 6).is_empty());
  }

  #[test]
  fn strips_markup_and_decodes_once() {
    let html = r#"<h2 id="x"><code>A</code> &amp; <em>B</em></h2>"#;
    let headings = extract_headings(html, 1, 6);
    assert_eq!(headings[0].text, "A & B");

    let toc = render_toc(&headings, "");
    assert!(toc.contains("A &amp; B"));
    assert!(!toc.contains("&amp;amp;"));
  }

  #[test]
  fn renders_numbers_and_padding() {
    let html = r#"<h1 id="a">A</h1><h2 id="b">B</h2><h4 id="c">C</h4>"#;
    let toc = render_toc(&extract_headings(html, 1, 6), "Contents");
    assert!(toc.starts_with(
      "<nav class=\"toc\">\n<h2 class=\"toc-title\">Contents</h2>"
    ));
    assert!(toc.contains(
      "<li class=\"toc-item toc-level-1\" style=\"padding-left: 0em\"><a \
       href=\"#a\"><span class=\"toc-number\">1.</span> A</a></li>"
    ));
    assert!(toc.contains(
      "style=\"padding-left: 1.5em\"><a href=\"#b\"><span \
       class=\"toc-number\">1.1.</span>"
    ));
    assert!(toc.contains(
      "style=\"padding-left: 3em\"><a href=\"#c\"><span \
       class=\"toc-number\">1.1.1.</span>"
    ));
  }

  #[test]
  fn escapes_title_and_ids() {
    let headings = vec![HeadingInfo {
      level:     1,
      anchor_id: "a\"b".to_string(),
      text:      "<x>".to_string(),
    }];
    let toc = render_toc(&headings, "<T>");
    assert!(toc.contains("&lt;T&gt;"));
    assert!(toc.contains("href=\"#a&quot;b\""));
    assert!(toc.contains("&lt;x&gt;"));
  }

  #[test]
  fn empty_headings_render_nothing() {
    assert_eq!(render_toc(&[], "Contents"), "");
  }

  #[test]
  fn inject_prefers_cover_marker() {
    let html = format!(
      "<body><section>cover</section>{COVER_END_MARKER}<h1 \
       id=\"a\">A</h1></body>"
    );
    let out = inject_toc(&html, Some(&config()), &CancelToken::new());
    let marker = out.find(COVER_END_MARKER).unwrap_or(usize::MAX);
    let nav = out.find("<nav class=\"toc\">").unwrap_or(0);
    let heading = out.find("<h1 id=\"a\">").unwrap_or(0);
    assert!(marker < nav && nav < heading);
  }

  #[test]
  fn inject_falls_back_to_body_then_prepend() {
    let out = inject_toc(
      "<body class=\"x\"><h1 id=\"a\">A</h1></body>",
      Some(&config()),
      &CancelToken::new(),
    );
    assert!(out.starts_with("<body class=\"x\"><nav class=\"toc\">"));

    let out =
      inject_toc("<h1 id=\"a\">A</h1>", Some(&config()), &CancelToken::new());
    assert!(out.starts_with("<nav class=\"toc\">"));
  }

  #[test]
  fn inject_noops() {
    let html = "<body><h1 id=\"a\">A</h1></body>";
    assert_eq!(inject_toc(html, None, &CancelToken::new()), html);

    let bare = "<body><h1>A</h1></body>";
    assert_eq!(inject_toc(bare, Some(&config()), &CancelToken::new()), bare);

    let token = CancelToken::new();
    token.cancel();
    assert_eq!(inject_toc(html, Some(&config()), &token), html);
  }
}
