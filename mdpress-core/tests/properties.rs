#![allow(clippy::expect_used, reason = "Panics are fine inside tests.")]
use mdpress_core::{
  CancelToken,
  CoverInjector,
  CoverData,
  NumberingState,
  TocConfig,
  extract_headings,
  inject_style,
  inject_toc,
  render_toc,
  rewrite_paths,
};

fn numbering(levels: &[u8]) -> Vec<(String, usize)> {
  let mut state = NumberingState::new();
  levels.iter().map(|level| state.next(*level)).collect()
}

#[test]
fn numbering_follows_heading_hierarchy() {
  let labels: Vec<String> = numbering(&[1, 2, 2, 3, 2, 1, 2])
    .into_iter()
    .map(|(label, _)| label)
    .collect();
  assert_eq!(labels, [
    "1.", "1.1.", "1.2.", "1.2.1.", "1.3.", "2.", "2.1."
  ]);
}

#[test]
fn numbering_skips_gaps_as_single_step() {
  let depths: Vec<usize> =
    numbering(&[1, 3]).into_iter().map(|(_, d)| d).collect();
  assert_eq!(depths, [1, 2]);
}

#[test]
fn numbering_normalises_baseline() {
  let depths: Vec<usize> =
    numbering(&[2, 3]).into_iter().map(|(_, d)| d).collect();
  assert_eq!(depths, [1, 2]);
}

#[test]
fn style_with_empty_css_is_identity() {
  for html in [
    "",
    "<p>x</p>",
    "<html><head></head><body></body></html>",
    "<<<not html",
  ] {
    assert_eq!(inject_style(html, "", &CancelToken::new()), html);
  }
}

#[test]
fn style_escapes_hostile_css() {
  let out = inject_style(
    "<html><head></head><body></body></html>",
    "</style><script>alert(1)</script>",
    &CancelToken::new(),
  );
  let style = out.find("<style>").expect("style block inserted");
  let head_close = out.find("</head>").expect("head close kept");
  assert!(style < head_close);
  let block = &out[style..head_close];
  assert!(block.contains("<\\/style>"));
  assert!(block.contains("<\\/script>"));
  assert!(!out.contains("<script>alert(1)</script>"));
}

#[test]
fn empty_source_dir_leaves_any_html_untouched() {
  for html in [
    "<img src=\"a.png\">",
    "<!DOCTYPE html><html><body><a href=\"x\">x</a></body></html>",
    "<div><p>unclosed",
    "",
  ] {
    assert_eq!(rewrite_paths(html, "").expect("no-op"), html);
  }
}

#[test]
fn traversal_is_rejected_without_error() {
  let out = rewrite_paths("<img src=\"../../../etc/passwd\">", "/docs")
    .expect("rejection is not an error");
  assert!(out.contains("src=\"../../../etc/passwd\""));
}

#[test]
fn relative_image_becomes_file_url() {
  let out = rewrite_paths("<img src=\"./images/logo.png\">", "/docs")
    .expect("rewrite succeeds");
  assert!(out.contains("src=\"file:///docs/images/logo.png\""));
}

#[test]
fn heading_entities_are_escaped_exactly_once() {
  let headings = extract_headings("<h2 id=\"ab\">A &amp; B</h2>", 1, 6);
  assert_eq!(headings[0].text, "A & B");
  let toc = render_toc(&headings, "");
  assert!(toc.contains("A &amp; B"));
  assert!(!toc.contains("&amp;amp;"));
}

#[test]
fn toc_lands_after_cover() {
  let cover = CoverInjector::new(
    "<section class=\"cover-page\">{{ title }}</section>",
  )
  .expect("template compiles");
  let html = "<!DOCTYPE html><html><head></head><body><h1 \
              id=\"intro\">Intro</h1><h2 id=\"scope\">Scope</h2></body></html>";
  let data = CoverData {
    title: "Report".to_string(),
    ..Default::default()
  };

  let with_cover = cover
    .inject(html, Some(&data), &CancelToken::new())
    .expect("cover renders");
  let out = inject_toc(
    &with_cover,
    Some(&TocConfig::default()),
    &CancelToken::new(),
  );

  let cover_at = out.find("class=\"cover-page\"").expect("cover present");
  let toc_at = out.find("<nav class=\"toc\">").expect("toc present");
  let body_content_at = out.find("<h1 id=\"intro\">").expect("content kept");
  assert!(cover_at < toc_at);
  assert!(toc_at < body_content_at);
}
