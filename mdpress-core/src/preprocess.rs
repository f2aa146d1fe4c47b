//! Markdown preprocessing ahead of conversion.
//!
//! The `==text==` highlight syntax has no CommonMark equivalent and raw HTML
//! is never passed through the renderer, so highlights are carried across
//! conversion as a pair of private-use sentinels and turned into markup by
//! [`restore_highlights`] afterwards.
use std::sync::LazyLock;

use regex::Regex;

use crate::{
  cancel::CancelToken,
  utils::{TAG_RE, compile_regex},
};

/// Opens a highlighted span between preprocessing and conversion.
pub const HIGHLIGHT_START: char = '\u{E000}';
/// Closes a highlighted span between preprocessing and conversion.
pub const HIGHLIGHT_END: char = '\u{E001}';

static HIGHLIGHT_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(r"==([^\s=](?:[^\n]*?[^\s=])?)==", "HIGHLIGHT_RE")
});

static BLANK_RUN_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"\n{3,}", "BLANK_RUN_RE"));

static SENTINEL_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(r"\x{E000}([^\x{E000}\x{E001}]*)\x{E001}", "SENTINEL_PAIR_RE")
});

/// Run every preprocessing step over raw Markdown.
///
/// Returns the input unchanged if `cancel` is already cancelled.
#[must_use]
pub fn preprocess(markdown: &str, cancel: &CancelToken) -> String {
  if cancel.is_cancelled() {
    log::debug!("Preprocessing skipped: cancelled");
    return markdown.to_string();
  }

  let normalized = normalize_line_endings(markdown);
  let stripped = strip_sentinels(&normalized);
  let highlighted = process_highlights(&stripped);
  collapse_blank_lines(&highlighted)
}

/// Convert `\r\n` and lone `\r` line endings to `\n`.
#[must_use]
pub fn normalize_line_endings(content: &str) -> String {
  content.replace("\r\n", "\n").replace('\r', "\n")
}

/// Remove sentinel code points already present in user content so they
/// cannot be mistaken for highlight markers after conversion.
#[must_use]
pub fn strip_sentinels(content: &str) -> String {
  if content.contains([HIGHLIGHT_START, HIGHLIGHT_END]) {
    content.replace([HIGHLIGHT_START, HIGHLIGHT_END], "")
  } else {
    content.to_string()
  }
}

/// Replace `==text==` with sentinel-wrapped text outside of fenced code.
#[must_use]
pub fn process_highlights(content: &str) -> String {
  let mut result = String::with_capacity(content.len());
  let mut fence: Option<(char, usize)> = None;

  for line in content.split_inclusive('\n') {
    let trimmed = line.trim_start();
    match fence {
      Some((marker, len)) => {
        if is_closing_fence(trimmed, marker, len) {
          fence = None;
        }
        result.push_str(line);
      },
      None => {
        if let Some(opened) = opening_fence(trimmed) {
          fence = Some(opened);
          result.push_str(line);
        } else {
          let replaced =
            HIGHLIGHT_RE.replace_all(line, |caps: &regex::Captures| {
              format!("{HIGHLIGHT_START}{}{HIGHLIGHT_END}", &caps[1])
            });
          result.push_str(&replaced);
        }
      },
    }
  }

  result
}

/// Collapse runs of three or more newlines to exactly two.
#[must_use]
pub fn collapse_blank_lines(content: &str) -> String {
  BLANK_RUN_RE.replace_all(content, "\n\n").into_owned()
}

/// Turn sentinel pairs in converted HTML into `<mark>` elements.
///
/// Sentinels inside tags (an image `alt` written with `==text==`) are
/// dropped rather than marked, as are unpaired sentinels.
#[must_use]
pub fn restore_highlights(html: &str) -> String {
  if !html.contains([HIGHLIGHT_START, HIGHLIGHT_END]) {
    return html.to_string();
  }
  let untagged = TAG_RE.replace_all(html, |caps: &regex::Captures| {
    strip_sentinels(&caps[0])
  });
  let marked = SENTINEL_PAIR_RE.replace_all(&untagged, "<mark>$1</mark>");
  strip_sentinels(&marked)
}

fn opening_fence(line: &str) -> Option<(char, usize)> {
  let marker = line.chars().next().filter(|c| *c == '`' || *c == '~')?;
  let len = line.chars().take_while(|c| *c == marker).count();
  // Backtick fences may not carry backticks in their info string.
  if len < 3 || (marker == '`' && line[len..].contains('`')) {
    return None;
  }
  Some((marker, len))
}

fn is_closing_fence(line: &str, marker: char, len: usize) -> bool {
  let run = line.chars().take_while(|c| *c == marker).count();
  run >= len && line[run * marker.len_utf8()..].trim().is_empty()
}
