//! Markdown to HTML conversion.
//!
//! The renderer itself is synchronous and cannot be interrupted, so
//! [`Converter::to_html`] runs it on tokio's blocking pool and races the
//! result against the caller's [`CancelToken`]. A conversion that loses the
//! race is abandoned, not killed: it finishes in the background and its
//! result is dropped.
use std::{collections::HashMap, fmt::Write, sync::Arc, sync::LazyLock};

use comrak::{
  markdown_to_html_with_plugins,
  options::{Options, Plugins},
  plugins::syntect::SyntectAdapter,
};
use html_escape::encode_text;
use regex::Regex;

use crate::{
  cancel::CancelToken,
  error::{Error, Result},
  preprocess::restore_highlights,
  utils::{compile_regex, html_to_text, slugify},
};

/// Theme used for fenced code blocks unless configured otherwise.
pub const DEFAULT_HIGHLIGHT_THEME: &str = "InspiredGitHub";

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(r"(?s)<h([1-6])>(.*?)</h([1-6])>", "HEADING_RE")
});

/// A Markdown renderer producing an HTML body fragment.
///
/// Implementations must assign an `id` to every heading they emit and must
/// not pass raw HTML from the input through to the output.
pub trait MarkdownRenderer: Send + Sync {
  /// Render preprocessed Markdown to an HTML fragment.
  ///
  /// # Errors
  ///
  /// Returns an error if the renderer cannot produce output.
  fn render(&self, markdown: &str) -> Result<String>;
}

/// `comrak`-backed renderer with GFM extensions and syntect highlighting.
pub struct ComrakRenderer {
  highlighter: Option<SyntectAdapter>,
}

impl ComrakRenderer {
  /// Create a renderer highlighting fenced code with the default theme.
  #[must_use]
  pub fn new() -> Self {
    Self::with_theme(Some(DEFAULT_HIGHLIGHT_THEME))
  }

  /// Create a renderer with the given syntect theme, or without syntax
  /// highlighting when `theme` is `None`.
  #[must_use]
  pub fn with_theme(theme: Option<&str>) -> Self {
    Self {
      highlighter: theme.map(|t| SyntectAdapter::new(Some(t))),
    }
  }

  fn comrak_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.footnotes = true;
    options.extension.tasklist = true;
    options.extension.autolink = true;
    // Raw HTML stays escaped; highlights travel as sentinels instead.
    options.render.r#unsafe = false;
    options.extension.header_ids = None;
    options
  }
}

impl Default for ComrakRenderer {
  fn default() -> Self {
    Self::new()
  }
}

impl MarkdownRenderer for ComrakRenderer {
  fn render(&self, markdown: &str) -> Result<String> {
    let options = Self::comrak_options();
    let mut plugins = Plugins::default();
    if let Some(adapter) = &self.highlighter {
      plugins.render.codefence_syntax_highlighter = Some(adapter);
    }
    let html = markdown_to_html_with_plugins(markdown, &options, &plugins);
    Ok(assign_heading_ids(&html))
  }
}

/// Give every bare `<hN>` heading a unique, slug-derived `id`.
///
/// Duplicate slugs get `-1`, `-2`, ... suffixes in document order, skipping
/// any suffixed id an earlier heading already uses.
#[must_use]
pub fn assign_heading_ids(html: &str) -> String {
  let mut seen: HashMap<String, usize> = HashMap::new();

  HEADING_RE
    .replace_all(html, |caps: &regex::Captures| {
      if caps[1] != caps[3] {
        return caps[0].to_string();
      }
      let level = &caps[1];
      let inner = &caps[2];

      let mut base = slugify(&html_to_text(inner));
      if base.is_empty() {
        base = "section".to_string();
      }
      let id = if let Some(&last) = seen.get(&base) {
        let mut suffix = last;
        // A heading may already own `{base}-{n}` as its own slug.
        let candidate = loop {
          suffix += 1;
          let candidate = format!("{base}-{suffix}");
          if !seen.contains_key(&candidate) {
            break candidate;
          }
        };
        seen.insert(base, suffix);
        candidate
      } else {
        base
      };
      seen.insert(id.clone(), 0);

      format!(
        "<h{level} id=\"{}\">{inner}</h{level}>",
        html_escape::encode_double_quoted_attribute(&id)
      )
    })
    .into_owned()
}

/// Converts preprocessed Markdown into a complete HTML document.
#[derive(Clone)]
pub struct Converter {
  renderer: Arc<dyn MarkdownRenderer>,
  title:    Option<String>,
}

impl Converter {
  #[must_use]
  pub fn new(renderer: Arc<dyn MarkdownRenderer>) -> Self {
    Self {
      renderer,
      title: None,
    }
  }

  /// Set the document `<title>`.
  #[must_use]
  pub fn with_title<S: Into<String>>(mut self, title: Option<S>) -> Self {
    self.title = title.map(Into::into).filter(|t| !t.is_empty());
    self
  }

  /// Convert `content` to a full HTML document.
  ///
  /// # Errors
  ///
  /// Returns [`Error::Cancelled`] if `cancel` fires before the renderer
  /// finishes, or [`Error::Conversion`] if the renderer fails or its worker
  /// panics.
  pub async fn to_html(
    &self,
    content: &str,
    cancel: &CancelToken,
  ) -> Result<String> {
    cancel.check()?;

    let renderer = Arc::clone(&self.renderer);
    let markdown = content.to_owned();
    let worker =
      tokio::task::spawn_blocking(move || renderer.render(&markdown));

    let body = tokio::select! {
      biased;
      () = cancel.cancelled() => {
        log::debug!("Conversion abandoned: cancelled");
        return Err(Error::Cancelled);
      },
      joined = worker => {
        joined.map_err(|e| Error::Conversion(e.to_string()))??
      },
    };

    Ok(self.scaffold(&restore_highlights(&body)))
  }

  fn scaffold(&self, body: &str) -> String {
    let mut doc = String::with_capacity(body.len() + 128);
    doc.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    if let Some(title) = &self.title {
      let _ = writeln!(doc, "<title>{}</title>", encode_text(title));
    }
    doc.push_str("</head>\n<body>\n");
    doc.push_str(body);
    doc.push_str("</body>\n</html>\n");
    doc
  }
}
