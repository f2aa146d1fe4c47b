//! The full assembly chain, from Markdown to a self-contained HTML document.
use std::{path::PathBuf, sync::Arc};

use crate::{
  cancel::CancelToken,
  convert::{Converter, MarkdownRenderer},
  error::Result,
  inject::{CoverInjector, SignatureInjector, inject_style},
  paths::rewrite_paths,
  preprocess::preprocess,
  toc::inject_toc,
  types::{CoverData, SignatureData, TocConfig},
};

/// Per-document inputs. Every optional payload left as `None` (or an empty
/// stylesheet / source directory) skips its stage.
#[derive(Debug, Clone, Default)]
pub struct DocumentOptions {
  /// Document `<title>`.
  pub title:      Option<String>,
  /// Stylesheet text inserted as a `<style>` block.
  pub css:        String,
  pub cover:      Option<CoverData>,
  pub signature:  Option<SignatureData>,
  pub toc:        Option<TocConfig>,
  /// Directory relative resource references are resolved against.
  pub source_dir: PathBuf,
}

/// Chains every stage in order: preprocess, convert, style, cover, table of
/// contents, signature, path rewriting.
#[derive(Clone)]
pub struct Pipeline {
  converter: Converter,
  cover:     CoverInjector,
  signature: SignatureInjector,
}

impl Pipeline {
  /// Build a pipeline around `renderer` with the given cover and signature
  /// templates.
  ///
  /// # Errors
  ///
  /// Returns a stage-tagged [`Error::Render`](crate::Error::Render) if either
  /// template fails to compile.
  pub fn new(
    renderer: Arc<dyn MarkdownRenderer>,
    cover_template: &str,
    signature_template: &str,
  ) -> Result<Self> {
    Ok(Self {
      converter: Converter::new(renderer),
      cover:     CoverInjector::new(cover_template)?,
      signature: SignatureInjector::new(signature_template)?,
    })
  }

  /// Assemble `markdown` into a complete HTML document.
  ///
  /// # Errors
  ///
  /// Returns [`Error::Cancelled`](crate::Error::Cancelled) if `cancel` fires
  /// before the document is complete, a stage-tagged rendering error if the
  /// cover or signature template fails, or a parse error from the path
  /// rewriter.
  pub async fn assemble(
    &self,
    markdown: &str,
    options: &DocumentOptions,
    cancel: &CancelToken,
  ) -> Result<String> {
    let markdown = preprocess(markdown, cancel);

    let html = self
      .converter
      .clone()
      .with_title(options.title.as_deref())
      .to_html(&markdown, cancel)
      .await?;
    log::debug!("Converted {} bytes of Markdown", markdown.len());

    let html = inject_style(&html, &options.css, cancel);
    let html = self.cover.inject(&html, options.cover.as_ref(), cancel)?;
    let html = inject_toc(&html, options.toc.as_ref(), cancel);
    let html =
      self
        .signature
        .inject(&html, options.signature.as_ref(), cancel)?;

    // Style and TOC degrade to no-ops on cancellation; don't hand back a
    // document that silently lacks them.
    cancel.check()?;

    rewrite_paths(&html, &options.source_dir)
  }
}
