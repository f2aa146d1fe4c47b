//! # mdpress-core
//!
//! Assembles a self-contained HTML document from Markdown, ready for a
//! headless-browser PDF renderer.
//!
//! ## Pipeline
//!
//! 1. [`preprocess`](preprocess::preprocess): line endings, `==highlight==`
//!    syntax, blank-line runs.
//! 2. [`Converter`]: Markdown to a full HTML document on a cancellable worker.
//! 3. [`inject_style`]: a sanitized `<style>` block.
//! 4. [`CoverInjector`]: a cover page after `<body>`.
//! 5. [`inject_toc`]: a numbered table of contents after the cover.
//! 6. [`SignatureInjector`]: an author block before `</body>`.
//! 7. [`rewrite_paths`]: relative `img`/`a` references to `file://` URLs,
//!    confined to the source directory.
//!
//! [`Pipeline`] runs all of them in order.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use mdpress_core::{
//!   CancelToken, ComrakRenderer, DocumentOptions, Pipeline, TocConfig,
//! };
//!
//! # async fn run() -> mdpress_core::Result<()> {
//! let pipeline = Pipeline::new(
//!   Arc::new(ComrakRenderer::new()),
//!   "<section>{{ title }}</section>",
//!   "<footer>{{ name }}</footer>",
//! )?;
//! let options = DocumentOptions {
//!   toc: Some(TocConfig::default()),
//!   source_dir: "docs".into(),
//!   ..Default::default()
//! };
//! let html = pipeline
//!   .assemble("# Hello\n\nWorld", &options, &CancelToken::new())
//!   .await?;
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod convert;
pub mod error;
pub mod inject;
pub mod paths;
pub mod pipeline;
pub mod preprocess;
pub mod toc;
pub mod types;
mod utils;

pub use crate::{
  cancel::CancelToken,
  convert::{ComrakRenderer, Converter, MarkdownRenderer},
  error::{Error, RenderStage, Result},
  inject::{COVER_END_MARKER, CoverInjector, SignatureInjector, inject_style},
  paths::rewrite_paths,
  pipeline::{DocumentOptions, Pipeline},
  toc::{NumberingState, extract_headings, inject_toc, render_toc},
  types::{CoverData, HeadingInfo, Link, SignatureData, TocConfig},
};
