use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line interface for mdpress
#[derive(Parser, Debug)]
#[command(author, version, about = "mdpress: Markdown to print-ready HTML")]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Assemble a Markdown file into a standalone HTML document.
  Build {
    /// Markdown file to assemble.
    input: PathBuf,

    /// Where to write the HTML. Defaults to the input with an `.html`
    /// extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Document configuration file. Defaults to `mdpress.toml` next to the
    /// input, if present.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Built-in stylesheet name.
    #[arg(long)]
    style: Option<String>,

    /// Built-in cover/signature template set name.
    #[arg(long)]
    template: Option<String>,

    /// Directory relative resource references are resolved against.
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Omit the table of contents.
    #[arg(long)]
    no_toc: bool,

    /// Abort assembly after this many seconds.
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,
  },

  /// Export the built-in stylesheets and templates for customization.
  Export {
    /// Output directory for template files.
    #[arg(short, long, default_value = "templates")]
    output_dir: PathBuf,

    /// Whether to overwrite existing files.
    #[arg(long)]
    force: bool,
  },
}

impl Cli {
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
