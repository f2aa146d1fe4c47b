use std::{
  fs,
  path::{Path, PathBuf},
  sync::Arc,
};

use color_eyre::eyre::{Context, Result, bail};
use log::{LevelFilter, info};
use mdpress_core::{CancelToken, ComrakRenderer, Pipeline};

mod cli;
mod config;
mod error;

use cli::{Cli, Commands};
use config::{DocumentConfig, Overrides};

fn main() -> Result<()> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  match cli.command {
    Commands::Build {
      input,
      output,
      config,
      style,
      template,
      source_dir,
      no_toc,
      timeout,
    } => {
      let config = DocumentConfig::load(config.as_deref(), &input)
        .wrap_err("Failed to load document configuration")?
        .with_overrides(Overrides {
          style,
          template,
          source_dir,
          no_toc,
          timeout,
        });
      let output = output.unwrap_or_else(|| input.with_extension("html"));

      let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()
        .wrap_err("Failed to start async runtime")?;
      runtime.block_on(build(&input, &output, &config))
    },

    Commands::Export { output_dir, force } => {
      export_templates(&output_dir, force).wrap_err_with(|| {
        format!("Failed to export templates to {}", output_dir.display())
      })
    },
  }
}

/// Assemble `input` into an HTML document at `output`.
async fn build(
  input: &Path,
  output: &Path,
  config: &DocumentConfig,
) -> Result<()> {
  info!("Assembling {}", input.display());

  let markdown = fs::read_to_string(input)
    .wrap_err_with(|| format!("Failed to read {}", input.display()))?;
  let options = config.document_options(input)?;
  let templates = config.template_set()?;

  let pipeline = Pipeline::new(
    Arc::new(ComrakRenderer::new()),
    templates.cover,
    templates.signature,
  )?;

  let cancel = CancelToken::new();
  if let Some(timeout) = config.timeout() {
    cancel.cancel_after(timeout);
  }

  let html = match pipeline.assemble(&markdown, &options, &cancel).await {
    Ok(html) => html,
    Err(e) if e.is_cancelled() => {
      bail!(
        "Assembly of {} timed out after {}s",
        input.display(),
        config.timeout_secs.unwrap_or_default()
      );
    },
    Err(e) => {
      return Err(e)
        .wrap_err_with(|| format!("Failed to assemble {}", input.display()));
    },
  };

  if let Some(parent) = output.parent() {
    if !parent.as_os_str().is_empty() && !parent.exists() {
      fs::create_dir_all(parent).wrap_err_with(|| {
        format!("Failed to create directory: {}", parent.display())
      })?;
    }
  }
  fs::write(output, html)
    .wrap_err_with(|| format!("Failed to write {}", output.display()))?;

  info!("Wrote {}", output.display());
  Ok(())
}

/// Write every embedded stylesheet and template into `output_dir`.
fn export_templates(output_dir: &Path, force: bool) -> Result<()> {
  fs::create_dir_all(output_dir)?;

  let mut names: Vec<_> =
    mdpress_templates::all_templates().into_iter().collect();
  names.sort_unstable_by_key(|(name, _)| *name);

  for (filename, content) in names {
    let file_path: PathBuf = output_dir.join(filename);
    if file_path.exists() && !force {
      log::warn!(
        "File {} already exists. Use --force to overwrite.",
        file_path.display()
      );
      continue;
    }
    fs::write(&file_path, content)
      .wrap_err_with(|| format!("Failed to write {}", file_path.display()))?;
    info!("Exported {}", file_path.display());
  }
  Ok(())
}
