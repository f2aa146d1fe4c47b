//! Relative resource path rewriting.
//!
//! Links and images in the assembled document are written relative to the
//! Markdown source. The PDF renderer loads the HTML from elsewhere, so every
//! relative `img[src]` and `a[href]` is resolved against the source directory
//! and replaced with a `file://` URL, provided the result stays inside that
//! directory. Media elements and `script[src]` are never touched.
use std::{
  path::{Component, Path, PathBuf},
  sync::LazyLock,
};

use kuchikikiki::{NodeRef, parse_html};
use markup5ever::{LocalName, local_name};
use percent_encoding::{
  AsciiSet,
  NON_ALPHANUMERIC,
  percent_decode_str,
  utf8_percent_encode,
};
use regex::Regex;
use tendril::TendrilSink;

use crate::{
  error::{Error, Result},
  utils::compile_regex,
};

/// Characters left unescaped in a `file://` path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
  .remove(b'-')
  .remove(b'.')
  .remove(b'_')
  .remove(b'~');

/// Elements and the attribute rewritten on each.
const TARGETS: &[(&str, &str)] = &[("img", "src"), ("a", "href")];

static SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(r"^[A-Za-z][A-Za-z0-9+.\-]*:", "SCHEME_RE")
});

/// Rewrite relative `img[src]` and `a[href]` references in `html` to
/// absolute `file://` URLs under `source_dir`.
///
/// Returns `html` unchanged when `source_dir` is empty. References that would
/// resolve outside `source_dir` are left as they are. A full document stays a
/// full document and a fragment stays a fragment.
///
/// # Errors
///
/// Returns [`Error::SourceDir`] if `source_dir` cannot be made absolute, or
/// [`Error::Parse`] if the tree cannot be queried or serialized.
pub fn rewrite_paths(
  html: &str,
  source_dir: impl AsRef<Path>,
) -> Result<String> {
  let source_dir = source_dir.as_ref();
  if source_dir.as_os_str().is_empty() {
    return Ok(html.to_string());
  }

  let root = resolve_source_dir(source_dir)?;
  let full_document = is_full_document(html);
  let document = parse_html().one(html);

  let mut rewritten = 0;
  for (tag, attr) in TARGETS {
    rewritten += rewrite_attribute(&document, tag, attr, &root)?;
  }
  log::debug!(
    "Rewrote {rewritten} resource path(s) against {}",
    root.display()
  );

  if full_document {
    serialize_document(&document)
  } else {
    serialize_fragment(&document)
  }
}

/// Whether `value` is a relative reference eligible for rewriting.
///
/// Empty values, fragments (`#...`), queries (`?...`), absolute paths and
/// anything carrying a URL scheme (including protocol-relative `//`) are not.
#[must_use]
pub fn is_rewritable(value: &str) -> bool {
  let value = value.trim();
  if value.is_empty()
    || value.starts_with(['#', '?', '/', '\\'])
    || SCHEME_RE.is_match(value)
  {
    return false;
  }
  !Path::new(value).is_absolute()
}

/// Resolve `reference` against `root`, returning a `file://` URL if the
/// result stays within `root`.
///
/// `root` must already be absolute and normalised. Any `?query` or
/// `#fragment` suffix is carried over verbatim.
#[must_use]
pub fn resolve_reference(root: &Path, reference: &str) -> Option<String> {
  let reference = reference.trim();
  let (path_part, suffix) = reference
    .find(['?', '#'])
    .map_or((reference, ""), |at| reference.split_at(at));

  let decoded = percent_decode_str(path_part).decode_utf8().ok()?;
  if decoded.is_empty() {
    return None;
  }

  let resolved = normalize_path(&root.join(decoded.as_ref()));
  if !resolved.starts_with(root) {
    log::warn!(
      "Refusing to rewrite {reference:?}: resolves outside {}",
      root.display()
    );
    return None;
  }

  Some(format!("{}{suffix}", file_url(&resolved)))
}

/// Make `dir` absolute and lexically normalised.
///
/// # Errors
///
/// Returns [`Error::SourceDir`] if the current directory is needed and cannot
/// be determined.
pub fn resolve_source_dir(dir: &Path) -> Result<PathBuf> {
  let absolute = std::path::absolute(dir).map_err(|source| {
    Error::SourceDir {
      path: dir.to_path_buf(),
      source,
    }
  })?;
  Ok(normalize_path(&absolute))
}

/// Remove `.` components and fold `..` into its parent without touching the
/// filesystem. `..` at the root stays at the root.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
  let mut out = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {},
      Component::ParentDir => {
        if !out.pop() && !out.has_root() {
          out.push("..");
        }
      },
      other => out.push(other.as_os_str()),
    }
  }
  out
}

/// Build a `file://` URL, percent-encoding each path segment.
#[must_use]
pub fn file_url(path: &Path) -> String {
  let mut url = String::from("file://");
  for component in path.components() {
    match component {
      Component::Prefix(prefix) => {
        url.push('/');
        url.push_str(&prefix.as_os_str().to_string_lossy());
      },
      Component::Normal(segment) => {
        url.push('/');
        url.extend(utf8_percent_encode(&segment.to_string_lossy(), SEGMENT));
      },
      Component::RootDir | Component::CurDir | Component::ParentDir => {},
    }
  }
  if url.len() == "file://".len() {
    url.push('/');
  }
  url
}

fn is_full_document(html: &str) -> bool {
  let head = html.trim_start_matches('\u{feff}').trim_start().as_bytes();
  [b"<!doctype".as_slice(), b"<html".as_slice()]
    .iter()
    .any(|prefix| {
      head.len() >= prefix.len()
        && head[..prefix.len()].eq_ignore_ascii_case(prefix)
    })
}

fn rewrite_attribute(
  document: &NodeRef,
  tag: &str,
  attr: &str,
  root: &Path,
) -> Result<usize> {
  let selector = format!("{tag}[{attr}]");
  let matches = document
    .select(&selector)
    .map_err(|()| Error::Parse(format!("invalid selector: {selector}")))?;

  let mut count = 0;
  for element in matches {
    let mut attributes = element.attributes.borrow_mut();
    let Some(value) = attributes.get(attr).map(str::to_owned) else {
      continue;
    };
    if !is_rewritable(&value) {
      continue;
    }
    if let Some(url) = resolve_reference(root, &value) {
      log::trace!("Rewriting <{tag} {attr}={value:?}> to {url}");
      attributes.insert(attr, url);
      count += 1;
    }
  }
  Ok(count)
}

fn serialize_document(document: &NodeRef) -> Result<String> {
  let mut buf = Vec::new();
  document
    .serialize(&mut buf)
    .map_err(|e| Error::Parse(e.to_string()))?;
  Ok(String::from_utf8(buf)?)
}

// The parser always wraps input in <html><head/><body/></html>. A fragment is
// everything it produced minus that scaffolding, in document order.
fn serialize_fragment(document: &NodeRef) -> Result<String> {
  let mut buf = Vec::new();
  for node in document.children() {
    if node.as_doctype().is_some() {
      continue;
    }
    if !is_element(&node, &[local_name!("html")]) {
      write_node(&node, &mut buf)?;
      continue;
    }
    for section in node.children() {
      if is_element(&section, &[local_name!("head"), local_name!("body")]) {
        for child in section.children() {
          write_node(&child, &mut buf)?;
        }
      } else {
        write_node(&section, &mut buf)?;
      }
    }
  }
  Ok(String::from_utf8(buf)?)
}

fn is_element(node: &NodeRef, names: &[LocalName]) -> bool {
  node
    .as_element()
    .is_some_and(|element| names.contains(&element.name.local))
}

fn write_node(node: &NodeRef, buf: &mut Vec<u8>) -> Result<()> {
  node.serialize(buf).map_err(|e| Error::Parse(e.to_string()))
}
