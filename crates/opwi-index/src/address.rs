//! Mapping between document addresses and storage paths.
//!
//! A document stored at `pages/main/Home.opwi` has the address `main/Home`
//! and the namespace `main`. Files directly under `pages/` have the empty
//! namespace and their title as address.

use std::ffi::OsStr;
use std::path::{Component, Path};

/// Derive `(address, namespace)` for `file` under `pages_dir`.
///
/// Returns `None` for files outside `pages_dir`, with another extension, or
/// with a non-UTF-8 path.
pub fn address_for(pages_dir: &Path, file: &Path, extension: &str) -> Option<(String, String)> {
    if file.extension()? != OsStr::new(extension) {
        return None;
    }
    let relative = file.strip_prefix(pages_dir).ok()?;
    let title = relative.file_stem()?.to_str()?;
    let segments = relative
        .parent()?
        .components()
        .map(|c| match c {
            Component::Normal(segment) => segment.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    let namespace = segments.join("/");
    Some((address_of(&namespace, title), namespace))
}

/// The address of `title` in `namespace`.
pub fn address_of(namespace: &str, title: &str) -> String {
    if namespace.is_empty() {
        title.to_string()
    } else {
        format!("{namespace}/{title}")
    }
}

/// Root-relative storage path, always with `/` separators.
pub fn relative_path(pages_dir: &str, namespace: &str, title: &str, extension: &str) -> String {
    format!("{pages_dir}/{}.{extension}", address_of(namespace, title))
}
