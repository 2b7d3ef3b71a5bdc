//! Resolution of references between archive entries.
//!
//! Archive paths are mapped onto an `epub:///` URL so relative references
//! (`../Images/a.png`, `/cover.jpg`, `a.png#frag`) resolve the same way a
//! browser would resolve them against the referring document.

use percent_encoding::percent_decode_str;
use url::Url;

const ARCHIVE_ROOT: &str = "epub:///";

/// Resolves `href` against the archive entry `base`, returning the archive
/// path it points at. External references (`http:`, `data:`, ...) yield `None`.
pub fn resolve(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let root = Url::parse(ARCHIVE_ROOT).ok()?;
    let base = root.join(base).ok()?;
    let target = base.join(href).ok()?;

    if target.scheme() != root.scheme() {
        return None;
    }

    let path = target.path().trim_start_matches('/');
    if path.is_empty() {
        return None;
    }

    percent_decode_str(path)
        .decode_utf8()
        .ok()
        .map(|p| p.into_owned())
}

/// Whether `href` carries its own scheme (`https:`, `data:`, `mailto:`, ...)
/// and so points outside the archive.
pub fn is_external(href: &str) -> bool {
    Url::parse(href.trim()).is_ok()
}

/// Directory part of an archive path, without the trailing slash.
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Last segment of a reference, ignoring any fragment or query.
pub fn file_name(href: &str) -> &str {
    let href = href.split(['#', '?']).next().unwrap_or(href);
    href.rsplit('/').next().unwrap_or(href)
}
