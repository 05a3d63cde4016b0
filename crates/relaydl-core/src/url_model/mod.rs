//! Local filenames for downloads.
//!
//! Filenames arrive from the upstream lookup (or a URL path) and are
//! sanitized before they are joined onto the output directory.

mod sanitize;

use percent_encoding::percent_decode_str;

pub use sanitize::sanitize_filename;

/// Filename used when no usable name is available.
pub const DEFAULT_FILENAME: &str = "downloaded-file";

/// Last non-empty path segment of `url`, percent-decoded, ignoring query and fragment.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    if decoded.is_empty() || decoded == "." || decoded == ".." {
        return None;
    }
    Some(decoded.into_owned())
}

/// Sanitizes `candidate`; falls back to `fallback` (then `DEFAULT_FILENAME`)
/// when the candidate is missing or sanitizes to nothing.
pub fn safe_filename(candidate: Option<&str>, fallback: &str) -> String {
    [candidate, Some(fallback)]
        .into_iter()
        .flatten()
        .map(sanitize_filename)
        .find(|s| !s.is_empty() && s != "." && s != "..")
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}
