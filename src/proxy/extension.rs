//! File extension gating.

use std::collections::HashSet;

/// Lower-cased extension of the last path segment, without the dot.
///
/// Returns `None` when the last segment has no `.` or ends with one.
pub fn extension(path: &str) -> Option<String> {
    let segment = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = segment.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Canonical form of a configured extension: trimmed, no leading dot, lowercase.
pub fn normalize_extension(raw: &str) -> String {
    raw.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// Fixed, case-insensitive set of servable extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedExtensions {
    set: HashSet<String>,
}

impl AllowedExtensions {
    /// Build the set. Entries may carry a leading dot and any case.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = extensions
            .into_iter()
            .map(|e| normalize_extension(e.as_ref()))
            .filter(|e| !e.is_empty())
            .collect();
        Self { set }
    }

    /// True if the extension of `path` is in the set.
    pub fn allows(&self, path: &str) -> bool {
        extension(path).is_some_and(|ext| self.set.contains(&ext))
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

/// Content type served for a cached object, chosen by extension.
pub fn content_type(path: &str) -> &'static str {
    match extension(path).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("bmp") => "image/bmp",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mp3") => "audio/mpeg",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        _ => "application/octet-stream",
    }
}
