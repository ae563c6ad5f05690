//! Single `Range: bytes=` requests against a cached object.
//!
//! Multi-range and malformed headers are ignored and the whole object is sent,
//! which RFC 9110 permits.

use std::ops::Range;

use axum::http::HeaderValue;

/// How to answer a request for an object of a known length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteRange {
    /// No usable range; send everything with 200.
    Full,
    /// Send these bytes with 206.
    Partial(Range<usize>),
    /// The range starts past the end; answer 416.
    Unsatisfiable,
}

/// Interpret a `Range` header for an object of `len` bytes.
pub fn byte_range(header: Option<&HeaderValue>, len: usize) -> ByteRange {
    let Some(spec) = header
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.trim().strip_prefix("bytes="))
    else {
        return ByteRange::Full;
    };
    if spec.contains(',') {
        return ByteRange::Full;
    }
    let Some((first, last)) = spec.trim().split_once('-') else {
        return ByteRange::Full;
    };

    match (first.trim(), last.trim()) {
        // bytes=-N: the final N bytes.
        ("", suffix) => match suffix.parse::<usize>() {
            Ok(0) => ByteRange::Unsatisfiable,
            Ok(_) if len == 0 => ByteRange::Unsatisfiable,
            Ok(n) => ByteRange::Partial(len.saturating_sub(n)..len),
            Err(_) => ByteRange::Full,
        },
        (start, end) => {
            let Ok(start) = start.parse::<usize>() else {
                return ByteRange::Full;
            };
            let end = if end.is_empty() {
                len
            } else {
                match end.parse::<usize>() {
                    Ok(end) if end >= start => end.saturating_add(1).min(len),
                    _ => return ByteRange::Full,
                }
            };
            if start >= len {
                return ByteRange::Unsatisfiable;
            }
            ByteRange::Partial(start..end)
        }
    }
}
