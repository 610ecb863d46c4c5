//! Page name shortening for navigation entries.
//!
//! Very long page names break the navigation layout. Themes pick a
//! strategy; the default keeps the sub-page name and, if that is still too
//! long, replaces its middle with an ellipsis.

const ELLIPSIS: &str = "...";
const ELLIPSIS_LEN: usize = 3;

/// Default maximum length of shortened page names
pub const DEFAULT_MAX_LENGTH: usize = 25;

/// Strategy for shortening page names shown in navigation elements
pub trait ShortenPagename {
    /// Maximum length in characters
    fn max_length(&self) -> usize {
        DEFAULT_MAX_LENGTH
    }

    /// Shorten `name` to at most `max_length()` characters
    fn shorten(&self, name: &str) -> String {
        shorten(name, self.max_length())
    }
}

/// The standard strategy with a configurable limit
#[derive(Debug, Clone, Copy)]
pub struct DefaultShortener {
    pub max_length: usize,
}

impl DefaultShortener {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }
}

impl Default for DefaultShortener {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LENGTH)
    }
}

impl ShortenPagename for DefaultShortener {
    fn max_length(&self) -> usize {
        self.max_length
    }
}

/// Shorten a page name.
///
/// Names within `max_length` characters are returned unchanged. Longer
/// names are reduced to their last path segment; if that is still too long
/// the middle is replaced by `...` so the result is exactly `max_length`
/// characters. Limits too small to hold the ellipsis truncate instead.
pub fn shorten(name: &str, max_length: usize) -> String {
    if name.chars().count() <= max_length {
        return name.to_string();
    }

    let short = name.rsplit('/').next().unwrap_or(name);
    let len = short.chars().count();
    if len <= max_length {
        return short.to_string();
    }

    if max_length <= ELLIPSIS_LEN {
        return short.chars().take(max_length).collect();
    }

    let budget = max_length - ELLIPSIS_LEN;
    let (half, left) = (budget / 2, budget % 2);
    let head: String = short.chars().take(half + left).collect();
    let tail: String = short.chars().skip(len - half).collect();
    format!("{}{}{}", head, ELLIPSIS, tail)
}
