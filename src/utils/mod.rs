use std::collections::{BTreeMap, HashMap};

/// Escape HTML special characters
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape HTML attribute values
pub fn escape_attr(text: &str) -> String {
    escape_html(text)
}

/// Normalize request path
pub fn normalize_path(path: &str) -> String {
    path.trim_matches('/').to_string()
}

/// Normalize a page name: underscores become spaces, whitespace runs
/// collapse and empty sub-page segments are dropped.
pub fn normalize_pagename(name: &str) -> String {
    name.replace('_', " ")
        .split('/')
        .map(|segment| segment.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Quote a page name for use in a URL path: spaces become underscores,
/// everything outside the unreserved set is percent-encoded.
pub fn quote_wikiname_url(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for byte in name.replace(' ', "_").bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' | b':' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Decode `%XX` escapes and `+` in a query component
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(b) => {
                        out.push(b);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Parse a raw query string into key/value pairs; the first value wins
pub fn parse_query(query: &str) -> HashMap<String, String> {
    let mut form = HashMap::new();
    for pair in query.trim_start_matches('?').split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        form.entry(percent_decode(key)).or_insert_with(|| percent_decode(value));
    }
    form
}

/// Text direction for a language code
pub fn text_direction(lang: &str) -> &'static str {
    let primary = lang.split(['-', '_']).next().unwrap_or("");
    match primary {
        "ar" | "fa" | "he" | "ur" | "yi" | "ps" | "dv" => "rtl",
        _ => "ltr",
    }
}

/// Interpolate `%(key)s` placeholders. `%%` yields a literal percent sign.
/// A missing key is returned as the error.
pub fn fill_template(template: &str, vars: &BTreeMap<String, String>) -> Result<String, String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix("%%") {
            out.push('%');
            rest = after;
        } else if let Some(inner) = tail.strip_prefix("%(") {
            match inner.find(")s") {
                Some(end) => {
                    let key = &inner[..end];
                    let value = vars.get(key).ok_or_else(|| key.to_string())?;
                    out.push_str(value);
                    rest = &inner[end + 2..];
                }
                None => {
                    out.push_str(tail);
                    rest = "";
                }
            }
        } else {
            out.push('%');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    Ok(out)
}

/// Split a CamelCase word into space separated words
pub fn split_camel_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len() + 4);
    let mut prev: Option<char> = None;
    for c in word.chars() {
        if let Some(p) = prev {
            if c.is_uppercase() && (p.is_lowercase() || p.is_ascii_digit()) {
                out.push(' ');
            }
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Format a timestamp the way page info and recent changes show it
pub fn format_timestamp(ts: time::OffsetDateTime) -> String {
    let fmt = time::macros::format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    ts.format(fmt).unwrap_or_else(|_| ts.unix_timestamp().to_string())
}

/// Format the day part of a timestamp
pub fn format_date(ts: time::OffsetDateTime) -> String {
    let fmt = time::macros::format_description!("[year]-[month]-[day]");
    ts.format(fmt).unwrap_or_else(|_| ts.unix_timestamp().to_string())
}
