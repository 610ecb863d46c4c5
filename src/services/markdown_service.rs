use std::collections::HashMap;

use log::debug;
use pulldown_cmark::{html, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::types::MarkdownResult;
use crate::utils::escape_attr;

/// Service for rendering page bodies
pub struct MarkdownService {
    options: Options,
}

impl MarkdownService {
    /// Create a new markdown service
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        Self { options }
    }

    /// Render markdown to HTML, giving headings stable ids
    pub fn render(&self, content: &str) -> MarkdownResult {
        let mut out = String::with_capacity(content.len() * 2);
        let mut id_counts: HashMap<String, usize> = HashMap::new();
        let mut title: Option<String> = None;

        // Buffer heading events so the id can be derived from the text
        let mut heading: Option<(HeadingLevel, Vec<Event>, String)> = None;

        for ev in Parser::new_ext(content, self.options) {
            match ev {
                Event::Start(Tag::Heading { level, .. }) => {
                    heading = Some((level, Vec::new(), String::new()));
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((level, events, text)) = heading.take() {
                        let lvl = heading_level_to_u32(level);
                        let mut id = slugify(&text);
                        if id.is_empty() {
                            id = format!("h{}", lvl);
                        }
                        let count = id_counts.entry(id.clone()).or_insert(0);
                        if *count > 0 {
                            id = format!("{}-{}", id, *count);
                        }
                        *count += 1;

                        if lvl == 1 && title.is_none() && !text.trim().is_empty() {
                            title = Some(text.trim().to_string());
                        }

                        out.push_str(&format!("<h{} id=\"{}\">", lvl, escape_attr(&id)));
                        html::push_html(&mut out, events.into_iter());
                        out.push_str(&format!("</h{}>\n", lvl));
                    }
                }
                ev => match heading.as_mut() {
                    Some((_, events, text)) => {
                        match &ev {
                            Event::Text(t) | Event::Code(t) => text.push_str(t),
                            Event::SoftBreak | Event::HardBreak => text.push(' '),
                            _ => {}
                        }
                        events.push(ev);
                    }
                    None => html::push_html(&mut out, std::iter::once(ev)),
                },
            }
        }

        debug!("Rendered markdown: {} bytes in, {} bytes out", content.len(), out.len());
        MarkdownResult { html: out, title }
    }
}

impl Default for MarkdownService {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert heading level to u32
fn heading_level_to_u32(level: HeadingLevel) -> u32 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Create URL-friendly slug from text
fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_dash = false;
    for ch in text.chars() {
        let c = ch.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            out.push(c);
            last_dash = false;
        } else if (c.is_ascii_whitespace() || c == '-' || c == '_')
            && !last_dash
            && !out.is_empty()
        {
            out.push('-');
            last_dash = true;
        }
    }
    if out.ends_with('-') {
        out.pop();
    }
    out
}
