use std::path::PathBuf;
use std::sync::Arc;

use time::OffsetDateTime;

use crate::config::{EditorUi, ThemeConfig};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub base_dir: Arc<PathBuf>,
    pub static_dir: Arc<PathBuf>,
    pub theme: Arc<ThemeConfig>,
    pub allow_write: bool,
}

/// Directory entry information
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
    pub path: PathBuf,
}

/// Search result information
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub page_name: String,
    pub title: String,
    pub excerpt: String,
    pub relevance: f32,
}

/// Markdown rendering result
#[derive(Debug, Clone)]
pub struct MarkdownResult {
    pub html: String,
    pub title: Option<String>,
}

/// A navigation target resolved from the link mini-syntax.
///
/// `canonical_name` identifies the target for de-duplication and current
/// page detection; `html` is ready to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    pub canonical_name: String,
    pub html: String,
}

/// One entry of the navigation bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub canonical_name: String,
    pub css_class: String,
    pub html: String,
}

/// Message shown above the page content
#[derive(Debug, Clone)]
pub enum Message {
    /// Plain message, rendered with a "Clear message" link
    Text(String),
    /// Already rendered widget markup
    Html(String),
}

/// Per-page values the page chrome is rendered from
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub page_name: String,
    pub title_text: String,
    /// Full-text search href for the page title, if the title is a page name
    pub title_link: Option<String>,
    pub msg: Option<Message>,
    pub print_mode: bool,
    /// Media for print mode stylesheets, `print` or `projection`
    pub media: Option<String>,
}

impl PageContext {
    /// Context for showing an ordinary page
    pub fn for_page(page_name: &str) -> Self {
        Self {
            page_name: page_name.to_string(),
            title_text: page_name.to_string(),
            title_link: None,
            msg: None,
            print_mode: false,
            media: None,
        }
    }
}

/// The user on whose behalf a page is rendered
#[derive(Debug, Clone)]
pub struct User {
    /// Logged in and known to the wiki
    pub valid: bool,
    pub name: String,
    pub aliasname: Option<String>,
    /// Personal navigation entries, link mini-syntax
    pub quicklinks: Vec<String>,
    /// Recently visited pages, `wiki:Page` or plain names
    pub trail: Vec<String>,
    pub show_page_trail: bool,
    pub css_url: Option<String>,
    /// Editor preference; `None` means the site default
    pub editor_ui: Option<EditorUi>,
    pub subscriptions: Vec<String>,
}

impl User {
    /// The anonymous visitor
    pub fn anonymous() -> Self {
        Self {
            valid: false,
            name: String::new(),
            aliasname: None,
            quicklinks: Vec::new(),
            trail: Vec::new(),
            show_page_trail: false,
            css_url: None,
            editor_ui: None,
            subscriptions: Vec::new(),
        }
    }

    pub fn is_subscribed_to(&self, pages: &[&str]) -> bool {
        pages.iter().any(|p| self.subscriptions.iter().any(|s| s == p))
    }

    pub fn is_quick_linked_to(&self, pages: &[&str]) -> bool {
        pages.iter().any(|p| self.quicklinks.iter().any(|q| q == p))
    }
}

impl Default for User {
    fn default() -> Self {
        Self::anonymous()
    }
}

/// Last edit information of a page
#[derive(Debug, Clone)]
pub struct EditInfo {
    pub time: OffsetDateTime,
    pub editor: Option<String>,
}

/// One row of the recent changes table
#[derive(Debug, Clone, Default)]
pub struct RcEntry {
    pub icon_html: String,
    pub pagelink_html: String,
    pub time_html: String,
    pub info_html: String,
    pub editors: Vec<String>,
    /// (change number, comment html)
    pub comments: Vec<(u32, String)>,
    pub changecount: usize,
}

/// Day separator row of the recent changes table
#[derive(Debug, Clone, Default)]
pub struct RcDaybreak {
    pub date: String,
    pub bookmark_link_html: Option<String>,
}

/// Values for the recent changes header
#[derive(Debug, Clone, Default)]
pub struct RcHeader {
    pub page_name: String,
    pub q_page_name: String,
    pub rc_days: Vec<u32>,
    pub rc_max_days: u32,
    pub rc_update_bookmark: Option<String>,
    pub rc_curr_bookmark: Option<String>,
}

/// Values for the recent changes footer
#[derive(Debug, Clone, Default)]
pub struct RcFooter {
    pub rc_msg: Option<String>,
}
