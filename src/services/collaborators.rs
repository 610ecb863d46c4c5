//! Services the theme consumes but does not own: the page model,
//! permissions, string translation and link markup.

use crate::types::{EditInfo, User};
use crate::utils::escape_html;

/// Read-only view of the wiki's pages
pub trait PageModel {
    fn exists(&self, name: &str) -> bool;

    /// Existence check that also counts deleted pages with history
    fn exists_including_deleted(&self, name: &str) -> bool {
        self.exists(name)
    }

    /// Display title of a page
    fn split_title(&self, name: &str) -> String {
        name.to_string()
    }

    /// Localized variant of a system page, e.g. the user's FrontPage
    fn sys_page(&self, name: &str) -> String {
        name.to_string()
    }

    fn last_edit_info(&self, name: &str) -> Option<EditInfo>;

    fn is_writable(&self, name: &str) -> bool;

    /// Whether rendered output of the page may be cached
    fn can_use_cache(&self, _name: &str) -> bool {
        true
    }

    /// Markup format of the page body
    fn page_format(&self, _name: &str) -> String {
        "wiki".to_string()
    }

    /// Actions the wiki offers for this page
    fn available_actions(&self, name: &str) -> Vec<String>;
}

/// Permission checks for the current user
pub trait AccessPolicy {
    fn may_read(&self, user: &User, page: &str) -> bool;
    fn may_write(&self, user: &User, page: &str) -> bool;
}

/// Lookup of user interface strings
pub trait Translator {
    fn get_text(&self, text: &str) -> String;
}

/// Optional attributes for generated links
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkAttrs<'a> {
    pub id: Option<&'a str>,
    pub name: Option<&'a str>,
    pub title: Option<&'a str>,
    pub css_class: Option<&'a str>,
}

impl<'a> LinkAttrs<'a> {
    pub fn id(id: &'a str) -> Self {
        Self { id: Some(id), ..Self::default() }
    }

    pub fn name(name: &'a str) -> Self {
        Self { name: Some(name), ..Self::default() }
    }

    pub fn title(title: &'a str) -> Self {
        Self { title: Some(title), ..Self::default() }
    }
}

/// Builders for link and image markup
pub trait LinkFormatter {
    /// Link relative to the wiki script. `params` is an already quoted
    /// path with optional query; `html` is inserted unescaped.
    fn link_tag(&self, params: &str, html: &str, attrs: &LinkAttrs<'_>) -> String;

    /// Link to a local page; `text` is escaped
    fn page_link(
        &self,
        page: &str,
        text: &str,
        query: Option<&str>,
        exists: bool,
        attrs: &LinkAttrs<'_>,
    ) -> String;

    /// Opening (`on`) or closing tag of a link to a page on another wiki
    fn interwiki_link(&self, on: bool, wiki: &str, page: &str, attrs: &LinkAttrs<'_>) -> String;

    /// URL of a local page
    fn page_url(&self, page: &str) -> String;

    fn image(&self, src: &str, alt: &str, width: Option<u32>, height: Option<u32>) -> String;

    fn text(&self, text: &str) -> String {
        escape_html(text)
    }
}

/// Translator returning every string unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTranslation;

impl Translator for NoTranslation {
    fn get_text(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Everyone may read; writing is a single switch
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenPolicy {
    pub allow_write: bool,
}

impl AccessPolicy for OpenPolicy {
    fn may_read(&self, _user: &User, _page: &str) -> bool {
        true
    }

    fn may_write(&self, _user: &User, _page: &str) -> bool {
        self.allow_write
    }
}
