//! Wikitheme - page chrome rendering for a wiki
//!
//! The theme turns configuration, the current user and page metadata into
//! the HTML around a page: navigation bar, edit bar, page info, head
//! elements and the recent changes table. A small axum server renders
//! Markdown pages from a directory with it.

pub mod components;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod logger;
pub mod services;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export commonly used items
pub use components::{
    DefaultShortener, EditbarComponent, IconComponent, NaviLinkResolver, NavigationComponent,
    RecentChangesComponent, RequestContext, ShortenPagename, TemplateComponent, Theme,
};
pub use config::{Config, Credits, EditorUi, PageIcon, ThemeConfig};
pub use errors::WikiError;
pub use services::{
    AccessPolicy, FileService, HtmlFormatter, LinkAttrs, LinkFormatter, MarkdownService,
    NoTranslation, OpenPolicy, PageModel, SearchService, Translator,
};
pub use types::{AppState, Message, NavItem, PageContext, ResolvedLink, SearchResult, User};

// Re-export utility functions
pub use utils::{escape_attr, escape_html, normalize_pagename, quote_wikiname_url};
