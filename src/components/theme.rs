use std::cell::OnceCell;
use std::collections::HashMap;

use log::debug;

use crate::components::editbar::EditbarComponent;
use crate::components::icons::IconComponent;
use crate::components::navigation::{NaviLinkResolver, NavigationComponent};
use crate::components::recent_changes::RecentChangesComponent;
use crate::components::shorten::{DefaultShortener, ShortenPagename};
use crate::components::templates::TemplateComponent;
use crate::config::ThemeConfig;
use crate::services::{AccessPolicy, LinkAttrs, LinkFormatter, PageModel, Translator};
use crate::types::{PageContext, User};

/// Everything a theme needs to know about the request being rendered
#[derive(Clone, Copy)]
pub struct RequestContext<'a> {
    pub cfg: &'a ThemeConfig,
    pub user: &'a User,
    /// Query parameters, first value per key
    pub form: &'a HashMap<String, String>,
    /// User interface language
    pub lang: &'a str,
    /// Page content language
    pub content_lang: &'a str,
    pub script_name: &'a str,
    pub pages: &'a dyn PageModel,
    pub policy: &'a dyn AccessPolicy,
    pub i18n: &'a dyn Translator,
    pub formatter: &'a dyn LinkFormatter,
}

impl<'a> RequestContext<'a> {
    /// Requested action, empty for a plain page view
    pub fn action(&self) -> &str {
        self.form.get("action").map(String::as_str).unwrap_or("")
    }
}

/// Request-scoped renderer for the wiki's page chrome.
///
/// A theme is created per request and dropped afterwards; fragments that
/// are requested several times while rendering one page are cached here.
pub struct Theme<'a> {
    req: RequestContext<'a>,
    shortener: Box<dyn ShortenPagename + 'a>,
    pub(crate) editbar_cache: OnceCell<String>,
}

impl<'a> Theme<'a> {
    pub fn new(req: RequestContext<'a>) -> Self {
        debug!("Creating theme '{}' for action '{}'", req.cfg.theme_name, req.action());
        Self {
            req,
            shortener: Box::new(DefaultShortener::default()),
            editbar_cache: OnceCell::new(),
        }
    }

    /// Replace the page name shortening strategy
    pub fn with_shortener(mut self, shortener: impl ShortenPagename + 'a) -> Self {
        self.shortener = Box::new(shortener);
        self
    }

    pub fn req(&self) -> &RequestContext<'a> {
        &self.req
    }

    pub fn cfg(&self) -> &'a ThemeConfig {
        self.req.cfg
    }

    pub fn name(&self) -> &str {
        &self.req.cfg.theme_name
    }

    /// Translate a user interface string
    pub fn tr(&self, text: &str) -> String {
        self.req.i18n.get_text(text)
    }

    pub fn shorten_pagename(&self, name: &str) -> String {
        self.shortener.shorten(name)
    }

    /// Localized front page name
    pub fn front_page(&self) -> String {
        self.req.pages.sys_page(&self.req.cfg.page_front_page)
    }

    /// Link to a local page; missing pages are marked by the formatter
    pub fn page_link(
        &self,
        page: &str,
        text: &str,
        query: Option<&str>,
        attrs: &LinkAttrs<'_>,
    ) -> String {
        let exists = self.req.pages.exists(page);
        self.req.formatter.page_link(page, text, query, exists, attrs)
    }

    /// Link relative to the wiki script with prebuilt markup
    pub fn link_tag(&self, params: &str, html: &str, attrs: &LinkAttrs<'_>) -> String {
        self.req.formatter.link_tag(params, html, attrs)
    }

    pub fn resolver(&self) -> NaviLinkResolver<'_> {
        NaviLinkResolver::new(&self.req, self.shortener.as_ref())
    }

    pub fn navigation(&self) -> NavigationComponent<'_, 'a> {
        NavigationComponent::new(self)
    }

    pub fn templates(&self) -> TemplateComponent<'_, 'a> {
        TemplateComponent::new(self)
    }

    pub fn editbar(&self) -> EditbarComponent<'_, 'a> {
        EditbarComponent::new(self)
    }

    pub fn icons(&self) -> IconComponent<'_, 'a> {
        IconComponent::new(self)
    }

    pub fn recent_changes(&self) -> RecentChangesComponent<'_, 'a> {
        RecentChangesComponent::new(self)
    }

    /// Page header: page div and the standard chrome above the content
    pub fn header(&self, d: &PageContext) -> String {
        let templates = self.templates();
        let navigation = self.navigation();
        let mut html = String::new();
        html.push_str(&templates.start_page());
        html.push_str(&templates.emit_custom_html(self.cfg().page_header.as_deref()));
        html.push_str("<div id=\"header\">\n");
        html.push_str(&templates.logo());
        html.push_str(&templates.searchform(d));
        html.push_str(&templates.username(d));
        html.push_str(&templates.interwiki());
        html.push_str(&navigation.title(d));
        html.push_str(&navigation.trail());
        html.push_str(&navigation.navibar(d));
        html.push_str(&templates.msg(d));
        html.push_str(&self.editbar().editbar(d));
        html.push_str("</div>\n");
        html
    }

    /// Page footer: page info, edit bar, credits and the page div end
    pub fn footer(&self, d: &PageContext) -> String {
        let templates = self.templates();
        let mut html = String::new();
        html.push_str(&templates.pageinfo(&d.page_name));
        html.push_str(&templates.end_page());
        html.push_str("<div id=\"footer\">\n");
        html.push_str(&self.editbar().editbar(d));
        html.push_str(&templates.credits());
        html.push_str(&templates.showversion(d.print_mode));
        html.push_str("</div>\n");
        html.push_str(&templates.emit_custom_html(self.cfg().page_footer.as_deref()));
        html
    }
}
