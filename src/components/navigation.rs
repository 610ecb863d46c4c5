use std::collections::HashSet;

use log::debug;

use crate::components::shorten::ShortenPagename;
use crate::components::theme::{RequestContext, Theme};
use crate::services::LinkAttrs;
use crate::types::{NavItem, PageContext, ResolvedLink};
use crate::utils::{escape_attr, escape_html, normalize_pagename};

/// Marker for links to this wiki written in interwiki form
const SAME_WIKI_PREFIX: &str = "wiki:";

/// Resolves navigation entries written in the link mini-syntax.
///
/// Entries are `[target label]`, URLs with an accepted scheme,
/// `Wiki:Page` interwiki references or plain page names.
pub struct NaviLinkResolver<'r> {
    ctx: &'r RequestContext<'r>,
    shortener: &'r dyn ShortenPagename,
}

/// Split `[target label]`. The bool is true when a separate label was given.
fn split_bracketed(spec: &str) -> Option<(String, String, bool)> {
    let inner = spec.strip_prefix('[')?.strip_suffix(']')?;
    let inner = inner.trim();
    if inner.is_empty() {
        return Some((spec.to_string(), spec.to_string(), false));
    }
    match inner.split_once(char::is_whitespace) {
        Some((target, label)) => Some((target.to_string(), label.trim().to_string(), true)),
        None => Some((inner.to_string(), inner.to_string(), false)),
    }
}

impl<'r> NaviLinkResolver<'r> {
    pub fn new(ctx: &'r RequestContext<'r>, shortener: &'r dyn ShortenPagename) -> Self {
        Self { ctx, shortener }
    }

    /// Resolve an entry into its canonical name and link markup.
    ///
    /// `localize` maps plain page names to the user's localized system
    /// page; bracketed entries are never localized.
    pub fn resolve(&self, spec: &str, localize: bool) -> ResolvedLink {
        let pages = self.ctx.pages;
        let formatter = self.ctx.formatter;

        let (mut target, mut label, explicit_label) = match split_bracketed(spec) {
            Some(parts) => parts,
            None => {
                let page = if localize { pages.sys_page(spec) } else { spec.to_string() };
                let title = self.shortener.shorten(&pages.split_title(&page));
                (page, title, false)
            }
        };

        for scheme in self.ctx.cfg.link_schemes() {
            if target.starts_with(&scheme) {
                let html = format!(
                    "<a href=\"{}\">{}</a>",
                    escape_attr(&target),
                    escape_html(&label)
                );
                return ResolvedLink { canonical_name: target, html };
            }
        }

        if let Some(rest) = target.strip_prefix(SAME_WIKI_PREFIX) {
            target = rest.to_string();
        }

        if let Some((remote, page)) = target.split_once(':') {
            if !remote.is_empty() && !page.is_empty() {
                let (remote, page) = (remote.to_string(), page.to_string());
                if self.ctx.cfg.interwikiname.as_deref() == Some(remote.as_str()) {
                    if !explicit_label {
                        label = page.clone();
                    }
                    target = page;
                } else {
                    let text = if explicit_label { label } else { page.clone() };
                    let attrs = LinkAttrs::default();
                    let html = format!(
                        "{}{}{}",
                        formatter.interwiki_link(true, &remote, &page, &attrs),
                        formatter.text(&text),
                        formatter.interwiki_link(false, &remote, &page, &attrs)
                    );
                    return ResolvedLink { canonical_name: target, html };
                }
            }
        }

        let name = normalize_pagename(&target);
        let exists = pages.exists(&name);
        let html = formatter.page_link(&name, &label, None, exists, &LinkAttrs::default());
        ResolvedLink { canonical_name: name, html }
    }

    /// Navigation entries in display order without duplicates.
    ///
    /// Configured entries come first, then the user's own links, then the
    /// current page if neither list contains it.
    pub fn assemble(
        &self,
        configured: &[String],
        user_links: &[String],
        current: &str,
    ) -> Vec<NavItem> {
        let mut found: HashSet<String> = HashSet::new();
        let mut items = Vec::new();

        let sources = configured
            .iter()
            .map(|spec| (spec, true, "wikilink"))
            .chain(user_links.iter().map(|spec| (spec, false, "userlink")));

        for (spec, localize, origin) in sources {
            let link = self.resolve(spec, localize);
            if !found.insert(link.canonical_name.clone()) {
                debug!("Skipping duplicate navigation entry '{}'", link.canonical_name);
                continue;
            }
            let css_class = if link.canonical_name == current {
                format!("{} current", origin)
            } else {
                origin.to_string()
            };
            items.push(NavItem { canonical_name: link.canonical_name, css_class, html: link.html });
        }

        if !found.contains(current) {
            let title = self.shortener.shorten(&self.ctx.pages.split_title(current));
            let exists = self.ctx.pages.exists(current);
            let html =
                self.ctx.formatter.page_link(current, &title, None, exists, &LinkAttrs::default());
            items.push(NavItem {
                canonical_name: current.to_string(),
                css_class: "current".to_string(),
                html,
            });
        }
        items
    }
}

/// Component for the navigation bar, page location and page trail
pub struct NavigationComponent<'t, 'a> {
    theme: &'t Theme<'a>,
}

impl<'t, 'a> NavigationComponent<'t, 'a> {
    pub fn new(theme: &'t Theme<'a>) -> Self {
        Self { theme }
    }

    /// Navigation entries for the current page
    pub fn navibar_items(&self, current: &str) -> Vec<NavItem> {
        let req = self.theme.req();
        self.theme.resolver().assemble(&req.cfg.navi_bar, &req.user.quicklinks, current)
    }

    /// Assemble the navibar
    pub fn navibar(&self, d: &PageContext) -> String {
        let start_time = std::time::Instant::now();
        let items: String = self
            .navibar_items(&d.page_name)
            .iter()
            .map(|item| format!("<li class=\"{}\">{}</li>\n", item.css_class, item.html))
            .collect();
        debug!(
            "Navibar built in {:?}ms for page '{}'",
            start_time.elapsed().as_millis(),
            d.page_name
        );
        format!("\n<ul id=\"navibar\">\n{}</ul>\n", items)
    }

    /// Page location: links to the parent pages, then the page itself
    pub fn title(&self, d: &PageContext) -> String {
        let mut content = String::new();
        match &d.title_link {
            Some(title_link) => {
                let segments: Vec<&str> = d.page_name.split('/').collect();
                let (last, parents) = match segments.split_last() {
                    Some(split) => split,
                    None => (&"", &segments[..0]),
                };
                let mut curpage = String::new();
                for segment in parents {
                    curpage.push_str(segment);
                    content.push_str(&format!(
                        "<li>{}</li>",
                        self.theme.page_link(&curpage, segment, None, &LinkAttrs::default())
                    ));
                    curpage.push('/');
                }
                content.push_str(&format!(
                    "<li><a class=\"backlink\" title=\"{}\" href=\"{}\">{}</a></li>",
                    escape_attr(&self.theme.tr("Click to do a full-text search for this title")),
                    escape_attr(title_link),
                    escape_html(last)
                ));
            }
            None => {
                content.push_str(&format!("<li>{}</li>", escape_html(&d.title_text)));
            }
        }
        format!("\n<ul id=\"pagelocation\">\n{}\n</ul>\n", content)
    }

    /// Recently visited pages of a logged in user
    pub fn trail(&self) -> String {
        let req = self.theme.req();
        let user = req.user;
        if !(user.valid && user.show_page_trail) || user.trail.is_empty() {
            return String::new();
        }

        let mut items = String::new();
        for entry in &user.trail {
            let mut pagename = entry.clone();
            if let Some((wiki, page)) = entry.split_once(':') {
                // trail entries are stored as interwiki links with _ for spaces
                let page = page.replace('_', " ");
                if req.cfg.interwikiname.as_deref() != Some(wiki) {
                    let attrs = LinkAttrs::default();
                    items.push_str(&format!(
                        "<li>{}{}{}</li>",
                        req.formatter.interwiki_link(true, wiki, &page, &attrs),
                        req.formatter.text(&self.theme.shorten_pagename(&page)),
                        req.formatter.interwiki_link(false, wiki, &page, &attrs)
                    ));
                    continue;
                }
                pagename = page;
            }
            let title = self.theme.shorten_pagename(&req.pages.split_title(&pagename));
            items.push_str(&format!(
                "<li>{}</li>",
                self.theme.page_link(&pagename, &title, None, &LinkAttrs::default())
            ));
        }
        format!("\n<ul id=\"pagetrail\">\n{}\n</ul>", items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::shorten::DefaultShortener;
    use crate::test_support::Fixture;
    use pretty_assertions::assert_eq;

    fn resolve(fx: &Fixture, spec: &str, localize: bool) -> ResolvedLink {
        let ctx = fx.ctx();
        let shortener = DefaultShortener::default();
        NaviLinkResolver::new(&ctx, &shortener).resolve(spec, localize)
    }

    #[test]
    fn bracketed_url_becomes_external_anchor() {
        let fx = Fixture::new();
        let link = resolve(&fx, "[http://example.com Example]", true);
        assert_eq!(link.canonical_name, "http://example.com");
        assert_eq!(link.html, "<a href=\"http://example.com\">Example</a>");
    }

    #[test]
    fn external_labels_are_escaped() {
        let fx = Fixture::new();
        let link = resolve(&fx, "[mailto:me@example.com <Mail> me]", false);
        assert_eq!(link.canonical_name, "mailto:me@example.com");
        assert_eq!(link.html, "<a href=\"mailto:me@example.com\">&lt;Mail&gt; me</a>");
    }

    #[test]
    fn plain_page_uses_shortened_title() {
        let mut fx = Fixture::new();
        fx.pages.titles.insert("FrontPage".to_string(), "Front Page".to_string());
        let link = resolve(&fx, "FrontPage", false);
        assert_eq!(link.canonical_name, "FrontPage");
        assert_eq!(link.html, "<a href=\"/FrontPage\">Front Page</a>");

        let long = format!("Projects/{}", "X".repeat(40));
        let link = resolve(&fx, &long, false);
        assert_eq!(link.canonical_name, long);
        assert!(link.html.contains(&format!(">{}...{}</a>", "X".repeat(11), "X".repeat(11))));
    }

    #[test]
    fn plain_page_is_localized_only_when_asked() {
        let mut fx = Fixture::new();
        fx.pages.sys_pages.insert("FrontPage".to_string(), "StartSeite".to_string());
        assert_eq!(resolve(&fx, "FrontPage", true).canonical_name, "StartSeite");
        assert_eq!(resolve(&fx, "FrontPage", false).canonical_name, "FrontPage");
        assert_eq!(resolve(&fx, "[FrontPage Home]", true).canonical_name, "FrontPage");
    }

    #[test]
    fn remote_interwiki_keeps_full_name() {
        let fx = Fixture::new();
        let link = resolve(&fx, "OtherWiki:SomePage", true);
        assert_eq!(link.canonical_name, "OtherWiki:SomePage");
        assert_eq!(
            link.html,
            "<a class=\"interwiki\" title=\"OtherWiki\" href=\"http://other.example/SomePage\">SomePage</a>"
        );
    }

    #[test]
    fn remote_interwiki_keeps_explicit_label() {
        let fx = Fixture::new();
        let link = resolve(&fx, "[OtherWiki:SomePage Their page]", true);
        assert_eq!(link.canonical_name, "OtherWiki:SomePage");
        assert!(link.html.contains(">Their page</a>"));
    }

    #[test]
    fn own_interwiki_name_resolves_locally() {
        let fx = Fixture::new();
        let link = resolve(&fx, "ThisWiki:FrontPage", true);
        assert_eq!(link.canonical_name, "FrontPage");
        assert_eq!(link.html, "<a href=\"/FrontPage\">FrontPage</a>");
    }

    #[test]
    fn own_interwiki_name_preserves_bracket_label() {
        let fx = Fixture::new();
        let link = resolve(&fx, "[ThisWiki:FrontPage Start here]", true);
        assert_eq!(link.canonical_name, "FrontPage");
        assert_eq!(link.html, "<a href=\"/FrontPage\">Start here</a>");
    }

    #[test]
    fn wiki_prefix_and_underscores_are_normalized() {
        let fx = Fixture::new();
        let link = resolve(&fx, "[wiki:Help_On_Links Help]", true);
        assert_eq!(link.canonical_name, "Help On Links");
        assert_eq!(link.html, "<a class=\"nonexistent\" href=\"/Help_On_Links\">Help</a>");
    }

    #[test]
    fn bracket_without_label_uses_target_as_label() {
        let fx = Fixture::new();
        let link = resolve(&fx, "[ FindPage ]", true);
        assert_eq!(link.canonical_name, "FindPage");
        assert_eq!(link.html, "<a href=\"/FindPage\">FindPage</a>");
    }

    #[test]
    fn empty_brackets_degrade_to_literal() {
        let fx = Fixture::new();
        let link = resolve(&fx, "[]", true);
        assert_eq!(link.canonical_name, "[]");
        assert!(link.html.contains(">[]</a>"));
    }

    #[test]
    fn unmatched_bracket_is_a_literal_page() {
        let fx = Fixture::new();
        let link = resolve(&fx, "[Foo", false);
        assert_eq!(link.canonical_name, "[Foo");
        assert!(link.html.contains("href=\"/%5BFoo\""));
        assert!(!link.html.contains("interwiki"));
    }

    #[test]
    fn without_own_interwiki_name_every_prefix_is_remote() {
        let mut fx = Fixture::new();
        fx.cfg.interwikiname = None;
        let link = resolve(&fx, "ThisWiki:B", true);
        assert_eq!(link.canonical_name, "ThisWiki:B");
        assert_eq!(
            link.html,
            "<a class=\"badinterwiki\" title=\"ThisWiki\" href=\"/ThisWiki:B\">B</a>"
        );

        let link = resolve(&fx, "OtherWiki:SomePage", true);
        assert!(link.html.starts_with("<a class=\"interwiki\" title=\"OtherWiki\""));
    }

    #[test]
    fn resolving_is_repeatable() {
        let fx = Fixture::new();
        for spec in ["FrontPage", "[http://x.org X]", "OtherWiki:A", "ThisWiki:B"] {
            assert_eq!(resolve(&fx, spec, true), resolve(&fx, spec, true));
        }
    }

    #[test]
    fn navibar_merges_configured_and_user_links() {
        let mut fx = Fixture::new();
        fx.cfg.navi_bar = vec!["A".to_string(), "B".to_string()];
        fx.user.quicklinks = vec!["B".to_string(), "C".to_string()];
        let theme = fx.theme();
        let items = theme.navigation().navibar_items("C");
        let summary: Vec<(&str, &str)> = items
            .iter()
            .map(|i| (i.canonical_name.as_str(), i.css_class.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![("A", "wikilink"), ("B", "wikilink"), ("C", "userlink current")]
        );
    }

    #[test]
    fn navibar_appends_current_page() {
        let mut fx = Fixture::new();
        fx.cfg.navi_bar = vec![
            "FrontPage".to_string(),
            "FrontPage".to_string(),
            "[ThisWiki:FrontPage Home]".to_string(),
        ];
        let theme = fx.theme();
        let items = theme.navigation().navibar_items("Sandbox");
        let summary: Vec<(&str, &str)> = items
            .iter()
            .map(|i| (i.canonical_name.as_str(), i.css_class.as_str()))
            .collect();
        assert_eq!(summary, vec![("FrontPage", "wikilink"), ("Sandbox", "current")]);
        assert_eq!(items[1].html, "<a class=\"nonexistent\" href=\"/Sandbox\">Sandbox</a>");
    }

    #[test]
    fn navibar_renders_list() {
        let mut fx = Fixture::new();
        fx.cfg.navi_bar = vec!["FrontPage".to_string()];
        let theme = fx.theme();
        let html = theme.navigation().navibar(&PageContext::for_page("FrontPage"));
        assert_eq!(
            html,
            "\n<ul id=\"navibar\">\n<li class=\"wikilink current\"><a href=\"/FrontPage\">FrontPage</a></li>\n</ul>\n"
        );
    }

    #[test]
    fn title_links_parent_pages() {
        let fx = Fixture::new();
        let theme = fx.theme();
        let mut d = PageContext::for_page("Projects/Rust/Notes");
        d.title_link = Some("/Projects/Rust/Notes?action=fullsearch".to_string());
        let html = theme.navigation().title(&d);
        assert!(html.starts_with("\n<ul id=\"pagelocation\">\n"));
        assert!(html.contains("<li><a class=\"nonexistent\" href=\"/Projects\">Projects</a></li>"));
        assert!(html.contains(
            "<li><a class=\"nonexistent\" href=\"/Projects/Rust\">Rust</a></li>"
        ));
        assert!(html.contains(
            "<a class=\"backlink\" title=\"Click to do a full-text search for this title\" href=\"/Projects/Rust/Notes?action=fullsearch\">Notes</a>"
        ));
    }

    #[test]
    fn title_without_link_is_escaped_text() {
        let fx = Fixture::new();
        let theme = fx.theme();
        let mut d = PageContext::for_page("X");
        d.title_text = "Search <results>".to_string();
        assert_eq!(
            theme.navigation().title(&d),
            "\n<ul id=\"pagelocation\">\n<li>Search &lt;results&gt;</li>\n</ul>\n"
        );
    }

    #[test]
    fn trail_links_local_and_remote_pages() {
        let mut fx = Fixture::new().logged_in("Alice");
        fx.user.show_page_trail = true;
        fx.user.trail = vec![
            "ThisWiki:Front_Page".to_string(),
            "OtherWiki:Their_Page".to_string(),
            "FindPage".to_string(),
        ];
        let theme = fx.theme();
        let html = theme.navigation().trail();
        assert!(html.contains(
            "<li><a class=\"nonexistent\" href=\"/Front_Page\">Front Page</a></li>"
        ));
        assert!(html.contains("href=\"http://other.example/Their_Page\">Their Page</a></li>"));
        assert!(html.contains("<li><a href=\"/FindPage\">FindPage</a></li>"));
    }

    #[test]
    fn trail_is_hidden_for_anonymous_users() {
        let mut fx = Fixture::new();
        fx.user.show_page_trail = true;
        fx.user.trail = vec!["FrontPage".to_string()];
        assert_eq!(fx.theme().navigation().trail(), "");
    }
}
