use std::collections::{BTreeSet, HashMap};

use pretty_assertions::assert_eq;
use wikitheme::types::EditInfo;
use wikitheme::{
    HtmlFormatter, NoTranslation, OpenPolicy, PageContext, PageModel, RequestContext,
    ShortenPagename, Theme, ThemeConfig, User,
};

struct Pages(BTreeSet<&'static str>);

impl PageModel for Pages {
    fn exists(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    fn last_edit_info(&self, _name: &str) -> Option<EditInfo> {
        None
    }

    fn is_writable(&self, _name: &str) -> bool {
        true
    }

    fn available_actions(&self, _name: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Keeps only the last path segment of a page name
struct LastSegment;

impl ShortenPagename for LastSegment {
    fn shorten(&self, name: &str) -> String {
        name.rsplit('/').next().unwrap_or(name).to_string()
    }
}

struct Site {
    cfg: ThemeConfig,
    user: User,
    form: HashMap<String, String>,
    pages: Pages,
    policy: OpenPolicy,
    i18n: NoTranslation,
    formatter: HtmlFormatter,
}

impl Site {
    fn new(navi_bar: &[&str]) -> Self {
        let cfg = ThemeConfig {
            interwikiname: Some("MyWiki".to_string()),
            navi_bar: navi_bar.iter().map(|s| s.to_string()).collect(),
            ..ThemeConfig::default()
        };
        Self {
            cfg,
            user: User::anonymous(),
            form: HashMap::new(),
            pages: Pages(["FrontPage", "Projects/Rust"].into_iter().collect()),
            policy: OpenPolicy { allow_write: true },
            i18n: NoTranslation,
            formatter: HtmlFormatter::new("/wiki")
                .with_interwiki("MeatBall", "http://meatball.example/"),
        }
    }

    fn theme(&self) -> Theme<'_> {
        Theme::new(RequestContext {
            cfg: &self.cfg,
            user: &self.user,
            form: &self.form,
            lang: "en",
            content_lang: "en",
            script_name: "/wiki",
            pages: &self.pages,
            policy: &self.policy,
            i18n: &self.i18n,
            formatter: &self.formatter,
        })
    }
}

#[test]
fn navibar_from_mixed_entries() {
    let site = Site::new(&[
        "FrontPage",
        "[https://rust-lang.org Rust & Co]",
        "MeatBall:SandBox",
        "[MyWiki:Projects/Rust Projects]",
        "wiki:FrontPage",
    ]);
    let html = site.theme().navigation().navibar(&PageContext::for_page("Projects/Rust"));
    assert_eq!(
        html,
        "\n<ul id=\"navibar\">\n\
         <li class=\"wikilink\"><a href=\"/wiki/FrontPage\">FrontPage</a></li>\n\
         <li class=\"wikilink\"><a href=\"https://rust-lang.org\">Rust &amp; Co</a></li>\n\
         <li class=\"wikilink\"><a class=\"interwiki\" title=\"MeatBall\" href=\"http://meatball.example/SandBox\">SandBox</a></li>\n\
         <li class=\"wikilink current\"><a href=\"/wiki/Projects/Rust\">Projects</a></li>\n\
         </ul>\n"
    );
}

#[test]
fn custom_shortener_is_used_for_titles() {
    let mut site = Site::new(&[]);
    site.user.valid = true;
    site.user.quicklinks = vec!["Projects/Rust".to_string()];
    let theme = site.theme().with_shortener(LastSegment);
    let items = theme.navigation().navibar_items("FrontPage");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].html, "<a href=\"/wiki/Projects/Rust\">Rust</a>");
    assert_eq!(items[0].css_class, "userlink");
    assert_eq!(items[1].css_class, "current");
}

#[test]
fn full_page_chrome_for_existing_page() {
    let site = Site::new(&["FrontPage"]);
    let theme = site.theme();
    let d = PageContext::for_page("FrontPage");
    let header = theme.header(&d);
    assert!(header.starts_with("<div id=\"page\" lang=\"en\" dir=\"ltr\">\n<div id=\"header\">\n"));
    assert!(header.contains("<ul class=\"editbar\">"));
    let footer = theme.footer(&d);
    assert!(footer.contains("<div id=\"footer\">"));
    assert!(footer.contains("<ul id=\"credits\">"));
}

#[test]
fn rss_href_is_under_script_name() {
    let mut site = Site::new(&[]);
    site.cfg.rss_supported = true;
    let theme = site.theme();
    assert_eq!(
        theme.templates().rsshref(),
        "/wiki/RecentChanges?action=rss_rc&amp;ddiffs=1&amp;unique=1"
    );
    let d = PageContext::for_page("RecentChanges");
    assert!(theme.templates().rsslink(&d).contains("href=\"/wiki/RecentChanges?action=rss_rc"));
}
