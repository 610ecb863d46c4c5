use std::collections::BTreeMap;

use log::debug;

use crate::services::collaborators::{LinkAttrs, LinkFormatter};
use crate::utils::{escape_attr, escape_html, quote_wikiname_url};

/// HTML link builder for a wiki served under `script_name`
#[derive(Debug, Clone, Default)]
pub struct HtmlFormatter {
    script_name: String,
    /// Interwiki name to URL prefix
    interwiki_map: BTreeMap<String, String>,
}

impl HtmlFormatter {
    pub fn new(script_name: &str) -> Self {
        Self {
            script_name: script_name.trim_end_matches('/').to_string(),
            interwiki_map: BTreeMap::new(),
        }
    }

    /// Register a remote wiki
    pub fn with_interwiki(mut self, name: &str, url_prefix: &str) -> Self {
        self.interwiki_map.insert(name.to_string(), url_prefix.to_string());
        self
    }

    fn attrs_html(attrs: &LinkAttrs<'_>) -> String {
        let mut out = String::new();
        if let Some(id) = attrs.id {
            out.push_str(&format!(" id=\"{}\"", escape_attr(id)));
        }
        if let Some(name) = attrs.name {
            out.push_str(&format!(" name=\"{}\"", escape_attr(name)));
        }
        if let Some(title) = attrs.title {
            out.push_str(&format!(" title=\"{}\"", escape_attr(title)));
        }
        out
    }
}

impl LinkFormatter for HtmlFormatter {
    fn link_tag(&self, params: &str, html: &str, attrs: &LinkAttrs<'_>) -> String {
        let class = attrs
            .css_class
            .map(|c| format!(" class=\"{}\"", escape_attr(c)))
            .unwrap_or_default();
        format!(
            "<a{}{} href=\"{}/{}\">{}</a>",
            class,
            Self::attrs_html(attrs),
            self.script_name,
            params,
            html
        )
    }

    fn page_link(
        &self,
        page: &str,
        text: &str,
        query: Option<&str>,
        exists: bool,
        attrs: &LinkAttrs<'_>,
    ) -> String {
        let mut href = self.page_url(page);
        if let Some(q) = query {
            href.push('?');
            href.push_str(&escape_attr(q));
        }
        let class = match (attrs.css_class, exists) {
            (Some(c), _) => format!(" class=\"{}\"", escape_attr(c)),
            (None, false) => " class=\"nonexistent\"".to_string(),
            (None, true) => String::new(),
        };
        format!(
            "<a{}{} href=\"{}\">{}</a>",
            class,
            Self::attrs_html(attrs),
            href,
            escape_html(text)
        )
    }

    fn interwiki_link(&self, on: bool, wiki: &str, page: &str, attrs: &LinkAttrs<'_>) -> String {
        if !on {
            return "</a>".to_string();
        }
        let mut attrs = *attrs;
        if attrs.title.is_none() {
            attrs.title = Some(wiki);
        }
        match self.interwiki_map.get(wiki) {
            Some(prefix) => format!(
                "<a class=\"interwiki\"{} href=\"{}{}\">",
                Self::attrs_html(&attrs),
                escape_attr(prefix),
                quote_wikiname_url(page)
            ),
            None => {
                debug!("Unknown interwiki name '{}'", wiki);
                format!(
                    "<a class=\"badinterwiki\"{} href=\"{}/{}\">",
                    Self::attrs_html(&attrs),
                    self.script_name,
                    quote_wikiname_url(&format!("{}:{}", wiki, page))
                )
            }
        }
    }

    fn page_url(&self, page: &str) -> String {
        format!("{}/{}", self.script_name, quote_wikiname_url(page))
    }

    fn image(&self, src: &str, alt: &str, width: Option<u32>, height: Option<u32>) -> String {
        let mut html = format!("<img src=\"{}\" alt=\"{}\"", escape_attr(src), escape_attr(alt));
        if let Some(w) = width {
            html.push_str(&format!(" width=\"{}\"", w));
        }
        if let Some(h) = height {
            html.push_str(&format!(" height=\"{}\"", h));
        }
        html.push('>');
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn page_links_mark_missing_pages() {
        let f = HtmlFormatter::new("/wiki/");
        assert_eq!(
            f.page_link("Front Page", "Home & away", None, true, &LinkAttrs::default()),
            "<a href=\"/wiki/Front_Page\">Home &amp; away</a>"
        );
        assert_eq!(
            f.page_link("Missing", "Missing", Some("action=info"), false, &LinkAttrs::id("x")),
            "<a class=\"nonexistent\" id=\"x\" href=\"/wiki/Missing?action=info\">Missing</a>"
        );
    }

    #[test]
    fn link_tag_keeps_markup() {
        let f = HtmlFormatter::new("");
        assert_eq!(
            f.link_tag("FrontPage?action=edit", "<b>Edit</b>", &LinkAttrs::name("editlink")),
            "<a name=\"editlink\" href=\"/FrontPage?action=edit\"><b>Edit</b></a>"
        );
    }

    #[test]
    fn interwiki_links_use_registered_prefix() {
        let f = HtmlFormatter::new("").with_interwiki("MeatBall", "http://meatballwiki.org/wiki/");
        assert_eq!(
            f.interwiki_link(true, "MeatBall", "Some Page", &LinkAttrs::default()),
            "<a class=\"interwiki\" title=\"MeatBall\" href=\"http://meatballwiki.org/wiki/Some_Page\">"
        );
        assert_eq!(f.interwiki_link(false, "MeatBall", "Some Page", &LinkAttrs::default()), "</a>");
        assert_eq!(
            f.interwiki_link(true, "Nowhere", "X", &LinkAttrs::default()),
            "<a class=\"badinterwiki\" title=\"Nowhere\" href=\"/Nowhere:X\">"
        );
    }

    #[test]
    fn images_skip_unknown_sizes() {
        let f = HtmlFormatter::new("");
        assert_eq!(
            f.image("/img/a.png", "[A]", Some(16), None),
            "<img src=\"/img/a.png\" alt=\"[A]\" width=\"16\">"
        );
    }
}
