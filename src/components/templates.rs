use log::debug;

use crate::components::theme::Theme;
use crate::config::Credits;
use crate::services::LinkAttrs;
use crate::types::{Message, PageContext};
use crate::utils::{escape_attr, escape_html, format_timestamp, quote_wikiname_url, text_direction};

/// Actions that show page content and therefore get page info
const CONTENT_ACTIONS: [&str; 10] = [
    "",
    "show",
    "refresh",
    "preview",
    "diff",
    "subscribe",
    "RenamePage",
    "DeletePage",
    "SpellCheck",
    "print",
];

/// Theme stylesheets as (media, basename) for screen, print and projection
const STYLESHEETS: [(&str, &str); 4] = [
    ("all", "common"),
    ("screen", "screen"),
    ("print", "print"),
    ("projection", "projection"),
];
const STYLESHEETS_PRINT: [(&str, &str); 2] = [("all", "common"), ("all", "print")];
const STYLESHEETS_PROJECTION: [(&str, &str); 2] = [("all", "common"), ("all", "projection")];

const STYLESHEETS_CHARSET: &str = "utf-8";

/// Search box and actions menu functions; `{search_hint}` is filled per request
const HEAD_SCRIPT: &str = r#"
<script type="text/javascript">
<!--// common functions

// Search box state
searchIsDisabled = false;

function searchChange(e) {
    // Disable the search buttons for an empty or blank term
    var value = e.value.replace(/\s+/, '');
    if (value == '' || searchIsDisabled) {
        searchSetDisabled(true);
    } else {
        searchSetDisabled(false);
    }
}

function searchSetDisabled(flag) {
    document.getElementById('fullsearch').disabled = flag;
    document.getElementById('titlesearch').disabled = flag;
}

function searchFocus(e) {
    if (e.value == '{search_hint}') {
        e.value = '';
        e.className = '';
        searchIsDisabled = false;
    }
}

function searchBlur(e) {
    if (e.value == '') {
        e.value = '{search_hint}';
        e.className = 'disabled';
        searchIsDisabled = true;
    }
}

function actionsMenuInit(title) {
    // Swap the label and the do button of each actions menu for a title option
    for (i = 0; i < document.forms.length; i++) {
        var form = document.forms[i];
        if (form.className == 'actionsmenu') {
            var div = form.getElementsByTagName('div')[0];
            var label = div.getElementsByTagName('label')[0];
            if (label) {
                div.removeChild(label);
                var dobutton = div.getElementsByTagName('input')[0];
                div.removeChild(dobutton);
                var select = div.getElementsByTagName('select')[0];
                var item = document.createElement('option');
                item.appendChild(document.createTextNode(title));
                item.value = 'show';
                select.insertBefore(item, select.options[0]);
                select.selectedIndex = 0;
            }
        }
    }
}
//-->
</script>
"#;

/// Escape text for a single quoted JavaScript string inside a script element
fn js_string(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'").replace('<', "\\x3c")
}

/// Component for the page chrome fragments and the page shell
pub struct TemplateComponent<'t, 'a> {
    theme: &'t Theme<'a>,
}

impl<'t, 'a> TemplateComponent<'t, 'a> {
    pub fn new(theme: &'t Theme<'a>) -> Self {
        Self { theme }
    }

    fn lang_attr(lang: &str) -> String {
        format!(" lang=\"{}\" dir=\"{}\"", escape_attr(lang), text_direction(lang))
    }

    /// ` lang=".." dir=".."` for the user interface language
    pub fn ui_lang_attr(&self) -> String {
        Self::lang_attr(self.theme.req().lang)
    }

    /// ` lang=".." dir=".."` for the page content language
    pub fn content_lang_attr(&self) -> String {
        Self::lang_attr(self.theme.req().content_lang)
    }

    pub fn start_page(&self) -> String {
        format!("<div id=\"page\"{}>\n", self.content_lang_attr())
    }

    pub fn end_page(&self) -> String {
        "<div id=\"pagebottom\"></div>\n</div>\n".to_string()
    }

    pub fn img_url(&self, file: &str) -> String {
        self.theme.icons().img_url(file)
    }

    /// Site supplied markup, inserted as is
    pub fn emit_custom_html(&self, html: Option<&str>) -> String {
        html.map(str::to_string).unwrap_or_default()
    }

    pub fn external_script(&self, name: &str) -> String {
        format!(
            "<script type=\"text/javascript\" src=\"{}/common/js/{}.js\"></script>",
            self.theme.cfg().url_prefix,
            escape_attr(name)
        )
    }

    /// Logo linking to the front page
    pub fn logo(&self) -> String {
        match &self.theme.cfg().logo_string {
            Some(logo) if !logo.is_empty() => {
                let front = self.theme.front_page();
                let link =
                    self.theme.link_tag(&quote_wikiname_url(&front), logo, &LinkAttrs::default());
                format!("<div id=\"logo\">{}</div>\n", link)
            }
            _ => String::new(),
        }
    }

    /// This wiki's interwiki name, linking to the front page
    pub fn interwiki(&self) -> String {
        let cfg = self.theme.cfg();
        if !cfg.show_interwiki {
            return String::new();
        }
        let text = cfg.interwikiname.as_deref().unwrap_or("Self");
        let front = self.theme.front_page();
        let link = self.theme.page_link(&front, text, None, &LinkAttrs::default());
        format!("<div id=\"interwiki\"><span>{}</span></div>\n", link)
    }

    /// User home page, preferences and login links
    pub fn username(&self, d: &PageContext) -> String {
        let req = self.theme.req();
        let user = req.user;
        let mut links = Vec::new();

        if user.valid {
            if !user.name.is_empty() {
                let wiki = req.cfg.interwikiname.as_deref().unwrap_or("Self");
                let alias = user
                    .aliasname
                    .as_deref()
                    .filter(|a| !a.is_empty())
                    .unwrap_or(&user.name);
                let title = format!("{} @ {}", alias, wiki);
                let attrs = LinkAttrs {
                    id: Some("userhome"),
                    title: Some(title.as_str()),
                    ..LinkAttrs::default()
                };
                links.push(self.theme.page_link(&user.name, &user.name, None, &attrs));
            }
            links.push(self.theme.page_link(
                &d.page_name,
                &self.theme.tr("Preferences"),
                Some("action=userprefs"),
                &LinkAttrs::id("userprefs"),
            ));
        }
        if req.cfg.show_login {
            let link = if user.valid {
                self.theme.page_link(
                    &d.page_name,
                    &self.theme.tr("Logout"),
                    Some("action=logout&logout=logout"),
                    &LinkAttrs::id("logout"),
                )
            } else {
                self.theme.page_link(
                    &d.page_name,
                    &self.theme.tr("Login"),
                    Some("action=login"),
                    &LinkAttrs::id("login"),
                )
            };
            links.push(link);
        }

        let items: String = links.iter().map(|link| format!("<li>{}</li>", link)).collect();
        format!("<ul id=\"username\">{}</ul>\n", items)
    }

    /// Message box above the content
    pub fn msg(&self, d: &PageContext) -> String {
        let html = match &d.msg {
            None => return String::new(),
            Some(Message::Text(text)) if text.is_empty() => return String::new(),
            Some(Message::Text(text)) => {
                let close = self.theme.page_link(
                    &d.page_name,
                    &self.theme.tr("Clear message"),
                    Some("action=show"),
                    &LinkAttrs::default(),
                );
                format!("<p>{}</p>\n<div class=\"buttons\">{}</div>\n", escape_html(text), close)
            }
            Some(Message::Html(html)) => html.clone(),
        };
        format!("<div id=\"message\">\n{}\n</div>\n", html)
    }

    pub fn should_show_pageinfo(&self, page: &str) -> bool {
        let req = self.theme.req();
        CONTENT_ACTIONS.contains(&req.action())
            && req.pages.exists(page)
            && req.policy.may_read(req.user, page)
    }

    /// Last edit line below the content
    pub fn pageinfo(&self, page: &str) -> String {
        if !self.should_show_pageinfo(page) {
            return String::new();
        }
        let req = self.theme.req();
        let Some(info) = req.pages.last_edit_info(page) else {
            return String::new();
        };

        let time = format_timestamp(info.time);
        let text = match info.editor.as_deref() {
            Some(editor) if !editor.is_empty() => format!(
                "{} {} {} {}",
                self.theme.tr("last edited"),
                time,
                self.theme.tr("by"),
                escape_html(editor)
            ),
            _ => format!("{} {}", self.theme.tr("last modified"), time),
        };
        let pagename = match (&req.cfg.interwikiname, req.cfg.show_interwiki) {
            (Some(wiki), true) => format!("{}: {}", wiki, page),
            _ => page.to_string(),
        };
        format!(
            "<p id=\"pageinfo\" class=\"info\"{}>{}  ({})</p>\n",
            self.ui_lang_attr(),
            escape_html(&pagename),
            text
        )
    }

    pub fn searchform(&self, d: &PageContext) -> String {
        let req = self.theme.req();
        let value = req.form.get("value").map(String::as_str).unwrap_or("");
        format!(
            r#"
<form id="searchform" method="get" action="{action}">
<div>
<input type="hidden" name="action" value="fullsearch">
<input type="hidden" name="context" value="180">
<label for="searchinput">{label}</label>
<input id="searchinput" type="text" name="value" value="{value}" size="20"
    onfocus="searchFocus(this)" onblur="searchBlur(this)"
    onkeyup="searchChange(this)" onchange="searchChange(this)" alt="Search">
<input id="titlesearch" name="titlesearch" type="submit"
    value="{titles}" alt="Search Titles">
<input id="fullsearch" name="fullsearch" type="submit"
    value="{text}" alt="Search Full Text">
</div>
</form>
<script type="text/javascript">
<!--// Initialize search form
var f = document.getElementById('searchform');
f.getElementsByTagName('label')[0].style.display = 'none';
var e = document.getElementById('searchinput');
searchChange(e);
searchBlur(e);
//-->
</script>
"#,
            action = escape_attr(&req.formatter.page_url(&d.page_name)),
            label = escape_html(&self.theme.tr("Search:")),
            value = escape_attr(value),
            titles = escape_attr(&self.theme.tr("Titles")),
            text = escape_attr(&self.theme.tr("Text")),
        )
    }

    pub fn showversion(&self, print_mode: bool) -> String {
        let cfg = self.theme.cfg();
        if !cfg.show_version || print_mode {
            return String::new();
        }
        format!(
            "<div id=\"version\">{} Release {} [Revision {}]</div>\n",
            env!("CARGO_PKG_NAME"),
            escape_html(&cfg.release),
            escape_html(&cfg.revision)
        )
    }

    pub fn credits(&self) -> String {
        match &self.theme.cfg().page_credits {
            Credits::List(items) => {
                let items: String = items.iter().map(|item| format!("<li>{}</li>", item)).collect();
                format!("<ul id=\"credits\">\n{}\n</ul>\n", items)
            }
            Credits::Html(html) => html.clone(),
        }
    }

    fn css_url(&self, basename: &str) -> String {
        format!("{}/{}/css/{}.css", self.theme.cfg().url_prefix, self.theme.name(), basename)
    }

    fn stylesheet_link(media: &str, href: &str) -> String {
        format!(
            "<link rel=\"stylesheet\" type=\"text/css\" charset=\"{}\" media=\"{}\" href=\"{}\">",
            STYLESHEETS_CHARSET,
            escape_attr(media),
            escape_attr(href)
        )
    }

    /// Stylesheet links for the current mode, site and user
    pub fn html_stylesheets(&self, d: &PageContext) -> String {
        let req = self.theme.req();
        let sheets: &[(&str, &str)] = if d.print_mode {
            match d.media.as_deref() {
                Some("projection") => &STYLESHEETS_PROJECTION,
                _ => &STYLESHEETS_PRINT,
            }
        } else {
            &STYLESHEETS
        };

        let mut links: Vec<String> = sheets
            .iter()
            .map(|(media, base)| Self::stylesheet_link(media, &self.css_url(base)))
            .collect();
        links.extend(
            req.cfg
                .stylesheets
                .iter()
                .map(|(media, href)| Self::stylesheet_link(media, href)),
        );

        if req.cfg.ie7_hack {
            links.push(format!(
                "\n<!-- compliance patch for microsoft browsers -->\n<!--[if lt IE 7]>\n   \
                 <script src=\"{}/common/ie7/ie7-standard-p.js\" \
                 type=\"text/javascript\"></script>\n<![endif]-->\n",
                req.cfg.url_prefix
            ));
        }
        links.push(format!(
            "\n<!-- css only for MSIE browsers -->\n<!--[if IE]>\n   {}\n<![endif]-->\n",
            Self::stylesheet_link("all", &self.css_url("msie"))
        ));

        if req.user.valid {
            if let Some(css_url) = req.user.css_url.as_deref() {
                let css_url = css_url.trim();
                let duplicate = sheets.iter().any(|(_, base)| self.css_url(base) == css_url);
                if !css_url.is_empty() && !css_url.eq_ignore_ascii_case("none") && !duplicate {
                    links.push(Self::stylesheet_link("all", css_url));
                }
            }
        }
        links.join("\n")
    }

    /// Script shared by the search box; not needed for printing
    pub fn headscript(&self, d: &PageContext) -> String {
        if d.print_mode || self.theme.req().action() == "print" {
            return String::new();
        }
        HEAD_SCRIPT.replace("{search_hint}", &js_string(&self.theme.tr("Search")))
    }

    /// RSS is offered only on the recent changes page
    pub fn should_use_rss(&self, page: &str) -> bool {
        if !self.theme.cfg().rss_supported {
            return false;
        }
        page == "RecentChanges" || page == self.theme.tr("RecentChanges")
    }

    /// Feed of the recent changes page under the script name
    pub fn rsshref(&self) -> String {
        format!(
            "{}/RecentChanges?action=rss_rc&amp;ddiffs=1&amp;unique=1",
            self.theme.req().script_name.trim_end_matches('/')
        )
    }

    pub fn rsslink(&self, d: &PageContext) -> String {
        if !self.should_use_rss(&d.page_name) {
            return String::new();
        }
        format!(
            "<link rel=\"alternate\" title=\"{} {}\" href=\"{}\" type=\"application/rss+xml\">",
            escape_attr(&self.theme.cfg().sitename),
            escape_attr(&self.theme.tr("Recent Changes")),
            self.rsshref()
        )
    }

    /// Contents of `<head>`
    pub fn html_head(&self, d: &PageContext) -> String {
        let parts = [
            format!(
                "<title>{} - {}</title>",
                escape_html(&d.title_text),
                escape_html(&self.theme.cfg().sitename)
            ),
            self.external_script("common"),
            self.headscript(d),
            self.theme.editbar().gui_editor_script(d),
            self.html_stylesheets(d),
            self.rsslink(d),
        ];
        parts.iter().filter(|part| !part.is_empty()).cloned().collect::<Vec<_>>().join("\n")
    }

    /// Render a complete HTML page around `content`.
    ///
    /// `base_template` is an optional site shell with `{{LANG}}`, `{{HEAD}}`,
    /// `{{HEADER}}`, `{{CONTENT}}` and `{{FOOTER}}` placeholders.
    pub fn render_page(
        &self,
        d: &PageContext,
        content: &str,
        base_template: Option<&str>,
    ) -> String {
        let start_time = std::time::Instant::now();
        let (header, footer) = if d.print_mode {
            (self.start_page(), self.end_page())
        } else {
            (self.theme.header(d), self.theme.footer(d))
        };
        let content = format!(
            "<div id=\"content\"{}>\n{}\n</div>\n",
            self.content_lang_attr(),
            content
        );

        let lang = self.ui_lang_attr();
        let head = self.html_head(d);
        let html = match base_template {
            Some(base) => base
                .replace("{{LANG}}", &lang)
                .replace("{{HEAD}}", &head)
                .replace("{{HEADER}}", &header)
                .replace("{{FOOTER}}", &footer)
                .replace("{{CONTENT}}", &content),
            None => format!(
                "<!DOCTYPE html>\n<html{lang}>\n<head>\n<meta charset=\"utf-8\">\n{head}\n</head>\n<body{lang}>\n{header}{content}{footer}</body>\n</html>\n"
            ),
        };
        debug!("Rendered page '{}' in {:?}ms", d.page_name, start_time.elapsed().as_millis());
        html
    }
}
