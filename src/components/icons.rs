use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use log::warn;

use crate::components::theme::Theme;
use crate::services::LinkAttrs;
use crate::utils::fill_template;

/// Alt text template, image file name and size of a theme icon
#[derive(Debug)]
pub struct IconSpec {
    pub alt: &'static str,
    pub file: &'static str,
    pub width: u32,
    pub height: u32,
}

const fn icon(alt: &'static str, file: &'static str, width: u32, height: u32) -> IconSpec {
    IconSpec { alt, file, width, height }
}

pub static ICONS: [(&str, IconSpec); 29] = [
    // navibar
    ("help", icon("%(page_help_contents)s", "icon-help.png", 16, 16)),
    ("find", icon("%(page_find_page)s", "icon-search.png", 12, 12)),
    ("diff", icon("Diffs", "icon-diff.png", 15, 11)),
    ("info", icon("Info", "icon-info.png", 16, 16)),
    ("edit", icon("Edit", "icon-edit.png", 16, 16)),
    ("unsubscribe", icon("Unsubscribe", "icon-unsubscribe.png", 14, 10)),
    ("subscribe", icon("Subscribe", "icon-subscribe.png", 14, 10)),
    ("raw", icon("Raw", "icon-raw.png", 12, 13)),
    ("xml", icon("XML", "icon-xml.png", 20, 13)),
    ("print", icon("Print", "icon-print.png", 16, 14)),
    ("view", icon("View", "icon-show.png", 12, 13)),
    ("home", icon("Home", "icon-home.png", 16, 16)),
    ("up", icon("Up", "icon-parent.png", 15, 13)),
    // attachments
    ("attach", icon("%(attach_count)s", "icon-attach.png", 16, 16)),
    // recent changes
    ("rss", icon("[RSS]", "icon-rss.png", 12, 12)),
    ("deleted", icon("[DELETED]", "icon-deleted.png", 60, 12)),
    ("updated", icon("[UPDATED]", "icon-updated.png", 60, 12)),
    ("new", icon("[NEW]", "icon-new.png", 31, 12)),
    ("diffrc", icon("[DIFF]", "icon-diff.png", 16, 16)),
    // general
    ("bottom", icon("[BOTTOM]", "icon-bottom.png", 14, 10)),
    ("top", icon("[TOP]", "icon-top.png", 14, 10)),
    ("www", icon("[WWW]", "icon-www.png", 11, 11)),
    ("mailto", icon("[MAILTO]", "icon-email.png", 16, 16)),
    ("news", icon("[NEWS]", "icon-news.png", 10, 11)),
    ("telnet", icon("[TELNET]", "icon-telnet.png", 10, 11)),
    ("ftp", icon("[FTP]", "icon-ftp.png", 11, 11)),
    ("file", icon("[FILE]", "icon-ftp.png", 11, 11)),
    // search forms
    ("searchbutton", icon("[?]", "icon-search.png", 12, 12)),
    ("interwiki", icon("[%(wikitag)s]", "icon-inter.png", 16, 16)),
];

static ICONS_BY_FILE: OnceLock<HashMap<&'static str, &'static IconSpec>> = OnceLock::new();

fn icon_by_key(key: &str) -> Option<&'static IconSpec> {
    ICONS.iter().find(|(k, _)| *k == key).map(|(_, spec)| spec)
}

/// Icon lookup by image file name, indexed on first use.
/// Files shared by several keys resolve to the first listed one.
pub fn icon_by_file(file: &str) -> Option<&'static IconSpec> {
    let index = ICONS_BY_FILE.get_or_init(|| {
        let mut index = HashMap::new();
        for (_, spec) in ICONS.iter() {
            index.entry(spec.file).or_insert(spec);
        }
        index
    });
    index.get(file).copied()
}

/// Resolved icon data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub alt: String,
    pub src: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Component for theme icons and icon links
pub struct IconComponent<'t, 'a> {
    theme: &'t Theme<'a>,
}

impl<'t, 'a> IconComponent<'t, 'a> {
    pub fn new(theme: &'t Theme<'a>) -> Self {
        Self { theme }
    }

    /// URL of a theme image
    pub fn img_url(&self, file: &str) -> String {
        format!("{}/{}/img/{}", self.theme.cfg().url_prefix, self.theme.name(), file)
    }

    /// Icon data by key, or by file name for legacy callers.
    /// Legacy `.gif` names map to the `.png` images.
    pub fn get_icon(&self, name: &str) -> Icon {
        let spec = icon_by_key(name).or_else(|| icon_by_file(&name.replace(".gif", ".png")));
        match spec {
            Some(spec) => Icon {
                alt: spec.alt.to_string(),
                src: self.img_url(spec.file),
                width: Some(spec.width),
                height: Some(spec.height),
            },
            None => Icon {
                alt: String::new(),
                src: self.img_url(name),
                width: None,
                height: None,
            },
        }
    }

    /// `<img>` tag for an icon; `%(key)s` in the alt text is filled from `vars`
    pub fn make_icon(&self, name: &str, vars: &BTreeMap<String, String>) -> String {
        let icon = self.get_icon(name);
        let alt = match fill_template(&icon.alt, vars) {
            Ok(alt) => self.theme.tr(&alt),
            Err(key) => format!("KeyError: '{}'", key),
        };
        self.theme.req().formatter.image(&icon.src, &alt, icon.width, icon.height)
    }

    /// Icon link from the configured page icons table
    pub fn make_iconlink(&self, which: &str, vars: &BTreeMap<String, String>) -> String {
        let Some(entry) = self.theme.cfg().page_icons_table.get(which) else {
            warn!("No page icon configured for '{}'", which);
            return String::new();
        };
        let title = fill_template(&entry.title, vars).unwrap_or_else(|_| entry.title.clone());
        let i18ntitle = self.theme.tr(&title);
        let mut vars = vars.clone();
        vars.insert("title".to_string(), title);
        vars.insert("i18ntitle".to_string(), i18ntitle.clone());

        let img = self.make_icon(&entry.icon, &vars);
        let params = fill_template(&entry.params, &vars).unwrap_or_else(|key| {
            warn!("Missing '{}' for page icon '{}'", key, which);
            entry.params.clone()
        });
        self.theme.link_tag(&params, &img, &LinkAttrs::title(&i18ntitle))
    }
}
