//! In-memory collaborators for component tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::components::theme::{RequestContext, Theme};
use crate::config::ThemeConfig;
use crate::services::{HtmlFormatter, OpenPolicy, PageModel, Translator};
use crate::types::{EditInfo, User};

pub struct FakePages {
    pub existing: BTreeSet<String>,
    pub deleted: BTreeSet<String>,
    pub titles: BTreeMap<String, String>,
    pub sys_pages: BTreeMap<String, String>,
    pub writable: bool,
    pub cacheable: bool,
    pub format: String,
    pub actions: Vec<String>,
    pub edit_info: Option<EditInfo>,
}

impl FakePages {
    pub fn with_pages(names: &[&str]) -> Self {
        Self {
            existing: names.iter().map(|n| n.to_string()).collect(),
            deleted: BTreeSet::new(),
            titles: BTreeMap::new(),
            sys_pages: BTreeMap::new(),
            writable: true,
            cacheable: true,
            format: "wiki".to_string(),
            actions: Vec::new(),
            edit_info: None,
        }
    }
}

impl PageModel for FakePages {
    fn exists(&self, name: &str) -> bool {
        self.existing.contains(name)
    }

    fn exists_including_deleted(&self, name: &str) -> bool {
        self.existing.contains(name) || self.deleted.contains(name)
    }

    fn split_title(&self, name: &str) -> String {
        self.titles.get(name).cloned().unwrap_or_else(|| name.to_string())
    }

    fn sys_page(&self, name: &str) -> String {
        self.sys_pages.get(name).cloned().unwrap_or_else(|| name.to_string())
    }

    fn last_edit_info(&self, _name: &str) -> Option<EditInfo> {
        self.edit_info.clone()
    }

    fn is_writable(&self, _name: &str) -> bool {
        self.writable
    }

    fn can_use_cache(&self, _name: &str) -> bool {
        self.cacheable
    }

    fn page_format(&self, _name: &str) -> String {
        self.format.clone()
    }

    fn available_actions(&self, _name: &str) -> Vec<String> {
        self.actions.clone()
    }
}

#[derive(Default)]
pub struct MapTranslator(pub BTreeMap<String, String>);

impl Translator for MapTranslator {
    fn get_text(&self, text: &str) -> String {
        self.0.get(text).cloned().unwrap_or_else(|| text.to_string())
    }
}

/// Owns every collaborator a theme borrows
pub struct Fixture {
    pub cfg: ThemeConfig,
    pub user: User,
    pub form: HashMap<String, String>,
    pub lang: String,
    pub pages: FakePages,
    pub policy: OpenPolicy,
    pub i18n: MapTranslator,
    pub formatter: HtmlFormatter,
}

impl Fixture {
    pub fn new() -> Self {
        let cfg = ThemeConfig {
            interwikiname: Some("ThisWiki".to_string()),
            ..ThemeConfig::default()
        };
        Self {
            cfg,
            user: User::anonymous(),
            form: HashMap::new(),
            lang: "en".to_string(),
            pages: FakePages::with_pages(&[
                "FrontPage",
                "RecentChanges",
                "FindPage",
                "HelpContents",
            ]),
            policy: OpenPolicy { allow_write: true },
            i18n: MapTranslator::default(),
            formatter: HtmlFormatter::new("").with_interwiki("OtherWiki", "http://other.example/"),
        }
    }

    pub fn with_action(mut self, action: &str) -> Self {
        self.form.insert("action".to_string(), action.to_string());
        self
    }

    pub fn logged_in(mut self, name: &str) -> Self {
        self.user.valid = true;
        self.user.name = name.to_string();
        self
    }

    pub fn ctx(&self) -> RequestContext<'_> {
        RequestContext {
            cfg: &self.cfg,
            user: &self.user,
            form: &self.form,
            lang: &self.lang,
            content_lang: &self.lang,
            script_name: "",
            pages: &self.pages,
            policy: &self.policy,
            i18n: &self.i18n,
            formatter: &self.formatter,
        }
    }

    pub fn theme(&self) -> Theme<'_> {
        Theme::new(self.ctx())
    }
}
